//! Search configuration

use crate::error::{AppError, Result};
use serde::{Deserialize, Serialize};

/// Tuning knobs for fuzzy matching
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Fraction of a query word's length tolerated as edit distance
    #[serde(default = "default_error_rate")]
    pub error_rate: f64,

    /// Skip the edit-distance check when word lengths differ by more than
    /// `max_length_difference`
    #[serde(default = "default_length_gate")]
    pub length_gate: bool,

    #[serde(default = "default_max_length_difference")]
    pub max_length_difference: usize,

    /// Also accept a text word that is contained in the query word
    #[serde(default)]
    pub bidirectional_containment: bool,

    /// Queries this short (after normalization) only match by substring
    #[serde(default = "default_short_query_max_len")]
    pub short_query_max_len: usize,
}

impl SearchConfig {
    /// Create a new builder for SearchConfig
    pub fn builder() -> SearchConfigBuilder {
        SearchConfigBuilder::new()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if !(0.0..1.0).contains(&self.error_rate) {
            return Err(AppError::Configuration(format!(
                "search.error_rate must be in [0, 1), got {}",
                self.error_rate
            )));
        }

        Ok(())
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            error_rate: default_error_rate(),
            length_gate: default_length_gate(),
            max_length_difference: default_max_length_difference(),
            bidirectional_containment: false,
            short_query_max_len: default_short_query_max_len(),
        }
    }
}

fn default_error_rate() -> f64 {
    0.2
}

fn default_length_gate() -> bool {
    true
}

fn default_max_length_difference() -> usize {
    2
}

fn default_short_query_max_len() -> usize {
    2
}

/// Builder for SearchConfig
pub struct SearchConfigBuilder {
    config: SearchConfig,
}

impl SearchConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: SearchConfig::default(),
        }
    }

    pub fn error_rate(mut self, rate: f64) -> Self {
        self.config.error_rate = rate;
        self
    }

    pub fn length_gate(mut self, enabled: bool) -> Self {
        self.config.length_gate = enabled;
        self
    }

    pub fn max_length_difference(mut self, difference: usize) -> Self {
        self.config.max_length_difference = difference;
        self
    }

    pub fn bidirectional_containment(mut self, enabled: bool) -> Self {
        self.config.bidirectional_containment = enabled;
        self
    }

    pub fn short_query_max_len(mut self, len: usize) -> Self {
        self.config.short_query_max_len = len;
        self
    }

    pub fn build(self) -> Result<SearchConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for SearchConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
