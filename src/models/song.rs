use crate::search::Searchable;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A song in the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Song {
    /// Unique identifier
    pub id: Uuid,

    /// Display title
    pub title: String,

    /// Full lyrics text; may be empty
    #[serde(default)]
    pub lyrics: String,

    /// Author or composer
    #[serde(default)]
    pub author: Option<String>,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Song {
    /// Create a new song
    pub fn new(title: String, lyrics: String, author: Option<String>) -> Self {
        let now = Utc::now();

        Self {
            id: Uuid::new_v4(),
            title,
            lyrics,
            author,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace the editable fields, keeping id and creation time
    pub fn update(&mut self, title: String, lyrics: String, author: Option<String>) {
        self.title = title;
        self.lyrics = lyrics;
        self.author = author;
        self.updated_at = Utc::now();
    }
}

impl Searchable for Song {
    fn title(&self) -> &str {
        &self.title
    }

    fn lyrics(&self) -> &str {
        &self.lyrics
    }
}
