//! Admin sessions: opaque bearer tokens that expire after a fixed TTL

use chrono::{DateTime, Utc};
use moka::future::Cache;
use serde::Serialize;
use std::time::Duration;
use uuid::Uuid;

/// A logged-in admin
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub token: String,
    pub client_id: String,
    pub created_at: DateTime<Utc>,
}

/// Bearer-token sessions with a fixed time to live, backed by Moka
#[derive(Clone)]
pub struct SessionStore {
    cache: Cache<String, Session>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(max_capacity: u64, ttl: Duration) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(ttl)
            .build();

        Self { cache, ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub async fn create(&self, client_id: &str) -> Session {
        let session = Session {
            token: Uuid::new_v4().simple().to_string(),
            client_id: client_id.to_string(),
            created_at: Utc::now(),
        };

        self.cache
            .insert(session.token.clone(), session.clone())
            .await;
        session
    }

    pub async fn get(&self, token: &str) -> Option<Session> {
        self.cache.get(token).await
    }

    pub async fn revoke(&self, token: &str) {
        self.cache.invalidate(token).await;
    }

    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }
}
