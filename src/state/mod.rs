pub mod factory;
pub mod sled_store;
pub mod store;

pub use factory::{create_in_memory_store, create_store};
pub use sled_store::SledStore;
pub use store::InMemoryStore;

use crate::auth::Credential;
use crate::error::Result;
use crate::models::{Song, SongList};
use async_trait::async_trait;
use uuid::Uuid;

/// Persistence for songs, lists and the admin credential
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Insert a new song
    async fn save_song(&self, song: &Song) -> Result<()>;

    /// Get a song by ID
    async fn get_song(&self, id: &Uuid) -> Result<Option<Song>>;

    /// Replace an existing song
    async fn update_song(&self, song: &Song) -> Result<()>;

    /// Delete a song and drop it from every list that references it
    async fn delete_song(&self, id: &Uuid) -> Result<()>;

    /// All songs, in no particular order
    async fn list_songs(&self) -> Result<Vec<Song>>;

    /// Insert a new list
    async fn save_list(&self, list: &SongList) -> Result<()>;

    /// Get a list by ID
    async fn get_list(&self, id: &Uuid) -> Result<Option<SongList>>;

    /// Replace an existing list
    async fn update_list(&self, list: &SongList) -> Result<()>;

    /// Delete a list; member songs are kept
    async fn delete_list(&self, id: &Uuid) -> Result<()>;

    /// All lists, in no particular order
    async fn list_lists(&self) -> Result<Vec<SongList>>;

    /// The stored admin credential, if one was ever saved
    async fn get_credential(&self) -> Result<Option<Credential>>;

    /// Overwrite the admin credential
    async fn save_credential(&self, credential: &Credential) -> Result<()>;

    /// Songs for `ids` in the given order; unknown ids are skipped
    async fn get_songs(&self, ids: &[Uuid]) -> Result<Vec<Song>> {
        let mut songs = Vec::with_capacity(ids.len());
        for id in ids {
            if let Some(song) = self.get_song(id).await? {
                songs.push(song);
            }
        }
        Ok(songs)
    }
}

/// Store `initial_password` as a plain credential when none exists yet.
///
/// Returns whether a credential was written.
pub async fn seed_credential(store: &dyn CatalogStore, initial_password: Option<&str>) -> Result<bool> {
    if store.get_credential().await?.is_some() {
        return Ok(false);
    }

    match initial_password.filter(|password| !password.is_empty()) {
        Some(password) => {
            store.save_credential(&Credential::plain(password)).await?;
            tracing::warn!("Seeded plain-text admin credential; it is hashed on first login");
            Ok(true)
        }
        None => {
            tracing::warn!("No admin credential stored and none configured; admin login disabled");
            Ok(false)
        }
    }
}
