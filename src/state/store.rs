use crate::auth::Credential;
use crate::error::{AppError, Result};
use crate::models::{Song, SongList};
use crate::state::CatalogStore;
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// In-memory catalog store (for development and testing)
#[derive(Clone)]
pub struct InMemoryStore {
    songs: Arc<DashMap<Uuid, Song>>,
    lists: Arc<DashMap<Uuid, SongList>>,
    credential: Arc<RwLock<Option<Credential>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            songs: Arc::new(DashMap::new()),
            lists: Arc::new(DashMap::new()),
            credential: Arc::new(RwLock::new(None)),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CatalogStore for InMemoryStore {
    async fn save_song(&self, song: &Song) -> Result<()> {
        self.songs.insert(song.id, song.clone());
        tracing::debug!(song_id = %song.id, "Song saved");
        Ok(())
    }

    async fn get_song(&self, id: &Uuid) -> Result<Option<Song>> {
        Ok(self.songs.get(id).map(|entry| entry.clone()))
    }

    async fn update_song(&self, song: &Song) -> Result<()> {
        match self.songs.get_mut(&song.id) {
            Some(mut entry) => {
                *entry = song.clone();
                tracing::debug!(song_id = %song.id, "Song updated");
                Ok(())
            }
            None => Err(AppError::NotFound(format!("Song {} not found", song.id))),
        }
    }

    async fn delete_song(&self, id: &Uuid) -> Result<()> {
        if self.songs.remove(id).is_none() {
            return Err(AppError::NotFound(format!("Song {} not found", id)));
        }

        for mut list in self.lists.iter_mut() {
            list.remove_song(id);
        }

        tracing::debug!(song_id = %id, "Song deleted");
        Ok(())
    }

    async fn list_songs(&self) -> Result<Vec<Song>> {
        Ok(self.songs.iter().map(|entry| entry.value().clone()).collect())
    }

    async fn save_list(&self, list: &SongList) -> Result<()> {
        self.lists.insert(list.id, list.clone());
        tracing::debug!(list_id = %list.id, "List saved");
        Ok(())
    }

    async fn get_list(&self, id: &Uuid) -> Result<Option<SongList>> {
        Ok(self.lists.get(id).map(|entry| entry.clone()))
    }

    async fn update_list(&self, list: &SongList) -> Result<()> {
        match self.lists.get_mut(&list.id) {
            Some(mut entry) => {
                *entry = list.clone();
                tracing::debug!(list_id = %list.id, "List updated");
                Ok(())
            }
            None => Err(AppError::NotFound(format!("List {} not found", list.id))),
        }
    }

    async fn delete_list(&self, id: &Uuid) -> Result<()> {
        if self.lists.remove(id).is_some() {
            tracing::debug!(list_id = %id, "List deleted");
            Ok(())
        } else {
            Err(AppError::NotFound(format!("List {} not found", id)))
        }
    }

    async fn list_lists(&self) -> Result<Vec<SongList>> {
        Ok(self.lists.iter().map(|entry| entry.value().clone()).collect())
    }

    async fn get_credential(&self) -> Result<Option<Credential>> {
        Ok(self.credential.read().await.clone())
    }

    async fn save_credential(&self, credential: &Credential) -> Result<()> {
        *self.credential.write().await = Some(credential.clone());
        tracing::debug!(hashed = credential.is_hashed(), "Admin credential saved");
        Ok(())
    }
}
