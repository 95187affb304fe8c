use crate::auth::Credential;
use crate::error::{AppError, Result};
use crate::models::{Song, SongList};
use crate::state::CatalogStore;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use sled::{Db, Tree};
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

const CREDENTIAL_KEY: &[u8] = b"credential";

/// Persistent catalog store using the Sled embedded database
#[derive(Clone)]
pub struct SledStore {
    db: Arc<Db>,
    songs_tree: Tree,
    lists_tree: Tree,
    admin_tree: Tree,
}

impl SledStore {
    /// Open (or create) a store at the specified path
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let db = sled::open(path).map_err(|e| {
            AppError::Database(format!("Failed to open Sled database: {}", e))
        })?;

        let songs_tree = db.open_tree("songs")?;
        let lists_tree = db.open_tree("lists")?;
        let admin_tree = db.open_tree("admin")?;

        tracing::info!("Initialized Sled store at {:?}", path);

        Ok(Self {
            db: Arc::new(db),
            songs_tree,
            lists_tree,
            admin_tree,
        })
    }

    fn key(id: &Uuid) -> [u8; 16] {
        *id.as_bytes()
    }

    fn get<T: DeserializeOwned>(tree: &Tree, id: &Uuid) -> Result<Option<T>> {
        match tree.get(Self::key(id))? {
            Some(bytes) => Ok(Some(bincode::deserialize(&bytes)?)),
            None => Ok(None),
        }
    }

    fn put<T: Serialize>(tree: &Tree, id: &Uuid, value: &T) -> Result<()> {
        tree.insert(Self::key(id), bincode::serialize(value)?)?;
        Ok(())
    }

    fn all<T: DeserializeOwned>(tree: &Tree) -> Result<Vec<T>> {
        tree.iter()
            .values()
            .map(|bytes| -> Result<T> { Ok(bincode::deserialize(&bytes?)?) })
            .collect()
    }

    /// Flush pending writes to disk
    pub async fn flush(&self) -> Result<()> {
        self.db.flush_async().await?;
        Ok(())
    }
}

#[async_trait]
impl CatalogStore for SledStore {
    async fn save_song(&self, song: &Song) -> Result<()> {
        Self::put(&self.songs_tree, &song.id, song)?;
        tracing::debug!(song_id = %song.id, "Song saved");
        Ok(())
    }

    async fn get_song(&self, id: &Uuid) -> Result<Option<Song>> {
        Self::get(&self.songs_tree, id)
    }

    async fn update_song(&self, song: &Song) -> Result<()> {
        if !self.songs_tree.contains_key(Self::key(&song.id))? {
            return Err(AppError::NotFound(format!("Song {} not found", song.id)));
        }

        Self::put(&self.songs_tree, &song.id, song)?;
        tracing::debug!(song_id = %song.id, "Song updated");
        Ok(())
    }

    async fn delete_song(&self, id: &Uuid) -> Result<()> {
        if self.songs_tree.remove(Self::key(id))?.is_none() {
            return Err(AppError::NotFound(format!("Song {} not found", id)));
        }

        for mut list in Self::all::<SongList>(&self.lists_tree)? {
            if list.remove_song(id) {
                Self::put(&self.lists_tree, &list.id, &list)?;
            }
        }

        tracing::debug!(song_id = %id, "Song deleted");
        Ok(())
    }

    async fn list_songs(&self) -> Result<Vec<Song>> {
        Self::all(&self.songs_tree)
    }

    async fn save_list(&self, list: &SongList) -> Result<()> {
        Self::put(&self.lists_tree, &list.id, list)?;
        tracing::debug!(list_id = %list.id, "List saved");
        Ok(())
    }

    async fn get_list(&self, id: &Uuid) -> Result<Option<SongList>> {
        Self::get(&self.lists_tree, id)
    }

    async fn update_list(&self, list: &SongList) -> Result<()> {
        if !self.lists_tree.contains_key(Self::key(&list.id))? {
            return Err(AppError::NotFound(format!("List {} not found", list.id)));
        }

        Self::put(&self.lists_tree, &list.id, list)?;
        tracing::debug!(list_id = %list.id, "List updated");
        Ok(())
    }

    async fn delete_list(&self, id: &Uuid) -> Result<()> {
        if self.lists_tree.remove(Self::key(id))?.is_some() {
            tracing::debug!(list_id = %id, "List deleted");
            Ok(())
        } else {
            Err(AppError::NotFound(format!("List {} not found", id)))
        }
    }

    async fn list_lists(&self) -> Result<Vec<SongList>> {
        Self::all(&self.lists_tree)
    }

    async fn get_credential(&self) -> Result<Option<Credential>> {
        // JSON rather than bincode: the optional salt is omitted when absent
        match self.admin_tree.get(CREDENTIAL_KEY)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn save_credential(&self, credential: &Credential) -> Result<()> {
        self.admin_tree
            .insert(CREDENTIAL_KEY, serde_json::to_vec(credential)?)?;
        self.flush().await?;
        tracing::debug!(hashed = credential.is_hashed(), "Admin credential saved");
        Ok(())
    }
}
