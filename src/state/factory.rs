use crate::config::{StorageBackend, StorageConfig};
use crate::error::{AppError, Result};
use crate::state::{CatalogStore, InMemoryStore, SledStore};
use std::sync::Arc;

/// Create a catalog store based on configuration
pub fn create_store(config: &StorageConfig) -> Result<Arc<dyn CatalogStore>> {
    match config.backend {
        StorageBackend::Sled => {
            let path = config.path.as_ref().ok_or_else(|| {
                AppError::Configuration("Sled backend requires 'path' configuration".to_string())
            })?;

            tracing::info!(path = ?path, "Initializing Sled storage backend");

            let store = SledStore::new(path)?;
            Ok(Arc::new(store))
        }

        StorageBackend::Memory => Ok(create_in_memory_store()),
    }
}

/// Create an in-memory store (for testing)
pub fn create_in_memory_store() -> Arc<dyn CatalogStore> {
    tracing::info!("Initializing in-memory storage backend");
    Arc::new(InMemoryStore::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_create_memory_store() {
        assert!(create_store(&StorageConfig::default()).is_ok());
    }

    #[test]
    fn test_sled_without_path() {
        let config = StorageConfig {
            backend: StorageBackend::Sled,
            path: None,
        };
        assert!(matches!(create_store(&config), Err(AppError::Configuration(_))));
    }

    #[tokio::test]
    async fn test_create_sled_store() {
        let dir = TempDir::new().unwrap();
        let config = StorageConfig {
            backend: StorageBackend::Sled,
            path: Some(dir.path().to_path_buf()),
        };

        let store = create_store(&config).unwrap();
        assert!(store.list_songs().await.unwrap().is_empty());
    }
}
