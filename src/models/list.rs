use crate::search::Searchable;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A named collection of songs, such as a service order or a songbook
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SongList {
    /// Unique identifier
    pub id: Uuid,

    /// Display name
    pub name: String,

    /// Optional description
    #[serde(default)]
    pub description: Option<String>,

    /// Member songs in their curated order
    #[serde(default)]
    pub song_ids: Vec<Uuid>,

    /// Show members in `song_ids` order instead of alphabetically when
    /// no search is active
    #[serde(default)]
    pub custom_order: bool,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl SongList {
    /// Create a new list
    pub fn new(
        name: String,
        description: Option<String>,
        song_ids: Vec<Uuid>,
        custom_order: bool,
    ) -> Self {
        let now = Utc::now();

        Self {
            id: Uuid::new_v4(),
            name,
            description,
            song_ids: dedup_preserving_order(song_ids),
            custom_order,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace the editable fields, keeping id and creation time
    pub fn update(
        &mut self,
        name: String,
        description: Option<String>,
        song_ids: Vec<Uuid>,
        custom_order: bool,
    ) {
        self.name = name;
        self.description = description;
        self.song_ids = dedup_preserving_order(song_ids);
        self.custom_order = custom_order;
        self.updated_at = Utc::now();
    }

    /// Drop `song_id` from the list; returns whether it was a member
    pub fn remove_song(&mut self, song_id: &Uuid) -> bool {
        let before = self.song_ids.len();
        self.song_ids.retain(|id| id != song_id);

        if self.song_ids.len() != before {
            self.updated_at = Utc::now();
            true
        } else {
            false
        }
    }
}

impl Searchable for SongList {
    fn title(&self) -> &str {
        &self.name
    }
}

fn dedup_preserving_order(ids: Vec<Uuid>) -> Vec<Uuid> {
    let mut seen = std::collections::HashSet::with_capacity(ids.len());
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_members_collapse() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let list = SongList::new("Sunday".to_string(), None, vec![a, b, a], true);

        assert_eq!(list.song_ids, vec![a, b]);
    }

    #[test]
    fn test_remove_song() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let mut list = SongList::new("Sunday".to_string(), None, vec![a, b], false);

        assert!(list.remove_song(&a));
        assert!(!list.remove_song(&a));
        assert_eq!(list.song_ids, vec![b]);
    }

    #[test]
    fn test_list_sorts_by_name() {
        let list = SongList::new("The Evening Set".to_string(), None, Vec::new(), false);
        assert_eq!(crate::search::sort_key(&list.name), "evening set");
        assert_eq!(Searchable::lyrics(&list), "");
    }
}
