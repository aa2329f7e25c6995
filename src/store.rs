// File: ./src/store.rs
/*! Document store capability and the saved-itinerary / saved-place records.

Collections are slash-separated paths (`users/{uid}/itineraries`,
`users/{uid}/saved`). `LocalStore` keeps one JSON file per collection under
the context's store directory and pushes a fresh snapshot to subscribers
after each write.
*/

use crate::context::AppContext;
use crate::planner::{PlannedItinerary, RawItinerary};
use crate::storage::LocalStorage;
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};
use tokio::sync::watch;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub data: Value,
}

impl Document {
    pub fn new(id: impl Into<String>, data: Value) -> Self {
        Self {
            id: id.into(),
            data,
        }
    }
}

pub trait DocumentStore: Send + Sync {
    /// Inserts or replaces `id` in `collection`.
    fn put(&self, collection: &str, id: &str, data: Value) -> Result<()>;
    fn get(&self, collection: &str, id: &str) -> Result<Option<Document>>;
    /// Returns true if a document was removed.
    fn delete(&self, collection: &str, id: &str) -> Result<bool>;
    /// Removes `id` if present, otherwise stores `data` under it, as one
    /// write. Returns true if the document is now present.
    fn toggle(&self, collection: &str, id: &str, data: Value) -> Result<bool>;
    /// Documents in insertion order.
    fn list(&self, collection: &str) -> Result<Vec<Document>>;
    /// Current snapshot now, then one per change.
    fn subscribe(&self, collection: &str) -> Result<watch::Receiver<Vec<Document>>>;
}

pub struct LocalStore {
    root: PathBuf,
    watchers: Mutex<HashMap<String, watch::Sender<Vec<Document>>>>,
}

impl LocalStore {
    pub fn open(ctx: &dyn AppContext) -> Result<Self> {
        Ok(Self {
            root: ctx.get_store_dir()?,
            watchers: Mutex::new(HashMap::new()),
        })
    }

    fn collection_path(&self, collection: &str) -> Result<PathBuf> {
        let segments: Vec<&str> = collection.split('/').collect();
        if segments
            .iter()
            .any(|s| s.is_empty() || *s == "." || *s == ".." || s.contains('\\'))
        {
            anyhow::bail!("Invalid collection path '{}'", collection);
        }
        let mut path = self.root.clone();
        if let Some((file, dirs)) = segments.split_last() {
            for s in dirs {
                path.push(s);
            }
            path.push(format!("{}.json", file));
        }
        Ok(path)
    }

    fn lock_watchers(&self) -> MutexGuard<'_, HashMap<String, watch::Sender<Vec<Document>>>> {
        match self.watchers.lock() {
            Ok(w) => w,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Read-modify-write of one collection. `f` reports whether it changed
    /// anything; subscribers get the written snapshot only then.
    fn modify<F>(&self, collection: &str, f: F) -> Result<bool>
    where
        F: FnOnce(&mut Vec<Document>) -> bool,
    {
        let path = self.collection_path(collection)?;
        // Held across the write so snapshots are published in write order.
        let watchers = self.lock_watchers();
        let mut changed = false;
        let docs = LocalStorage::update_collection(&path, |docs| changed = f(docs))?;
        if changed && let Some(tx) = watchers.get(collection) {
            tx.send_replace(docs);
        }
        Ok(changed)
    }
}

impl DocumentStore for LocalStore {
    fn put(&self, collection: &str, id: &str, data: Value) -> Result<()> {
        self.modify(collection, |docs| {
            match docs.iter_mut().find(|d| d.id == id) {
                Some(existing) => existing.data = data,
                None => docs.push(Document::new(id, data)),
            }
            true
        })?;
        log::debug!("Stored document {} in {}", id, collection);
        Ok(())
    }

    fn get(&self, collection: &str, id: &str) -> Result<Option<Document>> {
        let path = self.collection_path(collection)?;
        Ok(LocalStorage::load_collection(&path)?
            .into_iter()
            .find(|d| d.id == id))
    }

    fn delete(&self, collection: &str, id: &str) -> Result<bool> {
        let removed = self.modify(collection, |docs| {
            let before = docs.len();
            docs.retain(|d| d.id != id);
            docs.len() != before
        })?;
        if removed {
            log::debug!("Deleted document {} from {}", id, collection);
        }
        Ok(removed)
    }

    fn toggle(&self, collection: &str, id: &str, data: Value) -> Result<bool> {
        let mut present = false;
        self.modify(collection, |docs| {
            let before = docs.len();
            docs.retain(|d| d.id != id);
            if docs.len() == before {
                docs.push(Document::new(id, data));
                present = true;
            }
            true
        })?;
        log::debug!(
            "Toggled document {} in {} ({})",
            id,
            collection,
            if present { "added" } else { "removed" }
        );
        Ok(present)
    }

    fn list(&self, collection: &str) -> Result<Vec<Document>> {
        let path = self.collection_path(collection)?;
        LocalStorage::load_collection(&path)
    }

    fn subscribe(&self, collection: &str) -> Result<watch::Receiver<Vec<Document>>> {
        let mut watchers = self.lock_watchers();
        let current = self.list(collection)?;
        let tx = watchers
            .entry(collection.to_string())
            .or_insert_with(|| watch::channel(Vec::new()).0);
        tx.send_replace(current);
        Ok(tx.subscribe())
    }
}

// --- Saved itineraries ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedItinerary {
    pub name: String,
    pub content: RawItinerary,
    pub created_at: DateTime<Utc>,
}

pub fn itineraries_collection(uid: &str) -> String {
    format!("users/{}/itineraries", uid)
}

pub fn saved_collection(uid: &str) -> String {
    format!("users/{}/saved", uid)
}

/// Stores the raw response under a fresh id and returns that id.
pub fn save_itinerary(
    store: &dyn DocumentStore,
    uid: &str,
    planned: &PlannedItinerary,
) -> Result<String> {
    save_raw_itinerary(store, uid, &planned.name, planned.raw.clone())
}

pub fn save_raw_itinerary(
    store: &dyn DocumentStore,
    uid: &str,
    name: &str,
    content: RawItinerary,
) -> Result<String> {
    let id = uuid::Uuid::new_v4().to_string();
    let record = SavedItinerary {
        name: name.to_string(),
        content,
        created_at: Utc::now(),
    };
    store.put(&itineraries_collection(uid), &id, serde_json::to_value(&record)?)?;
    log::info!("Saved itinerary '{}' as {}", name, id);
    Ok(id)
}

pub fn list_itineraries(
    store: &dyn DocumentStore,
    uid: &str,
) -> Result<Vec<(String, SavedItinerary)>> {
    store
        .list(&itineraries_collection(uid))?
        .into_iter()
        .map(|doc| -> Result<(String, SavedItinerary)> {
            Ok((doc.id, serde_json::from_value(doc.data)?))
        })
        .collect()
}

// --- Saved places ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaceKind {
    #[default]
    Attraction,
    Dining,
    Accommodation,
    Itinerary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedPlace {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: PlaceKind,
    pub name: String,
    #[serde(default)]
    pub district: String,
    pub added_at: DateTime<Utc>,
}

impl SavedPlace {
    pub fn new(
        id: impl Into<String>,
        kind: PlaceKind,
        name: impl Into<String>,
        district: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            name: name.into(),
            district: district.into(),
            added_at: Utc::now(),
        }
    }
}

pub fn is_saved(store: &dyn DocumentStore, uid: &str, place_id: &str) -> Result<bool> {
    Ok(store.get(&saved_collection(uid), place_id)?.is_some())
}

/// Saves the place if absent, removes it if present. Returns the new state.
pub fn toggle_saved_place(
    store: &dyn DocumentStore,
    uid: &str,
    place: &SavedPlace,
) -> Result<bool> {
    store.toggle(&saved_collection(uid), &place.id, serde_json::to_value(place)?)
}

pub fn saved_places(store: &dyn DocumentStore, uid: &str) -> Result<Vec<SavedPlace>> {
    store
        .list(&saved_collection(uid))?
        .into_iter()
        .map(|doc| -> Result<SavedPlace> { Ok(serde_json::from_value(doc.data)?) })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::TestContext;
    use serde_json::json;

    #[test]
    fn test_put_replaces_in_place() {
        let ctx = TestContext::new();
        let store = LocalStore::open(&ctx).unwrap();
        store.put("trips", "a", json!(1)).unwrap();
        store.put("trips", "b", json!(2)).unwrap();
        store.put("trips", "a", json!(3)).unwrap();

        let docs = store.list("trips").unwrap();
        let ids: Vec<_> = docs.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(docs[0].data, json!(3));
    }

    #[test]
    fn test_rejects_bad_collection_paths() {
        let ctx = TestContext::new();
        let store = LocalStore::open(&ctx).unwrap();
        assert!(store.put("users//saved", "x", json!(null)).is_err());
        assert!(store.put("../escape", "x", json!(null)).is_err());
        assert!(store.list("").is_err());
    }

    #[test]
    fn test_subscribe_sees_changes() {
        let ctx = TestContext::new();
        let store = LocalStore::open(&ctx).unwrap();
        store.put("users/u/saved", "p1", json!({})).unwrap();

        let mut rx = store.subscribe("users/u/saved").unwrap();
        assert_eq!(rx.borrow_and_update().len(), 1);

        store.put("users/u/saved", "p2", json!({})).unwrap();
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().len(), 2);

        assert!(store.delete("users/u/saved", "p1").unwrap());
        assert_eq!(rx.borrow_and_update()[0].id, "p2");

        // Deleting a missing id is not a change.
        assert!(!store.delete("users/u/saved", "nope").unwrap());
        assert!(!rx.has_changed().unwrap());
    }

    #[test]
    fn test_toggle_is_single_write() {
        let ctx = TestContext::new();
        let store = LocalStore::open(&ctx).unwrap();
        let mut rx = store.subscribe("users/u/saved").unwrap();
        let _ = rx.borrow_and_update();

        assert!(store.toggle("users/u/saved", "p", json!({"n": 1})).unwrap());
        assert_eq!(rx.borrow_and_update().len(), 1);
        assert!(!store.toggle("users/u/saved", "p", json!({"n": 1})).unwrap());
        assert!(rx.borrow_and_update().is_empty());
    }

    #[test]
    fn test_concurrent_toggles_leave_one_state() {
        let ctx = TestContext::new();
        let store = LocalStore::open(&ctx).unwrap();
        // An even number of toggles from any interleaving ends absent.
        std::thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| store.toggle("users/u/saved", "p", json!({})).unwrap());
            }
        });
        assert!(store.list("users/u/saved").unwrap().is_empty());
    }

    #[test]
    fn test_concurrent_writers_publish_latest_snapshot() {
        let ctx = TestContext::new();
        let store = LocalStore::open(&ctx).unwrap();

        for round in 0..50 {
            let collection = format!("rounds/r{}", round);
            let rx = store.subscribe(&collection).unwrap();
            std::thread::scope(|s| {
                for writer in 0..8 {
                    let store = &store;
                    let collection = &collection;
                    s.spawn(move || {
                        store
                            .put(collection, &format!("w{}", writer), json!(writer))
                            .unwrap()
                    });
                }
            });

            let on_disk = store.list(&collection).unwrap();
            assert_eq!(on_disk.len(), 8);
            assert_eq!(*rx.borrow(), on_disk, "round {}", round);
        }
    }
}
