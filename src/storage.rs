// Manages the on-disk files behind the local document store.
//
// ⚠️ VERSION BUMP REQUIRED:
// Changes to the `Document` wrapper or to the saved record types in store.rs
// require incrementing STORE_FILE_VERSION below.
use crate::store::Document;
use anyhow::{Context, Result};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

// Version history:
// - v1: Flat list of {id, data} documents per collection file
const STORE_FILE_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct CollectionFile {
    #[serde(default)]
    version: u32,
    documents: Vec<Document>,
}

pub struct LocalStorage;

impl LocalStorage {
    fn get_lock_path(file_path: &Path) -> PathBuf {
        let mut lock_path = file_path.to_path_buf();
        if let Some(ext) = lock_path.extension() {
            let mut new_ext = ext.to_os_string();
            new_ext.push(".lock");
            lock_path.set_extension(new_ext);
        } else {
            lock_path.set_extension("lock");
        }
        lock_path
    }

    /// Runs `f` while holding an exclusive lock on `<file>.lock`.
    pub fn with_lock<F, T>(file_path: &Path, f: F) -> Result<T>
    where
        F: FnOnce() -> Result<T>,
    {
        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {:?}", parent))?;
        }
        let lock_path = Self::get_lock_path(file_path);
        let file = fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)?;

        file.lock_exclusive()?;
        let result = f();
        file.unlock()?;
        result
    }

    /// Atomic write: Write to .tmp file then rename
    pub fn atomic_write<P: AsRef<Path>, C: AsRef<[u8]>>(path: P, contents: C) -> Result<()> {
        let path = path.as_ref();
        let tmp_path = path.with_extension("tmp");
        fs::write(&tmp_path, contents)?;
        fs::rename(tmp_path, path)?;
        Ok(())
    }

    /// Reads a collection file without locking. Missing files are empty.
    fn read_unlocked(path: &Path) -> Result<Vec<Document>> {
        if !path.exists() {
            return Ok(Vec::new());
        }
        let json = fs::read_to_string(path)
            .with_context(|| format!("Failed to read collection file '{}'", path.display()))?;
        let data: CollectionFile = serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse collection file '{}'", path.display()))?;
        if data.version > STORE_FILE_VERSION {
            anyhow::bail!(
                "Collection file '{}' has version {}, newer than supported v{}",
                path.display(),
                data.version,
                STORE_FILE_VERSION
            );
        }
        Ok(data.documents)
    }

    fn write_unlocked(path: &Path, documents: Vec<Document>) -> Result<()> {
        let data = CollectionFile {
            version: STORE_FILE_VERSION,
            documents,
        };
        let json = serde_json::to_string_pretty(&data)?;
        Self::atomic_write(path, json)
    }

    pub fn load_collection(path: &Path) -> Result<Vec<Document>> {
        Self::with_lock(path, || Self::read_unlocked(path))
    }

    /// Read-modify-write under a single lock. Returns the documents as written.
    pub fn update_collection<F>(path: &Path, f: F) -> Result<Vec<Document>>
    where
        F: FnOnce(&mut Vec<Document>),
    {
        Self::with_lock(path, || {
            let mut docs = Self::read_unlocked(path)?;
            f(&mut docs);
            Self::write_unlocked(path, docs.clone())?;
            Ok(docs)
        })
    }
}
