//! Key-value blob storage for LEA
//!
//! The engine treats storage as an opaque collaborator: it saves and loads
//! text blobs by key. Two implementations are provided:
//!
//! - `MemoryStorage` - in-process map, used by tests and ephemeral sessions
//! - `FileStorage` - one file per key under a data directory (`~/.lea/` by default)
//!
//! ## Storage Layout
//!
//! - `lea_session.json` - live session (2.0 export document)
//! - `lea_versions.json` - version history log
//! - `.lock` - exclusive writer lock for the engagement directory

use fs2::FileExt;
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use crate::error::{DiscoveryError, DiscoveryResult};

/// Storage key of the live session blob
pub const SESSION_KEY: &str = "lea_session";

/// Storage key of the version history blob
pub const VERSIONS_KEY: &str = "lea_versions";

/// Text blob store addressed by key
pub trait SessionStorage {
    /// Load the blob stored under `key`, if any
    fn load(&self, key: &str) -> DiscoveryResult<Option<String>>;

    /// Store `text` under `key`, replacing any previous blob
    fn save(&mut self, key: &str, text: &str) -> DiscoveryResult<()>;

    /// Store several blobs as one write
    fn save_all(&mut self, blobs: &[(&str, String)]) -> DiscoveryResult<()> {
        for (key, text) in blobs {
            self.save(key, text)?;
        }
        Ok(())
    }
}

/// In-memory storage
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    blobs: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStorage for MemoryStorage {
    fn load(&self, key: &str) -> DiscoveryResult<Option<String>> {
        Ok(self.blobs.get(key).cloned())
    }

    fn save(&mut self, key: &str, text: &str) -> DiscoveryResult<()> {
        self.blobs.insert(key.to_string(), text.to_string());
        Ok(())
    }
}

/// File-backed storage rooted at one engagement directory
#[derive(Debug, Clone)]
pub struct FileStorage {
    root: PathBuf,
}

impl FileStorage {
    /// Open (and create if needed) a storage directory
    pub fn open(root: &Path) -> DiscoveryResult<Self> {
        ensure_dir(root)?;
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    /// Get the default global data directory (`~/.lea`)
    pub fn default_dir() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".lea")
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let safe_key: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        self.root.join(format!("{}.json", safe_key))
    }

    fn lock_file(&self) -> DiscoveryResult<File> {
        let lock_path = self.root.join(".lock");
        OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&lock_path)
            .map_err(|e| {
                DiscoveryError::storage(format!("Failed to open lock file {:?}: {}", lock_path, e))
            })
    }

    /// Caller holds the lock
    fn write_locked(&self, blobs: &[(&str, String)]) -> DiscoveryResult<()> {
        let mut staged = Vec::with_capacity(blobs.len());
        for (key, text) in blobs {
            let path = self.path_for(key);
            let temp_path = path.with_extension("tmp");
            if let Err(e) = fs::write(&temp_path, text) {
                for (temp, _) in &staged {
                    if let Err(e) = fs::remove_file(temp) {
                        log::debug!("Failed to remove temp file {:?}: {}", temp, e);
                    }
                }
                return Err(DiscoveryError::storage(format!(
                    "Failed to write temp file {:?}: {}",
                    temp_path, e
                )));
            }
            staged.push((temp_path, path));
        }

        for ((temp_path, path), (key, text)) in staged.iter().zip(blobs) {
            fs::rename(temp_path, path).map_err(|e| {
                DiscoveryError::storage(format!(
                    "Failed to rename {:?} to {:?}: {}",
                    temp_path, path, e
                ))
            })?;
            log::debug!("Saved {} ({} bytes) to {:?}", key, text.len(), path);
        }
        Ok(())
    }
}

impl SessionStorage for FileStorage {
    fn load(&self, key: &str) -> DiscoveryResult<Option<String>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }

        fs::read_to_string(&path)
            .map(Some)
            .map_err(|e| DiscoveryError::storage(format!("Failed to read file {:?}: {}", path, e)))
    }

    fn save(&mut self, key: &str, text: &str) -> DiscoveryResult<()> {
        self.save_all(&[(key, text.to_string())])
    }

    /// Every blob goes to a temp file before any is renamed into place, all
    /// under one exclusive lock
    fn save_all(&mut self, blobs: &[(&str, String)]) -> DiscoveryResult<()> {
        let lock = self.lock_file()?;
        lock.lock_exclusive()
            .map_err(|e| DiscoveryError::storage(format!("Failed to lock storage: {}", e)))?;

        let result = self.write_locked(blobs);

        if let Err(e) = lock.unlock() {
            log::warn!("Failed to release storage lock: {}", e);
        }
        result
    }
}

/// Ensure a directory exists, creating it if necessary
pub fn ensure_dir(path: &Path) -> DiscoveryResult<()> {
    if !path.exists() {
        fs::create_dir_all(path).map_err(|e| {
            DiscoveryError::storage(format!("Failed to create directory {:?}: {}", path, e))
        })?;
    }
    Ok(())
}
