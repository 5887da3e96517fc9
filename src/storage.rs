//! Key-value storage backends.
//!
//! Two flavors mirror the browser storage areas the remote contract assumes:
//! - [`DurableStore`] keeps one file per key under the platform data
//!   directory and survives restarts (login identity lives here).
//! - [`EphemeralStore`] is an in-memory map scoped to the running process
//!   (guest conversations live here and vanish on exit).

use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::{fs, path::PathBuf};

pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<(), String>;
    fn delete(&self, key: &str) -> Result<(), String>;
    fn keys(&self) -> Vec<String>;
}

/// File-backed store, one `<key>.json` per entry.
pub struct DurableStore {
    dir: PathBuf,
}

impl DurableStore {
    pub fn new(namespace: &str) -> Self {
        let safe = sanitize_key(namespace);
        let dir = match dirs::data_local_dir() {
            Some(data_dir) => data_dir.join("youth-compass").join(safe),
            None => PathBuf::from("cache").join(safe),
        };
        Self { dir }
    }

    /// Store rooted at an explicit directory.
    pub fn with_dir(dir: PathBuf) -> Self {
        Self { dir }
    }

    fn file_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", sanitize_key(key)))
    }
}

impl KeyValueStore for DurableStore {
    fn get(&self, key: &str) -> Option<String> {
        fs::read_to_string(self.file_path(key)).ok()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), String> {
        fs::create_dir_all(&self.dir)
            .map_err(|e| format!("failed to create storage directory: {}", e))?;
        fs::write(self.file_path(key), value).map_err(|e| format!("failed to write storage: {}", e))
    }

    fn delete(&self, key: &str) -> Result<(), String> {
        let path = self.file_path(key);
        if path.exists() {
            fs::remove_file(path).map_err(|e| format!("failed to delete from storage: {}", e))?;
        }
        Ok(())
    }

    fn keys(&self) -> Vec<String> {
        let Ok(entries) = fs::read_dir(&self.dir) else {
            return Vec::new();
        };
        entries
            .flatten()
            .filter_map(|entry| {
                let path = entry.path();
                if path.extension().and_then(|e| e.to_str()) == Some("json") {
                    path.file_stem().and_then(|s| s.to_str()).map(String::from)
                } else {
                    None
                }
            })
            .collect()
    }
}

/// In-memory store, dropped with the process.
#[derive(Default)]
pub struct EphemeralStore {
    entries: Mutex<HashMap<String, String>>,
}

impl KeyValueStore for EphemeralStore {
    fn get(&self, key: &str) -> Option<String> {
        let entries = self.entries.lock().expect("ephemeral store poisoned");
        entries.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), String> {
        let mut entries = self.entries.lock().map_err(|e| e.to_string())?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), String> {
        let mut entries = self.entries.lock().map_err(|e| e.to_string())?;
        entries.remove(key);
        Ok(())
    }

    fn keys(&self) -> Vec<String> {
        let entries = self.entries.lock().expect("ephemeral store poisoned");
        entries.keys().cloned().collect()
    }
}

static TAB_STORE: Lazy<Arc<EphemeralStore>> = Lazy::new(|| Arc::new(EphemeralStore::default()));

/// The process-wide ephemeral area, shared by everything that mimics
/// per-tab session storage.
pub fn tab_store() -> Arc<EphemeralStore> {
    TAB_STORE.clone()
}

/// Keep keys filesystem-safe.
fn sanitize_key(key: &str) -> String {
    key.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .take(64)
        .collect()
}
