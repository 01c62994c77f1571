use std::cell::RefCell;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::core::{EngineError, EngineResult};

/// String key-value storage that survives page reloads, scoped to one origin.
pub trait PersistenceStore {
    fn get(&self, key: &str) -> EngineResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> EngineResult<()>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RefCell<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(key: &str, value: &str) -> Self {
        let store = Self::new();
        store.values.borrow_mut().insert(key.to_string(), value.to_string());
        store
    }
}

impl PersistenceStore for MemoryStore {
    fn get(&self, key: &str) -> EngineResult<Option<String>> {
        Ok(self.values.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> EngineResult<()> {
        self.values.borrow_mut().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// One JSON document per origin under the user's data directory.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    values: RefCell<BTreeMap<String, String>>,
}

impl JsonFileStore {
    pub fn for_origin(origin: &str) -> EngineResult<Self> {
        let file_name: String = origin
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' { c } else { '_' })
            .collect();
        let path = dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("player-enhance")
            .join(format!("{}.json", file_name));
        Self::open(&path)
    }

    pub fn open(path: &Path) -> EngineResult<Self> {
        let values = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            match serde_json::from_str::<BTreeMap<String, String>>(&content) {
                Ok(values) => values,
                Err(e) => {
                    log::warn!("Store file {} is malformed ({}), starting empty", path.display(), e);
                    BTreeMap::new()
                }
            }
        } else {
            BTreeMap::new()
        };

        log::debug!("Opened store {} with {} keys", path.display(), values.len());
        Ok(Self {
            path: path.to_path_buf(),
            values: RefCell::new(values),
        })
    }

    fn flush(&self, key: &str) -> EngineResult<()> {
        let write = || -> EngineResult<()> {
            if let Some(parent) = self.path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let content = serde_json::to_string_pretty(&*self.values.borrow())?;
            std::fs::write(&self.path, content)?;
            Ok(())
        };
        write().map_err(|e| EngineError::PersistenceWrite {
            key: key.to_string(),
            reason: e.to_string(),
        })
    }
}

impl PersistenceStore for JsonFileStore {
    fn get(&self, key: &str) -> EngineResult<Option<String>> {
        Ok(self.values.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> EngineResult<()> {
        self.values.borrow_mut().insert(key.to_string(), value.to_string());
        self.flush(key)
    }
}
