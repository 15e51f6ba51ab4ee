//! Whole-state persistence
//!
//! Wallet and pending-broadcast state are always read completely, mutated in
//! memory and written back completely. [`JsonFileStore`] writes through a
//! temporary sibling file and a rename so readers never observe a partial
//! file; [`MemoryStore`] backs tests and dry runs.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

use crate::errors::{io_context, AppError, AppResult};

/// Load-entire / persist-entire state holder
pub trait StateStore<T>: Send + Sync {
    /// Current state, `None` when nothing has been persisted
    fn load(&self) -> AppResult<Option<T>>;

    /// Replace the persisted state
    fn save(&self, state: &T) -> AppResult<()>;

    /// Remove the persisted state; clearing an empty store is not an error
    fn clear(&self) -> AppResult<()>;

    /// Human-readable location for messages
    fn location(&self) -> String;

    fn exists(&self) -> AppResult<bool> {
        Ok(self.load()?.is_some())
    }
}

/// JSON file with atomic whole-file overwrite
pub struct JsonFileStore<T> {
    path: PathBuf,
    pretty: bool,
    _state: PhantomData<fn() -> T>,
}

impl<T> JsonFileStore<T> {
    /// Compact JSON, as used for the pending queue
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            pretty: false,
            _state: PhantomData,
        }
    }

    /// Two-space indented JSON, as used for the wallet file
    pub fn pretty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            pretty: true,
            _state: PhantomData,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl<T> StateStore<T> for JsonFileStore<T>
where
    T: Serialize + DeserializeOwned,
{
    fn load(&self) -> AppResult<Option<T>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(io_context(e, &self.path)),
        };
        let state = serde_json::from_slice(&bytes).map_err(|e| {
            AppError::InvalidData(format!("{}: {}", self.path.display(), e))
        })?;
        Ok(Some(state))
    }

    fn save(&self, state: &T) -> AppResult<()> {
        let bytes = if self.pretty {
            serde_json::to_vec_pretty(state)?
        } else {
            serde_json::to_vec(state)?
        };

        let temp = self.temp_path();
        fs::write(&temp, bytes).map_err(|e| io_context(e, &temp))?;
        fs::rename(&temp, &self.path).map_err(|e| io_context(e, &self.path))?;
        debug!("Persisted state to {}", self.path.display());
        Ok(())
    }

    fn clear(&self) -> AppResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_context(e, &self.path)),
        }
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }

    fn exists(&self) -> AppResult<bool> {
        Ok(self.path.exists())
    }
}

/// In-process store
pub struct MemoryStore<T> {
    state: Mutex<Option<T>>,
}

impl<T> MemoryStore<T> {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(None),
        }
    }

    pub fn with_state(state: T) -> Self {
        Self {
            state: Mutex::new(Some(state)),
        }
    }
}

impl<T> Default for MemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> StateStore<T> for MemoryStore<T>
where
    T: Clone + Send,
{
    fn load(&self) -> AppResult<Option<T>> {
        Ok(self.lock()?.clone())
    }

    fn save(&self, state: &T) -> AppResult<()> {
        *self.lock()? = Some(state.clone());
        Ok(())
    }

    fn clear(&self) -> AppResult<()> {
        *self.lock()? = None;
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}

impl<T> MemoryStore<T> {
    fn lock(&self) -> AppResult<std::sync::MutexGuard<'_, Option<T>>> {
        self.state
            .lock()
            .map_err(|_| AppError::InvalidData("memory store lock poisoned".to_string()))
    }
}
