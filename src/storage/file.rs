//! JSON-file-based storage backend.
//!
//! Stores the movement collection and the default-rate table in separate
//! JSON files under a configurable directory (default:
//! `$XDG_DATA_HOME/cashbook/`).

use std::fs;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::{LedgerError, Result};
use crate::models::{DefaultRates, Movement};

/// Application name used for the XDG data directory.
const APP_NAME: &str = "cashbook";

/// File name for the movement collection.
const MOVEMENTS_FILE: &str = "movements.json";
/// File name for the default-rate table.
const RATES_FILE: &str = "default_rates.json";
/// Sentinel file used for cross-process file locking.
const LOCK_FILE: &str = "storage.lock";

/// File-backed storage that persists the ledger as JSON files.
///
/// # Concurrency
///
/// Thread safety within a single process is provided by an in-process
/// [`Mutex`]. Cross-process safety is achieved via an advisory file lock
/// on `storage.lock` (using [`std::fs::File::lock`] /
/// [`std::fs::File::lock_shared`]).
///
/// Read operations acquire a shared lock, write operations an exclusive
/// one. Writes go to a `.tmp` sibling first and are renamed into place.
///
/// # File layout
///
/// ```text
/// <dir>/
///   storage.lock          (cross-process lock sentinel)
///   movements.json
///   default_rates.json
/// ```
#[derive(Debug)]
pub struct FileStorage {
    /// Root directory containing all JSON files.
    dir: PathBuf,
    /// Mutex serializing concurrent in-process access.
    lock: Mutex<()>,
    /// Sentinel file for cross-process advisory locking.
    lock_file: fs::File,
}

impl FileStorage {
    /// Creates a new file storage rooted at the given directory.
    ///
    /// Creates the directory (and parents) if it does not exist, and opens
    /// (or creates) the `storage.lock` sentinel.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the lock
    /// file cannot be opened.
    #[inline]
    pub fn new(dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&dir).map_err(LedgerError::storage)?;
        let lock_file = fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(dir.join(LOCK_FILE))
            .map_err(LedgerError::storage)?;
        tracing::debug!(dir = %dir.display(), "opened file storage");
        Ok(Self {
            dir,
            lock: Mutex::new(()),
            lock_file,
        })
    }

    /// Returns the default XDG-compliant data directory for this application.
    ///
    /// On Linux: `$XDG_DATA_HOME/cashbook/` (typically
    /// `~/.local/share/cashbook/`).
    ///
    /// # Errors
    ///
    /// Returns an error if the platform data directory cannot be determined.
    #[inline]
    pub fn default_dir() -> Result<PathBuf> {
        dirs::data_dir()
            .map(|data_path| data_path.join(APP_NAME))
            .ok_or_else(|| LedgerError::storage("could not determine platform data directory"))
    }

    /// Returns the full path for a given file name.
    fn path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    /// Runs `op` while holding the in-process mutex and the advisory lock
    /// on `storage.lock` in the given mode.
    fn locked<R>(&self, access: Access, op: impl FnOnce() -> Result<R>) -> Result<R> {
        let _guard: MutexGuard<'_, ()> = self.lock.lock().map_err(|poisoned| {
            LedgerError::storage(format!("file store poisoned: {poisoned}"))
        })?;
        match access {
            Access::Read => self.lock_file.lock_shared(),
            Access::Write => self.lock_file.lock(),
        }
        .map_err(LedgerError::storage)?;
        let outcome = op();
        let released = self.lock_file.unlock().map_err(LedgerError::storage);
        outcome.and_then(|value| released.map(|()| value))
    }

    /// Reads and deserializes a JSON file. Returns `Ok(None)` if the file
    /// does not exist.
    fn read_json<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>> {
        match fs::read_to_string(self.path(name)) {
            Ok(contents) => serde_json::from_str(&contents)
                .map(Some)
                .map_err(LedgerError::from),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(LedgerError::storage(err)),
        }
    }

    /// Atomically writes a serialized JSON file (write-to-tmp then rename).
    fn write_json<T: Serialize + ?Sized>(&self, name: &str, value: &T) -> Result<()> {
        let path = self.path(name);
        let tmp_path = self.path(&format!("{name}.tmp"));
        let json = serde_json::to_string_pretty(value).map_err(LedgerError::from)?;
        fs::write(&tmp_path, json).map_err(LedgerError::storage)?;
        fs::rename(&tmp_path, &path).map_err(LedgerError::storage)?;
        Ok(())
    }
}

/// Lock mode for a storage operation.
#[derive(Debug, Clone, Copy)]
enum Access {
    /// Shared lock, many readers.
    Read,
    /// Exclusive lock, one writer.
    Write,
}

impl super::MovementStore for FileStorage {
    #[inline]
    fn movements(&self) -> Result<Vec<Movement>> {
        self.locked(Access::Read, || Ok(self.read_json(MOVEMENTS_FILE)?.unwrap_or_default()))
    }

    #[inline]
    fn save_movements(&self, items: Vec<Movement>) -> Result<()> {
        tracing::debug!(count = items.len(), "writing movements");
        self.locked(Access::Write, || self.write_json(MOVEMENTS_FILE, &items))
    }

    #[inline]
    fn default_rates(&self) -> Result<Option<DefaultRates>> {
        self.locked(Access::Read, || self.read_json(RATES_FILE))
    }

    #[inline]
    fn save_default_rates(&self, rates: &DefaultRates) -> Result<()> {
        self.locked(Access::Write, || self.write_json(RATES_FILE, rates))
    }

    /// Deletes the data files. The `storage.lock` sentinel is preserved.
    #[inline]
    fn clear(&self) -> Result<()> {
        self.locked(Access::Write, || {
            for name in [MOVEMENTS_FILE, RATES_FILE] {
                match fs::remove_file(self.path(name)) {
                    Ok(()) => {}
                    Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
                    Err(err) => return Err(LedgerError::storage(err)),
                }
            }
            Ok(())
        })
    }
}
