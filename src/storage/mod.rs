//! Whole-snapshot persistence.
//!
//! A [`Store`] owns one snapshot file and one exclusive section. Every
//! operation, read or write, takes the section, loads the full snapshot from
//! disk, works on it in memory and (for writes) rewrites the whole file before
//! releasing the section. Nothing is cached between operations.
//!
//! By default the file is overwritten in place, so a crash between truncate
//! and write can leave it empty or corrupt. [`StoreOptions::atomic_replace`]
//! writes a sibling temp file and renames it over the snapshot instead.

mod snapshot;

pub use snapshot::Snapshot;

use crate::errors::StorageError;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use tempfile::NamedTempFile;
use tracing::debug;

#[derive(Debug, Clone, Copy, Default)]
pub struct StoreOptions {
    /// Persist through write-temp-then-rename instead of truncating in place.
    pub atomic_replace: bool,
}

#[derive(Debug)]
pub struct Store {
    path: PathBuf,
    options: StoreOptions,
    section: Mutex<()>,
}

impl Store {
    /// Open the snapshot at `path`, creating an empty file (and its parent
    /// directory) if nothing is there yet. Existing content is left alone.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        Self::open_with(path, StoreOptions::default())
    }

    pub fn open_with(path: impl Into<PathBuf>, options: StoreOptions) -> Result<Self, StorageError> {
        let path = path.into();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        OpenOptions::new().create(true).append(true).open(&path)?;

        debug!(path = %path.display(), atomic_replace = options.atomic_replace, "snapshot store opened");

        Ok(Self {
            path,
            options,
            section: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run `mutator` against a freshly loaded snapshot and, if it succeeds,
    /// write the whole snapshot back. On error nothing is written.
    pub fn with_snapshot<T, E, F>(&self, mutator: F) -> Result<T, E>
    where
        F: FnOnce(&mut Snapshot) -> Result<T, E>,
        E: From<StorageError>,
    {
        let _section = self.section.lock().unwrap_or_else(PoisonError::into_inner);

        let mut snapshot = self.load()?;
        let value = mutator(&mut snapshot)?;
        self.persist(&snapshot)?;

        Ok(value)
    }

    /// Like [`Store::with_snapshot`] but never writes. Still serialized
    /// against every other caller.
    pub fn read<T, E, F>(&self, reader: F) -> Result<T, E>
    where
        F: FnOnce(&Snapshot) -> Result<T, E>,
        E: From<StorageError>,
    {
        let _section = self.section.lock().unwrap_or_else(PoisonError::into_inner);

        let snapshot = self.load()?;
        reader(&snapshot)
    }

    fn load(&self) -> Result<Snapshot, StorageError> {
        let data = fs::read(&self.path)?;

        if data.iter().all(u8::is_ascii_whitespace) {
            debug!(path = %self.path.display(), "snapshot empty, starting fresh");
            return Ok(Snapshot::default());
        }

        serde_json::from_slice(&data).map_err(StorageError::Corrupt)
    }

    fn persist(&self, snapshot: &Snapshot) -> Result<(), StorageError> {
        let data = serde_json::to_vec(snapshot).map_err(StorageError::Encode)?;

        if self.options.atomic_replace {
            let dir = self
                .path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or_else(|| Path::new("."));
            let mut tmp = NamedTempFile::new_in(dir)?;
            tmp.write_all(&data)?;
            tmp.as_file().sync_all()?;
            tmp.persist(&self.path).map_err(|e| e.error)?;
        } else {
            fs::write(&self.path, &data)?;
        }

        debug!(path = %self.path.display(), bytes = data.len(), "snapshot persisted");
        Ok(())
    }
}
