//! Snapshot persistence layer
//!
//! Stores the aggregation snapshot as a single JSON document with:
//! - Safe load (a missing file is the empty snapshot, not an error)
//! - Atomic save (write a sibling temporary file, fsync, rename over the target)
//!
//! There is no locking here. Callers must guarantee a single writer.

use hazardnexus_core::{Error, Result, Snapshot};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

/// Configuration for snapshot persistence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Location of the snapshot document
    #[serde(default = "default_store_path")]
    pub path: PathBuf,

    /// Pretty-print the document (the dashboard team reads it by hand)
    #[serde(default = "default_pretty")]
    pub pretty: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
            pretty: default_pretty(),
        }
    }
}

fn default_store_path() -> PathBuf {
    PathBuf::from("./assets/data_store.json")
}

fn default_pretty() -> bool {
    true
}

/// File-backed store for the aggregation snapshot
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
    pretty: bool,
}

impl SnapshotStore {
    /// Create a store, making sure the parent directory exists
    pub fn new(config: StoreConfig) -> Result<Self> {
        let store = Self {
            path: config.path,
            pretty: config.pretty,
        };

        std::fs::create_dir_all(store.dir()).map_err(|e| {
            Error::config(format!(
                "cannot create snapshot directory {:?}: {}",
                store.dir(),
                e
            ))
        })?;

        info!("Snapshot store at {:?}", store.path);
        Ok(store)
    }

    /// Convenience constructor with default formatting
    pub fn at(path: impl Into<PathBuf>) -> Result<Self> {
        Self::new(StoreConfig {
            path: path.into(),
            ..Default::default()
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn dir(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }

    /// Load the last persisted snapshot, or the empty snapshot if none exists
    pub fn load(&self) -> Result<Snapshot> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No snapshot at {:?}, returning empty snapshot", self.path);
                return Ok(Snapshot::empty());
            }
            Err(e) => return Err(e.into()),
        };

        let snapshot = serde_json::from_reader(BufReader::new(file))?;
        Ok(snapshot)
    }

    /// Persist a snapshot; readers see either the old or the new document
    pub fn save(&self, snapshot: &Snapshot) -> Result<()> {
        let mut temp = NamedTempFile::new_in(self.dir())?;

        {
            let mut writer = BufWriter::new(temp.as_file_mut());
            if self.pretty {
                serde_json::to_writer_pretty(&mut writer, snapshot)?;
            } else {
                serde_json::to_writer(&mut writer, snapshot)?;
            }
            writer.flush()?;
        }
        temp.as_file().sync_all()?;

        temp.persist(&self.path).map_err(|e| Error::Io(e.error))?;

        debug!(
            "Saved snapshot ({} alerts, {} cities) to {:?}",
            snapshot.alerts.len(),
            snapshot.key_metrics.len(),
            self.path
        );
        Ok(())
    }
}
