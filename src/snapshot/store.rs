use crate::models::{ChangeReport, Snapshot};
use crate::snapshot::{Slot, SnapshotStore, StoreError, StoreResult, CHANGES_FILE};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

/// JSON files in a single data directory
pub struct FileSnapshotStore {
    data_dir: PathBuf,
}

impl FileSnapshotStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn slot_path(&self, slot: Slot) -> PathBuf {
        self.data_dir.join(slot.file_name())
    }

    pub fn changes_path(&self) -> PathBuf {
        self.data_dir.join(CHANGES_FILE)
    }

    /// Write to a sibling temp file, then rename over `path`
    fn write_atomic(&self, path: &Path, contents: &[u8]) -> StoreResult<()> {
        fs::create_dir_all(&self.data_dir).map_err(|source| StoreError::Io {
            path: self.data_dir.clone(),
            source,
        })?;

        let temp_path = path.with_extension("json.tmp");
        fs::write(&temp_path, contents).map_err(|source| StoreError::Io {
            path: temp_path.clone(),
            source,
        })?;

        fs::rename(&temp_path, path).map_err(|source| {
            let _ = fs::remove_file(&temp_path);
            StoreError::Io {
                path: path.to_path_buf(),
                source,
            }
        })?;

        debug!("Wrote {} bytes to {}", contents.len(), path.display());
        Ok(())
    }

    fn read_slot(&self, slot: Slot) -> StoreResult<Option<Vec<u8>>> {
        let path = self.slot_path(slot);
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }
}

impl SnapshotStore for FileSnapshotStore {
    fn load(&self, slot: Slot) -> StoreResult<Option<Snapshot>> {
        let Some(bytes) = self.read_slot(slot)? else {
            debug!("No {} snapshot at {}", slot, self.slot_path(slot).display());
            return Ok(None);
        };

        let snapshot = serde_json::from_slice(&bytes).map_err(|source| StoreError::Parse {
            path: self.slot_path(slot),
            source,
        })?;

        Ok(Some(snapshot))
    }

    fn save(&self, slot: Slot, snapshot: &Snapshot) -> StoreResult<()> {
        if !snapshot.is_consistent() {
            return Err(StoreError::CountMismatch {
                total_count: snapshot.total_count,
                actual: snapshot.listings.len(),
            });
        }

        let json = serde_json::to_vec_pretty(snapshot).map_err(|source| StoreError::Serialize {
            what: "snapshot",
            source,
        })?;

        self.write_atomic(&self.slot_path(slot), &json)
    }

    fn rotate(&self) -> StoreResult<()> {
        let bytes = self
            .read_slot(Slot::Current)?
            .ok_or(StoreError::MissingSlot(Slot::Current))?;

        self.write_atomic(&self.slot_path(Slot::Previous), &bytes)
    }

    fn save_report(&self, report: &ChangeReport) -> StoreResult<()> {
        let json = serde_json::to_vec_pretty(report).map_err(|source| StoreError::Serialize {
            what: "change report",
            source,
        })?;

        self.write_atomic(&self.changes_path(), &json)
    }
}
