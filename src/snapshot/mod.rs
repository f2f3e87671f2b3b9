//! Snapshot persistence
//!
//! A run reads the previous snapshot, writes the current one, and then
//! rotates current into previous for the next run. Only one prior
//! generation is kept.

pub mod store;

pub use store::FileSnapshotStore;

use crate::models::{ChangeReport, Snapshot};
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

pub const CURRENT_FILE: &str = "current-listings.json";
pub const PREVIOUS_FILE: &str = "previous-listings.json";
pub const CHANGES_FILE: &str = "changes.json";

/// Named location holding one snapshot
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Current,
    Previous,
}

impl Slot {
    pub fn file_name(self) -> &'static str {
        match self {
            Slot::Current => CURRENT_FILE,
            Slot::Previous => PREVIOUS_FILE,
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Slot::Current => write!(f, "current"),
            Slot::Previous => write!(f, "previous"),
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed snapshot data in {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize {what}: {source}")]
    Serialize {
        what: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("snapshot claims {total_count} listings but holds {actual}")]
    CountMismatch { total_count: usize, actual: usize },

    #[error("{0} slot is empty")]
    MissingSlot(Slot),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Storage for the current/previous snapshot pair and the last change report
pub trait SnapshotStore {
    /// Load the snapshot in `slot`, or `None` if nothing has been written yet
    fn load(&self, slot: Slot) -> StoreResult<Option<Snapshot>>;

    /// Write `snapshot` to `slot`, replacing what was there
    fn save(&self, slot: Slot, snapshot: &Snapshot) -> StoreResult<()>;

    /// Copy the current slot over the previous slot
    fn rotate(&self) -> StoreResult<()>;

    fn save_report(&self, report: &ChangeReport) -> StoreResult<()>;

    /// Listings of the previous run; empty on the first run
    fn load_baseline(&self) -> StoreResult<Option<Snapshot>> {
        self.load(Slot::Previous)
    }
}
