use std::fs;
use std::path::{Path, PathBuf};

use super::backend::{Backend, SlotWrite};
use crate::error::{Result, StockflowError};

pub const STOCKFLOW_DIR: &str = ".stockflow";
const JOURNAL: &str = "journal.json";
const SLOT_EXT: &str = "json";

/// One JSON file per key inside `.stockflow/`.
///
/// Multi-key batches go through a write-ahead journal: the journal is
/// written first, then every slot, then the journal is removed. A journal
/// left behind by a crash is replayed on the next open. Replay rewrites whole
/// slots, so applying it twice is harmless.
#[derive(Debug)]
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    /// Create `.stockflow/` under `root`
    pub fn init(root: &Path) -> Result<Self> {
        let dir = root.join(STOCKFLOW_DIR);
        if dir.exists() {
            return Err(StockflowError::AlreadyInitialized);
        }
        fs::create_dir_all(&dir)?;
        tracing::info!(dir = %dir.display(), "initialized storage");
        Ok(Self { dir })
    }

    /// Open an existing `.stockflow/` under `root`, replaying any journal
    pub fn open(root: &Path) -> Result<Self> {
        let dir = root.join(STOCKFLOW_DIR);
        if !dir.is_dir() {
            return Err(StockflowError::NotInitialized);
        }
        let backend = Self { dir };
        backend.replay_journal()?;
        Ok(backend)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Apply a journal left over from an interrupted batch.
    /// Returns true if one was found.
    pub fn replay_journal(&self) -> Result<bool> {
        let path = self.dir.join(JOURNAL);
        if !path.exists() {
            return Ok(false);
        }

        let raw = fs::read_to_string(&path)?;
        let batch: Vec<SlotWrite> =
            serde_json::from_str(&raw).map_err(|e| StockflowError::CorruptState {
                key: JOURNAL.to_string(),
                reason: e.to_string(),
            })?;

        tracing::warn!(entries = batch.len(), "replaying interrupted write journal");
        self.write_slots(&batch)?;
        fs::remove_file(&path)?;
        Ok(true)
    }

    fn slot_path(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(StockflowError::Storage(format!("Invalid storage key '{}'", key)));
        }
        Ok(self.dir.join(format!("{}.{}", key, SLOT_EXT)))
    }

    fn write_slots(&self, batch: &[SlotWrite]) -> Result<()> {
        for write in batch {
            let path = self.slot_path(&write.key)?;
            match &write.value {
                Some(value) => write_atomic(&path, value)?,
                None => {
                    if path.exists() {
                        fs::remove_file(&path)?;
                    }
                }
            }
        }
        Ok(())
    }
}

impl Backend for FileBackend {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.slot_path(key)?;
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(path)?))
    }

    fn apply(&self, batch: &[SlotWrite]) -> Result<()> {
        if batch.len() <= 1 {
            return self.write_slots(batch);
        }

        // Validate keys before anything hits the disk
        for write in batch {
            self.slot_path(&write.key)?;
        }

        let journal = self.dir.join(JOURNAL);
        write_atomic(&journal, &serde_json::to_string(batch)?)?;
        self.write_slots(batch)?;
        fs::remove_file(&journal)?;

        tracing::debug!(slots = batch.len(), "applied journaled batch");
        Ok(())
    }
}

/// Write via a temp file and rename so readers never see a torn file
fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, contents)?;
    fs::rename(&tmp, path)?;
    Ok(())
}
