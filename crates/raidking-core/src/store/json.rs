use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use super::{RosterSink, Snapshot};
use crate::guild::{Change, Guild};

/// Guild document file name in the data directory
const GUILD_FILE: &str = "guild.json";

/// Temporary file written before the atomic rename
const GUILD_TMP_FILE: &str = "guild.json.tmp";

/// File-backed guild document.
///
/// Keeps the last written snapshot in memory; every batch is applied to it and
/// the whole document is rewritten once. Changes from a batch that failed to
/// write stay pending and are written ahead of the next batch.
pub struct JsonStore {
    dir: PathBuf,
    current: Snapshot<Guild>,
    pending: Vec<Change>,
}

impl JsonStore {
    /// Open the store in `dir`, creating the directory and an initial
    /// document if needed. A document that exists but cannot be parsed is an
    /// error rather than being silently replaced.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Failed to create data directory: {}", dir.display()))?;

        let loaded = Self::read(&dir)?;
        let mut store = match loaded {
            Some(snapshot) => {
                debug!(
                    players = snapshot.data.players.len(),
                    tables = snapshot.data.tables.len(),
                    age = %snapshot.age_display(),
                    "Loaded guild document"
                );
                Self {
                    dir,
                    current: snapshot,
                    pending: Vec::new(),
                }
            }
            None => {
                info!(dir = %dir.display(), "No guild document found, starting a new one");
                Self {
                    dir,
                    current: Snapshot::new(Guild::new()),
                    pending: Vec::new(),
                }
            }
        };

        let mut guild = store.current.data.clone();
        let created_table = guild.ensure_table();
        if created_table || !store.path().exists() {
            store.save(&guild)?;
        }
        Ok(store)
    }

    fn path(&self) -> PathBuf {
        self.dir.join(GUILD_FILE)
    }

    fn read(dir: &Path) -> Result<Option<Snapshot<Guild>>> {
        let path = dir.join(GUILD_FILE);
        if !path.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read guild file: {}", path.display()))?;
        let snapshot: Snapshot<Guild> = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse guild file: {}", path.display()))?;
        Ok(Some(snapshot))
    }

    /// Read the document in `dir` without creating or writing anything.
    /// A missing document reads as a new guild.
    pub fn load(dir: &Path) -> Result<Guild> {
        let mut guild = match Self::read(dir)? {
            Some(snapshot) => snapshot.data,
            None => Guild::new(),
        };
        guild.ensure_table();
        Ok(guild)
    }

    /// Changes accepted but not yet on disk
    pub fn pending(&self) -> &[Change] {
        &self.pending
    }

    /// The document as last written
    pub fn guild(&self) -> &Guild {
        &self.current.data
    }

    /// The last written snapshot, for age display
    pub fn snapshot(&self) -> &Snapshot<Guild> {
        &self.current
    }

    /// Replace the whole document on disk
    pub fn save(&mut self, guild: &Guild) -> Result<()> {
        let snapshot = Snapshot::new(guild.clone());
        let contents = serde_json::to_string_pretty(&snapshot)?;

        let tmp = self.dir.join(GUILD_TMP_FILE);
        std::fs::write(&tmp, contents)
            .with_context(|| format!("Failed to write guild file: {}", tmp.display()))?;
        std::fs::rename(&tmp, self.path())
            .with_context(|| format!("Failed to replace guild file: {}", self.path().display()))?;

        self.current = snapshot;
        Ok(())
    }
}

impl RosterSink for JsonStore {
    fn apply(&mut self, changes: &[Change]) -> Result<()> {
        self.pending.extend_from_slice(changes);
        if self.pending.is_empty() {
            return Ok(());
        }
        let mut guild = self.current.data.clone();
        for change in &self.pending {
            guild.apply(change);
        }
        if let Err(e) = self.save(&guild) {
            warn!(pending = self.pending.len(), "Write failed, keeping changes for the next batch");
            return Err(e);
        }
        debug!(changes = self.pending.len(), "Applied change batch");
        self.pending.clear();
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AttendanceStatus, WowClass};
    use tempfile::TempDir;

    #[test]
    fn test_open_creates_document() {
        let dir = TempDir::new().unwrap();
        let store = JsonStore::open(dir.path().join("data")).unwrap();
        assert!(dir.path().join("data").join(GUILD_FILE).exists());
        assert_eq!(store.guild().tables.len(), 1);
        assert_eq!(store.snapshot().age_display(), "just now");
    }

    #[test]
    fn test_reopen_keeps_table_ids() {
        let dir = TempDir::new().unwrap();
        let first = JsonStore::open(dir.path()).unwrap().guild().clone();
        let second = JsonStore::open(dir.path()).unwrap().guild().clone();
        assert_eq!(first, second);
    }

    #[test]
    fn test_apply_batches_persist() {
        let dir = TempDir::new().unwrap();
        let mut store = JsonStore::open(dir.path()).unwrap();
        let mut guild = store.guild().clone();
        let table = guild.tables[0].id.clone();

        let (jaina, changes) = guild.add_player("Jaina", WowClass::Mage).unwrap();
        store.apply(&changes).unwrap();
        let (_, changes) = guild.add_player("Thrall", WowClass::Shaman).unwrap();
        store.apply(&changes).unwrap();
        store.apply(&guild.toggle_status(&table, &jaina).unwrap()).unwrap();

        let reopened = JsonStore::open(dir.path()).unwrap();
        assert_eq!(reopened.guild(), &guild);
        assert_eq!(
            reopened.guild().members_for(&table)[0].status,
            AttendanceStatus::Absent
        );
    }

    #[test]
    fn test_empty_batch_does_not_write() {
        let dir = TempDir::new().unwrap();
        let mut store = JsonStore::open(dir.path()).unwrap();
        let saved_at = store.snapshot().saved_at;
        store.apply(&[]).unwrap();
        assert_eq!(store.snapshot().saved_at, saved_at);
    }

    #[test]
    fn test_corrupt_document_is_an_error() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(GUILD_FILE), "{ nope").unwrap();
        let err = JsonStore::open(dir.path()).err().unwrap();
        assert!(err.to_string().contains("Failed to parse guild file"));
        // Left untouched for the user to inspect
        assert_eq!(
            std::fs::read_to_string(dir.path().join(GUILD_FILE)).unwrap(),
            "{ nope"
        );
    }

    #[test]
    fn test_document_without_tables_gets_default_table() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(GUILD_FILE),
            r#"{"data":{"players":[]},"saved_at":"2024-01-01T00:00:00Z"}"#,
        )
        .unwrap();
        let store = JsonStore::open(dir.path()).unwrap();
        assert_eq!(store.guild().tables.len(), 1);
    }

    #[test]
    fn test_failed_write_is_retried_with_next_batch() {
        let dir = TempDir::new().unwrap();
        let mut store = JsonStore::open(dir.path()).unwrap();
        let mut guild = store.guild().clone();
        let table = guild.tables[0].id.clone();

        // A directory where the temp file goes makes the write fail
        let blocker = dir.path().join(GUILD_TMP_FILE);
        std::fs::create_dir(&blocker).unwrap();
        let (jaina, changes) = guild.add_player("Jaina", WowClass::Mage).unwrap();
        assert!(store.apply(&changes).is_err());
        assert_eq!(store.pending().len(), changes.len());

        std::fs::remove_dir(&blocker).unwrap();
        store.apply(&guild.toggle_status(&table, &jaina).unwrap()).unwrap();
        assert!(store.pending().is_empty());

        let reopened = JsonStore::open(dir.path()).unwrap();
        assert_eq!(reopened.guild(), &guild);
        assert_eq!(reopened.guild().members_for(&table)[0].name, "Jaina");
    }

    #[test]
    fn test_load_does_not_write() {
        let dir = TempDir::new().unwrap();
        let data = dir.path().join("data");
        let guild = JsonStore::load(&data).unwrap();
        assert_eq!(guild.tables.len(), 1);
        assert!(!data.exists());

        let mut store = JsonStore::open(&data).unwrap();
        let mut stored = store.guild().clone();
        let (_, changes) = stored.add_player("Thrall", WowClass::Shaman).unwrap();
        store.apply(&changes).unwrap();
        assert_eq!(JsonStore::load(&data).unwrap(), stored);
    }

    #[test]
    fn test_no_temp_file_left_behind() {
        let dir = TempDir::new().unwrap();
        let mut store = JsonStore::open(dir.path()).unwrap();
        let guild = store.guild().clone();
        store.save(&guild).unwrap();
        assert!(!dir.path().join(GUILD_TMP_FILE).exists());
    }
}
