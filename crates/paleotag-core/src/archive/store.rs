//! Reading and writing archive records.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use super::record::ArchiveRecord;
use crate::error::Result;

/// Persistence for archive records.
///
/// Implementations validate a record before writing it; a record that fails
/// [`ArchiveRecord::validate`] is never persisted.
pub trait RecordStore {
    /// Where records live, for messages.
    fn location(&self) -> String;

    fn load(&self) -> Result<ArchiveRecord>;

    fn save(&self, record: &ArchiveRecord) -> Result<()>;
}

/// A record stored as one pretty-printed JSON file.
#[derive(Debug, Clone)]
pub struct JsonRecordStore {
    path: PathBuf,
}

impl JsonRecordStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl RecordStore for JsonRecordStore {
    fn location(&self) -> String {
        self.path.display().to_string()
    }

    fn load(&self) -> Result<ArchiveRecord> {
        let content = fs::read_to_string(&self.path)?;
        let record: ArchiveRecord = serde_json::from_str(&content)?;
        Ok(record)
    }

    fn save(&self, record: &ArchiveRecord) -> Result<()> {
        record.validate()?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(record)?;
        fs::write(&self.path, content)?;
        info!(
            path = %self.path.display(),
            columns = record.columns.len(),
            "wrote archive record"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ArchiveError, CoreError};
    use tempfile::TempDir;

    #[test]
    fn save_then_load_preserves_the_record() {
        let dir = TempDir::new().unwrap();
        let store = JsonRecordStore::new(dir.path().join("nested/core.json"));

        let mut record = ArchiveRecord::new("core");
        record.push_column("age", "yr BP", vec![1.0, 2.0]);
        record.push_column("d18O", "permil", vec![0.5, 0.25]);
        store.save(&record).unwrap();

        assert_eq!(store.load().unwrap(), record);
    }

    #[test]
    fn invalid_record_is_not_written() {
        let dir = TempDir::new().unwrap();
        let store = JsonRecordStore::new(dir.path().join("bad.json"));

        let mut record = ArchiveRecord::new("bad");
        record.push_column("age", "yr BP", vec![1.0, 2.0]);
        record.push_column("d18O", "permil", vec![0.5]);

        let err = store.save(&record).unwrap_err();
        assert!(matches!(err, CoreError::Archive(ArchiveError::Invalid(_))));
        assert!(!store.path().exists());
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = TempDir::new().unwrap();
        let store = JsonRecordStore::new(dir.path().join("absent.json"));
        assert!(matches!(store.load().unwrap_err(), CoreError::Io(_)));
    }
}
