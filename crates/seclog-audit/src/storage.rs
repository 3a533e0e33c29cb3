//! Activity repository adapters.
//!
//! Hosts normally bring their own [`ActivityRepository`]; these cover
//! development, the CLI and tests.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use seclog_core::config::{StorageBackend, StorageConfig};
use seclog_core::{ActivityId, ActivityRecord};

use crate::error::AuditError;
use crate::ports::ActivityRepository;

const DEFAULT_FILE_PATH: &str = "seclog-activities.jsonl";

/// A record together with what the repository assigned to it.
#[derive(Debug, Clone, Serialize)]
pub struct StoredActivity {
    pub id: ActivityId,
    pub stored_at: DateTime<Utc>,
    #[serde(flatten)]
    pub record: ActivityRecord,
}

/// Sequential identifiers starting at 1.
#[derive(Debug, Default)]
struct IdSequence(AtomicI64);

impl IdSequence {
    /// Sequence whose next id follows `last`.
    fn after(last: i64) -> Self {
        Self(AtomicI64::new(last))
    }

    fn next(&self) -> ActivityId {
        ActivityId(self.0.fetch_add(1, Ordering::Relaxed) + 1)
    }
}

fn stamp(id: ActivityId, record: ActivityRecord) -> StoredActivity {
    StoredActivity {
        id,
        stored_at: Utc::now(),
        record,
    }
}

/// Create a repository based on configuration.
pub fn create_repository(
    config: &StorageConfig,
) -> Result<Arc<dyn ActivityRepository>, AuditError> {
    match config.backend {
        StorageBackend::Memory => Ok(Arc::new(MemoryActivityRepository::new())),
        StorageBackend::Console => Ok(Arc::new(ConsoleActivityRepository::new())),
        StorageBackend::File => {
            let path = config.file_path.as_deref().unwrap_or(DEFAULT_FILE_PATH);
            Ok(Arc::new(FileActivityRepository::new(path)?))
        }
    }
}

/// Keeps activities in memory.
#[derive(Debug, Default)]
pub struct MemoryActivityRepository {
    ids: IdSequence,
    activities: RwLock<Vec<StoredActivity>>,
}

impl MemoryActivityRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of stored activities, oldest first.
    pub fn activities(&self) -> Vec<StoredActivity> {
        self.activities
            .read()
            .map(|a| a.clone())
            .unwrap_or_default()
    }

    pub fn len(&self) -> usize {
        self.activities.read().map(|a| a.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ActivityRepository for MemoryActivityRepository {
    async fn save(&self, record: ActivityRecord) -> Result<ActivityId, AuditError> {
        let mut activities = self.activities.write().map_err(|e| {
            AuditError::PersistenceFailed(format!("Failed to acquire write lock: {}", e))
        })?;
        let id = self.ids.next();
        activities.push(stamp(id, record));
        Ok(id)
    }
}

/// Prints activities to stdout as JSON lines.
#[derive(Debug, Default)]
pub struct ConsoleActivityRepository {
    ids: IdSequence,
}

impl ConsoleActivityRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ActivityRepository for ConsoleActivityRepository {
    async fn save(&self, record: ActivityRecord) -> Result<ActivityId, AuditError> {
        let id = self.ids.next();
        let json = serde_json::to_string(&stamp(id, record))?;
        println!("{}", json);
        Ok(id)
    }
}

/// Appends activities to a file as JSON lines.
#[derive(Debug)]
pub struct FileActivityRepository {
    path: PathBuf,
    ids: IdSequence,
    // serializes appends from concurrent handlers
    write_lock: Mutex<()>,
}

impl FileActivityRepository {
    /// Create a file repository. The file is created on first save; when it
    /// already exists, ids continue after the highest one stored.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, AuditError> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(AuditError::InvalidArgument(
                "activity file path is empty".into(),
            ));
        }
        Ok(Self {
            path: path.to_path_buf(),
            ids: IdSequence::after(last_stored_id(path)?),
            write_lock: Mutex::new(()),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ActivityRepository for FileActivityRepository {
    async fn save(&self, record: ActivityRecord) -> Result<ActivityId, AuditError> {
        let _guard = self.write_lock.lock().map_err(|e| {
            AuditError::PersistenceFailed(format!("Failed to acquire write lock: {}", e))
        })?;
        let id = self.ids.next();
        let json = serde_json::to_string(&stamp(id, record))?;
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", json)?;

        Ok(id)
    }
}

/// Highest `id` among the JSON lines already in `path`, or 0.
///
/// Lines that are not stored activities are ignored.
fn last_stored_id(path: &Path) -> Result<i64, AuditError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(e.into()),
    };

    Ok(content
        .lines()
        .filter_map(|line| serde_json::from_str::<serde_json::Value>(line).ok())
        .filter_map(|value| value.get("id").and_then(serde_json::Value::as_i64))
        .fold(0, i64::max))
}

#[cfg(test)]
mod tests {
    use super::*;
    use seclog_core::{ActivityData, SaveType};

    fn record(n: usize) -> ActivityRecord {
        let data: ActivityData = [("Message", format!("change {}", n))].into_iter().collect();
        ActivityRecord::content_security(SaveType::Modify, data)
    }

    #[tokio::test]
    async fn test_memory_repository_assigns_sequential_ids() {
        let repo = MemoryActivityRepository::new();

        assert_eq!(repo.save(record(1)).await.unwrap(), ActivityId(1));
        assert_eq!(repo.save(record(2)).await.unwrap(), ActivityId(2));

        let stored = repo.activities();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[1].record.data.get("Message"), Some("change 2"));
    }

    #[tokio::test]
    async fn test_console_repository() {
        let repo = ConsoleActivityRepository::new();
        // Should not error
        assert_eq!(repo.save(record(1)).await.unwrap(), ActivityId(1));
    }

    #[tokio::test]
    async fn test_file_repository_appends_json_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("activities.jsonl");
        let repo = FileActivityRepository::new(&path).unwrap();

        repo.save(record(1)).await.unwrap();
        repo.save(record(2)).await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<serde_json::Value> = content
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["id"], 1);
        assert_eq!(lines[0]["activity_type"], "ContentSecurity");
        assert_eq!(lines[0]["action"], SaveType::Modify.code());
        assert_eq!(lines[1]["data"]["Message"], "change 2");
    }

    #[tokio::test]
    async fn test_file_repository_continues_existing_ids() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("activities.jsonl");

        let first = FileActivityRepository::new(&path).unwrap();
        assert_eq!(first.save(record(1)).await.unwrap(), ActivityId(1));
        assert_eq!(first.save(record(2)).await.unwrap(), ActivityId(2));

        let second = FileActivityRepository::new(&path).unwrap();
        assert_eq!(second.save(record(3)).await.unwrap(), ActivityId(3));

        let ids: Vec<i64> = std::fs::read_to_string(&path)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str::<serde_json::Value>(l).unwrap()["id"].as_i64().unwrap())
            .collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn test_file_repository_skips_foreign_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("activities.jsonl");
        std::fs::write(&path, "not json\n{\"id\": 7}\n{\"other\": 1}\n").unwrap();

        assert_eq!(last_stored_id(&path).unwrap(), 7);
    }

    #[tokio::test]
    async fn test_file_repository_unwritable_path() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FileActivityRepository::new(dir.path().join("missing/dir/a.jsonl")).unwrap();

        let err = repo.save(record(1)).await.unwrap_err();
        assert!(matches!(err, AuditError::IoError(_)));
    }

    #[test]
    fn test_create_repository_by_backend() {
        let config = StorageConfig {
            backend: StorageBackend::File,
            file_path: None,
        };
        assert!(create_repository(&config).is_ok());

        assert!(create_repository(&StorageConfig::default()).is_ok());
    }

    #[test]
    fn test_file_repository_rejects_empty_path() {
        assert!(matches!(
            FileActivityRepository::new(""),
            Err(AuditError::InvalidArgument(_))
        ));
    }
}
