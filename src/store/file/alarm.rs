//! File-based alarm storage implementation.
//!
//! Stores the active alarm as a single YAML document at
//! `{alarm_dir}/active_alarm.yaml`.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;

use crate::scheduler::Alarm;
use crate::store::alarm::AlarmStore;
use crate::store::error::{StorageError, StorageResult};

const RECORD_FILE: &str = "active_alarm.yaml";

/// File-based implementation of `AlarmStore`.
///
/// A present file is the one stored alarm; an absent file means none.
/// `replace` writes a temp file and renames it over the record, which gives
/// delete-and-insert in a single step.
#[derive(Debug, Clone)]
pub struct FileAlarmStore {
    alarm_dir: PathBuf,
}

impl FileAlarmStore {
    /// Create a new file alarm store rooted at `alarm_dir`.
    pub fn new(alarm_dir: impl Into<PathBuf>) -> Self {
        Self {
            alarm_dir: alarm_dir.into(),
        }
    }

    fn record_path(&self) -> PathBuf {
        self.alarm_dir.join(RECORD_FILE)
    }

    async fn ensure_dir(&self) -> StorageResult<()> {
        fs::create_dir_all(&self.alarm_dir)
            .await
            .map_err(|e| StorageError::write(&self.alarm_dir, e))
    }
}

#[async_trait]
impl AlarmStore for FileAlarmStore {
    async fn load(&self) -> StorageResult<Option<Alarm>> {
        let path = self.record_path();

        let content = match fs::read_to_string(&path).await {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StorageError::read(&path, e)),
        };

        let alarm: Alarm = serde_saphyr::from_str(&content)
            .map_err(|e| StorageError::corrupt(&path, e.to_string()))?;

        Ok(Some(alarm))
    }

    async fn replace(&self, alarm: &Alarm) -> StorageResult<()> {
        self.ensure_dir().await?;

        let path = self.record_path();
        let temp_path = path.with_extension("yaml.tmp");

        let content = serde_saphyr::to_string(alarm)
            .map_err(|e| StorageError::encode(e.to_string()))?;

        fs::write(&temp_path, content)
            .await
            .map_err(|e| StorageError::write(&temp_path, e))?;

        fs::rename(&temp_path, &path)
            .await
            .map_err(|e| StorageError::write(&path, e))?;

        tracing::debug!(
            alarm_id = %alarm.id,
            scheduled_time = %alarm.scheduled_time,
            "Alarm record replaced"
        );
        Ok(())
    }

    async fn clear(&self) -> StorageResult<()> {
        let path = self.record_path();

        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::write(&path, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Local, TimeZone};
    use tempfile::TempDir;

    fn create_store(temp_dir: &TempDir) -> FileAlarmStore {
        FileAlarmStore::new(temp_dir.path().join("alarm"))
    }

    fn alarm_at(hours_from_now: i64) -> Alarm {
        Alarm::new("Test Alarm", Local::now() + Duration::hours(hours_from_now))
    }

    #[tokio::test]
    async fn load_empty() {
        let temp_dir = TempDir::new().unwrap();
        let store = create_store(&temp_dir);

        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn replace_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let store = create_store(&temp_dir);

        let alarm = alarm_at(1);
        store.replace(&alarm).await.unwrap();

        let loaded = store.load().await.unwrap().unwrap();
        assert_eq!(loaded.id, alarm.id);
        assert_eq!(loaded.name, "Test Alarm");
        assert_eq!(loaded.scheduled_time, alarm.scheduled_time);
    }

    #[tokio::test]
    async fn replace_keeps_only_latest() {
        let temp_dir = TempDir::new().unwrap();
        let store = create_store(&temp_dir);

        let first = alarm_at(1);
        let second = alarm_at(2);
        store.replace(&first).await.unwrap();
        store.replace(&second).await.unwrap();

        let loaded = store.load().await.unwrap().unwrap();
        assert_eq!(loaded.id, second.id);

        let files: Vec<_> = std::fs::read_dir(temp_dir.path().join("alarm"))
            .unwrap()
            .collect();
        assert_eq!(files.len(), 1);
    }

    #[tokio::test]
    async fn get_active_hides_past_alarm() {
        let temp_dir = TempDir::new().unwrap();
        let store = create_store(&temp_dir);

        let scheduled = Local.with_ymd_and_hms(2024, 3, 5, 6, 0, 0).unwrap();
        store
            .replace(&Alarm::new("User Alarm", scheduled))
            .await
            .unwrap();

        let before = scheduled - Duration::minutes(1);
        let found = store.get_active(before).await.unwrap().unwrap();
        assert_eq!(found.scheduled_time, scheduled);

        assert!(store.get_active(scheduled).await.unwrap().is_none());
        assert!(
            store
                .get_active(scheduled + Duration::minutes(1))
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn clear_removes_record() {
        let temp_dir = TempDir::new().unwrap();
        let store = create_store(&temp_dir);

        store.replace(&alarm_at(1)).await.unwrap();
        store.clear().await.unwrap();

        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn clear_empty_ok() {
        let temp_dir = TempDir::new().unwrap();
        let store = create_store(&temp_dir);

        store.clear().await.unwrap();
    }

    #[tokio::test]
    async fn load_corrupt_record_errors() {
        let temp_dir = TempDir::new().unwrap();
        let store = create_store(&temp_dir);

        let dir = temp_dir.path().join("alarm");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(RECORD_FILE), "scheduled_time: [not, a, time]").unwrap();

        assert!(matches!(
            store.load().await,
            Err(StorageError::Corrupt { .. })
        ));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn concurrent_reader_sees_whole_records() {
        use std::sync::Arc;
        use std::sync::atomic::{AtomicBool, Ordering};

        const REPLACES: usize = 500;

        let temp_dir = TempDir::new().unwrap();
        let store = Arc::new(create_store(&temp_dir));
        let first = alarm_at(1);
        store.replace(&first).await.unwrap();

        let done = Arc::new(AtomicBool::new(false));
        let reader = {
            let store = store.clone();
            let done = done.clone();
            tokio::spawn(async move {
                let mut reads = 0usize;
                loop {
                    match store.load().await {
                        Ok(Some(alarm)) => assert!(alarm.id.starts_with("alarm_")),
                        other => panic!("reader saw a partial record: {other:?}"),
                    }
                    reads += 1;
                    if done.load(Ordering::SeqCst) {
                        break reads;
                    }
                }
            })
        };

        let mut last = first;
        for i in 0..REPLACES {
            last = alarm_at(2 + i as i64);
            store.replace(&last).await.unwrap();
        }
        done.store(true, Ordering::SeqCst);

        let reads = reader.await.unwrap();
        assert!(reads > 0);
        assert_eq!(store.load().await.unwrap().unwrap(), last);
    }
}
