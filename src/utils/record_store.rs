use std::path::{Path, PathBuf};
use tokio::fs;
use uuid::Uuid;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use crate::core::{FallSpeed, GameSession, Outcome};
use crate::utils::{GameError, GameResult};
use tracing::{info, warn, debug};

/// Result of one finished game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: Uuid,
    pub seed: u64,
    pub outcome: Outcome,
    pub rounds: u32,
    pub final_x: i32,
    pub speed: FallSpeed,
    pub played_at: DateTime<Utc>,
    pub duration_secs: i64,
    pub version: String,
}

impl SessionRecord {
    /// `None` while the session is still being played.
    pub fn from_session(session: &GameSession) -> Option<Self> {
        let outcome = session.outcome()?;
        let state = session.state();

        Some(Self {
            id: session.id(),
            seed: session.seed(),
            outcome,
            rounds: state.rounds,
            final_x: state.x,
            speed: session.speed(),
            played_at: session.started_at(),
            duration_secs: session.elapsed_secs(),
            version: crate::VERSION.to_string(),
        })
    }

    pub fn get_duration_formatted(&self) -> String {
        let minutes = self.duration_secs / 60;
        let seconds = self.duration_secs % 60;
        format!("{}m {:02}s", minutes, seconds)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordSummary {
    pub games: usize,
    pub wins: usize,
    pub losses: usize,
    pub best_rounds: u32,
}

impl RecordSummary {
    pub fn from_records(records: &[SessionRecord]) -> Self {
        records.iter().fold(Self::default(), |mut summary, record| {
            summary.games += 1;
            match record.outcome {
                Outcome::Won => summary.wins += 1,
                Outcome::Lost => summary.losses += 1,
            }
            summary.best_rounds = summary.best_rounds.max(record.rounds);
            summary
        })
    }

    pub fn win_rate(&self) -> f64 {
        if self.games == 0 {
            0.0
        } else {
            self.wins as f64 / self.games as f64
        }
    }
}

pub struct RecordStore {
    records_directory: PathBuf,
}

impl RecordStore {
    pub fn new<P: AsRef<Path>>(records_directory: P) -> Self {
        Self {
            records_directory: records_directory.as_ref().to_path_buf(),
        }
    }

    pub async fn save_record(&self, record: &SessionRecord) -> GameResult<()> {
        if !self.records_directory.exists() {
            fs::create_dir_all(&self.records_directory)
                .await
                .map_err(|e| GameError::record(format!("Failed to create records directory: {}", e)))?;
        }

        let path = self.get_record_path(&record.id);
        let json = serde_json::to_string_pretty(record)?;

        fs::write(&path, json)
            .await
            .map_err(|e| GameError::record(format!("Failed to write record file: {}", e)))?;

        info!("Saved {:?} record after {} rounds ({})", record.outcome, record.rounds, record.id);
        debug!("Record written to: {:?}", path);
        Ok(())
    }

    pub async fn load_record(&self, record_id: Uuid) -> GameResult<SessionRecord> {
        let path = self.get_record_path(&record_id);

        if !path.exists() {
            return Err(GameError::record_not_found(record_id.to_string()));
        }

        let content = fs::read_to_string(&path)
            .await
            .map_err(|e| GameError::record(format!("Failed to read record file: {}", e)))?;

        let record: SessionRecord = serde_json::from_str(&content)?;

        if record.version != crate::VERSION {
            warn!("Record version mismatch: {} vs {}", record.version, crate::VERSION);
        }

        Ok(record)
    }

    /// All readable records, newest first. Unreadable files are skipped.
    pub async fn list_records(&self) -> GameResult<Vec<SessionRecord>> {
        if !self.records_directory.exists() {
            return Ok(Vec::new());
        }

        let mut entries = fs::read_dir(&self.records_directory)
            .await
            .map_err(|e| GameError::record(format!("Failed to read records directory: {}", e)))?;

        let mut records = Vec::new();

        while let Some(entry) = entries.next_entry().await
            .map_err(|e| GameError::record(format!("Failed to read directory entry: {}", e)))? {

            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) != Some("json") {
                continue;
            }

            let parsed = match fs::read_to_string(&path).await {
                Ok(content) => serde_json::from_str::<SessionRecord>(&content).map_err(GameError::from),
                Err(e) => Err(GameError::from(e)),
            };
            match parsed {
                Ok(record) => records.push(record),
                Err(e) => warn!("Skipping unreadable record {:?}: {}", path, e),
            }
        }

        records.sort_by(|a, b| b.played_at.cmp(&a.played_at));

        debug!("Found {} records in {:?}", records.len(), self.records_directory);
        Ok(records)
    }

    pub async fn record_count(&self) -> GameResult<usize> {
        Ok(self.list_records().await?.len())
    }

    pub async fn delete_record(&self, record_id: Uuid) -> GameResult<()> {
        let path = self.get_record_path(&record_id);

        if !path.exists() {
            return Err(GameError::record_not_found(record_id.to_string()));
        }

        fs::remove_file(&path)
            .await
            .map_err(|e| GameError::record(format!("Failed to delete record file: {}", e)))?;

        info!("Deleted record: {}", record_id);
        Ok(())
    }

    /// Keep the `keep` newest records and delete the rest.
    pub async fn cleanup_old_records(&self, keep: usize) -> GameResult<usize> {
        let records = self.list_records().await?;
        let mut deleted = 0;

        for record in records.iter().skip(keep) {
            match self.delete_record(record.id).await {
                Ok(()) => deleted += 1,
                Err(e) => warn!("Failed to delete old record {}: {}", record.id, e),
            }
        }

        if deleted > 0 {
            info!("Cleaned up {} old records", deleted);
        }
        Ok(deleted)
    }

    pub async fn summary(&self) -> GameResult<RecordSummary> {
        Ok(RecordSummary::from_records(&self.list_records().await?))
    }

    fn get_record_path(&self, record_id: &Uuid) -> PathBuf {
        self.records_directory.join(format!("{}.json", record_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use pretty_assertions::assert_eq;
    use tempfile::tempdir;
    use tokio_test::{assert_err, assert_ok};

    fn record(outcome: Outcome, rounds: u32, minutes_ago: i64) -> SessionRecord {
        SessionRecord {
            id: Uuid::new_v4(),
            seed: 7,
            outcome,
            rounds,
            final_x: 4,
            speed: FallSpeed::Medium,
            played_at: Utc::now() - Duration::minutes(minutes_ago),
            duration_secs: 95,
            version: crate::VERSION.to_string(),
        }
    }

    #[tokio::test]
    async fn test_save_and_load_record() {
        let dir = tempdir().unwrap();
        let store = RecordStore::new(dir.path().join("records"));
        let original = record(Outcome::Won, 31, 0);

        assert_ok!(store.save_record(&original).await);
        let loaded = store.load_record(original.id).await.unwrap();

        assert_eq!(loaded, original);
    }

    #[tokio::test]
    async fn test_missing_record() {
        let dir = tempdir().unwrap();
        let store = RecordStore::new(dir.path());

        let result = store.load_record(Uuid::new_v4()).await;
        assert!(matches!(result, Err(GameError::RecordNotFound { .. })));
        assert_err!(store.delete_record(Uuid::new_v4()).await);
    }

    #[tokio::test]
    async fn test_list_is_newest_first_and_skips_garbage() {
        let dir = tempdir().unwrap();
        let store = RecordStore::new(dir.path());

        let old = record(Outcome::Lost, 3, 30);
        let new = record(Outcome::Won, 12, 1);
        store.save_record(&old).await.unwrap();
        store.save_record(&new).await.unwrap();
        std::fs::write(dir.path().join("broken.json"), "{ not json").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let records = store.list_records().await.unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].id, new.id);
        assert_eq!(records[1].id, old.id);
    }

    #[tokio::test]
    async fn test_cleanup_keeps_newest() {
        let dir = tempdir().unwrap();
        let store = RecordStore::new(dir.path());

        for minutes_ago in 0..5 {
            store.save_record(&record(Outcome::Lost, 1, minutes_ago)).await.unwrap();
        }

        assert_eq!(store.cleanup_old_records(2).await.unwrap(), 3);
        assert_eq!(store.record_count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_summary() {
        let dir = tempdir().unwrap();
        let store = RecordStore::new(dir.path());
        assert_eq!(store.summary().await.unwrap(), RecordSummary::default());

        store.save_record(&record(Outcome::Won, 40, 3)).await.unwrap();
        store.save_record(&record(Outcome::Lost, 9, 2)).await.unwrap();
        store.save_record(&record(Outcome::Lost, 14, 1)).await.unwrap();

        let summary = store.summary().await.unwrap();
        assert_eq!(summary.games, 3);
        assert_eq!(summary.wins, 1);
        assert_eq!(summary.losses, 2);
        assert_eq!(summary.best_rounds, 40);
        assert!((summary.win_rate() - 1.0 / 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_record_from_session() {
        let mut config = crate::config::Config::default().game;
        config.seed = Some(12);
        config.time_limit_secs = 1;
        let mut session = GameSession::new(&config).unwrap();

        assert!(SessionRecord::from_session(&session).is_none());

        session.tick_clock();
        let record = SessionRecord::from_session(&session).unwrap();

        assert_eq!(record.outcome, Outcome::Won);
        assert_eq!(record.seed, 12);
        assert_eq!(record.id, session.id());
        assert_eq!(record.get_duration_formatted(), "0m 00s");
    }
}
