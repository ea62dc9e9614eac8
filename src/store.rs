use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use tracing::{debug, warn};

use crate::models::ApplicationRecord;

/// Key the whole application collection is stored under.
pub const APPLICATIONS_KEY: &str = "jobtrack.applications";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("storage error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("failed to serialize applications: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("failed to create data directory: {0}")]
    Io(#[from] std::io::Error),
}

/// Whole-collection persistence for application records.
///
/// `load` never fails: anything missing or unreadable comes back as an empty
/// collection so a view can always render.
pub trait RecordStore {
    fn load(&self) -> Vec<ApplicationRecord>;
    fn save(&self, records: &[ApplicationRecord]) -> Result<(), StoreError>;
}

/// Small key-value store on top of a single SQLite table.
pub struct KvStore {
    conn: Connection,
}

impl KvStore {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let store = Self {
            conn: Connection::open(path)?,
        };
        store.init()?;
        Ok(store)
    }

    #[cfg(test)]
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let store = Self {
            conn: Connection::open_in_memory()?,
        };
        store.init()?;
        Ok(store)
    }

    fn init(&self) -> Result<(), StoreError> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at TEXT NOT NULL DEFAULT (datetime('now'))
            );
            "#,
        )?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", [key], |row| row.get(0))
            .optional()?;
        Ok(value)
    }

    pub fn put(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = datetime('now')",
            params![key, value],
        )?;
        Ok(())
    }
}

impl RecordStore for KvStore {
    fn load(&self) -> Vec<ApplicationRecord> {
        let raw = match self.get(APPLICATIONS_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!("no stored applications");
                return Vec::new();
            }
            Err(e) => {
                warn!(error = %e, "could not read stored applications");
                return Vec::new();
            }
        };

        match parse_records(&raw) {
            Ok(records) => {
                debug!(count = records.len(), "loaded applications");
                records
            }
            Err(e) => {
                warn!(error = %e, "stored applications are malformed, starting empty");
                Vec::new()
            }
        }
    }

    fn save(&self, records: &[ApplicationRecord]) -> Result<(), StoreError> {
        let raw = serde_json::to_string(records)?;
        self.put(APPLICATIONS_KEY, &raw)?;
        debug!(count = records.len(), "saved applications");
        Ok(())
    }
}

fn parse_records(raw: &str) -> Result<Vec<ApplicationRecord>, serde_json::Error> {
    serde_json::from_str(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Status;
    use chrono::{TimeZone, Utc};

    fn record(id: &str, company: &str, status: Status) -> ApplicationRecord {
        ApplicationRecord {
            id: id.into(),
            company: company.into(),
            position: "Engineer".into(),
            status,
            date_applied: Utc.with_ymd_and_hms(2024, 5, 1, 9, 30, 0).unwrap(),
            logo: None,
            link: None,
        }
    }

    #[test]
    fn load_from_empty_store_is_empty() {
        let store = KvStore::open_in_memory().unwrap();
        assert!(store.load().is_empty());
    }

    #[test]
    fn save_then_load_keeps_order_and_fields() {
        let store = KvStore::open_in_memory().unwrap();
        let records = vec![
            record("2", "TechCorp", Status::Applied),
            record("1", "Acme Inc", Status::Offer),
        ];
        store.save(&records).unwrap();
        assert_eq!(store.load(), records);
    }

    #[test]
    fn save_overwrites_whole_collection() {
        let store = KvStore::open_in_memory().unwrap();
        store
            .save(&[record("1", "Acme", Status::Applied), record("2", "Beta", Status::Saved)])
            .unwrap();
        store.save(&[record("3", "Gamma", Status::Rejected)]).unwrap();

        let loaded = store.load();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].id, "3");
    }

    #[test]
    fn malformed_content_loads_as_empty() {
        let store = KvStore::open_in_memory().unwrap();
        store.put(APPLICATIONS_KEY, "{not json").unwrap();
        assert!(store.load().is_empty());

        store
            .put(APPLICATIONS_KEY, r#"[{"id":"1","company":"A","position":"B","status":"ghosted","dateApplied":"2024-01-01T00:00:00Z"}]"#)
            .unwrap();
        assert!(store.load().is_empty());
    }

    #[test]
    fn file_store_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("jobtrack.db");

        {
            let store = KvStore::open(&path).unwrap();
            store.save(&[record("1", "Acme Inc", Status::Interviewing)]).unwrap();
        }

        assert!(path.exists());
        let reopened = KvStore::open(&path).unwrap();
        let loaded = reopened.load();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].company, "Acme Inc");
    }
}
