//! Progression documents stored as versioned JSON rows

use chrono::Utc;
use rusqlite::OptionalExtension;

use super::{ProgressionDb, ProgressionStore, StoreError, VersionedProgression};
use crate::domain::UserProgression;

impl ProgressionStore for ProgressionDb {
    fn create_progression(&self, user_id: &str) -> Result<bool, StoreError> {
        let document = serde_json::to_string(&UserProgression::default())?;
        let now = Utc::now().timestamp_millis();
        let conn = self.conn()?;
        let inserted = conn.execute(
            r#"INSERT OR IGNORE INTO progressions (user_id, document, version, created_at, updated_at)
               VALUES (?1, ?2, 1, ?3, ?3)"#,
            rusqlite::params![user_id, document, now],
        )?;
        Ok(inserted > 0)
    }

    fn load_progression(&self, user_id: &str) -> Result<VersionedProgression, StoreError> {
        let conn = self.conn()?;
        let row: Option<(String, i64)> = conn
            .query_row(
                "SELECT document, version FROM progressions WHERE user_id = ?1",
                [user_id],
                |r| Ok((r.get(0)?, r.get(1)?)),
            )
            .optional()?;
        drop(conn);

        let (document, version) = row.ok_or_else(|| StoreError::NotFound {
            user_id: user_id.to_string(),
        })?;
        let progression: UserProgression = serde_json::from_str(&document)?;
        Ok(VersionedProgression {
            progression,
            version,
        })
    }

    fn save_progression(
        &self,
        user_id: &str,
        progression: &UserProgression,
        expected_version: i64,
    ) -> Result<i64, StoreError> {
        let document = serde_json::to_string(progression)?;
        let now = Utc::now().timestamp_millis();
        let conn = self.conn()?;
        let updated = conn.execute(
            r#"UPDATE progressions SET document = ?1, version = version + 1, updated_at = ?2
               WHERE user_id = ?3 AND version = ?4"#,
            rusqlite::params![document, now, user_id, expected_version],
        )?;

        if updated == 0 {
            let exists: bool = conn.query_row(
                "SELECT EXISTS(SELECT 1 FROM progressions WHERE user_id = ?1)",
                [user_id],
                |r| r.get(0),
            )?;
            let user_id = user_id.to_string();
            return Err(if exists {
                StoreError::Conflict { user_id }
            } else {
                StoreError::NotFound { user_id }
            });
        }

        Ok(expected_version + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::QuestType;
    use tempfile::tempdir;

    fn open() -> (tempfile::TempDir, ProgressionDb) {
        let dir = tempdir().unwrap();
        let db = ProgressionDb::open(&dir.path().join("test.db")).unwrap();
        (dir, db)
    }

    #[test]
    fn test_create_is_idempotent() {
        let (_dir, db) = open();
        assert!(db.create_progression("ana").unwrap());
        assert!(!db.create_progression("ana").unwrap());

        let loaded = db.load_progression("ana").unwrap();
        assert_eq!(loaded.version, 1);
        assert_eq!(loaded.progression, UserProgression::default());
    }

    #[test]
    fn test_unknown_user_is_not_found() {
        let (_dir, db) = open();
        assert!(matches!(
            db.load_progression("ghost"),
            Err(StoreError::NotFound { .. })
        ));
        assert!(matches!(
            db.save_progression("ghost", &UserProgression::default(), 1),
            Err(StoreError::NotFound { .. })
        ));
    }

    #[test]
    fn test_save_roundtrip_bumps_version() {
        let (_dir, db) = open();
        db.create_progression("ana").unwrap();

        let mut loaded = db.load_progression("ana").unwrap();
        loaded.progression.xp = 40;
        loaded
            .progression
            .set_guard(QuestType::Exercise, "2026-04-02", true);
        let version = db
            .save_progression("ana", &loaded.progression, loaded.version)
            .unwrap();
        assert_eq!(version, 2);

        let reloaded = db.load_progression("ana").unwrap();
        assert_eq!(reloaded.version, 2);
        assert_eq!(reloaded.progression, loaded.progression);
    }

    #[test]
    fn test_stale_version_conflicts() {
        let (_dir, db) = open();
        db.create_progression("ana").unwrap();

        let first = db.load_progression("ana").unwrap();
        let second = db.load_progression("ana").unwrap();

        db.save_progression("ana", &first.progression, first.version)
            .unwrap();
        let err = db
            .save_progression("ana", &second.progression, second.version)
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict { .. }));
    }
}
