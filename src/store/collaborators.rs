//! Profile and food-log tables
//!
//! These belong to the wider app; the engine only reads them. The write
//! helpers exist for the CLI and for tests.

use chrono::Utc;
use rusqlite::OptionalExtension;

use super::{DailyTotals, FoodLogSource, ProfileSource, ProgressionDb, StoreError};
use crate::domain::{ActivityLevel, Gender, PrimaryGoal, UserProfile};

/// A single logged food item
#[derive(Debug, Clone, PartialEq)]
pub struct FoodLogEntry {
    pub day: String,
    pub name: Option<String>,
    pub calories: f64,
    pub protein: f64,
}

impl ProgressionDb {
    pub fn upsert_profile(&self, user_id: &str, profile: &UserProfile) -> Result<(), StoreError> {
        let now = Utc::now().timestamp_millis();
        let conn = self.conn()?;
        conn.execute(
            r#"INSERT INTO profiles (user_id, weight_kg, height_cm, age, gender, activity_level, primary_goal, updated_at)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
               ON CONFLICT(user_id) DO UPDATE SET
                   weight_kg = ?2, height_cm = ?3, age = ?4, gender = ?5,
                   activity_level = ?6, primary_goal = ?7, updated_at = ?8"#,
            rusqlite::params![
                user_id,
                profile.weight_kg,
                profile.height_cm,
                profile.age,
                profile.gender.map(|g| g.as_str()),
                profile.activity_level.map(|a| a.as_str()),
                profile.primary_goal.map(|g| g.as_str()),
                now,
            ],
        )?;
        Ok(())
    }

    pub fn record_food(&self, user_id: &str, entry: &FoodLogEntry) -> Result<(), StoreError> {
        let now = Utc::now().timestamp_millis();
        let conn = self.conn()?;
        conn.execute(
            r#"INSERT INTO food_logs (user_id, day_bucket, name, calories, protein, logged_at)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6)"#,
            rusqlite::params![
                user_id,
                entry.day,
                entry.name,
                entry.calories,
                entry.protein,
                now
            ],
        )?;
        Ok(())
    }
}

impl ProfileSource for ProgressionDb {
    fn profile(&self, user_id: &str) -> Result<Option<UserProfile>, StoreError> {
        let conn = self.conn()?;
        let row = conn
            .query_row(
                r#"SELECT weight_kg, height_cm, age, gender, activity_level, primary_goal
                   FROM profiles WHERE user_id = ?1"#,
                [user_id],
                |r| {
                    Ok((
                        r.get::<_, Option<f64>>(0)?,
                        r.get::<_, Option<f64>>(1)?,
                        r.get::<_, Option<u32>>(2)?,
                        r.get::<_, Option<String>>(3)?,
                        r.get::<_, Option<String>>(4)?,
                        r.get::<_, Option<String>>(5)?,
                    ))
                },
            )
            .optional()?;

        // Unknown enum strings are treated as missing
        Ok(row.map(
            |(weight_kg, height_cm, age, gender, activity, goal)| UserProfile {
                weight_kg,
                height_cm,
                age,
                gender: gender.as_deref().and_then(Gender::from_str),
                activity_level: activity.as_deref().and_then(ActivityLevel::from_str),
                primary_goal: goal.as_deref().and_then(PrimaryGoal::from_str),
            },
        ))
    }
}

impl FoodLogSource for ProgressionDb {
    fn daily_totals(&self, user_id: &str, day: &str) -> Result<DailyTotals, StoreError> {
        let conn = self.conn()?;
        let (calories, protein) = conn.query_row(
            r#"SELECT COALESCE(SUM(calories), 0.0), COALESCE(SUM(protein), 0.0)
               FROM food_logs WHERE user_id = ?1 AND day_bucket = ?2"#,
            [user_id, day],
            |r| Ok((r.get::<_, f64>(0)?, r.get::<_, f64>(1)?)),
        )?;
        Ok(DailyTotals { calories, protein })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn entry(day: &str, calories: f64, protein: f64) -> FoodLogEntry {
        FoodLogEntry {
            day: day.to_string(),
            name: None,
            calories,
            protein,
        }
    }

    #[test]
    fn test_daily_totals_sum_one_day() {
        let dir = tempdir().unwrap();
        let db = ProgressionDb::open(&dir.path().join("test.db")).unwrap();

        db.record_food("ana", &entry("2026-04-02", 650.0, 40.0))
            .unwrap();
        db.record_food("ana", &entry("2026-04-02", 820.5, 35.5))
            .unwrap();
        db.record_food("ana", &entry("2026-04-01", 999.0, 99.0))
            .unwrap();
        db.record_food("bob", &entry("2026-04-02", 500.0, 20.0))
            .unwrap();

        let totals = db.daily_totals("ana", "2026-04-02").unwrap();
        assert_eq!(
            totals,
            DailyTotals {
                calories: 1470.5,
                protein: 75.5
            }
        );
        assert_eq!(
            db.daily_totals("ana", "2026-04-03").unwrap(),
            DailyTotals::default()
        );
    }

    #[test]
    fn test_profile_upsert_and_read() {
        let dir = tempdir().unwrap();
        let db = ProgressionDb::open(&dir.path().join("test.db")).unwrap();
        assert_eq!(db.profile("ana").unwrap(), None);

        let mut profile = UserProfile {
            weight_kg: Some(62.5),
            height_cm: Some(168.0),
            age: Some(29),
            gender: Some(Gender::Female),
            activity_level: Some(ActivityLevel::VeryActive),
            primary_goal: Some(PrimaryGoal::WeightLoss),
        };
        db.upsert_profile("ana", &profile).unwrap();
        assert_eq!(db.profile("ana").unwrap(), Some(profile.clone()));

        profile.age = None;
        profile.primary_goal = None;
        db.upsert_profile("ana", &profile).unwrap();
        assert_eq!(db.profile("ana").unwrap(), Some(profile));
    }
}
