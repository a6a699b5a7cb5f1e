//! Shared fixtures for progression integration tests

#![allow(dead_code)]

use std::sync::Arc;

use chrono::NaiveDate;
use tempfile::TempDir;

use nutriquest::config::ProgressionSettings;
use nutriquest::progression::{Clock, FixedClock, ProgressionService, day_key};
use nutriquest::store::{FoodLogEntry, ProgressionDb, ProgressionStore};
use nutriquest::{ActivityLevel, Gender, UserProfile, UserProgression};

/// Temp database, controllable clock and a service wired to both
pub struct TestEnv {
    _dir: TempDir,
    pub db: ProgressionDb,
    pub clock: Arc<FixedClock>,
    pub service: ProgressionService,
}

impl TestEnv {
    pub fn new() -> Self {
        Self::with_settings(ProgressionSettings::default())
    }

    pub fn with_settings(settings: ProgressionSettings) -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let db = ProgressionDb::open(&dir.path().join("progression.db"))
            .expect("Failed to open test db");
        let clock = Arc::new(FixedClock::at_day(
            NaiveDate::from_ymd_opt(2026, 3, 10).expect("valid date"),
        ));
        let service = ProgressionService::new(&settings, db.clone(), clock.clone());
        Self {
            _dir: dir,
            db,
            clock,
            service,
        }
    }

    pub fn today(&self) -> String {
        day_key(self.clock.today())
    }

    pub fn yesterday(&self) -> NaiveDate {
        self.clock.today().pred_opt().expect("valid date")
    }

    /// Register `user_id` and overwrite their progression with `edit` applied
    pub fn seed(&self, user_id: &str, edit: impl FnOnce(&mut UserProgression)) {
        self.service.register(user_id).expect("register");
        let mut current = self.db.load_progression(user_id).expect("load");
        edit(&mut current.progression);
        self.db
            .save_progression(user_id, &current.progression, current.version)
            .expect("save");
    }

    pub fn log_food(&self, user_id: &str, calories: f64, protein: f64) {
        self.db
            .record_food(
                user_id,
                &FoodLogEntry {
                    day: self.today(),
                    name: None,
                    calories,
                    protein,
                },
            )
            .expect("record food");
    }

    pub fn stored(&self, user_id: &str) -> UserProgression {
        self.db.load_progression(user_id).expect("load").progression
    }
}

/// Profile whose calorie target is exactly 2200 kcal (BMR 1600 x 1.375)
/// and protein target 112 g
pub fn profile_2200_kcal() -> UserProfile {
    UserProfile {
        weight_kg: Some(70.0),
        height_cm: Some(160.0),
        age: Some(21),
        gender: Some(Gender::Male),
        activity_level: Some(ActivityLevel::Light),
        primary_goal: None,
    }
}
