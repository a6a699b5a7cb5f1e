//! Progression service - request-level orchestration
//!
//! Every mutating operation follows the same cycle:
//!
//! ```text
//! load (document, version)
//!   -> expire stale streaks
//!   -> RewardLedger::claim_reward (guard, streaks, xp/level, coins, log)
//!   -> TitleUnlockEngine::check_and_unlock
//!   -> prune old day keys (optional)
//!   -> conditional save; on conflict start over from load
//! ```
//!
//! The whole cycle is retried, never a part of it.

use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use tracing::{debug, info, warn};

use super::calendar::{Clock, day_key};
use super::catalog::QuestCatalog;
use super::error::ProgressionError;
use super::ledger::{Eligibility, RewardGrant, RewardLedger};
use super::levels::Level;
use super::streaks::StreakTracker;
use super::titles::TitleUnlockEngine;
use super::views::{
    DailyQuestStatus, ProgressionSnapshot, QuestOutcome, QuestStatusEntry, SmartQuestData,
    SmartQuestEntry,
};
use crate::config::ProgressionSettings;
use crate::domain::{QuestKind, QuestType, UserProfile, UserProgression};
use crate::store::{
    DailyTotals, FoodLogSource, ProfileSource, ProgressionDb, ProgressionStore, StoreError,
    VersionedProgression,
};

/// What to do with the mutated copy at the end of an attempt
enum Commit<T> {
    Save(T),
    Skip(T),
}

pub struct ProgressionService {
    store: Arc<dyn ProgressionStore>,
    food_log: Arc<dyn FoodLogSource>,
    profiles: Arc<dyn ProfileSource>,
    clock: Arc<dyn Clock>,
    ledger: RewardLedger,
    titles: TitleUnlockEngine,
    streaks: StreakTracker,
    max_attempts: u32,
    guard_retention_days: Option<u32>,
}

impl ProgressionService {
    /// Service backed entirely by one SQLite database
    pub fn new(settings: &ProgressionSettings, db: ProgressionDb, clock: Arc<dyn Clock>) -> Self {
        let db = Arc::new(db);
        Self::with_collaborators(settings, db.clone(), db.clone(), db, clock)
    }

    pub fn with_collaborators(
        settings: &ProgressionSettings,
        store: Arc<dyn ProgressionStore>,
        food_log: Arc<dyn FoodLogSource>,
        profiles: Arc<dyn ProfileSource>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let catalog = QuestCatalog::new(settings.daily_steps_goal);
        Self {
            store,
            food_log,
            profiles,
            clock,
            ledger: RewardLedger::new(catalog, settings.activity_log_cap),
            titles: TitleUnlockEngine::new(settings.activity_log_cap),
            streaks: StreakTracker,
            max_attempts: settings.max_conflict_retries.saturating_add(1),
            guard_retention_days: settings.guard_retention_days,
        }
    }

    pub fn catalog(&self) -> &QuestCatalog {
        self.ledger.catalog()
    }

    /// Create a zeroed progression for a new account (idempotent)
    pub fn register(&self, user_id: &str) -> Result<bool, ProgressionError> {
        let created = self.store.create_progression(user_id)?;
        if created {
            info!("[nq:progress] Registered {}", user_id);
        }
        Ok(created)
    }

    /// Admin/test reset: back to a zeroed progression
    pub fn reset(&self, user_id: &str) -> Result<ProgressionSnapshot, ProgressionError> {
        self.mutate(user_id, |progression, _, _| {
            *progression = UserProgression::default();
            Ok(Commit::Save(ProgressionSnapshot::from(&*progression)))
        })
        .inspect(|_| warn!("[nq:progress] Progression reset for {}", user_id))
    }

    /// Record quest progress and grant the reward the first time it completes today
    ///
    /// `completed = Some(false)` on a toggle quest unchecks it for today. The
    /// reward is not refunded, and checking it again later the same day does
    /// not grant it a second time.
    pub fn update_quest_progress(
        &self,
        user_id: &str,
        quest: QuestType,
        progress: f64,
        completed: Option<bool>,
    ) -> Result<QuestOutcome, ProgressionError> {
        let progress = if progress.is_finite() {
            progress.max(0.0)
        } else {
            0.0
        };

        self.mutate(user_id, |p, today, now| {
            let day = day_key(today);
            let kind = quest.kind();

            if kind == QuestKind::Toggle && completed == Some(false) {
                return Ok(self.uncheck(p, quest, &day));
            }

            let (progress, target) = match kind {
                QuestKind::Toggle => {
                    let forced = if completed == Some(true) { 1.0 } else { 0.0 };
                    (progress.max(forced), 1.0)
                }
                QuestKind::Counter => {
                    let target = self.catalog().target_for(quest, &UserProfile::default());
                    p.day_record_mut(quest, &day).progress = progress;
                    (progress, target)
                }
                // Client-reported numbers are never trusted for smart quests
                QuestKind::Smart => self.smart_progress(user_id, quest, &day)?,
            };

            if progress < target {
                let outcome = QuestOutcome::build(p, quest, &day, None, Vec::new());
                return Ok(if kind == QuestKind::Counter {
                    Commit::Save(outcome)
                } else {
                    Commit::Skip(outcome)
                });
            }

            let eligibility = match kind {
                QuestKind::Toggle => Eligibility::Toggle,
                _ => Eligibility::Threshold { progress, target },
            };
            match self.ledger.claim_reward(p, quest, eligibility, today, now) {
                Ok(grant) => Ok(Commit::Save(
                    self.finish_claim(user_id, p, &day, &grant, now),
                )),
                Err(ProgressionError::AlreadyClaimed { .. }) => {
                    Ok(self.recheck(p, quest, &day, kind, now))
                }
                Err(e) => Err(e),
            }
        })
    }

    /// Claim a smart quest (calories/protein) using server-side food totals
    pub fn claim_smart_quest_reward(
        &self,
        user_id: &str,
        quest: QuestType,
    ) -> Result<QuestOutcome, ProgressionError> {
        if !quest.is_smart() {
            return Err(ProgressionError::NotSmartQuest(quest));
        }

        self.mutate(user_id, |p, today, now| {
            let day = day_key(today);
            let (progress, target) = self.smart_progress(user_id, quest, &day)?;

            match self.ledger.claim_reward(
                p,
                quest,
                Eligibility::Threshold { progress, target },
                today,
                now,
            ) {
                Ok(grant) => Ok(Commit::Save(
                    self.finish_claim(user_id, p, &day, &grant, now),
                )),
                Err(ProgressionError::AlreadyClaimed { .. }) => {
                    debug!("[nq:progress] {} already claimed {} today", user_id, quest);
                    Ok(Commit::Skip(QuestOutcome::build(
                        p,
                        quest,
                        &day,
                        None,
                        Vec::new(),
                    )))
                }
                Err(e) => Err(e),
            }
        })
    }

    /// Completion state of every quest for today
    pub fn daily_quest_status(&self, user_id: &str) -> Result<DailyQuestStatus, ProgressionError> {
        let VersionedProgression { progression, .. } = self.store.load_progression(user_id)?;
        let day = day_key(self.clock.today());

        Ok(QuestType::ALL
            .iter()
            .map(|&quest| {
                let record = progression.day_record(quest, &day);
                let completed = progression.is_completed(quest, &day);
                let entry = QuestStatusEntry {
                    completed,
                    completed_at: record.and_then(|r| r.completed_at).filter(|_| completed),
                    progress: record.map_or(0.0, |r| r.progress),
                };
                (quest, entry)
            })
            .collect())
    }

    /// Targets, live food-log progress and claim state of the smart quests
    pub fn smart_quest_data(&self, user_id: &str) -> Result<SmartQuestData, ProgressionError> {
        let VersionedProgression { progression, .. } = self.store.load_progression(user_id)?;
        let day = day_key(self.clock.today());
        let profile = self.profile_for(user_id)?;
        let totals = self.food_log.daily_totals(user_id, &day)?;

        Ok(QuestType::ALL
            .iter()
            .filter(|q| q.is_smart())
            .map(|&quest| {
                let target = self.catalog().target_for(quest, &profile);
                let current_progress = totals_for(&totals, quest);
                let completed = progression.is_claimed(quest, &day);
                let entry = SmartQuestEntry {
                    target,
                    current_progress,
                    completed,
                    claimable: !completed && current_progress >= target,
                };
                (quest, entry)
            })
            .collect())
    }

    /// Read-only progression view; stale streaks show as zero
    pub fn progression(&self, user_id: &str) -> Result<ProgressionSnapshot, ProgressionError> {
        let VersionedProgression {
            mut progression, ..
        } = self.store.load_progression(user_id)?;
        self.streaks
            .expire_stale(&mut progression.quest_stats, self.clock.today());
        Ok(ProgressionSnapshot::from(&progression))
    }

    fn uncheck(
        &self,
        p: &mut UserProgression,
        quest: QuestType,
        day: &str,
    ) -> Commit<QuestOutcome> {
        let was_completed = p.is_completed(quest, day);
        if p.is_claimed(quest, day) {
            p.set_guard(quest, day, false);
        }
        if let Some(record) = p.quest_log.get_mut(day).and_then(|d| d.get_mut(&quest)) {
            record.progress = 0.0;
            record.completed_at = None;
        }

        let outcome = QuestOutcome::build(p, quest, day, None, Vec::new());
        if was_completed {
            debug!("[nq:progress] {} unchecked for {}", quest, day);
            Commit::Save(outcome)
        } else {
            Commit::Skip(outcome)
        }
    }

    /// Quest completed again after the reward was already granted today
    fn recheck(
        &self,
        p: &mut UserProgression,
        quest: QuestType,
        day: &str,
        kind: QuestKind,
        now: DateTime<Utc>,
    ) -> Commit<QuestOutcome> {
        let mut dirty = kind == QuestKind::Counter;
        if !p.is_completed(quest, day) {
            p.set_guard(quest, day, true);
            let record = p.day_record_mut(quest, day);
            record.completed_at = Some(now);
            record.progress = record.progress.max(1.0);
            dirty = true;
        }

        let outcome = QuestOutcome::build(p, quest, day, None, Vec::new());
        if dirty {
            Commit::Save(outcome)
        } else {
            Commit::Skip(outcome)
        }
    }

    fn finish_claim(
        &self,
        user_id: &str,
        p: &mut UserProgression,
        day: &str,
        grant: &RewardGrant,
        now: DateTime<Utc>,
    ) -> QuestOutcome {
        let unlocked = self.titles.check_and_unlock(p, now);

        info!(
            "[nq:progress] {} completed {}: +{} xp, +{} coins (xp={}, level={})",
            user_id, grant.quest, grant.xp_gained, grant.coins_gained, p.xp, p.level
        );
        for (family, current) in &grant.streaks.changed {
            debug!(
                "[nq:progress] {} {:?} streak now {}",
                user_id, family, current
            );
        }
        if let Some(up) = &grant.level_up {
            info!(
                "[nq:progress] {} leveled up {} -> {} ({})",
                user_id, up.old_level, up.new_level, up.new_title
            );
        }

        QuestOutcome::build(p, grant.quest, day, Some(grant), unlocked)
    }

    fn smart_progress(
        &self,
        user_id: &str,
        quest: QuestType,
        day: &str,
    ) -> Result<(f64, f64), ProgressionError> {
        let profile = self.profile_for(user_id)?;
        let totals = self.food_log.daily_totals(user_id, day)?;
        Ok((
            totals_for(&totals, quest),
            self.catalog().target_for(quest, &profile),
        ))
    }

    fn profile_for(&self, user_id: &str) -> Result<UserProfile, ProgressionError> {
        let profile = self.profiles.profile(user_id)?.unwrap_or_default();
        if !profile.has_body_metrics() {
            debug!(
                "[nq:progress] Incomplete profile for {}, using default targets",
                user_id
            );
        }
        Ok(profile)
    }

    fn prune(&self, progression: &mut UserProgression, today: NaiveDate) {
        let Some(days) = self.guard_retention_days else {
            return;
        };
        let Some(cutoff) = today.checked_sub_signed(Duration::days(i64::from(days))) else {
            return;
        };
        let removed = progression.prune_days_before(&day_key(cutoff));
        if removed > 0 {
            debug!(
                "[nq:progress] Pruned {} day keys before {}",
                removed, cutoff
            );
        }
    }

    /// Load, apply `op` to a copy, save conditionally; retry the lot on conflict
    fn mutate<T>(
        &self,
        user_id: &str,
        mut op: impl FnMut(
            &mut UserProgression,
            NaiveDate,
            DateTime<Utc>,
        ) -> Result<Commit<T>, ProgressionError>,
    ) -> Result<T, ProgressionError> {
        for attempt in 1..=self.max_attempts {
            let VersionedProgression {
                mut progression,
                version,
            } = self.store.load_progression(user_id)?;
            let today = self.clock.today();
            let now = self.clock.now();

            progression.level = Level::for_xp(progression.xp);
            self.streaks
                .expire_stale(&mut progression.quest_stats, today);

            let value = match op(&mut progression, today, now)? {
                Commit::Skip(value) => return Ok(value),
                Commit::Save(value) => value,
            };

            self.prune(&mut progression, today);
            match self.store.save_progression(user_id, &progression, version) {
                Ok(_) => return Ok(value),
                Err(StoreError::Conflict { .. }) if attempt < self.max_attempts => {
                    warn!(
                        "[nq:progress] Write conflict for {} (attempt {}/{}), retrying",
                        user_id, attempt, self.max_attempts
                    );
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(ProgressionError::PersistenceConflict {
            user_id: user_id.to_string(),
        })
    }
}

fn totals_for(totals: &DailyTotals, quest: QuestType) -> f64 {
    match quest {
        QuestType::Calories => totals.calories,
        QuestType::Protein => totals.protein,
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;
    use crate::domain::{ActivityKind, TitleId};
    use crate::progression::calendar::FixedClock;
    use crate::progression::catalog::DEFAULT_CALORIE_TARGET;

    /// In-memory store; the first `conflicts` saves fail as if another writer won
    #[derive(Default)]
    struct MemoryStore {
        docs: Mutex<HashMap<String, (UserProgression, i64)>>,
        conflicts: AtomicU32,
        saves: AtomicU32,
    }

    impl ProgressionStore for MemoryStore {
        fn create_progression(&self, user_id: &str) -> Result<bool, StoreError> {
            let mut docs = self.docs.lock().unwrap();
            if docs.contains_key(user_id) {
                return Ok(false);
            }
            docs.insert(user_id.to_string(), (UserProgression::default(), 1));
            Ok(true)
        }

        fn load_progression(&self, user_id: &str) -> Result<VersionedProgression, StoreError> {
            let docs = self.docs.lock().unwrap();
            let (progression, version) =
                docs.get(user_id)
                    .cloned()
                    .ok_or_else(|| StoreError::NotFound {
                        user_id: user_id.to_string(),
                    })?;
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
            let mut docs = self.docs.lock().unwrap();
            let entry = docs.get_mut(user_id).unwrap();
            if self
                .conflicts
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
            {
                // Simulate a concurrent writer bumping the version
                entry.1 += 1;
            }
            if entry.1 != expected_version {
                return Err(StoreError::Conflict {
                    user_id: user_id.to_string(),
                });
            }
            *entry = (progression.clone(), expected_version + 1);
            self.saves.fetch_add(1, Ordering::SeqCst);
            Ok(expected_version + 1)
        }
    }

    #[derive(Default)]
    struct MemoryFood {
        totals: Mutex<HashMap<String, DailyTotals>>,
    }

    impl MemoryFood {
        fn set(&self, day: &str, calories: f64, protein: f64) {
            self.totals
                .lock()
                .unwrap()
                .insert(day.to_string(), DailyTotals { calories, protein });
        }
    }

    impl FoodLogSource for MemoryFood {
        fn daily_totals(&self, _user_id: &str, day: &str) -> Result<DailyTotals, StoreError> {
            Ok(self
                .totals
                .lock()
                .unwrap()
                .get(day)
                .copied()
                .unwrap_or_default())
        }
    }

    struct FixedProfile(Option<UserProfile>);

    impl ProfileSource for FixedProfile {
        fn profile(&self, _user_id: &str) -> Result<Option<UserProfile>, StoreError> {
            Ok(self.0.clone())
        }
    }

    struct Harness {
        service: ProgressionService,
        store: Arc<MemoryStore>,
        food: Arc<MemoryFood>,
        clock: Arc<FixedClock>,
    }

    impl Harness {
        fn today(&self) -> String {
            day_key(self.clock.today())
        }
    }

    fn harness_with(settings: ProgressionSettings) -> Harness {
        let store = Arc::new(MemoryStore::default());
        let food = Arc::new(MemoryFood::default());
        let clock = Arc::new(FixedClock::at_day(
            NaiveDate::from_ymd_opt(2026, 5, 4).unwrap(),
        ));
        let service = ProgressionService::with_collaborators(
            &settings,
            store.clone(),
            food.clone(),
            Arc::new(FixedProfile(None)),
            clock.clone(),
        );
        service.register("ana").unwrap();
        Harness {
            service,
            store,
            food,
            clock,
        }
    }

    fn harness() -> Harness {
        harness_with(ProgressionSettings::default())
    }

    #[test]
    fn test_toggle_completion_grants_once() {
        let h = harness();
        let first = h
            .service
            .update_quest_progress("ana", QuestType::Exercise, 1.0, None)
            .unwrap();
        assert!(first.completed);
        assert_eq!((first.xp, first.coins, first.level), (40, 18, 1));
        assert!(!first.already_claimed);

        let second = h
            .service
            .update_quest_progress("ana", QuestType::Exercise, 1.0, Some(true))
            .unwrap();
        assert!(second.already_claimed);
        assert_eq!((second.xp, second.coins, second.xp_gained), (40, 18, 0));
        assert_eq!(h.store.saves.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_toggle_below_one_does_nothing() {
        let h = harness();
        let outcome = h
            .service
            .update_quest_progress("ana", QuestType::Water, 0.5, None)
            .unwrap();
        assert!(!outcome.completed);
        assert_eq!(outcome.xp, 0);
        assert_eq!(h.store.saves.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_uncheck_then_recheck_does_not_regrant() {
        let h = harness();
        h.service
            .update_quest_progress("ana", QuestType::Sleep, 1.0, Some(true))
            .unwrap();

        let unchecked = h
            .service
            .update_quest_progress("ana", QuestType::Sleep, 0.0, Some(false))
            .unwrap();
        assert!(!unchecked.completed);
        assert_eq!(unchecked.xp, 30);

        let status = h.service.daily_quest_status("ana").unwrap();
        assert!(!status[&QuestType::Sleep].completed);
        assert_eq!(status[&QuestType::Sleep].completed_at, None);

        let rechecked = h
            .service
            .update_quest_progress("ana", QuestType::Sleep, 1.0, Some(true))
            .unwrap();
        assert!(rechecked.completed);
        assert!(rechecked.already_claimed);
        assert_eq!(rechecked.xp, 30);
        assert_eq!(rechecked.quest_stats.total_completed, 1);
    }

    #[test]
    fn test_uncheck_never_touched_quest_is_a_noop() {
        let h = harness();
        let outcome = h
            .service
            .update_quest_progress("ana", QuestType::Meal, 0.0, Some(false))
            .unwrap();
        assert!(!outcome.completed);
        assert_eq!(h.store.saves.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_steps_progress_recorded_until_goal() {
        let h = harness();
        let partial = h
            .service
            .update_quest_progress("ana", QuestType::Steps, 4200.0, None)
            .unwrap();
        assert!(!partial.completed);
        assert_eq!(
            h.service.daily_quest_status("ana").unwrap()[&QuestType::Steps].progress,
            4200.0
        );

        let done = h
            .service
            .update_quest_progress("ana", QuestType::Steps, 10_250.0, None)
            .unwrap();
        assert!(done.completed);
        assert_eq!(done.xp_gained, 30);

        let more = h
            .service
            .update_quest_progress("ana", QuestType::Steps, 12_000.0, None)
            .unwrap();
        assert!(more.already_claimed);
        assert_eq!(more.xp, 30);
        assert_eq!(
            h.service.daily_quest_status("ana").unwrap()[&QuestType::Steps].progress,
            12_000.0
        );
    }

    #[test]
    fn test_smart_claim_requires_food_totals() {
        let h = harness();
        let today = h.today();
        h.food.set(&today, 1800.0, 50.0);

        let err = h
            .service
            .claim_smart_quest_reward("ana", QuestType::Calories)
            .unwrap_err();
        assert!(matches!(err, ProgressionError::NotYetEligible { .. }));
        assert_eq!(h.service.progression("ana").unwrap().xp, 0);

        h.food.set(&today, 2000.0, 50.0);
        let outcome = h
            .service
            .claim_smart_quest_reward("ana", QuestType::Calories)
            .unwrap();
        assert_eq!(outcome.xp_gained, 50);
        assert_eq!(outcome.quest_stats.calorie_streak, 1);

        let again = h
            .service
            .claim_smart_quest_reward("ana", QuestType::Calories)
            .unwrap();
        assert!(again.already_claimed);
        assert_eq!((again.xp, again.coins), (outcome.xp, outcome.coins));
    }

    #[test]
    fn test_smart_update_ignores_client_progress() {
        let h = harness();
        let outcome = h
            .service
            .update_quest_progress("ana", QuestType::Protein, 500.0, Some(true))
            .unwrap();
        assert!(!outcome.completed);
        assert_eq!(outcome.xp, 0);
    }

    #[test]
    fn test_claim_rejects_toggle_quest() {
        let h = harness();
        let err = h
            .service
            .claim_smart_quest_reward("ana", QuestType::Water)
            .unwrap_err();
        assert!(matches!(
            err,
            ProgressionError::NotSmartQuest(QuestType::Water)
        ));
    }

    #[test]
    fn test_unknown_user_is_not_found() {
        let h = harness();
        let err = h
            .service
            .update_quest_progress("ghost", QuestType::Water, 1.0, None)
            .unwrap_err();
        assert!(matches!(err, ProgressionError::NotFound { .. }));
    }

    #[test]
    fn test_conflict_retries_whole_operation() {
        let h = harness();
        h.store.conflicts.store(2, Ordering::SeqCst);
        let outcome = h
            .service
            .update_quest_progress("ana", QuestType::Water, 1.0, None)
            .unwrap();
        assert_eq!(outcome.xp, 20);
        assert_eq!(h.service.progression("ana").unwrap().xp, 20);
    }

    #[test]
    fn test_conflicts_exhaust_retries() {
        let settings = ProgressionSettings {
            max_conflict_retries: 1,
            ..Default::default()
        };
        let h = harness_with(settings);
        h.store.conflicts.store(5, Ordering::SeqCst);
        let err = h
            .service
            .update_quest_progress("ana", QuestType::Water, 1.0, None)
            .unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(h.service.progression("ana").unwrap().xp, 0);
    }

    #[test]
    fn test_week_of_quests_unlocks_streak_legend() {
        let h = harness();
        let mut unlocked = Vec::new();
        for _ in 0..7 {
            let outcome = h
                .service
                .update_quest_progress("ana", QuestType::Meal, 1.0, None)
                .unwrap();
            unlocked.extend(outcome.unlocked_titles);
            h.clock.advance_days(1);
        }
        assert_eq!(unlocked, vec![TitleId::StreakLegend]);

        // Two idle days break the streak but keep the title
        h.clock.advance_days(2);
        let snapshot = h.service.progression("ana").unwrap();
        assert_eq!(snapshot.quest_stats.current_streak, 0);
        assert_eq!(snapshot.quest_stats.longest_streak, 7);
        assert_eq!(snapshot.titles.len(), 1);
        assert_eq!(snapshot.coins, 7 * 8 + 100);
    }

    #[test]
    fn test_retention_prunes_old_days() {
        let settings = ProgressionSettings {
            guard_retention_days: Some(2),
            ..Default::default()
        };
        let h = harness_with(settings);
        let first_day = h.today();
        h.service
            .update_quest_progress("ana", QuestType::Water, 1.0, None)
            .unwrap();
        h.clock.advance_days(5);
        h.service
            .update_quest_progress("ana", QuestType::Water, 1.0, None)
            .unwrap();

        let stored = h.store.load_progression("ana").unwrap().progression;
        assert!(!stored.daily_completions.contains_key(&first_day));
        assert_eq!(stored.daily_completions.len(), 1);
    }

    #[test]
    fn test_huge_retention_window_keeps_everything() {
        let settings = ProgressionSettings {
            guard_retention_days: Some(200_000_000),
            ..Default::default()
        };
        let h = harness_with(settings);
        let outcome = h
            .service
            .update_quest_progress("ana", QuestType::Water, 1.0, None)
            .unwrap();
        assert!(outcome.completed);

        let stored = h.store.load_progression("ana").unwrap().progression;
        assert!(stored.daily_completions.contains_key(&h.today()));
    }

    #[test]
    fn test_stored_level_is_rederived_from_xp() {
        let h = harness();
        {
            let mut docs = h.store.docs.lock().unwrap();
            let entry = docs.get_mut("ana").unwrap();
            entry.0.xp = 5000;
            entry.0.level = 1;
        }

        let snapshot = h.service.progression("ana").unwrap();
        assert_eq!(snapshot.level, 10);
        assert_eq!(snapshot.level_progress.level, 10);

        let outcome = h
            .service
            .update_quest_progress("ana", QuestType::Water, 1.0, None)
            .unwrap();
        assert_eq!(outcome.level, 10);
        assert!(!outcome.leveled_up);

        let stored = h.store.load_progression("ana").unwrap().progression;
        assert_eq!(stored.level, 10);
        assert!(
            stored
                .activity_log
                .iter()
                .all(|entry| entry.kind != ActivityKind::LevelUp)
        );
    }

    #[test]
    fn test_reset_zeroes_progression() {
        let h = harness();
        h.service
            .update_quest_progress("ana", QuestType::Exercise, 1.0, None)
            .unwrap();
        let snapshot = h.service.reset("ana").unwrap();
        assert_eq!(snapshot.xp, 0);
        assert_eq!(snapshot.level, 1);
        assert!(!h.service.daily_quest_status("ana").unwrap()[&QuestType::Exercise].completed);
    }

    #[test]
    fn test_smart_quest_data_reports_claimable() {
        let h = harness();
        h.food.set(&h.today(), 2100.0, 40.0);
        let data = h.service.smart_quest_data("ana").unwrap();
        assert_eq!(data.len(), 2);
        let calories = &data[&QuestType::Calories];
        assert_eq!(calories.target, DEFAULT_CALORIE_TARGET);
        assert!(calories.claimable);
        assert!(!data[&QuestType::Protein].claimable);
        assert_eq!(data[&QuestType::Protein].target, 112.0);
    }
}
