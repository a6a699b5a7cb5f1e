//! Write helpers for the collaborator tables (profile, food log)
//!
//! In production these tables are owned by the rest of the app. The commands
//! exist for local setups and manual testing.

use anyhow::{Result, anyhow};

use nutriquest::progression::{Clock, SystemClock, day_key, parse_day_key};
use nutriquest::store::FoodLogEntry;
use nutriquest::{ActivityLevel, Gender, PrimaryGoal, UserProfile};

use super::AppContext;

/// Profile fields as given on the command line
#[derive(Debug, Default)]
pub struct ProfileArgs {
    pub weight: Option<f64>,
    pub height: Option<f64>,
    pub age: Option<u32>,
    pub gender: Option<String>,
    pub activity: Option<String>,
    pub goal: Option<String>,
}

impl ProfileArgs {
    fn into_profile(self) -> Result<UserProfile> {
        Ok(UserProfile {
            weight_kg: self.weight,
            height_cm: self.height,
            age: self.age,
            gender: parse_opt(self.gender, Gender::from_str, "gender")?,
            activity_level: parse_opt(self.activity, ActivityLevel::from_str, "activity level")?,
            primary_goal: parse_opt(self.goal, PrimaryGoal::from_str, "goal")?,
        })
    }
}

fn parse_opt<T>(
    value: Option<String>,
    parse: fn(&str) -> Option<T>,
    what: &str,
) -> Result<Option<T>> {
    value
        .map(|v| parse(v.trim()).ok_or_else(|| anyhow!("Unknown {}: {}", what, v)))
        .transpose()
}

pub fn profile_command(ctx: &AppContext, user_id: &str, args: ProfileArgs) -> Result<()> {
    let profile = args.into_profile()?;
    ctx.db.upsert_profile(user_id, &profile)?;

    let service = ctx.service();
    println!(
        "Profile saved for {}: calorie target {:.0} kcal, protein target {:.0} g",
        user_id,
        service
            .catalog()
            .target_for(nutriquest::QuestType::Calories, &profile),
        service
            .catalog()
            .target_for(nutriquest::QuestType::Protein, &profile)
    );
    Ok(())
}

pub fn log_food_command(
    ctx: &AppContext,
    user_id: &str,
    name: Option<String>,
    calories: f64,
    protein: f64,
    date: Option<String>,
) -> Result<()> {
    if calories < 0.0 || protein < 0.0 {
        return Err(anyhow!("Calories and protein must not be negative"));
    }

    let day = match date {
        Some(date) => {
            let parsed = parse_day_key(&date)
                .ok_or_else(|| anyhow!("Invalid date (expected YYYY-MM-DD): {}", date))?;
            day_key(parsed)
        }
        None => day_key(SystemClock::new(ctx.config.progression.utc_offset_minutes).today()),
    };

    ctx.db.record_food(
        user_id,
        &FoodLogEntry {
            day: day.clone(),
            name,
            calories,
            protein,
        },
    )?;
    println!(
        "Logged {:.0} kcal / {:.0} g protein for {} on {}",
        calories, protein, user_id, day
    );
    Ok(())
}
