//! Per-user commands: register, status, reset

use anyhow::Result;

use nutriquest::progression::TitleDefinition;
use nutriquest::{QuestKind, StreakFamily};

use super::AppContext;

pub fn register_command(ctx: &AppContext, user_id: &str) -> Result<()> {
    if ctx.service().register(user_id)? {
        println!("Registered {}", user_id);
    } else {
        println!("{} already has a progression", user_id);
    }
    Ok(())
}

/// Print level, streaks, titles and today's quests
pub fn status_command(ctx: &AppContext, user_id: &str) -> Result<()> {
    let service = ctx.service();
    let snapshot = service.progression(user_id)?;
    let today = service.daily_quest_status(user_id)?;
    let smart = service.smart_quest_data(user_id)?;

    let progress = &snapshot.level_progress;
    println!(
        "{}: level {} ({}), {} xp, {} coins",
        user_id, progress.level, progress.title, snapshot.xp, snapshot.coins
    );
    println!(
        "  Next level at {} xp ({:.0}%)",
        progress.next_level_xp,
        progress.progress_to_next() * 100.0
    );

    let stats = &snapshot.quest_stats;
    for family in StreakFamily::ALL {
        let streak = stats.streak(family);
        println!(
            "  {}: {} day(s), best {}",
            family.label(),
            streak.current,
            streak.longest
        );
    }
    println!("  Quests completed: {}", stats.total_completed);

    if !snapshot.titles.is_empty() {
        println!("\nTitles:");
        for record in &snapshot.titles {
            let def = TitleDefinition::get(record.title_id);
            println!(
                "  {} - {} ({})",
                def.name,
                def.description,
                record.unlocked_at.format("%Y-%m-%d")
            );
        }
    }

    println!("\nToday:");
    for (quest, entry) in &today {
        let mark = if entry.completed { "x" } else { " " };
        match smart.get(quest) {
            Some(s) => println!(
                "  [{}] {:<9} {:.0} / {:.0}{}",
                mark,
                quest.as_str(),
                s.current_progress,
                s.target,
                if s.claimable { "  (claimable)" } else { "" }
            ),
            None if quest.kind() == QuestKind::Counter => println!(
                "  [{}] {:<9} {:.0} / {}",
                mark,
                quest.as_str(),
                entry.progress,
                service.catalog().steps_goal()
            ),
            None => println!("  [{}] {:<9} {}", mark, quest.as_str(), quest.label()),
        }
    }

    Ok(())
}

pub fn reset_command(ctx: &AppContext, user_id: &str) -> Result<()> {
    let snapshot = ctx.service().reset(user_id)?;
    println!(
        "Reset {} to level {} with {} xp",
        user_id, snapshot.level, snapshot.xp
    );
    Ok(())
}
