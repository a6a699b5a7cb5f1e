//! XP and Level system
//!
//! Fixed, accelerating thresholds for levels 1-10, then a flat cost per level.

/// Level definition
#[derive(Debug, Clone)]
pub struct Level {
    pub level: u32,
    pub xp_required: u64,
    pub title: &'static str,
}

/// Table-driven levels (must be sorted by level)
pub static LEVELS: &[Level] = &[
    Level {
        level: 1,
        xp_required: 0,
        title: "Rookie",
    },
    Level {
        level: 2,
        xp_required: 100,
        title: "Rookie",
    },
    Level {
        level: 3,
        xp_required: 300,
        title: "Regular",
    },
    Level {
        level: 4,
        xp_required: 600,
        title: "Regular",
    },
    Level {
        level: 5,
        xp_required: 1000,
        title: "Committed",
    },
    Level {
        level: 6,
        xp_required: 1500,
        title: "Committed",
    },
    Level {
        level: 7,
        xp_required: 2100,
        title: "Athlete",
    },
    Level {
        level: 8,
        xp_required: 2800,
        title: "Athlete",
    },
    Level {
        level: 9,
        xp_required: 3600,
        title: "Champion",
    },
    Level {
        level: 10,
        xp_required: 4500,
        title: "Champion",
    },
];

/// XP per level once the table runs out
pub const LATE_LEVEL_XP: u64 = 1000;

const LATE_TITLE: &str = "Legend";

fn last_level() -> &'static Level {
    &LEVELS[LEVELS.len() - 1]
}

impl Level {
    /// Level number for a cumulative XP total
    pub fn for_xp(xp: u64) -> u32 {
        let last = last_level();
        if xp >= last.xp_required {
            let extra = (xp - last.xp_required) / LATE_LEVEL_XP;
            return last.level + u32::try_from(extra).unwrap_or(u32::MAX - last.level);
        }

        LEVELS
            .iter()
            .rev()
            .find(|l| xp >= l.xp_required)
            .map(|l| l.level)
            .unwrap_or(1)
    }

    /// Minimum XP at which `level` is reached (levels below 1 are treated as 1)
    pub fn xp_floor(level: u32) -> u64 {
        let last = last_level();
        if level > last.level {
            return last.xp_required + u64::from(level - last.level) * LATE_LEVEL_XP;
        }

        LEVELS
            .iter()
            .find(|l| l.level == level.max(1))
            .map(|l| l.xp_required)
            .unwrap_or(0)
    }

    /// Display title for a level
    pub fn title(level: u32) -> &'static str {
        if level > last_level().level {
            return LATE_TITLE;
        }
        LEVELS
            .iter()
            .find(|l| l.level == level.max(1))
            .map(|l| l.title)
            .unwrap_or(LEVELS[0].title)
    }
}

/// Level view derived from an XP total
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct LevelProgress {
    pub total_xp: u64,
    pub level: u32,
    pub title: String,
    /// XP at which the current level started
    pub current_level_xp: u64,
    /// XP at which the next level starts
    pub next_level_xp: u64,
}

impl LevelProgress {
    pub fn new(total_xp: u64) -> Self {
        let level = Level::for_xp(total_xp);
        Self {
            total_xp,
            level,
            title: Level::title(level).to_string(),
            current_level_xp: Level::xp_floor(level),
            next_level_xp: Level::xp_floor(level + 1),
        }
    }

    /// Progress towards the next level (0.0 - 1.0)
    pub fn progress_to_next(&self) -> f32 {
        let span = self.next_level_xp - self.current_level_xp;
        if span == 0 {
            return 1.0;
        }
        (self.total_xp - self.current_level_xp) as f32 / span as f32
    }
}
