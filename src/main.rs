use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cli;

use cli::AppContext;
use cli::seed::ProfileArgs;

#[derive(Parser)]
#[command(name = "nutriquest")]
#[command(about = "Quest, streak and reward progression server for NutriQuest")]
#[command(version)]
struct Cli {
    /// Path to the config file (defaults to ~/.nutriquest/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Path to the SQLite database (overrides storage.db_path)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API
    Serve {
        /// Port to listen on (overrides server.port)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Write a default ~/.nutriquest/config.toml
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },

    /// Create a zeroed progression for a user
    Register { user: String },

    /// Show a user's level, streaks, titles and today's quests
    Status { user: String },

    /// Reset a user's progression to zero
    Reset { user: String },

    /// Create or replace a user's profile
    Profile {
        user: String,
        /// Body weight in kg
        #[arg(long)]
        weight: Option<f64>,
        /// Height in cm
        #[arg(long)]
        height: Option<f64>,
        #[arg(long)]
        age: Option<u32>,
        /// male, female or other
        #[arg(long)]
        gender: Option<String>,
        /// sedentary, light, moderate, active or very-active
        #[arg(long)]
        activity: Option<String>,
        /// weight-loss, muscle-gain, maintenance or general-health
        #[arg(long)]
        goal: Option<String>,
    },

    /// Add a food log entry
    LogFood {
        user: String,
        #[arg(long)]
        calories: f64,
        #[arg(long)]
        protein: f64,
        /// Food name
        #[arg(long)]
        name: Option<String>,
        /// Day as YYYY-MM-DD (defaults to today)
        #[arg(long)]
        date: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .init();

    if let Commands::Init { force } = cli.command {
        return cli::init::init_command(cli.config, force);
    }

    let ctx = AppContext::load(cli.config.as_deref(), cli.db)?;

    match cli.command {
        Commands::Serve { port } => cli::serve::serve_command(ctx, port)?,
        Commands::Register { user } => cli::user::register_command(&ctx, &user)?,
        Commands::Status { user } => cli::user::status_command(&ctx, &user)?,
        Commands::Reset { user } => cli::user::reset_command(&ctx, &user)?,
        Commands::Profile {
            user,
            weight,
            height,
            age,
            gender,
            activity,
            goal,
        } => cli::seed::profile_command(
            &ctx,
            &user,
            ProfileArgs {
                weight,
                height,
                age,
                gender,
                activity,
                goal,
            },
        )?,
        Commands::LogFood {
            user,
            calories,
            protein,
            name,
            date,
        } => cli::seed::log_food_command(&ctx, &user, name, calories, protein, date)?,
        Commands::Init { .. } => {}
    }

    Ok(())
}
