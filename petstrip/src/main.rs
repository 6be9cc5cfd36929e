//! petstrip - analyze photos of pet urine test strips
//!
//! Provides commands for:
//! - Analyzing a strip photo and saving the glucose and pH readings
//! - Recording the context of a measurement (water, meal timing, hour)
//! - Reviewing the history as a list, a calendar or statistics
//! - Exporting or clearing the history
//!
//! Uses XDG Base Directory specification for file locations:
//! - Database: $XDG_DATA_HOME/petstrip/data.db (~/.local/share/petstrip/data.db)
//! - Config: $XDG_CONFIG_HOME/petstrip/config.toml (~/.config/petstrip/config.toml)
//! - Logs: $XDG_STATE_HOME/petstrip/petstrip.log (~/.local/state/petstrip/petstrip.log)

mod render;

use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand, ValueEnum};
use petstrip_core::analytics::{calendar_view, stats_view};
use petstrip_core::history::export_file_name;
use petstrip_core::{
    AnalysisOutcome, Config, Database, MemoryStore, PersistenceStore, Repository, SyncAnalyzer,
    UserInputs,
};
use std::path::PathBuf;

type Repo = Repository<Box<dyn PersistenceStore>>;

#[derive(Parser)]
#[command(name = "petstrip")]
#[command(about = "Estimate glucose risk and pH from a photo of a pet urine test strip")]
#[command(version)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Analyze a test strip photo
    Analyze {
        /// Photo of the test pad (JPEG, PNG, ...)
        image: PathBuf,

        /// Save the reading to today's record
        #[arg(short, long, value_enum)]
        save: Option<SaveTarget>,

        /// Output format
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Show or update the measurement context
    Inputs {
        /// Water drunk before sampling, in ml
        #[arg(long)]
        water: Option<u32>,

        /// Minutes between sampling and taking the photo
        #[arg(long)]
        elapsed: Option<u32>,

        /// Minutes since the last meal
        #[arg(long)]
        after_meal: Option<u32>,

        /// Hour of day the sample was taken (0-23)
        #[arg(long, value_parser = clap::value_parser!(u32).range(0..24), conflicts_with = "clear_hour")]
        hour: Option<u32>,

        /// Use the clock's hour again
        #[arg(long)]
        clear_hour: bool,
    },

    /// List recorded measurements
    History,

    /// Show the recent days as a calendar
    Calendar {
        /// Number of days to show (default: from config)
        #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
        days: Option<u32>,
    },

    /// Show level counts, the time series and streaks
    Stats,

    /// Export the history as JSON
    Export {
        /// Output file or directory (prints to stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Delete every recorded measurement
    Clear {
        /// Confirm deletion
        #[arg(long)]
        yes: bool,
    },
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SaveTarget {
    Glucose,
    Ph,
    Both,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

fn main() -> Result<()> {
    let args = Args::parse();

    Config::ensure_xdg_env();

    // Load configuration
    let config = Config::load().context("failed to load configuration")?;

    // Initialize logging
    let _log_guard =
        petstrip_core::logging::init(&config.logging).context("failed to initialize logging")?;

    let mut repo = Repository::load(open_store());

    match args.command {
        Command::Analyze {
            image,
            save,
            format,
        } => cmd_analyze(&config, &mut repo, image, save, format),
        Command::Inputs {
            water,
            elapsed,
            after_meal,
            hour,
            clear_hour,
        } => {
            cmd_inputs(&mut repo, water, elapsed, after_meal, hour, clear_hour);
            Ok(())
        }
        Command::History => {
            print!("{}", render::history(repo.history()));
            Ok(())
        }
        Command::Calendar { days } => {
            let today = Local::now().date_naive();
            let view = calendar_view(repo.history(), today, days.unwrap_or(config.calendar.days));
            print!("{}", render::calendar(&view));
            Ok(())
        }
        Command::Stats => {
            let today = Local::now().date_naive();
            let view = stats_view(repo.history(), today, config.calendar.days);
            print!("{}", render::stats(&view));
            Ok(())
        }
        Command::Export { output } => cmd_export(&repo, output),
        Command::Clear { yes } => cmd_clear(&mut repo, yes),
    }
}

/// Open the history database, or fall back to memory for this run.
fn open_store() -> Box<dyn PersistenceStore> {
    let db_path = Config::database_path();
    let opened = Database::open(&db_path).and_then(|db| {
        db.migrate()?;
        Ok(db)
    });

    match opened {
        Ok(db) => Box::new(db),
        Err(e) => {
            tracing::warn!(path = %db_path.display(), error = %e, "Database unavailable, using memory");
            eprintln!(
                "warning: history storage is unavailable ({}); changes will not be saved",
                e
            );
            Box::new(MemoryStore::new())
        }
    }
}

fn cmd_analyze(
    config: &Config,
    repo: &mut Repo,
    image: PathBuf,
    save: Option<SaveTarget>,
    format: OutputFormat,
) -> Result<()> {
    let analyzer =
        SyncAnalyzer::new(config.analysis.clone()).context("failed to start analyzer")?;
    let inputs = repo.user_inputs().to_context(Local::now());

    let result = match analyzer.analyze_path(&image, inputs) {
        Ok(AnalysisOutcome::Ready(result)) => result,
        Ok(AnalysisOutcome::Stale { generation }) => {
            anyhow::bail!("analysis {} was superseded", generation)
        }
        Err(e) => anyhow::bail!("{}", e.user_message()),
    };

    match format {
        OutputFormat::Text => print!("{}", render::pending(&result)),
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string_pretty(&result).context("failed to serialize result")?
        ),
    }

    let Some(target) = save else {
        return Ok(());
    };

    let session = analyzer.analyzer();
    if matches!(target, SaveTarget::Glucose | SaveTarget::Both) {
        session.confirm_glucose(repo)?;
    }
    if matches!(target, SaveTarget::Ph | SaveTarget::Both) {
        session.confirm_ph(repo)?;
    }

    if format == OutputFormat::Text {
        println!("Saved to {}.", result.date);
    }
    Ok(())
}

fn cmd_inputs(
    repo: &mut Repo,
    water: Option<u32>,
    elapsed: Option<u32>,
    after_meal: Option<u32>,
    hour: Option<u32>,
    clear_hour: bool,
) {
    let changed =
        water.is_some() || elapsed.is_some() || after_meal.is_some() || hour.is_some() || clear_hour;

    if changed {
        let current = repo.user_inputs();
        let updated = UserInputs {
            water_intake_ml: water.unwrap_or(current.water_intake_ml),
            elapsed_minutes: elapsed.unwrap_or(current.elapsed_minutes),
            after_meal_minutes: after_meal.unwrap_or(current.after_meal_minutes),
            measured_hour: if clear_hour {
                None
            } else {
                hour.or(current.measured_hour)
            },
        };
        repo.set_user_inputs(updated);
    }

    print!("{}", render::inputs(repo.user_inputs()));
}

fn cmd_export(repo: &Repo, output: Option<PathBuf>) -> Result<()> {
    let json = repo.export_json().context("failed to serialize history")?;

    let Some(output) = output else {
        println!("{}", json);
        return Ok(());
    };

    let path = if output.is_dir() {
        output.join(export_file_name(Local::now().date_naive()))
    } else {
        output
    };

    std::fs::write(&path, format!("{}\n", json))
        .with_context(|| format!("failed to write {}", path.display()))?;
    println!(
        "Exported {} records to {}",
        repo.history().len(),
        path.display()
    );
    Ok(())
}

fn cmd_clear(repo: &mut Repo, yes: bool) -> Result<()> {
    if !yes {
        anyhow::bail!("this deletes every recorded measurement; re-run with --yes to confirm");
    }

    let removed = repo.history().len();
    repo.clear_history();
    println!("Cleared {} records.", removed);
    Ok(())
}
