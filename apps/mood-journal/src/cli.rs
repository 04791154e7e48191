//! Command-line interface.

use clap::{Parser, Subcommand};
use journal_stats::{Period, MAX_HEATMAP_DAYS};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "mood-journal")]
#[command(about = "Mood journal with streaks, stats and weekly wraps", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Without a subcommand the terminal UI starts.
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print journaling stats as JSON.
    Stats {
        /// First day included (YYYY-MM-DD).
        #[arg(long)]
        from: Option<String>,
        /// Last day included (YYYY-MM-DD).
        #[arg(long)]
        to: Option<String>,
        /// Preset period (7d, 30d, 90d, 180d, 365d, all); ignored when --from or --to is given.
        #[arg(short, long)]
        period: Option<Period>,
        /// Days in the activity heatmap.
        #[arg(long, value_parser = clap::value_parser!(u32).range(0..=i64::from(MAX_HEATMAP_DAYS)))]
        heatmap_days: Option<u32>,
    },
    /// Generate and store the wrap for the week holding a date.
    Wrap {
        /// Any day of the week (YYYY-MM-DD), default today.
        #[arg(short, long)]
        date: Option<String>,
    },
    /// Print stored weekly wraps as JSON, newest first.
    Wraps {
        /// Print only the wrap for the week holding this day (YYYY-MM-DD).
        #[arg(short, long)]
        week: Option<String>,
    },
    /// Import entries from a JSON array file.
    Import {
        path: PathBuf,
    },
}
