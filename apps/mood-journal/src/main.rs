//! Mood Journal - Daily entries with grades, moods, streaks and weekly wraps.

mod app;
mod cli;
mod config;
mod db;
mod logging;
mod ui;

use anyhow::Context;
use app::{App, MessageType};
use chrono::{Local, NaiveDate};
use clap::Parser;
use cli::{Cli, Commands};
use config::Config;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use db::Database;
use journal_stats::{
    parse_date, stats_from_source, DateRange, Entry, StatsOptions, StatsResponse, WeeklyWrap,
};
use logging::LogTarget;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::path::Path;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let (config, config_error) = match Config::load() {
        Ok(config) => (config, None),
        Err(err) => (Config::default(), Some(format!("{:#}", err))),
    };

    let target = match cli.command {
        None => LogTarget::File,
        Some(_) => LogTarget::Stderr,
    };
    logging::init_tracing(&config, target)?;
    if let Some(err) = &config_error {
        tracing::warn!(error = %err, "using default configuration");
    }

    match cli.command {
        None => {
            let db = open_database()?;
            let mut app = App::new(db, config, Local::now().date_naive())?;
            if let Some(err) = config_error {
                app.message = Some((format!("Config ignored: {}", err), MessageType::Warning));
            }
            run_tui(app)
        }
        Some(command) => run_command(command, &config),
    }
}

fn run_tui(app: App) -> anyhow::Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run app
    let result = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        tracing::error!(%err, "mood journal exited with an error");
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    mut app: App,
) -> anyhow::Result<()> {
    tracing::info!(today = %app.today, "mood journal started");

    loop {
        terminal.draw(|f| ui::draw(f, &app))?;

        if let Event::Key(key) = event::read()? {
            if key.code == KeyCode::Char('q') && key.modifiers.is_empty() && !app.is_editing() {
                break;
            }
            if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                break;
            }
            app.handle_key(key);
        }
    }

    Ok(())
}

fn open_database() -> anyhow::Result<Database> {
    let path = Config::db_path().unwrap_or_else(|| "journal.db".into());
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating data directory {}", parent.display()))?;
    }
    Database::open(&path).with_context(|| format!("opening database {}", path.display()))
}

fn run_command(command: Commands, config: &Config) -> anyhow::Result<()> {
    let today = Local::now().date_naive();
    let db = open_database()?;

    match command {
        Commands::Stats {
            from,
            to,
            period,
            heatmap_days,
        } => {
            let range = if from.is_some() || to.is_some() {
                DateRange::parse(from.as_deref(), to.as_deref()).context("invalid date range")?
            } else {
                period.unwrap_or(config.stats.default_period).range(today)
            };
            let options = StatsOptions::new(today)
                .with_range(range)
                .with_heatmap_days(heatmap_days.unwrap_or(config.stats.heatmap_days));

            let report = stats_from_source(&db, &options).context("loading entries")?;
            println!("{}", serde_json::to_string_pretty(&StatsResponse::from(report))?);
        }
        Commands::Wrap { date } => {
            let date = match date {
                Some(s) => parse_date(&s).context("invalid --date")?,
                None => today,
            };
            let wrap = generate_wrap(&db, config, date)?;
            println!("{}", serde_json::to_string_pretty(&wrap)?);
        }
        Commands::Wraps { week: Some(week) } => {
            let date = parse_date(&week).context("invalid --week")?;
            let wrap = find_wrap(&db, config, date)?;
            println!("{}", serde_json::to_string_pretty(&wrap)?);
        }
        Commands::Wraps { week: None } => {
            let wraps = db.list_wraps().context("loading wraps")?;
            println!("{}", serde_json::to_string_pretty(&wraps)?);
        }
        Commands::Import { path } => {
            let count = import_file(&db, &path)?;
            eprintln!("Imported {} entries from {}", count, path.display());
        }
    }

    Ok(())
}

fn generate_wrap(db: &Database, config: &Config, date: NaiveDate) -> anyhow::Result<WeeklyWrap> {
    let week_start = config.display.week_start.week_containing(date);
    let entries = db
        .list_entries(&DateRange::week(week_start))
        .context("loading week")?;

    let wrap = WeeklyWrap::generate(&entries, week_start)
        .with_context(|| format!("no entries found for the week of {}", week_start))?;
    db.upsert_wrap(&wrap).context("storing wrap")?;
    tracing::info!(%week_start, entries = wrap.total_entries, "generated weekly wrap");

    Ok(wrap)
}

fn find_wrap(db: &Database, config: &Config, date: NaiveDate) -> anyhow::Result<WeeklyWrap> {
    let week_start = config.display.week_start.week_containing(date);
    db.get_wrap(week_start)
        .context("loading wrap")?
        .with_context(|| format!("no wrap stored for the week of {}", week_start))
}

fn import_file(db: &Database, path: &Path) -> anyhow::Result<usize> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let entries: Vec<Entry> = serde_json::from_str(&raw)
        .with_context(|| format!("parsing entries from {}", path.display()))?;
    Ok(db.import_entries(&entries)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use journal_stats::Mood;

    fn date(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    #[test]
    fn test_generate_wrap_uses_configured_week_start() {
        let db = Database::in_memory().unwrap();
        db.insert_entry(&Entry::new(date("2024-01-07")).with_grade(5)).unwrap();

        let mut config = Config::default();
        // Sunday 2024-01-07 belongs to the week of Monday 2024-01-01.
        let wrap = generate_wrap(&db, &config, date("2024-01-07")).unwrap();
        assert_eq!(wrap.week_start, date("2024-01-01"));

        config.display.week_start = journal_stats::WeekStart::Sunday;
        let wrap = generate_wrap(&db, &config, date("2024-01-07")).unwrap();
        assert_eq!(wrap.week_start, date("2024-01-07"));
        assert_eq!(db.list_wraps().unwrap().len(), 2);
    }

    #[test]
    fn test_find_wrap_by_any_day_of_week() {
        let db = Database::in_memory().unwrap();
        let config = Config::default();
        assert!(find_wrap(&db, &config, date("2024-01-03")).is_err());

        db.insert_entry(&Entry::new(date("2024-01-02")).with_grade(6)).unwrap();
        generate_wrap(&db, &config, date("2024-01-02")).unwrap();

        let wrap = find_wrap(&db, &config, date("2024-01-05")).unwrap();
        assert_eq!(wrap.week_start, date("2024-01-01"));
        assert_eq!(wrap.total_entries, 1);
    }

    #[test]
    fn test_stats_json_from_database() {
        let db = Database::in_memory().unwrap();
        db.insert_entry(
            &Entry::new(date("2024-01-03"))
                .with_content("<p>One two.</p>")
                .with_mood(Mood::Happy),
        )
        .unwrap();

        let options = StatsOptions::new(date("2024-01-03")).with_heatmap_days(2);
        let report = stats_from_source(&db, &options).unwrap();
        let json = serde_json::to_value(StatsResponse::from(report)).unwrap();

        insta::assert_snapshot!(json["stats"]["heatmapMap"].to_string(), @r#"{"2024-01-02":0,"2024-01-03":2}"#);
        insta::assert_snapshot!(json["stats"]["moodFreq"].to_string(), @r#"{"happy":1}"#);
    }

    #[test]
    fn test_generate_wrap_empty_week_fails() {
        let db = Database::in_memory().unwrap();
        let err = generate_wrap(&db, &Config::default(), date("2024-01-03")).unwrap_err();
        assert!(err.to_string().contains("2024-01-01"));
    }

    #[test]
    fn test_import_file() {
        let dir = std::env::temp_dir().join(format!("mood-journal-import-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("entries.json");
        std::fs::write(
            &path,
            r#"[
                {"date": "2024-01-01", "title": "One", "content": "<p>Hi there.</p>", "grade": 7, "emoji": "happy"},
                {"date": "2024-01-02", "content": "", "mood": "mystery"}
            ]"#,
        )
        .unwrap();

        let db = Database::in_memory().unwrap();
        assert_eq!(import_file(&db, &path).unwrap(), 2);

        let entries = db.list_entries(&DateRange::all()).unwrap();
        assert_eq!(entries[0].mood, Some(Mood::Happy));
        assert_eq!(entries[1].mood, None);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_import_rejects_bad_json() {
        let dir = std::env::temp_dir().join(format!("mood-journal-bad-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("entries.json");
        std::fs::write(&path, "{not json").unwrap();

        let db = Database::in_memory().unwrap();
        assert!(import_file(&db, &path).is_err());

        std::fs::remove_dir_all(&dir).ok();
    }
}
