//! Application state and logic.

use crate::config::Config;
use crate::db::{Database, DbResult};
use chrono::{Duration, NaiveDate};
use crossterm::event::{KeyCode, KeyEvent};
use journal_stats::{
    stats_from_source, text, Entry, EntryId, Mood, Period, StatsOptions, StatsReport, WeeklyWrap,
};

/// Longest title accepted.
pub const MAX_TITLE_LEN: usize = 200;

/// Application state.
pub struct App {
    /// Database connection.
    pub db: Database,
    /// Configuration.
    pub config: Config,
    /// Current view.
    pub view: View,
    /// The current local date.
    pub today: NaiveDate,
    /// Date shown in the journal view.
    pub selected_date: NaiveDate,
    /// Entries on the selected date.
    pub entries: Vec<Entry>,
    /// Selected entry (or search result) index.
    pub selected_index: usize,
    /// Search results, replacing the day list while present.
    pub search_results: Option<Vec<Entry>>,
    /// Stats period.
    pub period: Period,
    /// Stats for the current period; `None` when it has no entries.
    pub report: Option<StatsReport>,
    /// Stored weekly wraps, newest first.
    pub wraps: Vec<WeeklyWrap>,
    /// Selected wrap index.
    pub selected_wrap: usize,
    /// Whether in editing mode.
    pub editing: bool,
    /// Input buffer for editing.
    pub input_buffer: String,
    /// Field value when editing started.
    edit_original: String,
    /// Editing field.
    pub editing_field: EditField,
    /// Message to display.
    pub message: Option<(String, MessageType)>,
    /// Show help popup.
    pub show_help: bool,
    /// Confirmation dialog.
    pub confirm_dialog: Option<ConfirmDialog>,
}

/// Current view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Entries of one day.
    Journal,
    /// Aggregate statistics.
    Stats,
    /// Word-count heatmap.
    Heatmap,
    /// Weekly wraps.
    Wraps,
}

/// Editing field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditField {
    None,
    NewEntry,
    Title,
    Content,
    Grade,
    Search,
}

/// Message type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageType {
    Info,
    Success,
    Warning,
    Error,
}

/// Confirmation dialog.
#[derive(Debug, Clone)]
pub struct ConfirmDialog {
    pub title: String,
    pub message: String,
    pub action: ConfirmAction,
}

/// Confirm action type.
#[derive(Debug, Clone)]
pub enum ConfirmAction {
    DeleteEntry(EntryId),
}

impl App {
    /// Create new application over an open database.
    pub fn new(db: Database, config: Config, today: NaiveDate) -> DbResult<Self> {
        let period = config.stats.default_period;
        let mut app = Self {
            db,
            config,
            view: View::Journal,
            today,
            selected_date: today,
            entries: Vec::new(),
            selected_index: 0,
            search_results: None,
            period,
            report: None,
            wraps: Vec::new(),
            selected_wrap: 0,
            editing: false,
            input_buffer: String::new(),
            edit_original: String::new(),
            editing_field: EditField::None,
            message: None,
            show_help: false,
            confirm_dialog: None,
        };

        app.refresh()?;
        Ok(app)
    }

    /// Options for the stats of the current period.
    pub fn stats_options(&self) -> StatsOptions {
        StatsOptions::new(self.today)
            .with_range(self.period.range(self.today))
            .with_heatmap_days(self.config.stats.heatmap_days)
    }

    /// Refresh data from database.
    pub fn refresh(&mut self) -> DbResult<()> {
        self.entries = self.db.entries_for_date(self.selected_date)?;
        self.report = stats_from_source(&self.db, &self.stats_options())?;
        self.wraps = self.db.list_wraps()?;

        let visible = self.visible_entries().len();
        if self.selected_index >= visible {
            self.selected_index = visible.saturating_sub(1);
        }
        if self.selected_wrap >= self.wraps.len() {
            self.selected_wrap = self.wraps.len().saturating_sub(1);
        }

        Ok(())
    }

    fn refresh_or_report(&mut self) {
        if let Err(err) = self.refresh() {
            self.report_error("Refresh failed", err);
        }
    }

    fn report_error(&mut self, context: &str, err: impl std::fmt::Display) {
        tracing::error!(%err, "{}", context);
        self.message = Some((format!("{}: {}", context, err), MessageType::Error));
    }

    /// Check if in editing mode.
    pub fn is_editing(&self) -> bool {
        self.editing
    }

    /// Entries listed in the journal view.
    pub fn visible_entries(&self) -> &[Entry] {
        self.search_results.as_deref().unwrap_or(&self.entries)
    }

    /// Get selected entry.
    pub fn selected_entry(&self) -> Option<&Entry> {
        self.visible_entries().get(self.selected_index)
    }

    /// Get selected wrap.
    pub fn selected_wrap(&self) -> Option<&WeeklyWrap> {
        self.wraps.get(self.selected_wrap)
    }

    /// Handle key input.
    pub fn handle_key(&mut self, key: KeyEvent) {
        // Handle confirmation dialog
        if let Some(dialog) = self.confirm_dialog.clone() {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => {
                    self.confirm_dialog = None;
                    self.execute_confirm(dialog.action);
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    self.confirm_dialog = None;
                }
                _ => {}
            }
            return;
        }

        // Handle help popup
        if self.show_help {
            self.show_help = false;
            return;
        }

        // Clear message on any key
        self.message = None;

        // Handle editing mode
        if self.editing {
            self.handle_edit_key(key);
            return;
        }

        match key.code {
            // Views
            KeyCode::Char('1') => self.switch_view(View::Journal),
            KeyCode::Char('s') => self.switch_view(View::Stats),
            KeyCode::Char('c') => self.switch_view(View::Heatmap),
            KeyCode::Char('w') => self.switch_view(View::Wraps),
            KeyCode::Char('?') => self.show_help = true,
            _ => match self.view {
                View::Journal => self.handle_journal_key(key),
                View::Stats | View::Heatmap => self.handle_stats_key(key),
                View::Wraps => self.handle_wraps_key(key),
            },
        }
    }

    fn switch_view(&mut self, view: View) {
        self.view = view;
        self.refresh_or_report();
    }

    fn handle_journal_key(&mut self, key: KeyEvent) {
        match key.code {
            // Navigation
            KeyCode::Char('j') | KeyCode::Down => self.move_selection(1),
            KeyCode::Char('k') | KeyCode::Up => self.move_selection(-1),

            // Date navigation
            KeyCode::Char('h') | KeyCode::Left => self.change_date(-1),
            KeyCode::Char('l') | KeyCode::Right => self.change_date(1),
            KeyCode::Char('t') => self.jump_to_date(self.today),
            KeyCode::Enter => {
                let jump_to = self
                    .search_results
                    .as_ref()
                    .and_then(|results| results.get(self.selected_index))
                    .map(|e| e.date);
                if let Some(date) = jump_to {
                    self.search_results = None;
                    self.jump_to_date(date);
                } else {
                    self.start_edit(EditField::Content);
                }
            }
            KeyCode::Esc => {
                if self.search_results.take().is_some() {
                    self.selected_index = 0;
                }
            }

            // Actions
            KeyCode::Char('a') => self.start_edit(EditField::NewEntry),
            KeyCode::Char('e') => self.start_edit(EditField::Title),
            KeyCode::Char('g') => self.start_edit(EditField::Grade),
            KeyCode::Char('m') => self.cycle_mood(),
            KeyCode::Char('d') => self.confirm_delete_entry(),
            KeyCode::Char('/') => self.start_edit(EditField::Search),

            _ => {}
        }
    }

    fn handle_stats_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('p') | KeyCode::Right | KeyCode::Char('l') => self.set_period(self.period.next()),
            KeyCode::Char('P') | KeyCode::Left | KeyCode::Char('h') => self.set_period(self.period.prev()),
            _ => {}
        }
    }

    fn handle_wraps_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('j') | KeyCode::Down => {
                if self.selected_wrap + 1 < self.wraps.len() {
                    self.selected_wrap += 1;
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.selected_wrap = self.selected_wrap.saturating_sub(1);
            }
            KeyCode::Char('g') => self.generate_wrap(),
            _ => {}
        }
    }

    /// Handle editing keys.
    fn handle_edit_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => self.cancel_editing(),
            KeyCode::Enter => self.finish_editing(),
            KeyCode::Backspace => {
                self.input_buffer.pop();
            }
            KeyCode::Char(c) => {
                self.input_buffer.push(c);
            }
            _ => {}
        }
    }

    /// Move selection by delta.
    fn move_selection(&mut self, delta: i32) {
        let len = self.visible_entries().len();
        if len == 0 {
            return;
        }

        let new_index = self.selected_index as i32 + delta;
        self.selected_index = new_index.clamp(0, len as i32 - 1) as usize;
    }

    /// Change selected date.
    fn change_date(&mut self, delta: i64) {
        self.jump_to_date(self.selected_date + Duration::days(delta));
    }

    fn jump_to_date(&mut self, date: NaiveDate) {
        self.selected_date = date;
        self.selected_index = 0;
        self.refresh_or_report();
    }

    fn set_period(&mut self, period: Period) {
        self.period = period;
        self.refresh_or_report();
    }

    /// Open the input dialog for a field.
    fn start_edit(&mut self, field: EditField) {
        let selected = self.selected_entry().cloned();
        let prefill = match field {
            EditField::NewEntry | EditField::Search | EditField::None => Some(String::new()),
            EditField::Title => selected.map(|e| e.title),
            EditField::Content => selected.map(|e| text::plain_text(&e.content)),
            EditField::Grade => selected.map(|e| e.grade().map(|g| g.to_string()).unwrap_or_default()),
        };

        let Some(prefill) = prefill else {
            self.message = Some(("No entry selected".to_string(), MessageType::Warning));
            return;
        };

        self.editing = true;
        self.editing_field = field;
        self.edit_original = prefill.clone();
        self.input_buffer = prefill;
    }

    fn cancel_editing(&mut self) {
        self.editing = false;
        self.input_buffer.clear();
        self.edit_original.clear();
        self.editing_field = EditField::None;
    }

    /// Finish editing and save.
    fn finish_editing(&mut self) {
        let input = std::mem::take(&mut self.input_buffer);
        let unchanged = input.trim() == self.edit_original.trim();
        let field = self.editing_field;
        self.cancel_editing();

        // Saving an untouched content field would flatten its paragraphs.
        if unchanged && matches!(field, EditField::Title | EditField::Content | EditField::Grade) {
            self.message = Some(("No changes".to_string(), MessageType::Info));
            return;
        }

        match field {
            EditField::NewEntry => self.add_entry(&input),
            EditField::Title => self.edit_selected(|entry| {
                entry.title = truncate_title(&input);
                Ok(())
            }),
            EditField::Content => self.edit_selected(|entry| {
                entry.content = content_from_plain_text(&input);
                Ok(())
            }),
            EditField::Grade => self.edit_selected(|entry| {
                entry.grade = parse_grade(&input)?;
                Ok(())
            }),
            EditField::Search => self.run_search(&input),
            EditField::None => {}
        }
    }

    /// Create an entry for the selected date.
    fn add_entry(&mut self, title: &str) {
        if self.selected_date > self.today {
            self.message = Some((
                "Cannot create entries for future dates".to_string(),
                MessageType::Warning,
            ));
            return;
        }

        let entry = Entry::new(self.selected_date)
            .with_title(truncate_title(title))
            .with_mood(Mood::Happy);

        match self.db.insert_entry(&entry) {
            Ok(_) => {
                self.message = Some(("Entry created".to_string(), MessageType::Success));
                self.refresh_or_report();
                self.selected_index = self.entries.len().saturating_sub(1);
            }
            Err(err) => self.report_error("Could not create entry", err),
        }
    }

    /// Apply a change to the selected entry and store it.
    fn edit_selected(&mut self, change: impl FnOnce(&mut Entry) -> Result<(), String>) {
        let Some(mut entry) = self.selected_entry().cloned() else {
            return;
        };

        if let Err(reason) = change(&mut entry) {
            self.message = Some((reason, MessageType::Warning));
            return;
        }

        match self.db.update_entry(&entry) {
            Ok(_) => {
                self.message = Some(("Entry saved".to_string(), MessageType::Success));
                if let Some(results) = self.search_results.as_mut() {
                    if let Some(slot) = results.get_mut(self.selected_index) {
                        *slot = entry;
                    }
                }
                self.refresh_or_report();
            }
            Err(err) => self.report_error("Could not save entry", err),
        }
    }

    /// Advance the selected entry's mood.
    fn cycle_mood(&mut self) {
        self.edit_selected(|entry| {
            entry.mood = Some(entry.mood.map_or(Mood::Happy, Mood::next));
            Ok(())
        });
    }

    fn run_search(&mut self, query: &str) {
        let query = query.trim();
        if query.is_empty() {
            self.search_results = None;
            return;
        }

        match self.db.search(query) {
            Ok(results) => {
                self.message = Some((
                    format!("{} result(s) for '{}'", results.len(), query),
                    MessageType::Info,
                ));
                self.search_results = Some(results);
                self.selected_index = 0;
            }
            Err(err) => self.report_error("Search failed", err),
        }
    }

    /// Confirm delete entry.
    fn confirm_delete_entry(&mut self) {
        if let Some(entry) = self.selected_entry() {
            self.confirm_dialog = Some(ConfirmDialog {
                title: "Delete Entry".to_string(),
                message: format!(
                    "Delete '{}' from {}? This cannot be undone. (y/n)",
                    entry.display_title(),
                    entry.date
                ),
                action: ConfirmAction::DeleteEntry(entry.id),
            });
        }
    }

    /// Execute confirmed action.
    fn execute_confirm(&mut self, action: ConfirmAction) {
        match action {
            ConfirmAction::DeleteEntry(id) => match self.db.delete_entry(id) {
                Ok(()) => {
                    if let Some(results) = self.search_results.as_mut() {
                        results.retain(|e| e.id != id);
                    }
                    self.message = Some(("Entry deleted".to_string(), MessageType::Success));
                    self.refresh_or_report();
                }
                Err(err) => self.report_error("Could not delete entry", err),
            },
        }
    }

    /// Generate and store the wrap for the week holding the selected date.
    fn generate_wrap(&mut self) {
        let week_start = self.config.display.week_start.week_containing(self.selected_date);
        let range = journal_stats::DateRange::week(week_start);

        let entries = match self.db.list_entries(&range) {
            Ok(entries) => entries,
            Err(err) => return self.report_error("Could not load week", err),
        };

        let Some(wrap) = WeeklyWrap::generate(&entries, week_start) else {
            self.message = Some((
                format!("No entries found for the week of {}", week_start),
                MessageType::Warning,
            ));
            return;
        };

        match self.db.upsert_wrap(&wrap) {
            Ok(()) => {
                self.message = Some((
                    format!("Wrap generated for the week of {}", week_start),
                    MessageType::Success,
                ));
                self.refresh_or_report();
                self.selected_wrap = self
                    .wraps
                    .iter()
                    .position(|w| w.week_start == week_start)
                    .unwrap_or(0);
            }
            Err(err) => self.report_error("Could not store wrap", err),
        }
    }

    /// Get view title.
    pub fn view_title(&self) -> &str {
        match self.view {
            View::Journal => "Journal",
            View::Stats => "Statistics",
            View::Heatmap => "Activity",
            View::Wraps => "Weekly Wraps",
        }
    }
}

fn truncate_title(title: &str) -> String {
    title.trim().chars().take(MAX_TITLE_LEN).collect()
}

/// Wrap typed text into a paragraph, escaping markup characters.
fn content_from_plain_text(input: &str) -> String {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    format!("<p>{}</p>", text::escape_text(trimmed))
}

/// Empty input clears the grade.
fn parse_grade(input: &str) -> Result<Option<i32>, String> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(None);
    }
    match input.parse::<i32>() {
        Ok(g) if (1..=10).contains(&g) => Ok(Some(g)),
        _ => Err(format!("Grade must be between 1 and 10, got '{}'", input)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn date(s: &str) -> NaiveDate {
        journal_stats::parse_date(s).unwrap()
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }
    }

    fn test_app() -> App {
        let db = Database::in_memory().unwrap();
        App::new(db, Config::default(), date("2024-01-03")).unwrap()
    }

    #[test]
    fn test_add_entry_flow() {
        let mut app = test_app();
        app.handle_key(key(KeyCode::Char('a')));
        assert!(app.is_editing());
        type_text(&mut app, "Morning");
        app.handle_key(key(KeyCode::Enter));

        assert!(!app.is_editing());
        assert_eq!(app.entries.len(), 1);
        assert_eq!(app.entries[0].title, "Morning");
        assert_eq!(app.entries[0].mood, Some(Mood::Happy));
        assert!(app.report.is_some());
    }

    #[test]
    fn test_future_entry_rejected() {
        let mut app = test_app();
        app.handle_key(key(KeyCode::Char('l')));
        assert_eq!(app.selected_date, date("2024-01-04"));
        app.handle_key(key(KeyCode::Char('a')));
        type_text(&mut app, "Tomorrow");
        app.handle_key(key(KeyCode::Enter));

        assert!(app.entries.is_empty());
        assert!(matches!(app.message, Some((_, MessageType::Warning))));
    }

    #[test]
    fn test_grade_and_content_edit() {
        let mut app = test_app();
        app.db
            .insert_entry(&Entry::new(date("2024-01-03")).with_title("Day"))
            .unwrap();
        app.refresh().unwrap();

        app.handle_key(key(KeyCode::Char('g')));
        type_text(&mut app, "9");
        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.entries[0].grade(), Some(9));

        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.editing_field, EditField::Content);
        type_text(&mut app, "Went <out>. Fun!");
        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.entries[0].content, "<p>Went &lt;out&gt;. Fun!</p>");

        let report = app.report.as_ref().unwrap();
        assert_eq!(report.best_grade, Some(9));
        assert_eq!(report.total_sentences, 2);
    }

    #[test]
    fn test_unchanged_content_edit_keeps_markup() {
        let mut app = test_app();
        let stored = "<p>Tom &amp; Jerry</p><p>Second paragraph.</p>";
        app.db
            .insert_entry(&Entry::new(date("2024-01-03")).with_content(stored))
            .unwrap();
        app.refresh().unwrap();

        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.input_buffer, "Tom & Jerry Second paragraph.");
        app.handle_key(key(KeyCode::Enter));

        let entry = app.db.get_entry(app.entries[0].id).unwrap().unwrap();
        assert_eq!(entry.content, stored);
        assert!(entry.versions.is_empty());
        assert!(matches!(app.message, Some((_, MessageType::Info))));
    }

    #[test]
    fn test_changed_content_edit_escapes_once() {
        let mut app = test_app();
        app.db
            .insert_entry(&Entry::new(date("2024-01-03")).with_content("<p>Tom &amp; Jerry</p>"))
            .unwrap();
        app.refresh().unwrap();

        app.handle_key(key(KeyCode::Enter));
        type_text(&mut app, "!");
        app.handle_key(key(KeyCode::Enter));

        let entry = app.db.get_entry(app.entries[0].id).unwrap().unwrap();
        assert_eq!(entry.content, "<p>Tom &amp; Jerry!</p>");
        assert_eq!(entry.versions.len(), 1);
    }

    #[test]
    fn test_invalid_grade_is_refused() {
        let mut app = test_app();
        app.db.insert_entry(&Entry::new(date("2024-01-03")).with_grade(4)).unwrap();
        app.refresh().unwrap();

        app.handle_key(key(KeyCode::Char('g')));
        app.input_buffer = "11".to_string();
        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.entries[0].grade(), Some(4));
        assert!(matches!(app.message, Some((_, MessageType::Warning))));
    }

    #[test]
    fn test_mood_cycles() {
        let mut app = test_app();
        app.db
            .insert_entry(&Entry::new(date("2024-01-03")).with_mood(Mood::Angry))
            .unwrap();
        app.refresh().unwrap();

        app.handle_key(key(KeyCode::Char('m')));
        assert_eq!(app.entries[0].mood, Some(Mood::Happy));
    }

    #[test]
    fn test_delete_with_confirmation() {
        let mut app = test_app();
        app.db.insert_entry(&Entry::new(date("2024-01-03"))).unwrap();
        app.refresh().unwrap();

        app.handle_key(key(KeyCode::Char('d')));
        assert!(app.confirm_dialog.is_some());
        app.handle_key(key(KeyCode::Char('n')));
        assert_eq!(app.entries.len(), 1);

        app.handle_key(key(KeyCode::Char('d')));
        app.handle_key(key(KeyCode::Char('y')));
        assert!(app.entries.is_empty());
        assert!(app.report.is_none());
    }

    #[test]
    fn test_period_cycling_recomputes() {
        let mut app = test_app();
        app.db.insert_entry(&Entry::new(date("2023-06-01"))).unwrap();
        app.refresh().unwrap();
        assert!(app.report.is_none());

        app.handle_key(key(KeyCode::Char('s')));
        assert_eq!(app.view, View::Stats);
        // Quarter -> HalfYear -> Year
        app.handle_key(key(KeyCode::Char('p')));
        app.handle_key(key(KeyCode::Char('p')));
        assert_eq!(app.period, Period::Year);
        assert_eq!(app.report.as_ref().unwrap().total_entries, 1);
    }

    #[test]
    fn test_search_and_jump() {
        let mut app = test_app();
        app.db
            .insert_entry(&Entry::new(date("2023-12-25")).with_title("Christmas"))
            .unwrap();

        app.handle_key(key(KeyCode::Char('/')));
        type_text(&mut app, "christ");
        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.visible_entries().len(), 1);

        app.handle_key(key(KeyCode::Enter));
        assert!(app.search_results.is_none());
        assert_eq!(app.selected_date, date("2023-12-25"));
        assert_eq!(app.entries.len(), 1);
    }

    #[test]
    fn test_generate_wrap() {
        let mut app = test_app();
        app.handle_key(key(KeyCode::Char('w')));
        app.handle_key(key(KeyCode::Char('g')));
        assert!(matches!(app.message, Some((_, MessageType::Warning))));

        app.db
            .insert_entry(&Entry::new(date("2024-01-02")).with_grade(6))
            .unwrap();
        app.handle_key(key(KeyCode::Char('g')));
        assert_eq!(app.wraps.len(), 1);
        // 2024-01-03 is a Wednesday; weeks start on Monday by default.
        assert_eq!(app.selected_wrap().unwrap().week_start, date("2024-01-01"));
    }

    #[test]
    fn test_parse_grade() {
        assert_eq!(parse_grade(""), Ok(None));
        assert_eq!(parse_grade(" 7 "), Ok(Some(7)));
        assert!(parse_grade("0").is_err());
        assert!(parse_grade("ten").is_err());
    }

    #[test]
    fn test_truncate_title() {
        let long = "x".repeat(250);
        assert_eq!(truncate_title(&long).len(), MAX_TITLE_LEN);
    }
}
