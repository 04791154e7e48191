//! Database operations for the mood journal.

use chrono::{DateTime, NaiveDate, Utc};
use journal_stats::{
    parse_date, text, DateRange, Entry, EntryId, EntrySource, Mood, Version, WeeklyWrap,
};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Result as SqlResult};
use std::path::Path;
use thiserror::Error;

/// Content snapshots kept per entry.
pub const MAX_VERSIONS: usize = 10;

/// Search hits returned at most.
pub const MAX_SEARCH_RESULTS: usize = 50;

const ENTRY_COLUMNS: &str = "id, date, title, content, grade, mood, bg_color, comments, \
                             attachments, versions, created_at, last_edited_at";

/// Database errors.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Entry not found: {0}")]
    NotFound(EntryId),
}

pub type DbResult<T> = Result<T, DbError>;

/// Database connection wrapper.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open or create database at path.
    pub fn open(path: &Path) -> DbResult<Self> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init()?;
        tracing::info!(path = %path.display(), "opened journal database");
        Ok(db)
    }

    /// Create in-memory database (for testing).
    pub fn in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.init()?;
        Ok(db)
    }

    /// Initialize database schema.
    fn init(&self) -> DbResult<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS entries (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                date TEXT NOT NULL,
                title TEXT NOT NULL DEFAULT '',
                content TEXT NOT NULL DEFAULT '',
                grade INTEGER,
                mood TEXT,
                bg_color TEXT,
                comments TEXT NOT NULL DEFAULT '[]',
                attachments TEXT NOT NULL DEFAULT '[]',
                versions TEXT NOT NULL DEFAULT '[]',
                created_at TEXT NOT NULL,
                last_edited_at TEXT
            );

            CREATE INDEX IF NOT EXISTS idx_entries_date ON entries(date);

            CREATE TABLE IF NOT EXISTS wraps (
                week_start TEXT PRIMARY KEY,
                data TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            "#,
        )?;
        Ok(())
    }

    /// Insert a new entry, returning its id.
    pub fn insert_entry(&self, entry: &Entry) -> DbResult<EntryId> {
        self.conn.execute(
            r#"
            INSERT INTO entries (date, title, content, grade, mood, bg_color, comments,
                                 attachments, versions, created_at, last_edited_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
            params![
                entry.date.to_string(),
                entry.title,
                entry.content,
                entry.grade,
                entry.mood.map(Mood::as_str),
                entry.bg_color,
                serde_json::to_string(&entry.comments)?,
                serde_json::to_string(&entry.attachments)?,
                serde_json::to_string(&entry.versions)?,
                entry.created_at.to_rfc3339(),
                entry.last_edited_at.map(|t| t.to_rfc3339()),
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        tracing::debug!(id, date = %entry.date, "inserted entry");
        Ok(id)
    }

    /// Update an entry's editable fields.
    ///
    /// When the content changes the previous content is kept as a version,
    /// dropping the oldest beyond `MAX_VERSIONS`.
    pub fn update_entry(&self, entry: &Entry) -> DbResult<Entry> {
        let existing = self
            .get_entry(entry.id)?
            .ok_or(DbError::NotFound(entry.id))?;

        let mut updated = entry.clone();
        updated.versions = existing.versions.clone();
        if entry.content != existing.content {
            updated.versions.push(Version {
                content: existing.content,
                saved_at: Utc::now(),
            });
            let excess = updated.versions.len().saturating_sub(MAX_VERSIONS);
            updated.versions.drain(..excess);
        }
        updated.last_edited_at = Some(Utc::now());

        self.conn.execute(
            r#"
            UPDATE entries SET
                title = ?2, content = ?3, grade = ?4, mood = ?5, bg_color = ?6,
                comments = ?7, attachments = ?8, versions = ?9, last_edited_at = ?10
            WHERE id = ?1
            "#,
            params![
                updated.id,
                updated.title,
                updated.content,
                updated.grade,
                updated.mood.map(Mood::as_str),
                updated.bg_color,
                serde_json::to_string(&updated.comments)?,
                serde_json::to_string(&updated.attachments)?,
                serde_json::to_string(&updated.versions)?,
                updated.last_edited_at.map(|t| t.to_rfc3339()),
            ],
        )?;
        Ok(updated)
    }

    /// Delete an entry.
    pub fn delete_entry(&self, id: EntryId) -> DbResult<()> {
        let deleted = self
            .conn
            .execute("DELETE FROM entries WHERE id = ?1", params![id])?;
        if deleted == 0 {
            return Err(DbError::NotFound(id));
        }
        Ok(())
    }

    /// Get an entry by id.
    pub fn get_entry(&self, id: EntryId) -> DbResult<Option<Entry>> {
        let sql = format!("SELECT {ENTRY_COLUMNS} FROM entries WHERE id = ?1");
        let entry = self
            .conn
            .query_row(&sql, params![id], parse_entry_row)
            .optional()?;
        Ok(entry)
    }

    /// All entries written for a date, oldest first.
    pub fn entries_for_date(&self, date: NaiveDate) -> DbResult<Vec<Entry>> {
        let sql = format!(
            "SELECT {ENTRY_COLUMNS} FROM entries WHERE date = ?1 ORDER BY created_at, id"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let entries = stmt
            .query_map(params![date.to_string()], parse_entry_row)?
            .collect::<SqlResult<Vec<_>>>()?;
        Ok(entries)
    }

    /// Entries in an inclusive date range, ordered by date.
    pub fn list_entries(&self, range: &DateRange) -> DbResult<Vec<Entry>> {
        let sql = format!(
            "SELECT {ENTRY_COLUMNS} FROM entries \
             WHERE (?1 IS NULL OR date >= ?1) AND (?2 IS NULL OR date <= ?2) \
             ORDER BY date, created_at, id"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let entries = stmt
            .query_map(
                params![
                    range.from.map(|d| d.to_string()),
                    range.to.map(|d| d.to_string()),
                ],
                parse_entry_row,
            )?
            .collect::<SqlResult<Vec<_>>>()?;
        Ok(entries)
    }

    /// Case-insensitive search over titles and the visible text of content,
    /// newest first.
    ///
    /// Matching happens on decoded text, so markup and entities never match
    /// and the query is taken literally.
    pub fn search(&self, query: &str) -> DbResult<Vec<Entry>> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!(
            "SELECT {ENTRY_COLUMNS} FROM entries ORDER BY date DESC, created_at DESC"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let mut found = Vec::new();
        for entry in stmt.query_map([], parse_entry_row)? {
            let entry = entry?;
            if entry.title.to_lowercase().contains(&needle)
                || text::plain_text(&entry.content).to_lowercase().contains(&needle)
            {
                found.push(entry);
                if found.len() == MAX_SEARCH_RESULTS {
                    break;
                }
            }
        }
        Ok(found)
    }

    /// Insert many entries in one transaction; ids are reassigned.
    pub fn import_entries(&self, entries: &[Entry]) -> DbResult<usize> {
        let tx = self.conn.unchecked_transaction()?;
        for entry in entries {
            self.insert_entry(entry)?;
        }
        tx.commit()?;
        tracing::info!(count = entries.len(), "imported entries");
        Ok(entries.len())
    }

    /// Store a wrap, replacing any earlier one for the same week.
    pub fn upsert_wrap(&self, wrap: &WeeklyWrap) -> DbResult<()> {
        self.conn.execute(
            r#"
            INSERT INTO wraps (week_start, data, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(week_start) DO UPDATE SET
                data = excluded.data,
                updated_at = excluded.updated_at
            "#,
            params![
                wrap.week_start.to_string(),
                serde_json::to_string(wrap)?,
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    /// Get the wrap for a week.
    pub fn get_wrap(&self, week_start: NaiveDate) -> DbResult<Option<WeeklyWrap>> {
        let data: Option<String> = self
            .conn
            .query_row(
                "SELECT data FROM wraps WHERE week_start = ?1",
                params![week_start.to_string()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(data.map(|d| serde_json::from_str(&d)).transpose()?)
    }

    /// All stored wraps, newest week first.
    pub fn list_wraps(&self) -> DbResult<Vec<WeeklyWrap>> {
        let mut stmt = self
            .conn
            .prepare("SELECT data FROM wraps ORDER BY week_start DESC")?;
        let rows = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<SqlResult<Vec<_>>>()?;
        rows.iter()
            .map(|d| serde_json::from_str(d).map_err(DbError::from))
            .collect()
    }
}

impl EntrySource for Database {
    type Error = DbError;

    fn entries_in(&self, range: &DateRange) -> Result<Vec<Entry>, Self::Error> {
        self.list_entries(range)
    }
}

// Helper functions

fn conversion_error<E>(idx: usize, err: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

fn parse_json_column<T: serde::de::DeserializeOwned>(
    row: &rusqlite::Row,
    idx: usize,
) -> SqlResult<T> {
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw).map_err(|e| conversion_error(idx, e))
}

fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

fn parse_mood(raw: Option<String>) -> Option<Mood> {
    let raw = raw.filter(|s| !s.is_empty())?;
    match raw.parse() {
        Ok(mood) => Some(mood),
        Err(err) => {
            tracing::warn!(%err, "reading unknown mood as absent");
            None
        }
    }
}

fn parse_entry_row(row: &rusqlite::Row) -> SqlResult<Entry> {
    let date_str: String = row.get(1)?;
    let created_str: String = row.get(10)?;
    let edited_str: Option<String> = row.get(11)?;

    Ok(Entry {
        id: row.get(0)?,
        date: parse_date(&date_str).map_err(|e| conversion_error(1, e))?,
        title: row.get(2)?,
        content: row.get(3)?,
        grade: row.get(4)?,
        mood: parse_mood(row.get(5)?),
        bg_color: row.get(6)?,
        comments: parse_json_column(row, 7)?,
        attachments: parse_json_column(row, 8)?,
        versions: parse_json_column(row, 9)?,
        created_at: parse_timestamp(&created_str),
        last_edited_at: edited_str.as_deref().map(parse_timestamp),
    })
}
