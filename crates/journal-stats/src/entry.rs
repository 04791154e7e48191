//! Journal entry model.

use crate::error::StatsError;
use crate::text::TextMetrics;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Store-assigned entry identifier.
pub type EntryId = i64;

/// Lowest valid grade.
pub const MIN_GRADE: u8 = 1;
/// Highest valid grade.
pub const MAX_GRADE: u8 = 10;

/// A single dated journal entry.
///
/// Several entries may share a date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entry {
    #[serde(default)]
    pub id: EntryId,
    pub date: NaiveDate,
    #[serde(default)]
    pub title: String,
    /// Rich-text markup.
    #[serde(default)]
    pub content: String,
    /// Raw stored grade; see [`Entry::grade`] for the validated value.
    #[serde(default)]
    pub grade: Option<i32>,
    #[serde(default, alias = "emoji", deserialize_with = "lenient_mood")]
    pub mood: Option<Mood>,
    #[serde(default)]
    pub bg_color: Option<String>,
    #[serde(default)]
    pub comments: Vec<Comment>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    #[serde(default)]
    pub versions: Vec<Version>,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub last_edited_at: Option<DateTime<Utc>>,
}

impl Entry {
    /// Create an empty entry for a date.
    pub fn new(date: NaiveDate) -> Self {
        Self {
            id: 0,
            date,
            title: String::new(),
            content: String::new(),
            grade: None,
            mood: None,
            bg_color: None,
            comments: Vec::new(),
            attachments: Vec::new(),
            versions: Vec::new(),
            created_at: Utc::now(),
            last_edited_at: None,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    pub fn with_grade(mut self, grade: i32) -> Self {
        self.grade = Some(grade);
        self
    }

    pub fn with_mood(mut self, mood: Mood) -> Self {
        self.mood = Some(mood);
        self
    }

    /// The grade if it lies within `MIN_GRADE..=MAX_GRADE`.
    pub fn grade(&self) -> Option<u8> {
        self.grade
            .filter(|g| (MIN_GRADE as i32..=MAX_GRADE as i32).contains(g))
            .map(|g| g as u8)
    }

    /// Word, sentence and character counts of the plain-text content.
    pub fn metrics(&self) -> TextMetrics {
        TextMetrics::from_markup(&self.content)
    }

    /// Title, or a placeholder for untitled entries.
    pub fn display_title(&self) -> &str {
        if self.title.trim().is_empty() {
            "Untitled"
        } else {
            &self.title
        }
    }
}

/// An inline comment anchored to a piece of entry text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub selected_text: String,
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,
}

/// A file attached to an entry, base64 encoded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    pub id: String,
    pub name: String,
    #[serde(default = "default_mime_type")]
    pub mime_type: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub data: String,
}

fn default_mime_type() -> String {
    "application/octet-stream".to_string()
}

/// A previous revision of an entry's content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Version {
    pub content: String,
    pub saved_at: DateTime<Utc>,
}

/// Mood tag attached to an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Happy,
    Loved,
    Confident,
    Playful,
    Embarrassed,
    Sad,
    Scared,
    Angry,
}

impl Mood {
    /// All moods in picker order.
    pub const ALL: [Mood; 8] = [
        Mood::Happy,
        Mood::Loved,
        Mood::Confident,
        Mood::Playful,
        Mood::Embarrassed,
        Mood::Sad,
        Mood::Scared,
        Mood::Angry,
    ];

    /// Stored tag name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Happy => "happy",
            Self::Loved => "loved",
            Self::Confident => "confident",
            Self::Playful => "playful",
            Self::Embarrassed => "embarrassed",
            Self::Sad => "sad",
            Self::Scared => "scared",
            Self::Angry => "angry",
        }
    }

    /// Display label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Happy => "Happy",
            Self::Loved => "Loved",
            Self::Confident => "Confident",
            Self::Playful => "Playful",
            Self::Embarrassed => "Embarrassed",
            Self::Sad => "Sad",
            Self::Scared => "Scared",
            Self::Angry => "Angry",
        }
    }

    pub fn glyph(self) -> &'static str {
        match self {
            Self::Happy => "😊",
            Self::Loved => "🥰",
            Self::Confident => "💪",
            Self::Playful => "😄",
            Self::Embarrassed => "😳",
            Self::Sad => "😢",
            Self::Scared => "😨",
            Self::Angry => "😠",
        }
    }

    /// Accent color as RGB.
    pub fn rgb(self) -> (u8, u8, u8) {
        match self {
            Self::Happy => (0xFF, 0xD1, 0x66),
            Self::Loved => (0xFF, 0x6B, 0x9D),
            Self::Confident => (0x3D, 0xFF, 0xB5),
            Self::Playful => (0x6A, 0xE4, 0xFF),
            Self::Embarrassed => (0xFF, 0x9F, 0x7A),
            Self::Sad => (0x7A, 0x9C, 0xFF),
            Self::Scared => (0xB0, 0x7A, 0xFF),
            Self::Angry => (0xFF, 0x5C, 0x7A),
        }
    }

    /// The next mood in picker order, wrapping around.
    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|m| *m == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mood {
    type Err = StatsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| StatsError::UnknownMood(s.to_string()))
    }
}

/// Historical data may carry tags outside the fixed set; read those as absent.
fn lenient_mood<'de, D>(deserializer: D) -> Result<Option<Mood>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|s| match s.parse() {
        Ok(mood) => Some(mood),
        Err(_) if s.is_empty() => None,
        Err(_) => {
            tracing::warn!(mood = %s, "skipping unknown mood tag");
            None
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_grade_validation() {
        let entry = Entry::new(date(2024, 1, 1));
        assert_eq!(entry.grade(), None);
        assert_eq!(entry.clone().with_grade(7).grade(), Some(7));
        assert_eq!(entry.clone().with_grade(0).grade(), None);
        assert_eq!(entry.clone().with_grade(11).grade(), None);
        assert_eq!(entry.with_grade(10).grade(), Some(10));
    }

    #[test]
    fn test_mood_parse() {
        assert_eq!("happy".parse::<Mood>().unwrap(), Mood::Happy);
        assert_eq!(" Angry ".parse::<Mood>().unwrap(), Mood::Angry);
        assert!("grumpy".parse::<Mood>().is_err());
    }

    #[test]
    fn test_mood_cycle_wraps() {
        assert_eq!(Mood::Happy.next(), Mood::Loved);
        assert_eq!(Mood::Angry.next(), Mood::Happy);
    }

    #[test]
    fn test_deserialize_legacy_document() {
        let json = r#"{
            "date": "2024-02-10",
            "title": "Snow",
            "content": "<p>Cold day.</p>",
            "grade": 6,
            "emoji": "sad",
            "comments": [{"id": "c1", "text": "brr"}],
            "attachments": [{"id": "a1", "name": "pic.png"}]
        }"#;

        let entry: Entry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.date, date(2024, 2, 10));
        assert_eq!(entry.mood, Some(Mood::Sad));
        assert_eq!(entry.grade(), Some(6));
        assert_eq!(entry.comments.len(), 1);
        assert_eq!(entry.attachments[0].mime_type, "application/octet-stream");
        assert!(entry.versions.is_empty());
    }

    #[test]
    fn test_unknown_mood_reads_as_absent() {
        let json = r#"{"date": "2024-02-10", "mood": "grumpy"}"#;
        let entry: Entry = serde_json::from_str(json).unwrap();
        assert_eq!(entry.mood, None);
    }

    #[test]
    fn test_display_title() {
        let entry = Entry::new(date(2024, 1, 1));
        assert_eq!(entry.display_title(), "Untitled");
        assert_eq!(entry.with_title("Beach").display_title(), "Beach");
    }
}
