//! Plain-text projection of entry markup and lexical counts over it.

use regex::Regex;
use std::sync::LazyLock;

static TAG_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());

static TERMINATOR_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[.!?]+").unwrap());

/// Strip markup tags, collapse whitespace runs to single spaces and trim.
///
/// Every tag becomes a space so `<p>a</p><p>b</p>` reads as two words.
/// Unterminated tags are left as text.
pub fn strip_markup(markup: &str) -> String {
    if markup.is_empty() {
        return String::new();
    }
    let spaced = TAG_REGEX.replace_all(markup, " ");
    spaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Escape the characters markup treats specially.
pub fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Decode the basic character entities. `&amp;` goes last so `&amp;lt;`
/// stays a literal `&lt;`.
pub fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

/// Readable text of an entry: markup stripped, entities decoded.
///
/// Counting works on [`strip_markup`] alone; this is for display, editing
/// and search.
pub fn plain_text(markup: &str) -> String {
    decode_entities(&strip_markup(markup))
}

/// Number of whitespace-separated tokens. Punctuation stays with its word.
pub fn count_words(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Number of maximal runs of `.`, `!` or `?`.
pub fn count_sentences(text: &str) -> usize {
    TERMINATOR_REGEX.find_iter(text).count()
}

/// Length of the text in characters.
pub fn count_chars(text: &str) -> usize {
    text.chars().count()
}

/// Counts for a single piece of content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TextMetrics {
    pub words: usize,
    pub sentences: usize,
    pub chars: usize,
}

impl TextMetrics {
    /// Normalize the markup once and count over the result.
    pub fn from_markup(markup: &str) -> Self {
        Self::from_text(&strip_markup(markup))
    }

    /// Count over already-normalized text.
    pub fn from_text(text: &str) -> Self {
        Self {
            words: count_words(text),
            sentences: count_sentences(text),
            chars: count_chars(text),
        }
    }
}
