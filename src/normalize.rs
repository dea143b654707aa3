//! # Text Normalizer
//!
//! Fixed-order pipeline turning one raw forum post into plain, comparable
//! text.
//!
//! ## Steps
//!
//! 1. **Unicode** - NFKC normalization (full-width/half-width folding)
//! 2. **Markup** - paired elements with their content, then stray tags
//! 3. **Links** - `http(s)://…`, `www.…` and `@mention` handles
//! 4. **Anchors** - `>>123` reply citations
//! 5. **Face marks** - known emoticons replaced by bracketed tokens
//! 6. **Character filter** - everything outside word characters,
//!    whitespace, kana, CJK ideographs and `[]()` is deleted
//! 7. **Whitespace** - invisible characters removed, runs collapsed, trimmed
//!
//! Deleting characters can leave a base letter next to a combining mark
//! (`キ` + U+3099), so the result is re-composed to NFC at the end. Without
//! that a second pass would compose the pair and cleaning would not be
//! idempotent.
//!
//! Face marks are tokenized before the character filter; the filter would
//! otherwise delete the symbols the emoticon patterns match on.

use crate::error::Result;
use crate::face_marks::FaceMarkTable;
use crate::options::CleanOptions;
use regex::Regex;
use std::sync::{Arc, LazyLock};
use tracing::{debug, warn};
use unicode_normalization::UnicodeNormalization;

// Regex patterns (compiled once using LazyLock)
static RE_MARKUP_PAIR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>(.*?)</[^>]+>").unwrap());

static RE_MARKUP_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());

static RE_URL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"https?://\S+|www\.\S+").unwrap());

static RE_MENTION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"@[\w\d_]+").unwrap());

static RE_ANCHOR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r">>\d{1,4}").unwrap());

static RE_DISALLOWED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[^\w\s\x{3000}\x{3040}-\x{30FF}\x{4E00}-\x{9FFF}\[\]\(\)]").unwrap()
});

static RE_INVISIBLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\x{200B}\x{200C}\x{200D}\x{2060}\x{FEFF}]").unwrap());

static RE_WIDE_SPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\x{3000}\x{00A0}]").unwrap());

static RE_WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

static DEFAULT_CLEANER: LazyLock<TextCleaner> = LazyLock::new(TextCleaner::default);

// ============================================================================
// Steps
// ============================================================================

/// Step 1: NFKC normalization.
pub fn normalize_unicode(input: &str) -> String {
    input.nfkc().collect()
}

/// Step 2: Remove paired markup together with its content, then any
/// remaining tag.
pub fn strip_markup(input: &str) -> String {
    let without_pairs = RE_MARKUP_PAIR.replace_all(input, "");
    RE_MARKUP_TAG.replace_all(&without_pairs, "").into_owned()
}

/// Step 3: Remove URLs and `@` mentions.
pub fn strip_links(input: &str) -> String {
    let without_urls = RE_URL.replace_all(input, "");
    RE_MENTION.replace_all(&without_urls, "").into_owned()
}

/// Step 4: Remove `>>` reply anchors with 1-4 digits.
pub fn strip_anchors(input: &str) -> String {
    RE_ANCHOR.replace_all(input, "").into_owned()
}

/// Step 6: Delete characters outside the allowed classes.
///
/// Square and round brackets are kept: face-mark tokens are bracketed.
pub fn filter_chars(input: &str) -> String {
    RE_DISALLOWED.replace_all(input, "").into_owned()
}

/// Re-composes canonical pairs left adjacent by earlier deletions.
pub fn recompose(input: &str) -> String {
    input.nfc().collect()
}

/// Step 7: Canonicalize whitespace.
pub fn normalize_whitespace(input: &str) -> String {
    let visible = RE_INVISIBLE.replace_all(input, "");
    let spaced = RE_WIDE_SPACE.replace_all(&visible, " ");
    // Backslashes go before collapsing so no double space is left behind
    let unescaped = spaced.replace('\\', "");
    RE_WHITESPACE
        .replace_all(&unescaped, " ")
        .trim()
        .to_string()
}

// ============================================================================
// Cleaner
// ============================================================================

/// Applies the normalizer steps with a given face-mark table.
#[derive(Debug, Clone)]
pub struct TextCleaner {
    face_marks: Arc<FaceMarkTable>,
    options: CleanOptions,
}

impl Default for TextCleaner {
    fn default() -> Self {
        Self::new(Arc::new(FaceMarkTable::default()))
    }
}

impl TextCleaner {
    /// Creates a cleaner using the given face-mark table.
    pub fn new(face_marks: Arc<FaceMarkTable>) -> Self {
        Self {
            face_marks,
            options: CleanOptions::default(),
        }
    }

    /// Sets the step options.
    pub fn with_options(mut self, options: CleanOptions) -> Self {
        self.options = options;
        self
    }

    /// Returns the face-mark table in use.
    pub fn face_marks(&self) -> &FaceMarkTable {
        &self.face_marks
    }

    /// Returns the step options.
    pub fn options(&self) -> &CleanOptions {
        &self.options
    }

    /// Runs every enabled step, propagating step failures.
    pub fn try_clean(&self, text: &str) -> Result<String> {
        let mut result = normalize_unicode(text);

        if self.options.strip_markup {
            result = strip_markup(&result);
        }

        if self.options.strip_links {
            result = strip_links(&result);
        }

        if self.options.strip_anchors {
            result = strip_anchors(&result);
        }

        // Nothing to tokenize once the text is gone
        if self.options.tokenize_face_marks && !result.is_empty() {
            result = self.face_marks.tokenize(&result)?;
        }

        if self.options.filter_chars {
            result = filter_chars(&result);
        }

        let result = recompose(&normalize_whitespace(&result));

        debug!(text = %preview(&result, 50), "Processed text");
        Ok(result)
    }

    /// Cleans one value. Failures are logged and yield an empty string, so
    /// a single bad record never aborts a whole file.
    ///
    /// # Example
    ///
    /// ```
    /// use rescleaner::TextCleaner;
    ///
    /// let cleaner = TextCleaner::default();
    /// assert_eq!(cleaner.clean(">>123 アンカー付きメッセージ"), "アンカー付きメッセージ");
    /// ```
    pub fn clean(&self, text: &str) -> String {
        match self.try_clean(text) {
            Ok(cleaned) => cleaned,
            Err(e) => {
                warn!("Error cleaning text: {}", e);
                String::new()
            }
        }
    }

    /// Cleans an optional value; absent input yields an empty string.
    pub fn clean_value(&self, value: Option<&str>) -> String {
        value.map(|text| self.clean(text)).unwrap_or_default()
    }
}

/// Cleans text with the built-in face-mark table and default options.
pub fn clean_text(text: &str) -> String {
    DEFAULT_CLEANER.clean(text)
}

fn preview(text: &str, max_chars: usize) -> String {
    let mut preview: String = text.chars().take(max_chars).collect();
    if text.chars().nth(max_chars).is_some() {
        preview.push_str("...");
    }
    preview
}
