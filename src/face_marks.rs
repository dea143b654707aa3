//! Face-mark registry.
//!
//! Multi-character emoticons (kaomoji) such as `(ﾟ∀ﾟ)` are made of symbols
//! that the character-class filter would otherwise shred. The registry maps
//! each known face-mark pattern to a short bracketed token that survives the
//! filter.
//!
//! Patterns are regular expressions. They are stored NFKC-normalized because
//! the normalizer applies NFKC before tokenizing, so half-width and
//! full-width spellings of the same face collapse into one entry.

use crate::error::{Error, Result};
use regex::{NoExpand, Regex};
use std::collections::HashSet;
use std::path::Path;
use std::sync::{Arc, LazyLock, PoisonError, RwLock};
use tracing::{debug, info, warn};
use unicode_normalization::UnicodeNormalization;

/// Built-in pattern → token pairs.
const DEFAULT_FACE_MARKS: &[(&str, &str)] = &[
    (r"\(ﾟ∀ﾟ\)", "[FACE_TOKEN_1]"),
    (r"\(゚∀゚\)", "[FACE_TOKEN_1]"), // Variant
    (r"ｷﾀ━━━━\(ﾟ∀ﾟ\)━━━━", "[FACE_TOKEN_2]"),
];

static DEFAULT_TABLE: LazyLock<FaceMarkTable> = LazyLock::new(|| {
    FaceMarkTable::from_pairs(DEFAULT_FACE_MARKS.iter().copied())
        .expect("built-in face-mark patterns must compile")
});

/// A single face-mark entry.
#[derive(Debug, Clone)]
pub struct FaceMark {
    pattern: String,
    regex: Regex,
    token: String,
}

impl FaceMark {
    /// Compiles a face mark from a pattern and its replacement token.
    ///
    /// The pattern is NFKC-normalized before compilation.
    pub fn new(pattern: &str, token: impl Into<String>) -> Result<Self> {
        let pattern: String = pattern.nfkc().collect();
        if pattern.is_empty() {
            return Err(Error::InvalidPattern {
                pattern,
                message: "pattern must not be empty".into(),
            });
        }

        let regex = Regex::new(&pattern).map_err(|e| Error::InvalidPattern {
            pattern: pattern.clone(),
            message: e.to_string(),
        })?;

        Ok(Self {
            pattern,
            regex,
            token: token.into(),
        })
    }

    /// The normalized pattern source.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// The replacement token.
    pub fn token(&self) -> &str {
        &self.token
    }

    /// The pattern with regex escapes removed.
    ///
    /// Only meaningful for patterns that are escaped literals, which is
    /// what face-mark configs contain in practice.
    pub fn literal(&self) -> String {
        let mut out = String::with_capacity(self.pattern.len());
        let mut chars = self.pattern.chars();
        while let Some(c) = chars.next() {
            if c == '\\' {
                if let Some(escaped) = chars.next() {
                    out.push(escaped);
                }
            } else {
                out.push(c);
            }
        }
        out
    }

    fn char_len(&self) -> usize {
        self.pattern.chars().count()
    }
}

/// Ordered face-mark table.
///
/// Entries iterate by descending pattern length so that longer, more
/// specific faces are replaced before shorter ones nested inside them.
/// Entries of equal length keep their insertion order.
#[derive(Debug, Clone)]
pub struct FaceMarkTable {
    entries: Vec<FaceMark>,
}

impl Default for FaceMarkTable {
    fn default() -> Self {
        DEFAULT_TABLE.clone()
    }
}

impl FaceMarkTable {
    /// Builds a table from pattern → token pairs.
    ///
    /// Patterns that normalize to an already-registered pattern are
    /// skipped; the first registration wins.
    pub fn from_pairs<I, P, T>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (P, T)>,
        P: AsRef<str>,
        T: Into<String>,
    {
        let mut entries: Vec<FaceMark> = Vec::new();

        for (pattern, token) in pairs {
            let mark = FaceMark::new(pattern.as_ref(), token)?;
            if entries.iter().any(|e| e.pattern == mark.pattern) {
                debug!(pattern = %mark.pattern, "Face-mark pattern collapses with an earlier entry");
                continue;
            }
            entries.push(mark);
        }

        // Stable: equal lengths keep insertion order
        entries.sort_by_key(|e| std::cmp::Reverse(e.char_len()));

        Ok(Self { entries })
    }

    /// Parses a JSON object mapping patterns to tokens.
    ///
    /// ```
    /// use rescleaner::FaceMarkTable;
    ///
    /// let table = FaceMarkTable::from_json_str(r#"{"\\(\\^o\\^\\)": "[FACE_SMILE]"}"#)?;
    /// assert_eq!(table.tokenize("hi (^o^)")?, "hi [FACE_SMILE]");
    /// # Ok::<(), rescleaner::Error>(())
    /// ```
    pub fn from_json_str(json: &str) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        let object = value.as_object().ok_or_else(|| {
            Error::FaceMarkConfig("expected a JSON object of pattern/token pairs".into())
        })?;

        let mut pairs = Vec::with_capacity(object.len());
        for (pattern, token) in object {
            let token = token.as_str().ok_or_else(|| {
                Error::FaceMarkConfig(format!("token for pattern {:?} must be a string", pattern))
            })?;
            pairs.push((pattern.as_str(), token.to_string()));
        }

        Self::from_pairs(pairs)
    }

    /// Reads a JSON face-mark config from disk.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Loads the table from an optional config path.
    ///
    /// Falls back to the built-in table when no path is given, the file is
    /// missing, or it cannot be parsed. Never fails; problems are logged.
    pub fn load(config_path: Option<&Path>) -> Self {
        let Some(path) = config_path else {
            return Self::default();
        };

        if !path.exists() {
            warn!(path = %path.display(), "Face marks config not found. Using defaults.");
            return Self::default();
        }

        match Self::from_path(path) {
            Ok(table) => {
                info!(path = %path.display(), patterns = table.len(), "Loaded face marks config");
                table
            }
            Err(e) => {
                warn!(path = %path.display(), "Failed to load face marks config: {}. Using defaults.", e);
                Self::default()
            }
        }
    }

    /// Replaces every face-mark match with its token.
    ///
    /// Fails with [`Error::InvalidInput`] on empty text.
    pub fn tokenize(&self, text: &str) -> Result<String> {
        if text.is_empty() {
            return Err(Error::InvalidInput("Input text cannot be empty".into()));
        }

        let mut result = text.to_string();
        for mark in &self.entries {
            result = mark
                .regex
                .replace_all(&result, NoExpand(&mark.token))
                .into_owned();
        }
        Ok(result)
    }

    /// Replaces tokens with the literal text of their pattern.
    ///
    /// Lossy when several patterns share a token: the first entry in table
    /// order is used for all of them.
    pub fn restore(&self, text: &str) -> String {
        let mut seen = HashSet::new();
        let mut result = text.to_string();
        for mark in &self.entries {
            if seen.insert(mark.token.as_str()) && result.contains(&mark.token) {
                result = result.replace(&mark.token, &mark.literal());
            }
        }
        result
    }

    /// Iterates entries in substitution order.
    pub fn iter(&self) -> impl Iterator<Item = &FaceMark> {
        self.entries.iter()
    }

    /// Returns the number of patterns.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the table has no patterns.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Shared, swappable handle to the active face-mark table.
///
/// Readers take a snapshot (`Arc`) and keep using it for a whole run; a
/// reload swaps the reference, so no reader sees a half-updated table.
#[derive(Debug)]
pub struct FaceMarkRegistry {
    current: RwLock<Arc<FaceMarkTable>>,
}

impl Default for FaceMarkRegistry {
    fn default() -> Self {
        Self::new(FaceMarkTable::default())
    }
}

impl FaceMarkRegistry {
    /// Creates a registry holding the given table.
    pub fn new(table: FaceMarkTable) -> Self {
        Self {
            current: RwLock::new(Arc::new(table)),
        }
    }

    /// Returns the current table.
    pub fn snapshot(&self) -> Arc<FaceMarkTable> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Swaps in a new table, returning the previous one.
    pub fn replace(&self, table: FaceMarkTable) -> Arc<FaceMarkTable> {
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *guard, Arc::new(table))
    }

    /// Reloads from an optional config path with the same fallback rules
    /// as [`FaceMarkTable::load`].
    pub fn reload(&self, config_path: Option<&Path>) -> Arc<FaceMarkTable> {
        let table = FaceMarkTable::load(config_path);
        self.replace(table);
        self.snapshot()
    }
}
