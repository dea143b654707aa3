//! Forum post records.

use serde::Serialize;

/// Header label of the reply/post identifier column.
pub const ID_COLUMN: &str = "レス番号";

/// Header label of the free-text column.
pub const CONTENT_COLUMN: &str = "内容";

/// The two columns every input must provide, in output order.
pub const REQUIRED_COLUMNS: [&str; 2] = [ID_COLUMN, CONTENT_COLUMN];

/// One forum post.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Record {
    /// Opaque reply/post identifier, kept as text
    pub id: String,
    /// Free text of the post
    pub content: String,
}

impl Record {
    /// Creates a new record.
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
        }
    }

    /// Returns a copy of this record with different content.
    pub fn with_content(&self, content: impl Into<String>) -> Self {
        Self {
            id: self.id.clone(),
            content: content.into(),
        }
    }
}
