//! # rescleaner
//!
//! A Rust library for cleaning forum thread exports (anchor-numbered posts
//! in a CSV file) into normalized text for downstream analysis.
//!
//! ## What gets cleaned
//!
//! - **Encoding**: UTF-8 (with or without BOM), Shift_JIS, CP932 and EUC-JP
//!   inputs are detected and decoded strictly
//! - **Text**: NFKC width folding, markup, URLs, `@mentions`, `>>N` anchors,
//!   symbols and stray whitespace
//! - **Face marks**: known emoticons are swapped for stable tokens before the
//!   symbol filter can shred them
//! - **Rows**: re-embedded headers, incomplete rows and exact duplicates
//!
//! ## Quick Start
//!
//! ```no_run
//! fn main() -> rescleaner::Result<()> {
//!     // Clean a thread export
//!     let report = rescleaner::try_clean_csv("thread.csv", "thread_cleaned.csv")?;
//!     println!("{} rows written", report.rows_written);
//!
//!     // Or a single post
//!     assert_eq!(rescleaner::clean_text(">>12 テスト(ﾟ∀ﾟ)!!"), "テスト[FACE_TOKEN_1]");
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - `async`: Tokio wrappers that run the pipeline on a blocking worker

pub mod archive;
pub mod detect;
pub mod error;
pub mod face_marks;
pub mod model;
pub mod normalize;
pub mod options;
pub mod pipeline;

#[cfg(feature = "async")]
pub mod async_api;

// Re-exports
pub use archive::{clean_batch, BatchReport, BundleMode};
pub use detect::SourceEncoding;
pub use error::{Error, Result};
pub use face_marks::{FaceMark, FaceMarkRegistry, FaceMarkTable};
pub use model::{CleanReport, CleanedDataset, Dataset, Record};
pub use normalize::{clean_text, TextCleaner};
pub use options::CleanOptions;
pub use pipeline::CsvPipeline;

use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Cleans a CSV export with the default face-mark table.
///
/// Returns `true` on success. Failures are logged and reported as `false`;
/// use [`try_clean_csv`] to get the error itself.
///
/// # Example
///
/// ```no_run
/// if !rescleaner::clean_csv("thread.csv", "thread_cleaned.csv") {
///     eprintln!("cleaning failed, see log");
/// }
/// ```
pub fn clean_csv(input: impl AsRef<Path>, output: impl AsRef<Path>) -> bool {
    CsvPipeline::default().clean(input, output)
}

/// Cleans a CSV export with the default face-mark table and returns the
/// run report.
///
/// # Example
///
/// ```no_run
/// let report = rescleaner::try_clean_csv("thread.csv", "thread_cleaned.csv")?;
/// println!("decoded as {}", report.encoding);
/// # Ok::<(), rescleaner::Error>(())
/// ```
pub fn try_clean_csv(input: impl AsRef<Path>, output: impl AsRef<Path>) -> Result<CleanReport> {
    CsvPipeline::default().run(input, output)
}

/// Builder for a configured pipeline.
///
/// # Example
///
/// ```no_run
/// use rescleaner::ResCleaner;
///
/// let report = ResCleaner::new()
///     .with_face_config("face_marks.json")
///     .minimal()
///     .build()
///     .run("thread.csv", "thread_cleaned.csv")?;
/// # Ok::<(), rescleaner::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct ResCleaner {
    face_config: Option<PathBuf>,
    face_marks: Option<Arc<FaceMarkTable>>,
    options: CleanOptions,
    encodings: Option<Vec<SourceEncoding>>,
}

impl ResCleaner {
    /// Creates a builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the face-mark table from a JSON file at build time.
    ///
    /// An unreadable or invalid file falls back to the default table.
    pub fn with_face_config(mut self, path: impl Into<PathBuf>) -> Self {
        self.face_config = Some(path.into());
        self
    }

    /// Uses an already-loaded face-mark table. Takes precedence over
    /// [`with_face_config`](Self::with_face_config).
    pub fn with_face_marks(mut self, table: Arc<FaceMarkTable>) -> Self {
        self.face_marks = Some(table);
        self
    }

    /// Sets the cleaning options.
    pub fn with_options(mut self, options: CleanOptions) -> Self {
        self.options = options;
        self
    }

    /// Only folds widths and whitespace.
    pub fn minimal(mut self) -> Self {
        self.options = CleanOptions::minimal();
        self
    }

    /// Restricts the encodings tried when decoding input.
    pub fn with_encodings(mut self, encodings: Vec<SourceEncoding>) -> Self {
        self.encodings = Some(encodings);
        self
    }

    /// Builds the pipeline.
    pub fn build(self) -> CsvPipeline {
        let table = match self.face_marks {
            Some(table) => table,
            None => Arc::new(FaceMarkTable::load(self.face_config.as_deref())),
        };
        let cleaner = TextCleaner::new(table).with_options(self.options);
        let pipeline = CsvPipeline::new(cleaner);
        match self.encodings {
            Some(encodings) => pipeline.with_encodings(encodings),
            None => pipeline,
        }
    }
}
