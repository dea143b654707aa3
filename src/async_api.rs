//! Async API for running the pipeline off the async executor.
//!
//! Enable the `async` feature to use these APIs:
//!
//! ```toml
//! [dependencies]
//! rescleaner = { version = "0.1", features = ["async"] }
//! ```
//!
//! Cleaning is CPU-bound and synchronous, so every call here hands the
//! work to `tokio::task::spawn_blocking`.

use crate::error::{Error, Result};
use crate::model::CleanReport;
use crate::pipeline::CsvPipeline;
use std::path::Path;
use std::time::Duration;

/// Cleans `input` into `output` on a blocking worker.
///
/// # Example
///
/// ```no_run
/// # async fn example() -> rescleaner::Result<()> {
/// use rescleaner::CsvPipeline;
///
/// let report = rescleaner::async_api::clean_csv(CsvPipeline::default(), "in.csv", "out.csv").await?;
/// println!("{} rows", report.rows_written);
/// # Ok(())
/// # }
/// ```
pub async fn clean_csv(
    pipeline: CsvPipeline,
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
) -> Result<CleanReport> {
    let input = input.as_ref().to_path_buf();
    let output = output.as_ref().to_path_buf();

    tokio::task::spawn_blocking(move || pipeline.run(&input, &output))
        .await
        .map_err(|e| Error::Unexpected(format!("cleaning worker failed: {}", e)))?
}

/// Like [`clean_csv`], failing with [`Error::Timeout`] once `deadline`
/// passes.
///
/// The worker thread is not interrupted; a late run may still write its
/// output after the timeout has been reported.
pub async fn clean_csv_with_timeout(
    pipeline: CsvPipeline,
    input: impl AsRef<Path>,
    output: impl AsRef<Path>,
    deadline: Duration,
) -> Result<CleanReport> {
    match tokio::time::timeout(deadline, clean_csv(pipeline, input, output)).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!(?deadline, "CSV cleaning exceeded its deadline");
            Err(Error::Timeout(deadline))
        }
    }
}

/// Cleans a single string on a blocking worker.
pub async fn clean_text(pipeline: &CsvPipeline, text: impl Into<String>) -> Result<String> {
    let cleaner = pipeline.cleaner().clone();
    let text = text.into();
    tokio::task::spawn_blocking(move || cleaner.clean(&text))
        .await
        .map_err(|e| Error::Unexpected(format!("cleaning worker failed: {}", e)))
}
