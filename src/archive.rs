//! Batch cleaning into a single ZIP bundle.
//!
//! Several exports can be cleaned in one go and handed back as one
//! download. Outputs are either kept as one CSV per input or concatenated
//! into a single CSV under one header.

use crate::error::{Error, Result};
use crate::model::{write_csv, CleanedDataset};
use crate::pipeline::CsvPipeline;
use serde::Serialize;
use std::collections::HashSet;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// Entry name used by [`BundleMode::Merged`].
pub const MERGED_ENTRY_NAME: &str = "cleaned_merged.csv";

/// How cleaned outputs are laid out in the bundle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum BundleMode {
    /// One `cleaned_<stem>.csv` entry per input
    #[default]
    Separate,
    /// All rows in a single entry with one header
    Merged,
}

/// An input that could not be cleaned.
#[derive(Debug, Clone, Serialize)]
pub struct BatchFailure {
    /// Input file
    pub input: PathBuf,
    /// Error message
    pub message: String,
}

/// Summary of a batch run.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    /// Archive written
    pub archive: PathBuf,
    /// Layout used
    pub mode: BundleMode,
    /// Entry names in archive order
    pub entries: Vec<String>,
    /// Rows written across all entries
    pub rows_written: usize,
    /// Inputs skipped because they failed
    pub failures: Vec<BatchFailure>,
}

/// Cleans every input and bundles the results into `archive`.
///
/// Inputs that fail are logged, listed in the report and left out. Fails
/// with [`Error::NoData`] when no input succeeds; no archive is written in
/// that case.
pub fn clean_batch<P: AsRef<Path>>(
    pipeline: &CsvPipeline,
    inputs: &[P],
    archive: impl AsRef<Path>,
    mode: BundleMode,
) -> Result<BatchReport> {
    let archive = archive.as_ref();
    let mut cleaned: Vec<(String, CleanedDataset)> = Vec::new();
    let mut failures = Vec::new();
    let mut names = HashSet::new();

    for input in inputs {
        let input = input.as_ref();
        match pipeline.read_dataset(input) {
            Ok(dataset) => {
                let name = unique_entry_name(input, &mut names);
                cleaned.push((name, pipeline.clean_dataset(&dataset, |_, _| {})));
            }
            Err(e) => {
                warn!(input = %input.display(), "Skipping input: {}", e);
                failures.push(BatchFailure {
                    input: input.to_path_buf(),
                    message: e.to_string(),
                });
            }
        }
    }

    if cleaned.is_empty() {
        return Err(Error::NoData);
    }

    let rows_written = cleaned.iter().map(|(_, d)| d.len()).sum();
    let entries: Vec<(String, Vec<u8>)> = match mode {
        BundleMode::Separate => cleaned
            .iter()
            .map(|(name, dataset)| Ok((name.clone(), dataset.to_csv_bytes()?)))
            .collect::<Result<_>>()?,
        BundleMode::Merged => {
            let records = cleaned.iter().flat_map(|(_, d)| d.records.iter());
            vec![(MERGED_ENTRY_NAME.to_string(), write_csv(records)?)]
        }
    };

    let bytes = write_zip(&entries)?;
    std::fs::write(archive, bytes)?;

    info!(
        archive = %archive.display(),
        entries = entries.len(),
        failed = failures.len(),
        "Wrote batch archive"
    );

    Ok(BatchReport {
        archive: archive.to_path_buf(),
        mode,
        entries: entries.into_iter().map(|(name, _)| name).collect(),
        rows_written,
        failures,
    })
}

fn write_zip(entries: &[(String, Vec<u8>)]) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    let mut zip = ZipWriter::new(Cursor::new(&mut buffer));
    let options =
        SimpleFileOptions::default().compression_method(zip::CompressionMethod::Deflated);

    for (name, data) in entries {
        zip.start_file(name.as_str(), options)?;
        zip.write_all(data)?;
    }
    zip.finish()?;

    Ok(buffer)
}

/// `cleaned_<stem>.csv`, with `_2`, `_3`, … appended on stem collisions.
fn unique_entry_name(input: &Path, taken: &mut HashSet<String>) -> String {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "input".to_string());

    let mut name = format!("cleaned_{}.csv", stem);
    let mut counter = 2;
    while !taken.insert(name.clone()) {
        name = format!("cleaned_{}_{}.csv", stem, counter);
        counter += 1;
    }
    name
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use zip::ZipArchive;

    fn write_input(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    fn read_entries(path: &Path) -> Vec<(String, String)> {
        let file = std::fs::File::open(path).unwrap();
        let mut archive = ZipArchive::new(file).unwrap();
        let mut entries = Vec::new();
        for i in 0..archive.len() {
            let mut entry = archive.by_index(i).unwrap();
            let mut content = String::new();
            entry.read_to_string(&mut content).unwrap();
            entries.push((entry.name().to_string(), content));
        }
        entries
    }

    #[test]
    fn test_separate_bundle_has_entry_per_input() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_input(dir.path(), "a.csv", "レス番号,内容\n1,前スレ\n");
        let b = write_input(dir.path(), "b.csv", "レス番号,内容\n1,次スレ\n");
        let zip_path = dir.path().join("bundle.zip");

        let report =
            clean_batch(&CsvPipeline::default(), &[a, b], &zip_path, BundleMode::Separate).unwrap();

        assert_eq!(report.entries, vec!["cleaned_a.csv", "cleaned_b.csv"]);
        assert_eq!(report.rows_written, 2);
        let entries = read_entries(&zip_path);
        assert_eq!(entries[0].1, "\u{FEFF}レス番号,内容\n1,前スレ\n");
        assert_eq!(entries[1].1, "\u{FEFF}レス番号,内容\n1,次スレ\n");
    }

    #[test]
    fn test_merged_bundle_keeps_one_header() {
        let dir = tempfile::tempdir().unwrap();
        let a = write_input(dir.path(), "a.csv", "レス番号,内容\n1,前スレ\n");
        let b = write_input(dir.path(), "b.csv", "レス番号,内容\n2,次スレ\n");
        let zip_path = dir.path().join("bundle.zip");

        let report =
            clean_batch(&CsvPipeline::default(), &[a, b], &zip_path, BundleMode::Merged).unwrap();

        assert_eq!(report.entries, vec![MERGED_ENTRY_NAME]);
        let entries = read_entries(&zip_path);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].1, "\u{FEFF}レス番号,内容\n1,前スレ\n2,次スレ\n");
    }

    #[test]
    fn test_failed_inputs_are_reported_and_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let good = write_input(dir.path(), "good.csv", "レス番号,内容\n1,ok\n");
        let bad = write_input(dir.path(), "bad.csv", "名前\n名無し\n");
        let zip_path = dir.path().join("bundle.zip");

        let report = clean_batch(
            &CsvPipeline::default(),
            &[good, bad.clone()],
            &zip_path,
            BundleMode::Separate,
        )
        .unwrap();

        assert_eq!(report.entries, vec!["cleaned_good.csv"]);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].input, bad);
        assert!(report.failures[0].message.contains("Missing required columns"));
    }

    #[test]
    fn test_all_failed_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.csv");
        let zip_path = dir.path().join("bundle.zip");

        let result = clean_batch(
            &CsvPipeline::default(),
            &[missing],
            &zip_path,
            BundleMode::Merged,
        );

        assert!(matches!(result, Err(Error::NoData)));
        assert!(!zip_path.exists());
    }

    #[test]
    fn test_colliding_stems_get_suffix() {
        let mut taken = HashSet::new();
        assert_eq!(unique_entry_name(Path::new("x/a.csv"), &mut taken), "cleaned_a.csv");
        assert_eq!(unique_entry_name(Path::new("y/a.csv"), &mut taken), "cleaned_a_2.csv");
        assert_eq!(unique_entry_name(Path::new("z/a.tsv"), &mut taken), "cleaned_a_3.csv");
    }
}
