//! Validated datasets and run reports.

use super::{Record, REQUIRED_COLUMNS};
use crate::detect::SourceEncoding;
use crate::error::Result;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// UTF-8 byte-order mark written in front of every output file, so that
/// spreadsheet tools pick the right encoding for Japanese text.
pub const OUTPUT_BOM: &str = "\u{FEFF}";

/// Row accounting collected while reading a dataset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RowStats {
    /// Data rows parsed from the file
    pub rows_read: usize,
    /// Rows dropped as re-embedded headers
    pub header_rows_dropped: usize,
    /// Rows dropped for a missing id or content
    pub incomplete_rows_dropped: usize,
    /// Rows dropped as exact duplicates
    pub duplicate_rows_dropped: usize,
}

/// Records read from one input file.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// Records in file order
    pub records: Vec<Record>,
    /// Encoding the file was decoded with
    pub encoding: SourceEncoding,
    /// Row accounting
    pub stats: RowStats,
}

impl Dataset {
    /// Returns the number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if there are no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Records after content cleaning.
#[derive(Debug, Clone, Default)]
pub struct CleanedDataset {
    /// Cleaned records in input order
    pub records: Vec<Record>,
}

impl CleanedDataset {
    /// Returns the number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Returns true if there are no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Serializes to BOM-prefixed UTF-8 CSV.
    pub fn to_csv_bytes(&self) -> Result<Vec<u8>> {
        write_csv(&self.records)
    }

    /// Writes the dataset to `path`.
    pub fn write(&self, path: impl AsRef<Path>) -> Result<()> {
        let bytes = self.to_csv_bytes()?;
        std::fs::write(path, bytes)?;
        Ok(())
    }
}

/// Serializes records as BOM-prefixed UTF-8 CSV with the fixed two-column
/// header and `\n` line endings.
pub fn write_csv<'a>(records: impl IntoIterator<Item = &'a Record>) -> Result<Vec<u8>> {
    let mut buffer = OUTPUT_BOM.as_bytes().to_vec();
    {
        let mut writer = csv::WriterBuilder::new()
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(&mut buffer);

        writer.write_record(REQUIRED_COLUMNS)?;
        for record in records {
            writer.write_record([record.id.as_str(), record.content.as_str()])?;
        }
        writer.flush()?;
    }
    Ok(buffer)
}

/// Summary of one pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct CleanReport {
    /// Input file
    pub input: PathBuf,
    /// Output file
    pub output: PathBuf,
    /// Encoding the input was decoded with
    pub encoding: SourceEncoding,
    /// Row accounting
    #[serde(flatten)]
    pub stats: RowStats,
    /// Rows written to the output
    pub rows_written: usize,
    /// Cleaning and writing time in milliseconds
    pub elapsed_ms: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_csv_has_bom_and_header() {
        let records = vec![Record::new("1", "こんにちは")];
        let bytes = write_csv(&records).unwrap();
        assert!(bytes.starts_with(&[0xEF, 0xBB, 0xBF]));
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(text, "\u{FEFF}レス番号,内容\n1,こんにちは\n");
    }

    #[test]
    fn test_write_csv_quotes_when_needed() {
        let records = vec![Record::new("2", "a,b \"c\"")];
        let text = String::from_utf8(write_csv(&records).unwrap()).unwrap();
        assert!(text.ends_with("2,\"a,b \"\"c\"\"\"\n"));
    }

    #[test]
    fn test_empty_dataset_writes_header_only() {
        let dataset = CleanedDataset::default();
        let text = String::from_utf8(dataset.to_csv_bytes().unwrap()).unwrap();
        assert_eq!(text, "\u{FEFF}レス番号,内容\n");
    }
}
