//! CSV cleaning pipeline.
//!
//! Reads a forum export, validates and de-duplicates it, runs the text
//! normalizer over every `内容` cell and writes a two-column UTF-8 (BOM)
//! CSV. Validation failures abort the run before anything is written.

use crate::detect::{self, SourceEncoding};
use crate::error::{Error, Result};
use crate::face_marks::FaceMarkTable;
use crate::model::{
    Cell, CleanReport, CleanedDataset, Dataset, Record, RowStats, Table, TableRow, CONTENT_COLUMN,
    ID_COLUMN,
};
use crate::normalize::TextCleaner;
use regex::Regex;
use std::collections::HashSet;
use std::path::Path;
use std::sync::{Arc, LazyLock};
use std::time::Instant;
use tracing::{debug, error, info};

/// First-column values marking a re-embedded header row.
static RE_HEADER_ROW: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!("{}|^Unnamed:", regex::escape(ID_COLUMN))).unwrap()
});

/// Cleans forum-export CSV files.
#[derive(Debug, Clone)]
pub struct CsvPipeline {
    cleaner: TextCleaner,
    encodings: Vec<SourceEncoding>,
}

impl Default for CsvPipeline {
    fn default() -> Self {
        Self::new(TextCleaner::default())
    }
}

impl CsvPipeline {
    /// Creates a pipeline around a text cleaner.
    pub fn new(cleaner: TextCleaner) -> Self {
        Self {
            cleaner,
            encodings: SourceEncoding::PRIORITY.to_vec(),
        }
    }

    /// Creates a pipeline with default options and the given face marks.
    pub fn with_face_marks(face_marks: Arc<FaceMarkTable>) -> Self {
        Self::new(TextCleaner::new(face_marks))
    }

    /// Overrides the encoding detection order.
    pub fn with_encodings(mut self, encodings: Vec<SourceEncoding>) -> Self {
        self.encodings = encodings;
        self
    }

    /// Returns the text cleaner.
    pub fn cleaner(&self) -> &TextCleaner {
        &self.cleaner
    }

    /// Cleans `input` into `output`, returning whether it succeeded.
    ///
    /// Failures are logged with their cause; nothing is written on failure.
    pub fn clean(&self, input: impl AsRef<Path>, output: impl AsRef<Path>) -> bool {
        match self.run(input, output) {
            Ok(_) => true,
            Err(e) => {
                error!("Error processing CSV: {}", e);
                false
            }
        }
    }

    /// Cleans `input` into `output`.
    pub fn run(&self, input: impl AsRef<Path>, output: impl AsRef<Path>) -> Result<CleanReport> {
        self.run_with_progress(input, output, |_, _| {})
    }

    /// Cleans `input` into `output`, reporting `(done, total)` after each
    /// row. The observer has no influence on the result.
    pub fn run_with_progress<F>(
        &self,
        input: impl AsRef<Path>,
        output: impl AsRef<Path>,
        progress: F,
    ) -> Result<CleanReport>
    where
        F: FnMut(usize, usize),
    {
        let input = input.as_ref();
        let output = output.as_ref();

        info!(input = %input.display(), "Processing CSV file");
        debug!(output = %output.display(), "Output path");

        let dataset = self.read_dataset(input)?;

        info!(rows = dataset.len(), encoding = %dataset.encoding, "Cleaning text data...");
        let start = Instant::now();

        let cleaned = self.clean_dataset(&dataset, progress);
        cleaned.write(output)?;

        let elapsed = start.elapsed();
        info!("Cleaning completed in {:.2} seconds", elapsed.as_secs_f64());
        info!(output = %output.display(), "Successfully saved cleaned data");

        Ok(CleanReport {
            input: input.to_path_buf(),
            output: output.to_path_buf(),
            encoding: dataset.encoding,
            stats: dataset.stats,
            rows_written: cleaned.len(),
            elapsed_ms: elapsed.as_millis() as u64,
        })
    }

    /// Reads, decodes and validates an input file.
    pub fn read_dataset(&self, path: impl AsRef<Path>) -> Result<Dataset> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(Error::NotFound(path.to_path_buf()));
        }

        let data = std::fs::read(path)?;
        let (text, encoding) = detect::decode_with(&data, &self.encodings)?;
        let table = parse_table(&text)?;
        debug!(
            columns = ?table.headers,
            rows = table.row_count(),
            "Parsed CSV table"
        );

        validate(table, encoding)
    }

    /// Cleans every record's content in order.
    pub fn clean_dataset<F>(&self, dataset: &Dataset, mut progress: F) -> CleanedDataset
    where
        F: FnMut(usize, usize),
    {
        let total = dataset.len();
        let mut records = Vec::with_capacity(total);

        for (index, record) in dataset.records.iter().enumerate() {
            records.push(record.with_content(self.cleaner.clean(&record.content)));
            progress(index + 1, total);
        }

        CleanedDataset { records }
    }
}

// ============================================================================
// Parsing
// ============================================================================

/// Parses decoded CSV text into a table of trimmed, optional cells.
///
/// - Blank header names become `Unnamed: <index>`
/// - Repeated header names get `.1`, `.2`, … suffixes
/// - Short rows are padded with missing cells
/// - Rows longer than the header are rejected
pub fn parse_table(text: &str) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers = unique_headers(reader.headers()?.iter());
    let mut table = Table::new(headers);
    let width = table.column_count();

    for (index, result) in reader.records().enumerate() {
        let record = result?;
        if record.len() > width {
            return Err(Error::Csv(format!(
                "row {} has {} fields, expected {}",
                index + 2,
                record.len(),
                width
            )));
        }

        let mut cells: Vec<Cell> = record.iter().map(parse_cell).collect();
        cells.resize(width, None);
        table.rows.push(TableRow::new(cells));
    }

    Ok(table)
}

/// A trimmed cell, or `None` when nothing but whitespace (including the
/// ideographic space) is left.
fn parse_cell(raw: &str) -> Cell {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn unique_headers<'a>(raw: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut headers: Vec<String> = Vec::new();

    for (index, name) in raw.enumerate() {
        let name = name.trim();
        let base = if name.is_empty() {
            format!("Unnamed: {}", index)
        } else {
            name.to_string()
        };

        let mut candidate = base.clone();
        let mut suffix = 1;
        while headers.contains(&candidate) {
            candidate = format!("{}.{}", base, suffix);
            suffix += 1;
        }
        headers.push(candidate);
    }

    headers
}

// ============================================================================
// Validation
// ============================================================================

/// Turns a parsed table into a dataset.
///
/// Drops re-embedded header rows, checks for data and required columns,
/// projects to `(レス番号, 内容)`, drops incomplete rows and removes exact
/// duplicates keeping the first occurrence.
pub fn validate(mut table: Table, encoding: SourceEncoding) -> Result<Dataset> {
    let mut stats = RowStats {
        rows_read: table.row_count(),
        ..RowStats::default()
    };

    table
        .rows
        .retain(|row| !row.first().is_some_and(|first| RE_HEADER_ROW.is_match(first)));
    stats.header_rows_dropped = stats.rows_read - table.row_count();
    if stats.header_rows_dropped > 0 {
        debug!(count = stats.header_rows_dropped, "Dropped re-embedded header rows");
    }

    if table.is_empty() {
        return Err(Error::NoData);
    }

    let id_col = table.column_index(ID_COLUMN);
    let content_col = table.column_index(CONTENT_COLUMN);
    let (Some(id_col), Some(content_col)) = (id_col, content_col) else {
        let missing = [(ID_COLUMN, id_col), (CONTENT_COLUMN, content_col)]
            .into_iter()
            .filter(|(_, index)| index.is_none())
            .map(|(name, _)| name.to_string())
            .collect();
        return Err(Error::MissingColumns(missing));
    };

    let mut seen: HashSet<(&str, &str)> = HashSet::new();
    let mut records = Vec::with_capacity(table.row_count());

    for row in &table.rows {
        let (Some(id), Some(content)) = (row.get(id_col), row.get(content_col)) else {
            stats.incomplete_rows_dropped += 1;
            continue;
        };

        if !seen.insert((id, content)) {
            stats.duplicate_rows_dropped += 1;
            continue;
        }

        records.push(Record::new(id, content));
    }

    debug!(?stats, kept = records.len(), "Validated dataset");

    Ok(Dataset {
        records,
        encoding,
        stats,
    })
}
