//! Raw table structures for CSV input.

/// A cell value. `None` is the missing sentinel (empty or space-only in
/// the source file).
pub type Cell = Option<String>;

/// A table as read from CSV, before column validation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    /// Column names, trimmed and made unique
    pub headers: Vec<String>,
    /// Data rows
    pub rows: Vec<TableRow>,
}

impl Table {
    /// Creates an empty table with the given headers.
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    /// Returns the number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Returns the number of columns.
    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    /// Returns true if there are no data rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Finds a column by exact name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }
}

/// A row in a table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableRow {
    /// Cells in column order
    pub cells: Vec<Cell>,
}

impl TableRow {
    /// Creates a row from cells.
    pub fn new(cells: Vec<Cell>) -> Self {
        Self { cells }
    }

    /// Returns the value of a present cell.
    pub fn get(&self, col: usize) -> Option<&str> {
        self.cells.get(col).and_then(|c| c.as_deref())
    }

    /// Returns the value of the first cell, if present.
    pub fn first(&self) -> Option<&str> {
        self.get(0)
    }
}
