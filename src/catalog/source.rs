//! Tabular catalog feeds.
//!
//! A source yields a parsed table (headers + string cells); each catalog
//! turns rows into typed records through its own parse-and-validate step.
//! Malformed rows are skipped there, never propagated half-typed.

use std::collections::HashMap;
use std::path::PathBuf;

use super::CatalogError;

/// A parsed tabular feed.
#[derive(Debug, Clone, Default)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// Parse CSV text: first line is the header, blank lines are skipped.
    pub fn parse_csv(text: &str) -> Self {
        let mut lines = text.lines();
        let headers = lines
            .next()
            .map(|h| split_line(h).into_iter().map(|s| s.trim().to_string()).collect())
            .unwrap_or_default();
        let rows = lines
            .filter(|l| !l.trim().is_empty())
            .map(split_line)
            .collect();
        Self { headers, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterate rows with header-indexed access.
    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        let index: HashMap<&str, usize> = self
            .headers
            .iter()
            .enumerate()
            .map(|(i, h)| (h.as_str(), i))
            .collect();
        self.rows.iter().map(move |values| Row {
            index: index.clone(),
            values,
        })
    }
}

/// One row of a table, addressed by column name.
pub struct Row<'a> {
    index: HashMap<&'a str, usize>,
    values: &'a [String],
}

impl Row<'_> {
    /// Trimmed cell value; `None` for a missing column or an empty cell.
    pub fn get(&self, column: &str) -> Option<&str> {
        let i = *self.index.get(column)?;
        let value = self.values.get(i)?.trim();
        (!value.is_empty()).then_some(value)
    }

    /// Parse a cell; unparsable values collapse to `None`.
    pub fn parse<T: std::str::FromStr>(&self, column: &str) -> Option<T> {
        self.get(column)?.parse().ok()
    }
}

/// Quote-aware single-line CSV split. Quotes group fields containing
/// commas; embedded quote escapes are not needed by the feeds we ingest.
fn split_line(line: &str) -> Vec<String> {
    let mut result = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for ch in line.chars() {
        match ch {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                result.push(std::mem::take(&mut current));
            }
            _ => current.push(ch),
        }
    }
    result.push(current);
    result
}

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

pub trait TabularSource: Send + Sync {
    fn fetch(&self) -> Result<Table, CatalogError>;
}

/// Reads a CSV file from disk on every fetch (the catalog caches the
/// resulting records, so in practice this runs once).
pub struct CsvFileSource {
    path: PathBuf,
}

impl CsvFileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TabularSource for CsvFileSource {
    fn fetch(&self) -> Result<Table, CatalogError> {
        let text = std::fs::read_to_string(&self.path)?;
        Ok(Table::parse_csv(&text))
    }
}

/// Fixed in-memory table, for embedded datasets and tests.
pub struct StaticSource {
    table: Table,
}

impl StaticSource {
    pub fn new(table: Table) -> Self {
        Self { table }
    }

    pub fn from_csv(text: &str) -> Self {
        Self {
            table: Table::parse_csv(text),
        }
    }
}

impl TabularSource for StaticSource {
    fn fetch(&self) -> Result<Table, CatalogError> {
        Ok(self.table.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_header_and_rows() {
        let table = Table::parse_csv("name,lat,long\nCivil Hospital,24.86,67.01\n\n");
        let rows: Vec<_> = table.rows().collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("name"), Some("Civil Hospital"));
        assert_eq!(rows[0].parse::<f64>("lat"), Some(24.86));
    }

    #[test]
    fn quoted_fields_keep_commas() {
        let table = Table::parse_csv("name,address\n\"Mayo Hospital\",\"Hospital Rd, Lahore\"");
        let rows: Vec<_> = table.rows().collect();
        assert_eq!(rows[0].get("address"), Some("Hospital Rd, Lahore"));
    }

    #[test]
    fn missing_and_empty_cells_are_none() {
        let table = Table::parse_csv("name,beds\nShort Row");
        let rows: Vec<_> = table.rows().collect();
        assert_eq!(rows[0].get("beds"), None);
        assert_eq!(rows[0].get("no_such_column"), None);

        let table = Table::parse_csv("name,beds\nX,  ");
        let rows: Vec<_> = table.rows().collect();
        assert_eq!(rows[0].get("beds"), None);
    }

    #[test]
    fn unparsable_numbers_collapse_to_none() {
        let table = Table::parse_csv("beds\nunknown");
        let rows: Vec<_> = table.rows().collect();
        assert_eq!(rows[0].parse::<u32>("beds"), None);
    }

    #[test]
    fn file_source_reads_csv() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("feed.csv");
        std::fs::write(&path, "name\nA\nB\n").unwrap();

        let table = CsvFileSource::new(&path).fetch().unwrap();
        assert_eq!(table.rows().count(), 2);
    }

    #[test]
    fn file_source_missing_file_errors() {
        let source = CsvFileSource::new("/nonexistent/feed.csv");
        assert!(source.fetch().is_err());
    }
}
