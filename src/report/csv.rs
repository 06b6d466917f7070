//! Minimal delimited-record support
//!
//! The schemas this tool reads and writes are small and fixed, so rows
//! are formatted and parsed by hand. Quoting follows the usual
//! double-quote convention; a quoted field may contain commas, quotes,
//! and newlines (the sweep error column does).

use std::fs;
use std::path::Path;

use crate::utils::{CsvError, Result};

/// Quote a field if it contains a delimiter, quote, or newline.
pub fn escape_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Format one record, escaping fields as needed.
pub fn format_row(fields: &[String]) -> String {
    fields
        .iter()
        .map(|f| escape_field(f))
        .collect::<Vec<_>>()
        .join(",")
}

/// Split text into records, honoring quoted fields. Blank lines are
/// skipped; a trailing newline does not produce an empty record.
pub fn parse_records(text: &str) -> Vec<Vec<String>> {
    let mut records: Vec<Vec<String>> = Vec::new();
    let mut record: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut started = false;

    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            } else {
                field.push(c);
            }
            continue;
        }
        match c {
            '"' => {
                in_quotes = true;
                started = true;
            }
            ',' => {
                record.push(std::mem::take(&mut field));
                started = true;
            }
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                if started {
                    record.push(std::mem::take(&mut field));
                    records.push(std::mem::take(&mut record));
                    started = false;
                }
            }
            '\n' => {
                if started {
                    record.push(std::mem::take(&mut field));
                    records.push(std::mem::take(&mut record));
                    started = false;
                }
            }
            _ => {
                field.push(c);
                started = true;
            }
        }
    }
    if started {
        record.push(field);
        records.push(record);
    }
    records
}

/// A parsed CSV file with header-indexed column access
#[derive(Debug)]
pub struct CsvTable {
    source: String,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl CsvTable {
    pub fn read_path(path: &Path) -> Result<Self> {
        let source = path.display().to_string();
        let text = fs::read_to_string(path).map_err(|e| CsvError::ReadFailed {
            path: source.clone(),
            source: e,
        })?;
        Self::parse(&text, &source)
    }

    pub fn parse(text: &str, source: &str) -> Result<Self> {
        let mut records = parse_records(text);
        if records.is_empty() {
            return Err(CsvError::Empty(source.to_string()).into());
        }
        let headers = records.remove(0).iter().map(|h| h.trim().to_string()).collect();
        Ok(Self {
            source: source.to_string(),
            headers,
            rows: records,
        })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of a required column.
    pub fn column(&self, name: &str) -> Result<usize> {
        self.headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| {
                CsvError::MissingColumn {
                    column: name.to_string(),
                    path: self.source.clone(),
                }
                .into()
            })
    }

    /// Field value, empty for a short row.
    pub fn get(&self, row: usize, col: usize) -> &str {
        self.rows[row].get(col).map(String::as_str).unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_round_trip() {
        let fields = vec![
            "plain".to_string(),
            "with,comma".to_string(),
            "with \"quotes\"".to_string(),
            "multi\nline".to_string(),
            String::new(),
        ];
        let line = format_row(&fields);
        let records = parse_records(&line);
        assert_eq!(records, vec![fields]);
    }

    #[test]
    fn test_parse_multiline_quoted_field() {
        let text = "a,b\n1,\"error line one\nerror, line two\"\n2,ok\n";
        let records = parse_records(text);
        assert_eq!(records.len(), 3);
        assert_eq!(records[1], vec!["1", "error line one\nerror, line two"]);
        assert_eq!(records[2], vec!["2", "ok"]);
    }

    #[test]
    fn test_blank_lines_and_crlf() {
        let text = "a,b\r\n\r\n1,2\r\n";
        let records = parse_records(text);
        assert_eq!(records, vec![vec!["a", "b"], vec!["1", "2"]]);
    }

    #[test]
    fn test_table_column_lookup() {
        let table = CsvTable::parse("x,y\n1,2\n3,\n", "test.csv").unwrap();
        assert_eq!(table.len(), 2);
        let y = table.column("y").unwrap();
        assert_eq!(table.get(0, y), "2");
        assert_eq!(table.get(1, y), "");
        assert!(table.column("z").is_err());
    }

    #[test]
    fn test_empty_file_is_an_error() {
        assert!(CsvTable::parse("", "empty.csv").is_err());
    }
}
