//! # Row Parsing
//!
//! Turns delimited row strings plus an ordered column manifest into typed
//! records. The contract is deliberately lenient: rows come from an
//! uncontrolled external host, so short rows are padded with empty strings
//! and surplus tokens are ignored rather than rejected.

use std::fmt;

/// The default field separator used by the host.
pub const DEFAULT_SEPARATOR: char = '^';

/// A single cell value: a number when the source token was numeric,
/// otherwise the original string (the empty string included).
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Number(f64),
    Text(String),
}

impl CellValue {
    /// Coerce a raw token. Numeric when non-empty and it parses as a finite
    /// decimal number after trimming.
    pub fn coerce(raw: &str) -> Self {
        match parse_number(raw) {
            Some(n) => CellValue::Number(n),
            None => CellValue::Text(raw.to_string()),
        }
    }

    /// The numeric value, if this cell is a number or a numeric-looking string.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            CellValue::Text(s) => parse_number(s),
        }
    }

    /// True for the empty string.
    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Text(s) if s.is_empty())
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // f64's Display already drops a trailing ".0" (10.0 -> "10").
            CellValue::Number(n) => write!(f, "{}", n),
            CellValue::Text(s) => f.write_str(s),
        }
    }
}

fn parse_number(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// One row of data, keyed by field name.
///
/// Fields keep manifest order for iteration; lookups are by key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<(String, CellValue)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a record from `(key, value)` pairs. A repeated key keeps the
    /// last value.
    pub fn from_pairs<K, I>(pairs: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, CellValue)>,
    {
        let mut record = Record::new();
        for (key, value) in pairs {
            record.insert(key.into(), value);
        }
        record
    }

    fn insert(&mut self, key: String, value: CellValue) {
        match self.fields.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&CellValue> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// The display text of a field, or the empty string when it is missing.
    pub fn text(&self, key: &str) -> String {
        self.get(key).map(|v| v.to_string()).unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Parse raw delimited rows against a column manifest.
pub fn parse_rows<S: AsRef<str>>(manifest: &[String], raw_rows: &[S], separator: char) -> Vec<Record> {
    raw_rows
        .iter()
        .map(|row| parse_row(manifest, row.as_ref(), separator))
        .collect()
}

/// Parse a single delimited row. Missing trailing tokens become empty strings.
pub fn parse_row(manifest: &[String], raw: &str, separator: char) -> Record {
    let mut tokens = raw.split(separator);
    let mut record = Record::new();
    for key in manifest {
        let token = tokens.next().unwrap_or("");
        record.insert(key.clone(), CellValue::coerce(token));
    }
    record
}
