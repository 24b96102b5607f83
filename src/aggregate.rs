//! # Aggregates
//!
//! SUM / AVG / COUNT over a scope of records, and the per-scope totals
//! tables the renderer reads from. Both return raw numbers; display
//! formatting is applied only when a value is drawn (see [`format_amount`]).

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::record::Record;

/// An aggregate function named by a calculation element.
///
/// Unrecognized names are kept verbatim so a schema round-trips without
/// loss; they evaluate to 0 with a warning.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AggregateFunction {
    #[default]
    Sum,
    Avg,
    Count,
    Other(String),
}

impl From<String> for AggregateFunction {
    fn from(name: String) -> Self {
        match name.as_str() {
            "SUM" => AggregateFunction::Sum,
            "AVG" => AggregateFunction::Avg,
            "COUNT" => AggregateFunction::Count,
            _ => AggregateFunction::Other(name),
        }
    }
}

impl From<AggregateFunction> for String {
    fn from(function: AggregateFunction) -> Self {
        function.to_string()
    }
}

impl fmt::Display for AggregateFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AggregateFunction::Sum => f.write_str("SUM"),
            AggregateFunction::Avg => f.write_str("AVG"),
            AggregateFunction::Count => f.write_str("COUNT"),
            AggregateFunction::Other(name) => f.write_str(name),
        }
    }
}

/// Running sum and count of the numeric values of one field.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FieldTotals {
    pub sum: f64,
    /// Records whose value for the field is present and numeric; not the
    /// size of the scope.
    pub count: usize,
}

impl FieldTotals {
    pub fn add(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    pub fn evaluate(&self, function: &AggregateFunction) -> f64 {
        match function {
            AggregateFunction::Sum => self.sum,
            AggregateFunction::Avg => {
                if self.count == 0 {
                    0.0
                } else {
                    self.sum / self.count as f64
                }
            }
            AggregateFunction::Count => self.count as f64,
            AggregateFunction::Other(name) => {
                log::warn!("Unknown aggregate function {:?}; using 0", name);
                0.0
            }
        }
    }
}

/// Field totals for one scope (the whole report or one group).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateTable {
    fields: HashMap<String, FieldTotals>,
}

impl AggregateTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold every numeric field of a record into the table.
    pub fn accumulate(&mut self, record: &Record) {
        for (key, value) in record.iter() {
            if let Some(n) = value.as_number() {
                self.fields.entry(key.to_string()).or_default().add(n);
            }
        }
    }

    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a Record>,
    {
        let mut table = AggregateTable::new();
        for record in records {
            table.accumulate(record);
        }
        table
    }

    /// Evaluate `function` over `field`. A field with no numeric values in
    /// this scope evaluates to 0.
    pub fn value(&self, function: &AggregateFunction, field: &str) -> f64 {
        match self.fields.get(field) {
            Some(totals) => totals.evaluate(function),
            None => FieldTotals::default().evaluate(function),
        }
    }

    pub fn sum(&self, field: &str) -> f64 {
        self.value(&AggregateFunction::Sum, field)
    }

    pub fn count(&self, field: &str) -> usize {
        self.fields.get(field).map_or(0, |t| t.count)
    }
}

/// Compute an aggregate directly over a slice of records.
///
/// Only values that are present, non-empty and numeric take part; anything
/// else is excluded rather than coerced to 0.
pub fn compute(function: &AggregateFunction, field: &str, records: &[Record]) -> f64 {
    let mut totals = FieldTotals::default();
    for n in records
        .iter()
        .filter_map(|r| r.get(field))
        .filter_map(|v| v.as_number())
    {
        totals.add(n);
    }
    totals.evaluate(function)
}

/// Format a number with two fixed decimals and comma thousands grouping:
/// `1234.5` -> `"1,234.50"`. Infinite and NaN values print as `"0.00"`.
pub fn format_amount(value: f64) -> String {
    if !value.is_finite() {
        log::warn!("Aggregate value {} is not a finite number; printing 0.00", value);
        return "0.00".to_string();
    }

    let fixed = format!("{:.2}", value.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some(parts) => parts,
        None => (fixed.as_str(), "00"),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3 + 4);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let negative = value < 0.0 && fixed.bytes().any(|b| b.is_ascii_digit() && b != b'0');
    format!("{}{}.{}", if negative { "-" } else { "" }, grouped, frac_part)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::CellValue;

    fn amounts(values: &[&str]) -> Vec<Record> {
        values
            .iter()
            .map(|v| Record::from_pairs([("Amt", CellValue::coerce(v))]))
            .collect()
    }

    #[test]
    fn test_sum_avg_count() {
        let records = amounts(&["10", "20", "", "abc", "5"]);
        assert_eq!(compute(&AggregateFunction::Sum, "Amt", &records), 35.0);
        assert_eq!(compute(&AggregateFunction::Count, "Amt", &records), 3.0);
        let avg = compute(&AggregateFunction::Avg, "Amt", &records);
        assert!((avg - 35.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_avg_of_empty_subset_is_zero() {
        let records = amounts(&["", "n/a"]);
        assert_eq!(compute(&AggregateFunction::Avg, "Amt", &records), 0.0);
        assert_eq!(compute(&AggregateFunction::Avg, "Amt", &[]), 0.0);
    }

    #[test]
    fn test_unknown_function_defaults_to_zero() {
        let records = amounts(&["10"]);
        let median = AggregateFunction::from("MEDIAN".to_string());
        assert_eq!(median, AggregateFunction::Other("MEDIAN".to_string()));
        assert_eq!(compute(&median, "Amt", &records), 0.0);
    }

    #[test]
    fn test_missing_field_is_excluded() {
        let records = amounts(&["10"]);
        assert_eq!(compute(&AggregateFunction::Count, "Other", &records), 0.0);
    }

    #[test]
    fn test_table_counts_numeric_entries_only() {
        let table = AggregateTable::from_records(&amounts(&["1", "", "2"]));
        assert_eq!(table.count("Amt"), 2);
        assert_eq!(table.sum("Amt"), 3.0);
        assert_eq!(table.value(&AggregateFunction::Avg, "Amt"), 1.5);
        assert_eq!(table.value(&AggregateFunction::Sum, "Missing"), 0.0);
    }

    #[test]
    fn test_function_names_round_trip() {
        for name in ["SUM", "AVG", "COUNT", "median"] {
            let f = AggregateFunction::from(name.to_string());
            assert_eq!(String::from(f), name);
        }
        let json = serde_json::to_string(&AggregateFunction::Avg).unwrap();
        assert_eq!(json, "\"AVG\"");
    }

    #[test]
    fn test_format_amount() {
        assert_eq!(format_amount(0.0), "0.00");
        assert_eq!(format_amount(35.0), "35.00");
        assert_eq!(format_amount(1234.5), "1,234.50");
        assert_eq!(format_amount(1234567.891), "1,234,567.89");
        assert_eq!(format_amount(999.999), "1,000.00");
        assert_eq!(format_amount(-1500.0), "-1,500.00");
        assert_eq!(format_amount(-0.001), "0.00");
    }

    #[test]
    fn test_overflowing_sum_prints_zero() {
        let table = AggregateTable::from_records(&amounts(&["1e308", "1e308"]));
        assert!(table.sum("Amt").is_infinite());
        assert_eq!(format_amount(table.sum("Amt")), "0.00");
        assert_eq!(format_amount(f64::NEG_INFINITY), "0.00");
        assert_eq!(format_amount(f64::NAN), "0.00");
    }
}
