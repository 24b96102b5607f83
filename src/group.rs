//! # Group Planning
//!
//! Sorts records by the grouping field, cuts the sorted sequence into
//! segments, and pre-computes every aggregate table the report will need.
//!
//! All totals are final before the first part is drawn. The report header
//! shows grand totals and a group header shows its group's totals, and both
//! print before the rows they summarize, so nothing is accumulated while
//! rendering moves forward.
//!
//! Group keys are ordered by an ordinal comparison of their display text,
//! not numerically: `"10"` sorts before `"9"`. Two keys are the same group
//! only if they are the same kind of value, so the number `5` and the text
//! `"5"` are different groups.

use std::collections::HashMap;
use std::fmt;
use std::ops::Range;

use crate::aggregate::AggregateTable;
use crate::record::{CellValue, Record};
use crate::schema::Grouping;

/// The value that identifies a group.
#[derive(Debug, Clone, PartialEq)]
pub enum GroupKey {
    /// The single segment of an ungrouped report.
    All,
    /// The record has no such field.
    Missing,
    Value(CellValue),
}

impl GroupKey {
    fn of(record: &Record, field: &str) -> Self {
        match record.get(field) {
            Some(value) => GroupKey::Value(value.clone()),
            None => GroupKey::Missing,
        }
    }

    fn id(&self) -> KeyId {
        match self {
            GroupKey::All => KeyId::All,
            // A missing field groups with the empty string.
            GroupKey::Missing => KeyId::Text(String::new()),
            GroupKey::Value(CellValue::Number(n)) => {
                // -0.0 and 0.0 are the same group.
                let n = if *n == 0.0 { 0.0 } else { *n };
                KeyId::Number(n.to_bits())
            }
            GroupKey::Value(CellValue::Text(s)) => KeyId::Text(s.clone()),
        }
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupKey::All => f.write_str("ALL"),
            GroupKey::Missing => Ok(()),
            GroupKey::Value(v) => write!(f, "{}", v),
        }
    }
}

/// Hashable identity of a [`GroupKey`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum KeyId {
    All,
    Number(u64),
    Text(String),
}

/// A maximal run of sorted records sharing one group key.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupSegment {
    pub key: GroupKey,
    /// Position of the run in [`ReportPlan::sorted`].
    pub range: Range<usize>,
    totals: usize,
}

/// Everything the renderer needs, computed before rendering starts.
#[derive(Debug, Clone)]
pub struct ReportPlan {
    /// Records in print order.
    pub sorted: Vec<Record>,
    pub segments: Vec<GroupSegment>,
    pub global_totals: AggregateTable,
    group_totals: Vec<(GroupKey, AggregateTable)>,
    grouped: bool,
}

/// A borrowed view of one segment and its scope's totals.
#[derive(Debug, Clone, Copy)]
pub struct Group<'a> {
    pub key: &'a GroupKey,
    pub records: &'a [Record],
    pub totals: &'a AggregateTable,
}

impl ReportPlan {
    /// Whether records were grouped by a field.
    pub fn is_grouped(&self) -> bool {
        self.grouped
    }

    /// Segments in print order, with their records and totals.
    pub fn groups(&self) -> impl Iterator<Item = Group<'_>> {
        self.segments.iter().map(move |seg| Group {
            key: &seg.key,
            records: &self.sorted[seg.range.clone()],
            totals: &self.group_totals[seg.totals].1,
        })
    }

    /// Totals of every record whose group key equals `key`.
    pub fn group_totals(&self, key: &GroupKey) -> Option<&AggregateTable> {
        let id = key.id();
        self.group_totals
            .iter()
            .find(|(k, _)| k.id() == id)
            .map(|(_, t)| t)
    }

    /// Distinct group keys in first-printed order.
    pub fn group_keys(&self) -> impl Iterator<Item = &GroupKey> {
        self.group_totals.iter().map(|(k, _)| k)
    }
}

/// Plan a report: order records, find segments, compute all totals.
pub fn plan(records: Vec<Record>, grouping: &Grouping) -> ReportPlan {
    let global_totals = AggregateTable::from_records(&records);

    let Some(field) = grouping.active_field() else {
        let len = records.len();
        return ReportPlan {
            sorted: records,
            segments: vec![GroupSegment {
                key: GroupKey::All,
                range: 0..len,
                totals: 0,
            }],
            group_totals: vec![(GroupKey::All, global_totals.clone())],
            global_totals,
            grouped: false,
        };
    };

    let mut sorted = records;
    // Stable, so rows with equal keys keep their original order.
    sorted.sort_by_cached_key(|record| record.text(field));

    let mut segments: Vec<GroupSegment> = Vec::new();
    let mut group_totals: Vec<(GroupKey, AggregateTable)> = Vec::new();
    let mut index_of: HashMap<KeyId, usize> = HashMap::new();

    for (i, record) in sorted.iter().enumerate() {
        let key = GroupKey::of(record, field);
        let id = key.id();
        let continues_run = segments.last().is_some_and(|seg| seg.key.id() == id);

        let totals = *index_of.entry(id).or_insert_with(|| {
            group_totals.push((key.clone(), AggregateTable::new()));
            group_totals.len() - 1
        });
        group_totals[totals].1.accumulate(record);

        if continues_run {
            if let Some(seg) = segments.last_mut() {
                seg.range.end = i + 1;
            }
        } else {
            log::debug!("Group {:?} starts at row {}", key.to_string(), i);
            segments.push(GroupSegment {
                key,
                range: i..i + 1,
                totals,
            });
        }
    }

    ReportPlan {
        sorted,
        segments,
        global_totals,
        group_totals,
        grouped: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::parse_rows;

    fn rows(raw: &[&str]) -> Vec<Record> {
        let manifest = vec!["Dist".to_string(), "Amt".to_string()];
        parse_rows(&manifest, raw, '^')
    }

    fn keys(plan: &ReportPlan) -> Vec<String> {
        plan.segments.iter().map(|s| s.key.to_string()).collect()
    }

    #[test]
    fn test_groups_and_totals() {
        let plan = plan(rows(&["X^10", "Y^5", "X^20"]), &Grouping::by("Dist"));
        assert_eq!(keys(&plan), vec!["X", "Y"]);

        let groups: Vec<_> = plan.groups().collect();
        assert_eq!(groups[0].records.len(), 2);
        assert_eq!(groups[0].totals.sum("Amt"), 30.0);
        assert_eq!(groups[1].totals.sum("Amt"), 5.0);
        assert_eq!(plan.global_totals.sum("Amt"), 35.0);
        assert!(plan.is_grouped());
    }

    #[test]
    fn test_sort_is_stable_within_group() {
        let plan = plan(rows(&["B^1", "A^2", "B^3", "A^4"]), &Grouping::by("Dist"));
        let amts: Vec<String> = plan.sorted.iter().map(|r| r.text("Amt")).collect();
        assert_eq!(amts, vec!["2", "4", "1", "3"]);
    }

    #[test]
    fn test_ungrouped_is_single_all_segment() {
        let records = rows(&["Y^1", "X^2"]);
        let plan = plan(records.clone(), &Grouping::default());
        assert_eq!(plan.sorted, records);
        assert_eq!(plan.segments.len(), 1);
        assert_eq!(plan.segments[0].key, GroupKey::All);
        assert_eq!(plan.group_totals(&GroupKey::All), Some(&plan.global_totals));
        assert!(!plan.is_grouped());
    }

    #[test]
    fn test_ordinal_sort_of_numeric_keys() {
        let plan = plan(rows(&["9^1", "10^2"]), &Grouping::by("Dist"));
        assert_eq!(keys(&plan), vec!["10", "9"]);
    }

    #[test]
    fn test_empty_dataset() {
        let grouped = plan(vec![], &Grouping::by("Dist"));
        assert!(grouped.segments.is_empty());
        let ungrouped = plan(vec![], &Grouping::default());
        assert_eq!(ungrouped.segments.len(), 1);
        assert!(ungrouped.groups().next().unwrap().records.is_empty());
    }

    #[test]
    fn test_number_and_text_keys_differ() {
        let records = vec![
            Record::from_pairs([("Dist", CellValue::Number(5.0))]),
            Record::from_pairs([("Dist", CellValue::Text("5".to_string()))]),
        ];
        let plan = plan(records, &Grouping::by("Dist"));
        assert_eq!(plan.segments.len(), 2);
        assert_eq!(plan.group_keys().count(), 2);
    }

    #[test]
    fn test_missing_grouping_field_sorts_as_empty() {
        let records = vec![
            Record::from_pairs([("Dist", CellValue::Text("A".to_string()))]),
            Record::from_pairs([("Other", CellValue::Number(1.0))]),
        ];
        let plan = plan(records, &Grouping::by("Dist"));
        assert_eq!(plan.segments[0].key, GroupKey::Missing);
        assert_eq!(plan.segments[1].key.to_string(), "A");
    }

    #[test]
    fn test_missing_field_joins_empty_key_group() {
        let records = vec![
            Record::from_pairs([("Dist", CellValue::Text(String::new()))]),
            Record::from_pairs([("Other", CellValue::Number(1.0))]),
        ];
        let plan = plan(records, &Grouping::by("Dist"));
        assert_eq!(plan.segments.len(), 1);
        assert_eq!(plan.segments[0].range, 0..2);
    }

    #[test]
    fn test_group_totals_lookup_by_key() {
        let plan = plan(rows(&["X^10", "Y^5"]), &Grouping::by("Dist"));
        let y = GroupKey::Value(CellValue::Text("Y".to_string()));
        assert_eq!(plan.group_totals(&y).map(|t| t.sum("Amt")), Some(5.0));
        let z = GroupKey::Value(CellValue::Text("Z".to_string()));
        assert!(plan.group_totals(&z).is_none());
    }
}
