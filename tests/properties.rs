//! Property-based tests for grouping, totals and schema serialization
//!
//! These tests check invariants that must hold for any dataset:
//! - Group totals partition the grand total
//! - AVG is always SUM / COUNT over the same scope
//! - Every group gets exactly one footer, in sorted key order
//! - A schema survives a JSON round trip unchanged

use std::collections::BTreeSet;

use folio::aggregate::{format_amount, AggregateFunction};
use folio::group::plan;
use folio::record::parse_rows;
use folio::schema::*;
use folio::surface::RecordingSurface;
use proptest::prelude::*;

/// Generate rows of `key^amount`, with a few keys so groups repeat.
/// Amounts are whole numbers so sums compare exactly.
fn rows_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(
        (
            prop_oneof!["[A-D]", "[0-9]{1,2}", Just(String::new())],
            prop_oneof![
                (-5000i64..5000).prop_map(|n| n.to_string()),
                Just(String::new()),
                "[a-z]{1,4}",
            ],
        )
            .prop_map(|(key, amount)| format!("{}^{}", key, amount)),
        0..40,
    )
}

fn manifest() -> Vec<String> {
    vec!["Key".to_string(), "Amt".to_string()]
}

/// Generate a single element of any kind.
fn element_strategy() -> impl Strategy<Value = ElementDef> {
    let kind = prop_oneof![
        "[A-Za-z ]{0,12}".prop_map(|content| ElementKind::Label { content }),
        "[A-Za-z_]{1,10}".prop_map(|key| ElementKind::Field {
            content: format!("[{}]", key),
            key,
        }),
        (
            prop_oneof![Just("SUM"), Just("AVG"), Just("COUNT"), Just("MAX")],
            "[A-Za-z_]{1,10}"
        )
            .prop_map(|(function, field)| ElementKind::Calculation {
                function: AggregateFunction::from(function.to_string()),
                field,
            }),
    ];
    (
        kind,
        0u16..600,
        0u16..100,
        prop::option::of(1u16..300),
        6u8..36,
        any::<(bool, bool, bool)>(),
    )
        .prop_map(|(kind, x, y, w, size, (bold, italic, underline))| ElementDef {
            kind,
            x: f64::from(x),
            y: f64::from(y),
            w: w.map(f64::from),
            h: None,
            font_size: f64::from(size),
            bold,
            italic,
            underline,
        })
}

fn schema_strategy() -> impl Strategy<Value = LayoutSchema> {
    let part = (0u16..200, prop::collection::vec(element_strategy(), 0..4))
        .prop_map(|(height, elements)| PartDef::new(f64::from(height), elements));
    (
        prop::option::of("[A-Za-z_]{1,8}"),
        any::<bool>(),
        prop::collection::vec(prop::option::of(part), 5),
        any::<bool>(),
    )
        .prop_map(|(field, enabled, parts, repeat_header)| {
            let mut schema = LayoutSchema {
                grouping: Grouping { enabled, field },
                ..Default::default()
            };
            schema.page.repeat_header = repeat_header;
            for (name, part) in PartName::ALL.into_iter().zip(parts) {
                if let Some(part) = part {
                    schema.parts.set(name, part);
                }
            }
            schema
        })
}

#[cfg(test)]
mod proptest_tests {
    use super::*;

    proptest! {
        #[test]
        fn group_sums_partition_the_grand_total(rows in rows_strategy()) {
            let records = parse_rows(&manifest(), &rows, '^');
            let plan = plan(records, &Grouping::by("Key"));

            let group_sum: f64 = plan.groups().map(|g| g.totals.sum("Amt")).sum();
            let group_count: usize = plan.groups().map(|g| g.totals.count("Amt")).sum();
            prop_assert_eq!(group_sum, plan.global_totals.sum("Amt"));
            prop_assert_eq!(group_count, plan.global_totals.count("Amt"));
        }

        #[test]
        fn avg_is_sum_over_count(rows in rows_strategy()) {
            let records = parse_rows(&manifest(), &rows, '^');
            let plan = plan(records, &Grouping::by("Key"));

            for group in plan.groups() {
                let t = group.totals;
                let avg = t.value(&AggregateFunction::Avg, "Amt");
                let count = t.count("Amt");
                if count == 0 {
                    prop_assert_eq!(avg, 0.0);
                } else {
                    prop_assert!((avg - t.sum("Amt") / count as f64).abs() < 1e-9);
                }
            }
        }

        #[test]
        fn every_group_gets_one_header_and_footer(rows in rows_strategy()) {
            let mut schema = LayoutSchema {
                grouping: Grouping::by("Key"),
                ..Default::default()
            };
            for name in PartName::ALL {
                schema.parts.set(name, PartDef::new(15.0, vec![ElementDef::field("Key", 0.0, 0.0)]));
            }

            let distinct: BTreeSet<String> = parse_rows(&manifest(), &rows, '^')
                .iter()
                .map(|r| r.text("Key"))
                .collect();

            let mut surface = RecordingSurface::new();
            let summary = folio::generate(&mut surface, &schema, &manifest(), &rows, '^');

            prop_assert_eq!(summary.count(PartName::GroupHeader), distinct.len());
            prop_assert_eq!(summary.count(PartName::GroupFooter), distinct.len());
            prop_assert_eq!(summary.count(PartName::Body), rows.len());
            prop_assert_eq!(summary.parts.last().map(|p| p.part), Some(PartName::Footer));
        }

        #[test]
        fn parts_never_cross_the_bottom_margin(rows in rows_strategy(), height in 10u16..120) {
            let mut schema = LayoutSchema::default();
            schema.parts.set(PartName::Body, PartDef::new(f64::from(height), vec![]));
            let bottom = schema.page.content_bottom();

            let mut surface = RecordingSurface::new();
            let summary = folio::generate(&mut surface, &schema, &manifest(), &rows, '^');

            for placed in &summary.parts {
                prop_assert!(placed.y + f64::from(height) <= bottom);
            }
            prop_assert_eq!(summary.pages, surface.page_count());
        }

        #[test]
        fn schema_json_round_trip(schema in schema_strategy()) {
            let json = schema.to_json_pretty().unwrap();
            let again = LayoutSchema::from_json(&json).unwrap();
            prop_assert_eq!(again, schema);
        }

        #[test]
        fn formatted_amounts_have_two_decimals(cents in -10_000_000_000i64..10_000_000_000) {
            let value = cents as f64 / 100.0;
            let text = format_amount(value);
            let (_, decimals) = text.rsplit_once('.').unwrap();
            prop_assert_eq!(decimals.len(), 2);
            let parsed: f64 = text.replace(',', "").parse().unwrap();
            prop_assert!((parsed - value).abs() < 0.005);
        }
    }
}
