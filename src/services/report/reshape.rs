//! Pivots the aggregate table into the wide summary report.
//!
//! Two independent group-by-then-spread passes over the same aggregate
//! table, both keyed on the sheet identifier, joined afterwards: an overall
//! pivot by loan category (with renamed columns) and an employer pivot by
//! "{employer} {category}" label.

use std::collections::{BTreeMap, BTreeSet};

use super::types::{AggregateRow, LoanCategory, SummaryReport, SummaryRow};

/// One spread: a row per sheet identifier, a column per observed label,
/// disbursed totals summed into the cells.
#[derive(Debug, Default)]
struct Pivot {
    columns: BTreeSet<String>,
    rows: BTreeMap<String, BTreeMap<String, f64>>,
}

impl Pivot {
    fn add(&mut self, sheet: &str, column: String, value: f64) {
        *self
            .rows
            .entry(sheet.to_string())
            .or_default()
            .entry(column.clone())
            .or_insert(0.0) += value;
        self.columns.insert(column);
    }

    /// Cell lookup with the fill rule: an absent combination is 0, and so is
    /// a sheet identifier this pivot never saw (the outer-join gap).
    fn value(&self, sheet: &str, column: &str) -> f64 {
        self.rows
            .get(sheet)
            .and_then(|row| row.get(column))
            .copied()
            .unwrap_or(0.0)
    }
}

/// Pivot by loan category alone. The fixed report columns are always
/// present, even for categories nothing classified into; "Other" only
/// appears when observed.
fn pivot_overall(aggregate: &[AggregateRow]) -> Pivot {
    let mut pivot = Pivot::default();
    for row in aggregate {
        pivot.add(
            &row.sheet,
            row.category.report_label().to_string(),
            row.total_disbursed_amount,
        );
    }
    for category in [LoanCategory::New, LoanCategory::Returning, LoanCategory::TopUp] {
        pivot.columns.insert(category.report_label().to_string());
    }
    pivot
}

/// Pivot by every observed (employer, category) pair, one column per pair.
/// Trimming covers employers cleaned down to an empty name.
fn pivot_by_employer(aggregate: &[AggregateRow]) -> Pivot {
    let mut pivot = Pivot::default();
    for row in aggregate {
        let label = format!("{} {}", row.employer, row.category.label());
        pivot.add(&row.sheet, label.trim().to_string(), row.total_disbursed_amount);
    }
    pivot
}

/// Outer-joins the two pivots on the sheet identifier and orders the
/// columns: sheet identifier first (kept apart as the row key), everything
/// else lexicographically.
pub fn build_summary(aggregate: &[AggregateRow]) -> SummaryReport {
    let overall = pivot_overall(aggregate);
    let employer = pivot_by_employer(aggregate);

    let columns: Vec<String> = overall.columns.union(&employer.columns).cloned().collect();

    let sheets: BTreeSet<String> = overall
        .rows
        .keys()
        .chain(employer.rows.keys())
        .cloned()
        .collect();

    let rows = sheets
        .into_iter()
        .map(|sheet| {
            let values = columns
                .iter()
                .map(|column| {
                    if overall.columns.contains(column) {
                        overall.value(&sheet, column)
                    } else {
                        employer.value(&sheet, column)
                    }
                })
                .collect();
            SummaryRow { sheet, values }
        })
        .collect();

    SummaryReport { columns, rows }
}
