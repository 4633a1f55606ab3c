//! Groups normalized records into per-(sheet, employer, category) totals.

use std::collections::BTreeMap;

use super::types::{AggregateRow, LoanCategory, LoanRecord};

#[derive(Default)]
struct GroupTotals {
    loan_amount: f64,
    disbursed: f64,
    count: u32,
}

/// One row per distinct (sheet identifier, employer, loan category) group.
/// Sums exclude missing amounts; the count covers rows with a non-missing
/// loan amount. Output is ordered by the key tuple so golden-file
/// comparisons stay deterministic.
pub fn aggregate(records: &[LoanRecord]) -> Vec<AggregateRow> {
    let mut groups: BTreeMap<(String, String, LoanCategory), GroupTotals> = BTreeMap::new();

    for record in records {
        // A record missing either key has no group to land in.
        let (Some(employer), Some(category)) = (&record.employer, record.category) else {
            continue;
        };

        let totals = groups
            .entry((record.sheet.clone(), employer.clone(), category))
            .or_default();

        if let Some(amount) = record.loan_amount {
            totals.loan_amount += amount;
            totals.count += 1;
        }
        if let Some(amount) = record.disbursement {
            totals.disbursed += amount;
        }
    }

    groups
        .into_iter()
        .map(|((sheet, employer, category), totals)| AggregateRow {
            sheet,
            employer,
            category,
            total_loan_amount: totals.loan_amount,
            total_disbursed_amount: totals.disbursed,
            loan_count: totals.count,
        })
        .collect()
}
