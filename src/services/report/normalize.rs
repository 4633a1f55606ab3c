//! Field normalization: numeric coercion, loan-type classification and
//! employer cleaning.

use calamine::Data;
use once_cell::sync::Lazy;
use regex::Regex;

use super::types::{LoanCategory, LoanRecord, RawRecord};

/// Classification rules over the uppercased loan-type text, evaluated in
/// order with the first match winning: a value containing both "NEW" and
/// "TOP UP" classifies as New.
const CLASSIFICATION_RULES: [(&str, LoanCategory); 3] = [
    ("NEW", LoanCategory::New),
    ("TOP UP", LoanCategory::TopUp),
    ("RETURNING", LoanCategory::Returning),
];

/// Category keywords stripped out of employer names, in removal order.
static EMPLOYER_NOISE: Lazy<Vec<Regex>> = Lazy::new(|| {
    ["TOP UP", "NEW", "RETURNING"]
        .iter()
        .map(|token| {
            Regex::new(&format!(r"(?i)\b{}\b", token)).expect("static employer pattern")
        })
        .collect()
});

pub fn normalize(records: Vec<RawRecord>) -> Vec<LoanRecord> {
    records
        .into_iter()
        .map(|record| LoanRecord {
            sheet: record.sheet,
            employer: record.employer.map(|name| clean_employer(&name)),
            category: record.loan_type.map(|value| classify_loan_type(&value)),
            loan_amount: coerce_numeric(&record.loan_amount),
            disbursement: coerce_numeric(&record.disbursement),
        })
        .collect()
}

/// Monetary cells: numbers pass through, text is parsed, anything that does
/// not parse becomes missing rather than an error.
pub fn coerce_numeric(cell: &Data) -> Option<f64> {
    match cell {
        Data::Float(value) => Some(*value),
        Data::Int(value) => Some(*value as f64),
        Data::Bool(value) => Some(if *value { 1.0 } else { 0.0 }),
        Data::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// First-match-wins cascade; unrecognized text is Other, a deliberate
/// catch-all rather than a missing-data state.
pub fn classify_loan_type(value: &str) -> LoanCategory {
    let upper = value.to_uppercase();
    CLASSIFICATION_RULES
        .iter()
        .find(|(keyword, _)| upper.contains(*keyword))
        .map(|(_, category)| *category)
        .unwrap_or(LoanCategory::Other)
}

/// Removes whole-word category keywords from an employer name and trims the
/// ends. Inner runs of whitespace left by a removal are kept.
pub fn clean_employer(value: &str) -> String {
    let mut cleaned = value.to_string();
    for pattern in EMPLOYER_NOISE.iter() {
        cleaned = pattern.replace_all(&cleaned, "").into_owned();
    }
    cleaned.trim().to_string()
}
