use calamine::Data;

pub const EMPLOYER_COLUMN: &str = "NAME OF EMPLOYER";
pub const LOAN_TYPE_COLUMN: &str = "LOAN TYPE";
pub const LOAN_AMOUNT_COLUMN: &str = "LOAN AMOUNT";
pub const DISBURSEMENT_COLUMN: &str = "DISBURSEMENT AMOUNT";

/// Column holding the originating sheet name, used as the period key.
pub const SHEET_COLUMN: &str = "SheetDate";

pub const CLEANED_SHEET_NAME: &str = "Cleaned Data";
pub const SUMMARY_SHEET_NAME: &str = "Summary Report";

/// Header row of the "Cleaned Data" output sheet.
pub const CLEANED_COLUMNS: [&str; 6] = [
    SHEET_COLUMN,
    EMPLOYER_COLUMN,
    LOAN_TYPE_COLUMN,
    "total_loan_amount",
    "total_disbursed_amount",
    "loan_count",
];

pub const WORKBOOK_MIME: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
pub const WORKBOOK_FILENAME: &str = "loan_summary.xlsx";

/// One loan entry as read from a sheet, before normalization. The amount
/// cells stay raw until numeric coercion decides what is missing.
#[derive(Debug, Clone)]
pub struct RawRecord {
    pub sheet: String,
    pub employer: Option<String>,
    pub loan_type: Option<String>,
    pub loan_amount: Data,
    pub disbursement: Data,
}

/// Normalized classification of the loan-type text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LoanCategory {
    New,
    TopUp,
    Returning,
    Other,
}

impl LoanCategory {
    /// Raw label used in the cleaned aggregate table.
    pub fn label(&self) -> &'static str {
        match self {
            LoanCategory::New => "New",
            LoanCategory::TopUp => "Top up",
            LoanCategory::Returning => "Returning",
            LoanCategory::Other => "Other",
        }
    }

    /// Column label used by the overall pivot of the summary report.
    /// "Other" keeps its raw label there.
    pub fn report_label(&self) -> &'static str {
        match self {
            LoanCategory::New => "NEW LOAN",
            LoanCategory::TopUp => "TOP UP",
            LoanCategory::Returning => "RETURNING",
            LoanCategory::Other => "Other",
        }
    }
}

/// A record after numeric coercion, classification and employer cleaning.
/// Missing values stay `None`: excluded from sums, and a record missing
/// either group key never reaches a group.
#[derive(Debug, Clone, PartialEq)]
pub struct LoanRecord {
    pub sheet: String,
    pub employer: Option<String>,
    pub category: Option<LoanCategory>,
    pub loan_amount: Option<f64>,
    pub disbursement: Option<f64>,
}

/// One (sheet, employer, category) group of the cleaned aggregate table.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateRow {
    pub sheet: String,
    pub employer: String,
    pub category: LoanCategory,
    pub total_loan_amount: f64,
    pub total_disbursed_amount: f64,
    pub loan_count: u32,
}

/// Final wide table: one row per sheet identifier, `columns` sorted with the
/// sheet column kept apart, `values` aligned with `columns`. Absent
/// combinations hold 0, never a missing value.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryReport {
    pub columns: Vec<String>,
    pub rows: Vec<SummaryRow>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    pub sheet: String,
    pub values: Vec<f64>,
}

/// Output of the full pipeline for one uploaded workbook.
#[derive(Debug)]
pub struct LoanReport {
    pub aggregate: Vec<AggregateRow>,
    pub summary: SummaryReport,
}
