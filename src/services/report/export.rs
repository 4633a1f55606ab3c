//! Serializes the aggregate and summary tables as a two-sheet workbook.

use rust_xlsxwriter::Workbook;

use crate::error::AppError;

use super::types::{
    AggregateRow, SummaryReport, CLEANED_COLUMNS, CLEANED_SHEET_NAME, SHEET_COLUMN,
    SUMMARY_SHEET_NAME,
};

/// Builds the downloadable workbook in memory: "Cleaned Data" holds the
/// aggregate table with raw category labels, "Summary Report" the final wide
/// table. Returns the serialized xlsx bytes; nothing touches the file
/// system.
pub fn write_workbook(
    aggregate: &[AggregateRow],
    summary: &SummaryReport,
) -> Result<Vec<u8>, AppError> {
    let mut workbook = Workbook::new();

    let sheet = workbook.add_worksheet().set_name(CLEANED_SHEET_NAME)?;
    for (col, name) in CLEANED_COLUMNS.iter().enumerate() {
        sheet.write_string(0, col as u16, *name)?;
    }
    for (idx, row) in aggregate.iter().enumerate() {
        let r = idx as u32 + 1;
        sheet.write_string(r, 0, row.sheet.as_str())?;
        sheet.write_string(r, 1, row.employer.as_str())?;
        sheet.write_string(r, 2, row.category.label())?;
        sheet.write_number(r, 3, row.total_loan_amount)?;
        sheet.write_number(r, 4, row.total_disbursed_amount)?;
        sheet.write_number(r, 5, row.loan_count)?;
    }

    let sheet = workbook.add_worksheet().set_name(SUMMARY_SHEET_NAME)?;
    sheet.write_string(0, 0, SHEET_COLUMN)?;
    for (col, name) in summary.columns.iter().enumerate() {
        sheet.write_string(0, col as u16 + 1, name.as_str())?;
    }
    for (idx, row) in summary.rows.iter().enumerate() {
        let r = idx as u32 + 1;
        sheet.write_string(r, 0, row.sheet.as_str())?;
        for (col, value) in row.values.iter().enumerate() {
            sheet.write_number(r, col as u16 + 1, *value)?;
        }
    }

    Ok(workbook.save_to_buffer()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::report::types::{LoanCategory, SummaryRow};
    use calamine::{open_workbook_from_rs, Data, Reader, Xlsx};
    use std::io::Cursor;

    #[test]
    fn test_workbook_round_trip() {
        let aggregate = vec![AggregateRow {
            sheet: "Jan".into(),
            employer: "Acme".into(),
            category: LoanCategory::New,
            total_loan_amount: 100.0,
            total_disbursed_amount: 90.0,
            loan_count: 1,
        }];
        let summary = SummaryReport {
            columns: vec!["Acme New".into(), "NEW LOAN".into()],
            rows: vec![SummaryRow {
                sheet: "Jan".into(),
                values: vec![90.0, 90.0],
            }],
        };

        let buffer = write_workbook(&aggregate, &summary).unwrap();

        let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(buffer)).unwrap();
        assert_eq!(
            workbook.sheet_names().to_vec(),
            vec![CLEANED_SHEET_NAME.to_string(), SUMMARY_SHEET_NAME.to_string()]
        );

        let cleaned = workbook.worksheet_range(CLEANED_SHEET_NAME).unwrap();
        let header: Vec<String> = cleaned
            .rows()
            .next()
            .unwrap()
            .iter()
            .map(|cell| cell.to_string())
            .collect();
        assert_eq!(header, CLEANED_COLUMNS.map(String::from).to_vec());
        let data_row = cleaned.rows().nth(1).unwrap();
        assert_eq!(data_row[0], Data::String("Jan".into()));
        assert_eq!(data_row[2], Data::String("New".into()));
        assert_eq!(data_row[3], Data::Float(100.0));
        assert_eq!(data_row[5], Data::Float(1.0));

        let report = workbook.worksheet_range(SUMMARY_SHEET_NAME).unwrap();
        let header: Vec<String> = report
            .rows()
            .next()
            .unwrap()
            .iter()
            .map(|cell| cell.to_string())
            .collect();
        assert_eq!(header, vec![SHEET_COLUMN, "Acme New", "NEW LOAN"]);
        let data_row = report.rows().nth(1).unwrap();
        assert_eq!(data_row[0], Data::String("Jan".into()));
        assert_eq!(data_row[1], Data::Float(90.0));
    }

    #[test]
    fn test_empty_tables_still_produce_both_sheets() {
        let summary = SummaryReport {
            columns: vec!["NEW LOAN".into(), "RETURNING".into(), "TOP UP".into()],
            rows: Vec::new(),
        };

        let buffer = write_workbook(&[], &summary).unwrap();

        let mut workbook: Xlsx<_> = open_workbook_from_rs(Cursor::new(buffer)).unwrap();
        assert_eq!(workbook.sheet_names().len(), 2);
    }
}
