//! Reads every sheet of an uploaded workbook into one tagged record set.

use std::io::Cursor;

use bytes::Bytes;
use calamine::{open_workbook_from_rs, Data, Reader, Xlsx};

use crate::error::AppError;

use super::types::{
    RawRecord, DISBURSEMENT_COLUMN, EMPLOYER_COLUMN, LOAN_AMOUNT_COLUMN, LOAN_TYPE_COLUMN,
};

/// Concatenates all sheets of the workbook, tagging each row with the name
/// of the sheet it came from. An unreadable workbook or sheet, or a sheet
/// whose header row lacks a required column, fails the whole run.
pub fn merge_sheets(file_data: Bytes) -> Result<Vec<RawRecord>, AppError> {
    let cursor = Cursor::new(file_data);

    let mut workbook: Xlsx<_> = open_workbook_from_rs(cursor)
        .map_err(|e| AppError::FileProcessing(format!("Failed to open Excel file: {}", e)))?;

    let sheet_names = workbook.sheet_names().to_vec();
    tracing::info!("Merging {} sheets", sheet_names.len());

    let mut records = Vec::new();
    for sheet_name in &sheet_names {
        let range = workbook.worksheet_range(sheet_name).map_err(|e| {
            AppError::FileProcessing(format!("Failed to read sheet {}: {}", sheet_name, e))
        })?;

        let mut rows = range.rows();
        let Some(header) = rows.next() else {
            tracing::warn!("Sheet {} is empty, skipping", sheet_name);
            continue;
        };

        let columns = RequiredColumns::locate(header, sheet_name)?;
        for row in rows {
            records.push(columns.extract(sheet_name, row));
        }
    }

    Ok(records)
}

/// Positions of the required columns in one sheet's header row. Other
/// columns pass through unused.
struct RequiredColumns {
    employer: usize,
    loan_type: usize,
    loan_amount: usize,
    disbursement: usize,
}

impl RequiredColumns {
    fn locate(header: &[Data], sheet_name: &str) -> Result<Self, AppError> {
        let position = |wanted: &str| {
            header
                .iter()
                .position(|cell| cell.to_string() == wanted)
                .ok_or_else(|| AppError::MissingColumn {
                    sheet: sheet_name.to_string(),
                    column: wanted.to_string(),
                })
        };

        Ok(Self {
            employer: position(EMPLOYER_COLUMN)?,
            loan_type: position(LOAN_TYPE_COLUMN)?,
            loan_amount: position(LOAN_AMOUNT_COLUMN)?,
            disbursement: position(DISBURSEMENT_COLUMN)?,
        })
    }

    fn extract(&self, sheet_name: &str, row: &[Data]) -> RawRecord {
        RawRecord {
            sheet: sheet_name.to_string(),
            employer: text_cell(row.get(self.employer)),
            loan_type: text_cell(row.get(self.loan_type)),
            loan_amount: row.get(self.loan_amount).cloned().unwrap_or(Data::Empty),
            disbursement: row.get(self.disbursement).cloned().unwrap_or(Data::Empty),
        }
    }
}

/// Text fields: blank and error cells are missing, anything else keeps its
/// display text (numeric employer names stay usable as group keys).
fn text_cell(cell: Option<&Data>) -> Option<String> {
    match cell {
        None | Some(Data::Empty) | Some(Data::Error(_)) => None,
        Some(value) => Some(value.to_string()),
    }
}
