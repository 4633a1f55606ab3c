use axum::{
    extract::{Multipart, State},
    http::{header, Method, StatusCode},
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use bytes::Bytes;
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use crate::{
    error::AppError,
    services::report::{
        self,
        types::{LoanReport, CLEANED_COLUMNS, SHEET_COLUMN, WORKBOOK_FILENAME, WORKBOOK_MIME},
    },
    AppState,
};

pub fn routes() -> Router<Arc<AppState>> {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
        .max_age(std::time::Duration::from_secs(3600));

    Router::new()
        .route("/report/summary", post(summarize_workbook))
        .route("/report/workbook", post(download_workbook))
        .layer(cors)
}

/// One on-screen table: column headers plus row cells in column order.
#[derive(Debug, Serialize)]
pub struct TablePayload {
    columns: Vec<String>,
    rows: Vec<Vec<serde_json::Value>>,
}

#[derive(Debug, Serialize)]
pub struct ReportResponse {
    cleaned: TablePayload,
    summary: TablePayload,
}

#[axum::debug_handler]
async fn summarize_workbook(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<Json<ReportResponse>, AppError> {
    let start = std::time::Instant::now();

    let file_data = read_workbook_upload(multipart, state.config.max_file_size).await?;
    let report = report::generate_report(file_data).await?;
    tracing::info!("Summary request served in {:?}", start.elapsed());

    Ok(Json(ReportResponse {
        cleaned: cleaned_table(&report),
        summary: summary_table(&report),
    }))
}

#[axum::debug_handler]
async fn download_workbook(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let start = std::time::Instant::now();

    let file_data = read_workbook_upload(multipart, state.config.max_file_size).await?;
    let report = report::generate_report(file_data).await?;
    let workbook = report::export::write_workbook(&report.aggregate, &report.summary)?;
    tracing::info!(
        "Workbook of {}KB built in {:?}",
        workbook.len() / 1024,
        start.elapsed()
    );

    let headers = [
        (header::CONTENT_TYPE, WORKBOOK_MIME.to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}\"", WORKBOOK_FILENAME),
        ),
    ];
    Ok((StatusCode::OK, headers, workbook))
}

/// Pulls the uploaded workbook out of the multipart body and validates the
/// obvious: a "file" field is present, the name says xlsx, the size fits.
async fn read_workbook_upload(
    mut multipart: Multipart,
    max_file_size: usize,
) -> Result<Bytes, AppError> {
    let mut file_data: Option<Bytes> = None;
    let mut file_name: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Multipart error: {}", e)))?
    {
        if field.name() == Some("file") {
            file_name = field.file_name().map(|name| name.to_string());
            file_data = Some(
                field
                    .bytes()
                    .await
                    .map_err(|e| AppError::InvalidInput(format!("Read error: {}", e)))?,
            );
        }
    }

    let file_data =
        file_data.ok_or_else(|| AppError::InvalidInput("No file provided".to_string()))?;

    if let Some(name) = &file_name {
        if !name.to_lowercase().ends_with(".xlsx") {
            tracing::error!("Unsupported file type: {}", name);
            return Err(AppError::InvalidInput(
                "Only XLSX files are supported".to_string(),
            ));
        }
    }
    if file_data.len() > max_file_size {
        return Err(AppError::InvalidInput(format!(
            "File exceeds maximum size of {} bytes",
            max_file_size
        )));
    }

    tracing::info!(
        "Received upload {} ({}KB)",
        file_name.as_deref().unwrap_or("unknown"),
        file_data.len() / 1024
    );

    Ok(file_data)
}

fn cleaned_table(report: &LoanReport) -> TablePayload {
    TablePayload {
        columns: CLEANED_COLUMNS.iter().map(|name| name.to_string()).collect(),
        rows: report
            .aggregate
            .iter()
            .map(|row| {
                vec![
                    json!(row.sheet),
                    json!(row.employer),
                    json!(row.category.label()),
                    json!(row.total_loan_amount),
                    json!(row.total_disbursed_amount),
                    json!(row.loan_count),
                ]
            })
            .collect(),
    }
}

fn summary_table(report: &LoanReport) -> TablePayload {
    let mut columns = Vec::with_capacity(report.summary.columns.len() + 1);
    columns.push(SHEET_COLUMN.to_string());
    columns.extend(report.summary.columns.iter().cloned());

    TablePayload {
        columns,
        rows: report
            .summary
            .rows
            .iter()
            .map(|row| {
                let mut cells = Vec::with_capacity(row.values.len() + 1);
                cells.push(json!(row.sheet));
                cells.extend(row.values.iter().map(|value| json!(value)));
                cells
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::report::types::{
        AggregateRow, LoanCategory, SummaryReport, SummaryRow,
    };

    fn sample_report() -> LoanReport {
        LoanReport {
            aggregate: vec![AggregateRow {
                sheet: "Jan".into(),
                employer: "Acme".into(),
                category: LoanCategory::New,
                total_loan_amount: 100.0,
                total_disbursed_amount: 90.0,
                loan_count: 1,
            }],
            summary: SummaryReport {
                columns: vec!["Acme New".into(), "NEW LOAN".into()],
                rows: vec![SummaryRow {
                    sheet: "Jan".into(),
                    values: vec![90.0, 90.0],
                }],
            },
        }
    }

    #[test]
    fn test_cleaned_table_payload() {
        let payload = cleaned_table(&sample_report());

        assert_eq!(payload.columns[0], SHEET_COLUMN);
        assert_eq!(payload.rows.len(), 1);
        assert_eq!(payload.rows[0][2], json!("New"));
        assert_eq!(payload.rows[0][3], json!(100.0));
        assert_eq!(payload.rows[0][5], json!(1));
    }

    #[test]
    fn test_summary_table_puts_sheet_column_first() {
        let payload = summary_table(&sample_report());

        assert_eq!(
            payload.columns,
            vec![SHEET_COLUMN.to_string(), "Acme New".into(), "NEW LOAN".into()]
        );
        assert_eq!(payload.rows[0][0], json!("Jan"));
        assert_eq!(payload.rows[0][1], json!(90.0));
    }
}
