pub mod aggregate;
pub mod export;
pub mod merge;
pub mod normalize;
pub mod reshape;
pub mod types;

use bytes::Bytes;

use crate::error::AppError;

use self::types::LoanReport;

/// Runs the full pipeline over one uploaded workbook: merge the sheets,
/// normalize the fields, aggregate, reshape into the wide report.
pub async fn generate_report(file_data: Bytes) -> Result<LoanReport, AppError> {
    let start = std::time::Instant::now();

    let raw_records = merge::merge_sheets(file_data)?;
    tracing::info!("Merged {} rows in {:?}", raw_records.len(), start.elapsed());

    let records = normalize::normalize(raw_records);

    let aggregate = aggregate::aggregate(&records);
    tracing::info!("Aggregated into {} groups", aggregate.len());

    let summary = reshape::build_summary(&aggregate);
    tracing::info!(
        "Report ready in {:?}: {} summary columns, {} sheets",
        start.elapsed(),
        summary.columns.len(),
        summary.rows.len()
    );

    Ok(LoanReport { aggregate, summary })
}
