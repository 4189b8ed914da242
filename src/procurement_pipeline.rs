use std::error::Error;
use std::fmt;

use crate::monthly_projection::{days_in_month, project_monthly, MonthlyProjection};
use crate::procurement_aggregator::{aggregate_materials, CalculationLine, RawMaterialTotal};
use crate::record_normalizer::{normalize_records, DetectionTable};
use crate::recipe_table::RecipeTable;

#[derive(Debug)]
pub enum PipelineError {
    /// No valid detection records were supplied at all. Distinct from an
    /// empty-but-valid report so callers can render guidance instead of a
    /// blank document.
    NoDetectionData,
    InvalidPeriod { year: i32, month: u32 },
}

impl fmt::Display for PipelineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PipelineError::NoDetectionData => {
                write!(f, "No valid detection records available")
            }
            PipelineError::InvalidPeriod { year, month } => {
                write!(f, "Invalid target period: year {} month {}", year, month)
            }
        }
    }
}

impl Error for PipelineError {}

/// Convenience scalars derivable from the report tables.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportSummary {
    /// Sum of observed daily counts across all items.
    pub total_daily_count: f64,
    /// Number of distinct food items seen in the detection records.
    pub distinct_items: usize,
    /// Total daily count scaled to the target month.
    pub projected_monthly_total: f64,
}

/// The assembled monthly procurement report.
#[derive(Debug, Clone)]
pub struct ProcurementReport {
    pub year: i32,
    pub month: u32,
    pub days_in_month: u32,
    pub projections: Vec<MonthlyProjection>,
    pub lines: Vec<CalculationLine>,
    pub totals: Vec<RawMaterialTotal>,
    pub unrecognized: Vec<String>,
    pub summary: ReportSummary,
}

/// Run the full pipeline: normalize, project to the target month, and
/// aggregate against the recipe table.
///
/// Pure with respect to its inputs: the recipe table and detection tables
/// are only read, and every derived structure is computed fresh.
pub fn generate_report(
    recipes: &RecipeTable,
    tables: &[DetectionTable],
    year: i32,
    month: u32,
) -> Result<ProcurementReport, PipelineError> {
    let days = days_in_month(year, month).ok_or(PipelineError::InvalidPeriod { year, month })?;

    let counts = normalize_records(tables);
    if counts.is_empty() {
        return Err(PipelineError::NoDetectionData);
    }

    let total_daily_count: f64 = counts.iter().map(|c| c.observed_count).sum();
    let summary = ReportSummary {
        total_daily_count,
        distinct_items: counts.len(),
        projected_monthly_total: total_daily_count * f64::from(days),
    };

    let projections = project_monthly(&counts, days);
    let aggregation = aggregate_materials(&projections, recipes);

    Ok(ProcurementReport {
        year,
        month,
        days_in_month: days,
        projections,
        lines: aggregation.lines,
        totals: aggregation.totals,
        unrecognized: aggregation.unrecognized,
        summary,
    })
}
