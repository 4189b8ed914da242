use anyhow::{Context, Result};
use csv::WriterBuilder;
use std::path::{Path, PathBuf};

use crate::procurement_pipeline::ProcurementReport;
use crate::report_renderer::{contribution_details, format_count, format_qty};

pub const ITEM_COUNTS_FILE: &str = "monthly_item_counts.csv";
pub const MATERIAL_TOTALS_FILE: &str = "raw_material_totals.csv";
pub const BREAKDOWN_FILE: &str = "procurement_breakdown.csv";

/// Export the three report tables as delimited files for download or
/// hand-off, mirroring the rendered sections column for column.
///
/// Returns the paths written, in section order.
pub fn export_report_tables(report: &ProcurementReport, dir: &Path) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create export directory {:?}", dir))?;

    let item_counts_path = dir.join(ITEM_COUNTS_FILE);
    let mut wtr = WriterBuilder::new()
        .from_path(&item_counts_path)
        .with_context(|| format!("Failed to create {:?}", item_counts_path))?;
    wtr.write_record(["Food Item", "Daily Count", "Days in Month", "Estimated Monthly Count"])?;
    for projection in &report.projections {
        wtr.write_record([
            projection.display_label.as_str(),
            format_count(projection.daily_count).as_str(),
            projection.days_in_month.to_string().as_str(),
            format_count(projection.monthly_count).as_str(),
        ])?;
    }
    wtr.flush()?;

    let totals_path = dir.join(MATERIAL_TOTALS_FILE);
    let mut wtr = WriterBuilder::new()
        .from_path(&totals_path)
        .with_context(|| format!("Failed to create {:?}", totals_path))?;
    wtr.write_record(["Raw Material", "Calculation Details", "Total Quantity (kg/units)"])?;
    for total in &report.totals {
        wtr.write_record([
            total.material.as_str(),
            contribution_details(&total.material, &report.lines).as_str(),
            format_qty(total.total_qty).as_str(),
        ])?;
    }
    wtr.flush()?;

    let breakdown_path = dir.join(BREAKDOWN_FILE);
    let mut wtr = WriterBuilder::new()
        .from_path(&breakdown_path)
        .with_context(|| format!("Failed to create {:?}", breakdown_path))?;
    wtr.write_record([
        "Item",
        "Monthly Count",
        "Raw Material",
        "Per Item Qty",
        "Total Qty for Month (kg/units)",
    ])?;
    for line in &report.lines {
        wtr.write_record([
            line.item.as_str(),
            format_count(line.monthly_count).as_str(),
            line.material.as_str(),
            line.qty_per_item.to_string().as_str(),
            format_qty(line.line_total).as_str(),
        ])?;
    }
    wtr.flush()?;

    Ok(vec![item_counts_path, totals_path, breakdown_path])
}
