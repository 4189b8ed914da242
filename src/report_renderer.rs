use std::fmt::Write as _;

use crate::monthly_projection::month_name;
use crate::procurement_aggregator::CalculationLine;
use crate::procurement_pipeline::ProcurementReport;

/// Render a count the way it was given: integral values without forced
/// decimals, fractional values with their natural representation.
pub fn format_count(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}

/// Quantity totals are always rendered with exactly two decimal digits.
pub fn format_qty(value: f64) -> String {
    format!("{:.2}", value)
}

/// Human-readable derivation of one material's total, e.g.
/// `"Samosa: 3000×0.030 + Jalebi: 900×0.030"`.
pub fn contribution_details(material: &str, lines: &[CalculationLine]) -> String {
    lines
        .iter()
        .filter(|line| line.material == material)
        .map(|line| {
            format!(
                "{}: {}×{:.3}",
                line.item,
                format_count(line.monthly_count),
                line.qty_per_item
            )
        })
        .collect::<Vec<String>>()
        .join(" + ")
}

/// Render the report as a single markdown document with three sections:
/// item monthly counts, raw material totals, and the full breakdown.
///
/// Output is byte-identical for identical reports; it is a static artifact
/// suitable for review or export independent of any display layer.
pub fn render_markdown(report: &ProcurementReport) -> String {
    let mut section1 = String::from("## 1. Estimated Monthly Consumption of Food Items\n\n");
    section1.push_str("| Food Item | Daily Count | Days in Month | Estimated Monthly Count |\n");
    section1.push_str("|-----------|:-----------:|:-------------:|:----------------------:|\n");
    for projection in &report.projections {
        let _ = writeln!(
            section1,
            "| {} | {} | {} | {} |",
            projection.display_label,
            format_count(projection.daily_count),
            projection.days_in_month,
            format_count(projection.monthly_count)
        );
    }

    let mut section2 = format!(
        "## 2. Estimated Raw Material Requirement for {} {}\n\n",
        month_name(report.month),
        report.year
    );
    section2.push_str("| Raw Material | Calculation Details | Total Quantity (kg/units) |\n");
    section2.push_str("|--------------|--------------------|:------------------------:|\n");
    for total in &report.totals {
        let _ = writeln!(
            section2,
            "| {} | {} | {} |",
            total.material,
            contribution_details(&total.material, &report.lines),
            format_qty(total.total_qty)
        );
    }

    let mut section3 = String::from("## 3. Detailed Ingredient-wise Breakdown\n\n");
    section3.push_str("| Item | Monthly Count | Raw Material | Per Item Qty | Total Qty for Month (kg/units) |\n");
    section3.push_str("|------|:-------------:|:------------:|:------------:|:------------------------------:|\n");
    for line in &report.lines {
        let _ = writeln!(
            section3,
            "| {} | {} | {} | {} | {} |",
            line.item,
            format_count(line.monthly_count),
            line.material,
            line.qty_per_item,
            format_qty(line.line_total)
        );
    }

    format!("{}\n{}\n{}", section1, section2, section3)
}
