use procure_track::procurement_pipeline::{generate_report, PipelineError, ProcurementReport};
use procure_track::record_store::{load_all_records, LoadOutcome};
use procure_track::recipe_table::{load_recipe_table, RecipeTable};
use procure_track::report_renderer::render_markdown;
use procure_track::table_export::export_report_tables;

use anyhow::Result;
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::tempdir;

fn write_record_file(dir: &Path, name: &str, contents: &str) {
    let mut file = fs::File::create(dir.join(name)).unwrap();
    write!(file, "{}", contents).unwrap();
}

fn report_from_dir(records_dir: &Path, year: i32, month: u32) -> Result<ProcurementReport, PipelineError> {
    let recipes = RecipeTable::builtin();
    let (tables, _statuses) = load_all_records(records_dir).expect("records directory readable");
    generate_report(&recipes, &tables, year, month)
}

#[test]
fn test_report_from_accumulated_record_files() {
    let dir = tempdir().unwrap();
    write_record_file(
        dir.path(),
        "counts_2025-06-01.csv",
        "Class,Count\nSamosa,60\nDosa,20\n",
    );
    write_record_file(
        dir.path(),
        "counts_2025-06-02.csv",
        "Class,Count\nsamosa,40\nIdly,15\n",
    );

    // June 2025 has 30 days.
    let report = report_from_dir(dir.path(), 2025, 6).unwrap();

    assert_eq!(report.days_in_month, 30);
    assert_eq!(report.summary.distinct_items, 3);
    assert_eq!(report.summary.total_daily_count, 135.0);
    assert_eq!(report.summary.projected_monthly_total, 4050.0);

    // Counts for the same item across days are summed: 100/day -> 3000/month.
    let samosa = report
        .projections
        .iter()
        .find(|p| p.item == "samosa")
        .unwrap();
    assert_eq!(samosa.daily_count, 100.0);
    assert_eq!(samosa.monthly_count, 3000.0);
    assert_eq!(samosa.display_label, "Samosa");

    // Samosa alone needs flour 90.00 and potato 120.00; dosa adds no potato.
    let flour = report.totals.iter().find(|t| t.material == "flour").unwrap();
    let potato = report.totals.iter().find(|t| t.material == "potato").unwrap();
    let oil = report.totals.iter().find(|t| t.material == "oil").unwrap();
    assert!((flour.total_qty - 90.0).abs() < 1e-9);
    assert!((potato.total_qty - 120.0).abs() < 1e-9);
    // oil: samosa 3000*0.03 + dosa 600*0.01 + idly has none = 96.0
    assert!((oil.total_qty - 96.0).abs() < 1e-9);

    // Every material total reconciles exactly with its calculation lines.
    for total in &report.totals {
        let from_lines: f64 = report
            .lines
            .iter()
            .filter(|line| line.material == total.material)
            .map(|line| line.line_total)
            .sum();
        assert!((total.total_qty - from_lines).abs() < 1e-9);
    }
}

#[test]
fn test_rendered_report_is_byte_identical_across_runs() {
    let dir = tempdir().unwrap();
    write_record_file(
        dir.path(),
        "counts_2024-02-01.csv",
        "Class,Count\nJalebi,31\nPav Bhaji,12\nSamosa,50\n",
    );

    let first = render_markdown(&report_from_dir(dir.path(), 2024, 2).unwrap());
    let second = render_markdown(&report_from_dir(dir.path(), 2024, 2).unwrap());
    assert_eq!(first, second);

    // Leap-year February.
    assert!(first.contains("## 2. Estimated Raw Material Requirement for February 2024"));
    assert!(first.contains("| Jalebi | 31 | 29 | 899 |"));
}

#[test]
fn test_bad_record_files_are_skipped_not_fatal() {
    let dir = tempdir().unwrap();
    write_record_file(dir.path(), "counts_a.csv", "Class,Count\nNaan,10\n");
    write_record_file(dir.path(), "counts_b.csv", "");
    write_record_file(dir.path(), "counts_c.csv", "Class,Count\n");
    write_record_file(dir.path(), "counts_d.csv", "no header row here");

    let (tables, statuses) = load_all_records(dir.path()).unwrap();
    assert_eq!(tables.len(), 1);
    assert_eq!(statuses.len(), 4);
    assert!(matches!(statuses[0].outcome, LoadOutcome::Loaded { rows: 1 }));

    let recipes = RecipeTable::builtin();
    let report = generate_report(&recipes, &tables, 2023, 4).unwrap();
    assert_eq!(report.days_in_month, 30);
    assert_eq!(report.projections[0].monthly_count, 300.0);
}

#[test]
fn test_no_valid_records_is_the_distinguished_empty_result() {
    let dir = tempdir().unwrap();
    // Only unusable files present.
    write_record_file(dir.path(), "counts_a.csv", "");
    write_record_file(dir.path(), "counts_b.csv", "Class,Count\n");

    let result = report_from_dir(dir.path(), 2025, 6);
    assert!(matches!(result, Err(PipelineError::NoDetectionData)));

    // A missing directory behaves the same: no data, not a crash.
    let missing = dir.path().join("nothing_here");
    let result = report_from_dir(&missing, 2025, 6);
    assert!(matches!(result, Err(PipelineError::NoDetectionData)));
}

#[test]
fn test_injected_recipe_table_and_unrecognized_items() -> Result<()> {
    let records_dir = tempdir()?;
    write_record_file(
        records_dir.path(),
        "counts_2025-03-01.csv",
        "Class,Count\nHouse Special,4\nunknown_dish,7\n",
    );

    let mut recipe_file = tempfile::NamedTempFile::new()?;
    writeln!(
        recipe_file,
        r#"[
            {{"item": "House Special", "materials": [
                {{"material": "flour", "qty_per_item": 0.1}},
                {{"material": "cheese", "qty_per_item": 0.05}}
            ]}}
        ]"#
    )?;
    recipe_file.flush()?;
    let recipes = load_recipe_table(recipe_file.path())?;

    let (tables, _) = load_all_records(records_dir.path())?;
    // March has 31 days.
    let report = generate_report(&recipes, &tables, 2025, 3).unwrap();

    assert_eq!(report.unrecognized, vec!["unknown_dish".to_string()]);
    assert_eq!(report.lines.len(), 2);
    let flour = report.totals.iter().find(|t| t.material == "flour").unwrap();
    assert!((flour.total_qty - 4.0 * 31.0 * 0.1).abs() < 1e-9);

    // The unrecognized item still shows in the consumption section but in
    // no material total.
    let document = render_markdown(&report);
    assert!(document.contains("| unknown_dish | 7 | 31 | 217 |"));
    assert!(!document.contains("| unknown_dish | 217 |"));
    Ok(())
}

#[test]
fn test_exported_tables_match_rendered_report() -> Result<()> {
    let records_dir = tempdir()?;
    write_record_file(
        records_dir.path(),
        "counts_2025-06-01.csv",
        "Class,Count\nSamosa,100\n",
    );
    let report = report_from_dir(records_dir.path(), 2025, 6).unwrap();

    let export_dir = tempdir()?;
    let written = export_report_tables(&report, export_dir.path())?;
    assert_eq!(written.len(), 3);

    let totals_csv = fs::read_to_string(&written[1])?;
    assert!(totals_csv.contains("flour,Samosa: 3000×0.030,90.00"));

    let document = render_markdown(&report);
    assert!(document.contains("| flour | Samosa: 3000×0.030 | 90.00 |"));
    Ok(())
}
