use anyhow::{Context, Result};
use chrono::{Datelike, Local};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use procure_track::cli::{parse_args, Command};
use procure_track::detector_api::connection::Detector;
use procure_track::detector_api::endpoints::{DetectionRequest, DETECTION_MODELS};
use procure_track::procurement_pipeline::{generate_report, PipelineError};
use procure_track::record_normalizer::DetectionRecord;
use procure_track::record_store::{self, LoadOutcome, RecordLoadStatus};
use procure_track::recipe_table::{load_recipe_table, RecipeTable};
use procure_track::report_renderer::{format_count, render_markdown};
use procure_track::table_export::export_report_tables;

// Environment variable names for the external detection service
const DETECTOR_URL_ENV_VAR: &str = "DETECTOR_API_URL";
const DETECTOR_KEY_ENV_VAR: &str = "DETECTOR_API_KEY";

fn format_load_status(status: &RecordLoadStatus) -> String {
    match &status.outcome {
        LoadOutcome::Loaded { rows } => format!(" > Loaded: {} ({} items)", status.file, rows),
        LoadOutcome::SkippedZeroSize => format!(" > Skipped (zero-size file): {}", status.file),
        LoadOutcome::SkippedEmpty => format!(" > Skipped (empty file): {}", status.file),
        LoadOutcome::SkippedUnreadable { reason } => {
            format!(" > Skipped (unreadable): {} - {}", status.file, reason)
        }
    }
}

async fn run_detect(video: String, model: Option<String>, records_dir: PathBuf) -> Result<()> {
    let detector = Detector::http_service(DETECTOR_URL_ENV_VAR, DETECTOR_KEY_ENV_VAR);
    let model = model.unwrap_or_else(|| DETECTION_MODELS[0].model_name.to_string());

    println!("Sending '{}' to the detection service (model: {})...", video, model);
    let request = DetectionRequest {
        video_uri: video,
        model,
        confidence_threshold: None,
    };

    match detector.run_detection(request).await {
        Ok(response) => {
            println!("Detection complete. Report id: {}", response.report_id);
            if response.detections.is_empty() {
                println!("No food items detected in this video; nothing to record.");
                return Ok(());
            }

            println!("\nDetected items:");
            for row in &response.detections {
                println!("  {} x{}", row.label, row.count);
            }

            let records: Vec<DetectionRecord> = response
                .detections
                .iter()
                .map(|row| DetectionRecord {
                    label: row.label.clone(),
                    count: row.count as f64,
                })
                .collect();

            let file_name =
                record_store::record_file_name(Local::now().date_naive(), &response.report_id);
            let path = records_dir.join(file_name);
            record_store::write_detection_table(&path, &records)
                .with_context(|| format!("Failed to persist daily detection record to {:?}", path))?;
            println!("\nSaved daily detection record to {:?}", path);
            Ok(())
        }
        Err(e) => {
            eprintln!("\nError during detection: {}", e);
            Err(anyhow::anyhow!("Detection failed: {}", e))
        }
    }
}

async fn run_report(
    year: Option<i32>,
    month: Option<u32>,
    records_dir: PathBuf,
    output: Option<PathBuf>,
    export_dir: Option<PathBuf>,
    recipes_path: Option<PathBuf>,
) -> Result<()> {
    let recipes = match &recipes_path {
        Some(path) => load_recipe_table(path)
            .with_context(|| format!("Failed to load recipe table from {:?}", path))?,
        None => RecipeTable::builtin(),
    };
    println!("Recipe table loaded: {} food items.", recipes.len());

    let today = Local::now().date_naive();
    let year = year.unwrap_or_else(|| today.year());
    let month = month.unwrap_or_else(|| today.month());

    println!("Reading accumulated detection records from {:?}...", records_dir);
    let (tables, statuses) = record_store::load_all_records(&records_dir)
        .with_context(|| format!("Failed to read records directory {:?}", records_dir))?;
    for status in &statuses {
        println!("{}", format_load_status(status));
    }

    match generate_report(&recipes, &tables, year, month) {
        Ok(report) => {
            let document = render_markdown(&report);
            match &output {
                Some(path) => {
                    tokio::fs::write(path, &document)
                        .await
                        .with_context(|| format!("Failed to write report to {:?}", path))?;
                    println!("\nReport written to {:?}", path);
                }
                None => println!("\n{}", document),
            }

            if let Some(dir) = &export_dir {
                let written = export_report_tables(&report, dir)
                    .with_context(|| format!("Failed to export report tables to {:?}", dir))?;
                for path in &written {
                    println!("Exported: {:?}", path);
                }
            }

            println!("\nQuick summary:");
            println!(
                "  Total items/day: {}",
                format_count(report.summary.total_daily_count)
            );
            println!("  Unique food types: {}", report.summary.distinct_items);
            println!(
                "  Projected monthly total: {}",
                format_count(report.summary.projected_monthly_total)
            );

            if !report.unrecognized.is_empty() {
                println!(
                    "\nNote: no recipe entry for: {}. These items are excluded from raw material totals.",
                    report.unrecognized.join(", ")
                );
            }
            Ok(())
        }
        Err(PipelineError::NoDetectionData) => {
            println!("\nNo detection data found yet in {:?}.", records_dir);
            println!("\nHow to generate procurement data:");
            println!("  1. Run `procure_track detect --video <uri>` on a kitchen video");
            println!("  2. Repeat for each day you want included");
            println!("  3. Run `procure_track report` to see the accumulated requirements");
            Ok(())
        }
        Err(e) => Err(anyhow::anyhow!("Report generation failed: {}", e)),
    }
}

fn run_status(records_dir: PathBuf) -> Result<()> {
    let (tables, statuses) = record_store::load_all_records(&records_dir)
        .with_context(|| format!("Failed to read records directory {:?}", records_dir))?;

    if statuses.is_empty() {
        println!("No detection files found yet in {:?}.", records_dir);
        return Ok(());
    }

    println!("Available detection files: {}", statuses.len());
    for status in &statuses {
        println!("{}", format_load_status(status));
    }
    let total_rows: usize = tables.iter().map(|t| t.records.len()).sum();
    println!(
        "{} file(s) with detection data, {} count row(s) in total.",
        tables.len(),
        total_rows
    );
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok(); // Load .env for detector configuration

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("procure_track=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let cli_args = parse_args();
    match cli_args.command {
        Command::Detect {
            video,
            model,
            records_dir,
        } => run_detect(video, model, records_dir).await,
        Command::Report {
            year,
            month,
            records_dir,
            output,
            export_dir,
            recipes,
        } => run_report(year, month, records_dir, output, export_dir, recipes).await,
        Command::Status { records_dir } => run_status(records_dir),
    }
}
