use anyhow::{Context, Result};
use chrono::NaiveDate;
use csv::{ReaderBuilder, WriterBuilder};
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::record_normalizer::{DetectionRecord, DetectionTable};

// Stored daily records are counts_*.csv files with these columns.
pub const RECORD_FILE_PREFIX: &str = "counts_";
const LABEL_COL: &str = "Class";
const COUNT_COL: &str = "Count";

/// Per-file outcome of a records-directory read.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    Loaded { rows: usize },
    SkippedZeroSize,
    SkippedEmpty,
    SkippedUnreadable { reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordLoadStatus {
    pub file: String,
    pub outcome: LoadOutcome,
}

/// Enumerate stored detection record files, sorted by name so repeated
/// reads see the same order. A missing directory is the same as an empty
/// one: no records yet.
pub fn scan_record_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read records directory {:?}", dir))?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .and_then(|name| name.to_str())
                .map(|name| name.starts_with(RECORD_FILE_PREFIX) && name.ends_with(".csv"))
                .unwrap_or(false)
        })
        .collect();
    files.sort();
    Ok(files)
}

/// Load one stored detection record file.
///
/// Rows with a blank label, or a negative or non-numeric count, are
/// rejected here so they never reach the normalizer.
pub fn load_detection_table(path: &Path) -> Result<DetectionTable> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open detection record file at {:?}", path))?;
    let mut rdr = ReaderBuilder::new().has_headers(true).from_reader(file);

    let headers = rdr.headers()?.clone();
    let label_idx = headers
        .iter()
        .position(|h| h == LABEL_COL)
        .ok_or_else(|| anyhow::anyhow!("Column '{}' not found", LABEL_COL))?;
    let count_idx = headers
        .iter()
        .position(|h| h == COUNT_COL)
        .ok_or_else(|| anyhow::anyhow!("Column '{}' not found", COUNT_COL))?;

    let source = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("unknown")
        .to_string();

    let mut records = Vec::new();
    for (row_index, result) in rdr.records().enumerate() {
        let record =
            result.with_context(|| format!("Failed to read record at row index {}", row_index))?;

        let label = record.get(label_idx).unwrap_or("").trim();
        if label.is_empty() {
            continue;
        }

        let raw_count = record.get(count_idx).unwrap_or("").trim();
        let count = match raw_count.parse::<f64>() {
            Ok(value) if value.is_finite() && value >= 0.0 => value,
            _ => {
                warn!(
                    file = %source,
                    row = row_index,
                    count = %raw_count,
                    "rejecting row with negative or non-numeric count"
                );
                continue;
            }
        };

        records.push(DetectionRecord {
            label: label.to_string(),
            count,
        });
    }

    Ok(DetectionTable { source, records })
}

/// Read every stored record in the directory, skipping bad files.
///
/// Zero-size, empty, or unreadable files are recorded in the load log and
/// skipped; aggregation proceeds over whatever valid tables remain.
pub fn load_all_records(dir: &Path) -> Result<(Vec<DetectionTable>, Vec<RecordLoadStatus>)> {
    let mut tables = Vec::new();
    let mut statuses = Vec::new();

    for path in scan_record_files(dir)? {
        let file = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("unknown")
            .to_string();

        let size = std::fs::metadata(&path).map(|m| m.len()).unwrap_or(0);
        if size == 0 {
            warn!(file = %file, "skipping zero-size detection record");
            statuses.push(RecordLoadStatus {
                file,
                outcome: LoadOutcome::SkippedZeroSize,
            });
            continue;
        }

        match load_detection_table(&path) {
            Ok(table) if table.records.is_empty() => {
                warn!(file = %file, "skipping detection record with no valid rows");
                statuses.push(RecordLoadStatus {
                    file,
                    outcome: LoadOutcome::SkippedEmpty,
                });
            }
            Ok(table) => {
                statuses.push(RecordLoadStatus {
                    file,
                    outcome: LoadOutcome::Loaded {
                        rows: table.records.len(),
                    },
                });
                tables.push(table);
            }
            Err(e) => {
                warn!(file = %file, error = %e, "skipping unreadable detection record");
                statuses.push(RecordLoadStatus {
                    file,
                    outcome: LoadOutcome::SkippedUnreadable {
                        reason: e.to_string(),
                    },
                });
            }
        }
    }

    Ok((tables, statuses))
}

/// File name for a newly persisted daily record.
pub fn record_file_name(date: NaiveDate, report_id: &str) -> String {
    format!("{}{}_{}.csv", RECORD_FILE_PREFIX, date.format("%Y-%m-%d"), report_id)
}

/// Persist one day's detection counts as a new record file.
///
/// This is the only write the crate performs against the records store;
/// report generation itself never writes records.
pub fn write_detection_table(path: &Path, records: &[DetectionRecord]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create records directory {:?}", parent))?;
    }

    let mut wtr = WriterBuilder::new()
        .from_path(path)
        .with_context(|| format!("Failed to create detection record file at {:?}", path))?;
    wtr.write_record([LABEL_COL, COUNT_COL])?;
    for record in records {
        wtr.write_record([
            record.label.as_str(),
            crate::report_renderer::format_count(record.count).as_str(),
        ])?;
    }
    wtr.flush()
        .with_context(|| format!("Failed to write detection record file at {:?}", path))?;
    Ok(())
}
