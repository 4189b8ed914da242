use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One row of an external detection table: the class label exactly as the
/// detector produced it, and the count observed in one sampling window.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct DetectionRecord {
    pub label: String,
    pub count: f64,
}

/// One loaded detection table (one stored record file or one detector run).
#[derive(Debug, Clone)]
pub struct DetectionTable {
    /// Where the table came from (file name or detector report id).
    pub source: String,
    pub records: Vec<DetectionRecord>,
}

/// A food item's summed observed count after normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedCount {
    /// Canonical identifier: lowercase, spaces replaced by underscores.
    pub item: String,
    /// First-seen original spelling, kept for report tables.
    pub display_label: String,
    pub observed_count: f64,
}

/// Canonicalize a detector label into the food-item identifier space.
///
/// Two labels that canonicalize to the same id are the same item.
pub fn canonical_item_id(label: &str) -> String {
    label.trim().to_lowercase().replace(' ', "_")
}

/// Merge detection tables into one summed count per canonical food item.
///
/// Counts for the same item across tables are added, never overwritten.
/// Output order is the insertion order of first appearance.
pub fn normalize_records(tables: &[DetectionTable]) -> Vec<NormalizedCount> {
    let mut merged: Vec<NormalizedCount> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for table in tables {
        for record in &table.records {
            let item = canonical_item_id(&record.label);
            if item.is_empty() {
                continue;
            }
            match index.get(&item) {
                Some(&idx) => merged[idx].observed_count += record.count,
                None => {
                    index.insert(item.clone(), merged.len());
                    merged.push(NormalizedCount {
                        item,
                        display_label: record.label.trim().to_string(),
                        observed_count: record.count,
                    });
                }
            }
        }
    }

    merged
}
