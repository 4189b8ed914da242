use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::warn;

use crate::record_normalizer::canonical_item_id;

/// One raw material consumed per produced unit of a food item.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct MaterialQty {
    pub material: String,
    /// Per-unit quantity, conventionally kg (or count for discrete
    /// materials such as buns) per one produced item.
    pub qty_per_item: f64,
}

/// Per-unit ingredient composition for one food item.
///
/// Material order is declaration order and drives the order of
/// calculation lines, so it must be preserved by every constructor.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct RecipeEntry {
    pub item: String,
    pub materials: Vec<MaterialQty>,
}

/// Immutable lookup table from canonical food-item id to its recipe entry.
///
/// Constructed once at startup and injected by reference into each report
/// generation.
#[derive(Debug, Clone)]
pub struct RecipeTable {
    entries: Vec<RecipeEntry>,
    index: HashMap<String, usize>,
}

// Default per-item raw material usage. Quantities are kg per produced
// item unless the material is inherently discrete (e.g. one bun).
const DEFAULT_RECIPES: &[(&str, &[(&str, f64)])] = &[
    (
        "biryani",
        &[
            ("rice", 0.15),
            ("meat", 0.1),
            ("onions", 0.05),
            ("spices", 0.02),
            ("oil", 0.02),
        ],
    ),
    ("chapathi", &[("flour", 0.05), ("oil", 0.005), ("salt", 0.001)]),
    (
        "chole_bature",
        &[
            ("chickpeas", 0.1),
            ("flour", 0.08),
            ("oil", 0.03),
            ("spices", 0.01),
        ],
    ),
    (
        "dahl",
        &[
            ("lentils", 0.08),
            ("onions", 0.02),
            ("spices", 0.01),
            ("oil", 0.01),
        ],
    ),
    ("dosa", &[("rice", 0.06), ("lentils", 0.02), ("oil", 0.01)]),
    (
        "gulab_jamun",
        &[
            ("milk_powder", 0.05),
            ("flour", 0.02),
            ("sugar", 0.03),
            ("oil", 0.02),
        ],
    ),
    ("idly", &[("rice", 0.04), ("lentils", 0.01), ("salt", 0.001)]),
    (
        "jalebi",
        &[
            ("flour", 0.03),
            ("sugar", 0.04),
            ("oil", 0.02),
            ("saffron", 0.0001),
        ],
    ),
    (
        "kadai_paneer",
        &[
            ("paneer", 0.1),
            ("onions", 0.03),
            ("tomatoes", 0.03),
            ("spices", 0.01),
            ("oil", 0.02),
        ],
    ),
    (
        "naan",
        &[
            ("flour", 0.06),
            ("yogurt", 0.02),
            ("oil", 0.01),
            ("salt", 0.001),
        ],
    ),
    (
        "pakoda",
        &[
            ("flour", 0.04),
            ("vegetables", 0.03),
            ("oil", 0.05),
            ("spices", 0.005),
        ],
    ),
    (
        "pancakes",
        &[
            ("flour", 0.05),
            ("milk", 0.06),
            ("eggs", 0.02),
            ("sugar", 0.01),
            ("butter", 0.01),
        ],
    ),
    (
        "pani_puri",
        &[
            ("flour", 0.02),
            ("potato", 0.03),
            ("tamarind", 0.01),
            ("spices", 0.005),
        ],
    ),
    (
        "pav_bhaji",
        &[
            ("vegetables", 0.1),
            ("bread", 0.05),
            ("butter", 0.02),
            ("spices", 0.01),
        ],
    ),
    (
        "rolls",
        &[
            ("flour", 0.04),
            ("vegetables", 0.05),
            ("oil", 0.01),
            ("spices", 0.005),
        ],
    ),
    (
        "samosa",
        &[
            ("flour", 0.03),
            ("potato", 0.04),
            ("peas", 0.01),
            ("oil", 0.03),
            ("spices", 0.005),
        ],
    ),
    (
        "vada_pav",
        &[
            ("potato", 0.08),
            ("flour", 0.03),
            ("bread", 0.05),
            ("oil", 0.04),
            ("spices", 0.01),
        ],
    ),
    (
        "hamburger",
        &[
            ("bun", 1.0),
            ("patty", 0.15),
            ("lettuce", 0.02),
            ("cheese", 0.02),
            ("tomato", 0.03),
        ],
    ),
    ("ice_cream", &[("milk", 0.1), ("sugar", 0.02), ("cream", 0.05)]),
    (
        "pizza",
        &[
            ("flour", 0.15),
            ("cheese", 0.08),
            ("tomato_sauce", 0.04),
            ("toppings", 0.08),
        ],
    ),
    (
        "badammilk",
        &[
            ("milk", 0.2),
            ("almonds", 0.03),
            ("sugar", 0.02),
            ("cardamom", 0.001),
        ],
    ),
    (
        "cholekulcha",
        &[
            ("chickpeas", 0.1),
            ("flour", 0.08),
            ("spices", 0.01),
            ("oil", 0.02),
        ],
    ),
    (
        "coldcoffee",
        &[
            ("milk", 0.2),
            ("coffee", 0.01),
            ("sugar", 0.02),
            ("ice", 0.05),
        ],
    ),
    (
        "lassi",
        &[("yogurt", 0.25), ("sugar", 0.02), ("cardamom", 0.001)],
    ),
    (
        "makhnakheer",
        &[
            ("milk", 0.25),
            ("makhana", 0.05),
            ("sugar", 0.03),
            ("cardamom", 0.001),
            ("nuts", 0.01),
        ],
    ),
    (
        "matarkachori",
        &[
            ("flour", 0.05),
            ("peas", 0.04),
            ("spices", 0.01),
            ("oil", 0.03),
        ],
    ),
    (
        "momos",
        &[
            ("flour", 0.06),
            ("vegetables", 0.05),
            ("oil", 0.01),
            ("spices", 0.005),
        ],
    ),
    (
        "pasta",
        &[
            ("pasta", 0.12),
            ("sauce", 0.05),
            ("vegetables", 0.04),
            ("cheese", 0.02),
        ],
    ),
    (
        "poha",
        &[
            ("poha", 0.08),
            ("onions", 0.02),
            ("potato", 0.03),
            ("spices", 0.005),
            ("oil", 0.01),
        ],
    ),
    (
        "sandwich",
        &[
            ("bread", 0.06),
            ("vegetables", 0.04),
            ("butter", 0.01),
            ("cheese", 0.02),
        ],
    ),
    (
        "sattu",
        &[
            ("sattu_flour", 0.1),
            ("onions", 0.02),
            ("spices", 0.01),
            ("water", 0.05),
        ],
    ),
    (
        "vada",
        &[
            ("lentils", 0.06),
            ("spices", 0.01),
            ("oil", 0.03),
            ("onions", 0.01),
        ],
    ),
    (
        "littichoka",
        &[
            ("sattu_flour", 0.1),
            ("spices", 0.02),
            ("potato", 0.05),
            ("tomatoes", 0.03),
            ("oil", 0.02),
        ],
    ),
];

impl RecipeTable {
    /// Build the table shipped with the binary.
    pub fn builtin() -> Self {
        let entries = DEFAULT_RECIPES
            .iter()
            .map(|(item, materials)| RecipeEntry {
                item: (*item).to_string(),
                materials: materials
                    .iter()
                    .map(|(material, qty)| MaterialQty {
                        material: (*material).to_string(),
                        qty_per_item: *qty,
                    })
                    .collect(),
            })
            .collect();
        Self::from_entries(entries)
    }

    /// Build a table from explicit entries, canonicalizing item ids.
    ///
    /// The first declaration of an item wins; later duplicates are
    /// dropped with a warning so the table keeps at most one per-unit
    /// quantity per (item, material) pair.
    pub fn from_entries(entries: Vec<RecipeEntry>) -> Self {
        let mut kept: Vec<RecipeEntry> = Vec::with_capacity(entries.len());
        let mut index: HashMap<String, usize> = HashMap::with_capacity(entries.len());
        for mut entry in entries {
            let id = canonical_item_id(&entry.item);
            if id.is_empty() {
                warn!("skipping recipe entry with empty item name");
                continue;
            }
            if index.contains_key(&id) {
                warn!(item = %id, "duplicate recipe entry ignored");
                continue;
            }
            entry.item = id.clone();
            index.insert(id, kept.len());
            kept.push(entry);
        }
        Self {
            entries: kept,
            index,
        }
    }

    pub fn get(&self, canonical_item: &str) -> Option<&RecipeEntry> {
        self.index
            .get(canonical_item)
            .map(|&idx| &self.entries[idx])
    }

    pub fn iter(&self) -> impl Iterator<Item = &RecipeEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Load a recipe table from a JSON file holding an array of entries.
///
/// The array shape (rather than a JSON object) keeps declaration order
/// for both items and their materials.
pub fn load_recipe_table(path: &Path) -> Result<RecipeTable> {
    if !path.exists() {
        return Err(anyhow::anyhow!("Recipe table file not found at: {:?}", path));
    }

    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read recipe table file at {:?}", path))?;
    let entries: Vec<RecipeEntry> = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse recipe table JSON at {:?}", path))?;

    if entries.is_empty() {
        return Err(anyhow::anyhow!("No recipe entries found in {:?}", path));
    }

    Ok(RecipeTable::from_entries(entries))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_builtin_table_contents() {
        let table = RecipeTable::builtin();
        assert_eq!(table.len(), 34);

        let samosa = table.get("samosa").unwrap();
        assert_eq!(samosa.materials.len(), 5);
        assert_eq!(samosa.materials[0].material, "flour");
        assert_eq!(samosa.materials[0].qty_per_item, 0.03);
        assert_eq!(samosa.materials[1].material, "potato");
        assert_eq!(samosa.materials[1].qty_per_item, 0.04);

        assert!(table.get("unknown_dish").is_none());
    }

    #[test]
    fn test_entries_canonicalized_on_construction() {
        let table = RecipeTable::from_entries(vec![RecipeEntry {
            item: "Chole Bature".to_string(),
            materials: vec![MaterialQty {
                material: "chickpeas".to_string(),
                qty_per_item: 0.1,
            }],
        }]);
        assert!(table.get("chole_bature").is_some());
    }

    #[test]
    fn test_duplicate_entries_keep_first_declaration() {
        let entry = |item: &str, material: &str, qty: f64| RecipeEntry {
            item: item.to_string(),
            materials: vec![MaterialQty {
                material: material.to_string(),
                qty_per_item: qty,
            }],
        };
        let table = RecipeTable::from_entries(vec![
            entry("dosa", "rice", 0.06),
            entry("Dosa", "rice", 0.5),
        ]);
        assert_eq!(table.len(), 1);
        assert_eq!(table.get("dosa").unwrap().materials[0].qty_per_item, 0.06);
    }

    #[test]
    fn test_load_recipe_table_from_json() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        writeln!(
            file,
            r#"[
                {{"item": "Test Dish", "materials": [
                    {{"material": "flour", "qty_per_item": 0.05}},
                    {{"material": "oil", "qty_per_item": 0.01}}
                ]}}
            ]"#
        )?;
        file.flush()?;

        let table = load_recipe_table(file.path())?;
        assert_eq!(table.len(), 1);
        let entry = table.get("test_dish").unwrap();
        assert_eq!(entry.materials[0].material, "flour");
        assert_eq!(entry.materials[1].material, "oil");
        Ok(())
    }

    #[test]
    fn test_load_recipe_table_empty_array() -> Result<()> {
        let mut file = NamedTempFile::new()?;
        writeln!(file, "[]")?;
        file.flush()?;

        let result = load_recipe_table(file.path());
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("No recipe entries"));
        Ok(())
    }

    #[test]
    fn test_load_recipe_table_file_not_found() {
        let result = load_recipe_table(Path::new("this_file_does_not_exist.json"));
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Recipe table file not found"));
    }
}
