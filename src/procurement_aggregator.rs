use std::collections::HashMap;
use tracing::warn;

use crate::monthly_projection::MonthlyProjection;
use crate::recipe_table::RecipeTable;

/// One auditable (food item, raw material) contribution to a total.
#[derive(Debug, Clone, PartialEq)]
pub struct CalculationLine {
    /// Display label of the contributing food item.
    pub item: String,
    pub monthly_count: f64,
    pub material: String,
    pub qty_per_item: f64,
    pub line_total: f64,
}

/// Total monthly requirement for one raw material.
///
/// Invariant: `total_qty` equals the sum of `line_total` over every
/// calculation line whose material matches, so the total is exactly
/// reproducible from the audit trail.
#[derive(Debug, Clone, PartialEq)]
pub struct RawMaterialTotal {
    pub material: String,
    pub total_qty: f64,
}

/// Aggregation output: the full calculation trail, per-material totals,
/// and the food items that had no recipe entry.
#[derive(Debug, Clone, Default)]
pub struct AggregationResult {
    pub lines: Vec<CalculationLine>,
    pub totals: Vec<RawMaterialTotal>,
    /// Display labels of items excluded because the recipe table does not
    /// know them. Excluded from totals, surfaced for visibility.
    pub unrecognized: Vec<String>,
}

/// Join monthly projections against the recipe table.
///
/// Items are visited in projection order and materials in recipe
/// declaration order, so identical inputs always produce the same line
/// sequence. Totals are ordered by first contribution. Materials with a
/// zero per-unit quantity contribute no line.
pub fn aggregate_materials(
    projections: &[MonthlyProjection],
    recipes: &RecipeTable,
) -> AggregationResult {
    let mut result = AggregationResult::default();
    let mut total_index: HashMap<String, usize> = HashMap::new();

    for projection in projections {
        let entry = match recipes.get(&projection.item) {
            Some(entry) => entry,
            None => {
                warn!(item = %projection.item, "no recipe entry for detected item, excluded from totals");
                result.unrecognized.push(projection.display_label.clone());
                continue;
            }
        };

        for material_qty in &entry.materials {
            if material_qty.qty_per_item == 0.0 {
                continue;
            }
            let line_total = material_qty.qty_per_item * projection.monthly_count;
            result.lines.push(CalculationLine {
                item: projection.display_label.clone(),
                monthly_count: projection.monthly_count,
                material: material_qty.material.clone(),
                qty_per_item: material_qty.qty_per_item,
                line_total,
            });

            match total_index.get(&material_qty.material) {
                Some(&idx) => result.totals[idx].total_qty += line_total,
                None => {
                    total_index.insert(material_qty.material.clone(), result.totals.len());
                    result.totals.push(RawMaterialTotal {
                        material: material_qty.material.clone(),
                        total_qty: line_total,
                    });
                }
            }
        }
    }

    result
}
