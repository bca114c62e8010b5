//! CSV export of cost breakdowns.
//!
//! Flattens a nested breakdown into rows, one per ingredient or
//! sub-recipe line, with nesting recorded as a depth column.

use crate::{CostBreakdown, Result};
use rust_decimal::Decimal;
use std::fs::OpenOptions;
use std::path::Path;

/// A row in the CSV output
#[derive(Debug, serde::Serialize)]
struct CsvRow {
    recipe: String,
    depth: usize,
    line_type: &'static str,
    name: String,
    quantity: Decimal,
    unit: String,
    unit_cost: Decimal,
    total_cost: Decimal,
    can_calculate: bool,
    error: Option<String>,
}

/// Write a breakdown (nested sub-recipes included) to a fresh CSV file.
///
/// Returns the number of rows written. The file is flushed and synced
/// before returning.
pub fn write_breakdown_csv(breakdown: &CostBreakdown, path: &Path) -> Result<usize> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open(path)?;

    let mut writer = csv::Writer::from_writer(file);

    let mut count = 0;
    write_rows(&mut writer, breakdown, 0, &mut count)?;

    writer.flush()?;
    let file = writer
        .into_inner()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
    file.sync_all()?;

    tracing::info!("Wrote {} breakdown rows to {:?}", count, path);
    Ok(count)
}

fn write_rows<W: std::io::Write>(
    writer: &mut csv::Writer<W>,
    breakdown: &CostBreakdown,
    depth: usize,
    count: &mut usize,
) -> Result<()> {
    for line in &breakdown.item_costs {
        writer.serialize(CsvRow {
            recipe: breakdown.recipe_name.clone(),
            depth,
            line_type: "ingredient",
            name: line.item_name.clone(),
            quantity: line.quantity,
            unit: line.unit.clone(),
            unit_cost: line.unit_cost,
            total_cost: line.total_cost,
            can_calculate: line.can_calculate,
            error: line.error.clone(),
        })?;
        *count += 1;
    }

    for line in &breakdown.sub_recipe_costs {
        writer.serialize(CsvRow {
            recipe: breakdown.recipe_name.clone(),
            depth,
            line_type: "sub_recipe",
            name: line.recipe_name.clone(),
            quantity: line.quantity,
            unit: "recipe".to_string(),
            unit_cost: line.unit_cost,
            total_cost: line.total_cost,
            can_calculate: line.can_calculate,
            error: None,
        })?;
        *count += 1;

        write_rows(writer, &line.breakdown, depth + 1, count)?;
    }

    Ok(())
}
