//! Recursive recipe cost resolution.
//!
//! Walks a recipe's ingredient and sub-recipe edges bottom-up,
//! aggregating a total cost and a structured breakdown with per-line
//! success/failure detail. Line-level problems (missing price, failed
//! conversion) degrade the aggregate without aborting it; only corrupt
//! stored data (a cycle the write-time check should have prevented)
//! fails a branch, and even that is caught at the recursion boundary
//! and recorded as an error on the parent.

use crate::{cost, CostBreakdown, Dataset, Error, Recipe, Result, ServingCost, SubRecipeCost};
use rust_decimal::Decimal;
use std::collections::HashSet;
use uuid::Uuid;

/// Calculate the total cost of a recipe with a full breakdown.
pub fn calculate_recipe_cost(data: &Dataset, recipe_id: Uuid) -> Result<CostBreakdown> {
    let recipe = data
        .recipes
        .get(&recipe_id)
        .ok_or_else(|| Error::NotFound(format!("recipe {}", recipe_id)))?;

    let mut path = HashSet::new();
    resolve(data, recipe, &mut path)
}

/// Calculate cost scaled to a serving count.
///
/// The breakdown is for one serving; `total_cost` is the scaled total.
pub fn calculate_cost_per_serving(
    data: &Dataset,
    recipe_id: Uuid,
    servings: Decimal,
) -> Result<ServingCost> {
    let breakdown = calculate_recipe_cost(data, recipe_id)?;
    let base_cost = breakdown.total_cost;

    Ok(ServingCost {
        total_cost: (base_cost * servings).round_dp(2),
        servings,
        cost_per_serving: base_cost.round_dp(2),
        breakdown,
    })
}

/// Cost several recipes in one call.
///
/// Ids that don't resolve are skipped with a warning rather than
/// failing the batch.
pub fn calculate_multiple_recipes_cost(data: &Dataset, recipe_ids: &[Uuid]) -> Vec<CostBreakdown> {
    let mut results = Vec::with_capacity(recipe_ids.len());
    for &id in recipe_ids {
        match calculate_recipe_cost(data, id) {
            Ok(breakdown) => results.push(breakdown),
            Err(Error::NotFound(what)) => {
                tracing::warn!("Skipping unknown recipe in batch costing: {}", what);
            }
            Err(e) => {
                tracing::error!("Batch costing failed for recipe {}: {}", id, e);
            }
        }
    }
    results
}

fn resolve(data: &Dataset, recipe: &Recipe, path: &mut HashSet<Uuid>) -> Result<CostBreakdown> {
    // Recursion depth is normally bounded by the write-time acyclic
    // invariant; a repeat on the path means the stored graph is corrupt.
    if !path.insert(recipe.id) {
        return Err(Error::RuntimeCycle {
            recipe_id: recipe.id,
        });
    }

    let mut total_cost = Decimal::ZERO;
    let mut item_costs = Vec::new();
    let mut sub_recipe_costs = Vec::new();
    let mut errors = Vec::new();

    for edge in &recipe.ingredients {
        match data.items.get(&edge.item_id) {
            Some(item) => {
                let line =
                    cost::ingredient_cost(item, edge.quantity, edge.unit_id, &data.registry);
                total_cost += line.total_cost;
                if let Some(err) = &line.error {
                    errors.push(err.clone());
                }
                item_costs.push(line);
            }
            None => {
                errors.push(format!(
                    "Unknown item {} in recipe {}",
                    edge.item_id, recipe.name
                ));
            }
        }
    }

    for edge in &recipe.sub_recipes {
        let child = match data.recipes.get(&edge.child_id) {
            Some(r) => r,
            None => {
                errors.push(format!(
                    "Unknown sub-recipe {} in recipe {}",
                    edge.child_id, recipe.name
                ));
                continue;
            }
        };

        match resolve(data, child, path) {
            Ok(breakdown) => {
                let sub_total = breakdown.total_cost * edge.quantity;
                total_cost += sub_total;

                sub_recipe_costs.push(SubRecipeCost {
                    recipe_id: child.id,
                    recipe_name: child.name.clone(),
                    quantity: edge.quantity,
                    unit_cost: breakdown.total_cost,
                    total_cost: sub_total,
                    can_calculate: breakdown.errors.is_empty(),
                    breakdown,
                });
            }
            Err(e) => {
                // A failed branch contributes nothing; the parent's
                // costing continues.
                tracing::error!(
                    "Sub-recipe cost calculation error: recipe {} sub-recipe {}: {}",
                    recipe.id,
                    child.id,
                    e
                );
                errors.push(format!(
                    "Error calculating cost for sub-recipe {}: {}",
                    child.name, e
                ));
            }
        }
    }

    path.remove(&recipe.id);

    let can_calculate_full_cost = errors.is_empty();
    Ok(CostBreakdown {
        recipe_id: recipe.id,
        recipe_name: recipe.name.clone(),
        total_cost: total_cost.round_dp(2),
        ingredients_count: item_costs.len(),
        sub_recipes_count: sub_recipe_costs.len(),
        item_costs,
        sub_recipe_costs,
        errors,
        can_calculate_full_cost,
    })
}
