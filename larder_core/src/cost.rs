//! Ingredient cost calculation.
//!
//! `ingredient_cost` never fails past its own boundary: every call
//! produces a structured `IngredientCost` line, calculable or not, so
//! one bad ingredient cannot abort costing of the rest of a recipe.

use crate::{convert, IngredientCost, Item, Unit, UnitRegistry};
use rust_decimal::Decimal;
use uuid::Uuid;

impl Item {
    /// Cost per one base unit of the ordering unit's family.
    ///
    /// Returns `None` when the item has no usable price or ordering unit.
    pub fn cost_per_base_unit(&self, registry: &UnitRegistry) -> Option<Decimal> {
        let price = self.latest_price.filter(|p| *p > Decimal::ZERO)?;
        let ordering = registry.unit(self.ordering_unit_id?).ok()?;

        let base_quantity = convert::to_base_unit(ordering, Decimal::ONE);
        if base_quantity > Decimal::ZERO {
            Some(price / base_quantity)
        } else {
            None
        }
    }

    /// Display string for the item's price, e.g. "$9.50 per kilogram".
    ///
    /// Returns "N/A" when the item has no usable price or ordering unit.
    pub fn formatted_cost_per_unit(&self, registry: &UnitRegistry) -> String {
        let price = match self.latest_price.filter(|p| *p > Decimal::ZERO) {
            Some(p) => p,
            None => return "N/A".to_string(),
        };
        let unit = match self.ordering_unit_id.and_then(|id| registry.unit(id).ok()) {
            Some(u) => u,
            None => return "N/A".to_string(),
        };
        format!("${:.2} per {}", price, unit.name)
    }
}

/// Compute the monetary cost of `quantity` of `unit_id` of an item.
///
/// Preconditions (unit present, quantity > 0, positive price, configured
/// ordering unit) and conversion failures all degrade to a per-line
/// error with zero cost, never to a hard failure.
pub fn ingredient_cost(
    item: &Item,
    quantity: Decimal,
    unit_id: Option<Uuid>,
    registry: &UnitRegistry,
) -> IngredientCost {
    let unit = unit_id.and_then(|id| registry.unit(id).ok());
    let ordering_unit = item
        .ordering_unit_id
        .and_then(|id| registry.unit(id).ok());

    let mut line = IngredientCost {
        item_id: item.id,
        item_name: item.name.clone(),
        quantity,
        unit: unit.map_or_else(|| "N/A".to_string(), |u| u.name.clone()),
        unit_cost: item.latest_price.unwrap_or(Decimal::ZERO),
        ordering_unit: ordering_unit.map_or_else(|| "N/A".to_string(), |u| u.name.clone()),
        cost_per_unit: item.formatted_cost_per_unit(registry),
        total_cost: Decimal::ZERO,
        can_calculate: false,
        error: None,
    };

    if unit_id.is_none() {
        line.error = Some(format!("Missing unit for ingredient: {}", item.name));
        return line;
    }
    if quantity <= Decimal::ZERO {
        line.error = Some(format!(
            "Missing or invalid quantity for ingredient: {}",
            item.name
        ));
        return line;
    }
    let unit: &Unit = match unit {
        Some(u) => u,
        None => {
            line.error = Some(format!("Unit not found for ingredient: {}", item.name));
            return line;
        }
    };
    let price = match item.latest_price.filter(|p| *p > Decimal::ZERO) {
        Some(p) => p,
        None => {
            line.error = Some(format!("No price available for ingredient: {}", item.name));
            return line;
        }
    };
    let ordering_unit: &Unit = match ordering_unit {
        Some(u) => u,
        None => {
            line.error = Some(format!(
                "No ordering unit configured for ingredient: {}",
                item.name
            ));
            return line;
        }
    };

    // Express the recipe quantity in the unit the price is quoted in
    match convert::convert(quantity, unit, ordering_unit, registry) {
        Ok(converted) => {
            line.total_cost = price * converted;
            line.can_calculate = true;
        }
        Err(e) => {
            tracing::warn!("Unit conversion failed for item {}: {}", item.id, e);
            line.error = Some(format!("Cannot price ingredient {}: {}", item.name, e));
        }
    }

    line
}
