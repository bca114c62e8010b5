//! Core domain types for recipe and menu costing.
//!
//! This module defines the fundamental types used throughout the system:
//! - Units, unit families and the unit registry
//! - Items (priced ingredients) and recipes with their edge sets
//! - The in-memory dataset all graph algorithms run against
//! - Derived cost-breakdown records

use crate::physical::PhysicalKind;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

// ============================================================================
// Units and Unit Families
// ============================================================================

/// A unit family: a group of units convertible between each other by
/// fixed ratio against the family's base unit.
///
/// A family may additionally carry a physical kind, which allows
/// bridging to *other* families of the same kind through the physical
/// conversion tables. `base_unit` must then be a name that kind
/// recognizes (enforced by `UnitRegistry::validate`).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UnitType {
    pub id: Uuid,
    pub label: String,
    pub physical_kind: Option<PhysicalKind>,
    /// Name understood by the physical conversion tables, e.g. "gram"
    pub base_unit: String,
    pub name_plural: Option<String>,
    pub name_short: Option<String>,
    pub name_short_plural: Option<String>,
}

/// A measurement unit. Immutable reference data, referenced (never
/// owned) by items and recipe ingredient edges.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Unit {
    pub id: Uuid,
    /// Globally unique name, e.g. "kilogram"
    pub name: String,
    /// Quantity of the family's base unit equal to 1 of this unit
    pub ratio: Decimal,
    pub unit_type_id: Uuid,
}

/// Registry of unit reference data. Pure read access once seeded.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct UnitRegistry {
    pub unit_types: HashMap<Uuid, UnitType>,
    pub units: HashMap<Uuid, Unit>,
}

// ============================================================================
// Items and Recipes
// ============================================================================

/// A purchasable ingredient with a price quoted per ordering unit.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Item {
    pub id: Uuid,
    /// Unique display name
    pub name: String,
    /// Unit the price is quoted in
    pub ordering_unit_id: Option<Uuid>,
    /// Unit the item is counted in for stock purposes
    pub counting_unit_id: Option<Uuid>,
    pub supplier: Option<String>,
    pub brand: Option<String>,
    pub group: Option<String>,
    /// Price per one ordering unit
    pub latest_price: Option<Decimal>,
    pub price_updated_at: Option<DateTime<Utc>>,
}

/// Recipe → Item edge: a quantity of an item, expressed in some unit
/// (which may differ from the item's ordering unit).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IngredientEdge {
    pub item_id: Uuid,
    pub quantity: Decimal,
    pub unit_id: Option<Uuid>,
}

/// Recipe → Recipe edge: the child's total cost is multiplied by
/// `quantity` when rolled into the parent.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SubRecipeEdge {
    pub child_id: Uuid,
    pub quantity: Decimal,
}

/// A recipe: ingredient edges plus sub-recipe edges.
///
/// Invariant: the sub-recipe edge set never contains a path back to the
/// recipe itself. Enforced at write time by the cycle detector.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Recipe {
    pub id: Uuid,
    pub name: String,
    pub instructions: Option<String>,
    pub thumbnail: Option<String>,
    #[serde(default)]
    pub ingredients: Vec<IngredientEdge>,
    #[serde(default)]
    pub sub_recipes: Vec<SubRecipeEdge>,
}

// ============================================================================
// Dataset
// ============================================================================

/// The complete dataset a costing or cycle-check run operates on.
///
/// Batch-loaded up front (see `store`); the cost resolver and cycle
/// detector are pure functions of this snapshot.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Dataset {
    pub registry: UnitRegistry,
    pub items: HashMap<Uuid, Item>,
    pub recipes: HashMap<Uuid, Recipe>,
    #[serde(default)]
    pub menus: HashMap<Uuid, crate::menu::Menu>,
}

// ============================================================================
// Cost Breakdown Results (derived, not persisted)
// ============================================================================

/// Per-ingredient line of a cost breakdown.
///
/// A line that cannot be priced is still emitted, with
/// `can_calculate = false`, an error message, and zero `total_cost`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IngredientCost {
    pub item_id: Uuid,
    pub item_name: String,
    pub quantity: Decimal,
    /// Name of the unit the quantity is expressed in, or "N/A"
    pub unit: String,
    /// The item's latest price per ordering unit (0 when unpriced)
    pub unit_cost: Decimal,
    /// Name of the item's ordering unit, or "N/A"
    pub ordering_unit: String,
    /// Display string, e.g. "$9.50 per kilogram"
    pub cost_per_unit: String,
    pub total_cost: Decimal,
    pub can_calculate: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Per-sub-recipe line of a cost breakdown, carrying the child's own
/// nested breakdown.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SubRecipeCost {
    pub recipe_id: Uuid,
    pub recipe_name: String,
    /// Multiplier applied to the child's total cost
    pub quantity: Decimal,
    /// The child's own total cost
    pub unit_cost: Decimal,
    /// `unit_cost * quantity`
    pub total_cost: Decimal,
    pub breakdown: CostBreakdown,
    pub can_calculate: bool,
}

/// The structured, partially-tolerant result of costing a recipe.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub recipe_id: Uuid,
    pub recipe_name: String,
    /// Rounded to 2 decimal places
    pub total_cost: Decimal,
    pub item_costs: Vec<IngredientCost>,
    pub sub_recipe_costs: Vec<SubRecipeCost>,
    pub errors: Vec<String>,
    /// True iff `errors` is empty
    pub can_calculate_full_cost: bool,
    pub ingredients_count: usize,
    pub sub_recipes_count: usize,
}

/// Result of scaling a recipe's cost by a serving count.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServingCost {
    pub total_cost: Decimal,
    pub servings: Decimal,
    pub cost_per_serving: Decimal,
    pub breakdown: CostBreakdown,
}
