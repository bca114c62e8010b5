//! Menus: ordered segments of recipes priced with head count and markup.
//!
//! The menu layer owns the markup arithmetic; it consumes recipe cost
//! breakdowns from the resolver and never reaches into conversion or
//! ingredient pricing itself.

use crate::{resolver, Dataset, Error, Result};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A costed menu: segments of recipe references, a target head count,
/// and a markup percentage applied on top of raw cost.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Menu {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub target_head_count: u32,
    /// Percentage, e.g. 30 means cost + 30%
    pub markup_percentage: Decimal,
    #[serde(default)]
    pub segments: Vec<MenuSegment>,
}

/// A named, ordered section of a menu (e.g. "Appetizers")
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MenuSegment {
    pub name: String,
    #[serde(default)]
    pub items: Vec<MenuItem>,
}

/// One recipe on a menu, with a per-person quantity
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MenuItem {
    pub recipe_id: Uuid,
    pub quantity: Decimal,
    pub notes: Option<String>,
}

/// Priced line for one menu item
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MenuItemPricing {
    pub recipe_id: Uuid,
    pub recipe_name: String,
    pub quantity: Decimal,
    /// Recipe cost times quantity, before markup
    pub base_cost: Decimal,
    /// Base cost with markup applied
    pub selling_price: Decimal,
    pub can_calculate: bool,
}

/// Priced segment
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SegmentPricing {
    pub name: String,
    pub items: Vec<MenuItemPricing>,
    pub total_cost: Decimal,
}

/// Full pricing summary for a menu
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MenuPricing {
    pub menu_id: Uuid,
    pub menu_name: String,
    pub target_head_count: u32,
    pub markup_percentage: Decimal,
    /// Raw cost per person (sum of all segment costs)
    pub total_cost: Decimal,
    pub markup_amount_per_person: Decimal,
    pub selling_price_per_person: Decimal,
    pub total_selling_price: Decimal,
    pub total_markup_amount: Decimal,
    pub segments: Vec<SegmentPricing>,
    pub errors: Vec<String>,
    pub can_calculate: bool,
}

/// Price a menu against the current dataset.
pub fn price_menu(data: &Dataset, menu: &Menu) -> MenuPricing {
    let markup_multiplier = Decimal::ONE + menu.markup_percentage / dec!(100);

    let mut segments = Vec::with_capacity(menu.segments.len());
    let mut total_cost = Decimal::ZERO;
    let mut errors = Vec::new();

    for segment in &menu.segments {
        let mut items = Vec::with_capacity(segment.items.len());
        let mut segment_cost = Decimal::ZERO;

        for item in &segment.items {
            match resolver::calculate_recipe_cost(data, item.recipe_id) {
                Ok(breakdown) => {
                    let base_cost = (breakdown.total_cost * item.quantity).round_dp(2);
                    segment_cost += base_cost;
                    if !breakdown.can_calculate_full_cost {
                        errors.push(format!(
                            "Incomplete pricing for recipe {} in segment {}",
                            breakdown.recipe_name, segment.name
                        ));
                    }
                    items.push(MenuItemPricing {
                        recipe_id: breakdown.recipe_id,
                        recipe_name: breakdown.recipe_name,
                        quantity: item.quantity,
                        base_cost,
                        selling_price: (base_cost * markup_multiplier).round_dp(2),
                        can_calculate: breakdown.can_calculate_full_cost,
                    });
                }
                Err(e) => {
                    errors.push(format!(
                        "Cannot price recipe {} in segment {}: {}",
                        item.recipe_id, segment.name, e
                    ));
                }
            }
        }

        segments.push(SegmentPricing {
            name: segment.name.clone(),
            total_cost: segment_cost,
            items,
        });
        total_cost += segment_cost;
    }

    let markup_amount_per_person = (total_cost * menu.markup_percentage / dec!(100)).round_dp(2);
    let selling_price_per_person = total_cost + markup_amount_per_person;
    let head_count = Decimal::from(menu.target_head_count);

    let can_calculate = errors.is_empty();
    MenuPricing {
        menu_id: menu.id,
        menu_name: menu.name.clone(),
        target_head_count: menu.target_head_count,
        markup_percentage: menu.markup_percentage,
        total_cost,
        markup_amount_per_person,
        selling_price_per_person,
        total_selling_price: (selling_price_per_person * head_count).round_dp(2),
        total_markup_amount: (markup_amount_per_person * head_count).round_dp(2),
        segments,
        errors,
        can_calculate,
    }
}

/// Price a menu by id.
pub fn price_menu_by_id(data: &Dataset, menu_id: Uuid) -> Result<MenuPricing> {
    let menu = data
        .menus
        .get(&menu_id)
        .ok_or_else(|| Error::NotFound(format!("menu {}", menu_id)))?;
    Ok(price_menu(data, menu))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::build_default_units;
    use crate::{IngredientEdge, Item, Recipe};

    fn priced_recipe(data: &mut Dataset, name: &str, price_per_kg: Decimal, grams: Decimal) -> Uuid {
        let item_id = Uuid::new_v4();
        let kg = data.registry.unit_by_name("kilogram").unwrap().id;
        let gram = data.registry.unit_by_name("gram").unwrap().id;
        data.items.insert(
            item_id,
            Item {
                id: item_id,
                name: format!("{} base", name),
                ordering_unit_id: Some(kg),
                counting_unit_id: None,
                supplier: None,
                brand: None,
                group: None,
                latest_price: Some(price_per_kg),
                price_updated_at: None,
            },
        );
        let recipe_id = Uuid::new_v4();
        data.recipes.insert(
            recipe_id,
            Recipe {
                id: recipe_id,
                name: name.into(),
                instructions: None,
                thumbnail: None,
                ingredients: vec![IngredientEdge {
                    item_id,
                    quantity: grams,
                    unit_id: Some(gram),
                }],
                sub_recipes: vec![],
            },
        );
        recipe_id
    }

    #[test]
    fn test_menu_markup_pricing() {
        let mut data = Dataset::default();
        data.registry = build_default_units();
        // $4.00 per person
        let main = priced_recipe(&mut data, "roast", dec!(8), dec!(500));

        let menu = Menu {
            id: Uuid::new_v4(),
            name: "Sunday Lunch".into(),
            description: None,
            target_head_count: 50,
            markup_percentage: dec!(25),
            segments: vec![MenuSegment {
                name: "Mains".into(),
                items: vec![MenuItem {
                    recipe_id: main,
                    quantity: dec!(1),
                    notes: None,
                }],
            }],
        };

        let pricing = price_menu(&data, &menu);

        assert!(pricing.can_calculate);
        assert_eq!(pricing.total_cost, dec!(4.00));
        assert_eq!(pricing.markup_amount_per_person, dec!(1.00));
        assert_eq!(pricing.selling_price_per_person, dec!(5.00));
        assert_eq!(pricing.total_selling_price, dec!(250.00));
        assert_eq!(pricing.total_markup_amount, dec!(50.00));
        assert_eq!(pricing.segments[0].items[0].selling_price, dec!(5.00));
    }

    #[test]
    fn test_menu_with_unknown_recipe_reports_error() {
        let mut data = Dataset::default();
        data.registry = build_default_units();

        let menu = Menu {
            id: Uuid::new_v4(),
            name: "Ghost Menu".into(),
            description: None,
            target_head_count: 10,
            markup_percentage: dec!(0),
            segments: vec![MenuSegment {
                name: "Starters".into(),
                items: vec![MenuItem {
                    recipe_id: Uuid::new_v4(),
                    quantity: dec!(1),
                    notes: None,
                }],
            }],
        };

        let pricing = price_menu(&data, &menu);
        assert!(!pricing.can_calculate);
        assert_eq!(pricing.total_cost, Decimal::ZERO);
        assert_eq!(pricing.errors.len(), 1);
    }

    #[test]
    fn test_zero_markup_sells_at_cost() {
        let mut data = Dataset::default();
        data.registry = build_default_units();
        let main = priced_recipe(&mut data, "soup", dec!(3), dec!(1000));

        let menu = Menu {
            id: Uuid::new_v4(),
            name: "Plain".into(),
            description: None,
            target_head_count: 2,
            markup_percentage: dec!(0),
            segments: vec![MenuSegment {
                name: "All".into(),
                items: vec![MenuItem {
                    recipe_id: main,
                    quantity: dec!(2),
                    notes: None,
                }],
            }],
        };

        let pricing = price_menu(&data, &menu);
        assert_eq!(pricing.total_cost, dec!(6.00));
        assert_eq!(pricing.selling_price_per_person, dec!(6.00));
        assert_eq!(pricing.total_selling_price, dec!(12.00));
    }
}
