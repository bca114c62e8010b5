//! Demo dataset for `larder seed`.
//!
//! Small enough to read in one sitting, but covers the interesting
//! cases: cross-family conversions, nested sub-recipes, and an unpriced
//! item that degrades a breakdown instead of failing it.

use chrono::Utc;
use larder_core::{
    build_default_units, Dataset, IngredientEdge, Item, Menu, MenuItem, MenuSegment, Recipe,
    SubRecipeEdge,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

pub fn build_demo_dataset() -> Dataset {
    let mut data = Dataset::default();
    data.registry = build_default_units();

    let kilogram = data.registry.unit_by_name("kilogram").unwrap().id;
    let gram = data.registry.unit_by_name("gram").unwrap().id;
    let liter = data.registry.unit_by_name("liter").unwrap().id;
    let milliliter = data.registry.unit_by_name("milliliter").unwrap().id;
    let dozen = data.registry.unit_by_name("dozen").unwrap().id;

    let flour = add_item(&mut data, "flour", kilogram, Some(dec!(1.20)));
    let olive_oil = add_item(&mut data, "olive oil", liter, Some(dec!(8.00)));
    let _eggs = add_item(&mut data, "eggs", dozen, Some(dec!(4.50)));
    let mozzarella = add_item(&mut data, "mozzarella", kilogram, Some(dec!(9.80)));
    let tomato = add_item(&mut data, "tomato", kilogram, Some(dec!(3.40)));
    let truffle_oil = add_item(&mut data, "truffle oil", milliliter, None);

    let dough = add_recipe(
        &mut data,
        "pizza dough",
        vec![
            ingredient(flour, dec!(500), gram),
            ingredient(olive_oil, dec!(30), milliliter),
        ],
        vec![],
    );
    let sauce = add_recipe(
        &mut data,
        "tomato sauce",
        vec![
            ingredient(tomato, dec!(300), gram),
            ingredient(olive_oil, dec!(15), milliliter),
        ],
        vec![],
    );
    let pizza = add_recipe(
        &mut data,
        "margherita pizza",
        vec![ingredient(mozzarella, dec!(200), gram)],
        vec![
            SubRecipeEdge {
                child_id: dough,
                quantity: dec!(1),
            },
            SubRecipeEdge {
                child_id: sauce,
                quantity: dec!(1),
            },
        ],
    );
    // truffle oil has no price on file, so this one never fully prices
    add_recipe(
        &mut data,
        "tasting garnish",
        vec![ingredient(truffle_oil, dec!(5), milliliter)],
        vec![],
    );

    let menu_id = Uuid::new_v4();
    data.menus.insert(
        menu_id,
        Menu {
            id: menu_id,
            name: "Trattoria Dinner".into(),
            description: Some("Set dinner for private events".into()),
            target_head_count: 40,
            markup_percentage: dec!(30),
            segments: vec![MenuSegment {
                name: "Mains".into(),
                items: vec![MenuItem {
                    recipe_id: pizza,
                    quantity: dec!(1),
                    notes: None,
                }],
            }],
        },
    );

    data
}

fn add_item(data: &mut Dataset, name: &str, ordering_unit_id: Uuid, price: Option<Decimal>) -> Uuid {
    let id = Uuid::new_v4();
    data.upsert_item(Item {
        id,
        name: name.into(),
        ordering_unit_id: Some(ordering_unit_id),
        counting_unit_id: None,
        supplier: None,
        brand: None,
        group: None,
        latest_price: price,
        price_updated_at: price.map(|_| Utc::now()),
    });
    id
}

fn ingredient(item_id: Uuid, quantity: Decimal, unit_id: Uuid) -> IngredientEdge {
    IngredientEdge {
        item_id,
        quantity,
        unit_id: Some(unit_id),
    }
}

fn add_recipe(
    data: &mut Dataset,
    name: &str,
    ingredients: Vec<IngredientEdge>,
    sub_recipes: Vec<SubRecipeEdge>,
) -> Uuid {
    let id = Uuid::new_v4();
    data.create_recipe(Recipe {
        id,
        name: name.into(),
        instructions: None,
        thumbnail: None,
        ingredients,
        sub_recipes,
    })
    .expect("demo recipe graph is acyclic");
    id
}
