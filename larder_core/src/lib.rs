#![forbid(unsafe_code)]

//! Core domain model and business logic for the Larder costing system.
//!
//! This crate provides:
//! - Unit families, the unit registry and the conversion engine
//! - Ingredient cost calculation and recursive recipe cost resolution
//! - Recipe-graph cycle detection
//! - Dataset persistence, menu pricing and CSV reports

pub mod types;
pub mod error;
pub mod physical;
pub mod registry;
pub mod convert;
pub mod cost;
pub mod cycle;
pub mod resolver;
pub mod store;
pub mod menu;
pub mod csv_report;
pub mod config;
pub mod logging;

// Re-export commonly used types
pub use error::{ConversionError, Error, Result};
pub use types::*;
pub use physical::PhysicalKind;
pub use registry::{build_default_units, default_units};
pub use convert::{can_convert, convert_by_id};
pub use cost::ingredient_cost;
pub use cycle::{validate_sub_recipes, would_create_cycle};
pub use resolver::{
    calculate_cost_per_serving, calculate_multiple_recipes_cost, calculate_recipe_cost,
};
pub use menu::{price_menu, price_menu_by_id, Menu, MenuItem, MenuPricing, MenuSegment};
pub use config::Config;
pub use csv_report::write_breakdown_csv;
