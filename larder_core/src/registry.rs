//! Built-in unit reference data and registry access.
//!
//! The registry is immutable configuration data: costing only ever reads
//! it. Lookups of unknown ids return `Error::NotFound`, never a default.

use crate::physical::PhysicalKind;
use crate::{Error, Result, Unit, UnitRegistry, UnitType};
use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

/// Cached default registry - built once and reused across all operations
static DEFAULT_UNITS: Lazy<UnitRegistry> = Lazy::new(build_default_units_internal);

/// Get a reference to the cached default unit registry
pub fn default_units() -> &'static UnitRegistry {
    &DEFAULT_UNITS
}

/// Builds the default registry of unit families and units
///
/// **Note**: For production use, prefer `default_units()` which returns a
/// cached reference. This function is retained for testing and for
/// seeding fresh datasets (each build gets fresh ids).
pub fn build_default_units() -> UnitRegistry {
    build_default_units_internal()
}

impl UnitRegistry {
    /// Look up a unit by id
    pub fn unit(&self, id: Uuid) -> Result<&Unit> {
        self.units
            .get(&id)
            .ok_or_else(|| Error::NotFound(format!("unit {}", id)))
    }

    /// Look up a unit by its globally unique name
    pub fn unit_by_name(&self, name: &str) -> Result<&Unit> {
        self.units
            .values()
            .find(|u| u.name == name)
            .ok_or_else(|| Error::NotFound(format!("unit '{}'", name)))
    }

    /// Look up a unit family by id
    pub fn unit_type(&self, id: Uuid) -> Result<&UnitType> {
        self.unit_types
            .get(&id)
            .ok_or_else(|| Error::NotFound(format!("unit type {}", id)))
    }

    /// Register a unit family, returning its id
    pub fn add_unit_type(
        &mut self,
        label: &str,
        physical_kind: Option<PhysicalKind>,
        base_unit: &str,
    ) -> Uuid {
        let id = Uuid::new_v4();
        self.unit_types.insert(
            id,
            UnitType {
                id,
                label: label.to_string(),
                physical_kind,
                base_unit: base_unit.to_string(),
                name_plural: None,
                name_short: None,
                name_short_plural: None,
            },
        );
        id
    }

    /// Register a unit in an existing family, returning its id
    pub fn add_unit(&mut self, name: &str, ratio: Decimal, unit_type_id: Uuid) -> Uuid {
        let id = Uuid::new_v4();
        self.units.insert(
            id,
            Unit {
                id,
                name: name.to_string(),
                ratio,
                unit_type_id,
            },
        );
        id
    }

    /// Validate the registry for consistency
    ///
    /// Returns a list of validation errors, or empty Vec if valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        for (id, family) in &self.unit_types {
            if id != &family.id {
                errors.push(format!(
                    "Unit type key '{}' doesn't match unit_type.id '{}'",
                    id, family.id
                ));
            }
            if family.label.is_empty() {
                errors.push(format!("Unit type {} has empty label", id));
            }
            if family.base_unit.is_empty() {
                errors.push(format!("Unit type '{}' has empty base unit", family.label));
            }
            // A family tagged with a physical kind must name a base unit
            // the physical conversion tables can actually resolve.
            if let Some(kind) = family.physical_kind {
                if !kind.recognizes(&family.base_unit) {
                    errors.push(format!(
                        "Unit type '{}': base unit '{}' is not recognized by {:?}",
                        family.label, family.base_unit, kind
                    ));
                }
            }
        }

        let mut seen_names = std::collections::HashSet::new();
        for (id, unit) in &self.units {
            if id != &unit.id {
                errors.push(format!(
                    "Unit key '{}' doesn't match unit.id '{}'",
                    id, unit.id
                ));
            }
            if unit.name.is_empty() {
                errors.push(format!("Unit {} has empty name", id));
            }
            if !seen_names.insert(unit.name.as_str()) {
                errors.push(format!("Duplicate unit name '{}'", unit.name));
            }
            if unit.ratio <= Decimal::ZERO {
                errors.push(format!(
                    "Unit '{}' has non-positive ratio {}",
                    unit.name, unit.ratio
                ));
            }
            if !self.unit_types.contains_key(&unit.unit_type_id) {
                errors.push(format!(
                    "Unit '{}' references non-existent unit type '{}'",
                    unit.name, unit.unit_type_id
                ));
            }
        }

        errors
    }
}

/// Internal function that actually builds the registry.
///
/// Family layout follows the seed data of the costing domain: each
/// quoted unit is its own family (base kilogram, base gram, base liter,
/// ...), so cross-family conversion through the physical tables is
/// exercised by ordinary data, not just edge cases.
fn build_default_units_internal() -> UnitRegistry {
    let mut registry = UnitRegistry::default();

    // ========================================================================
    // Mass families
    // ========================================================================

    let kilogram_family =
        registry.add_unit_type("1 Kilogram", Some(PhysicalKind::Mass), "kilogram");
    registry.add_unit("kilogram", dec!(1), kilogram_family);

    let gram_family = registry.add_unit_type("1 Gram", Some(PhysicalKind::Mass), "gram");
    registry.add_unit("gram", dec!(1), gram_family);
    registry.add_unit("milligram", dec!(0.001), gram_family);

    let pound_family = registry.add_unit_type("1 Pound", Some(PhysicalKind::Mass), "pound");
    registry.add_unit("pound", dec!(1), pound_family);
    // 16 ounces to the pound
    registry.add_unit("ounce", dec!(0.0625), pound_family);

    // ========================================================================
    // Volume families
    // ========================================================================

    let liter_family = registry.add_unit_type("1 Liter", Some(PhysicalKind::Volume), "liter");
    registry.add_unit("liter", dec!(1), liter_family);
    registry.add_unit("cup", dec!(0.2365882365), liter_family);
    registry.add_unit("tablespoon", dec!(0.01478676478125), liter_family);
    registry.add_unit("teaspoon", dec!(0.00492892159375), liter_family);

    let milliliter_family =
        registry.add_unit_type("1 Milliliter", Some(PhysicalKind::Volume), "milliliter");
    registry.add_unit("milliliter", dec!(1), milliliter_family);

    // ========================================================================
    // Count family
    // ========================================================================

    let each_family = registry.add_unit_type("1 Each", Some(PhysicalKind::Count), "each");
    registry.add_unit("each", dec!(1), each_family);
    registry.add_unit("dozen", dec!(12), each_family);

    registry
}
