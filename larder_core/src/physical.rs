//! Physical-quantity conversion between unit families.
//!
//! The source of truth here is a closed set of physical kinds, each with
//! its own table of recognized unit names and their factor to a canonical
//! unit (grams, liters, meters, seconds, "each"). Temperature is the one
//! affine case and converts through kelvin.
//!
//! Unit families tag themselves with a `PhysicalKind` and a base-unit
//! name; the conversion engine bridges two families of the same kind by
//! looking both base-unit names up in the kind's table.

use crate::error::ConversionError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Cross-cutting physical category of a unit family.
///
/// Two families with the same kind can bridge through this module even
/// when their ratios are unrelated. Families with different kinds (or no
/// kind at all) never convert to each other.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PhysicalKind {
    Mass,
    Volume,
    Length,
    Temperature,
    Time,
    Count,
}

impl PhysicalKind {
    /// Human-readable label for display
    pub fn label(&self) -> &'static str {
        match self {
            PhysicalKind::Mass => "Weight",
            PhysicalKind::Volume => "Volume",
            PhysicalKind::Length => "Length",
            PhysicalKind::Temperature => "Temperature",
            PhysicalKind::Time => "Time",
            PhysicalKind::Count => "Count",
        }
    }

    /// Factor from one of `name` to the kind's canonical unit.
    ///
    /// Returns `None` for names this kind does not recognize, and always
    /// `None` for Temperature (affine, handled in `convert`).
    fn factor(self, name: &str) -> Option<Decimal> {
        let f = match self {
            PhysicalKind::Mass => match name {
                "gram" | "grams" | "g" => dec!(1),
                "kilogram" | "kilograms" | "kg" => dec!(1000),
                "milligram" | "milligrams" | "mg" => dec!(0.001),
                "ounce" | "ounces" | "oz" => dec!(28.349523125),
                "pound" | "pounds" | "lb" | "lbs" => dec!(453.59237),
                "tonne" | "tonnes" => dec!(1000000),
                _ => return None,
            },
            PhysicalKind::Volume => match name {
                "liter" | "liters" | "litre" | "litres" | "l" => dec!(1),
                "milliliter" | "milliliters" | "millilitre" | "millilitres" | "ml" => dec!(0.001),
                "deciliter" | "deciliters" | "dl" => dec!(0.1),
                "cup" | "cups" => dec!(0.2365882365),
                "teaspoon" | "teaspoons" | "tsp" => dec!(0.00492892159375),
                "tablespoon" | "tablespoons" | "tbsp" => dec!(0.01478676478125),
                "fluid_ounce" | "fluid_ounces" | "floz" => dec!(0.0295735295625),
                "pint" | "pints" => dec!(0.473176473),
                "quart" | "quarts" => dec!(0.946352946),
                "gallon" | "gallons" => dec!(3.785411784),
                _ => return None,
            },
            PhysicalKind::Length => match name {
                "meter" | "meters" | "metre" | "metres" | "m" => dec!(1),
                "centimeter" | "centimeters" | "cm" => dec!(0.01),
                "millimeter" | "millimeters" | "mm" => dec!(0.001),
                "kilometer" | "kilometers" | "km" => dec!(1000),
                "inch" | "inches" | "in" => dec!(0.0254),
                "foot" | "feet" | "ft" => dec!(0.3048),
                "yard" | "yards" | "yd" => dec!(0.9144),
                "mile" | "miles" => dec!(1609.344),
                _ => return None,
            },
            PhysicalKind::Time => match name {
                "second" | "seconds" | "s" => dec!(1),
                "minute" | "minutes" | "min" => dec!(60),
                "hour" | "hours" | "h" => dec!(3600),
                "day" | "days" => dec!(86400),
                _ => return None,
            },
            PhysicalKind::Count => match name {
                "each" | "unit" | "piece" | "pieces" => dec!(1),
                "pair" | "pairs" => dec!(2),
                "dozen" | "dozens" => dec!(12),
                _ => return None,
            },
            PhysicalKind::Temperature => return None,
        };
        Some(f)
    }

    /// Whether this kind recognizes `name` as one of its units.
    ///
    /// Used by registry validation: a family with a physical kind must
    /// use a base-unit name its kind can convert.
    pub fn recognizes(self, name: &str) -> bool {
        match self {
            PhysicalKind::Temperature => matches!(
                name,
                "celsius" | "c" | "fahrenheit" | "f" | "kelvin" | "k"
            ),
            _ => self.factor(name).is_some(),
        }
    }

    /// Convert `value` expressed in `from_name` to `to_name`, both unit
    /// names of this physical kind.
    pub fn convert(
        self,
        value: Decimal,
        from_name: &str,
        to_name: &str,
    ) -> std::result::Result<Decimal, ConversionError> {
        if from_name == to_name {
            return Ok(value);
        }

        if self == PhysicalKind::Temperature {
            return convert_temperature(value, from_name, to_name);
        }

        let no_path = || ConversionError::NoConversionPath {
            from: from_name.to_string(),
            to: to_name.to_string(),
        };
        let from_factor = self.factor(from_name).ok_or_else(no_path)?;
        let to_factor = self.factor(to_name).ok_or_else(no_path)?;

        Ok(value * from_factor / to_factor)
    }
}

/// Temperature is affine, not ratio-based: go through kelvin.
fn convert_temperature(
    value: Decimal,
    from_name: &str,
    to_name: &str,
) -> std::result::Result<Decimal, ConversionError> {
    let no_path = || ConversionError::NoConversionPath {
        from: from_name.to_string(),
        to: to_name.to_string(),
    };

    let kelvin = match from_name {
        "kelvin" | "k" => value,
        "celsius" | "c" => value + dec!(273.15),
        "fahrenheit" | "f" => (value + dec!(459.67)) * dec!(5) / dec!(9),
        _ => return Err(no_path()),
    };

    let out = match to_name {
        "kelvin" | "k" => kelvin,
        "celsius" | "c" => kelvin - dec!(273.15),
        "fahrenheit" | "f" => kelvin * dec!(9) / dec!(5) - dec!(459.67),
        _ => return Err(no_path()),
    };

    Ok(out)
}
