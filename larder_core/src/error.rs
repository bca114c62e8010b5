//! Error types for the larder_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// A unit conversion that could not be performed.
///
/// These are expected, modeled outcomes: the costing layer turns them
/// into non-calculable line items instead of aborting a whole recipe.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConversionError {
    /// A unit or unit family referenced by the conversion is unknown
    #[error("unit not found: {0}")]
    NotFound(String),

    /// The units measure different physical phenomena (e.g. mass vs length)
    #[error("cannot convert between different unit types: {from} and {to}")]
    IncompatibleUnitTypes { from: String, to: String },

    /// The units are nominally compatible but no conversion method applies
    #[error("cannot convert from {from} to {to}: no conversion method available")]
    NoConversionPath { from: String, to: String },
}

/// Core error type for larder_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Unit conversion failure
    #[error("conversion error: {0}")]
    Conversion(#[from] ConversionError),

    /// A referenced record does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// Adding the requested sub-recipe edges would create a cycle or
    /// self-reference; rejected before any mutation
    #[error("cannot attach sub-recipes to recipe {recipe_id}: would create a cyclic dependency or self-reference")]
    CycleDetected { recipe_id: uuid::Uuid },

    /// A cycle was found in already-stored data during cost resolution.
    /// Distinct from `CycleDetected`: this indicates corruption that the
    /// write-time check should have prevented.
    #[error("cycle detected in stored recipe graph at recipe {recipe_id}")]
    RuntimeCycle { recipe_id: uuid::Uuid },

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Unit registry validation error
    #[error("Registry validation error: {0}")]
    RegistryValidation(String),

    /// Dataset store error
    #[error("Store error: {0}")]
    Store(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}
