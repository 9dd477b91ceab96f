//! Error types for camrig

use crate::scene::{NodeId, PivotRole};
use thiserror::Error;

/// Errors raised while validating or loading a [`RigConfig`](crate::RigConfig)
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A numeric setting was NaN or infinite
    #[error("Setting `{field}` must be a finite number")]
    NonFinite { field: &'static str },

    /// JSON (de)serialization failed
    #[error("Config JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised while attaching the rig to its pivots
#[derive(Error, Debug)]
pub enum RigError {
    /// A pivot handle is absent from the scene graph
    #[error("The {role} pivot is not provided or not valid")]
    MissingPivot { role: PivotRole },

    /// Two pivot roles were given the same scene node
    #[error("The {first} and {second} pivots must be different nodes (both are {node:?})")]
    DuplicatePivot {
        first: PivotRole,
        second: PivotRole,
        node: NodeId,
    },

    /// The scene graph refused to parent one pivot to another
    #[error("Cannot attach the {child} pivot to the {parent} pivot")]
    Attach { child: PivotRole, parent: PivotRole },

    /// An operation needs attached pivots
    #[error("The rig is not attached to its pivots")]
    NotAttached,

    /// Invalid configuration
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Result type for camrig operations
pub type Result<T> = std::result::Result<T, RigError>;
