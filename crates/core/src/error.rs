//! Error types for code generation.
//!
//! Every generation error is hard: the pipeline aborts and no partial output is
//! produced. All public entry points return [`Result<T>`], an alias for
//! `std::result::Result<T, CodegenError>`.

use std::fmt::Display;

use thiserror::Error;

use crate::model::ModelPath;

/// Result type alias for code generation.
pub type Result<T> = std::result::Result<T, CodegenError>;

/// Errors raised while classifying, registering or emitting a model graph.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodegenError {
    /// A type expression does not decompose into a supported shape.
    #[error("unsupported type shape {ty}{}: {reason}", location_suffix(.location))]
    UnsupportedTypeShape {
        /// `Model.field` the type was found on; empty until located
        location: String,
        /// Rendering of the offending type expression
        ty: String,
        /// What made the shape unsupported
        reason: String,
    },

    /// Union variants cannot be told apart by their first field.
    #[error("ambiguous discriminant in union {union}: {reason}")]
    AmbiguousDiscriminant {
        /// Rendering of the union
        union: String,
        /// What went wrong
        reason: String,
    },

    /// Two declarations render to the same TypeScript name.
    #[error("TypeScript name `{name}` is claimed by both {first} and {second}")]
    ModelNameConflict {
        /// Conflicting TypeScript name
        name: String,
        /// First claimant
        first: String,
        /// Second claimant
        second: String,
    },

    /// An enum-tag annotation has an incompatible shape.
    #[error("invalid enum tag `{name}`: {reason}")]
    UnknownEnumTag {
        /// Enum name as written in the annotation
        name: String,
        /// What is wrong with the tag
        reason: String,
    },

    /// A model is referenced but not present in the graph.
    #[error("unknown model `{0}`")]
    UnknownModel(ModelPath),

    /// A model short name cannot be declared in TypeScript.
    #[error("`{name}` is not a valid TypeScript identifier")]
    InvalidIdentifier {
        /// Offending name
        name: String,
    },

    /// Route metadata does not fit its path template or models.
    #[error("invalid route `{route}`: {reason}")]
    InvalidRoute {
        /// Route handler name
        route: String,
        /// What is wrong with the route
        reason: String,
    },

    /// A schema document could not be parsed.
    #[error("invalid schema document: {0}")]
    Schema(String),
}

fn location_suffix(location: &str) -> String {
    if location.is_empty() {
        String::new()
    } else {
        format!(" at {location}")
    }
}

impl CodegenError {
    /// Unlocated `UnsupportedTypeShape`.
    pub fn unsupported(ty: impl Display, reason: impl Into<String>) -> Self {
        CodegenError::UnsupportedTypeShape {
            location: String::new(),
            ty: ty.to_string(),
            reason: reason.into(),
        }
    }

    /// Attach a `Model.field` location to an unlocated `UnsupportedTypeShape`.
    /// Other errors pass through unchanged.
    pub fn located(self, at: impl Into<String>) -> Self {
        match self {
            CodegenError::UnsupportedTypeShape {
                location,
                ty,
                reason,
            } if location.is_empty() => CodegenError::UnsupportedTypeShape {
                location: at.into(),
                ty,
                reason,
            },
            other => other,
        }
    }
}
