//! Error types for capability composition and catalog registration.

use thiserror::Error;

use crate::capability::CapabilityKind;

/// Result type alias using [`CoreError`].
pub type Result<T> = std::result::Result<T, CoreError>;

/// Top-level error type for all registration and composition errors.
///
/// Every variant is a local, synchronous failure reported to the immediate
/// caller. Nothing here is retried; a loader may skip the failed entry and
/// keep going.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// An init step names a capability the entity type never required.
    #[error("Entity type '{entity_type}' initializes undeclared capability {missing}")]
    Dependency {
        /// Entity type whose registration was rejected.
        entity_type: String,
        /// The capability referenced by an init step but not required.
        missing: CapabilityKind,
    },

    /// A capability instance was absent when its init step ran.
    #[error("Entity type '{entity_type}' has no {kind} instance at construction")]
    MissingCapability {
        /// Entity type being constructed.
        entity_type: String,
        /// The capability that had no instance.
        kind: CapabilityKind,
    },

    /// A capability accessor was called for a kind the entity never required.
    #[error("Entity type '{entity_type}' does not carry capability {kind}")]
    NotPresent {
        /// Entity type of the handle.
        entity_type: String,
        /// The capability that was asked for.
        kind: CapabilityKind,
    },

    /// A registered recipe was edited.
    #[error("Recipe '{recipe}' is registered and can no longer be modified")]
    FrozenRecipe {
        /// Name of the frozen recipe.
        recipe: String,
    },

    /// A recipe failed validation while being built or edited.
    #[error("Invalid recipe '{recipe}': {reason}")]
    InvalidRecipe {
        /// Name of the recipe.
        recipe: String,
        /// What was wrong with it.
        reason: String,
    },

    /// An init step's parameter tuple does not fit the capability.
    #[error("Invalid init arguments for {kind}: {reason}")]
    InvalidInitArgs {
        /// Capability whose init entry point rejected the arguments.
        kind: CapabilityKind,
        /// What was wrong with them.
        reason: String,
    },

    /// Instantiation was requested for an entity type never registered.
    #[error("Unknown entity type: {0}")]
    UnknownEntityType(String),

    /// Data file parsing or conversion error.
    #[error("Failed to parse data '{path}': {message}")]
    DataParse {
        /// Path (or label) of the data that failed to parse.
        path: String,
        /// Error message.
        message: String,
    },
}
