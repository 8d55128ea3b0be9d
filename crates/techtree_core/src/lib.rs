//! # TechTree Core
//!
//! Registration core for data-driven mod content.
//!
//! This crate contains **only** registration logic:
//! - No rendering
//! - No IO
//! - No gameplay simulation
//! - No floating-point tuning values (uses fixed-point)
//!
//! Three registries are built once while mods load and then served
//! read-only:
//! - the component registry composes entity types from capabilities and
//!   checks init-step dependencies eagerly,
//! - the recipe catalog files validated recipes under crafting stations,
//! - the stack-restriction registry derives per-entity-type stack caps from
//!   item tags.
//!
//! ## Crate Structure
//!
//! - [`capability`] - Capability kinds, init arguments and the capability trait
//! - [`capabilities`] - Concrete capability types
//! - [`entity`] - Entity-type descriptors, handles and the component registry
//! - [`recipe`] - Recipe drafts, build hooks and the recipe catalog
//! - [`stack_limits`] - Tag-driven stack restriction tables
//! - [`lifecycle`] - Build phase, serve phase and late registration
//! - [`data`] - RON data structures for mod files
//! - [`content`] - Built-in content
//! - [`math`] - Fixed-point math utilities

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod capabilities;
pub mod capability;
pub mod content;
pub mod data;
pub mod entity;
pub mod error;
pub mod ids;
pub mod items;
pub mod lifecycle;
pub mod math;
pub mod recipe;
pub mod stack_limits;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::capabilities::{
        AirPollution, CustomText, FuelConsumption, FuelSupply, Minimap, MovableLink,
        StandaloneAuth, Vehicle, VehicleTool,
    };
    pub use crate::capability::{
        Capability, CapabilityKind, CapabilityType, InitArg, InitArgs, InitContext,
    };
    pub use crate::entity::{ComponentRegistry, EntityHandle, EntityTypeDescriptor, InitStep};
    pub use crate::error::{CoreError, Result};
    pub use crate::ids::{EntityTypeId, ItemKind, ItemTag, SkillKind, StationKind, TalentKind};
    pub use crate::items::{ItemCatalog, ItemDescriptor, ItemTagPredicate};
    pub use crate::lifecycle::{LateRegistration, LiveRegistries, Registries, RegistryBuilder};
    pub use crate::math::Fixed;
    pub use crate::recipe::{
        CraftingElement, IngredientElement, IngredientSource, RecipeCatalog, RecipeDefinition,
        RecipeDraft, RecipeHooks, SkillResolver, SkillScaledValue, Unskilled,
    };
    pub use crate::stack_limits::{
        StackCap, StackRestrictionRegistry, StackRestrictionTable, StackRule,
    };
}
