//! Data structures for mod content files.
//!
//! This module contains pure data structures that describe items, entity
//! types, recipes and stack restrictions. All structs are designed to be
//! deserialized from RON files and converted into the runtime registry types.
//!
//! **Note:** This module contains no IO - it only defines data types.
//! File loading is handled by `techtree_tools`.

mod entity_data;
mod item_data;
mod mod_data;
mod recipe_data;
mod stack_limit_data;

pub use entity_data::EntityTypeData;
pub use item_data::ItemData;
pub use mod_data::ModData;
pub use recipe_data::{CostData, IngredientData, OutputData, RecipeData, SkillRequirementData};
pub use stack_limit_data::{StackLimitData, StackRuleData, TagMatch};
