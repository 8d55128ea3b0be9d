//! Mod bundle: everything one mod file contributes.

use serde::{Deserialize, Serialize};

use crate::data::{EntityTypeData, ItemData, RecipeData, StackLimitData};
use crate::error::{CoreError, Result};
use crate::items::ItemCatalog;
use crate::recipe::IngredientSource;

/// Complete contents of one mod file.
///
/// # Example RON
///
/// ```ron
/// ModData(
///     name: "steam_front_loader",
///     items: [(kind: "SteamFrontLoader", display_name: "Steam Front Loader")],
///     entity_types: [/* EntityTypeData */],
///     recipes: [/* RecipeData */],
///     stack_limits: [/* StackLimitData */],
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ModData {
    /// Mod name, used in logs.
    pub name: String,

    /// Items the mod adds to the catalog.
    #[serde(default)]
    pub items: Vec<ItemData>,

    /// Entity types.
    #[serde(default)]
    pub entity_types: Vec<EntityTypeData>,

    /// Recipes.
    #[serde(default)]
    pub recipes: Vec<RecipeData>,

    /// Stack restriction tables.
    #[serde(default)]
    pub stack_limits: Vec<StackLimitData>,
}

impl ModData {
    /// Parse a mod bundle from RON text.
    ///
    /// `label` names the source in the error, usually the file path.
    pub fn from_ron(text: &str, label: &str) -> Result<Self> {
        ron::from_str(text).map_err(|e| CoreError::DataParse {
            path: label.to_string(),
            message: e.to_string(),
        })
    }

    /// Get an entity type by id.
    #[must_use]
    pub fn get_entity_type(&self, id: &str) -> Option<&EntityTypeData> {
        self.entity_types.iter().find(|e| e.id == id)
    }

    /// Get the first recipe with the given name.
    #[must_use]
    pub fn get_recipe(&self, name: &str) -> Option<&RecipeData> {
        self.recipes.iter().find(|r| r.name == name)
    }

    /// Check references against the item catalog the mod will be built with.
    ///
    /// `catalog` should already contain this mod's own items. Returns a list
    /// of problems; empty if the mod is consistent.
    #[must_use]
    pub fn validate(&self, catalog: &ItemCatalog) -> Vec<String> {
        let mut errors = Vec::new();

        for entity_type in &self.entity_types {
            if let Some(item) = &entity_type.represented_item {
                if !catalog.contains(&item.as_str().into()) {
                    errors.push(format!(
                        "Entity type '{}' represents unknown item '{}'",
                        entity_type.id, item
                    ));
                }
            }
            if let Err(e) = entity_type.to_descriptor().validate() {
                errors.push(e.to_string());
            }
        }

        for recipe in &self.recipes {
            let draft = match recipe.to_draft() {
                Ok(draft) => draft,
                Err(e) => {
                    errors.push(e.to_string());
                    continue;
                }
            };

            for ingredient in &draft.ingredients {
                match &ingredient.source {
                    IngredientSource::Item(kind) if !catalog.contains(kind) => {
                        errors.push(format!(
                            "Recipe '{}' consumes unknown item '{}'",
                            recipe.name, kind
                        ));
                    }
                    IngredientSource::Tag(tag)
                        if !catalog.all_items().iter().any(|i| i.tags.contains(tag)) =>
                    {
                        errors.push(format!(
                            "Recipe '{}' consumes tag '{}' that no item carries",
                            recipe.name, tag
                        ));
                    }
                    _ => {}
                }
            }

            for output in &draft.outputs {
                if !catalog.contains(&output.item) {
                    errors.push(format!(
                        "Recipe '{}' produces unknown item '{}'",
                        recipe.name, output.item
                    ));
                }
            }

            if let Err(e) = draft.build() {
                errors.push(e.to_string());
            }
        }

        // Stack tables for types defined elsewhere are legal but usually a typo
        for limits in &self.stack_limits {
            if self.get_entity_type(&limits.entity_type).is_none() {
                errors.push(format!(
                    "Stack limits for entity type '{}' not declared in this mod",
                    limits.entity_type
                ));
            }
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::items::ItemDescriptor;

    const TEST_MOD: &str = r#"
        #![enable(implicit_some)]
        ModData(
            name: "carts",
            items: [
                (kind: "Cart", tags: ["Vehicle"]),
                (kind: "Plank", tags: ["Wood"]),
            ],
            entity_types: [
                (
                    id: "Cart",
                    represented_item: "Cart",
                    required: [CustomText],
                    init_steps: [(kind: CustomText, args: [Int(20)])],
                ),
            ],
            recipes: [
                (
                    name: "Cart",
                    station: "Workbench",
                    ingredients: [(tag: "Wood", quantity: 10)],
                    outputs: [(item: "Cart")],
                ),
            ],
            stack_limits: [
                (entity_type: "Cart", default_cap: 20),
            ],
        )
    "#;

    fn create_test_catalog(data: &ModData) -> ItemCatalog {
        ItemCatalog::from_items(data.items.iter().map(ItemData::to_descriptor))
    }

    #[test]
    fn test_parse_mod_data() {
        let data = ModData::from_ron(TEST_MOD, "carts.ron").unwrap();
        assert_eq!(data.name, "carts");
        assert_eq!(data.items.len(), 2);
        assert!(data.get_entity_type("Cart").is_some());
        assert!(data.get_recipe("Cart").is_some());
        assert!(data.get_recipe("Wagon").is_none());
    }

    #[test]
    fn test_parse_error_carries_label() {
        let err = ModData::from_ron("ModData(name: ", "broken.ron").unwrap_err();
        match err {
            CoreError::DataParse { path, .. } => assert_eq!(path, "broken.ron"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_validate_clean_mod() {
        let data = ModData::from_ron(TEST_MOD, "carts.ron").unwrap();
        let errors = data.validate(&create_test_catalog(&data));
        assert!(errors.is_empty(), "unexpected errors: {errors:?}");
    }

    #[test]
    fn test_validate_reports_unknown_references() {
        let mut data = ModData::from_ron(TEST_MOD, "carts.ron").unwrap();
        let catalog = ItemCatalog::from_items([ItemDescriptor::new("Cart", "Cart")]);
        data.stack_limits[0].entity_type = "Wagon".to_string();

        let errors = data.validate(&catalog);
        assert!(errors.iter().any(|e| e.contains("tag 'Wood'")));
        assert!(errors.iter().any(|e| e.contains("'Wagon'")));
    }

    #[test]
    fn test_validate_reports_undeclared_init_step() {
        let mut data = ModData::from_ron(TEST_MOD, "carts.ron").unwrap();
        data.entity_types[0].required.clear();

        let errors = data.validate(&create_test_catalog(&data));
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("CustomText"));
    }
}
