//! Human-readable and JSON summaries of loaded registries.

use std::fmt;

use serde::Serialize;
use techtree_core::lifecycle::Registries;
use techtree_core::math::fixed_to_decimal;
use techtree_core::stack_limits::StackCap;

/// Snapshot of everything a load pass registered.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogSummary {
    /// Number of items in the catalog.
    pub items: usize,
    /// Entity types, in id order.
    pub entity_types: Vec<EntityTypeSummary>,
    /// Recipes grouped by station, in station order.
    pub recipes: Vec<RecipeSummary>,
    /// Stack tables, in entity type order.
    pub stack_tables: Vec<StackTableSummary>,
}

/// One entity type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityTypeSummary {
    /// Entity type id.
    pub id: String,
    /// Display name.
    pub display_name: String,
    /// Required capabilities.
    pub capabilities: Vec<String>,
    /// Capabilities initialized, in step order.
    pub init_steps: Vec<String>,
}

/// One recipe.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecipeSummary {
    /// Station the recipe is filed under.
    pub station: String,
    /// Recipe name.
    pub name: String,
    /// Ingredient lines as `quantity x source`.
    pub ingredients: Vec<String>,
    /// Output lines as `quantity x item`.
    pub outputs: Vec<String>,
    /// Experience per craft.
    pub experience: f64,
    /// Unscaled labor in calories.
    pub labor_calories: f64,
    /// Unscaled craft time in minutes.
    pub craft_minutes: f64,
}

/// One stack table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StackTableSummary {
    /// Entity type id.
    pub entity_type: String,
    /// Cap for unmatched items; `None` if unrestricted.
    pub default_cap: Option<u32>,
    /// Number of items with an explicit cap.
    pub restricted_items: usize,
}

impl CatalogSummary {
    /// Summarize `registries`.
    #[must_use]
    pub fn from_registries(registries: &Registries) -> Self {
        let entity_types = registries
            .components()
            .all()
            .map(|descriptor| EntityTypeSummary {
                id: descriptor.id.to_string(),
                display_name: descriptor.display_name.clone(),
                capabilities: descriptor.required.iter().map(ToString::to_string).collect(),
                init_steps: descriptor
                    .init_steps
                    .iter()
                    .map(|step| step.kind.to_string())
                    .collect(),
            })
            .collect();

        let recipes = registries
            .recipes()
            .iter()
            .map(|(station, recipe)| RecipeSummary {
                station: station.to_string(),
                name: recipe.name().to_string(),
                ingredients: recipe
                    .ingredients()
                    .iter()
                    .map(|i| format!("{} x {}", i.quantity, i.source))
                    .collect(),
                outputs: recipe
                    .outputs()
                    .iter()
                    .map(|o| format!("{} x {}", o.quantity, o.item))
                    .collect(),
                experience: fixed_to_decimal(recipe.experience()),
                labor_calories: fixed_to_decimal(recipe.labor().base),
                craft_minutes: fixed_to_decimal(recipe.craft_time().base),
            })
            .collect();

        let stack_tables = registries
            .stack_limits()
            .entity_types()
            .map(|entity_type| {
                let table = registries.stack_limits_for(entity_type);
                StackTableSummary {
                    entity_type: entity_type.to_string(),
                    default_cap: match table.default_cap() {
                        StackCap::Unrestricted => None,
                        StackCap::Limited(cap) => Some(cap),
                    },
                    restricted_items: table.len(),
                }
            })
            .collect();

        Self {
            items: registries.items().len(),
            entity_types,
            recipes,
            stack_tables,
        }
    }

    /// Render as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl fmt::Display for CatalogSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Items: {}", self.items)?;

        writeln!(f, "Entity types ({}):", self.entity_types.len())?;
        for entity_type in &self.entity_types {
            writeln!(
                f,
                "  {} \"{}\": {} capabilities, init {}",
                entity_type.id,
                entity_type.display_name,
                entity_type.capabilities.len(),
                entity_type.init_steps.join(" -> ")
            )?;
        }

        writeln!(f, "Recipes ({}):", self.recipes.len())?;
        for recipe in &self.recipes {
            writeln!(
                f,
                "  [{}] {}: {} -> {}",
                recipe.station,
                recipe.name,
                recipe.ingredients.join(", "),
                recipe.outputs.join(", ")
            )?;
        }

        writeln!(f, "Stack tables ({}):", self.stack_tables.len())?;
        for table in &self.stack_tables {
            let default = table
                .default_cap
                .map_or_else(|| "unrestricted".to_string(), |cap| cap.to_string());
            writeln!(
                f,
                "  {}: default {}, {} restricted items",
                table.entity_type, default, table.restricted_items
            )?;
        }
        Ok(())
    }
}
