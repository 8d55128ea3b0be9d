//! Recipe data structures for data-driven crafting recipes.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::ids::StationKind;
use crate::math::{decimal_to_fixed, Fixed};
use crate::recipe::{CraftingElement, IngredientElement, RecipeDraft, SkillScaledValue};

/// Data-driven recipe declaration.
///
/// # Example RON
///
/// ```ron
/// RecipeData(
///     name: "SteamFrontLoader",
///     display_name: "Steam Front Loader",
///     station: "AssemblyLine",
///     ingredients: [
///         (item: "IronPlate", quantity: 20, skill: "Mechanics", talent: "MechanicsLavish"),
///         (tag: "Lumber", quantity: 30, skill: "Mechanics", talent: "MechanicsLavish"),
///         (item: "IronWheel", quantity: 4, fixture: true),
///     ],
///     outputs: [(item: "SteamFrontLoader")],
///     experience: 25.0,
///     labor: (base: 1250.0, skill: "Mechanics"),
///     craft_minutes: (base: 10.0, skill: "Mechanics"),
///     required_skill: (skill: "Mechanics", level: 2),
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeData {
    /// Stable recipe name.
    pub name: String,

    /// Display name; defaults to the name.
    #[serde(default)]
    pub display_name: Option<String>,

    /// Station the recipe is filed under.
    pub station: String,

    /// Ingredient lines.
    pub ingredients: Vec<IngredientData>,

    /// Output lines.
    pub outputs: Vec<OutputData>,

    /// Experience granted per craft.
    #[serde(default)]
    pub experience: f64,

    /// Labor cost in calories.
    #[serde(default)]
    pub labor: CostData,

    /// Craft duration in minutes.
    #[serde(default)]
    pub craft_minutes: CostData,

    /// Skill level needed to craft.
    #[serde(default)]
    pub required_skill: Option<SkillRequirementData>,
}

/// One ingredient line. Exactly one of `item` or `tag` must be set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngredientData {
    /// Concrete item kind.
    #[serde(default)]
    pub item: Option<String>,

    /// Item tag.
    #[serde(default)]
    pub tag: Option<String>,

    /// Quantity consumed.
    pub quantity: i64,

    /// Skill that scales the quantity. Requires `talent`.
    #[serde(default)]
    pub skill: Option<String>,

    /// Talent that substitutes a cheaper quantity. Requires `skill`.
    #[serde(default)]
    pub talent: Option<String>,

    /// Static fixture: never scaled.
    #[serde(default)]
    pub fixture: bool,
}

/// One output line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputData {
    /// Item produced.
    pub item: String,

    /// Quantity produced.
    #[serde(default = "default_output_quantity")]
    pub quantity: i64,
}

fn default_output_quantity() -> i64 {
    1
}

/// Base cost with an optional scaling skill.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CostData {
    /// Cost before scaling.
    pub base: f64,

    /// Skill that scales the cost.
    #[serde(default)]
    pub skill: Option<String>,
}

/// Required skill level.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillRequirementData {
    /// Required skill.
    pub skill: String,
    /// Minimum level.
    pub level: u32,
}

impl RecipeData {
    /// Station this recipe is filed under.
    #[must_use]
    pub fn station(&self) -> StationKind {
        StationKind::new(self.station.as_str())
    }

    /// Convert into a draft ready for the build hooks.
    ///
    /// Structural checks (empty ingredient list and the like) are left to
    /// [`RecipeDraft::build`]; this only rejects values with no runtime
    /// representation.
    pub fn to_draft(&self) -> Result<RecipeDraft> {
        let display_name = self.display_name.clone().unwrap_or_else(|| self.name.clone());
        let mut draft = RecipeDraft::new(self.name.as_str(), display_name)
            .experience(self.decimal("experience", self.experience)?)
            .labor(self.cost("labor", &self.labor)?)
            .craft_time(self.cost("craft time", &self.craft_minutes)?);

        for ingredient in &self.ingredients {
            draft = draft.ingredient(self.ingredient(ingredient)?);
        }
        for output in &self.outputs {
            let quantity = self.quantity(&output.item, output.quantity)?;
            draft = draft.output(CraftingElement::new(output.item.as_str(), quantity));
        }
        if let Some(requirement) = &self.required_skill {
            draft = draft.requires_skill(requirement.skill.as_str(), requirement.level);
        }
        Ok(draft)
    }

    fn ingredient(&self, data: &IngredientData) -> Result<IngredientElement> {
        let mut element = match (&data.item, &data.tag) {
            (Some(item), None) => {
                IngredientElement::item(item.as_str(), self.quantity(item, data.quantity)?)
            }
            (None, Some(tag)) => {
                IngredientElement::tag(tag.as_str(), self.quantity(tag, data.quantity)?)
            }
            (Some(_), Some(_)) => {
                return Err(self.invalid("ingredient sets both item and tag".to_string()))
            }
            (None, None) => {
                return Err(self.invalid("ingredient sets neither item nor tag".to_string()))
            }
        };

        match (&data.skill, &data.talent) {
            (Some(skill), Some(talent)) => element = element.gated(skill.as_str(), talent.as_str()),
            (None, None) => {}
            _ => {
                return Err(self.invalid(format!(
                    "ingredient {} needs both skill and talent, or neither",
                    element.source
                )))
            }
        }

        if data.fixture {
            element = element.fixture();
        }
        Ok(element)
    }

    fn quantity(&self, what: &str, quantity: i64) -> Result<u32> {
        u32::try_from(quantity)
            .ok()
            .filter(|q| *q > 0)
            .ok_or_else(|| {
                self.invalid(format!("{what} quantity must be positive, got {quantity}"))
            })
    }

    fn decimal(&self, what: &str, value: f64) -> Result<Fixed> {
        decimal_to_fixed(value)
            .ok_or_else(|| self.invalid(format!("{what} is not representable: {value}")))
    }

    fn cost(&self, what: &str, cost: &CostData) -> Result<SkillScaledValue> {
        let base = self.decimal(what, cost.base)?;
        Ok(match &cost.skill {
            Some(skill) => SkillScaledValue::scaled(base, skill.as_str()),
            None => SkillScaledValue::fixed(base),
        })
    }

    fn invalid(&self, reason: String) -> CoreError {
        CoreError::InvalidRecipe {
            recipe: self.name.clone(),
            reason,
        }
    }
}
