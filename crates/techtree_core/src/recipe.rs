//! Crafting recipes and the station-keyed recipe catalog.
//!
//! A recipe starts as a mutable [`RecipeDraft`]. Pre-build hooks rewrite the
//! draft, [`RecipeDraft::build`] validates it into a [`RecipeDefinition`],
//! post-build hooks may still edit that definition, and
//! [`RecipeCatalog::register`] freezes it and files it under a station.
//! Once registered, every copy of the recipe rejects edits with
//! [`CoreError::FrozenRecipe`].
//!
//! The catalog does not deduplicate: registering the same name twice under
//! one station yields two entries.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{CoreError, Result};
use crate::ids::{ItemKind, ItemTag, SkillKind, StationKind, TalentKind};
use crate::math::{fixed_serde, Fixed};

/// What an ingredient slot accepts: one item kind, or any item with a tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IngredientSource {
    /// A concrete item kind.
    Item(ItemKind),
    /// Any item carrying this tag.
    Tag(ItemTag),
}

impl std::fmt::Display for IngredientSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Item(kind) => write!(f, "{kind}"),
            Self::Tag(tag) => write!(f, "[{tag}]"),
        }
    }
}

/// Skill and talent that can reduce an ingredient's quantity.
///
/// Both identifiers are passed through to the host untouched.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SkillGate {
    /// Skill whose level scales the quantity.
    pub skill: SkillKind,
    /// Talent that substitutes a cheaper quantity.
    pub talent: TalentKind,
}

/// One ingredient line of a recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngredientElement {
    /// Item or tag consumed.
    pub source: IngredientSource,
    /// Quantity consumed, always positive.
    pub quantity: u32,
    /// Optional skill scaling.
    pub skill_gate: Option<SkillGate>,
    /// Consumed as a static fixture: the quantity is never scaled.
    pub fixture: bool,
}

impl IngredientElement {
    /// Ingredient naming a concrete item kind.
    #[must_use]
    pub fn item(kind: impl Into<ItemKind>, quantity: u32) -> Self {
        Self {
            source: IngredientSource::Item(kind.into()),
            quantity,
            skill_gate: None,
            fixture: false,
        }
    }

    /// Ingredient accepting any item with `tag`.
    #[must_use]
    pub fn tag(tag: impl Into<ItemTag>, quantity: u32) -> Self {
        Self {
            source: IngredientSource::Tag(tag.into()),
            quantity,
            skill_gate: None,
            fixture: false,
        }
    }

    /// Attach a skill gate.
    #[must_use]
    pub fn gated(mut self, skill: impl Into<SkillKind>, talent: impl Into<TalentKind>) -> Self {
        self.skill_gate = Some(SkillGate {
            skill: skill.into(),
            talent: talent.into(),
        });
        self
    }

    /// Mark as a static fixture.
    #[must_use]
    pub fn fixture(mut self) -> Self {
        self.fixture = true;
        self
    }
}

/// One output line of a recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CraftingElement {
    /// Item produced.
    pub item: ItemKind,
    /// Quantity produced, at least 1.
    pub quantity: u32,
}

impl CraftingElement {
    /// Create an output line.
    #[must_use]
    pub fn new(item: impl Into<ItemKind>, quantity: u32) -> Self {
        Self {
            item: item.into(),
            quantity,
        }
    }
}

/// Minimum skill level needed to use a recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillRequirement {
    /// Required skill.
    pub skill: SkillKind,
    /// Minimum level.
    pub level: u32,
}

/// Resolves skill identifiers to cost multipliers.
///
/// Implemented by the host's skill and talent system.
pub trait SkillResolver {
    /// Multiplier applied to a base cost scaled by `skill` for `beneficiary`.
    fn multiplier(&self, skill: &SkillKind, beneficiary: &str) -> Fixed;
}

/// Resolver for crafters with no skills: every multiplier is 1.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unskilled;

impl SkillResolver for Unskilled {
    fn multiplier(&self, _skill: &SkillKind, _beneficiary: &str) -> Fixed {
        Fixed::from_num(1)
    }
}

/// A base cost optionally scaled by a skill.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillScaledValue {
    /// Cost before scaling.
    #[serde(with = "fixed_serde")]
    pub base: Fixed,
    /// Skill that scales the cost.
    pub skill: Option<SkillKind>,
}

impl SkillScaledValue {
    /// A cost that no skill affects.
    #[must_use]
    pub fn fixed(base: Fixed) -> Self {
        Self { base, skill: None }
    }

    /// A cost scaled by `skill`.
    #[must_use]
    pub fn scaled(base: Fixed, skill: impl Into<SkillKind>) -> Self {
        Self {
            base,
            skill: Some(skill.into()),
        }
    }

    /// Evaluate the cost for `beneficiary`.
    ///
    /// Saturates at the bounds of [`Fixed`] instead of overflowing.
    #[must_use]
    pub fn evaluate(&self, resolver: &dyn SkillResolver, beneficiary: &str) -> Fixed {
        match &self.skill {
            Some(skill) => self
                .base
                .saturating_mul(resolver.multiplier(skill, beneficiary)),
            None => self.base,
        }
    }
}

impl Default for SkillScaledValue {
    fn default() -> Self {
        Self::fixed(Fixed::ZERO)
    }
}

/// An in-progress recipe, freely mutable until built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeDraft {
    /// Stable recipe name.
    pub name: String,
    /// Display name, passed through untranslated.
    pub display_name: String,
    /// Ingredient lines, in order.
    pub ingredients: Vec<IngredientElement>,
    /// Output lines, in order.
    pub outputs: Vec<CraftingElement>,
    /// Experience granted per craft.
    pub experience: Fixed,
    /// Labor cost in calories.
    pub labor_calories: SkillScaledValue,
    /// Craft duration in minutes.
    pub craft_minutes: SkillScaledValue,
    /// Skill level needed to craft.
    pub required_skill: Option<SkillRequirement>,
}

impl RecipeDraft {
    /// Start an empty draft.
    #[must_use]
    pub fn new(name: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            display_name: display_name.into(),
            ingredients: Vec::new(),
            outputs: Vec::new(),
            experience: Fixed::ZERO,
            labor_calories: SkillScaledValue::default(),
            craft_minutes: SkillScaledValue::default(),
            required_skill: None,
        }
    }

    /// Append an ingredient line.
    #[must_use]
    pub fn ingredient(mut self, ingredient: IngredientElement) -> Self {
        self.ingredients.push(ingredient);
        self
    }

    /// Append an output line.
    #[must_use]
    pub fn output(mut self, output: CraftingElement) -> Self {
        self.outputs.push(output);
        self
    }

    /// Set the experience reward.
    #[must_use]
    pub fn experience(mut self, experience: Fixed) -> Self {
        self.experience = experience;
        self
    }

    /// Set the labor cost.
    #[must_use]
    pub fn labor(mut self, labor_calories: SkillScaledValue) -> Self {
        self.labor_calories = labor_calories;
        self
    }

    /// Set the craft duration.
    #[must_use]
    pub fn craft_time(mut self, craft_minutes: SkillScaledValue) -> Self {
        self.craft_minutes = craft_minutes;
        self
    }

    /// Set the skill requirement.
    #[must_use]
    pub fn requires_skill(mut self, skill: impl Into<SkillKind>, level: u32) -> Self {
        self.required_skill = Some(SkillRequirement {
            skill: skill.into(),
            level,
        });
        self
    }

    /// Validate the draft into an immutable-to-be recipe definition.
    ///
    /// Fails if there are no ingredients or outputs, if any quantity is zero,
    /// or if experience, labor or craft time is negative.
    pub fn build(self) -> Result<RecipeDefinition> {
        let invalid = |reason: String| CoreError::InvalidRecipe {
            recipe: self.name.clone(),
            reason,
        };

        if self.ingredients.is_empty() {
            return Err(invalid("no ingredients".to_string()));
        }
        if let Some(bad) = self.ingredients.iter().find(|i| i.quantity == 0) {
            return Err(invalid(format!("ingredient {} has quantity 0", bad.source)));
        }
        if self.outputs.is_empty() {
            return Err(invalid("no outputs".to_string()));
        }
        if let Some(bad) = self.outputs.iter().find(|o| o.quantity == 0) {
            return Err(invalid(format!("output {} has quantity 0", bad.item)));
        }
        validate_non_negative(&self.name, "experience", self.experience)?;
        validate_non_negative(&self.name, "labor", self.labor_calories.base)?;
        validate_non_negative(&self.name, "craft time", self.craft_minutes.base)?;

        debug!(
            recipe = %self.name,
            ingredients = self.ingredients.len(),
            outputs = self.outputs.len(),
            "Built recipe"
        );

        Ok(RecipeDefinition {
            name: self.name,
            display_name: self.display_name,
            ingredients: self.ingredients,
            outputs: self.outputs,
            experience: self.experience,
            labor_calories: self.labor_calories,
            craft_minutes: self.craft_minutes,
            required_skill: self.required_skill,
            frozen: false,
        })
    }
}

fn validate_non_negative(recipe: &str, what: &str, value: Fixed) -> Result<()> {
    if value < Fixed::ZERO {
        return Err(CoreError::InvalidRecipe {
            recipe: recipe.to_string(),
            reason: format!("{what} must not be negative, got {value}"),
        });
    }
    Ok(())
}

/// A validated recipe. Immutable once registered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecipeDefinition {
    name: String,
    display_name: String,
    ingredients: Vec<IngredientElement>,
    outputs: Vec<CraftingElement>,
    #[serde(with = "fixed_serde")]
    experience: Fixed,
    labor_calories: SkillScaledValue,
    craft_minutes: SkillScaledValue,
    required_skill: Option<SkillRequirement>,
    #[serde(skip)]
    frozen: bool,
}

impl RecipeDefinition {
    /// Stable recipe name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Display name.
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Ingredient lines, in order.
    #[must_use]
    pub fn ingredients(&self) -> &[IngredientElement] {
        &self.ingredients
    }

    /// Output lines, in order.
    #[must_use]
    pub fn outputs(&self) -> &[CraftingElement] {
        &self.outputs
    }

    /// Experience granted per craft.
    #[must_use]
    pub fn experience(&self) -> Fixed {
        self.experience
    }

    /// Unevaluated labor cost.
    #[must_use]
    pub fn labor(&self) -> &SkillScaledValue {
        &self.labor_calories
    }

    /// Unevaluated craft duration.
    #[must_use]
    pub fn craft_time(&self) -> &SkillScaledValue {
        &self.craft_minutes
    }

    /// Skill requirement, if any.
    #[must_use]
    pub fn required_skill(&self) -> Option<&SkillRequirement> {
        self.required_skill.as_ref()
    }

    /// Labor cost in calories for a crafter.
    #[must_use]
    pub fn labor_calories(&self, resolver: &dyn SkillResolver) -> Fixed {
        self.labor_calories.evaluate(resolver, &self.name)
    }

    /// Craft duration in minutes for a crafter.
    #[must_use]
    pub fn craft_minutes(&self, resolver: &dyn SkillResolver) -> Fixed {
        self.craft_minutes.evaluate(resolver, &self.name)
    }

    /// Check if the recipe has been registered.
    #[must_use]
    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    /// Open the recipe for editing.
    ///
    /// Fails with [`CoreError::FrozenRecipe`] once the recipe is registered.
    pub fn edit(&mut self) -> Result<RecipeEditor<'_>> {
        if self.frozen {
            return Err(CoreError::FrozenRecipe {
                recipe: self.name.clone(),
            });
        }
        Ok(RecipeEditor { recipe: self })
    }
}

/// Edit access to a not-yet-registered recipe. Every edit keeps the recipe valid.
#[derive(Debug)]
pub struct RecipeEditor<'a> {
    recipe: &'a mut RecipeDefinition,
}

impl RecipeEditor<'_> {
    /// Replace the experience reward.
    pub fn set_experience(&mut self, experience: Fixed) -> Result<&mut Self> {
        validate_non_negative(&self.recipe.name, "experience", experience)?;
        self.recipe.experience = experience;
        Ok(self)
    }

    /// Replace the labor cost.
    pub fn set_labor(&mut self, labor_calories: SkillScaledValue) -> Result<&mut Self> {
        validate_non_negative(&self.recipe.name, "labor", labor_calories.base)?;
        self.recipe.labor_calories = labor_calories;
        Ok(self)
    }

    /// Replace the craft duration.
    pub fn set_craft_time(&mut self, craft_minutes: SkillScaledValue) -> Result<&mut Self> {
        validate_non_negative(&self.recipe.name, "craft time", craft_minutes.base)?;
        self.recipe.craft_minutes = craft_minutes;
        Ok(self)
    }

    /// Replace or clear the skill requirement.
    pub fn set_required_skill(&mut self, requirement: Option<SkillRequirement>) -> &mut Self {
        self.recipe.required_skill = requirement;
        self
    }

    /// Append an ingredient line.
    pub fn add_ingredient(&mut self, ingredient: IngredientElement) -> Result<&mut Self> {
        if ingredient.quantity == 0 {
            return Err(CoreError::InvalidRecipe {
                recipe: self.recipe.name.clone(),
                reason: format!("ingredient {} has quantity 0", ingredient.source),
            });
        }
        self.recipe.ingredients.push(ingredient);
        Ok(self)
    }
}

/// Hook run on the draft before it is validated.
pub type PreBuildHook = Box<dyn Fn(RecipeDraft) -> RecipeDraft + Send + Sync>;

/// Hook run on the validated recipe before it is registered.
pub type PostBuildHook = Box<dyn Fn(RecipeDefinition) -> Result<RecipeDefinition> + Send + Sync>;

/// Mod extension points around recipe building.
///
/// Hooks are applied in the order they were added.
#[derive(Default)]
pub struct RecipeHooks {
    pre: Vec<PreBuildHook>,
    post: Vec<PostBuildHook>,
}

impl RecipeHooks {
    /// No hooks.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a pre-build hook.
    #[must_use]
    pub fn pre_build<F>(mut self, hook: F) -> Self
    where
        F: Fn(RecipeDraft) -> RecipeDraft + Send + Sync + 'static,
    {
        self.pre.push(Box::new(hook));
        self
    }

    /// Add a post-build hook.
    #[must_use]
    pub fn post_build<F>(mut self, hook: F) -> Self
    where
        F: Fn(RecipeDefinition) -> Result<RecipeDefinition> + Send + Sync + 'static,
    {
        self.post.push(Box::new(hook));
        self
    }

    /// Run pre-build hooks, validate, then run post-build hooks.
    pub fn build(&self, draft: RecipeDraft) -> Result<RecipeDefinition> {
        let draft = self.pre.iter().fold(draft, |draft, hook| hook(draft));
        self.post
            .iter()
            .try_fold(draft.build()?, |recipe, hook| hook(recipe))
    }
}

impl std::fmt::Debug for RecipeHooks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecipeHooks")
            .field("pre", &self.pre.len())
            .field("post", &self.post.len())
            .finish()
    }
}

/// Recipes grouped by crafting station.
#[derive(Debug, Clone, Default)]
pub struct RecipeCatalog {
    stations: BTreeMap<StationKind, Vec<Arc<RecipeDefinition>>>,
    len: usize,
}

impl RecipeCatalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self {
            stations: BTreeMap::new(),
            len: 0,
        }
    }

    /// Freeze a recipe and append it under `station`.
    ///
    /// Names are not checked for uniqueness.
    pub fn register(
        &mut self,
        station: StationKind,
        mut recipe: RecipeDefinition,
    ) -> Arc<RecipeDefinition> {
        recipe.frozen = true;
        let recipe = Arc::new(recipe);
        info!(station = %station, recipe = recipe.name(), "Registered recipe");
        self.stations
            .entry(station)
            .or_default()
            .push(Arc::clone(&recipe));
        self.len += 1;
        recipe
    }

    /// Recipes craftable at `station`, in registration order.
    #[must_use]
    pub fn recipes_for(&self, station: &StationKind) -> &[Arc<RecipeDefinition>] {
        self.stations.get(station).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Every entry with the given name across all stations.
    pub fn find<'a>(
        &'a self,
        name: &'a str,
    ) -> impl Iterator<Item = &'a Arc<RecipeDefinition>> + 'a {
        self.stations
            .values()
            .flatten()
            .filter(move |recipe| recipe.name() == name)
    }

    /// Stations with at least one recipe.
    pub fn stations(&self) -> impl Iterator<Item = &StationKind> {
        self.stations.keys()
    }

    /// Every (station, recipe) entry.
    pub fn iter(&self) -> impl Iterator<Item = (&StationKind, &Arc<RecipeDefinition>)> {
        self.stations
            .iter()
            .flat_map(|(station, recipes)| recipes.iter().map(move |recipe| (station, recipe)))
    }

    /// Total number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
