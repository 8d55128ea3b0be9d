//! Steam Front Loader: a small steam-powered bucket loader.
//!
//! Crafted at the assembly line. Its tool inventory holds at most 30 of any
//! item, diggable and minable blocks included.

use crate::capability::{CapabilityKind, InitArgs};
use crate::entity::EntityTypeDescriptor;
use crate::error::Result;
use crate::ids::{EntityTypeId, StationKind};
use crate::items::{ItemDescriptor, ItemTagPredicate};
use crate::lifecycle::RegistryBuilder;
use crate::math::Fixed;
use crate::recipe::{
    CraftingElement, IngredientElement, RecipeDraft, RecipeHooks, SkillScaledValue,
};
use crate::stack_limits::{StackCap, StackRule};

/// Entity type, item and recipe name.
pub const NAME: &str = "SteamFrontLoader";
/// Display name shared by the item, the recipe and the entity type.
pub const DISPLAY_NAME: &str = "Steam Front Loader";
/// Description shared by the item and the entity type.
pub const DESCRIPTION: &str =
    "Small scale bucket loader. Great for flat to low slope excavation.";
/// Station the recipe is filed under.
pub const STATION: &str = "AssemblyLine";
/// Stack cap for the tool inventory.
pub const STACK_CAP: u32 = 30;

const SKILL: &str = "Mechanics";
const TALENT: &str = "MechanicsLavishResources";

/// Entity type identifier.
#[must_use]
pub fn entity_type() -> EntityTypeId {
    EntityTypeId::new(NAME)
}

/// Item the loader is picked up as.
#[must_use]
pub fn item() -> ItemDescriptor {
    ItemDescriptor::new(NAME, DISPLAY_NAME)
        .with_description(DESCRIPTION)
        .with_tags(["Excavation"])
        .with_weight(20_000)
}

/// Recipe draft, before any build hooks run.
#[must_use]
pub fn recipe() -> RecipeDraft {
    RecipeDraft::new(NAME, DISPLAY_NAME)
        .ingredient(IngredientElement::item("IronPlate", 20).gated(SKILL, TALENT))
        .ingredient(IngredientElement::item("IronPipe", 8).gated(SKILL, TALENT))
        .ingredient(IngredientElement::item("Screws", 50).gated(SKILL, TALENT))
        .ingredient(IngredientElement::item("LeatherHide", 20).gated(SKILL, TALENT))
        .ingredient(IngredientElement::tag("Lumber", 30).gated(SKILL, TALENT))
        .ingredient(IngredientElement::item("PortableSteamEngine", 1).fixture())
        .ingredient(IngredientElement::item("IronWheel", 4).fixture())
        .ingredient(IngredientElement::item("IronAxle", 2).fixture())
        .output(CraftingElement::new(NAME, 1))
        .experience(Fixed::from_num(25))
        .labor(SkillScaledValue::scaled(Fixed::from_num(1250), SKILL))
        .craft_time(SkillScaledValue::scaled(Fixed::from_num(10), SKILL))
        .requires_skill(SKILL, 2)
}

/// Ordered stack rules for the tool inventory.
#[must_use]
pub fn stack_rules() -> Vec<StackRule> {
    vec![
        StackRule::new(ItemTagPredicate::has_tag("Diggable"), STACK_CAP),
        StackRule::new(ItemTagPredicate::has_tag("Minable"), STACK_CAP),
    ]
}

/// Entity type with its capabilities and init steps.
#[must_use]
pub fn descriptor() -> EntityTypeDescriptor {
    EntityTypeDescriptor::new(NAME, DISPLAY_NAME)
        .with_description(DESCRIPTION)
        .with_represented_item(NAME)
        .require_all(CapabilityKind::ALL)
        .step(CapabilityKind::CustomText, InitArgs::new().with_int(30))
        .step(
            CapabilityKind::FuelSupply,
            InitArgs::new().with_int(2).with_text_list(["Burnable Fuel"]),
        )
        .step(CapabilityKind::FuelConsumption, InitArgs::new().with_int(25))
        .step(CapabilityKind::AirPollution, InitArgs::new().with_decimal(0.5))
        .step(
            CapabilityKind::Vehicle,
            InitArgs::new().with_decimal(12.0).with_decimal(1.2).with_int(1),
        )
        .step(
            CapabilityKind::VehicleTool,
            InitArgs::new()
                .with_int(4)
                .with_int(2_800_000)
                .with_item("Dirt")
                .with_int(100)
                .with_int(200)
                .with_int(0)
                .with_flag(true),
        )
}

/// File the stack table, the recipe and the entity type into `builder`.
///
/// The item itself belongs to the host catalog and is not added here.
pub fn register(builder: &mut RegistryBuilder, hooks: &RecipeHooks) -> Result<()> {
    builder.build_stack_limits(entity_type(), StackCap::Limited(STACK_CAP), &stack_rules());
    builder.register_recipe(StationKind::new(STATION), recipe(), hooks)?;
    builder.register_entity_type(descriptor())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::{FuelSupply, Vehicle, VehicleTool};
    use crate::ids::{ItemKind, ItemTag, SkillKind};
    use crate::items::ItemCatalog;
    use crate::recipe::{SkillResolver, Unskilled};

    fn create_test_catalog() -> ItemCatalog {
        ItemCatalog::from_items([
            ItemDescriptor::new("Dirt", "Dirt").with_tags(["Block", "Diggable"]),
            ItemDescriptor::new("Sand", "Sand").with_tags(["Block", "Diggable"]),
            ItemDescriptor::new("IronOre", "Iron Ore").with_tags(["Block", "Minable"]),
            ItemDescriptor::new("Apple", "Apple").with_tags(["Food"]),
            item(),
        ])
    }

    fn create_test_builder() -> RegistryBuilder {
        let mut builder = RegistryBuilder::new(create_test_catalog());
        register(&mut builder, &RecipeHooks::new()).unwrap();
        builder
    }

    struct Halving;

    impl SkillResolver for Halving {
        fn multiplier(&self, _skill: &SkillKind, _beneficiary: &str) -> Fixed {
            Fixed::from_num(0.5)
        }
    }

    #[test]
    fn test_register_and_instantiate() {
        let registries = create_test_builder().finish();
        let handle = registries.instantiate(&entity_type()).unwrap();

        assert_eq!(handle.display_name(), DISPLAY_NAME);
        assert_eq!(handle.description(), DESCRIPTION);
        assert_eq!(handle.kinds().count(), 9);
        assert_eq!(
            handle.init_order(),
            &[
                CapabilityKind::CustomText,
                CapabilityKind::FuelSupply,
                CapabilityKind::FuelConsumption,
                CapabilityKind::AirPollution,
                CapabilityKind::Vehicle,
                CapabilityKind::VehicleTool,
            ]
        );

        let fuel = handle.get::<FuelSupply>().unwrap();
        assert_eq!(fuel.slots, 2);
        assert_eq!(fuel.fuel_tags, vec![ItemTag::new("Burnable Fuel")]);

        let vehicle = handle.get::<Vehicle>().unwrap();
        assert_eq!(vehicle.max_speed, Fixed::from_num(12));
        assert_eq!(vehicle.seats, 1);
    }

    #[test]
    fn test_vehicle_tool_uses_stack_table() {
        let registries = create_test_builder().finish();
        let handle = registries.instantiate(&entity_type()).unwrap();
        let tool = handle.get::<VehicleTool>().unwrap();

        assert_eq!(tool.inventory_slots, 4);
        assert_eq!(tool.max_weight, 2_800_000);
        assert_eq!(tool.default_item, Some(ItemKind::new("Dirt")));
        assert!(tool.tool_on_mount);
        assert_eq!(tool.stack_limits.cap_for(&"Dirt".into()), StackCap::Limited(30));
        assert_eq!(tool.stack_limits.cap_for(&"IronOre".into()), StackCap::Limited(30));
        assert_eq!(tool.stack_limits.cap_for(&"Apple".into()), StackCap::Limited(30));
        assert_eq!(tool.stack_limits.len(), 3);
    }

    #[test]
    fn test_recipe_filed_under_assembly_line() {
        let registries = create_test_builder().finish();
        let recipes = registries.recipes_for(&StationKind::new(STATION));
        assert_eq!(recipes.len(), 1);

        let recipe = &recipes[0];
        assert!(recipe.is_frozen());
        assert_eq!(recipe.ingredients().len(), 8);
        assert_eq!(recipe.ingredients().iter().filter(|i| i.fixture).count(), 3);
        assert_eq!(recipe.experience(), Fixed::from_num(25));
        assert_eq!(recipe.required_skill().unwrap().level, 2);
        assert_eq!(recipe.labor_calories(&Unskilled), Fixed::from_num(1250));
        assert_eq!(recipe.craft_minutes(&Halving), Fixed::from_num(5));
    }

    #[test]
    fn test_pre_build_hook_changes_recipe() {
        let hooks = RecipeHooks::new().pre_build(|draft| draft.experience(Fixed::from_num(50)));
        let mut builder = RegistryBuilder::new(create_test_catalog());
        register(&mut builder, &hooks).unwrap();

        let recipe = &builder.recipes().recipes_for(&StationKind::new(STATION))[0];
        assert_eq!(recipe.experience(), Fixed::from_num(50));
    }
}
