//! Test fixtures and helpers.
//!
//! Pre-built item catalogs, entity types and recipes
//! for consistent testing.

use fixed::types::I32F32;
use techtree_core::capability::{CapabilityKind, InitArgs};
use techtree_core::content::steam_front_loader;
use techtree_core::entity::EntityTypeDescriptor;
use techtree_core::items::{ItemCatalog, ItemDescriptor};
use techtree_core::lifecycle::RegistryBuilder;
use techtree_core::recipe::{CraftingElement, IngredientElement, RecipeDraft, RecipeHooks};

/// Create a fixed-point number from an integer.
#[must_use]
pub fn fixed(n: i32) -> I32F32 {
    I32F32::from_num(n)
}

/// Create a fixed-point number from a float (for tests only).
///
/// Note: In registry code, tuning values never stay floats.
/// This is only for convenient test setup.
#[must_use]
pub fn fixed_f(n: f64) -> I32F32 {
    I32F32::from_num(n)
}

/// Create an item with the given tags.
#[must_use]
pub fn item(kind: &str, tags: &[&str]) -> ItemDescriptor {
    ItemDescriptor::new(kind, kind).with_tags(tags.iter().copied())
}

/// Catalog with blocks, crafting materials and the loader item.
///
/// Diggable: Dirt, Sand, Clay. Minable: Stone, IronOre, Granite.
/// Lumber: Lumber, Hardwood Lumber.
#[must_use]
pub fn test_item_catalog() -> ItemCatalog {
    ItemCatalog::from_items([
        item("Dirt", &["Block", "Diggable"]),
        item("Sand", &["Block", "Diggable"]),
        item("Clay", &["Block", "Diggable"]),
        item("Stone", &["Block", "Minable"]),
        item("IronOre", &["Block", "Minable", "Ore"]),
        item("Granite", &["Block", "Minable", "Heavy"]),
        item("Apple", &["Food"]),
        item("Lumber", &["Lumber"]),
        item("HardwoodLumber", &["Lumber", "Hardwood"]),
        item("IronPlate", &[]),
        item("IronPipe", &[]),
        item("Screws", &[]),
        item("LeatherHide", &[]),
        item("PortableSteamEngine", &[]),
        item("IronWheel", &[]),
        item("IronAxle", &[]),
        steam_front_loader::item(),
    ])
}

/// Catalog of `count` generated items cycling through block tags.
#[must_use]
pub fn large_item_catalog(count: usize) -> ItemCatalog {
    const TAGS: [&[&str]; 4] = [&["Block", "Diggable"], &["Block", "Minable"], &["Food"], &[]];
    ItemCatalog::from_items((0..count).map(|i| item(&format!("Item{i}"), TAGS[i % TAGS.len()])))
}

/// Init arguments every capability of `kind` accepts.
#[must_use]
pub fn valid_init_args(kind: CapabilityKind) -> InitArgs {
    match kind {
        CapabilityKind::StandaloneAuth | CapabilityKind::MovableLink | CapabilityKind::Minimap => {
            InitArgs::new()
        }
        CapabilityKind::FuelSupply => InitArgs::new().with_int(2).with_text_list(["Burnable Fuel"]),
        CapabilityKind::FuelConsumption => InitArgs::new().with_int(25),
        CapabilityKind::AirPollution => InitArgs::new().with_decimal(0.5),
        CapabilityKind::Vehicle => InitArgs::new().with_decimal(12.0).with_decimal(1.2).with_int(1),
        CapabilityKind::CustomText => InitArgs::new().with_int(30),
        CapabilityKind::VehicleTool => InitArgs::new()
            .with_int(4)
            .with_int(2_800_000)
            .with_item("Dirt")
            .with_int(100)
            .with_int(200)
            .with_int(0),
    }
}

/// Minimal loader: fuel supply and a vehicle tool.
#[must_use]
pub fn loader_descriptor() -> EntityTypeDescriptor {
    EntityTypeDescriptor::new("Loader", "Loader")
        .require(CapabilityKind::FuelSupply)
        .require(CapabilityKind::VehicleTool)
        .step(CapabilityKind::FuelSupply, valid_init_args(CapabilityKind::FuelSupply))
        .step(CapabilityKind::VehicleTool, valid_init_args(CapabilityKind::VehicleTool))
}

/// One-ingredient, one-output recipe draft.
#[must_use]
pub fn simple_recipe(name: &str) -> RecipeDraft {
    RecipeDraft::new(name, name)
        .ingredient(IngredientElement::item("IronPlate", 2))
        .output(CraftingElement::new(name, 1))
}

/// Build phase over [`test_item_catalog`] with the steam front loader registered.
///
/// # Panics
///
/// Panics if the bundled content fails to register.
#[must_use]
pub fn test_builder() -> RegistryBuilder {
    let mut builder = RegistryBuilder::new(test_item_catalog());
    if let Err(e) = steam_front_loader::register(&mut builder, &RecipeHooks::new()) {
        panic!("bundled content failed to register: {e}");
    }
    builder
}
