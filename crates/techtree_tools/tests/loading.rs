//! Integration tests for loading mod data directories.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use techtree_core::capabilities::{FuelSupply, VehicleTool};
use techtree_core::data::{ItemData, ModData};
use techtree_core::ids::{EntityTypeId, ItemKind, ItemTag, StationKind};
use techtree_core::lifecycle::LiveRegistries;
use techtree_core::math::Fixed;
use techtree_core::recipe::{RecipeHooks, Unskilled};
use techtree_core::stack_limits::StackCap;
use techtree_tools::validate::validate_data_directory;
use techtree_tools::{
    load_data_directory, load_items, load_mod_file, LoadError, LoaderConfig, ModLoader,
};

const ITEMS: &str = r#"[
    (kind: "Dirt", tags: ["Block", "Diggable"]),
    (kind: "Plank", tags: ["Wood"]),
    (kind: "Cart"),
]"#;

const CART_MOD: &str = r#"
#![enable(implicit_some)]
ModData(
    name: "carts",
    entity_types: [
        (
            id: "Cart",
            represented_item: "Cart",
            required: [CustomText, VehicleTool],
            init_steps: [
                (kind: CustomText, args: [Int(20)]),
                (kind: VehicleTool, args: [
                    Int(2), Int(5000), Item("Dirt"), Int(10), Int(1), Int(0),
                ]),
            ],
        ),
        (
            id: "BrokenCart",
            required: [CustomText],
            init_steps: [(kind: Minimap)],
        ),
    ],
    recipes: [
        (
            name: "Cart",
            station: "Workbench",
            ingredients: [(tag: "Wood", quantity: 10)],
            outputs: [(item: "Cart")],
        ),
        (
            name: "Nothing",
            station: "Workbench",
            ingredients: [],
            outputs: [(item: "Cart")],
        ),
    ],
    stack_limits: [
        (entity_type: "Cart", default_cap: 5, rules: [(matches: HasTag("Diggable"), cap: 50)]),
    ],
)
"#;

fn assets_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("assets")
}

fn write(dir: &Path, relative: &str, content: &str) {
    let path = dir.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn create_test_data_dir() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "items/items.ron", ITEMS);
    write(dir.path(), "mods/carts.ron", CART_MOD);
    dir
}

#[test]
fn test_bundled_assets_load_clean() {
    let (registries, report) = load_data_directory(LoaderConfig::new(assets_dir())).unwrap();
    assert!(report.is_clean(), "unexpected report: {report:?}");
    assert_eq!(report.mods, vec!["steam_front_loader".to_string()]);
    assert_eq!(report.recipes.len(), 1);

    let loader = EntityTypeId::new("SteamFrontLoader");
    let handle = registries.instantiate(&loader).unwrap();

    let fuel = handle.get::<FuelSupply>().unwrap();
    assert_eq!(fuel.slots, 2);
    assert_eq!(fuel.fuel_tags, vec![ItemTag::new("Burnable Fuel")]);

    let tool = handle.get::<VehicleTool>().unwrap();
    assert!(tool.tool_on_mount);
    assert_eq!(tool.stack_limits.cap_for(&ItemKind::new("Dirt")), StackCap::Limited(30));
    assert_eq!(tool.stack_limits.cap_for(&ItemKind::new("CopperOre")), StackCap::Limited(30));
    assert_eq!(tool.stack_limits.len(), 7);

    let recipe = &registries.recipes_for(&StationKind::new("AssemblyLine"))[0];
    assert_eq!(recipe.ingredients().len(), 8);
    assert_eq!(recipe.labor_calories(&Unskilled), Fixed::from_num(1250));
}

#[test]
fn test_bundled_mod_matches_builtin_content() {
    use techtree_core::content::steam_front_loader;

    let data = load_mod_file(&assets_dir().join("mods/steam_front_loader.ron")).unwrap();
    let entity_type = data.get_entity_type(steam_front_loader::NAME).unwrap();
    assert_eq!(entity_type.to_descriptor(), steam_front_loader::descriptor());

    let recipe = data.get_recipe(steam_front_loader::NAME).unwrap();
    assert_eq!(recipe.to_draft().unwrap(), steam_front_loader::recipe());

    let items: Vec<_> = data.items.iter().map(ItemData::to_descriptor).collect();
    assert_eq!(items, vec![steam_front_loader::item()]);
    assert_eq!(items[0].description, steam_front_loader::DESCRIPTION);
    assert_eq!(entity_type.to_descriptor().description, steam_front_loader::DESCRIPTION);
}

#[test]
fn test_failed_entries_are_skipped() {
    let dir = create_test_data_dir();
    let (registries, report) = load_data_directory(LoaderConfig::new(dir.path())).unwrap();

    assert_eq!(report.items, 3);
    assert_eq!(report.entity_types, vec!["Cart".to_string()]);
    assert_eq!(report.recipes, vec!["Cart".to_string()]);
    assert_eq!(report.failures.len(), 2);
    assert!(report.failures.iter().any(|f| f.entry == "BrokenCart"));
    assert!(report.failures.iter().any(|f| f.entry == "Nothing"));

    let cart = registries.instantiate(&EntityTypeId::new("Cart")).unwrap();
    let tool = cart.get::<VehicleTool>().unwrap();
    assert_eq!(tool.stack_limits.cap_for(&ItemKind::new("Dirt")), StackCap::Limited(50));
    assert_eq!(tool.stack_limits.cap_for(&ItemKind::new("Plank")), StackCap::Limited(5));
    assert!(registries.instantiate(&EntityTypeId::new("BrokenCart")).is_err());
}

#[test]
fn test_fail_fast_aborts() {
    let dir = create_test_data_dir();
    let result = load_data_directory(LoaderConfig::new(dir.path()).fail_fast(true));
    assert!(matches!(result, Err(LoadError::Entry { .. })));
}

#[test]
fn test_unparseable_mod_is_skipped() {
    let dir = create_test_data_dir();
    write(dir.path(), "mods/broken.ron", "ModData(name: ");

    let (_, report) = load_data_directory(LoaderConfig::new(dir.path())).unwrap();
    assert_eq!(report.mods, vec!["carts".to_string()]);
    assert!(report
        .failures
        .iter()
        .any(|f| f.source_file.ends_with("broken.ron")));
}

#[test]
fn test_duplicate_recipes_across_mods_are_kept() {
    let dir = create_test_data_dir();
    write(dir.path(), "mods/more_carts.ron", CART_MOD);

    let (registries, report) = load_data_directory(LoaderConfig::new(dir.path())).unwrap();
    assert_eq!(report.mods.len(), 2);
    assert_eq!(registries.recipes_for(&StationKind::new("Workbench")).len(), 2);
    assert_eq!(registries.components().len(), 1);
}

#[test]
fn test_load_items_reads_all_files() {
    let dir = create_test_data_dir();
    write(dir.path(), "items/extra.ron", r#"[(kind: "Wheel")]"#);
    write(dir.path(), "items/notes.txt", "not ron");

    let items = load_items(&dir.path().join("items")).unwrap();
    let kinds: Vec<_> = items.iter().map(|i| i.kind.as_str()).collect();
    assert_eq!(kinds, vec!["Wheel", "Dirt", "Plank", "Cart"]);
}

#[test]
fn test_pre_build_hook_applies_to_loaded_recipes() {
    let dir = create_test_data_dir();
    let hooks = RecipeHooks::new().pre_build(|draft| draft.experience(Fixed::from_num(7)));
    let (registries, _) = ModLoader::new(LoaderConfig::new(dir.path()))
        .with_hooks(hooks)
        .load()
        .unwrap();

    let recipe = &registries.recipes_for(&StationKind::new("Workbench"))[0];
    assert_eq!(recipe.experience(), Fixed::from_num(7));
}

#[test]
fn test_late_registration_of_mod_file() {
    let (registries, _) = load_data_directory(LoaderConfig::new(assets_dir())).unwrap();
    let live = LiveRegistries::new(registries);
    let before = live.snapshot();

    let dir = create_test_data_dir();
    let path = dir.path().join("mods/carts.ron");
    let data = load_mod_file(&path).unwrap();

    let mut late = live.late_registration();
    let mut loader = ModLoader::new(LoaderConfig::new(dir.path()));
    loader
        .register_mod(late.builder(), &path.display().to_string(), &data)
        .unwrap();
    let after = late.commit();

    assert!(after.components().contains(&EntityTypeId::new("Cart")));
    assert!(!before.components().contains(&EntityTypeId::new("Cart")));
    assert_eq!(loader.report().failures.len(), 2);
}

#[test]
fn test_late_registered_mod_items_reach_its_stack_tables() {
    const MUD_MOD: &str = r#"
#![enable(implicit_some)]
ModData(
    name: "mud",
    items: [(kind: "Mud", description: "Wet dirt.", tags: ["Diggable"])],
    stack_limits: [
        (entity_type: "Barrow", default_cap: 99, rules: [(matches: HasTag("Diggable"), cap: 5)]),
    ],
)
"#;
    let (registries, _) = load_data_directory(LoaderConfig::new(assets_dir())).unwrap();
    let live = LiveRegistries::new(registries);
    let data = ModData::from_ron(MUD_MOD, "mud.ron").unwrap();

    let mut late = live.late_registration();
    let mut loader = ModLoader::new(LoaderConfig::new(assets_dir()));
    loader.register_mod(late.builder(), "mud.ron", &data).unwrap();
    let after = late.commit();

    let mud = ItemKind::new("Mud");
    assert_eq!(after.items().get(&mud).unwrap().description, "Wet dirt.");

    let barrow = after.stack_limits_for(&EntityTypeId::new("Barrow"));
    assert_eq!(barrow.cap_for(&mud), StackCap::Limited(5));
    assert_eq!(barrow.cap_for(&ItemKind::new("Dirt")), StackCap::Limited(5));
    assert_eq!(barrow.cap_for(&ItemKind::new("Coal")), StackCap::Limited(99));
    assert_eq!(loader.report().items, after.items().len());
    assert!(loader.report().failures.is_empty());
}

#[test]
fn test_validate_reports_problems() {
    let report = validate_data_directory(&assets_dir()).unwrap();
    assert!(report.is_clean());

    let dir = create_test_data_dir();
    let report = validate_data_directory(dir.path()).unwrap();
    assert!(!report.is_clean());
}
