//! Two-phase lifecycle for the shared registries.
//!
//! **Build phase.** A single [`RegistryBuilder`] owns every registry and is
//! mutated sequentially through `&mut self`. Nothing else can observe it.
//!
//! **Serve phase.** [`RegistryBuilder::finish`] turns it into [`Registries`],
//! which has no mutating methods. It is `Send + Sync` and is shared behind an
//! `Arc`; lookups take no locks.
//!
//! **Late registration.** [`LiveRegistries`] publishes snapshots. A late
//! registration takes the build-phase mutex, mutates a private copy of the
//! current snapshot, and swaps the new snapshot in on commit. Readers keep
//! whatever snapshot they already hold, so none of them ever sees a partially
//! applied registration.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock};

use tracing::info;

use crate::entity::{ComponentRegistry, EntityHandle, EntityTypeDescriptor};
use crate::error::Result;
use crate::ids::{EntityTypeId, StationKind};
use crate::items::{ItemCatalog, ItemDescriptor};
use crate::recipe::{RecipeCatalog, RecipeDefinition, RecipeDraft, RecipeHooks};
use crate::stack_limits::{StackCap, StackRestrictionRegistry, StackRestrictionTable, StackRule};

/// Build-phase owner of all registries.
#[derive(Debug, Clone, Default)]
pub struct RegistryBuilder {
    items: ItemCatalog,
    components: ComponentRegistry,
    recipes: RecipeCatalog,
    stack_limits: StackRestrictionRegistry,
}

impl RegistryBuilder {
    /// Start a build phase over a snapshot of the item catalog.
    #[must_use]
    pub fn new(items: ItemCatalog) -> Self {
        Self {
            items,
            components: ComponentRegistry::new(),
            recipes: RecipeCatalog::new(),
            stack_limits: StackRestrictionRegistry::new(),
        }
    }

    /// The item snapshot this build phase works from.
    #[must_use]
    pub fn items(&self) -> &ItemCatalog {
        &self.items
    }

    /// Add items to the snapshot.
    ///
    /// Only stack tables built afterwards see them. Items identical to an
    /// existing entry are left alone; a differing item of the same kind
    /// replaces it.
    pub fn add_items(&mut self, items: impl IntoIterator<Item = ItemDescriptor>) {
        for item in items {
            if self.items.get(&item.kind) != Some(&item) {
                self.items.insert(item);
            }
        }
    }

    /// Validate and register an entity type.
    pub fn register_entity_type(&mut self, descriptor: EntityTypeDescriptor) -> Result<()> {
        self.components.register(descriptor)
    }

    /// Build a recipe through `hooks` and register it under `station`.
    pub fn register_recipe(
        &mut self,
        station: StationKind,
        draft: RecipeDraft,
        hooks: &RecipeHooks,
    ) -> Result<Arc<RecipeDefinition>> {
        let recipe = hooks.build(draft)?;
        Ok(self.recipes.register(station, recipe))
    }

    /// Register an already built recipe under `station`.
    pub fn register_built_recipe(
        &mut self,
        station: StationKind,
        recipe: RecipeDefinition,
    ) -> Arc<RecipeDefinition> {
        self.recipes.register(station, recipe)
    }

    /// Derive and store the stack restrictions for `entity_type`.
    pub fn build_stack_limits(
        &mut self,
        entity_type: EntityTypeId,
        default_cap: StackCap,
        rules: &[StackRule],
    ) -> &StackRestrictionTable {
        self.stack_limits.build(entity_type, default_cap, rules, &self.items)
    }

    /// Registered entity types so far.
    #[must_use]
    pub fn components(&self) -> &ComponentRegistry {
        &self.components
    }

    /// Registered recipes so far.
    #[must_use]
    pub fn recipes(&self) -> &RecipeCatalog {
        &self.recipes
    }

    /// Stack tables built so far.
    #[must_use]
    pub fn stack_limits(&self) -> &StackRestrictionRegistry {
        &self.stack_limits
    }

    /// Close the build phase.
    #[must_use]
    pub fn finish(self) -> Registries {
        info!(
            items = self.items.len(),
            entity_types = self.components.len(),
            recipes = self.recipes.len(),
            stack_tables = self.stack_limits.len(),
            "Registries ready to serve"
        );
        Registries {
            items: self.items,
            components: self.components,
            recipes: self.recipes,
            stack_limits: self.stack_limits,
        }
    }
}

/// Serve-phase registries: read-only, shareable across threads.
#[derive(Debug, Clone)]
pub struct Registries {
    items: ItemCatalog,
    components: ComponentRegistry,
    recipes: RecipeCatalog,
    stack_limits: StackRestrictionRegistry,
}

impl Registries {
    /// Construct an instance of a registered entity type.
    pub fn instantiate(&self, entity_type: &EntityTypeId) -> Result<EntityHandle> {
        self.components.instantiate(entity_type, &self.stack_limits)
    }

    /// Stack restrictions for `entity_type`; unrestricted if none were built.
    #[must_use]
    pub fn stack_limits_for(&self, entity_type: &EntityTypeId) -> &StackRestrictionTable {
        self.stack_limits.lookup(entity_type)
    }

    /// Recipes craftable at `station`.
    #[must_use]
    pub fn recipes_for(&self, station: &StationKind) -> &[Arc<RecipeDefinition>] {
        self.recipes.recipes_for(station)
    }

    /// The item snapshot the registries were built from.
    #[must_use]
    pub fn items(&self) -> &ItemCatalog {
        &self.items
    }

    /// Registered entity types.
    #[must_use]
    pub fn components(&self) -> &ComponentRegistry {
        &self.components
    }

    /// The recipe catalog.
    #[must_use]
    pub fn recipes(&self) -> &RecipeCatalog {
        &self.recipes
    }

    /// All stack tables.
    #[must_use]
    pub fn stack_limits(&self) -> &StackRestrictionRegistry {
        &self.stack_limits
    }

    /// Reopen a copy of these registries for another build phase.
    #[must_use]
    pub fn to_builder(&self) -> RegistryBuilder {
        RegistryBuilder {
            items: self.items.clone(),
            components: self.components.clone(),
            recipes: self.recipes.clone(),
            stack_limits: self.stack_limits.clone(),
        }
    }
}

/// Published registries that still accept late, serialized registrations.
#[derive(Debug)]
pub struct LiveRegistries {
    current: RwLock<Arc<Registries>>,
    build_lock: Mutex<()>,
}

impl LiveRegistries {
    /// Publish the result of the initial build phase.
    #[must_use]
    pub fn new(registries: Registries) -> Self {
        Self {
            current: RwLock::new(Arc::new(registries)),
            build_lock: Mutex::new(()),
        }
    }

    /// Current snapshot. Cheap; the caller reads it without further locking.
    #[must_use]
    pub fn snapshot(&self) -> Arc<Registries> {
        Arc::clone(&self.current.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Enter a build phase for one late registration.
    ///
    /// Blocks while another late registration is in progress. Dropping the
    /// returned guard without [`LateRegistration::commit`] discards the changes.
    pub fn late_registration(&self) -> LateRegistration<'_> {
        let guard = self
            .build_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let builder = self.snapshot().to_builder();
        LateRegistration {
            live: self,
            builder,
            _guard: guard,
        }
    }
}

/// Exclusive build phase over a private copy of the live registries.
#[derive(Debug)]
pub struct LateRegistration<'a> {
    live: &'a LiveRegistries,
    builder: RegistryBuilder,
    _guard: MutexGuard<'a, ()>,
}

impl LateRegistration<'_> {
    /// The private builder to register into.
    pub fn builder(&mut self) -> &mut RegistryBuilder {
        &mut self.builder
    }

    /// Publish the new snapshot and leave the build phase.
    pub fn commit(self) -> Arc<Registries> {
        let published = Arc::new(self.builder.finish());
        let mut current = self
            .live
            .current
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *current = Arc::clone(&published);
        published
    }
}
