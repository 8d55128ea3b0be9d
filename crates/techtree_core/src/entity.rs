//! Entity-type descriptors, the component registry, and entity handles.
//!
//! An entity type declares the capabilities it requires and an ordered list
//! of init steps. Registration checks eagerly that every init step targets a
//! required capability. Instantiation allocates one instance per required
//! capability, then runs the init steps strictly in declared order. An entity
//! is only handed out once every step succeeded.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::capability::{Capability, CapabilityKind, CapabilityType, InitArgs, InitContext};
use crate::error::{CoreError, Result};
use crate::ids::{EntityTypeId, ItemKind};
use crate::stack_limits::StackRestrictionRegistry;

/// One init step: which capability to initialize and with what arguments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InitStep {
    /// Target capability.
    pub kind: CapabilityKind,
    /// Positional parameter tuple for the capability's init entry point.
    #[serde(default)]
    pub args: InitArgs,
}

impl InitStep {
    /// Create a new init step.
    #[must_use]
    pub fn new(kind: CapabilityKind, args: InitArgs) -> Self {
        Self { kind, args }
    }
}

/// Blueprint for an entity type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityTypeDescriptor {
    /// Unique entity type identifier.
    pub id: EntityTypeId,
    /// Display name, passed through untranslated.
    pub display_name: String,
    /// Description text, passed through untranslated.
    #[serde(default)]
    pub description: String,
    /// Item this entity represents when picked up, if any.
    #[serde(default)]
    pub represented_item: Option<ItemKind>,
    /// Capabilities every instance carries.
    pub required: BTreeSet<CapabilityKind>,
    /// Init steps, run in this order.
    #[serde(default)]
    pub init_steps: Vec<InitStep>,
}

impl EntityTypeDescriptor {
    /// Create a descriptor with no capabilities.
    #[must_use]
    pub fn new(id: impl Into<EntityTypeId>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            description: String::new(),
            represented_item: None,
            required: BTreeSet::new(),
            init_steps: Vec::new(),
        }
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the represented item.
    #[must_use]
    pub fn with_represented_item(mut self, item: impl Into<ItemKind>) -> Self {
        self.represented_item = Some(item.into());
        self
    }

    /// Require a capability.
    #[must_use]
    pub fn require(mut self, kind: CapabilityKind) -> Self {
        self.required.insert(kind);
        self
    }

    /// Require several capabilities.
    #[must_use]
    pub fn require_all(mut self, kinds: impl IntoIterator<Item = CapabilityKind>) -> Self {
        self.required.extend(kinds);
        self
    }

    /// Append an init step.
    #[must_use]
    pub fn step(mut self, kind: CapabilityKind, args: InitArgs) -> Self {
        self.init_steps.push(InitStep::new(kind, args));
        self
    }

    /// Check that every init step targets a required capability.
    ///
    /// Fails with [`CoreError::Dependency`] naming the first missing kind in
    /// step order.
    pub fn validate(&self) -> Result<()> {
        if let Some(step) = self
            .init_steps
            .iter()
            .find(|step| !self.required.contains(&step.kind))
        {
            return Err(CoreError::Dependency {
                entity_type: self.id.to_string(),
                missing: step.kind,
            });
        }
        Ok(())
    }
}

/// A fully constructed entity instance.
///
/// Capabilities are only reachable through [`EntityHandle::capability`] and
/// [`EntityHandle::get`].
#[derive(Debug)]
pub struct EntityHandle {
    entity_type: EntityTypeId,
    display_name: String,
    description: String,
    capabilities: BTreeMap<CapabilityKind, Box<dyn Capability>>,
    init_order: Vec<CapabilityKind>,
}

impl EntityHandle {
    /// Construct an entity from a descriptor.
    ///
    /// Allocates one instance per required capability, then runs the init
    /// steps in order. The descriptor is not re-validated here: a step naming
    /// a capability without an instance aborts construction with
    /// [`CoreError::MissingCapability`].
    pub fn build(
        descriptor: &EntityTypeDescriptor,
        stack_limits: &StackRestrictionRegistry,
    ) -> Result<Self> {
        let mut capabilities: BTreeMap<CapabilityKind, Box<dyn Capability>> = descriptor
            .required
            .iter()
            .map(|&kind| (kind, kind.create()))
            .collect();

        let ctx = InitContext {
            entity_type: &descriptor.id,
            stack_limits,
        };
        let mut init_order = Vec::with_capacity(descriptor.init_steps.len());

        for step in &descriptor.init_steps {
            let capability =
                capabilities
                    .get_mut(&step.kind)
                    .ok_or_else(|| CoreError::MissingCapability {
                        entity_type: descriptor.id.to_string(),
                        kind: step.kind,
                    })?;
            capability.initialize(&step.args, &ctx)?;
            init_order.push(step.kind);
            debug!(
                entity_type = %descriptor.id,
                capability = %step.kind,
                args = step.args.len(),
                "Initialized capability"
            );
        }

        Ok(Self {
            entity_type: descriptor.id.clone(),
            display_name: descriptor.display_name.clone(),
            description: descriptor.description.clone(),
            capabilities,
            init_order,
        })
    }

    /// Entity type of this instance.
    #[must_use]
    pub fn entity_type(&self) -> &EntityTypeId {
        &self.entity_type
    }

    /// Display name of this instance's type.
    #[must_use]
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Description of this instance's type.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Get a capability by kind.
    pub fn capability(&self, kind: CapabilityKind) -> Result<&dyn Capability> {
        self.capabilities
            .get(&kind)
            .map(|capability| &**capability)
            .ok_or_else(|| CoreError::NotPresent {
                entity_type: self.entity_type.to_string(),
                kind,
            })
    }

    /// Get a capability by its concrete type.
    pub fn get<T: CapabilityType>(&self) -> Result<&T> {
        let capability = self.capability(T::KIND)?;
        capability
            .as_any()
            .downcast_ref::<T>()
            .ok_or_else(|| CoreError::NotPresent {
                entity_type: self.entity_type.to_string(),
                kind: T::KIND,
            })
    }

    /// Check if this entity carries a capability.
    #[must_use]
    pub fn has(&self, kind: CapabilityKind) -> bool {
        self.capabilities.contains_key(&kind)
    }

    /// Capabilities carried by this entity, in kind order.
    pub fn kinds(&self) -> impl Iterator<Item = CapabilityKind> + '_ {
        self.capabilities.keys().copied()
    }

    /// The capabilities whose init steps ran, in execution order.
    #[must_use]
    pub fn init_order(&self) -> &[CapabilityKind] {
        &self.init_order
    }
}

/// Registry of validated entity types.
#[derive(Debug, Clone, Default)]
pub struct ComponentRegistry {
    entity_types: BTreeMap<EntityTypeId, EntityTypeDescriptor>,
}

impl ComponentRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entity_types: BTreeMap::new(),
        }
    }

    /// Validate and register an entity type.
    ///
    /// Fails with [`CoreError::Dependency`] if an init step targets a
    /// capability the type does not require. Re-registering an id replaces
    /// the earlier descriptor.
    pub fn register(&mut self, descriptor: EntityTypeDescriptor) -> Result<()> {
        descriptor.validate()?;

        if self.entity_types.contains_key(&descriptor.id) {
            warn!(entity_type = %descriptor.id, "Duplicate entity type, overwriting");
        }
        info!(
            entity_type = %descriptor.id,
            capabilities = descriptor.required.len(),
            init_steps = descriptor.init_steps.len(),
            "Registered entity type"
        );
        self.entity_types.insert(descriptor.id.clone(), descriptor);
        Ok(())
    }

    /// Construct an instance of a registered entity type.
    pub fn instantiate(
        &self,
        entity_type: &EntityTypeId,
        stack_limits: &StackRestrictionRegistry,
    ) -> Result<EntityHandle> {
        let descriptor = self
            .get(entity_type)
            .ok_or_else(|| CoreError::UnknownEntityType(entity_type.to_string()))?;
        EntityHandle::build(descriptor, stack_limits)
    }

    /// Get a registered descriptor.
    #[must_use]
    pub fn get(&self, entity_type: &EntityTypeId) -> Option<&EntityTypeDescriptor> {
        self.entity_types.get(entity_type)
    }

    /// Check if an entity type is registered.
    #[must_use]
    pub fn contains(&self, entity_type: &EntityTypeId) -> bool {
        self.entity_types.contains_key(entity_type)
    }

    /// All registered descriptors, in id order.
    pub fn all(&self) -> impl Iterator<Item = &EntityTypeDescriptor> {
        self.entity_types.values()
    }

    /// Number of registered entity types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entity_types.len()
    }

    /// Check if the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entity_types.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::{FuelSupply, Minimap, VehicleTool};
    use crate::ids::ItemTag;

    fn create_loader() -> EntityTypeDescriptor {
        EntityTypeDescriptor::new("Loader", "Loader")
            .with_description("Small bucket loader.")
            .require_all([CapabilityKind::FuelSupply, CapabilityKind::VehicleTool])
            .step(
                CapabilityKind::FuelSupply,
                InitArgs::new().with_int(2).with_text_list(["Burnable Fuel"]),
            )
            .step(
                CapabilityKind::VehicleTool,
                InitArgs::new()
                    .with_int(4)
                    .with_int(2_800_000)
                    .with_item("Dirt")
                    .with_int(100)
                    .with_int(200)
                    .with_int(0),
            )
    }

    #[test]
    fn test_register_valid_descriptor() {
        let mut registry = ComponentRegistry::new();
        registry.register(create_loader()).unwrap();
        assert!(registry.contains(&"Loader".into()));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_register_rejects_undeclared_step() {
        let descriptor = create_loader().step(CapabilityKind::Vehicle, InitArgs::new());
        let mut registry = ComponentRegistry::new();

        let err = registry.register(descriptor).unwrap_err();
        assert_eq!(
            err,
            CoreError::Dependency {
                entity_type: "Loader".to_string(),
                missing: CapabilityKind::Vehicle,
            }
        );
        assert!(registry.is_empty());
    }

    #[test]
    fn test_required_without_step_is_allowed() {
        let descriptor = create_loader().require(CapabilityKind::Minimap);
        let mut registry = ComponentRegistry::new();
        registry.register(descriptor).unwrap();

        let entity = registry
            .instantiate(&"Loader".into(), &StackRestrictionRegistry::new())
            .unwrap();
        assert!(!entity.get::<Minimap>().unwrap().initialized);
    }

    #[test]
    fn test_instantiate_configures_capabilities() {
        let mut registry = ComponentRegistry::new();
        registry.register(create_loader()).unwrap();

        let entity = registry
            .instantiate(&"Loader".into(), &StackRestrictionRegistry::new())
            .unwrap();
        let fuel = entity.get::<FuelSupply>().unwrap();
        assert_eq!(fuel.slots, 2);
        assert_eq!(fuel.fuel_tags, vec![ItemTag::new("Burnable Fuel")]);

        let by_kind = entity.capability(CapabilityKind::FuelSupply).unwrap();
        assert_eq!(by_kind.kind(), CapabilityKind::FuelSupply);
        assert_eq!(entity.get::<VehicleTool>().unwrap().inventory_slots, 4);
        assert_eq!(entity.description(), "Small bucket loader.");
    }

    #[test]
    fn test_accessor_fails_for_unrequired_kind() {
        let mut registry = ComponentRegistry::new();
        registry.register(create_loader()).unwrap();
        let entity = registry
            .instantiate(&"Loader".into(), &StackRestrictionRegistry::new())
            .unwrap();

        let err = entity.capability(CapabilityKind::Vehicle).unwrap_err();
        assert_eq!(
            err,
            CoreError::NotPresent {
                entity_type: "Loader".to_string(),
                kind: CapabilityKind::Vehicle,
            }
        );
        assert!(entity.get::<Minimap>().is_err());
    }

    #[test]
    fn test_init_steps_run_in_declared_order() {
        let descriptor = EntityTypeDescriptor::new("Cart", "Cart")
            .require_all([CapabilityKind::CustomText, CapabilityKind::AirPollution])
            .step(CapabilityKind::CustomText, InitArgs::new().with_int(30))
            .step(CapabilityKind::AirPollution, InitArgs::new().with_decimal(0.5))
            .step(CapabilityKind::CustomText, InitArgs::new().with_int(10));
        let entity = EntityHandle::build(&descriptor, &StackRestrictionRegistry::new()).unwrap();

        assert_eq!(
            entity.init_order(),
            [
                CapabilityKind::CustomText,
                CapabilityKind::AirPollution,
                CapabilityKind::CustomText,
            ]
        );
        // The last step for a kind is the one that sticks
        let text = entity.get::<crate::capabilities::CustomText>().unwrap();
        assert_eq!(text.max_length, 10);
    }

    #[test]
    fn test_build_unvalidated_descriptor_fails_missing_capability() {
        let mut descriptor = create_loader();
        descriptor.required.remove(&CapabilityKind::VehicleTool);

        let err = EntityHandle::build(&descriptor, &StackRestrictionRegistry::new()).unwrap_err();
        assert_eq!(
            err,
            CoreError::MissingCapability {
                entity_type: "Loader".to_string(),
                kind: CapabilityKind::VehicleTool,
            }
        );
    }

    #[test]
    fn test_bad_init_args_abort_construction() {
        let descriptor = EntityTypeDescriptor::new("Cart", "Cart")
            .require(CapabilityKind::CustomText)
            .step(CapabilityKind::CustomText, InitArgs::new().with_text("thirty"));
        let mut registry = ComponentRegistry::new();
        registry.register(descriptor).unwrap();

        let result = registry.instantiate(&"Cart".into(), &StackRestrictionRegistry::new());
        assert!(matches!(result, Err(CoreError::InvalidInitArgs { .. })));
    }

    #[test]
    fn test_instantiate_unknown_type() {
        let registry = ComponentRegistry::new();
        let result = registry.instantiate(&"Ghost".into(), &StackRestrictionRegistry::new());
        assert!(matches!(result, Err(CoreError::UnknownEntityType(id)) if id == "Ghost"));
    }

    #[test]
    fn test_descriptor_ron_round_trip() {
        let text = ron::to_string(&create_loader()).unwrap();
        let back: EntityTypeDescriptor = ron::from_str(&text).unwrap();
        assert_eq!(back, create_loader());
    }
}
