//! Built-in capability instances.
//!
//! Each type stores only the configuration its init entry point receives.
//! Runtime behavior (burning fuel, driving, digging) belongs to the host.

use std::any::Any;

use serde::Serialize;
use tracing::trace;

use crate::capability::{Capability, CapabilityKind, CapabilityType, InitArgs, InitContext};
use crate::error::Result;
use crate::ids::{ItemKind, ItemTag};
use crate::math::{fixed_serde, Fixed};
use crate::stack_limits::StackRestrictionTable;

macro_rules! capability_type {
    ($ty:ident, $kind:ident) => {
        impl CapabilityType for $ty {
            const KIND: CapabilityKind = CapabilityKind::$kind;
        }
    };
}

/// Capabilities with an empty parameter tuple.
macro_rules! marker_capability {
    ($(#[$meta:meta])* $ty:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
        pub struct $ty {
            /// Whether the init entry point has run.
            pub initialized: bool,
        }

        capability_type!($ty, $ty);

        impl Capability for $ty {
            fn kind(&self) -> CapabilityKind {
                Self::KIND
            }

            fn initialize(&mut self, args: &InitArgs, _ctx: &InitContext<'_>) -> Result<()> {
                args.expect_arity(Self::KIND, 0, 0)?;
                self.initialized = true;
                Ok(())
            }

            fn as_any(&self) -> &dyn Any {
                self
            }
        }
    };
}

marker_capability!(
    /// Ownership and access rights for a standalone object.
    StandaloneAuth
);

marker_capability!(
    /// Lets the object be picked up and moved as a whole.
    MovableLink
);

marker_capability!(
    /// Shows the object on the minimap.
    Minimap
);

/// Fuel inventory: number of slots and the fuel tags it accepts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FuelSupply {
    /// Number of fuel slots.
    pub slots: u32,
    /// Item tags accepted as fuel.
    pub fuel_tags: Vec<ItemTag>,
}

capability_type!(FuelSupply, FuelSupply);

impl FuelSupply {
    /// Check if an item tag is accepted as fuel.
    #[must_use]
    pub fn accepts(&self, tag: &ItemTag) -> bool {
        self.fuel_tags.contains(tag)
    }
}

impl Capability for FuelSupply {
    fn kind(&self) -> CapabilityKind {
        Self::KIND
    }

    fn initialize(&mut self, args: &InitArgs, _ctx: &InitContext<'_>) -> Result<()> {
        args.expect_arity(Self::KIND, 2, 2)?;
        self.slots = args.count(Self::KIND, 0, "slots")?;
        self.fuel_tags = args
            .text_list(Self::KIND, 1, "fuel_tags")?
            .into_iter()
            .map(ItemTag::from)
            .collect();
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Fuel burn rate while the object is operating.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FuelConsumption {
    /// Energy drawn per second, in joules.
    #[serde(with = "fixed_serde")]
    pub joules_per_second: Fixed,
}

capability_type!(FuelConsumption, FuelConsumption);

impl Capability for FuelConsumption {
    fn kind(&self) -> CapabilityKind {
        Self::KIND
    }

    fn initialize(&mut self, args: &InitArgs, _ctx: &InitContext<'_>) -> Result<()> {
        args.expect_arity(Self::KIND, 1, 1)?;
        self.joules_per_second = args.fixed(Self::KIND, 0, "joules_per_second")?;
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Air pollution emitted while operating.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AirPollution {
    /// Pollution emitted per second.
    #[serde(with = "fixed_serde")]
    pub per_second: Fixed,
}

capability_type!(AirPollution, AirPollution);

impl Capability for AirPollution {
    fn kind(&self) -> CapabilityKind {
        Self::KIND
    }

    fn initialize(&mut self, args: &InitArgs, _ctx: &InitContext<'_>) -> Result<()> {
        args.expect_arity(Self::KIND, 1, 1)?;
        self.per_second = args.fixed(Self::KIND, 0, "per_second")?;
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Driveable vehicle settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Vehicle {
    /// Top speed.
    #[serde(with = "fixed_serde")]
    pub max_speed: Fixed,
    /// Fuel efficiency multiplier.
    #[serde(with = "fixed_serde")]
    pub efficiency: Fixed,
    /// Number of seats.
    pub seats: u32,
}

capability_type!(Vehicle, Vehicle);

impl Capability for Vehicle {
    fn kind(&self) -> CapabilityKind {
        Self::KIND
    }

    fn initialize(&mut self, args: &InitArgs, _ctx: &InitContext<'_>) -> Result<()> {
        args.expect_arity(Self::KIND, 3, 3)?;
        self.max_speed = args.fixed(Self::KIND, 0, "max_speed")?;
        self.efficiency = args.fixed(Self::KIND, 1, "efficiency")?;
        self.seats = args.count(Self::KIND, 2, "seats")?;
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Player-editable text label.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CustomText {
    /// Maximum text length in characters.
    pub max_length: u32,
}

capability_type!(CustomText, CustomText);

impl Capability for CustomText {
    fn kind(&self) -> CapabilityKind {
        Self::KIND
    }

    fn initialize(&mut self, args: &InitArgs, _ctx: &InitContext<'_>) -> Result<()> {
        args.expect_arity(Self::KIND, 1, 1)?;
        self.max_length = args.count(Self::KIND, 0, "max_length")?;
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Tool mounted on a vehicle, with its own restricted inventory.
///
/// Init parameters, in order: inventory slots, max weight, default item,
/// calories per action, experience per action, pollution per action, and an
/// optional tool-on-mount flag. The stack restrictions are not a parameter;
/// they come from the stack-limit table registered for the entity type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VehicleTool {
    /// Number of inventory slots.
    pub inventory_slots: u32,
    /// Maximum carried weight in grams.
    pub max_weight: u32,
    /// Item the tool collects by default.
    pub default_item: Option<ItemKind>,
    /// Calories burned per tool action.
    pub calories_per_action: u32,
    /// Experience granted per tool action.
    pub experience_per_action: u32,
    /// Pollution emitted per tool action.
    pub pollution_per_action: u32,
    /// Whether the tool is equipped as soon as a driver mounts.
    pub tool_on_mount: bool,
    /// Stacking limits for the tool inventory.
    pub stack_limits: StackRestrictionTable,
}

capability_type!(VehicleTool, VehicleTool);

impl Capability for VehicleTool {
    fn kind(&self) -> CapabilityKind {
        Self::KIND
    }

    fn initialize(&mut self, args: &InitArgs, ctx: &InitContext<'_>) -> Result<()> {
        args.expect_arity(Self::KIND, 6, 7)?;
        self.inventory_slots = args.count(Self::KIND, 0, "inventory_slots")?;
        self.max_weight = args.count(Self::KIND, 1, "max_weight")?;
        self.default_item = Some(args.item(Self::KIND, 2, "default_item")?);
        self.calories_per_action = args.count(Self::KIND, 3, "calories_per_action")?;
        self.experience_per_action = args.count(Self::KIND, 4, "experience_per_action")?;
        self.pollution_per_action = args.count(Self::KIND, 5, "pollution_per_action")?;
        self.tool_on_mount = args.flag_or(Self::KIND, 6, "tool_on_mount", false)?;
        self.stack_limits = ctx.stack_limits.lookup(ctx.entity_type).clone();
        trace!(
            entity_type = %ctx.entity_type,
            restricted_items = self.stack_limits.len(),
            "Vehicle tool picked up stack restrictions"
        );
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
