//! Capability kinds, init parameter tuples, and the capability trait.
//!
//! A capability is one independently initialized behavior unit attached to
//! an entity (fuel supply, mover, tool, ...). Every kind has exactly one
//! concrete instance type; [`CapabilityKind::create`] allocates it and
//! [`Capability::initialize`] is its init entry point.

use std::any::Any;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::capabilities::{
    AirPollution, CustomText, FuelConsumption, FuelSupply, Minimap, MovableLink, StandaloneAuth,
    Vehicle, VehicleTool,
};
use crate::error::{CoreError, Result};
use crate::ids::{EntityTypeId, ItemKind};
use crate::math::{decimal_to_fixed, Fixed};
use crate::stack_limits::StackRestrictionRegistry;

/// Identifier for a capability type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CapabilityKind {
    /// Ownership and access rights for a standalone object.
    StandaloneAuth,
    /// Fuel inventory accepting tagged fuel items.
    FuelSupply,
    /// Fuel burn rate while operating.
    FuelConsumption,
    /// Link allowing the object to be moved as a whole.
    MovableLink,
    /// Air pollution emitted while operating.
    AirPollution,
    /// Driveable vehicle (speed, efficiency, seats).
    Vehicle,
    /// Player-editable text label.
    CustomText,
    /// Tool mounted on a vehicle, with its own inventory.
    VehicleTool,
    /// Minimap marker.
    Minimap,
}

impl CapabilityKind {
    /// Every capability kind, in declaration order.
    pub const ALL: [Self; 9] = [
        Self::StandaloneAuth,
        Self::FuelSupply,
        Self::FuelConsumption,
        Self::MovableLink,
        Self::AirPollution,
        Self::Vehicle,
        Self::CustomText,
        Self::VehicleTool,
        Self::Minimap,
    ];

    /// Get the stable name of this kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::StandaloneAuth => "StandaloneAuth",
            Self::FuelSupply => "FuelSupply",
            Self::FuelConsumption => "FuelConsumption",
            Self::MovableLink => "MovableLink",
            Self::AirPollution => "AirPollution",
            Self::Vehicle => "Vehicle",
            Self::CustomText => "CustomText",
            Self::VehicleTool => "VehicleTool",
            Self::Minimap => "Minimap",
        }
    }

    /// Allocate a fresh, uninitialized instance of this capability.
    #[must_use]
    pub fn create(self) -> Box<dyn Capability> {
        match self {
            Self::StandaloneAuth => Box::new(StandaloneAuth::default()),
            Self::FuelSupply => Box::new(FuelSupply::default()),
            Self::FuelConsumption => Box::new(FuelConsumption::default()),
            Self::MovableLink => Box::new(MovableLink::default()),
            Self::AirPollution => Box::new(AirPollution::default()),
            Self::Vehicle => Box::new(Vehicle::default()),
            Self::CustomText => Box::new(CustomText::default()),
            Self::VehicleTool => Box::new(VehicleTool::default()),
            Self::Minimap => Box::new(Minimap::default()),
        }
    }
}

impl fmt::Display for CapabilityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One positional value in an init parameter tuple.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InitArg {
    /// Whole number.
    Int(i64),
    /// Decimal, converted to [`Fixed`] by the capability.
    Decimal(f64),
    /// Single string.
    Text(String),
    /// List of strings.
    TextList(Vec<String>),
    /// Boolean flag.
    Flag(bool),
    /// Reference to an item kind.
    Item(ItemKind),
}

impl InitArg {
    fn type_name(&self) -> &'static str {
        match self {
            Self::Int(_) => "int",
            Self::Decimal(_) => "decimal",
            Self::Text(_) => "text",
            Self::TextList(_) => "text list",
            Self::Flag(_) => "flag",
            Self::Item(_) => "item",
        }
    }
}

/// Positional parameter tuple passed to a capability's init entry point.
///
/// Built with the `with_*` methods and read back with typed accessors that
/// report which parameter was wrong.
///
/// ```
/// use techtree_core::capability::InitArgs;
///
/// let args = InitArgs::new().with_int(2).with_text_list(["Burnable Fuel"]);
/// assert_eq!(args.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InitArgs(Vec<InitArg>);

impl InitArgs {
    /// Create an empty parameter tuple.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Append a raw argument.
    #[must_use]
    pub fn with(mut self, arg: InitArg) -> Self {
        self.0.push(arg);
        self
    }

    /// Append a whole number.
    #[must_use]
    pub fn with_int(self, value: i64) -> Self {
        self.with(InitArg::Int(value))
    }

    /// Append a decimal.
    #[must_use]
    pub fn with_decimal(self, value: f64) -> Self {
        self.with(InitArg::Decimal(value))
    }

    /// Append a string.
    #[must_use]
    pub fn with_text(self, value: impl Into<String>) -> Self {
        self.with(InitArg::Text(value.into()))
    }

    /// Append a list of strings.
    #[must_use]
    pub fn with_text_list<I, S>(self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with(InitArg::TextList(values.into_iter().map(Into::into).collect()))
    }

    /// Append a flag.
    #[must_use]
    pub fn with_flag(self, value: bool) -> Self {
        self.with(InitArg::Flag(value))
    }

    /// Append an item reference.
    #[must_use]
    pub fn with_item(self, item: impl Into<ItemKind>) -> Self {
        self.with(InitArg::Item(item.into()))
    }

    /// Number of arguments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if there are no arguments.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the raw arguments.
    pub fn iter(&self) -> impl Iterator<Item = &InitArg> {
        self.0.iter()
    }

    /// Fail unless the tuple has between `min` and `max` arguments.
    pub fn expect_arity(&self, kind: CapabilityKind, min: usize, max: usize) -> Result<()> {
        let len = self.0.len();
        if len < min || len > max {
            let expected = if min == max {
                format!("{min}")
            } else {
                format!("{min} to {max}")
            };
            return Err(CoreError::InvalidInitArgs {
                kind,
                reason: format!("expected {expected} arguments, got {len}"),
            });
        }
        Ok(())
    }

    fn arg(&self, kind: CapabilityKind, index: usize, name: &str) -> Result<&InitArg> {
        self.0.get(index).ok_or_else(|| CoreError::InvalidInitArgs {
            kind,
            reason: format!("missing argument {index} ({name})"),
        })
    }

    fn mismatch(
        kind: CapabilityKind,
        index: usize,
        name: &str,
        expected: &str,
        got: &InitArg,
    ) -> CoreError {
        CoreError::InvalidInitArgs {
            kind,
            reason: format!(
                "argument {index} ({name}) must be {expected}, got {}",
                got.type_name()
            ),
        }
    }

    /// Read a non-negative whole number that fits in `u32`.
    pub fn count(&self, kind: CapabilityKind, index: usize, name: &str) -> Result<u32> {
        match self.arg(kind, index, name)? {
            InitArg::Int(value) => u32::try_from(*value).map_err(|_| CoreError::InvalidInitArgs {
                kind,
                reason: format!("argument {index} ({name}) out of range: {value}"),
            }),
            other => Err(Self::mismatch(kind, index, name, "int", other)),
        }
    }

    /// Read a decimal as [`Fixed`]. Whole numbers are accepted too.
    pub fn fixed(&self, kind: CapabilityKind, index: usize, name: &str) -> Result<Fixed> {
        let value = match self.arg(kind, index, name)? {
            InitArg::Decimal(value) => *value,
            #[allow(clippy::cast_precision_loss)]
            InitArg::Int(value) => *value as f64,
            other => return Err(Self::mismatch(kind, index, name, "decimal", other)),
        };
        decimal_to_fixed(value).ok_or_else(|| CoreError::InvalidInitArgs {
            kind,
            reason: format!("argument {index} ({name}) out of range: {value}"),
        })
    }

    /// Read a list of strings. A single string is accepted as a one-element list.
    pub fn text_list(&self, kind: CapabilityKind, index: usize, name: &str) -> Result<Vec<String>> {
        match self.arg(kind, index, name)? {
            InitArg::TextList(values) => Ok(values.clone()),
            InitArg::Text(value) => Ok(vec![value.clone()]),
            other => Err(Self::mismatch(kind, index, name, "text list", other)),
        }
    }

    /// Read an item reference. A plain string is accepted as an item kind.
    pub fn item(&self, kind: CapabilityKind, index: usize, name: &str) -> Result<ItemKind> {
        match self.arg(kind, index, name)? {
            InitArg::Item(item) => Ok(item.clone()),
            InitArg::Text(value) => Ok(ItemKind::new(value.as_str())),
            other => Err(Self::mismatch(kind, index, name, "item", other)),
        }
    }

    /// Read an optional flag, falling back to `default` when absent.
    pub fn flag_or(
        &self,
        kind: CapabilityKind,
        index: usize,
        name: &str,
        default: bool,
    ) -> Result<bool> {
        match self.0.get(index) {
            None => Ok(default),
            Some(InitArg::Flag(value)) => Ok(*value),
            Some(other) => Err(Self::mismatch(kind, index, name, "flag", other)),
        }
    }
}

impl FromIterator<InitArg> for InitArgs {
    fn from_iter<T: IntoIterator<Item = InitArg>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Read-only services a capability may consult while initializing.
#[derive(Debug, Clone, Copy)]
pub struct InitContext<'a> {
    /// Entity type being constructed.
    pub entity_type: &'a EntityTypeId,
    /// Stack-limit tables, consulted by inventory-bearing capabilities.
    pub stack_limits: &'a StackRestrictionRegistry,
}

/// A live capability owned by exactly one entity instance.
pub trait Capability: Any + fmt::Debug + Send + Sync {
    /// The kind this instance implements.
    fn kind(&self) -> CapabilityKind;

    /// Init entry point. Called once per init step naming this kind, in the
    /// order the entity type declares.
    fn initialize(&mut self, args: &InitArgs, ctx: &InitContext<'_>) -> Result<()>;

    /// Upcast for typed access through [`crate::entity::EntityHandle::get`].
    fn as_any(&self) -> &dyn Any;
}

/// Capability types that statically know their kind.
pub trait CapabilityType: Capability {
    /// The kind implemented by this type.
    const KIND: CapabilityKind;
}
