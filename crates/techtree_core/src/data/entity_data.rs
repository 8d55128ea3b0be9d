//! Entity type data structures for data-driven capability composition.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::capability::CapabilityKind;
use crate::entity::{EntityTypeDescriptor, InitStep};

/// Data-driven entity type declaration.
///
/// Converted into an [`EntityTypeDescriptor`]; registration still performs
/// the dependency check.
///
/// # Example RON
///
/// ```ron
/// EntityTypeData(
///     id: "SteamFrontLoader",
///     display_name: "Steam Front Loader",
///     description: "Small scale bucket loader.",
///     represented_item: "SteamFrontLoader",
///     required: [FuelSupply, Vehicle],
///     init_steps: [
///         (kind: FuelSupply, args: [Int(2), TextList(["Burnable Fuel"])]),
///         (kind: Vehicle, args: [Decimal(12.0), Decimal(1.2), Int(1)]),
///     ],
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityTypeData {
    /// Unique entity type identifier.
    pub id: String,

    /// Display name; defaults to the id.
    #[serde(default)]
    pub display_name: Option<String>,

    /// Description text.
    #[serde(default)]
    pub description: String,

    /// Item this entity represents.
    #[serde(default)]
    pub represented_item: Option<String>,

    /// Required capabilities.
    pub required: Vec<CapabilityKind>,

    /// Init steps, in execution order.
    #[serde(default)]
    pub init_steps: Vec<InitStep>,
}

impl EntityTypeData {
    /// Convert into a descriptor.
    ///
    /// Capabilities listed twice are only required once.
    #[must_use]
    pub fn to_descriptor(&self) -> EntityTypeDescriptor {
        let display_name = self.display_name.clone().unwrap_or_else(|| self.id.clone());
        let mut descriptor = EntityTypeDescriptor::new(self.id.as_str(), display_name)
            .with_description(self.description.as_str());
        for &kind in &self.required {
            if descriptor.required.contains(&kind) {
                warn!(entity_type = %self.id, capability = %kind, "Capability required twice");
            }
            descriptor = descriptor.require(kind);
        }
        if let Some(item) = &self.represented_item {
            descriptor = descriptor.with_represented_item(item.as_str());
        }
        descriptor.init_steps = self.init_steps.clone();
        descriptor
    }

    /// Check if this entity type requires a capability.
    #[must_use]
    pub fn requires(&self, kind: CapabilityKind) -> bool {
        self.required.contains(&kind)
    }
}
