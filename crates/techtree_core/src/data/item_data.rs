//! Item data structures for data-driven item declarations.

use serde::{Deserialize, Serialize};

use crate::items::ItemDescriptor;

/// Data-driven item declaration.
///
/// # Example RON
///
/// ```ron
/// ItemData(
///     kind: "Dirt",
///     display_name: "Dirt",
///     description: "Loose soil.",
///     tags: ["Block", "Diggable"],
///     weight: 10000,
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemData {
    /// Unique item identifier.
    pub kind: String,

    /// Display name; defaults to the kind.
    #[serde(default)]
    pub display_name: Option<String>,

    /// Description text.
    #[serde(default)]
    pub description: String,

    /// Semantic tags, including block attributes.
    #[serde(default)]
    pub tags: Vec<String>,

    /// Weight in grams.
    #[serde(default)]
    pub weight: u32,
}

impl ItemData {
    /// Convert into a runtime item descriptor.
    #[must_use]
    pub fn to_descriptor(&self) -> ItemDescriptor {
        let display_name = self.display_name.clone().unwrap_or_else(|| self.kind.clone());
        ItemDescriptor::new(self.kind.as_str(), display_name)
            .with_description(self.description.as_str())
            .with_tags(self.tags.iter().map(String::as_str))
            .with_weight(self.weight)
    }

    /// Check if this item has the specified tag.
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}
