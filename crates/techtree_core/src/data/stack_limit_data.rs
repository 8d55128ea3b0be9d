//! Stack restriction data structures.

use serde::{Deserialize, Serialize};

use crate::ids::EntityTypeId;
use crate::items::ItemTagPredicate;
use crate::stack_limits::{StackCap, StackRule};

/// Tag predicate as written in data files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TagMatch {
    /// Items carrying this tag.
    HasTag(String),
    /// Items carrying every listed tag.
    AllOf(Vec<String>),
    /// Items carrying at least one listed tag.
    AnyOf(Vec<String>),
}

impl TagMatch {
    /// Convert into a runtime predicate.
    #[must_use]
    pub fn to_predicate(&self) -> ItemTagPredicate {
        match self {
            Self::HasTag(tag) => ItemTagPredicate::has_tag(tag.as_str()),
            Self::AllOf(tags) => ItemTagPredicate::all_of(tags.iter().map(String::as_str)),
            Self::AnyOf(tags) => ItemTagPredicate::any_of(tags.iter().map(String::as_str)),
        }
    }
}

/// One stacking rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackRuleData {
    /// Which items the rule applies to.
    pub matches: TagMatch,
    /// Stack cap for matching items.
    pub cap: u32,
}

/// Data-driven stack restrictions for one entity type.
///
/// Rules run in order; a later rule overrides an earlier one for the same
/// item.
///
/// # Example RON
///
/// ```ron
/// StackLimitData(
///     entity_type: "SteamFrontLoader",
///     default_cap: 30,
///     rules: [
///         (matches: HasTag("Diggable"), cap: 30),
///         (matches: HasTag("Minable"), cap: 30),
///     ],
/// )
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackLimitData {
    /// Entity type the table belongs to.
    pub entity_type: String,

    /// Cap for items no rule matched; unrestricted when absent.
    #[serde(default)]
    pub default_cap: Option<u32>,

    /// Ordered rules.
    #[serde(default)]
    pub rules: Vec<StackRuleData>,
}

impl StackLimitData {
    /// Entity type identifier.
    #[must_use]
    pub fn entity_type(&self) -> EntityTypeId {
        EntityTypeId::new(self.entity_type.as_str())
    }

    /// Default cap as a runtime value.
    #[must_use]
    pub fn default_cap(&self) -> StackCap {
        self.default_cap.map_or(StackCap::Unrestricted, StackCap::Limited)
    }

    /// Rules as runtime values, in order.
    #[must_use]
    pub fn to_rules(&self) -> Vec<StackRule> {
        self.rules
            .iter()
            .map(|rule| StackRule::new(rule.matches.to_predicate(), rule.cap))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::items::{ItemCatalog, ItemDescriptor};
    use crate::stack_limits::StackRestrictionTable;

    #[test]
    fn test_parse_and_build_table() {
        let text = r#"
            #![enable(implicit_some)]
            (
                entity_type: "Barrow",
                default_cap: 10,
                rules: [
                    (matches: AnyOf(["Diggable", "Minable"]), cap: 40),
                    (matches: AllOf(["Minable", "Heavy"]), cap: 5),
                ],
            )
        "#;
        let data: StackLimitData = ron::from_str(text).unwrap();
        assert_eq!(data.entity_type().as_str(), "Barrow");
        assert_eq!(data.default_cap(), StackCap::Limited(10));

        let catalog = ItemCatalog::from_items([
            ItemDescriptor::new("Dirt", "Dirt").with_tags(["Diggable"]),
            ItemDescriptor::new("IronOre", "Iron Ore").with_tags(["Minable", "Heavy"]),
            ItemDescriptor::new("Apple", "Apple"),
        ]);
        let table = StackRestrictionTable::build(data.default_cap(), &data.to_rules(), &catalog);

        assert_eq!(table.cap_for(&"Dirt".into()), StackCap::Limited(40));
        assert_eq!(table.cap_for(&"IronOre".into()), StackCap::Limited(5));
        assert_eq!(table.cap_for(&"Apple".into()), StackCap::Limited(10));
    }

    #[test]
    fn test_missing_default_is_unrestricted() {
        let data: StackLimitData = ron::from_str(r#"(entity_type: "Cart")"#).unwrap();
        assert_eq!(data.default_cap(), StackCap::Unrestricted);
        assert!(data.to_rules().is_empty());
    }
}
