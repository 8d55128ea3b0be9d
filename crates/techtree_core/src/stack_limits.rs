//! Per-entity-type inventory stacking limits.
//!
//! A [`StackRestrictionTable`] is derived once from the item catalog snapshot
//! by running an ordered list of tag rules. Rules are applied in order and a
//! later rule replaces the cap an earlier rule gave the same item.
//!
//! [`StackRestrictionRegistry::lookup`] never fails: entity types without a
//! table get [`StackRestrictionTable::UNRESTRICTED`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::ids::{EntityTypeId, ItemKind};
use crate::items::{ItemCatalog, ItemTagPredicate};

/// How many items of one kind may share an inventory slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum StackCap {
    /// The item's own stack size applies.
    #[default]
    Unrestricted,
    /// At most this many items per slot.
    Limited(u32),
}

impl StackCap {
    /// Resolve the cap against an item's natural stack size.
    #[must_use]
    pub const fn apply(self, natural_stack: u32) -> u32 {
        match self {
            Self::Unrestricted => natural_stack,
            Self::Limited(cap) => cap,
        }
    }
}

/// One ordered stacking rule: every item matching `predicate` gets `cap`.
#[derive(Debug, Clone)]
pub struct StackRule {
    /// Which items the rule applies to.
    pub predicate: ItemTagPredicate,
    /// Stack cap for matching items.
    pub cap: u32,
}

impl StackRule {
    /// Create a new rule.
    #[must_use]
    pub fn new(predicate: ItemTagPredicate, cap: u32) -> Self {
        Self { predicate, cap }
    }
}

/// Concrete item → cap assignment for one entity type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StackRestrictionTable {
    default_cap: StackCap,
    caps: BTreeMap<ItemKind, u32>,
}

impl StackRestrictionTable {
    /// The table returned for entity types with no registered restrictions.
    pub const UNRESTRICTED: Self = Self {
        default_cap: StackCap::Unrestricted,
        caps: BTreeMap::new(),
    };

    /// Create a table with only a default cap.
    #[must_use]
    pub const fn with_default(default_cap: StackCap) -> Self {
        Self {
            default_cap,
            caps: BTreeMap::new(),
        }
    }

    /// Build a table by running `rules` in order over the catalog snapshot.
    ///
    /// Later rules override earlier ones for items matched by both.
    #[must_use]
    pub fn build(default_cap: StackCap, rules: &[StackRule], catalog: &ItemCatalog) -> Self {
        let mut table = Self::with_default(default_cap);
        for rule in rules {
            let mut matched = 0usize;
            for item in catalog.matching(&rule.predicate) {
                matched += 1;
                if let Some(previous) = table.caps.insert(item.kind.clone(), rule.cap) {
                    if previous != rule.cap {
                        debug!(
                            item = %item.kind,
                            rule = rule.predicate.name(),
                            previous,
                            cap = rule.cap,
                            "Later stack rule overrides earlier cap"
                        );
                    }
                }
            }
            if matched == 0 {
                debug!(rule = rule.predicate.name(), "Stack rule matched no items");
            }
        }
        table
    }

    /// Cap for items no rule matched.
    #[must_use]
    pub const fn default_cap(&self) -> StackCap {
        self.default_cap
    }

    /// Cap that applies to the given item.
    #[must_use]
    pub fn cap_for(&self, item: &ItemKind) -> StackCap {
        self.caps
            .get(item)
            .map_or(self.default_cap, |&cap| StackCap::Limited(cap))
    }

    /// Items with an explicit cap, in item-kind order.
    pub fn restricted_items(&self) -> impl Iterator<Item = (&ItemKind, u32)> {
        self.caps.iter().map(|(kind, &cap)| (kind, cap))
    }

    /// Number of items with an explicit cap.
    #[must_use]
    pub fn len(&self) -> usize {
        self.caps.len()
    }

    /// Check if no item has an explicit cap.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.caps.is_empty()
    }

    /// Check if this table imposes no limits at all.
    #[must_use]
    pub fn is_unrestricted(&self) -> bool {
        self.default_cap == StackCap::Unrestricted && self.caps.is_empty()
    }
}

impl Default for StackRestrictionTable {
    fn default() -> Self {
        Self::UNRESTRICTED
    }
}

static UNRESTRICTED_TABLE: StackRestrictionTable = StackRestrictionTable::UNRESTRICTED;

/// Stack tables for every entity type that needs custom stacking.
#[derive(Debug, Clone, Default)]
pub struct StackRestrictionRegistry {
    tables: BTreeMap<EntityTypeId, StackRestrictionTable>,
}

impl StackRestrictionRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            tables: BTreeMap::new(),
        }
    }

    /// Build a table from the catalog snapshot and store it for `entity_type`.
    pub fn build(
        &mut self,
        entity_type: EntityTypeId,
        default_cap: StackCap,
        rules: &[StackRule],
        catalog: &ItemCatalog,
    ) -> &StackRestrictionTable {
        let table = StackRestrictionTable::build(default_cap, rules, catalog);
        info!(
            entity_type = %entity_type,
            rules = rules.len(),
            restricted_items = table.len(),
            "Built stack restriction table"
        );
        self.insert(entity_type.clone(), table);
        &self.tables[&entity_type]
    }

    /// Store a prebuilt table.
    pub fn insert(&mut self, entity_type: EntityTypeId, table: StackRestrictionTable) {
        if self.tables.contains_key(&entity_type) {
            warn!(entity_type = %entity_type, "Duplicate stack restriction table, overwriting");
        }
        self.tables.insert(entity_type, table);
    }

    /// Table for `entity_type`, or the unrestricted table if none was built.
    #[must_use]
    pub fn lookup(&self, entity_type: &EntityTypeId) -> &StackRestrictionTable {
        self.tables.get(entity_type).unwrap_or(&UNRESTRICTED_TABLE)
    }

    /// Check if a table was built for `entity_type`.
    #[must_use]
    pub fn contains(&self, entity_type: &EntityTypeId) -> bool {
        self.tables.contains_key(entity_type)
    }

    /// Entity types with a table.
    pub fn entity_types(&self) -> impl Iterator<Item = &EntityTypeId> {
        self.tables.keys()
    }

    /// Number of tables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    /// Check if the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::items::ItemDescriptor;

    fn create_test_catalog() -> ItemCatalog {
        ItemCatalog::from_items([
            ItemDescriptor::new("Dirt", "Dirt").with_tags(["Diggable"]),
            ItemDescriptor::new("Stone", "Stone").with_tags(["Minable"]),
            ItemDescriptor::new("Clay", "Clay").with_tags(["Diggable", "Minable"]),
            ItemDescriptor::new("Log", "Log"),
        ])
    }

    #[test]
    fn test_stack_cap_apply() {
        assert_eq!(StackCap::Unrestricted.apply(100), 100);
        assert_eq!(StackCap::Limited(30).apply(100), 30);
    }

    #[test]
    fn test_last_rule_wins_when_caps_agree() {
        let catalog = create_test_catalog();
        let rules = [
            StackRule::new(ItemTagPredicate::has_tag("Diggable"), 30),
            StackRule::new(ItemTagPredicate::has_tag("Minable"), 30),
        ];
        let table = StackRestrictionTable::build(StackCap::Limited(30), &rules, &catalog);

        assert_eq!(table.cap_for(&"Clay".into()), StackCap::Limited(30));
        assert_eq!(table.cap_for(&"Log".into()), table.default_cap());
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_later_rule_overrides_earlier() {
        let catalog = create_test_catalog();
        let rules = [
            StackRule::new(ItemTagPredicate::has_tag("Diggable"), 20),
            StackRule::new(ItemTagPredicate::has_tag("Minable"), 10),
        ];
        let table = StackRestrictionTable::build(StackCap::Unrestricted, &rules, &catalog);

        assert_eq!(table.cap_for(&"Dirt".into()), StackCap::Limited(20));
        assert_eq!(table.cap_for(&"Stone".into()), StackCap::Limited(10));
        // Clay matches both; the Minable rule came last
        assert_eq!(table.cap_for(&"Clay".into()), StackCap::Limited(10));
        assert_eq!(table.cap_for(&"Log".into()), StackCap::Unrestricted);

        // Reversed order flips the result
        let reversed = [rules[1].clone(), rules[0].clone()];
        let table = StackRestrictionTable::build(StackCap::Unrestricted, &reversed, &catalog);
        assert_eq!(table.cap_for(&"Clay".into()), StackCap::Limited(20));
    }

    #[test]
    fn test_rule_with_no_matches_leaves_default() {
        let catalog = create_test_catalog();
        let rules = [StackRule::new(ItemTagPredicate::has_tag("Liquid"), 5)];
        let table = StackRestrictionTable::build(StackCap::Limited(50), &rules, &catalog);
        assert!(table.is_empty());
        assert_eq!(table.cap_for(&"Dirt".into()), StackCap::Limited(50));
    }

    #[test]
    fn test_registry_lookup_defaults_to_unrestricted() {
        let registry = StackRestrictionRegistry::new();
        let table = registry.lookup(&"NeverRegistered".into());
        assert!(table.is_unrestricted());
        assert_eq!(table.cap_for(&"Dirt".into()), StackCap::Unrestricted);
    }

    #[test]
    fn test_registry_build_stores_table() {
        let catalog = create_test_catalog();
        let mut registry = StackRestrictionRegistry::new();
        let rules = [StackRule::new(ItemTagPredicate::has_tag("Diggable"), 30)];
        registry.build("Loader".into(), StackCap::Limited(30), &rules, &catalog);

        assert!(registry.contains(&"Loader".into()));
        assert_eq!(registry.len(), 1);
        let table = registry.lookup(&"Loader".into());
        assert_eq!(table.cap_for(&"Dirt".into()), StackCap::Limited(30));
        assert!(registry.lookup(&"Excavator".into()).is_unrestricted());
    }
}
