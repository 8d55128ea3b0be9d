//! Proptest strategies for registry testing.
//!
//! These strategies generate random but reproducible item catalogs, stack
//! rules and entity types for property-based testing of registration.

use proptest::prelude::*;
use techtree_core::capability::CapabilityKind;
use techtree_core::data::{StackRuleData, TagMatch};
use techtree_core::entity::EntityTypeDescriptor;
use techtree_core::items::{ItemCatalog, ItemDescriptor};

use crate::fixtures::valid_init_args;

/// Tags the generated items and rules draw from.
pub const TAG_POOL: [&str; 6] = ["Block", "Diggable", "Minable", "Food", "Lumber", "Heavy"];

/// Generate one tag from [`TAG_POOL`].
pub fn arb_tag() -> impl Strategy<Value = String> {
    proptest::sample::select(TAG_POOL.to_vec()).prop_map(str::to_string)
}

/// Generate a tag list of 1 to 3 tags.
pub fn arb_tag_list() -> impl Strategy<Value = Vec<String>> {
    proptest::collection::vec(arb_tag(), 1..4)
}

/// Generate an item catalog with unique kinds `Item0..ItemN`.
pub fn arb_catalog(max_items: usize) -> impl Strategy<Value = ItemCatalog> {
    proptest::collection::vec(proptest::collection::btree_set(arb_tag(), 0..4), 0..max_items)
        .prop_map(|tag_sets| {
            ItemCatalog::from_items(tag_sets.into_iter().enumerate().map(|(i, tags)| {
                let kind = format!("Item{i}");
                ItemDescriptor::new(kind.as_str(), kind.as_str()).with_tags(tags)
            }))
        })
}

/// Generate a tag predicate as written in data files.
pub fn arb_tag_match() -> impl Strategy<Value = TagMatch> {
    prop_oneof![
        arb_tag().prop_map(TagMatch::HasTag),
        arb_tag_list().prop_map(TagMatch::AllOf),
        arb_tag_list().prop_map(TagMatch::AnyOf),
    ]
}

/// Generate stack caps (1-100).
pub fn arb_cap() -> impl Strategy<Value = u32> {
    1u32..100u32
}

/// Generate an ordered list of stack rules.
pub fn arb_stack_rules(max_rules: usize) -> impl Strategy<Value = Vec<StackRuleData>> {
    proptest::collection::vec(
        (arb_tag_match(), arb_cap()).prop_map(|(matches, cap)| StackRuleData { matches, cap }),
        0..max_rules,
    )
}

/// Generate any capability kind.
pub fn arb_capability_kind() -> impl Strategy<Value = CapabilityKind> {
    proptest::sample::select(CapabilityKind::ALL.to_vec())
}

/// Generate an entity type with a random required set and random init steps.
///
/// Every step carries arguments its capability accepts, so the only way
/// registration can fail is a step outside the required set.
pub fn arb_entity_type() -> impl Strategy<Value = EntityTypeDescriptor> {
    (
        proptest::collection::btree_set(arb_capability_kind(), 0..6),
        proptest::collection::vec(arb_capability_kind(), 0..8),
    )
        .prop_map(|(required, steps)| {
            steps.into_iter().fold(
                EntityTypeDescriptor::new("Generated", "Generated").require_all(required),
                |descriptor, kind| descriptor.step(kind, valid_init_args(kind)),
            )
        })
}

/// Expected cap for `item` after running `rules` in order: the last matching
/// rule wins.
#[must_use]
pub fn expected_cap(item: &ItemDescriptor, rules: &[StackRuleData]) -> Option<u32> {
    rules
        .iter()
        .rev()
        .find(|rule| match &rule.matches {
            TagMatch::HasTag(tag) => item.has_tag(tag),
            TagMatch::AllOf(tags) => tags.iter().all(|t| item.has_tag(t)),
            TagMatch::AnyOf(tags) => tags.iter().any(|t| item.has_tag(t)),
        })
        .map(|rule| rule.cap)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::simple_recipe;
    use techtree_core::entity::ComponentRegistry;
    use techtree_core::error::CoreError;
    use techtree_core::ids::{EntityTypeId, StationKind};
    use techtree_core::lifecycle::RegistryBuilder;
    use techtree_core::recipe::RecipeHooks;
    use techtree_core::stack_limits::{
        StackCap, StackRestrictionRegistry, StackRestrictionTable, StackRule,
    };

    proptest! {
        /// Registration succeeds exactly when every init step targets a
        /// required capability.
        #[test]
        fn prop_registration_checks_dependencies(descriptor in arb_entity_type()) {
            let declared = descriptor
                .init_steps
                .iter()
                .all(|step| descriptor.required.contains(&step.kind));

            let mut registry = ComponentRegistry::new();
            match registry.register(descriptor.clone()) {
                Ok(()) => prop_assert!(declared),
                Err(CoreError::Dependency { missing, .. }) => {
                    prop_assert!(!declared);
                    prop_assert!(!descriptor.required.contains(&missing));
                }
                Err(other) => prop_assert!(false, "unexpected error: {}", other),
            }
        }

        /// A registered entity type instantiates with one instance per
        /// required capability and runs its steps in declared order.
        #[test]
        fn prop_instantiation_follows_step_order(descriptor in arb_entity_type()) {
            let mut registry = ComponentRegistry::new();
            prop_assume!(registry.register(descriptor.clone()).is_ok());

            let handle = registry
                .instantiate(&descriptor.id, &StackRestrictionRegistry::new())
                .unwrap();
            let expected: Vec<CapabilityKind> =
                descriptor.init_steps.iter().map(|step| step.kind).collect();

            prop_assert_eq!(handle.init_order(), expected.as_slice());
            prop_assert_eq!(handle.kinds().count(), descriptor.required.len());
        }

        /// The last matching rule decides each item's cap; unmatched items
        /// fall back to the default.
        #[test]
        fn prop_last_matching_rule_wins(
            catalog in arb_catalog(20),
            rules in arb_stack_rules(6),
            default_cap in proptest::option::of(arb_cap()),
        ) {
            let default = default_cap.map_or(StackCap::Unrestricted, StackCap::Limited);
            let runtime_rules: Vec<_> = rules
                .iter()
                .map(|rule| StackRule::new(rule.matches.to_predicate(), rule.cap))
                .collect();
            let table = StackRestrictionTable::build(default, &runtime_rules, &catalog);

            for item in catalog.all_items() {
                let expected = expected_cap(item, &rules).map_or(default, StackCap::Limited);
                prop_assert_eq!(table.cap_for(&item.kind), expected);
            }
        }

        /// Lookup never fails, whatever the entity type.
        #[test]
        fn prop_lookup_defaults_to_unrestricted(name in "[A-Za-z]{1,12}") {
            let registry = StackRestrictionRegistry::new();
            prop_assert!(registry.lookup(&EntityTypeId::new(name)).is_unrestricted());
        }

        /// Registering the same recipe n times leaves n entries.
        #[test]
        fn prop_duplicate_recipes_are_kept(count in 1usize..8) {
            let mut builder = RegistryBuilder::default();
            let station = StationKind::new("Workbench");
            for _ in 0..count {
                builder
                    .register_recipe(station.clone(), simple_recipe("Cart"), &RecipeHooks::new())
                    .unwrap();
            }
            prop_assert_eq!(builder.recipes().recipes_for(&station).len(), count);
            prop_assert_eq!(builder.recipes().find("Cart").count(), count);
        }
    }
}
