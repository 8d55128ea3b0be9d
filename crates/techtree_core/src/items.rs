//! Item declarations, the item catalog snapshot, and tag predicates.
//!
//! The catalog is owned by the host. The core only ever reads a snapshot of
//! it, in declaration order, when it derives stack restrictions.

use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::ids::{ItemKind, ItemTag};

/// Description of one item type as seen by the core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDescriptor {
    /// Unique item identifier.
    pub kind: ItemKind,
    /// Display name, passed through untranslated.
    pub display_name: String,
    /// Description text, passed through untranslated.
    #[serde(default)]
    pub description: String,
    /// Semantic tags, including block attributes such as `Diggable`.
    pub tags: BTreeSet<ItemTag>,
    /// Item weight in grams.
    pub weight: u32,
}

impl ItemDescriptor {
    /// Create an untagged item descriptor.
    #[must_use]
    pub fn new(kind: impl Into<ItemKind>, display_name: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            display_name: display_name.into(),
            description: String::new(),
            tags: BTreeSet::new(),
            weight: 0,
        }
    }

    /// Add tags to this item.
    #[must_use]
    pub fn with_tags<I, T>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<ItemTag>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    /// Set the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Set the item weight.
    #[must_use]
    pub fn with_weight(mut self, weight: u32) -> Self {
        self.weight = weight;
        self
    }

    /// Check if this item carries the given tag.
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.as_str() == tag)
    }
}

/// Read-only snapshot of every item the host knows about.
#[derive(Debug, Clone, Default)]
pub struct ItemCatalog {
    items: Vec<ItemDescriptor>,
    index: HashMap<ItemKind, usize>,
}

impl ItemCatalog {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Create a catalog from a list of items.
    ///
    /// Later items replace earlier ones with the same kind.
    #[must_use]
    pub fn from_items(items: impl IntoIterator<Item = ItemDescriptor>) -> Self {
        let mut catalog = Self::new();
        for item in items {
            catalog.insert(item);
        }
        catalog
    }

    /// Add an item, replacing any existing item of the same kind in place.
    pub fn insert(&mut self, item: ItemDescriptor) {
        if let Some(&slot) = self.index.get(&item.kind) {
            warn!(item = %item.kind, "Duplicate item kind, overwriting");
            self.items[slot] = item;
        } else {
            self.index.insert(item.kind.clone(), self.items.len());
            self.items.push(item);
        }
    }

    /// All items in declaration order.
    #[must_use]
    pub fn all_items(&self) -> &[ItemDescriptor] {
        &self.items
    }

    /// Get an item by kind.
    #[must_use]
    pub fn get(&self, kind: &ItemKind) -> Option<&ItemDescriptor> {
        self.index.get(kind).map(|&slot| &self.items[slot])
    }

    /// Check if an item kind exists.
    #[must_use]
    pub fn contains(&self, kind: &ItemKind) -> bool {
        self.get(kind).is_some()
    }

    /// All items matching a predicate, in declaration order.
    pub fn matching<'a>(
        &'a self,
        predicate: &'a ItemTagPredicate,
    ) -> impl Iterator<Item = &'a ItemDescriptor> + 'a {
        self.items.iter().filter(move |i| predicate.matches(i))
    }

    /// Number of items in the catalog.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Named boolean classification over item descriptors.
#[derive(Clone)]
pub struct ItemTagPredicate {
    name: String,
    test: Arc<dyn Fn(&ItemDescriptor) -> bool + Send + Sync>,
}

impl ItemTagPredicate {
    /// Predicate from an arbitrary function.
    pub fn from_fn<F>(name: impl Into<String>, test: F) -> Self
    where
        F: Fn(&ItemDescriptor) -> bool + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            test: Arc::new(test),
        }
    }

    /// Items carrying `tag`.
    pub fn has_tag(tag: impl Into<ItemTag>) -> Self {
        let tag = tag.into();
        Self::from_fn(tag.to_string(), move |item| item.tags.contains(&tag))
    }

    /// Items carrying every tag in `tags`.
    pub fn all_of<I, T>(tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<ItemTag>,
    {
        let tags: Vec<ItemTag> = tags.into_iter().map(Into::into).collect();
        let name = join_names(&tags, " & ");
        Self::from_fn(name, move |item| tags.iter().all(|t| item.tags.contains(t)))
    }

    /// Items carrying at least one tag in `tags`.
    pub fn any_of<I, T>(tags: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<ItemTag>,
    {
        let tags: Vec<ItemTag> = tags.into_iter().map(Into::into).collect();
        let name = join_names(&tags, " | ");
        Self::from_fn(name, move |item| tags.iter().any(|t| item.tags.contains(t)))
    }

    /// Predicate name, used in logs.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Evaluate the predicate.
    #[must_use]
    pub fn matches(&self, item: &ItemDescriptor) -> bool {
        (self.test)(item)
    }
}

fn join_names(tags: &[ItemTag], separator: &str) -> String {
    tags.iter()
        .map(ItemTag::as_str)
        .collect::<Vec<_>>()
        .join(separator)
}

impl fmt::Debug for ItemTagPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ItemTagPredicate")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
