//! Dense category slots.

use std::collections::HashMap;

use crate::coco::{Category, CategoryId};

/// Maps category ids and names to their slot in a per-category mask stack.
///
/// Slots follow the order of the document's category list, so slot `i` is
/// `categories[i]`. The index is built once from a dataset's categories and
/// never changes afterwards.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CategoryIndex {
    by_id: HashMap<CategoryId, usize>,
    by_name: HashMap<String, usize>,
    len: usize,
}

impl CategoryIndex {
    /// Builds the index from a category list. On duplicate ids or names the
    /// later entry wins the lookup.
    pub fn new(categories: &[Category]) -> Self {
        let mut by_id = HashMap::with_capacity(categories.len());
        let mut by_name = HashMap::with_capacity(categories.len());
        for (slot, category) in categories.iter().enumerate() {
            by_id.insert(category.id, slot);
            by_name.insert(category.name.clone(), slot);
        }
        Self {
            by_id,
            by_name,
            len: categories.len(),
        }
    }

    /// Slot of the category with this id.
    pub fn slot(&self, id: CategoryId) -> Option<usize> {
        self.by_id.get(&id).copied()
    }

    /// Slot of the category with this name.
    pub fn slot_by_name(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    /// Number of slots, i.e. the number of categories.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}
