//! Folding flat parent/child join rows into nested documents.
//!
//! A `LEFT JOIN` of a parent table with its children yields one row per
//! child, repeating the parent's columns, or a single row with null child
//! columns when the parent has no children. [`regroup`] turns that back into
//! one [`Group`] per parent key.

use std::collections::HashMap;
use std::hash::Hash;

/// A parent with the children that were attached to it.
#[derive(Debug, Clone, PartialEq)]
pub struct Group<P, C> {
    pub parent: P,
    pub children: Vec<C>,
}

/// Fold joined rows into one group per distinct key.
///
/// `split` breaks a row into `(key, parent, child)`. The first row seen for
/// a key supplies the parent; later rows for the same key only contribute
/// their child (if any). Children keep the order in which their rows arrive.
///
/// Groups are emitted in `order` first (keys in `order` with no rows are
/// skipped), then any remaining keys in first-seen order. Passing an empty
/// `order` gives plain first-seen ordering.
pub fn regroup<R, K, P, C, F>(
    rows: impl IntoIterator<Item = R>,
    order: &[K],
    mut split: F,
) -> Vec<Group<P, C>>
where
    K: Eq + Hash + Clone,
    F: FnMut(R) -> (K, P, Option<C>),
{
    let mut slots: Vec<Option<Group<P, C>>> = Vec::with_capacity(order.len());
    let mut index: HashMap<K, usize> = HashMap::with_capacity(order.len());

    for key in order {
        if !index.contains_key(key) {
            index.insert(key.clone(), slots.len());
            slots.push(None);
        }
    }

    for row in rows {
        let (key, parent, child) = split(row);
        let slot = *index.entry(key).or_insert_with(|| {
            slots.push(None);
            slots.len() - 1
        });

        let group = slots[slot].get_or_insert_with(|| Group {
            parent,
            children: Vec::new(),
        });
        if let Some(child) = child {
            group.children.push(child);
        }
    }

    slots.into_iter().flatten().collect()
}
