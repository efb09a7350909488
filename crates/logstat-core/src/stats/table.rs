//! Keyed aggregate table with partial top-N ranking.
//!
//! [`StatsTable`] is a thin keyed index over accounting entries. Ranking is
//! a separate free function, [`select_top`], so that it works over any
//! iterator of entries that expose a size.

use std::collections::hash_map::{self, HashMap};
use std::hash::Hash;

/// Anything that can be ranked by accumulated size.
pub trait SizedEntry {
    /// Accumulated size in bytes.
    fn sizes(&self) -> usize;
}

/// Divisor of the long-tail cutoff: entries at or below 1/100 of the
/// largest entry are not exposed by the ranked cursor.
pub const LONG_TAIL_DIVISOR: usize = 100;

/// Select the `n` largest entries, descending, without sorting the input.
///
/// Keeps `n` output slots. Each entry walks the slots from the right while
/// they are empty or hold a strictly smaller size, then lands just after the
/// first slot that is at least as large, pushing the tail one slot right.
/// The last occupant falls off. Equal sizes therefore keep scan order.
///
/// O(entries × n). `n == 0` returns an empty result without allocating.
pub fn select_top<'a, E, I>(entries: I, n: usize) -> TopEntries<'a, E>
where
    E: SizedEntry + 'a,
    I: IntoIterator<Item = &'a E>,
{
    if n == 0 {
        return TopEntries { slots: Vec::new() };
    }

    let mut slots: Vec<Option<&'a E>> = vec![None; n];
    for entry in entries {
        let size = entry.sizes();
        let pos = slots
            .iter()
            .rposition(|slot| matches!(slot, Some(held) if held.sizes() >= size))
            .map_or(0, |i| i + 1);
        if pos < n {
            slots[pos..].rotate_right(1);
            slots[pos] = Some(entry);
        }
    }

    TopEntries { slots }
}

/// Output of [`select_top`]: `n` ranked slots, unused slots are `None`.
#[derive(Debug)]
pub struct TopEntries<'a, E> {
    slots: Vec<Option<&'a E>>,
}

impl<'a, E: SizedEntry> TopEntries<'a, E> {
    /// Number of slots requested (`n`), filled or not.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Raw ranked slots, including empty ones and the long tail.
    pub fn slots(&self) -> &[Option<&'a E>] {
        &self.slots
    }

    /// Entry at `index`, ignoring the long-tail cutoff.
    pub fn get(&self, index: usize) -> Option<&'a E> {
        self.slots.get(index).copied().flatten()
    }

    /// Cursor over the ranked output.
    ///
    /// Returns the index after `index` (`None` = before the first slot), or
    /// `None` once the slots are exhausted, the next slot is empty, or the
    /// next entry is within the long tail of the first entry.
    pub fn next_index(&self, index: Option<usize>) -> Option<usize> {
        let next = index.map_or(0, |i| i.saturating_add(1));
        let entry = self.slots.get(next).copied().flatten()?;
        let top = self.get(0)?;
        if entry.sizes() <= top.sizes() / LONG_TAIL_DIVISOR {
            return None;
        }
        Some(next)
    }

    /// Iterate entries through the cursor, stopping at the long tail.
    pub fn iter(&self) -> TopIter<'_, 'a, E> {
        TopIter {
            top: self,
            index: None,
            done: false,
        }
    }
}

/// Iterator returned by [`TopEntries::iter`].
#[derive(Debug)]
pub struct TopIter<'t, 'a, E> {
    top: &'t TopEntries<'a, E>,
    index: Option<usize>,
    done: bool,
}

impl<'t, 'a, E: SizedEntry> Iterator for TopIter<'t, 'a, E> {
    type Item = &'a E;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.top.next_index(self.index) {
            Some(i) => {
                self.index = Some(i);
                self.top.get(i)
            }
            None => {
                self.done = true;
                None
            }
        }
    }
}

/// Key → entry index.
#[derive(Debug, Clone)]
pub struct StatsTable<K, E> {
    entries: HashMap<K, E>,
}

impl<K, E> Default for StatsTable<K, E> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash, E> StatsTable<K, E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_key(&self, key: &K) -> bool {
        self.entries.contains_key(key)
    }

    pub fn get(&self, key: &K) -> Option<&E> {
        self.entries.get(key)
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut E> {
        self.entries.get_mut(key)
    }

    /// Find the entry for `key`, creating it with `create` if absent.
    pub fn get_or_insert_with(&mut self, key: K, create: impl FnOnce() -> E) -> &mut E {
        self.entries.entry(key).or_insert_with(create)
    }

    pub fn remove(&mut self, key: &K) -> Option<E> {
        self.entries.remove(key)
    }

    /// Unordered walk over every entry.
    pub fn iter(&self) -> hash_map::Values<'_, K, E> {
        self.entries.values()
    }
}

impl<K: Eq + Hash, E: SizedEntry> StatsTable<K, E> {
    /// The `n` largest entries of this table. See [`select_top`].
    pub fn sort(&self, n: usize) -> TopEntries<'_, E> {
        select_top(self.entries.values(), n)
    }
}

impl<'a, K, E> IntoIterator for &'a StatsTable<K, E> {
    type Item = &'a E;
    type IntoIter = hash_map::Values<'a, K, E>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, PartialEq)]
    struct Item(&'static str, usize);

    impl SizedEntry for Item {
        fn sizes(&self) -> usize {
            self.1
        }
    }

    fn names<'a>(top: impl Iterator<Item = &'a Item>) -> Vec<&'static str> {
        top.map(|item| item.0).collect()
    }

    #[test]
    fn test_select_top_descending() {
        let items = [Item("a", 5), Item("b", 50), Item("c", 20), Item("d", 40)];
        let top = select_top(&items, 3);
        assert_eq!(top.len(), 3);
        assert_eq!(names(top.iter()), vec!["b", "d", "c"]);
    }

    #[test]
    fn test_select_top_more_slots_than_entries() {
        let items = [Item("a", 7), Item("b", 9)];
        let top = select_top(&items, 4);
        assert_eq!(names(top.iter()), vec!["b", "a"]);
        assert!(top.slots()[2].is_none());
        assert!(top.slots()[3].is_none());
    }

    #[test]
    fn test_select_top_zero_is_empty() {
        let items = [Item("a", 7)];
        let top = select_top(&items, 0);
        assert!(top.is_empty());
        assert_eq!(top.slots().len(), 0);
        assert_eq!(top.next_index(None), None);
    }

    #[test]
    fn test_equal_sizes_keep_scan_order() {
        let items = [Item("first", 10), Item("second", 10), Item("third", 10)];
        let top = select_top(&items, 2);
        assert_eq!(names(top.iter()), vec!["first", "second"]);
    }

    #[test]
    fn test_cursor_long_tail_cutoff() {
        // 10 is exactly 1% of 1000 and must be cut; 11 survives.
        let items = [Item("big", 1000), Item("edge", 10), Item("tail", 11)];
        let top = select_top(&items, 3);
        assert_eq!(names(top.iter()), vec!["big", "tail"]);
        assert_eq!(top.next_index(None), Some(0));
        assert_eq!(top.next_index(Some(0)), Some(1));
        assert_eq!(top.next_index(Some(1)), None);
    }

    #[test]
    fn test_cursor_out_of_range() {
        let items = [Item("a", 3)];
        let top = select_top(&items, 1);
        assert_eq!(top.next_index(Some(0)), None);
        assert_eq!(top.next_index(Some(usize::MAX)), None);
    }

    #[test]
    fn test_table_upsert_and_remove() {
        let mut table: StatsTable<u32, Item> = StatsTable::new();
        table.get_or_insert_with(1, || Item("one", 1)).1 += 4;
        table.get_or_insert_with(1, || Item("dup", 0)).1 += 1;
        assert_eq!(table.len(), 1);
        assert_eq!(table.get(&1), Some(&Item("one", 6)));

        assert!(table.remove(&1).is_some());
        assert!(table.is_empty());
        assert!(table.iter().next().is_none());
    }
}
