//! Remembered keyboard layouts, keyed by [`WindowKey`].
//!
//! The store is a flat slot array.  Removing a record frees its slot in
//! place; inserting reuses the first free slot and only grows the array,
//! [`GROWTH`] slots at a time, when none is left.  Lookups are linear, which
//! is fine for the few dozen windows a desktop session holds.
//!
//! The number of records is capped (by default at [`MAX_RECORDS`]).  Tab
//! keys derive from window titles and are never closed individually, so
//! without the cap a busy browser would grow the store forever.  Once full,
//! inserting a new key replaces the least recently used record.

use crate::identity::WindowKey;
use log::debug;

/// Index of an XKB layout in the keyboard's layout list.
pub type LayoutIndex = u32;

/// Number of slots added whenever the store runs out of room.
pub const GROWTH: usize = 8;

/// Default maximum number of records.
pub const MAX_RECORDS: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Slot {
    #[default]
    Free,
    Occupied {
        key: WindowKey,
        layout: LayoutIndex,
        /// Value of the store's clock at the last read or write.
        used: u64,
    },
}

#[derive(Debug, Clone)]
pub struct LayoutStore {
    slots: Vec<Slot>,
    limit: usize,
    clock: u64,
}

impl Default for LayoutStore {
    fn default() -> Self {
        Self::with_limit(MAX_RECORDS)
    }
}

impl LayoutStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store holding at most `limit` records (at least one).
    pub fn with_limit(limit: usize) -> Self {
        Self {
            slots: Vec::new(),
            limit: limit.max(1),
            clock: 0,
        }
    }

    fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    fn position(&self, key: WindowKey) -> Option<usize> {
        self.slots
            .iter()
            .position(|s| matches!(s, Slot::Occupied { key: k, .. } if *k == key))
    }

    /// Layout remembered for `key`, if any.  Counts as a use of the record.
    pub fn get(&mut self, key: WindowKey) -> Option<LayoutIndex> {
        let i = self.position(key)?;
        let now = self.tick();
        match &mut self.slots[i] {
            Slot::Occupied { layout, used, .. } => {
                *used = now;
                Some(*layout)
            }
            Slot::Free => None,
        }
    }

    /// Layout remembered for `key`, without touching its recency.
    pub fn peek(&self, key: WindowKey) -> Option<LayoutIndex> {
        self.slots.iter().find_map(|s| match *s {
            Slot::Occupied { key: k, layout, .. } if k == key => Some(layout),
            _ => None,
        })
    }

    /// Insert or overwrite the layout for `key`.
    pub fn put(&mut self, key: WindowKey, layout: LayoutIndex) {
        let record = Slot::Occupied {
            key,
            layout,
            used: self.tick(),
        };

        if let Some(i) = self.position(key) {
            self.slots[i] = record;
            return;
        }

        if self.len() >= self.limit {
            if let Some(i) = self.least_recently_used() {
                debug!("layout store full, evicting slot {}", i);
                self.slots[i] = record;
                return;
            }
        }

        if let Some(free) = self.slots.iter_mut().find(|s| **s == Slot::Free) {
            *free = record;
            return;
        }

        let first_new = self.slots.len();
        self.slots.resize(first_new + GROWTH, Slot::Free);
        self.slots[first_new] = record;
    }

    fn least_recently_used(&self) -> Option<usize> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, s)| match *s {
                Slot::Occupied { used, .. } => Some((i, used)),
                Slot::Free => None,
            })
            .min_by_key(|&(_, used)| used)
            .map(|(i, _)| i)
    }

    /// Forget `key`.  Does nothing if it is not stored.
    pub fn remove(&mut self, key: WindowKey) {
        if let Some(i) = self.position(key) {
            self.slots[i] = Slot::Free;
        }
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.slots
            .iter()
            .filter(|s| matches!(s, Slot::Occupied { .. }))
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of slots, free or not.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }
}
