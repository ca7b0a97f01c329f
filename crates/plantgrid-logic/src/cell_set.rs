//! Dense set of grid cells.
//!
//! Membership is a flag per cell, so insert/remove/contains are O(1) and
//! iteration always runs in ascending index order. That ordering is what
//! keeps carving reproducible under a seeded RNG.

/// A set of cell indices over a fixed-size grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellSet {
    members: Vec<bool>,
    len: usize,
}

impl CellSet {
    /// An empty set over `cells` cells.
    pub fn empty(cells: usize) -> Self {
        Self {
            members: vec![false; cells],
            len: 0,
        }
    }

    /// A set containing every one of `cells` cells.
    pub fn full(cells: usize) -> Self {
        Self {
            members: vec![true; cells],
            len: cells,
        }
    }

    /// Size of the universe this set ranges over.
    pub fn capacity(&self) -> usize {
        self.members.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn contains(&self, cell: usize) -> bool {
        self.members.get(cell).copied().unwrap_or(false)
    }

    /// Returns `true` if the cell was newly added.
    ///
    /// Panics if `cell` is outside the universe.
    pub fn insert(&mut self, cell: usize) -> bool {
        let slot = &mut self.members[cell];
        if *slot {
            return false;
        }
        *slot = true;
        self.len += 1;
        true
    }

    /// Returns `true` if the cell was present.
    pub fn remove(&mut self, cell: usize) -> bool {
        match self.members.get_mut(cell) {
            Some(slot) if *slot => {
                *slot = false;
                self.len -= 1;
                true
            }
            _ => false,
        }
    }

    /// Members in ascending index order.
    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.members
            .iter()
            .enumerate()
            .filter_map(|(cell, &present)| present.then_some(cell))
    }

    pub fn to_vec(&self) -> Vec<usize> {
        self.iter().collect()
    }
}
