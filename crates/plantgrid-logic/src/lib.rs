//! Pure layout logic for PlantGrid.
//!
//! Given a rectangular grid and a set of perimeter exits, this crate lays
//! out as many plant cells as it can while keeping every plant next to a
//! corridor that connects back to an exit. Functions take plain data and
//! an injected RNG, so everything here is deterministic under a seed and
//! free of any async runtime.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`grid`] | Cell index ↔ (row, column), perimeter, neighbors, blocked cells |
//! | [`cell_set`] | Dense ordered set of cells |
//! | [`pathfinding`] | BFS from a cell to the nearest corridor cell |
//! | [`carver`] | Single-exit corridor carving |
//! | [`exits`] | Exit snapshots and best-exit selection (one attempt) |
//! | [`layout`] | Layout result, validation, ASCII rendering |
//! | [`search`] | Density-target and best-of-N retry policies |
//! | [`config`] | Search tunables and their validation |
//!
//! ```
//! use plantgrid_logic::exits::{compute_layout, ExitSet};
//! use plantgrid_logic::grid::Grid;
//! use plantgrid_logic::layout::validate_layout;
//! use rand::SeedableRng;
//!
//! let grid = Grid::new(6, 4).unwrap();
//! let exits = ExitSet::new(&grid, [0, 23]).unwrap();
//! let mut rng = rand::rngs::StdRng::seed_from_u64(42);
//! let layout = compute_layout(&grid, &exits, &mut rng);
//! assert!(validate_layout(&grid, &exits, &layout).is_empty());
//! ```

pub mod carver;
pub mod cell_set;
pub mod config;
pub mod exits;
pub mod grid;
pub mod layout;
pub mod pathfinding;
pub mod search;
