//! Single-exit corridor carving.
//!
//! Starting from "everything is a plant except the exit", the carver
//! repeatedly picks a random plant cell that has no corridor neighbor and
//! converts the shortest path from it to the corridor into corridor cells.
//! It stops once every remaining plant touches the corridor.
//!
//! Each iteration removes at least one cell from the plant set, so a pass
//! always terminates; in the worst case every cell becomes corridor.

use rand::Rng;

use crate::cell_set::CellSet;
use crate::grid::Grid;
use crate::layout::Layout;
use crate::pathfinding::find_path_to_corridor;

/// Counters from one carving pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CarveStats {
    /// Path Finder invocations.
    pub path_searches: usize,
    /// Cells converted from plant to corridor (exit not counted).
    pub carved: usize,
    /// Cells dropped because no corridor was reachable.
    pub dropped: usize,
}

/// Carve a layout seeded at `exit`.
///
/// `exit` must be an open cell of `grid`; [`crate::exits::ExitSet`]
/// guarantees that for validated input.
pub fn carve_from_exit(grid: &Grid, exit: usize, rng: &mut impl Rng) -> Layout {
    carve_with_stats(grid, exit, rng).0
}

/// [`carve_from_exit`], also returning the pass counters.
pub fn carve_with_stats(grid: &Grid, exit: usize, rng: &mut impl Rng) -> (Layout, CarveStats) {
    let cells = grid.dims().cell_count();
    let mut plants = grid.open_cells();
    plants.remove(exit);
    let mut corridor = CellSet::empty(cells);
    corridor.insert(exit);
    let mut dropped = CellSet::empty(cells);
    let mut stats = CarveStats::default();

    loop {
        let invalid = disconnected_plants(grid, &plants, &corridor);
        if invalid.is_empty() {
            break;
        }

        let chosen = invalid[rng.gen_range(0..invalid.len())];
        stats.path_searches += 1;
        let path = find_path_to_corridor(grid, chosen, &corridor);

        if path.is_empty() {
            log::warn!("cell {} cannot reach exit {}, dropping it", chosen, exit);
            plants.remove(chosen);
            dropped.insert(chosen);
            stats.dropped += 1;
            continue;
        }

        for cell in path {
            plants.remove(cell);
            if corridor.insert(cell) {
                stats.carved += 1;
            }
        }
    }

    log::debug!(
        "exit {}: {} plants, {} carved, {} dropped, {} searches",
        exit,
        plants.len(),
        stats.carved,
        stats.dropped,
        stats.path_searches
    );

    let layout = Layout {
        dims: grid.dims(),
        exit: Some(exit),
        plants: plants.to_vec(),
        corridor: corridor.to_vec(),
        dropped: dropped.to_vec(),
    };
    (layout, stats)
}

/// Plant cells with no corridor neighbor, ascending.
fn disconnected_plants(grid: &Grid, plants: &CellSet, corridor: &CellSet) -> Vec<usize> {
    plants
        .iter()
        .filter(|&p| !grid.open_neighbors(p).any(|n| corridor.contains(n)))
        .collect()
}
