//! BFS from a plant cell to the nearest corridor cell.
//!
//! The search walks open (unblocked) cells in the fixed neighbor order and
//! stops at the first dequeued cell that touches the corridor, so equally
//! short alternatives resolve the same way on every run.

use std::collections::VecDeque;

use crate::cell_set::CellSet;
use crate::grid::Grid;

/// Shortest path from `start` to the corridor network.
///
/// The path begins with `start` and ends with the last non-corridor cell;
/// the corridor cell it connects to is not included. Returns an empty vec
/// if `start` is already corridor or no corridor cell is reachable.
pub fn find_path_to_corridor(grid: &Grid, start: usize, corridor: &CellSet) -> Vec<usize> {
    if corridor.contains(start) {
        return Vec::new();
    }

    let cells = grid.dims().cell_count();
    let mut parent: Vec<Option<usize>> = vec![None; cells];
    let mut visited = CellSet::empty(cells);
    let mut queue = VecDeque::new();
    visited.insert(start);
    queue.push_back(start);

    while let Some(current) = queue.pop_front() {
        for next in grid.open_neighbors(current) {
            if corridor.contains(next) {
                return trace_back(&parent, current);
            }
            if visited.insert(next) {
                parent[next] = Some(current);
                queue.push_back(next);
            }
        }
    }

    Vec::new()
}

/// Follow parent links from `end` back to the BFS root, returned root-first.
fn trace_back(parent: &[Option<usize>], end: usize) -> Vec<usize> {
    let mut path = vec![end];
    let mut cursor = end;
    while let Some(prev) = parent[cursor] {
        path.push(prev);
        cursor = prev;
    }
    path.reverse();
    path
}
