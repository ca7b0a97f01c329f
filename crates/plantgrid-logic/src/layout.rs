//! The result of one carving pass, plus validation and a text rendering.
//!
//! Validation follows the same shape as the rest of the crate's checkers:
//! pure functions over plain data returning a list of findings, empty when
//! the layout is sound.

use std::collections::VecDeque;
use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use crate::cell_set::CellSet;
use crate::exits::ExitSet;
use crate::grid::{Grid, GridDims};

/// Plant cells chosen by one pass, and the corridor that serves them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layout {
    pub dims: GridDims,
    /// Seed exit of the pass. `None` when no exits were marked.
    pub exit: Option<usize>,
    /// Plant cells, ascending.
    pub plants: Vec<usize>,
    /// Corridor cells including the seed exit, ascending.
    pub corridor: Vec<usize>,
    /// Cells that could not be connected to the corridor.
    pub dropped: Vec<usize>,
}

impl Layout {
    /// Every open cell is a plant; used when there is no exit to connect to.
    pub fn unconstrained(grid: &Grid) -> Self {
        Self {
            dims: grid.dims(),
            exit: None,
            plants: grid.open_cells().to_vec(),
            corridor: Vec::new(),
            dropped: Vec::new(),
        }
    }

    pub fn plant_count(&self) -> usize {
        self.plants.len()
    }

    /// Fraction of all grid cells holding a plant.
    pub fn density(&self) -> f64 {
        self.plants.len() as f64 / self.dims.cell_count() as f64
    }

    /// One line per row: `E` exit, `P` plant, `.` corridor, `#` blocked,
    /// `x` dropped.
    pub fn render_ascii(&self, grid: &Grid) -> String {
        let cells = self.dims.cell_count();
        let mut glyphs = vec![' '; cells];
        for cell in 0..cells {
            if grid.is_blocked(cell) {
                glyphs[cell] = '#';
            }
        }
        let marks = [
            (&self.plants, 'P'),
            (&self.corridor, '.'),
            (&self.dropped, 'x'),
        ];
        for (cells, glyph) in marks {
            for &c in cells {
                if let Some(slot) = glyphs.get_mut(c) {
                    *slot = glyph;
                }
            }
        }
        if let Some(slot) = self.exit.and_then(|e| glyphs.get_mut(e)) {
            *slot = 'E';
        }

        let mut out = String::with_capacity(cells + self.dims.height());
        for row in glyphs.chunks(self.dims.width()) {
            let line: String = row.iter().collect();
            let _ = writeln!(out, "{}", line);
        }
        out
    }
}

/// A layout validation finding.
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub category: &'static str,
    pub message: String,
}

/// Run every layout check against the grid and exits it was carved from.
pub fn validate_layout(grid: &Grid, exits: &ExitSet, layout: &Layout) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    errors.extend(check_plant_cells(grid, layout));
    errors.extend(check_seed_exit(exits, layout));
    if errors.is_empty() && layout.exit.is_some() {
        errors.extend(check_corridor_adjacency(grid, layout));
        errors.extend(check_corridor_connected(grid, layout));
        errors.extend(check_reachability(grid, layout));
    }
    errors
}

/// Plants are in range, unique, open and never the seed exit.
pub fn check_plant_cells(grid: &Grid, layout: &Layout) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let dims = grid.dims();
    let mut seen = CellSet::empty(dims.cell_count());

    if layout.dims != dims {
        errors.push(ValidationError {
            category: "plants",
            message: format!(
                "layout is {}x{}, grid is {}x{}",
                layout.dims.width(),
                layout.dims.height(),
                dims.width(),
                dims.height()
            ),
        });
        return errors;
    }

    for &cell in &layout.plants {
        if !dims.contains(cell) {
            errors.push(ValidationError {
                category: "plants",
                message: format!("plant {} is outside the grid", cell),
            });
            continue;
        }
        if !seen.insert(cell) {
            errors.push(ValidationError {
                category: "plants",
                message: format!("plant {} listed twice", cell),
            });
        }
        if grid.is_blocked(cell) {
            errors.push(ValidationError {
                category: "plants",
                message: format!("plant {} is on a blocked cell", cell),
            });
        }
        if layout.exit == Some(cell) {
            errors.push(ValidationError {
                category: "plants",
                message: format!("plant {} is the seed exit", cell),
            });
        }
    }
    errors
}

/// The seed is one of the marked exits, and there is a seed whenever any
/// exit is marked.
pub fn check_seed_exit(exits: &ExitSet, layout: &Layout) -> Vec<ValidationError> {
    match layout.exit {
        Some(exit) if !exits.contains(exit) => vec![ValidationError {
            category: "exit",
            message: format!("seed {} is not a marked exit", exit),
        }],
        None if !exits.is_empty() => vec![ValidationError {
            category: "exit",
            message: format!("no seed exit but {} exits are marked", exits.len()),
        }],
        _ => Vec::new(),
    }
}

/// Every plant touches the recorded corridor.
pub fn check_corridor_adjacency(grid: &Grid, layout: &Layout) -> Vec<ValidationError> {
    let corridor = to_set(grid, &layout.corridor);
    layout
        .plants
        .iter()
        .filter(|&&p| !grid.open_neighbors(p).any(|n| corridor.contains(n)))
        .map(|&p| ValidationError {
            category: "adjacency",
            message: format!("plant {} has no corridor neighbor", p),
        })
        .collect()
}

/// The recorded corridor contains the exit and is one connected piece.
pub fn check_corridor_connected(grid: &Grid, layout: &Layout) -> Vec<ValidationError> {
    let Some(exit) = layout.exit else {
        return Vec::new();
    };
    let corridor = to_set(grid, &layout.corridor);
    if !corridor.contains(exit) {
        return vec![ValidationError {
            category: "corridor",
            message: format!("corridor does not contain exit {}", exit),
        }];
    }
    let reached = flood(grid, exit, &corridor);
    layout
        .corridor
        .iter()
        .filter(|&&c| !reached.contains(c))
        .map(|&c| ValidationError {
            category: "corridor",
            message: format!("corridor cell {} is cut off from exit {}", c, exit),
        })
        .collect()
}

/// Independent of the recorded corridor: every plant borders the region
/// reachable from the exit through open non-plant cells.
pub fn check_reachability(grid: &Grid, layout: &Layout) -> Vec<ValidationError> {
    let Some(exit) = layout.exit else {
        return Vec::new();
    };
    let mut walkable = grid.open_cells();
    for &p in &layout.plants {
        walkable.remove(p);
    }
    let reached = flood(grid, exit, &walkable);
    layout
        .plants
        .iter()
        .filter(|&&p| !grid.open_neighbors(p).any(|n| reached.contains(n)))
        .map(|&p| ValidationError {
            category: "reachability",
            message: format!("plant {} cannot be reached from exit {}", p, exit),
        })
        .collect()
}

fn to_set(grid: &Grid, cells: &[usize]) -> CellSet {
    let mut set = CellSet::empty(grid.dims().cell_count());
    for &c in cells {
        if grid.dims().contains(c) {
            set.insert(c);
        }
    }
    set
}

/// Cells of `within` connected to `from`.
fn flood(grid: &Grid, from: usize, within: &CellSet) -> CellSet {
    let mut reached = CellSet::empty(grid.dims().cell_count());
    if !within.contains(from) {
        return reached;
    }
    let mut queue = VecDeque::new();
    reached.insert(from);
    queue.push_back(from);
    while let Some(current) = queue.pop_front() {
        for next in grid.open_neighbors(current) {
            if within.contains(next) && reached.insert(next) {
                queue.push_back(next);
            }
        }
    }
    reached
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout_3x3(plants: Vec<usize>, corridor: Vec<usize>) -> (Grid, Layout) {
        let grid = Grid::new(3, 3).unwrap();
        let layout = Layout {
            dims: grid.dims(),
            exit: Some(0),
            plants,
            corridor,
            dropped: Vec::new(),
        };
        (grid, layout)
    }

    #[test]
    fn comb_layout_is_valid() {
        // E . P
        // P . P
        // P . P
        let (grid, layout) = layout_3x3(vec![2, 3, 5, 6, 8], vec![0, 1, 4, 7]);
        let exits = ExitSet::new(&grid, [0]).unwrap();
        let errors = validate_layout(&grid, &exits, &layout);
        assert!(errors.is_empty(), "{errors:?}");
    }

    #[test]
    fn plant_on_exit_flagged() {
        let (grid, layout) = layout_3x3(vec![0, 2], vec![0, 1]);
        let errors = check_plant_cells(&grid, &layout);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].category, "plants");
    }

    #[test]
    fn stranded_plant_flagged() {
        // Plant 8 has no corridor neighbor (5 and 7 are plants).
        let (grid, layout) = layout_3x3(vec![2, 5, 7, 8], vec![0, 1, 3, 4, 6]);
        let adjacency = check_corridor_adjacency(&grid, &layout);
        assert_eq!(adjacency.len(), 1);
        assert!(adjacency[0].message.contains("plant 8"));
        // 8 borders only plants, so it is unreachable as well.
        let reach = check_reachability(&grid, &layout);
        assert_eq!(reach.len(), 1);
    }

    #[test]
    fn disconnected_corridor_flagged() {
        // Corridor {0, 8} with plants everywhere else.
        let (grid, layout) = layout_3x3(vec![1, 2, 3, 4, 5, 6, 7], vec![0, 8]);
        let errors = check_corridor_connected(&grid, &layout);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("corridor cell 8"));
    }

    #[test]
    fn unconstrained_layout_uses_open_cells() {
        let grid = Grid::with_blocked(2, 2, [3]).unwrap();
        let layout = Layout::unconstrained(&grid);
        assert_eq!(layout.plants, vec![0, 1, 2]);
        assert!(validate_layout(&grid, &ExitSet::none(), &layout).is_empty());
    }

    #[test]
    fn seed_outside_exit_set_flagged() {
        let (grid, layout) = layout_3x3(vec![2, 3, 5, 6, 8], vec![0, 1, 4, 7]);
        let exits = ExitSet::new(&grid, [2, 6]).unwrap();
        let errors = validate_layout(&grid, &exits, &layout);
        assert!(errors.iter().any(|e| e.category == "exit"));
    }

    #[test]
    fn unconstrained_layout_with_exits_flagged() {
        let grid = Grid::new(3, 3).unwrap();
        let layout = Layout::unconstrained(&grid);
        let exits = ExitSet::new(&grid, [0]).unwrap();
        let errors = check_seed_exit(&exits, &layout);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("1 exits"));
    }

    #[test]
    fn zero_sized_dims_rejected_on_load() {
        let json = r#"{"dims":{"width":0,"height":0},"exit":null,"plants":[],"corridor":[],"dropped":[]}"#;
        assert!(serde_json::from_str::<Layout>(json).is_err());
    }

    #[test]
    fn ascii_skips_cells_outside_the_grid() {
        let (grid, mut layout) = layout_3x3(vec![2, 3, 5, 6, 8], vec![0, 1, 4, 7]);
        layout.plants.push(99);
        layout.exit = Some(42);
        assert_eq!(layout.render_ascii(&grid), "..P\nP.P\nP.P\n");
    }

    #[test]
    fn ascii_rendering() {
        let (grid, layout) = layout_3x3(vec![2, 3, 5, 6, 8], vec![0, 1, 4, 7]);
        assert_eq!(layout.render_ascii(&grid), "E.P\nP.P\nP.P\n");
    }

    #[test]
    fn density_is_fraction_of_all_cells() {
        let (_, layout) = layout_3x3(vec![2, 3, 5, 6, 8], vec![0, 1, 4, 7]);
        assert!((layout.density() - 5.0 / 9.0).abs() < 1e-9);
    }
}
