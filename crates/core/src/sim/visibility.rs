//! Grid line-of-sight used for audio muffling and light shadow eligibility.
//! Detection of the player never depends on this module.

use crate::grid::Grid;
use crate::types::Cell;

/// Bresenham walk between `a` and `b`. Any wall or out-of-bounds cell on the
/// walk, other than the origin `a` itself, blocks sight.
///
/// The walk always runs from the smaller endpoint to the larger one so that
/// both directions rasterize the same cells.
pub fn has_line_of_sight(grid: &Grid, a: Cell, b: Cell) -> bool {
    let (from, to) = if a <= b { (a, b) } else { (b, a) };
    let dx = (to.col - from.col).abs();
    let dy = -(to.row - from.row).abs();
    let sx = if from.col < to.col { 1 } else { -1 };
    let sy = if from.row < to.row { 1 } else { -1 };
    let mut err = dx + dy;

    let mut cell = from;
    loop {
        if cell != a && grid.is_wall(cell) {
            return false;
        }
        if cell == to {
            return true;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            cell.col += sx;
        }
        if e2 <= dx {
            err += dx;
            cell.row += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Level;
    use crate::sim::test_support::*;

    #[test]
    fn same_open_cell_sees_itself() {
        let grid = Grid::new(5, 5);
        assert!(has_line_of_sight(&grid, Cell::new(2, 2), Cell::new(2, 2)));
    }

    #[test]
    fn open_room_has_clear_sight_between_interior_cells() {
        let grid = Grid::new(9, 9);
        assert!(has_line_of_sight(&grid, Cell::new(1, 1), Cell::new(7, 7)));
        assert!(has_line_of_sight(&grid, Cell::new(1, 7), Cell::new(6, 2)));
        assert!(has_line_of_sight(&grid, Cell::new(4, 1), Cell::new(4, 7)));
    }

    #[test]
    fn wall_on_the_line_blocks_sight() {
        let (grid, origin) = corridor_wall_fixture();
        assert!(has_line_of_sight(&grid, origin, Cell::new(5, 5)));
        assert!(!has_line_of_sight(&grid, origin, Cell::new(5, 7)));
        assert!(!has_line_of_sight(&grid, Cell::new(5, 7), origin));
    }

    #[test]
    fn wall_target_is_not_visible_but_wall_origin_is_ignored() {
        let grid = Grid::with_walls(7, 7, &[Cell::new(3, 3)]);
        assert!(!has_line_of_sight(&grid, Cell::new(3, 1), Cell::new(3, 3)));
        assert!(has_line_of_sight(&grid, Cell::new(3, 3), Cell::new(3, 5)));
    }

    #[test]
    fn verdict_is_symmetric_on_the_stock_maze() {
        let level = Level::builtin();
        let cells = level.grid.open_cells();
        for &a in cells.iter().step_by(7) {
            for &b in cells.iter().step_by(11) {
                assert_eq!(
                    has_line_of_sight(&level.grid, a, b),
                    has_line_of_sight(&level.grid, b, a),
                    "asymmetric sight between {a:?} and {b:?}"
                );
            }
        }
    }
}
