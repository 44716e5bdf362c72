//! Shared grid fixtures for the `sim` submodule test suites.
//! It does not own production simulation logic.

use crate::grid::Grid;
use crate::types::Cell;

/// Goal inside a fully walled 3x3 pocket; start outside it.
pub(crate) fn sealed_room_fixture() -> (Grid, Cell, Cell) {
    let mut walls = Vec::new();
    for i in 2..=6 {
        walls.push(Cell::new(2, i));
        walls.push(Cell::new(6, i));
        walls.push(Cell::new(i, 2));
        walls.push(Cell::new(i, 6));
    }
    (Grid::with_walls(9, 9, &walls), Cell::new(1, 1), Cell::new(4, 4))
}

/// Three staggered wall rows that force a zig-zag route from top-left to bottom-left.
pub(crate) fn serpentine_fixture() -> (Grid, Cell, Cell) {
    let mut walls = Vec::new();
    for col in 1..=6 {
        walls.push(Cell::new(2, col));
        walls.push(Cell::new(6, col));
    }
    for col in 2..=7 {
        walls.push(Cell::new(4, col));
    }
    (Grid::with_walls(9, 9, &walls), Cell::new(1, 1), Cell::new(7, 1))
}

/// Single open corridor on row 5 with a wall plug at column 6.
pub(crate) fn corridor_wall_fixture() -> (Grid, Cell) {
    let mut walls = Vec::new();
    for row in 1..10 {
        for col in 1..10 {
            if row != 5 || col == 6 {
                walls.push(Cell::new(row, col));
            }
        }
    }
    (Grid::with_walls(11, 11, &walls), Cell::new(5, 3))
}

/// Open room used by pursuit and session tests.
pub(crate) fn open_room_fixture() -> Grid {
    Grid::new(12, 12)
}
