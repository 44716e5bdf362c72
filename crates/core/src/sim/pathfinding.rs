//! Deterministic shortest-path search over the maze grid.
//! This is the pure `(grid, start, goal) -> path` function shared by the inline
//! and background modes of the path service.

use std::collections::BTreeSet;

use crate::error::PathError;
use crate::grid::Grid;
use crate::types::Cell;

/// Open-set entry. Ordering is `f` first, then insertion sequence, so equal-`f`
/// nodes are expanded in the order they were discovered.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct OpenNode {
    f: u32,
    seq: u64,
    row: i32,
    col: i32,
}

/// A* over 4-directional moves with unit cost and a Manhattan heuristic.
///
/// Returns the cells from (but excluding) `start` up to and including `goal`.
/// The result is empty when `start == goal`, when the goal is a wall, or when
/// no route exists.
pub fn find_path(grid: &Grid, start: Cell, goal: Cell) -> Vec<Cell> {
    if start == goal || !grid.in_bounds(start) || !grid.is_open(goal) {
        return Vec::new();
    }

    let mut g_score = vec![u32::MAX; grid.len()];
    let mut came_from: Vec<Option<Cell>> = vec![None; grid.len()];
    let mut closed = vec![false; grid.len()];
    let mut open_set = BTreeSet::new();
    let mut seq = 0_u64;

    g_score[grid.index(start)] = 0;
    open_set.insert(OpenNode { f: start.manhattan(goal), seq, row: start.row, col: start.col });

    while let Some(current) = open_set.pop_first() {
        let cell = Cell::new(current.row, current.col);
        let idx = grid.index(cell);
        if closed[idx] {
            continue;
        }
        if cell == goal {
            return reconstruct_path(grid, &came_from, start, goal);
        }
        closed[idx] = true;

        let tentative = g_score[idx] + 1;
        for next in cell.neighbors() {
            if !grid.is_open(next) {
                continue;
            }
            let next_idx = grid.index(next);
            if closed[next_idx] || tentative >= g_score[next_idx] {
                continue;
            }
            g_score[next_idx] = tentative;
            came_from[next_idx] = Some(cell);
            seq += 1;
            open_set.insert(OpenNode {
                f: tentative + next.manhattan(goal),
                seq,
                row: next.row,
                col: next.col,
            });
        }
    }

    Vec::new()
}

/// Boundary check applied by the path service before any search.
pub(crate) fn ensure_in_bounds(grid: &Grid, cell: Cell) -> Result<(), PathError> {
    if grid.in_bounds(cell) {
        Ok(())
    } else {
        Err(PathError::OutOfBounds { cell, rows: grid.rows(), cols: grid.cols() })
    }
}

fn reconstruct_path(grid: &Grid, came_from: &[Option<Cell>], start: Cell, goal: Cell) -> Vec<Cell> {
    let mut path = vec![goal];
    let mut cursor = goal;
    while let Some(prev) = came_from[grid.index(cursor)] {
        if prev == start {
            break;
        }
        path.push(prev);
        cursor = prev;
    }
    path.reverse();
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::test_support::*;

    fn assert_contiguous(start: Cell, path: &[Cell]) {
        let mut prev = start;
        for &step in path {
            assert_eq!(prev.manhattan(step), 1, "non-adjacent step {prev:?} -> {step:?}");
            prev = step;
        }
    }

    #[test]
    fn open_room_paths_match_manhattan_distance() {
        let grid = Grid::new(9, 11);
        let cells = grid.open_cells().to_vec();
        for &a in cells.iter().step_by(5) {
            for &b in cells.iter().step_by(3) {
                let path = find_path(&grid, a, b);
                assert_eq!(path.len() as u32, a.manhattan(b), "{a:?} -> {b:?}");
                if a != b {
                    assert_eq!(path.last().copied(), Some(b));
                    assert_contiguous(a, &path);
                }
            }
        }
    }

    #[test]
    fn start_equal_to_goal_is_empty() {
        let grid = Grid::new(5, 5);
        assert!(find_path(&grid, Cell::new(2, 2), Cell::new(2, 2)).is_empty());
    }

    #[test]
    fn walled_off_goal_returns_empty_path() {
        let (grid, start, goal) = sealed_room_fixture();
        assert!(find_path(&grid, start, goal).is_empty());
        assert!(find_path(&grid, goal, start).is_empty());
    }

    #[test]
    fn wall_goal_returns_empty_path() {
        let grid = Grid::with_walls(7, 7, &[Cell::new(3, 3)]);
        assert!(find_path(&grid, Cell::new(1, 1), Cell::new(3, 3)).is_empty());
    }

    #[test]
    fn path_detours_around_central_pillar() {
        let grid = Grid::with_walls(7, 7, &[Cell::new(3, 3)]);
        let start = Cell::new(1, 1);
        let goal = Cell::new(5, 5);
        let path = find_path(&grid, start, goal);
        assert!(path.len() >= 8);
        assert!(!path.contains(&Cell::new(3, 3)));
        assert_eq!(path.last().copied(), Some(goal));
        assert_contiguous(start, &path);
    }

    #[test]
    fn corridor_detour_takes_the_only_route() {
        let (grid, start, goal) = serpentine_fixture();
        let path = find_path(&grid, start, goal);
        assert!(!path.is_empty());
        assert!(path.len() as u32 > start.manhattan(goal));
        assert!(path.iter().all(|cell| grid.is_open(*cell)));
        assert_contiguous(start, &path);
    }

    #[test]
    fn repeated_searches_are_identical() {
        let grid = Grid::new(12, 12);
        let first = find_path(&grid, Cell::new(1, 1), Cell::new(10, 10));
        let second = find_path(&grid, Cell::new(1, 1), Cell::new(10, 10));
        assert_eq!(first, second);
    }

    #[test]
    fn bounds_check_rejects_cells_outside_the_grid() {
        let grid = Grid::new(5, 5);
        let err = ensure_in_bounds(&grid, Cell::new(9, 1)).unwrap_err();
        assert_eq!(err, PathError::OutOfBounds { cell: Cell::new(9, 1), rows: 5, cols: 5 });
        assert!(ensure_in_bounds(&grid, Cell::new(-1, 0)).is_err());
        assert!(ensure_in_bounds(&grid, Cell::new(0, 4)).is_ok());
    }
}
