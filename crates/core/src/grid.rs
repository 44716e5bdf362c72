//! Static maze description and the ASCII level format that feeds it.
//! The grid is immutable after construction and shared by reference count with
//! every pursuer and with the background path worker.

use glam::Vec2;

use crate::error::GridError;
use crate::types::{Cell, CellKind};

/// Side length of one grid cell in world units.
pub const CELL_SIZE: f32 = 4.0;

/// Layout of the stock level. `#` wall, `.` open, `o` objective, `P` player
/// spawn, `G` pursuer spawn, `L` light, `x` dead light.
pub const DEFAULT_MAZE: &str = "\
####################
#Po.o#o.o.#.o.o#Lo.#
#.##.#.##.#.##.#.###
#o..o.o..o.o..oLo.o#
#.##.###.##.###.#..#
#o.#..o..o...oL.#.o#
##.###.##.##.##.##.#
#oL.o.o....o.Lo..o.#
#.#.##.#.#.##.##.#L#
#o.o..o#.G.#o..o..o#
#.#.##L#.#.##.##.#.#
#o..o.o....o..o..o.#
##.###.##.##.##.##.#
#o.#..o..ox..o..#.o#
#.##L###.##.###L#..#
#o..o.o..o.o..o.o.o#
#.##.#.##.#.##L#.###
#.o.o#o.o.#.o.o#.o.#
####################
";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    rows: usize,
    cols: usize,
    cells: Vec<CellKind>,
    open_cells: Vec<Cell>,
}

impl Grid {
    /// Open interior surrounded by a wall border.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self::with_walls(rows, cols, &[])
    }

    /// Open interior with the listed interior walls. Out-of-range entries are ignored.
    pub fn with_walls(rows: usize, cols: usize, walls: &[Cell]) -> Self {
        let mut cells = vec![CellKind::Open; rows * cols];
        for row in 0..rows {
            for col in 0..cols {
                if row == 0 || col == 0 || row + 1 == rows || col + 1 == cols {
                    cells[row * cols + col] = CellKind::Wall;
                }
            }
        }
        for wall in walls {
            if wall.row >= 0 && wall.col >= 0 {
                let (r, c) = (wall.row as usize, wall.col as usize);
                if r < rows && c < cols {
                    cells[r * cols + c] = CellKind::Wall;
                }
            }
        }
        Self::from_cells(rows, cols, cells)
    }

    fn from_cells(rows: usize, cols: usize, cells: Vec<CellKind>) -> Self {
        let mut open_cells = Vec::new();
        for row in 0..rows {
            for col in 0..cols {
                if cells[row * cols + col] == CellKind::Open {
                    open_cells.push(Cell::new(row as i32, col as i32));
                }
            }
        }
        Self { rows, cols, cells, open_cells }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn in_bounds(&self, cell: Cell) -> bool {
        cell.row >= 0
            && cell.col >= 0
            && (cell.row as usize) < self.rows
            && (cell.col as usize) < self.cols
    }

    /// Out-of-bounds cells read as walls.
    pub fn kind(&self, cell: Cell) -> CellKind {
        if !self.in_bounds(cell) {
            return CellKind::Wall;
        }
        self.cells[self.index(cell)]
    }

    pub fn is_wall(&self, cell: Cell) -> bool {
        self.kind(cell) == CellKind::Wall
    }

    pub fn is_open(&self, cell: Cell) -> bool {
        self.kind(cell) == CellKind::Open
    }

    /// Every open cell in row-major order.
    pub fn open_cells(&self) -> &[Cell] {
        &self.open_cells
    }

    /// Clamp a cell into the interior ring, one cell inside the border.
    pub fn clamp_interior(&self, cell: Cell) -> Cell {
        let max_row = (self.rows as i32 - 2).max(1);
        let max_col = (self.cols as i32 - 2).max(1);
        Cell::new(cell.row.clamp(1, max_row), cell.col.clamp(1, max_col))
    }

    pub(crate) fn index(&self, cell: Cell) -> usize {
        (cell.row as usize) * self.cols + (cell.col as usize)
    }

    pub(crate) fn len(&self) -> usize {
        self.cells.len()
    }
}

/// World-space centre of a cell.
pub fn cell_center(cell: Cell) -> Vec2 {
    Vec2::new(
        cell.col as f32 * CELL_SIZE + CELL_SIZE / 2.0,
        cell.row as f32 * CELL_SIZE + CELL_SIZE / 2.0,
    )
}

/// Cell containing a world-space point.
pub fn world_to_cell(pos: Vec2) -> Cell {
    Cell::new((pos.y / CELL_SIZE).floor() as i32, (pos.x / CELL_SIZE).floor() as i32)
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LightPlacement {
    pub cell: Cell,
    pub dead: bool,
}

/// A parsed maze plus the occupant markers found in it.
#[derive(Clone, Debug)]
pub struct Level {
    pub grid: Grid,
    pub player_spawn: Cell,
    pub pursuer_spawns: Vec<Cell>,
    pub objectives: Vec<Cell>,
    pub lights: Vec<LightPlacement>,
}

impl Level {
    pub fn parse(text: &str) -> Result<Self, GridError> {
        let lines: Vec<&str> =
            text.lines().map(str::trim_end).filter(|line| !line.is_empty()).collect();
        let Some(first) = lines.first() else {
            return Err(GridError::Empty);
        };
        let rows = lines.len();
        let cols = first.chars().count();
        if cols == 0 {
            return Err(GridError::Empty);
        }

        let mut cells = Vec::with_capacity(rows * cols);
        let mut player_spawn = None;
        let mut pursuer_spawns = Vec::new();
        let mut objectives = Vec::new();
        let mut lights = Vec::new();

        for (row, line) in lines.iter().enumerate() {
            let found = line.chars().count();
            if found != cols {
                return Err(GridError::RaggedRow { row, expected: cols, found });
            }
            for (col, glyph) in line.chars().enumerate() {
                let cell = Cell::new(row as i32, col as i32);
                let kind = match glyph {
                    '#' => CellKind::Wall,
                    '.' => CellKind::Open,
                    'o' => {
                        objectives.push(cell);
                        CellKind::Open
                    }
                    'P' => {
                        if player_spawn.is_some() {
                            return Err(GridError::DuplicatePlayerSpawn { cell });
                        }
                        player_spawn = Some(cell);
                        CellKind::Open
                    }
                    'G' => {
                        pursuer_spawns.push(cell);
                        CellKind::Open
                    }
                    'L' | 'x' => {
                        lights.push(LightPlacement { cell, dead: glyph == 'x' });
                        CellKind::Open
                    }
                    _ => return Err(GridError::UnknownGlyph { glyph, cell }),
                };
                let on_border = row == 0 || col == 0 || row + 1 == rows || col + 1 == cols;
                if on_border && kind == CellKind::Open {
                    return Err(GridError::OpenBorder { cell });
                }
                cells.push(kind);
            }
        }

        let player_spawn = player_spawn.ok_or(GridError::MissingPlayerSpawn)?;
        Ok(Self {
            grid: Grid::from_cells(rows, cols, cells),
            player_spawn,
            pursuer_spawns,
            objectives,
            lights,
        })
    }

    pub fn builtin() -> Self {
        Self::parse(DEFAULT_MAZE).expect("built-in maze must parse")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_maze_parses_with_expected_markers() {
        let level = Level::builtin();
        assert_eq!(level.grid.rows(), 19);
        assert_eq!(level.grid.cols(), 20);
        assert_eq!(level.player_spawn, Cell::new(1, 1));
        assert_eq!(level.pursuer_spawns, vec![Cell::new(9, 9)]);
        assert!(!level.objectives.is_empty());
        assert!(level.lights.iter().any(|light| light.dead));
        assert!(level.lights.len() > 6);
    }

    #[test]
    fn new_grid_has_wall_border_and_open_interior() {
        let grid = Grid::new(5, 6);
        for col in 0..6 {
            assert!(grid.is_wall(Cell::new(0, col)));
            assert!(grid.is_wall(Cell::new(4, col)));
        }
        for row in 0..5 {
            assert!(grid.is_wall(Cell::new(row, 0)));
            assert!(grid.is_wall(Cell::new(row, 5)));
        }
        assert!(grid.is_open(Cell::new(2, 2)));
        assert_eq!(grid.open_cells().len(), 3 * 4);
    }

    #[test]
    fn out_of_bounds_reads_as_wall() {
        let grid = Grid::new(5, 5);
        assert!(!grid.in_bounds(Cell::new(-1, 2)));
        assert!(!grid.in_bounds(Cell::new(2, 5)));
        assert_eq!(grid.kind(Cell::new(7, 7)), CellKind::Wall);
    }

    #[test]
    fn open_border_is_rejected() {
        let err = Level::parse("#####\n#P..\n#####\n").unwrap_err();
        assert!(matches!(err, GridError::RaggedRow { row: 1, .. }));

        let err = Level::parse("#####\n#P...\n#####\n").unwrap_err();
        assert_eq!(err, GridError::OpenBorder { cell: Cell::new(1, 4) });
    }

    #[test]
    fn unknown_glyph_and_missing_spawn_are_reported() {
        let err = Level::parse("####\n#?P#\n####\n").unwrap_err();
        assert_eq!(err, GridError::UnknownGlyph { glyph: '?', cell: Cell::new(1, 1) });

        let err = Level::parse("####\n#..#\n####\n").unwrap_err();
        assert_eq!(err, GridError::MissingPlayerSpawn);

        assert_eq!(Level::parse("\n\n").unwrap_err(), GridError::Empty);
    }

    #[test]
    fn world_and_cell_coordinates_round_trip_through_centres() {
        let cell = Cell::new(3, 7);
        let center = cell_center(cell);
        assert_eq!(center, Vec2::new(30.0, 14.0));
        assert_eq!(world_to_cell(center), cell);
        assert_eq!(world_to_cell(Vec2::new(28.01, 12.01)), cell);
    }

    #[test]
    fn clamp_interior_keeps_cells_off_the_border() {
        let grid = Grid::new(7, 9);
        assert_eq!(grid.clamp_interior(Cell::new(-3, 20)), Cell::new(1, 7));
        assert_eq!(grid.clamp_interior(Cell::new(3, 3)), Cell::new(3, 3));
    }
}
