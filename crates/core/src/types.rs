use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

new_key_type! {
    pub struct LightId;
}

/// Grid coordinate. Valid iff `0 <= row < rows` and `0 <= col < cols` for the grid it indexes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub row: i32,
    pub col: i32,
}

impl Cell {
    pub const fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    pub fn manhattan(self, other: Cell) -> u32 {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col)
    }

    pub fn distance_squared(self, other: Cell) -> i64 {
        let dr = i64::from(self.row - other.row);
        let dc = i64::from(self.col - other.col);
        dr * dr + dc * dc
    }

    /// 4-connected neighbours in a fixed order: up, right, down, left.
    pub fn neighbors(self) -> [Cell; 4] {
        [
            Cell { row: self.row - 1, col: self.col },
            Cell { row: self.row, col: self.col + 1 },
            Cell { row: self.row + 1, col: self.col },
            Cell { row: self.row, col: self.col - 1 },
        ]
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CellKind {
    Wall,
    Open,
}

/// Slot index of a pursuer inside the fixed-capacity pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AgentId(pub u16);

pub type RequestId = u64;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mode {
    #[default]
    Patrol,
    Chase,
    Ambush,
    ForcedTarget,
}

/// External override that pins a pursuer's goal regardless of detection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Directive {
    Decoy(Cell),
    Flee,
}

/// `(start, goal)` pair used to coalesce duplicate in-flight requests.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PathSignature {
    pub start: Cell,
    pub goal: Cell,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum SimEvent {
    PlayerCaught { agent: AgentId },
    ObjectiveCollected { cell: Cell, remaining: usize },
    AllObjectivesCollected,
    PursuerSpawned { agent: AgentId, cell: Cell },
    PursuerDespawned { agent: AgentId },
    ModeChanged { agent: AgentId, from: Mode, to: Mode },
    RageStarted,
}
