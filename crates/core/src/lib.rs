pub mod config;
pub mod error;
pub mod grid;
pub mod session;
pub mod sim;
pub mod types;

pub use config::{AiTuning, Difficulty, DifficultyProfile, SessionConfig, StaminaRules};
pub use error::{ConfigError, GridError, PathError};
pub use grid::{CELL_SIZE, Grid, Level, cell_center, world_to_cell};
pub use session::{FrameReport, RenderFrame, Session};
pub use sim::path_service::{PathMode, PathService, PathStats};
pub use sim::player::{PlayerInput, StatusEffect};
pub use types::*;
