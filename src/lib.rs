//! Rockstar Bros - side-scrolling action platformer simulation core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (bodies, collision, actors, combat, rhythm ultimate)
//! - `game`: Frame scheduler facade driven by host key state
//! - `settings`: Control bindings and persisted preferences
//! - `tuning`: Data-driven game balance

pub mod game;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use game::Game;
pub use settings::{Action, ControlMap, Settings};
pub use tuning::Tuning;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz, one frame per update)
    pub const SIM_DT: f32 = 1.0 / 60.0;

    /// World dimensions
    pub const WORLD_HEIGHT: f32 = 720.0;
    pub const VIEW_WIDTH: f32 = 1280.0;
    /// Default y of the ground line when a level omits it
    pub const DEFAULT_GROUND_Y: f32 = 620.0;
    pub const DEFAULT_STAGE_WIDTH: f32 = 3000.0;

    /// Number of rhythm lanes during the ultimate
    pub const LANE_COUNT: usize = 3;
}
