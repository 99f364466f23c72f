//! Racing Line - procedural tracks and AI drivers
//!
//! Core modules:
//! - `track`: Seeded track generation and arc-length/spatial queries
//! - `ai`: Per-vehicle AI controller driving against a generated track
//! - `race`: Race session (lap counting, standings, fixed timestep loop)
//! - `renderer`: Mesh builder capability and CPU vertex meshes for segments
//! - `settings`: Data-driven race configuration

pub mod ai;
pub mod race;
pub mod renderer;
pub mod settings;
pub mod track;

pub use ai::{AiController, AiError, AiState, Difficulty};
pub use race::RaceSession;
pub use settings::RaceSettings;
pub use track::{Track, TrackParams, TrackRng, generate};

use glam::Vec3;

/// Engine configuration constants
pub mod consts {
    /// Fixed simulation timestep (120 Hz)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Hard cap on generated segments
    pub const MAX_SEGMENTS: usize = 256;
    /// Hard cap on generated checkpoints
    pub const MAX_CHECKPOINTS: usize = 32;
    /// Minimum curve angle (degrees)
    pub const MIN_CURVE_ANGLE: f32 = 15.0;
    /// Minimum hill elevation delta
    pub const MIN_ELEVATION: f32 = 1.0;

    /// Extra lateral slack beyond half the lane width before a point is off track
    pub const SURFACE_TOLERANCE: f32 = 2.0;
}

/// Horizontal unit direction for a heading angle (radians, 0 = +Z, positive turns right)
#[inline]
pub fn heading_to_direction(heading: f32) -> Vec3 {
    Vec3::new(heading.sin(), 0.0, heading.cos())
}

/// Horizontal right-hand axis for a travel direction (Y up)
#[inline]
pub fn right_of(direction: Vec3) -> Vec3 {
    Vec3::new(direction.z, 0.0, -direction.x).normalize_or_zero()
}
