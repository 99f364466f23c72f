//! Procedural track model
//!
//! Everything here is pure and deterministic:
//! - Seeded RNG only, owned by the caller
//! - Tracks are immutable once generated
//! - Queries never mutate the track

pub mod generator;
pub mod params;
pub mod query;
pub mod rng;
pub mod segment;

pub use generator::{generate, generate_with_meshes};
pub use params::TrackParams;
pub use query::{
    advance_checkpoint, arc_length_at, is_on_surface, nearest_segment, position_at,
    race_progress, segment_at,
};
pub use rng::TrackRng;
pub use segment::{Checkpoint, SegmentKind, Track, TrackSegment};
