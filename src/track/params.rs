//! Track generation parameters

use serde::{Deserialize, Serialize};

use crate::consts::MAX_SEGMENTS;

/// Parametric rules for a generated circuit.
///
/// Ordering is not validated: `min_straight > max_straight` yields lengths in
/// the swapped range, which is the caller's problem.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackParams {
    /// Requested segment count (capped at `MAX_SEGMENTS`)
    pub segment_count: usize,
    pub track_width: f32,
    pub min_straight: f32,
    pub max_straight: f32,
    /// Degrees
    pub max_curve_angle: f32,
    pub max_elevation: f32,
    /// Reserved for segment-type weighting, geometry ignores it
    #[serde(default)]
    pub difficulty: f32,
}

impl Default for TrackParams {
    fn default() -> Self {
        Self {
            segment_count: 48,
            track_width: 12.0,
            min_straight: 20.0,
            max_straight: 60.0,
            max_curve_angle: 45.0,
            max_elevation: 6.0,
            difficulty: 0.5,
        }
    }
}

impl TrackParams {
    /// Short, flat circuit
    pub fn sprint() -> Self {
        Self {
            segment_count: 16,
            max_elevation: 0.0,
            difficulty: 0.2,
            ..Self::default()
        }
    }

    /// Long, hilly, twisty circuit
    pub fn endurance() -> Self {
        Self {
            segment_count: 160,
            track_width: 10.0,
            max_curve_angle: 75.0,
            max_elevation: 12.0,
            difficulty: 0.9,
            ..Self::default()
        }
    }

    /// Segment count after applying the capacity limit
    pub fn effective_segment_count(&self) -> usize {
        self.segment_count.min(MAX_SEGMENTS)
    }

    /// Distance between regular checkpoints, in segments
    pub fn checkpoint_stride(&self) -> usize {
        (self.effective_segment_count() / 8).max(1)
    }
}
