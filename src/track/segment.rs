//! Track data model
//!
//! A track is built once by the generator and then only read. Per-vehicle
//! race state (last checkpoint passed, laps) lives in `race`, never here.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::renderer::{MeshHandle, TrackMeshBuilder};

/// Geometric kind of a segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SegmentKind {
    #[default]
    Straight,
    CurveLeft,
    CurveRight,
    HillUp,
    HillDown,
}

impl SegmentKind {
    /// Classify a uniform roll using fixed cumulative thresholds
    pub fn from_roll(r: f32) -> Self {
        if r < 0.4 {
            SegmentKind::Straight
        } else if r < 0.6 {
            SegmentKind::CurveLeft
        } else if r < 0.8 {
            SegmentKind::CurveRight
        } else if r < 0.9 {
            SegmentKind::HillUp
        } else {
            SegmentKind::HillDown
        }
    }

    pub fn is_curve(&self) -> bool {
        matches!(self, SegmentKind::CurveLeft | SegmentKind::CurveRight)
    }

    pub fn is_hill(&self) -> bool {
        matches!(self, SegmentKind::HillUp | SegmentKind::HillDown)
    }
}

/// One lane-width stretch of road
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackSegment {
    pub kind: SegmentKind,
    pub start_position: Vec3,
    pub end_position: Vec3,
    /// Unit heading at the segment's end (horizontal)
    pub direction: Vec3,
    pub length: f32,
    pub width: f32,
    /// Signed heading delta in degrees (negative = left)
    pub curve_angle: f32,
    /// Signed Y delta over the segment
    pub elevation_change: f32,
    /// Renderer-owned mesh slot, if a builder was supplied
    #[serde(skip)]
    pub mesh: Option<MeshHandle>,
}

impl TrackSegment {
    pub fn midpoint(&self) -> Vec3 {
        self.start_position.lerp(self.end_position, 0.5)
    }

    /// Signed distance of `pos` along the segment's heading, measured from its start
    #[inline]
    pub fn longitudinal_offset(&self, pos: Vec3) -> f32 {
        (pos - self.start_position).dot(self.direction)
    }

    /// Signed distance of `pos` from the centerline (positive = right)
    #[inline]
    pub fn lateral_offset(&self, pos: Vec3) -> f32 {
        (pos - self.start_position).dot(crate::right_of(self.direction))
    }
}

/// A progress gate. Must be passed in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub position: Vec3,
    pub direction: Vec3,
    pub width: f32,
    /// Index of the segment this gate was placed on
    pub segment_index: usize,
}

/// A generated closed circuit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Track {
    pub segments: Vec<TrackSegment>,
    pub checkpoints: Vec<Checkpoint>,
    pub total_length: f32,
    pub start_position: Vec3,
    pub start_direction: Vec3,
    /// Generation seed, kept for reproducibility
    pub seed: u32,
}

impl Track {
    /// Empty track at the given start pose
    pub fn empty(seed: u32, start_position: Vec3, start_direction: Vec3) -> Self {
        Self {
            segments: Vec::new(),
            checkpoints: Vec::new(),
            total_length: 0.0,
            start_position,
            start_direction,
            seed,
        }
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    pub fn checkpoint_count(&self) -> usize {
        self.checkpoints.len()
    }

    /// Lane width (constant per track), zero for a degenerate track
    pub fn width(&self) -> f32 {
        self.segments.first().map(|s| s.width).unwrap_or(0.0)
    }

    /// Index of the start/finish checkpoint
    pub fn finish_checkpoint(&self) -> Option<usize> {
        self.checkpoints.len().checked_sub(1)
    }

    /// Tear down the track, handing every segment mesh back to the renderer
    pub fn release_meshes(self, builder: &mut dyn TrackMeshBuilder) {
        let mut released = 0;
        for handle in self.segments.into_iter().filter_map(|s| s.mesh) {
            builder.destroy_mesh(handle);
            released += 1;
        }
        log::debug!("Track {}: released {} segment meshes", self.seed, released);
    }
}
