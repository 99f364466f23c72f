//! Vertex types for segment meshes

use bytemuck::{Pod, Zeroable};

/// 3D vertex with position and color
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub color: [f32; 4],
}

impl Vertex {
    pub const fn new(x: f32, y: f32, z: f32, color: [f32; 4]) -> Self {
        Self {
            position: [x, y, z],
            color,
        }
    }

    /// Byte stride of one vertex in an upload buffer
    pub const STRIDE: usize = std::mem::size_of::<Vertex>();
}

/// Colors for track elements
pub mod colors {
    use crate::track::SegmentKind;

    pub const ROAD: [f32; 4] = [0.25, 0.25, 0.28, 1.0];
    pub const CURVE: [f32; 4] = [0.35, 0.3, 0.3, 1.0];
    pub const HILL: [f32; 4] = [0.3, 0.35, 0.3, 1.0];
    pub const LANE_MARKING: [f32; 4] = [0.95, 0.95, 0.9, 1.0];

    /// Base road color for a segment kind
    pub fn for_kind(kind: SegmentKind) -> [f32; 4] {
        match kind {
            SegmentKind::Straight => ROAD,
            SegmentKind::CurveLeft | SegmentKind::CurveRight => CURVE,
            SegmentKind::HillUp | SegmentKind::HillDown => HILL,
        }
    }
}
