//! Segment mesh construction
//!
//! The track never owns geometry buffers. Each segment keeps a [`MeshHandle`],
//! an index into a renderer-owned [`MeshTable`], and gives it back through
//! [`TrackMeshBuilder::destroy_mesh`] when the track is torn down.

use serde::{Deserialize, Serialize};

use super::vertex::{Vertex, colors};

/// Slot index into a mesh table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MeshHandle(pub u32);

/// Capability the track generator uses to hand segments to a renderer
pub trait TrackMeshBuilder {
    /// Build a road mesh in segment-local space (X across, Z along, Y up)
    fn build_segment_mesh(&mut self, width: f32, length: f32, color: [f32; 4]) -> MeshHandle;
    /// Release a mesh previously returned by `build_segment_mesh`
    fn destroy_mesh(&mut self, handle: MeshHandle);
}

/// Arena of vertex buffers with slot reuse
#[derive(Debug, Default)]
pub struct MeshTable {
    slots: Vec<Option<Vec<Vertex>>>,
    free: Vec<u32>,
}

impl MeshTable {
    pub fn insert(&mut self, vertices: Vec<Vertex>) -> MeshHandle {
        if let Some(index) = self.free.pop() {
            self.slots[index as usize] = Some(vertices);
            MeshHandle(index)
        } else {
            self.slots.push(Some(vertices));
            MeshHandle((self.slots.len() - 1) as u32)
        }
    }

    /// Free a slot; stale or unknown handles are ignored
    pub fn remove(&mut self, handle: MeshHandle) -> Option<Vec<Vertex>> {
        let taken = self.slots.get_mut(handle.0 as usize)?.take();
        if taken.is_some() {
            self.free.push(handle.0);
        }
        taken
    }

    pub fn get(&self, handle: MeshHandle) -> Option<&[Vertex]> {
        self.slots.get(handle.0 as usize)?.as_deref()
    }

    pub fn live_count(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }
}

/// CPU-side builder producing triangle lists ready for upload
#[derive(Debug)]
pub struct VertexMeshBuilder {
    table: MeshTable,
    /// Width of the center lane marking (0 disables it)
    pub marking_width: f32,
}

impl VertexMeshBuilder {
    pub fn new(table: MeshTable) -> Self {
        Self {
            table,
            marking_width: 0.3,
        }
    }

    pub fn table(&self) -> &MeshTable {
        &self.table
    }
}

impl TrackMeshBuilder for VertexMeshBuilder {
    fn build_segment_mesh(&mut self, width: f32, length: f32, color: [f32; 4]) -> MeshHandle {
        let mut vertices = road_quad(width, length, 0.0, color);
        if self.marking_width > 0.0 {
            // Lifted slightly to avoid z-fighting with the road
            vertices.extend(road_quad(self.marking_width, length, 0.01, colors::LANE_MARKING));
        }
        self.table.insert(vertices)
    }

    fn destroy_mesh(&mut self, handle: MeshHandle) {
        if self.table.remove(handle).is_none() {
            log::warn!("destroy_mesh: unknown handle {:?}", handle);
        }
    }
}

/// Two triangles spanning `width` across and `length` along +Z
pub fn road_quad(width: f32, length: f32, height: f32, color: [f32; 4]) -> Vec<Vertex> {
    let half = width / 2.0;
    let bl = Vertex::new(-half, height, 0.0, color);
    let br = Vertex::new(half, height, 0.0, color);
    let tl = Vertex::new(-half, height, length, color);
    let tr = Vertex::new(half, height, length, color);
    vec![bl, br, tl, tl, br, tr]
}
