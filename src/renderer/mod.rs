//! Rendering-side data for track segments
//!
//! Only CPU mesh data lives here; uploading it is the platform backend's job.

pub mod mesh;
pub mod vertex;

pub use mesh::{MeshHandle, MeshTable, TrackMeshBuilder, VertexMeshBuilder};
pub use vertex::{Vertex, colors};
