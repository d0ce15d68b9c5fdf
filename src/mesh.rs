//! `MeshBuffer`: neutral polygon-mesh value type.
//!
//! This is the in-memory representation used by the OBJ reader/writer
//! and by [`crate::host::memory::InMemoryHost`]. Geometry is stored as
//! positions and per-vertex normals, topology as polygon faces of
//! vertex indices, and texture coordinates as named per-loop UV
//! channels. A "loop" is one corner of one face; loops are numbered by
//! flattening faces in order.

use std::collections::BTreeSet;

use crate::bridge_error::UvBridgeError;

/// Default name given to a UV channel created when none exists.
pub const DEFAULT_UV_CHANNEL: &str = "UVMap";

/// A named per-loop set of 2-D texture coordinates.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct UvChannel {
    /// Channel name, unique within a mesh.
    pub name: String,
    /// One UV per loop, in flattened loop order.
    pub loops: Vec<[f64; 2]>,
}

/// A polygon mesh with vertex normals, named UV channels, and seam
/// edges.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct MeshBuffer {
    /// Vertex positions.
    pub positions: Vec<[f64; 3]>,
    /// Per-vertex normals; empty or one per vertex.
    pub normals: Vec<[f64; 3]>,
    /// Polygon faces as vertex indices into `positions`.
    pub faces: Vec<Vec<u32>>,
    /// Named UV channels; each channel has one UV per loop.
    pub uv_channels: Vec<UvChannel>,
    /// Index into `uv_channels` of the active channel.
    pub active_uv: Option<usize>,
    /// Edges marked as UV discontinuity boundaries, stored with the
    /// smaller vertex index first.
    pub seams: BTreeSet<(u32, u32)>,
}

impl MeshBuffer {
    /// Total number of loops (face corners).
    pub fn loop_count(&self) -> usize {
        self.faces.iter().map(Vec::len).sum()
    }

    /// Flattened loop index of corner `corner` of face `face`.
    pub fn loop_index(&self, face: usize, corner: usize) -> usize {
        self.faces[..face].iter().map(Vec::len).sum::<usize>() + corner
    }

    /// The active UV channel, if any.
    pub fn active_uv_channel(&self) -> Option<&UvChannel> {
        self.active_uv.and_then(|i| self.uv_channels.get(i))
    }

    /// Index of the UV channel named `name`.
    pub fn uv_channel_index(&self, name: &str) -> Option<usize> {
        self.uv_channels.iter().position(|c| c.name == name)
    }

    /// Add a UV channel with all-zero coordinates and make it active.
    /// If a channel with this name already exists it is activated
    /// instead, so repeated reconciliation never accumulates duplicate
    /// channels.
    pub fn ensure_uv_channel(&mut self, name: &str) -> usize {
        if let Some(idx) = self.uv_channel_index(name) {
            self.active_uv = Some(idx);
            return idx;
        }
        self.uv_channels.push(UvChannel {
            name: name.to_string(),
            loops: vec![[0.0, 0.0]; self.loop_count()],
        });
        let idx = self.uv_channels.len() - 1;
        self.active_uv = Some(idx);
        idx
    }

    /// Geometric centroid of face `face`.
    pub fn face_centroid(&self, face: usize) -> [f64; 3] {
        let verts = &self.faces[face];
        let mut sum = [0.0f64; 3];
        for &v in verts {
            let p = self.positions[v as usize];
            sum[0] += p[0];
            sum[1] += p[1];
            sum[2] += p[2];
        }
        let inv = 1.0 / verts.len().max(1) as f64;
        [sum[0] * inv, sum[1] * inv, sum[2] * inv]
    }

    /// Surface normal of face `face` via Newell's method (handles
    /// non-planar polygons). Not normalized when the face is
    /// degenerate.
    pub fn face_normal(&self, face: usize) -> [f64; 3] {
        let verts = &self.faces[face];
        let mut n = [0.0f64; 3];
        for i in 0..verts.len() {
            let a = self.positions[verts[i] as usize];
            let b = self.positions[verts[(i + 1) % verts.len()] as usize];
            n[0] += (a[1] - b[1]) * (a[2] + b[2]);
            n[1] += (a[2] - b[2]) * (a[0] + b[0]);
            n[2] += (a[0] - b[0]) * (a[1] + b[1]);
        }
        let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
        if len > 0.0 {
            [n[0] / len, n[1] / len, n[2] / len]
        } else {
            n
        }
    }

    /// Check structural consistency: face indices in bounds, normals
    /// either absent or per-vertex, every UV channel loop-complete.
    pub fn validate(&self) -> Result<(), UvBridgeError> {
        let vcount = self.positions.len() as u32;
        for (fi, face) in self.faces.iter().enumerate() {
            if face.len() < 3 {
                return Err(UvBridgeError::MeshIoParse(format!(
                    "face {fi} has fewer than 3 vertices"
                )));
            }
            if let Some(&v) = face.iter().find(|&&v| v >= vcount) {
                return Err(UvBridgeError::MeshIoParse(format!(
                    "face {fi} references vertex {v} out of {vcount}"
                )));
            }
        }
        if !self.normals.is_empty() && self.normals.len() != self.positions.len() {
            return Err(UvBridgeError::MeshIoParse(format!(
                "normal count {} does not match vertex count {}",
                self.normals.len(),
                self.positions.len()
            )));
        }
        let loops = self.loop_count();
        for channel in &self.uv_channels {
            if channel.loops.len() != loops {
                return Err(UvBridgeError::MeshIoParse(format!(
                    "UV channel '{}' has {} loops, mesh has {loops}",
                    channel.name,
                    channel.loops.len()
                )));
            }
        }
        Ok(())
    }
}
