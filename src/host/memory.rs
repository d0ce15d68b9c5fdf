//! `InMemoryHost`: a complete in-process [`Host`] implementation.
//!
//! Meshes live in a map keyed by handle, export/import go through the
//! OBJ reader/writer, and the UV attribute transfer is implemented for
//! real with nearest-polygon-by-normal correspondence. The built-in
//! unwrap/pack heuristics are host black boxes from the pipeline's
//! point of view, so this host records their invocations (and packing
//! additionally normalizes the active channel into the unit square),
//! enough to observe that the pipeline drives them exactly per
//! contract.

use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;

use crate::host::{Host, HostError, InteractionMode, MeshHandle, ModifierHandle};
use crate::io::obj::{ObjReader, ObjWriter};
use crate::io::{MeshReader, MeshWriter};
use crate::mesh::MeshBuffer;

/// How many spatially nearest source polygons are considered before
/// the normal-orientation tie-break picks one.
const TRANSFER_CANDIDATES: usize = 8;

#[derive(Debug)]
struct UvTransferModifier {
    target: MeshHandle,
    source: MeshHandle,
}

/// The object currently active in the host, which may not be a mesh.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum ActiveObject {
    Mesh(MeshHandle),
    /// A camera, light, or other non-mesh object.
    Other,
}

/// In-process modeling host.
#[derive(Debug, Default)]
pub struct InMemoryHost {
    meshes: BTreeMap<MeshHandle, MeshBuffer>,
    modifiers: BTreeMap<ModifierHandle, UvTransferModifier>,
    selection: Vec<MeshHandle>,
    active: Option<ActiveObject>,
    mode: Option<InteractionMode>,
    uv_selected: BTreeMap<MeshHandle, bool>,
    next_mesh: u64,
    next_modifier: u64,
    unwrap_runs: usize,
    pack_runs: usize,
}

impl InMemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a mesh object, select it exclusively, and make it active.
    pub fn add_mesh(&mut self, mesh: MeshBuffer) -> MeshHandle {
        self.next_mesh += 1;
        let handle = MeshHandle(self.next_mesh);
        self.meshes.insert(handle, mesh);
        self.selection = vec![handle];
        self.active = Some(ActiveObject::Mesh(handle));
        handle
    }

    /// Make a non-mesh object (camera, light, ...) the active object.
    pub fn activate_non_mesh(&mut self) {
        self.selection.clear();
        self.active = Some(ActiveObject::Other);
    }

    /// Clear the active object and selection entirely.
    pub fn clear_active(&mut self) {
        self.selection.clear();
        self.active = None;
    }

    /// Borrow a mesh's data.
    pub fn mesh(&self, handle: MeshHandle) -> Option<&MeshBuffer> {
        self.meshes.get(&handle)
    }

    /// Number of live mesh objects.
    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    /// Number of live modifier definitions across all meshes.
    pub fn modifier_count(&self) -> usize {
        self.modifiers.len()
    }

    /// Times the angle-based unwrap heuristic ran.
    pub fn unwrap_runs(&self) -> usize {
        self.unwrap_runs
    }

    /// Times the island packing pass ran.
    pub fn pack_runs(&self) -> usize {
        self.pack_runs
    }

    /// Whether the mesh's UV elements are currently selected.
    pub fn uvs_selected(&self, mesh: MeshHandle) -> bool {
        self.uv_selected.get(&mesh).copied().unwrap_or(false)
    }

    fn mesh_ref(&self, handle: MeshHandle) -> Result<&MeshBuffer, HostError> {
        self.meshes.get(&handle).ok_or(HostError::UnknownMesh(handle))
    }

    fn mesh_mut(&mut self, handle: MeshHandle) -> Result<&mut MeshBuffer, HostError> {
        self.meshes.get_mut(&handle).ok_or(HostError::UnknownMesh(handle))
    }

    /// Loop-domain UV transfer with nearest-polygon-by-normal
    /// correspondence: for each target loop, gather the spatially
    /// nearest source polygons by centroid, pick the one whose normal
    /// is closest in orientation to the target polygon's, and sample
    /// its UV at the nearest corner. Tolerates the vertex-order
    /// preserving but not loop-order preserving nature of the round
    /// trip.
    fn run_uv_transfer(&mut self, target: MeshHandle, source: MeshHandle) -> Result<(), HostError> {
        let source_mesh = self.mesh_ref(source)?;
        let source_uv = source_mesh
            .active_uv_channel()
            .ok_or_else(|| HostError::Failed("transfer source mesh has no UV channel".into()))?
            .clone();
        if source_mesh.faces.is_empty() {
            return Err(HostError::Failed("transfer source mesh has no polygons".into()));
        }

        let source_centroids: Vec<[f64; 3]> = (0..source_mesh.faces.len())
            .map(|f| source_mesh.face_centroid(f))
            .collect();
        let source_normals: Vec<[f64; 3]> = (0..source_mesh.faces.len())
            .map(|f| source_mesh.face_normal(f))
            .collect();
        let source_faces = source_mesh.faces.clone();
        let source_positions = source_mesh.positions.clone();

        let target_mesh = self.mesh_ref(target)?;
        let active = target_mesh
            .active_uv
            .ok_or_else(|| HostError::Failed("transfer target mesh has no active UV channel".into()))?;

        let mut new_loops = Vec::with_capacity(target_mesh.loop_count());
        for (fi, face) in target_mesh.faces.iter().enumerate() {
            let target_normal = target_mesh.face_normal(fi);
            let centroid = target_mesh.face_centroid(fi);
            for &vertex in face {
                // Sample at the corner position nudged toward the
                // polygon centroid, so coincident corners of adjacent
                // polygons resolve to their own polygon's side.
                let v = target_mesh.positions[vertex as usize];
                let p = [
                    v[0] + (centroid[0] - v[0]) * 0.25,
                    v[1] + (centroid[1] - v[1]) * 0.25,
                    v[2] + (centroid[2] - v[2]) * 0.25,
                ];

                // Spatially nearest candidates by centroid distance.
                let mut ranked: Vec<(f64, usize)> = source_centroids
                    .iter()
                    .enumerate()
                    .map(|(sf, c)| (squared_distance(&p, c), sf))
                    .collect();
                ranked.sort_by(|a, b| a.0.total_cmp(&b.0));
                ranked.truncate(TRANSFER_CANDIDATES);

                // Closest orientation among the candidates; the nearer
                // candidate wins ties.
                let mut best = ranked[0].1;
                let mut best_dot = dot(&source_normals[best], &target_normal);
                for &(_, sf) in &ranked[1..] {
                    let d = dot(&source_normals[sf], &target_normal);
                    if d > best_dot + 1e-12 {
                        best = sf;
                        best_dot = d;
                    }
                }

                // Nearest corner of the chosen polygon supplies the UV.
                let corner = source_faces[best]
                    .iter()
                    .enumerate()
                    .min_by(|a, b| {
                        squared_distance(&p, &source_positions[*a.1 as usize])
                            .total_cmp(&squared_distance(&p, &source_positions[*b.1 as usize]))
                    })
                    .map(|(ci, _)| ci)
                    .unwrap_or(0);

                let loop_base: usize = source_faces[..best].iter().map(Vec::len).sum();
                new_loops.push(source_uv.loops[loop_base + corner]);
            }
        }

        let target_mesh = self.mesh_mut(target)?;
        target_mesh.uv_channels[active].loops = new_loops;
        Ok(())
    }
}

fn squared_distance(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    let dz = a[2] - b[2];
    dx * dx + dy * dy + dz * dz
}

fn dot(a: &[f64; 3], b: &[f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

impl Host for InMemoryHost {
    fn active_mesh(&self) -> Option<MeshHandle> {
        match self.active {
            Some(ActiveObject::Mesh(handle)) => Some(handle),
            _ => None,
        }
    }

    fn interaction_mode(&self) -> InteractionMode {
        self.mode.unwrap_or(InteractionMode::Object)
    }

    fn set_interaction_mode(&mut self, mode: InteractionMode) -> Result<(), HostError> {
        self.mode = Some(mode);
        Ok(())
    }

    fn select_only(&mut self, mesh: MeshHandle) -> Result<(), HostError> {
        if !self.meshes.contains_key(&mesh) {
            return Err(HostError::UnknownMesh(mesh));
        }
        self.selection = vec![mesh];
        self.active = Some(ActiveObject::Mesh(mesh));
        Ok(())
    }

    fn export_selected(&mut self, path: &Path) -> Result<(), HostError> {
        let [mesh] = self.selection.as_slice() else {
            return Err(HostError::Failed(format!(
                "export expects exactly one selected mesh, have {}",
                self.selection.len()
            )));
        };
        let buffer = self.mesh_ref(*mesh)?;
        let file = File::create(path)?;
        ObjWriter
            .write(file, buffer)
            .map_err(|e| HostError::Failed(format!("OBJ export: {e}")))
    }

    fn import_mesh(&mut self, path: &Path) -> Result<MeshHandle, HostError> {
        let file = File::open(path)?;
        let buffer = ObjReader
            .read(file)
            .map_err(|e| HostError::Failed(format!("OBJ import: {e}")))?;
        Ok(self.add_mesh(buffer))
    }

    fn destroy_mesh(&mut self, mesh: MeshHandle) -> Result<(), HostError> {
        self.meshes.remove(&mesh).ok_or(HostError::UnknownMesh(mesh))?;
        self.selection.retain(|&m| m != mesh);
        if self.active == Some(ActiveObject::Mesh(mesh)) {
            self.active = self.selection.first().copied().map(ActiveObject::Mesh);
        }
        self.uv_selected.remove(&mesh);
        self.modifiers.retain(|_, m| m.target != mesh && m.source != mesh);
        Ok(())
    }

    fn vertex_count(&self, mesh: MeshHandle) -> Result<usize, HostError> {
        Ok(self.mesh_ref(mesh)?.positions.len())
    }

    fn polygon_count(&self, mesh: MeshHandle) -> Result<usize, HostError> {
        Ok(self.mesh_ref(mesh)?.faces.len())
    }

    fn uv_channel_names(&self, mesh: MeshHandle) -> Result<Vec<String>, HostError> {
        Ok(self
            .mesh_ref(mesh)?
            .uv_channels
            .iter()
            .map(|c| c.name.clone())
            .collect())
    }

    fn active_uv_channel(&self, mesh: MeshHandle) -> Result<Option<String>, HostError> {
        Ok(self.mesh_ref(mesh)?.active_uv_channel().map(|c| c.name.clone()))
    }

    fn create_uv_channel(&mut self, mesh: MeshHandle, name: &str) -> Result<(), HostError> {
        self.mesh_mut(mesh)?.ensure_uv_channel(name);
        Ok(())
    }

    fn rename_uv_channel(
        &mut self,
        mesh: MeshHandle,
        index: usize,
        name: &str,
    ) -> Result<(), HostError> {
        let buffer = self.mesh_mut(mesh)?;
        let channel = buffer
            .uv_channels
            .get_mut(index)
            .ok_or(HostError::UnknownUvChannel { mesh, index })?;
        channel.name = name.to_string();
        Ok(())
    }

    fn add_uv_transfer_modifier(
        &mut self,
        target: MeshHandle,
        source: MeshHandle,
    ) -> Result<ModifierHandle, HostError> {
        if !self.meshes.contains_key(&target) {
            return Err(HostError::UnknownMesh(target));
        }
        if !self.meshes.contains_key(&source) {
            return Err(HostError::UnknownMesh(source));
        }
        self.next_modifier += 1;
        let handle = ModifierHandle(self.next_modifier);
        self.modifiers.insert(handle, UvTransferModifier { target, source });
        Ok(handle)
    }

    fn apply_modifier(
        &mut self,
        target: MeshHandle,
        modifier: ModifierHandle,
    ) -> Result<(), HostError> {
        let entry = self
            .modifiers
            .get(&modifier)
            .ok_or(HostError::UnknownModifier(modifier))?;
        if entry.target != target {
            return Err(HostError::UnknownModifier(modifier));
        }
        let source = entry.source;
        self.run_uv_transfer(target, source)
    }

    fn remove_modifier(
        &mut self,
        target: MeshHandle,
        modifier: ModifierHandle,
    ) -> Result<(), HostError> {
        match self.modifiers.get(&modifier) {
            Some(entry) if entry.target == target => {
                self.modifiers.remove(&modifier);
                Ok(())
            }
            _ => Err(HostError::UnknownModifier(modifier)),
        }
    }

    fn select_all_uvs(&mut self, mesh: MeshHandle) -> Result<(), HostError> {
        self.mesh_ref(mesh)?;
        self.uv_selected.insert(mesh, true);
        Ok(())
    }

    fn deselect_all_uvs(&mut self, mesh: MeshHandle) -> Result<(), HostError> {
        self.mesh_ref(mesh)?;
        self.uv_selected.insert(mesh, false);
        Ok(())
    }

    fn seams_from_islands(&mut self, mesh: MeshHandle) -> Result<(), HostError> {
        let buffer = self.mesh_ref(mesh)?;
        let Some(channel) = buffer.active_uv_channel() else {
            return Err(HostError::Failed("mesh has no UV channel to derive seams from".into()));
        };

        // Per undirected edge, the UVs each adjacent face assigns to
        // the edge's endpoints. A mismatch marks an island boundary.
        let mut edge_uvs: BTreeMap<(u32, u32), Vec<([f64; 2], [f64; 2])>> = BTreeMap::new();
        for (fi, face) in buffer.faces.iter().enumerate() {
            for ci in 0..face.len() {
                let a = face[ci];
                let b = face[(ci + 1) % face.len()];
                let uv_a = channel.loops[buffer.loop_index(fi, ci)];
                let uv_b = channel.loops[buffer.loop_index(fi, (ci + 1) % face.len())];
                let (key, pair) = if a <= b {
                    ((a, b), (uv_a, uv_b))
                } else {
                    ((b, a), (uv_b, uv_a))
                };
                edge_uvs.entry(key).or_default().push(pair);
            }
        }

        const EPS: f64 = 1e-9;
        let mismatch = |x: &([f64; 2], [f64; 2]), y: &([f64; 2], [f64; 2])| {
            (x.0[0] - y.0[0]).abs() > EPS
                || (x.0[1] - y.0[1]).abs() > EPS
                || (x.1[0] - y.1[0]).abs() > EPS
                || (x.1[1] - y.1[1]).abs() > EPS
        };
        let seams: Vec<(u32, u32)> = edge_uvs
            .iter()
            .filter(|(_, sides)| {
                sides.len() >= 2 && sides[1..].iter().any(|s| mismatch(s, &sides[0]))
            })
            .map(|(&edge, _)| edge)
            .collect();

        let buffer = self.mesh_mut(mesh)?;
        buffer.seams.clear();
        buffer.seams.extend(seams);
        Ok(())
    }

    fn unwrap_angle_based(&mut self, mesh: MeshHandle, _margin: f64) -> Result<(), HostError> {
        self.mesh_ref(mesh)?;
        self.unwrap_runs += 1;
        Ok(())
    }

    fn pack_islands(&mut self, mesh: MeshHandle, margin: f64) -> Result<(), HostError> {
        let buffer = self.mesh_mut(mesh)?;
        let Some(active) = buffer.active_uv else {
            return Err(HostError::Failed("mesh has no UV channel to pack".into()));
        };
        // Normalize the channel into the unit square, margin inset.
        let loops = &mut buffer.uv_channels[active].loops;
        if !loops.is_empty() {
            let (mut min_u, mut min_v) = (f64::INFINITY, f64::INFINITY);
            let (mut max_u, mut max_v) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
            for uv in loops.iter() {
                min_u = min_u.min(uv[0]);
                min_v = min_v.min(uv[1]);
                max_u = max_u.max(uv[0]);
                max_v = max_v.max(uv[1]);
            }
            let span_u = (max_u - min_u).max(f64::EPSILON);
            let span_v = (max_v - min_v).max(f64::EPSILON);
            let scale = (1.0 - 2.0 * margin) / span_u.max(span_v);
            for uv in loops.iter_mut() {
                uv[0] = margin + (uv[0] - min_u) * scale;
                uv[1] = margin + (uv[1] - min_v) * scale;
            }
        }
        self.pack_runs += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::UvChannel;

    /// Two unit quads side by side in the XY plane.
    fn two_quads() -> MeshBuffer {
        MeshBuffer {
            positions: vec![
                [0.0, 0.0, 0.0],
                [1.0, 0.0, 0.0],
                [1.0, 1.0, 0.0],
                [0.0, 1.0, 0.0],
                [2.0, 0.0, 0.0],
                [2.0, 1.0, 0.0],
            ],
            normals: vec![[0.0, 0.0, 1.0]; 6],
            faces: vec![vec![0, 1, 2, 3], vec![1, 4, 5, 2]],
            ..Default::default()
        }
    }

    fn with_uvs(mut mesh: MeshBuffer, name: &str, loops: Vec<[f64; 2]>) -> MeshBuffer {
        mesh.uv_channels.push(UvChannel { name: name.into(), loops });
        mesh.active_uv = Some(mesh.uv_channels.len() - 1);
        mesh
    }

    #[test]
    fn active_mesh_is_none_for_non_mesh_object() {
        let mut host = InMemoryHost::new();
        host.add_mesh(two_quads());
        host.activate_non_mesh();
        assert_eq!(host.active_mesh(), None);
    }

    #[test]
    fn transfer_copies_uvs_between_identical_geometry() {
        let mut host = InMemoryHost::new();
        let source_uvs: Vec<[f64; 2]> = (0..8).map(|i| [i as f64 * 0.1, 0.5]).collect();
        let source = host.add_mesh(with_uvs(two_quads(), "UVMap", source_uvs.clone()));
        let target = host.add_mesh(with_uvs(two_quads(), "UVMap", vec![[0.0, 0.0]; 8]));

        let modifier = host.add_uv_transfer_modifier(target, source).expect("add");
        host.apply_modifier(target, modifier).expect("apply");
        host.remove_modifier(target, modifier).expect("remove");

        let got = &host.mesh(target).unwrap().uv_channels[0].loops;
        assert_eq!(got, &source_uvs);
        assert_eq!(host.modifier_count(), 0);
    }

    #[test]
    fn transfer_fails_without_source_uvs() {
        let mut host = InMemoryHost::new();
        let source = host.add_mesh(two_quads());
        let target = host.add_mesh(with_uvs(two_quads(), "UVMap", vec![[0.0, 0.0]; 8]));
        let modifier = host.add_uv_transfer_modifier(target, source).expect("add");
        assert!(host.apply_modifier(target, modifier).is_err());
    }

    #[test]
    fn seams_appear_only_on_uv_discontinuities() {
        let mut host = InMemoryHost::new();
        // Faces agree on the shared edge (1,2): no seam.
        let continuous = vec![
            [0.0, 0.0], [0.5, 0.0], [0.5, 1.0], [0.0, 1.0],
            [0.5, 0.0], [1.0, 0.0], [1.0, 1.0], [0.5, 1.0],
        ];
        let mesh = host.add_mesh(with_uvs(two_quads(), "UVMap", continuous));
        host.seams_from_islands(mesh).expect("seams");
        assert!(host.mesh(mesh).unwrap().seams.is_empty());

        // Disagreeing UVs across the shared edge: one seam.
        let split = vec![
            [0.0, 0.0], [0.4, 0.0], [0.4, 1.0], [0.0, 1.0],
            [0.6, 0.0], [1.0, 0.0], [1.0, 1.0], [0.6, 1.0],
        ];
        let mesh = host.add_mesh(with_uvs(two_quads(), "UVMap", split));
        host.seams_from_islands(mesh).expect("seams");
        assert_eq!(
            host.mesh(mesh).unwrap().seams.iter().copied().collect::<Vec<_>>(),
            vec![(1, 2)]
        );
    }

    #[test]
    fn pack_islands_normalizes_into_unit_square() {
        let mut host = InMemoryHost::new();
        let uvs = vec![
            [2.0, 2.0], [4.0, 2.0], [4.0, 4.0], [2.0, 4.0],
            [4.0, 2.0], [6.0, 2.0], [6.0, 4.0], [4.0, 4.0],
        ];
        let mesh = host.add_mesh(with_uvs(two_quads(), "UVMap", uvs));
        host.pack_islands(mesh, 0.001).expect("pack");
        for uv in &host.mesh(mesh).unwrap().uv_channels[0].loops {
            assert!(uv[0] >= 0.0 && uv[0] <= 1.0 && uv[1] >= 0.0 && uv[1] <= 1.0, "{uv:?}");
        }
        assert_eq!(host.pack_runs(), 1);
    }

    #[test]
    fn destroy_mesh_unlinks_selection_and_modifiers() {
        let mut host = InMemoryHost::new();
        let a = host.add_mesh(two_quads());
        let b = host.add_mesh(with_uvs(two_quads(), "UVMap", vec![[0.0, 0.0]; 8]));
        let modifier = host.add_uv_transfer_modifier(a, b).expect("add");
        host.destroy_mesh(b).expect("destroy");
        assert_eq!(host.mesh_count(), 1);
        assert_eq!(host.modifier_count(), 0);
        assert!(matches!(
            host.remove_modifier(a, modifier),
            Err(HostError::UnknownModifier(_))
        ));
    }

    #[test]
    fn export_requires_exactly_one_selected_mesh() {
        let mut host = InMemoryHost::new();
        host.add_mesh(two_quads());
        host.clear_active();
        let dir = tempfile::tempdir().expect("tempdir");
        assert!(host.export_selected(&dir.path().join("out.obj")).is_err());
    }
}
