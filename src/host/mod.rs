//! Host-API seam: the narrow interface the pipeline needs from an
//! interactive 3-D modeling host.
//!
//! The pipeline treats the host as a black-box collaborator with its
//! own failure reporting: get/set the active mesh and interaction
//! mode, export/import meshes through files, enumerate/rename/create
//! UV channels, create/apply/remove attribute-transfer operations, and
//! run the host's built-in unwrap/pack/seam heuristics. Any type
//! implementing [`Host`] can drive a run; [`memory::InMemoryHost`] is a
//! complete in-process implementation.

pub mod memory;

use std::path::Path;

use thiserror::Error;

/// Opaque handle to a host-resident mesh object.
///
/// Handles are issued by the host and are only meaningful to the host
/// that issued them. The pipeline never destroys the original mesh it
/// was handed; only meshes it imported itself.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub struct MeshHandle(pub u64);

impl std::fmt::Display for MeshHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "mesh#{}", self.0)
    }
}

/// Opaque handle to a transient attribute-transfer modifier bound to a
/// (target mesh, source mesh) pair.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
pub struct ModifierHandle(pub u64);

impl std::fmt::Display for ModifierHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "modifier#{}", self.0)
    }
}

/// Host interaction mode captured at run start and restored on exit.
#[derive(Debug, Copy, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum InteractionMode {
    /// Object-level manipulation; exports and imports happen here.
    Object,
    /// Mesh-element editing (vertices/edges/faces/UVs).
    Edit,
    /// Sculpting.
    Sculpt,
    /// Texture painting.
    TexturePaint,
}

/// Errors reported by host API calls.
#[derive(Debug, Error)]
pub enum HostError {
    /// The handle does not name a live mesh in this host.
    #[error("unknown mesh handle {0}")]
    UnknownMesh(MeshHandle),

    /// The handle does not name a live modifier on the given mesh.
    #[error("unknown modifier handle {0}")]
    UnknownModifier(ModifierHandle),

    /// A UV channel index was out of bounds for the mesh.
    #[error("mesh {mesh} has no UV channel at index {index}")]
    UnknownUvChannel { mesh: MeshHandle, index: usize },

    /// The host facility reported a failure.
    #[error("{0}")]
    Failed(String),

    /// IO error surfaced by an export/import facility.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// The capability set the pipeline depends on.
///
/// All calls are synchronous. Mutating calls take `&mut self`; the
/// pipeline owns the host exclusively for the duration of one run,
/// cooperating single-threaded with the host's main loop.
pub trait Host {
    /// The currently active object, if it is a mesh. Returns `None`
    /// both when nothing is selected and when the active object is not
    /// a mesh.
    fn active_mesh(&self) -> Option<MeshHandle>;

    /// Current interaction mode.
    fn interaction_mode(&self) -> InteractionMode;

    /// Switch the interaction mode.
    fn set_interaction_mode(&mut self, mode: InteractionMode) -> Result<(), HostError>;

    /// Make `mesh` the sole selected and active object, clearing any
    /// other selection so a subsequent export is unambiguous.
    fn select_only(&mut self, mesh: MeshHandle) -> Result<(), HostError>;

    /// Export the current selection to `path` in a neutral polygon
    /// interchange format, including vertex normals, excluding
    /// material references.
    fn export_selected(&mut self, path: &Path) -> Result<(), HostError>;

    /// Import a mesh file as a new object and return its handle. The
    /// imported object becomes selected and active.
    fn import_mesh(&mut self, path: &Path) -> Result<MeshHandle, HostError>;

    /// Destroy a mesh object and unlink it from any host collection.
    fn destroy_mesh(&mut self, mesh: MeshHandle) -> Result<(), HostError>;

    /// Number of vertices in the mesh.
    fn vertex_count(&self, mesh: MeshHandle) -> Result<usize, HostError>;

    /// Number of polygons in the mesh.
    fn polygon_count(&self, mesh: MeshHandle) -> Result<usize, HostError>;

    /// Names of the mesh's UV channels, in channel order.
    fn uv_channel_names(&self, mesh: MeshHandle) -> Result<Vec<String>, HostError>;

    /// Name of the active UV channel, or `None` if the mesh has no UV
    /// channels.
    fn active_uv_channel(&self, mesh: MeshHandle) -> Result<Option<String>, HostError>;

    /// Create a UV channel named `name` and make it active. Hosts that
    /// already have a channel with this name activate the existing one
    /// instead of duplicating it.
    fn create_uv_channel(&mut self, mesh: MeshHandle, name: &str) -> Result<(), HostError>;

    /// Rename the UV channel at `index`.
    fn rename_uv_channel(
        &mut self,
        mesh: MeshHandle,
        index: usize,
        name: &str,
    ) -> Result<(), HostError>;

    /// Create a loop-domain UV attribute-transfer modifier on `target`
    /// sourcing from `source`, using nearest-polygon-by-normal
    /// correspondence: for each target loop, select the source polygon
    /// whose surface normal is closest in orientation among spatially
    /// nearest candidates, then sample its UV at the nearest
    /// corresponding corner.
    fn add_uv_transfer_modifier(
        &mut self,
        target: MeshHandle,
        source: MeshHandle,
    ) -> Result<ModifierHandle, HostError>;

    /// Apply (bake) a modifier onto its target mesh. The modifier
    /// definition remains until [`Host::remove_modifier`] is called.
    fn apply_modifier(
        &mut self,
        target: MeshHandle,
        modifier: ModifierHandle,
    ) -> Result<(), HostError>;

    /// Remove a modifier definition from its target mesh.
    fn remove_modifier(
        &mut self,
        target: MeshHandle,
        modifier: ModifierHandle,
    ) -> Result<(), HostError>;

    /// Select all UV elements on the mesh's active channel.
    fn select_all_uvs(&mut self, mesh: MeshHandle) -> Result<(), HostError>;

    /// Deselect all UV elements on the mesh's active channel.
    fn deselect_all_uvs(&mut self, mesh: MeshHandle) -> Result<(), HostError>;

    /// Regenerate edge seams from the UV island boundaries of the
    /// active channel.
    fn seams_from_islands(&mut self, mesh: MeshHandle) -> Result<(), HostError>;

    /// Run the host's angle-based unwrap heuristic, seeded by existing
    /// seams, with the given island margin.
    fn unwrap_angle_based(&mut self, mesh: MeshHandle, margin: f64) -> Result<(), HostError>;

    /// Run the host's UV island packing pass with the given margin.
    fn pack_islands(&mut self, mesh: MeshHandle, margin: f64) -> Result<(), HostError>;
}
