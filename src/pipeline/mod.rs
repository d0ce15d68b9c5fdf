//! The mesh round-trip orchestration pipeline.
//!
//! One invocation of [`run`] performs the five phases in order: state
//! capture, mesh export, external-tool invocation, re-import plus UV
//! reconciliation, and unconditional cleanup/restore. Control flow is
//! strictly sequential and single-threaded; the external-tool call
//! blocks until the subprocess exits, and cancellation mid-run is not
//! supported; the only exit path is through cleanup.
//!
//! Every transient object a run creates (temporary files, the imported
//! mesh, the transfer modifier) is tracked in [`RunResources`], a
//! small owned-resource list torn down deterministically on every exit
//! path. At the moment cleanup finishes, none of them exist and the
//! host's interaction mode equals the one captured at start.

pub mod capture;
pub mod cleanup;
pub mod export;
pub mod reconcile;
pub mod tool;

use std::path::{Path, PathBuf};

use crate::asset::TempAsset;
use crate::bridge_error::UvBridgeError;
use crate::config::UnwrapConfig;
use crate::host::{Host, InteractionMode, MeshHandle, ModifierHandle};
use crate::prefs::ToolPreferences;

pub use tool::UnwrapTool;

/// Fixed island margin used by the auto-reunwrap convenience pass.
pub const DEFAULT_MARGIN: f64 = 0.001;

/// Per-invocation pipeline options.
///
/// `config` is forwarded to the external tool; the remaining fields
/// are pipeline-side switches that never appear on its command line.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Options serialized onto the external tool's command line.
    pub config: UnwrapConfig,
    /// Re-run the host's own angle-based unwrap and island packing
    /// after the transfer, seeded by the regenerated seams. A
    /// convenience re-derivation, not required for transfer
    /// correctness.
    pub auto_reunwrap: bool,
    /// Island margin for the auto-reunwrap and packing passes.
    pub margin: f64,
    /// Diagnostic override: create the per-run temporary directory
    /// inside this directory instead of the system default. Assets are
    /// deleted on exit either way.
    pub work_dir: Option<PathBuf>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            config: UnwrapConfig::default(),
            auto_reunwrap: true,
            margin: DEFAULT_MARGIN,
            work_dir: None,
        }
    }
}

/// Host state captured at run start; read-only afterwards, used only
/// during restore.
#[derive(Debug, Clone)]
pub struct RunState {
    /// The original mesh. The pipeline never destroys it.
    pub mesh: MeshHandle,
    /// Interaction mode active when the run started.
    pub original_mode: InteractionMode,
    /// Name of the active UV channel at start, if any.
    pub selected_uv_channel: Option<String>,
}

/// Owned-resource list for one run.
///
/// Everything here is torn down by [`cleanup::cleanup_and_restore`],
/// which runs exactly once per invocation regardless of which phase
/// failed.
#[derive(Debug)]
pub struct RunResources {
    dir: Option<tempfile::TempDir>,
    pub(crate) input: TempAsset,
    pub(crate) output: TempAsset,
    pub(crate) imported: Option<MeshHandle>,
    pub(crate) modifier: Option<(MeshHandle, ModifierHandle)>,
}

impl RunResources {
    /// Allocate the per-run temporary directory and both asset paths.
    /// The files themselves are written later (export, then the tool).
    pub(crate) fn create(work_dir: Option<&Path>) -> Result<Self, UvBridgeError> {
        let builder = {
            let mut b = tempfile::Builder::new();
            b.prefix("uv-bridge-");
            b
        };
        let dir = match work_dir {
            Some(parent) => builder.tempdir_in(parent)?,
            None => builder.tempdir()?,
        };
        let input = TempAsset::new(dir.path().join("input.obj"));
        let output = TempAsset::new(dir.path().join("output.obj"));
        Ok(Self {
            dir: Some(dir),
            input,
            output,
            imported: None,
            modifier: None,
        })
    }

    pub(crate) fn take_dir(&mut self) -> Option<tempfile::TempDir> {
        self.dir.take()
    }
}

/// Outcome of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Name of the UV channel on the original mesh that now carries
    /// the unwrapped data.
    pub uv_channel: String,
    /// Vertex count of the re-imported mesh.
    pub imported_vertices: usize,
    /// Whether UV data was transferred (false for degenerate tool
    /// output without a UV channel).
    pub transferred: bool,
    /// Whether the host's unwrap/pack heuristics ran afterwards.
    pub reunwrapped: bool,
}

/// Execute one full pipeline run against `host`.
///
/// Errors raised in any forward phase abort the remaining steps but
/// always route through cleanup/restore before surfacing; cleanup's
/// own failures are logged and swallowed. A failed run returns `Err`;
/// it is never reported as a completed operation.
pub fn run<H: Host>(
    host: &mut H,
    prefs: &ToolPreferences,
    options: &RunOptions,
) -> Result<RunSummary, UvBridgeError> {
    options.config.validate()?;
    // Executable validation happens before any export occurs.
    let tool = UnwrapTool::from_prefs(prefs)?;
    // Pure read; nothing to clean up if this fails.
    let state = capture::capture(host)?;

    let mut resources = RunResources::create(options.work_dir.as_deref())?;
    let result = forward(host, &tool, options, &state, &mut resources);
    cleanup::cleanup_and_restore(host, &state, &mut resources);

    match &result {
        Ok(summary) => log::info!(
            "UV round-trip completed on {}: channel '{}', {} imported vertices",
            state.mesh,
            summary.uv_channel,
            summary.imported_vertices
        ),
        Err(e) => log::debug!("UV round-trip failed in {} phase: {e}", e.phase()),
    }
    result
}

/// Phases 2–4. Any error here still routes through cleanup in [`run`].
fn forward<H: Host>(
    host: &mut H,
    tool: &UnwrapTool,
    options: &RunOptions,
    state: &RunState,
    resources: &mut RunResources,
) -> Result<RunSummary, UvBridgeError> {
    // Exports and imports happen at object level.
    host.set_interaction_mode(InteractionMode::Object)?;
    export::export_mesh(host, state.mesh, &mut resources.input)?;
    tool.invoke(&mut resources.input, &mut resources.output, &options.config)?;
    reconcile::reconcile(host, state, options, resources)
}
