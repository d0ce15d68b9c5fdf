//! Cleanup/Restore: unconditional teardown and host-state restoration.
//!
//! Runs exactly once per pipeline invocation, on every exit path. Its
//! own failures (a file already deleted, a mesh the host already
//! dropped) are logged and swallowed so restoration of host state is
//! never skipped.

use crate::host::Host;
use crate::pipeline::{RunResources, RunState};

/// Tear down everything the run created and restore the captured host
/// state, in dependency order: temporary files, then the transfer
/// modifier (if still live), then the imported mesh, then UV
/// deselection and the original interaction mode.
pub fn cleanup_and_restore<H: Host>(host: &mut H, state: &RunState, resources: &mut RunResources) {
    if let Err(e) = resources.input.delete() {
        log::warn!("cleanup: deleting input {:?}: {e}", resources.input.path());
    }
    if let Err(e) = resources.output.delete() {
        log::warn!("cleanup: deleting output {:?}: {e}", resources.output.path());
    }

    // A modifier still tracked here was created but never removed
    // (apply or a later step failed).
    if let Some((target, modifier)) = resources.modifier.take() {
        if let Err(e) = host.remove_modifier(target, modifier) {
            log::warn!("cleanup: removing {modifier} from {target}: {e}");
        }
    }

    if let Some(imported) = resources.imported.take() {
        if let Err(e) = host.destroy_mesh(imported) {
            log::warn!("cleanup: destroying imported {imported}: {e}");
        }
    }

    // Restoration is scoped to the original object: reselect it,
    // clear UV selection, and put the mode back.
    if let Err(e) = host.select_only(state.mesh) {
        log::warn!("cleanup: reselecting {}: {e}", state.mesh);
    }
    if let Err(e) = host.deselect_all_uvs(state.mesh) {
        log::warn!("cleanup: deselecting UVs on {}: {e}", state.mesh);
    }
    if let Err(e) = host.set_interaction_mode(state.original_mode) {
        log::warn!("cleanup: restoring mode {:?}: {e}", state.original_mode);
    }

    if let Some(dir) = resources.take_dir() {
        if let Err(e) = dir.close() {
            log::warn!("cleanup: removing temp directory: {e}");
        }
    }
}
