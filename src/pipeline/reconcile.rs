//! Importer + Reconciler: bring the tool's UV layout back onto the
//! original mesh.
//!
//! The external tool guarantees geometric correspondence (same
//! vertex/face topology order) with the exported input but returns its
//! own fresh UV channel layout, typically at channel index 0. The
//! transfer therefore uses nearest-polygon-by-normal correspondence
//! rather than assuming loop-order identity.

use crate::bridge_error::UvBridgeError;
use crate::host::{Host, InteractionMode};
use crate::mesh::DEFAULT_UV_CHANNEL;
use crate::pipeline::{RunOptions, RunResources, RunState, RunSummary};

/// Reconciliation steps, in order:
///
/// 1. Ensure the original mesh has a UV channel; create a
///    default-named one when it has none and treat that name as the
///    selected channel.
/// 2. Import the tool's output as a new mesh, tracked in `resources`.
/// 3. Reject topology that does not admit the transfer (zero
///    polygons).
/// 4. Degenerate output without a UV channel bypasses the transfer.
/// 5. Otherwise rename the imported mesh's first channel to the
///    selected name, then create, apply, and remove a loop-domain UV
///    transfer modifier (the transfer is baked, not kept live).
/// 6. Re-enter edit mode, select all UV elements, and regenerate
///    seams from the UV island boundaries.
/// 7. If enabled, re-run the host's angle-based unwrap seeded by
///    those seams, then pack islands, both with the fixed margin.
pub fn reconcile<H: Host>(
    host: &mut H,
    state: &RunState,
    options: &RunOptions,
    resources: &mut RunResources,
) -> Result<RunSummary, UvBridgeError> {
    let uv_channel = match &state.selected_uv_channel {
        Some(name) => name.clone(),
        None => {
            host.create_uv_channel(state.mesh, DEFAULT_UV_CHANNEL)
                .map_err(|e| UvBridgeError::NoUvChannel(e.to_string()))?;
            DEFAULT_UV_CHANNEL.to_string()
        }
    };

    let imported = host
        .import_mesh(resources.output.path())
        .map_err(|e| UvBridgeError::Import(e.to_string()))?;
    resources.output.mark_consumed();
    resources.imported = Some(imported);

    let polygons = host
        .polygon_count(imported)
        .map_err(|e| UvBridgeError::Reconciliation(e.to_string()))?;
    if polygons == 0 {
        return Err(UvBridgeError::Reconciliation(
            "imported mesh has zero polygons".into(),
        ));
    }
    let imported_vertices = host
        .vertex_count(imported)
        .map_err(|e| UvBridgeError::Reconciliation(e.to_string()))?;

    // The import made the imported object active; hand the stage back
    // to the original before mutating it.
    host.select_only(state.mesh)
        .map_err(|e| UvBridgeError::Reconciliation(e.to_string()))?;

    let imported_channels = host
        .uv_channel_names(imported)
        .map_err(|e| UvBridgeError::Reconciliation(e.to_string()))?;
    let transferred = if imported_channels.is_empty() {
        log::warn!("external tool returned no UV channel on {imported}; transfer bypassed");
        false
    } else {
        host.rename_uv_channel(imported, 0, &uv_channel)
            .map_err(|e| UvBridgeError::Reconciliation(e.to_string()))?;
        // Activates the existing channel on the original; never
        // accumulates a duplicate.
        host.create_uv_channel(state.mesh, &uv_channel)
            .map_err(|e| UvBridgeError::Reconciliation(e.to_string()))?;

        let modifier = host
            .add_uv_transfer_modifier(state.mesh, imported)
            .map_err(|e| UvBridgeError::Reconciliation(e.to_string()))?;
        resources.modifier = Some((state.mesh, modifier));
        host.apply_modifier(state.mesh, modifier)
            .map_err(|e| UvBridgeError::Reconciliation(e.to_string()))?;
        host.remove_modifier(state.mesh, modifier)
            .map_err(|e| UvBridgeError::Reconciliation(e.to_string()))?;
        // Baked and removed; nothing left for cleanup to undo.
        resources.modifier = None;
        true
    };

    host.set_interaction_mode(InteractionMode::Edit)?;
    host.select_all_uvs(state.mesh)
        .map_err(|e| UvBridgeError::Reconciliation(e.to_string()))?;
    host.seams_from_islands(state.mesh)
        .map_err(|e| UvBridgeError::Reconciliation(e.to_string()))?;

    if options.auto_reunwrap {
        host.unwrap_angle_based(state.mesh, options.margin)
            .map_err(|e| UvBridgeError::Reconciliation(e.to_string()))?;
        host.pack_islands(state.mesh, options.margin)
            .map_err(|e| UvBridgeError::Reconciliation(e.to_string()))?;
    }

    Ok(RunSummary {
        uv_channel,
        imported_vertices,
        transferred,
        reunwrapped: options.auto_reunwrap,
    })
}
