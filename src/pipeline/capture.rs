//! StateCapture: record the host state a run must restore.

use crate::bridge_error::UvBridgeError;
use crate::host::Host;
use crate::pipeline::RunState;

/// Capture the active mesh, interaction mode, and active UV-channel
/// name. Pure read: no side effects on the host.
///
/// Fails with [`UvBridgeError::NoSelection`] when no mesh is selected
/// or the active object is not a mesh. Absence of a UV channel is
/// tolerated here; reconciliation creates one if needed.
pub fn capture<H: Host>(host: &H) -> Result<RunState, UvBridgeError> {
    let mesh = host.active_mesh().ok_or(UvBridgeError::NoSelection)?;
    let selected_uv_channel = host.active_uv_channel(mesh)?;
    Ok(RunState {
        mesh,
        original_mode: host.interaction_mode(),
        selected_uv_channel,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::memory::InMemoryHost;
    use crate::host::InteractionMode;
    use crate::mesh::MeshBuffer;

    fn triangle() -> MeshBuffer {
        MeshBuffer {
            positions: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            faces: vec![vec![0, 1, 2]],
            ..Default::default()
        }
    }

    #[test]
    fn capture_without_selection_fails() {
        let host = InMemoryHost::new();
        assert!(matches!(capture(&host), Err(UvBridgeError::NoSelection)));
    }

    #[test]
    fn capture_with_non_mesh_active_fails() {
        let mut host = InMemoryHost::new();
        host.add_mesh(triangle());
        host.activate_non_mesh();
        assert!(matches!(capture(&host), Err(UvBridgeError::NoSelection)));
    }

    #[test]
    fn capture_records_mode_and_channel_absence() {
        let mut host = InMemoryHost::new();
        let mesh = host.add_mesh(triangle());
        host.set_interaction_mode(InteractionMode::Edit).unwrap();
        let state = capture(&host).expect("capture");
        assert_eq!(state.mesh, mesh);
        assert_eq!(state.original_mode, InteractionMode::Edit);
        assert_eq!(state.selected_uv_channel, None);
    }
}
