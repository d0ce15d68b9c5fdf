//! Exporter: write the target mesh to the temporary input file.

use crate::asset::TempAsset;
use crate::bridge_error::UvBridgeError;
use crate::host::{Host, MeshHandle};

/// Export `mesh` to `asset` through the host's own facility.
///
/// The target is made the sole selection first so the export is
/// unambiguous. Fails with [`UvBridgeError::Export`] when the host
/// facility reports failure or the file ends up empty or unreadable.
pub fn export_mesh<H: Host>(
    host: &mut H,
    mesh: MeshHandle,
    asset: &mut TempAsset,
) -> Result<(), UvBridgeError> {
    host.select_only(mesh)
        .map_err(|e| UvBridgeError::Export(format!("selecting {mesh}: {e}")))?;
    log::debug!("exporting {} to {:?}", mesh, asset.path());
    host.export_selected(asset.path())
        .map_err(|e| UvBridgeError::Export(e.to_string()))?;
    if !asset.is_non_empty_file() {
        return Err(UvBridgeError::Export(format!(
            "host produced an empty or unreadable file at {:?}",
            asset.path()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asset::AssetLifecycle;
    use crate::host::memory::InMemoryHost;
    use crate::mesh::MeshBuffer;

    #[test]
    fn export_writes_a_non_empty_file() {
        let mut host = InMemoryHost::new();
        let mesh = host.add_mesh(MeshBuffer {
            positions: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            faces: vec![vec![0, 1, 2]],
            ..Default::default()
        });
        let dir = tempfile::tempdir().expect("tempdir");
        let mut asset = TempAsset::new(dir.path().join("input.obj"));
        export_mesh(&mut host, mesh, &mut asset).expect("export");
        assert!(asset.is_non_empty_file());
        assert_eq!(asset.lifecycle(), AssetLifecycle::Created);
    }

    #[test]
    fn export_of_unknown_mesh_is_an_export_error() {
        let mut host = InMemoryHost::new();
        let dir = tempfile::tempdir().expect("tempdir");
        let mut asset = TempAsset::new(dir.path().join("input.obj"));
        let err = export_mesh(&mut host, MeshHandle(99), &mut asset).unwrap_err();
        assert!(matches!(err, UvBridgeError::Export(_)));
        assert!(!asset.path().exists());
    }
}
