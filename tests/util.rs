#![allow(dead_code)]
use std::fs;
use std::path::{Path, PathBuf};

use uv_bridge::host::memory::InMemoryHost;
use uv_bridge::mesh::{MeshBuffer, UvChannel};
use uv_bridge::prefs::ToolPreferences;

/// Two unit quads side by side in the XY plane (6 vertices, 8 loops).
pub fn two_quads() -> MeshBuffer {
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

/// Attach a UV channel and make it active.
pub fn with_uvs(mut mesh: MeshBuffer, name: &str, loops: Vec<[f64; 2]>) -> MeshBuffer {
    mesh.uv_channels.push(UvChannel {
        name: name.into(),
        loops,
    });
    mesh.active_uv = Some(mesh.uv_channels.len() - 1);
    mesh
}

/// Distinct, non-zero per-loop UVs.
pub fn ramp_uvs(n: usize) -> Vec<[f64; 2]> {
    (0..n).map(|i| [(i + 1) as f64 * 0.05, 0.5]).collect()
}

/// A host holding one two-quad mesh with UVs; returns the handle too.
pub fn host_with_uv_mesh() -> (InMemoryHost, uv_bridge::host::MeshHandle) {
    let mut host = InMemoryHost::new();
    let mesh = host.add_mesh(with_uvs(two_quads(), "UVMap", ramp_uvs(8)));
    (host, mesh)
}

fn write_tool(dir: &Path, name: &str, body: &str) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;
    let path = dir.join(name);
    fs::write(&path, body).expect("write tool script");
    let mut perms = fs::metadata(&path).expect("script metadata").permissions();
    perms.set_mode(0o755);
    fs::set_permissions(&path, perms).expect("chmod script");
    path
}

/// Stand-in unwrapper that echoes its input to its output unchanged,
/// ignoring option flags.
pub fn echo_tool(dir: &Path) -> PathBuf {
    write_tool(dir, "echo-unwrap", "#!/bin/sh\ncp \"$1\" \"$2\"\n")
}

/// Stand-in unwrapper that exits non-zero without producing output.
pub fn failing_tool(dir: &Path) -> PathBuf {
    write_tool(dir, "failing-unwrap", "#!/bin/sh\nexit 3\n")
}

/// Stand-in unwrapper that exits 0 but writes no output file.
pub fn silent_tool(dir: &Path) -> PathBuf {
    write_tool(dir, "silent-unwrap", "#!/bin/sh\nexit 0\n")
}

/// Stand-in unwrapper that computes a fresh UV layout: geometry is
/// copied through, existing texture coordinates are dropped, and a
/// deterministic non-zero UV is generated per face corner.
pub fn generating_tool(dir: &Path) -> PathBuf {
    write_tool(
        dir,
        "generating-unwrap",
        r#"#!/bin/sh
awk '
/^f / {
  line = "f";
  for (i = 2; i <= NF; i++) {
    split($i, a, "/");
    nvt++;
    vts = vts sprintf("vt %.6f %.6f\n", ((nvt % 7) + 1) / 8.0, ((nvt * 3 % 11) + 1) / 12.0);
    line = line " " a[1] "/" nvt;
  }
  faces = faces line "\n";
  next;
}
/^vt / { next }
{ print }
END { printf "%s%s", vts, faces }
' "$1" > "$2"
"#,
    )
}

/// Stand-in unwrapper that copies geometry through but drops every
/// texture coordinate, leaving the output without a UV channel.
pub fn stripping_tool(dir: &Path) -> PathBuf {
    write_tool(
        dir,
        "stripping-unwrap",
        r#"#!/bin/sh
awk '
/^vt / { next }
/^f / {
  line = "f";
  for (i = 2; i <= NF; i++) { split($i, a, "/"); line = line " " a[1] "//" a[3]; }
  print line;
  next;
}
{ print }
' "$1" > "$2"
"#,
    )
}

/// Preferences pointing at a stand-in tool, with the expected binary
/// name matched to the script so validation passes.
pub fn prefs_for(tool: &Path) -> ToolPreferences {
    ToolPreferences {
        executable: Some(tool.to_path_buf()),
        expected_binary: tool
            .file_stem()
            .expect("tool has a file name")
            .to_string_lossy()
            .into_owned(),
    }
}
