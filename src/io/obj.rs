//! Wavefront OBJ reader and writer.
//!
//! # Supported format
//! - ASCII `v`, `vn`, `vt`, and `f` records; polygons of any arity.
//! - Face corners in the forms `v`, `v/vt`, `v//vn`, `v/vt/vn`,
//!   including negative (relative) indices.
//!
//! # Limitations
//! - Material and object records (`mtllib`, `usemtl`, `o`, `g`, `s`)
//!   are ignored; the exporter never writes material references.
//! - Normals are stored per vertex: when a file provides per-corner
//!   normals, the last one seen for a vertex wins.
//! - Only one UV channel exists in OBJ; it is read in as the default
//!   channel name and the writer emits the active channel.

use std::io::{BufRead, BufReader, BufWriter, Read, Write};

use itertools::Itertools;

use crate::bridge_error::UvBridgeError;
use crate::io::{MeshReader, MeshWriter};
use crate::mesh::{DEFAULT_UV_CHANNEL, MeshBuffer, UvChannel};

/// OBJ reader.
#[derive(Debug, Default, Clone)]
pub struct ObjReader;

/// OBJ writer.
#[derive(Debug, Default, Clone)]
pub struct ObjWriter;

fn parse_f64(raw: &str, what: &str) -> Result<f64, UvBridgeError> {
    raw.parse::<f64>()
        .map_err(|_| UvBridgeError::MeshIoParse(format!("invalid {what}: {raw}")))
}

/// Resolve a 1-based (or negative relative) OBJ index against a list
/// of `len` elements.
fn resolve_index(raw: &str, len: usize, what: &str) -> Result<usize, UvBridgeError> {
    let value = raw
        .parse::<i64>()
        .map_err(|_| UvBridgeError::MeshIoParse(format!("invalid {what} index: {raw}")))?;
    let resolved = if value > 0 {
        value as usize - 1
    } else if value < 0 {
        let back = (-value) as usize;
        if back > len {
            return Err(UvBridgeError::MeshIoParse(format!(
                "relative {what} index {value} out of range"
            )));
        }
        len - back
    } else {
        return Err(UvBridgeError::MeshIoParse(format!("{what} index may not be 0")));
    };
    if resolved >= len {
        return Err(UvBridgeError::MeshIoParse(format!(
            "{what} index {raw} out of range ({len} defined)"
        )));
    }
    Ok(resolved)
}

impl MeshReader for ObjReader {
    fn read<R: Read>(&self, reader: R) -> Result<MeshBuffer, UvBridgeError> {
        let reader = BufReader::new(reader);

        let mut positions: Vec<[f64; 3]> = Vec::new();
        let mut file_normals: Vec<[f64; 3]> = Vec::new();
        let mut file_uvs: Vec<[f64; 2]> = Vec::new();
        let mut faces: Vec<Vec<u32>> = Vec::new();
        // Per-loop UV indices into `file_uvs`, None when a corner has no vt.
        let mut loop_uvs: Vec<Option<usize>> = Vec::new();
        // Per-vertex normal assignment gathered from face corners.
        let mut vertex_normals: Vec<Option<[f64; 3]>> = Vec::new();
        let mut saw_uv = false;

        for line in reader.lines() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut parts = line.split_whitespace();
            let keyword = parts.next().unwrap_or_default();
            match keyword {
                "v" => {
                    let x = parse_f64(parts.next().unwrap_or_default(), "vertex coordinate")?;
                    let y = parse_f64(parts.next().unwrap_or_default(), "vertex coordinate")?;
                    let z = parse_f64(parts.next().unwrap_or_default(), "vertex coordinate")?;
                    positions.push([x, y, z]);
                    vertex_normals.push(None);
                }
                "vn" => {
                    let x = parse_f64(parts.next().unwrap_or_default(), "normal component")?;
                    let y = parse_f64(parts.next().unwrap_or_default(), "normal component")?;
                    let z = parse_f64(parts.next().unwrap_or_default(), "normal component")?;
                    file_normals.push([x, y, z]);
                }
                "vt" => {
                    let u = parse_f64(parts.next().unwrap_or_default(), "texture coordinate")?;
                    let v = parse_f64(parts.next().unwrap_or_default(), "texture coordinate")?;
                    file_uvs.push([u, v]);
                }
                "f" => {
                    let mut face = Vec::new();
                    for corner in parts {
                        let mut refs = corner.split('/');
                        let v_raw = refs.next().unwrap_or_default();
                        let vi = resolve_index(v_raw, positions.len(), "vertex")?;
                        face.push(vi as u32);

                        let vt_raw = refs.next().unwrap_or_default();
                        if vt_raw.is_empty() {
                            loop_uvs.push(None);
                        } else {
                            let ti = resolve_index(vt_raw, file_uvs.len(), "texture")?;
                            loop_uvs.push(Some(ti));
                            saw_uv = true;
                        }

                        let vn_raw = refs.next().unwrap_or_default();
                        if !vn_raw.is_empty() {
                            let ni = resolve_index(vn_raw, file_normals.len(), "normal")?;
                            vertex_normals[vi] = Some(file_normals[ni]);
                        }
                    }
                    if face.len() < 3 {
                        return Err(UvBridgeError::MeshIoParse(format!(
                            "face with {} corners (need at least 3)",
                            face.len()
                        )));
                    }
                    faces.push(face);
                }
                // Materials, groups, and smoothing are deliberately ignored.
                _ => {}
            }
        }

        let normals = if vertex_normals.iter().any(Option::is_some) {
            vertex_normals
                .into_iter()
                .map(|n| n.unwrap_or([0.0, 0.0, 0.0]))
                .collect()
        } else {
            Vec::new()
        };

        let mut mesh = MeshBuffer {
            positions,
            normals,
            faces,
            ..Default::default()
        };
        if saw_uv {
            let loops = loop_uvs
                .iter()
                .map(|ti| ti.map(|i| file_uvs[i]).unwrap_or([0.0, 0.0]))
                .collect();
            mesh.uv_channels.push(UvChannel {
                name: DEFAULT_UV_CHANNEL.to_string(),
                loops,
            });
            mesh.active_uv = Some(0);
        }
        mesh.validate()?;
        Ok(mesh)
    }
}

impl MeshWriter for ObjWriter {
    fn write<W: Write>(&self, writer: W, mesh: &MeshBuffer) -> Result<(), UvBridgeError> {
        mesh.validate()?;
        let mut w = BufWriter::new(writer);

        for p in &mesh.positions {
            writeln!(w, "v {} {} {}", p[0], p[1], p[2])?;
        }
        for n in &mesh.normals {
            writeln!(w, "vn {} {} {}", n[0], n[1], n[2])?;
        }
        let uv = mesh.active_uv_channel();
        if let Some(channel) = uv {
            for t in &channel.loops {
                writeln!(w, "vt {} {}", t[0], t[1])?;
            }
        }

        let has_normals = !mesh.normals.is_empty();
        let mut loop_no = 0usize;
        for face in &mesh.faces {
            let corners = face
                .iter()
                .map(|&v| {
                    let vi = v as usize + 1;
                    let entry = match (uv.is_some(), has_normals) {
                        (true, true) => format!("{vi}/{}/{vi}", loop_no + 1),
                        (true, false) => format!("{vi}/{}", loop_no + 1),
                        (false, true) => format!("{vi}//{vi}"),
                        (false, false) => format!("{vi}"),
                    };
                    loop_no += 1;
                    entry
                })
                .join(" ");
            writeln!(w, "f {corners}")?;
        }
        w.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRI: &str = "\
v 0 0 0
v 1 0 0
v 0 1 0
vn 0 0 1
vt 0 0
vt 1 0
vt 0 1
f 1/1/1 2/2/1 3/3/1
";

    #[test]
    fn reads_triangle_with_uv_and_normals() {
        let mesh = ObjReader.read(TRI.as_bytes()).expect("read obj");
        assert_eq!(mesh.positions.len(), 3);
        assert_eq!(mesh.faces, vec![vec![0, 1, 2]]);
        assert_eq!(mesh.normals.len(), 3);
        let channel = mesh.active_uv_channel().expect("uv channel");
        assert_eq!(channel.name, DEFAULT_UV_CHANNEL);
        assert_eq!(channel.loops, vec![[0.0, 0.0], [1.0, 0.0], [0.0, 1.0]]);
    }

    #[test]
    fn reads_negative_indices() {
        let obj = "\
v 0 0 0
v 1 0 0
v 0 1 0
f -3 -2 -1
";
        let mesh = ObjReader.read(obj.as_bytes()).expect("read obj");
        assert_eq!(mesh.faces, vec![vec![0, 1, 2]]);
        assert!(mesh.uv_channels.is_empty());
    }

    #[test]
    fn rejects_out_of_range_vertex() {
        let obj = "v 0 0 0\nf 1 2 3\n";
        assert!(ObjReader.read(obj.as_bytes()).is_err());
    }

    #[test]
    fn rejects_degenerate_face() {
        let obj = "v 0 0 0\nv 1 0 0\nf 1 2\n";
        assert!(ObjReader.read(obj.as_bytes()).is_err());
    }

    #[test]
    fn ignores_material_records() {
        let obj = "\
mtllib scene.mtl
usemtl checker
v 0 0 0
v 1 0 0
v 0 1 0
f 1 2 3
";
        let mesh = ObjReader.read(obj.as_bytes()).expect("read obj");
        assert_eq!(mesh.faces.len(), 1);
    }
}
