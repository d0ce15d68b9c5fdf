//! Writer/reader agreement on the OBJ subset the pipeline exchanges
//! with the external tool.

mod util;

use uv_bridge::io::obj::{ObjReader, ObjWriter};
use uv_bridge::io::{MeshReader, MeshWriter};
use uv_bridge::mesh::DEFAULT_UV_CHANNEL;

use util::*;

#[test]
fn written_mesh_reads_back_identically() {
    let mesh = with_uvs(two_quads(), DEFAULT_UV_CHANNEL, ramp_uvs(8));

    let mut bytes = Vec::new();
    ObjWriter.write(&mut bytes, &mesh).expect("write");
    let back = ObjReader.read(bytes.as_slice()).expect("read");

    assert_eq!(back.positions, mesh.positions);
    assert_eq!(back.normals, mesh.normals);
    assert_eq!(back.faces, mesh.faces);
    let channel = back.active_uv_channel().expect("uv channel");
    assert_eq!(channel.name, DEFAULT_UV_CHANNEL);
    assert_eq!(channel.loops, ramp_uvs(8));
}

#[test]
fn mesh_without_uvs_round_trips_without_gaining_a_channel() {
    let mesh = two_quads();

    let mut bytes = Vec::new();
    ObjWriter.write(&mut bytes, &mesh).expect("write");
    let back = ObjReader.read(bytes.as_slice()).expect("read");

    assert_eq!(back.positions, mesh.positions);
    assert_eq!(back.normals, mesh.normals);
    assert_eq!(back.faces, mesh.faces);
    assert!(back.uv_channels.is_empty());
    assert_eq!(back.active_uv, None);
}

#[test]
fn writer_output_uses_one_texture_coordinate_per_loop() {
    let mesh = with_uvs(two_quads(), DEFAULT_UV_CHANNEL, ramp_uvs(8));

    let mut bytes = Vec::new();
    ObjWriter.write(&mut bytes, &mesh).expect("write");
    let text = String::from_utf8(bytes).expect("ascii output");

    assert_eq!(text.lines().filter(|l| l.starts_with("vt ")).count(), 8);
    assert_eq!(text.lines().filter(|l| l.starts_with("f ")).count(), 2);
}
