//! Mesh I/O for the neutral interchange format used by the pipeline.
//!
//! This module provides trait-based readers and writers over
//! [`MeshBuffer`], mirroring the export/import seam the host exposes:
//! the exporter writes exactly what the external unwrapper consumes,
//! and the importer reads exactly what it produces.

pub mod obj;

use std::io::{Read, Write};

use crate::bridge_error::UvBridgeError;
use crate::mesh::MeshBuffer;

/// Trait for mesh readers producing a [`MeshBuffer`].
pub trait MeshReader {
    /// Parse a mesh from a reader.
    fn read<R: Read>(&self, reader: R) -> Result<MeshBuffer, UvBridgeError>;
}

/// Trait for mesh writers serializing a [`MeshBuffer`].
pub trait MeshWriter {
    /// Write a mesh to a writer.
    fn write<W: Write>(&self, writer: W, mesh: &MeshBuffer) -> Result<(), UvBridgeError>;
}
