//! # uv-bridge
//!
//! uv-bridge drives an external, opaque UV-unwrapping executable from
//! inside an interactive 3-D modeling host: it exports the active mesh
//! to a neutral OBJ file, invokes the external tool with a typed
//! configuration surface, re-imports the result, transfers the
//! returned UV data onto the original mesh via
//! nearest-polygon-by-normal attribute mapping, and restores the
//! host's editing state, with guaranteed cleanup on every exit path.
//!
//! ## Features
//! - A narrow [`host::Host`] trait so any modeling host can be driven
//! - A complete in-process host ([`host::memory::InMemoryHost`]) for
//!   tests and headless use
//! - Typed external-tool options with validated ranges and byte-exact
//!   flag serialization
//! - Deterministic teardown: temporary files, the imported mesh, and
//!   the transfer modifier are tracked in an owned-resource list torn
//!   down on success, early error, and external-tool failure alike
//!
//! ## Usage
//! ```no_run
//! use uv_bridge::prelude::*;
//!
//! let mut host = InMemoryHost::new();
//! # let mesh = uv_bridge::mesh::MeshBuffer::default();
//! host.add_mesh(mesh);
//! let prefs = ToolPreferences::with_executable("/opt/mof/UnWrapConsole3.exe");
//! let summary = uv_bridge::pipeline::run(&mut host, &prefs, &RunOptions::default())?;
//! println!("unwrapped into channel '{}'", summary.uv_channel);
//! # Ok::<(), uv_bridge::bridge_error::UvBridgeError>(())
//! ```

pub mod asset;
pub mod bridge_error;
pub mod config;
pub mod host;
pub mod io;
pub mod mesh;
pub mod pipeline;
pub mod prefs;

pub use bridge_error::{Phase, UvBridgeError};

/// A convenient prelude importing the most-used traits and types.
pub mod prelude {
    pub use crate::asset::{AssetLifecycle, TempAsset};
    pub use crate::bridge_error::{Phase, UvBridgeError};
    pub use crate::config::UnwrapConfig;
    pub use crate::host::memory::InMemoryHost;
    pub use crate::host::{Host, HostError, InteractionMode, MeshHandle, ModifierHandle};
    pub use crate::io::obj::{ObjReader, ObjWriter};
    pub use crate::io::{MeshReader, MeshWriter};
    pub use crate::mesh::{DEFAULT_UV_CHANNEL, MeshBuffer, UvChannel};
    pub use crate::pipeline::{RunOptions, RunState, RunSummary, UnwrapTool, run};
    pub use crate::prefs::ToolPreferences;
}
