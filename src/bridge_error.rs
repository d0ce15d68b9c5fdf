//! `UvBridgeError`: unified error type for uv-bridge public APIs.
//!
//! Every fallible operation in the crate reports through this enum so a
//! caller gets one terminal status per pipeline invocation, naming the
//! phase that failed. Errors raised in phases 1–4 abort the remaining
//! forward steps but always route through cleanup/restore before
//! surfacing; cleanup itself never raises (its failures are logged).

use std::path::PathBuf;

use thiserror::Error;

use crate::host::HostError;

/// Pipeline phase associated with an error, used for terminal status
/// reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// State capture: selection, interaction mode, active UV channel.
    Capture,
    /// Configuration assembly and executable validation.
    Configure,
    /// Mesh export to the temporary input file.
    Export,
    /// External unwrapper invocation.
    Unwrap,
    /// Re-import and UV reconciliation onto the original mesh.
    Reconcile,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Phase::Capture => "capture",
            Phase::Configure => "configure",
            Phase::Export => "export",
            Phase::Unwrap => "unwrap",
            Phase::Reconcile => "reconcile",
        };
        write!(f, "{name}")
    }
}

/// Unified error type for uv-bridge operations.
#[derive(Debug, Error)]
pub enum UvBridgeError {
    /// No mesh object is selected, or the active object is not a mesh.
    #[error("no active mesh object selected")]
    NoSelection,

    /// Reconciliation needed a UV channel name and the host could
    /// neither supply nor create one.
    #[error("mesh has no UV channel and one could not be created: {0}")]
    NoUvChannel(String),

    /// A configuration option is outside its documented range.
    #[error("option {name} = {value} is out of range ({min}..={max})")]
    OptionOutOfRange {
        /// Flag spelling of the offending option (e.g. `-RESOLUTION`).
        name: &'static str,
        value: String,
        min: String,
        max: String,
    },

    /// No external-unwrapper executable path is configured.
    #[error("external unwrapper executable path is not configured")]
    ExecutableNotConfigured,

    /// The configured path does not reference the expected binary.
    #[error("configured path {path:?} does not reference the expected `{expected}` binary")]
    ExecutableInvalid { path: PathBuf, expected: String },

    /// The external tool failed: spawn error, non-zero exit, or no
    /// valid output file.
    #[error("external unwrapper failed: {0}")]
    ExternalTool(String),

    /// The host export facility failed or produced an empty file.
    #[error("mesh export failed: {0}")]
    Export(String),

    /// The tool's output file was unreadable/empty or re-import failed.
    #[error("mesh import failed: {0}")]
    Import(String),

    /// The imported topology does not admit the UV transfer.
    #[error("UV reconciliation failed: {0}")]
    Reconciliation(String),

    /// Malformed content encountered while parsing a mesh file.
    #[error("mesh parse error: {0}")]
    MeshIoParse(String),

    /// A host API call failed outside the mappings above.
    #[error("host error: {0}")]
    Host(#[from] HostError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl UvBridgeError {
    /// The pipeline phase this error belongs to.
    pub fn phase(&self) -> Phase {
        match self {
            UvBridgeError::NoSelection => Phase::Capture,
            UvBridgeError::OptionOutOfRange { .. }
            | UvBridgeError::ExecutableNotConfigured
            | UvBridgeError::ExecutableInvalid { .. } => Phase::Configure,
            UvBridgeError::Export(_) => Phase::Export,
            UvBridgeError::ExternalTool(_) => Phase::Unwrap,
            UvBridgeError::NoUvChannel(_)
            | UvBridgeError::Import(_)
            | UvBridgeError::Reconciliation(_)
            | UvBridgeError::MeshIoParse(_) => Phase::Reconcile,
            UvBridgeError::Host(_) | UvBridgeError::Io(_) => Phase::Reconcile,
        }
    }
}
