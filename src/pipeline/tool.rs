//! ExternalUnwrapper: synchronous invocation of the external tool.
//!
//! The invocation is `executable inputPath outputPath [-OPTION VALUE]*`
//! built as a typed token list (see [`crate::config`]). Exit code 0
//! with a non-empty output file signals success; any other outcome is
//! failure. stdout/stderr content is not inspected, and absence of a
//! valid output file is treated as failure by itself. Exactly one
//! invocation per run, blocking, no retries, no timeout.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::asset::TempAsset;
use crate::bridge_error::UvBridgeError;
use crate::config::UnwrapConfig;
use crate::prefs::ToolPreferences;

/// A validated handle to the external unwrapper executable.
#[derive(Debug, Clone)]
pub struct UnwrapTool {
    executable: PathBuf,
}

impl UnwrapTool {
    /// Build from preferences, validating the configured path.
    pub fn from_prefs(prefs: &ToolPreferences) -> Result<Self, UvBridgeError> {
        Ok(Self {
            executable: prefs.validated_executable()?.to_path_buf(),
        })
    }

    pub fn executable(&self) -> &Path {
        &self.executable
    }

    /// The full argument token list for one invocation, for logging
    /// and inspection. Token boundaries are fixed here; nothing is
    /// joined and re-split downstream.
    pub fn command_tokens(
        &self,
        input: &Path,
        output: &Path,
        config: &UnwrapConfig,
    ) -> Vec<OsString> {
        let mut tokens = vec![
            self.executable.clone().into_os_string(),
            input.as_os_str().to_os_string(),
            output.as_os_str().to_os_string(),
        ];
        tokens.extend(config.to_args().into_iter().map(OsString::from));
        tokens
    }

    /// Run the tool synchronously and block until it exits.
    ///
    /// Fails with [`UvBridgeError::ExternalTool`] when the process
    /// cannot be spawned, exits non-zero, or leaves no non-empty file
    /// at the output path.
    pub fn invoke(
        &self,
        input: &mut TempAsset,
        output: &mut TempAsset,
        config: &UnwrapConfig,
    ) -> Result<(), UvBridgeError> {
        let tokens = self.command_tokens(input.path(), output.path(), config);
        log::debug!("invoking external unwrapper: {tokens:?}");

        let status = Command::new(&self.executable)
            .arg(input.path())
            .arg(output.path())
            .args(config.to_args())
            .status()
            .map_err(|e| {
                UvBridgeError::ExternalTool(format!("failed to spawn {:?}: {e}", self.executable))
            })?;
        input.mark_consumed();

        if !status.success() {
            return Err(UvBridgeError::ExternalTool(format!(
                "process exited with {status}"
            )));
        }
        if !output.is_non_empty_file() {
            return Err(UvBridgeError::ExternalTool(format!(
                "process produced no output file at {:?}",
                output.path()
            )));
        }
        Ok(())
    }
}
