//! Persisted preferences: where the external unwrapper lives.
//!
//! The only long-term state this crate keeps is the validated path to
//! the external executable (plus the binary name used to validate it).
//! Preferences round-trip through a small JSON file.

use std::fs;
use std::path::{Path, PathBuf};

use crate::bridge_error::UvBridgeError;

/// Binary name the configured executable is validated against by
/// default (file stem, compared case-insensitively).
pub const DEFAULT_EXPECTED_BINARY: &str = "unwrapconsole3";

fn default_expected_binary() -> String {
    DEFAULT_EXPECTED_BINARY.to_string()
}

/// Persisted preference record for the external unwrapper.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ToolPreferences {
    /// Path to the external unwrapper executable, if configured.
    pub executable: Option<PathBuf>,
    /// Expected binary name (file stem) the path must carry.
    #[serde(default = "default_expected_binary")]
    pub expected_binary: String,
}

impl Default for ToolPreferences {
    fn default() -> Self {
        Self {
            executable: None,
            expected_binary: default_expected_binary(),
        }
    }
}

impl ToolPreferences {
    /// Preferences pointing at `executable`, validated against the
    /// default binary name.
    pub fn with_executable(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: Some(executable.into()),
            ..Default::default()
        }
    }

    /// Load preferences from a JSON file.
    pub fn load(path: &Path) -> Result<Self, UvBridgeError> {
        let contents = fs::read_to_string(path)?;
        serde_json::from_str(&contents)
            .map_err(|e| UvBridgeError::MeshIoParse(format!("preferences file {path:?}: {e}")))
    }

    /// Save preferences to a JSON file.
    pub fn save(&self, path: &Path) -> Result<(), UvBridgeError> {
        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| UvBridgeError::MeshIoParse(format!("preferences encoding: {e}")))?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Validate the configured path and return it.
    ///
    /// Fails with [`UvBridgeError::ExecutableNotConfigured`] when no
    /// path is set and [`UvBridgeError::ExecutableInvalid`] when the
    /// path's file stem does not match `expected_binary`
    /// (case-insensitively).
    pub fn validated_executable(&self) -> Result<&Path, UvBridgeError> {
        let path = self
            .executable
            .as_deref()
            .ok_or(UvBridgeError::ExecutableNotConfigured)?;
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        if stem != self.expected_binary.to_lowercase() {
            return Err(UvBridgeError::ExecutableInvalid {
                path: path.to_path_buf(),
                expected: self.expected_binary.clone(),
            });
        }
        Ok(path)
    }
}
