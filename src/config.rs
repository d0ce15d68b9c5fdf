//! `UnwrapConfig`: the external unwrapper's option surface.
//!
//! Each field maps to one command-line flag with a fixed spelling that
//! must be reproduced byte-for-byte for interoperability. Values are
//! serialized directly into an argument-token list (one token per
//! flag and one per value component) so a value can never be split or
//! merged by re-tokenization. Booleans serialize as the literal tokens
//! `TRUE`/`FALSE`; vectors contribute one token per scalar component.
//!
//! The tool's own contract accepts no embedded whitespace inside a
//! single option value; every value this type can produce satisfies
//! that, so the constraint cannot be violated from safe code.

use crate::bridge_error::UvBridgeError;

/// Texture resolution bounds (`-RESOLUTION`).
pub const RESOLUTION_RANGE: (u32, u32) = (128, 8192);
/// Aspect ratio bounds (`-ASPECT`).
pub const ASPECT_RANGE: (f64, f64) = (0.1, 10.0);
/// Relax iteration bounds (`-RELAX_ITERATIONS`).
pub const RELAX_ITERATIONS_RANGE: (u32, u32) = (0, 1000);
/// Packing iteration bounds (`-PACKING_ITERATIONS`).
pub const PACKING_ITERATIONS_RANGE: (u32, u32) = (1, 16384);
/// Texel density bounds (`-DENSITY`); 0 lets the tool pick.
pub const TEXEL_DENSITY_RANGE: (f64, f64) = (0.0, 1024.0);

/// Options forwarded to the external unwrapper, one field per tunable.
///
/// All fields have documented defaults and independently validated
/// ranges. Once serialized with [`UnwrapConfig::to_args`], the
/// resulting token list is immutable.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct UnwrapConfig {
    /// Target texture resolution in texels (`-RESOLUTION`, 128–8192).
    pub resolution: u32,
    /// Texture aspect ratio (`-ASPECT`, 0.1–10.0).
    pub aspect: f64,
    /// Boundary relaxation iterations (`-RELAX_ITERATIONS`, 0–1000).
    pub relax_iterations: u32,
    /// Island packing iterations (`-PACKING_ITERATIONS`, 1–16384).
    pub packing_iterations: u32,
    /// Target texel density, 0 = automatic (`-DENSITY`, 0–1024).
    pub texel_density: f64,
    /// Preferred island alignment axis (`-AXIS`, components −1.0–1.0).
    pub align_axis: [f64; 3],
    /// Cut islands apart at hard edges (`-SEPARATE`).
    pub separate_hard_edges: bool,
    /// Honor stored vertex normals when classifying surfaces (`-NORMALS`).
    pub use_normals: bool,
    /// Lay islands out across UDIM tiles (`-UDIMS`).
    pub udims: bool,
    /// Stack identical islands on top of each other (`-OVERLAP`).
    pub overlap_identical: bool,
    /// Stack mirrored islands on top of each other (`-MIRROR`).
    pub overlap_mirrored: bool,
    /// Scale islands by world-space surface area (`-WORLDSCALE`).
    pub world_scale: bool,
}

impl Default for UnwrapConfig {
    fn default() -> Self {
        Self {
            resolution: 1024,
            aspect: 1.0,
            relax_iterations: 50,
            packing_iterations: 4096,
            texel_density: 0.0,
            align_axis: [0.0, 1.0, 0.0],
            separate_hard_edges: false,
            use_normals: false,
            udims: false,
            overlap_identical: false,
            overlap_mirrored: false,
            world_scale: false,
        }
    }
}

fn check_u32(name: &'static str, value: u32, range: (u32, u32)) -> Result<(), UvBridgeError> {
    if value < range.0 || value > range.1 {
        return Err(UvBridgeError::OptionOutOfRange {
            name,
            value: value.to_string(),
            min: range.0.to_string(),
            max: range.1.to_string(),
        });
    }
    Ok(())
}

fn check_f64(name: &'static str, value: f64, range: (f64, f64)) -> Result<(), UvBridgeError> {
    if !value.is_finite() || value < range.0 || value > range.1 {
        return Err(UvBridgeError::OptionOutOfRange {
            name,
            value: value.to_string(),
            min: range.0.to_string(),
            max: range.1.to_string(),
        });
    }
    Ok(())
}

fn bool_token(value: bool) -> &'static str {
    if value { "TRUE" } else { "FALSE" }
}

impl UnwrapConfig {
    /// Validate every field against its documented range.
    pub fn validate(&self) -> Result<(), UvBridgeError> {
        check_u32("-RESOLUTION", self.resolution, RESOLUTION_RANGE)?;
        check_f64("-ASPECT", self.aspect, ASPECT_RANGE)?;
        check_u32("-RELAX_ITERATIONS", self.relax_iterations, RELAX_ITERATIONS_RANGE)?;
        check_u32("-PACKING_ITERATIONS", self.packing_iterations, PACKING_ITERATIONS_RANGE)?;
        check_f64("-DENSITY", self.texel_density, TEXEL_DENSITY_RANGE)?;
        for component in self.align_axis {
            check_f64("-AXIS", component, (-1.0, 1.0))?;
        }
        Ok(())
    }

    /// Serialize to the option portion of the tool's argument list.
    ///
    /// Each entry becomes a `-NAME` token followed by its value
    /// token(s); the full invocation is
    /// `[executable, input, output, ...to_args()]`.
    pub fn to_args(&self) -> Vec<String> {
        let mut args = Vec::new();
        let push = |args: &mut Vec<String>, flag: &str, value: String| {
            args.push(flag.to_string());
            args.push(value);
        };
        push(&mut args, "-RESOLUTION", self.resolution.to_string());
        push(&mut args, "-ASPECT", self.aspect.to_string());
        push(&mut args, "-RELAX_ITERATIONS", self.relax_iterations.to_string());
        push(&mut args, "-PACKING_ITERATIONS", self.packing_iterations.to_string());
        push(&mut args, "-DENSITY", self.texel_density.to_string());
        args.push("-AXIS".to_string());
        for component in self.align_axis {
            args.push(component.to_string());
        }
        push(&mut args, "-SEPARATE", bool_token(self.separate_hard_edges).to_string());
        push(&mut args, "-NORMALS", bool_token(self.use_normals).to_string());
        push(&mut args, "-UDIMS", bool_token(self.udims).to_string());
        push(&mut args, "-OVERLAP", bool_token(self.overlap_identical).to_string());
        push(&mut args, "-MIRROR", bool_token(self.overlap_mirrored).to_string());
        push(&mut args, "-WORLDSCALE", bool_token(self.world_scale).to_string());
        args
    }
}
