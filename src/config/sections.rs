//! Configuration sections.

use serde::{Deserialize, Serialize};

use crate::grid::DenoisePolicy;

use super::defaults;

/// Output grid geometry
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GridSection {
    /// Cell size of the published grid (meters)
    #[serde(default = "defaults::resolution")]
    pub resolution: f64,
}

impl Default for GridSection {
    fn default() -> Self {
        Self {
            resolution: defaults::resolution(),
        }
    }
}

/// Post-processing of the quantized grid
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FilterSection {
    /// Denoising policy (disabled by default)
    #[serde(default)]
    pub policy: DenoisePolicy,

    /// Occupancy threshold the filters compare against
    #[serde(default = "defaults::threshold")]
    pub threshold: f32,
}

impl Default for FilterSection {
    fn default() -> Self {
        Self {
            policy: DenoisePolicy::None,
            threshold: defaults::threshold(),
        }
    }
}

/// Map export settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OutputSection {
    /// Base path for the exported map; `.pgm` and `.yaml` are appended
    #[serde(default = "defaults::map_path")]
    pub map_path: String,

    /// Frame used when the scene does not name one
    #[serde(default = "defaults::frame_id")]
    pub frame_id: String,
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            map_path: defaults::map_path(),
            frame_id: defaults::frame_id(),
        }
    }
}
