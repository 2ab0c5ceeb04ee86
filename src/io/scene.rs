//! Scene replay from YAML.
//!
//! A scene file carries one metadata batch together with the texture of every
//! submap in it, so a full render cycle can run without a live SLAM backend.
//!
//! ```yaml
//! frame_id: map
//! stamp_us: 1000
//! submaps:
//!   - trajectory_id: 0
//!     submap_index: 0
//!     version: 3
//!     pose: { translation: [1.0, 0.0, 0.0], rotation: { w: 1.0, x: 0.0, y: 0.0, z: 0.0 } }
//!     resolution: 0.05
//!     width: 2
//!     height: 2
//!     intensity: [255, 255, 0, 255]
//!     alpha: [255, 255, 255, 255]
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::core::{Header, Rigid3, SubmapEntry, SubmapId, SubmapList};
use crate::error::Result;
use crate::submap::{FetchError, SubmapFetcher, SubmapTexture};

/// Frame used when a scene names none.
pub const DEFAULT_FRAME_ID: &str = "map";

/// One submap of a scene: metadata plus texture.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SceneSubmap {
    pub trajectory_id: i32,
    pub submap_index: i32,
    pub version: i32,
    /// Submap frame -> map frame
    #[serde(default)]
    pub pose: Rigid3,
    /// Raster frame -> submap frame
    #[serde(default)]
    pub slice_pose: Rigid3,
    /// Meters per texture pixel
    pub resolution: f64,
    pub width: usize,
    pub height: usize,
    pub intensity: Vec<u8>,
    pub alpha: Vec<u8>,
}

impl SceneSubmap {
    #[inline]
    pub fn id(&self) -> SubmapId {
        SubmapId::new(self.trajectory_id, self.submap_index)
    }

    pub fn texture(&self) -> SubmapTexture {
        SubmapTexture {
            width: self.width,
            height: self.height,
            version: self.version,
            slice_pose: self.slice_pose,
            resolution: self.resolution,
            intensity: self.intensity.clone(),
            alpha: self.alpha.clone(),
        }
    }
}

/// A recorded metadata batch with its textures.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SceneFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_id: Option<String>,
    #[serde(default)]
    pub stamp_us: u64,
    #[serde(default)]
    pub submaps: Vec<SceneSubmap>,
}

impl SceneFile {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    #[inline]
    pub fn frame_id(&self) -> &str {
        self.frame_id.as_deref().unwrap_or(DEFAULT_FRAME_ID)
    }

    /// The metadata batch this scene describes.
    pub fn to_submap_list(&self) -> SubmapList {
        SubmapList {
            header: Header::new(self.stamp_us, self.frame_id()),
            submaps: self
                .submaps
                .iter()
                .map(|s| SubmapEntry::new(s.id(), s.version, s.pose))
                .collect(),
        }
    }

    /// A fetcher serving this scene's textures.
    pub fn fetcher(&self) -> SceneFetcher {
        SceneFetcher::new(self.submaps.iter().map(|s| (s.id(), s.texture())))
    }
}

/// In-memory texture source. Unknown ids are [`FetchError::NotFound`].
#[derive(Clone, Debug, Default)]
pub struct SceneFetcher {
    textures: BTreeMap<SubmapId, SubmapTexture>,
    fetch_count: usize,
}

impl SceneFetcher {
    pub fn new(textures: impl IntoIterator<Item = (SubmapId, SubmapTexture)>) -> Self {
        Self {
            textures: textures.into_iter().collect(),
            fetch_count: 0,
        }
    }

    /// Replace or add the texture served for `id`.
    pub fn insert(&mut self, id: SubmapId, texture: SubmapTexture) {
        self.textures.insert(id, texture);
    }

    /// Number of fetch calls so far, including failed ones.
    #[inline]
    pub fn fetch_count(&self) -> usize {
        self.fetch_count
    }
}

impl SubmapFetcher for SceneFetcher {
    fn fetch(&mut self, id: SubmapId) -> std::result::Result<SubmapTexture, FetchError> {
        self.fetch_count += 1;
        self.textures.get(&id).cloned().ok_or(FetchError::NotFound)
    }
}
