//! Submap texture cache.
//!
//! ## Key Concepts
//!
//! - **Metadata**: id, version, and pose announced for every submap in each batch
//! - **Texture**: intensity and alpha channels fetched on demand from a [`SubmapFetcher`]
//! - **Version**: a texture is fetched again only when the announced version
//!   differs from the cached one
//!
//! Poses change far more often than textures (every optimization moves every
//! submap), so the pose is refreshed on each batch while the raster is reused.

mod cache;
mod texture;

pub use cache::{SubmapCache, SubmapRaster, SubmapState, UpdateStats};
pub use texture::{FetchError, SubmapFetcher, SubmapTexture};
