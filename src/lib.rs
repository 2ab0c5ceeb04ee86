//! # Chitra
//!
//! Submap compositor that renders versioned, textured submaps into a single
//! three-valued occupancy grid.
//!
//! ## Overview
//!
//! Every metadata batch (a [`SubmapList`]) runs one render cycle:
//!
//! ```text
//! SubmapList ──► SubmapCache ──► bounding_box ──► composite ──► quantize ──► DenoisePolicy ──► GridPublisher
//!                    ▲
//!               SubmapFetcher
//! ```
//!
//! - **Submap cache**: keeps one texture per submap, refetched only when the
//!   version changes; poses are refreshed on every batch
//! - **Bounding box pass**: tight pixel-space extent of every placed texture
//! - **Composite pass**: paints all textures, in id order, on a padded canvas
//! - **Quantizer**: canvas pixels to `{-1, 0, 100}`, bottom row first
//! - **Denoise filters**: optional neighborhood clean-up, off by default
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use chitra::{MapFilePublisher, OccupancyGridNode, RenderOptions, SceneFile};
//!
//! let scene = SceneFile::load(Path::new("scene.yaml"))?;
//! let node = OccupancyGridNode::new(
//!     RenderOptions::new(0.05),
//!     scene.fetcher(),
//!     MapFilePublisher::new("output/map"),
//! );
//! let outcome = node.handle_submap_list(&scene.to_submap_list())?;
//! ```
//!
//! ## Coordinate System
//!
//! Map and submap frames are right-handed with +Z up. The canvas has +x to the
//! right and +y down; a submap's +X axis runs down the canvas. Grid row 0 is
//! the bottom (lowest y) row.

pub mod config;
pub mod core;
pub mod error;
pub mod grid;
pub mod io;
pub mod node;
pub mod render;
pub mod submap;

pub use config::ChitraConfig;
pub use self::core::{Aabb2, Affine2, Header, Quaternion, Rigid3, SubmapEntry, SubmapId, SubmapList};
pub use error::{ChitraError, Result};
pub use grid::{CellCounts, DenoisePolicy, FREE, OCCUPIED, OccupancyGrid, UNKNOWN, quantize};
pub use io::{MapFilePublisher, SceneFetcher, SceneFile, export_ros_map};
pub use node::{CycleOutcome, GridPublisher, NodeThread, OccupancyGridNode, RenderOptions};
pub use render::{Canvas, bounding_box, composite};
pub use submap::{FetchError, SubmapCache, SubmapFetcher, SubmapTexture};
