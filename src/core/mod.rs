//! Core types for Chitra.
//!
//! ## Frames
//!
//! Three frames meet when a submap is drawn:
//!
//! - **Raster frame**: texture pixels, column `x` and row `y`
//! - **Submap frame**: the submap's own reference frame, reached through `slice_pose`
//! - **Global frame**: the map frame, reached through the submap `pose`
//!
//! The drawing plane is the global XY plane seen from above with the canvas
//! y axis pointing down. [`submap_affine`] collapses the chain into one 2D
//! affine matrix.

mod transform;
mod types;

pub use transform::{Affine2, Quaternion, Rigid3, submap_affine};
pub use types::{Aabb2, Header, SubmapEntry, SubmapId, SubmapList};
