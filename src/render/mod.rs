//! Two-pass submap rendering.
//!
//! ## Passes
//!
//! 1. [`bounding_box`]: walk every cached submap through the same transform
//!    stack used for drawing and collect the device-space corners, giving the
//!    tight extent of the map in output cells.
//! 2. [`composite`]: allocate a canvas of that extent plus padding and paint
//!    every submap texture onto it with source-over.
//!
//! Both passes share [`draw_each_submap`], so the extent is derived from
//! exactly the matrices that place the pixels.

mod bounds;
mod composite;
mod pixel;
mod surface;

pub use bounds::bounding_box;
pub use composite::{Canvas, PADDING_PIXELS, composite};
pub use pixel::{BACKGROUND, PackedPixel, over};
pub use surface::{BYTES_PER_PIXEL, MAX_SURFACE_DIMENSION, Painter, Surface, stride_for_width};

use crate::submap::{SubmapCache, SubmapRaster, SubmapState};

/// Visit every submap with a texture in ascending id order.
///
/// The painter is scaled by `scale` (output cells per meter) once, then for
/// each submap the submap affine is applied and undone around `draw`, so
/// `draw` works in that submap's raster pixels.
pub(crate) fn draw_each_submap<F>(scale: f64, cache: &SubmapCache, painter: &mut Painter<'_>, mut draw: F)
where
    F: FnMut(&mut Painter<'_>, &SubmapState, &SubmapRaster),
{
    painter.scale(scale, scale);

    for (_, state, raster) in cache.renderable() {
        let Some(affine) = state.affine() else {
            continue;
        };
        painter.save();
        painter.transform(&affine);
        draw(painter, state, raster);
        painter.restore();
    }
}
