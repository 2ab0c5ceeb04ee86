//! Composite pass: paint all submaps onto one padded canvas.

use crate::core::Aabb2;
use crate::error::{ChitraError, Result};
use crate::submap::SubmapCache;

use super::draw_each_submap;
use super::pixel::BACKGROUND;
use super::surface::{MAX_SURFACE_DIMENSION, Painter, Surface};

/// Empty cells kept around the submaps on every side.
pub const PADDING_PIXELS: usize = 5;

/// A painted canvas and where the bounding box landed on it.
#[derive(Clone, Debug)]
pub struct Canvas {
    pub surface: Surface,
    /// Device translation applied before drawing: `-bbox.min + padding`
    pub origin: [f32; 2],
}

impl Canvas {
    #[inline]
    pub fn width(&self) -> usize {
        self.surface.width()
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.surface.height()
    }
}

/// Paint every cached submap, in ascending id order, onto a fresh canvas.
///
/// The canvas is `ceil(bbox size) + 2 * PADDING_PIXELS` on each axis and is
/// filled with [`BACKGROUND`] first, so uncovered pixels read as unobserved.
/// An extent that is not finite or does not fit a surface is a
/// [`ChitraError::Surface`].
pub fn composite(cache: &SubmapCache, bbox: &Aabb2, scale: f64) -> Result<Canvas> {
    let pad = PADDING_PIXELS as f32;
    let sizes = bbox.sizes();
    let width = canvas_side(sizes[0], "width")?;
    let height = canvas_side(sizes[1], "height")?;
    let origin = [-bbox.min[0] + pad, -bbox.min[1] + pad];

    let mut surface = Surface::new(width, height)?;
    {
        let mut painter = Painter::new(&mut surface);
        painter.paint_color(BACKGROUND);
        painter.translate(origin[0] as f64, origin[1] as f64);
        draw_each_submap(scale, cache, &mut painter, |painter, _, raster| {
            painter.paint_surface(&raster.surface);
        });
    }
    surface.flush();

    Ok(Canvas { surface, origin })
}

/// Padded canvas side for a bounding-box extent in pixels.
fn canvas_side(extent: f32, axis: &str) -> Result<usize> {
    if !extent.is_finite() || extent < 0.0 || extent.ceil() > MAX_SURFACE_DIMENSION as f32 {
        return Err(ChitraError::Surface(format!(
            "canvas {} {} does not fit a surface",
            axis, extent
        )));
    }
    (extent.ceil() as usize)
        .checked_add(2 * PADDING_PIXELS)
        .ok_or_else(|| ChitraError::Surface(format!("canvas {} {} overflows", axis, extent)))
}
