//! Software ARGB32 surface and a painter with a cairo-like transform stack.

use crate::core::Affine2;
use crate::error::{ChitraError, Result};

use super::pixel::{PackedPixel, over};

/// Bytes per ARGB32 pixel.
pub const BYTES_PER_PIXEL: usize = 4;

/// Largest accepted surface side, matching pixman's coordinate limit.
pub const MAX_SURFACE_DIMENSION: usize = 32767;

/// Row stride in bytes the rasterizer uses for an ARGB32 surface of `width` pixels.
#[inline]
pub fn stride_for_width(width: usize) -> usize {
    // ARGB32 rows are already 4-byte aligned
    (width * BYTES_PER_PIXEL + 3) & !3
}

/// An owned ARGB32 pixel buffer in row-major, top-down order.
#[derive(Clone, Debug)]
pub struct Surface {
    width: usize,
    height: usize,
    data: Vec<u32>,
}

impl Surface {
    /// Allocate a transparent-black surface.
    pub fn new(width: usize, height: usize) -> Result<Self> {
        check_dimensions(width, height)?;
        Ok(Self {
            width,
            height,
            data: vec![0; width * height],
        })
    }

    /// Wrap existing pixel data.
    ///
    /// The declared `stride` must be exactly `4 * width` and `data` must hold
    /// `width * height` pixels. Anything else is an invariant violation.
    /// Empty (zero-sized) data is accepted and paints nothing.
    pub fn for_data(data: Vec<u32>, width: usize, height: usize, stride: usize) -> Result<Self> {
        check_max_dimensions(width, height)?;
        let expected_stride = BYTES_PER_PIXEL * width;
        if stride != expected_stride || stride_for_width(width) != expected_stride {
            return Err(ChitraError::Invariant(format!(
                "row stride {} for width {} (expected {})",
                stride, width, expected_stride
            )));
        }
        if data.len() != width * height {
            return Err(ChitraError::Invariant(format!(
                "pixel buffer holds {} pixels, {}x{} needs {}",
                data.len(),
                width,
                height,
                width * height
            )));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn stride(&self) -> usize {
        BYTES_PER_PIXEL * self.width
    }

    /// Raw pixels, row-major, top row first.
    #[inline]
    pub fn data(&self) -> &[u32] {
        &self.data
    }

    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> Option<u32> {
        if x < self.width && y < self.height {
            Some(self.data[y * self.width + x])
        } else {
            None
        }
    }

    #[inline]
    pub fn set_pixel(&mut self, x: usize, y: usize, value: u32) {
        if x < self.width && y < self.height {
            self.data[y * self.width + x] = value;
        }
    }

    /// Finish all drawing before reading pixels back.
    ///
    /// Drawing is synchronous here, so this only marks the readback point.
    #[inline]
    pub fn flush(&mut self) {}
}

fn check_dimensions(width: usize, height: usize) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(ChitraError::Surface(format!(
            "invalid surface size {}x{}",
            width, height
        )));
    }
    check_max_dimensions(width, height)
}

fn check_max_dimensions(width: usize, height: usize) -> Result<()> {
    if width > MAX_SURFACE_DIMENSION || height > MAX_SURFACE_DIMENSION {
        return Err(ChitraError::Surface(format!(
            "surface size {}x{} exceeds {}",
            width, height, MAX_SURFACE_DIMENSION
        )));
    }
    Ok(())
}

/// Drawing context over a target surface.
///
/// Keeps a current transformation matrix (user space -> device pixels) and a
/// stack of saved matrices.
pub struct Painter<'a> {
    target: &'a mut Surface,
    ctm: Affine2,
    saved: Vec<Affine2>,
}

impl<'a> Painter<'a> {
    pub fn new(target: &'a mut Surface) -> Self {
        Self {
            target,
            ctm: Affine2::identity(),
            saved: Vec::new(),
        }
    }

    /// Current transformation matrix.
    #[inline]
    pub fn matrix(&self) -> Affine2 {
        self.ctm
    }

    pub fn save(&mut self) {
        self.saved.push(self.ctm);
    }

    /// Restore the last saved matrix. Unbalanced calls are ignored.
    pub fn restore(&mut self) {
        if let Some(ctm) = self.saved.pop() {
            self.ctm = ctm;
        }
    }

    pub fn scale(&mut self, sx: f64, sy: f64) {
        self.ctm = self.ctm.scale(sx, sy);
    }

    pub fn translate(&mut self, tx: f64, ty: f64) {
        self.ctm = self.ctm.translate(tx, ty);
    }

    /// Prepend `matrix` to the user-space transform.
    pub fn transform(&mut self, matrix: &Affine2) {
        self.ctm = self.ctm.then_inner(matrix);
    }

    /// Map a user-space point to device pixels.
    #[inline]
    pub fn user_to_device(&self, x: f64, y: f64) -> (f64, f64) {
        self.ctm.transform_point(x, y)
    }

    /// Fill the whole target with one color, replacing its contents.
    pub fn paint_color(&mut self, color: PackedPixel) {
        self.target.data.fill(color.pack());
    }

    /// Composite `source` with its origin at user (0, 0) using source-over.
    ///
    /// A device pixel is painted when its centre maps inside the source.
    /// While one device pixel spans at most one source pixel along each axis,
    /// it takes the nearest source pixel. When the device is coarser than the
    /// source, the source pixels whose centres fall inside the device pixel's
    /// footprint are box-averaged, so thin rows and columns blend in instead
    /// of being skipped. Pixels outside the source are left untouched.
    pub fn paint_surface(&mut self, source: &Surface) {
        let Some(inverse) = self.ctm.invert() else {
            return;
        };
        if source.width == 0 || source.height == 0 {
            return;
        }

        let (sw, sh) = (source.width as f64, source.height as f64);
        let corners = [(0.0, 0.0), (sw, 0.0), (0.0, sh), (sw, sh)];
        let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
        let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
        for (ux, uy) in corners {
            let (dx, dy) = self.ctm.transform_point(ux, uy);
            min_x = min_x.min(dx);
            min_y = min_y.min(dy);
            max_x = max_x.max(dx);
            max_y = max_y.max(dy);
        }

        let x_start = min_x.floor().max(0.0) as usize;
        let y_start = min_y.floor().max(0.0) as usize;
        let x_end = (max_x.ceil().max(0.0) as usize).min(self.target.width);
        let y_end = (max_y.ceil().max(0.0) as usize).min(self.target.height);

        // Source pixels crossed per device step along each device axis
        let downscaled = inverse.xx.hypot(inverse.yx) > 1.0 + DOWNSCALE_EPSILON
            || inverse.xy.hypot(inverse.yy) > 1.0 + DOWNSCALE_EPSILON;

        for py in y_start..y_end {
            for px in x_start..x_end {
                let (sx, sy) = inverse.transform_point(px as f64 + 0.5, py as f64 + 0.5);
                if sx < 0.0 || sy < 0.0 || sx >= sw || sy >= sh {
                    continue;
                }
                let nearest = source.data[sy as usize * source.width + sx as usize];
                let src = if downscaled {
                    box_sample(source, &inverse, px, py).unwrap_or(nearest)
                } else {
                    nearest
                };
                let idx = py * self.target.width + px;
                self.target.data[idx] = over(src, self.target.data[idx]);
            }
        }
    }
}

const DOWNSCALE_EPSILON: f64 = 1e-9;

/// Per-channel mean of the source pixels whose centres lie in the footprint
/// of device pixel (`px`, `py`). `None` if no centre falls inside.
fn box_sample(source: &Surface, inverse: &Affine2, px: usize, py: usize) -> Option<u32> {
    let (x, y) = (px as f64, py as f64);
    let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
    let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
    for (dx, dy) in [(x, y), (x + 1.0, y), (x, y + 1.0), (x + 1.0, y + 1.0)] {
        let (sx, sy) = inverse.transform_point(dx, dy);
        min_x = min_x.min(sx);
        min_y = min_y.min(sy);
        max_x = max_x.max(sx);
        max_y = max_y.max(sy);
    }

    // Pixel c has its centre at c + 0.5
    let first = |min: f64| (min - 0.5).ceil().max(0.0) as usize;
    let last = |max: f64, len: usize| ((max - 0.5).ceil().max(0.0) as usize).min(len);
    let (c0, c1) = (first(min_x), last(max_x, source.width));
    let (r0, r1) = (first(min_y), last(max_y, source.height));

    let mut sums = [0u32; 4];
    let mut count = 0u32;
    for r in r0..r1 {
        for &pixel in &source.data[r * source.width + c0.min(c1)..r * source.width + c1] {
            for (k, sum) in sums.iter_mut().enumerate() {
                *sum += (pixel >> (8 * k)) & 0xFF;
            }
            count += 1;
        }
    }
    if count == 0 {
        return None;
    }

    let mut out = 0u32;
    for (k, sum) in sums.iter().enumerate() {
        out |= ((sum + count / 2) / count) << (8 * k);
    }
    Some(out)
}
