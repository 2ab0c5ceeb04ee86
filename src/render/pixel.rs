//! Packed ARGB32 pixel codec.
//!
//! Submap textures are stored in the rasterizer's native premultiplied ARGB32
//! layout, with two channels repurposed:
//!
//! ```text
//! bits 31..24  alpha
//! bits 23..16  intensity   (red channel)
//! bits 15..8   observed    (green channel, 0 = never seen, 255 = seen)
//! bits  7..0   unused      (blue channel, always 0)
//! ```

/// Background painted behind all submaps: cairo `rgba(0.5, 0, 0, 1)`.
///
/// The zero observed channel makes every uncovered canvas pixel unknown.
pub const BACKGROUND: PackedPixel = PackedPixel {
    alpha: 255,
    intensity: 128,
    observed: 0,
};

/// One pixel of a submap texture.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PackedPixel {
    pub alpha: u8,
    pub intensity: u8,
    pub observed: u8,
}

impl PackedPixel {
    /// Build a texture pixel; a cell with zero intensity and zero alpha was never observed.
    #[inline]
    pub fn from_texture(intensity: u8, alpha: u8) -> Self {
        let observed = if intensity == 0 && alpha == 0 { 0 } else { 255 };
        Self {
            alpha,
            intensity,
            observed,
        }
    }

    #[inline]
    pub fn pack(&self) -> u32 {
        ((self.alpha as u32) << 24) | ((self.intensity as u32) << 16) | ((self.observed as u32) << 8)
    }

    #[inline]
    pub fn unpack(packed: u32) -> Self {
        Self {
            alpha: (packed >> 24) as u8,
            intensity: (packed >> 16) as u8,
            observed: (packed >> 8) as u8,
        }
    }
}

/// Multiply two 8-bit channel values, treating 255 as 1.0, with rounding.
#[inline]
fn mul_un8(a: u8, b: u8) -> u8 {
    let t = a as u32 * b as u32 + 0x80;
    (((t >> 8) + t) >> 8) as u8
}

/// Porter-Duff source-over on premultiplied ARGB32 words.
///
/// Every channel of the destination is attenuated by the source's inverse
/// alpha and the source is added on top, saturating at 255.
#[inline]
pub fn over(src: u32, dst: u32) -> u32 {
    let inv_alpha = 255 - (src >> 24) as u8;
    if inv_alpha == 0 {
        return src;
    }
    let mut out = 0u32;
    for shift in [0u32, 8, 16, 24] {
        let s = (src >> shift) as u8;
        let d = (dst >> shift) as u8;
        let c = s.saturating_add(mul_un8(d, inv_alpha));
        out |= (c as u32) << shift;
    }
    out
}
