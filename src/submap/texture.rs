//! Fetched submap textures and the fetch collaborator.

use thiserror::Error;

use crate::core::{Rigid3, SubmapId};
use crate::error::{ChitraError, Result};
use crate::render::{PackedPixel, Surface, stride_for_width};

/// Texture data returned by the fetch collaborator for one submap.
#[derive(Clone, Debug, PartialEq)]
pub struct SubmapTexture {
    pub width: usize,
    pub height: usize,
    pub version: i32,
    /// Raster frame -> submap frame
    pub slice_pose: Rigid3,
    /// Meters per pixel
    pub resolution: f64,
    /// Row-major, one byte per pixel
    pub intensity: Vec<u8>,
    /// Row-major, one byte per pixel
    pub alpha: Vec<u8>,
}

impl SubmapTexture {
    /// Pack intensity and alpha into a rasterizer surface.
    ///
    /// Fails with [`ChitraError::Invariant`] when the channels do not cover
    /// `width * height` pixels or the row stride is not `4 * width`.
    pub fn to_surface(&self) -> Result<Surface> {
        let expected = self.width * self.height;
        if self.intensity.len() != expected || self.alpha.len() != expected {
            return Err(ChitraError::Invariant(format!(
                "texture {}x{} has {} intensity and {} alpha values",
                self.width,
                self.height,
                self.intensity.len(),
                self.alpha.len()
            )));
        }

        let pixels: Vec<u32> = self
            .intensity
            .iter()
            .zip(&self.alpha)
            .map(|(&intensity, &alpha)| PackedPixel::from_texture(intensity, alpha).pack())
            .collect();

        Surface::for_data(pixels, self.width, self.height, stride_for_width(self.width))
    }
}

/// Why a texture could not be fetched this cycle.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FetchError {
    #[error("submap not found")]
    NotFound,

    #[error("transport failure: {0}")]
    Transport(String),
}

/// Source of submap textures (a service client in production).
///
/// Called synchronously, once per stale submap per cycle.
pub trait SubmapFetcher {
    fn fetch(&mut self, id: SubmapId) -> std::result::Result<SubmapTexture, FetchError>;
}
