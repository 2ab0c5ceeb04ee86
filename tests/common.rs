//! Shared fixtures for Chitra integration tests.

#![allow(dead_code)]

use chitra::{GridPublisher, OccupancyGrid, Result, Rigid3, SubmapTexture};

/// Opaque square texture with every pixel at `intensity`.
pub fn uniform_texture(size: usize, intensity: u8) -> SubmapTexture {
    texture(size, size, vec![intensity; size * size])
}

/// Opaque texture with the given row-major intensities.
pub fn texture(width: usize, height: usize, intensity: Vec<u8>) -> SubmapTexture {
    SubmapTexture {
        width,
        height,
        version: 1,
        slice_pose: Rigid3::identity(),
        resolution: 0.05,
        alpha: vec![255; intensity.len()],
        intensity,
    }
}

/// Publisher that keeps every grid in memory.
#[derive(Default)]
pub struct CollectingPublisher {
    pub listening: bool,
    pub grids: Vec<OccupancyGrid>,
}

impl CollectingPublisher {
    pub fn listening() -> Self {
        Self {
            listening: true,
            grids: Vec::new(),
        }
    }
}

impl GridPublisher for CollectingPublisher {
    fn has_consumer(&self) -> bool {
        self.listening
    }

    fn publish(&mut self, grid: OccupancyGrid) -> Result<()> {
        self.grids.push(grid);
        Ok(())
    }
}
