//! Canvas pixels to occupancy values.

use crate::core::Header;
use crate::render::{Canvas, PackedPixel};

use super::occupancy::{FREE, MapMetaData, OCCUPIED, OccupancyGrid, Orientation, Origin, Point3, UNKNOWN};

/// Probability above which an observed cell is occupied.
pub const OCCUPIED_PERCENT: i32 = 50;

/// Occupancy probability in percent for an intensity (red) channel value.
///
/// Intensity 255 is certainly free, 0 certainly occupied. Rounds half away
/// from zero.
#[inline]
pub fn probability_percent(intensity: u8) -> i32 {
    ((1.0 - intensity as f64 / 255.0) * 100.0).round() as i32
}

/// Occupancy value of one packed canvas pixel.
///
/// # Panics
///
/// If the probability falls outside `[0, 100]`, which means the canvas is corrupt.
pub fn cell_value(packed: u32) -> i8 {
    let pixel = PackedPixel::unpack(packed);
    if pixel.observed == 0 {
        return UNKNOWN;
    }
    let percent = probability_percent(pixel.intensity);
    assert!(
        (0..=100).contains(&percent),
        "occupancy probability {} out of range",
        percent
    );
    if percent > OCCUPIED_PERCENT { OCCUPIED } else { FREE }
}

/// Convert a painted canvas into an occupancy grid.
///
/// Canvas rows are stored top-down while grid rows run bottom-up, so grid
/// row 0 is the canvas's last row. The origin is placed so that cell (0, 0)
/// sits at the bottom-left corner of the canvas in world coordinates.
pub fn quantize(canvas: &Canvas, resolution: f64, header: &Header) -> OccupancyGrid {
    let width = canvas.width();
    let height = canvas.height();
    let pixels = canvas.surface.data();

    let mut data = Vec::with_capacity(width * height);
    for y in (0..height).rev() {
        let row = &pixels[y * width..(y + 1) * width];
        data.extend(row.iter().map(|&packed| cell_value(packed)));
    }

    let origin = Origin {
        position: Point3 {
            x: -(canvas.origin[0] as f64) * resolution,
            y: (-(height as f64) + canvas.origin[1] as f64) * resolution,
            z: 0.0,
        },
        orientation: Orientation::default(),
    };

    OccupancyGrid {
        header: header.clone(),
        info: MapMetaData {
            map_load_time_us: header.stamp_us,
            resolution: resolution as f32,
            width,
            height,
            origin,
        },
        data,
    }
}
