//! Occupancy grid message, laid out like `nav_msgs/OccupancyGrid`.

use crate::core::Header;

/// Cell value for a never-observed cell.
pub const UNKNOWN: i8 = -1;
/// Cell value for an observed, free cell.
pub const FREE: i8 = 0;
/// Cell value for an occupied cell.
pub const OCCUPIED: i8 = 100;

/// Position of the grid's cell (0, 0) corner.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Orientation quaternion as carried on the wire.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Orientation {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

impl Default for Orientation {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 0.0,
            w: 1.0,
        }
    }
}

/// Grid origin pose.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Origin {
    pub position: Point3,
    pub orientation: Orientation,
}

/// Grid geometry.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MapMetaData {
    pub map_load_time_us: u64,
    /// Meters per cell
    pub resolution: f32,
    pub width: usize,
    pub height: usize,
    pub origin: Origin,
}

/// Per-state cell totals.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CellCounts {
    pub free: usize,
    pub occupied: usize,
    pub unknown: usize,
}

impl CellCounts {
    #[inline]
    pub fn known(&self) -> usize {
        self.free + self.occupied
    }
}

/// Three-valued occupancy grid. Row 0 is the bottom row (lowest y).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OccupancyGrid {
    pub header: Header,
    pub info: MapMetaData,
    /// Row-major cell values in {-1, 0, 100}
    pub data: Vec<i8>,
}

impl OccupancyGrid {
    #[inline]
    pub fn width(&self) -> usize {
        self.info.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.info.height
    }

    /// Cell value at column `x`, row `y` (row 0 = bottom).
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<i8> {
        if x < self.info.width && y < self.info.height {
            self.data.get(y * self.info.width + x).copied()
        } else {
            None
        }
    }

    /// World coordinates of the centre of cell (x, y).
    pub fn cell_to_world(&self, x: usize, y: usize) -> (f64, f64) {
        let res = self.info.resolution as f64;
        let origin = self.info.origin.position;
        (
            origin.x + (x as f64 + 0.5) * res,
            origin.y + (y as f64 + 0.5) * res,
        )
    }

    /// Count cells by state. Values other than free/occupied count as unknown.
    pub fn cell_counts(&self) -> CellCounts {
        let mut counts = CellCounts::default();
        for &value in &self.data {
            match value {
                FREE => counts.free += 1,
                OCCUPIED => counts.occupied += 1,
                _ => counts.unknown += 1,
            }
        }
        counts
    }
}
