//! Occupancy grid output.
//!
//! - [`quantize`]: canvas pixels to `{-1, 0, 100}` cells, bottom row first
//! - [`DenoisePolicy`]: optional neighborhood filters applied afterwards
//! - [`OccupancyGrid`]: the published message

mod filter;
mod occupancy;
mod quantize;

pub use filter::{DenoisePolicy, local_sum, local_sum_snapshot, majority_vote};
pub use occupancy::{
    CellCounts, FREE, MapMetaData, OCCUPIED, OccupancyGrid, Orientation, Origin, Point3, UNKNOWN,
};
pub use quantize::{OCCUPIED_PERCENT, cell_value, probability_percent, quantize};
