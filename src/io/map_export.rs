//! ROS `map_server` compatible export of occupancy grids.
//!
//! A grid is written as two files next to each other:
//! - `{base}.pgm` - binary PGM (P5) grayscale image, top row first
//! - `{base}.yaml` - metadata (image, resolution, origin, thresholds)

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ChitraError, Result};
use crate::grid::{FREE, OCCUPIED, OccupancyGrid};
use crate::node::GridPublisher;

/// PGM value of a free cell.
pub const PGM_FREE: u8 = 254;
/// PGM value of an occupied cell.
pub const PGM_OCCUPIED: u8 = 0;
/// PGM value of an unknown cell.
pub const PGM_UNKNOWN: u8 = 205;

const DEFAULT_OCCUPIED_THRESH: f64 = 0.65;
const DEFAULT_FREE_THRESH: f64 = 0.196;

/// Map metadata in ROS-standard YAML format.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapInfo {
    /// PGM image filename, relative to the YAML file
    pub image: String,
    /// Meters per cell
    pub resolution: f64,
    /// World pose of the bottom-left cell: [x, y, yaw]
    pub origin: [f64; 3],
    pub negate: u8,
    pub occupied_thresh: f64,
    pub free_thresh: f64,
}

/// Paths written by [`export_ros_map`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedMap {
    pub pgm: PathBuf,
    pub yaml: PathBuf,
}

#[inline]
fn pgm_value(cell: i8) -> u8 {
    match cell {
        FREE => PGM_FREE,
        OCCUPIED => PGM_OCCUPIED,
        _ => PGM_UNKNOWN,
    }
}

/// Grid cells as PGM pixels. The image's first row is the grid's last (top) row.
pub fn pgm_pixels(grid: &OccupancyGrid) -> Vec<u8> {
    let width = grid.width();
    let mut pixels = Vec::with_capacity(grid.data.len());
    for row in grid.data.chunks(width.max(1)).rev() {
        pixels.extend(row.iter().map(|&cell| pgm_value(cell)));
    }
    pixels
}

/// Grid resolution widened from `f32` and rounded to micrometres, so a
/// configured 0.05 is written as 0.05.
#[inline]
fn yaml_resolution(resolution: f32) -> f64 {
    (resolution as f64 * 1e6).round() / 1e6
}

/// `{base}.pgm` and `{base}.yaml`. The extension is appended to the file
/// name, so a dotted base such as `map.v2` keeps its suffix.
pub fn map_file_paths(base: &Path) -> ExportedMap {
    let with_suffix = |ext: &str| {
        let mut name = base.as_os_str().to_owned();
        name.push(".");
        name.push(ext);
        PathBuf::from(name)
    };
    ExportedMap {
        pgm: with_suffix("pgm"),
        yaml: with_suffix("yaml"),
    }
}

/// Metadata describing `grid` with `image` as the PGM filename.
pub fn map_info(grid: &OccupancyGrid, image: impl Into<String>) -> MapInfo {
    let origin = grid.info.origin.position;
    MapInfo {
        image: image.into(),
        resolution: yaml_resolution(grid.info.resolution),
        origin: [origin.x, origin.y, 0.0],
        negate: 0,
        occupied_thresh: DEFAULT_OCCUPIED_THRESH,
        free_thresh: DEFAULT_FREE_THRESH,
    }
}

/// Write `{base}.pgm` and `{base}.yaml`, creating the parent directory if needed.
pub fn export_ros_map(grid: &OccupancyGrid, base: &Path) -> Result<ExportedMap> {
    if let Some(parent) = base.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let ExportedMap { pgm, yaml } = map_file_paths(base);

    let mut writer = BufWriter::new(File::create(&pgm)?);
    writeln!(writer, "P5")?;
    writeln!(writer, "{} {}", grid.width(), grid.height())?;
    writeln!(writer, "255")?;
    writer.write_all(&pgm_pixels(grid))?;
    writer.flush()?;

    let image = pgm
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let info = map_info(grid, image);

    let mut writer = BufWriter::new(File::create(&yaml)?);
    writeln!(writer, "# Map saved by Chitra")?;
    writeln!(writer)?;
    serde_yaml::to_writer(&mut writer, &info)?;
    writer.flush()?;

    tracing::debug!(
        "Exported {}x{} map to {}",
        grid.width(),
        grid.height(),
        pgm.display()
    );
    Ok(ExportedMap { pgm, yaml })
}

/// Publisher that overwrites one map file pair with every grid it receives.
#[derive(Debug)]
pub struct MapFilePublisher {
    base: PathBuf,
    published: usize,
}

impl MapFilePublisher {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self {
            base: base.into(),
            published: 0,
        }
    }

    #[inline]
    pub fn base(&self) -> &Path {
        &self.base
    }

    #[inline]
    pub fn published(&self) -> usize {
        self.published
    }
}

impl GridPublisher for MapFilePublisher {
    fn has_consumer(&self) -> bool {
        true
    }

    fn publish(&mut self, grid: OccupancyGrid) -> Result<()> {
        export_ros_map(&grid, &self.base).map_err(|e| {
            ChitraError::Publish(format!("Failed to write {}: {}", self.base.display(), e))
        })?;
        self.published += 1;
        Ok(())
    }
}
