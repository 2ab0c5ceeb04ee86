//! Identity, message, and bounding-box types.

use serde::{Deserialize, Serialize};

use super::transform::Rigid3;

/// Unique identifier for a submap: (trajectory, index within trajectory).
///
/// Ordering is lexicographic with the trajectory first, which fixes the
/// paint order of overlapping submaps.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SubmapId {
    pub trajectory_id: i32,
    pub submap_index: i32,
}

impl SubmapId {
    #[inline]
    pub fn new(trajectory_id: i32, submap_index: i32) -> Self {
        Self {
            trajectory_id,
            submap_index,
        }
    }
}

impl std::fmt::Display for SubmapId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Submap({}, {})", self.trajectory_id, self.submap_index)
    }
}

/// Message header shared by ingress and egress.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Header {
    /// Timestamp in microseconds since epoch
    pub stamp_us: u64,
    /// Coordinate frame of the message
    pub frame_id: String,
}

impl Header {
    pub fn new(stamp_us: u64, frame_id: impl Into<String>) -> Self {
        Self {
            stamp_us,
            frame_id: frame_id.into(),
        }
    }
}

/// Metadata for one submap as announced by the mapping process.
#[derive(Clone, Debug, PartialEq)]
pub struct SubmapEntry {
    pub id: SubmapId,
    /// Content version of the submap's texture
    pub version: i32,
    /// Submap frame -> global frame
    pub pose: Rigid3,
}

impl SubmapEntry {
    pub fn new(id: SubmapId, version: i32, pose: Rigid3) -> Self {
        Self { id, version, pose }
    }
}

/// A batch of submap metadata.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SubmapList {
    pub header: Header,
    pub submaps: Vec<SubmapEntry>,
}

/// Axis-aligned 2D box in single precision.
///
/// Starts empty (`min = +inf`, `max = -inf`) and grows with [`Aabb2::extend`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb2 {
    pub min: [f32; 2],
    pub max: [f32; 2],
}

impl Aabb2 {
    pub fn empty() -> Self {
        Self {
            min: [f32::INFINITY; 2],
            max: [f32::NEG_INFINITY; 2],
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.min[0] > self.max[0] || self.min[1] > self.max[1]
    }

    pub fn extend(&mut self, x: f32, y: f32) {
        self.min[0] = self.min[0].min(x);
        self.min[1] = self.min[1].min(y);
        self.max[0] = self.max[0].max(x);
        self.max[1] = self.max[1].max(y);
    }

    /// Extent (width, height). Zero for an empty box.
    pub fn sizes(&self) -> [f32; 2] {
        if self.is_empty() {
            return [0.0, 0.0];
        }
        [self.max[0] - self.min[0], self.max[1] - self.min[1]]
    }
}

impl Default for Aabb2 {
    fn default() -> Self {
        Self::empty()
    }
}
