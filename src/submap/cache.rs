//! Versioned submap cache.

use std::collections::BTreeMap;

use crate::core::{Affine2, Rigid3, SubmapEntry, SubmapId, submap_affine};
use crate::error::Result;
use crate::render::Surface;

use super::texture::SubmapFetcher;

/// Cached texture of one submap.
#[derive(Clone, Debug)]
pub struct SubmapRaster {
    pub version: i32,
    pub slice_pose: Rigid3,
    pub resolution: f64,
    pub surface: Surface,
}

impl SubmapRaster {
    #[inline]
    pub fn width(&self) -> usize {
        self.surface.width()
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.surface.height()
    }
}

/// Everything known about one submap.
#[derive(Clone, Debug)]
pub struct SubmapState {
    /// Submap frame -> global frame, refreshed on every batch
    pub pose: Rigid3,
    /// Latest announced version, -1 before the first batch
    pub metadata_version: i32,
    /// Texture, absent until the first successful fetch
    pub raster: Option<SubmapRaster>,
}

impl SubmapState {
    fn new() -> Self {
        Self {
            pose: Rigid3::identity(),
            metadata_version: -1,
            raster: None,
        }
    }

    /// Whether the cached texture matches `version`.
    #[inline]
    pub fn is_current(&self, version: i32) -> bool {
        self.raster.as_ref().is_some_and(|r| r.version == version)
    }

    /// Raster pixels -> drawing plane meters, if a texture is cached.
    pub fn affine(&self) -> Option<Affine2> {
        self.raster
            .as_ref()
            .map(|r| submap_affine(&self.pose, &r.slice_pose, r.resolution))
    }
}

/// Outcome of one cache update.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct UpdateStats {
    /// Textures fetched and replaced
    pub fetched: usize,
    /// Entries whose cached texture was already current
    pub up_to_date: usize,
    /// Entries whose fetch failed this cycle
    pub unavailable: usize,
}

/// Submap states keyed by id, iterated in ascending id order.
///
/// Grows monotonically: submaps are never evicted.
#[derive(Debug, Default)]
pub struct SubmapCache {
    submaps: BTreeMap<SubmapId, SubmapState>,
}

impl SubmapCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a metadata batch, fetching only new or outdated textures.
    ///
    /// Pose and metadata version are updated for every entry. A failed fetch
    /// leaves that submap stale and moves on. A texture that violates the
    /// raster layout aborts the batch with the submap untouched.
    pub fn update<F>(&mut self, entries: &[SubmapEntry], fetcher: &mut F) -> Result<UpdateStats>
    where
        F: SubmapFetcher + ?Sized,
    {
        let mut stats = UpdateStats::default();

        for entry in entries {
            let state = self
                .submaps
                .entry(entry.id)
                .or_insert_with(SubmapState::new);
            state.pose = entry.pose;
            state.metadata_version = entry.version;

            if state.is_current(entry.version) {
                stats.up_to_date += 1;
                continue;
            }

            let texture = match fetcher.fetch(entry.id) {
                Ok(texture) => texture,
                Err(e) => {
                    tracing::warn!("{} unavailable this cycle: {}", entry.id, e);
                    stats.unavailable += 1;
                    continue;
                }
            };

            let surface = texture.to_surface()?;
            tracing::debug!(
                "{} fetched: {}x{} version {} at {:.3} m/px",
                entry.id,
                texture.width,
                texture.height,
                texture.version,
                texture.resolution
            );
            state.raster = Some(SubmapRaster {
                version: texture.version,
                slice_pose: texture.slice_pose,
                resolution: texture.resolution,
                surface,
            });
            stats.fetched += 1;
        }

        Ok(stats)
    }

    #[inline]
    pub fn get(&self, id: SubmapId) -> Option<&SubmapState> {
        self.submaps.get(&id)
    }

    /// All submaps in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = (&SubmapId, &SubmapState)> {
        self.submaps.iter()
    }

    /// Submaps with a cached texture, in ascending id order.
    pub fn renderable(&self) -> impl Iterator<Item = (SubmapId, &SubmapState, &SubmapRaster)> {
        self.submaps
            .iter()
            .filter_map(|(id, state)| state.raster.as_ref().map(|raster| (*id, state, raster)))
    }

    pub fn has_renderable(&self) -> bool {
        self.renderable().next().is_some()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.submaps.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.submaps.is_empty()
    }
}
