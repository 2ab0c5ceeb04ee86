//! Occupancy grid node: cache ownership and the render cycle.
//!
//! One [`OccupancyGridNode`] owns the submap cache, the fetch collaborator,
//! and the publisher behind a single lock. Each metadata batch is handled to
//! completion under that lock:
//!
//! ```text
//! consumer? -> cache update -> bounding box -> composite -> quantize -> filter -> publish
//! ```

mod thread;

pub use thread::{NodeThread, ThreadSummary};

use parking_lot::Mutex;

use crate::config::ChitraConfig;
use crate::core::{Header, SubmapList};
use crate::error::Result;
use crate::grid::{DenoisePolicy, OccupancyGrid, quantize};
use crate::render::{bounding_box, composite};
use crate::submap::{SubmapCache, SubmapFetcher, UpdateStats};

/// Destination of finished grids.
pub trait GridPublisher {
    /// Whether anyone wants grids right now. Work is skipped when not.
    fn has_consumer(&self) -> bool;

    fn publish(&mut self, grid: OccupancyGrid) -> Result<()>;
}

/// Render settings for one node.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderOptions {
    /// Meters per output cell
    pub resolution: f64,
    pub denoise: DenoisePolicy,
    pub denoise_threshold: f32,
}

impl RenderOptions {
    pub fn new(resolution: f64) -> Self {
        Self {
            resolution,
            denoise: DenoisePolicy::None,
            denoise_threshold: 50.0,
        }
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self::new(0.05)
    }
}

impl From<&ChitraConfig> for RenderOptions {
    fn from(config: &ChitraConfig) -> Self {
        Self {
            resolution: config.grid.resolution,
            denoise: config.filter.policy,
            denoise_threshold: config.filter.threshold,
        }
    }
}

/// What one batch produced.
#[derive(Clone, Debug, PartialEq)]
pub enum CycleOutcome {
    /// Nobody listens; the batch was dropped without fetching
    NoConsumer,
    /// No submap has a texture yet
    NothingToRender(UpdateStats),
    /// A grid was published
    Published {
        stats: UpdateStats,
        width: usize,
        height: usize,
    },
}

struct NodeState<F, P> {
    cache: SubmapCache,
    fetcher: F,
    publisher: P,
}

/// Owner of the submap cache. Batches are serialized by an internal lock.
pub struct OccupancyGridNode<F, P> {
    options: RenderOptions,
    state: Mutex<NodeState<F, P>>,
}

impl<F, P> OccupancyGridNode<F, P>
where
    F: SubmapFetcher,
    P: GridPublisher,
{
    pub fn new(options: RenderOptions, fetcher: F, publisher: P) -> Self {
        Self {
            options,
            state: Mutex::new(NodeState {
                cache: SubmapCache::new(),
                fetcher,
                publisher,
            }),
        }
    }

    #[inline]
    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Update the cache from `list` and publish a fresh grid.
    ///
    /// Fetches block while the lock is held, so a concurrent batch waits for
    /// this one to finish. Errors are fatal invariant or surface failures.
    pub fn handle_submap_list(&self, list: &SubmapList) -> Result<CycleOutcome> {
        let mut guard = self.state.lock();
        let state = &mut *guard;

        if !state.publisher.has_consumer() {
            tracing::debug!("No grid consumer, skipping {} submaps", list.submaps.len());
            return Ok(CycleOutcome::NoConsumer);
        }

        let stats = state.cache.update(&list.submaps, &mut state.fetcher)?;

        match self.render(&state.cache, &list.header)? {
            Some(grid) => {
                let (width, height) = (grid.width(), grid.height());
                state.publisher.publish(grid)?;
                tracing::info!(
                    "Published {}x{} grid ({} fetched, {} current, {} unavailable)",
                    width,
                    height,
                    stats.fetched,
                    stats.up_to_date,
                    stats.unavailable
                );
                Ok(CycleOutcome::Published {
                    stats,
                    width,
                    height,
                })
            }
            None => {
                tracing::debug!("No submap textures yet, nothing to publish");
                Ok(CycleOutcome::NothingToRender(stats))
            }
        }
    }

    /// Render the current cache without touching it. `None` if nothing is drawable.
    fn render(&self, cache: &SubmapCache, header: &Header) -> Result<Option<OccupancyGrid>> {
        let scale = 1.0 / self.options.resolution;
        let Some(bbox) = bounding_box(cache, scale)? else {
            return Ok(None);
        };
        let canvas = composite(cache, &bbox, scale)?;
        let mut grid = quantize(&canvas, self.options.resolution, header);
        self.options
            .denoise
            .apply(&mut grid, self.options.denoise_threshold);
        Ok(Some(grid))
    }

    /// Number of submaps seen so far.
    pub fn submap_count(&self) -> usize {
        self.state.lock().cache.len()
    }

    /// Run `f` against the publisher while holding the node lock.
    pub fn with_publisher<R>(&self, f: impl FnOnce(&P) -> R) -> R {
        f(&self.state.lock().publisher)
    }

    /// Run `f` against the fetcher while holding the node lock.
    pub fn with_fetcher<R>(&self, f: impl FnOnce(&F) -> R) -> R {
        f(&self.state.lock().fetcher)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Rigid3, SubmapEntry, SubmapId};
    use crate::grid::{FREE, UNKNOWN};
    use crate::submap::{FetchError, SubmapTexture};

    struct FreeTiles {
        calls: usize,
    }

    impl SubmapFetcher for FreeTiles {
        fn fetch(&mut self, _id: SubmapId) -> std::result::Result<SubmapTexture, FetchError> {
            self.calls += 1;
            Ok(SubmapTexture {
                width: 2,
                height: 2,
                version: 1,
                slice_pose: Rigid3::identity(),
                resolution: 0.05,
                intensity: vec![255; 4],
                alpha: vec![255; 4],
            })
        }
    }

    #[derive(Default)]
    struct Collect {
        listening: bool,
        grids: Vec<OccupancyGrid>,
    }

    impl GridPublisher for Collect {
        fn has_consumer(&self) -> bool {
            self.listening
        }

        fn publish(&mut self, grid: OccupancyGrid) -> Result<()> {
            self.grids.push(grid);
            Ok(())
        }
    }

    fn list(entries: Vec<SubmapEntry>) -> SubmapList {
        SubmapList {
            header: Header::new(7, "map"),
            submaps: entries,
        }
    }

    fn node(listening: bool) -> OccupancyGridNode<FreeTiles, Collect> {
        OccupancyGridNode::new(
            RenderOptions::default(),
            FreeTiles { calls: 0 },
            Collect {
                listening,
                grids: Vec::new(),
            },
        )
    }

    #[test]
    fn test_no_consumer_skips_everything() {
        let node = node(false);
        let batch = list(vec![SubmapEntry::new(SubmapId::new(0, 0), 1, Rigid3::identity())]);

        let outcome = node.handle_submap_list(&batch).unwrap();
        assert_eq!(outcome, CycleOutcome::NoConsumer);
        assert_eq!(node.with_fetcher(|f| f.calls), 0);
        assert_eq!(node.submap_count(), 0);
    }

    #[test]
    fn test_empty_batch_publishes_nothing() {
        let node = node(true);
        let outcome = node.handle_submap_list(&list(vec![])).unwrap();
        assert!(matches!(outcome, CycleOutcome::NothingToRender(_)));
        assert!(node.with_publisher(|p| p.grids.is_empty()));
    }

    #[test]
    fn test_publishes_grid() {
        let node = node(true);
        let batch = list(vec![SubmapEntry::new(SubmapId::new(0, 0), 1, Rigid3::identity())]);

        let outcome = node.handle_submap_list(&batch).unwrap();
        assert!(matches!(
            outcome,
            CycleOutcome::Published {
                width: 12,
                height: 12,
                ..
            }
        ));

        node.with_publisher(|p| {
            assert_eq!(p.grids.len(), 1);
            let grid = &p.grids[0];
            assert_eq!(grid.header.stamp_us, 7);
            assert_eq!(grid.cell_counts().free, 4);
            assert_eq!(grid.cell_counts().unknown, 140);
            // Canvas rows 5..7 are grid rows 5..7 after the flip of a 12-row canvas
            assert_eq!(grid.get(5, 5), Some(FREE));
            assert_eq!(grid.get(0, 0), Some(UNKNOWN));
        });
    }

    #[test]
    fn test_repeated_batch_reuses_textures() {
        let node = node(true);
        let batch = list(vec![SubmapEntry::new(SubmapId::new(0, 0), 1, Rigid3::identity())]);
        node.handle_submap_list(&batch).unwrap();
        node.handle_submap_list(&batch).unwrap();

        assert_eq!(node.with_fetcher(|f| f.calls), 1);
        assert_eq!(node.with_publisher(|p| p.grids.len()), 2);
    }
}
