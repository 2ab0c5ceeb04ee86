//! Bounding-box pass.

use crate::core::Aabb2;
use crate::error::Result;
use crate::submap::SubmapCache;

use super::draw_each_submap;
use super::surface::{Painter, Surface};

/// Device-space box covering every cached submap at `scale` cells per meter.
///
/// Only the transform stack of a 1x1 scratch surface is used; nothing is
/// rasterized. Returns `None` when no submap has a texture yet.
pub fn bounding_box(cache: &SubmapCache, scale: f64) -> Result<Option<Aabb2>> {
    let mut scratch = Surface::new(1, 1)?;
    let mut painter = Painter::new(&mut scratch);
    let mut bbox = Aabb2::empty();
    let mut submaps = 0usize;

    draw_each_submap(scale, cache, &mut painter, |painter, _, raster| {
        let (w, h) = (raster.width() as f64, raster.height() as f64);
        for (x, y) in [(0.0, 0.0), (w, 0.0), (0.0, h), (w, h)] {
            let (dx, dy) = painter.user_to_device(x, y);
            bbox.extend(dx as f32, dy as f32);
        }
        submaps += 1;
    });

    if submaps == 0 {
        return Ok(None);
    }
    tracing::trace!(
        "Bounding box of {} submaps: min ({:.2}, {:.2}) size {:?}",
        submaps,
        bbox.min[0],
        bbox.min[1],
        bbox.sizes()
    );
    Ok(Some(bbox))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Rigid3, SubmapEntry, SubmapId};
    use crate::submap::{FetchError, SubmapFetcher, SubmapTexture};
    use approx::assert_relative_eq;

    struct Fixed(usize, usize, f64);

    impl SubmapFetcher for Fixed {
        fn fetch(&mut self, _id: SubmapId) -> std::result::Result<SubmapTexture, FetchError> {
            Ok(SubmapTexture {
                width: self.0,
                height: self.1,
                version: 1,
                slice_pose: Rigid3::identity(),
                resolution: self.2,
                intensity: vec![255; self.0 * self.1],
                alpha: vec![255; self.0 * self.1],
            })
        }
    }

    #[test]
    fn test_empty_cache_has_no_box() {
        let cache = SubmapCache::new();
        assert!(bounding_box(&cache, 20.0).unwrap().is_none());
    }

    #[test]
    fn test_identity_submap_box() {
        let mut cache = SubmapCache::new();
        let entry = SubmapEntry::new(SubmapId::new(0, 0), 1, Rigid3::identity());
        cache.update(&[entry], &mut Fixed(4, 2, 0.05)).unwrap();

        // 4 columns map to +y, 2 rows map to -x, at 1 cell per pixel
        let bbox = bounding_box(&cache, 20.0).unwrap().unwrap();
        assert_relative_eq!(bbox.min[0], -2.0, epsilon = 1e-5);
        assert_relative_eq!(bbox.min[1], 0.0, epsilon = 1e-5);
        assert_relative_eq!(bbox.max[0], 0.0, epsilon = 1e-5);
        assert_relative_eq!(bbox.max[1], 4.0, epsilon = 1e-5);
    }

    #[test]
    fn test_submaps_without_texture_are_skipped() {
        struct Flaky(bool);
        impl SubmapFetcher for Flaky {
            fn fetch(&mut self, id: SubmapId) -> std::result::Result<SubmapTexture, FetchError> {
                self.0 = !self.0;
                if self.0 {
                    return Err(FetchError::NotFound);
                }
                Fixed(2, 2, 0.05).fetch(id)
            }
        }

        let mut cache = SubmapCache::new();
        let entries = [
            SubmapEntry::new(SubmapId::new(0, 0), 1, Rigid3::from_translation(-100.0, 0.0, 0.0)),
            SubmapEntry::new(SubmapId::new(0, 1), 1, Rigid3::identity()),
        ];
        cache.update(&entries, &mut Flaky(false)).unwrap();

        // Only the second submap got a texture; the far-away first one is ignored
        let bbox = bounding_box(&cache, 20.0).unwrap().unwrap();
        assert_relative_eq!(bbox.sizes()[0], 2.0, epsilon = 1e-5);
        assert_relative_eq!(bbox.sizes()[1], 2.0, epsilon = 1e-5);
    }
}
