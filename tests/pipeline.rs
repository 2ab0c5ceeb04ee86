//! End-to-end render cycles: metadata batch in, occupancy grid out.

mod common;

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};

use approx::assert_relative_eq;
use chitra::{
    CycleOutcome, FREE, Header, MapFilePublisher, OCCUPIED, OccupancyGridNode, Rigid3, SceneFetcher,
    SceneFile, SubmapCache, SubmapEntry, SubmapId, SubmapList, UNKNOWN, bounding_box, composite,
    quantize,
};
use chitra::node::RenderOptions;
use common::{CollectingPublisher, texture, uniform_texture};

const RESOLUTION: f64 = 0.05;

fn batch(entries: Vec<SubmapEntry>) -> SubmapList {
    SubmapList {
        header: Header::new(100, "map"),
        submaps: entries,
    }
}

fn run(fetcher: SceneFetcher, entries: Vec<SubmapEntry>) -> (CycleOutcome, CollectingPublisher) {
    let node = OccupancyGridNode::new(
        RenderOptions::new(RESOLUTION),
        fetcher,
        CollectingPublisher::listening(),
    );
    let outcome = node.handle_submap_list(&batch(entries)).unwrap();
    let publisher = node.with_publisher(|p| CollectingPublisher {
        listening: p.listening,
        grids: p.grids.clone(),
    });
    (outcome, publisher)
}

// ============================================================================
// Single tile
// ============================================================================

#[test]
fn test_identity_tile_end_to_end() {
    let id = SubmapId::new(0, 0);
    let fetcher = SceneFetcher::new([(id, uniform_texture(2, 255))]);
    let (outcome, publisher) = run(fetcher, vec![SubmapEntry::new(id, 1, Rigid3::identity())]);

    assert!(matches!(
        outcome,
        CycleOutcome::Published {
            width: 12,
            height: 12,
            ..
        }
    ));
    let grid = &publisher.grids[0];
    assert_eq!(grid.header.frame_id, "map");
    assert_eq!(grid.info.map_load_time_us, 100);
    assert_relative_eq!(grid.info.origin.position.x, -0.35, epsilon = 1e-9);
    assert_relative_eq!(grid.info.origin.position.y, -0.35, epsilon = 1e-9);

    for y in 0..12 {
        for x in 0..12 {
            let expected = if (5..7).contains(&x) && (5..7).contains(&y) {
                FREE
            } else {
                UNKNOWN
            };
            assert_eq!(grid.get(x, y), Some(expected), "cell ({}, {})", x, y);
        }
    }
}

#[test]
fn test_texel_placement_and_thresholds() {
    // Texel (col c, row r) lands on grid cell (6 - r, 6 - c)
    let id = SubmapId::new(0, 0);
    let fetcher = SceneFetcher::new([(id, texture(2, 2, vec![255, 0, 127, 125]))]);
    let (_, publisher) = run(fetcher, vec![SubmapEntry::new(id, 1, Rigid3::identity())]);
    let grid = &publisher.grids[0];

    assert_eq!(grid.get(6, 6), Some(FREE));
    assert_eq!(grid.get(6, 5), Some(OCCUPIED));
    assert_eq!(grid.get(5, 6), Some(FREE));
    assert_eq!(grid.get(5, 5), Some(OCCUPIED));
    assert_eq!(grid.cell_counts().unknown, 140);
}

// ============================================================================
// Placement
// ============================================================================

#[test]
fn test_rotated_pose_bounding_box_is_tight() {
    let id = SubmapId::new(0, 0);
    let mut fetcher = SceneFetcher::new([(id, uniform_texture(2, 255))]);
    let mut cache = SubmapCache::new();
    cache
        .update(
            &[SubmapEntry::new(id, 1, Rigid3::from_xy_yaw(0.0, 0.0, FRAC_PI_4))],
            &mut fetcher,
        )
        .unwrap();

    let scale = 1.0 / RESOLUTION;
    let bbox = bounding_box(&cache, scale).unwrap().unwrap();
    let diagonal = 2.0 * std::f32::consts::SQRT_2;
    assert_relative_eq!(bbox.sizes()[0], diagonal, epsilon = 1e-4);
    assert_relative_eq!(bbox.sizes()[1], diagonal, epsilon = 1e-4);
    assert_relative_eq!(bbox.min[1], 0.0, epsilon = 1e-4);

    let canvas = composite(&cache, &bbox, scale).unwrap();
    assert_eq!((canvas.width(), canvas.height()), (13, 13));
    assert_relative_eq!(canvas.origin[0], 5.0 + std::f32::consts::SQRT_2, epsilon = 1e-4);

    let grid = quantize(&canvas, RESOLUTION, &Header::new(0, "map"));
    // Centre of the diamond
    assert_eq!(grid.get(6, 6), Some(FREE));
    assert_eq!(grid.get(0, 0), Some(UNKNOWN));
    assert_eq!(grid.get(12, 12), Some(UNKNOWN));
}

#[test]
fn test_two_tiles_side_by_side() {
    let (a, b) = (SubmapId::new(0, 0), SubmapId::new(0, 1));
    let fetcher = SceneFetcher::new([(a, uniform_texture(2, 255)), (b, uniform_texture(2, 0))]);
    let (outcome, publisher) = run(
        fetcher,
        vec![
            SubmapEntry::new(a, 1, Rigid3::identity()),
            SubmapEntry::new(b, 1, Rigid3::from_translation(0.1, 0.0, 0.0)),
        ],
    );

    assert!(matches!(
        outcome,
        CycleOutcome::Published {
            width: 14,
            height: 12,
            ..
        }
    ));
    let grid = &publisher.grids[0];
    let counts = grid.cell_counts();
    assert_eq!((counts.free, counts.occupied, counts.unknown), (4, 4, 160));
    assert_eq!(grid.get(5, 5), Some(FREE));
    assert_eq!(grid.get(8, 6), Some(OCCUPIED));
}

#[test]
fn test_rotated_and_plain_tile_union_extent() {
    // Identity: x in [-2, 0], y in [0, 2]. Quarter turn at 0.2 m: x in [4, 6], y in [0, 2]
    let (a, b) = (SubmapId::new(0, 0), SubmapId::new(0, 1));
    let fetcher = SceneFetcher::new([(a, uniform_texture(2, 255)), (b, uniform_texture(2, 0))]);
    let (outcome, publisher) = run(
        fetcher,
        vec![
            SubmapEntry::new(a, 1, Rigid3::identity()),
            SubmapEntry::new(b, 1, Rigid3::from_xy_yaw(0.2, 0.0, FRAC_PI_2)),
        ],
    );

    // Union extent 8 x 2 plus padding
    assert!(matches!(
        outcome,
        CycleOutcome::Published {
            width: 18,
            height: 12,
            ..
        }
    ));
    let grid = &publisher.grids[0];
    assert_relative_eq!(grid.info.origin.position.x, -0.35, epsilon = 1e-6);
    let counts = grid.cell_counts();
    assert_eq!((counts.free, counts.occupied, counts.unknown), (4, 4, 208));
    assert_eq!(grid.get(5, 5), Some(FREE));
    assert_eq!(grid.get(11, 6), Some(OCCUPIED));
    assert_eq!(grid.get(9, 5), Some(UNKNOWN));
}

#[test]
fn test_empty_texture_next_to_normal_one() {
    let (empty, full) = (SubmapId::new(0, 0), SubmapId::new(0, 1));
    let fetcher = SceneFetcher::new([
        (empty, texture(0, 0, Vec::new())),
        (full, uniform_texture(2, 255)),
    ]);
    let (outcome, publisher) = run(
        fetcher,
        vec![
            SubmapEntry::new(empty, 1, Rigid3::identity()),
            SubmapEntry::new(full, 1, Rigid3::identity()),
        ],
    );

    match outcome {
        CycleOutcome::Published { stats, width, height } => {
            assert_eq!(stats.fetched, 2);
            assert_eq!((width, height), (12, 12));
        }
        other => panic!("unexpected outcome {:?}", other),
    }
    assert_eq!(publisher.grids[0].cell_counts().free, 4);
}

// ============================================================================
// Cycle outcomes
// ============================================================================

#[test]
fn test_missing_texture_is_skipped() {
    let (a, b) = (SubmapId::new(0, 0), SubmapId::new(0, 1));
    let fetcher = SceneFetcher::new([(a, uniform_texture(2, 255))]);
    let (outcome, publisher) = run(
        fetcher,
        vec![
            SubmapEntry::new(a, 1, Rigid3::identity()),
            SubmapEntry::new(b, 1, Rigid3::from_translation(5.0, 5.0, 0.0)),
        ],
    );

    match outcome {
        CycleOutcome::Published { stats, width, .. } => {
            assert_eq!(stats.fetched, 1);
            assert_eq!(stats.unavailable, 1);
            assert_eq!(width, 12);
        }
        other => panic!("unexpected outcome {:?}", other),
    }
    assert_eq!(publisher.grids.len(), 1);
}

#[test]
fn test_nothing_published_without_textures() {
    let (outcome, publisher) = run(
        SceneFetcher::default(),
        vec![SubmapEntry::new(SubmapId::new(0, 0), 1, Rigid3::identity())],
    );
    assert!(matches!(outcome, CycleOutcome::NothingToRender(_)));
    assert!(publisher.grids.is_empty());
}

#[test]
fn test_version_bump_refetches_once() {
    let id = SubmapId::new(0, 0);
    let node = OccupancyGridNode::new(
        RenderOptions::new(RESOLUTION),
        SceneFetcher::new([(id, uniform_texture(2, 255))]),
        CollectingPublisher::listening(),
    );

    node.handle_submap_list(&batch(vec![SubmapEntry::new(id, 1, Rigid3::identity())]))
        .unwrap();
    node.handle_submap_list(&batch(vec![SubmapEntry::new(id, 1, Rigid3::identity())]))
        .unwrap();
    assert_eq!(node.with_fetcher(|f| f.fetch_count()), 1);

    // Texture still reports version 1, so version 2 metadata keeps refetching
    node.handle_submap_list(&batch(vec![SubmapEntry::new(id, 2, Rigid3::identity())]))
        .unwrap();
    assert_eq!(node.with_fetcher(|f| f.fetch_count()), 2);
}

// ============================================================================
// Scene replay to map files
// ============================================================================

const SCENE: &str = r#"
stamp_us: 42
submaps:
  - trajectory_id: 0
    submap_index: 0
    version: 1
    resolution: 0.05
    width: 2
    height: 2
    intensity: [255, 255, 255, 255]
    alpha: [255, 255, 255, 255]
"#;

#[test]
fn test_scene_to_ros_map_files() {
    let dir = tempfile::tempdir().unwrap();
    let scene_path = dir.path().join("scene.yaml");
    std::fs::write(&scene_path, SCENE).unwrap();
    let base = dir.path().join("out").join("map");

    let scene = SceneFile::load(&scene_path).unwrap();
    let node = OccupancyGridNode::new(
        RenderOptions::new(RESOLUTION),
        scene.fetcher(),
        MapFilePublisher::new(&base),
    );
    let outcome = node.handle_submap_list(&scene.to_submap_list()).unwrap();
    assert!(matches!(outcome, CycleOutcome::Published { .. }));
    assert_eq!(node.with_publisher(|p| p.published()), 1);

    let paths = chitra::io::map_file_paths(&base);
    let pgm = std::fs::read(&paths.pgm).unwrap();
    let header = b"P5\n12 12\n255\n";
    assert_eq!(&pgm[..header.len()], header);
    let pixels = &pgm[header.len()..];
    assert_eq!(pixels.len(), 144);
    assert_eq!(pixels.iter().filter(|&&p| p == chitra::io::PGM_FREE).count(), 4);

    let info: chitra::io::MapInfo =
        serde_yaml::from_str(&std::fs::read_to_string(&paths.yaml).unwrap()).unwrap();
    assert_eq!(info.image, "map.pgm");
    assert_eq!(info.resolution, 0.05);
    assert_relative_eq!(info.origin[0], -0.35, epsilon = 1e-9);
    assert_relative_eq!(info.origin[1], -0.35, epsilon = 1e-9);
}
