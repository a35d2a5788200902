use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use skyview_catalog::index::{Catalog, Div};
use skyview_catalog::view::{Camera, CatalogFile, Origin, View, ViewParams, ViewStar, WeightCurve};
use skyview_core::{Brightness, Color, SkyError, Star, Vector3};
use std::cmp::Ordering;
use std::f64::consts::{PI, TAU};
use std::io::Cursor;

fn random_direction(rng: &mut StdRng) -> Vector3 {
    let z: f64 = rng.gen_range(-1.0..=1.0);
    let azimuth = rng.gen_range(0.0..TAU);
    Vector3::from_colatitude_azimuth(libm::acos(z), azimuth)
}

fn random_star(rng: &mut StdRng) -> Star {
    Star::new(
        random_direction(rng),
        Brightness::new(rng.gen_range(0.0..=1.0)).unwrap(),
        Color::new(rng.gen(), rng.gen(), rng.gen()),
    )
    .unwrap()
}

fn random_catalog(depth: u8, count: usize, seed: u64) -> Catalog {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut catalog = Catalog::create(depth).unwrap();
    for _ in 0..count {
        let level = rng.gen_range(0..=depth);
        catalog.insert(level, random_star(&mut rng)).unwrap();
    }
    catalog
}

fn encode(catalog: &Catalog) -> Vec<u8> {
    let mut buf = Vec::new();
    catalog.write(&mut buf).unwrap();
    buf
}

fn query(bytes: &[u8], camera: &Camera, params: &ViewParams) -> Result<View, SkyError> {
    View::from_reader(&mut Cursor::new(bytes), camera, params)
}

/// Visible stars found by visiting every node up to `params.max_level`.
fn brute_force(catalog: &Catalog, camera: &Camera, params: &ViewParams) -> Vec<ViewStar> {
    let origin = Origin::new(&camera.location);
    let frame = camera.field_of_view();
    let rotation = -origin.apply(&camera.anchor).to_colatitude_azimuth().1;
    let curve = WeightCurve::new(frame, params.sensitivity);

    let mut stars = Vec::new();
    catalog.visit(|depth, div: &Div| {
        if depth > params.max_level as usize {
            return;
        }
        for star in &div.stars {
            let (t, p) = origin.apply(&star.location).to_colatitude_azimuth();
            if t < frame {
                let weight = curve.weight(star.brightness.value());
                if weight > params.min_weight {
                    stars.push(ViewStar {
                        azimuth: p + rotation,
                        radius: t / frame,
                        weight,
                        color: star.color,
                    });
                }
            }
        }
    });
    stars.sort_by(|a, b| b.weight.partial_cmp(&a.weight).unwrap_or(Ordering::Equal));
    stars
}

/// Walks the node records using only the stored sizes and checks each one
/// ends exactly where its content does.
fn skip_walk(bytes: &[u8], pos: usize) -> usize {
    let be32 = |at: usize| u32::from_be_bytes(bytes[at..at + 4].try_into().unwrap()) as usize;

    let content_size = be32(pos + 15);
    let mut cursor = pos + 19;
    let star_count = be32(cursor);
    cursor += 4 + 16 * star_count;
    let child_count = bytes[cursor] as usize;
    cursor += 1;
    for _ in 0..child_count {
        cursor = skip_walk(bytes, cursor);
    }

    assert_eq!(cursor, pos + 19 + content_size, "node at offset {}", pos);
    cursor
}

#[test]
fn test_content_sizes_allow_skipping() {
    let catalog = random_catalog(3, 2000, 1);
    let bytes = encode(&catalog);
    assert_eq!(skip_walk(&bytes, 6), bytes.len());
}

#[test]
fn test_pruned_query_matches_brute_force() {
    let catalog = random_catalog(4, 3000, 2);
    let bytes = encode(&catalog);
    let decoded = Catalog::read(&mut Cursor::new(&bytes)).unwrap();

    let mut rng = StdRng::seed_from_u64(3);
    let mut narrower_than_catalog = 0;
    for _ in 0..60 {
        let camera = Camera::from_ra_dec(
            rng.gen_range(0.0..24.0),
            rng.gen_range(-90.0..90.0),
            rng.gen_range(0.5..120.0),
        )
        .unwrap();
        let params = ViewParams {
            max_level: rng.gen_range(0..=4),
            sensitivity: rng.gen_range(10.0..100.0),
            min_weight: 0.0,
        };

        let view = query(&bytes, &camera, &params).unwrap();
        let expected = brute_force(&decoded, &camera, &params);
        assert_eq!(view.stars, expected, "camera {:?} params {:?}", camera, params);
        if view.len() < decoded.star_count() {
            narrower_than_catalog += 1;
        }
    }
    assert!(narrower_than_catalog > 0);
}

#[test]
fn test_results_sorted_and_in_range() {
    let catalog = random_catalog(3, 1500, 4);
    let bytes = encode(&catalog);
    let camera = Camera::from_ra_dec(12.0, 30.0, 90.0).unwrap();

    let view = query(&bytes, &camera, &ViewParams::default()).unwrap();
    assert!(!view.is_empty());
    for pair in view.stars.windows(2) {
        assert!(pair[0].weight >= pair[1].weight);
    }
    for star in &view.stars {
        assert!((0.0..1.0).contains(&star.radius));
        assert!(star.weight > 0.1 && star.weight <= 1.0);
    }
}

#[test]
fn test_anchor_lands_at_azimuth_zero() {
    let mut catalog = Catalog::create(1).unwrap();
    let camera = Camera::from_ra_dec(3.0, 20.0, 30.0).unwrap();
    // A bright star halfway between the view center and the anchor.
    let halfway = (camera.location + camera.anchor).normalized().unwrap();
    catalog
        .insert(0, Star::new(halfway, Brightness::new(1.0).unwrap(), Color::WHITE).unwrap())
        .unwrap();

    let view = query(&encode(&catalog), &camera, &ViewParams::default()).unwrap();
    assert_eq!(view.len(), 1);
    let star = view.stars[0];
    let azimuth = libm::atan2(libm::sin(star.azimuth), libm::cos(star.azimuth));
    assert!(azimuth.abs() < 1e-6, "azimuth {}", azimuth);
    assert!((star.radius - 0.5).abs() < 1e-6, "radius {}", star.radius);
}

#[test]
fn test_stars_within_decoded_cones() {
    let catalog = random_catalog(4, 2000, 5);
    let decoded = Catalog::read(&mut Cursor::new(encode(&catalog))).unwrap();
    decoded.visit(|_, div| {
        for star in &div.stars {
            assert!(div.center.angular_distance(&star.location) <= div.radius);
        }
        for child in &div.children {
            for star in &child.stars {
                assert!(div.center.angular_distance(&star.location) <= div.radius);
            }
        }
    });
}

#[test]
fn test_level_of_detail() {
    let mut catalog = Catalog::create(3).unwrap();
    let camera = Camera::from_ra_dec(18.6, 38.8, 2.0).unwrap();
    let star = Star::new(camera.location, Brightness::new(1.0).unwrap(), Color::WHITE).unwrap();
    catalog.insert(3, star).unwrap();
    let bytes = encode(&catalog);

    let shallow = ViewParams {
        max_level: 2,
        ..ViewParams::default()
    };
    assert!(query(&bytes, &camera, &shallow).unwrap().is_empty());

    let deep = ViewParams {
        max_level: 3,
        ..ViewParams::default()
    };
    let view = query(&bytes, &camera, &deep).unwrap();
    assert_eq!(view.len(), 1);
    assert_eq!(view.stars[0].weight, 1.0);
}

#[test]
fn test_root_stars_visible_at_level_zero() {
    let mut catalog = Catalog::create(3).unwrap();
    let camera = Camera::from_ra_dec(5.6, -1.2, 20.0).unwrap();
    let star = Star::new(camera.location, Brightness::new(1.0).unwrap(), Color::WHITE).unwrap();
    catalog.insert(0, star).unwrap();

    let params = ViewParams {
        max_level: 0,
        ..ViewParams::default()
    };
    let view = query(&encode(&catalog), &camera, &params).unwrap();
    assert_eq!(view.len(), 1);
    assert!(view.stars[0].radius < 1e-6);
}

#[test]
fn test_zero_field_of_view_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("single.skyv");

    let location = Vector3::new(0.2, -0.4, 0.7).normalized().unwrap();
    let mut catalog = Catalog::create(0).unwrap();
    catalog
        .insert(0, Star::new(location, Brightness::new(1.0).unwrap(), Color::WHITE).unwrap())
        .unwrap();
    catalog.save(&path).unwrap();
    assert_eq!(Catalog::load(&path).unwrap().star_count(), 1);

    let camera = Camera::new(location, location).unwrap();
    let view = View::from_path(&path, &camera, &ViewParams::default()).unwrap();
    assert_eq!(view.frame_angle, 0.0);
    assert!(view.is_empty());
}

#[test]
fn test_thousand_stars_at_depth_two() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("uniform.skyv");

    let mut rng = StdRng::seed_from_u64(6);
    let mut catalog = Catalog::create(2).unwrap();
    for _ in 0..1000 {
        catalog.insert(2, random_star(&mut rng)).unwrap();
    }
    catalog.save(&path).unwrap();

    let decoded = Catalog::load(&path).unwrap();
    assert_eq!(decoded.stars_per_level(), vec![0, 0, 1000]);

    let mut leaves = 0;
    let mut occupied = 0;
    let mut leaf_stars = 0;
    decoded.visit(|_, div| {
        if div.is_leaf() {
            leaves += 1;
            leaf_stars += div.stars.len();
            if !div.stars.is_empty() {
                occupied += 1;
            }
        }
    });
    assert_eq!(leaves, 320);
    assert_eq!(leaf_stars, 1000);
    // About 3 stars per leaf; nearly every leaf should hold at least one.
    assert!(occupied > 250, "only {} of 320 leaves occupied", occupied);

    // A whole-sky view sees them all.
    let camera = Camera::from_ra_dec(0.0, 0.0, 360.0).unwrap();
    let params = ViewParams {
        min_weight: -1.0,
        ..ViewParams::default()
    };
    let view = CatalogFile::open(&path).unwrap().view(&camera, &params).unwrap();
    assert_eq!(view.len(), 1000);
}

#[test]
fn test_legacy_headerless_catalog() {
    let catalog = random_catalog(2, 500, 7);
    let bytes = encode(&catalog);
    let mut legacy = vec![catalog.max_level];
    legacy.extend_from_slice(&bytes[6..]);

    let camera = Camera::from_ra_dec(7.0, -20.0, 50.0).unwrap();
    let params = ViewParams::default();
    let modern = query(&bytes, &camera, &params).unwrap();
    let old = query(&legacy, &camera, &params).unwrap();
    assert_eq!(modern, old);

    let decoded = Catalog::read(&mut Cursor::new(&legacy)).unwrap();
    assert_eq!(decoded.star_count(), 500);
}

#[test]
fn test_truncated_stream_is_corrupt() {
    let bytes = encode(&random_catalog(2, 300, 8));
    let wide = Camera::from_ra_dec(1.0, 1.0, 180.0).unwrap();
    let narrow = Camera::from_ra_dec(1.0, 1.0, 1.0).unwrap();

    for cut in [3, 20, bytes.len() / 3, bytes.len() - 1] {
        for camera in [&wide, &narrow] {
            let err = query(&bytes[..cut], camera, &ViewParams::default()).unwrap_err();
            assert!(
                matches!(err, SkyError::CorruptCatalog { .. }),
                "cut {} gave {:?}",
                cut,
                err
            );
        }
    }
}

#[test]
fn test_size_past_end_is_corrupt() {
    let catalog = Catalog::create(2).unwrap();
    let mut bytes = encode(&catalog);
    // First child of the root: header 6, root record 19, star_count 4, child_count 1.
    let child = 6 + 19 + 4 + 1;
    bytes[child + 15..child + 19].copy_from_slice(&u32::MAX.to_be_bytes());

    // Looking at the south pole prunes the first (north cap) face.
    let camera = Camera::from_ra_dec(0.0, -90.0, 10.0).unwrap();
    match query(&bytes, &camera, &ViewParams::default()) {
        Err(SkyError::CorruptCatalog { field, .. }) => assert_eq!(field, "content_size"),
        other => panic!("expected corrupt catalog, got {:?}", other),
    }

    // A full decode does not rely on the stored sizes.
    assert_eq!(
        Catalog::read(&mut Cursor::new(&bytes)).unwrap().node_count(),
        catalog.node_count()
    );
}

#[test]
fn test_invalid_sensitivity_rejected() {
    let bytes = encode(&Catalog::create(1).unwrap());
    let camera = Camera::from_ra_dec(0.0, 0.0, 10.0).unwrap();
    let params = ViewParams {
        sensitivity: 0.0,
        ..ViewParams::default()
    };
    assert!(matches!(
        query(&bytes, &camera, &params),
        Err(SkyError::InvalidParameter { .. })
    ));
}

#[test]
fn test_camera_pan_and_spin_keep_queries_consistent() {
    let catalog = random_catalog(3, 1500, 9);
    let bytes = encode(&catalog);
    let decoded = Catalog::read(&mut Cursor::new(&bytes)).unwrap();

    let mut camera = Camera::from_ra_dec(20.0, -40.0, 30.0).unwrap();
    let params = ViewParams {
        min_weight: 0.0,
        ..ViewParams::default()
    };
    for step in 0..10 {
        if step % 2 == 0 {
            camera.pan(0.2, 0.05).unwrap();
        } else {
            camera.spin(PI / 7.0, 0.9).unwrap();
        }
        let view = query(&bytes, &camera, &params).unwrap();
        assert_eq!(view.stars, brute_force(&decoded, &camera, &params));
    }
}

fn assert_corrupt(result: Result<impl std::fmt::Debug, SkyError>, expected_field: &str) {
    match result {
        Err(SkyError::CorruptCatalog { field, .. }) => assert_eq!(field, expected_field),
        other => panic!("expected corrupt {}, got {:?}", expected_field, other),
    }
}

#[test]
fn test_understated_child_count_is_corrupt() {
    let mut catalog = Catalog::create(1).unwrap();
    let north = Vector3::new(0.1, 0.2, 0.9);
    for level in [0, 1] {
        let star = Star::new(north, Brightness::new(0.9).unwrap(), Color::WHITE).unwrap();
        catalog.insert(level, star).unwrap();
    }
    let mut bytes = encode(&catalog);

    // Root child_count: header 6, root record 19, star_count 4, one star.
    let child_count = 6 + 19 + 4 + 16;
    assert_eq!(bytes[child_count], 20);
    bytes[child_count] = 0;

    assert_corrupt(Catalog::read(&mut Cursor::new(&bytes)), "child_count");

    let wide = Camera::from_ra_dec(0.0, 60.0, 180.0).unwrap();
    assert_corrupt(query(&bytes, &wide, &ViewParams::default()), "content_size");
}

#[test]
fn test_understated_content_size_is_corrupt() {
    let catalog = Catalog::create(1).unwrap();
    let mut bytes = encode(&catalog);
    // First face of an empty mesh: content is just star_count and child_count.
    let face = 6 + 19 + 4 + 1;
    assert_eq!(&bytes[face + 15..face + 19], &[0, 0, 0, 5]);
    bytes[face + 15..face + 19].copy_from_slice(&4u32.to_be_bytes());

    // The first face caps the north pole, so this view reads it in full.
    let camera = Camera::from_ra_dec(0.0, 90.0, 10.0).unwrap();
    assert_corrupt(query(&bytes, &camera, &ViewParams::default()), "content_size");
}

#[test]
fn test_trailing_bytes_are_corrupt() {
    let mut bytes = encode(&random_catalog(1, 50, 10));
    bytes.extend_from_slice(&[0; 24]);

    let camera = Camera::from_ra_dec(2.0, 10.0, 40.0).unwrap();
    assert_corrupt(query(&bytes, &camera, &ViewParams::default()), "child_count");
    assert_corrupt(Catalog::read(&mut Cursor::new(&bytes)), "child_count");
}

/// A legacy catalog claiming `max_level` 2 whose nodes nest `depth` deep,
/// each the only child of the one before.
fn nested_catalog(depth: usize) -> Vec<u8> {
    let mut bytes = vec![2u8];
    for i in 0..depth {
        let inner = depth - 1 - i;
        // center +Z, radius π
        bytes.extend_from_slice(&[0, 0, 0, 0, 0, 0, 0, 0, 0x7F, 0xFF, 0xFF, 0xFF]);
        bytes.extend_from_slice(&[0xFF, 0xFF, 0xFF]);
        bytes.extend_from_slice(&(5 + 24 * inner as u32).to_be_bytes());
        bytes.extend_from_slice(&0u32.to_be_bytes());
        bytes.push(if inner > 0 { 1 } else { 0 });
    }
    bytes
}

#[test]
fn test_nesting_past_catalog_level_is_corrupt() {
    let shallow = nested_catalog(3);
    assert_eq!(Catalog::read(&mut Cursor::new(&shallow)).unwrap().node_count(), 3);

    let bytes = nested_catalog(300);
    let camera = Camera::from_ra_dec(0.0, 90.0, 30.0).unwrap();
    let params = ViewParams {
        max_level: u8::MAX,
        ..ViewParams::default()
    };
    assert_corrupt(query(&bytes, &camera, &params), "child_count");
    assert_corrupt(Catalog::read(&mut Cursor::new(&bytes)), "child_count");
}
