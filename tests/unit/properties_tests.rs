// Geometry property tests
//
// These tests pin down the behavior every renderer relies on: base selection,
// readability bounds, scaling stability, proportion round trips, anchors,
// tiling and batch strategy selection.

use markscale::watermark::*;
use rstest::rstest;

fn dims(width: u32, height: u32) -> ImageDimensions {
    ImageDimensions::new(width, height)
}

/// Test: Base dimension follows the aspect ratio
///
/// Ultra-wide images scale from the height, ultra-tall images from the width,
/// everything else from the shorter edge.
#[rstest]
#[case(1900, 1000)]
#[case(2560, 1080)]
#[case(10_000, 100)]
fn test_wide_images_scale_from_height(#[case] w: u32, #[case] h: u32) {
    assert_eq!(choose_base_dimension(&dims(w, h)), BaseOn::Height);
}

#[rstest]
#[case(1000, 1700)]
#[case(1080, 2400)]
#[case(100, 10_000)]
fn test_tall_images_scale_from_width(#[case] w: u32, #[case] h: u32) {
    assert_eq!(choose_base_dimension(&dims(w, h)), BaseOn::Width);
}

#[rstest]
#[case(1000, 1000)]
#[case(1920, 1080)]
#[case(1080, 1350)]
#[case(1800, 1000)]
#[case(600, 1000)]
fn test_regular_images_scale_from_shorter_edge(#[case] w: u32, #[case] h: u32) {
    assert_eq!(choose_base_dimension(&dims(w, h)), BaseOn::ShorterEdge);
}

/// Test: Readability ceiling never decreases as the area grows
#[test]
fn test_readability_max_is_monotonic_in_area() {
    let sizes = [
        (64, 64),
        (320, 240),
        (800, 600),
        (1280, 720),
        (1920, 1080),
        (3840, 2160),
        (6000, 4000),
        (12_000, 9_000),
    ];

    let mut previous = f64::MIN;
    for (w, h) in sizes {
        let limits = readability_limits(&dims(w, h));
        assert!(
            limits.max_size >= previous,
            "max_size dropped at {}x{}: {} < {}",
            w,
            h,
            limits.max_size,
            previous
        );
        assert!(limits.min_size >= 12.0);
        assert!(limits.max_size <= 200.0);
        previous = limits.max_size;
    }
}

/// Test: Doubling the image doubles the font size
///
/// With `base_on = shorter-edge`, the font size is proportional to the base
/// dimension as long as it stays inside the readability limits.
#[rstest]
#[case(800, 600)]
#[case(1000, 1000)]
#[case(1200, 900)]
fn test_percentage_font_doubles_with_image(#[case] w: u32, #[case] h: u32) {
    let config = WatermarkConfig::text("Sample").with_adaptive(AdaptiveConfig {
        base_on: Some(BaseOn::ShorterEdge),
        ..AdaptiveConfig::default()
    });

    let small = calculate_adaptive_watermark_size(&config, &dims(w, h), None).unwrap();
    let large = calculate_adaptive_watermark_size(&config, &dims(w * 2, h * 2), None).unwrap();

    let small_font = small.font_size.unwrap();
    let large_font = large.font_size.unwrap();
    assert!(
        (large_font - small_font * 2.0).abs() <= 1.0,
        "{}x{}: {} vs {}",
        w,
        h,
        small_font,
        large_font
    );
}

/// Test: Proportions survive a pixel round trip
#[rstest]
#[case(0.2, 0.1, 1920, 1080)]
#[case(0.35, 0.05, 800, 600)]
#[case(1.0, 1.0, 640, 480)]
#[case(0.013, 0.5, 4000, 3000)]
fn test_proportion_round_trip(
    #[case] scale_x: f64,
    #[case] scale_y: f64,
    #[case] w: u32,
    #[case] h: u32,
) {
    let p = ProportionData {
        scale_x_percent: scale_x,
        scale_y_percent: scale_y,
        offset_x_percent: 0.1,
        offset_y_percent: -0.05,
    };
    let canvas = dims(w, h);
    let pixels = apply_proportions(&p, &canvas).unwrap();

    let recovered = calculate_proportions(
        &PositionConfig::default(),
        &canvas,
        &WatermarkSize::new(pixels.width, pixels.height),
    )
    .unwrap();

    assert!((recovered.scale_x_percent - scale_x).abs() < 1e-3);
    assert!((recovered.scale_y_percent - scale_y).abs() < 1e-3);
}

/// Test: Anchors on an 800x600 canvas
#[test]
fn test_anchor_symmetry() {
    let canvas = dims(800, 600);

    let top_left = calculate_anchor_position(&canvas, WatermarkPosition::TopLeft, 20.0, 0.0, 0.0);
    assert_eq!((top_left.anchor_x, top_left.anchor_y), (20.0, 20.0));

    let bottom_right =
        calculate_anchor_position(&canvas, WatermarkPosition::BottomRight, 20.0, 0.0, 0.0);
    assert_eq!((bottom_right.anchor_x, bottom_right.anchor_y), (780.0, 580.0));

    let center = calculate_anchor_position(&canvas, WatermarkPosition::MiddleCenter, 20.0, 0.0, 0.0);
    assert_eq!((center.anchor_x, center.anchor_y), (400.0, 300.0));
}

/// Test: Mirrored positions are symmetric around the canvas center
#[test]
fn test_mirrored_anchors_sum_to_canvas() {
    let canvas = dims(1024, 768);
    let pairs = [
        (WatermarkPosition::TopLeft, WatermarkPosition::BottomRight),
        (WatermarkPosition::TopRight, WatermarkPosition::BottomLeft),
        (WatermarkPosition::MiddleLeft, WatermarkPosition::MiddleRight),
        (WatermarkPosition::TopCenter, WatermarkPosition::BottomCenter),
    ];

    for (a, b) in pairs {
        let pa = calculate_anchor_position(&canvas, a, 32.0, 0.0, 0.0);
        let pb = calculate_anchor_position(&canvas, b, 32.0, 0.0, 0.0);
        assert_eq!(pa.anchor_x + pb.anchor_x, 1024.0, "{} / {}", a, b);
        assert_eq!(pa.anchor_y + pb.anchor_y, 768.0, "{} / {}", a, b);
    }
}

/// Test: Edge-aligned anchors ignore the margin
#[test]
fn test_edge_aligned_zero_margin() {
    let anchor = calculate_edge_aligned_anchor_position(
        &dims(800, 600),
        WatermarkPosition::TopLeft,
        20.0,
        0.0,
        0.0,
    );
    assert_eq!((anchor.anchor_x, anchor.anchor_y), (0.0, 0.0));
}

/// Test: Rotation never shrinks a tile
///
/// The extra half-spacing granted to rotated tiles covers what the content
/// loses along the x axis for the default spacing and moderately wide content.
#[rstest]
#[case(15.0)]
#[case(30.0)]
#[case(-45.0)]
#[case(60.0)]
#[case(-135.0)]
#[case(180.0)]
fn test_rotated_tile_never_shrinks(#[case] rotation: f64) {
    let styles = [
        FullscreenStyle::text("CONFIDENTIAL"),
        FullscreenStyle::text(""),
        FullscreenStyle::image("logo.png", 300.0, 60.0),
    ];

    for mut style in styles {
        let flat = calculate_tile_size(&style);
        style.rotation = rotation;
        let rotated = calculate_tile_size(&style);

        assert!(rotated.width >= flat.width, "width shrank at {}°", rotation);
        assert!(rotated.height >= flat.height, "height shrank at {}°", rotation);
    }
}

/// Test: Batch strategy follows the area spread
#[rstest]
#[case(vec![(10, 10), (10, 10), (10, 10)], ScalingStrategy::Fixed)]
#[case(vec![(10, 10), (25, 20), (10, 10)], ScalingStrategy::Proportional)]
#[case(vec![(10, 10), (50, 40), (10, 10)], ScalingStrategy::Adaptive)]
fn test_batch_strategy_selection(
    #[case] sizes: Vec<(u32, u32)>,
    #[case] expected: ScalingStrategy,
) {
    let images: Vec<BatchImage> = sizes
        .iter()
        .enumerate()
        .map(|(i, (w, h))| BatchImage::new(i.to_string(), format!("img-{}", i), *w, *h))
        .collect();

    // Fixed-size text keeps the tiny reference images valid for proportions
    let mut config = WatermarkConfig::text("x").with_scale_mode(ScaleMode::Fixed);
    if let WatermarkKind::Text(style) = &mut config.kind {
        style.font_size = 2.0;
    }

    let result = optimize_batch_configuration(&config, &images).unwrap();
    assert_eq!(result.strategy, expected);
}

/// Test: Full HD copyright line
#[test]
fn test_end_to_end_full_hd_text() {
    let config = WatermarkConfig::text("© 2024")
        .with_scale_mode(ScaleMode::Percentage)
        .with_adaptive(AdaptiveConfig {
            scale_ratio: 0.05,
            base_on: Some(BaseOn::ShorterEdge),
            ..AdaptiveConfig::default()
        });
    let image = dims(1920, 1080);

    let limits = readability_limits(&image);
    assert_eq!(limits.min_size, 12.0);
    assert_eq!(limits.max_size, 86.0);

    let result = calculate_adaptive_watermark_size(&config, &image, None).unwrap();
    assert_eq!(result.font_size, Some(54.0));
}
