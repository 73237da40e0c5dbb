// Batch planning unit tests
//
// End-to-end runs of plan_batch and render_watermark through the public API.

use markscale::config::BatchConfig;
use markscale::watermark::surface::{ImageDraw, TextDraw, TilePattern};
use markscale::watermark::*;

fn img(name: &str, width: u32, height: u32) -> BatchImage {
    BatchImage::new(format!("id-{}", name), name, width, height)
}

fn text_plan(plan: &ImagePlan) -> &TextDraw {
    match plan.result.as_ref() {
        Ok(Some(RenderPlan::Text(text))) => text,
        other => panic!("Expected text plan for {}, got {:?}", plan.image_name, other),
    }
}

/// Surface whose every call fails, like a canvas that lost its buffer
struct BrokenSurface;

impl RenderSurface for BrokenSurface {
    fn draw_text(&mut self, _text: &TextDraw) -> Result<(), WatermarkError> {
        Err(WatermarkError::Surface("context lost".to_string()))
    }

    fn draw_image(&mut self, _image: &ImageDraw) -> Result<(), WatermarkError> {
        Err(WatermarkError::Surface("context lost".to_string()))
    }

    fn tile_pattern(&mut self, _pattern: &TilePattern) -> Result<(), WatermarkError> {
        Err(WatermarkError::Surface("context lost".to_string()))
    }
}

#[test]
fn test_similar_images_get_identical_fixed_watermarks() {
    let images = vec![
        img("a", 1920, 1080),
        img("b", 1920, 1080),
        img("c", 1600, 1200),
    ];
    let plan = plan_batch(
        &WatermarkConfig::text("© 2024"),
        &images,
        None,
        &BatchConfig::default(),
    )
    .unwrap();

    assert_eq!(plan.strategy, ScalingStrategy::Fixed);
    assert_eq!(plan.failure_count(), 0);
    assert_eq!(plan.plans.len(), 3);

    for image_plan in &plan.plans {
        let text = text_plan(image_plan);
        assert_eq!(text.font_size, 24.0);
        assert_eq!(text.content, "© 2024");
    }
}

#[test]
fn test_proportional_batch_keeps_relative_size() {
    let images = vec![
        img("small", 800, 600),
        img("large", 1600, 1200),
        img("mid", 1000, 750),
    ];
    let plan = plan_batch(
        &WatermarkConfig::text("© 2024"),
        &images,
        None,
        &BatchConfig::default(),
    )
    .unwrap();

    assert_eq!(plan.strategy, ScalingStrategy::Proportional);
    assert_eq!(plan.context.as_ref().unwrap().reference_image.name, "mid");

    // Plans come back in input order even when planned in parallel
    let names: Vec<_> = plan.plans.iter().map(|p| p.image_name.as_str()).collect();
    assert_eq!(names, ["small", "large", "mid"]);

    let small = text_plan(&plan.plans[0]).font_size;
    let large = text_plan(&plan.plans[1]).font_size;
    let mid = text_plan(&plan.plans[2]).font_size;
    assert!(small < mid && mid < large, "{} {} {}", small, mid, large);
    // 750 * (38 / 750) * 0.8
    assert_eq!(mid, 30.0);
}

#[test]
fn test_sequential_and_parallel_plans_match() {
    let images = vec![
        img("thumb", 320, 240),
        img("photo", 1920, 1080),
        img("poster", 6000, 4000),
    ];
    let config = WatermarkConfig::text("Sample");

    let parallel = plan_batch(&config, &images, None, &BatchConfig::default()).unwrap();
    let sequential = plan_batch(
        &config,
        &images,
        None,
        &BatchConfig {
            parallel: false,
            ..BatchConfig::default()
        },
    )
    .unwrap();

    assert_eq!(parallel.strategy, ScalingStrategy::Adaptive);
    assert_eq!(parallel, sequential);
}

#[test]
fn test_per_image_failures_do_not_stop_the_batch() {
    // Adaptive image watermarks need the intrinsic logo size
    let images = vec![img("thumb", 320, 240), img("poster", 6000, 4000)];
    let config = WatermarkConfig::image("logo.png", 200.0, 100.0);

    let plan = plan_batch(&config, &images, None, &BatchConfig::default()).unwrap();
    assert_eq!(plan.strategy, ScalingStrategy::Adaptive);
    assert_eq!(plan.failure_count(), 2);
    for failed in plan.failures() {
        assert_eq!(
            failed.result,
            Err(WatermarkError::MissingOriginalSize { kind: "image" })
        );
    }

    let original = WatermarkSize::new(400.0, 200.0);
    let plan = plan_batch(&config, &images, Some(&original), &BatchConfig::default()).unwrap();
    assert_eq!(plan.failure_count(), 0);
}

#[test]
fn test_empty_batch_is_an_error() {
    let err = plan_batch(
        &WatermarkConfig::text("x"),
        &[],
        None,
        &BatchConfig::default(),
    )
    .unwrap_err();
    assert_eq!(err, WatermarkError::EmptyBatch);
}

#[test]
fn test_disabled_watermark_plans_nothing() {
    let mut config = WatermarkConfig::text("x");
    config.enabled = false;

    let images = vec![img("a", 800, 600)];
    let plan = plan_batch(&config, &images, None, &BatchConfig::default()).unwrap();
    assert_eq!(plan.plans[0].result, Ok(None));

    let mut surface = RecordingSurface::new();
    let drawn = render_watermark(&config, &images[0].dimensions, None, &mut surface).unwrap();
    assert!(!drawn);
    assert!(surface.is_empty());
}

#[test]
fn test_render_records_one_command_per_watermark() {
    let canvas = ImageDimensions::new(1280, 720);
    let mut surface = RecordingSurface::new();

    let configs = [
        WatermarkConfig::text("© 2024"),
        WatermarkConfig::image("logo.png", 120.0, 40.0).with_scale_mode(ScaleMode::Fixed),
        WatermarkConfig::fullscreen(FullscreenStyle::text("DRAFT")),
    ];
    for config in &configs {
        assert!(render_watermark(config, &canvas, None, &mut surface).unwrap());
    }

    assert_eq!(surface.len(), 3);
    assert!(matches!(surface.commands[0], RenderPlan::Text(_)));
    assert!(matches!(surface.commands[1], RenderPlan::Image(_)));
    match &surface.commands[2] {
        RenderPlan::Tiled(pattern) => {
            assert_eq!((pattern.left, pattern.top), (0.0, 0.0));
            assert_eq!((pattern.width, pattern.height), (1280.0, 720.0));
            assert!(pattern.layout.total_tiles > 0);
        }
        other => panic!("Expected tiled plan, got {:?}", other),
    }
}

#[test]
fn test_surface_errors_propagate() {
    let err = render_watermark(
        &WatermarkConfig::text("x"),
        &ImageDimensions::new(800, 600),
        None,
        &mut BrokenSurface,
    )
    .unwrap_err();
    assert_eq!(err, WatermarkError::Surface("context lost".to_string()));
}

#[test]
fn test_batch_report_after_planning() {
    let images = vec![
        img("small", 800, 600),
        img("mid", 1000, 750),
        img("large", 1600, 1200),
    ];
    let config = WatermarkConfig::text("x");
    let optimization = optimize_batch_configuration(&config, &images).unwrap();
    let configs: Vec<_> = images
        .iter()
        .map(|image| adjust_watermark_for_image(&optimization.optimized_config, image))
        .collect();

    let context = optimization.optimized_config.context.as_ref().unwrap();
    let report = generate_batch_report(&configs, &images, context);

    assert_eq!(
        report.summary,
        "Processed 3 image(s) with proportional scaling. Configuration is consistent."
    );
    assert_eq!(report.size_range, "800x600 to 1600x1200");

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["scaling_mode"], "proportional");
    assert_eq!(json["consistency"]["is_consistent"], true);
}
