#![allow(dead_code)]

use proptest::prelude::*;
use proptest::strategy::BoxedStrategy;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};

use yolo_annotator::ir::{Annotation, BBoxXYWH, Normalized};

/// Six decimal places on each encoded field, plus float noise from the
/// center/corner arithmetic.
pub const EPS_YOLO_TEXT: f64 = 1.5e-6;

/// Float noise from the center/corner arithmetic alone.
pub const EPS_GEOMETRY: f64 = 1e-12;

pub fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(64);

    let mut config = ProptestConfig::with_failure_persistence(FileFailurePersistence::WithSource(
        "proptest-regressions",
    ));
    config.cases = cases;
    config.max_shrink_iters = 1024;
    config
}

/// A normalized corner-form box that lies fully inside the unit square and
/// has a positive extent.
pub fn arb_bbox_in_bounds() -> BoxedStrategy<BBoxXYWH<Normalized>> {
    (0.0f64..0.99, 0.0f64..0.99, 0.0f64..1.0, 0.0f64..1.0)
        .prop_map(|(x, y, fw, fh)| {
            let w = ((1.0 - x) * fw).max(1e-4);
            let h = ((1.0 - y) * fh).max(1e-4);
            BBoxXYWH::from_xywh(x, y, w.min(1.0 - x), h.min(1.0 - y))
        })
        .boxed()
}

/// A center-form box with in-domain fields that may still overflow the
/// image.
pub fn arb_center_fields() -> BoxedStrategy<(f64, f64, f64, f64)> {
    (0.0f64..=1.0, 0.0f64..=1.0, 1e-6f64..=1.0, 1e-6f64..=1.0).boxed()
}

pub fn arb_annotation() -> BoxedStrategy<Annotation> {
    (1u64..1000, 0u64..80, arb_bbox_in_bounds())
        .prop_map(|(id, category, bbox)| Annotation::new(id, category, bbox))
        .boxed()
}

pub fn arb_annotations(max_len: usize) -> BoxedStrategy<Vec<Annotation>> {
    prop::collection::vec(arb_annotation(), 0..=max_len).boxed()
}

/// Lines that look roughly like label lines: the right alphabet, wrong
/// shapes included.
pub fn arb_label_like_line() -> BoxedStrategy<String> {
    let token = prop_oneof![
        "[0-9]{1,3}",
        "-?[0-9]\\.[0-9]{1,8}",
        "(nan|NaN|inf|-inf|1e400|abc|\\.|-)",
        "[0-9a-z.+-]{1,6}",
    ];
    prop::collection::vec(token, 0..8)
        .prop_map(|tokens| tokens.join(" "))
        .boxed()
}

/// Arbitrary multi-line text made of label-like lines and blank lines.
pub fn arb_label_text() -> BoxedStrategy<String> {
    prop::collection::vec(
        prop_oneof![4 => arb_label_like_line(), 1 => Just(String::new())],
        0..12,
    )
    .prop_map(|lines| lines.join("\n"))
    .boxed()
}

pub fn assert_bbox_close(
    a: &BBoxXYWH<Normalized>,
    b: &BBoxXYWH<Normalized>,
    eps: f64,
) -> Result<(), String> {
    let pairs = [
        ("x", a.x(), b.x()),
        ("y", a.y(), b.y()),
        ("width", a.width, b.width),
        ("height", a.height, b.height),
    ];
    for (name, left, right) in pairs {
        if (left - right).abs() > eps {
            return Err(format!(
                "{name} differs: {left} vs {right} (eps {eps}); boxes {a:?} vs {b:?}"
            ));
        }
    }
    Ok(())
}
