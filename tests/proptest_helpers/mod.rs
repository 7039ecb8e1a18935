#![allow(dead_code)]

use labelcoco::ir::Coord;
use proptest::prelude::*;
use proptest::strategy::BoxedStrategy;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};

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

/// Image sides as labeling tools record them.
pub fn arb_image_side() -> BoxedStrategy<u32> {
    (1u32..=4096).boxed()
}

/// A corner that may fall inside, on the edge of, or well outside an image.
pub fn arb_corner() -> BoxedStrategy<Coord> {
    let axis = prop_oneof![
        4 => -500.0f64..5000.0,
        1 => Just(0.0),
        1 => (-50i32..5000).prop_map(f64::from),
    ];
    (axis.clone(), axis)
        .prop_map(|(x, y)| Coord::new(x, y))
        .boxed()
}

/// Free-text labels that never look like integers.
pub fn arb_text_label() -> BoxedStrategy<String> {
    "[a-z][a-z_ ]{0,11}".boxed()
}
