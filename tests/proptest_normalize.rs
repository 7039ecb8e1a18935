use labelcoco::ir::BBoxXYXY;
use proptest::prelude::*;

mod proptest_helpers;

use proptest_helpers::{arb_corner, arb_image_side};

proptest! {
    #![proptest_config(proptest_helpers::proptest_config())]

    #[test]
    fn clamped_box_stays_within_image(
        p0 in arb_corner(),
        p1 in arb_corner(),
        width in arb_image_side(),
        height in arb_image_side(),
    ) {
        let bbox = BBoxXYXY::from_corners(p0, p1, width, height);

        prop_assert!(bbox.xmin() >= 0.0);
        prop_assert!(bbox.ymin() >= 0.0);
        prop_assert!(bbox.xmax() <= f64::from(width) - 1.0);
        prop_assert!(bbox.ymax() <= f64::from(height) - 1.0);
    }

    #[test]
    fn corner_order_does_not_matter(
        p0 in arb_corner(),
        p1 in arb_corner(),
        width in arb_image_side(),
        height in arb_image_side(),
    ) {
        let forward = BBoxXYXY::from_corners(p0, p1, width, height);
        let backward = BBoxXYXY::from_corners(p1, p0, width, height);
        prop_assert_eq!(forward, backward);
    }

    #[test]
    fn area_is_width_times_height(
        p0 in arb_corner(),
        p1 in arb_corner(),
        width in arb_image_side(),
        height in arb_image_side(),
    ) {
        let bbox = BBoxXYXY::from_corners(p0, p1, width, height);
        let (x, y, w, h) = bbox.to_xywh();

        prop_assert_eq!(x, bbox.xmin());
        prop_assert_eq!(y, bbox.ymin());
        prop_assert_eq!(bbox.area(), w * h);
        prop_assert_eq!(
            bbox.polygon(),
            [x, y, bbox.xmax(), y, bbox.xmax(), bbox.ymax(), x, bbox.ymax()]
        );
    }

    #[test]
    fn corners_inside_the_image_are_kept(
        width in 2u32..2000,
        height in 2u32..2000,
        fx in 0.0f64..1.0,
        fy in 0.0f64..1.0,
        gx in 0.0f64..1.0,
        gy in 0.0f64..1.0,
    ) {
        let max_x = f64::from(width) - 1.0;
        let max_y = f64::from(height) - 1.0;
        let p0 = labelcoco::ir::Coord::new(fx * max_x, fy * max_y);
        let p1 = labelcoco::ir::Coord::new(gx * max_x, gy * max_y);

        let bbox = BBoxXYXY::from_corners(p0, p1, width, height);
        prop_assert_eq!(bbox.xmin(), p0.x.min(p1.x));
        prop_assert_eq!(bbox.xmax(), p0.x.max(p1.x));
        prop_assert_eq!(bbox.ymin(), p0.y.min(p1.y));
        prop_assert_eq!(bbox.ymax(), p0.y.max(p1.y));
        prop_assert!(bbox.width() >= 0.0 && bbox.height() >= 0.0);
    }
}
