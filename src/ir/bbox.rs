//! Axis-aligned bounding boxes in canonical XYXY form.

use super::coord::Coord;

/// An axis-aligned bounding box in XYXY format (xmin, ymin, xmax, ymax),
/// in pixel coordinates.
///
/// Note: this type does NOT enforce that min < max. A box clamped against a
/// small image can end up with zero or negative extent and is still carried
/// through to the manifest; validation reports such boxes as degenerate.
#[derive(Clone, Copy, PartialEq, Default)]
pub struct BBoxXYXY {
    pub min: Coord,
    pub max: Coord,
}

impl BBoxXYXY {
    /// Creates a new bounding box from min and max coordinates.
    #[inline]
    pub fn new(min: Coord, max: Coord) -> Self {
        Self { min, max }
    }

    /// Creates a new bounding box from explicit coordinates.
    #[inline]
    pub fn from_xyxy(xmin: f64, ymin: f64, xmax: f64, ymax: f64) -> Self {
        Self {
            min: Coord::new(xmin, ymin),
            max: Coord::new(xmax, ymax),
        }
    }

    /// Converts from XYWH format (x, y, width, height) where (x, y) is the
    /// top-left corner. This is the format used by COCO annotations.
    #[inline]
    pub fn from_xywh(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::from_xyxy(x, y, x + width, y + height)
    }

    /// Builds the box spanned by two opposite corners and clamps it to the
    /// pixel grid of an `image_width` x `image_height` image.
    ///
    /// The corners may come in any order. After ordering, the minimum corner
    /// is clamped to `>= 0` and the maximum corner to `<= dimension - 1`.
    /// Nothing is rejected: a box lying entirely outside the image comes out
    /// with a zero or negative width/height.
    ///
    /// ```
    /// use labelcoco::ir::{BBoxXYXY, Coord};
    ///
    /// let bbox = BBoxXYXY::from_corners(Coord::new(50.0, 50.0), Coord::new(10.0, 10.0), 100, 100);
    /// assert_eq!(bbox.to_xywh(), (10.0, 10.0, 40.0, 40.0));
    /// assert_eq!(bbox.area(), 1600.0);
    /// ```
    pub fn from_corners(p0: Coord, p1: Coord, image_width: u32, image_height: u32) -> Self {
        let (xmin, xmax) = ordered(p0.x, p1.x);
        let (ymin, ymax) = ordered(p0.y, p1.y);

        let max_x = f64::from(image_width) - 1.0;
        let max_y = f64::from(image_height) - 1.0;

        Self::from_xyxy(xmin.max(0.0), ymin.max(0.0), xmax.min(max_x), ymax.min(max_y))
    }

    /// Returns the minimum x coordinate.
    #[inline]
    pub fn xmin(&self) -> f64 {
        self.min.x
    }

    /// Returns the minimum y coordinate.
    #[inline]
    pub fn ymin(&self) -> f64 {
        self.min.y
    }

    /// Returns the maximum x coordinate.
    #[inline]
    pub fn xmax(&self) -> f64 {
        self.max.x
    }

    /// Returns the maximum y coordinate.
    #[inline]
    pub fn ymax(&self) -> f64 {
        self.max.y
    }

    /// Returns the width of the bounding box. May be zero or negative.
    #[inline]
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    /// Returns the height of the bounding box. May be zero or negative.
    #[inline]
    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    /// Returns `width * height`. Two negative extents give a positive area.
    #[inline]
    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// Returns true if all coordinates are finite (not NaN or infinite).
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.min.is_finite() && self.max.is_finite()
    }

    /// Returns true if the box has no positive extent on some axis.
    #[inline]
    pub fn is_degenerate(&self) -> bool {
        self.width() <= 0.0 || self.height() <= 0.0
    }

    /// Converts to XYWH format (x, y, width, height).
    #[inline]
    pub fn to_xywh(&self) -> (f64, f64, f64, f64) {
        (self.xmin(), self.ymin(), self.width(), self.height())
    }

    /// The box outline as a flat polygon ring:
    /// `(x0,y0), (x1,y0), (x1,y1), (x0,y1)`.
    pub fn polygon(&self) -> [f64; 8] {
        let (x0, y0, x1, y1) = (self.xmin(), self.ymin(), self.xmax(), self.ymax());
        [x0, y0, x1, y0, x1, y1, x0, y1]
    }
}

fn ordered(a: f64, b: f64) -> (f64, f64) {
    if b < a {
        (b, a)
    } else {
        (a, b)
    }
}

impl std::fmt::Debug for BBoxXYXY {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BBoxXYXY")
            .field("xmin", &self.min.x)
            .field("ymin", &self.min.y)
            .field("xmax", &self.max.x)
            .field("ymax", &self.max.y)
            .finish()
    }
}
