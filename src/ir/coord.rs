//! Pixel coordinates as read from label files.

/// A 2D point in absolute pixel coordinates, (0, 0) being the top-left corner.
#[derive(Clone, Copy, PartialEq, Default)]
pub struct Coord {
    pub x: f64,
    pub y: f64,
}

impl Coord {
    /// Creates a new coordinate with the given x and y values.
    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Returns true if both coordinates are finite (not NaN or infinite).
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl std::fmt::Debug for Coord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

impl From<[f64; 2]> for Coord {
    fn from([x, y]: [f64; 2]) -> Self {
        Self::new(x, y)
    }
}
