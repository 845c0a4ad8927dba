//! Basic geometric types used by the layout engines.

use serde::{Deserialize, Serialize};

/// A point in diagram space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    x: f32,
    y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn x(self) -> f32 {
        self.x
    }

    pub fn y(self) -> f32 {
        self.y
    }

    /// Returns a new point with both coordinates offset by `other`.
    pub fn add_point(self, other: Point) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }

    /// Returns a new point with `other` subtracted from both coordinates.
    pub fn sub_point(self, other: Point) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }
}

/// A width and height pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    width: f32,
    height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn width(self) -> f32 {
        self.width
    }

    pub fn height(self) -> f32 {
        self.height
    }

    /// Returns the size with width and height exchanged.
    pub fn transpose(self) -> Self {
        Self::new(self.height, self.width)
    }

    /// Returns the component-wise maximum of two sizes.
    pub fn max(self, other: Size) -> Self {
        Self::new(self.width.max(other.width), self.height.max(other.height))
    }

    pub fn is_zero(self) -> bool {
        self.width == 0.0 && self.height == 0.0
    }
}

#[cfg(test)]
mod tests {
    use float_cmp::approx_eq;

    use super::*;

    #[test]
    fn test_point_arithmetic() {
        let p = Point::new(10.0, 20.0).add_point(Point::new(1.5, -2.0));
        assert!(approx_eq!(f32, p.x(), 11.5));
        assert!(approx_eq!(f32, p.y(), 18.0));

        let q = p.sub_point(Point::new(11.5, 18.0));
        assert_eq!(q, Point::default());
    }

    #[test]
    fn test_size_transpose_and_max() {
        let s = Size::new(180.0, 60.0);
        assert_eq!(s.transpose(), Size::new(60.0, 180.0));
        assert_eq!(s.max(Size::new(100.0, 90.0)), Size::new(180.0, 90.0));
        assert!(Size::default().is_zero());
        assert!(!s.is_zero());
    }
}
