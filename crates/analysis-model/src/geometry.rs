//! Pixel-space geometry used by detectors and the accumulator.

use serde::{Deserialize, Serialize};

/// A point in frame pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance_to(&self, other: &Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Arithmetic mean of a set of points. `None` when empty.
    pub fn centroid<'a>(points: impl IntoIterator<Item = &'a Point>) -> Option<Point> {
        let (sx, sy, n) = points
            .into_iter()
            .fold((0.0, 0.0, 0usize), |(sx, sy, n), p| (sx + p.x, sy + p.y, n + 1));
        if n == 0 {
            return None;
        }
        Some(Point::new(sx / n as f64, sy / n as f64))
    }
}

/// Width and height of a decoded frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameDims {
    pub width: u32,
    pub height: u32,
}

impl FrameDims {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> Point {
        Point::new(self.width as f64 / 2.0, self.height as f64 / 2.0)
    }

    pub fn area(&self) -> f64 {
        self.width as f64 * self.height as f64
    }

    /// Length of the shorter side.
    pub fn min_side(&self) -> f64 {
        self.width.min(self.height) as f64
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// Axis-aligned rectangle in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width: width.max(0.0),
            height: height.max(0.0),
        }
    }

    /// Smallest box enclosing every point. `None` when empty.
    pub fn enclosing<'a>(points: impl IntoIterator<Item = &'a Point>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for p in iter {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }
        Some(Self::new(min_x, min_y, max_x - min_x, max_y - min_y))
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_distance_is_euclidean() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(3.0, 4.0);
        assert!((a.distance_to(&b) - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_centroid_of_empty_set_is_none() {
        assert!(Point::centroid(&Vec::<Point>::new()).is_none());
        let c = Point::centroid(&[Point::new(0.0, 0.0), Point::new(2.0, 4.0)]).unwrap();
        assert_eq!(c, Point::new(1.0, 2.0));
    }

    #[test]
    fn test_enclosing_box_covers_all_points() {
        let points = [
            Point::new(10.0, 20.0),
            Point::new(30.0, 5.0),
            Point::new(15.0, 40.0),
        ];
        let bbox = BoundingBox::enclosing(&points).unwrap();
        assert_eq!(bbox, BoundingBox::new(10.0, 5.0, 20.0, 35.0));
        assert!((bbox.area() - 700.0).abs() < 1e-12);
    }

    #[test]
    fn test_frame_dims_helpers() {
        let dims = FrameDims::new(640, 480);
        assert_eq!(dims.center(), Point::new(320.0, 240.0));
        assert_eq!(dims.min_side(), 480.0);
        assert!(!dims.is_empty());
        assert!(FrameDims::new(0, 480).is_empty());
    }

    fn points() -> impl Strategy<Value = Vec<Point>> {
        prop::collection::vec(
            (-1000.0f64..1000.0, -1000.0f64..1000.0).prop_map(|(x, y)| Point::new(x, y)),
            1..40,
        )
    }

    proptest! {
        #[test]
        fn test_enclosing_box_contains_points_and_centroid(points in points()) {
            let bbox = BoundingBox::enclosing(&points).unwrap();
            let inside = |p: &Point| {
                p.x >= bbox.x - 1e-9
                    && p.x <= bbox.x + bbox.width + 1e-9
                    && p.y >= bbox.y - 1e-9
                    && p.y <= bbox.y + bbox.height + 1e-9
            };
            prop_assert!(points.iter().all(|p| inside(p)));
            prop_assert!(inside(&Point::centroid(&points).unwrap()));
        }

        #[test]
        fn test_distance_is_symmetric(
            ax in -1e4f64..1e4, ay in -1e4f64..1e4,
            bx in -1e4f64..1e4, by in -1e4f64..1e4,
        ) {
            let a = Point::new(ax, ay);
            let b = Point::new(bx, by);
            prop_assert!(a.distance_to(&b) >= 0.0);
            prop_assert_eq!(a.distance_to(&b), b.distance_to(&a));
        }
    }
}
