use std::fmt;

use crate::Tolerances;

/// A Cartesian 2-D point. Coordinates are plain doubles; no lat/lon projection ever happens
/// here (that's the reader's job, if it wants one at all).
///
/// Deliberately does not derive `PartialEq`: two points are never "equal", only equal within
/// some tolerance. Every comparison must go through `approx_eq` (or `almost_same`) so a future
/// `==` typo can't silently reintroduce exact-equality bugs.
#[derive(Clone, Copy, Debug)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn approx_eq(self, other: Point, tol: f64) -> bool {
        almost_same(self.x, other.x, tol) && almost_same(self.y, other.y, tol)
    }

    pub fn dist(self, other: Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    pub fn centroid(points: &[Point]) -> Point {
        let n = points.len() as f64;
        let (mut x, mut y) = (0.0, 0.0);
        for p in points {
            x += p.x;
            y += p.y;
        }
        Point::new(x / n, y / n)
    }

    /// Rounds both coordinates to `digits` decimal places, used by the merger when it picks a
    /// centroid as a cluster's representative rather than a tagged original point.
    pub fn round(self, digits: i32) -> Point {
        let factor = 10f64.powi(digits);
        Point::new((self.x * factor).round() / factor, (self.y * factor).round() / factor)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Checks whether two values are within `tol` of each other. The one tolerance primitive every
/// other predicate in this crate is built from.
pub fn almost_same(a: f64, b: f64, tol: f64) -> bool {
    (a - b).abs() <= tol
}

pub fn points_approx_eq(a: Point, b: Point, tol: &Tolerances) -> bool {
    a.approx_eq(b, tol.general_mapping_uncertainty)
}
