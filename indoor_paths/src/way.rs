use std::fmt;

use crate::geometry::Point;

/// The level tag of a `Way`: either a single floor, or the `"a;b"` two-floor label of a
/// cross-level connector segment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Level {
    Single(String),
    CrossLevel(String, String),
}

impl Level {
    pub fn single(level: impl Into<String>) -> Self {
        Level::Single(level.into())
    }

    pub fn cross(a: impl Into<String>, b: impl Into<String>) -> Self {
        Level::CrossLevel(a.into(), b.into())
    }

    /// The OSM `level` tag value: `"0"` or `"0;1"`.
    pub fn as_tag_value(&self) -> String {
        match self {
            Level::Single(l) => l.clone(),
            Level::CrossLevel(a, b) => format!("{a};{b}"),
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.as_tag_value())
    }
}

/// The OSM `highway` tag of a generated way.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WayKind {
    Footway,
    Stairs,
    Elevator,
}

impl WayKind {
    pub fn as_tag_value(&self) -> &'static str {
        match self {
            WayKind::Footway => "footway",
            WayKind::Stairs => "stairs",
            WayKind::Elevator => "elevator",
        }
    }
}

/// An ordered polyline of ≥2 points constituting a walkable path at a level.
#[derive(Clone, Debug)]
pub struct Way {
    pub points: Vec<Point>,
    pub level: Level,
    pub kind: WayKind,
}

impl Way {
    pub fn new(points: Vec<Point>, level: Level, kind: WayKind) -> Self {
        Self { points, level, kind }
    }

    pub fn first(&self) -> Point {
        self.points[0]
    }

    pub fn last(&self) -> Point {
        *self.points.last().unwrap()
    }

    pub fn length(&self, tol: f64) -> f64 {
        self.points.windows(2).map(|w| w[0].dist(w[1])).sum::<f64>().max(tol)
    }

    /// Same ordered points (within tolerance) and the same level — used by the dedup phase.
    pub fn approx_eq(&self, other: &Way, tol: f64) -> bool {
        self.level == other.level
            && self.points.len() == other.points.len()
            && self.points.iter().zip(&other.points).all(|(a, b)| a.approx_eq(*b, tol))
    }
}
