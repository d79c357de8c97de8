use super::point::{almost_same, Point};

/// The supporting line of an `Edge`, as a tagged sum rather than the source's `(None, x)`
/// convention for verticals — every consumer pattern-matches instead of special-casing `None`.
#[derive(Clone, Copy, Debug)]
pub enum Line {
    Vertical { x: f64 },
    Sloped { m: f64, n: f64 },
}

impl Line {
    pub fn through(p: Point, q: Point, tol: f64) -> Line {
        if almost_same(p.x, q.x, tol) {
            Line::Vertical { x: p.x }
        } else {
            let m = (p.y - q.y) / (p.x - q.x);
            let n = p.y - m * p.x;
            Line::Sloped { m, n }
        }
    }

    /// The line through `p` orthogonal to `self`.
    pub fn orthogonal_through(self, p: Point) -> Line {
        match self {
            Line::Vertical { .. } => Line::Sloped { m: 0.0, n: p.y },
            Line::Sloped { m, .. } if m == 0.0 => Line::Vertical { x: p.x },
            Line::Sloped { m, .. } => {
                let m2 = -1.0 / m;
                Line::Sloped { m: m2, n: p.y - m2 * p.x }
            }
        }
    }
}

/// Finds the intersection of two lines, if there's exactly one.
pub fn intersect(l1: Line, l2: Line, tol: f64) -> Option<Point> {
    match (l1, l2) {
        // Two verticals never have a unique intersection: coincident (infinitely many) or
        // parallel (none).
        (Line::Vertical { .. }, Line::Vertical { .. }) => None,
        (Line::Vertical { x }, Line::Sloped { m, n }) | (Line::Sloped { m, n }, Line::Vertical { x }) => {
            Some(Point::new(x, m * x + n))
        }
        (Line::Sloped { m: m1, n: n1 }, Line::Sloped { m: m2, n: n2 }) => {
            if almost_same(m1, m2, tol) {
                None
            } else {
                let x = (n2 - n1) / (m1 - m2);
                let y = m1 * x + n1;
                Some(Point::new(x, y))
            }
        }
    }
}
