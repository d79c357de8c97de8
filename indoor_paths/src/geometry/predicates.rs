use super::line::{intersect, Line};
use super::point::Point;
use super::polygon::{Edge, Polygon};
use crate::Tolerances;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Orientation {
    Ccw,
    Cw,
}

/// Signed shoelace sum; CCW iff the sum is negative, reflecting this domain's y-inverted
/// (lat, lon as x, y) convention rather than the usual screen/Cartesian one.
pub fn orientation(poly: &Polygon) -> Orientation {
    if poly.signed_area_sum() < 0.0 {
        Orientation::Ccw
    } else {
        Orientation::Cw
    }
}

fn edges(poly: &Polygon) -> impl Iterator<Item = Edge> + '_ {
    let n = poly.points.len();
    (0..n).map(move |i| Edge::new(poly.points[i], poly.points[(i + 1) % n]))
}

/// True iff `c` is strictly between `a` and `b` on both axes. Used for segment-containment
/// tests on already-collinear points; coincidence with either endpoint is never "between".
pub fn in_interval(a: Point, b: Point, c: Point, tol: f64) -> bool {
    if c.approx_eq(a, tol) || c.approx_eq(b, tol) || a.approx_eq(b, tol) {
        return false;
    }
    if a.x < b.x {
        if c.x < a.x || c.x > b.x {
            return false;
        }
    } else if a.x > b.x {
        if c.x > a.x || c.x < b.x {
            return false;
        }
    }
    if a.y < b.y {
        if c.y < a.y || c.y > b.y {
            return false;
        }
    } else if a.y > b.y {
        if c.y > a.y || c.y < b.y {
            return false;
        }
    }
    true
}

/// Convenience used by `Polygon::simplify`: is `point` on the segment between `prev` and `next`?
pub fn segment_on_edge(point: Point, prev: Point, next: Point, tol: &Tolerances) -> bool {
    point_on_edge(point, Edge::new(prev, next), tol.general_mapping_uncertainty)
}

/// True if `p` equals either endpoint, or its perpendicular foot on the supporting line lands
/// on `p` (within tolerance) and inside the edge's axis-aligned bounding box.
pub fn point_on_edge(p: Point, edge: Edge, tol: f64) -> bool {
    if p.approx_eq(edge.p1, tol) || p.approx_eq(edge.p2, tol) {
        return true;
    }
    let line = Line::through(edge.p1, edge.p2, tol);
    let orthogonal = line.orthogonal_through(p);
    let foot = match intersect(line, orthogonal, tol) {
        Some(f) => f,
        None => return false,
    };
    p.approx_eq(foot, tol)
        && foot.x >= edge.p1.x.min(edge.p2.x) - tol
        && foot.x <= edge.p1.x.max(edge.p2.x) + tol
        && foot.y >= edge.p1.y.min(edge.p2.y) - tol
        && foot.y <= edge.p1.y.max(edge.p2.y) + tol
}

fn point_on_boundary(p: Point, poly: &Polygon, tol: f64) -> bool {
    edges(poly).any(|e| point_on_edge(p, e, tol))
}

/// Horizontal-ray parity test. A point on any edge is, by convention, outside. Vertex-on-ray
/// ties are broken by the half-open-interval trick: an edge only "counts" when exactly one of
/// its endpoints has y strictly greater than the ray's y, which is equivalent to counting a
/// vertex-on-ray only when its neighbor on the ray-crossing side has the greater y.
pub fn point_in_polygon(p: Point, poly: &Polygon, tol: &Tolerances) -> bool {
    let eps = tol.general_mapping_uncertainty;
    if point_on_boundary(p, poly, eps) {
        return false;
    }
    let mut count = 0;
    for e in edges(poly) {
        let (a, b) = (e.p1, e.p2);
        if (a.y > p.y) != (b.y > p.y) {
            let x_cross = a.x + (p.y - a.y) * (b.x - a.x) / (b.y - a.y);
            if p.x < x_cross {
                count += 1;
            }
        }
    }
    count % 2 == 1
}

/// False if `p` lies on or inside any hole; otherwise `point_in_polygon(p, outer)`.
pub fn point_in_room(p: Point, outer: &Polygon, holes: &[Polygon], tol: &Tolerances) -> bool {
    for hole in holes {
        if point_on_boundary(p, hole, tol.general_mapping_uncertainty) || point_in_polygon(p, hole, tol) {
            return false;
        }
    }
    point_in_polygon(p, outer, tol)
}

/// Does the open polyline `a`→`b` properly cross any edge of `poly`? Endpoint coincidences are
/// not crossings.
fn polyline_crosses_polygon(points: &[Point], poly: &Polygon, tol: &Tolerances) -> bool {
    let eps = tol.general_mapping_uncertainty;
    for seg in points.windows(2) {
        let (s1, s2) = (seg[0], seg[1]);
        let seg_line = Line::through(s1, s2, eps);
        for e in edges(poly) {
            if e.p1.approx_eq(e.p2, eps) {
                continue;
            }
            let edge_line = Line::through(e.p1, e.p2, eps);
            if let Some(ip) = intersect(seg_line, edge_line, eps) {
                if in_interval(s1, s2, ip, eps) && in_interval(e.p1, e.p2, ip, eps) {
                    return true;
                }
            }
        }
    }
    false
}

/// For every segment of the poly-line, its midpoint must be `point_in_room`, and the poly-line
/// must not properly cross any edge of `outer` or of any hole.
pub fn segment_inside_room(points: &[Point], outer: &Polygon, holes: &[Polygon], tol: &Tolerances) -> bool {
    if points.len() < 2 {
        return false;
    }
    for seg in points.windows(2) {
        let mid = Point::centroid(&[seg[0], seg[1]]);
        if !point_in_room(mid, outer, holes, tol) {
            return false;
        }
    }
    for hole in holes {
        if polyline_crosses_polygon(points, hole, tol) {
            return false;
        }
    }
    !polyline_crosses_polygon(points, outer, tol)
}

/// If `use_centroids` is false, every vertex of `inner` must be inside `outer`. If true, the
/// centroid of every three consecutive vertices of `inner` is tested instead, and the check
/// passes as long as at least `1 - ratio_barrier_in_barrier` of them land inside.
pub fn polygon_inside_polygon(inner: &Polygon, outer: &Polygon, tol: &Tolerances, use_centroids: bool) -> bool {
    if !use_centroids {
        return inner.points.iter().all(|&p| point_in_polygon(p, outer, tol));
    }
    let n = inner.points.len();
    if n == 0 {
        return true;
    }
    let mut inside = 0;
    for i in 0..n {
        let triple = [inner.points[i], inner.points[(i + 1) % n], inner.points[(i + 2) % n]];
        let c = Point::centroid(&triple);
        if point_in_polygon(c, outer, tol) {
            inside += 1;
        }
    }
    (inside as f64) / (n as f64) >= 1.0 - tol.ratio_barrier_in_barrier
}
