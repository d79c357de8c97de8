//! A from-scratch straight-skeleton engine. Re-entrant and stateless across calls (a fresh
//! arena is built per invocation, never shared between rooms).
//!
//! Polygons with holes are turned into a single simple boundary by "welding" each hole onto the
//! outer contour (or onto a previously welded hole) through a zero-width bridge between the
//! nearest pair of vertices, the same slit trick used to feed polygon-with-holes input to
//! algorithms that only understand simple polygons. That lets a single wavefront-shrinking pass
//! (edge events only, no split events) produce arcs that route around barriers instead of
//! requiring the full split-event bookkeeping a general straight skeleton needs. The resulting
//! arcs are raw candidates; nothing downstream trusts their exactness (`way_is_valid` validates
//! every one against the real room geometry).

use crate::geometry::{intersect, Line, Point, Polygon};
use crate::Tolerances;

/// One source vertex with the set of sink vertices its wavefront bisector converged with.
#[derive(Clone, Debug)]
pub struct Arc {
    pub source: Point,
    pub sinks: Vec<Point>,
}

#[derive(Clone, Copy, Debug)]
struct Vertex {
    point: Point,
    edge_in: Point,
    edge_out: Point,
    bisector: Point,
    prev: usize,
    next: usize,
    active: bool,
}

fn unit(v: Point) -> Point {
    let len = (v.x * v.x + v.y * v.y).sqrt();
    if len < 1e-12 {
        Point::new(0.0, 0.0)
    } else {
        Point::new(v.x / len, v.y / len)
    }
}

/// The inward-to-room normal of an edge direction. Uniform for both the (formula-)CCW outer
/// contour and (formula-)CW holes, a consequence of this crate's y-inverted orientation
/// convention (see `geometry::orientation`) — no separate convex/reflex or outer/hole case is
/// needed anywhere in this module.
fn inward_normal(d: Point) -> Point {
    Point::new(d.y, -d.x)
}

fn bisector_of(edge_in: Point, edge_out: Point) -> Point {
    let b = Point::new(
        inward_normal(edge_in).x + inward_normal(edge_out).x,
        inward_normal(edge_in).y + inward_normal(edge_out).y,
    );
    if b.x.abs() < 1e-12 && b.y.abs() < 1e-12 {
        // Degenerate 180° fold: fall back to one edge's own normal rather than leaving the
        // vertex with no direction to move in at all.
        inward_normal(edge_in)
    } else {
        b
    }
}

/// Welds `holes` onto `outer` with zero-width bridges, nearest-vertex-to-nearest-vertex, so the
/// whole polygon-with-holes becomes one simple (self-touching) boundary.
fn weld(outer: &[Point], holes: &[Polygon]) -> Vec<Point> {
    let mut combined = outer.to_vec();
    for hole in holes {
        if hole.points.len() < 3 {
            continue;
        }
        let (mut best_o, mut best_h, mut best_d) = (0usize, 0usize, f64::INFINITY);
        for (oi, &op) in combined.iter().enumerate() {
            for (hi, &hp) in hole.points.iter().enumerate() {
                let d = op.dist(hp);
                if d < best_d {
                    best_d = d;
                    best_o = oi;
                    best_h = hi;
                }
            }
        }
        let o_point = combined[best_o];
        let n_h = hole.points.len();
        let mut bridge = Vec::with_capacity(n_h + 3);
        bridge.push(o_point);
        bridge.push(hole.points[best_h]);
        for step in 1..n_h {
            bridge.push(hole.points[(best_h + step) % n_h]);
        }
        bridge.push(hole.points[best_h]);
        bridge.push(o_point);

        let mut spliced = Vec::with_capacity(combined.len() + bridge.len());
        spliced.extend_from_slice(&combined[..=best_o]);
        spliced.extend_from_slice(&bridge[1..bridge.len() - 1]);
        spliced.extend_from_slice(&combined[best_o..]);
        combined = spliced;
    }
    combined
}

enum Winner {
    Edge { t: f64, point: Point, a: usize, b: usize },
}

/// Computes the straight skeleton of `outer` (with `holes` welded in) and returns its arcs. The
/// door-snapped polygon is expected to already have doors inserted as vertices (§4.2 runs
/// before this).
pub fn skeletonize(outer: &Polygon, holes: &[Polygon], tol: &Tolerances) -> Vec<Arc> {
    let eps = tol.general_mapping_uncertainty;
    let boundary = weld(&outer.points, holes);
    let n = boundary.len();
    if n < 3 {
        return Vec::new();
    }

    let mut arena: Vec<Vertex> = Vec::with_capacity(n);
    for i in 0..n {
        let prev_pt = boundary[(i + n - 1) % n];
        let cur_pt = boundary[i];
        let next_pt = boundary[(i + 1) % n];
        let edge_in = unit(Point::new(cur_pt.x - prev_pt.x, cur_pt.y - prev_pt.y));
        let edge_out = unit(Point::new(next_pt.x - cur_pt.x, next_pt.y - cur_pt.y));
        arena.push(Vertex {
            point: cur_pt,
            edge_in,
            edge_out,
            bisector: bisector_of(edge_in, edge_out),
            prev: (i + n - 1) % n,
            next: (i + 1) % n,
            active: true,
        });
    }

    let mut arcs = Vec::new();
    let mut active_count = n;
    let max_iterations = 20 * n + 16;

    for _ in 0..max_iterations {
        if active_count < 3 {
            break;
        }
        let mut winner: Option<Winner> = None;
        for a in 0..arena.len() {
            if !arena[a].active {
                continue;
            }
            let b = arena[a].next;
            if !arena[b].active || arena[b].prev != a {
                continue;
            }
            if let Some((t, point)) = edge_event(&arena, a, b, eps) {
                let better = match &winner {
                    None => true,
                    Some(Winner::Edge { t: best, .. }) => t < *best,
                };
                if better {
                    winner = Some(Winner::Edge { t, point, a, b });
                }
            }
        }

        match winner {
            None => break,
            Some(Winner::Edge { point, a, b, .. }) => {
                arcs.push(Arc { source: point, sinks: vec![arena[a].point, arena[b].point] });
                let pa = arena[a].prev;
                let pb = arena[b].next;
                arena[a].active = false;
                arena[b].active = false;
                active_count -= 2;

                if pa == b || pb == a || pa == pb {
                    // The LAV has shrunk down to this single collapse point entirely.
                    if arena[pa].active {
                        arena[pa].active = false;
                        active_count -= 1;
                    }
                    continue;
                }

                let edge_in = arena[pa].edge_out;
                let edge_out = arena[b].edge_out;
                let new_vertex = Vertex {
                    point,
                    edge_in,
                    edge_out,
                    bisector: bisector_of(edge_in, edge_out),
                    prev: pa,
                    next: pb,
                    active: true,
                };
                let new_idx = arena.len();
                arena.push(new_vertex);
                arena[pa].next = new_idx;
                arena[pb].prev = new_idx;
                active_count += 1;
            }
        }
    }

    arcs
}

/// If vertices `a` and `b` (an active edge of the wavefront) have bisectors that converge,
/// returns the offset distance (from the original edge's supporting line) and the point where
/// they meet.
fn edge_event(arena: &[Vertex], a: usize, b: usize, eps: f64) -> Option<(f64, Point)> {
    let va = arena[a];
    let vb = arena[b];
    let line_a = Line::through(va.point, Point::new(va.point.x + va.bisector.x, va.point.y + va.bisector.y), eps);
    let line_b = Line::through(vb.point, Point::new(vb.point.x + vb.bisector.x, vb.point.y + vb.bisector.y), eps);
    let candidate = intersect(line_a, line_b, eps)?;
    if !candidate.x.is_finite() || !candidate.y.is_finite() {
        return None;
    }
    // Offset distance: perpendicular distance from the candidate point to the (still straight,
    // still parallel-to-original) edge line between a and b.
    let edge_line = Line::through(va.point, vb.point, eps);
    let t = perpendicular_distance(candidate, edge_line);
    if t.is_finite() && t >= -eps {
        Some((t.max(0.0), candidate))
    } else {
        None
    }
}

fn perpendicular_distance(p: Point, line: Line) -> f64 {
    match line {
        Line::Vertical { x } => (p.x - x).abs(),
        Line::Sloped { m, n } => (m * p.x - p.y + n).abs() / (m * m + 1.0).sqrt(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn square_skeleton_meets_at_centre() {
        let outer = Polygon::new(
            vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(10.0, 10.0), Point::new(0.0, 10.0)],
            None,
        );
        let tol = Tolerances::default();
        let arcs = skeletonize(&outer, &[], &tol);
        assert!(!arcs.is_empty());
        // Every arc source should land well within the square's bounding box.
        for arc in &arcs {
            assert!(arc.source.x > -1.0 && arc.source.x < 11.0);
            assert!(arc.source.y > -1.0 && arc.source.y < 11.0);
        }
    }

    #[test]
    fn weld_produces_single_boundary_with_hole() {
        let outer = vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(10.0, 10.0), Point::new(0.0, 10.0)];
        let hole =
            Polygon::new(vec![Point::new(4.0, 4.0), Point::new(6.0, 4.0), Point::new(6.0, 6.0), Point::new(4.0, 6.0)], None);
        let welded = weld(&outer, std::slice::from_ref(&hole));
        // 4 outer + 2 bridge + 4 hole + 1 closing hole repeat = 11 points
        assert_eq!(welded.len(), outer.len() + 2 + hole.points.len() + 1);
    }
}
