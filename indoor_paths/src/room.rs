use itertools::Itertools;

use crate::door::add_doors_to_polygon;
use crate::geometry::{in_interval, intersect, orientation, point_in_room, segment_inside_room, Line, Orientation, Point, Polygon};
use crate::skeleton::Arc;
use crate::way::{Level, Way, WayKind};
use crate::Tolerances;

/// Caps the split-intersections fixed-point loop (phase G) against pathological inputs that
/// would otherwise oscillate under floating-point jitter.
const MAX_SPLIT_ROUNDS: usize = 10_000;

/// One level of one building: an outer boundary, its inner barriers, the doors that open onto
/// it, and (once `find_ways` has run) the walkable graph synthesized inside it.
#[derive(Clone, Debug)]
pub struct Room {
    pub outer: Polygon,
    pub holes: Vec<Polygon>,
    pub level: String,
    pub doors: Vec<Point>,
    pub ways: Vec<Way>,
    pub decision_nodes: Vec<Point>,
}

impl Room {
    /// Normalizes `outer`/`holes` (collinear-point removal, then forced outer-CCW/hole-CW
    /// orientation) and snaps every door in `doors` onto whichever polygon it lies near, all
    /// before any door-snapping or skeleton work runs — a constructor-time invariant, not a
    /// builder phase.
    pub fn new(mut outer: Polygon, mut holes: Vec<Polygon>, level: impl Into<String>, doors: Vec<Point>, tol: &Tolerances) -> Self {
        outer.simplify(tol);
        if orientation(&outer) != Orientation::Ccw {
            outer.reverse();
        }
        for hole in &mut holes {
            hole.simplify(tol);
            if orientation(hole) != Orientation::Cw {
                hole.reverse();
            }
        }

        let mut associated = add_doors_to_polygon(&mut outer, &doors, tol);
        for hole in &mut holes {
            associated.extend(add_doors_to_polygon(hole, &doors, tol));
        }

        Room { outer, holes, level: level.into(), doors: associated, ways: Vec::new(), decision_nodes: Vec::new() }
    }

    fn is_door(&self, p: Point, eps: f64) -> bool {
        self.doors.iter().any(|d| d.approx_eq(p, eps))
    }

    fn way_is_valid(&self, p1: Point, p2: Point, tol: &Tolerances) -> bool {
        if !segment_inside_room(&[p1, p2], &self.outer, &self.holes, tol) {
            return false;
        }
        let eps = tol.general_mapping_uncertainty;
        let ok = |p: Point| self.is_door(p, eps) || point_in_room(p, &self.outer, &self.holes, tol);
        ok(p1) && ok(p2)
    }

    /// Runs phases A through H in their fixed order, populating `self.ways` and
    /// `self.decision_nodes`. `skeleton` is the raw candidate-arc output of
    /// `skeleton::skeletonize` for this room's (door-snapped) outer/holes.
    pub fn find_ways(&mut self, skeleton: &[Arc], simplify_ways: bool, door_to_door: bool, tol: &Tolerances) {
        let mut ways = self.seed_ways(skeleton, tol);

        loop {
            self.decision_nodes = self.compute_decision_nodes(&ways, tol);
            ways = self.chain_ways(ways, tol);
            let (pruned, removed_any) = self.prune_dead_ends(ways, tol);
            ways = pruned;
            if !removed_any {
                break;
            }
        }
        self.decision_nodes = self.compute_decision_nodes(&ways, tol);

        self.simplify_chains(&mut ways, simplify_ways, tol);
        self.add_supplementary_ways(&mut ways, tol);
        if door_to_door {
            self.add_door_to_door_ways(&mut ways, tol);
        }
        self.split_intersections(&mut ways, tol);
        self.dedup_ways(&mut ways, tol);

        self.ways = ways;
    }

    /// Phase A — for each arc, for each sink, keep `[source, sink]` iff `way_is_valid`.
    fn seed_ways(&self, skeleton: &[Arc], tol: &Tolerances) -> Vec<Way> {
        let mut ways = Vec::new();
        for arc in skeleton {
            for &sink in &arc.sinks {
                if self.way_is_valid(arc.source, sink, tol) {
                    ways.push(Way::new(vec![arc.source, sink], Level::single(self.level.clone()), WayKind::Footway));
                }
            }
        }
        ways
    }

    /// decision-nodes = doors ∪ { v : v is an endpoint of ≥3 current polylines }.
    fn compute_decision_nodes(&self, ways: &[Way], tol: &Tolerances) -> Vec<Point> {
        let eps = tol.general_mapping_uncertainty;
        let mut nodes = self.doors.clone();
        let mut counted: Vec<(Point, u32)> = Vec::new();
        for w in ways {
            for endpoint in [w.first(), w.last()] {
                if let Some(entry) = counted.iter_mut().find(|(q, _)| q.approx_eq(endpoint, eps)) {
                    entry.1 += 1;
                } else {
                    counted.push((endpoint, 1));
                }
            }
        }
        for (p, count) in counted {
            if count >= 3 && !nodes.iter().any(|q| q.approx_eq(p, eps)) {
                nodes.push(p);
            }
        }
        nodes
    }

    /// Phase B — repeatedly extends each polyline at both ends by any other polyline sharing an
    /// endpoint, as long as the joining point is not a decision node, producing maximal chains.
    fn chain_ways(&self, mut ways: Vec<Way>, tol: &Tolerances) -> Vec<Way> {
        let eps = tol.general_mapping_uncertainty;
        let is_decision = |p: Point| self.decision_nodes.iter().any(|d| d.approx_eq(p, eps));

        let mut changed = true;
        while changed {
            changed = false;
            'scan: for i in 0..ways.len() {
                if ways[i].points.len() < 2 {
                    continue;
                }
                for j in 0..ways.len() {
                    if i == j || ways[j].points.len() < 2 {
                        continue;
                    }
                    let wi = ways[i].clone();
                    let wj = ways[j].clone();

                    let merged = if wi.last().approx_eq(wj.first(), eps) && !is_decision(wi.last()) {
                        let mut m = wi.points.clone();
                        m.extend(wj.points.iter().skip(1).copied());
                        Some(m)
                    } else if wi.last().approx_eq(wj.last(), eps) && !is_decision(wi.last()) {
                        let mut m = wi.points.clone();
                        m.extend(wj.points.iter().rev().skip(1).copied());
                        Some(m)
                    } else if wi.first().approx_eq(wj.last(), eps) && !is_decision(wi.first()) {
                        let mut m = wj.points.clone();
                        m.extend(wi.points.iter().skip(1).copied());
                        Some(m)
                    } else if wi.first().approx_eq(wj.first(), eps) && !is_decision(wi.first()) {
                        let mut m: Vec<Point> = wj.points.iter().rev().copied().collect();
                        m.extend(wi.points.iter().skip(1).copied());
                        Some(m)
                    } else {
                        None
                    };

                    if let Some(points) = merged {
                        ways[i] = Way::new(points, wi.level.clone(), wi.kind);
                        ways[j] = Way::new(Vec::new(), wj.level.clone(), wj.kind);
                        changed = true;
                        continue 'scan;
                    }
                }
            }
        }
        ways.retain(|w| w.points.len() >= 2);
        ways
    }

    /// Phase C — drops every polyline whose both endpoints are neither a door nor a decision
    /// node. Returns whether anything was removed, so the caller can re-trigger phase B.
    fn prune_dead_ends(&self, ways: Vec<Way>, tol: &Tolerances) -> (Vec<Way>, bool) {
        let eps = tol.general_mapping_uncertainty;
        let relevant = |p: Point| self.is_door(p, eps) || self.decision_nodes.iter().any(|d| d.approx_eq(p, eps));
        let before = ways.len();
        let kept: Vec<Way> = ways.into_iter().filter(|w| relevant(w.first()) || relevant(w.last())).collect();
        let removed = kept.len() != before;
        (kept, removed)
    }

    /// Phase D — collapses near-duplicate adjacent vertices within each polyline, then (if
    /// `aggressive`) removes any interior vertex whose bypass segment stays inside the room.
    fn simplify_chains(&self, ways: &mut [Way], aggressive: bool, tol: &Tolerances) {
        for way in ways.iter_mut() {
            collapse_near_duplicates(&mut way.points, tol.point_to_point);
            if aggressive {
                let mut i = 0;
                while i + 2 < way.points.len() {
                    let seg = [way.points[i], way.points[i + 2]];
                    if segment_inside_room(&seg, &self.outer, &self.holes, tol) {
                        way.points.remove(i + 1);
                    } else {
                        i += 1;
                    }
                }
            }
        }
    }

    /// Phase E — connects every still-unconnected pair of relevant nodes (doors plus current
    /// polyline endpoints) whose straight segment stays inside the room and doesn't cross any
    /// existing way.
    fn add_supplementary_ways(&self, ways: &mut Vec<Way>, tol: &Tolerances) {
        let eps = tol.general_mapping_uncertainty;
        let mut relevant: Vec<Point> = self.doors.clone();
        for w in ways.iter() {
            for endpoint in [w.first(), w.last()] {
                if !relevant.iter().any(|p| p.approx_eq(endpoint, eps)) {
                    relevant.push(endpoint);
                }
            }
        }

        let has_endpoint_pair = |a: Point, b: Point, ways: &[Way]| {
            ways.iter().any(|w| {
                (w.first().approx_eq(a, eps) && w.last().approx_eq(b, eps))
                    || (w.first().approx_eq(b, eps) && w.last().approx_eq(a, eps))
            })
        };

        for (a, b) in relevant.iter().copied().tuple_combinations() {
            if has_endpoint_pair(a, b, ways) {
                continue;
            }
            if !segment_inside_room(&[a, b], &self.outer, &self.holes, tol) {
                continue;
            }
            if crosses_any_way(a, b, ways, tol) {
                continue;
            }
            ways.push(Way::new(vec![a, b], Level::single(self.level.clone()), WayKind::Footway));
        }
    }

    /// Phase F (optional) — direct shortcuts between every pair of doors.
    fn add_door_to_door_ways(&self, ways: &mut Vec<Way>, tol: &Tolerances) {
        for (a, b) in self.doors.iter().copied().tuple_combinations() {
            if segment_inside_room(&[a, b], &self.outer, &self.holes, tol) {
                ways.push(Way::new(vec![a, b], Level::single(self.level.clone()), WayKind::Footway));
            }
        }
    }

    /// Phase G — repeatedly finds a proper crossing between two distinct polylines' segments
    /// and splits both at the intersection point, until no crossing remains.
    fn split_intersections(&self, ways: &mut Vec<Way>, tol: &Tolerances) {
        let eps = tol.general_mapping_uncertainty;
        for _ in 0..MAX_SPLIT_ROUNDS {
            let mut found: Option<(usize, usize, usize, usize, Point)> = None;
            'search: for i in 0..ways.len() {
                for j in (i + 1)..ways.len() {
                    for (si, seg_i) in ways[i].points.windows(2).enumerate() {
                        for (sj, seg_j) in ways[j].points.windows(2).enumerate() {
                            let (a, b) = (seg_i[0], seg_i[1]);
                            let (c, d) = (seg_j[0], seg_j[1]);
                            let li = Line::through(a, b, eps);
                            let lj = Line::through(c, d, eps);
                            if let Some(ip) = intersect(li, lj, eps) {
                                if in_interval(a, b, ip, eps) && in_interval(c, d, ip, eps) {
                                    found = Some((i, j, si, sj, ip));
                                    break 'search;
                                }
                            }
                        }
                    }
                }
            }

            let Some((i, j, si, sj, ip)) = found else { break };
            let wi = ways[i].clone();
            let wj = ways[j].clone();

            let mut left_i = wi.points[..=si].to_vec();
            left_i.push(ip);
            let mut right_i = vec![ip];
            right_i.extend_from_slice(&wi.points[si + 1..]);

            let mut left_j = wj.points[..=sj].to_vec();
            left_j.push(ip);
            let mut right_j = vec![ip];
            right_j.extend_from_slice(&wj.points[sj + 1..]);

            let (hi, lo) = (i.max(j), i.min(j));
            ways.remove(hi);
            ways.remove(lo);
            for points in [left_i, right_i, left_j, right_j] {
                if points.len() >= 2 {
                    ways.push(Way::new(points, wi.level.clone(), wi.kind));
                }
            }
        }
    }

    /// Phase H — drops zero-length polylines and exact (same ordered points, same level)
    /// duplicates.
    fn dedup_ways(&self, ways: &mut Vec<Way>, tol: &Tolerances) {
        let eps = tol.general_mapping_uncertainty;
        ways.retain(|w| !(w.points.len() == 2 && w.points[0].approx_eq(w.points[1], eps)));
        let mut deduped: Vec<Way> = Vec::new();
        for w in ways.drain(..) {
            if !deduped.iter().any(|existing| existing.approx_eq(&w, eps)) {
                deduped.push(w);
            }
        }
        *ways = deduped;
    }
}

fn collapse_near_duplicates(points: &mut Vec<Point>, tol: f64) {
    if points.len() < 2 {
        return;
    }
    let mut result = Vec::with_capacity(points.len());
    result.push(points[0]);
    for &p in points.iter().skip(1) {
        if let Some(&last) = result.last() {
            if last.dist(p) <= tol {
                continue;
            }
        }
        result.push(p);
    }
    if result.len() < 2 {
        result.push(points[points.len() - 1]);
    }
    *points = result;
}

fn crosses_any_way(a: Point, b: Point, ways: &[Way], tol: &Tolerances) -> bool {
    let eps = tol.general_mapping_uncertainty;
    let seg_line = Line::through(a, b, eps);
    for w in ways {
        for seg in w.points.windows(2) {
            let (c, d) = (seg[0], seg[1]);
            let other_line = Line::through(c, d, eps);
            if let Some(ip) = intersect(seg_line, other_line, eps) {
                if in_interval(a, b, ip, eps) && in_interval(c, d, ip, eps) {
                    return true;
                }
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Polygon {
        Polygon::new(vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(10.0, 10.0), Point::new(0.0, 10.0)], None)
    }

    #[test]
    fn constructor_normalizes_orientation_and_snaps_doors() {
        let tol = Tolerances::default();
        let room = Room::new(square(), vec![], "0", vec![Point::new(5.0, 0.0), Point::new(5.0, 10.0)], &tol);
        assert_eq!(orientation(&room.outer), Orientation::Ccw);
        assert_eq!(room.doors.len(), 2);
        assert_eq!(room.outer.len(), 6);
    }

    #[test]
    fn phase_e_alone_connects_two_doors_across_an_empty_skeleton() {
        let tol = Tolerances::default();
        let mut room = Room::new(square(), vec![], "0", vec![Point::new(5.0, 0.0), Point::new(5.0, 10.0)], &tol);
        room.find_ways(&[], false, false, &tol);
        assert!(!room.ways.is_empty());
        let doors = room.doors.clone();
        let connects = room.ways.iter().any(|w| {
            (w.first().approx_eq(doors[0], 1e-6) && w.last().approx_eq(doors[1], 1e-6))
                || (w.first().approx_eq(doors[1], 1e-6) && w.last().approx_eq(doors[0], 1e-6))
        });
        assert!(connects);
    }

    #[test]
    fn no_way_has_two_equal_consecutive_points() {
        let tol = Tolerances::default();
        let mut room = Room::new(square(), vec![], "0", vec![Point::new(5.0, 0.0), Point::new(5.0, 10.0)], &tol);
        room.find_ways(&[], true, true, &tol);
        for w in &room.ways {
            for seg in w.points.windows(2) {
                assert!(seg[0].dist(seg[1]) > 0.0);
            }
        }
    }
}
