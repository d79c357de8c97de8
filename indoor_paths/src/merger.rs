//! Post-pass point-cluster merger. Runs once over the whole output graph (across every room and
//! connector, not per-room), grouped by level so geometrically close points on different floors
//! never merge.

use std::collections::{HashMap, HashSet};

use crate::geometry::Point;
use crate::Tolerances;

/// A node in the flat output graph: an id (matching the id the writer will assign, or a
/// placeholder one pre-assignment), its coordinate, its level, and whether it carries a tag
/// (a door, an entrance) that makes it an "important" cluster representative.
#[derive(Clone, Debug)]
pub struct MergerNode {
    pub id: i64,
    pub point: Point,
    pub level: String,
    pub important: bool,
}

/// A way in the flat output graph, referencing nodes by id rather than owning coordinates
/// directly — the merger rewrites ids in place.
#[derive(Clone, Debug)]
pub struct MergerWay {
    pub node_ids: Vec<i64>,
    pub level: String,
}

#[derive(Clone, Debug, Default)]
pub struct NavGraph {
    pub nodes: Vec<MergerNode>,
    pub ways: Vec<MergerWay>,
}

impl NavGraph {
    /// Runs the full point-cluster merge pass in order.
    pub fn run(&mut self, tol: &Tolerances) {
        self.remove_collinear_vertices(tol);
        self.remove_solitary_nodes();
        self.cluster_and_merge(tol);
    }

    /// Stage 1 — consecutive duplicate vertices, then any interior vertex whose two incident
    /// edges are collinear within `angle_tol_degrees`.
    fn remove_collinear_vertices(&mut self, tol: &Tolerances) {
        let coords: HashMap<i64, Point> = self.nodes.iter().map(|n| (n.id, n.point)).collect();
        for way in &mut self.ways {
            let mut ids: Vec<i64> = Vec::with_capacity(way.node_ids.len());
            for &id in &way.node_ids {
                if ids.last() != Some(&id) {
                    ids.push(id);
                }
            }
            way.node_ids = ids;

            let mut i = 1;
            while i + 1 < way.node_ids.len() {
                let collinear = match (coords.get(&way.node_ids[i - 1]), coords.get(&way.node_ids[i]), coords.get(&way.node_ids[i + 1])) {
                    (Some(&p), Some(&c), Some(&n)) => collinear_within(p, c, n, tol.angle_tol_degrees),
                    _ => false,
                };
                if collinear {
                    way.node_ids.remove(i);
                } else {
                    i += 1;
                }
            }
        }
    }

    /// Stage 2 — drops any node that carries no tag and is referenced by no way.
    fn remove_solitary_nodes(&mut self) {
        let referenced: HashSet<i64> = self.ways.iter().flat_map(|w| w.node_ids.iter().copied()).collect();
        self.nodes.retain(|n| n.important || referenced.contains(&n.id));
    }

    /// Stages 3–5 — per level: flood-fill clustering via an explicit worklist over a spatial
    /// grid (bucket = `floor(coord / point_to_point)`), representative selection, then rewrite
    /// and id-dedup.
    fn cluster_and_merge(&mut self, tol: &Tolerances) {
        let radius = tol.point_to_point;
        let mut by_level: HashMap<String, Vec<usize>> = HashMap::new();
        for (idx, node) in self.nodes.iter().enumerate() {
            by_level.entry(node.level.clone()).or_default().push(idx);
        }

        let mut representative_for: HashMap<i64, Point> = HashMap::new();

        for indices in by_level.into_values() {
            let bucket_of = |p: Point| -> (i64, i64) { ((p.x / radius).floor() as i64, (p.y / radius).floor() as i64) };
            let mut grid: HashMap<(i64, i64), Vec<usize>> = HashMap::new();
            for (local, &global) in indices.iter().enumerate() {
                grid.entry(bucket_of(self.nodes[global].point)).or_default().push(local);
            }

            let mut assigned = vec![false; indices.len()];
            for start in 0..indices.len() {
                if assigned[start] {
                    continue;
                }
                assigned[start] = true;
                let mut cluster = vec![start];
                let mut worklist = vec![start];
                while let Some(cur_local) = worklist.pop() {
                    let cur_point = self.nodes[indices[cur_local]].point;
                    let (bx, by) = bucket_of(cur_point);
                    for dx in -1..=1 {
                        for dy in -1..=1 {
                            let Some(candidates) = grid.get(&(bx + dx, by + dy)) else { continue };
                            for &cand_local in candidates {
                                if assigned[cand_local] {
                                    continue;
                                }
                                let cand_point = self.nodes[indices[cand_local]].point;
                                if cur_point.dist(cand_point) <= radius {
                                    assigned[cand_local] = true;
                                    cluster.push(cand_local);
                                    worklist.push(cand_local);
                                }
                            }
                        }
                    }
                }

                if cluster.len() < 2 {
                    continue;
                }
                let global_ids: Vec<usize> = cluster.iter().map(|&l| indices[l]).collect();
                let representative = match global_ids.iter().find(|&&g| self.nodes[g].important) {
                    Some(&tagged) => self.nodes[tagged].point,
                    None => {
                        let pts: Vec<Point> = global_ids.iter().map(|&g| self.nodes[g].point).collect();
                        Point::centroid(&pts).round(11)
                    }
                };
                for &g in &global_ids {
                    representative_for.insert(self.nodes[g].id, representative);
                }
            }
        }

        if representative_for.is_empty() {
            return;
        }
        for node in &mut self.nodes {
            if let Some(&rep) = representative_for.get(&node.id) {
                node.point = rep;
            }
        }

        // Dedup nodes that now sit at identical coordinates, re-referencing every way to a
        // single surviving id.
        let eps = tol.general_mapping_uncertainty;
        let mut survivor_for: HashMap<i64, i64> = HashMap::new();
        let mut survivors: Vec<(i64, Point)> = Vec::new();
        for node in &self.nodes {
            match survivors.iter().find(|(_, p)| p.approx_eq(node.point, eps)) {
                Some(&(sid, _)) => {
                    survivor_for.insert(node.id, sid);
                }
                None => {
                    survivors.push((node.id, node.point));
                    survivor_for.insert(node.id, node.id);
                }
            }
        }

        for way in &mut self.ways {
            for id in &mut way.node_ids {
                if let Some(&sid) = survivor_for.get(id) {
                    *id = sid;
                }
            }
        }
        self.nodes.retain(|n| survivor_for.get(&n.id) == Some(&n.id));
    }
}

fn angle_degrees(a: Point, b: Point) -> f64 {
    let mut deg = (b.y - a.y).atan2(b.x - a.x).to_degrees();
    if deg < 0.0 {
        deg += 360.0;
    }
    deg
}

fn collinear_within(prev: Point, cur: Point, next: Point, tol_degrees: f64) -> bool {
    let a1 = angle_degrees(prev, cur);
    let a2 = angle_degrees(cur, next);
    let mut diff = (a1 - a2).abs();
    if diff > 180.0 {
        diff = 360.0 - diff;
    }
    diff <= tol_degrees
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cluster_merge_picks_rounded_centroid() {
        let tol = Tolerances::default();
        let mut graph = NavGraph {
            nodes: vec![
                MergerNode { id: 1, point: Point::new(0.0, 0.0), level: "0".into(), important: false },
                MergerNode { id: 2, point: Point::new(0.0000015, 0.0), level: "0".into(), important: false },
            ],
            ways: vec![
                MergerWay { node_ids: vec![1, 99], level: "0".into() },
                MergerWay { node_ids: vec![2, 100], level: "0".into() },
            ],
        };
        graph.nodes.push(MergerNode { id: 99, point: Point::new(5.0, 5.0), level: "0".into(), important: true });
        graph.nodes.push(MergerNode { id: 100, point: Point::new(-5.0, -5.0), level: "0".into(), important: true });

        graph.run(&tol);

        let merged_ids: HashSet<i64> = graph.ways.iter().flat_map(|w| w.node_ids.iter().copied()).collect();
        // node 1 and node 2 must have been rewritten to the same surviving id.
        let way1_first = graph.ways[0].node_ids[0];
        let way2_first = graph.ways[1].node_ids[0];
        assert_eq!(way1_first, way2_first);
        assert!(merged_ids.contains(&way1_first));

        let survivor = graph.nodes.iter().find(|n| n.id == way1_first).unwrap();
        assert!((survivor.point.x - 0.00000000075).abs() < 1e-12);
    }

    #[test]
    fn collinear_interior_vertex_is_removed() {
        let tol = Tolerances::default();
        let mut graph = NavGraph {
            nodes: vec![
                MergerNode { id: 1, point: Point::new(0.0, 0.0), level: "0".into(), important: true },
                MergerNode { id: 2, point: Point::new(5.0, 0.0), level: "0".into(), important: false },
                MergerNode { id: 3, point: Point::new(10.0, 0.0), level: "0".into(), important: true },
            ],
            ways: vec![MergerWay { node_ids: vec![1, 2, 3], level: "0".into() }],
        };
        graph.run(&tol);
        assert_eq!(graph.ways[0].node_ids, vec![1, 3]);
    }
}
