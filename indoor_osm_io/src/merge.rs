//! Adapts a parsed `Document` into `indoor_paths::merger::NavGraph`, runs the point-cluster
//! merge pass, and folds the result back onto the document's nodes/ways — touching only
//! coordinates and `nd` references, never a tag. Backs the point-merger CLI command; unlike
//! `writer::write_routes` this never allocates new ids, since the merger only ever drops or
//! coalesces nodes that already exist in the input.

use std::collections::HashMap;

use indoor_paths::{MergerNode, MergerWay, NavGraph, Point, Tolerances};

use crate::osm_reader::Document;

/// Runs the five-stage merge over every node/way in `doc` and returns a new `Document` with
/// merged coordinates, re-referenced `nd`s, and solitary untagged nodes removed. Relations are
/// carried through unchanged: this command runs on path-generator output, which never contains a
/// `relation`, so member-ref remapping for an arbitrary input's relations is out of scope here
/// (see `DESIGN.md`).
pub fn merge_document(doc: &Document, tol: &Tolerances) -> Document {
    // A node's level bucket is its own `level` tag if it carries one (doors, mostly); otherwise
    // the level of the first way that references it (every generated `Way`'s own nodes, which
    // carry no tags of their own).
    let mut level_of: HashMap<i64, String> = HashMap::new();
    for (id, node) in &doc.nodes {
        if let Some(level) = node.tags.get("level") {
            level_of.insert(*id, level.clone());
        }
    }
    for way in doc.ways.values() {
        if let Some(level) = way.tags.get("level") {
            for node_id in &way.node_refs {
                level_of.entry(*node_id).or_insert_with(|| level.clone());
            }
        }
    }

    let mut graph = NavGraph::default();
    for (id, node) in &doc.nodes {
        graph.nodes.push(MergerNode {
            id: *id,
            point: Point::new(node.lat, node.lon),
            level: level_of.get(id).cloned().unwrap_or_default(),
            important: !node.tags.is_empty(),
        });
    }
    for way in doc.ways.values() {
        graph.ways.push(MergerWay {
            node_ids: way.node_refs.clone(),
            level: way.tags.get("level").cloned().unwrap_or_default(),
        });
    }

    graph.run(tol);

    let surviving: HashMap<i64, Point> = graph.nodes.iter().map(|n| (n.id, n.point)).collect();

    let mut merged = doc.clone();
    for (merged_way, rewritten) in merged.ways.values_mut().zip(graph.ways.iter()) {
        merged_way.node_refs = rewritten.node_ids.clone();
    }
    merged.nodes.retain(|id, _| surviving.contains_key(id));
    for (id, node) in merged.nodes.iter_mut() {
        if let Some(&p) = surviving.get(id) {
            node.lat = p.x;
            node.lon = p.y;
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::osm_reader::{OsmNode, OsmWay};

    fn tagged(level: &str) -> crate::osm_reader::Tags {
        [("level".to_string(), level.to_string())].into_iter().collect()
    }

    #[test]
    fn merges_coincident_nodes_and_rewrites_way_refs() {
        let mut nodes = BTreeMap::new();
        nodes.insert(1, OsmNode { lat: 0.0, lon: 0.0, tags: Default::default() });
        nodes.insert(2, OsmNode { lat: 0.0000015, lon: 0.0, tags: Default::default() });
        nodes.insert(3, OsmNode { lat: 5.0, lon: 5.0, tags: tagged("0") });
        nodes.insert(4, OsmNode { lat: -5.0, lon: -5.0, tags: tagged("0") });

        let mut ways = BTreeMap::new();
        ways.insert(-2, OsmWay { node_refs: vec![1, 3], tags: tagged("0") });
        ways.insert(-3, OsmWay { node_refs: vec![2, 4], tags: tagged("0") });

        let doc = Document { bounds: None, nodes, ways, relations: Default::default() };
        let tol = Tolerances::default();
        let merged = merge_document(&doc, &tol);

        let first_ref = merged.ways[&-2].node_refs[0];
        let second_ref = merged.ways[&-3].node_refs[0];
        assert_eq!(first_ref, second_ref);
        assert!(merged.nodes.contains_key(&first_ref));
    }

    #[test]
    fn drops_untagged_unreferenced_nodes() {
        let mut nodes = BTreeMap::new();
        nodes.insert(1, OsmNode { lat: 0.0, lon: 0.0, tags: Default::default() });
        let doc = Document { bounds: None, nodes, ways: Default::default(), relations: Default::default() };
        let merged = merge_document(&doc, &Tolerances::default());
        assert!(merged.nodes.is_empty());
    }

    #[test]
    fn preserves_bounds_and_tags() {
        let mut nodes = BTreeMap::new();
        nodes.insert(1, OsmNode { lat: 0.0, lon: 0.0, tags: tagged("0") });
        let doc = Document {
            bounds: Some(crate::osm_reader::Bounds { attrs: vec![("minlat".to_string(), "0".to_string())] }),
            nodes,
            ways: Default::default(),
            relations: Default::default(),
        };
        let merged = merge_document(&doc, &Tolerances::default());
        assert_eq!(merged.bounds.unwrap().attrs, vec![("minlat".to_string(), "0".to_string())]);
        assert_eq!(merged.nodes[&1].tags.get("level"), Some(&"0".to_string()));
    }
}
