//! Hand-rolled OSM XML 0.6 serializer. `roxmltree` is parse-only, so output is built as a small
//! in-memory `XmlNode` tree (tag name + ordered attributes + children) and serialized by hand:
//! `osm` → `node`* → `way`*, each `way` carrying `nd` then tag children.

use std::collections::HashMap;
use std::fmt::Write as _;

use indoor_paths::{Level, Point, Way};

use crate::osm_reader::{Bounds, Document, MemberType};

/// One element per line with 2-space indent (the default), or flat with no whitespace at all,
/// matching the path generator's `--no-pretty` flag.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PrettyPrint {
    Pretty,
    Flat,
}

/// A monotonically decreasing stream of generated-element ids, starting at −2. The path generator
/// owns two independent allocators, one for nodes and one for ways, so neither counter's id space
/// collides with the other's.
pub struct IdAllocator {
    next_id: i64,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self { next_id: -2 }
    }

    pub fn next(&mut self) -> i64 {
        let id = self.next_id;
        self.next_id -= 1;
        id
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

struct XmlNode {
    tag: String,
    attrs: Vec<(String, String)>,
    children: Vec<XmlNode>,
}

impl XmlNode {
    fn new(tag: impl Into<String>) -> Self {
        Self { tag: tag.into(), attrs: Vec::new(), children: Vec::new() }
    }

    fn attr(mut self, k: &str, v: impl Into<String>) -> Self {
        self.attrs.push((k.to_string(), v.into()));
        self
    }

    fn child(mut self, c: XmlNode) -> Self {
        self.children.push(c);
        self
    }
}

fn escape(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;").replace('"', "&quot;")
}

fn render(node: &XmlNode, out: &mut String, depth: usize, pretty: PrettyPrint) {
    if pretty == PrettyPrint::Pretty {
        out.push_str(&"  ".repeat(depth));
    }
    write!(out, "<{}", node.tag).unwrap();
    for (k, v) in &node.attrs {
        write!(out, " {k}=\"{}\"", escape(v)).unwrap();
    }
    if node.children.is_empty() {
        out.push_str("/>");
    } else {
        out.push('>');
        if pretty == PrettyPrint::Pretty {
            out.push('\n');
        }
        for child in &node.children {
            render(child, out, depth + 1, pretty);
        }
        if pretty == PrettyPrint::Pretty {
            out.push_str(&"  ".repeat(depth));
        }
        write!(out, "</{}>", node.tag).unwrap();
    }
    if pretty == PrettyPrint::Pretty {
        out.push('\n');
    }
}

fn fmt_coord(x: f64) -> String {
    format!("{x}")
}

fn tag_node(k: &str, v: &str) -> XmlNode {
    XmlNode::new("tag").attr("k", k).attr("v", v)
}

fn bounds_node(bounds: &Bounds) -> XmlNode {
    let mut n = XmlNode::new("bounds");
    n.attrs = bounds.attrs.clone();
    n
}

fn level_of_point(level: &Level, index: usize) -> String {
    match level {
        Level::Single(l) => l.clone(),
        Level::CrossLevel(a, b) => {
            if index == 0 {
                a.clone()
            } else {
                b.clone()
            }
        }
    }
}

/// Looks up (or allocates) the id for `point` within `bucket`'s node cache — one cache per
/// level-bucket string, so a cross-level way's two endpoints never collide with a same-level
/// way's nodes even at identical coordinates. Ported from `Parser.write_osm`'s per-level
/// `self.nodes` dict, which plays the same role. Returns the id together with the index of the
/// node element in `elements` so a caller (isolated-door emission) can attach extra tags onto a
/// freshly-created node; `None` when the point already existed.
fn node_id_for(
    cache: &mut HashMap<String, Vec<(Point, i64)>>,
    elements: &mut Vec<XmlNode>,
    ids: &mut IdAllocator,
    bucket: String,
    point: Point,
    tol: f64,
) -> (i64, Option<usize>) {
    let entries = cache.entry(bucket).or_default();
    if let Some(&(_, id)) = entries.iter().find(|(q, _)| q.approx_eq(point, tol)) {
        return (id, None);
    }
    let id = ids.next();
    entries.push((point, id));
    elements.push(XmlNode::new("node").attr("id", id.to_string()).attr("lat", fmt_coord(point.x)).attr("lon", fmt_coord(point.y)));
    (id, Some(elements.len() - 1))
}

/// Serializes the path generator's output: every synthesized `Way` becomes one `nd`-referenced
/// `node` per distinct coordinate plus one `way` carrying `indoor=yes`, `level=<level>`,
/// `highway=<kind>` tags, in that order. `ways` is the full concatenation of every room's `Way`s
/// followed by every connector's `Way`s — callers are responsible for building that list in the
/// right order before calling this.
///
/// `isolated_doors` covers the no-path-found case: a room that yields zero ways still emits its
/// doors, as standalone tagged `node`s rather than as `nd`-referenced way endpoints, so a later
/// point-merger pass can still fold them in with any neighboring room's graph. They're tagged
/// `door=yes` (not just `indoor`/`level`) so the merger's solitary-node removal stage treats them
/// as "important" and never discards them.
pub fn write_routes(
    ways: &[Way],
    isolated_doors: &[(Point, String)],
    bounds: Option<&Bounds>,
    point_to_point: f64,
    pretty: PrettyPrint,
) -> String {
    let mut root = XmlNode::new("osm").attr("version", "0.6").attr("upload", "false");
    if let Some(b) = bounds {
        root = root.child(bounds_node(b));
    }

    let mut node_ids = IdAllocator::new();
    let mut way_ids = IdAllocator::new();
    let mut node_cache: HashMap<String, Vec<(Point, i64)>> = HashMap::new();
    let mut node_elements = Vec::new();
    let mut way_elements = Vec::new();

    for way in ways {
        let mut way_node = XmlNode::new("way").attr("id", way_ids.next().to_string());
        for (index, &point) in way.points.iter().enumerate() {
            let bucket = level_of_point(&way.level, index);
            let (id, _) = node_id_for(&mut node_cache, &mut node_elements, &mut node_ids, bucket, point, point_to_point);
            way_node = way_node.child(XmlNode::new("nd").attr("ref", id.to_string()));
        }
        way_node = way_node
            .child(tag_node("indoor", "yes"))
            .child(tag_node("level", &way.level.as_tag_value()))
            .child(tag_node("highway", way.kind.as_tag_value()));
        way_elements.push(way_node);
    }

    for (point, level) in isolated_doors {
        let (_, new_index) = node_id_for(&mut node_cache, &mut node_elements, &mut node_ids, level.clone(), *point, point_to_point);
        if let Some(index) = new_index {
            let n = std::mem::replace(&mut node_elements[index], XmlNode::new("node"));
            node_elements[index] = n.child(tag_node("door", "yes")).child(tag_node("level", level));
        }
    }

    for n in node_elements {
        root = root.child(n);
    }
    for w in way_elements {
        root = root.child(w);
    }

    let mut out = String::new();
    out.push_str("<?xml version='1.0' encoding='UTF-8'?>\n");
    render(&root, &mut out, 0, pretty);
    out
}

/// Serializes an arbitrary `Document` verbatim (ids, tags, `nd`/`member` references unchanged
/// except where the caller already rewrote them) — used by the point-merger command, whose
/// output must keep every node/way/relation tag the input carried, only ever touching
/// coordinates and node references (`crate::merge::merge_document`). Tag order within an element
/// is sorted by key for determinism, since `Tags` is a `HashMap` with no input-order memory.
pub fn write_document(doc: &Document, pretty: PrettyPrint) -> String {
    let mut root = XmlNode::new("osm").attr("version", "0.6").attr("upload", "false");
    if let Some(bounds) = &doc.bounds {
        root = root.child(bounds_node(bounds));
    }

    for (id, node) in &doc.nodes {
        let mut n = XmlNode::new("node").attr("id", id.to_string()).attr("lat", fmt_coord(node.lat)).attr("lon", fmt_coord(node.lon));
        for (k, v) in sorted_tags(&node.tags) {
            n = n.child(tag_node(k, v));
        }
        root = root.child(n);
    }
    for (id, way) in &doc.ways {
        let mut w = XmlNode::new("way").attr("id", id.to_string());
        for node_ref in &way.node_refs {
            w = w.child(XmlNode::new("nd").attr("ref", node_ref.to_string()));
        }
        for (k, v) in sorted_tags(&way.tags) {
            w = w.child(tag_node(k, v));
        }
        root = root.child(w);
    }
    for (id, relation) in &doc.relations {
        let mut r = XmlNode::new("relation").attr("id", id.to_string());
        for member in &relation.members {
            let member_type = match member.member_type {
                MemberType::Node => "node",
                MemberType::Way => "way",
                MemberType::Relation => "relation",
            };
            r = r.child(XmlNode::new("member").attr("type", member_type).attr("ref", member.ref_id.to_string()).attr("role", member.role.clone()));
        }
        for (k, v) in sorted_tags(&relation.tags) {
            r = r.child(tag_node(k, v));
        }
        root = root.child(r);
    }

    let mut out = String::new();
    out.push_str("<?xml version='1.0' encoding='UTF-8'?>\n");
    render(&root, &mut out, 0, pretty);
    out
}

fn sorted_tags(tags: &crate::osm_reader::Tags) -> Vec<(&str, &str)> {
    let mut pairs: Vec<(&str, &str)> = tags.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
    pairs.sort_unstable_by_key(|(k, _)| *k);
    pairs
}

#[cfg(test)]
mod tests {
    use indoor_paths::WayKind;

    use super::*;

    #[test]
    fn id_allocator_descends_from_minus_two() {
        let mut ids = IdAllocator::new();
        assert_eq!(ids.next(), -2);
        assert_eq!(ids.next(), -3);
        assert_eq!(ids.next(), -4);
    }

    #[test]
    fn write_routes_dedups_coincident_endpoints_and_tags_every_way() {
        let shared = Point::new(5.0, 0.0);
        let ways = vec![
            Way::new(vec![Point::new(0.0, 0.0), shared], Level::single("0"), WayKind::Footway),
            Way::new(vec![shared, Point::new(10.0, 0.0)], Level::single("0"), WayKind::Footway),
        ];
        let xml = write_routes(&ways, &[], None, 1e-7, PrettyPrint::Pretty);
        assert_eq!(xml.matches("<node").count(), 3);
        assert_eq!(xml.matches("<way").count(), 2);
        assert!(xml.contains("k=\"highway\" v=\"footway\""));
        assert!(xml.contains("version=\"0.6\""));
        assert!(xml.contains("upload=\"false\""));
    }

    #[test]
    fn write_routes_cross_level_way_buckets_each_endpoint_separately() {
        let ways = vec![Way::new(
            vec![Point::new(0.0, 0.0), Point::new(0.0, 0.0)],
            Level::cross("0", "1"),
            WayKind::Stairs,
        )];
        let xml = write_routes(&ways, &[], None, 1e-7, PrettyPrint::Pretty);
        // Same coordinates, but different level buckets, so they must not be deduped together.
        assert_eq!(xml.matches("<node").count(), 2);
        assert!(xml.contains("k=\"level\" v=\"0;1\""));
    }

    #[test]
    fn write_routes_flat_has_no_newlines() {
        let ways = vec![Way::new(vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0)], Level::single("0"), WayKind::Footway)];
        let xml = write_routes(&ways, &[], None, 1e-7, PrettyPrint::Flat);
        assert_eq!(xml.matches('\n').count(), 1); // only the XML declaration line
    }

    #[test]
    fn write_routes_preserves_bounds_verbatim() {
        let bounds = Bounds { attrs: vec![("minlat".to_string(), "1.0".to_string())] };
        let ways = vec![Way::new(vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0)], Level::single("0"), WayKind::Footway)];
        let xml = write_routes(&ways, &[], Some(&bounds), 1e-7, PrettyPrint::Pretty);
        assert!(xml.contains("<bounds minlat=\"1.0\"/>"));
    }

    #[test]
    fn write_routes_emits_isolated_doors_as_tagged_standalone_nodes() {
        let isolated = vec![(Point::new(5.0, 0.0), "0".to_string())];
        let xml = write_routes(&[], &isolated, None, 1e-7, PrettyPrint::Pretty);
        assert_eq!(xml.matches("<node").count(), 1);
        assert_eq!(xml.matches("<way").count(), 0);
        assert!(xml.contains("k=\"door\" v=\"yes\""));
        assert!(xml.contains("k=\"level\" v=\"0\""));
    }
}
