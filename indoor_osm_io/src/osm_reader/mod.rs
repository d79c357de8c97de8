//! Raw OSM XML 0.6 parsing — structure only, no domain interpretation. `extract` is the pass
//! that turns this into `Room`/`Connector`/door collections.

use std::collections::{BTreeMap, HashMap};

use anyhow::{Context, Result};

use crate::error::IngestError;

pub type Tags = HashMap<String, String>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MemberType {
    Node,
    Way,
    Relation,
}

#[derive(Clone, Debug)]
pub struct Member {
    pub role: String,
    pub member_type: MemberType,
    pub ref_id: i64,
}

#[derive(Clone, Debug)]
pub struct OsmNode {
    pub lat: f64,
    pub lon: f64,
    pub tags: Tags,
}

#[derive(Clone, Debug)]
pub struct OsmWay {
    pub node_refs: Vec<i64>,
    pub tags: Tags,
}

#[derive(Clone, Debug)]
pub struct OsmRelation {
    pub tags: Tags,
    pub members: Vec<Member>,
}

/// The input file's `<bounds .../>` element, kept as its raw ordered attributes rather than
/// parsed into `minlat`/`minlon`/`maxlat`/`maxlon` fields, so the writer can reproduce it
/// verbatim without caring which attributes a particular extract happens to carry.
#[derive(Clone, Debug, Default)]
pub struct Bounds {
    pub attrs: Vec<(String, String)>,
}

/// The whole parsed file: nodes, ways, and relations, keyed by OSM id — mirroring
/// `streets_reader::osm_reader::Document`'s `BTreeMap`-keyed shape, minus any projection.
#[derive(Clone, Debug, Default)]
pub struct Document {
    pub bounds: Option<Bounds>,
    pub nodes: BTreeMap<i64, OsmNode>,
    pub ways: BTreeMap<i64, OsmWay>,
    pub relations: BTreeMap<i64, OsmRelation>,
}

impl Document {
    /// Parses `xml` into a `Document`. References to missing nodes/ways within a way/relation
    /// are dropped rather than treated as fatal — the same "just skip missing objects"
    /// leniency `streets_reader::osm_reader::reader::read` applies, since OSM extracts are
    /// routinely clipped to a bounding box that leaves dangling references behind.
    pub fn parse(xml: &str) -> Result<Self> {
        let tree = roxmltree::Document::parse(xml).context("parsing OSM XML")?;
        let root = tree.root_element();
        let mut doc = Document::default();

        for node in root.children().filter(|n| n.is_element()) {
            match node.tag_name().name() {
                "bounds" => {
                    let attrs =
                        node.attributes().map(|a| (a.name().to_string(), a.value().to_string())).collect();
                    doc.bounds = Some(Bounds { attrs });
                }
                "node" => {
                    let id = required_attr_i64(node, "id")?;
                    let lat = required_attr_f64(node, "lat")?;
                    let lon = required_attr_f64(node, "lon")?;
                    doc.nodes.insert(id, OsmNode { lat, lon, tags: read_tags(node) });
                }
                "way" => {
                    let id = required_attr_i64(node, "id")?;
                    let node_refs = node
                        .children()
                        .filter(|n| n.is_element() && n.tag_name().name() == "nd")
                        .filter_map(|nd| nd.attribute("ref").and_then(|s| s.parse::<i64>().ok()))
                        .collect();
                    doc.ways.insert(id, OsmWay { node_refs, tags: read_tags(node) });
                }
                "relation" => {
                    let id = required_attr_i64(node, "id")?;
                    let members = node
                        .children()
                        .filter(|n| n.is_element() && n.tag_name().name() == "member")
                        .filter_map(|m| {
                            let member_type = match m.attribute("type")? {
                                "node" => MemberType::Node,
                                "way" => MemberType::Way,
                                "relation" => MemberType::Relation,
                                other => {
                                    log::warn!("relation {id}: unrecognized member type '{other}', skipping");
                                    return None;
                                }
                            };
                            let ref_id = m.attribute("ref")?.parse::<i64>().ok()?;
                            let role = m.attribute("role").unwrap_or_default().to_string();
                            Some(Member { role, member_type, ref_id })
                        })
                        .collect();
                    doc.relations.insert(id, OsmRelation { tags: read_tags(node), members });
                }
                _ => {}
            }
        }

        log::info!(
            "parsed {} nodes, {} ways, {} relations",
            doc.nodes.len(),
            doc.ways.len(),
            doc.relations.len()
        );
        Ok(doc)
    }
}

fn read_tags(element: roxmltree::Node) -> Tags {
    element
        .children()
        .filter(|n| n.is_element() && n.tag_name().name() == "tag")
        .filter_map(|t| Some((t.attribute("k")?.to_string(), t.attribute("v").unwrap_or_default().to_string())))
        .collect()
}

fn required_attr_i64(node: roxmltree::Node, name: &str) -> Result<i64> {
    node.attribute(name)
        .and_then(|s| s.parse::<i64>().ok())
        .ok_or_else(|| IngestError::InputMalformed {
            element: format!("<{}>", node.tag_name().name()),
            reason: format!("missing or non-integer '{name}' attribute"),
        })
        .map_err(anyhow::Error::from)
}

fn required_attr_f64(node: roxmltree::Node, name: &str) -> Result<f64> {
    let id = node.attribute("id").unwrap_or("?");
    node.attribute(name)
        .and_then(|s| s.parse::<f64>().ok())
        .ok_or_else(|| IngestError::InputMalformed {
            element: format!("<{} id={id}>", node.tag_name().name()),
            reason: format!("missing or non-numeric '{name}' attribute"),
        })
        .map_err(anyhow::Error::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_nodes_ways_and_relations() {
        let xml = r#"<?xml version="1.0"?>
<osm version="0.6">
  <node id="1" lat="0.0" lon="0.0"><tag k="door" v="yes"/><tag k="level" v="0"/></node>
  <node id="2" lat="10.0" lon="0.0"/>
  <way id="10"><nd ref="1"/><nd ref="2"/><tag k="indoor" v="room"/></way>
  <relation id="100">
    <member type="way" ref="10" role="outer"/>
    <tag k="type" v="multipolygon"/>
  </relation>
</osm>"#;
        let doc = Document::parse(xml).unwrap();
        assert_eq!(doc.nodes.len(), 2);
        assert_eq!(doc.ways.len(), 1);
        assert_eq!(doc.relations.len(), 1);
        assert_eq!(doc.ways[&10].node_refs, vec![1, 2]);
        assert_eq!(doc.relations[&100].members[0].role, "outer");
    }

    #[test]
    fn captures_bounds_attributes_verbatim() {
        let xml = r#"<osm version="0.6">
  <bounds minlat="1.0" minlon="2.0" maxlat="3.0" maxlon="4.0"/>
</osm>"#;
        let doc = Document::parse(xml).unwrap();
        let bounds = doc.bounds.expect("bounds present");
        assert_eq!(bounds.attrs, vec![
            ("minlat".to_string(), "1.0".to_string()),
            ("minlon".to_string(), "2.0".to_string()),
            ("maxlat".to_string(), "3.0".to_string()),
            ("maxlon".to_string(), "4.0".to_string()),
        ]);
    }

    #[test]
    fn missing_node_id_is_input_malformed() {
        let xml = r#"<osm version="0.6"><node lat="0.0" lon="0.0"/></osm>"#;
        assert!(Document::parse(xml).is_err());
    }
}
