//! Walks a parsed `Document` and builds the `indoor_paths` domain model: rooms, connectors, and
//! doors grouped by level, dispatching on node/way/relation tags. No lat/lon projection is
//! applied — `lat`/`lon` become `x`/`y` verbatim, since indoor floor plans are already planar.

use std::collections::HashMap;

use anyhow::Result;
use indoor_paths::{orientation, polygon_inside_polygon, Connector, ConnectorKind, Orientation, Point, Polygon, Room, Tolerances};

use crate::error::IngestError;
use crate::osm_reader::{Document, OsmRelation, OsmWay, Tags};

pub struct ExtractResult {
    pub rooms: Vec<Room>,
    pub connectors: Vec<Connector>,
    pub doors_by_level: HashMap<String, Vec<Point>>,
}

fn has_value(tags: &Tags, value: &str) -> bool {
    tags.values().any(|v| v == value)
}

fn is_door_tagged(tags: &Tags) -> bool {
    tags.contains_key("door") || tags.contains_key("entrance")
}

fn way_polygon(doc: &Document, way: &OsmWay) -> Polygon {
    // The dataset's final `nd` repeats the first node, per the OSM closed-way convention;
    // `Polygon` is stored without that closing duplicate.
    let refs = if way.node_refs.len() > 1 && way.node_refs.first() == way.node_refs.last() {
        &way.node_refs[..way.node_refs.len() - 1]
    } else {
        &way.node_refs[..]
    };
    let points = refs.iter().filter_map(|id| doc.nodes.get(id)).map(|n| Point::new(n.lat, n.lon)).collect();
    Polygon::new(points, None)
}

/// Extracts rooms, connectors, and doors-by-level. `tol` is only used for the duplicate-room
/// elimination pass below (an `approx_eq` comparison, not exact floating equality) and for the
/// door re-association pass that follows it.
pub fn extract(doc: &Document, tol: &Tolerances) -> Result<ExtractResult> {
    let mut doors_by_level: HashMap<String, Vec<Point>> = HashMap::new();
    let mut rooms: Vec<Room> = Vec::new();

    for (id, node) in &doc.nodes {
        if !is_door_tagged(&node.tags) {
            continue;
        }
        let Some(level) = node.tags.get("level") else {
            log::warn!("door node {id} has no level tag, skipping");
            continue;
        };
        doors_by_level.entry(level.clone()).or_default().push(Point::new(node.lat, node.lon));
    }

    let mut barrier_candidates: Vec<(Polygon, String)> = Vec::new();

    for (id, way) in &doc.ways {
        if is_door_tagged(&way.tags) {
            let Some(level) = way.tags.get("level") else {
                log::warn!("door way {id} has no level tag, skipping");
                continue;
            };
            let polygon = way_polygon(doc, way);
            if polygon.is_empty() {
                log::warn!("door way {id} resolved to no nodes, skipping");
                continue;
            }
            doors_by_level.entry(level.clone()).or_default().push(polygon.centroid());
            continue;
        }

        if has_value(&way.tags, "room") || has_value(&way.tags, "corridor") {
            let Some(level) = way.tags.get("level") else {
                log::warn!("room way {id} has no level tag, skipping");
                continue;
            };
            let polygon = way_polygon(doc, way);
            if polygon.len() < 3 {
                log::warn!("room way {id} has fewer than 3 distinct nodes, skipping");
                continue;
            }
            rooms.push(Room::new(polygon, Vec::new(), level.clone(), Vec::new(), tol));
            continue;
        }

        if has_value(&way.tags, "wall") || has_value(&way.tags, "bench") || has_value(&way.tags, "table") {
            let Some(level) = way.tags.get("level") else {
                log::warn!("barrier way {id} has no level tag, skipping");
                continue;
            };
            let polygon = way_polygon(doc, way);
            if polygon.len() < 3 {
                log::warn!("barrier way {id} has fewer than 3 distinct nodes, skipping");
                continue;
            }
            barrier_candidates.push((polygon, level.clone()));
        }
    }

    for (id, relation) in &doc.relations {
        if has_value(&relation.tags, "multipolygon") {
            if let Some(room) = extract_multipolygon(doc, *id, relation, tol)? {
                rooms.push(room);
            }
        }
    }

    dedup_rooms(&mut rooms, tol);
    attach_barriers(&mut rooms, barrier_candidates, tol);

    let mut connectors = Vec::new();
    for (id, relation) in &doc.relations {
        if has_value(&relation.tags, "connection") {
            connectors.push(extract_connection(doc, *id, relation));
        }
    }

    // `Room::new` only snaps the doors it's given at construction time; rooms built above (one
    // per outer way/multipolygon) were built before doors-by-level was fully known, so
    // re-snap now that every door has been collected — mirroring the original's two-pass
    // `Parser.__init__` (parse) then `Parser.find_ways` (`room.add_doors(self.doors)`) split.
    for room in &mut rooms {
        let level_doors = doors_by_level.get(&room.level).cloned().unwrap_or_default();
        if level_doors.is_empty() {
            continue;
        }
        let resnapped = Room::new(room.outer.clone(), room.holes.clone(), room.level.clone(), level_doors, tol);
        room.outer = resnapped.outer;
        room.holes = resnapped.holes;
        room.doors = resnapped.doors;
    }

    Ok(ExtractResult { rooms, connectors, doors_by_level })
}

fn extract_multipolygon(doc: &Document, id: i64, relation: &OsmRelation, tol: &Tolerances) -> Result<Option<Room>> {
    let outer_ref = relation.members.iter().find(|m| m.role == "outer");
    let Some(outer_ref) = outer_ref else {
        log::warn!("multipolygon relation {id} has no outer member, skipping");
        return Ok(None);
    };
    let Some(outer_way) = doc.ways.get(&outer_ref.ref_id) else {
        log::warn!("multipolygon relation {id}'s outer way {} is missing, skipping", outer_ref.ref_id);
        return Ok(None);
    };

    let level = relation
        .tags
        .get("level")
        .or_else(|| outer_way.tags.get("level"))
        .ok_or_else(|| IngestError::InputMalformed {
            element: format!("relation {id}"),
            reason: "multipolygon has no level tag on the relation or its outer way".to_string(),
        })?
        .clone();
    let indoor = relation
        .tags
        .get("indoor")
        .or_else(|| outer_way.tags.get("indoor"))
        .ok_or_else(|| IngestError::InputMalformed {
            element: format!("relation {id}"),
            reason: "multipolygon has no indoor tag on the relation or its outer way".to_string(),
        })?;

    if indoor != "room" && indoor != "corridor" {
        log::info!("multipolygon relation {id} has indoor={indoor}, not a room or corridor; skipping");
        return Ok(None);
    }

    let outer = way_polygon(doc, outer_way);
    let holes: Vec<Polygon> = relation
        .members
        .iter()
        .filter(|m| m.role == "inner")
        .filter_map(|m| doc.ways.get(&m.ref_id))
        .map(|w| way_polygon(doc, w))
        .filter(|p| p.len() >= 3)
        .collect();

    Ok(Some(Room::new(outer, holes, level, Vec::new(), tol)))
}

fn extract_connection(doc: &Document, id: i64, relation: &OsmRelation) -> Connector {
    let kind = if has_value(&relation.tags, "stairs") { ConnectorKind::Stairs } else { ConnectorKind::Elevator };
    let mut members = Vec::new();
    for member in &relation.members {
        let Some(way) = doc.ways.get(&member.ref_id) else {
            log::warn!("connection relation {id} references missing way {}, skipping member", member.ref_id);
            continue;
        };
        let Some(level) = way.tags.get("level") else {
            log::warn!("connection relation {id}'s member way {} has no level tag, skipping", member.ref_id);
            continue;
        };
        members.push((way_polygon(doc, way), level.clone()));
    }
    Connector::new(members, kind)
}

/// Attaches each standalone `wall`/`bench`/`table` way (a potential barrier polygon) to the first
/// same-level room whose outer polygon contains it, via `polygon_inside_polygon(use_centroids =
/// true)` run at `barrier_to_room` precision rather than the baseline
/// `general_mapping_uncertainty`. A barrier that fits no room is dropped as a non-fatal geometric
/// degeneracy, never an error. Barriers attach as holes the same way multipolygon inner members
/// do; `Room::new`'s door re-association pass (which runs after this) re-simplifies and
/// re-orients them along with the rest of `room.holes`.
fn attach_barriers(rooms: &mut [Room], candidates: Vec<(Polygon, String)>, tol: &Tolerances) {
    let mut barrier_tol = *tol;
    barrier_tol.general_mapping_uncertainty = tol.barrier_to_room;

    for (mut barrier, level) in candidates {
        let home = rooms
            .iter()
            .position(|room| room.level == level && polygon_inside_polygon(&barrier, &room.outer, &barrier_tol, true));
        let Some(home) = home else {
            log::debug!("barrier on level {level} fits no room, dropping");
            continue;
        };
        if orientation(&barrier) != Orientation::Cw {
            barrier.reverse();
        }
        rooms[home].holes.push(barrier);
    }
}

/// Drops a room when another room shares its level and has an (approximately) identical outer
/// polygon — the situation that arises when a room is described both as a plain closed `way`
/// and, redundantly, as a `multipolygon` relation wrapping the same way. The plain-polygon
/// version is dropped in favor of the multipolygon's richer one (the one carrying holes, if
/// either does) — `original_source/src/core/parser.py`'s `read_data` dedup pass.
fn dedup_rooms(rooms: &mut Vec<Room>, tol: &Tolerances) {
    let eps = tol.general_mapping_uncertainty;
    let same_outer = |a: &Room, b: &Room| {
        a.level == b.level
            && a.outer.points.len() == b.outer.points.len()
            && a.outer.points.iter().zip(&b.outer.points).all(|(p, q)| p.approx_eq(*q, eps))
    };

    let mut kept: Vec<Room> = Vec::new();
    'rooms: for room in rooms.drain(..) {
        for existing in &mut kept {
            if same_outer(existing, &room) {
                if existing.holes.is_empty() && !room.holes.is_empty() {
                    *existing = room;
                }
                continue 'rooms;
            }
        }
        kept.push(room);
    }
    *rooms = kept;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::osm_reader::Document;

    #[test]
    fn wall_way_inside_room_becomes_a_hole() {
        let xml = r#"<?xml version="1.0"?>
<osm version="0.6">
  <node id="1" lat="0" lon="0"/>
  <node id="2" lat="10" lon="0"/>
  <node id="3" lat="10" lon="10"/>
  <node id="4" lat="0" lon="10"/>
  <node id="5" lat="4" lon="4"/>
  <node id="6" lat="6" lon="4"/>
  <node id="7" lat="6" lon="6"/>
  <node id="8" lat="4" lon="6"/>
  <way id="10">
    <nd ref="1"/><nd ref="2"/><nd ref="3"/><nd ref="4"/><nd ref="1"/>
    <tag k="indoor" v="room"/>
    <tag k="level" v="0"/>
  </way>
  <way id="20">
    <nd ref="5"/><nd ref="6"/><nd ref="7"/><nd ref="8"/><nd ref="5"/>
    <tag k="barrier" v="wall"/>
    <tag k="level" v="0"/>
  </way>
</osm>"#;
        let doc = Document::parse(xml).unwrap();
        let tol = Tolerances::default();
        let result = extract(&doc, &tol).unwrap();
        assert_eq!(result.rooms.len(), 1);
        assert_eq!(result.rooms[0].holes.len(), 1);
    }

    #[test]
    fn wall_way_outside_every_room_is_dropped() {
        let xml = r#"<?xml version="1.0"?>
<osm version="0.6">
  <node id="1" lat="0" lon="0"/>
  <node id="2" lat="10" lon="0"/>
  <node id="3" lat="10" lon="10"/>
  <node id="4" lat="0" lon="10"/>
  <node id="5" lat="40" lon="40"/>
  <node id="6" lat="60" lon="40"/>
  <node id="7" lat="60" lon="60"/>
  <way id="10">
    <nd ref="1"/><nd ref="2"/><nd ref="3"/><nd ref="4"/><nd ref="1"/>
    <tag k="indoor" v="room"/>
    <tag k="level" v="0"/>
  </way>
  <way id="20">
    <nd ref="5"/><nd ref="6"/><nd ref="7"/><nd ref="5"/>
    <tag k="barrier" v="wall"/>
    <tag k="level" v="0"/>
  </way>
</osm>"#;
        let doc = Document::parse(xml).unwrap();
        let tol = Tolerances::default();
        let result = extract(&doc, &tol).unwrap();
        assert_eq!(result.rooms.len(), 1);
        assert!(result.rooms[0].holes.is_empty());
    }
}
