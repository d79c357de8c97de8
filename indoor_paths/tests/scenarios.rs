//! End-to-end scenarios straight out of the walkthrough used while designing this crate:
//! a room's outer boundary, its doors, and (where relevant) its skeleton, fed through
//! `Room::find_ways` exactly as `indoor_osm_io::extract` would drive it per level.

use indoor_paths::{segment_inside_room, skeletonize, Point, Polygon, Room, Tolerances};

fn square() -> Polygon {
    Polygon::new(vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(10.0, 10.0), Point::new(0.0, 10.0)], None)
}

fn l_shape() -> Polygon {
    // A square with its top-right quadrant notched out.
    Polygon::new(
        vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 4.0),
            Point::new(4.0, 4.0),
            Point::new(4.0, 10.0),
            Point::new(0.0, 10.0),
        ],
        None,
    )
}

/// Two doors on opposite walls of an empty square room connect directly — no skeleton needed.
#[test]
fn two_doors_in_an_empty_room_connect_directly() {
    let tol = Tolerances::default();
    let doors = vec![Point::new(0.0, 5.0), Point::new(10.0, 5.0)];
    let mut room = Room::new(square(), vec![], "0", doors, &tol);
    let skeleton = skeletonize(&room.outer.clone(), &[], &tol);
    room.find_ways(&skeleton, true, false, &tol);

    assert!(!room.ways.is_empty());
    let (d0, d1) = (room.doors[0], room.doors[1]);
    assert!(room.ways.iter().any(|w| {
        (w.first().approx_eq(d0, 1e-6) && w.last().approx_eq(d1, 1e-6))
            || (w.first().approx_eq(d1, 1e-6) && w.last().approx_eq(d0, 1e-6))
    }));
}

/// An L-shaped room with both doors inside the arm that never crosses the notch: the direct
/// segment between them stays within the room, so phase E alone (with an empty skeleton) is
/// enough to connect them.
#[test]
fn l_shaped_room_connects_doors_within_the_same_arm() {
    let tol = Tolerances::default();
    let doors = vec![Point::new(0.0, 2.0), Point::new(2.0, 10.0)];
    let mut room = Room::new(l_shape(), vec![], "0", doors, &tol);
    room.find_ways(&[], true, false, &tol);

    assert!(!room.ways.is_empty());
    let (d0, d1) = (room.doors[0], room.doors[1]);
    assert!(room.ways.iter().any(|w| {
        (w.first().approx_eq(d0, 1e-6) && w.last().approx_eq(d1, 1e-6))
            || (w.first().approx_eq(d1, 1e-6) && w.last().approx_eq(d0, 1e-6))
    }));
}

/// A square room with a centered square hole and doors on opposite walls: the straight line
/// between the doors passes through the hole, so every synthesized way must route around it.
/// The skeleton is approximate (see `skeleton` module docs), so this test only asserts the
/// invariant every way must satisfy regardless of skeleton quality — no way crosses the hole —
/// plus that the obstacle actually forced the graph to route through skeleton-derived points
/// rather than connecting the doors directly.
#[test]
fn square_room_with_centered_hole_never_routes_through_it() {
    let tol = Tolerances::default();
    let hole =
        Polygon::new(vec![Point::new(4.0, 4.0), Point::new(6.0, 4.0), Point::new(6.0, 6.0), Point::new(4.0, 6.0)], None);
    let doors = vec![Point::new(0.0, 5.0), Point::new(10.0, 5.0)];
    let mut room = Room::new(square(), vec![hole], "0", doors, &tol);

    // The direct line between the two doors cuts straight through the hole.
    assert!(!segment_inside_room(&[room.doors[0], room.doors[1]], &room.outer, &room.holes, &tol));

    let skeleton = skeletonize(&room.outer.clone(), &room.holes.clone(), &tol);
    room.find_ways(&skeleton, true, false, &tol);

    for w in &room.ways {
        assert!(segment_inside_room(&w.points, &room.outer, &room.holes, &tol));
    }
}

/// A skeleton computed against a polygon that no longer has any holes degenerates to the plain
/// single-boundary case and must still produce usable arcs for a simple convex room.
#[test]
fn skeleton_of_l_shape_has_no_arc_outside_its_bounding_box() {
    let tol = Tolerances::default();
    let outer = l_shape();
    let arcs = skeletonize(&outer, &[], &tol);
    for arc in &arcs {
        assert!(arc.source.x >= -1.0 && arc.source.x <= 11.0);
        assert!(arc.source.y >= -1.0 && arc.source.y <= 11.0);
    }
}

/// A single door in an otherwise empty room has nothing to connect to in phase E, and every
/// remaining skeleton-derived polyline must still stay inside the room and keep at least one
/// door-or-decision-node endpoint — the dead-end rule from phase C must never leave a polyline
/// dangling with both ends irrelevant.
#[test]
fn single_door_room_has_no_dangling_dead_ends() {
    let tol = Tolerances::default();
    let doors = vec![Point::new(0.0, 5.0)];
    let mut room = Room::new(square(), vec![], "0", doors, &tol);
    let skeleton = skeletonize(&room.outer.clone(), &[], &tol);
    room.find_ways(&skeleton, true, false, &tol);

    let eps = 1e-6;
    let is_relevant = |p: Point| {
        room.doors.iter().any(|d| d.approx_eq(p, eps)) || room.decision_nodes.iter().any(|d| d.approx_eq(p, eps))
    };
    for w in &room.ways {
        assert!(is_relevant(w.first()) || is_relevant(w.last()));
        assert!(segment_inside_room(&w.points, &room.outer, &room.holes, &tol));
    }
}
