use std::collections::HashMap;

use crate::door::add_doors_to_polygon;
use crate::geometry::{Point, Polygon};
use crate::way::{Level, Way, WayKind};
use crate::Tolerances;

/// The OSM `highway` class a connector's cross-level ways are tagged with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConnectorKind {
    Stairs,
    Elevator,
}

impl ConnectorKind {
    fn way_kind(self) -> WayKind {
        match self {
            ConnectorKind::Stairs => WayKind::Stairs,
            ConnectorKind::Elevator => WayKind::Elevator,
        }
    }
}

/// A vertical connector (stairwell or elevator shaft) spanning ≥2 levels, each represented by
/// its own closed polygon footprint.
#[derive(Clone, Debug)]
pub struct Connector {
    pub members: Vec<(Polygon, String)>,
    pub kind: ConnectorKind,
}

impl Connector {
    pub fn new(members: Vec<(Polygon, String)>, kind: ConnectorKind) -> Self {
        Self { members, kind }
    }

    fn centre_of(polygon: &Polygon) -> Point {
        if polygon.is_closed() && polygon.len() > 1 {
            Point::centroid(&polygon.points[..polygon.len() - 1])
        } else {
            polygon.centroid()
        }
    }

    /// Produces this connector's centre-to-door ways (one per associated door, per level) plus
    /// its cross-level centre-to-centre ways (adjacent-only for stairs, all-pairs otherwise).
    pub fn find_ways(&self, doors_by_level: &HashMap<String, Vec<Point>>, tol: &Tolerances) -> Vec<Way> {
        let mut ways = Vec::new();
        let mut centres = Vec::with_capacity(self.members.len());

        for (polygon, level) in &self.members {
            let centre = Self::centre_of(polygon);
            centres.push(centre);

            if let Some(doors) = doors_by_level.get(level) {
                if !doors.is_empty() {
                    let mut member_copy = polygon.clone();
                    let associated = add_doors_to_polygon(&mut member_copy, doors, tol);
                    for door in associated {
                        ways.push(Way::new(vec![centre, door], Level::single(level.clone()), self.kind.way_kind()));
                    }
                }
            }
        }

        let n = centres.len();
        match self.kind {
            ConnectorKind::Stairs => {
                for i in 0..n.saturating_sub(1) {
                    let (level_i, level_j) = (&self.members[i].1, &self.members[i + 1].1);
                    ways.push(Way::new(
                        vec![centres[i], centres[i + 1]],
                        Level::cross(level_i.clone(), level_j.clone()),
                        self.kind.way_kind(),
                    ));
                }
            }
            ConnectorKind::Elevator => {
                for i in 0..n {
                    for j in (i + 1)..n {
                        let (level_i, level_j) = (&self.members[i].1, &self.members[j].1);
                        ways.push(Way::new(
                            vec![centres[i], centres[j]],
                            Level::cross(level_i.clone(), level_j.clone()),
                            self.kind.way_kind(),
                        ));
                    }
                }
            }
        }

        ways
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn closed_square(cx: f64, cy: f64) -> Polygon {
        Polygon::new(
            vec![
                Point::new(cx - 1.0, cy - 1.0),
                Point::new(cx + 1.0, cy - 1.0),
                Point::new(cx + 1.0, cy + 1.0),
                Point::new(cx - 1.0, cy + 1.0),
                Point::new(cx - 1.0, cy - 1.0),
            ],
            None,
        )
    }

    #[test]
    fn stairs_connect_adjacent_levels_only() {
        let tol = Tolerances::default();
        let members = vec![
            (closed_square(0.0, 0.0), "0".to_string()),
            (closed_square(10.0, 0.0), "1".to_string()),
            (closed_square(20.0, 0.0), "2".to_string()),
        ];
        let connector = Connector::new(members, ConnectorKind::Stairs);
        let ways = connector.find_ways(&HashMap::new(), &tol);
        assert_eq!(ways.len(), 2);
        assert!(ways.iter().any(|w| w.level.as_tag_value() == "0;1"));
        assert!(ways.iter().any(|w| w.level.as_tag_value() == "1;2"));
        assert!(!ways.iter().any(|w| w.level.as_tag_value() == "0;2"));
    }

    #[test]
    fn elevator_connects_every_pair() {
        let tol = Tolerances::default();
        let members = vec![
            (closed_square(0.0, 0.0), "0".to_string()),
            (closed_square(10.0, 0.0), "1".to_string()),
            (closed_square(20.0, 0.0), "2".to_string()),
        ];
        let connector = Connector::new(members, ConnectorKind::Elevator);
        let ways = connector.find_ways(&HashMap::new(), &tol);
        assert_eq!(ways.len(), 3);
        assert!(ways.iter().any(|w| w.level.as_tag_value() == "0;2"));
    }

    #[test]
    fn centre_to_door_way_emitted_per_associated_door() {
        let tol = Tolerances::default();
        let members = vec![(closed_square(0.0, 0.0), "0".to_string()), (closed_square(10.0, 0.0), "1".to_string())];
        let connector = Connector::new(members, ConnectorKind::Stairs);
        let mut doors_by_level = HashMap::new();
        doors_by_level.insert("0".to_string(), vec![Point::new(1.0, 0.0)]);
        let ways = connector.find_ways(&doors_by_level, &tol);
        assert!(ways.iter().any(|w| w.kind == WayKind::Stairs && w.points.len() == 2 && w.level.as_tag_value() == "0"));
    }
}
