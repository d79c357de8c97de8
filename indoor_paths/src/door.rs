use crate::geometry::{in_interval, intersect, Line, Point, Polygon};
use crate::Tolerances;

/// Inserts every door from `doors` that lies within `door_to_room` of one of `polygon`'s edges
/// as a new vertex, preserving order. Doors already coincident with an existing vertex are
/// recorded as associated without touching the polygon. Returns the doors actually associated
/// with this polygon (a subset of `doors`).
///
/// Restarts its scan from the first edge whenever an insertion changes the vertex indices; each
/// door is inserted at most once.
pub fn add_doors_to_polygon(polygon: &mut Polygon, doors: &[Point], tol: &Tolerances) -> Vec<Point> {
    let eps = tol.general_mapping_uncertainty;
    let mut associated = Vec::new();
    let mut remaining: Vec<Point> = doors.to_vec();

    'restart: loop {
        if remaining.is_empty() || polygon.points.len() < 2 {
            break;
        }
        for cur in 0..polygon.points.len() {
            let prev = if cur == 0 { polygon.points.len() - 1 } else { cur - 1 };
            let p_prev = polygon.points[prev];
            let p_cur = polygon.points[cur];
            let line = Line::through(p_prev, p_cur, eps);

            let mut i = 0;
            while i < remaining.len() {
                let door = remaining[i];
                if door.approx_eq(p_prev, eps) || door.approx_eq(p_cur, eps) {
                    associated.push(door);
                    remaining.remove(i);
                    continue;
                }
                let orthogonal = line.orthogonal_through(door);
                if let Some(foot) = intersect(line, orthogonal, eps) {
                    let within_distance = door.dist(foot) < tol.door_to_room && in_interval(p_prev, p_cur, foot, eps);
                    let foot_on_vertex = foot.approx_eq(p_cur, eps) || foot.approx_eq(p_prev, eps);
                    if within_distance {
                        polygon.insert(cur, door);
                        associated.push(door);
                        remaining.remove(i);
                        continue 'restart;
                    } else if foot_on_vertex {
                        associated.push(door);
                        remaining.remove(i);
                        continue;
                    }
                }
                i += 1;
            }
        }
        break;
    }

    associated
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snaps_door_between_existing_vertices() {
        let mut poly = Polygon::new(
            vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(10.0, 10.0), Point::new(0.0, 10.0)],
            None,
        );
        let mut tol = Tolerances::default();
        tol.door_to_room = 0.5;
        let door = Point::new(5.3, -0.2);
        let doors = add_doors_to_polygon(&mut poly, &[door], &tol);

        assert_eq!(doors.len(), 1);
        assert_eq!(poly.len(), 5);
        assert!(poly.points.iter().any(|p| p.approx_eq(door, 1e-9)));
        // the door keeps its original coordinates; only the foot decides acceptance
        let idx = poly.points.iter().position(|p| p.approx_eq(door, 1e-9)).unwrap();
        assert_eq!(idx, 1);
    }

    #[test]
    fn door_far_from_every_edge_is_not_associated() {
        let mut poly = Polygon::new(
            vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(10.0, 10.0), Point::new(0.0, 10.0)],
            None,
        );
        let tol = Tolerances::default();
        let doors = add_doors_to_polygon(&mut poly, &[Point::new(5.0, 5.0)], &tol);
        assert!(doors.is_empty());
        assert_eq!(poly.len(), 4);
    }

    #[test]
    fn door_already_on_polygon_is_not_duplicated() {
        let mut poly = Polygon::new(
            vec![Point::new(0.0, 0.0), Point::new(10.0, 0.0), Point::new(10.0, 10.0), Point::new(0.0, 10.0)],
            None,
        );
        let tol = Tolerances::default();
        let doors = add_doors_to_polygon(&mut poly, &[Point::new(10.0, 0.0)], &tol);
        assert_eq!(doors.len(), 1);
        assert_eq!(poly.len(), 4);
    }
}
