/// Tolerances that every ε-aware predicate and builder phase in this crate is threaded through
/// explicitly (never read from a global), so callers can exercise the "tolerance monotonicity"
/// law with alternate values in tests.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tolerances {
    /// Baseline for `almost_same` in the geometry predicates.
    pub general_mapping_uncertainty: f64,
    /// Merge distance for adjacent way vertices; cluster radius in the point merger.
    pub point_to_point: f64,
    /// Tolerance for the barrier-inside-room test.
    pub barrier_to_room: f64,
    /// Max perpendicular distance for door-to-edge snapping.
    pub door_to_room: f64,
    /// Allowed slack for the centroid-based polygon-inside-polygon test.
    pub ratio_barrier_in_barrier: f64,
    /// Collinear-vertex angle threshold in the point merger, in degrees.
    pub angle_tol_degrees: f64,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            general_mapping_uncertainty: 1e-7,
            point_to_point: 2e-6,
            barrier_to_room: 2e-6,
            door_to_room: 5e-6,
            ratio_barrier_in_barrier: 0.25,
            angle_tol_degrees: 2.0,
        }
    }
}
