//! Surface elements bordering the simulated gas.
//!
//! Surfaces are line segments in 2-D and triangles in 3-D, each with an
//! outward unit normal and a group bitmask. Groups are named sets of
//! surfaces; the emission engine selects the surfaces it emits from by group.
//! Reactive faces additionally carry a [FaceState](crate::chemistry::FaceState)
//! binding them to a chemistry network.

use hashbrown::HashMap;
use nalgebra::Vector3;

use crate::chemistry::FaceState;

/// Index of a surface element in the surface list.
pub type SurfId = usize;

/// Maximum number of named surface groups (one bit each).
pub const MAX_GROUPS: u32 = 32;

/// A 2-D surface element: a line segment with an outward normal.
pub struct Line {
    pub p1: Vector3<f64>,
    pub p2: Vector3<f64>,
    /// Unit normal, pointing into the gas.
    pub norm: Vector3<f64>,
    /// Bitmask of the groups this surface belongs to.
    pub mask: u32,
    /// Chemistry state, present on reactive faces.
    pub state: Option<FaceState>,
}

impl Line {
    /// Creates a segment with the normal obtained by rotating `p2 - p1` a
    /// quarter turn clockwise, so a path traversed counter-clockwise around a
    /// body has normals pointing away from it.
    pub fn new(p1: Vector3<f64>, p2: Vector3<f64>) -> Line {
        let d = p2 - p1;
        let norm = Vector3::new(d[1], -d[0], 0.0).normalize();
        Line {
            p1,
            p2,
            norm,
            mask: 1,
            state: None,
        }
    }
}

/// A 3-D surface element: a triangle with an outward normal.
pub struct Tri {
    pub p1: Vector3<f64>,
    pub p2: Vector3<f64>,
    pub p3: Vector3<f64>,
    /// Unit normal, pointing into the gas.
    pub norm: Vector3<f64>,
    /// Bitmask of the groups this surface belongs to.
    pub mask: u32,
    /// Chemistry state, present on reactive faces.
    pub state: Option<FaceState>,
}

impl Tri {
    /// Creates a triangle with the right-hand-rule normal of `(p1, p2, p3)`.
    pub fn new(p1: Vector3<f64>, p2: Vector3<f64>, p3: Vector3<f64>) -> Tri {
        let norm = (p2 - p1).cross(&(p3 - p1)).normalize();
        Tri {
            p1,
            p2,
            p3,
            norm,
            mask: 1,
            state: None,
        }
    }
}

/// The surface list plus named groups.
///
/// Every surface belongs to the predefined group `all` (bit 0).
pub struct Surfaces {
    pub lines: Vec<Line>,
    pub tris: Vec<Tri>,
    groups: HashMap<String, u32>,
    ngroup: u32,
}

impl Default for Surfaces {
    fn default() -> Self {
        let mut groups = HashMap::new();
        groups.insert("all".to_string(), 1);
        Surfaces {
            lines: Vec::new(),
            tris: Vec::new(),
            groups,
            ngroup: 1,
        }
    }
}

impl Surfaces {
    /// Bitmask of a named group.
    pub fn find_group(&self, name: &str) -> Option<u32> {
        self.groups.get(name).copied()
    }

    /// Defines a new group and returns its bitmask. Assign surfaces to the
    /// group by or-ing the bit into their `mask`.
    pub fn add_group(&mut self, name: &str) -> u32 {
        if let Some(bit) = self.find_group(name) {
            return bit;
        }
        assert!(
            self.ngroup < MAX_GROUPS,
            "Cannot define more than {} surface groups",
            MAX_GROUPS
        );
        let bit = 1 << self.ngroup;
        self.ngroup += 1;
        self.groups.insert(name.to_string(), bit);
        bit
    }

    /// Normal of a surface, for the given domain dimensionality.
    pub fn normal(&self, isurf: SurfId, dimension: usize) -> Vector3<f64> {
        if dimension == 2 {
            self.lines[isurf].norm
        } else {
            self.tris[isurf].norm
        }
    }

    /// Chemistry state of a surface, for the given domain dimensionality.
    pub fn face_state_mut(&mut self, isurf: SurfId, dimension: usize) -> Option<&mut FaceState> {
        if dimension == 2 {
            self.lines[isurf].state.as_mut()
        } else {
            self.tris[isurf].state.as_mut()
        }
    }
}

/// Reflects a velocity specularly about a surface normal.
pub fn specular_reflect(v: &Vector3<f64>, normal: &Vector3<f64>) -> Vector3<f64> {
    v - 2.0 * v.dot(normal) * normal
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_line_normal_is_perpendicular_unit() {
        let line = Line::new(Vector3::new(0.0, 0.0, 0.0), Vector3::new(2.0, 0.0, 0.0));
        assert_approx_eq!(line.norm.norm(), 1.0, 1e-12);
        assert_approx_eq!(line.norm.dot(&(line.p2 - line.p1)), 0.0, 1e-12);
        // x axis segment traversed +x: normal points towards -y.
        assert_approx_eq!(line.norm[1], -1.0, 1e-12);
    }

    #[test]
    fn test_tri_normal_right_hand_rule() {
        let tri = Tri::new(
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(1.0, 0.0, 0.0),
            Vector3::new(0.0, 1.0, 0.0),
        );
        assert_approx_eq!(tri.norm[2], 1.0, 1e-12);
    }

    #[test]
    fn test_groups_are_distinct_bits() {
        let mut surfs = Surfaces::default();
        let a = surfs.add_group("inlet");
        let b = surfs.add_group("outlet");
        assert_eq!(surfs.find_group("all"), Some(1));
        assert_ne!(a, b);
        assert_eq!(a & b, 0);
        // Re-adding returns the existing bit.
        assert_eq!(surfs.add_group("inlet"), a);
    }

    #[test]
    fn test_specular_reflection() {
        let n = Vector3::new(0.0, 1.0, 0.0);
        let v = Vector3::new(1.0, -2.0, 0.5);
        let r = specular_reflect(&v, &n);
        assert_approx_eq!(r[0], 1.0, 1e-12);
        assert_approx_eq!(r[1], 2.0, 1e-12);
        assert_approx_eq!(r[2], 0.5, 1e-12);
        // Energy is conserved.
        assert_approx_eq!(r.norm(), v.norm(), 1e-12);
    }
}
