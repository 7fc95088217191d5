//! Clipping of surface elements against axis-aligned cell boxes.
//!
//! Emission geometry is computed per (cell, surface) pair: the part of a line
//! segment or triangle that lies inside the cell bounds. The [Clipper] trait
//! is the seam used by the task builder; the default [AxisBoxClipper]
//! implements parametric segment clipping and Sutherland-Hodgman polygon
//! clipping against the six box planes.

use nalgebra::Vector3;

/// Clips surface elements against an axis-aligned box.
///
/// Implementations return the ordered vertex path of the clipped element. A
/// path with fewer than 2 points (segments) or 3 points (triangles) means the
/// element does not overlap the box, and the caller drops the candidate.
pub trait Clipper {
    /// Clipped portion of the segment `p1`-`p2` inside the box.
    ///
    /// Segments live in the xy plane; the z coordinate is ignored.
    fn clip_line(
        &self,
        p1: &Vector3<f64>,
        p2: &Vector3<f64>,
        lo: &Vector3<f64>,
        hi: &Vector3<f64>,
    ) -> Vec<Vector3<f64>>;

    /// Clipped portion of the triangle `p1`,`p2`,`p3` inside the box, as an
    /// ordered convex polygon path.
    fn clip_tri(
        &self,
        p1: &Vector3<f64>,
        p2: &Vector3<f64>,
        p3: &Vector3<f64>,
        lo: &Vector3<f64>,
        hi: &Vector3<f64>,
    ) -> Vec<Vector3<f64>>;
}

/// Resource wrapper holding the clipper used by the task builder.
pub struct ClipperRes(pub Box<dyn Clipper + Send + Sync>);

impl Default for ClipperRes {
    fn default() -> Self {
        ClipperRes(Box::new(AxisBoxClipper))
    }
}

/// Exact clipping against an axis-aligned box.
pub struct AxisBoxClipper;

impl Clipper for AxisBoxClipper {
    fn clip_line(
        &self,
        p1: &Vector3<f64>,
        p2: &Vector3<f64>,
        lo: &Vector3<f64>,
        hi: &Vector3<f64>,
    ) -> Vec<Vector3<f64>> {
        let d = p2 - p1;
        let mut t0 = 0.0_f64;
        let mut t1 = 1.0_f64;

        for k in 0..2 {
            if d[k] == 0.0 {
                if p1[k] < lo[k] || p1[k] > hi[k] {
                    return Vec::new();
                }
            } else {
                let ta = (lo[k] - p1[k]) / d[k];
                let tb = (hi[k] - p1[k]) / d[k];
                let (near, far) = if ta < tb { (ta, tb) } else { (tb, ta) };
                t0 = t0.max(near);
                t1 = t1.min(far);
                if t0 > t1 {
                    return Vec::new();
                }
            }
        }

        vec![p1 + t0 * d, p1 + t1 * d]
    }

    fn clip_tri(
        &self,
        p1: &Vector3<f64>,
        p2: &Vector3<f64>,
        p3: &Vector3<f64>,
        lo: &Vector3<f64>,
        hi: &Vector3<f64>,
    ) -> Vec<Vector3<f64>> {
        let mut poly = vec![*p1, *p2, *p3];
        for k in 0..3 {
            poly = clip_halfspace(&poly, |p| p[k] - lo[k]);
            if poly.is_empty() {
                return poly;
            }
            poly = clip_halfspace(&poly, |p| hi[k] - p[k]);
            if poly.is_empty() {
                return poly;
            }
        }
        poly
    }
}

/// One Sutherland-Hodgman pass: keeps the part of the polygon with
/// `dist >= 0`, inserting edge/plane intersection points as needed.
fn clip_halfspace<F>(poly: &[Vector3<f64>], dist: F) -> Vec<Vector3<f64>>
where
    F: Fn(&Vector3<f64>) -> f64,
{
    let mut out = Vec::with_capacity(poly.len() + 1);
    for i in 0..poly.len() {
        let a = poly[i];
        let b = poly[(i + 1) % poly.len()];
        let da = dist(&a);
        let db = dist(&b);

        if da >= 0.0 {
            out.push(a);
            if db < 0.0 {
                out.push(a + (da / (da - db)) * (b - a));
            }
        } else if db >= 0.0 {
            out.push(a + (da / (da - db)) * (b - a));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn unit_box() -> (Vector3<f64>, Vector3<f64>) {
        (Vector3::new(0.0, 0.0, 0.0), Vector3::new(1.0, 1.0, 1.0))
    }

    #[test]
    fn test_segment_fully_inside() {
        let (lo, hi) = unit_box();
        let path = AxisBoxClipper.clip_line(
            &Vector3::new(0.2, 0.3, 0.0),
            &Vector3::new(0.8, 0.4, 0.0),
            &lo,
            &hi,
        );
        assert_eq!(path.len(), 2);
        assert_approx_eq!(path[0][0], 0.2, 1e-12);
        assert_approx_eq!(path[1][0], 0.8, 1e-12);
    }

    #[test]
    fn test_segment_crossing_is_trimmed() {
        let (lo, hi) = unit_box();
        let path = AxisBoxClipper.clip_line(
            &Vector3::new(-1.0, 0.5, 0.0),
            &Vector3::new(2.0, 0.5, 0.0),
            &lo,
            &hi,
        );
        assert_eq!(path.len(), 2);
        assert_approx_eq!(path[0][0], 0.0, 1e-12);
        assert_approx_eq!(path[1][0], 1.0, 1e-12);
        assert_approx_eq!(path[0][1], 0.5, 1e-12);
    }

    #[test]
    fn test_segment_outside_yields_no_points() {
        let (lo, hi) = unit_box();
        let path = AxisBoxClipper.clip_line(
            &Vector3::new(-1.0, 2.0, 0.0),
            &Vector3::new(2.0, 2.0, 0.0),
            &lo,
            &hi,
        );
        assert!(path.is_empty());
    }

    #[test]
    fn test_triangle_fully_inside_is_unchanged() {
        let (lo, hi) = unit_box();
        let path = AxisBoxClipper.clip_tri(
            &Vector3::new(0.1, 0.1, 0.5),
            &Vector3::new(0.9, 0.1, 0.5),
            &Vector3::new(0.5, 0.9, 0.5),
            &lo,
            &hi,
        );
        assert_eq!(path.len(), 3);
    }

    #[test]
    fn test_triangle_crossing_one_plane_becomes_quad() {
        let (lo, hi) = unit_box();
        // Apex pokes out through x = 1.
        let path = AxisBoxClipper.clip_tri(
            &Vector3::new(0.5, 0.2, 0.5),
            &Vector3::new(1.5, 0.5, 0.5),
            &Vector3::new(0.5, 0.8, 0.5),
            &lo,
            &hi,
        );
        assert_eq!(path.len(), 4);
        for p in &path {
            assert!(p[0] <= 1.0 + 1e-12);
        }
    }

    #[test]
    fn test_triangle_outside_yields_no_points() {
        let (lo, hi) = unit_box();
        let path = AxisBoxClipper.clip_tri(
            &Vector3::new(2.0, 2.0, 2.0),
            &Vector3::new(3.0, 2.0, 2.0),
            &Vector3::new(2.0, 3.0, 2.0),
            &lo,
            &hi,
        );
        assert!(path.is_empty());
    }
}
