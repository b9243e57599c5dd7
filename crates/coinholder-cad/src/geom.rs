//! Planar curve geometry shared by the sketch layer and the analytic kernel

use std::f64::consts::TAU;

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// Distance below which two planar features are considered touching (mm)
pub const TOUCH_TOLERANCE: f64 = 1e-7;

/// Smallest segment length, circle radius or loop area accepted (mm, mm²)
pub const DEGENERATE_TOLERANCE: f64 = 1e-9;

/// A single planar curve: a straight segment or a full circle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Curve2 {
    Segment { a: DVec2, b: DVec2 },
    Circle { center: DVec2, radius: f64 },
}

impl Curve2 {
    /// Point at a curve parameter: `t ∈ [0, 1]` for segments, an angle for circles
    pub fn point_at(&self, t: f64) -> DVec2 {
        match *self {
            Curve2::Segment { a, b } => a.lerp(b, t),
            Curve2::Circle { center, radius } => center + radius * DVec2::from_angle(t),
        }
    }

    /// Curve parameter of a point assumed to lie on the curve
    pub fn param_of(&self, p: DVec2) -> f64 {
        match *self {
            Curve2::Segment { a, b } => {
                let d = b - a;
                ((p - a).dot(d) / d.length_squared()).clamp(0.0, 1.0)
            }
            Curve2::Circle { center, .. } => {
                let v = p - center;
                normalize_angle(v.y.atan2(v.x))
            }
        }
    }

    /// Intersection points with another curve.
    ///
    /// Coincident circles yield nothing; collinear overlapping segments yield
    /// the endpoints of their overlap.
    pub fn intersections(&self, other: &Curve2) -> Vec<DVec2> {
        match (*self, *other) {
            (Curve2::Segment { a, b }, Curve2::Segment { a: c, b: d }) => {
                segment_segment(a, b, c, d)
            }
            (Curve2::Segment { a, b }, Curve2::Circle { center, radius })
            | (Curve2::Circle { center, radius }, Curve2::Segment { a, b }) => {
                segment_circle(a, b, center, radius)
            }
            (
                Curve2::Circle {
                    center: c1,
                    radius: r1,
                },
                Curve2::Circle {
                    center: c2,
                    radius: r2,
                },
            ) => circle_circle(c1, r1, c2, r2),
        }
    }

    /// Whether two curves describe the same point set
    pub fn coincides(&self, other: &Curve2) -> bool {
        match (*self, *other) {
            (Curve2::Segment { a, b }, Curve2::Segment { a: c, b: d }) => {
                (a.distance(c) < TOUCH_TOLERANCE && b.distance(d) < TOUCH_TOLERANCE)
                    || (a.distance(d) < TOUCH_TOLERANCE && b.distance(c) < TOUCH_TOLERANCE)
            }
            (
                Curve2::Circle {
                    center: c1,
                    radius: r1,
                },
                Curve2::Circle {
                    center: c2,
                    radius: r2,
                },
            ) => c1.distance(c2) < TOUCH_TOLERANCE && (r1 - r2).abs() < TOUCH_TOLERANCE,
            _ => false,
        }
    }
}

/// Map an angle into `[0, TAU)`
pub fn normalize_angle(angle: f64) -> f64 {
    let a = angle.rem_euclid(TAU);
    if a >= TAU { 0.0 } else { a }
}

/// Rotate a vector counter-clockwise by `angle` radians
pub fn rotate(v: DVec2, angle: f64) -> DVec2 {
    DVec2::from_angle(angle).rotate(v)
}

/// 2D cross product
pub fn cross(a: DVec2, b: DVec2) -> f64 {
    a.x * b.y - a.y * b.x
}

/// Signed area of a closed polygon (positive when counter-clockwise)
pub fn polygon_area(points: &[DVec2]) -> f64 {
    let n = points.len();
    (0..n)
        .map(|i| cross(points[i], points[(i + 1) % n]))
        .sum::<f64>()
        / 2.0
}

/// Even-odd point-in-polygon test
pub fn point_in_polygon(p: DVec2, points: &[DVec2]) -> bool {
    let n = points.len();
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (pi, pj) = (points[i], points[j]);
        if (pi.y > p.y) != (pj.y > p.y) {
            let x = pi.x + (p.y - pi.y) * (pj.x - pi.x) / (pj.y - pi.y);
            if p.x < x {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Distance from a point to a segment
pub fn point_segment_distance(p: DVec2, a: DVec2, b: DVec2) -> f64 {
    let d = b - a;
    let len2 = d.length_squared();
    if len2 == 0.0 {
        return p.distance(a);
    }
    let t = ((p - a).dot(d) / len2).clamp(0.0, 1.0);
    p.distance(a + d * t)
}

/// Shortest distance between two segments
pub fn segment_distance(a: DVec2, b: DVec2, c: DVec2, d: DVec2) -> f64 {
    if !segment_segment(a, b, c, d).is_empty() {
        return 0.0;
    }
    point_segment_distance(a, c, d)
        .min(point_segment_distance(b, c, d))
        .min(point_segment_distance(c, a, b))
        .min(point_segment_distance(d, a, b))
}

fn segment_segment(a: DVec2, b: DVec2, c: DVec2, d: DVec2) -> Vec<DVec2> {
    let r = b - a;
    let s = d - c;
    let denom = cross(r, s);
    let qp = c - a;

    if denom.abs() < DEGENERATE_TOLERANCE * r.length() * s.length() {
        // Parallel: only collinear overlaps produce points
        if cross(qp, r).abs() > TOUCH_TOLERANCE * r.length() {
            return Vec::new();
        }
        let len2 = r.length_squared();
        let t0 = qp.dot(r) / len2;
        let t1 = (d - a).dot(r) / len2;
        let (lo, hi) = (t0.min(t1).max(0.0), t0.max(t1).min(1.0));
        if lo > hi {
            return Vec::new();
        }
        let mut points = vec![a + r * lo];
        if hi - lo > DEGENERATE_TOLERANCE {
            points.push(a + r * hi);
        }
        return points;
    }

    let t = cross(qp, s) / denom;
    let u = cross(qp, r) / denom;
    let tol = TOUCH_TOLERANCE;
    if (-tol..=1.0 + tol).contains(&t) && (-tol..=1.0 + tol).contains(&u) {
        vec![a + r * t.clamp(0.0, 1.0)]
    } else {
        Vec::new()
    }
}

fn segment_circle(a: DVec2, b: DVec2, center: DVec2, radius: f64) -> Vec<DVec2> {
    let d = b - a;
    let f = a - center;
    let qa = d.length_squared();
    let qb = 2.0 * f.dot(d);
    let qc = f.length_squared() - radius * radius;
    let disc = qb * qb - 4.0 * qa * qc;
    if disc < 0.0 {
        return Vec::new();
    }
    let root = disc.sqrt();
    let mut points = Vec::new();
    for t in [(-qb - root) / (2.0 * qa), (-qb + root) / (2.0 * qa)] {
        if (-TOUCH_TOLERANCE..=1.0 + TOUCH_TOLERANCE).contains(&t) {
            let p = a + d * t.clamp(0.0, 1.0);
            if points
                .iter()
                .all(|q: &DVec2| q.distance(p) > DEGENERATE_TOLERANCE)
            {
                points.push(p);
            }
        }
    }
    points
}

fn circle_circle(c1: DVec2, r1: f64, c2: DVec2, r2: f64) -> Vec<DVec2> {
    let delta = c2 - c1;
    let dist = delta.length();
    if dist < DEGENERATE_TOLERANCE {
        return Vec::new();
    }
    if dist > r1 + r2 + TOUCH_TOLERANCE || dist < (r1 - r2).abs() - TOUCH_TOLERANCE {
        return Vec::new();
    }
    let along = (dist * dist + r1 * r1 - r2 * r2) / (2.0 * dist);
    let h = (r1 * r1 - along * along).max(0.0).sqrt();
    let dir = delta / dist;
    let base = c1 + dir * along;
    let perp = dir.perp();
    if h < DEGENERATE_TOLERANCE {
        vec![base]
    } else {
        vec![base + perp * h, base - perp * h]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_segment_crossing() {
        let s1 = Curve2::Segment {
            a: DVec2::new(-1.0, 0.0),
            b: DVec2::new(1.0, 0.0),
        };
        let s2 = Curve2::Segment {
            a: DVec2::new(0.5, -1.0),
            b: DVec2::new(0.5, 1.0),
        };
        let points = s1.intersections(&s2);
        assert_eq!(points.len(), 1);
        assert_relative_eq!(points[0].x, 0.5, epsilon = 1e-12);
        assert_relative_eq!(s1.param_of(points[0]), 0.75, epsilon = 1e-12);
    }

    #[test]
    fn test_collinear_overlap() {
        let s1 = Curve2::Segment {
            a: DVec2::ZERO,
            b: DVec2::new(2.0, 0.0),
        };
        let s2 = Curve2::Segment {
            a: DVec2::new(1.0, 0.0),
            b: DVec2::new(3.0, 0.0),
        };
        let points = s1.intersections(&s2);
        assert_eq!(points.len(), 2);
        assert_relative_eq!(points[0].x, 1.0, epsilon = 1e-12);
        assert_relative_eq!(points[1].x, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_circle_intersections() {
        let c1 = Curve2::Circle {
            center: DVec2::ZERO,
            radius: 1.0,
        };
        let c2 = Curve2::Circle {
            center: DVec2::new(1.0, 0.0),
            radius: 1.0,
        };
        let points = c1.intersections(&c2);
        assert_eq!(points.len(), 2);
        for p in points {
            assert_relative_eq!(p.x, 0.5, epsilon = 1e-12);
            assert_relative_eq!(p.length(), 1.0, epsilon = 1e-12);
        }

        // Coincident and nested circles
        assert!(c1.intersections(&c1).is_empty());
        let inner = Curve2::Circle {
            center: DVec2::ZERO,
            radius: 0.5,
        };
        assert!(c1.intersections(&inner).is_empty());

        let chord = Curve2::Segment {
            a: DVec2::new(-2.0, 0.0),
            b: DVec2::new(2.0, 0.0),
        };
        assert_eq!(c1.intersections(&chord).len(), 2);
    }

    #[test]
    fn test_polygon_helpers() {
        let square = [
            DVec2::new(0.0, 0.0),
            DVec2::new(2.0, 0.0),
            DVec2::new(2.0, 2.0),
            DVec2::new(0.0, 2.0),
        ];
        assert_relative_eq!(polygon_area(&square), 4.0);
        assert!(point_in_polygon(DVec2::new(1.0, 1.0), &square));
        assert!(!point_in_polygon(DVec2::new(3.0, 1.0), &square));
        assert_relative_eq!(
            point_segment_distance(DVec2::new(1.0, 3.0), square[2], square[3]),
            1.0
        );
    }

    #[test]
    fn test_normalize_angle() {
        assert_relative_eq!(
            normalize_angle(-std::f64::consts::FRAC_PI_2),
            1.5 * std::f64::consts::PI,
            epsilon = 1e-12
        );
        assert_relative_eq!(normalize_angle(TAU), 0.0);
    }
}
