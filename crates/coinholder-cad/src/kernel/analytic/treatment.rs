//! Fillets and chamfers as local cross-section edits
//!
//! A treatment sweeps a planar region along one edge. The region lives in the
//! edge cross-section frame with the edge at the origin: a triangle for a
//! chamfer, a kite minus the rolling-ball disc for a fillet. Convex edges lose
//! the region, concave edges gain it.

use std::f64::consts::TAU;

use glam::DVec2;

use super::edges::{EdgeGeom, Wedge, angle_in_span};
use super::intervals::IntervalSet;
use crate::geom;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TreatmentKind {
    Fillet,
    Chamfer,
}

#[derive(Debug, Clone)]
pub(crate) struct Treatment {
    kind: TreatmentKind,
    size: f64,
    edge: EdgeGeom,
    wedge: Wedge,
    /// Distance from the edge to where the treatment meets each face
    tangent: f64,
    polygon: Vec<DVec2>,
    /// Rolling-ball disc kept out of the region
    disc: Option<(DVec2, f64)>,
    xy_min: DVec2,
    xy_max: DVec2,
}

impl Treatment {
    /// Build the treatment region, or describe why the size is unusable
    pub fn new(kind: TreatmentKind, size: f64, edge: EdgeGeom, wedge: Wedge) -> Result<Self, String> {
        if !size.is_finite() || size <= 0.0 {
            return Err(format!("size must be positive, got {size}"));
        }
        let opening = if wedge.is_convex() {
            wedge.alpha
        } else {
            TAU - wedge.alpha
        };
        let half = opening / 2.0;
        let tangent = match kind {
            TreatmentKind::Fillet => size / half.tan(),
            TreatmentKind::Chamfer => size,
        };
        if !tangent.is_finite() || tangent <= 0.0 {
            return Err(format!("faces meet at {:.3} rad", wedge.alpha));
        }

        let t1 = wedge.u1 * tangent;
        let t2 = wedge.u2 * tangent;
        let bisector = (wedge.u1 + wedge.u2).normalize_or_zero();
        if bisector == DVec2::ZERO {
            return Err("faces are opposite each other".into());
        }

        let (polygon, disc) = match kind {
            TreatmentKind::Fillet => {
                let center = bisector * (size / half.sin());
                (vec![DVec2::ZERO, t1, center, t2], Some((center, size)))
            }
            TreatmentKind::Chamfer => (vec![DVec2::ZERO, t1, t2], None),
        };

        let reach = polygon.iter().map(|p| p.length()).fold(0.0, f64::max);
        let (lo, hi) = edge.xy_bounds();
        Ok(Self {
            kind,
            size,
            edge,
            wedge,
            tangent,
            polygon,
            disc,
            xy_min: lo - DVec2::splat(reach),
            xy_max: hi + DVec2::splat(reach),
        })
    }

    pub fn kind(&self) -> TreatmentKind {
        self.kind
    }

    pub fn size(&self) -> f64 {
        self.size
    }

    pub fn edge(&self) -> &EdgeGeom {
        &self.edge
    }

    #[cfg(test)]
    pub fn tangent(&self) -> f64 {
        self.tangent
    }

    /// Tangent points on both faces, each with the in-face normal pointing
    /// into the material
    pub fn tangent_points(&self) -> [(DVec2, DVec2); 2] {
        let Wedge { u1, u2, .. } = self.wedge;
        [
            (u1 * self.tangent, u1.perp()),
            (u2 * self.tangent, -u2.perp()),
        ]
    }

    /// Edge directions of both faces in the cross-section frame
    pub fn face_directions(&self) -> [DVec2; 2] {
        [self.wedge.u1, self.wedge.u2]
    }

    /// The two curves where the treatment meets the adjacent faces
    pub fn offsets(&self, edge: &EdgeGeom) -> [EdgeGeom; 2] {
        [
            edge.offset(self.wedge.u1 * self.tangent),
            edge.offset(self.wedge.u2 * self.tangent),
        ]
    }

    /// Whether a listed edge is the one this treatment rounded off
    pub fn replaces(&self, edge: &EdgeGeom, tolerance: f64) -> bool {
        self.edge.same_carrier(edge, tolerance) && self.edge.covers(edge.midpoint(), tolerance)
    }

    /// Apply to the material column through `p`
    pub fn apply(&self, column: &IntervalSet, p: DVec2) -> IntervalSet {
        if p.x < self.xy_min.x || p.y < self.xy_min.y || p.x > self.xy_max.x || p.y > self.xy_max.y {
            return column.clone();
        }
        let region = self.region_column(p);
        if region.is_empty() {
            column.clone()
        } else if self.wedge.is_convex() {
            column.difference(&region)
        } else {
            column.union(&region)
        }
    }

    fn region_column(&self, p: DVec2) -> IntervalSet {
        match self.edge {
            EdgeGeom::Arc {
                center,
                radius,
                z,
                start,
                sweep,
            } => {
                let v = p - center;
                if !angle_in_span(geom::normalize_angle(v.y.atan2(v.x)), start, sweep) {
                    return IntervalSet::empty();
                }
                self.cross_section_column(v.length() - radius, z)
            }
            EdgeGeom::Horizontal { a, b } => {
                let d = (b - a).truncate();
                let length = d.length();
                let dir = d / length;
                let w = p - a.truncate();
                let s = w.dot(dir);
                if s < 0.0 || s > length {
                    return IntervalSet::empty();
                }
                self.cross_section_column(w.dot(dir.perp()), a.z)
            }
            EdgeGeom::Vertical { xy, z0, z1 } => {
                if self.in_region(p - xy) {
                    IntervalSet::single(z0.min(z1), z0.max(z1))
                } else {
                    IntervalSet::empty()
                }
            }
        }
    }

    /// Region spans on the frame line `a = const`, shifted to height `base`
    fn cross_section_column(&self, a: f64, base: f64) -> IntervalSet {
        let mut lo = f64::INFINITY;
        let mut hi = f64::NEG_INFINITY;
        let n = self.polygon.len();
        for i in 0..n {
            let p = self.polygon[i];
            let q = self.polygon[(i + 1) % n];
            if (p.x - a) * (q.x - a) > 0.0 {
                continue;
            }
            if (q.x - p.x).abs() < 1e-15 {
                lo = lo.min(p.y.min(q.y));
                hi = hi.max(p.y.max(q.y));
            } else {
                let b = p.y + (a - p.x) / (q.x - p.x) * (q.y - p.y);
                lo = lo.min(b);
                hi = hi.max(b);
            }
        }
        if lo >= hi {
            return IntervalSet::empty();
        }

        let mut spans = vec![(lo, hi)];
        if let Some((center, radius)) = self.disc {
            let dx = a - center.x;
            if dx.abs() < radius {
                let h = (radius * radius - dx * dx).sqrt();
                spans = vec![(lo, hi.min(center.y - h)), (lo.max(center.y + h), hi)];
            }
        }
        IntervalSet::from_spans(
            spans
                .into_iter()
                .map(|(lo, hi)| (lo + base, hi + base))
                .collect(),
        )
    }

    fn in_region(&self, q: DVec2) -> bool {
        geom::point_in_polygon(q, &self.polygon)
            && self.disc.is_none_or(|(center, radius)| q.distance(center) > radius)
    }
}

/// Reject treatments on concentric arc edges that would eat the same face
/// from both ends
pub(crate) fn check_shared_faces(treatments: &[Treatment]) -> Result<(), String> {
    const ALIGNED: f64 = 1.0 - 1e-6;

    for (i, first) in treatments.iter().enumerate() {
        for second in &treatments[i + 1..] {
            let (
                EdgeGeom::Arc {
                    center: c1,
                    radius: r1,
                    z: z1,
                    ..
                },
                EdgeGeom::Arc {
                    center: c2,
                    radius: r2,
                    z: z2,
                    ..
                },
            ) = (first.edge, second.edge)
            else {
                continue;
            };
            if c1.distance(c2) > geom::TOUCH_TOLERANCE {
                continue;
            }
            let gap = DVec2::new(r2 - r1, z2 - z1);
            let length = gap.length();
            if length < geom::DEGENERATE_TOLERANCE {
                continue;
            }
            let dir = gap / length;

            let toward = first.face_directions().iter().any(|u| u.dot(dir) > ALIGNED);
            let back = second.face_directions().iter().any(|u| u.dot(-dir) > ALIGNED);
            if toward && back && first.tangent + second.tangent > length + 1e-9 {
                return Err(format!(
                    "treatments at radii {r1:.3} and {r2:.3} overlap on the face between them \
                     ({:.3} + {:.3} > {length:.3})",
                    first.tangent, second.tangent
                ));
            }
        }
    }
    Ok(())
}
