//! Sketch layer
//!
//! A [`Sketch`] collects closed planar wires on a [`SketchPlane`] and hands
//! them to the kernel as a [`Profile`]. Primitives are placed at every pending
//! point (the point set is consumed by the placement) or, when no points are
//! pending, at the current sketch center.

use glam::{DVec2, DVec3};
use serde::{Deserialize, Serialize};

use crate::geom::{self, Curve2};

/// Named construction planes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlaneName {
    XY,
    YZ,
    XZ,
}

/// A plane in world space with an in-plane frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SketchPlane {
    pub name: PlaneName,
    pub origin: DVec3,
    pub x_dir: DVec3,
    pub y_dir: DVec3,
    pub normal: DVec3,
}

impl SketchPlane {
    /// One of the named planes through the world origin
    pub fn named(name: PlaneName) -> Self {
        let (x_dir, normal) = match name {
            PlaneName::XY => (DVec3::X, DVec3::Z),
            PlaneName::YZ => (DVec3::Y, DVec3::X),
            PlaneName::XZ => (DVec3::X, DVec3::NEG_Y),
        };
        Self {
            name,
            origin: DVec3::ZERO,
            x_dir,
            y_dir: normal.cross(x_dir),
            normal,
        }
    }

    pub fn xy() -> Self {
        Self::named(PlaneName::XY)
    }

    pub fn yz() -> Self {
        Self::named(PlaneName::YZ)
    }

    pub fn xz() -> Self {
        Self::named(PlaneName::XZ)
    }

    /// Shift the plane along its normal
    pub fn offset(mut self, distance: f64) -> Self {
        self.origin += self.normal * distance;
        self
    }

    /// Map plane-local coordinates to world space
    pub fn to_world(&self, local: DVec2) -> DVec3 {
        self.origin + self.x_dir * local.x + self.y_dir * local.y
    }

    /// Whether the plane is horizontal (normal along ±Z)
    pub fn is_horizontal(&self) -> bool {
        self.normal.z.abs() > 1.0 - 1e-12
    }
}

/// A closed (or not yet closed) planar wire in plane-local coordinates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Wire2D {
    Circle { center: DVec2, radius: f64 },
    Polygon { points: Vec<DVec2>, closed: bool },
}

impl Wire2D {
    /// Axis-aligned rectangle centered on `center`
    pub fn rectangle(center: DVec2, width: f64, height: f64) -> Self {
        let hw = width / 2.0;
        let hh = height / 2.0;
        Wire2D::Polygon {
            points: vec![
                center + DVec2::new(-hw, -hh),
                center + DVec2::new(hw, -hh),
                center + DVec2::new(hw, hh),
                center + DVec2::new(-hw, hh),
            ],
            closed: true,
        }
    }

    pub fn circle(center: DVec2, radius: f64) -> Self {
        Wire2D::Circle { center, radius }
    }

    pub fn is_closed(&self) -> bool {
        match self {
            Wire2D::Circle { .. } => true,
            Wire2D::Polygon { closed, .. } => *closed,
        }
    }

    /// Boundary curves of the wire
    pub fn curves(&self) -> Vec<Curve2> {
        match self {
            Wire2D::Circle { center, radius } => vec![Curve2::Circle {
                center: *center,
                radius: *radius,
            }],
            Wire2D::Polygon { points, closed } => {
                let n = points.len();
                let count = if *closed { n } else { n.saturating_sub(1) };
                (0..count)
                    .map(|i| Curve2::Segment {
                        a: points[i],
                        b: points[(i + 1) % n],
                    })
                    .collect()
            }
        }
    }

    /// Even-odd containment of a point in the region bounded by the wire
    pub fn contains(&self, p: DVec2) -> bool {
        match self {
            Wire2D::Circle { center, radius } => p.distance_squared(*center) < radius * radius,
            Wire2D::Polygon { points, .. } => geom::point_in_polygon(p, points),
        }
    }

    fn rotated_about(&self, pivot: DVec2, angle: f64) -> Self {
        match self {
            Wire2D::Circle { center, radius } => Wire2D::Circle {
                center: pivot + geom::rotate(*center - pivot, angle),
                radius: *radius,
            },
            Wire2D::Polygon { points, closed } => Wire2D::Polygon {
                points: points
                    .iter()
                    .map(|p| pivot + geom::rotate(*p - pivot, angle))
                    .collect(),
                closed: *closed,
            },
        }
    }
}

/// A wire with the feature tag it was created under
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaggedWire {
    pub wire: Wire2D,
    pub tag: Option<String>,
}

/// The wires of a finished sketch, ready for extrusion or sweeping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub plane: SketchPlane,
    pub wires: Vec<TaggedWire>,
}

impl Profile {
    /// Wire vertices (circle centers for circles) mapped to world space
    pub fn world_points(&self, wire: &Wire2D) -> Vec<DVec3> {
        match wire {
            Wire2D::Circle { center, .. } => vec![self.plane.to_world(*center)],
            Wire2D::Polygon { points, .. } => {
                points.iter().map(|p| self.plane.to_world(*p)).collect()
            }
        }
    }
}

/// Fluent sketch builder
///
/// ```
/// use coinholder_cad::sketch::{Sketch, SketchPlane};
///
/// let profile = Sketch::new(SketchPlane::xy())
///     .rect(50.0, 50.0)
///     .circle(23.0)
///     .tag("coin_bore")
///     .profile();
/// assert_eq!(profile.wires.len(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct Sketch {
    plane: SketchPlane,
    center: DVec2,
    pending: Vec<DVec2>,
    wires: Vec<TaggedWire>,
    /// Wires created by the last placement, with their anchor points
    last: Vec<(usize, DVec2)>,
}

impl Sketch {
    pub fn new(plane: SketchPlane) -> Self {
        Self {
            plane,
            center: DVec2::ZERO,
            pending: Vec::new(),
            wires: Vec::new(),
            last: Vec::new(),
        }
    }

    pub fn plane(&self) -> &SketchPlane {
        &self.plane
    }

    /// Shift the sketch center by `(x, y)` in plane coordinates
    pub fn center(mut self, x: f64, y: f64) -> Self {
        self.center += DVec2::new(x, y);
        self
    }

    /// Queue placement points, relative to the current center
    pub fn push_points(mut self, points: impl IntoIterator<Item = DVec2>) -> Self {
        let center = self.center;
        self.pending.extend(points.into_iter().map(|p| center + p));
        self
    }

    /// Construction rectangle: nothing is drawn, its vertices become the
    /// pending point set
    pub fn rect_vertices(mut self, width: f64, height: f64) -> Self {
        let anchors = self.take_anchors();
        let hw = width / 2.0;
        let hh = height / 2.0;
        for anchor in anchors {
            self.pending.extend([
                anchor + DVec2::new(-hw, -hh),
                anchor + DVec2::new(hw, -hh),
                anchor + DVec2::new(hw, hh),
                anchor + DVec2::new(-hw, hh),
            ]);
        }
        self
    }

    pub fn rect(self, width: f64, height: f64) -> Self {
        self.place(|anchor| Wire2D::rectangle(anchor, width, height))
    }

    pub fn circle(self, radius: f64) -> Self {
        self.place(|anchor| Wire2D::circle(anchor, radius))
    }

    /// Open polyline through points relative to each anchor; see [`Sketch::close`]
    pub fn polyline(self, points: &[DVec2]) -> Self {
        self.place(|anchor| Wire2D::Polygon {
            points: points.iter().map(|p| anchor + *p).collect(),
            closed: false,
        })
    }

    /// Close the polylines of the last placement
    pub fn close(mut self) -> Self {
        for &(index, _) in &self.last {
            if let Wire2D::Polygon { points, closed } = &mut self.wires[index].wire {
                if points.len() > 1 && points[0].distance(points[points.len() - 1]) < 1e-12 {
                    points.pop();
                }
                *closed = true;
            }
        }
        self
    }

    /// Rotate the wires of the last placement about their anchors (degrees,
    /// counter-clockwise)
    pub fn rotated(mut self, degrees: f64) -> Self {
        let angle = degrees.to_radians();
        for &(index, anchor) in &self.last {
            let wire = &mut self.wires[index];
            wire.wire = wire.wire.rotated_about(anchor, angle);
        }
        self
    }

    /// Tag the wires of the last placement
    pub fn tag(mut self, name: &str) -> Self {
        for &(index, _) in &self.last {
            self.wires[index].tag = Some(name.to_string());
        }
        self
    }

    pub fn profile(self) -> Profile {
        Profile {
            plane: self.plane,
            wires: self.wires,
        }
    }

    fn take_anchors(&mut self) -> Vec<DVec2> {
        if self.pending.is_empty() {
            vec![self.center]
        } else {
            std::mem::take(&mut self.pending)
        }
    }

    fn place(mut self, make: impl Fn(DVec2) -> Wire2D) -> Self {
        let anchors = self.take_anchors();
        self.last.clear();
        for anchor in anchors {
            self.last.push((self.wires.len(), anchor));
            self.wires.push(TaggedWire {
                wire: make(anchor),
                tag: None,
            });
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_named_planes() {
        let yz = SketchPlane::yz().offset(3.0);
        let p = yz.to_world(DVec2::new(1.0, 2.0));
        assert_relative_eq!(p.x, 3.0);
        assert_relative_eq!(p.y, 1.0);
        assert_relative_eq!(p.z, 2.0);

        let xz = SketchPlane::xz();
        assert_eq!(xz.y_dir, DVec3::Z);
        assert!(SketchPlane::xy().offset(2.0).is_horizontal());
        assert!(!xz.is_horizontal());
    }

    #[test]
    fn test_rect_vertices_feed_placement() {
        let profile = Sketch::new(SketchPlane::xy())
            .rect(10.0, 10.0)
            .rect_vertices(6.0, 6.0)
            .circle(0.5)
            .tag("hole")
            .circle(2.0)
            .profile();

        assert_eq!(profile.wires.len(), 6);
        let holes: Vec<_> = profile
            .wires
            .iter()
            .filter(|w| w.tag.as_deref() == Some("hole"))
            .collect();
        assert_eq!(holes.len(), 4);
        for hole in holes {
            let Wire2D::Circle { center, radius } = hole.wire else {
                panic!("expected circle");
            };
            assert_relative_eq!(center.x.abs(), 3.0);
            assert_relative_eq!(center.y.abs(), 3.0);
            assert_relative_eq!(radius, 0.5);
        }
        // Point set consumed: the last circle sits at the center
        assert_eq!(
            profile.wires[5].wire,
            Wire2D::Circle {
                center: DVec2::ZERO,
                radius: 2.0
            }
        );
    }

    #[test]
    fn test_polyline_close_and_center() {
        let profile = Sketch::new(SketchPlane::yz())
            .center(1.0, 4.0)
            .polyline(&[
                DVec2::ZERO,
                DVec2::new(0.4, -0.3),
                DVec2::new(0.0, -0.6),
                DVec2::ZERO,
            ])
            .close()
            .profile();

        let Wire2D::Polygon { points, closed } = &profile.wires[0].wire else {
            panic!("expected polygon");
        };
        assert!(*closed);
        assert_eq!(points.len(), 3);
        assert_eq!(points[0], DVec2::new(1.0, 4.0));
    }

    #[test]
    fn test_rotated_about_anchor() {
        let profile = Sketch::new(SketchPlane::xy())
            .push_points([DVec2::new(5.0, 5.0)])
            .rect(0.0, 2.0)
            .rotated(-90.0)
            .profile();

        let Wire2D::Polygon { points, .. } = &profile.wires[0].wire else {
            panic!("expected polygon");
        };
        // A vertical segment of length 2 turns horizontal about (5, 5)
        for p in points {
            assert_relative_eq!(p.y, 5.0, epsilon = 1e-12);
            assert_relative_eq!((p.x - 5.0).abs(), 1.0, epsilon = 1e-12);
        }
    }
}
