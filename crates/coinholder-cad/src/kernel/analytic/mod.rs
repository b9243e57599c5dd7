//! Analytic CAD kernel
//!
//! Pure Rust kernel for parts built from vertical extrusions, circular sweeps
//! and edge treatments. Solids are CSG trees evaluated exactly along vertical
//! lines, which is enough for point membership, edge discovery and volume.

mod edges;
mod intervals;
mod model;
mod treatment;

use std::collections::HashMap;
use std::sync::Arc;

use glam::{DVec2, DVec3};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use self::edges::{RawEdge, Section};
use self::model::{Loop, LoopShape, Node, Primitive, Prism, Revolved};
use self::treatment::{Treatment, TreatmentKind};
use super::{
    BooleanType, CadError, CadKernel, CadResult, EdgeId, EdgeInfo, Solid, SolidProperties,
};
use crate::geom::{self, DEGENERATE_TOLERANCE, TOUCH_TOLERANCE};
use crate::sketch::{Profile, SketchPlane, TaggedWire, Wire2D};

/// Tangent samples around a full circle when validating a treatment
const CIRCLE_CHECKS: usize = 16;

/// Tangent samples along an open edge when validating a treatment
const OPEN_EDGE_CHECKS: [f64; 5] = [0.0, 0.25, 0.5, 0.75, 1.0];

/// Numerical settings of the analytic kernel
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticKernelConfig {
    /// Grid cell used for volume integration (mm)
    pub volume_cell: f64,
    /// Radius of the probe circle used to inspect edges (mm)
    pub probe_radius: f64,
    /// Geometric matching tolerance (mm)
    pub tolerance: f64,
}

impl Default for AnalyticKernelConfig {
    fn default() -> Self {
        Self {
            volume_cell: 0.1,
            probe_radius: 1e-4,
            tolerance: 1e-6,
        }
    }
}

impl AnalyticKernelConfig {
    /// Replace every setting that is not a finite positive length with its default
    pub fn sanitized(self) -> Self {
        let defaults = Self::default();
        let pick = |name: &str, value: f64, fallback: f64| {
            if value.is_finite() && value > 0.0 {
                value
            } else {
                tracing::warn!("Invalid {name} {value}, using {fallback}");
                fallback
            }
        };
        Self {
            volume_cell: pick("volume cell", self.volume_cell, defaults.volume_cell),
            probe_radius: pick("probe radius", self.probe_radius, defaults.probe_radius),
            tolerance: pick("tolerance", self.tolerance, defaults.tolerance),
        }
    }
}

struct StoredSolid {
    node: Arc<Node>,
    /// Listed edges, computed on first request
    edges: Option<Arc<Vec<RawEdge>>>,
}

/// CSG kernel with analytic membership queries
pub struct AnalyticKernel {
    config: AnalyticKernelConfig,
    /// Storage for solid data (keyed by UUID)
    solids: Mutex<HashMap<Uuid, StoredSolid>>,
}

impl Default for AnalyticKernel {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalyticKernel {
    /// Create a kernel with default settings
    pub fn new() -> Self {
        Self::with_config(AnalyticKernelConfig::default())
    }

    pub fn with_config(config: AnalyticKernelConfig) -> Self {
        Self {
            config: config.sanitized(),
            solids: Mutex::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &AnalyticKernelConfig {
        &self.config
    }

    /// Number of solids currently held
    pub fn solid_count(&self) -> usize {
        self.solids.lock().len()
    }

    /// Store a solid and return a Solid reference
    fn store_solid(&self, node: Node) -> Solid {
        let id = Uuid::new_v4();
        self.solids.lock().insert(
            id,
            StoredSolid {
                node: Arc::new(node),
                edges: None,
            },
        );
        Solid::new(id)
    }

    fn node(&self, solid: &Solid) -> CadResult<Arc<Node>> {
        self.solids
            .lock()
            .get(&solid.id)
            .map(|stored| stored.node.clone())
            .ok_or(CadError::UnknownSolid(solid.id))
    }

    /// Edge list of a solid, cached so indices stay stable
    fn edges(&self, solid: &Solid) -> CadResult<Arc<Vec<RawEdge>>> {
        let node = {
            let solids = self.solids.lock();
            let stored = solids
                .get(&solid.id)
                .ok_or(CadError::UnknownSolid(solid.id))?;
            if let Some(edges) = &stored.edges {
                return Ok(edges.clone());
            }
            stored.node.clone()
        };

        let edges = Arc::new(self.list_edges(&node));
        tracing::debug!("Listed {} edges on solid {}", edges.len(), solid.id);
        if let Some(stored) = self.solids.lock().get_mut(&solid.id) {
            stored.edges = Some(edges.clone());
        }
        Ok(edges)
    }

    /// Sharp edges of the base model, with every treated edge replaced by the
    /// two curves bounding its treatment
    fn list_edges(&self, node: &Node) -> Vec<RawEdge> {
        let tolerance = self.config.tolerance;
        let mut edges = edges::sharp_edges(node, self.config.probe_radius, tolerance);

        let mut treatments = Vec::new();
        node.treatments(&mut treatments);
        for treatment in treatments {
            let mut next = Vec::with_capacity(edges.len() + 2);
            for edge in edges {
                if treatment.replaces(&edge.geom, tolerance) {
                    for geom in treatment.offsets(&edge.geom) {
                        next.push(RawEdge {
                            geom,
                            tag: edge.tag.clone(),
                        });
                    }
                } else {
                    next.push(edge);
                }
            }
            edges = next;
        }
        edges
    }

    fn treat(
        &self,
        solid: &Solid,
        edge_ids: &[EdgeId],
        size: f64,
        kind: TreatmentKind,
    ) -> CadResult<Solid> {
        let fail = |reason: String| match kind {
            TreatmentKind::Fillet => CadError::FilletFailed(reason),
            TreatmentKind::Chamfer => CadError::ChamferFailed(reason),
        };
        if !size.is_finite() || size <= 0.0 {
            return Err(fail(format!("size must be positive, got {size}")));
        }
        if edge_ids.is_empty() {
            return Err(fail("no edges selected".into()));
        }

        let node = self.node(solid)?;
        let listed = self.edges(solid)?;

        let mut indices: Vec<u32> = Vec::with_capacity(edge_ids.len());
        for id in edge_ids {
            if id.solid_id != solid.id || id.index as usize >= listed.len() {
                return Err(CadError::UnknownEdge {
                    solid_id: id.solid_id,
                    index: id.index,
                });
            }
            if !indices.contains(&id.index) {
                indices.push(id.index);
            }
        }

        let mut treatments = Vec::with_capacity(indices.len());
        for index in indices {
            let geom = listed[index as usize].geom;
            let wedge = match edges::classify(&node, &geom.frame_at(0.5), self.config.probe_radius) {
                Section::Sharp(wedge) => wedge,
                Section::Complex => {
                    return Err(fail(format!("more than two faces meet at edge {index}")));
                }
                Section::Smooth | Section::Uniform => {
                    return Err(fail(format!("edge {index} is not a sharp edge of the solid")));
                }
            };
            let treatment = Treatment::new(kind, size, geom, wedge)
                .map_err(|reason| fail(format!("edge {index}: {reason}")))?;
            self.check_tangency(&node, &treatment)
                .map_err(|reason| fail(format!("edge {index}: {reason}")))?;
            treatments.push(treatment);
        }
        treatment::check_shared_faces(&treatments).map_err(fail)?;

        tracing::debug!(
            "{:?} {} on {} edges of solid {}",
            kind,
            size,
            treatments.len(),
            solid.id
        );
        Ok(self.store_solid(Node::Treated {
            base: node,
            treatments,
        }))
    }

    /// Both faces next to the edge must extend past the treatment's tangent
    /// lines everywhere along the edge
    fn check_tangency(&self, node: &Node, treatment: &Treatment) -> Result<(), String> {
        let probe = self.config.probe_radius;
        let edge = treatment.edge();
        let samples: Vec<f64> = if edge.is_full_circle() {
            (0..CIRCLE_CHECKS)
                .map(|k| k as f64 / CIRCLE_CHECKS as f64)
                .collect()
        } else {
            OPEN_EDGE_CHECKS.to_vec()
        };

        for s in samples {
            let frame = edge.frame_at(s);
            for (point, inward) in treatment.tangent_points() {
                let inside = node.contains(frame.at(point + inward * probe), false);
                let outside = !node.contains(frame.at(point - inward * probe), false);
                if !(inside && outside) {
                    return Err(format!(
                        "{:?} of size {} runs past an adjacent face near {}",
                        treatment.kind(),
                        treatment.size(),
                        frame.at(point)
                    ));
                }
            }
        }
        Ok(())
    }
}

/// World XY loop of a wire on a horizontal plane
fn horizontal_loop(plane: &SketchPlane, wire: &TaggedWire) -> CadResult<Loop> {
    let shape = match &wire.wire {
        Wire2D::Circle { center, radius } => {
            if !radius.is_finite() || *radius <= DEGENERATE_TOLERANCE {
                return Err(CadError::InvalidProfile(format!(
                    "circle radius must be positive, got {radius}"
                )));
            }
            LoopShape::Circle {
                center: plane.to_world(*center).truncate(),
                radius: *radius,
            }
        }
        Wire2D::Polygon { points, closed } => {
            if !closed {
                return Err(CadError::InvalidProfile("wire is not closed".into()));
            }
            let points: Vec<DVec2> = points
                .iter()
                .map(|p| plane.to_world(*p).truncate())
                .collect();
            check_polygon(&points)?;
            LoopShape::Polygon(points)
        }
    };
    Ok(Loop {
        shape,
        tag: wire.tag.clone(),
    })
}

/// Reject degenerate or self-intersecting polygons
fn check_polygon(points: &[DVec2]) -> CadResult<()> {
    let n = points.len();
    if n < 3 {
        return Err(CadError::InvalidProfile(format!(
            "polygon needs at least 3 points, got {n}"
        )));
    }
    if geom::polygon_area(points).abs() < DEGENERATE_TOLERANCE {
        return Err(CadError::InvalidProfile("polygon has no area".into()));
    }
    for i in 0..n {
        let (a, b) = (points[i], points[(i + 1) % n]);
        if a.distance(b) < DEGENERATE_TOLERANCE {
            return Err(CadError::InvalidProfile(format!(
                "polygon has a zero-length side at {a}"
            )));
        }
        for j in (i + 2)..n {
            if i == 0 && j == n - 1 {
                continue;
            }
            let (c, d) = (points[j], points[(j + 1) % n]);
            if geom::segment_distance(a, b, c, d) < TOUCH_TOLERANCE {
                return Err(CadError::InvalidProfile(
                    "polygon intersects itself".into(),
                ));
            }
        }
    }
    Ok(())
}

/// Whether two loops cross or touch
fn loops_touch(a: &LoopShape, b: &LoopShape) -> bool {
    match (a, b) {
        (
            LoopShape::Circle {
                center: c1,
                radius: r1,
            },
            LoopShape::Circle {
                center: c2,
                radius: r2,
            },
        ) => {
            let d = c1.distance(*c2);
            d <= r1 + r2 + TOUCH_TOLERANCE && d >= (r1 - r2).abs() - TOUCH_TOLERANCE
        }
        (LoopShape::Circle { center, radius }, LoopShape::Polygon(points))
        | (LoopShape::Polygon(points), LoopShape::Circle { center, radius }) => {
            let n = points.len();
            (0..n).any(|i| {
                let (p, q) = (points[i], points[(i + 1) % n]);
                let near = geom::point_segment_distance(*center, p, q);
                let far = center.distance(p).max(center.distance(q));
                near <= radius + TOUCH_TOLERANCE && far >= radius - TOUCH_TOLERANCE
            })
        }
        (LoopShape::Polygon(a), LoopShape::Polygon(b)) => {
            let (n, m) = (a.len(), b.len());
            (0..n).any(|i| {
                (0..m).any(|j| {
                    geom::segment_distance(a[i], a[(i + 1) % n], b[j], b[(j + 1) % m])
                        < TOUCH_TOLERANCE
                })
            })
        }
    }
}

impl CadKernel for AnalyticKernel {
    fn name(&self) -> &str {
        "analytic"
    }

    fn extrude(&self, profile: &Profile, distance: f64) -> CadResult<Solid> {
        if !distance.is_finite() || distance.abs() < DEGENERATE_TOLERANCE {
            return Err(CadError::InvalidProfile(format!(
                "extrusion distance must be non-zero, got {distance}"
            )));
        }
        if !profile.plane.is_horizontal() {
            return Err(CadError::Unsupported(format!(
                "extrusion from the {:?} plane",
                profile.plane.name
            )));
        }
        if profile.wires.is_empty() {
            return Err(CadError::InvalidProfile("profile has no wires".into()));
        }

        let loops = profile
            .wires
            .iter()
            .map(|wire| horizontal_loop(&profile.plane, wire))
            .collect::<CadResult<Vec<_>>>()?;
        for (i, a) in loops.iter().enumerate() {
            for b in &loops[i + 1..] {
                if loops_touch(&a.shape, &b.shape) {
                    return Err(CadError::InvalidProfile(format!(
                        "wires {:?} and {:?} cross or touch",
                        a.tag, b.tag
                    )));
                }
            }
        }

        let z0 = profile.plane.origin.z;
        let z1 = z0 + distance * profile.plane.normal.z;
        tracing::debug!(
            "Extruding {} wires from z={} to z={}",
            loops.len(),
            z0,
            z1
        );
        Ok(self.store_solid(Node::Leaf(Primitive::Prism(Prism::new(loops, z0, z1)))))
    }

    fn boolean(&self, a: &Solid, b: &Solid, op: BooleanType) -> CadResult<Solid> {
        let node_a = self.node(a)?;
        let node_b = self.node(b)?;
        tracing::debug!("Boolean {:?}: {} with {}", op, a.id, b.id);
        Ok(self.store_solid(Node::Boolean {
            op,
            a: node_a,
            b: node_b,
        }))
    }

    fn sweep(&self, profile: &Profile, path: &Profile) -> CadResult<Solid> {
        let tolerance = self.config.tolerance;

        let [path_wire] = path.wires.as_slice() else {
            return Err(CadError::SweepFailed(format!(
                "path must be a single wire, got {}",
                path.wires.len()
            )));
        };
        let Wire2D::Circle { center, radius } = path_wire.wire else {
            return Err(CadError::Unsupported("sweep along a non-circular path".into()));
        };
        if !path.plane.is_horizontal() {
            return Err(CadError::Unsupported("sweep path off a horizontal plane".into()));
        }
        let axis = path.plane.to_world(center);

        let [section_wire] = profile.wires.as_slice() else {
            return Err(CadError::SweepFailed(format!(
                "section must be a single wire, got {}",
                profile.wires.len()
            )));
        };
        let Wire2D::Polygon { points, closed } = &section_wire.wire else {
            return Err(CadError::Unsupported("circular sweep section".into()));
        };
        if !closed {
            return Err(CadError::SweepFailed("section wire is not closed".into()));
        }
        let plane = &profile.plane;
        if plane.normal.z.abs() > tolerance {
            return Err(CadError::SweepFailed("section plane must be vertical".into()));
        }
        if (axis - plane.origin).dot(plane.normal).abs() > tolerance {
            return Err(CadError::SweepFailed(
                "section plane does not contain the path axis".into(),
            ));
        }

        let horizontal = DVec3::Z.cross(plane.normal).normalize();
        let world: Vec<DVec3> = points.iter().map(|p| plane.to_world(*p)).collect();
        let offsets: Vec<f64> = world.iter().map(|p| (*p - axis).dot(horizontal)).collect();

        let first = world.first().copied().unwrap_or(axis);
        let first_offset = offsets.first().copied().unwrap_or(0.0);
        if (first_offset.abs() - radius).abs() > tolerance || (first.z - axis.z).abs() > tolerance {
            return Err(CadError::SweepFailed(
                "section does not start on the path".into(),
            ));
        }
        let one_side = offsets.iter().all(|s| *s >= -tolerance) || offsets.iter().all(|s| *s <= tolerance);
        if !one_side {
            return Err(CadError::SweepFailed(
                "section crosses the sweep axis".into(),
            ));
        }

        let section: Vec<DVec2> = offsets
            .iter()
            .zip(&world)
            .map(|(s, p)| DVec2::new(s.abs(), p.z))
            .collect();
        check_polygon(&section).map_err(|e| CadError::SweepFailed(e.to_string()))?;

        tracing::debug!(
            "Sweeping {} point section around ({}, {})",
            section.len(),
            axis.x,
            axis.y
        );
        Ok(self.store_solid(Node::Leaf(Primitive::Revolved(Revolved::new(
            axis.truncate(),
            section,
            section_wire.tag.clone(),
        )))))
    }

    fn get_edges(&self, solid: &Solid) -> CadResult<Vec<EdgeInfo>> {
        let edges = self.edges(solid)?;
        Ok(edges
            .iter()
            .enumerate()
            .map(|(index, edge)| {
                edge.geom
                    .info(EdgeId::new(solid.id, index as u32), edge.tag.clone())
            })
            .collect())
    }

    fn fillet(&self, solid: &Solid, edges: &[EdgeId], radius: f64) -> CadResult<Solid> {
        self.treat(solid, edges, radius, TreatmentKind::Fillet)
    }

    fn chamfer(&self, solid: &Solid, edges: &[EdgeId], distance: f64) -> CadResult<Solid> {
        self.treat(solid, edges, distance, TreatmentKind::Chamfer)
    }

    fn measure(&self, solid: &Solid) -> CadResult<SolidProperties> {
        let node = self.node(solid)?;
        let (bbox_min, bbox_max) = node.bounds().unwrap_or((DVec3::ZERO, DVec3::ZERO));
        Ok(SolidProperties {
            bbox_min,
            bbox_max,
            volume: node.volume(self.config.volume_cell),
        })
    }

    fn contains_point(&self, solid: &Solid, point: DVec3) -> CadResult<bool> {
        Ok(self.node(solid)?.contains(point, true))
    }

    fn release(&self, solid: &Solid) {
        self.solids.lock().remove(&solid.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sketch::Sketch;
    use approx::assert_relative_eq;
    use std::f64::consts::PI;

    fn kernel() -> AnalyticKernel {
        AnalyticKernel::with_config(AnalyticKernelConfig {
            volume_cell: 0.05,
            ..Default::default()
        })
    }

    fn plate_with_bore(kernel: &AnalyticKernel) -> Solid {
        let profile = Sketch::new(SketchPlane::xy())
            .rect(10.0, 10.0)
            .circle(2.0)
            .tag("bore")
            .profile();
        kernel.extrude(&profile, 1.0).unwrap()
    }

    #[test]
    fn test_extrude_and_measure() {
        let kernel = kernel();
        let plate = plate_with_bore(&kernel);
        let props = kernel.measure(&plate).unwrap();
        assert_eq!(props.bbox_min, DVec3::new(-5.0, -5.0, 0.0));
        assert_eq!(props.bbox_max, DVec3::new(5.0, 5.0, 1.0));
        assert_relative_eq!(props.volume, 100.0 - 4.0 * PI, max_relative = 2e-3);

        assert!(kernel.contains_point(&plate, DVec3::new(3.0, 0.0, 0.5)).unwrap());
        assert!(!kernel.contains_point(&plate, DVec3::new(1.0, 0.0, 0.5)).unwrap());
    }

    #[test]
    fn test_degenerate_config_falls_back_to_defaults() {
        let defaults = AnalyticKernelConfig::default();
        let kernel = AnalyticKernel::with_config(AnalyticKernelConfig {
            volume_cell: 0.0,
            probe_radius: f64::NAN,
            tolerance: -1.0,
        });
        assert_eq!(*kernel.config(), defaults);

        let kernel = AnalyticKernel::with_config(AnalyticKernelConfig {
            volume_cell: f64::INFINITY,
            ..defaults
        });
        assert_eq!(kernel.config().volume_cell, defaults.volume_cell);
        let plate = plate_with_bore(&kernel);
        let props = kernel.measure(&plate).unwrap();
        assert_relative_eq!(props.volume, 100.0 - 4.0 * PI, max_relative = 1e-2);
    }

    #[test]
    fn test_extrude_rejects_bad_input() {
        let kernel = kernel();
        let crossing = Sketch::new(SketchPlane::xy())
            .rect(4.0, 4.0)
            .circle(2.5)
            .profile();
        assert!(matches!(
            kernel.extrude(&crossing, 1.0),
            Err(CadError::InvalidProfile(_))
        ));

        let square = Sketch::new(SketchPlane::xy()).rect(4.0, 4.0).profile();
        assert!(matches!(
            kernel.extrude(&square, 0.0),
            Err(CadError::InvalidProfile(_))
        ));

        let upright = Sketch::new(SketchPlane::xz()).rect(4.0, 4.0).profile();
        assert!(matches!(
            kernel.extrude(&upright, 1.0),
            Err(CadError::Unsupported(_))
        ));
    }

    #[test]
    fn test_negative_extrusion_goes_down() {
        let kernel = kernel();
        let profile = Sketch::new(SketchPlane::xy().offset(3.0))
            .circle(1.0)
            .profile();
        let disc = kernel.extrude(&profile, -1.0).unwrap();
        let props = kernel.measure(&disc).unwrap();
        assert_relative_eq!(props.bbox_min.z, 2.0);
        assert_relative_eq!(props.bbox_max.z, 3.0);
    }

    #[test]
    fn test_sweep_ring() {
        let kernel = kernel();
        let section = Sketch::new(SketchPlane::yz())
            .center(1.0, 2.0)
            .polyline(&[
                DVec2::new(0.0, 0.0),
                DVec2::new(0.5, -0.5),
                DVec2::new(0.0, -1.0),
            ])
            .close()
            .profile();
        let path = Sketch::new(SketchPlane::xy().offset(2.0))
            .circle(1.0)
            .profile();
        let ring = kernel.sweep(&section, &path).unwrap();

        assert!(kernel.contains_point(&ring, DVec3::new(0.0, 1.2, 1.5)).unwrap());
        assert!(kernel.contains_point(&ring, DVec3::new(-1.2, 0.0, 1.5)).unwrap());
        assert!(!kernel.contains_point(&ring, DVec3::new(0.0, 0.9, 1.5)).unwrap());

        // Triangle area 0.25 at centroid radius 1 + 1/6
        let expected = 2.0 * PI * (7.0 / 6.0) * 0.25;
        let volume = kernel.measure(&ring).unwrap().volume;
        assert_relative_eq!(volume, expected, max_relative = 1e-2);
    }

    #[test]
    fn test_sweep_rejects_offset_section() {
        let kernel = kernel();
        let section = Sketch::new(SketchPlane::yz())
            .center(1.3, 2.0)
            .polyline(&[DVec2::new(0.0, 0.0), DVec2::new(0.5, -0.5), DVec2::new(0.0, -1.0)])
            .close()
            .profile();
        let path = Sketch::new(SketchPlane::xy().offset(2.0))
            .circle(1.0)
            .profile();
        assert!(matches!(
            kernel.sweep(&section, &path),
            Err(CadError::SweepFailed(_))
        ));
    }

    #[test]
    fn test_edges_are_stable_and_tagged() {
        let kernel = kernel();
        let plate = plate_with_bore(&kernel);
        let first = kernel.get_edges(&plate).unwrap();
        let second = kernel.get_edges(&plate).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 14);

        let bore: Vec<_> = first
            .iter()
            .filter(|e| e.tag.as_deref() == Some("bore"))
            .collect();
        assert_eq!(bore.len(), 2);
        assert!(bore.iter().all(|e| e.is_full_circle() && e.radius() == Some(2.0)));
    }

    #[test]
    fn test_chamfer_replaces_edge_with_two_circles() {
        let kernel = kernel();
        let plate = plate_with_bore(&kernel);
        let top = kernel
            .get_edges(&plate)
            .unwrap()
            .into_iter()
            .find(|e| e.tag.as_deref() == Some("bore") && e.centroid.z == 1.0)
            .unwrap();
        let chamfered = kernel.chamfer(&plate, &[top.id], 0.5).unwrap();

        assert!(!kernel.contains_point(&chamfered, DVec3::new(2.2, 0.0, 0.8)).unwrap());
        assert!(kernel.contains_point(&chamfered, DVec3::new(2.2, 0.0, 0.6)).unwrap());

        let edges = kernel.get_edges(&chamfered).unwrap();
        assert_eq!(edges.len(), 15);
        let mut radii: Vec<f64> = edges
            .iter()
            .filter(|e| e.tag.as_deref() == Some("bore"))
            .filter_map(|e| e.radius())
            .collect();
        radii.sort_by(f64::total_cmp);
        assert_eq!(radii.len(), 3);
        assert_relative_eq!(radii[2], 2.5, epsilon = 1e-6);

        let removed = 2.0 * PI * (2.0 + 0.5 / 3.0) * 0.125;
        let volume = kernel.measure(&chamfered).unwrap().volume;
        assert_relative_eq!(volume, 100.0 - 4.0 * PI - removed, max_relative = 2e-3);
    }

    #[test]
    fn test_fillet_too_large_fails() {
        let kernel = kernel();
        let plate = plate_with_bore(&kernel);
        let edges = kernel.get_edges(&plate).unwrap();
        let top = edges
            .iter()
            .find(|e| e.tag.as_deref() == Some("bore") && e.centroid.z == 1.0)
            .unwrap();
        assert!(matches!(
            kernel.fillet(&plate, &[top.id], 1.5),
            Err(CadError::FilletFailed(_))
        ));

        // Both rims at 0.6 would meet in the middle of a 1.0 wall
        let rims: Vec<EdgeId> = edges
            .iter()
            .filter(|e| e.tag.as_deref() == Some("bore"))
            .map(|e| e.id)
            .collect();
        assert!(kernel.fillet(&plate, &rims, 0.6).is_err());
        assert!(kernel.fillet(&plate, &rims, 0.4).is_ok());
    }

    #[test]
    fn test_unknown_handles() {
        let kernel = kernel();
        let plate = plate_with_bore(&kernel);
        let bogus = EdgeId::new(plate.id, 999);
        assert!(matches!(
            kernel.fillet(&plate, &[bogus], 0.1),
            Err(CadError::UnknownEdge { index: 999, .. })
        ));

        kernel.release(&plate);
        assert_eq!(kernel.solid_count(), 0);
        assert!(matches!(
            kernel.measure(&plate),
            Err(CadError::UnknownSolid(_))
        ));
    }
}
