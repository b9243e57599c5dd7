//! Edge enumeration for the analytic kernel
//!
//! Candidate curves are the traces of every primitive boundary at every
//! height where some primitive starts or ends, plus vertical lines through
//! polygon corners and wall crossings. A candidate is an edge when the
//! material around it, seen in the plane perpendicular to the curve, forms a
//! sharp wedge bounded by exactly two faces.

use std::f64::consts::{PI, TAU};

use glam::{DVec2, DVec3};

use super::model::{Node, Primitive};
use crate::geom::{self, Curve2};
use crate::kernel::{EdgeCurve, EdgeId, EdgeInfo};

/// Angular samples taken around a candidate point
const WEDGE_SAMPLES: usize = 72;

/// Bisection steps used to locate a face direction between two samples
const BISECTION_STEPS: usize = 40;

/// Deviation from a straight angle below which two faces count as one (rad)
const SMOOTH_TOLERANCE: f64 = 1e-3;

/// Curve parameters at which a candidate must show a sharp wedge
const EDGE_SAMPLES: [f64; 5] = [0.1, 0.3, 0.5, 0.7, 0.9];

/// Edge curve in world space. Only horizontal arcs and segments and vertical
/// segments occur.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum EdgeGeom {
    /// Arc around a vertical axis at height `z`, counter-clockwise from `start`
    Arc {
        center: DVec2,
        radius: f64,
        z: f64,
        start: f64,
        sweep: f64,
    },
    Horizontal {
        a: DVec3,
        b: DVec3,
    },
    Vertical {
        xy: DVec2,
        z0: f64,
        z1: f64,
    },
}

/// Orthonormal frame of the plane perpendicular to an edge at one point
#[derive(Debug, Clone, Copy)]
pub(crate) struct Frame {
    pub origin: DVec3,
    pub u: DVec3,
    pub v: DVec3,
}

impl Frame {
    pub fn at(&self, local: DVec2) -> DVec3 {
        self.origin + self.u * local.x + self.v * local.y
    }
}

pub(crate) fn angle_in_span(angle: f64, start: f64, sweep: f64) -> bool {
    sweep >= TAU - 1e-12 || (angle - start).rem_euclid(TAU) <= sweep + 1e-12
}

impl EdgeGeom {
    fn horizontal_normal(a: DVec3, b: DVec3) -> DVec2 {
        (b - a).truncate().normalize().perp()
    }

    pub fn is_full_circle(&self) -> bool {
        matches!(self, EdgeGeom::Arc { sweep, .. } if *sweep >= TAU - 1e-12)
    }

    /// Cross-section frame at curve parameter `s ∈ [0, 1]`.
    ///
    /// Arcs use (radial, Z), horizontal segments (left normal, Z) and
    /// vertical segments (X, Y).
    pub fn frame_at(&self, s: f64) -> Frame {
        match *self {
            EdgeGeom::Arc {
                center,
                radius,
                z,
                start,
                sweep,
            } => {
                let dir = DVec2::from_angle(start + s * sweep);
                Frame {
                    origin: (center + dir * radius).extend(z),
                    u: dir.extend(0.0),
                    v: DVec3::Z,
                }
            }
            EdgeGeom::Horizontal { a, b } => Frame {
                origin: a.lerp(b, s),
                u: Self::horizontal_normal(a, b).extend(0.0),
                v: DVec3::Z,
            },
            EdgeGeom::Vertical { xy, z0, z1 } => Frame {
                origin: xy.extend(z0 + s * (z1 - z0)),
                u: DVec3::X,
                v: DVec3::Y,
            },
        }
    }

    pub fn midpoint(&self) -> DVec3 {
        self.frame_at(0.5).origin
    }

    /// The same curve moved by `shift` in its cross-section frame
    pub fn offset(&self, shift: DVec2) -> EdgeGeom {
        match *self {
            EdgeGeom::Arc {
                center,
                radius,
                z,
                start,
                sweep,
            } => EdgeGeom::Arc {
                center,
                radius: radius + shift.x,
                z: z + shift.y,
                start,
                sweep,
            },
            EdgeGeom::Horizontal { a, b } => {
                let delta = (Self::horizontal_normal(a, b) * shift.x).extend(shift.y);
                EdgeGeom::Horizontal {
                    a: a + delta,
                    b: b + delta,
                }
            }
            EdgeGeom::Vertical { xy, z0, z1 } => EdgeGeom::Vertical {
                xy: xy + shift,
                z0,
                z1,
            },
        }
    }

    /// Whether both curves lie on the same circle or line
    pub fn same_carrier(&self, other: &EdgeGeom, tolerance: f64) -> bool {
        match (*self, *other) {
            (
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
            ) => {
                c1.distance(c2) < tolerance
                    && (r1 - r2).abs() < tolerance
                    && (z1 - z2).abs() < tolerance
            }
            (EdgeGeom::Horizontal { a, b }, EdgeGeom::Horizontal { a: c, b: d }) => {
                if (a.z - c.z).abs() > tolerance {
                    return false;
                }
                let n = Self::horizontal_normal(a, b);
                (c - a).truncate().dot(n).abs() < tolerance
                    && (d - a).truncate().dot(n).abs() < tolerance
            }
            (EdgeGeom::Vertical { xy: p, .. }, EdgeGeom::Vertical { xy: q, .. }) => {
                p.distance(q) < tolerance
            }
            _ => false,
        }
    }

    /// Whether a point on the carrier falls within this curve's span
    pub fn covers(&self, point: DVec3, tolerance: f64) -> bool {
        match *self {
            EdgeGeom::Arc {
                center,
                start,
                sweep,
                ..
            } => {
                let v = point.truncate() - center;
                angle_in_span(geom::normalize_angle(v.y.atan2(v.x)), start, sweep)
            }
            EdgeGeom::Horizontal { a, b } => {
                let d = (b - a).truncate();
                let s = (point - a).truncate().dot(d.normalize());
                s >= -tolerance && s <= d.length() + tolerance
            }
            EdgeGeom::Vertical { z0, z1, .. } => {
                point.z >= z0.min(z1) - tolerance && point.z <= z0.max(z1) + tolerance
            }
        }
    }

    pub fn xy_bounds(&self) -> (DVec2, DVec2) {
        match *self {
            EdgeGeom::Arc { center, radius, .. } => {
                (center - DVec2::splat(radius), center + DVec2::splat(radius))
            }
            EdgeGeom::Horizontal { a, b } => (a.truncate().min(b.truncate()), a.truncate().max(b.truncate())),
            EdgeGeom::Vertical { xy, .. } => (xy, xy),
        }
    }

    /// Join with the piece that follows it on the same carrier
    fn join(&self, next: &EdgeGeom) -> EdgeGeom {
        match (*self, *next) {
            (
                EdgeGeom::Arc {
                    center,
                    radius,
                    z,
                    start,
                    sweep,
                },
                EdgeGeom::Arc { sweep: more, .. },
            ) => EdgeGeom::Arc {
                center,
                radius,
                z,
                start,
                sweep: (sweep + more).min(TAU),
            },
            (EdgeGeom::Horizontal { a, .. }, EdgeGeom::Horizontal { b, .. }) => {
                EdgeGeom::Horizontal { a, b }
            }
            (EdgeGeom::Vertical { xy, z0, .. }, EdgeGeom::Vertical { z1, .. }) => {
                EdgeGeom::Vertical { xy, z0, z1 }
            }
            _ => *self,
        }
    }

    fn same_piece(&self, other: &EdgeGeom, tolerance: f64) -> bool {
        if !self.same_carrier(other, tolerance) {
            return false;
        }
        match (*self, *other) {
            (
                EdgeGeom::Arc {
                    start: s1,
                    sweep: w1,
                    ..
                },
                EdgeGeom::Arc {
                    start: s2,
                    sweep: w2,
                    ..
                },
            ) => {
                (w1 - w2).abs() < tolerance
                    && (w1 >= TAU - 1e-12 || (s1 - s2).rem_euclid(TAU) < tolerance)
            }
            (EdgeGeom::Horizontal { a, b }, EdgeGeom::Horizontal { a: c, b: d }) => {
                (a.distance(c) < tolerance && b.distance(d) < tolerance)
                    || (a.distance(d) < tolerance && b.distance(c) < tolerance)
            }
            (EdgeGeom::Vertical { z0, z1, .. }, EdgeGeom::Vertical { z0: w0, z1: w1, .. }) => {
                (z0 - w0).abs() < tolerance && (z1 - w1).abs() < tolerance
            }
            _ => false,
        }
    }

    /// Public description of the edge
    pub fn info(&self, id: EdgeId, tag: Option<String>) -> EdgeInfo {
        match *self {
            EdgeGeom::Arc {
                center,
                radius,
                z,
                start,
                sweep,
            } => {
                let at = |angle: f64| (center + DVec2::from_angle(angle) * radius).extend(z);
                let full = self.is_full_circle();
                let centroid = if full {
                    center.extend(z)
                } else {
                    let half = sweep / 2.0;
                    let reach = radius * half.sin() / half;
                    (center + DVec2::from_angle(start + half) * reach).extend(z)
                };

                let mut points = vec![at(start), at(start + sweep)];
                for k in 0..4 {
                    let angle = k as f64 * PI / 2.0;
                    if angle_in_span(angle, start, sweep) {
                        points.push(at(angle));
                    }
                }
                let bbox_min = points.iter().fold(DVec3::INFINITY, |m, p| m.min(*p));
                let bbox_max = points.iter().fold(DVec3::NEG_INFINITY, |m, p| m.max(*p));

                EdgeInfo {
                    id,
                    curve: EdgeCurve::Arc {
                        center: center.extend(z),
                        axis: DVec3::Z,
                        radius,
                        start_angle: start,
                        sweep,
                    },
                    start: at(start),
                    end: if full { at(start) } else { at(start + sweep) },
                    centroid,
                    length: radius * sweep,
                    bbox_min,
                    bbox_max,
                    tag,
                }
            }
            EdgeGeom::Horizontal { a, b } => line_info(id, a, b, tag),
            EdgeGeom::Vertical { xy, z0, z1 } => line_info(id, xy.extend(z0), xy.extend(z1), tag),
        }
    }
}

fn line_info(id: EdgeId, a: DVec3, b: DVec3, tag: Option<String>) -> EdgeInfo {
    EdgeInfo {
        id,
        curve: EdgeCurve::Line,
        start: a,
        end: b,
        centroid: (a + b) / 2.0,
        length: a.distance(b),
        bbox_min: a.min(b),
        bbox_max: a.max(b),
        tag,
    }
}

/// Material wedge around an edge point, in the edge cross-section frame.
///
/// Material lies counter-clockwise from `u1` to `u2`; `alpha` is its opening.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Wedge {
    pub u1: DVec2,
    pub u2: DVec2,
    pub alpha: f64,
}

impl Wedge {
    pub fn is_convex(&self) -> bool {
        self.alpha < PI
    }
}

/// Local shape of the material around a point
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Section {
    /// Entirely inside or entirely outside
    Uniform,
    /// On a single face
    Smooth,
    Sharp(Wedge),
    /// More than two faces meet
    Complex,
}

/// Probe the sharp model on a small circle around `frame.origin`
pub(crate) fn classify(node: &Node, frame: &Frame, probe: f64) -> Section {
    let inside = |theta: f64| node.contains(frame.at(DVec2::from_angle(theta) * probe), false);
    let step = TAU / WEDGE_SAMPLES as f64;
    let states: Vec<bool> = (0..WEDGE_SAMPLES)
        .map(|k| inside((k as f64 + 0.5) * step))
        .collect();

    let mut enter = Vec::new();
    let mut leave = Vec::new();
    for k in 0..WEDGE_SAMPLES {
        let before = states[k];
        if before == states[(k + 1) % WEDGE_SAMPLES] {
            continue;
        }
        let mut lo = (k as f64 + 0.5) * step;
        let mut hi = lo + step;
        for _ in 0..BISECTION_STEPS {
            let mid = 0.5 * (lo + hi);
            if inside(mid) == before {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        let angle = 0.5 * (lo + hi);
        if before {
            leave.push(angle);
        } else {
            enter.push(angle);
        }
    }

    match (enter.as_slice(), leave.as_slice()) {
        ([], []) => Section::Uniform,
        ([enter], [leave]) => {
            let alpha = (leave - enter).rem_euclid(TAU);
            if (alpha - PI).abs() < SMOOTH_TOLERANCE {
                Section::Smooth
            } else {
                Section::Sharp(Wedge {
                    u1: DVec2::from_angle(*enter),
                    u2: DVec2::from_angle(*leave),
                    alpha,
                })
            }
        }
        _ => Section::Complex,
    }
}

fn is_sharp(node: &Node, geom: &EdgeGeom, probe: f64) -> bool {
    EDGE_SAMPLES
        .iter()
        .all(|&s| matches!(classify(node, &geom.frame_at(s), probe), Section::Sharp(_)))
}

/// An edge of the sharp model
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct RawEdge {
    pub geom: EdgeGeom,
    pub tag: Option<String>,
}

struct Trace {
    curve: Curve2,
    tag: Option<String>,
}

/// Heights at which some primitive starts, ends or has a section vertex
fn z_levels(primitives: &[&Primitive], tolerance: f64) -> Vec<f64> {
    let mut levels: Vec<f64> = primitives
        .iter()
        .flat_map(|p| match p {
            Primitive::Prism(prism) => vec![prism.z0, prism.z1],
            Primitive::Revolved(rev) => rev.section.iter().map(|v| v.y).collect(),
        })
        .collect();
    levels.sort_by(f64::total_cmp);
    levels.dedup_by(|a, b| (*a - *b).abs() < tolerance);
    levels
}

/// Boundary traces of every primitive on the plane at height `z`
fn traces_at(primitives: &[&Primitive], z: f64, tolerance: f64) -> Vec<Trace> {
    let mut traces: Vec<Trace> = Vec::new();
    let mut push = |curve: Curve2, tag: &Option<String>| {
        if !traces.iter().any(|t| t.curve.coincides(&curve)) {
            traces.push(Trace {
                curve,
                tag: tag.clone(),
            });
        }
    };

    for primitive in primitives {
        match primitive {
            Primitive::Prism(prism) => {
                if z < prism.z0 - tolerance || z > prism.z1 + tolerance {
                    continue;
                }
                for l in &prism.loops {
                    for curve in l.shape.curves() {
                        push(curve, &l.tag);
                    }
                }
            }
            Primitive::Revolved(rev) => {
                let (lo, hi) = rev.z_range();
                if z < lo - tolerance || z > hi + tolerance {
                    continue;
                }
                for radius in rev.radii_at(z, tolerance) {
                    push(
                        Curve2::Circle {
                            center: rev.axis,
                            radius,
                        },
                        &rev.tag,
                    );
                }
            }
        }
    }
    traces
}

/// Split a trace at the given points into pieces at height `z`
fn split_trace(curve: &Curve2, cuts: &[DVec2], z: f64) -> Vec<EdgeGeom> {
    let mut params: Vec<f64> = cuts.iter().map(|p| curve.param_of(*p)).collect();
    params.sort_by(f64::total_cmp);
    params.dedup_by(|a, b| (*a - *b).abs() < 1e-9);

    match *curve {
        Curve2::Segment { a, b } => {
            let mut bounds = vec![0.0];
            bounds.extend(params.into_iter().filter(|t| *t > 1e-9 && *t < 1.0 - 1e-9));
            bounds.push(1.0);
            bounds
                .windows(2)
                .map(|w| EdgeGeom::Horizontal {
                    a: a.lerp(b, w[0]).extend(z),
                    b: a.lerp(b, w[1]).extend(z),
                })
                .collect()
        }
        Curve2::Circle { center, radius } => {
            if params.len() > 1 && params[0] + TAU - params[params.len() - 1] < 1e-9 {
                params.pop();
            }
            if params.is_empty() {
                return vec![EdgeGeom::Arc {
                    center,
                    radius,
                    z,
                    start: 0.0,
                    sweep: TAU,
                }];
            }
            let n = params.len();
            (0..n)
                .map(|i| {
                    let start = params[i];
                    let end = if i + 1 < n { params[i + 1] } else { params[0] + TAU };
                    EdgeGeom::Arc {
                        center,
                        radius,
                        z,
                        start,
                        sweep: end - start,
                    }
                })
                .collect()
        }
    }
}

/// Join consecutive kept pieces; `cyclic` pieces wrap around
fn merge_runs(pieces: Vec<(EdgeGeom, bool)>, cyclic: bool) -> Vec<EdgeGeom> {
    if pieces.is_empty() {
        return Vec::new();
    }
    if cyclic && pieces.iter().all(|(_, kept)| *kept) {
        let merged = pieces[1..]
            .iter()
            .fold(pieces[0].0, |acc, (piece, _)| acc.join(piece));
        return vec![merged];
    }

    // Start a cyclic walk right after a dropped piece so no run is cut in two
    let n = pieces.len();
    let offset = if cyclic {
        pieces
            .iter()
            .position(|(_, kept)| !kept)
            .map_or(0, |i| (i + 1) % n)
    } else {
        0
    };

    let mut runs = Vec::new();
    let mut current: Option<EdgeGeom> = None;
    for k in 0..n {
        let (piece, kept) = pieces[(k + offset) % n];
        if kept {
            current = Some(match current {
                Some(run) => run.join(&piece),
                None => piece,
            });
        } else if let Some(run) = current.take() {
            runs.push(run);
        }
    }
    runs.extend(current);
    runs
}

/// Points where vertical walls meet: polygon corners and wall crossings
fn corner_points(primitives: &[&Primitive], tolerance: f64) -> Vec<(DVec2, Option<String>)> {
    let mut walls: Vec<(Curve2, Option<String>, f64, f64)> = Vec::new();
    let mut points: Vec<(DVec2, Option<String>)> = Vec::new();
    let push_point = |points: &mut Vec<(DVec2, Option<String>)>, p: DVec2, tag: &Option<String>| {
        if points.iter().all(|(q, _)| q.distance(p) > tolerance) {
            points.push((p, tag.clone()));
        }
    };

    for primitive in primitives {
        match primitive {
            Primitive::Prism(prism) => {
                for l in &prism.loops {
                    if let super::model::LoopShape::Polygon(vertices) = &l.shape {
                        for v in vertices {
                            push_point(&mut points, *v, &l.tag);
                        }
                    }
                    for curve in l.shape.curves() {
                        walls.push((curve, l.tag.clone(), prism.z0, prism.z1));
                    }
                }
            }
            Primitive::Revolved(rev) => {
                for (a, b) in rev.section_edges() {
                    if (a.x - b.x).abs() < tolerance && a.x > tolerance {
                        walls.push((
                            Curve2::Circle {
                                center: rev.axis,
                                radius: a.x,
                            },
                            rev.tag.clone(),
                            a.y.min(b.y),
                            a.y.max(b.y),
                        ));
                    }
                }
            }
        }
    }

    for i in 0..walls.len() {
        for j in (i + 1)..walls.len() {
            let (c1, tag, lo1, hi1) = &walls[i];
            let (c2, _, lo2, hi2) = &walls[j];
            if lo1.max(*lo2) > hi1.min(*hi2) + tolerance {
                continue;
            }
            for p in c1.intersections(c2) {
                push_point(&mut points, p, tag);
            }
        }
    }
    points
}

/// Sharp edges of the untreated model, in a deterministic order: horizontal
/// edges level by level, then vertical edges
pub(crate) fn sharp_edges(node: &Node, probe: f64, tolerance: f64) -> Vec<RawEdge> {
    let mut primitives = Vec::new();
    node.primitives(&mut primitives);
    let levels = z_levels(&primitives, tolerance);

    let mut edges: Vec<RawEdge> = Vec::new();
    for &z in &levels {
        let traces = traces_at(&primitives, z, tolerance);
        let level_start = edges.len();
        for (i, trace) in traces.iter().enumerate() {
            let cuts: Vec<DVec2> = traces
                .iter()
                .enumerate()
                .filter(|(j, _)| *j != i)
                .flat_map(|(_, other)| trace.curve.intersections(&other.curve))
                .collect();
            let pieces = split_trace(&trace.curve, &cuts, z)
                .into_iter()
                .filter(|piece| {
                    !edges[level_start..]
                        .iter()
                        .any(|e| e.geom.same_piece(piece, tolerance))
                })
                .map(|piece| {
                    let kept = is_sharp(node, &piece, probe);
                    (piece, kept)
                })
                .collect();
            let cyclic = matches!(trace.curve, Curve2::Circle { .. });
            for geom in merge_runs(pieces, cyclic) {
                edges.push(RawEdge {
                    geom,
                    tag: trace.tag.clone(),
                });
            }
        }
    }

    for (xy, tag) in corner_points(&primitives, tolerance) {
        let pieces = levels
            .windows(2)
            .map(|w| {
                let piece = EdgeGeom::Vertical {
                    xy,
                    z0: w[0],
                    z1: w[1],
                };
                (piece, is_sharp(node, &piece, probe))
            })
            .collect();
        for geom in merge_runs(pieces, false) {
            edges.push(RawEdge {
                geom,
                tag: tag.clone(),
            });
        }
    }

    edges
}
