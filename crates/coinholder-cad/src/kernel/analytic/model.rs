//! Solid model of the analytic kernel
//!
//! A solid is a CSG tree whose leaves are Z-extruded planar regions and
//! axisymmetric sweeps. Every query reduces to the set of Z intervals where a
//! vertical line through an XY point is inside material.

use std::sync::Arc;

use glam::{DVec2, DVec3};

use super::intervals::IntervalSet;
use super::treatment::Treatment;
use crate::geom::{self, Curve2};
use crate::kernel::BooleanType;

/// Closed planar loop of a prism cross-section, in world XY
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum LoopShape {
    Circle { center: DVec2, radius: f64 },
    Polygon(Vec<DVec2>),
}

impl LoopShape {
    pub fn contains(&self, p: DVec2) -> bool {
        match self {
            LoopShape::Circle { center, radius } => p.distance_squared(*center) < radius * radius,
            LoopShape::Polygon(points) => geom::point_in_polygon(p, points),
        }
    }

    pub fn curves(&self) -> Vec<Curve2> {
        match self {
            LoopShape::Circle { center, radius } => vec![Curve2::Circle {
                center: *center,
                radius: *radius,
            }],
            LoopShape::Polygon(points) => {
                let n = points.len();
                (0..n)
                    .map(|i| Curve2::Segment {
                        a: points[i],
                        b: points[(i + 1) % n],
                    })
                    .collect()
            }
        }
    }

    pub fn bounds(&self) -> (DVec2, DVec2) {
        match self {
            LoopShape::Circle { center, radius } => {
                (*center - DVec2::splat(*radius), *center + DVec2::splat(*radius))
            }
            LoopShape::Polygon(points) => points.iter().fold(
                (DVec2::splat(f64::INFINITY), DVec2::splat(f64::NEG_INFINITY)),
                |(lo, hi), p| (lo.min(*p), hi.max(*p)),
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Loop {
    pub shape: LoopShape,
    pub tag: Option<String>,
}

/// Even-odd region between `z0` and `z1`
#[derive(Debug, Clone)]
pub(crate) struct Prism {
    pub loops: Vec<Loop>,
    pub z0: f64,
    pub z1: f64,
    xy_min: DVec2,
    xy_max: DVec2,
}

impl Prism {
    pub fn new(loops: Vec<Loop>, z0: f64, z1: f64) -> Self {
        let (xy_min, xy_max) = loops.iter().map(|l| l.shape.bounds()).fold(
            (DVec2::splat(f64::INFINITY), DVec2::splat(f64::NEG_INFINITY)),
            |(lo, hi), (a, b)| (lo.min(a), hi.max(b)),
        );
        Self {
            loops,
            z0: z0.min(z1),
            z1: z0.max(z1),
            xy_min,
            xy_max,
        }
    }

    pub fn inside_xy(&self, p: DVec2) -> bool {
        self.loops
            .iter()
            .filter(|l| l.shape.contains(p))
            .count()
            % 2
            == 1
    }
}

/// Closed `(r, z)` section revolved about a vertical axis
#[derive(Debug, Clone)]
pub(crate) struct Revolved {
    pub axis: DVec2,
    pub section: Vec<DVec2>,
    pub tag: Option<String>,
    r_max: f64,
    z_min: f64,
    z_max: f64,
}

impl Revolved {
    pub fn new(axis: DVec2, section: Vec<DVec2>, tag: Option<String>) -> Self {
        let r_max = section.iter().map(|p| p.x).fold(0.0, f64::max);
        let z_min = section.iter().map(|p| p.y).fold(f64::INFINITY, f64::min);
        let z_max = section.iter().map(|p| p.y).fold(f64::NEG_INFINITY, f64::max);
        Self {
            axis,
            section,
            tag,
            r_max,
            z_min,
            z_max,
        }
    }

    pub fn z_range(&self) -> (f64, f64) {
        (self.z_min, self.z_max)
    }

    /// Section edges as `(r, z)` point pairs
    pub fn section_edges(&self) -> impl Iterator<Item = (DVec2, DVec2)> + '_ {
        let n = self.section.len();
        (0..n).map(move |i| (self.section[i], self.section[(i + 1) % n]))
    }

    /// Radii where the section boundary crosses height `z`
    pub fn radii_at(&self, z: f64, tolerance: f64) -> Vec<f64> {
        let mut radii: Vec<f64> = Vec::new();
        for (a, b) in self.section_edges() {
            let candidate = if (a.y - z).abs() < tolerance {
                Some(a.x)
            } else if (a.y - z) * (b.y - z) < 0.0 {
                Some(a.x + (z - a.y) / (b.y - a.y) * (b.x - a.x))
            } else {
                None
            };
            if let Some(r) = candidate {
                if r > tolerance && radii.iter().all(|q| (q - r).abs() > tolerance) {
                    radii.push(r);
                }
            }
        }
        radii
    }

    fn column(&self, p: DVec2) -> IntervalSet {
        let r = p.distance(self.axis);
        if r >= self.r_max {
            return IntervalSet::empty();
        }
        let mut crossings: Vec<f64> = self
            .section_edges()
            .filter(|(a, b)| (a.x > r) != (b.x > r))
            .map(|(a, b)| a.y + (r - a.x) / (b.x - a.x) * (b.y - a.y))
            .collect();
        crossings.sort_by(f64::total_cmp);
        IntervalSet::from_spans(crossings.chunks_exact(2).map(|c| (c[0], c[1])).collect())
    }
}

#[derive(Debug, Clone)]
pub(crate) enum Primitive {
    Prism(Prism),
    Revolved(Revolved),
}

impl Primitive {
    pub fn bounds(&self) -> (DVec3, DVec3) {
        match self {
            Primitive::Prism(prism) => (
                prism.xy_min.extend(prism.z0),
                prism.xy_max.extend(prism.z1),
            ),
            Primitive::Revolved(rev) => (
                (rev.axis - DVec2::splat(rev.r_max)).extend(rev.z_min),
                (rev.axis + DVec2::splat(rev.r_max)).extend(rev.z_max),
            ),
        }
    }

    fn column(&self, p: DVec2) -> IntervalSet {
        match self {
            Primitive::Prism(prism) => {
                if p.x < prism.xy_min.x
                    || p.y < prism.xy_min.y
                    || p.x > prism.xy_max.x
                    || p.y > prism.xy_max.y
                    || !prism.inside_xy(p)
                {
                    IntervalSet::empty()
                } else {
                    IntervalSet::single(prism.z0, prism.z1)
                }
            }
            Primitive::Revolved(rev) => rev.column(p),
        }
    }
}

/// CSG tree node. Subtrees are shared between the solids derived from them.
#[derive(Debug)]
pub(crate) enum Node {
    Leaf(Primitive),
    Boolean {
        op: BooleanType,
        a: Arc<Node>,
        b: Arc<Node>,
    },
    Treated {
        base: Arc<Node>,
        treatments: Vec<Treatment>,
    },
}

impl Node {
    /// Material intervals along the vertical line through `p`.
    ///
    /// With `treated == false` fillets and chamfers are ignored and the sharp
    /// model is evaluated.
    pub fn column(&self, p: DVec2, treated: bool) -> IntervalSet {
        match self {
            Node::Leaf(primitive) => primitive.column(p),
            Node::Boolean { op, a, b } => {
                let a = a.column(p, treated);
                match op {
                    BooleanType::Union => a.union(&b.column(p, treated)),
                    BooleanType::Subtract if a.is_empty() => a,
                    BooleanType::Subtract => a.difference(&b.column(p, treated)),
                    BooleanType::Intersect if a.is_empty() => a,
                    BooleanType::Intersect => a.intersection(&b.column(p, treated)),
                }
            }
            Node::Treated { base, treatments } => {
                let mut column = base.column(p, treated);
                if treated {
                    for treatment in treatments {
                        column = treatment.apply(&column, p);
                    }
                }
                column
            }
        }
    }

    pub fn contains(&self, p: DVec3, treated: bool) -> bool {
        self.column(p.truncate(), treated).contains(p.z)
    }

    /// Conservative bounding box; `None` for a provably empty solid
    pub fn bounds(&self) -> Option<(DVec3, DVec3)> {
        match self {
            Node::Leaf(primitive) => Some(primitive.bounds()),
            Node::Boolean { op, a, b } => match op {
                BooleanType::Union => match (a.bounds(), b.bounds()) {
                    (Some((a0, a1)), Some((b0, b1))) => Some((a0.min(b0), a1.max(b1))),
                    (a, b) => a.or(b),
                },
                BooleanType::Subtract => a.bounds(),
                BooleanType::Intersect => {
                    let (a0, a1) = a.bounds()?;
                    let (b0, b1) = b.bounds()?;
                    let (lo, hi) = (a0.max(b0), a1.min(b1));
                    (lo.cmple(hi).all()).then_some((lo, hi))
                }
            },
            Node::Treated { base, .. } => base.bounds(),
        }
    }

    /// Leaf primitives in creation order
    pub fn primitives<'a>(&'a self, out: &mut Vec<&'a Primitive>) {
        match self {
            Node::Leaf(primitive) => out.push(primitive),
            Node::Boolean { a, b, .. } => {
                a.primitives(out);
                b.primitives(out);
            }
            Node::Treated { base, .. } => base.primitives(out),
        }
    }

    /// Edge treatments in the order they were applied
    pub fn treatments<'a>(&'a self, out: &mut Vec<&'a Treatment>) {
        match self {
            Node::Leaf(_) => {}
            Node::Boolean { a, b, .. } => {
                a.treatments(out);
                b.treatments(out);
            }
            Node::Treated { base, treatments } => {
                base.treatments(out);
                out.extend(treatments.iter());
            }
        }
    }

    /// Volume by midpoint integration of column lengths over the XY bounds
    pub fn volume(&self, cell: f64) -> f64 {
        let Some((lo, hi)) = self.bounds() else {
            return 0.0;
        };
        let size = hi - lo;
        let nx = ((size.x / cell).ceil() as usize).max(1);
        let ny = ((size.y / cell).ceil() as usize).max(1);
        let dx = size.x / nx as f64;
        let dy = size.y / ny as f64;

        let mut total = 0.0;
        for i in 0..nx {
            let x = lo.x + (i as f64 + 0.5) * dx;
            for j in 0..ny {
                let y = lo.y + (j as f64 + 0.5) * dy;
                total += self.column(DVec2::new(x, y), true).total_length();
            }
        }
        total * dx * dy
    }
}
