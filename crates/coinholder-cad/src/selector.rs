//! Edge selection

use glam::DVec3;
use serde::{Deserialize, Serialize};

use crate::kernel::{EdgeId, EdgeInfo};

/// Radii closer than this belong to the same group (mm)
pub const RADIUS_TOLERANCE: f64 = 1e-6;

/// How to pick edges out of a solid's edge list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EdgeSelector {
    /// Circular edges whose radius is the n-th smallest distinct radius
    RadiusRank(usize),
    /// Edges whose centroid lies in the box spanned by two corners
    CenterWithin { corner_a: DVec3, corner_b: DVec3 },
    /// Edges created from sketch wires carrying this tag
    Tagged(String),
}

impl EdgeSelector {
    pub fn tagged(tag: &str) -> Self {
        EdgeSelector::Tagged(tag.to_string())
    }

    pub fn within(corner_a: DVec3, corner_b: DVec3) -> Self {
        EdgeSelector::CenterWithin { corner_a, corner_b }
    }

    fn matches(&self, edge: &EdgeInfo, radii: &[f64]) -> bool {
        match self {
            EdgeSelector::RadiusRank(rank) => match (edge.radius(), radii.get(*rank)) {
                (Some(radius), Some(wanted)) => (radius - wanted).abs() < RADIUS_TOLERANCE,
                _ => false,
            },
            EdgeSelector::CenterWithin { corner_a, corner_b } => {
                let lo = corner_a.min(*corner_b);
                let hi = corner_a.max(*corner_b);
                edge.centroid.cmpge(lo).all() && edge.centroid.cmple(hi).all()
            }
            EdgeSelector::Tagged(tag) => edge.tag.as_deref() == Some(tag.as_str()),
        }
    }
}

/// Distinct radii of the circular edges, ascending
pub fn distinct_radii(edges: &[EdgeInfo]) -> Vec<f64> {
    let mut radii: Vec<f64> = edges.iter().filter_map(|e| e.radius()).collect();
    radii.sort_by(f64::total_cmp);
    radii.dedup_by(|a, b| (*a - *b).abs() < RADIUS_TOLERANCE);
    radii
}

/// Ids of the edges matching a selector, in edge-list order
pub fn select_edges(edges: &[EdgeInfo], selector: &EdgeSelector) -> Vec<EdgeId> {
    let radii = match selector {
        EdgeSelector::RadiusRank(_) => distinct_radii(edges),
        _ => Vec::new(),
    };
    edges
        .iter()
        .filter(|edge| selector.matches(edge, &radii))
        .map(|edge| edge.id)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::EdgeCurve;
    use std::f64::consts::TAU;
    use uuid::Uuid;

    fn circle(index: u32, radius: f64, z: f64, tag: Option<&str>) -> EdgeInfo {
        EdgeInfo {
            id: EdgeId::new(Uuid::nil(), index),
            curve: EdgeCurve::Arc {
                center: DVec3::new(0.0, 0.0, z),
                axis: DVec3::Z,
                radius,
                start_angle: 0.0,
                sweep: TAU,
            },
            start: DVec3::new(radius, 0.0, z),
            end: DVec3::new(radius, 0.0, z),
            centroid: DVec3::new(0.0, 0.0, z),
            length: TAU * radius,
            bbox_min: DVec3::new(-radius, -radius, z),
            bbox_max: DVec3::new(radius, radius, z),
            tag: tag.map(str::to_string),
        }
    }

    fn line(index: u32, a: DVec3, b: DVec3) -> EdgeInfo {
        EdgeInfo {
            id: EdgeId::new(Uuid::nil(), index),
            curve: EdgeCurve::Line,
            start: a,
            end: b,
            centroid: (a + b) / 2.0,
            length: a.distance(b),
            bbox_min: a.min(b),
            bbox_max: a.max(b),
            tag: None,
        }
    }

    fn edges() -> Vec<EdgeInfo> {
        vec![
            circle(0, 23.0, 0.0, Some("coin_bore")),
            circle(1, 0.75, 0.0, Some("pilot_hole")),
            line(2, DVec3::new(-25.0, -25.0, 0.0), DVec3::new(25.0, -25.0, 0.0)),
            circle(3, 0.75 + 5e-7, 1.5, Some("pilot_hole")),
            circle(4, 1.25, 1.5, Some("pilot_hole")),
        ]
    }

    #[test]
    fn test_radius_rank_groups_close_radii() {
        let edges = edges();
        assert_eq!(distinct_radii(&edges).len(), 3);

        let ids = |selector| {
            select_edges(&edges, &selector)
                .iter()
                .map(|id| id.index)
                .collect::<Vec<_>>()
        };
        assert_eq!(ids(EdgeSelector::RadiusRank(0)), vec![1, 3]);
        assert_eq!(ids(EdgeSelector::RadiusRank(1)), vec![4]);
        assert_eq!(ids(EdgeSelector::RadiusRank(2)), vec![0]);
        assert!(ids(EdgeSelector::RadiusRank(3)).is_empty());
    }

    #[test]
    fn test_center_within_accepts_corners_in_any_order() {
        let edges = edges();
        let box_a = EdgeSelector::within(DVec3::new(30.0, 30.0, 1.0), DVec3::new(-30.0, -30.0, 2.0));
        let selected: Vec<u32> = select_edges(&edges, &box_a).iter().map(|id| id.index).collect();
        assert_eq!(selected, vec![3, 4]);

        // The box is inclusive and the line centroid sits on its boundary
        let box_b = EdgeSelector::within(DVec3::new(0.0, -25.0, 0.0), DVec3::new(1.0, -20.0, 0.0));
        assert_eq!(select_edges(&edges, &box_b).len(), 1);
    }

    #[test]
    fn test_tagged() {
        let edges = edges();
        assert_eq!(select_edges(&edges, &EdgeSelector::tagged("pilot_hole")).len(), 3);
        assert!(select_edges(&edges, &EdgeSelector::tagged("window")).is_empty());
    }
}
