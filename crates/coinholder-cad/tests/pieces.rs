//! Full builds of both pieces against the analytic kernel

use approx::assert_relative_eq;
use coinholder_cad::{
    AnalyticKernel, AnalyticKernelConfig, BuildError, BuildStep, CadError, CadKernel, EdgeInfo,
    EdgeSelector, PieceKind, Sketch, SketchPlane, build_piece, central_piece, external_piece,
    select_edges,
};
use coinholder_core::{DimensionSet, Parameter};
use glam::{DVec2, DVec3};

fn kernel() -> AnalyticKernel {
    AnalyticKernel::with_config(AnalyticKernelConfig {
        volume_cell: 0.25,
        ..Default::default()
    })
}

fn tagged<'a>(edges: &'a [EdgeInfo], tag: &str) -> Vec<&'a EdgeInfo> {
    edges
        .iter()
        .filter(|e| e.tag.as_deref() == Some(tag))
        .collect()
}

/// Distinct XY centres of the circular edges
fn arc_centers(edges: &[&EdgeInfo]) -> Vec<DVec2> {
    let mut centers: Vec<DVec2> = Vec::new();
    for edge in edges {
        if let coinholder_cad::EdgeCurve::Arc { center, .. } = edge.curve {
            let c = center.truncate();
            if centers.iter().all(|q| q.distance(c) > 1e-6) {
                centers.push(c);
            }
        }
    }
    centers
}

fn has_center(centers: &[DVec2], p: DVec2) -> bool {
    centers.iter().any(|c| c.distance(p) < 1e-6)
}

#[test]
fn test_central_piece_reference_dimensions() {
    let kernel = kernel();
    let dims = DimensionSet::default();
    let piece = central_piece(&kernel, &dims).unwrap();

    let props = kernel.measure(&piece).unwrap();
    assert_relative_eq!(props.size().x, 50.0, epsilon = 1e-9);
    assert_relative_eq!(props.size().y, 50.0, epsilon = 1e-9);
    assert_relative_eq!(props.size().z, 1.5, epsilon = 1e-9);
    assert_relative_eq!(props.volume, 1205.7, max_relative = 1e-2);

    let edges = kernel.get_edges(&piece).unwrap();

    // One bore of radius 23 at the centre, rounded top and bottom
    let bore = tagged(&edges, "coin_bore");
    assert_eq!(bore.len(), 4);
    assert_eq!(arc_centers(&bore), vec![DVec2::ZERO]);
    let bore_min = bore.iter().filter_map(|e| e.radius()).fold(f64::MAX, f64::min);
    assert_relative_eq!(bore_min, 23.0, epsilon = 1e-9);

    // Four pilot holes of diameter 1.5 on the pin square
    let pilots = tagged(&edges, "pilot_hole");
    let centers = arc_centers(&pilots);
    assert_eq!(centers.len(), 4);
    let a = dims.pin_position_square_width() / 2.0;
    for p in [
        DVec2::new(a, a),
        DVec2::new(-a, a),
        DVec2::new(a, -a),
        DVec2::new(-a, -a),
    ] {
        assert!(has_center(&centers, p));
        assert!(!kernel.contains_point(&piece, p.extend(0.75)).unwrap());
        assert!(kernel.contains_point(&piece, (p + DVec2::new(0.8, 0.0)).extend(0.75)).unwrap());
    }
    let pilot_min = pilots.iter().filter_map(|e| e.radius()).fold(f64::MAX, f64::min);
    assert_relative_eq!(pilot_min, 0.75, epsilon = 1e-9);

    assert!(!kernel.contains_point(&piece, DVec3::new(22.9, 0.0, 0.75)).unwrap());
    assert!(kernel.contains_point(&piece, DVec3::new(23.5, 0.0, 0.75)).unwrap());
    assert_eq!(kernel.solid_count(), 1);
}

#[test]
fn test_tag_selection_matches_radius_rank() {
    let kernel = kernel();
    let dims = DimensionSet::default();
    let square = dims.pin_position_square_width();
    let profile = Sketch::new(SketchPlane::xy())
        .rect(dims.width(), dims.width())
        .rect_vertices(square, square)
        .circle(dims.pin_hole_diameter() / 2.0)
        .tag("pilot_hole")
        .circle(dims.coin_radius())
        .tag("coin_bore")
        .profile();
    let plate = kernel.extrude(&profile, dims.mid_chip_height()).unwrap();

    let edges = kernel.get_edges(&plate).unwrap();
    let pilots = select_edges(&edges, &EdgeSelector::tagged("pilot_hole"));
    assert_eq!(pilots.len(), 8);
    assert_eq!(pilots, select_edges(&edges, &EdgeSelector::RadiusRank(0)));

    let chamfered = kernel
        .chamfer(&plate, &pilots, dims.corrected_pin_chamfer())
        .unwrap();
    let edges = kernel.get_edges(&chamfered).unwrap();
    let bore = select_edges(&edges, &EdgeSelector::tagged("coin_bore"));
    assert_eq!(bore.len(), 2);
    assert_eq!(bore, select_edges(&edges, &EdgeSelector::RadiusRank(2)));
}

#[test]
fn test_external_piece_reference_dimensions() {
    let kernel = kernel();
    let dims = DimensionSet::default();
    let piece = external_piece(&kernel, &dims).unwrap();
    let ech = dims.external_chip_height();

    let props = kernel.measure(&piece).unwrap();
    assert_relative_eq!(props.bbox_min.z, 0.0, epsilon = 1e-9);
    assert_relative_eq!(props.bbox_max.z, dims.pin_height(), epsilon = 1e-9);

    let edges = kernel.get_edges(&piece).unwrap();
    let all: Vec<&EdgeInfo> = edges.iter().collect();

    // Two pins and two head holes, nothing else round
    let centers = arc_centers(&all);
    assert_eq!(centers.len(), 4);
    for p in dims.first_diagonal().into_iter().chain(dims.second_diagonal()) {
        assert!(has_center(&centers, p));
    }

    // Square window through the plate
    let window = tagged(&edges, "window");
    assert_eq!(window.len(), 12);
    let sides = window
        .iter()
        .filter(|e| (e.length - dims.inner_width()).abs() < 1e-9)
        .count();
    assert_eq!(sides, 8);
    let posts = window
        .iter()
        .filter(|e| (e.length - ech).abs() < 1e-9)
        .count();
    assert_eq!(posts, 4);
    assert!(!kernel.contains_point(&piece, DVec3::new(0.0, 0.0, ech / 2.0)).unwrap());
    assert!(!kernel.contains_point(&piece, DVec3::new(18.9, 0.0, ech / 2.0)).unwrap());
    assert!(kernel.contains_point(&piece, DVec3::new(19.1, 0.0, ech / 2.0)).unwrap());
    assert!(kernel.contains_point(&piece, DVec3::new(0.0, 21.0, ech / 2.0)).unwrap());
}

#[test]
fn test_external_piece_pins_and_head_holes() {
    let kernel = kernel();
    let dims = DimensionSet::default();
    let piece = external_piece(&kernel, &dims).unwrap();
    let inside = |p: DVec3| kernel.contains_point(&piece, p).unwrap();

    let tip = dims.pin_height();
    let across = DVec2::new(1.0, -1.0).normalize();
    for pin in dims.first_diagonal() {
        // Slot relief at the axis, solid pin below the slot
        assert!(!inside(pin.extend(tip - 0.5)));
        assert!(inside(pin.extend(tip - 1.2)));
        // Beside the slot the pin is intact and the barb stands proud of it
        assert!(inside((pin + across * 0.5).extend(tip - 0.5)));
        assert!(inside((pin + across * 0.8).extend(tip - 0.359)));
        assert!(!inside((pin + across * 1.2).extend(tip - 0.359)));
    }

    let ech = dims.external_chip_height();
    let mouth = dims.pin_head_hole_diameter() / 2.0;
    for head in dims.second_diagonal() {
        assert!(!inside(head.extend(ech - 0.1)));
        assert!(inside(head.extend(dims.pin_head_hole_height() - 0.1)));
        // Lead-in groove undercuts the plate around the hole
        assert!(!inside((head + DVec2::X * (mouth + 0.2)).extend(ech - 0.365)));
        assert!(inside((head + DVec2::X * (mouth + 1.0)).extend(ech - 0.365)));
    }
}

#[test]
fn test_builds_are_repeatable() {
    let kernel = kernel();
    let dims = DimensionSet::default();
    for kind in PieceKind::ALL {
        let first = build_piece(kind, &kernel, &dims).unwrap();
        let second = build_piece(kind, &kernel, &dims).unwrap();
        let a = kernel.measure(&first).unwrap();
        let b = kernel.measure(&second).unwrap();
        assert_eq!(a.bbox_min, b.bbox_min);
        assert_eq!(a.bbox_max, b.bbox_max);
        assert!((a.volume - b.volume).abs() < 1e-6, "{kind} volume drifted");
        assert_eq!(
            kernel.get_edges(&first).unwrap().len(),
            kernel.get_edges(&second).unwrap().len()
        );
    }
}

#[test]
fn test_oversize_coin_is_rejected() {
    let kernel = kernel();
    // Above the 48.50 mm bound: the bore rounding runs off the plate
    let dims = DimensionSet::default()
        .with(Parameter::CoinDiameter, 49.0)
        .unwrap();
    let err = central_piece(&kernel, &dims).unwrap_err();
    assert!(matches!(
        err,
        BuildError::Kernel {
            step: BuildStep::CoinBoreFillet,
            source: CadError::FilletFailed(_)
        }
    ));
    assert_eq!(kernel.solid_count(), 0);

    // Wider than the plate: the bore crosses the outline
    let dims = DimensionSet::default()
        .with(Parameter::CoinDiameter, 52.0)
        .unwrap();
    let err = central_piece(&kernel, &dims).unwrap_err();
    assert_eq!(err.step(), Some(BuildStep::CentralPlate));
    assert_eq!(kernel.solid_count(), 0);
}

#[test]
fn test_thin_middle_chip_clips_radii() {
    let kernel = kernel();
    // Fillet and chamfer are clipped below half of the 1.0 mm chip
    let dims = DimensionSet::default()
        .with(Parameter::CoinThickness, 1.0)
        .unwrap()
        .with(Parameter::CoinFillet, 2.0)
        .unwrap();
    assert_relative_eq!(dims.corrected_coin_fillet(), 0.499);
    let piece = central_piece(&kernel, &dims).unwrap();
    assert_relative_eq!(kernel.measure(&piece).unwrap().size().z, 1.0, epsilon = 1e-9);
}

#[test]
fn test_window_over_pin_anchors_is_rejected() {
    let kernel = kernel();
    // The window would cut the plate away under both pins
    let dims = DimensionSet::default()
        .with(Parameter::InnerWidth, 46.0)
        .unwrap();
    let err = external_piece(&kernel, &dims).unwrap_err();
    assert!(matches!(err, BuildError::InvalidGeometry { .. }));
    assert_eq!(err.step(), None);
    assert_eq!(kernel.solid_count(), 0);
}
