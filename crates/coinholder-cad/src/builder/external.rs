//! External piece: the cover carrying the pins and head holes

use coinholder_core::DimensionSet;
use coinholder_core::constants::{
    BARB_DROP, BARB_MID_DROP, CORNER_BOX_INSET, CORNER_FILLET_RADIUS, FLANGE_BAND_ABOVE,
    FLANGE_BAND_BELOW, FLANGE_FILLET_RADIUS, LATCH_REACH, LEAD_IN_DROP, LEAD_IN_MID_DROP,
    SLOT_ANGLE_DEG, SLOT_DEPTH, SLOT_LENGTH, SLOT_RELIEF_DIAMETER, SLOT_WIDTH,
};
use glam::{DVec2, DVec3};

use super::{BuildResult, BuildStep, SolidScope, check_external};
use crate::kernel::{CadKernel, Solid};
use crate::selector::EdgeSelector;
use crate::sketch::{Profile, Sketch, SketchPlane};

pub(crate) const PIN_BASE_HOLE_TAG: &str = "pin_base_hole";
pub(crate) const HEAD_HOLE_TAG: &str = "head_hole";
pub(crate) const PIN_BASE_TAG: &str = "pin_base";
pub(crate) const PIN_POST_TAG: &str = "pin_post";
pub(crate) const HEAD_HOLE_FLOOR_TAG: &str = "head_hole_floor";
pub(crate) const BARB_TAG: &str = "barb";
pub(crate) const SLOT_TAG: &str = "pin_slot";
pub(crate) const SLOT_RELIEF_TAG: &str = "pin_slot_relief";
pub(crate) const LEAD_IN_TAG: &str = "head_hole_lead_in";
pub(crate) const WINDOW_TAG: &str = "window";

/// Side of the pin axis a barb or lead-in profile is drawn on, per anchor
const BARB_SIDES: [f64; 2] = [1.0, -1.0];
const LEAD_IN_SIDES: [f64; 2] = [-1.0, 1.0];

/// Triangular latch section with its apex on a circle of `radius` around
/// `anchor`, drawn on the vertical plane through the anchor
fn latch_section(
    anchor: DVec2,
    radius: f64,
    side: f64,
    top: f64,
    (mid_drop, drop): (f64, f64),
    tag: &str,
) -> Profile {
    Sketch::new(SketchPlane::yz().offset(anchor.x))
        .center(anchor.y + side * radius, top)
        .polyline(&[
            DVec2::ZERO,
            DVec2::new(side * LATCH_REACH, -mid_drop),
            DVec2::new(0.0, -drop),
        ])
        .close()
        .tag(tag)
        .profile()
}

/// Horizontal circle of `radius` around `anchor` at height `z`
fn ring_path(anchor: DVec2, radius: f64, z: f64) -> Profile {
    Sketch::new(SketchPlane::xy().offset(z))
        .push_points([anchor])
        .circle(radius)
        .profile()
}

/// Build the external piece.
///
/// The plate carries two stepped pins with retention barbs and slots on the
/// first diagonal, two head holes with lead-ins on the second diagonal, and a
/// square window in the middle.
pub fn external_piece(kernel: &dyn CadKernel, dims: &DimensionSet) -> BuildResult<Solid> {
    let _span = tracing::debug_span!("external_piece").entered();
    check_external(dims)?;

    let mut scope = SolidScope::new(kernel);
    let width = dims.width();
    let half = dims.half_width();
    let ech = dims.external_chip_height();
    let pin_height = dims.pin_height();
    let pin_radius = dims.pin_diameter() / 2.0;
    let head_radius = dims.pin_head_hole_diameter() / 2.0;
    let pins = dims.first_diagonal();
    let heads = dims.second_diagonal();

    // Base plate with the pin-base and head holes punched through
    let profile = Sketch::new(SketchPlane::xy())
        .rect(width, width)
        .push_points(pins)
        .circle(dims.pin_base_diameter() / 2.0)
        .tag(PIN_BASE_HOLE_TAG)
        .push_points(heads)
        .circle(head_radius)
        .tag(HEAD_HOLE_TAG)
        .profile();
    let mut body = scope.extrude(BuildStep::BasePlate, &profile, ech)?;
    tracing::debug!("Base plate {width} x {width} x {ech}");

    // Stepped pin posts
    let base = Sketch::new(SketchPlane::xy())
        .push_points(pins)
        .circle(dims.pin_base_diameter() / 2.0)
        .tag(PIN_BASE_TAG)
        .profile();
    let base = scope.extrude(BuildStep::PinPosts, &base, dims.pin_base_height())?;
    let post = Sketch::new(SketchPlane::xy())
        .push_points(pins)
        .circle(pin_radius)
        .tag(PIN_POST_TAG)
        .profile();
    let post = scope.extrude(BuildStep::PinPosts, &post, pin_height)?;
    body = scope.union(BuildStep::PinPosts, body, base)?;
    body = scope.union(BuildStep::PinPosts, body, post)?;
    tracing::debug!("Pin posts up to {pin_height}");

    // Head-hole floors
    let floors = Sketch::new(SketchPlane::xy())
        .push_points(heads)
        .circle(head_radius)
        .tag(HEAD_HOLE_FLOOR_TAG)
        .profile();
    let floors = scope.extrude(BuildStep::HeadHoleFloors, &floors, dims.pin_head_hole_height())?;
    body = scope.union(BuildStep::HeadHoleFloors, body, floors)?;

    // Retention barbs around each pin tip
    for (pin, side) in pins.into_iter().zip(BARB_SIDES) {
        let section = latch_section(
            pin,
            pin_radius,
            side,
            pin_height,
            (BARB_MID_DROP, BARB_DROP),
            BARB_TAG,
        );
        let barb = scope.sweep(
            BuildStep::RetentionBarbs,
            &section,
            &ring_path(pin, pin_radius, pin_height),
        )?;
        body = scope.union(BuildStep::RetentionBarbs, body, barb)?;
    }

    body = scope.fillet(
        BuildStep::FlangeFillet,
        body,
        &EdgeSelector::within(
            DVec3::new(-half, -half, pin_height - FLANGE_BAND_BELOW),
            DVec3::new(half, half, pin_height + FLANGE_BAND_ABOVE),
        ),
        FLANGE_FILLET_RADIUS,
    )?;

    // Retention slots through the pin tips
    let tip = SketchPlane::xy().offset(pin_height);
    let relief = Sketch::new(tip)
        .push_points(pins)
        .circle(SLOT_RELIEF_DIAMETER / 2.0)
        .tag(SLOT_RELIEF_TAG)
        .profile();
    let slot = Sketch::new(tip)
        .push_points(pins)
        .rect(SLOT_WIDTH, SLOT_LENGTH)
        .rotated(SLOT_ANGLE_DEG)
        .tag(SLOT_TAG)
        .profile();
    let relief = scope.extrude(BuildStep::RetentionSlots, &relief, -SLOT_DEPTH)?;
    let slot = scope.extrude(BuildStep::RetentionSlots, &slot, -SLOT_DEPTH)?;
    let cutter = scope.union(BuildStep::RetentionSlots, relief, slot)?;
    body = scope.cut(BuildStep::RetentionSlots, body, cutter)?;

    // Lead-ins at the mouth of each head hole
    for (head, side) in heads.into_iter().zip(LEAD_IN_SIDES) {
        let section = latch_section(
            head,
            head_radius,
            side,
            ech,
            (LEAD_IN_MID_DROP, LEAD_IN_DROP),
            LEAD_IN_TAG,
        );
        let lead_in = scope.sweep(
            BuildStep::HeadHoleLeadIns,
            &section,
            &ring_path(head, head_radius, ech),
        )?;
        body = scope.cut(BuildStep::HeadHoleLeadIns, body, lead_in)?;
    }

    for head in heads {
        let reach = half - CORNER_BOX_INSET;
        let corner = DVec3::new(
            head.x.signum() * reach,
            head.y.signum() * reach,
            ech + CORNER_BOX_INSET,
        );
        body = scope.fillet(
            BuildStep::CornerFillets,
            body,
            &EdgeSelector::within(DVec3::ZERO, corner),
            CORNER_FILLET_RADIUS,
        )?;
    }

    let window = Sketch::new(SketchPlane::xy())
        .rect(dims.inner_width(), dims.inner_width())
        .tag(WINDOW_TAG)
        .profile();
    let window = scope.extrude(BuildStep::Window, &window, ech)?;
    body = scope.cut(BuildStep::Window, body, window)?;

    Ok(scope.keep(body))
}
