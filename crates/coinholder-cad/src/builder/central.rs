//! Central piece: the plate that holds the coin

use coinholder_core::DimensionSet;

use super::{BuildResult, BuildStep, SolidScope, check_central};
use crate::kernel::{CadKernel, Solid};
use crate::selector::EdgeSelector;
use crate::sketch::{Sketch, SketchPlane};

pub(crate) const PILOT_HOLE_TAG: &str = "pilot_hole";
pub(crate) const COIN_BORE_TAG: &str = "coin_bore";

/// Build the central piece: a square plate `midChipHeight` thick with the coin
/// bore in the middle and a pilot hole at each pin position.
pub fn central_piece(kernel: &dyn CadKernel, dims: &DimensionSet) -> BuildResult<Solid> {
    let _span = tracing::debug_span!("central_piece").entered();
    check_central(dims)?;

    let mut scope = SolidScope::new(kernel);
    let width = dims.width();
    let square = dims.pin_position_square_width();

    let profile = Sketch::new(SketchPlane::xy())
        .rect(width, width)
        .rect_vertices(square, square)
        .circle(dims.pin_hole_diameter() / 2.0)
        .tag(PILOT_HOLE_TAG)
        .circle(dims.coin_radius())
        .tag(COIN_BORE_TAG)
        .profile();
    let plate = scope.extrude(BuildStep::CentralPlate, &profile, dims.mid_chip_height())?;
    tracing::debug!("Extruded {width} mm plate with {} wires", profile.wires.len());

    let chamfered = scope.chamfer(
        BuildStep::PilotHoleChamfer,
        plate,
        &EdgeSelector::tagged(PILOT_HOLE_TAG),
        dims.corrected_pin_chamfer(),
    )?;
    let filleted = scope.fillet(
        BuildStep::CoinBoreFillet,
        chamfered,
        &EdgeSelector::tagged(COIN_BORE_TAG),
        dims.corrected_coin_fillet(),
    )?;

    Ok(scope.keep(filleted))
}
