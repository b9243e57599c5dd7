//! Part builders
//!
//! Each builder reads a [`DimensionSet`], checks the derived geometry before
//! touching the kernel, then drives the kernel through a fixed operation
//! sequence. Intermediate solids are released when the build returns; only the
//! finished solid is handed to the caller.

mod central;
mod external;
mod scope;

use std::fmt;

use coinholder_core::DimensionSet;
use coinholder_core::constants::LATCH_REACH;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::kernel::{CadError, CadKernel, Solid};

pub use central::central_piece;
pub use external::external_piece;
pub(crate) use scope::SolidScope;

/// Operation of a build sequence, used to report where a build failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuildStep {
    // Central piece
    CentralPlate,
    PilotHoleChamfer,
    CoinBoreFillet,
    // External piece
    BasePlate,
    PinPosts,
    HeadHoleFloors,
    RetentionBarbs,
    FlangeFillet,
    RetentionSlots,
    HeadHoleLeadIns,
    CornerFillets,
    Window,
}

impl fmt::Display for BuildStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BuildStep::CentralPlate => "central plate",
            BuildStep::PilotHoleChamfer => "pilot hole chamfer",
            BuildStep::CoinBoreFillet => "coin bore fillet",
            BuildStep::BasePlate => "base plate",
            BuildStep::PinPosts => "pin posts",
            BuildStep::HeadHoleFloors => "head hole floors",
            BuildStep::RetentionBarbs => "retention barbs",
            BuildStep::FlangeFillet => "flange fillet",
            BuildStep::RetentionSlots => "retention slots",
            BuildStep::HeadHoleLeadIns => "head hole lead-ins",
            BuildStep::CornerFillets => "corner fillets",
            BuildStep::Window => "window",
        };
        f.write_str(name)
    }
}

/// Build errors
#[derive(Debug, Clone, Error)]
pub enum BuildError {
    #[error("Invalid geometry: {reason}")]
    InvalidGeometry { reason: String },

    #[error("Kernel rejected {step}: {source}")]
    Kernel {
        step: BuildStep,
        #[source]
        source: CadError,
    },
}

impl BuildError {
    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        BuildError::InvalidGeometry {
            reason: reason.into(),
        }
    }

    /// Step that failed, for kernel errors
    pub fn step(&self) -> Option<BuildStep> {
        match self {
            BuildError::InvalidGeometry { .. } => None,
            BuildError::Kernel { step, .. } => Some(*step),
        }
    }
}

/// Result type for build operations
pub type BuildResult<T> = Result<T, BuildError>;

/// The two parts of the holder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PieceKind {
    /// Base plate holding the coin
    Central,
    /// Pin-bearing cover
    External,
}

impl PieceKind {
    pub const ALL: [PieceKind; 2] = [PieceKind::Central, PieceKind::External];

    pub fn name(self) -> &'static str {
        match self {
            PieceKind::Central => "central",
            PieceKind::External => "external",
        }
    }
}

impl fmt::Display for PieceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Build one piece
pub fn build_piece(
    kind: PieceKind,
    kernel: &dyn CadKernel,
    dims: &DimensionSet,
) -> BuildResult<Solid> {
    match kind {
        PieceKind::Central => central_piece(kernel, dims),
        PieceKind::External => external_piece(kernel, dims),
    }
}

/// Radius that must stay strictly inside `(0, limit)`
fn check_below(name: &str, value: f64, limit: f64) -> BuildResult<()> {
    if value <= 0.0 || value >= limit {
        return Err(BuildError::invalid(format!(
            "{name} {value:.4} must lie in (0, {limit:.4})"
        )));
    }
    Ok(())
}

fn check_positive(name: &str, value: f64) -> BuildResult<()> {
    if value <= 0.0 {
        return Err(BuildError::invalid(format!(
            "{name} must be positive, got {value:.4}"
        )));
    }
    Ok(())
}

/// Preconditions of the central piece
pub(crate) fn check_central(dims: &DimensionSet) -> BuildResult<()> {
    let half = dims.mid_chip_height() / 2.0;
    check_below("corrected coin fillet", dims.corrected_coin_fillet(), half)?;
    check_below("corrected pin chamfer", dims.corrected_pin_chamfer(), half)?;
    check_positive(
        "pin position square width",
        dims.pin_position_square_width(),
    )
}

/// Preconditions of the external piece
pub(crate) fn check_external(dims: &DimensionSet) -> BuildResult<()> {
    check_positive("external chip height", dims.external_chip_height())?;
    check_positive("pin base height", dims.pin_base_height())?;
    check_positive("pin head hole height", dims.pin_head_hole_height())?;
    check_positive(
        "pin position square width",
        dims.pin_position_square_width(),
    )?;
    if dims.pin_height() <= dims.pin_base_height() {
        return Err(BuildError::invalid(format!(
            "pin height {:.4} does not clear the pin base at {:.4}",
            dims.pin_height(),
            dims.pin_base_height()
        )));
    }
    if dims.pin_diameter() >= dims.pin_base_diameter() {
        return Err(BuildError::invalid(format!(
            "pin diameter {:.4} must be below the pin base diameter {:.4}",
            dims.pin_diameter(),
            dims.pin_base_diameter()
        )));
    }

    // The window must leave plate under every pin base and head-hole lead-in
    let anchor = dims.diagonal_offset();
    let window = dims.inner_width() / 2.0;
    for (name, reach) in [
        ("pin base", dims.pin_base_diameter() / 2.0),
        ("head hole lead-in", dims.pin_head_hole_diameter() / 2.0 + LATCH_REACH),
    ] {
        if window + reach >= anchor {
            return Err(BuildError::invalid(format!(
                "inner width {:.4} reaches the {name} at {anchor:.4} from the center",
                dims.inner_width()
            )));
        }
    }
    Ok(())
}
