//! Global constants for coinholder-core
//!
//! The latch offsets below were tuned by hand against printed parts and have no
//! closed-form derivation. Keep them as literal values.

/// Safety margin subtracted from half the chip thickness when clipping
/// fillet and chamfer radii (mm)
pub const RADIUS_CLIP_EPSILON: f64 = 0.001;

/// Pin tip height above the top of the middle chip (mm)
pub const PIN_HEIGHT_OFFSET: f64 = 0.718;

/// Pin base step height above the external chip (mm)
pub const PIN_BASE_HEIGHT_OFFSET: f64 = 0.875;

/// Head-hole floor offset relative to the external chip top (mm)
pub const PIN_HEAD_HOLE_HEIGHT_OFFSET: f64 = -0.73;

/// Counter-bore depth reserved above the head-hole floor (mm)
pub const HEAD_HOLE_DEPTH: f64 = 0.73;

/// Extra wall kept under the head-hole counter-bore (mm)
pub const HEAD_HOLE_WALL_ALLOWANCE: f64 = 0.2;

/// Smallest external chip height that still leaves a floor under the head hole
pub const MIN_EXTERNAL_HEIGHT: f64 = HEAD_HOLE_DEPTH + HEAD_HOLE_WALL_ALLOWANCE;

/// Grid used for every reported bound (mm)
pub const BOUND_RESOLUTION: f64 = 0.01;

/// Fixed lower limit for the coin diameter (mm)
pub const MIN_COIN_DIAMETER: f64 = 10.0;

/// Below this thickness the derived geometry self-intersects (mm)
pub const MIN_COIN_THICKNESS: f64 = 1.0;

/// Upper limit for the coin thickness regardless of height (mm)
pub const MAX_COIN_THICKNESS: f64 = 3.5;

/// Plate width limits (mm)
pub const MIN_WIDTH: f64 = 30.0;
pub const MAX_WIDTH: f64 = 70.0;

/// Stack height limits (mm)
pub const MIN_HEIGHT: f64 = 2.0;
pub const MAX_HEIGHT: f64 = 10.0;

// ============== Latch profile ==============

/// Radial reach of the retention barb and of the head-hole lead-in (mm)
pub const LATCH_REACH: f64 = 0.4;

/// Barb profile: vertex drop at full reach and total drop (mm)
pub const BARB_MID_DROP: f64 = 0.359;
pub const BARB_DROP: f64 = 0.718;

/// Lead-in profile: vertex drop at full reach and total drop (mm)
pub const LEAD_IN_MID_DROP: f64 = 0.365;
pub const LEAD_IN_DROP: f64 = 0.73;

/// Flange fillet radius around the pin tips (mm)
pub const FLANGE_FILLET_RADIUS: f64 = 0.26;

/// Flange fillet selection band relative to pin height (mm)
pub const FLANGE_BAND_BELOW: f64 = 0.72;
pub const FLANGE_BAND_ABOVE: f64 = 0.1;

/// Fillet radius at the head-hole corners (mm)
pub const CORNER_FILLET_RADIUS: f64 = 0.123;

/// Inset of the corner-fillet selection box from the plate edge and its
/// headroom above the external chip (mm)
pub const CORNER_BOX_INSET: f64 = 0.1;

/// Retention slot through each pin tip (mm)
pub const SLOT_WIDTH: f64 = 0.4;
pub const SLOT_LENGTH: f64 = 5.0;
pub const SLOT_DEPTH: f64 = 1.0;

/// Diameter of the core relief cut together with the slot (mm)
pub const SLOT_RELIEF_DIAMETER: f64 = 0.75;

/// Slot rotation about the pin axis (degrees)
pub const SLOT_ANGLE_DEG: f64 = -45.0;
