//! Constraint bounds for the adjustable parameters
//!
//! Each bound depends on the current values of the other parameters and is
//! recomputed on every call. The engine only reports bounds; clamping a value
//! after a dependency changed is left to the caller.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{
    BOUND_RESOLUTION, MAX_COIN_THICKNESS, MAX_HEIGHT, MAX_WIDTH, MIN_COIN_DIAMETER,
    MIN_COIN_THICKNESS, MIN_EXTERNAL_HEIGHT, MIN_HEIGHT, MIN_WIDTH,
};
use crate::dimensions::{DimensionSet, Parameter};

/// Tolerance (in grid steps) absorbing binary representation error before rounding
const GRID_SNAP_TOLERANCE: f64 = 1e-9;

/// Parameters whose legal range depends on the others
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AdjustableParameter {
    CoinDiameter,
    CoinThickness,
    Width,
    Height,
}

impl AdjustableParameter {
    pub const ALL: [AdjustableParameter; 4] = [
        AdjustableParameter::CoinDiameter,
        AdjustableParameter::CoinThickness,
        AdjustableParameter::Width,
        AdjustableParameter::Height,
    ];

    /// The underlying dimension
    pub fn parameter(self) -> Parameter {
        match self {
            AdjustableParameter::CoinDiameter => Parameter::CoinDiameter,
            AdjustableParameter::CoinThickness => Parameter::CoinThickness,
            AdjustableParameter::Width => Parameter::Width,
            AdjustableParameter::Height => Parameter::Height,
        }
    }

    pub fn from_parameter(parameter: Parameter) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.parameter() == parameter)
    }
}

impl fmt::Display for AdjustableParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.parameter().fmt(f)
    }
}

/// Closed legal range of one parameter (mm)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min: f64,
    pub max: f64,
}

impl Bounds {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    /// False when the dependencies leave no legal value at all
    pub fn is_satisfiable(&self) -> bool {
        self.min <= self.max
    }
}

impl fmt::Display for Bounds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:.2}, {:.2}]", self.min, self.max)
    }
}

/// Bounds of every adjustable parameter for one dimension set
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ConstraintBounds {
    pub coin_diameter: Bounds,
    pub coin_thickness: Bounds,
    pub width: Bounds,
    pub height: Bounds,
}

impl ConstraintBounds {
    pub fn get(&self, parameter: AdjustableParameter) -> Bounds {
        match parameter {
            AdjustableParameter::CoinDiameter => self.coin_diameter,
            AdjustableParameter::CoinThickness => self.coin_thickness,
            AdjustableParameter::Width => self.width,
            AdjustableParameter::Height => self.height,
        }
    }
}

/// An adjustable parameter currently outside its bounds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundViolation {
    pub parameter: AdjustableParameter,
    pub value: f64,
    pub bounds: Bounds,
}

impl fmt::Display for BoundViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} = {} is outside {}",
            self.parameter, self.value, self.bounds
        )
    }
}

fn grid_steps() -> f64 {
    (1.0 / BOUND_RESOLUTION).round()
}

/// Round down to the 0.01 mm grid
pub fn floor_to_hundredth(value: f64) -> f64 {
    let steps = grid_steps();
    (value * steps + GRID_SNAP_TOLERANCE).floor() / steps
}

/// Round up to the 0.01 mm grid
pub fn ceil_to_hundredth(value: f64) -> f64 {
    let steps = grid_steps();
    (value * steps - GRID_SNAP_TOLERANCE).ceil() / steps
}

/// Wall reserved on each side of the coin by the two external chips
fn external_allowance(dims: &DimensionSet) -> f64 {
    2.0 * (MIN_EXTERNAL_HEIGHT + dims.screen_thickness())
}

/// Legal range of one adjustable parameter given the current values of the others
pub fn bounds(parameter: AdjustableParameter, dims: &DimensionSet) -> Bounds {
    match parameter {
        AdjustableParameter::CoinDiameter => Bounds::new(
            MIN_COIN_DIAMETER,
            floor_to_hundredth(dims.width() - 2.0 * dims.corrected_coin_fillet()),
        ),
        AdjustableParameter::CoinThickness => Bounds::new(
            MIN_COIN_THICKNESS,
            floor_to_hundredth(dims.height() - external_allowance(dims)).min(MAX_COIN_THICKNESS),
        ),
        AdjustableParameter::Width => Bounds::new(
            ceil_to_hundredth(dims.coin_diameter() + 2.0 * dims.corrected_coin_fillet())
                .max(MIN_WIDTH),
            MAX_WIDTH,
        ),
        AdjustableParameter::Height => Bounds::new(
            ceil_to_hundredth(dims.coin_thickness() + external_allowance(dims)).max(MIN_HEIGHT),
            MAX_HEIGHT,
        ),
    }
}

/// Bounds of all four adjustable parameters
pub fn all_bounds(dims: &DimensionSet) -> ConstraintBounds {
    ConstraintBounds {
        coin_diameter: bounds(AdjustableParameter::CoinDiameter, dims),
        coin_thickness: bounds(AdjustableParameter::CoinThickness, dims),
        width: bounds(AdjustableParameter::Width, dims),
        height: bounds(AdjustableParameter::Height, dims),
    }
}

/// Adjustable parameters whose current value lies outside its bounds
pub fn violations(dims: &DimensionSet) -> Vec<BoundViolation> {
    AdjustableParameter::ALL
        .into_iter()
        .filter_map(|parameter| {
            let value = dims.get(parameter.parameter());
            let bounds = bounds(parameter, dims);
            (!bounds.contains(value)).then_some(BoundViolation {
                parameter,
                value,
                bounds,
            })
        })
        .collect()
}
