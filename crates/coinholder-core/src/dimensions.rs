//! Dimension set and derived geometry
//!
//! A [`DimensionSet`] is an immutable value holding the raw millimetre
//! dimensions of both parts. Every derived quantity is computed on demand from
//! it; nothing is cached, so a derived value can never go stale.

use std::collections::HashMap;
use std::fmt;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::constants::{
    PIN_BASE_HEIGHT_OFFSET, PIN_HEAD_HOLE_HEIGHT_OFFSET, PIN_HEIGHT_OFFSET, RADIUS_CLIP_EPSILON,
};

/// Errors raised while constructing or editing a dimension set
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DimensionError {
    #[error("missing parameter: {0}")]
    MissingParameter(String),
    #[error("parameter {name} must be a positive finite value, got {value}")]
    NonPositive { name: &'static str, value: f64 },
    #[error("inner width {inner_width} exceeds width {width}")]
    InnerWidthExceedsWidth { width: f64, inner_width: f64 },
}

/// Named dimension of the part pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Parameter {
    Width,
    InnerWidth,
    Height,
    CoinDiameter,
    CoinThickness,
    PinDiagonalDistance,
    PinHoleDiameter,
    CoinFillet,
    PinChamfer,
    PinBaseDiameter,
    PinDiameter,
    PinHeadHoleDiameter,
    ScreenThickness,
}

impl Parameter {
    /// All parameters in persisted order
    pub const ALL: [Parameter; 13] = [
        Parameter::Width,
        Parameter::InnerWidth,
        Parameter::Height,
        Parameter::CoinDiameter,
        Parameter::CoinThickness,
        Parameter::PinDiagonalDistance,
        Parameter::PinHoleDiameter,
        Parameter::CoinFillet,
        Parameter::PinChamfer,
        Parameter::PinBaseDiameter,
        Parameter::PinDiameter,
        Parameter::PinHeadHoleDiameter,
        Parameter::ScreenThickness,
    ];

    /// Key used in dimension files
    pub fn key(self) -> &'static str {
        match self {
            Parameter::Width => "width",
            Parameter::InnerWidth => "innerWidth",
            Parameter::Height => "height",
            Parameter::CoinDiameter => "coinDiameter",
            Parameter::CoinThickness => "coinThickness",
            Parameter::PinDiagonalDistance => "pinDiagonalDistance",
            Parameter::PinHoleDiameter => "pinHoleDiameter",
            Parameter::CoinFillet => "coinFillet",
            Parameter::PinChamfer => "pinChamfer",
            Parameter::PinBaseDiameter => "pinBaseDiameter",
            Parameter::PinDiameter => "pinDiameter",
            Parameter::PinHeadHoleDiameter => "pinHeadHoleDiameter",
            Parameter::ScreenThickness => "screenThickness",
        }
    }

    /// Look up a parameter by its file key
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.key() == key)
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Raw dimensions of the coin holder, all in millimetres
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DimensionSet {
    width: f64,
    inner_width: f64,
    height: f64,
    coin_diameter: f64,
    coin_thickness: f64,
    pin_diagonal_distance: f64,
    pin_hole_diameter: f64,
    coin_fillet: f64,
    pin_chamfer: f64,
    pin_base_diameter: f64,
    pin_diameter: f64,
    pin_head_hole_diameter: f64,
    screen_thickness: f64,
}

impl Default for DimensionSet {
    fn default() -> Self {
        Self {
            width: 50.0,
            inner_width: 38.0,
            height: 6.0,
            coin_diameter: 46.0,
            coin_thickness: 1.5,
            pin_diagonal_distance: 4.6,
            pin_hole_diameter: 1.5,
            coin_fillet: 0.75,
            pin_chamfer: 0.5,
            pin_base_diameter: 1.6,
            pin_diameter: 1.4,
            pin_head_hole_diameter: 1.45,
            screen_thickness: 0.15,
        }
    }
}

impl DimensionSet {
    /// Build a dimension set from a flat key → millimetre map.
    ///
    /// Every parameter is required; no default is substituted for a missing
    /// key. Unknown keys are ignored.
    pub fn from_map(values: &HashMap<String, f64>) -> Result<Self, DimensionError> {
        for key in values.keys() {
            if Parameter::from_key(key).is_none() {
                tracing::warn!("Ignoring unknown dimension key '{}'", key);
            }
        }

        let get = |p: Parameter| {
            values
                .get(p.key())
                .copied()
                .ok_or_else(|| DimensionError::MissingParameter(p.key().to_string()))
        };

        let dims = Self {
            width: get(Parameter::Width)?,
            inner_width: get(Parameter::InnerWidth)?,
            height: get(Parameter::Height)?,
            coin_diameter: get(Parameter::CoinDiameter)?,
            coin_thickness: get(Parameter::CoinThickness)?,
            pin_diagonal_distance: get(Parameter::PinDiagonalDistance)?,
            pin_hole_diameter: get(Parameter::PinHoleDiameter)?,
            coin_fillet: get(Parameter::CoinFillet)?,
            pin_chamfer: get(Parameter::PinChamfer)?,
            pin_base_diameter: get(Parameter::PinBaseDiameter)?,
            pin_diameter: get(Parameter::PinDiameter)?,
            pin_head_hole_diameter: get(Parameter::PinHeadHoleDiameter)?,
            screen_thickness: get(Parameter::ScreenThickness)?,
        };
        dims.validate()?;
        Ok(dims)
    }

    /// Flatten into a key → millimetre map
    pub fn to_map(&self) -> HashMap<String, f64> {
        Parameter::ALL
            .into_iter()
            .map(|p| (p.key().to_string(), self.get(p)))
            .collect()
    }

    /// Check the value invariants: all positive, width ≥ inner width
    pub fn validate(&self) -> Result<(), DimensionError> {
        for p in Parameter::ALL {
            let value = self.get(p);
            if !value.is_finite() || value <= 0.0 {
                return Err(DimensionError::NonPositive {
                    name: p.key(),
                    value,
                });
            }
        }
        if self.width < self.inner_width {
            return Err(DimensionError::InnerWidthExceedsWidth {
                width: self.width,
                inner_width: self.inner_width,
            });
        }
        Ok(())
    }

    /// Read a raw parameter value
    pub fn get(&self, parameter: Parameter) -> f64 {
        match parameter {
            Parameter::Width => self.width,
            Parameter::InnerWidth => self.inner_width,
            Parameter::Height => self.height,
            Parameter::CoinDiameter => self.coin_diameter,
            Parameter::CoinThickness => self.coin_thickness,
            Parameter::PinDiagonalDistance => self.pin_diagonal_distance,
            Parameter::PinHoleDiameter => self.pin_hole_diameter,
            Parameter::CoinFillet => self.coin_fillet,
            Parameter::PinChamfer => self.pin_chamfer,
            Parameter::PinBaseDiameter => self.pin_base_diameter,
            Parameter::PinDiameter => self.pin_diameter,
            Parameter::PinHeadHoleDiameter => self.pin_head_hole_diameter,
            Parameter::ScreenThickness => self.screen_thickness,
        }
    }

    /// Return a copy with one parameter replaced.
    ///
    /// Only the value invariants are checked. Constraint bounds are the
    /// caller's business.
    pub fn with(&self, parameter: Parameter, value: f64) -> Result<Self, DimensionError> {
        let mut next = *self;
        let slot = match parameter {
            Parameter::Width => &mut next.width,
            Parameter::InnerWidth => &mut next.inner_width,
            Parameter::Height => &mut next.height,
            Parameter::CoinDiameter => &mut next.coin_diameter,
            Parameter::CoinThickness => &mut next.coin_thickness,
            Parameter::PinDiagonalDistance => &mut next.pin_diagonal_distance,
            Parameter::PinHoleDiameter => &mut next.pin_hole_diameter,
            Parameter::CoinFillet => &mut next.coin_fillet,
            Parameter::PinChamfer => &mut next.pin_chamfer,
            Parameter::PinBaseDiameter => &mut next.pin_base_diameter,
            Parameter::PinDiameter => &mut next.pin_diameter,
            Parameter::PinHeadHoleDiameter => &mut next.pin_head_hole_diameter,
            Parameter::ScreenThickness => &mut next.screen_thickness,
        };
        *slot = value;
        next.validate()?;
        Ok(next)
    }

    // ============== Raw accessors ==============

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn inner_width(&self) -> f64 {
        self.inner_width
    }

    pub fn height(&self) -> f64 {
        self.height
    }

    pub fn coin_diameter(&self) -> f64 {
        self.coin_diameter
    }

    pub fn coin_thickness(&self) -> f64 {
        self.coin_thickness
    }

    pub fn pin_diagonal_distance(&self) -> f64 {
        self.pin_diagonal_distance
    }

    pub fn pin_hole_diameter(&self) -> f64 {
        self.pin_hole_diameter
    }

    pub fn coin_fillet(&self) -> f64 {
        self.coin_fillet
    }

    pub fn pin_chamfer(&self) -> f64 {
        self.pin_chamfer
    }

    pub fn pin_base_diameter(&self) -> f64 {
        self.pin_base_diameter
    }

    pub fn pin_diameter(&self) -> f64 {
        self.pin_diameter
    }

    pub fn pin_head_hole_diameter(&self) -> f64 {
        self.pin_head_hole_diameter
    }

    pub fn screen_thickness(&self) -> f64 {
        self.screen_thickness
    }

    // ============== Derived geometry ==============

    pub fn half_width(&self) -> f64 {
        self.width / 2.0
    }

    pub fn coin_radius(&self) -> f64 {
        self.coin_diameter / 2.0
    }

    /// Per-axis offset of a pin from the plate corner
    pub fn pin_linear_distance(&self) -> f64 {
        (self.pin_diagonal_distance.powi(2) / 2.0).sqrt()
    }

    /// Side of the square whose vertices carry the pins
    pub fn pin_position_square_width(&self) -> f64 {
        self.width - 2.0 * self.pin_linear_distance()
    }

    /// Per-axis distance of every pin and head-hole anchor from the center
    pub fn diagonal_offset(&self) -> f64 {
        self.half_width() - self.pin_linear_distance()
    }

    /// Pin post anchors: (+a, +a) and (−a, −a)
    pub fn first_diagonal(&self) -> [DVec2; 2] {
        let a = self.diagonal_offset();
        [DVec2::new(a, a), DVec2::new(-a, -a)]
    }

    /// Head-hole anchors: (+a, −a) and (−a, +a)
    pub fn second_diagonal(&self) -> [DVec2; 2] {
        let a = self.diagonal_offset();
        [DVec2::new(a, -a), DVec2::new(-a, a)]
    }

    pub fn mid_chip_height(&self) -> f64 {
        self.coin_thickness
    }

    pub fn external_chip_height(&self) -> f64 {
        (self.height - self.coin_thickness) / 2.0 - self.screen_thickness
    }

    /// Pin tip height; the pin runs through the middle chip
    pub fn pin_height(&self) -> f64 {
        self.mid_chip_height() + self.external_chip_height() + PIN_HEIGHT_OFFSET
    }

    pub fn pin_base_height(&self) -> f64 {
        self.external_chip_height() + PIN_BASE_HEIGHT_OFFSET
    }

    pub fn pin_head_hole_height(&self) -> f64 {
        self.external_chip_height() + PIN_HEAD_HOLE_HEIGHT_OFFSET
    }

    /// Coin fillet clipped below half the middle chip thickness
    pub fn corrected_coin_fillet(&self) -> f64 {
        clip_radius(self.coin_fillet, self.mid_chip_height())
    }

    /// Pin chamfer clipped below half the middle chip thickness
    pub fn corrected_pin_chamfer(&self) -> f64 {
        clip_radius(self.pin_chamfer, self.mid_chip_height())
    }

    /// Snapshot of every derived quantity, for reporting
    pub fn derived(&self) -> DerivedGeometry {
        DerivedGeometry {
            coin_radius: self.coin_radius(),
            pin_linear_distance: self.pin_linear_distance(),
            pin_position_square_width: self.pin_position_square_width(),
            first_diagonal: self.first_diagonal().map(|p| p.to_array()),
            second_diagonal: self.second_diagonal().map(|p| p.to_array()),
            mid_chip_height: self.mid_chip_height(),
            external_chip_height: self.external_chip_height(),
            pin_height: self.pin_height(),
            pin_base_height: self.pin_base_height(),
            pin_head_hole_height: self.pin_head_hole_height(),
            corrected_coin_fillet: self.corrected_coin_fillet(),
            corrected_pin_chamfer: self.corrected_pin_chamfer(),
        }
    }
}

/// Clip an edge-breaking radius so it never consumes a whole edge
fn clip_radius(requested: f64, thickness: f64) -> f64 {
    requested.min(thickness / 2.0 - RADIUS_CLIP_EPSILON)
}

/// Derived quantities of a dimension set at one point in time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DerivedGeometry {
    pub coin_radius: f64,
    pub pin_linear_distance: f64,
    pub pin_position_square_width: f64,
    pub first_diagonal: [[f64; 2]; 2],
    pub second_diagonal: [[f64; 2]; 2],
    pub mid_chip_height: f64,
    pub external_chip_height: f64,
    pub pin_height: f64,
    pub pin_base_height: f64,
    pub pin_head_hole_height: f64,
    pub corrected_coin_fillet: f64,
    pub corrected_pin_chamfer: f64,
}
