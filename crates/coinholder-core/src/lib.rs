//! Core data for the coin holder parts
//!
//! Holds the raw dimension set, the geometry derived from it, the constraint
//! bounds on the adjustable parameters and the dimension file format.

pub mod constants;
pub mod constraints;
pub mod dimension_file;
pub mod dimensions;

pub use constraints::{
    AdjustableParameter, BoundViolation, Bounds, ConstraintBounds, all_bounds, bounds,
    ceil_to_hundredth, floor_to_hundredth, violations,
};
pub use dimension_file::{DimensionFile, DimensionFileError};
pub use dimensions::{DerivedGeometry, DimensionError, DimensionSet, Parameter};
