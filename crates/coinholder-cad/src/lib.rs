//! Coin holder geometry
//!
//! This crate provides:
//! - Abstract CAD kernel traits for geometry operations
//! - An analytic reference kernel for extrusions, circular sweeps and edge treatments
//! - A sketch layer with named workplanes and point-set placement
//! - Edge selectors by radius rank, bounding box or feature tag
//! - Builders for the central and external pieces

pub mod builder;
pub mod geom;
pub mod kernel;
pub mod selector;
pub mod sketch;

// Re-exports for convenience
pub use builder::{
    BuildError, BuildResult, BuildStep, PieceKind, build_piece, central_piece, external_piece,
};
pub use kernel::{
    AnalyticKernel, AnalyticKernelConfig, BooleanType, CadError, CadKernel, CadResult, EdgeCurve,
    EdgeId, EdgeInfo, NullKernel, Solid, SolidProperties, default_kernel,
};
pub use selector::{EdgeSelector, distinct_radii, select_edges};
pub use sketch::{PlaneName, Profile, Sketch, SketchPlane, TaggedWire, Wire2D};
