//! CAD Kernel trait definitions
//!
//! These traits define the interface that every geometry kernel must
//! implement for the part builders to drive it.

use glam::DVec3;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::sketch::Profile;

/// Unique identifier for an edge within a solid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EdgeId {
    /// ID of the solid this edge belongs to
    pub solid_id: Uuid,
    /// Index of the edge within the solid
    pub index: u32,
}

impl EdgeId {
    /// Create a new edge ID
    pub fn new(solid_id: Uuid, index: u32) -> Self {
        Self { solid_id, index }
    }
}

/// Geometry of an edge
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EdgeCurve {
    /// Straight segment from `start` to `end`
    Line,
    /// Circular arc in a plane perpendicular to `axis`.
    ///
    /// `sweep` is the counter-clockwise angular span starting at
    /// `start_angle`; a full circle has `sweep == TAU`.
    Arc {
        center: DVec3,
        axis: DVec3,
        radius: f64,
        start_angle: f64,
        sweep: f64,
    },
}

/// Information about an edge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeInfo {
    /// Unique identifier for this edge
    pub id: EdgeId,
    pub curve: EdgeCurve,
    /// Start point of the edge
    pub start: DVec3,
    /// End point of the edge (equal to `start` for a full circle)
    pub end: DVec3,
    /// Center of mass of the edge curve
    pub centroid: DVec3,
    /// Length of the edge
    pub length: f64,
    pub bbox_min: DVec3,
    pub bbox_max: DVec3,
    /// Tag of the sketch wire the edge was created from
    pub tag: Option<String>,
}

impl EdgeInfo {
    /// Radius of a circular edge
    pub fn radius(&self) -> Option<f64> {
        match self.curve {
            EdgeCurve::Line => None,
            EdgeCurve::Arc { radius, .. } => Some(radius),
        }
    }

    pub fn is_full_circle(&self) -> bool {
        matches!(self.curve, EdgeCurve::Arc { sweep, .. } if sweep >= std::f64::consts::TAU - 1e-9)
    }
}

/// Bounding box and volume of a solid
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolidProperties {
    pub bbox_min: DVec3,
    pub bbox_max: DVec3,
    /// Enclosed volume (mm³)
    pub volume: f64,
}

impl SolidProperties {
    pub fn size(&self) -> DVec3 {
        self.bbox_max - self.bbox_min
    }
}

/// Error type for CAD kernel operations
#[derive(Debug, Clone, Error)]
pub enum CadError {
    #[error("Invalid profile: {0}")]
    InvalidProfile(String),

    #[error("Boolean operation failed: {0}")]
    BooleanFailed(String),

    #[error("Fillet failed: {0}")]
    FilletFailed(String),

    #[error("Chamfer failed: {0}")]
    ChamferFailed(String),

    #[error("Sweep failed: {0}")]
    SweepFailed(String),

    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    #[error("Unknown solid: {0}")]
    UnknownSolid(Uuid),

    #[error("Unknown edge {index} on solid {solid_id}")]
    UnknownEdge { solid_id: Uuid, index: u32 },

    #[error("Kernel not available: {0}")]
    KernelNotAvailable(String),
}

/// Result type for CAD operations
pub type CadResult<T> = Result<T, CadError>;

/// Handle to a solid owned by a kernel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Solid {
    /// Unique identifier
    pub id: Uuid,
}

impl Solid {
    /// Create a new solid handle with the given ID
    pub fn new(id: Uuid) -> Self {
        Self { id }
    }
}

/// Boolean operation type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BooleanType {
    /// Union (add)
    Union,
    /// Subtraction (cut)
    Subtract,
    /// Intersection (common)
    Intersect,
}

/// The main CAD kernel trait
///
/// Solids are immutable once created: every operation returns a new handle
/// and leaves its inputs untouched.
pub trait CadKernel: Send + Sync {
    /// Get the name of this kernel
    fn name(&self) -> &str;

    /// Extrude every wire of a profile along the plane normal
    ///
    /// # Arguments
    /// * `profile` - Closed wires; nested wires alternate between material and hole
    /// * `distance` - The extrusion distance (negative extrudes against the normal)
    fn extrude(&self, profile: &Profile, distance: f64) -> CadResult<Solid>;

    /// Perform a boolean operation on two solids
    ///
    /// # Arguments
    /// * `a` - The first solid
    /// * `b` - The second solid
    /// * `op` - The boolean operation type
    fn boolean(&self, a: &Solid, b: &Solid, op: BooleanType) -> CadResult<Solid>;

    /// Sweep a profile along a path
    ///
    /// # Arguments
    /// * `profile` - The closed section to sweep
    /// * `path` - Profile holding the path wire
    fn sweep(&self, profile: &Profile, path: &Profile) -> CadResult<Solid>;

    // ========== Edge Query Methods ==========

    /// Get all edges of a solid, in a deterministic order
    fn get_edges(&self, solid: &Solid) -> CadResult<Vec<EdgeInfo>>;

    // ========== Fillet/Chamfer Methods ==========

    /// Apply fillet (rounded edge) to selected edges
    ///
    /// # Arguments
    /// * `solid` - The solid to modify
    /// * `edges` - Edge IDs to fillet
    /// * `radius` - Fillet radius
    fn fillet(&self, solid: &Solid, edges: &[EdgeId], radius: f64) -> CadResult<Solid>;

    /// Apply chamfer (beveled edge) to selected edges
    ///
    /// # Arguments
    /// * `solid` - The solid to modify
    /// * `edges` - Edge IDs to chamfer
    /// * `distance` - Chamfer distance
    fn chamfer(&self, solid: &Solid, edges: &[EdgeId], distance: f64) -> CadResult<Solid>;

    // ========== Inspection ==========

    /// Bounding box and volume of a solid
    fn measure(&self, solid: &Solid) -> CadResult<SolidProperties>;

    /// Whether a point lies inside the material of a solid
    fn contains_point(&self, solid: &Solid, point: DVec3) -> CadResult<bool>;

    /// Drop the kernel data behind a handle. Unknown handles are ignored.
    fn release(&self, solid: &Solid);
}

/// A null kernel that always returns errors (used when no kernel is available)
#[derive(Debug, Default)]
pub struct NullKernel;

impl NullKernel {
    fn unavailable<T>() -> CadResult<T> {
        Err(CadError::KernelNotAvailable(
            "No CAD kernel available".into(),
        ))
    }
}

impl CadKernel for NullKernel {
    fn name(&self) -> &str {
        "null"
    }

    fn extrude(&self, _profile: &Profile, _distance: f64) -> CadResult<Solid> {
        Self::unavailable()
    }

    fn boolean(&self, _a: &Solid, _b: &Solid, _op: BooleanType) -> CadResult<Solid> {
        Self::unavailable()
    }

    fn sweep(&self, _profile: &Profile, _path: &Profile) -> CadResult<Solid> {
        Self::unavailable()
    }

    fn get_edges(&self, _solid: &Solid) -> CadResult<Vec<EdgeInfo>> {
        Self::unavailable()
    }

    fn fillet(&self, _solid: &Solid, _edges: &[EdgeId], _radius: f64) -> CadResult<Solid> {
        Self::unavailable()
    }

    fn chamfer(&self, _solid: &Solid, _edges: &[EdgeId], _distance: f64) -> CadResult<Solid> {
        Self::unavailable()
    }

    fn measure(&self, _solid: &Solid) -> CadResult<SolidProperties> {
        Self::unavailable()
    }

    fn contains_point(&self, _solid: &Solid, _point: DVec3) -> CadResult<bool> {
        Self::unavailable()
    }

    fn release(&self, _solid: &Solid) {}
}
