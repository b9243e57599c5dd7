//! Ownership of the solids created during one build

use crate::kernel::{BooleanType, CadKernel, CadResult, EdgeId, Solid};
use crate::selector::{EdgeSelector, select_edges};
use crate::sketch::Profile;

use super::{BuildError, BuildResult, BuildStep};

/// Tracks every solid a build creates and releases them from the kernel when
/// dropped, except the one handed out by [`SolidScope::keep`].
pub(crate) struct SolidScope<'k> {
    kernel: &'k dyn CadKernel,
    solids: Vec<Solid>,
}

impl<'k> SolidScope<'k> {
    pub fn new(kernel: &'k dyn CadKernel) -> Self {
        Self {
            kernel,
            solids: Vec::new(),
        }
    }

    fn track(&mut self, step: BuildStep, result: CadResult<Solid>) -> BuildResult<Solid> {
        let solid = result.map_err(|source| BuildError::Kernel { step, source })?;
        self.solids.push(solid);
        Ok(solid)
    }

    pub fn extrude(&mut self, step: BuildStep, profile: &Profile, distance: f64) -> BuildResult<Solid> {
        let result = self.kernel.extrude(profile, distance);
        self.track(step, result)
    }

    pub fn sweep(&mut self, step: BuildStep, profile: &Profile, path: &Profile) -> BuildResult<Solid> {
        let result = self.kernel.sweep(profile, path);
        self.track(step, result)
    }

    pub fn union(&mut self, step: BuildStep, a: Solid, b: Solid) -> BuildResult<Solid> {
        let result = self.kernel.boolean(&a, &b, BooleanType::Union);
        self.track(step, result)
    }

    pub fn cut(&mut self, step: BuildStep, a: Solid, b: Solid) -> BuildResult<Solid> {
        let result = self.kernel.boolean(&a, &b, BooleanType::Subtract);
        self.track(step, result)
    }

    pub fn fillet(
        &mut self,
        step: BuildStep,
        solid: Solid,
        selector: &EdgeSelector,
        radius: f64,
    ) -> BuildResult<Solid> {
        let edges = self.select(step, solid, selector)?;
        tracing::debug!("{}: fillet {} edges with radius {}", step, edges.len(), radius);
        let result = self.kernel.fillet(&solid, &edges, radius);
        self.track(step, result)
    }

    pub fn chamfer(
        &mut self,
        step: BuildStep,
        solid: Solid,
        selector: &EdgeSelector,
        distance: f64,
    ) -> BuildResult<Solid> {
        let edges = self.select(step, solid, selector)?;
        tracing::debug!("{}: chamfer {} edges by {}", step, edges.len(), distance);
        let result = self.kernel.chamfer(&solid, &edges, distance);
        self.track(step, result)
    }

    fn select(
        &self,
        step: BuildStep,
        solid: Solid,
        selector: &EdgeSelector,
    ) -> BuildResult<Vec<EdgeId>> {
        let edges = self
            .kernel
            .get_edges(&solid)
            .map_err(|source| BuildError::Kernel { step, source })?;
        Ok(select_edges(&edges, selector))
    }

    /// Take `solid` out of the scope; everything else is released on drop
    pub fn keep(mut self, solid: Solid) -> Solid {
        self.solids.retain(|s| *s != solid);
        solid
    }
}

impl Drop for SolidScope<'_> {
    fn drop(&mut self) {
        if !self.solids.is_empty() {
            tracing::trace!("Releasing {} intermediate solids", self.solids.len());
        }
        for solid in self.solids.drain(..) {
            self.kernel.release(&solid);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::{AnalyticKernel, CadError};
    use crate::sketch::{Sketch, SketchPlane};

    #[test]
    fn test_intermediates_are_released() {
        let kernel = AnalyticKernel::new();
        let kept = {
            let mut scope = SolidScope::new(&kernel);
            let plate = Sketch::new(SketchPlane::xy()).rect(4.0, 4.0).profile();
            let post = Sketch::new(SketchPlane::xy()).circle(1.0).profile();
            let a = scope.extrude(BuildStep::BasePlate, &plate, 1.0).unwrap();
            let b = scope.extrude(BuildStep::PinPosts, &post, 2.0).unwrap();
            let joined = scope.union(BuildStep::PinPosts, a, b).unwrap();
            scope.keep(joined)
        };
        assert_eq!(kernel.solid_count(), 1);
        assert!(kernel.measure(&kept).is_ok());
    }

    #[test]
    fn test_failure_releases_everything() {
        let kernel = AnalyticKernel::new();
        let result = {
            let mut scope = SolidScope::new(&kernel);
            let plate = Sketch::new(SketchPlane::xy()).rect(4.0, 4.0).profile();
            scope
                .extrude(BuildStep::BasePlate, &plate, 1.0)
                .and_then(|solid| {
                    scope.fillet(
                        BuildStep::FlangeFillet,
                        solid,
                        &EdgeSelector::tagged("missing"),
                        0.1,
                    )
                })
        };
        assert!(matches!(
            result,
            Err(BuildError::Kernel {
                step: BuildStep::FlangeFillet,
                source: CadError::FilletFailed(_)
            })
        ));
        assert_eq!(kernel.solid_count(), 0);
    }
}
