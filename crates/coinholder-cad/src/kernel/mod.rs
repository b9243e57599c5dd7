//! CAD kernel abstraction and the built-in analytic backend

pub mod analytic;
mod traits;

pub use analytic::{AnalyticKernel, AnalyticKernelConfig};
pub use traits::*;

/// Get the default CAD kernel
pub fn default_kernel() -> Box<dyn CadKernel> {
    Box::new(AnalyticKernel::new())
}
