//! Coin holder command-line front end
//!
//! Loads a dimension set, applies overrides from the command line and then
//! reports bounds or builds and measures the requested pieces.

pub mod actions;
pub mod args;
pub mod error;

use std::io::Write;

use coinholder_cad::default_kernel;

pub use actions::{ActionContext, dispatch_action, load_dimensions};
pub use args::{CliAction, CliOptions, USAGE, parse_args};
pub use error::CliError;

/// Run a parsed command line, writing reports to `out`
pub fn run(options: &CliOptions, out: &mut dyn Write) -> Result<(), CliError> {
    if options.actions.contains(&CliAction::Help) {
        writeln!(out, "{USAGE}")?;
        return Ok(());
    }

    let dims = load_dimensions(options)?;
    let kernel = default_kernel();
    let ctx = ActionContext::new(&dims, kernel.as_ref());
    for action in &options.actions {
        dispatch_action(action, &ctx, out)?;
    }
    Ok(())
}
