//! Action dispatch for the command line

use std::io::Write;
use std::path::Path;

use coinholder_cad::{CadKernel, PieceKind, build_piece};
use coinholder_core::{AdjustableParameter, DimensionFile, DimensionSet, all_bounds, violations};

use crate::args::{CliAction, CliOptions, USAGE};
use crate::error::CliError;

/// Context for action handlers
pub struct ActionContext<'a> {
    pub dims: &'a DimensionSet,
    pub kernel: &'a dyn CadKernel,
}

impl<'a> ActionContext<'a> {
    pub fn new(dims: &'a DimensionSet, kernel: &'a dyn CadKernel) -> Self {
        Self { dims, kernel }
    }
}

/// Start from the dimension file (or the defaults) and apply the overrides in order
pub fn load_dimensions(options: &CliOptions) -> Result<DimensionSet, CliError> {
    let mut dims = match &options.dims_file {
        Some(path) => {
            tracing::info!("Loading dimensions from {}", path.display());
            DimensionFile::load(path)?.to_dimensions()?
        }
        None => DimensionSet::default(),
    };
    for (parameter, value) in &options.overrides {
        tracing::debug!("Override {parameter} = {value}");
        dims = dims.with(*parameter, *value)?;
    }

    for violation in violations(&dims) {
        tracing::warn!("{violation}");
    }
    Ok(dims)
}

/// Dispatch an action to the appropriate handler
pub fn dispatch_action(
    action: &CliAction,
    ctx: &ActionContext,
    out: &mut dyn Write,
) -> Result<(), CliError> {
    match action {
        CliAction::ShowBounds => report_bounds(ctx.dims, out),
        CliAction::Build(kind) => report_piece(*kind, ctx, out),
        CliAction::WriteDefaults(path) => write_defaults(path, out),
        CliAction::Help => {
            writeln!(out, "{USAGE}")?;
            Ok(())
        }
    }
}

fn report_bounds(dims: &DimensionSet, out: &mut dyn Write) -> Result<(), CliError> {
    let derived = dims.derived();
    writeln!(out, "Derived geometry")?;
    writeln!(out, "  coin radius             {:>8.3}", derived.coin_radius)?;
    writeln!(out, "  pin square width        {:>8.3}", derived.pin_position_square_width)?;
    writeln!(out, "  middle chip height      {:>8.3}", derived.mid_chip_height)?;
    writeln!(out, "  external chip height    {:>8.3}", derived.external_chip_height)?;
    writeln!(out, "  pin height              {:>8.3}", derived.pin_height)?;
    writeln!(out, "  pin base height         {:>8.3}", derived.pin_base_height)?;
    writeln!(out, "  head hole floor height  {:>8.3}", derived.pin_head_hole_height)?;
    writeln!(out, "  coin bore fillet        {:>8.3}", derived.corrected_coin_fillet)?;
    writeln!(out, "  pilot hole chamfer      {:>8.3}", derived.corrected_pin_chamfer)?;

    let bounds = all_bounds(dims);
    writeln!(out, "Bounds")?;
    for parameter in AdjustableParameter::ALL {
        let range = bounds.get(parameter);
        let value = dims.get(parameter.parameter());
        let flag = if !range.is_satisfiable() {
            "  (no legal value)"
        } else if !range.contains(value) {
            "  (out of range)"
        } else {
            ""
        };
        writeln!(out, "  {:<22}  {value:>8.2}  {range}{flag}", parameter.to_string())?;
    }
    Ok(())
}

fn report_piece(kind: PieceKind, ctx: &ActionContext, out: &mut dyn Write) -> Result<(), CliError> {
    let _span = tracing::info_span!("build", piece = %kind).entered();
    let solid = build_piece(kind, ctx.kernel, ctx.dims)
        .map_err(|source| CliError::Build { piece: kind, source })?;

    let measured = ctx
        .kernel
        .measure(&solid)
        .and_then(|props| ctx.kernel.get_edges(&solid).map(|edges| (props, edges.len())));
    ctx.kernel.release(&solid);
    let (props, edge_count) = measured?;

    let size = props.size();
    tracing::info!("Built {kind} piece with {edge_count} edges");
    writeln!(out, "{kind} piece")?;
    writeln!(out, "  size    {:.3} x {:.3} x {:.3}", size.x, size.y, size.z)?;
    writeln!(out, "  volume  {:.1}", props.volume)?;
    writeln!(out, "  edges   {edge_count}")?;
    Ok(())
}

fn write_defaults(path: &Path, out: &mut dyn Write) -> Result<(), CliError> {
    DimensionFile::from(&DimensionSet::default()).save(path)?;
    tracing::info!("Wrote default dimensions to {}", path.display());
    writeln!(out, "Wrote {}", path.display())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use coinholder_cad::{BuildStep, NullKernel, default_kernel};
    use coinholder_core::Parameter;

    fn run_action(action: CliAction, dims: &DimensionSet, kernel: &dyn CadKernel) -> String {
        let ctx = ActionContext::new(dims, kernel);
        let mut out: Vec<u8> = Vec::new();
        dispatch_action(&action, &ctx, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_bounds_report() {
        let dims = DimensionSet::default();
        let text = run_action(CliAction::ShowBounds, &dims, &NullKernel);
        assert!(text.contains("coinDiameter"));
        assert!(text.contains("[10.00, 48.50]"));
        assert!(!text.contains("out of range"));

        let dims = dims.with(Parameter::CoinDiameter, 49.0).unwrap();
        let text = run_action(CliAction::ShowBounds, &dims, &NullKernel);
        assert!(text.contains("(out of range)"));
    }

    #[test]
    fn test_build_report() {
        let kernel = default_kernel();
        let dims = DimensionSet::default();
        let text = run_action(CliAction::Build(PieceKind::Central), &dims, kernel.as_ref());
        assert!(text.starts_with("central piece"));
        assert!(text.contains("50.000 x 50.000 x 1.500"));
    }

    #[test]
    fn test_build_failure_names_piece_and_step() {
        let kernel = default_kernel();
        let dims = DimensionSet::default()
            .with(Parameter::CoinDiameter, 52.0)
            .unwrap();
        let ctx = ActionContext::new(&dims, kernel.as_ref());
        let mut out: Vec<u8> = Vec::new();
        let err =
            dispatch_action(&CliAction::Build(PieceKind::Central), &ctx, &mut out).unwrap_err();
        match err {
            CliError::Build { piece, source } => {
                assert_eq!(piece, PieceKind::Central);
                assert_eq!(source.step(), Some(BuildStep::CentralPlate));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_write_defaults_then_load_with_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("defaults.ron");
        run_action(
            CliAction::WriteDefaults(path.clone()),
            &DimensionSet::default(),
            &NullKernel,
        );

        let options = CliOptions {
            dims_file: Some(path),
            overrides: vec![(Parameter::CoinDiameter, 30.0)],
            actions: Vec::new(),
        };
        let dims = load_dimensions(&options).unwrap();
        assert_eq!(dims.coin_diameter(), 30.0);
        assert_eq!(dims.width(), DimensionSet::default().width());
    }

    #[test]
    fn test_invalid_override_value() {
        let options = CliOptions {
            overrides: vec![(Parameter::Width, -1.0)],
            ..Default::default()
        };
        assert!(matches!(
            load_dimensions(&options),
            Err(CliError::Dimensions(_))
        ));
    }
}
