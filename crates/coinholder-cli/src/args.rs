//! Command-line parsing

use std::path::PathBuf;

use coinholder_cad::PieceKind;
use coinholder_core::Parameter;

use crate::error::CliError;

pub const USAGE: &str = "\
Usage: coinholder [OPTIONS]

Options:
  --dims <FILE>            Load dimensions from a RON file
  --set <KEY=VALUE>        Override one dimension (repeatable)
  --piece <central|external|both>
                           Build and measure the given pieces
  --bounds                 Print derived geometry and constraint bounds
  --write-defaults <FILE>  Write the default dimension file and exit
  -h, --help               Print this help

Without an action, both pieces are built.";

/// Something the user asked for
#[derive(Debug, Clone, PartialEq)]
pub enum CliAction {
    ShowBounds,
    Build(PieceKind),
    WriteDefaults(PathBuf),
    Help,
}

/// Parsed command line
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CliOptions {
    pub dims_file: Option<PathBuf>,
    pub overrides: Vec<(Parameter, f64)>,
    pub actions: Vec<CliAction>,
}

/// Parse the arguments following the program name
pub fn parse_args<I>(args: I) -> Result<CliOptions, CliError>
where
    I: IntoIterator<Item = String>,
{
    let mut options = CliOptions::default();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--dims" => options.dims_file = Some(value_for(&arg, args.next())?.into()),
            "--set" => {
                let value = value_for(&arg, args.next())?;
                options.overrides.push(parse_override(&value)?);
            }
            "--piece" => {
                let value = value_for(&arg, args.next())?;
                for kind in parse_pieces(&value)? {
                    options.actions.push(CliAction::Build(kind));
                }
            }
            "--bounds" => options.actions.push(CliAction::ShowBounds),
            "--write-defaults" => {
                let path = value_for(&arg, args.next())?;
                options.actions.push(CliAction::WriteDefaults(path.into()));
            }
            "-h" | "--help" => options.actions.push(CliAction::Help),
            _ => return Err(CliError::UnknownArgument(arg)),
        }
    }

    if options.actions.is_empty() {
        options
            .actions
            .extend(PieceKind::ALL.into_iter().map(CliAction::Build));
    }
    Ok(options)
}

fn value_for(flag: &str, value: Option<String>) -> Result<String, CliError> {
    value
        .filter(|v| !v.starts_with("--"))
        .ok_or_else(|| CliError::MissingValue(flag.to_string()))
}

/// Parse `key=value` where `key` is a dimension file key
fn parse_override(text: &str) -> Result<(Parameter, f64), CliError> {
    let (key, value) = text
        .split_once('=')
        .ok_or_else(|| CliError::InvalidOverride(text.to_string()))?;
    let parameter = Parameter::from_key(key.trim())
        .ok_or_else(|| CliError::UnknownParameter(key.trim().to_string()))?;
    let value = value
        .trim()
        .parse::<f64>()
        .map_err(|_| CliError::InvalidOverride(text.to_string()))?;
    Ok((parameter, value))
}

fn parse_pieces(text: &str) -> Result<Vec<PieceKind>, CliError> {
    match text {
        "central" => Ok(vec![PieceKind::Central]),
        "external" => Ok(vec![PieceKind::External]),
        "both" => Ok(PieceKind::ALL.to_vec()),
        other => Err(CliError::UnknownPiece(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<CliOptions, CliError> {
        parse_args(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_defaults_to_building_both() {
        let options = parse(&[]).unwrap();
        assert_eq!(
            options.actions,
            vec![
                CliAction::Build(PieceKind::Central),
                CliAction::Build(PieceKind::External)
            ]
        );
        assert!(options.dims_file.is_none());
    }

    #[test]
    fn test_full_command_line() {
        let options = parse(&[
            "--dims",
            "holder.ron",
            "--set",
            "coinDiameter=40",
            "--set",
            "width = 52.5",
            "--bounds",
            "--piece",
            "external",
        ])
        .unwrap();
        assert_eq!(options.dims_file, Some(PathBuf::from("holder.ron")));
        assert_eq!(
            options.overrides,
            vec![(Parameter::CoinDiameter, 40.0), (Parameter::Width, 52.5)]
        );
        assert_eq!(
            options.actions,
            vec![CliAction::ShowBounds, CliAction::Build(PieceKind::External)]
        );
    }

    #[test]
    fn test_rejects_bad_arguments() {
        assert!(matches!(parse(&["--frobnicate"]), Err(CliError::UnknownArgument(_))));
        assert!(matches!(parse(&["--dims"]), Err(CliError::MissingValue(_))));
        assert!(matches!(
            parse(&["--dims", "--bounds"]),
            Err(CliError::MissingValue(_))
        ));
        assert!(matches!(parse(&["--set", "width"]), Err(CliError::InvalidOverride(_))));
        assert!(matches!(
            parse(&["--set", "width=wide"]),
            Err(CliError::InvalidOverride(_))
        ));
        assert!(matches!(
            parse(&["--set", "depth=3"]),
            Err(CliError::UnknownParameter(_))
        ));
        assert!(matches!(parse(&["--piece", "lid"]), Err(CliError::UnknownPiece(_))));
    }
}
