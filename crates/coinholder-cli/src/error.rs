//! CLI error type

use coinholder_cad::{BuildError, CadError, PieceKind};
use coinholder_core::{DimensionError, DimensionFileError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("unknown argument: {0}")]
    UnknownArgument(String),

    #[error("missing value for {0}")]
    MissingValue(String),

    #[error("invalid override '{0}', expected key=value")]
    InvalidOverride(String),

    #[error("unknown parameter: {0}")]
    UnknownParameter(String),

    #[error("unknown piece '{0}', expected central, external or both")]
    UnknownPiece(String),

    #[error(transparent)]
    DimensionFile(#[from] DimensionFileError),

    #[error(transparent)]
    Dimensions(#[from] DimensionError),

    #[error("{piece} piece: {source}")]
    Build {
        piece: PieceKind,
        #[source]
        source: BuildError,
    },

    #[error(transparent)]
    Kernel(#[from] CadError),

    #[error("output error: {0}")]
    Io(#[from] std::io::Error),
}
