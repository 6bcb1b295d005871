use miette::Diagnostic;
use thiserror::Error;

/// Main error type for mbf operations
#[derive(Error, Diagnostic, Debug)]
pub enum MbfError {
    #[error("IO error: {0}")]
    #[diagnostic(code(mbf::io))]
    IoError(#[from] std::io::Error),

    #[error("IO error with {path}: {message}")]
    #[diagnostic(code(mbf::io))]
    Io {
        path: std::path::PathBuf,
        message: String,
    },

    #[error("Unexpected end of input at line {line} while reading {state}")]
    #[diagnostic(
        code(mbf::parse::eof),
        help("A bracketed record was still open when the file ended; the file is probably truncated")
    )]
    UnexpectedEndOfInput { state: String, line: usize },

    #[error("Parse error: {message}")]
    #[diagnostic(code(mbf::parse))]
    Parse {
        message: String,
        #[help]
        help: Option<String>,
    },

    #[error(transparent)]
    #[diagnostic(code(mbf::geometry))]
    Geometry(#[from] GeometryError),

    #[error("Build error: {message}")]
    #[diagnostic(code(mbf::build))]
    Build {
        message: String,
        #[help]
        help: Option<String>,
    },
}

/// Input contract violations of the geometry engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GeometryError {
    #[error("face {face} references vertex {index}, but only {vertices} vertices exist")]
    InvalidFaceIndex {
        face: usize,
        index: usize,
        vertices: usize,
    },

    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("unsupported dimension {0}: only 2D and 3D boundaries are supported")]
    UnsupportedDimension(usize),

    #[error("3D boundaries require an explicit face list")]
    MissingFaces,
}

pub type Result<T> = std::result::Result<T, MbfError>;
