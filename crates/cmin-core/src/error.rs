use std::path::{Path, PathBuf};
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Core error type for cmin operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read config at {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config at {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to read event trace at {path}: {source}")]
    TraceRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse event trace at {path}: {source}")]
    TraceParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid event trace at {line}:{column}: {message}")]
    InvalidTrace {
        line: u32,
        column: u32,
        message: String,
    },

    #[error("Edits overlap: bytes {first_start}..{first_end} and {second_start}..{second_end}")]
    OverlappingEdits {
        first_start: u32,
        first_end: u32,
        second_start: u32,
        second_end: u32,
    },

    #[error("Edit at bytes {start}..{end} does not fit the source ({len} bytes)")]
    EditOutOfBounds { start: u32, end: u32, len: usize },

    #[error("{0}")]
    Other(String),
}

impl Error {
    #[must_use]
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Stable error code for machine-readable output.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Io(_) => "IO_ERROR",
            Self::ConfigRead { .. } => "CONFIG_READ_FAILED",
            Self::ConfigParse { .. } => "CONFIG_INVALID",
            Self::TraceRead { .. } => "TRACE_READ_FAILED",
            Self::TraceParse { .. } => "TRACE_PARSE_FAILED",
            Self::InvalidTrace { .. } => "TRACE_INVALID",
            Self::OverlappingEdits { .. } => "EDITS_OVERLAP",
            Self::EditOutOfBounds { .. } => "EDIT_OUT_OF_BOUNDS",
            Self::Other(_) => "MINIFY_FAILED",
        }
    }

    /// File the error is about, when there is one.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::ConfigRead { path, .. }
            | Self::ConfigParse { path, .. }
            | Self::TraceRead { path, .. }
            | Self::TraceParse { path, .. } => Some(path),
            _ => None,
        }
    }
}
