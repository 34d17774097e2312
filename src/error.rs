use std::io;

use thiserror::Error;

/// Error taxonomy for the radar pipeline.
///
/// Each variant corresponds to one of the five buckets in the error
/// handling design: configuration, source I/O, frame-level, numeric, and
/// downstream. Only `Config` and `SourceIo` are treated as fatal by
/// callers; the rest are recorded in `coordinator::counters::Counters`
/// and the pipeline continues.
#[derive(Debug, Error)]
pub enum RadarError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("source I/O error: {0}")]
    SourceIo(#[from] io::Error),

    #[error("malformed frame: {reason}")]
    FrameMalformed { reason: String },

    #[error("numeric error: {0}")]
    Numeric(String),

    #[error("downstream error: {0}")]
    Downstream(String),
}

pub type Result<T> = std::result::Result<T, RadarError>;
