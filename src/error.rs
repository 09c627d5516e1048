use std::{io, path::PathBuf};

use thiserror::Error;

use crate::types::{BodyPart, CanvasSize};

#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error("canvas has zero area ({}x{})", .0.width, .0.height)]
    ZeroSized(CanvasSize),
    #[error("frame buffer size mismatch: got {got}, expected {expected}")]
    FrameBufferMismatch { got: usize, expected: usize },
    #[error("image resize failed: {0}")]
    Resize(String),
}

#[derive(Debug, Error)]
pub enum TopologyError {
    #[error("{mesh} connector ({from}, {to}) exceeds {part} landmark count {count}")]
    IndexOutOfRange {
        mesh: &'static str,
        part: &'static str,
        from: usize,
        to: usize,
        count: usize,
    },
    #[error("pose landmark {name} is mapped to {actual}, expected {expected}")]
    NamedIndexMismatch {
        name: &'static str,
        expected: usize,
        actual: usize,
    },
    #[error("failed to read tessellation file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse tessellation file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl TopologyError {
    pub(crate) fn out_of_range(
        mesh: &'static str,
        part: BodyPart,
        connector: (usize, usize),
        count: usize,
    ) -> Self {
        TopologyError::IndexOutOfRange {
            mesh,
            part: part.label(),
            from: connector.0,
            to: connector.1,
            count,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Error)]
pub enum DetectorError {
    #[error("failed to read recorded results {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("recorded results {path}, line {line}: {source}")]
    Parse {
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("detector worker has stopped")]
    Disconnected,
}
