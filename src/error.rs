use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::parsers::StatParseError;

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("parse error in {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: StatParseError,
    },
    #[error("filesystem error at {}: {source}", path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("archive error in {}: {source}", path.display())]
    Archive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },
    #[error("template error: {0}")]
    Template(#[from] tera::Error),
    #[error("context serialization error: {0}")]
    Context(#[from] serde_json::Error),
}

impl ReportError {
    pub fn fs(path: &Path, source: std::io::Error) -> Self {
        ReportError::Filesystem {
            path: path.to_path_buf(),
            source,
        }
    }

    pub fn parse(path: &Path, source: StatParseError) -> Self {
        ReportError::Parse {
            path: path.to_path_buf(),
            source,
        }
    }
}

pub type Result<T, E = ReportError> = std::result::Result<T, E>;
