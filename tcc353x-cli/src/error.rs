use std::path::PathBuf;

use tcc353x::DriverError;
use tcc353x_protocol::ProtocolError;
use thiserror::Error;

#[derive(Error, Debug)]
pub(crate) enum CliError {
    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid board file: {0}")]
    Config(#[from] toml::de::Error),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error("Driver error ({code:?}): {source}")]
    Driver {
        code: tcc353x_protocol::ResultCode,
        #[source]
        source: DriverError,
    },

    #[error("Unknown table `{0}`")]
    UnknownTable(String),

    #[error("Failed to encode report: {0}")]
    Report(#[from] serde_json::Error),
}

impl From<DriverError> for CliError {
    fn from(source: DriverError) -> Self {
        CliError::Driver {
            code: source.code(),
            source,
        }
    }
}

pub(crate) fn read_file(path: &std::path::Path) -> Result<Vec<u8>, CliError> {
    std::fs::read(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })
}
