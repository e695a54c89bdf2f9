use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApplyError {
    #[error("could not resolve the executable's directory")]
    Locate(#[source] std::io::Error),

    #[error("failed to read SQL file {}", path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("could not connect to {target}")]
    Connection {
        target: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("database rejected the SQL batch")]
    Execution(#[source] sqlx::Error),
}

impl ApplyError {
    /// Short label used in log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Locate(_) => "locate",
            Self::FileRead { .. } => "file_read",
            Self::Connection { .. } => "connection",
            Self::Execution(_) => "execution",
        }
    }
}
