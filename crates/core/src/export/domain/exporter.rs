use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("export request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("export service returned {status}: {body}")]
    Api { status: u16, body: String },
    #[error("unexpected export response: {0}")]
    Response(String),
    #[error("export I/O failed at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid export title: {0:?}")]
    InvalidTitle(String),
    #[error("failed to build archive: {0}")]
    Archive(#[from] zip::result::ZipError),
}

/// Identifier of a folder created by an [`Exporter`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderId(pub String);

impl fmt::Display for FolderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque file-upload sink (cloud drive, local directory, ...).
pub trait Exporter: Send {
    fn create_folder(&mut self, title: &str) -> Result<FolderId, ExportError>;

    /// Uploads `bytes` as a file named `title`, inside `parent` when given,
    /// otherwise at the sink's top level.
    fn upload_file(
        &mut self,
        parent: Option<&FolderId>,
        title: &str,
        mime_type: &str,
        bytes: &[u8],
    ) -> Result<(), ExportError>;
}
