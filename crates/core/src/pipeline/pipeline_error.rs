use std::path::PathBuf;

use thiserror::Error;

use crate::export::domain::exporter::ExportError;
use crate::session::session_state::SessionError;
use crate::storage::domain::blob_store::StoreError;
use crate::video::domain::codec_error::CodecError;

/// Why a conversion, download or share run was aborted.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Codec(#[from] CodecError),
    #[error("no frames to assemble")]
    EmptyInput,
    #[error(
        "frame {index} is {actual_width}x{actual_height}, \
         expected {expected_width}x{expected_height} like the first frame"
    )]
    DimensionMismatch {
        index: usize,
        expected_width: u32,
        expected_height: u32,
        actual_width: u32,
        actual_height: u32,
    },
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Export(#[from] ExportError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("scratch file I/O failed at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PipelineError {
    pub(crate) fn io(path: impl Into<PathBuf>) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| PipelineError::Io { path, source }
    }
}
