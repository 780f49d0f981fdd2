use serde::{Deserialize, Serialize};

use crate::shared::constants::{
    EXPORT_FOLDER_TITLE, EXTRACTED_FRAMES_CONTAINER, FRAMES_ARCHIVE_NAME, OUTPUT_VIDEO_NAME,
    UPLOADED_FRAMES_CONTAINER, VIDEO_CONTAINER,
};

/// What to do when a single still fails to encode during Decompose.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EncodeFailurePolicy {
    /// Abort the whole run and report the error.
    #[default]
    Abort,
    /// Log a warning, drop the frame, keep going.
    SkipAndLog,
}

/// Names and policies shared by every conversion run.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionSettings {
    pub extracted_frames_container: String,
    pub uploaded_frames_container: String,
    pub video_container: String,
    pub output_video_name: String,
    pub frames_archive_name: String,
    pub export_folder_title: String,
    /// Give every request its own working container.
    pub isolate_requests: bool,
    pub encode_failure: EncodeFailurePolicy,
}

impl Default for ConversionSettings {
    fn default() -> Self {
        Self {
            extracted_frames_container: EXTRACTED_FRAMES_CONTAINER.to_string(),
            uploaded_frames_container: UPLOADED_FRAMES_CONTAINER.to_string(),
            video_container: VIDEO_CONTAINER.to_string(),
            output_video_name: OUTPUT_VIDEO_NAME.to_string(),
            frames_archive_name: FRAMES_ARCHIVE_NAME.to_string(),
            export_folder_title: EXPORT_FOLDER_TITLE.to_string(),
            isolate_requests: false,
            encode_failure: EncodeFailurePolicy::Abort,
        }
    }
}
