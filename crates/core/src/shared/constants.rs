/// Working container for stills extracted from a video.
pub const EXTRACTED_FRAMES_CONTAINER: &str = "extracted-frames";

/// Working container for stills uploaded for reassembly.
pub const UPLOADED_FRAMES_CONTAINER: &str = "temporary-frames";

/// Container receiving assembled videos.
pub const VIDEO_CONTAINER: &str = "video-container";

pub const OUTPUT_VIDEO_NAME: &str = "converted-video.mp4";
pub const FRAMES_ARCHIVE_NAME: &str = "extracted_frames.zip";
pub const EXPORT_FOLDER_TITLE: &str = "Extracted Frames";

/// Container format of every assembled video, chosen by file extension.
pub const OUTPUT_VIDEO_EXTENSION: &str = "mp4";

pub const STILL_EXTENSION: &str = "png";
pub const STILL_PREFIX: &str = "frame";

pub const VIDEO_MIME_TYPE: &str = "video/mp4";
pub const STILL_MIME_TYPE: &str = "image/png";
pub const ARCHIVE_MIME_TYPE: &str = "application/zip";

/// Inclusive bounds of the rate selectors on both screens.
pub const MIN_RATE: u32 = 1;
pub const MAX_RATE: u32 = 100;

pub const DEFAULT_SKIP_RATE: u32 = 1;
pub const DEFAULT_FRAME_RATE: u32 = 5;

pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "avi", "mov"];
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// Blob name for the still taken at `index` in its source video.
pub fn still_name(index: usize) -> String {
    format!("{STILL_PREFIX}{index}.{STILL_EXTENSION}")
}
