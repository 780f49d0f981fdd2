//! Synthetic videos for tests.

use std::path::Path;

use ndarray::{Array1, ArrayView3, Axis};

use crate::shared::frame::{Frame, CHANNELS};
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::video_writer::VideoWriter;
use crate::video::infrastructure::ffmpeg_writer::FfmpegWriter;

/// Gray level of frame `i` in [`write_gray_ramp_video`]. Levels are 40
/// apart so lossy coding cannot blur neighbours together.
pub fn ramp_level(i: usize) -> u8 {
    (20 + (i * 40) % 240) as u8
}

pub fn write_gray_ramp_video(path: &Path, num_frames: usize, width: u32, height: u32, fps: u32) {
    let mut writer = FfmpegWriter::new();
    writer
        .open(path, &VideoMetadata::for_output(width, height, fps as f64))
        .unwrap();
    for i in 0..num_frames {
        let level = ramp_level(i);
        writer
            .write(&Frame::solid(width, height, [level, level, level], i))
            .unwrap();
    }
    writer.close().unwrap();
}

/// Reads every frame of the video at `path`.
pub fn read_all_frames(path: &Path) -> (VideoMetadata, Vec<Frame>) {
    use crate::video::domain::video_reader::VideoReader;
    use crate::video::infrastructure::ffmpeg_reader::FfmpegReader;

    let mut reader = FfmpegReader::new();
    let metadata = reader.open(path).unwrap();
    let frames = reader.frames().map(Result::unwrap).collect();
    reader.close();
    (metadata, frames)
}

/// Same as [`read_all_frames`] for in-memory mp4 bytes.
pub fn read_all_frames_from_bytes(bytes: &[u8]) -> (VideoMetadata, Vec<Frame>) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("decoded.mp4");
    std::fs::write(&path, bytes).unwrap();
    read_all_frames(&path)
}

pub fn assert_gray_near(frame: &Frame, level: u8) {
    for channel in mean_color(frame) {
        assert!(
            (channel - level as f64).abs() < 12.0,
            "frame {} has mean {channel:.1}, expected about {level}",
            frame.index()
        );
    }
}

/// Average value of each channel over the whole frame.
pub fn mean_color(frame: &Frame) -> [f64; 3] {
    let (width, height) = frame.dimensions();
    let view = ArrayView3::from_shape(
        (height as usize, width as usize, CHANNELS),
        frame.data(),
    )
    .unwrap();
    let sums: Array1<f64> = view.mapv(f64::from).sum_axis(Axis(0)).sum_axis(Axis(0));
    let pixels = (width as f64 * height as f64).max(1.0);
    [sums[0] / pixels, sums[1] / pixels, sums[2] / pixels]
}

#[test]
fn test_mean_color_of_half_white_frame() {
    let frame = Frame::new(vec![0, 0, 0, 255, 255, 255], 2, 1, 0);
    for channel in mean_color(&frame) {
        approx::assert_relative_eq!(channel, 127.5);
    }
}
