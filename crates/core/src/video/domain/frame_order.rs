use std::cmp::Ordering;
use std::path::Path;

/// Extracts the playback key of a still's name: the last run of ASCII
/// digits in the file stem, e.g. `frame10.png` → 10, `shot_003_b.jpg` → 3.
pub fn frame_number(name: &str) -> Option<u64> {
    let stem = Path::new(name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or(name);

    let bytes = stem.as_bytes();
    let end = bytes.iter().rposition(u8::is_ascii_digit)? + 1;
    let start = bytes[..end]
        .iter()
        .rposition(|b| !b.is_ascii_digit())
        .map_or(0, |i| i + 1);

    stem[start..end].parse().ok()
}

/// Playback-order comparator for still names.
///
/// Numbered names come first in numeric order; names without a number
/// follow. Ties fall back to the full name so the order is total.
pub fn compare_frame_names(a: &str, b: &str) -> Ordering {
    match (frame_number(a), frame_number(b)) {
        (Some(x), Some(y)) => x.cmp(&y).then_with(|| a.cmp(b)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

/// Sorts still names into playback order. See [`compare_frame_names`].
pub fn sort_by_frame_number<S: AsRef<str>>(names: &mut [S]) {
    names.sort_by(|a, b| compare_frame_names(a.as_ref(), b.as_ref()));
}
