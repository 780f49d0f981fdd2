use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::export::domain::exporter::ExportError;

/// Packs `(name, bytes)` entries into an in-memory ZIP archive, one entry
/// per item in the order given.
///
/// PNG data is already deflated, so entries are stored uncompressed.
pub fn build_zip<'a, I>(entries: I) -> Result<Vec<u8>, ExportError>
where
    I: IntoIterator<Item = (&'a str, &'a [u8])>,
{
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

    for (name, bytes) in entries {
        writer.start_file(name, options)?;
        writer.write_all(bytes).map_err(|e| ExportError::Archive(e.into()))?;
    }

    Ok(writer.finish()?.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use zip::ZipArchive;

    #[test]
    fn test_entries_keep_names_order_and_bytes() {
        let entries: Vec<(&str, &[u8])> = vec![
            ("frame0.png", b"zero"),
            ("frame3.png", b"three"),
            ("frame6.png", b"six"),
        ];
        let bytes = build_zip(entries).unwrap();

        let mut archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), 3);

        let names: Vec<String> = (0..archive.len())
            .map(|i| archive.by_index(i).unwrap().name().to_string())
            .collect();
        assert_eq!(names, vec!["frame0.png", "frame3.png", "frame6.png"]);

        let mut content = Vec::new();
        archive
            .by_name("frame3.png")
            .unwrap()
            .read_to_end(&mut content)
            .unwrap();
        assert_eq!(content, b"three");
    }

    #[test]
    fn test_empty_archive_is_valid() {
        let bytes = build_zip(Vec::<(&str, &[u8])>::new()).unwrap();
        let archive = ZipArchive::new(Cursor::new(bytes)).unwrap();
        assert_eq!(archive.len(), 0);
    }
}
