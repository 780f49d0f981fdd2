pub mod directory_exporter;
pub mod drive_exporter;
pub mod zip_archive;
