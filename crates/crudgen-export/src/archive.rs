//! ZIP packaging of generated files.

use std::io::{Cursor, Write};

use serde::{Deserialize, Serialize};
use tracing::debug;
use zip::write::{FileOptions, ZipWriter};
use zip::{CompressionMethod, DateTime};

use crudgen_core::{GeneratedFile, PackagingError};

/// Entry compression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Compression {
    #[default]
    Deflated,
    Stored,
}

impl Compression {
    fn method(self) -> CompressionMethod {
        match self {
            Compression::Deflated => CompressionMethod::Deflated,
            Compression::Stored => CompressionMethod::Stored,
        }
    }
}

/// Archive layout options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArchiveOptions {
    pub compression: Compression,
    /// Folder every entry is placed under.
    pub root_dir: Option<String>,
}

impl ArchiveOptions {
    fn entry_name(&self, relative_path: &str) -> String {
        match self.root_dir.as_deref().map(|dir| dir.trim_matches('/')) {
            Some(dir) if !dir.is_empty() => format!("{}/{}", dir, relative_path),
            _ => relative_path.to_string(),
        }
    }
}

/// Write `files` into an in-memory ZIP archive, one entry per file in the
/// given order.
///
/// Timestamps are pinned to the ZIP epoch so identical inputs give
/// identical bytes.
pub fn write_archive(files: &[GeneratedFile], options: &ArchiveOptions) -> Result<Vec<u8>, PackagingError> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let file_options: FileOptions<'_, ()> = FileOptions::default()
        .compression_method(options.compression.method())
        .last_modified_time(DateTime::default());

    for file in files {
        zip.start_file(options.entry_name(&file.relative_path), file_options.clone())
            .map_err(archive_error)?;
        zip.write_all(file.content.as_bytes())?;
    }

    let bytes = zip.finish().map_err(archive_error)?.into_inner();
    debug!(entries = files.len(), bytes = bytes.len(), "wrote archive");
    Ok(bytes)
}

fn archive_error(err: zip::result::ZipError) -> PackagingError {
    PackagingError::Archive { reason: err.to_string() }
}
