//! ZIP export: one archive entry per selected file, in listing order.

use anyhow::{Context, Result};
use std::io::{Seek, Write};
use tracing::warn;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::domain::FileContent;

/// Write `contents` into a ZIP archive and return the number of entries.
///
/// Files whose content could not be read are left out.
pub fn write_archive<W: Write + Seek>(writer: W, contents: &[FileContent]) -> Result<usize> {
    let mut zip = ZipWriter::new(writer);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    let mut written = 0;
    for file in contents {
        if file.error {
            warn!("skipping {} in archive: {}", file.path, file.text);
            continue;
        }
        zip.start_file(file.path.as_str(), options)
            .with_context(|| format!("Failed adding {} to archive", file.path))?;
        zip.write_all(file.text.as_bytes())?;
        written += 1;
    }
    zip.finish().context("Failed finishing archive")?;
    Ok(written)
}
