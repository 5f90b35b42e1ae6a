//! Zip archives of converter results

use std::{
    fs::File,
    io::{self, Write},
    path::{Path, PathBuf},
};

use zip::{CompressionMethod, ZipWriter, result::ZipResult, write::SimpleFileOptions};

/// Prefix of every archive name, matched by the sweeper
pub const ARCHIVE_PREFIX: &str = "pages-";

/// Write `files` into a new archive at `destination`, flattened by file name
pub fn zip_files(files: &[PathBuf], destination: &Path) -> ZipResult<()> {
    let mut zip = ZipWriter::new(File::create(destination)?);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for path in files {
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"))?;
        zip.start_file(name, options)?;
        zip.write_all(&std::fs::read(path)?)?;
    }

    zip.finish()?.flush()?;
    Ok(())
}
