use crate::types::{CubeError, CubeResult};
use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Bundle intermediate files into a deflate-compressed zip and remove the originals
///
/// Entries are stored under their base names, in the given order. Originals
/// are deleted only once the archive has been fully written.
pub fn bundle_files<P: AsRef<Path>>(files: &[P], archive_path: &Path) -> CubeResult<PathBuf> {
    let mut writer = ZipWriter::new(File::create(archive_path)?);
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    for file in files {
        let path = file.as_ref();
        let name = path
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| {
                CubeError::InvalidFormat(format!("no usable file name in {}", path.display()))
            })?;

        log::debug!("Adding {} to archive", path.display());
        writer.start_file(name, options)?;
        io::copy(&mut File::open(path)?, &mut writer)?;
    }
    writer.finish()?;

    log::info!(
        "Saved {} intermediate files to {}",
        files.len(),
        archive_path.display()
    );

    for file in files {
        fs::remove_file(file.as_ref())?;
    }
    Ok(archive_path.to_path_buf())
}
