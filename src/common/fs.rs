use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;
use zip::ZipArchive;

use crate::{Error, Result};

/// Create the directory if it doesn’t exist; error if a non-directory exists there.
pub fn ensure_dir_exists(path: &Path) -> Result<()> {
    if path.exists() {
        if !path.is_dir() {
            return Err(Error::Io(std::io::Error::other(
                format!("path exists but is not a directory: {}", path.display())
            )));
        }
    } else {
        fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Error unless `path` is an existing regular file.
pub fn require_file_exists(path: &Path) -> Result<()> {
    if !path.exists() { return Err(Error::load(path, "file does not exist")) }
    if !path.is_file() { return Err(Error::load(path, "path exists but is not a file")) }
    Ok(())
}

/// Extracts the given `.zip` file into the target directory.
pub fn extract_zip(zip_path: &Path, dest_dir: &Path) -> Result<()> {
    let file = fs::File::open(zip_path)
        .map_err(|e| Error::load(zip_path, format!("failed to open archive: {e}")))?;
    let mut archive = ZipArchive::new(file)
        .map_err(|e| Error::load(zip_path, format!("failed to read zip archive: {e}")))?;

    archive.extract(dest_dir)
        .map_err(|e| Error::load(zip_path, format!("failed to extract to {}: {e}", dest_dir.display())))?;

    Ok(())
}

/// Find the first `.shp` file under `dir` (sorted by path, so the choice is stable).
pub fn find_shapefile(dir: &Path) -> Result<PathBuf> {
    WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.into_path())
        .find(|path| path.is_file() && path.extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("shp")))
        .ok_or_else(|| Error::load(dir, "no .shp file found"))
}
