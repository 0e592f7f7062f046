use std::io;
use std::path::Path;

use tokio::fs;

use crate::error::LoadError;

/// Create a single directory. The parent must already exist.
///
/// An existing directory at `path` is accepted so a page can be loaded twice into the
/// same output directory.
pub async fn create_directory(path: &Path) -> Result<(), LoadError> {
    match fs::create_dir(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => match fs::metadata(path).await {
            Ok(meta) if meta.is_dir() => Ok(()),
            _ => Err(LoadError::filesystem(path, e)),
        },
        Err(e) => Err(LoadError::filesystem(path, e)),
    }
}

/// Write `content` to `path`, creating or truncating the file.
pub async fn write_file(path: &Path, content: &[u8]) -> Result<(), LoadError> {
    fs::write(path, content)
        .await
        .map_err(|e| LoadError::filesystem(path, e))
}
