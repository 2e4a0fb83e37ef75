use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use log::debug;
use tempfile::NamedTempFile;

use crate::errors::SyncError;

// @module: File and directory utilities

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<(), SyncError> {
        let path = path.as_ref();
        if !path.as_os_str().is_empty() && !path.exists() {
            fs::create_dir_all(path).map_err(|e| SyncError::from_io(path, e))?;
        }
        Ok(())
    }

    // @generates: Default destination next to the input
    // @params: input_file, suffix
    // e.g. movie.smi + "synced" -> movie.synced.smi
    pub fn generate_output_path<P: AsRef<Path>>(input_file: P, suffix: &str) -> PathBuf {
        let input_file = input_file.as_ref();

        let stem = input_file.file_stem().unwrap_or_default();
        let mut output_filename = stem.to_string_lossy().to_string();
        output_filename.push('.');
        output_filename.push_str(suffix);

        if let Some(ext) = input_file.extension() {
            output_filename.push('.');
            output_filename.push_str(&ext.to_string_lossy());
        }

        input_file.with_file_name(output_filename)
    }

    /// Read a whole file into memory
    pub fn read_bytes<P: AsRef<Path>>(path: P) -> Result<Vec<u8>, SyncError> {
        let path = path.as_ref();
        fs::read(path).map_err(|e| SyncError::from_io(path, e))
    }

    /// Whether two paths point at the same file on disk
    pub fn is_same_file<P1: AsRef<Path>, P2: AsRef<Path>>(a: P1, b: P2) -> bool {
        match (fs::canonicalize(a.as_ref()), fs::canonicalize(b.as_ref())) {
            (Ok(a), Ok(b)) => a == b,
            _ => a.as_ref() == b.as_ref(),
        }
    }

    /// Replace `path` with `content` in one step.
    ///
    /// The bytes go to a temporary file in the destination directory which is
    /// then renamed over `path`, so a failed write never leaves a truncated file.
    pub fn write_atomic<P: AsRef<Path>>(path: P, content: &[u8]) -> Result<(), SyncError> {
        let path = path.as_ref();
        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        Self::ensure_dir(&parent)?;

        let mut temp = NamedTempFile::new_in(&parent).map_err(|e| SyncError::from_io(&parent, e))?;
        temp.write_all(content).map_err(|e| SyncError::from_io(temp.path(), e))?;
        temp.as_file().sync_all().map_err(|e| SyncError::from_io(temp.path(), e))?;

        // Temp files are created 0600; keep the permissions of the file being replaced
        if let Ok(metadata) = fs::metadata(path) {
            temp.as_file()
                .set_permissions(metadata.permissions())
                .map_err(|e| SyncError::from_io(temp.path(), e))?;
        }

        temp.persist(path).map_err(|e| SyncError::from_io(path, e.error))?;

        debug!("Wrote {} bytes to {:?}", content.len(), path);
        Ok(())
    }
}
