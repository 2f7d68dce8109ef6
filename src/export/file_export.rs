use chrono::Utc;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{info, warn};

use super::{export_file_name, CSV_MIME_TYPE};

/// Errors raised while saving an export
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("an export is already in progress")]
    Busy,

    #[error("there is no data to download")]
    NothingToExport,

    #[error("could not encode CSV: {0}")]
    Encode(#[from] csv::Error),

    #[error("could not write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Saves encoded CSV text into an export directory.
///
/// Only one export runs at a time; a second call while one is in progress
/// returns [`ExportError::Busy`] without touching the disk.
#[derive(Debug)]
pub struct CsvExporter {
    dir: PathBuf,
    busy: AtomicBool,
}

/// Clears the busy flag when the export finishes, however it finishes.
struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl CsvExporter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            busy: AtomicBool::new(false),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    fn acquire(&self) -> Result<BusyGuard<'_>, ExportError> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| ExportError::Busy)?;
        Ok(BusyGuard(&self.busy))
    }

    /// Write `contents` to `{dir}/{base}_{timestamp}.csv` and return the path.
    pub fn export(&self, base: &str, contents: &str) -> Result<PathBuf, ExportError> {
        let _guard = self.acquire()?;
        let target = self.dir.join(export_file_name(base, Utc::now()));
        self.write_atomically(&target, contents)?;
        info!("Exported {} bytes of {} to {}", contents.len(), CSV_MIME_TYPE, target.display());
        Ok(target)
    }

    /// Stage the file under a temporary name, then move it into place so a
    /// half-written export never carries the final name. An existing file
    /// under the target name is left untouched.
    fn write_atomically(&self, target: &Path, contents: &str) -> Result<(), ExportError> {
        let io_err = |source| ExportError::Io {
            path: target.to_path_buf(),
            source,
        };

        std::fs::create_dir_all(&self.dir).map_err(io_err)?;
        let mut staged = tempfile::NamedTempFile::new_in(&self.dir).map_err(io_err)?;
        staged.write_all(contents.as_bytes()).map_err(io_err)?;
        staged.flush().map_err(io_err)?;
        staged.persist_noclobber(target).map_err(|e| {
            warn!("Could not move staged export into place: {}", e.error);
            io_err(e.error)
        })?;
        Ok(())
    }
}
