//! JSON-file-based stamp store.
//!
//! Persists the cooldown stamps in a single JSON file under a
//! configurable directory (default: `$XDG_DATA_HOME/surtidor-rs/`), so
//! the submission gates survive application restarts.

use std::fs;
use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use serde::{Deserialize, Serialize};

use crate::error::{Result, SurtidorError};
use crate::storage::SubmissionKind;

/// Application name used for the XDG data directory.
const APP_NAME: &str = "surtidor-rs";

/// File holding both cooldown stamps.
const STAMPS_FILE: &str = "stamps.json";
/// Sentinel file used for cross-process file locking.
const LOCK_FILE: &str = "storage.lock";

/// On-disk representation of the stored stamps.
#[derive(Debug, Serialize, Deserialize, Default)]
struct StampsFile {
    /// Last accepted recommendation, Unix milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    last_recommend_time: Option<i64>,
    /// Last accepted error report, Unix milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    last_report_time: Option<i64>,
}

impl StampsFile {
    /// Returns a mutable reference to the slot for `kind`.
    const fn slot(&mut self, kind: SubmissionKind) -> &mut Option<i64> {
        match kind {
            SubmissionKind::Recommendation => &mut self.last_recommend_time,
            SubmissionKind::Report => &mut self.last_report_time,
        }
    }

    /// Returns the stored stamp for `kind`.
    const fn get(&self, kind: SubmissionKind) -> Option<i64> {
        match kind {
            SubmissionKind::Recommendation => self.last_recommend_time,
            SubmissionKind::Report => self.last_report_time,
        }
    }
}

/// File-backed stamp store persisting cooldown state as JSON.
///
/// # Concurrency
///
/// Thread safety within a single process is provided by an in-process
/// [`Mutex`]. Cross-process safety is achieved via an advisory file
/// lock on `storage.lock` (using [`std::fs::File::lock`] /
/// [`std::fs::File::lock_shared`]), so two processes sharing the data
/// directory cannot interleave a read-check with a write.
///
/// Read operations acquire a shared lock (allowing concurrent
/// readers), while write operations acquire an exclusive lock.
///
/// # File layout
///
/// ```text
/// <dir>/
///   storage.lock   (cross-process lock sentinel)
///   stamps.json
/// ```
#[derive(Debug)]
pub struct FileStorage {
    /// Root directory containing the stamp file.
    dir: PathBuf,
    /// Mutex serializing concurrent in-process access.
    lock: Mutex<()>,
    /// Sentinel file for cross-process advisory locking.
    lock_file: fs::File,
}

impl FileStorage {
    /// Creates a new file store rooted at the given directory.
    ///
    /// Creates the directory (and parents) if it does not exist. Also
    /// opens (or creates) the `storage.lock` sentinel file used for
    /// cross-process advisory locking.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or the lock
    /// file cannot be opened.
    #[inline]
    pub fn new(dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&dir).map_err(storage_io_error)?;
        let lock_file = fs::OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(dir.join(LOCK_FILE))
            .map_err(storage_io_error)?;
        Ok(Self {
            dir,
            lock: Mutex::new(()),
            lock_file,
        })
    }

    /// Returns the default XDG-compliant data directory for this
    /// application.
    ///
    /// On Linux: `$XDG_DATA_HOME/surtidor-rs/` (typically
    /// `~/.local/share/surtidor-rs/`).
    ///
    /// # Errors
    ///
    /// Returns an error if the platform data directory cannot be
    /// determined.
    #[inline]
    pub fn default_dir() -> Result<PathBuf> {
        dirs::data_dir()
            .map(|data_path| data_path.join(APP_NAME))
            .ok_or_else(|| {
                SurtidorError::Storage("could not determine platform data directory".into())
            })
    }

    // ── Private helpers ─────────────────────────────────────────────

    /// Returns the full path of the stamp file.
    fn stamps_path(&self) -> PathBuf {
        self.dir.join(STAMPS_FILE)
    }

    /// Acquires an in-process mutex guard and a shared (read) file
    /// lock, executes `op`, then releases the file lock.
    fn with_shared_lock<R, F: FnOnce() -> Result<R>>(&self, op: F) -> Result<R> {
        let _guard: MutexGuard<'_, ()> = self.lock.lock().map_err(|err| lock_poison_error(&err))?;
        self.lock_file.lock_shared().map_err(storage_io_error)?;
        let result = op();
        // Only surface the unlock error when the operation succeeded;
        // otherwise the original error is more useful.
        if let Err(err) = self.lock_file.unlock()
            && result.is_ok()
        {
            return Err(storage_io_error(err));
        }
        result
    }

    /// Acquires an in-process mutex guard and an exclusive (write)
    /// file lock, executes `op`, then releases the file lock.
    fn with_exclusive_lock<R, F: FnOnce() -> Result<R>>(&self, op: F) -> Result<R> {
        let _guard: MutexGuard<'_, ()> = self.lock.lock().map_err(|err| lock_poison_error(&err))?;
        self.lock_file.lock().map_err(storage_io_error)?;
        let result = op();
        if let Err(err) = self.lock_file.unlock()
            && result.is_ok()
        {
            return Err(storage_io_error(err));
        }
        result
    }

    /// Reads the stamp file. Returns defaults if the file does not
    /// exist.
    fn read_stamps(&self) -> Result<StampsFile> {
        match fs::read_to_string(self.stamps_path()) {
            Ok(contents) => serde_json::from_str(&contents).map_err(SurtidorError::from),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(StampsFile::default()),
            Err(err) => Err(storage_io_error(err)),
        }
    }

    /// Atomically writes the stamp file (write-to-tmp then rename).
    fn write_stamps(&self, stamps: &StampsFile) -> Result<()> {
        let path = self.stamps_path();
        let tmp_path = self.dir.join(format!("{STAMPS_FILE}.tmp"));
        let json = serde_json::to_string_pretty(stamps).map_err(SurtidorError::from)?;
        fs::write(&tmp_path, json).map_err(storage_io_error)?;
        fs::rename(&tmp_path, &path).map_err(storage_io_error)?;
        Ok(())
    }

    /// Read-modify-write under the exclusive lock.
    fn update_stamps(&self, update: impl FnOnce(&mut StampsFile)) -> Result<()> {
        self.with_exclusive_lock(|| {
            let mut stamps = self.read_stamps()?;
            update(&mut stamps);
            self.write_stamps(&stamps)
        })
    }
}

/// Wraps an I/O error as a storage error.
fn storage_io_error(err: std::io::Error) -> SurtidorError {
    SurtidorError::Storage(Box::new(err))
}

/// Wraps a mutex poison error.
fn lock_poison_error<T>(err: &std::sync::PoisonError<T>) -> SurtidorError {
    SurtidorError::Storage(err.to_string().into())
}

// ── BlockingCooldownStore implementation ────────────────────────────────

#[cfg(feature = "blocking")]
impl super::BlockingCooldownStore for FileStorage {
    #[inline]
    fn last_submission(&self, kind: SubmissionKind) -> Result<Option<i64>> {
        self.with_shared_lock(|| Ok(self.read_stamps()?.get(kind)))
    }

    #[inline]
    fn record_submission(&self, kind: SubmissionKind, stamp_millis: i64) -> Result<()> {
        self.update_stamps(|stamps| *stamps.slot(kind) = Some(stamp_millis))
    }

    #[inline]
    fn clear_submission(&self, kind: SubmissionKind) -> Result<()> {
        self.update_stamps(|stamps| *stamps.slot(kind) = None)
    }
}

// ── CooldownStore (async) implementation ────────────────────────────────

#[cfg(feature = "async")]
impl super::CooldownStore for FileStorage {
    #[inline]
    fn last_submission(
        &self,
        kind: SubmissionKind,
    ) -> impl Future<Output = Result<Option<i64>>> + Send {
        core::future::ready(self.with_shared_lock(|| Ok(self.read_stamps()?.get(kind))))
    }

    #[inline]
    fn record_submission(
        &self,
        kind: SubmissionKind,
        stamp_millis: i64,
    ) -> impl Future<Output = Result<()>> + Send {
        core::future::ready(self.update_stamps(|stamps| *stamps.slot(kind) = Some(stamp_millis)))
    }

    #[inline]
    fn clear_submission(
        &self,
        kind: SubmissionKind,
    ) -> impl Future<Output = Result<()>> + Send {
        core::future::ready(self.update_stamps(|stamps| *stamps.slot(kind) = None))
    }
}

#[cfg(all(test, feature = "blocking"))]
mod tests {
    use super::*;
    use crate::storage::BlockingCooldownStore;

    /// Creates a store in a fresh temporary directory.
    fn temp_storage() -> (tempfile::TempDir, FileStorage) {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();
        (dir, storage)
    }

    #[test]
    fn missing_file_reads_as_empty() {
        let (_dir, storage) = temp_storage();
        assert_eq!(
            storage.last_submission(SubmissionKind::Recommendation).unwrap(),
            None
        );
    }

    #[test]
    fn stamps_survive_reopening() {
        let dir = tempfile::tempdir().unwrap();
        {
            let storage = FileStorage::new(dir.path().to_path_buf()).unwrap();
            storage
                .record_submission(SubmissionKind::Recommendation, 1_700_000_000_000)
                .unwrap();
        }
        let reopened = FileStorage::new(dir.path().to_path_buf()).unwrap();
        assert_eq!(
            reopened
                .last_submission(SubmissionKind::Recommendation)
                .unwrap(),
            Some(1_700_000_000_000)
        );
    }

    #[test]
    fn kinds_are_stored_independently() {
        let (_dir, storage) = temp_storage();
        storage
            .record_submission(SubmissionKind::Recommendation, 1)
            .unwrap();
        storage.record_submission(SubmissionKind::Report, 2).unwrap();
        storage.clear_submission(SubmissionKind::Recommendation).unwrap();
        assert_eq!(
            storage.last_submission(SubmissionKind::Recommendation).unwrap(),
            None
        );
        assert_eq!(
            storage.last_submission(SubmissionKind::Report).unwrap(),
            Some(2)
        );
    }

    #[test]
    fn clearing_an_absent_stamp_is_fine() {
        let (_dir, storage) = temp_storage();
        storage.clear_submission(SubmissionKind::Report).unwrap();
        assert_eq!(storage.last_submission(SubmissionKind::Report).unwrap(), None);
    }

    #[test]
    fn stamp_file_is_plain_json() {
        let (dir, storage) = temp_storage();
        storage
            .record_submission(SubmissionKind::Report, 42)
            .unwrap();
        let contents = fs::read_to_string(dir.path().join("stamps.json")).unwrap();
        let json: serde_json::Value = serde_json::from_str(&contents).unwrap();
        assert_eq!(json[SubmissionKind::Report.key()], 42);
        assert!(json.get(SubmissionKind::Recommendation.key()).is_none());
    }

    #[test]
    fn corrupt_file_surfaces_an_error() {
        let (dir, storage) = temp_storage();
        fs::write(dir.path().join("stamps.json"), "not json").unwrap();
        assert!(storage.last_submission(SubmissionKind::Report).is_err());
    }
}
