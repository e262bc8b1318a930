//! In-memory stamp store for testing and ephemeral sessions.

use std::sync::Mutex;

#[cfg(feature = "async")]
use core::future::{self, Future};

use crate::error::{Result, SurtidorError};
use crate::storage::SubmissionKind;

/// Thread-safe in-memory cooldown-stamp store.
///
/// Implements both [`super::CooldownStore`] (async) and
/// [`super::BlockingCooldownStore`] (blocking), providing a zero-setup
/// backend for tests. Stamps are lost when the value is dropped.
#[derive(Debug, Default)]
pub struct InMemoryStorage {
    /// Stamps behind a single mutex for thread-safe interior mutability.
    inner: Mutex<Stamps>,
}

/// Inner mutable state.
#[derive(Debug, Default)]
struct Stamps {
    /// Last accepted recommendation, Unix milliseconds.
    recommendation: Option<i64>,
    /// Last accepted error report, Unix milliseconds.
    report: Option<i64>,
}

impl Stamps {
    /// Returns a mutable reference to the slot for `kind`.
    const fn slot(&mut self, kind: SubmissionKind) -> &mut Option<i64> {
        match kind {
            SubmissionKind::Recommendation => &mut self.recommendation,
            SubmissionKind::Report => &mut self.report,
        }
    }
}

impl InMemoryStorage {
    /// Creates a new empty in-memory store.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquires the inner lock and applies a closure.
    fn with_lock<R>(&self, f: impl FnOnce(&mut Stamps) -> R) -> Result<R> {
        let mut inner = self.inner.lock().map_err(|err| lock_error(&err))?;
        Ok(f(&mut inner))
    }
}

/// Wraps a mutex poison error.
fn lock_error<T>(err: &std::sync::PoisonError<T>) -> SurtidorError {
    SurtidorError::Storage(err.to_string().into())
}

// ── BlockingCooldownStore implementation ────────────────────────────────

#[cfg(feature = "blocking")]
impl super::BlockingCooldownStore for InMemoryStorage {
    #[inline]
    fn last_submission(&self, kind: SubmissionKind) -> Result<Option<i64>> {
        self.with_lock(|stamps| *stamps.slot(kind))
    }

    #[inline]
    fn record_submission(&self, kind: SubmissionKind, stamp_millis: i64) -> Result<()> {
        self.with_lock(|stamps| *stamps.slot(kind) = Some(stamp_millis))
    }

    #[inline]
    fn clear_submission(&self, kind: SubmissionKind) -> Result<()> {
        self.with_lock(|stamps| *stamps.slot(kind) = None)
    }
}

// ── CooldownStore (async) implementation ────────────────────────────────

#[cfg(feature = "async")]
impl super::CooldownStore for InMemoryStorage {
    #[inline]
    fn last_submission(
        &self,
        kind: SubmissionKind,
    ) -> impl Future<Output = Result<Option<i64>>> + Send {
        future::ready(self.with_lock(|stamps| *stamps.slot(kind)))
    }

    #[inline]
    fn record_submission(
        &self,
        kind: SubmissionKind,
        stamp_millis: i64,
    ) -> impl Future<Output = Result<()>> + Send {
        future::ready(self.with_lock(|stamps| *stamps.slot(kind) = Some(stamp_millis)))
    }

    #[inline]
    fn clear_submission(&self, kind: SubmissionKind) -> impl Future<Output = Result<()>> + Send {
        future::ready(self.with_lock(|stamps| *stamps.slot(kind) = None))
    }
}

#[cfg(all(test, feature = "blocking"))]
mod tests {
    use super::*;
    use crate::storage::BlockingCooldownStore;

    #[test]
    fn starts_empty() {
        let storage = InMemoryStorage::new();
        assert_eq!(
            storage.last_submission(SubmissionKind::Recommendation).unwrap(),
            None
        );
        assert_eq!(storage.last_submission(SubmissionKind::Report).unwrap(), None);
    }

    #[test]
    fn record_and_read_back() {
        let storage = InMemoryStorage::new();
        storage
            .record_submission(SubmissionKind::Recommendation, 1_700_000_000_000)
            .unwrap();
        assert_eq!(
            storage.last_submission(SubmissionKind::Recommendation).unwrap(),
            Some(1_700_000_000_000)
        );
        // The other kind is untouched.
        assert_eq!(storage.last_submission(SubmissionKind::Report).unwrap(), None);
    }

    #[test]
    fn clear_removes_only_the_given_kind() {
        let storage = InMemoryStorage::new();
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
    fn record_overwrites_previous_stamp() {
        let storage = InMemoryStorage::new();
        storage.record_submission(SubmissionKind::Report, 1).unwrap();
        storage.record_submission(SubmissionKind::Report, 2).unwrap();
        assert_eq!(
            storage.last_submission(SubmissionKind::Report).unwrap(),
            Some(2)
        );
    }
}

#[cfg(all(test, feature = "async"))]
mod async_tests {
    use super::*;
    use crate::storage::CooldownStore;

    #[tokio::test]
    async fn async_record_and_read_back() {
        let storage = InMemoryStorage::new();
        storage
            .record_submission(SubmissionKind::Report, 42)
            .await
            .unwrap();
        assert_eq!(
            storage.last_submission(SubmissionKind::Report).await.unwrap(),
            Some(42)
        );
        storage.clear_submission(SubmissionKind::Report).await.unwrap();
        assert_eq!(
            storage.last_submission(SubmissionKind::Report).await.unwrap(),
            None
        );
    }
}
