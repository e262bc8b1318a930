//! Pluggable storage backends for the durable cooldown stamps.
//!
//! The only state this application persists across restarts is the
//! Unix-millisecond stamp of the last accepted submission, one per
//! submission kind. This module defines the [`CooldownStore`] (async)
//! and [`BlockingCooldownStore`] (blocking) traits via a shared macro,
//! mirroring the client generation pattern in [`crate::client`].

use core::time::Duration;

use crate::cooldown::{RECOMMEND_COOLDOWN, REPORT_COOLDOWN};

#[cfg(feature = "storage-file")]
mod file;
mod memory;

#[cfg(feature = "storage-file")]
pub use file::FileStorage;
pub use memory::InMemoryStorage;

/// The two gated submission paths, each with its own stored stamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubmissionKind {
    /// Recommending a new discount.
    Recommendation,
    /// Reporting an error on an existing discount.
    Report,
}

impl SubmissionKind {
    /// Returns the storage key for this kind's stamp.
    #[inline]
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Recommendation => "last_recommend_time",
            Self::Report => "last_report_time",
        }
    }

    /// Returns the cooldown duration applied to this kind.
    #[inline]
    #[must_use]
    pub const fn cooldown(self) -> Duration {
        match self {
            Self::Recommendation => RECOMMEND_COOLDOWN,
            Self::Report => REPORT_COOLDOWN,
        }
    }
}

/// Generates a cooldown-store trait (async or blocking).
///
/// Uses `@methods` to define the method list once, and `@method` to
/// render each method in async (`impl Future + Send`) or blocking
/// (`fn`) style.
macro_rules! define_store {
    // ── Entry points ────────────────────────────────────────────────
    (
        trait_name: $trait_name:ident,
        trait_doc: $trait_doc:expr,
        mode: async_mode,
    ) => {
        #[doc = $trait_doc]
        pub trait $trait_name: core::fmt::Debug + Send + Sync {
            define_store!(@methods async_mode);
        }
    };
    (
        trait_name: $trait_name:ident,
        trait_doc: $trait_doc:expr,
        mode: blocking,
    ) => {
        #[doc = $trait_doc]
        pub trait $trait_name: core::fmt::Debug + Send + Sync {
            define_store!(@methods blocking);
        }
    };

    // ── Single method list (shared between both variants) ───────────
    (@methods $mode:ident) => {
        define_store!(@method $mode, last_submission,
            "Returns the stored stamp (Unix milliseconds) of the last accepted submission of this kind.\n\nReturns `Ok(None)` if nothing has been submitted yet.\n\n# Errors\n\nReturns an error if the storage backend fails to read.",
            kind: SubmissionKind, -> Result<Option<i64>>);
        define_store!(@method $mode, record_submission,
            "Stores the stamp of an accepted submission.\n\n# Errors\n\nReturns an error if the storage backend fails to write.",
            kind: SubmissionKind, stamp_millis: i64, -> Result<()>);
        define_store!(@method $mode, clear_submission,
            "Removes the stored stamp, re-arming the gate.\n\n# Errors\n\nReturns an error if the storage backend fails to write.",
            kind: SubmissionKind, -> Result<()>);
    };

    // ── Blocking method renderer ────────────────────────────────────
    (@method blocking, $name:ident, $doc:expr,
     $($param:ident: $param_ty:ty,)* -> $ret:ty) => {
        #[doc = $doc]
        fn $name(&self $(, $param: $param_ty)*) -> $ret;
    };

    // ── Async method renderer (returns impl Future + Send) ──────────
    (@method async_mode, $name:ident, $doc:expr,
     $($param:ident: $param_ty:ty,)* -> $ret:ty) => {
        #[doc = $doc]
        fn $name(&self $(, $param: $param_ty)*)
            -> impl core::future::Future<Output = $ret> + Send;
    };
}

#[cfg(feature = "async")]
mod async_store {
    //! Async cooldown-store trait definition.

    use super::SubmissionKind;
    use crate::error::Result;

    define_store! {
        trait_name: CooldownStore,
        trait_doc: "Async storage backend for the durable cooldown stamps.\n\nAll methods take `&self` — implementations should use interior mutability\n(e.g. `Mutex`) for thread-safe mutation.",
        mode: async_mode,
    }
}

#[cfg(feature = "blocking")]
mod blocking_store {
    //! Blocking cooldown-store trait definition.

    use super::SubmissionKind;
    use crate::error::Result;

    define_store! {
        trait_name: BlockingCooldownStore,
        trait_doc: "Blocking storage backend for the durable cooldown stamps.\n\nAll methods take `&self` — implementations should use interior mutability\n(e.g. `Mutex`) for thread-safe mutation.",
        mode: blocking,
    }
}

#[cfg(feature = "async")]
pub use async_store::CooldownStore;
#[cfg(feature = "blocking")]
pub use blocking_store::BlockingCooldownStore;
