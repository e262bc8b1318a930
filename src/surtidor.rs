//! High-level Surtidor client with integrated cooldown storage.
//!
//! Combines the low-level HTTP client with a
//! [`CooldownStore`](crate::storage::CooldownStore) /
//! [`BlockingCooldownStore`](crate::storage::BlockingCooldownStore)
//! backend so the two write paths are gated behind their persisted
//! cooldowns: a submission is validated locally, checked against the
//! stored stamp, sent, and only a confirmed success records a new
//! stamp. Failures leave the gate untouched so the user may retry.

/// Returns the current Unix timestamp in milliseconds.
fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Generates a high-level Surtidor client (async or blocking).
macro_rules! define_surtidor {
    (
        client_name: $client:ident,
        builder_name: $builder:ident,
        http_client: $http_client:ty,
        storage_trait: $storage_trait:ident,
        client_doc: $client_doc:expr,
        builder_doc: $builder_doc:expr,
        $(async_kw: $async_kw:tt,)?
        $(await_kw: $await_ext:tt,)?
    ) => {
        #[doc = $builder_doc]
        #[derive(Debug)]
        pub struct $builder<S: $storage_trait> {
            /// Service API key.
            api_key: Option<String>,
            /// Service base URL.
            base_url: Option<String>,
            /// Cooldown-stamp storage backend.
            storage: Option<S>,
        }

        impl<S: $storage_trait> $builder<S> {
            /// Sets the service API key.
            #[inline]
            #[must_use]
            pub fn api_key<T: Into<String>>(mut self, key: T) -> Self {
                self.api_key = Some(key.into());
                self
            }

            /// Sets the service base URL.
            #[inline]
            #[must_use]
            pub fn base_url<T: Into<String>>(mut self, url: T) -> Self {
                self.base_url = Some(url.into());
                self
            }

            /// Sets the cooldown-stamp storage backend.
            #[inline]
            #[must_use]
            pub fn storage(mut self, storage: S) -> Self {
                self.storage = Some(storage);
                self
            }

            /// Builds the high-level client.
            ///
            /// # Errors
            ///
            /// Returns [`SurtidorError::Storage`] if no storage was
            /// provided, [`SurtidorError::MissingApiKey`] /
            /// [`SurtidorError::MissingBaseUrl`] when a required
            /// setting is absent, or [`SurtidorError::Http`] if the
            /// HTTP client fails to build.
            #[inline]
            pub fn build(self) -> Result<$client<S>> {
                let storage = self.storage.ok_or_else(|| {
                    SurtidorError::Storage("storage backend is required".into())
                })?;

                let mut http_builder = <$http_client>::builder()
                    .api_key(self.api_key.ok_or(SurtidorError::MissingApiKey)?);
                if let Some(url) = self.base_url {
                    http_builder = http_builder.base_url(url);
                }
                let client = http_builder.build()?;

                Ok($client { client, storage })
            }
        }

        #[doc = $client_doc]
        #[derive(Debug)]
        pub struct $client<S: $storage_trait> {
            /// Low-level HTTP client.
            client: $http_client,
            /// Cooldown-stamp storage backend.
            storage: S,
        }

        impl<S: $storage_trait> $client<S> {
            /// Creates a new builder for configuring the client.
            #[inline]
            #[must_use]
            pub const fn builder() -> $builder<S> {
                $builder {
                    api_key: None,
                    base_url: None,
                    storage: None,
                }
            }

            /// Fetches the discounts matching the given query.
            ///
            /// # Errors
            ///
            /// Returns an error if the HTTP request fails or the
            /// service rejects the query.
            #[inline]
            pub $($async_kw)? fn discounts(
                &self,
                query: &DiscountQuery,
            ) -> Result<Vec<Discount>> {
                self.client.discounts(query) $( .$await_ext )?
            }

            /// Validates and submits a discount recommendation.
            ///
            /// The recommend cooldown is checked first
            /// ([`SurtidorError::Cooldown`] while active), then the
            /// draft is validated locally; only after the service
            /// confirms the insert is a new cooldown stamp recorded.
            ///
            /// # Errors
            ///
            /// Returns an error if the cooldown is active, validation
            /// fails, or the HTTP request fails.
            #[tracing::instrument(skip_all)]
            pub $($async_kw)? fn recommend(
                &self,
                draft: &RecommendationDraft,
            ) -> Result<()> {
                self.ensure_ready(SubmissionKind::Recommendation) $( .$await_ext )? ?;
                let payload = draft.validate()?;
                self.client.insert_recommendation(&payload) $( .$await_ext )? ?;
                self.storage
                    .record_submission(SubmissionKind::Recommendation, now_millis())
                    $( .$await_ext )? ?;
                tracing::debug!("recommendation accepted, cooldown started");
                Ok(())
            }

            /// Validates and submits an error report.
            ///
            /// Same flow as [`Self::recommend`], against the separate
            /// report cooldown. A duplicate-report rejection surfaces
            /// as [`SurtidorError::DuplicateReport`] and does not
            /// start the cooldown.
            ///
            /// # Errors
            ///
            /// Returns an error if the cooldown is active, validation
            /// fails, or the HTTP request fails.
            #[tracing::instrument(skip_all)]
            pub $($async_kw)? fn report(
                &self,
                draft: &ErrorReportDraft,
            ) -> Result<()> {
                self.ensure_ready(SubmissionKind::Report) $( .$await_ext )? ?;
                let payload = draft.validate()?;
                self.client.insert_report(&payload) $( .$await_ext )? ?;
                self.storage
                    .record_submission(SubmissionKind::Report, now_millis())
                    $( .$await_ext )? ?;
                tracing::debug!("error report accepted, cooldown started");
                Ok(())
            }

            /// Returns the current gate state for a submission kind,
            /// resuming from the stored stamp.
            ///
            /// A stale stamp (cooldown already elapsed) is cleared
            /// from storage as a side effect.
            ///
            /// # Errors
            ///
            /// Returns an error if the storage backend fails.
            pub $($async_kw)? fn cooldown(
                &self,
                kind: SubmissionKind,
            ) -> Result<CooldownState> {
                let stored = self.storage.last_submission(kind) $( .$await_ext )? ?;
                let resumed = CooldownState::resume(stored, now_millis(), kind.cooldown());
                if resumed.clear_stored {
                    tracing::debug!(kind = ?kind, "clearing stale cooldown stamp");
                    self.storage.clear_submission(kind) $( .$await_ext )? ?;
                }
                Ok(resumed.state)
            }

            /// Returns a reference to the underlying HTTP client.
            #[inline]
            #[must_use]
            pub const fn inner_client(&self) -> &$http_client {
                &self.client
            }

            /// Returns a reference to the storage backend.
            #[inline]
            #[must_use]
            pub const fn storage(&self) -> &S {
                &self.storage
            }

            /// Rejects the submission while its cooldown is active.
            $($async_kw)? fn ensure_ready(&self, kind: SubmissionKind) -> Result<()> {
                let stored = self.storage.last_submission(kind) $( .$await_ext )? ?;
                match remaining_secs(stored, now_millis(), kind.cooldown()) {
                    Some(secs) => {
                        tracing::debug!(kind = ?kind, remaining = secs, "submission gated");
                        Err(SurtidorError::Cooldown {
                            remaining_secs: secs,
                        })
                    }
                    None => {
                        if stored.is_some() {
                            self.storage.clear_submission(kind) $( .$await_ext )? ?;
                        }
                        Ok(())
                    }
                }
            }
        }
    };
}

// ── Async variant ───────────────────────────────────────────────────────

#[cfg(feature = "async")]
mod async_surtidor {
    //! Async high-level client.

    use crate::client::PromoClient;
    use crate::cooldown::{CooldownState, remaining_secs};
    use crate::error::{Result, SurtidorError};
    use crate::models::{Discount, ErrorReportDraft, RecommendationDraft};
    use crate::query::DiscountQuery;
    use crate::storage::{CooldownStore, SubmissionKind};

    use super::now_millis;

    define_surtidor! {
        client_name: Surtidor,
        builder_name: SurtidorBuilder,
        http_client: PromoClient,
        storage_trait: CooldownStore,
        client_doc: "High-level async Surtidor client with integrated cooldown storage.\n\nUse [`Surtidor::builder()`] to construct an instance.",
        builder_doc: "Builder for constructing a [`Surtidor`] client.",
        async_kw: async,
        await_kw: await,
    }
}

// ── Blocking variant ────────────────────────────────────────────────────

#[cfg(feature = "blocking")]
mod blocking_surtidor {
    //! Blocking high-level client.

    use crate::client::PromoBlockingClient;
    use crate::cooldown::{CooldownState, remaining_secs};
    use crate::error::{Result, SurtidorError};
    use crate::models::{Discount, ErrorReportDraft, RecommendationDraft};
    use crate::query::DiscountQuery;
    use crate::storage::{BlockingCooldownStore, SubmissionKind};

    use super::now_millis;

    define_surtidor! {
        client_name: SurtidorBlocking,
        builder_name: SurtidorBlockingBuilder,
        http_client: PromoBlockingClient,
        storage_trait: BlockingCooldownStore,
        client_doc: "High-level blocking Surtidor client with integrated cooldown storage.\n\nUse [`SurtidorBlocking::builder()`] to construct an instance.",
        builder_doc: "Builder for constructing a [`SurtidorBlocking`] client.",
    }
}

#[cfg(feature = "async")]
pub use async_surtidor::{Surtidor, SurtidorBuilder};
#[cfg(feature = "blocking")]
pub use blocking_surtidor::{SurtidorBlocking, SurtidorBlockingBuilder};
