//! Application state reducer for the listing view.
//!
//! UI state lives in one [`AppState`] value mutated only through
//! [`AppState::apply`]; every query-mutating action returns an
//! [`Effect`] telling the caller what to do next (re-run the fetch,
//! clear the stored cooldown stamp). Fetch completions carry the
//! request sequence they answer, so a slow response that was overtaken
//! by a newer request is discarded instead of overwriting fresher
//! results.

use crate::cooldown::CooldownState;
use crate::models::Discount;
use crate::models::days::EVERY_DAY;
use crate::query::{DiscountQuery, SortField, SortSpec, sanitize_search};

/// Listing fetch lifecycle: `Idle → Loading → (Success | Error)`.
///
/// An empty [`ResultsState::Success`] is a distinct, renderable state
/// ("no discounts found"), not a loading placeholder. An error clears
/// any previously displayed records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResultsState {
    /// Nothing fetched yet.
    Idle,
    /// A fetch is in flight.
    Loading,
    /// The last fetch succeeded; the list may be empty.
    Success(Vec<Discount>),
    /// The last fetch failed; carries the human-readable message.
    Error(String),
}

impl ResultsState {
    /// Returns the displayed records, if any.
    #[inline]
    #[must_use]
    pub fn records(&self) -> Option<&[Discount]> {
        match self {
            Self::Success(records) => Some(records),
            Self::Idle | Self::Loading | Self::Error(_) => None,
        }
    }
}

/// State-mutating events handled by the reducer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// The user toggled a brand filter value.
    ToggleBrand(String),
    /// The user toggled a day filter value.
    ToggleDay(String),
    /// The user edited the search box (raw, unsanitized text).
    SetSearch(String),
    /// The user clicked a sortable column header.
    SelectSort(SortField),
    /// A fetch issued with the given sequence number succeeded.
    FetchSucceeded {
        /// Sequence number the fetch was issued with.
        seq: u64,
        /// Records returned by the data service.
        records: Vec<Discount>,
    },
    /// A fetch issued with the given sequence number failed.
    FetchFailed {
        /// Sequence number the fetch was issued with.
        seq: u64,
        /// Human-readable failure message.
        message: String,
    },
    /// One second elapsed on the recommend-cooldown timer.
    Tick,
}

/// Follow-up work the caller must perform after a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    /// Nothing to do.
    None,
    /// Re-run the listing fetch with the given sequence number.
    Refetch {
        /// Sequence number to attach to the fetch's completion action.
        seq: u64,
    },
    /// The cooldown just expired; clear the stored stamp.
    CooldownElapsed,
}

/// The listing view's complete state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    /// Current filter/search/sort state.
    pub query: DiscountQuery,
    /// Current fetch lifecycle state.
    pub results: ResultsState,
    /// Recommend-submission gate.
    pub recommend_cooldown: CooldownState,
    /// Monotonic counter identifying the newest issued fetch.
    request_seq: u64,
}

impl AppState {
    /// Creates the initial state: empty query, nothing fetched,
    /// cooldown ready.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            query: DiscountQuery::new(),
            results: ResultsState::Idle,
            recommend_cooldown: CooldownState::Ready,
            request_seq: 0,
        }
    }

    /// Creates the initial state with a cooldown resumed from storage.
    #[inline]
    #[must_use]
    pub fn with_cooldown(cooldown: CooldownState) -> Self {
        Self {
            recommend_cooldown: cooldown,
            ..Self::new()
        }
    }

    /// Returns the sequence number of the newest issued fetch.
    #[inline]
    #[must_use]
    pub const fn request_seq(&self) -> u64 {
        self.request_seq
    }

    /// Applies an action and returns the follow-up effect.
    ///
    /// Stale fetch completions (sequence older than the newest issued
    /// fetch) are ignored: the last-issued request wins.
    pub fn apply(&mut self, action: Action) -> Effect {
        match action {
            Action::ToggleBrand(brand) => {
                self.query.brands = self.query.brands.toggle(&brand);
                self.begin_fetch()
            }
            Action::ToggleDay(day) => {
                self.query.days = self.query.days.toggle_exclusive(&day, EVERY_DAY);
                self.begin_fetch()
            }
            Action::SetSearch(raw) => {
                self.query.search = sanitize_search(&raw);
                self.begin_fetch()
            }
            Action::SelectSort(field) => {
                self.query.sort = Some(SortSpec::select(self.query.sort, field));
                self.begin_fetch()
            }
            Action::FetchSucceeded { seq, records } => {
                if seq == self.request_seq {
                    self.results = ResultsState::Success(records);
                } else {
                    tracing::debug!(seq, newest = self.request_seq, "discarding stale response");
                }
                Effect::None
            }
            Action::FetchFailed { seq, message } => {
                if seq == self.request_seq {
                    self.results = ResultsState::Error(message);
                } else {
                    tracing::debug!(seq, newest = self.request_seq, "discarding stale failure");
                }
                Effect::None
            }
            Action::Tick => {
                if self.recommend_cooldown.tick() {
                    Effect::CooldownElapsed
                } else {
                    Effect::None
                }
            }
        }
    }

    /// Bumps the request sequence and enters the loading state.
    fn begin_fetch(&mut self) -> Effect {
        self.request_seq += 1;
        self.results = ResultsState::Loading;
        Effect::Refetch {
            seq: self.request_seq,
        }
    }
}

impl Default for AppState {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cooldown::RECOMMEND_COOLDOWN;
    use crate::models::{DiscountId, Frequency, FuelBrand};

    /// Creates a minimal test discount.
    fn test_discount(id: &str) -> Discount {
        Discount {
            id: DiscountId::new(id.to_owned()),
            fuel_brand: FuelBrand::Ypf,
            day: "Lunes".to_owned(),
            card_method: "Visa".to_owned(),
            discount: 10,
            reimbursement_limit: Some(5000),
            frequency: Frequency::Weekly,
            source_url: None,
        }
    }

    #[test]
    fn query_change_enters_loading_and_requests_refetch() {
        let mut state = AppState::new();
        let effect = state.apply(Action::ToggleBrand("YPF".to_owned()));
        assert_eq!(effect, Effect::Refetch { seq: 1 });
        assert_eq!(state.results, ResultsState::Loading);
        assert!(state.query.brands.contains("YPF"));
    }

    #[test]
    fn every_mutation_bumps_the_sequence() {
        let mut state = AppState::new();
        assert_eq!(
            state.apply(Action::ToggleBrand("YPF".to_owned())),
            Effect::Refetch { seq: 1 }
        );
        assert_eq!(
            state.apply(Action::SetSearch("visa".to_owned())),
            Effect::Refetch { seq: 2 }
        );
        assert_eq!(
            state.apply(Action::SelectSort(SortField::Discount)),
            Effect::Refetch { seq: 3 }
        );
        assert_eq!(state.request_seq(), 3);
    }

    #[test]
    fn matching_response_is_applied() {
        let mut state = AppState::new();
        let Effect::Refetch { seq } = state.apply(Action::SetSearch("visa".to_owned())) else {
            unreachable!("query mutation must request a refetch");
        };
        let effect = state.apply(Action::FetchSucceeded {
            seq,
            records: vec![test_discount("d-1")],
        });
        assert_eq!(effect, Effect::None);
        assert_eq!(state.results.records().map(<[Discount]>::len), Some(1));
    }

    #[test]
    fn stale_response_is_discarded() {
        let mut state = AppState::new();
        let Effect::Refetch { seq: first } = state.apply(Action::ToggleBrand("YPF".to_owned()))
        else {
            unreachable!("query mutation must request a refetch");
        };
        let Effect::Refetch { seq: second } = state.apply(Action::ToggleDay("Lunes".to_owned()))
        else {
            unreachable!("query mutation must request a refetch");
        };

        // The newer request resolves first.
        drop(state.apply(Action::FetchSucceeded {
            seq: second,
            records: vec![test_discount("fresh")],
        }));
        // The overtaken request resolves afterwards and must not win.
        drop(state.apply(Action::FetchSucceeded {
            seq: first,
            records: vec![test_discount("stale-a"), test_discount("stale-b")],
        }));

        let records = state.results.records().unwrap_or(&[]);
        assert_eq!(records.len(), 1);
        assert_eq!(records.first().map(|d| d.id.as_inner()), Some("fresh"));
    }

    #[test]
    fn stale_failure_does_not_clobber_fresh_results() {
        let mut state = AppState::new();
        let Effect::Refetch { seq: first } = state.apply(Action::SetSearch("a".to_owned())) else {
            unreachable!("query mutation must request a refetch");
        };
        let Effect::Refetch { seq: second } = state.apply(Action::SetSearch("ab".to_owned()))
        else {
            unreachable!("query mutation must request a refetch");
        };
        drop(state.apply(Action::FetchSucceeded {
            seq: second,
            records: vec![test_discount("d-1")],
        }));
        drop(state.apply(Action::FetchFailed {
            seq: first,
            message: "timeout".to_owned(),
        }));
        assert!(state.results.records().is_some());
    }

    #[test]
    fn failure_clears_previous_records() {
        let mut state = AppState::new();
        let Effect::Refetch { seq } = state.apply(Action::ToggleBrand("YPF".to_owned())) else {
            unreachable!("query mutation must request a refetch");
        };
        drop(state.apply(Action::FetchSucceeded {
            seq,
            records: vec![test_discount("d-1")],
        }));

        let Effect::Refetch { seq: next } = state.apply(Action::ToggleBrand("SHELL".to_owned()))
        else {
            unreachable!("query mutation must request a refetch");
        };
        drop(state.apply(Action::FetchFailed {
            seq: next,
            message: "connection reset".to_owned(),
        }));

        assert_eq!(
            state.results,
            ResultsState::Error("connection reset".to_owned())
        );
        assert!(state.results.records().is_none());
    }

    #[test]
    fn empty_success_is_distinct_from_loading() {
        let mut state = AppState::new();
        let Effect::Refetch { seq } = state.apply(Action::SetSearch("zzz".to_owned())) else {
            unreachable!("query mutation must request a refetch");
        };
        drop(state.apply(Action::FetchSucceeded {
            seq,
            records: Vec::new(),
        }));
        assert_eq!(state.results, ResultsState::Success(Vec::new()));
        assert_ne!(state.results, ResultsState::Loading);
    }

    #[test]
    fn search_action_sanitizes_input() {
        let mut state = AppState::new();
        drop(state.apply(Action::SetSearch("1% free text!!".to_owned())));
        assert_eq!(state.query.search, "1 free text");
    }

    #[test]
    fn day_toggle_respects_sentinel() {
        let mut state = AppState::new();
        drop(state.apply(Action::ToggleDay(EVERY_DAY.to_owned())));
        drop(state.apply(Action::ToggleDay("Lunes".to_owned())));
        assert_eq!(state.query.days.iter().collect::<Vec<_>>(), ["Lunes"]);
    }

    #[test]
    fn tick_drives_cooldown_and_signals_expiry() {
        let mut state = AppState::with_cooldown(CooldownState::start(RECOMMEND_COOLDOWN));
        assert_eq!(state.apply(Action::Tick), Effect::None);
        assert_eq!(state.apply(Action::Tick), Effect::None);
        assert_eq!(state.apply(Action::Tick), Effect::CooldownElapsed);
        assert!(state.recommend_cooldown.is_ready());
        assert_eq!(state.apply(Action::Tick), Effect::None);
    }
}
