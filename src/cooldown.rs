//! Submission cooldown state machine.
//!
//! Both write paths (recommendations and error reports) are gated
//! behind a fixed-duration cooldown whose start stamp is persisted in
//! durable storage, so the gate survives restarts. The machine itself
//! is pure: callers supply the current time in Unix milliseconds and
//! drive the one-second tick.

use core::time::Duration;

/// Cooldown applied after a successful recommendation submission.
pub const RECOMMEND_COOLDOWN: Duration = Duration::from_secs(3);

/// Cooldown applied after a successful error-report submission.
pub const REPORT_COOLDOWN: Duration = Duration::from_secs(30);

/// Gate state for one submission kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CooldownState {
    /// Submissions are allowed.
    Ready,
    /// Submissions are disabled until the countdown reaches zero.
    Cooling {
        /// Whole seconds left, rounded up.
        remaining_secs: u64,
    },
}

/// Outcome of resuming the gate from a stored stamp at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resumed {
    /// The state to resume in.
    pub state: CooldownState,
    /// `true` when a stale stored stamp should be cleared.
    pub clear_stored: bool,
}

impl CooldownState {
    /// Returns `true` while submissions are allowed.
    #[inline]
    #[must_use]
    pub const fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }

    /// Enters the cooldown for a full `duration`.
    #[inline]
    #[must_use]
    pub const fn start(duration: Duration) -> Self {
        Self::Cooling {
            remaining_secs: duration.as_millis().div_ceil(1000) as u64,
        }
    }

    /// Advances the one-second tick.
    ///
    /// Returns `true` when this tick transitioned the gate to
    /// [`CooldownState::Ready`] — the moment the caller should clear
    /// the stored stamp.
    pub const fn tick(&mut self) -> bool {
        match *self {
            Self::Ready => false,
            Self::Cooling { remaining_secs } => {
                if remaining_secs <= 1 {
                    *self = Self::Ready;
                    true
                } else {
                    *self = Self::Cooling {
                        remaining_secs: remaining_secs - 1,
                    };
                    false
                }
            }
        }
    }

    /// Resumes the gate from a stored stamp.
    ///
    /// A stamp younger than `duration` resumes the countdown with the
    /// leftover time rounded up to whole seconds; an older (or absent)
    /// stamp starts [`CooldownState::Ready`], flagging stale stamps
    /// for removal.
    #[must_use]
    pub fn resume(stored_millis: Option<i64>, now_millis: i64, duration: Duration) -> Resumed {
        match remaining_secs(stored_millis, now_millis, duration) {
            Some(secs) => Resumed {
                state: Self::Cooling {
                    remaining_secs: secs,
                },
                clear_stored: false,
            },
            None => Resumed {
                state: Self::Ready,
                clear_stored: stored_millis.is_some(),
            },
        }
    }
}

/// Computes the whole seconds left on a stored stamp, rounded up, or
/// `None` once the cooldown has expired (or no stamp exists).
///
/// A stamp from the future (clock skew) is clamped to a full
/// `duration`.
#[must_use]
pub fn remaining_secs(
    stored_millis: Option<i64>,
    now_millis: i64,
    duration: Duration,
) -> Option<u64> {
    let stamp = stored_millis?;
    let duration_ms = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
    let elapsed = now_millis.saturating_sub(stamp);
    if elapsed < 0 {
        return Some(duration_ms.div_ceil(1000));
    }
    let elapsed_ms = u64::try_from(elapsed).unwrap_or(u64::MAX);
    if elapsed_ms >= duration_ms {
        return None;
    }
    Some((duration_ms - elapsed_ms).div_ceil(1000))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resume_with_no_stamp_is_ready() {
        let resumed = CooldownState::resume(None, 1_000_000, RECOMMEND_COOLDOWN);
        assert_eq!(resumed.state, CooldownState::Ready);
        assert!(!resumed.clear_stored);
    }

    #[test]
    fn resume_mid_cooldown_rounds_up() {
        // 1.2s elapsed of a 3s cooldown: 1.8s left, displayed as 2s.
        let resumed = CooldownState::resume(Some(10_000), 11_200, RECOMMEND_COOLDOWN);
        assert_eq!(
            resumed.state,
            CooldownState::Cooling { remaining_secs: 2 }
        );
        assert!(!resumed.clear_stored);
    }

    #[test]
    fn resume_exact_boundary_is_ready() {
        let resumed = CooldownState::resume(Some(10_000), 13_000, RECOMMEND_COOLDOWN);
        assert_eq!(resumed.state, CooldownState::Ready);
        assert!(resumed.clear_stored);
    }

    #[test]
    fn resume_stale_stamp_requests_clear() {
        let resumed = CooldownState::resume(Some(0), 1_000_000, REPORT_COOLDOWN);
        assert_eq!(resumed.state, CooldownState::Ready);
        assert!(resumed.clear_stored);
    }

    #[test]
    fn resume_future_stamp_clamps_to_full_duration() {
        let resumed = CooldownState::resume(Some(20_000), 10_000, RECOMMEND_COOLDOWN);
        assert_eq!(
            resumed.state,
            CooldownState::Cooling { remaining_secs: 3 }
        );
    }

    #[test]
    fn start_uses_whole_duration() {
        assert_eq!(
            CooldownState::start(REPORT_COOLDOWN),
            CooldownState::Cooling { remaining_secs: 30 }
        );
    }

    #[test]
    fn tick_counts_down_to_ready() {
        let mut state = CooldownState::start(RECOMMEND_COOLDOWN);
        assert!(!state.tick());
        assert_eq!(state, CooldownState::Cooling { remaining_secs: 2 });
        assert!(!state.tick());
        assert!(state.tick());
        assert_eq!(state, CooldownState::Ready);
    }

    #[test]
    fn tick_on_ready_is_a_no_op() {
        let mut state = CooldownState::Ready;
        assert!(!state.tick());
        assert_eq!(state, CooldownState::Ready);
    }

    #[test]
    fn remaining_secs_rounds_up() {
        assert_eq!(
            remaining_secs(Some(0), 1, REPORT_COOLDOWN),
            Some(30)
        );
        assert_eq!(
            remaining_secs(Some(0), 29_001, REPORT_COOLDOWN),
            Some(1)
        );
        assert_eq!(remaining_secs(Some(0), 30_000, REPORT_COOLDOWN), None);
    }
}
