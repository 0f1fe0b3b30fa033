//! Lifecycle clock: deadlines derived from `(created_at, status, now)`.
//!
//! Nothing here holds state. A tracker that restarts, or attaches late, recomputes the
//! same answers from the immutable creation timestamp.

use crate::config::EngineConfig;
use crate::model::OrderStatus;
use chrono::{DateTime, TimeDelta, Utc};
use serde::Serialize;

fn delta(secs: u64) -> TimeDelta {
    TimeDelta::seconds(i64::try_from(secs).unwrap_or(i64::MAX / 1_000))
}

/// End of the cancellation window: `created_at + cancel_window`.
pub fn cancel_deadline(created_at: DateTime<Utc>, config: &EngineConfig) -> DateTime<Utc> {
    created_at + delta(config.cancel_window_secs)
}

/// When `status` is due to move one step forward, or `None` if it never will.
///
/// For forward index `i` the deadline is `created_at + cancel_window + i * stage_interval`.
pub fn advance_deadline(
    created_at: DateTime<Utc>,
    status: OrderStatus,
    config: &EngineConfig,
) -> Option<DateTime<Utc>> {
    status.next()?;
    let index = status.forward_index()? as u64;
    Some(cancel_deadline(created_at, config) + delta(index * config.stage_interval_secs))
}

/// The single status an observer should write at `now`, if any.
///
/// Only ever one step: repeated checks at the same `now` for the same observed status
/// return the same target.
pub fn auto_advance_target(
    created_at: DateTime<Utc>,
    status: OrderStatus,
    now: DateTime<Utc>,
    config: &EngineConfig,
) -> Option<OrderStatus> {
    let deadline = advance_deadline(created_at, status, config)?;
    if now >= deadline {
        status.next()
    } else {
        None
    }
}

/// Whether a cancel would be accepted, and the countdown to show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CancelWindow {
    pub can_cancel: bool,
    pub seconds_left: u64,
}

impl CancelWindow {
    pub const CLOSED: CancelWindow = CancelWindow {
        can_cancel: false,
        seconds_left: 0,
    };

    /// `seconds_left = max(0, ceil((deadline - now) / 1s))`; open iff `now < deadline`
    /// and the status is not terminal.
    pub fn at(
        created_at: DateTime<Utc>,
        status: OrderStatus,
        now: DateTime<Utc>,
        config: &EngineConfig,
    ) -> Self {
        let remaining = cancel_deadline(created_at, config) - now;
        let seconds_left = if remaining <= TimeDelta::zero() {
            0
        } else {
            match remaining.num_nanoseconds() {
                Some(nanos) => (nanos as u64).div_ceil(1_000_000_000),
                None => remaining.num_seconds() as u64,
            }
        };
        Self {
            can_cancel: seconds_left > 0 && !status.is_terminal(),
            seconds_left,
        }
    }
}
