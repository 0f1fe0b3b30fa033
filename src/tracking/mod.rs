//! Order lifecycle tracking.
//!
//! - [`schedule`]: pure deadline math over `(created_at, status, now)`
//! - [`progress`]: status to percentage and labels
//! - [`tracker`]: one background task per watched order
//! - [`registry`]: trackers keyed by order id
//! - [`notify`]: the outbound notification port
//! - [`clock`]: wall time, pausable in tests

pub mod clock;
pub mod notify;
pub mod progress;
pub mod registry;
pub mod schedule;
pub mod tracker;

pub use clock::{Clock, ManualClock, TokioClock};
pub use notify::{ChannelNotifier, NotifyError, OrderNotifier, RelayPayload, TracingNotifier};
pub use registry::TrackerRegistry;
pub use schedule::CancelWindow;
pub use tracker::{CancelError, OrderTracker, TrackerView};
