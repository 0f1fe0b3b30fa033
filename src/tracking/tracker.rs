//! Per-order tracker.
//!
//! An [`OrderTracker`] owns one background task that watches a single order:
//!
//! - record writes arrive through the order's change channel
//! - a countdown ticks while the cancellation window is open
//! - a deferred advance sleeps until the next auto-advance deadline
//!
//! All three are rebuilt from `(created_at, status, now)` on every loop iteration, so
//! the task holds no timer state worth losing. The derived [`TrackerView`] is published
//! on a `watch` channel for presentation.

use crate::clients::{OrderBackend, OrderSubscription};
use crate::config::EngineConfig;
use crate::model::{Order, OrderId, OrderStatus};
use crate::order_actor::OrderError;
use crate::session::{Session, SessionError};
use crate::tracking::clock::Clock;
use crate::tracking::notify::{item_summary, OrderNotifier};
use crate::tracking::progress::{self, TimelineStep};
use crate::tracking::schedule::{self, CancelWindow};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn, Instrument};

/// Why a cancel request was refused.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum CancelError {
    /// The order is already delivered or cancelled.
    #[error("Order is already {0}")]
    TerminalState(OrderStatus),

    /// The cancellation window has passed.
    #[error("Cancellation window has closed")]
    WindowClosed,

    #[error(transparent)]
    Session(#[from] SessionError),

    /// The order record could not be written.
    #[error("Cancel failed: {0}")]
    Backend(OrderError),
}

/// Everything the tracking screen renders, derived from one observation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackerView {
    pub order_id: OrderId,
    pub status: OrderStatus,
    pub progress_percent: u8,
    pub label: &'static str,
    pub description: &'static str,
    pub caption: &'static str,
    pub cancel_window: CancelWindow,
    pub timeline: Vec<TimelineStep>,
}

impl TrackerView {
    pub fn derive(order: &Order, now: DateTime<Utc>, config: &EngineConfig) -> Self {
        let status = order.status;
        Self {
            order_id: order.id,
            status,
            progress_percent: progress::progress_percent(status),
            label: progress::status_label(status),
            description: progress::status_description(status),
            caption: progress::header_caption(status),
            cancel_window: CancelWindow::at(order.created_at, status, now, config),
            timeline: progress::timeline(status),
        }
    }
}

/// Handle to a running tracker. Dropping it stops the background task.
pub struct OrderTracker {
    order_id: OrderId,
    created_at: DateTime<Utc>,
    view: watch::Receiver<TrackerView>,
    backend: Arc<dyn OrderBackend>,
    session: Session,
    clock: Arc<dyn Clock>,
    config: EngineConfig,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl OrderTracker {
    /// Starts tracking `order_id` for the session's user.
    ///
    /// If an advance deadline has already passed, the owed transition is written right
    /// away, one step per observation.
    ///
    /// # Errors
    /// - [`OrderError::Validation`] if the session has ended.
    /// - [`OrderError::NotFound`] if the order does not exist or belongs to someone else.
    pub async fn attach(
        order_id: OrderId,
        backend: Arc<dyn OrderBackend>,
        notifier: Arc<dyn OrderNotifier>,
        session: Session,
        clock: Arc<dyn Clock>,
        config: EngineConfig,
    ) -> Result<Self, OrderError> {
        session
            .require_active()
            .map_err(|e| OrderError::Validation(e.to_string()))?;

        let mut subscription = backend.subscribe_to_order_changes(order_id).await?;
        let order = subscription.current();
        if &order.user_id != session.user_id() {
            return Err(OrderError::NotFound(order_id.to_string()));
        }

        let (view_tx, view) = watch::channel(TrackerView::derive(&order, clock.now(), &config));
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let created_at = order.created_at;

        let worker = Worker {
            order,
            subscription,
            backend: backend.clone(),
            notifier,
            user_name: session.display_name().to_string(),
            clock: clock.clone(),
            config: config.clone(),
            view: view_tx,
            blocked: false,
            notified: false,
        };
        let span = tracing::info_span!("order_tracker", %order_id);
        let task = tokio::spawn(worker.run(shutdown_rx).instrument(span));
        info!(%order_id, "Tracker attached");

        Ok(Self {
            order_id,
            created_at,
            view,
            backend,
            session,
            clock,
            config,
            shutdown: Some(shutdown_tx),
            task: Some(task),
        })
    }

    pub fn order_id(&self) -> OrderId {
        self.order_id
    }

    /// Last observed status.
    pub fn display_status(&self) -> OrderStatus {
        self.view.borrow().status
    }

    pub fn progress_percent(&self) -> u8 {
        progress::progress_percent(self.display_status())
    }

    /// Recomputed from the clock on every call.
    pub fn cancel_window(&self) -> CancelWindow {
        CancelWindow::at(
            self.created_at,
            self.display_status(),
            self.clock.now(),
            &self.config,
        )
    }

    /// Cancels the order if it is still inside the window.
    ///
    /// The refusal reasons are checked in order: session, terminal status, window.
    /// The new status reaches the view through the change channel.
    pub async fn request_cancel(&self) -> Result<(), CancelError> {
        self.session.require_active()?;
        let status = self.display_status();
        if status.is_terminal() {
            return Err(CancelError::TerminalState(status));
        }
        if !self.cancel_window().can_cancel {
            return Err(CancelError::WindowClosed);
        }

        match self
            .backend
            .update_order_status(self.order_id, OrderStatus::Cancelled)
            .await
        {
            Ok(_) => {
                info!(order_id = %self.order_id, "Order cancelled");
                Ok(())
            }
            Err(OrderError::Conflict { from, .. }) if from.is_terminal() => {
                Err(CancelError::TerminalState(from))
            }
            Err(e) => {
                warn!(order_id = %self.order_id, error = %e, "Cancel failed");
                Err(CancelError::Backend(e))
            }
        }
    }

    pub fn view(&self) -> TrackerView {
        self.view.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<TrackerView> {
        self.view.clone()
    }

    /// True once the background task has stopped, for example because the order's
    /// change channel closed.
    pub fn is_finished(&self) -> bool {
        self.task.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Stops the background task and waits for it.
    pub async fn detach(mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                warn!(order_id = %self.order_id, error = %e, "Tracker task failed");
            }
        }
        debug!(order_id = %self.order_id, "Tracker detached");
    }
}

impl Drop for OrderTracker {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// State owned by the background task.
struct Worker {
    order: Order,
    subscription: OrderSubscription,
    backend: Arc<dyn OrderBackend>,
    notifier: Arc<dyn OrderNotifier>,
    user_name: String,
    clock: Arc<dyn Clock>,
    config: EngineConfig,
    view: watch::Sender<TrackerView>,
    /// Set after a failed write; cleared by the next observed change.
    blocked: bool,
    notified: bool,
}

impl Worker {
    async fn run(mut self, mut shutdown: oneshot::Receiver<()>) {
        let tick = self.config.countdown_tick();
        let mut countdown = tokio::time::interval_at(tokio::time::Instant::now() + tick, tick);
        countdown.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            let now = self.clock.now();
            self.publish(now);

            let deadline = if self.blocked {
                None
            } else {
                schedule::advance_deadline(self.order.created_at, self.order.status, &self.config)
            };
            if let Some(deadline) = deadline {
                if now >= deadline {
                    self.advance(now).await;
                    continue;
                }
            }
            let advance_in: Option<Duration> =
                deadline.map(|d| (d - now).to_std().unwrap_or_default());
            let window_open =
                CancelWindow::at(self.order.created_at, self.order.status, now, &self.config)
                    .can_cancel;

            tokio::select! {
                biased;
                _ = &mut shutdown => break,
                changed = self.subscription.changed() => match changed {
                    Ok(order) => {
                        self.blocked = false;
                        self.observe(order);
                    }
                    Err(e) => {
                        warn!(error = %e, "Order feed closed, stopping tracker");
                        break;
                    }
                },
                _ = countdown.tick(), if window_open => {}
                _ = tokio::time::sleep(advance_in.unwrap_or_default()), if advance_in.is_some() => {}
            }
        }
        debug!("Tracker stopped");
    }

    /// Writes the one transition owed at `now`.
    async fn advance(&mut self, now: DateTime<Utc>) {
        let Some(target) =
            schedule::auto_advance_target(self.order.created_at, self.order.status, now, &self.config)
        else {
            return;
        };
        debug!(from = %self.order.status, to = %target, "Auto-advance");
        match self.backend.update_order_status(self.order.id, target).await {
            Ok(order) => {
                // A backend that acknowledges without applying would leave the deadline
                // overdue and spin this loop.
                if order.status == self.order.status {
                    warn!(status = %order.status, "Auto-advance had no effect, waiting for next change");
                    self.blocked = true;
                }
                self.observe(order);
            }
            Err(e) => {
                warn!(to = %target, error = %e, "Auto-advance failed, waiting for next change");
                self.blocked = true;
            }
        }
    }

    fn observe(&mut self, order: Order) {
        let previous = self.order.status;
        self.order = order;
        let current = self.order.status;
        if previous != current {
            info!(from = %previous, to = %current, "Status changed");
        }
        if !previous.is_terminal() && current.is_terminal() && !self.notified {
            self.notified = true;
            self.notify(current);
        }
    }

    fn publish(&self, now: DateTime<Utc>) {
        let next = TrackerView::derive(&self.order, now, &self.config);
        self.view.send_if_modified(|view| {
            if *view == next {
                false
            } else {
                *view = next;
                true
            }
        });
    }

    /// Fire-and-forget; failures are logged.
    fn notify(&self, status: OrderStatus) {
        let notifier = self.notifier.clone();
        let user_name = self.user_name.clone();
        let summary = item_summary(&self.order.items);
        let order_id = self.order.id;
        tokio::spawn(async move {
            let result = match status {
                OrderStatus::Delivered => notifier.notify_delivered(&user_name, &summary).await,
                OrderStatus::Cancelled => notifier.notify_cancelled(&user_name).await,
                _ => Ok(()),
            };
            if let Err(e) = result {
                warn!(%order_id, error = %e, "Notification failed");
            }
        });
    }
}
