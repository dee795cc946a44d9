//! Session keep-alive.
//!
//! Pings the backend periodically. Failures are counted and any success
//! resets the count; once the count exceeds the configured threshold the
//! session is declared logged out exactly once and pinging stops.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

use super::logout::logout_at_browser;
use crate::context::ConsoleContext;

/// Shown once when the session is found to be gone.
pub const SESSION_TERMINATED: &str =
    "Your session has terminated / timed out. Please log in again.";

/// Result of one keep-alive attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PingStatus {
    /// Not sent: already logged out or over the failure threshold.
    Skipped,
    /// Backend answered; failure count reset.
    Alive,
    /// Ping failed; `fails` consecutive failures so far.
    Failed { fails: u32 },
    /// This failure crossed the threshold and ended the session.
    LoggedOut,
}

pub struct KeepAlive {
    ctx: Arc<ConsoleContext>,
    fails: AtomicU32,
    logged_out: AtomicBool,
}

impl KeepAlive {
    pub fn new(ctx: Arc<ConsoleContext>) -> Self {
        Self {
            ctx,
            fails: AtomicU32::new(0),
            logged_out: AtomicBool::new(false),
        }
    }

    pub fn fails(&self) -> u32 {
        self.fails.load(Ordering::Acquire)
    }

    pub fn is_logged_out(&self) -> bool {
        self.logged_out.load(Ordering::Acquire)
    }

    fn max_fails(&self) -> u32 {
        self.ctx.config().max_ping_fails
    }

    /// Send one ping unless the session is already over.
    pub async fn send_keep_alive(&self) -> PingStatus {
        if self.fails() > self.max_fails() || self.is_logged_out() {
            return PingStatus::Skipped;
        }

        match self.ctx.channel().ping().await {
            Ok(()) => {
                self.fails.store(0, Ordering::Release);
                tracing::trace!("keep-alive ok");
                PingStatus::Alive
            }
            Err(err) => {
                let fails = self.fails.fetch_add(1, Ordering::AcqRel) + 1;
                tracing::warn!(fails, "keep-alive failed: {}", err);
                if fails > self.max_fails() {
                    self.inform_logged_out().await;
                    PingStatus::LoggedOut
                } else {
                    PingStatus::Failed { fails }
                }
            }
        }
    }

    /// Tell the user the session is gone and clear it locally.
    ///
    /// Only the first call has any effect. Returns whether this call did.
    pub async fn inform_logged_out(&self) -> bool {
        if self.logged_out.swap(true, Ordering::AcqRel) {
            return false;
        }
        tracing::info!("session terminated, logging out");
        self.ctx.ui().alert(SESSION_TERMINATED).await;
        logout_at_browser(&self.ctx);
        true
    }

    /// Ping every `ping_interval` until the session ends.
    pub async fn run(&self) {
        let period = self.ctx.config().ping_interval;
        let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        while !self.is_logged_out() {
            ticker.tick().await;
            self.send_keep_alive().await;
        }
        tracing::debug!("keep-alive loop finished");
    }
}
