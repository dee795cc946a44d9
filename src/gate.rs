//! Confirmation gate and per-plugin operation guard.
//!
//! A mutating action runs only after the user affirms a prompt, and only
//! one such action per plugin may be in flight. [`OpGuard`] enforces the
//! transitions `Idle -> Confirming -> (Idle | Submitting) -> Idle` with
//! compare-and-swap, so a second trigger racing the first is rejected
//! rather than slipping through.

use std::future::Future;
use std::sync::atomic::{AtomicU8, Ordering};

use crate::traits::UiSurface;

const IDLE: u8 = 0;
const CONFIRMING: u8 = 1;
const SUBMITTING: u8 = 2;

/// Observable state of an [`OpGuard`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpState {
    Idle,
    Confirming,
    Submitting,
}

impl OpState {
    fn from_raw(raw: u8) -> Self {
        match raw {
            CONFIRMING => OpState::Confirming,
            SUBMITTING => OpState::Submitting,
            _ => OpState::Idle,
        }
    }
}

/// Guard against re-entrant submissions of one plugin's operations.
#[derive(Debug)]
pub struct OpGuard {
    name: &'static str,
    state: AtomicU8,
}

impl OpGuard {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name,
            state: AtomicU8::new(IDLE),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn state(&self) -> OpState {
        OpState::from_raw(self.state.load(Ordering::Acquire))
    }

    pub fn is_idle(&self) -> bool {
        self.state() == OpState::Idle
    }

    fn transition(&self, from: u8, to: u8) -> bool {
        self.state
            .compare_exchange(from, to, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// `Idle -> Confirming`. `None` if another operation holds the guard.
    pub fn try_confirm(&self) -> Option<OpTicket<'_>> {
        if self.transition(IDLE, CONFIRMING) {
            tracing::debug!(op = self.name, "confirming");
            Some(OpTicket { guard: self })
        } else {
            tracing::debug!(op = self.name, state = ?self.state(), "trigger rejected");
            None
        }
    }

    /// `Idle -> Submitting`, for actions without a prompt.
    pub fn try_submit(&self) -> Option<OpTicket<'_>> {
        if self.transition(IDLE, SUBMITTING) {
            tracing::debug!(op = self.name, "submitting");
            Some(OpTicket { guard: self })
        } else {
            tracing::debug!(op = self.name, state = ?self.state(), "trigger rejected");
            None
        }
    }
}

/// Ownership of a non-idle [`OpGuard`]. Dropping it returns the guard to
/// `Idle` from whichever state it reached.
#[derive(Debug)]
#[must_use = "dropping the ticket releases the guard immediately"]
pub struct OpTicket<'a> {
    guard: &'a OpGuard,
}

impl OpTicket<'_> {
    /// `Confirming -> Submitting`. No-op if already submitting.
    pub fn submit(&self) {
        self.guard.transition(CONFIRMING, SUBMITTING);
    }

    pub fn state(&self) -> OpState {
        self.guard.state()
    }
}

impl Drop for OpTicket<'_> {
    fn drop(&mut self) {
        self.guard.state.store(IDLE, Ordering::Release);
        tracing::trace!(op = self.guard.name, "idle");
    }
}

/// Result of an action behind a guard and optionally a prompt.
#[derive(Debug, Clone, PartialEq)]
pub enum Gated<T> {
    /// Another operation of the same plugin was already running.
    Busy,
    /// The user answered no.
    Declined,
    /// The action ran.
    Done(T),
}

impl<T> Gated<T> {
    pub fn is_done(&self) -> bool {
        matches!(self, Gated::Done(_))
    }

    pub fn done(self) -> Option<T> {
        match self {
            Gated::Done(value) => Some(value),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Gated<U> {
        match self {
            Gated::Busy => Gated::Busy,
            Gated::Declined => Gated::Declined,
            Gated::Done(value) => Gated::Done(f(value)),
        }
    }
}

impl<T, E> Gated<Result<T, E>> {
    /// Lift a fallible action's error out of the gate.
    pub fn transpose(self) -> Result<Gated<T>, E> {
        match self {
            Gated::Busy => Ok(Gated::Busy),
            Gated::Declined => Ok(Gated::Declined),
            Gated::Done(result) => result.map(Gated::Done),
        }
    }
}

/// Prompt with `message`; run `action` only if the user affirms.
pub async fn confirm_then_act<T, F, Fut>(
    guard: &OpGuard,
    ui: &dyn UiSurface,
    message: &str,
    action: F,
) -> Gated<T>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = T>,
{
    let Some(ticket) = guard.try_confirm() else {
        return Gated::Busy;
    };
    if !ui.confirm(message).await {
        tracing::debug!(op = guard.name(), "declined");
        return Gated::Declined;
    }
    ticket.submit();
    let output = action().await;
    drop(ticket);
    Gated::Done(output)
}

/// Run `action` under the guard without a prompt.
pub async fn act_guarded<T, F, Fut>(guard: &OpGuard, action: F) -> Gated<T>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = T>,
{
    let Some(ticket) = guard.try_submit() else {
        return Gated::Busy;
    };
    let output = action().await;
    drop(ticket);
    Gated::Done(output)
}
