//! Session commands: ping, keepalive, logout.

use std::sync::Arc;
use std::time::Duration;

use clap::Args;

use super::output::{self, icons};
use super::Completion;
use crate::config::ConsoleConfig;
use crate::context::ConsoleContext;
use crate::gate::Gated;
use crate::session::keepalive::{KeepAlive, PingStatus};

#[derive(Args, Debug, Clone)]
pub struct KeepaliveArgs {
    /// Seconds between pings
    #[arg(long, default_value_t = 60, value_parser = clap::value_parser!(u64).range(1..))]
    pub interval: u64,

    /// Consecutive failures tolerated before the session is dropped
    #[arg(long, default_value_t = 1)]
    pub max_fails: u32,
}

pub async fn ping(ctx: &ConsoleContext) -> Completion {
    match ctx.channel().ping().await {
        Ok(()) => {
            output::print_status(icons::SUCCESS, "Session is alive.");
            Completion::Success
        }
        Err(err) => super::settle(Err(err)),
    }
}

impl KeepaliveArgs {
    pub fn apply(&self, config: ConsoleConfig) -> ConsoleConfig {
        config
            .with_ping_interval(Duration::from_secs(self.interval))
            .with_max_ping_fails(self.max_fails)
    }
}

/// Keep the session alive until it ends or the user interrupts. The
/// interval and threshold come from the context configuration.
pub async fn keepalive(ctx: Arc<ConsoleContext>) -> Completion {
    let keepalive = KeepAlive::new(ctx);
    match keepalive.send_keep_alive().await {
        PingStatus::Alive => {
            output::print_status(icons::SUCCESS, "Session is alive. Press Ctrl-C to stop.")
        }
        PingStatus::Failed { fails } => {
            output::print_status(icons::WARNING, &format!("Ping failed ({} so far).", fails))
        }
        PingStatus::LoggedOut | PingStatus::Skipped => return Completion::Failed,
    }

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            tracing::info!(fails = keepalive.fails(), "keep-alive interrupted");
            Completion::Success
        }
        _ = keepalive.run() => Completion::Failed,
    }
}

pub async fn logout(ctx: &ConsoleContext) -> Completion {
    match crate::session::logout::logout(ctx).await {
        Gated::Done(removed) => {
            let message = if removed.is_empty() {
                "Logged out. No session cookies were stored.".to_string()
            } else {
                format!("Logged out. Cleared {}.", removed.join(", "))
            };
            output::print_status(icons::SUCCESS, &message);
            Completion::Success
        }
        Gated::Declined => Completion::Declined,
        Gated::Busy => Completion::Busy,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keepalive_args_apply() {
        let args = KeepaliveArgs {
            interval: 15,
            max_fails: 3,
        };
        let config = args.apply(ConsoleConfig::default());
        assert_eq!(config.ping_interval, Duration::from_secs(15));
        assert_eq!(config.max_ping_fails, 3);
    }
}
