//! `jboxctl` command line.
//!
//! Each subcommand drives one plugin operation against a
//! [`TerminalSurface`]: prompts are read from stdin (or auto-answered with
//! `--yes`), alerts and dialogs are printed, and the busy indicator is a
//! spinner on stderr.
//!
//! ```text
//! jboxctl --url https://jbox.example.org cluster start --instances 4 --zone us-east-1a
//! jboxctl sync add-git https://github.com/org/repo.git --branch main
//! jboxctl --format html stats loadavg
//! ```

pub mod accounts;
pub mod args;
pub mod cluster;
pub mod homework;
pub mod host;
pub mod output;
pub mod session;
pub mod surface;
pub mod sync;
pub mod version;

pub use args::GlobalArgs;
pub use surface::{OutputFormat, TerminalSurface};
pub use version::VERSION;

use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};

use crate::adapters::ReqwestHttpClient;
use crate::config::ConsoleConfig;
use crate::context::ConsoleContext;
use crate::envelope::Outcome;
use crate::error::ConsoleResult;
use crate::gate::Gated;
use crate::plugins::OpResult;

#[derive(Parser, Debug)]
#[command(name = "jboxctl", version = VERSION)]
#[command(about = "Admin console for a JuliaBox deployment")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Check that the session is alive
    Ping,
    /// Ping periodically until the session ends or Ctrl-C
    Keepalive(session::KeepaliveArgs),
    /// End the session on the backend and clear local cookies
    Logout,
    /// Print the client version and backend origin
    Version,
    /// Show the public SSH key of the container
    SshKey,
    /// List invite codes
    Invites,
    /// Create an invite code
    MakeInvite(host::MakeInviteArgs),
    /// Upgrade the container to the latest image
    Upgrade,
    /// Show recorded statistics
    Stats(host::StatsArgs),
    /// Show instance load or sessions
    InstanceInfo(host::InstanceInfoArgs),
    /// Show backend configuration
    ShowCfg,
    /// Switch the Julia image type
    SwitchImage,
    /// Compute cluster management
    Cluster(cluster::ClusterArgs),
    /// Data volume management
    Volume(cluster::VolumeArgs),
    /// Published API management
    Api(accounts::ApiArgs),
    /// User records
    User(accounts::UserArgs),
    /// Git and Google Drive folder synchronization
    Sync(sync::SyncArgs),
    /// Homework evaluation
    Hw(homework::HwArgs),
}

/// How a command ended, mapped to the process exit status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Success,
    /// The user answered no; nothing was sent.
    Declined,
    /// Another operation of the same kind was in progress.
    Busy,
    Failed,
}

impl Completion {
    pub fn of_outcome(outcome: &Outcome) -> Self {
        if outcome.is_error() {
            Completion::Failed
        } else {
            Completion::Success
        }
    }

    pub fn status(self) -> u8 {
        match self {
            Completion::Success | Completion::Declined => 0,
            Completion::Failed => 1,
            Completion::Busy => 2,
        }
    }

    pub fn exit_code(self) -> ExitCode {
        ExitCode::from(self.status())
    }
}

/// Settle a plugin result. Plugins have already told the user about
/// failures; the error code is added on stderr.
pub fn settle(result: OpResult) -> Completion {
    match result {
        Ok(outcome) => Completion::of_outcome(&outcome),
        Err(err) => {
            tracing::debug!(code = err.error_code(), "command failed: {}", err);
            output::print_error(&err);
            Completion::Failed
        }
    }
}

pub fn settle_gated(result: ConsoleResult<Gated<Outcome>>) -> Completion {
    match result {
        Ok(Gated::Done(outcome)) => Completion::of_outcome(&outcome),
        Ok(Gated::Declined) => {
            output::print_status(output::icons::INFO, "Cancelled.");
            Completion::Declined
        }
        Ok(Gated::Busy) => {
            output::print_status(output::icons::WARNING, "Another operation is in progress.");
            Completion::Busy
        }
        Err(err) => settle(Err(err)),
    }
}

/// Show the payload of a successful poll that the plugin leaves to its
/// caller.
pub async fn show_payload(
    ctx: &ConsoleContext,
    title: &str,
    result: ConsoleResult<Gated<Outcome>>,
) -> Completion {
    if let Ok(Gated::Done(outcome)) = &result {
        match outcome {
            Outcome::Ok(data) | Outcome::Warning(data) => {
                ctx.renderer().table(title, data.clone()).await;
            }
            Outcome::Error(reason) => {
                let message = match reason {
                    Some(reason) => format!("{} failed. {}", title, reason),
                    None => format!("{} failed.", title),
                };
                output::print_status(output::icons::FAILURE, &message);
            }
            Outcome::NoData => {}
        }
    }
    settle_gated(result)
}

/// Build the console context and run one command.
pub async fn run(cli: Cli) -> color_eyre::Result<ExitCode> {
    let mut config = cli.global.apply(ConsoleConfig::from_env()?)?;
    if let Command::Keepalive(args) = &cli.command {
        config = args.apply(config);
    }

    if let Command::Version = cli.command {
        println!("{}", version::version_line(&config.base_url));
        return Ok(ExitCode::SUCCESS);
    }

    let surface = TerminalSurface::new(config.base_url.clone(), cli.global.format, cli.global.yes);
    let http = ReqwestHttpClient::with_user_agent(&config.user_agent);
    let ctx = ConsoleContext::from_config(config, Arc::new(http), Arc::new(surface))?;
    ctx.set_gauth_token(cli.global.gauth());

    let spinner = output::spawn_spinner(ctx.channel().activity().subscribe(), "Working...");
    let completion = dispatch(ctx, cli.command).await;
    if let Some(spinner) = spinner {
        spinner.abort();
    }

    tracing::debug!(?completion, "command finished");
    Ok(completion.exit_code())
}

async fn dispatch(ctx: Arc<ConsoleContext>, command: Command) -> Completion {
    match command {
        Command::Ping => session::ping(&ctx).await,
        Command::Keepalive(_) => session::keepalive(ctx).await,
        Command::Logout => session::logout(&ctx).await,
        Command::Version => Completion::Success,
        Command::SshKey => host::ssh_key(ctx).await,
        Command::Invites => host::invites(ctx).await,
        Command::MakeInvite(args) => host::make_invite(ctx, args).await,
        Command::Upgrade => host::upgrade(ctx).await,
        Command::Stats(args) => host::stats(ctx, args).await,
        Command::InstanceInfo(args) => host::instance_info(ctx, args).await,
        Command::ShowCfg => host::show_cfg(ctx).await,
        Command::SwitchImage => host::switch_image(ctx).await,
        Command::Cluster(args) => cluster::run_cluster(ctx, args).await,
        Command::Volume(args) => cluster::run_volume(ctx, args).await,
        Command::Api(args) => accounts::run_api(ctx, args).await,
        Command::User(args) => accounts::run_user(ctx, args).await,
        Command::Sync(args) => sync::run(ctx, args).await,
        Command::Hw(args) => homework::run(ctx, args).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;
    use serde_json::json;

    #[test]
    fn test_parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "jboxctl",
            "cluster",
            "status",
            "--url",
            "https://jbox.test",
            "--yes",
            "--format",
            "html",
        ])
        .unwrap();
        assert_eq!(cli.global.url.as_deref(), Some("https://jbox.test"));
        assert!(cli.global.yes);
        assert_eq!(cli.global.format, OutputFormat::Html);
        assert!(matches!(
            cli.command,
            Command::Cluster(cluster::ClusterArgs {
                command: cluster::ClusterCommand::Status
            })
        ));
    }

    #[test]
    fn test_missing_subcommand_shows_help() {
        let err = Cli::try_parse_from(["jboxctl"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand);
    }

    #[test]
    fn test_unknown_subcommand_rejected() {
        let err = Cli::try_parse_from(["jboxctl", "reboot"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidSubcommand);
    }

    #[test]
    fn test_cookie_flags_conflict() {
        let err = Cli::try_parse_from(["jboxctl", "ping", "--cookies", "/tmp/j", "--no-cookies"])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ArgumentConflict);
    }

    #[test]
    fn test_completion_exit_codes() {
        assert_eq!(Completion::Success.status(), 0);
        assert_eq!(Completion::Declined.status(), 0);
        assert_eq!(Completion::Failed.status(), 1);
        assert_eq!(Completion::Busy.status(), 2);
    }

    #[test]
    fn test_settle_gated() {
        assert_eq!(
            settle_gated(Ok(Gated::Done(Outcome::Ok(json!(null))))),
            Completion::Success
        );
        assert_eq!(
            settle_gated(Ok(Gated::Done(Outcome::Warning(json!("conflicts"))))),
            Completion::Success
        );
        assert_eq!(
            settle_gated(Ok(Gated::Done(Outcome::Error(None)))),
            Completion::Failed
        );
        assert_eq!(settle_gated(Ok(Gated::Declined)), Completion::Declined);
        assert_eq!(settle_gated(Ok(Gated::Busy)), Completion::Busy);
    }
}
