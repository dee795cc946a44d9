//! Host administration commands.

use std::sync::Arc;

use clap::{Args, ValueEnum};

use super::output::{self, icons};
use super::{settle, Completion};
use crate::context::ConsoleContext;
use crate::plugins::{AdminPlugin, InstanceInfo};

#[derive(Args, Debug, Clone)]
pub struct MakeInviteArgs {
    /// Invite code to create
    pub code: String,

    /// Expiry date, as accepted by the backend (e.g. 2026-12-31)
    #[arg(long, value_name = "DATE")]
    pub expires: String,

    /// Maximum number of uses; unlimited when omitted
    #[arg(long, value_name = "N")]
    pub max: Option<u32>,
}

#[derive(Args, Debug, Clone)]
pub struct StatsArgs {
    /// Name of the statistic
    pub name: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum InfoKind {
    Load,
    Sessions,
}

impl From<InfoKind> for InstanceInfo {
    fn from(kind: InfoKind) -> Self {
        match kind {
            InfoKind::Load => InstanceInfo::Load,
            InfoKind::Sessions => InstanceInfo::Sessions,
        }
    }
}

#[derive(Args, Debug, Clone)]
pub struct InstanceInfoArgs {
    #[arg(value_enum)]
    pub kind: InfoKind,
}

fn admin(ctx: Arc<ConsoleContext>) -> AdminPlugin {
    AdminPlugin::new(ctx)
}

pub async fn ssh_key(ctx: Arc<ConsoleContext>) -> Completion {
    settle(admin(ctx).show_ssh_key().await)
}

pub async fn invites(ctx: Arc<ConsoleContext>) -> Completion {
    settle(admin(ctx).invites_report().await)
}

pub async fn make_invite(ctx: Arc<ConsoleContext>, args: MakeInviteArgs) -> Completion {
    settle(admin(ctx).make_invite(&args.code, &args.expires, args.max).await)
}

pub async fn upgrade(ctx: Arc<ConsoleContext>) -> Completion {
    settle(admin(ctx).upgrade().await)
}

pub async fn stats(ctx: Arc<ConsoleContext>, args: StatsArgs) -> Completion {
    settle(admin(ctx).stats(&args.name).await)
}

pub async fn instance_info(ctx: Arc<ConsoleContext>, args: InstanceInfoArgs) -> Completion {
    settle(admin(ctx).instance_info(args.kind.into()).await)
}

pub async fn show_cfg(ctx: Arc<ConsoleContext>) -> Completion {
    settle(admin(ctx).show_cfg().await)
}

pub async fn switch_image(ctx: Arc<ConsoleContext>) -> Completion {
    match admin(ctx).switch_julia_img().await {
        Ok(image) => {
            output::print_status(icons::SUCCESS, &format!("Julia image type is now {}.", image));
            Completion::Success
        }
        Err(err) => settle(Err(err)),
    }
}

#[cfg(test)]
mod tests {
    use super::super::{Cli, Command};
    use super::*;
    use clap::Parser;

    #[test]
    fn test_make_invite_args() {
        let cli = Cli::try_parse_from([
            "jboxctl",
            "make-invite",
            "WELCOME",
            "--expires",
            "2026-12-31",
            "--max",
            "25",
        ])
        .unwrap();
        let Command::MakeInvite(args) = cli.command else {
            panic!("expected make-invite");
        };
        assert_eq!(args.code, "WELCOME");
        assert_eq!(args.expires, "2026-12-31");
        assert_eq!(args.max, Some(25));
    }

    #[test]
    fn test_instance_info_kind() {
        let cli = Cli::try_parse_from(["jboxctl", "instance-info", "sessions"]).unwrap();
        let Command::InstanceInfo(args) = cli.command else {
            panic!("expected instance-info");
        };
        assert_eq!(InstanceInfo::from(args.kind), InstanceInfo::Sessions);

        assert!(Cli::try_parse_from(["jboxctl", "instance-info", "disk"]).is_err());
    }
}
