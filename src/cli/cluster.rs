//! Cluster and data volume commands.

use std::sync::Arc;

use clap::{Args, Subcommand};

use super::{settle, settle_gated, show_payload, Completion};
use crate::context::ConsoleContext;
use crate::plugins::{ClusterPlugin, VolumePlugin};

#[derive(Args, Debug)]
pub struct ClusterArgs {
    #[command(subcommand)]
    pub command: ClusterCommand,
}

#[derive(Subcommand, Debug)]
pub enum ClusterCommand {
    /// Start compute instances
    Start {
        /// Number of instances
        #[arg(long, short = 'n')]
        instances: i64,
        /// Availability zone
        #[arg(long)]
        zone: String,
        /// Hourly spot bid in USD; 0 starts on-demand instances
        #[arg(long, default_value_t = 0.0)]
        spot_price: f64,
    },
    /// Terminate the cluster
    Stop {
        /// Skip the prompt and the busy indicator
        #[arg(long)]
        teardown: bool,
    },
    /// Show cluster status
    Status,
    /// Attach to a started cluster and create its machinefile
    Add {
        name: String,
    },
}

#[derive(Args, Debug)]
pub struct VolumeArgs {
    #[command(subcommand)]
    pub command: VolumeCommand,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolumeCommand {
    /// Attach the data disk
    Attach,
    /// Detach the data disk
    Detach,
    /// Show data disk status
    Status,
}

pub async fn run_cluster(ctx: Arc<ConsoleContext>, args: ClusterArgs) -> Completion {
    let plugin = ClusterPlugin::new(ctx.clone());
    match args.command {
        ClusterCommand::Start {
            instances,
            zone,
            spot_price,
        } => settle_gated(plugin.start(instances, &zone, spot_price).await),
        ClusterCommand::Stop { teardown } => settle_gated(plugin.stop(!teardown).await),
        ClusterCommand::Status => show_payload(&ctx, "Cluster Status", plugin.status().await).await,
        ClusterCommand::Add { name } => settle(plugin.add(&name).await),
    }
}

pub async fn run_volume(ctx: Arc<ConsoleContext>, args: VolumeArgs) -> Completion {
    let plugin = VolumePlugin::new(ctx.clone());
    match args.command {
        VolumeCommand::Attach => settle_gated(plugin.attach().await),
        VolumeCommand::Detach => settle_gated(plugin.detach().await),
        VolumeCommand::Status => show_payload(&ctx, "Data Volume", plugin.status().await).await,
    }
}

#[cfg(test)]
mod tests {
    use super::super::{Cli, Command};
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cluster_start_args() {
        let cli = Cli::try_parse_from([
            "jboxctl",
            "cluster",
            "start",
            "-n",
            "4",
            "--zone",
            "us-east-1a",
            "--spot-price",
            "0.05",
        ])
        .unwrap();
        let Command::Cluster(ClusterArgs {
            command:
                ClusterCommand::Start {
                    instances,
                    zone,
                    spot_price,
                },
        }) = cli.command
        else {
            panic!("expected cluster start");
        };
        assert_eq!(instances, 4);
        assert_eq!(zone, "us-east-1a");
        assert_eq!(spot_price, 0.05);
    }

    #[test]
    fn test_cluster_start_requires_zone() {
        assert!(Cli::try_parse_from(["jboxctl", "cluster", "start", "-n", "2"]).is_err());
    }

    #[test]
    fn test_volume_subcommands() {
        for (word, expected) in [
            ("attach", VolumeCommand::Attach),
            ("detach", VolumeCommand::Detach),
            ("status", VolumeCommand::Status),
        ] {
            let cli = Cli::try_parse_from(["jboxctl", "volume", word]).unwrap();
            let Command::Volume(args) = cli.command else {
                panic!("expected volume");
            };
            assert_eq!(args.command, expected);
        }
    }
}
