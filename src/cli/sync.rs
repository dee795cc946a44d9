//! Folder synchronization commands.
//!
//! Drive commands need an access token (`--gauth-token` or
//! `JBOX_GAUTH_TOKEN`); without one the authorization page is offered
//! instead.

use std::sync::Arc;

use clap::{Args, Subcommand};

use super::output::{self, icons};
use super::{settle, settle_gated, Completion};
use crate::context::ConsoleContext;
use crate::error::ConsoleResult;
use crate::envelope::Outcome;
use crate::plugins::{folder_location, FileSyncPlugin};

#[derive(Args, Debug)]
pub struct SyncArgs {
    #[command(subcommand)]
    pub command: SyncCommand,
}

#[derive(Subcommand, Debug)]
pub enum SyncCommand {
    /// Check out a git repository
    AddGit {
        repo: String,
        /// Checkout folder; derived by the backend when empty
        #[arg(long, default_value = "")]
        loc: String,
        /// Branch to track
        #[arg(long, default_value = "master")]
        branch: String,
    },
    /// Pull and push a checked out repository
    SyncGit { repo: String },
    /// Remove a checked out repository
    DelGit { repo: String },
    /// Synchronize a Google Drive folder
    AddGdrive {
        repo: String,
        /// Local folder
        #[arg(long, default_value = "", conflicts_with = "folder")]
        loc: String,
        /// Picked folder path (gdrive://name/id); the local folder is derived from it
        #[arg(long, value_name = "PATH")]
        folder: Option<String>,
    },
    /// Synchronize a Drive folder now
    SyncGdrive { repo: String },
    /// Stop synchronizing a Drive folder
    DelGdrive { repo: String },
}

fn settle_added(result: ConsoleResult<Option<Outcome>>) -> Completion {
    match result {
        Ok(Some(outcome)) => settle(Ok(outcome)),
        Ok(None) => {
            output::print_status(icons::INFO, "No repository given, nothing to add.");
            Completion::Success
        }
        Err(err) => settle(Err(err)),
    }
}

pub async fn run(ctx: Arc<ConsoleContext>, args: SyncArgs) -> Completion {
    let plugin = FileSyncPlugin::new(ctx);
    match args.command {
        SyncCommand::AddGit { repo, loc, branch } => {
            settle_added(plugin.addgit(&repo, &loc, &branch).await)
        }
        SyncCommand::SyncGit { repo } => settle(plugin.syncgit(&repo).await),
        SyncCommand::DelGit { repo } => settle_gated(plugin.delgit_confirm(&repo).await),
        SyncCommand::AddGdrive { repo, loc, folder } => {
            let loc = folder.as_deref().map(folder_location).unwrap_or(loc);
            settle_added(plugin.addgdrive(&repo, &loc).await)
        }
        SyncCommand::SyncGdrive { repo } => settle(plugin.syncgdrive(&repo).await),
        SyncCommand::DelGdrive { repo } => settle_gated(plugin.delgdrive_confirm(&repo).await),
    }
}
