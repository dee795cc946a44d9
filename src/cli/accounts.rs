//! Published API and user record commands.

use std::sync::Arc;

use clap::{Args, Subcommand};

use super::{settle_gated, show_payload, Completion};
use crate::channel::Params;
use crate::context::ConsoleContext;
use crate::plugins::{ApiAdminPlugin, UserAdminPlugin};

#[derive(Args, Debug)]
pub struct ApiArgs {
    #[command(subcommand)]
    pub command: ApiCommand,
}

#[derive(Subcommand, Debug)]
pub enum ApiCommand {
    /// Publish an API
    Create {
        /// API name: letters, digits, `_`, `-` and `.`
        name: String,
        /// Command that serves the API
        #[arg(long)]
        cmd: String,
        /// Link to the API documentation
        #[arg(long, value_name = "URL")]
        description: String,
    },
    /// Remove a published API
    Delete { name: String },
    /// List published APIs
    List,
    /// Enable API publishing for this account
    Enable,
}

#[derive(Args, Debug)]
pub struct UserArgs {
    #[command(subcommand)]
    pub command: UserCommand,
}

#[derive(Subcommand, Debug)]
pub enum UserCommand {
    /// Overwrite user attributes
    Update {
        user_id: String,
        /// Attribute to set, as KEY=VALUE; repeatable
        #[arg(
            long = "set",
            value_name = "KEY=VALUE",
            value_parser = parse_attribute,
            required = true
        )]
        attributes: Vec<(String, String)>,
    },
    /// Show a user record
    Fetch { user_id: String },
}

fn parse_attribute(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected KEY=VALUE, got '{}'", raw)),
    }
}

pub async fn run_api(ctx: Arc<ConsoleContext>, args: ApiArgs) -> Completion {
    let plugin = ApiAdminPlugin::new(ctx.clone());
    match args.command {
        ApiCommand::Create {
            name,
            cmd,
            description,
        } => settle_gated(plugin.create(&name, &cmd, &description).await),
        ApiCommand::Delete { name } => settle_gated(plugin.delete(&name).await),
        ApiCommand::List => show_payload(&ctx, "APIs", plugin.info().await).await,
        ApiCommand::Enable => settle_gated(plugin.enable().await),
    }
}

pub async fn run_user(ctx: Arc<ConsoleContext>, args: UserArgs) -> Completion {
    let plugin = UserAdminPlugin::new(ctx.clone());
    match args.command {
        UserCommand::Update {
            user_id,
            attributes,
        } => {
            let mut attribs = Params::new();
            attribs.extend(attributes);
            settle_gated(plugin.update(&user_id, attribs).await)
        }
        UserCommand::Fetch { user_id } => {
            let title = format!("User {}", user_id);
            show_payload(&ctx, &title, plugin.fetch(&user_id).await).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::{Cli, Command};
    use super::*;
    use clap::Parser;

    #[test]
    fn test_parse_attribute() {
        assert_eq!(
            parse_attribute("role=admin").unwrap(),
            ("role".to_string(), "admin".to_string())
        );
        assert_eq!(
            parse_attribute("note=a=b").unwrap(),
            ("note".to_string(), "a=b".to_string())
        );
        assert!(parse_attribute("role").is_err());
        assert!(parse_attribute("=admin").is_err());
    }

    #[test]
    fn test_user_update_collects_attributes() {
        let cli = Cli::try_parse_from([
            "jboxctl",
            "user",
            "update",
            "alice@example.com",
            "--set",
            "role=admin",
            "--set",
            "quota=10",
        ])
        .unwrap();
        let Command::User(UserArgs {
            command: UserCommand::Update {
                user_id,
                attributes,
            },
        }) = cli.command
        else {
            panic!("expected user update");
        };
        assert_eq!(user_id, "alice@example.com");
        assert_eq!(attributes.len(), 2);
    }

    #[test]
    fn test_user_update_requires_attribute() {
        assert!(Cli::try_parse_from(["jboxctl", "user", "update", "alice"]).is_err());
    }

    #[test]
    fn test_api_create_args() {
        let cli = Cli::try_parse_from([
            "jboxctl",
            "api",
            "create",
            "fib",
            "--cmd",
            "julia fib.jl",
            "--description",
            "https://example.com/fib",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Command::Api(ApiArgs {
                command: ApiCommand::Create { .. }
            })
        ));
    }
}
