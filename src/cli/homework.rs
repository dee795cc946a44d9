//! Homework evaluation commands.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Args, Subcommand};
use serde_json::Value;

use super::{settle, Completion};
use crate::context::ConsoleContext;
use crate::error::ConsoleResult;
use crate::plugins::HomeworkPlugin;

#[derive(Args, Debug)]
pub struct HwArgs {
    #[command(subcommand)]
    pub command: HwCommand,
}

#[derive(Args, Debug, Clone)]
pub struct Answer {
    pub course: String,
    pub problemset: String,
    pub question: String,
    pub answer: String,
}

#[derive(Args, Debug, Clone)]
pub struct Scope {
    pub course: String,
    pub problemset: String,
    /// Restrict to these questions, as a JSON array
    #[arg(long, value_name = "JSON", value_parser = parse_json)]
    pub questions: Option<Value>,
}

#[derive(Subcommand, Debug)]
pub enum HwCommand {
    /// Evaluate an answer without recording it
    Check(Answer),
    /// Evaluate and record an answer
    Submit(Answer),
    /// Evaluations of every student
    Report(Scope),
    /// Your own evaluations
    Myreport(Scope),
    /// Reference answers
    Metadata(Scope),
    /// Register a course from a JSON description (`-` reads stdin)
    Create { file: PathBuf },
}

fn parse_json(raw: &str) -> Result<Value, String> {
    serde_json::from_str(raw).map_err(|err| format!("invalid JSON: {}", err))
}

async fn read_course(file: &Path) -> ConsoleResult<Value> {
    let raw = if file == Path::new("-") {
        let mut raw = String::new();
        tokio::io::AsyncReadExt::read_to_string(&mut tokio::io::stdin(), &mut raw).await?;
        raw
    } else {
        tokio::fs::read_to_string(file).await?
    };
    Ok(serde_json::from_str(&raw)?)
}

pub async fn run(ctx: Arc<ConsoleContext>, args: HwArgs) -> Completion {
    let plugin = HomeworkPlugin::new(ctx);
    match args.command {
        HwCommand::Check(a) => settle(
            plugin
                .check(&a.course, &a.problemset, &a.question, &a.answer, false)
                .await,
        ),
        HwCommand::Submit(a) => settle(
            plugin
                .check(&a.course, &a.problemset, &a.question, &a.answer, true)
                .await,
        ),
        HwCommand::Report(s) => settle(plugin.report(&s.course, &s.problemset, s.questions).await),
        HwCommand::Myreport(s) => {
            settle(plugin.myreport(&s.course, &s.problemset, s.questions).await)
        }
        HwCommand::Metadata(s) => {
            settle(plugin.metadata(&s.course, &s.problemset, s.questions).await)
        }
        HwCommand::Create { file } => match read_course(&file).await {
            Ok(course) => settle(plugin.create(&course).await),
            Err(err) => settle(Err(err)),
        },
    }
}
