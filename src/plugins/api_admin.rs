//! Published API registration.

use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;

use super::Operation;
use crate::channel::Params;
use crate::context::ConsoleContext;
use crate::envelope::Outcome;
use crate::error::{ConsoleError, ConsoleResult, ValidationError};
use crate::gate::{act_guarded, confirm_then_act, Gated, OpGuard};

const ENDPOINT: &str = "/jboxplugin/api_admin/";

const CREATE: Operation = Operation::get(ENDPOINT, "creating API");
const DELETE: Operation = Operation::get(ENDPOINT, "deleting API");
const INFO: Operation = Operation::get(ENDPOINT, "fetching APIs").unlocked();
const ENABLE: Operation = Operation::get(ENDPOINT, "enabling APIs");

const ENABLED: &str = "API publishing is now enabled for your account. \
                       Logout and login again to be able to publish APIs.";
const NOT_ENABLED: &str = "Could not enable APIs for your account.";

static NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9_\-.]+$").expect("Invalid API name regex pattern"));

static URL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(&url_pattern()).expect("Invalid URL regex pattern"));

/// RFC 3987-ish absolute URL for http, https, ftp and sftp, accepting
/// non-ASCII letters in every component.
fn url_pattern() -> String {
    let ucs = r"\x{00A0}-\x{D7FF}\x{F900}-\x{FDCF}\x{FDF0}-\x{FFEF}";
    let unreserved = format!(r"[a-z0-9\-._~{ucs}]");
    let alnum = format!(r"[a-z0-9{ucs}]");
    let alpha = format!(r"[a-z{ucs}]");
    let pct = r"%[0-9a-f]{2}";
    let sub = r"[!$&'()*+,;=]";
    let pchar = format!(r"(?:{unreserved}|{pct}|{sub}|:|@)");

    let octet = r"(?:[0-9]|[1-9][0-9]|1[0-9][0-9]|2[0-4][0-9]|25[0-5])";
    let ipv4 = format!(r"{octet}\.{octet}\.{octet}\.{octet}");
    let label = format!(r"(?:{alnum}|{alnum}{unreserved}*{alnum})");
    let tld = format!(r"(?:{alpha}|{alpha}{unreserved}*{alpha})");
    let host = format!(r"(?:{ipv4}|(?:{label}\.)+{tld}\.?)");

    let userinfo = format!(r"(?:(?:{unreserved}|{pct}|{sub}|:)*@)?");
    let path = format!(r"(?:/(?:{pchar}+(?:/{pchar}*)*)?)?");
    let query = format!(r"(?:\?(?:{pchar}|[\x{{E000}}-\x{{F8FF}}]|/|\?)*)?");
    let fragment = format!(r"(?:#(?:{pchar}|/|\?)*)?");

    format!(r"(?i)^(?:https?|s?ftp)://{userinfo}{host}(?::[0-9]*)?{path}{query}{fragment}$")
}

/// Whether `name` may be used as an API name.
pub fn is_valid_name(name: &str) -> bool {
    NAME_RE.is_match(name)
}

/// Whether `url` is an absolute http(s) or (s)ftp URL.
pub fn is_valid_url(url: &str) -> bool {
    URL_RE.is_match(url)
}

/// Check a create request; the first failing rule wins.
fn validate(api_name: &str, cmd: &str, description: &str) -> Result<(), ValidationError> {
    if !is_valid_url(description) {
        return Err(ValidationError::InvalidUrl(description.to_string()));
    }
    if !is_valid_name(api_name) {
        return Err(ValidationError::InvalidApiName(api_name.to_string()));
    }
    if cmd.is_empty() {
        return Err(ValidationError::MissingCommand);
    }
    Ok(())
}

pub struct ApiAdminPlugin {
    ctx: Arc<ConsoleContext>,
    op: OpGuard,
}

impl ApiAdminPlugin {
    pub fn new(ctx: Arc<ConsoleContext>) -> Self {
        Self {
            ctx,
            op: OpGuard::new("api_admin"),
        }
    }

    pub fn guard(&self) -> &OpGuard {
        &self.op
    }

    /// Register an API. `description` is a link to its documentation.
    /// Inputs are trimmed and validated before anything is sent.
    pub async fn create(
        &self,
        api_name: &str,
        cmd: &str,
        description: &str,
    ) -> ConsoleResult<Gated<Outcome>> {
        if !self.op.is_idle() {
            return Ok(Gated::Busy);
        }
        let (api_name, cmd, description) = (api_name.trim(), cmd.trim(), description.trim());
        if let Err(err) = validate(api_name, cmd, description) {
            tracing::debug!(code = err.error_code(), "api create rejected");
            self.ctx.ui().alert(&err.to_string()).await;
            return Err(err.into());
        }

        let params = Params::new()
            .with("mode", "create")
            .with("api_name", api_name)
            .with("cmd", cmd)
            .with("description", description);

        act_guarded(&self.op, || async {
            let outcome = CREATE.run_reported(&self.ctx, params).await?;
            if outcome.is_ok() {
                tracing::info!(api_name, "api created");
            }
            Ok::<_, ConsoleError>(outcome)
        })
        .await
        .transpose()
    }

    pub async fn delete(&self, api_name: &str) -> ConsoleResult<Gated<Outcome>> {
        let prompt = format!("Delete API specification for {}?", api_name);
        let params = Params::new().with("mode", "delete").with("api_name", api_name);

        confirm_then_act(&self.op, self.ctx.ui(), &prompt, || async {
            let outcome = DELETE.run_reported(&self.ctx, params).await?;
            Ok::<_, ConsoleError>(outcome)
        })
        .await
        .transpose()
    }

    /// List the caller's APIs. Unlocked; the caller renders the outcome.
    pub async fn info(&self) -> ConsoleResult<Gated<Outcome>> {
        if !self.op.is_idle() {
            return Ok(Gated::Busy);
        }
        INFO.run(&self.ctx, Params::new().with("mode", "info"))
            .await
            .map(Gated::Done)
    }

    /// Turn on API publishing for the caller's account.
    pub async fn enable(&self) -> ConsoleResult<Gated<Outcome>> {
        if !self.op.is_idle() {
            return Ok(Gated::Busy);
        }
        let ui = self.ctx.ui();
        match ENABLE.run(&self.ctx, Params::new().with("mode", "enable")).await {
            Ok(outcome) => {
                match &outcome {
                    Outcome::Error(reason) => {
                        let message = match reason {
                            Some(reason) => format!("{} {}", NOT_ENABLED, reason),
                            None => NOT_ENABLED.to_string(),
                        };
                        ui.alert(&message).await;
                    }
                    _ => ui.alert(ENABLED).await,
                }
                Ok(Gated::Done(outcome))
            }
            Err(err) => {
                ui.alert(&format!(
                    "{} Please contact JuliaBox administrator.",
                    NOT_ENABLED
                ))
                .await;
                Err(err)
            }
        }
    }
}
