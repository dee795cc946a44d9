//! Logout flows.

use crate::channel::{CallOptions, Method, Params};
use crate::context::ConsoleContext;
use crate::error::ConsoleResult;
use crate::gate::Gated;

pub const LOGOUT_PROMPT: &str = "Logout from JuliaBox?";

const HOSTADMIN: &str = "/hostadmin/";

/// Clear the session cookies locally and return to the landing page.
///
/// Returns the names of the cookies that were removed.
pub fn logout_at_browser(ctx: &ConsoleContext) -> Vec<String> {
    let cookies = ctx.channel().cookies();
    let removed = cookies.remove_session_cookies();
    if let Err(err) = cookies.save() {
        tracing::warn!("Failed to persist cookie jar after logout: {}", err);
    }
    tracing::info!(removed = ?removed, "logged out locally");
    ctx.ui().navigate("/");
    removed
}

/// Ask the backend to end the session. Nothing is shown to the user.
pub async fn do_logout(ctx: &ConsoleContext) -> ConsoleResult<()> {
    ctx.channel()
        .call(HOSTADMIN, Method::Get, logout_params(), CallOptions::locked())
        .await
        .map(|_| ())
}

/// Confirm, end the session on the backend, then clear it locally.
///
/// The local logout runs whether or not the backend call succeeded.
pub async fn logout(ctx: &ConsoleContext) -> Gated<Vec<String>> {
    if !ctx.ui().confirm(LOGOUT_PROMPT).await {
        return Gated::Declined;
    }
    if let Err(err) = do_logout(ctx).await {
        tracing::warn!("Backend logout failed: {}", err);
    }
    Gated::Done(logout_at_browser(ctx))
}

fn logout_params() -> Params {
    Params::new().with("logout", "me")
}
