//! User attribute administration.

use std::sync::Arc;

use super::Operation;
use crate::channel::Params;
use crate::context::ConsoleContext;
use crate::envelope::Outcome;
use crate::error::{ConsoleError, ConsoleResult};
use crate::gate::{confirm_then_act, Gated, OpGuard};

const ENDPOINT: &str = "/jboxplugin/user_admin/";

const UPDATE: Operation = Operation::post(ENDPOINT, "updating user");
const FETCH: Operation = Operation::get(ENDPOINT, "fetching user");

pub struct UserAdminPlugin {
    ctx: Arc<ConsoleContext>,
    op: OpGuard,
}

impl UserAdminPlugin {
    pub fn new(ctx: Arc<ConsoleContext>) -> Self {
        Self {
            ctx,
            op: OpGuard::new("user_admin"),
        }
    }

    pub fn guard(&self) -> &OpGuard {
        &self.op
    }

    /// Overwrite the given attributes of `user_id` after confirmation.
    pub async fn update(&self, user_id: &str, attribs: Params) -> ConsoleResult<Gated<Outcome>> {
        let prompt = format!("Update user {}?", user_id);
        let mut params = Params::new().with("mode", "update").with("user_id", user_id);
        params.extend(attribs);

        confirm_then_act(&self.op, self.ctx.ui(), &prompt, || async {
            let outcome = UPDATE.run_reported(&self.ctx, params).await?;
            if outcome.is_ok() {
                tracing::info!(user_id, "user updated");
            }
            Ok::<_, ConsoleError>(outcome)
        })
        .await
        .transpose()
    }

    /// Fetch a user's record. Failures are reported; the record itself is
    /// left to the caller.
    pub async fn fetch(&self, user_id: &str) -> ConsoleResult<Gated<Outcome>> {
        if !self.op.is_idle() {
            return Ok(Gated::Busy);
        }
        let ui = self.ctx.ui();
        let params = Params::new().with("mode", "fetch").with("user_id", user_id);

        match FETCH.run(&self.ctx, params).await {
            Ok(outcome) => {
                if let Outcome::Error(reason) = &outcome {
                    let message = match reason {
                        Some(reason) => format!("Error fetching user. {}", reason),
                        None => "Error fetching user.".to_string(),
                    };
                    ui.alert(&message).await;
                }
                Ok(Gated::Done(outcome))
            }
            Err(err) => {
                ui.alert("Unknown error fetching user.").await;
                Err(err)
            }
        }
    }
}
