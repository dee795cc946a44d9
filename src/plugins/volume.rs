//! EBS data volume attach / detach.

use std::sync::Arc;

use super::Operation;
use crate::channel::Params;
use crate::context::ConsoleContext;
use crate::envelope::Outcome;
use crate::error::{ConsoleError, ConsoleResult};
use crate::gate::{confirm_then_act, Gated, OpGuard};

const ENDPOINT: &str = "/jboxplugin/ebsdatavol/";

const STATUS: Operation = Operation::get(ENDPOINT, "fetching volume status").unlocked();

/// One confirmed volume action.
struct VolumeAction {
    action: &'static str,
    prompt: &'static str,
    started: &'static str,
    op: Operation,
}

const ATTACH: VolumeAction = VolumeAction {
    action: "attach",
    prompt: "Attach your data disk?",
    started: "Attaching data volume.",
    op: Operation::get(ENDPOINT, "attaching data volume"),
};

const DETACH: VolumeAction = VolumeAction {
    action: "detach",
    prompt: "Detach your data disk?",
    started: "Detaching data volume.",
    op: Operation::get(ENDPOINT, "detaching data volume"),
};

pub struct VolumePlugin {
    ctx: Arc<ConsoleContext>,
    op: OpGuard,
}

impl VolumePlugin {
    pub fn new(ctx: Arc<ConsoleContext>) -> Self {
        Self {
            ctx,
            op: OpGuard::new("volume"),
        }
    }

    pub fn guard(&self) -> &OpGuard {
        &self.op
    }

    pub async fn attach(&self) -> ConsoleResult<Gated<Outcome>> {
        self.perform(&ATTACH).await
    }

    pub async fn detach(&self) -> ConsoleResult<Gated<Outcome>> {
        self.perform(&DETACH).await
    }

    /// Non-locking poll; `Busy` while an attach or detach is in progress.
    pub async fn status(&self) -> ConsoleResult<Gated<Outcome>> {
        if !self.op.is_idle() {
            return Ok(Gated::Busy);
        }
        STATUS
            .run(&self.ctx, Params::new().with("action", "status"))
            .await
            .map(Gated::Done)
    }

    async fn perform(&self, spec: &VolumeAction) -> ConsoleResult<Gated<Outcome>> {
        confirm_then_act(&self.op, self.ctx.ui(), spec.prompt, || async {
            let outcome = spec
                .op
                .run_reported(&self.ctx, Params::new().with("action", spec.action))
                .await?;
            if outcome.is_ok() {
                tracing::info!(action = spec.action, "data volume request accepted");
                self.ctx.ui().alert(spec.started).await;
            }
            Ok::<_, ConsoleError>(outcome)
        })
        .await
        .transpose()
    }
}
