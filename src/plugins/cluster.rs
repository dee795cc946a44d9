//! Cluster lifecycle.
//!
//! The cluster state is never pushed; callers poll [`ClusterPlugin::status`].
//! Start and interactive stop go through the confirmation gate, and polls
//! are skipped while one of them is in progress so that a status read
//! never races a pending mutation.

use std::sync::Arc;

use super::{OpResult, Operation};
use crate::channel::Params;
use crate::context::ConsoleContext;
use crate::envelope::Outcome;
use crate::error::{ConsoleError, ConsoleResult, ValidationError};
use crate::gate::{confirm_then_act, Gated, OpGuard};

const ENDPOINT: &str = "/jboxplugin/par/";

const CREATE: Operation = Operation::get(ENDPOINT, "configuring cluster");
const TERMINATE: Operation = Operation::get(ENDPOINT, "terminating cluster");
const STATUS: Operation = Operation::get(ENDPOINT, "fetching cluster status").unlocked();
const ADD: Operation = Operation::get(ENDPOINT, "adding cluster");

pub const TERMINATE_PROMPT: &str = "Terminate the cluster?";

/// Prompt shown before starting a cluster.
pub fn start_prompt(ninsts: i64, spot_price: f64) -> String {
    if spot_price > 0.0 {
        format!(
            "Start a cluster of {} spot instance(s) at ${} per instance per hour?",
            ninsts, spot_price
        )
    } else {
        format!("Start a cluster of {} regular instance(s)?", ninsts)
    }
}

pub struct ClusterPlugin {
    ctx: Arc<ConsoleContext>,
    op: OpGuard,
}

impl ClusterPlugin {
    pub fn new(ctx: Arc<ConsoleContext>) -> Self {
        Self {
            ctx,
            op: OpGuard::new("cluster"),
        }
    }

    pub fn guard(&self) -> &OpGuard {
        &self.op
    }

    /// Start `ninsts` instances in `avzone`. A positive `spot_price` asks
    /// for spot instances at that hourly bid.
    pub async fn start(
        &self,
        ninsts: i64,
        avzone: &str,
        spot_price: f64,
    ) -> ConsoleResult<Gated<Outcome>> {
        if !self.op.is_idle() {
            return Ok(Gated::Busy);
        }
        let invalid = if ninsts < 1 {
            Some(ValidationError::InvalidInstanceCount(ninsts))
        } else if !spot_price.is_finite() || spot_price < 0.0 {
            Some(ValidationError::InvalidSpotPrice(spot_price))
        } else {
            None
        };
        if let Some(err) = invalid {
            self.ctx.ui().alert(&err.to_string()).await;
            return Err(err.into());
        }

        let params = Params::new()
            .with("cluster", "create")
            .with("ninsts", ninsts)
            .with("avzone", avzone)
            .with("spot_price", spot_price);

        confirm_then_act(&self.op, self.ctx.ui(), &start_prompt(ninsts, spot_price), || async {
            let outcome = CREATE.run_reported(&self.ctx, params).await?;
            if outcome.is_ok() {
                tracing::info!(ninsts, avzone, "cluster requested");
                self.ctx
                    .ui()
                    .alert(&format!("Requested cluster for {} instance(s).", ninsts))
                    .await;
            }
            Ok::<_, ConsoleError>(outcome)
        })
        .await
        .transpose()
    }

    /// Terminate the cluster.
    ///
    /// Interactive stops are confirmed, locked and acknowledged. A
    /// non-interactive stop (teardown on exit) skips the prompt and the
    /// busy indicator; failures are still reported.
    pub async fn stop(&self, interactive: bool) -> ConsoleResult<Gated<Outcome>> {
        let params = Params::new().with("cluster", "terminate");

        if !interactive {
            return TERMINATE
                .unlocked()
                .run_reported(&self.ctx, params)
                .await
                .map(Gated::Done);
        }

        confirm_then_act(&self.op, self.ctx.ui(), TERMINATE_PROMPT, || async {
            let outcome = TERMINATE.run_reported(&self.ctx, params).await?;
            if outcome.is_ok() {
                tracing::info!("cluster termination requested");
                self.ctx.ui().alert("Requested cluster termination.").await;
            }
            Ok::<_, ConsoleError>(outcome)
        })
        .await
        .transpose()
    }

    /// Poll cluster status without locking. `Busy` while a start or stop
    /// is being confirmed or submitted.
    pub async fn status(&self) -> ConsoleResult<Gated<Outcome>> {
        if !self.op.is_idle() {
            tracing::debug!("cluster status skipped, operation in progress");
            return Ok(Gated::Busy);
        }
        STATUS
            .run(&self.ctx, Params::new().with("cluster", "status"))
            .await
            .map(Gated::Done)
    }

    /// Attach to a started cluster; on success the backend returns the path
    /// of the generated machinefile.
    pub async fn add(&self, name: &str) -> OpResult {
        let ui = self.ctx.ui();
        let unhealthy = format!(
            "Error adding cluster {}. Please ensure it is started and healthy.",
            name
        );

        match ADD.run(&self.ctx, Params::new().with("addcluster", name)).await {
            Ok(Outcome::Ok(data)) => {
                let machinefile = crate::envelope::data_text(&data).unwrap_or_default();
                ui.alert(&format!(
                    "Added cluster {}. Created machinefile at {}",
                    name, machinefile
                ))
                .await;
                Ok(Outcome::Ok(data))
            }
            Ok(outcome) => {
                match &outcome {
                    Outcome::Error(Some(reason)) => {
                        ui.alert(&format!("Error adding cluster. {}", reason)).await
                    }
                    _ => ui.alert(&unhealthy).await,
                }
                Ok(outcome)
            }
            Err(err) => {
                ui.alert(&unhealthy).await;
                Err(err)
            }
        }
    }
}
