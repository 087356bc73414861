//! Entry points used by pipeline steps publishing to the tracker.

use log::debug;

use crate::error::{BridgeError, Result};
use crate::graph::{find_enclosing_stage, FlowGraph};
use crate::host::StepContext;
use crate::run_info::{build_run_info, RunInfo};
use crate::stage::aggregate_stage_status;
use crate::status::{ci_to_validation, ValidationRunStatus};
use crate::timing::Clock;

/// Validation status of the stage enclosing the current step.
///
/// Falls back to the status of the whole run when the step is not inside a
/// stage or its position in the graph is unknown.
///
/// # Errors
///
/// Returns [`BridgeError::NoBuildContext`] when falling back without a run.
pub fn validation_status_from_stage<G: FlowGraph>(
    context: &StepContext<'_, G>,
) -> Result<Option<ValidationRunStatus>> {
    if let Some((graph, node)) = context.flow_node() {
        if let Some(stage) = find_enclosing_stage(graph, node) {
            let result = aggregate_stage_status(graph, &stage, node);
            debug!("Stage result: {result:?}");
            return Ok(ci_to_validation(result));
        }
    }

    validation_status_from_run(context)
}

/// Validation status of the run the current step belongs to.
///
/// # Errors
///
/// Returns [`BridgeError::NoBuildContext`] when there is no run.
pub fn validation_status_from_run<G: FlowGraph>(
    context: &StepContext<'_, G>,
) -> Result<Option<ValidationRunStatus>> {
    let run = context.run().ok_or(BridgeError::NoBuildContext)?;
    Ok(ci_to_validation(run.result()))
}

/// Run info for the current step, see [`build_run_info`].
pub async fn run_info<G: FlowGraph>(
    context: &StepContext<'_, G>,
    clock: &dyn Clock,
) -> Result<Option<RunInfo>> {
    build_run_info(context, clock).await
}
