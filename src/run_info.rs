use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;
use crate::graph::FlowGraph;
use crate::host::StepContext;
use crate::timing::{elapsed_seconds, Clock};

pub const RUN_TIME: &str = "runTime";

/// Open description of a run, attached to validation runs on the tracker.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunInfo(IndexMap<String, Value>);

impl RunInfo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Elapsed seconds of the current stage, when known.
    pub fn run_time(&self) -> Option<u64> {
        self.get(RUN_TIME).and_then(Value::as_u64)
    }
}

impl FromIterator<(String, Value)> for RunInfo {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Builds the run info for the step described by `context`.
///
/// Starts from the host's baseline and adds `runTime` when the step sits inside
/// a timed stage. Returns `None` without a run or when nothing is left to say.
pub async fn build_run_info<G: FlowGraph>(
    context: &StepContext<'_, G>,
    clock: &dyn Clock,
) -> Result<Option<RunInfo>> {
    let Some(run) = context.run() else {
        return Ok(None);
    };

    let mut run_info = run.run_info().await?;

    if let Some((graph, node)) = context.flow_node() {
        if let Some(seconds) = elapsed_seconds(graph, node, clock) {
            debug!("Run {} is {seconds}s into its stage", run.id());
            run_info.insert(RUN_TIME, seconds);
        }
    }

    Ok((!run_info.is_empty()).then_some(run_info))
}
