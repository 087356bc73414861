use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use indexmap::IndexMap;

use crate::error::HostError;
use crate::graph::FlowGraph;
use crate::run_info::RunInfo;
use crate::status::CiResult;

/// String parameters passed to a scheduled build, in declaration order.
pub type Parameters = IndexMap<String, String>;

/// A job execution owned by the CI host.
#[async_trait]
pub trait Run: Send + Sync {
    fn id(&self) -> &str;

    /// Final result, or `None` while the run is still going.
    fn result(&self) -> Option<CiResult>;

    /// Environment variables recorded for the run.
    async fn environment(&self) -> std::result::Result<HashMap<String, String>, HostError>;

    /// Baseline description of the run (URL, causes, triggers...).
    async fn run_info(&self) -> std::result::Result<RunInfo, HostError>;
}

/// A schedulable unit owned by the CI host.
#[async_trait]
pub trait Job: Send + Sync {
    fn full_name(&self) -> &str;

    fn last_build(&self) -> Option<Arc<dyn Run>>;

    async fn schedule(
        &self,
        cause: &TriggerCause,
        parameters: &Parameters,
        quiet_period: Duration,
    ) -> std::result::Result<(), HostError>;
}

/// Why a build was scheduled by this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerCause {
    TrackerPromotion,
}

impl TriggerCause {
    pub fn short_description(self) -> &'static str {
        match self {
            Self::TrackerPromotion => "Started by an Ontrack promotion",
        }
    }
}

impl fmt::Display for TriggerCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.short_description())
    }
}

/// What a pipeline step can see of its surroundings: the run it belongs to and
/// its position in the execution graph.
pub struct StepContext<'a, G: FlowGraph> {
    run: Option<&'a dyn Run>,
    position: Option<(&'a G, G::Node)>,
}

impl<'a, G: FlowGraph> StepContext<'a, G> {
    pub fn new() -> Self {
        Self {
            run: None,
            position: None,
        }
    }

    #[must_use]
    pub fn with_run(mut self, run: &'a dyn Run) -> Self {
        self.run = Some(run);
        self
    }

    #[must_use]
    pub fn with_node(mut self, graph: &'a G, node: G::Node) -> Self {
        self.position = Some((graph, node));
        self
    }

    pub fn run(&self) -> Option<&'a dyn Run> {
        self.run
    }

    pub fn flow_node(&self) -> Option<(&'a G, &G::Node)> {
        self.position.as_ref().map(|(graph, node)| (*graph, node))
    }
}

impl<G: FlowGraph> Default for StepContext<'_, G> {
    fn default() -> Self {
        Self::new()
    }
}
