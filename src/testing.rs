//! In-memory stand-ins for the CI host and the tracker.

use std::cell::RefCell;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use indexmap::IndexMap;
use serde_json::Value;

use crate::error::{BridgeError, HostError, Result};
use crate::graph::FlowGraph;
use crate::host::{Job, Parameters, Run, TriggerCause};
use crate::run_info::RunInfo;
use crate::status::{CiResult, NodeStatus};
use crate::timing::Clock;
use crate::tracker::{BranchRef, BuildQueries, StandardFilter, TrackerBuild};

struct MemoryNode {
    parents: Vec<String>,
    status: Option<NodeStatus>,
    stage_start: bool,
    start_millis: Option<i64>,
}

/// Execution graph keyed by node name.
#[derive(Default)]
pub struct MemoryGraph {
    nodes: IndexMap<String, MemoryNode>,
    heads: Vec<String>,
    lookups: RefCell<HashMap<String, usize>>,
}

impl MemoryGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node(&mut self, name: &str, parents: &[&str], status: Option<NodeStatus>) {
        self.insert(name, parents, status, false, None);
    }

    pub fn stage(
        &mut self,
        name: &str,
        parents: &[&str],
        status: Option<NodeStatus>,
        start_millis: Option<i64>,
    ) {
        self.insert(name, parents, status, true, start_millis);
    }

    fn insert(
        &mut self,
        name: &str,
        parents: &[&str],
        status: Option<NodeStatus>,
        stage_start: bool,
        start_millis: Option<i64>,
    ) {
        self.nodes.insert(
            name.to_string(),
            MemoryNode {
                parents: parents.iter().map(ToString::to_string).collect(),
                status,
                stage_start,
                start_millis,
            },
        );
    }

    pub fn set_heads(&mut self, heads: &[&str]) {
        self.heads = heads.iter().map(ToString::to_string).collect();
    }

    /// How many times the parents of `name` were asked for.
    pub fn parent_lookups(&self, name: &str) -> usize {
        self.lookups.borrow().get(name).copied().unwrap_or(0)
    }
}

impl FlowGraph for MemoryGraph {
    type Node = String;

    fn parents(&self, node: &String) -> Vec<String> {
        *self.lookups.borrow_mut().entry(node.clone()).or_insert(0) += 1;
        self.nodes
            .get(node)
            .map(|n| n.parents.clone())
            .unwrap_or_default()
    }

    fn status(&self, node: &String) -> Option<NodeStatus> {
        self.nodes.get(node).and_then(|n| n.status)
    }

    fn is_stage_start(&self, node: &String) -> bool {
        self.nodes.get(node).is_some_and(|n| n.stage_start)
    }

    fn start_millis(&self, node: &String) -> Option<i64> {
        self.nodes.get(node).and_then(|n| n.start_millis)
    }

    fn heads(&self) -> Vec<String> {
        self.heads.clone()
    }
}

pub struct FixedClock(pub i64);

impl Clock for FixedClock {
    fn now_millis(&self) -> i64 {
        self.0
    }
}

pub struct FakeRun {
    id: String,
    result: Option<CiResult>,
    environment: std::result::Result<HashMap<String, String>, HostError>,
    info: RunInfo,
}

impl FakeRun {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            result: None,
            environment: Ok(HashMap::new()),
            info: RunInfo::new(),
        }
    }

    pub fn with_result(mut self, result: Option<CiResult>) -> Self {
        self.result = result;
        self
    }

    pub fn with_env(mut self, name: &str, value: &str) -> Self {
        if let Ok(environment) = &mut self.environment {
            environment.insert(name.to_string(), value.to_string());
        }
        self
    }

    pub fn with_env_error(mut self, error: HostError) -> Self {
        self.environment = Err(error);
        self
    }

    pub fn with_info(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.info.insert(key, value);
        self
    }
}

#[async_trait]
impl Run for FakeRun {
    fn id(&self) -> &str {
        &self.id
    }

    fn result(&self) -> Option<CiResult> {
        self.result
    }

    async fn environment(&self) -> std::result::Result<HashMap<String, String>, HostError> {
        self.environment.clone()
    }

    async fn run_info(&self) -> std::result::Result<RunInfo, HostError> {
        Ok(self.info.clone())
    }
}

/// Job recording every build scheduled on it.
pub struct FakeJob {
    name: String,
    last_build: Option<Arc<dyn Run>>,
    scheduled: Mutex<Vec<Parameters>>,
}

impl FakeJob {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            last_build: None,
            scheduled: Mutex::new(Vec::new()),
        }
    }

    pub fn with_last_build(mut self, run: FakeRun) -> Self {
        self.last_build = Some(Arc::new(run));
        self
    }

    pub fn scheduled(&self) -> Vec<Parameters> {
        self.scheduled.lock().unwrap().clone()
    }
}

#[async_trait]
impl Job for FakeJob {
    fn full_name(&self) -> &str {
        &self.name
    }

    fn last_build(&self) -> Option<Arc<dyn Run>> {
        self.last_build.clone()
    }

    async fn schedule(
        &self,
        cause: &TriggerCause,
        parameters: &Parameters,
        quiet_period: Duration,
    ) -> std::result::Result<(), HostError> {
        assert_eq!(*cause, TriggerCause::TrackerPromotion);
        assert_eq!(quiet_period, Duration::ZERO);
        self.scheduled.lock().unwrap().push(parameters.clone());
        Ok(())
    }
}

enum Behaviour {
    Answer,
    Fail,
    Hang,
}

/// Canned tracker answers; unknown lookups return no builds.
pub struct FakeQueries {
    filters: HashMap<(BranchRef, StandardFilter), Vec<TrackerBuild>>,
    promoted: HashMap<BranchRef, Vec<TrackerBuild>>,
    behaviour: Behaviour,
}

fn builds(names: &[&str]) -> Vec<TrackerBuild> {
    names
        .iter()
        .zip(1..)
        .map(|(name, id)| TrackerBuild {
            id,
            name: (*name).to_string(),
        })
        .collect()
}

impl FakeQueries {
    pub fn new() -> Self {
        Self {
            filters: HashMap::new(),
            promoted: HashMap::new(),
            behaviour: Behaviour::Answer,
        }
    }

    pub fn with_filter(mut self, branch: BranchRef, filter: StandardFilter, names: &[&str]) -> Self {
        self.filters.insert((branch, filter), builds(names));
        self
    }

    pub fn with_promoted(mut self, branch: BranchRef, names: &[&str]) -> Self {
        self.promoted.insert(branch, builds(names));
        self
    }

    pub fn failing(mut self) -> Self {
        self.behaviour = Behaviour::Fail;
        self
    }

    pub fn hanging(mut self) -> Self {
        self.behaviour = Behaviour::Hang;
        self
    }

    async fn answer(&self, builds: Option<&Vec<TrackerBuild>>) -> Result<Vec<TrackerBuild>> {
        match self.behaviour {
            Behaviour::Answer => Ok(builds.cloned().unwrap_or_default()),
            Behaviour::Fail => Err(BridgeError::ApiError {
                status: 503,
                message: "Service Unavailable".to_string(),
            }),
            Behaviour::Hang => std::future::pending().await,
        }
    }
}

#[async_trait]
impl BuildQueries for FakeQueries {
    async fn standard_filter(
        &self,
        branch: &BranchRef,
        filter: &StandardFilter,
    ) -> Result<Vec<TrackerBuild>> {
        self.answer(self.filters.get(&(branch.clone(), filter.clone())))
            .await
    }

    async fn last_promoted_builds(&self, branch: &BranchRef) -> Result<Vec<TrackerBuild>> {
        self.answer(self.promoted.get(branch)).await
    }
}
