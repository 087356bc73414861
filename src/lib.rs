//! Bridge between CI pipelines and the Ontrack build tracker.
//!
//! Pipeline steps use [`steps`] to publish stage outcomes as validation runs,
//! and jobs use [`TriggerEngine`] to rebuild when a watched Ontrack branch or
//! promotion moves on.

pub mod auth;
pub mod config;
pub mod error;
pub mod graph;
pub mod host;
pub mod run_info;
pub mod stage;
pub mod status;
pub mod steps;
pub mod timing;
pub mod tracker;
pub mod trigger;

#[cfg(test)]
mod testing;

pub use config::{BridgeConfig, TrackerConfig};
pub use error::{BridgeError, HostError, Result};
pub use graph::FlowGraph;
pub use host::{Job, Parameters, Run, StepContext, TriggerCause};
pub use run_info::RunInfo;
pub use status::{CiResult, NodeStatus, ValidationRunStatus};
pub use steps::{run_info, validation_status_from_run, validation_status_from_stage};
pub use timing::{Clock, SystemClock};
pub use tracker::{BuildQueries, Resource, TrackerClient};
pub use trigger::{
    PromotionFilter, ScheduledBuild, TriggerDefinition, TriggerEngine, TriggerSet,
};
