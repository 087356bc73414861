use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::BridgeError;

/// Result code of a CI build or of a single pipeline node.
///
/// Variants are declared in increasing order of badness, so the derived
/// ordering is the host's "worse-than" relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum CiResult {
    Success,
    Unstable,
    Failure,
    NotBuilt,
    Aborted,
}

impl CiResult {
    pub fn is_worse_than(self, other: CiResult) -> bool {
        self > other
    }

    /// Whether a build with this result ran to completion.
    pub fn is_complete_build(self) -> bool {
        matches!(self, Self::Success | Self::Unstable | Self::Failure)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "SUCCESS",
            Self::Unstable => "UNSTABLE",
            Self::Failure => "FAILURE",
            Self::NotBuilt => "NOT_BUILT",
            Self::Aborted => "ABORTED",
        }
    }
}

impl fmt::Display for CiResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CiResult {
    type Err = BridgeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "SUCCESS" => Ok(Self::Success),
            "UNSTABLE" => Ok(Self::Unstable),
            "FAILURE" => Ok(Self::Failure),
            "NOT_BUILT" => Ok(Self::NotBuilt),
            "ABORTED" => Ok(Self::Aborted),
            other => Err(BridgeError::Config(format!("Unknown build result: {other}"))),
        }
    }
}

impl TryFrom<String> for CiResult {
    type Error = BridgeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<CiResult> for String {
    fn from(result: CiResult) -> Self {
        result.as_str().to_string()
    }
}

/// Status of a node in the pipeline execution graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeStatus {
    NotExecuted,
    InProgress,
    PausedPendingInput,
    Success,
    Unstable,
    Failed,
    Aborted,
}

/// Tracker vocabulary for the outcome of a validation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationRunStatus {
    Passed,
    Warning,
    Failed,
    Interrupted,
}

impl ValidationRunStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Passed => "PASSED",
            Self::Warning => "WARNING",
            Self::Failed => "FAILED",
            Self::Interrupted => "INTERRUPTED",
        }
    }
}

impl fmt::Display for ValidationRunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Maps a CI result to the validation run status published to the tracker.
///
/// A missing result means the build is still running and counts as passed.
/// `NOT_BUILT` has no publishable status.
pub fn ci_to_validation(result: Option<CiResult>) -> Option<ValidationRunStatus> {
    match result {
        None | Some(CiResult::Success) => Some(ValidationRunStatus::Passed),
        Some(CiResult::Unstable) => Some(ValidationRunStatus::Warning),
        Some(CiResult::Failure) => Some(ValidationRunStatus::Failed),
        Some(CiResult::Aborted) => Some(ValidationRunStatus::Interrupted),
        Some(CiResult::NotBuilt) => None,
    }
}

/// Maps a graph node status to a CI result.
///
/// Nodes still running report as successful so far. Nodes not executed or
/// waiting for input carry no result.
pub fn node_to_ci(status: Option<NodeStatus>) -> Option<CiResult> {
    match status? {
        NodeStatus::NotExecuted | NodeStatus::PausedPendingInput => None,
        NodeStatus::Aborted => Some(CiResult::Aborted),
        NodeStatus::Success | NodeStatus::InProgress => Some(CiResult::Success),
        NodeStatus::Failed => Some(CiResult::Failure),
        NodeStatus::Unstable => Some(CiResult::Unstable),
    }
}
