use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A branch on the tracker, addressed by project and branch name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BranchRef {
    pub project: String,
    pub branch: String,
}

impl BranchRef {
    pub fn new(project: impl Into<String>, branch: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            branch: branch.into(),
        }
    }
}

impl fmt::Display for BranchRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.project, self.branch)
    }
}

/// Parameters of the tracker's standard build filter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StandardFilter {
    pub count: usize,
    pub with_promotion_level: Option<String>,
}

impl StandardFilter {
    /// Last `count` builds, most recent first.
    pub fn last(count: usize) -> Self {
        Self {
            count,
            with_promotion_level: None,
        }
    }

    #[must_use]
    pub fn with_promotion_level(mut self, promotion: impl Into<String>) -> Self {
        self.with_promotion_level = Some(promotion.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackerBuild {
    #[serde(deserialize_with = "de_id")]
    pub id: i64,
    pub name: String,
}

// GraphQL IDs may come back as strings.
fn de_id<'de, D>(deserializer: D) -> std::result::Result<i64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Number(i64),
        Text(String),
    }

    match Id::deserialize(deserializer)? {
        Id::Number(id) => Ok(id),
        Id::Text(text) => text.parse().map_err(serde::de::Error::custom),
    }
}

/// Build lookups the trigger engine needs from the tracker.
#[async_trait]
pub trait BuildQueries: Send + Sync {
    /// Builds of the branch matching `filter`, most recent first.
    async fn standard_filter(
        &self,
        branch: &BranchRef,
        filter: &StandardFilter,
    ) -> Result<Vec<TrackerBuild>>;

    /// Last build of each promotion level of the branch, most recent first.
    async fn last_promoted_builds(&self, branch: &BranchRef) -> Result<Vec<TrackerBuild>>;
}
