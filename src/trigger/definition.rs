use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{BridgeError, Result};
use crate::status::CiResult;
use crate::tracker::BranchRef;

/// Promotion value selecting the last promoted build, whatever the promotion.
pub const ANY_PROMOTION: &str = "*";

/// A rule rebuilding a job when the latest matching tracker build changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TriggerDefinition {
    pub project: String,
    pub branch: String,
    /// Absent or blank for the last build, `*` for the last promoted build,
    /// otherwise the name of a promotion level
    #[serde(default)]
    pub promotion: Option<String>,
    /// Job parameter receiving the build name
    pub parameter_name: String,
    /// Results below this one force a rebuild
    #[serde(default = "default_minimum_result")]
    pub minimum_result: CiResult,
}

fn default_minimum_result() -> CiResult {
    CiResult::Success
}

/// Which tracker builds a trigger considers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromotionFilter {
    Latest,
    AnyPromotion,
    Level(String),
}

impl TriggerDefinition {
    pub fn new(
        project: impl Into<String>,
        branch: impl Into<String>,
        parameter_name: impl Into<String>,
    ) -> Self {
        Self {
            project: project.into(),
            branch: branch.into(),
            promotion: None,
            parameter_name: parameter_name.into(),
            minimum_result: default_minimum_result(),
        }
    }

    #[must_use]
    pub fn with_promotion(mut self, promotion: impl Into<String>) -> Self {
        self.promotion = Some(promotion.into());
        self
    }

    #[must_use]
    pub fn with_minimum_result(mut self, minimum_result: CiResult) -> Self {
        self.minimum_result = minimum_result;
        self
    }

    pub fn branch_ref(&self) -> BranchRef {
        BranchRef::new(&self.project, &self.branch)
    }

    pub fn promotion_filter(&self) -> PromotionFilter {
        match self.promotion.as_deref().map(str::trim) {
            None | Some("") => PromotionFilter::Latest,
            Some(ANY_PROMOTION) => PromotionFilter::AnyPromotion,
            Some(level) => PromotionFilter::Level(level.to_string()),
        }
    }
}

/// Outcome of evaluating a single trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerResult {
    pub parameter_name: String,
    pub new_value: Option<String>,
    pub firing: bool,
}

impl TriggerResult {
    /// No candidate build on the tracker.
    pub fn no_result(trigger: &TriggerDefinition) -> Self {
        Self {
            parameter_name: trigger.parameter_name.clone(),
            new_value: None,
            firing: false,
        }
    }

    /// Nothing to compare against: fire with the candidate.
    pub fn no_previous(trigger: &TriggerDefinition, new_value: impl Into<String>) -> Self {
        Self {
            parameter_name: trigger.parameter_name.clone(),
            new_value: Some(new_value.into()),
            firing: true,
        }
    }

    /// Fires when the candidate differs from the previous value.
    pub fn with_previous(
        trigger: &TriggerDefinition,
        previous_value: Option<&str>,
        new_value: impl Into<String>,
    ) -> Self {
        let new_value = new_value.into();
        Self {
            parameter_name: trigger.parameter_name.clone(),
            firing: previous_value != Some(new_value.as_str()),
            new_value: Some(new_value),
        }
    }

    pub fn has_value(&self) -> bool {
        self.new_value
            .as_deref()
            .is_some_and(|value| !value.trim().is_empty())
    }
}

/// The triggers attached to one job, each feeding a distinct parameter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TriggerSet {
    triggers: Vec<TriggerDefinition>,
}

impl TriggerSet {
    /// # Errors
    ///
    /// Returns [`BridgeError::Config`] when two triggers name the same parameter.
    pub fn new(triggers: Vec<TriggerDefinition>) -> Result<Self> {
        let mut seen = HashSet::new();
        if let Some(duplicate) = triggers
            .iter()
            .find(|trigger| !seen.insert(trigger.parameter_name.as_str()))
        {
            return Err(BridgeError::Config(format!(
                "Parameter {} is set by more than one trigger",
                duplicate.parameter_name
            )));
        }

        Ok(Self { triggers })
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TriggerDefinition> {
        self.triggers.iter()
    }

    pub fn len(&self) -> usize {
        self.triggers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triggers.is_empty()
    }
}

impl<'a> IntoIterator for &'a TriggerSet {
    type Item = &'a TriggerDefinition;
    type IntoIter = std::slice::Iter<'a, TriggerDefinition>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
