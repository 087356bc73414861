use std::future::Future;
use std::time::Duration;

use log::{debug, trace};

use crate::error::{BridgeError, HostError, Result};
use crate::host::{Job, Parameters, TriggerCause};
use crate::tracker::{BuildQueries, StandardFilter};

use super::definition::{PromotionFilter, TriggerDefinition, TriggerResult, TriggerSet};

/// A build dispatched by [`TriggerEngine::evaluate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledBuild {
    pub cause: TriggerCause,
    pub parameters: Parameters,
    pub quiet_period: Duration,
}

/// Schedules a job when the tracker builds its triggers watch have moved on.
pub struct TriggerEngine<'a, Q: BuildQueries + ?Sized> {
    queries: &'a Q,
}

impl<'a, Q: BuildQueries + ?Sized> TriggerEngine<'a, Q> {
    pub fn new(queries: &'a Q) -> Self {
        Self { queries }
    }

    /// Name of the latest tracker build matching `trigger`, if any.
    pub async fn candidate(&self, trigger: &TriggerDefinition) -> Result<Option<String>> {
        let branch = trigger.branch_ref();
        let builds = match trigger.promotion_filter() {
            PromotionFilter::Latest => {
                self.queries
                    .standard_filter(&branch, &StandardFilter::last(1))
                    .await?
            }
            PromotionFilter::AnyPromotion => self.queries.last_promoted_builds(&branch).await?,
            PromotionFilter::Level(level) => {
                self.queries
                    .standard_filter(&branch, &StandardFilter::last(1).with_promotion_level(level))
                    .await?
            }
        };

        Ok(builds.into_iter().next().map(|build| build.name))
    }

    async fn evaluate_one(&self, job: &dyn Job, trigger: &TriggerDefinition) -> Result<TriggerResult> {
        let job_name = job.full_name();

        let Some(new_value) = self.candidate(trigger).await? else {
            debug!("[tracker][trigger][{job_name}] No build eligible");
            return Ok(TriggerResult::no_result(trigger));
        };
        debug!("[tracker][trigger][{job_name}] Last available build: {new_value}");

        let Some(last_build) = job.last_build() else {
            debug!("[tracker][trigger][{job_name}] No previous build, firing");
            return Ok(TriggerResult::no_previous(trigger, new_value));
        };

        let minimum = trigger.minimum_result;
        let unsuccessful = last_build
            .result()
            .is_none_or(|result| result.is_worse_than(minimum) && result.is_complete_build());
        if unsuccessful {
            debug!("[tracker][trigger][{job_name}] Last build was failed or unsuccessful");
            return Ok(TriggerResult::no_previous(trigger, new_value));
        }

        let parameter = &trigger.parameter_name;
        trace!("[tracker][trigger][{job_name}] Reading environment of build {}", last_build.id());
        let environment = last_build.environment().await.map_err(|source| match source {
            HostError::Interrupted => BridgeError::Interrupted,
            source => BridgeError::EnvironmentReadFailed {
                job: job_name.to_string(),
                parameter: parameter.clone(),
                source,
            },
        })?;

        let previous_value = environment.get(parameter).map(String::as_str);
        debug!(
            "[tracker][trigger][{job_name}] Version for last build: {}",
            previous_value.unwrap_or("<none>")
        );

        Ok(TriggerResult::with_previous(trigger, previous_value, new_value))
    }

    /// Evaluates every trigger of `job` in order and schedules at most one build.
    ///
    /// A build is scheduled when at least one trigger fires and every trigger
    /// found a value, so the build never runs with missing parameters. Any error
    /// aborts the evaluation before anything is scheduled.
    pub async fn evaluate(&self, job: &dyn Job, triggers: &TriggerSet) -> Result<Option<ScheduledBuild>> {
        let mut results = Vec::with_capacity(triggers.len());
        for trigger in triggers {
            results.push(self.evaluate_one(job, trigger).await?);
        }

        let firing = results.iter().any(|result| result.firing)
            && results.iter().all(TriggerResult::has_value);

        let job_name = job.full_name();
        if !firing {
            debug!("[tracker][trigger][{job_name}] For one of the reasons mentioned above, not firing");
            return Ok(None);
        }
        debug!("[tracker][trigger][{job_name}] Firing");

        let parameters: Parameters = results
            .into_iter()
            .filter_map(|result| result.new_value.map(|value| (result.parameter_name, value)))
            .collect();
        let build = ScheduledBuild {
            cause: TriggerCause::TrackerPromotion,
            parameters,
            quiet_period: Duration::ZERO,
        };

        job.schedule(&build.cause, &build.parameters, build.quiet_period)
            .await?;

        Ok(Some(build))
    }

    /// Like [`TriggerEngine::evaluate`], aborted as soon as `interrupt` completes.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::Interrupted`] when interrupted; in-flight calls are
    /// dropped and nothing is scheduled unless scheduling already went through.
    pub async fn evaluate_until<F>(
        &self,
        job: &dyn Job,
        triggers: &TriggerSet,
        interrupt: F,
    ) -> Result<Option<ScheduledBuild>>
    where
        F: Future<Output = ()>,
    {
        tokio::select! {
            biased;
            () = interrupt => {
                debug!("[tracker][trigger][{}] Evaluation interrupted", job.full_name());
                Err(BridgeError::Interrupted)
            }
            result = self.evaluate(job, triggers) => result,
        }
    }
}
