use async_trait::async_trait;
use graphql_client::QueryBody;
use serde::Deserialize;
use serde_json::json;

use crate::error::{BridgeError, Result};

use super::client::TrackerClient;
use super::queries::{BranchRef, BuildQueries, StandardFilter, TrackerBuild};

const STANDARD_FILTER_QUERY: &str = r"
query StandardFilter($project: String!, $branch: String!, $count: Int!, $promotion: String) {
  branches(project: $project, name: $branch) {
    builds(filter: {count: $count, withPromotionLevel: $promotion}) {
      id
      name
    }
  }
}";

const LAST_PROMOTED_BUILDS_QUERY: &str = r"
query LastPromotedBuilds($project: String!, $branch: String!) {
  branches(project: $project, name: $branch) {
    builds(lastPromotions: true) {
      id
      name
    }
  }
}";

#[derive(Deserialize)]
struct BranchesData {
    branches: Vec<BranchBuilds>,
}

#[derive(Deserialize)]
struct BranchBuilds {
    builds: Vec<TrackerBuild>,
}

impl BranchesData {
    fn into_builds(self, branch: &BranchRef) -> Result<Vec<TrackerBuild>> {
        self.branches
            .into_iter()
            .next()
            .map(|found| found.builds)
            .ok_or_else(|| BridgeError::BranchNotFound {
                project: branch.project.clone(),
                branch: branch.branch.clone(),
            })
    }
}

#[async_trait]
impl BuildQueries for TrackerClient {
    async fn standard_filter(
        &self,
        branch: &BranchRef,
        filter: &StandardFilter,
    ) -> Result<Vec<TrackerBuild>> {
        let data: BranchesData = self
            .execute_graphql(QueryBody {
                variables: json!({
                    "project": branch.project,
                    "branch": branch.branch,
                    "count": filter.count,
                    "promotion": filter.with_promotion_level,
                }),
                query: STANDARD_FILTER_QUERY,
                operation_name: "StandardFilter",
            })
            .await?;

        let mut builds = data.into_builds(branch)?;
        builds.truncate(filter.count);
        Ok(builds)
    }

    async fn last_promoted_builds(&self, branch: &BranchRef) -> Result<Vec<TrackerBuild>> {
        let data: BranchesData = self
            .execute_graphql(QueryBody {
                variables: json!({
                    "project": branch.project,
                    "branch": branch.branch,
                }),
                query: LAST_PROMOTED_BUILDS_QUERY,
                operation_name: "LastPromotedBuilds",
            })
            .await?;

        // Build ids grow with creation time.
        let mut builds = data.into_builds(branch)?;
        builds.sort_by(|a, b| b.id.cmp(&a.id));
        Ok(builds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TrackerConfig;
    use mockito::Matcher;

    fn client(server: &mockito::ServerGuard) -> TrackerClient {
        TrackerClient::new(&TrackerConfig::new(server.url())).unwrap()
    }

    #[tokio::test]
    async fn test_standard_filter_sends_promotion() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/graphql")
            .match_body(Matcher::PartialJson(json!({
                "operationName": "StandardFilter",
                "variables": {"project": "p", "branch": "b", "count": 1, "promotion": "GOLD"}
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"data": {"branches": [{"builds": [{"id": 10, "name": "2.1.0"}]}]}}"#)
            .create_async()
            .await;

        let builds = client(&server)
            .standard_filter(
                &BranchRef::new("p", "b"),
                &StandardFilter::last(1).with_promotion_level("GOLD"),
            )
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(
            builds,
            vec![TrackerBuild {
                id: 10,
                name: "2.1.0".to_string()
            }]
        );
    }

    #[tokio::test]
    async fn test_last_promoted_builds_most_recent_first() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/graphql")
            .with_status(200)
            .with_body(
                r#"{"data": {"branches": [{"builds": [
                    {"id": "4", "name": "1.0.4"},
                    {"id": "9", "name": "1.0.9"},
                    {"id": "6", "name": "1.0.6"}
                ]}]}}"#,
            )
            .create_async()
            .await;

        let builds = client(&server)
            .last_promoted_builds(&BranchRef::new("p", "b"))
            .await
            .unwrap();

        let names: Vec<&str> = builds.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, ["1.0.9", "1.0.6", "1.0.4"]);
    }

    #[tokio::test]
    async fn test_last_promoted_builds_sends_operation() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/graphql")
            .match_body(Matcher::PartialJson(json!({
                "operationName": "LastPromotedBuilds",
                "variables": {"project": "p", "branch": "b"}
            })))
            .with_status(200)
            .with_body(r#"{"data": {"branches": [{"builds": []}]}, "extensions": {"cost": 3}}"#)
            .create_async()
            .await;

        let builds = client(&server)
            .last_promoted_builds(&BranchRef::new("p", "b"))
            .await
            .unwrap();

        mock.assert_async().await;
        assert!(builds.is_empty());
    }

    #[tokio::test]
    async fn test_missing_data_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/graphql")
            .with_status(200)
            .with_body(r#"{"data": null}"#)
            .create_async()
            .await;

        let error = client(&server)
            .standard_filter(&BranchRef::new("p", "b"), &StandardFilter::last(1))
            .await
            .unwrap_err();

        assert!(matches!(error, BridgeError::GraphQLError { .. }));
    }

    #[tokio::test]
    async fn test_unknown_branch() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/graphql")
            .with_status(200)
            .with_body(r#"{"data": {"branches": []}}"#)
            .create_async()
            .await;

        let error = client(&server)
            .standard_filter(&BranchRef::new("p", "gone"), &StandardFilter::last(1))
            .await
            .unwrap_err();

        assert!(matches!(error, BridgeError::BranchNotFound { .. }));
    }

    #[tokio::test]
    async fn test_graphql_errors_surface() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/graphql")
            .with_status(200)
            .with_body(r#"{"data": null, "errors": [{"message": "Unknown field"}, {"message": "Bad filter"}]}"#)
            .create_async()
            .await;

        let error = client(&server)
            .last_promoted_builds(&BranchRef::new("p", "b"))
            .await
            .unwrap_err();

        match error {
            BridgeError::GraphQLError { errors } => assert_eq!(errors, "Unknown field, Bad filter"),
            other => panic!("Unexpected error: {other}"),
        }
    }
}
