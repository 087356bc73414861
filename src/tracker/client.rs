use graphql_client::{QueryBody, Response as GraphQLResponse};
use log::{debug, info};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use crate::auth::Credentials;
use crate::config::TrackerConfig;
use crate::error::{BridgeError, Result};

use super::resource::Resource;

const TOKEN_HEADER: &str = "X-Ontrack-Token";

/// HTTP client for the tracker.
///
/// Stateless beyond its configuration: every call is an independent request,
/// and failures are returned as they are, without retries.
pub struct TrackerClient {
    client: Client,
    base_url: String,
    credentials: Credentials,
}

impl TrackerClient {
    pub fn new(config: &TrackerConfig) -> Result<Self> {
        Url::parse(&config.ontrack_url)
            .map_err(|e| BridgeError::Config(format!("Invalid Ontrack URL: {e}")))?;

        let client = Client::builder()
            .user_agent(concat!("ontrack-bridge/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| BridgeError::Config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: config.ontrack_url.trim_end_matches('/').to_string(),
            credentials: config.credentials(),
        })
    }

    /// Joins `path` to the base URL with exactly one `/`.
    pub fn resource_url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub fn auth_request(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.credentials {
            Credentials::Anonymous => request,
            Credentials::Basic { username, password } => {
                request.basic_auth(username, Some(password))
            }
            Credentials::Token(token) => request.header(TOKEN_HEADER, token.as_str()),
        }
    }

    /// Gets the branch resource of `project`.
    pub async fn for_branch(&self, project: &str, branch: &str) -> Result<Resource> {
        self.for_resource(&format!(
            "structure/entity/branch/{}/{}",
            urlencoding::encode(project),
            urlencoding::encode(branch)
        ))
        .await
    }

    /// Gets any resource, `path` being relative to the base URL.
    pub async fn for_resource(&self, path: &str) -> Result<Resource> {
        let url = self.resource_url(path);
        info!("[ontrack] Getting resource from {url}");

        let response = self.auth_request(self.client.get(&url)).send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            return Err(BridgeError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        let value: Value = response.json().await?;
        Ok(Resource::new(value))
    }

    /// Runs a query against the tracker's GraphQL endpoint and returns its data.
    pub(super) async fn execute_graphql<T>(&self, body: QueryBody<Value>) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let url = self.resource_url("graphql");
        debug!("[ontrack] GraphQL query {} to {url}", body.operation_name);

        let response = self
            .auth_request(self.client.post(&url).json(&body))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            return Err(BridgeError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        let response_body: GraphQLResponse<T> = response.json().await?;

        if let Some(errors) = response_body.errors.filter(|errors| !errors.is_empty()) {
            return Err(BridgeError::GraphQLError {
                errors: errors
                    .into_iter()
                    .map(|e| e.message)
                    .collect::<Vec<_>>()
                    .join(", "),
            });
        }

        response_body.data.ok_or_else(|| BridgeError::GraphQLError {
            errors: "response carried no data".to_string(),
        })
    }
}
