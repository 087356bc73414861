use thiserror::Error;

/// Failures reported by host collaborators (runs, jobs, environment lookups).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("interrupted")]
    Interrupted,
}

#[derive(Error, Debug)]
pub enum BridgeError {
    #[error("Cannot get any status when not running in a build")]
    NoBuildContext,

    #[error("[tracker][trigger][{job}] Could not compute the trigger condition because {parameter} environment variable could not be accessed")]
    EnvironmentReadFailed {
        job: String,
        parameter: String,
        #[source]
        source: HostError,
    },

    #[error("Operation interrupted")]
    Interrupted,

    #[error("Tracker API error (status {status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("Branch {branch} not found in project {project}")]
    BranchNotFound { project: String, branch: String },

    #[error("Tracker GraphQL error: {errors}")]
    GraphQLError { errors: String },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<HostError> for BridgeError {
    fn from(error: HostError) -> Self {
        match error {
            HostError::Interrupted => Self::Interrupted,
            HostError::Io(message) => Self::Io(std::io::Error::other(message)),
        }
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;
