mod client;
mod graphql;
mod queries;
mod resource;

pub use client::TrackerClient;
pub use queries::{BranchRef, BuildQueries, StandardFilter, TrackerBuild};
pub use resource::Resource;
