mod client;
mod provider;
mod types;

pub use client::{BuildkiteClient, DEFAULT_API_URL};
pub use provider::{BranchGroup, BuildkiteProvider, Section, StatusReport};
pub use types::{normalize, Build, BuildState, RawBuild, User};
