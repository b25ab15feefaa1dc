use indexmap::IndexMap;
use log::{debug, info};

use crate::config::{BranchSpec, Config};
use crate::error::Result;
use crate::theme::StatusTheme;

use super::client::BuildkiteClient;
use super::types::{normalize, Build, RawBuild};

/// Everything the renderer needs for one menu document.
#[derive(Debug)]
pub struct StatusReport {
    /// Builds created by the authenticated user, newest first
    pub personal: Vec<Build>,
    /// One section per configured branch or pipeline
    pub sections: Vec<Section>,
}

#[derive(Debug)]
pub enum Section {
    /// Flat mode: a single branch and its builds
    Branch(BranchGroup),
    /// Mapping mode: a pipeline with per-branch groups nested under it
    Pipeline {
        pipeline: String,
        groups: Vec<BranchGroup>,
    },
}

#[derive(Debug)]
pub struct BranchGroup {
    pub branch: String,
    pub builds: Vec<Build>,
}

/// Fetches builds and assembles the [`StatusReport`].
///
/// All requests run sequentially; the user id is resolved exactly once,
/// before any build fetch.
pub struct BuildkiteProvider {
    client: BuildkiteClient,
    theme: StatusTheme,
}

impl BuildkiteProvider {
    pub fn new(client: BuildkiteClient, theme: StatusTheme) -> Self {
        Self { client, theme }
    }

    pub async fn collect_status(&self, config: &Config) -> Result<StatusReport> {
        let user = self.client.current_user().await?;
        info!(
            "Fetching builds for {} ({})",
            user.name.as_deref().unwrap_or("unknown user"),
            user.id
        );

        let raw = self
            .client
            .builds_by_creator(&config.org_name, &user.id)
            .await?;
        let personal = self.normalize_all(raw)?;
        debug!("{} personal builds", personal.len());

        let sections = match &config.branch_spec {
            BranchSpec::Branches(branches) => {
                let raw = self
                    .client
                    .branch_builds(&config.org_name, branches, None)
                    .await?;
                let builds = self.normalize_all(raw)?;
                group_by_branch(builds, branches)
                    .into_iter()
                    .map(Section::Branch)
                    .collect()
            }
            BranchSpec::Pipelines(pipelines) => {
                let mut sections = Vec::with_capacity(pipelines.len());
                for (pipeline, branches) in pipelines {
                    let raw = self
                        .client
                        .branch_builds(&config.org_name, branches, Some(pipeline))
                        .await?;
                    let builds = self.normalize_all(raw)?;
                    sections.push(Section::Pipeline {
                        pipeline: pipeline.clone(),
                        groups: group_by_branch(builds, branches),
                    });
                }
                sections
            }
        };

        Ok(StatusReport { personal, sections })
    }

    fn normalize_all(&self, raw: Vec<RawBuild>) -> Result<Vec<Build>> {
        raw.into_iter()
            .map(|build| normalize(build, &self.theme))
            .collect()
    }
}

/// Group builds by branch, in configured branch order, keeping API response
/// order within each group. Branches with no builds are dropped; builds on
/// unconfigured branches append after the configured ones.
pub fn group_by_branch(builds: Vec<Build>, order: &[String]) -> Vec<BranchGroup> {
    let mut groups: IndexMap<String, Vec<Build>> = order
        .iter()
        .map(|branch| (branch.clone(), Vec::new()))
        .collect();

    for build in builds {
        let branch = build.branch.clone().unwrap_or_default();
        groups.entry(branch).or_default().push(build);
    }

    groups
        .into_iter()
        .filter(|(_, builds)| !builds.is_empty())
        .map(|(branch, builds)| BranchGroup { branch, builds })
        .collect()
}
