use anyhow::Result;
use clap::Parser;
use log::info;

use crate::buildkite::{BuildkiteClient, BuildkiteProvider, DEFAULT_API_URL};
use crate::config::Config;
use crate::output;
use crate::theme::StatusTheme;

/// Every option doubles as an environment variable because the menu-bar
/// host launches the binary with no arguments and configures it purely
/// through its plugin environment block.
#[derive(Parser)]
#[command(name = "buildbar")]
#[command(author, version, about = "Buildkite build status for the menu bar", long_about = None)]
pub struct Cli {
    /// Buildkite organization slug
    #[arg(long, env = "ORG_NAME")]
    org_name: String,

    /// Buildkite REST API token (needs read_builds and read_user scopes)
    #[arg(long, env = "API_TOKEN", hide_env_values = true)]
    api_token: String,

    /// Branches to watch: a "main,develop" list, or a JSON object mapping
    /// pipeline slugs to branch lists like {"web": "main;release"}
    #[arg(long, env = "BRANCHES")]
    branches: String,

    /// Builds shown per menu section
    #[arg(long, env = "BUILD_COUNT", default_value = "5")]
    build_count: String,

    /// API base URL override
    #[arg(long, env = "BUILDKITE_API_URL", default_value = DEFAULT_API_URL, hide = true)]
    api_url: String,

    /// Skip sfcolor attributes and let the menu bar pick its own colors
    #[arg(long, env = "COLORLESS")]
    colorless: bool,
}

impl Cli {
    pub async fn execute(&self) -> Result<()> {
        let config = Config::resolve(
            &self.org_name,
            &self.api_token,
            &self.branches,
            &self.build_count,
        )?;
        let theme = if self.colorless {
            StatusTheme::monochrome()
        } else {
            StatusTheme::default()
        };

        info!("Collecting build status for organization: {}", config.org_name);

        let client = BuildkiteClient::new(&self.api_url, &config.api_token)?;
        let provider = BuildkiteProvider::new(client, theme);
        let report = provider.collect_status(&config).await?;

        // The document only reaches stdout once every fetch has succeeded,
        // so a failed run produces no partial menu.
        print!("{}", output::render(&report, config.build_count));

        Ok(())
    }
}
