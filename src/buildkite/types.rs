use std::fmt;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::Result;
use crate::theme::StatusTheme;

/// A build record exactly as the API returned it.
pub type RawBuild = serde_json::Value;

/// The authenticated Buildkite user.
#[derive(Debug, Clone, Deserialize)]
pub struct User {
    /// Unique identifier, used as the `creator` filter
    pub id: String,
    /// Display name
    #[serde(default)]
    pub name: Option<String>,
}

/// Lifecycle state of a build.
///
/// Buildkite reports more states than these (blocked, canceling, not_run);
/// anything unrecognized degrades to `Unknown` and renders without an icon
/// or color instead of failing the run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildState {
    Scheduled,
    Running,
    Passed,
    Failed,
    #[serde(alias = "cancelled")]
    Canceled,
    Skipped,
    #[default]
    #[serde(other)]
    Unknown,
}

impl fmt::Display for BuildState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Scheduled => "scheduled",
            Self::Running => "running",
            Self::Passed => "passed",
            Self::Failed => "failed",
            Self::Canceled => "canceled",
            Self::Skipped => "skipped",
            Self::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// A build projected onto the fields the menu actually renders.
///
/// Deserialization is the allow-list: everything else in the raw record is
/// dropped. `status_icon`/`status_color` are filled in by [`normalize`].
#[derive(Debug, Clone, Deserialize)]
pub struct Build {
    pub id: String,
    /// Link target for the menu entry
    pub web_url: String,
    /// REST resource URL
    pub url: String,
    pub number: u64,
    #[serde(default)]
    pub state: BuildState,
    /// Commit message; null for some rebuilt/triggered builds
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub branch: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub finished_at: Option<DateTime<Utc>>,
    #[serde(skip)]
    pub status_icon: Option<String>,
    #[serde(skip)]
    pub status_color: Option<String>,
}

/// Project a raw build onto [`Build`] and attach its display attributes.
///
/// A record missing required identity fields is a malformed API response and
/// fails the run; an unrecognized state is not an error.
pub fn normalize(raw: RawBuild, theme: &StatusTheme) -> Result<Build> {
    let mut build: Build = serde_json::from_value(raw)?;
    build.status_icon = theme.icon(build.state).map(ToString::to_string);
    build.status_color = theme.color(build.state).map(ToString::to_string);
    Ok(build)
}
