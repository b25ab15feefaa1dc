use indexmap::IndexMap;

use crate::buildkite::BuildState;

/// Icon and color lookup tables for rendering build states.
///
/// The tables are plain data so alternate themes (or none at all) can be
/// swapped in without touching the normalizer. A state missing from a table
/// renders without that attribute instead of failing.
#[derive(Debug, Clone)]
pub struct StatusTheme {
    icons: IndexMap<BuildState, String>,
    colors: IndexMap<BuildState, String>,
}

impl StatusTheme {
    pub fn new(icons: IndexMap<BuildState, String>, colors: IndexMap<BuildState, String>) -> Self {
        Self { icons, colors }
    }

    /// SF Symbols only, no colors. Every build renders in the menu bar's
    /// own foreground color.
    pub fn monochrome() -> Self {
        Self {
            icons: default_icons(),
            colors: IndexMap::new(),
        }
    }

    pub fn icon(&self, state: BuildState) -> Option<&str> {
        self.icons.get(&state).map(String::as_str)
    }

    pub fn color(&self, state: BuildState) -> Option<&str> {
        self.colors.get(&state).map(String::as_str)
    }
}

impl Default for StatusTheme {
    fn default() -> Self {
        Self {
            icons: default_icons(),
            colors: default_colors(),
        }
    }
}

fn default_icons() -> IndexMap<BuildState, String> {
    IndexMap::from([
        (BuildState::Scheduled, "clock.fill".to_string()),
        (BuildState::Running, "arrow.triangle.2.circlepath".to_string()),
        (BuildState::Passed, "checkmark.circle.fill".to_string()),
        (BuildState::Failed, "xmark.octagon.fill".to_string()),
        (BuildState::Canceled, "minus.circle.fill".to_string()),
        (BuildState::Skipped, "forward.end.alt".to_string()),
    ])
}

// Light,dark pairs where the menu bar needs to adapt, single values otherwise.
fn default_colors() -> IndexMap<BuildState, String> {
    IndexMap::from([
        (BuildState::Scheduled, "#000000,#ffffff".to_string()),
        (BuildState::Running, "#0969da".to_string()),
        (BuildState::Passed, "#1a7f37".to_string()),
        (BuildState::Failed, "#cf222e".to_string()),
        (BuildState::Canceled, "#bf8700".to_string()),
        (BuildState::Skipped, "#000000,#ffffff".to_string()),
    ])
}
