use indexmap::IndexMap;
use serde::Deserialize;

use crate::error::{BuildbarError, Result};

/// Sentinel values shipped in the plugin's SwiftBar metadata. Seeing them at
/// runtime means the user never configured their environment.
pub const PLACEHOLDER_ORG: &str = "default_org";
pub const PLACEHOLDER_TOKEN: &str = "default_token";

/// Resolved runtime configuration.
///
/// Built once at startup from the host-supplied environment and passed by
/// reference everywhere; no other component reads ambient process state.
#[derive(Debug, Clone)]
pub struct Config {
    /// Buildkite organization slug
    pub org_name: String,
    /// Buildkite REST API token
    pub api_token: String,
    /// Which branch/pipeline builds to watch
    pub branch_spec: BranchSpec,
    /// How many builds to show per menu section
    pub build_count: usize,
}

/// The two supported shapes of the `BRANCHES` value.
///
/// Each variant drives its own fetch strategy: a flat list is a single
/// organization-wide query with OR semantics, a pipeline map issues one
/// pipeline-scoped query per key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BranchSpec {
    /// `"main,develop"` or `"main;develop"`
    Branches(Vec<String>),
    /// `{"web": "main;release"}` or `{"web": ["main", "release"]}`
    Pipelines(IndexMap<String, Vec<String>>),
}

/// Pipeline map values: either a semicolon-delimited string or a plain
/// JSON array.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum BranchListValue {
    Delimited(String),
    List(Vec<String>),
}

impl BranchSpec {
    pub fn parse(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(BuildbarError::Mapping(
                "no branches configured".to_string(),
            ));
        }

        if trimmed.starts_with('{') {
            return Self::parse_pipeline_map(trimmed);
        }

        let branches = split_branch_list(trimmed);
        if branches.is_empty() {
            return Err(BuildbarError::Mapping(format!(
                "no branch names found in {trimmed:?}"
            )));
        }
        Ok(Self::Branches(branches))
    }

    fn parse_pipeline_map(raw: &str) -> Result<Self> {
        let map: IndexMap<String, BranchListValue> = serde_json::from_str(raw)
            .map_err(|e| BuildbarError::Mapping(format!("invalid pipeline map: {e}")))?;

        let mut pipelines = IndexMap::new();
        for (pipeline, value) in map {
            let branches = match value {
                BranchListValue::Delimited(list) => split_branch_list(&list),
                BranchListValue::List(list) => list
                    .iter()
                    .map(|b| b.trim().to_string())
                    .filter(|b| !b.is_empty())
                    .collect(),
            };
            if branches.is_empty() {
                return Err(BuildbarError::Mapping(format!(
                    "pipeline {pipeline:?} has no branches"
                )));
            }
            pipelines.insert(pipeline, branches);
        }

        if pipelines.is_empty() {
            return Err(BuildbarError::Mapping("pipeline map is empty".to_string()));
        }
        Ok(Self::Pipelines(pipelines))
    }
}

impl Config {
    /// Validate the raw host-supplied values and resolve them into a config.
    ///
    /// Fails before any network call when the org or token is missing or
    /// still a placeholder. The build count is coerced permissively:
    /// anything that is not a non-negative integer displays zero builds
    /// rather than erroring.
    pub fn resolve(org_name: &str, api_token: &str, branches: &str, build_count: &str) -> Result<Self> {
        let org_name = org_name.trim();
        let api_token = api_token.trim();

        if org_name.is_empty() || org_name == PLACEHOLDER_ORG {
            return Err(BuildbarError::Config(
                "ORG_NAME is unset or still the placeholder; edit the plugin environment"
                    .to_string(),
            ));
        }
        if api_token.is_empty() || api_token == PLACEHOLDER_TOKEN {
            return Err(BuildbarError::Config(
                "API_TOKEN is unset or still the placeholder; edit the plugin environment"
                    .to_string(),
            ));
        }

        Ok(Self {
            org_name: org_name.to_string(),
            api_token: api_token.to_string(),
            branch_spec: BranchSpec::parse(branches)?,
            build_count: parse_build_count(build_count),
        })
    }
}

fn split_branch_list(raw: &str) -> Vec<String> {
    raw.split([',', ';'])
        .map(str::trim)
        .filter(|b| !b.is_empty())
        .map(ToString::to_string)
        .collect()
}

fn parse_build_count(raw: &str) -> usize {
    raw.trim().parse().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolve(branches: &str) -> Result<Config> {
        Config::resolve("acme", "real-token", branches, "5")
    }

    #[test]
    fn placeholder_org_is_rejected() {
        let result = Config::resolve(PLACEHOLDER_ORG, "real-token", "main", "5");
        assert!(matches!(result, Err(BuildbarError::Config(_))));
    }

    #[test]
    fn placeholder_token_is_rejected() {
        let result = Config::resolve("acme", PLACEHOLDER_TOKEN, "main", "5");
        assert!(matches!(result, Err(BuildbarError::Config(_))));
    }

    #[test]
    fn empty_org_is_rejected() {
        let result = Config::resolve("  ", "real-token", "main", "5");
        assert!(matches!(result, Err(BuildbarError::Config(_))));
    }

    #[test]
    fn build_count_coerces_permissively() {
        assert_eq!(resolve("main").unwrap().build_count, 5);
        assert_eq!(Config::resolve("acme", "t", "main", "7").unwrap().build_count, 7);
        assert_eq!(Config::resolve("acme", "t", "main", "abc").unwrap().build_count, 0);
        assert_eq!(Config::resolve("acme", "t", "main", "-3").unwrap().build_count, 0);
        assert_eq!(Config::resolve("acme", "t", "main", "").unwrap().build_count, 0);
    }

    #[test]
    fn single_branch_parses_as_flat_list() {
        let spec = BranchSpec::parse("main").unwrap();
        assert_eq!(spec, BranchSpec::Branches(vec!["main".to_string()]));
    }

    #[test]
    fn flat_list_splits_on_commas_and_semicolons() {
        let spec = BranchSpec::parse(" main , develop ;release ").unwrap();
        assert_eq!(
            spec,
            BranchSpec::Branches(vec![
                "main".to_string(),
                "develop".to_string(),
                "release".to_string(),
            ])
        );
    }

    #[test]
    fn pipeline_map_with_delimited_values() {
        let spec = BranchSpec::parse(r#"{"web": "main;release", "api": "develop"}"#).unwrap();
        let BranchSpec::Pipelines(pipelines) = spec else {
            panic!("expected pipeline map");
        };
        assert_eq!(
            pipelines.get("web"),
            Some(&vec!["main".to_string(), "release".to_string()])
        );
        assert_eq!(pipelines.get("api"), Some(&vec!["develop".to_string()]));
        // insertion order drives fetch order
        assert_eq!(pipelines.keys().collect::<Vec<_>>(), ["web", "api"]);
    }

    #[test]
    fn pipeline_map_with_array_values() {
        let spec = BranchSpec::parse(r#"{"web": ["main", "release"]}"#).unwrap();
        let BranchSpec::Pipelines(pipelines) = spec else {
            panic!("expected pipeline map");
        };
        assert_eq!(
            pipelines.get("web"),
            Some(&vec!["main".to_string(), "release".to_string()])
        );
    }

    #[test]
    fn malformed_json_map_is_a_mapping_error() {
        let result = BranchSpec::parse(r#"{"web": "#);
        assert!(matches!(result, Err(BuildbarError::Mapping(_))));
    }

    #[test]
    fn empty_specs_are_mapping_errors() {
        assert!(matches!(BranchSpec::parse(""), Err(BuildbarError::Mapping(_))));
        assert!(matches!(BranchSpec::parse(" , ; "), Err(BuildbarError::Mapping(_))));
        assert!(matches!(BranchSpec::parse("{}"), Err(BuildbarError::Mapping(_))));
        assert!(matches!(
            BranchSpec::parse(r#"{"web": ""}"#),
            Err(BuildbarError::Mapping(_))
        ));
    }
}
