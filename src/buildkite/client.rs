use log::debug;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, USER_AGENT};
use serde::de::DeserializeOwned;
use url::Url;

use crate::error::{BuildbarError, Result};

use super::types::{RawBuild, User};

pub const DEFAULT_API_URL: &str = "https://api.buildkite.com";

/// Buildkite REST API v2 client.
///
/// Carries the bearer token in default headers; the base URL is injectable
/// so tests can point it at a local mock server.
pub struct BuildkiteClient {
    client: reqwest::Client,
    base_url: Url,
}

impl BuildkiteClient {
    pub fn new(base_url: &str, api_token: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_static(concat!("buildbar/", env!("CARGO_PKG_VERSION"))),
        );
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let auth = HeaderValue::from_str(&format!("Bearer {api_token}")).map_err(|e| {
            BuildbarError::Config(format!("API token is not a valid header value: {e}"))
        })?;
        headers.insert(AUTHORIZATION, auth);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| BuildbarError::Config(format!("Failed to create HTTP client: {e}")))?;

        let base_url = Url::parse(base_url)
            .map_err(|e| BuildbarError::Config(format!("Invalid API base URL: {e}")))?;

        Ok(Self { client, base_url })
    }

    /// `GET /v2/user` — whoami for the configured token.
    pub async fn current_user(&self) -> Result<User> {
        self.get_json(self.endpoint("v2/user")?).await
    }

    /// `GET /v2/organizations/{org}/builds/?creator={user_id}`
    pub async fn builds_by_creator(&self, org: &str, user_id: &str) -> Result<Vec<RawBuild>> {
        let mut url = self.builds_endpoint(org, None)?;
        url.query_pairs_mut().append_pair("creator", user_id);
        self.get_json(url).await
    }

    /// Fetch builds filtered by branch, organization-wide or scoped to one
    /// pipeline. Several branches query with OR semantics.
    pub async fn branch_builds(
        &self,
        org: &str,
        branches: &[String],
        pipeline: Option<&str>,
    ) -> Result<Vec<RawBuild>> {
        let mut url = self.builds_endpoint(org, pipeline)?;
        append_branch_query(&mut url, branches);
        self.get_json(url).await
    }

    fn builds_endpoint(&self, org: &str, pipeline: Option<&str>) -> Result<Url> {
        let path = match pipeline {
            Some(pipeline) => format!("v2/organizations/{org}/pipelines/{pipeline}/builds"),
            None => format!("v2/organizations/{org}/builds/"),
        };
        self.endpoint(&path)
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|e| BuildbarError::Config(format!("Invalid API endpoint {path:?}: {e}")))
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T> {
        debug!("GET {}", url.path());

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            return Err(BuildbarError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

// One branch keeps the scalar `branch=` form; several become repeated
// `branch[]=` pairs in the order configured.
fn append_branch_query(url: &mut Url, branches: &[String]) {
    let mut pairs = url.query_pairs_mut();
    match branches {
        [single] => {
            pairs.append_pair("branch", single);
        }
        many => {
            for branch in many {
                pairs.append_pair("branch[]", branch);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn client_for(server: &mockito::ServerGuard) -> BuildkiteClient {
        BuildkiteClient::new(&server.url(), "test-token").unwrap()
    }

    fn build_body(number: u64, branch: &str) -> serde_json::Value {
        serde_json::json!({
            "id": format!("b-{number}"),
            "web_url": format!("https://buildkite.com/acme/web/builds/{number}"),
            "url": format!("https://api.buildkite.com/v2/organizations/acme/pipelines/web/builds/{number}"),
            "number": number,
            "state": "passed",
            "message": "Fix login flow",
            "branch": branch,
            "created_at": "2024-03-01T10:00:00.000Z",
            "finished_at": "2024-03-01T10:05:00.000Z"
        })
    }

    #[test]
    fn single_branch_uses_the_scalar_form() {
        let mut url = Url::parse("https://api.buildkite.com/v2/organizations/acme/builds/").unwrap();
        append_branch_query(&mut url, &["main".to_string()]);
        assert_eq!(url.query(), Some("branch=main"));
    }

    #[test]
    fn several_branches_repeat_the_array_form_in_order() {
        let mut url = Url::parse("https://api.buildkite.com/v2/organizations/acme/builds/").unwrap();
        append_branch_query(&mut url, &["main".to_string(), "release".to_string()]);
        assert_eq!(url.query(), Some("branch%5B%5D=main&branch%5B%5D=release"));
    }

    #[tokio::test]
    async fn current_user_sends_the_bearer_token() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/v2/user")
            .match_header("authorization", "Bearer test-token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id": "user-123", "name": "Test User"}"#)
            .create_async()
            .await;

        let user = client_for(&server).current_user().await.unwrap();

        mock.assert_async().await;
        assert_eq!(user.id, "user-123");
        assert_eq!(user.name.as_deref(), Some("Test User"));
    }

    #[tokio::test]
    async fn builds_by_creator_filters_on_the_user_id() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/v2/organizations/acme/builds/")
            .match_query(Matcher::UrlEncoded("creator".into(), "user-123".into()))
            .with_status(200)
            .with_body(serde_json::json!([build_body(1, "main")]).to_string())
            .create_async()
            .await;

        let builds = client_for(&server)
            .builds_by_creator("acme", "user-123")
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(builds.len(), 1);
        assert_eq!(builds[0]["number"], 1);
    }

    #[tokio::test]
    async fn branch_builds_hit_the_pipeline_endpoint_when_scoped() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/v2/organizations/acme/pipelines/web/builds")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("branch[]".into(), "main".into()),
                Matcher::UrlEncoded("branch[]".into(), "release".into()),
            ]))
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        let builds = client_for(&server)
            .branch_builds(
                "acme",
                &["main".to_string(), "release".to_string()],
                Some("web"),
            )
            .await
            .unwrap();

        mock.assert_async().await;
        assert!(builds.is_empty());
    }

    #[tokio::test]
    async fn unauthorized_surfaces_the_http_status() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/v2/user")
            .with_status(401)
            .with_body(r#"{"message": "Authorization failed"}"#)
            .create_async()
            .await;

        let result = client_for(&server).current_user().await;

        match result {
            Err(BuildbarError::Api { status, message }) => {
                assert_eq!(status, 401);
                assert!(message.contains("Authorization failed"));
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn malformed_json_body_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/v2/user")
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let result = client_for(&server).current_user().await;
        assert!(matches!(result, Err(BuildbarError::Json(_))));
    }
}
