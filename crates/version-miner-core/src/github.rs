//! GitHub REST API client
//!
//! Implements [`RepoGateway`] on top of `reqwest`. Existence checks decode
//! the JSON body and compare names case-insensitively, since GitHub resolves
//! owner, repository and branch names without regard to case.
//!
//! Request URLs are built segment by segment on top of the configured base
//! URL, so owner, repository, branch and path components are percent-encoded
//! individually and never merge into a different endpoint.

use crate::casefold::eq_ignore_case;
use crate::error::GatewayError;
use crate::gateway::{GatewayResult, RepoGateway};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{ClientBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

/// Public GitHub API endpoint
pub const DEFAULT_API_URL: &str = "https://api.github.com";

const JSON_MEDIA_TYPE: &str = "application/vnd.github.v3+json";
const RAW_MEDIA_TYPE: &str = "application/vnd.github.v3.raw";

/// GitHub client configuration
#[derive(Debug, Clone)]
pub struct GitHubConfig {
    /// API base URL, without a trailing slash
    pub api_url: String,
    /// Bearer token (optional for public repositories)
    pub token: Option<String>,
    /// Sent as `User-Agent`, which GitHub requires
    pub user_agent: String,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        GitHubConfig {
            api_url: DEFAULT_API_URL.to_string(),
            token: None,
            user_agent: format!("version-miner/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl GitHubConfig {
    /// Create config for a specific API host
    pub fn new(api_url: &str) -> Self {
        GitHubConfig {
            api_url: api_url.trim_end_matches('/').to_string(),
            ..GitHubConfig::default()
        }
    }

    /// Set authentication token
    pub fn with_token(mut self, token: &str) -> Self {
        self.token = Some(token.to_string());
        self
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct OwnerInfo {
    pub login: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct RepoInfo {
    pub name: String,
    pub owner: OwnerInfo,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct BranchInfo {
    pub name: String,
}

/// How a GET resolved, before the body is interpreted
#[derive(Debug)]
enum Fetched {
    Found(String),
    Missing,
}

/// GitHub client for repository lookups
pub struct GitHubGateway {
    config: GitHubConfig,
    base_url: Url,
    http_client: reqwest::Client,
}

impl GitHubGateway {
    /// Create a new GitHub client
    pub fn new(config: GitHubConfig) -> GatewayResult<Self> {
        let http_client = client_builder(&config)?.build()?;
        Self::with_client(config, http_client)
    }

    fn with_client(config: GitHubConfig, http_client: reqwest::Client) -> GatewayResult<Self> {
        let base_url = parse_base_url(&config.api_url)?;
        Ok(GitHubGateway {
            config,
            base_url,
            http_client,
        })
    }

    pub fn config(&self) -> &GitHubConfig {
        &self.config
    }

    /// `{api_url}/{segments...}` with every segment percent-encoded.
    fn endpoint<'s>(&self, segments: impl IntoIterator<Item = &'s str>) -> Url {
        let mut url = self.base_url.clone();
        // parse_base_url rejected cannot-be-a-base URLs
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn get(&self, url: Url, accept: &'static str) -> GatewayResult<Fetched> {
        debug!(url = %url, "GET");
        let response = self
            .http_client
            .get(url.clone())
            .header(ACCEPT, accept)
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        classify(status, url.as_str(), body)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> GatewayResult<Option<T>> {
        let display = url.to_string();
        match self.get(url, JSON_MEDIA_TYPE).await? {
            Fetched::Found(body) => decode(&display, &body).map(Some),
            Fetched::Missing => Ok(None),
        }
    }
}

fn client_builder(config: &GitHubConfig) -> GatewayResult<ClientBuilder> {
    Ok(reqwest::Client::builder()
        .user_agent(config.user_agent.clone())
        .default_headers(default_headers(config.token.as_deref())?))
}

fn parse_base_url(api_url: &str) -> GatewayResult<Url> {
    let invalid = |message: String| GatewayError::InvalidUrl {
        url: api_url.to_string(),
        message,
    };

    let url = Url::parse(api_url).map_err(|e| invalid(e.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(invalid("URL cannot carry a path".to_string()));
    }
    Ok(url)
}

fn default_headers(token: Option<&str>) -> GatewayResult<HeaderMap> {
    let mut headers = HeaderMap::new();
    if let Some(token) = token {
        let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|e| GatewayError::Transport(format!("invalid repo token: {e}")))?;
        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);
    }
    Ok(headers)
}

fn classify(status: StatusCode, url: &str, body: String) -> GatewayResult<Fetched> {
    if status == StatusCode::NOT_FOUND {
        Ok(Fetched::Missing)
    } else if status.is_success() {
        Ok(Fetched::Found(body))
    } else {
        Err(GatewayError::RequestFailed {
            status: status.as_u16(),
            url: url.to_string(),
        })
    }
}

fn decode<T: DeserializeOwned>(url: &str, body: &str) -> GatewayResult<T> {
    serde_json::from_str(body).map_err(|e| GatewayError::Decode {
        url: url.to_string(),
        message: e.to_string(),
    })
}

#[async_trait]
impl RepoGateway for GitHubGateway {
    async fn owner_exists(&self, owner: &str) -> GatewayResult<bool> {
        let url = self.endpoint(["users", owner]);
        let info: Option<OwnerInfo> = self.get_json(url).await?;
        Ok(info.is_some_and(|o| eq_ignore_case(&o.login, owner)))
    }

    async fn repo_exists(&self, owner: &str, repo: &str) -> GatewayResult<bool> {
        let url = self.endpoint(["repos", owner, repo]);
        let info: Option<RepoInfo> = self.get_json(url).await?;
        Ok(info.is_some_and(|r| {
            eq_ignore_case(&r.name, repo) && eq_ignore_case(&r.owner.login, owner)
        }))
    }

    async fn branch_exists(&self, owner: &str, repo: &str, branch: &str) -> GatewayResult<bool> {
        // `branches/` with no name is the branch list endpoint
        if branch.trim().is_empty() {
            debug!(owner = %owner, repo = %repo, "Empty branch name, skipping lookup");
            return Ok(false);
        }

        let mut segments = vec!["repos", owner, repo, "branches"];
        segments.extend(branch.split('/'));
        let info: Option<BranchInfo> = self.get_json(self.endpoint(segments)).await?;
        Ok(info.is_some_and(|b| eq_ignore_case(&b.name, branch)))
    }

    async fn file_content(
        &self,
        owner: &str,
        repo: &str,
        branch: &str,
        path: &str,
    ) -> GatewayResult<String> {
        let mut segments = vec!["repos", owner, repo, "contents"];
        segments.extend(path.split('/'));
        let mut url = self.endpoint(segments);
        url.query_pairs_mut().append_pair("ref", branch);

        let display = url.to_string();
        match self.get(url, RAW_MEDIA_TYPE).await? {
            Fetched::Found(body) => Ok(body),
            Fetched::Missing => Err(GatewayError::NotFound { url: display }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    /// Minimal HTTP/1.1 server answering fixed routes and recording each
    /// request head it receives. Unknown routes answer 404.
    struct MockGitHub {
        base_url: String,
        requests: Arc<Mutex<Vec<String>>>,
    }

    impl MockGitHub {
        async fn start(routes: &[(&str, u16, &str)]) -> Self {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            let base_url = format!("http://{}", listener.local_addr().unwrap());
            let routes: Vec<(String, u16, String)> = routes
                .iter()
                .map(|(target, status, body)| (target.to_string(), *status, body.to_string()))
                .collect();
            let requests = Arc::new(Mutex::new(Vec::new()));
            let seen = requests.clone();

            tokio::spawn(async move {
                while let Ok((mut socket, _)) = listener.accept().await {
                    let head = read_head(&mut socket).await;
                    let target = head.split_whitespace().nth(1).unwrap_or_default().to_string();
                    seen.lock().unwrap().push(head);

                    let (status, body) = routes
                        .iter()
                        .find(|(t, _, _)| *t == target)
                        .map(|(_, status, body)| (*status, body.clone()))
                        .unwrap_or((404, r#"{"message":"Not Found"}"#.to_string()));
                    let response = format!(
                        "HTTP/1.1 {status} {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                        reason(status),
                        body.len()
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                    let _ = socket.shutdown().await;
                }
            });

            MockGitHub { base_url, requests }
        }

        fn gateway(&self, token: Option<&str>) -> GitHubGateway {
            let mut config = GitHubConfig::new(&self.base_url);
            if let Some(token) = token {
                config = config.with_token(token);
            }
            let client = client_builder(&config).unwrap().no_proxy().build().unwrap();
            GitHubGateway::with_client(config, client).unwrap()
        }

        fn requests(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }

        fn request_lines(&self) -> Vec<String> {
            self.requests()
                .iter()
                .map(|head| head.lines().next().unwrap_or_default().to_string())
                .collect()
        }
    }

    async fn read_head(socket: &mut TcpStream) -> String {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
            match socket.read(&mut chunk).await {
                Ok(0) | Err(_) => break,
                Ok(n) => buf.extend_from_slice(&chunk[..n]),
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    }

    fn reason(status: u16) -> &'static str {
        match status {
            200 => "OK",
            404 => "Not Found",
            _ => "Error",
        }
    }

    #[test]
    fn test_github_config_default() {
        let config = GitHubConfig::default();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert!(config.token.is_none());
        assert!(config.user_agent.starts_with("version-miner/"));
    }

    #[test]
    fn test_github_config_trims_trailing_slash() {
        let config = GitHubConfig::new("https://github.example.com/api/v3///");
        assert_eq!(config.api_url, "https://github.example.com/api/v3");
    }

    #[test]
    fn test_github_config_with_token() {
        let config = GitHubConfig::default().with_token("secret-token");
        assert_eq!(config.token, Some("secret-token".to_string()));
    }

    #[test]
    fn test_invalid_api_url_is_rejected() {
        let err = GitHubGateway::new(GitHubConfig::new("not a url")).err().unwrap();
        assert!(matches!(err, GatewayError::InvalidUrl { .. }));

        let err = GitHubGateway::new(GitHubConfig::new("mailto:octo@example.com"))
            .err()
            .unwrap();
        assert!(matches!(err, GatewayError::InvalidUrl { .. }));
    }

    #[test]
    fn test_endpoint_joins_segments() {
        let gateway = GitHubGateway::new(GitHubConfig::new("https://api.example.com/")).unwrap();
        assert_eq!(
            gateway.endpoint(["users", "octo"]).as_str(),
            "https://api.example.com/users/octo"
        );

        let gateway =
            GitHubGateway::new(GitHubConfig::new("https://ghe.example.com/api/v3")).unwrap();
        assert_eq!(
            gateway.endpoint(["repos", "octo", "repo"]).as_str(),
            "https://ghe.example.com/api/v3/repos/octo/repo"
        );
    }

    #[test]
    fn test_endpoint_encodes_each_segment() {
        let gateway = GitHubGateway::new(GitHubConfig::default()).unwrap();
        let mut segments = vec!["repos", "octo", "repo", "contents"];
        segments.extend("src/My App/a#b?.csproj".split('/'));
        assert_eq!(
            gateway.endpoint(segments).path(),
            "/repos/octo/repo/contents/src/My%20App/a%23b%3F.csproj"
        );

        let mut segments = vec!["repos", "octo", "repo", "contents"];
        segments.extend("a//b".split('/'));
        assert_eq!(gateway.endpoint(segments).path(), "/repos/octo/repo/contents/a//b");
    }

    #[test]
    fn test_token_header_is_bearer() {
        let headers = default_headers(Some("abc")).unwrap();
        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer abc");
        assert!(default_headers(None).unwrap().is_empty());
    }

    #[test]
    fn test_classify_statuses() {
        let url = "https://api.github.com/x";
        assert!(matches!(
            classify(StatusCode::OK, url, "body".to_string()).unwrap(),
            Fetched::Found(body) if body == "body"
        ));
        assert!(matches!(
            classify(StatusCode::NOT_FOUND, url, String::new()).unwrap(),
            Fetched::Missing
        ));
        let err = classify(StatusCode::FORBIDDEN, url, String::new()).unwrap_err();
        assert!(matches!(err, GatewayError::RequestFailed { status: 403, .. }));
    }

    #[test]
    fn test_decode_models() {
        let repo: RepoInfo = decode(
            "u",
            r#"{"id": 1, "name": "Velaptor", "owner": {"login": "KinsonDigital", "id": 2}}"#,
        )
        .unwrap();
        assert_eq!(repo.name, "Velaptor");
        assert_eq!(repo.owner.login, "KinsonDigital");

        let err = decode::<BranchInfo>("u", "not json").unwrap_err();
        assert!(matches!(err, GatewayError::Decode { .. }));
    }

    #[tokio::test]
    async fn test_owner_exists_sends_token_and_json_accept() {
        let server = MockGitHub::start(&[("/users/octo", 200, r#"{"login":"Octo","id":1}"#)]).await;
        let gateway = server.gateway(Some("secret-token"));

        assert!(gateway.owner_exists("octo").await.unwrap());

        let requests = server.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(server.request_lines(), ["GET /users/octo HTTP/1.1"]);
        let head = requests[0].to_ascii_lowercase();
        assert!(head.contains("authorization: bearer secret-token"), "{head}");
        assert!(head.contains("accept: application/vnd.github.v3+json"), "{head}");
        assert!(head.contains("user-agent: version-miner/"), "{head}");
    }

    #[tokio::test]
    async fn test_no_authorization_header_without_token() {
        let server = MockGitHub::start(&[("/users/octo", 200, r#"{"login":"octo"}"#)]).await;
        assert!(server.gateway(None).owner_exists("octo").await.unwrap());
        let head = server.requests()[0].to_ascii_lowercase();
        assert!(!head.contains("authorization:"), "{head}");
    }

    #[tokio::test]
    async fn test_existence_checks_treat_404_as_missing() {
        let server = MockGitHub::start(&[]).await;
        let gateway = server.gateway(None);

        assert!(!gateway.owner_exists("ghost").await.unwrap());
        assert!(!gateway.repo_exists("octo", "ghost").await.unwrap());
        assert!(!gateway.branch_exists("octo", "repo", "ghost").await.unwrap());
        assert_eq!(
            server.request_lines(),
            [
                "GET /users/ghost HTTP/1.1",
                "GET /repos/octo/ghost HTTP/1.1",
                "GET /repos/octo/repo/branches/ghost HTTP/1.1",
            ]
        );
    }

    #[tokio::test]
    async fn test_existence_checks_compare_returned_names() {
        let server = MockGitHub::start(&[
            ("/users/octo", 200, r#"{"login":"someone-else"}"#),
            (
                "/repos/octo/repo",
                200,
                r#"{"name":"other","owner":{"login":"octo"}}"#,
            ),
            (
                "/repos/octo/Repo",
                200,
                r#"{"name":"REPO","owner":{"login":"OCTO"}}"#,
            ),
            ("/repos/octo/repo/branches/main", 200, r#"{"name":"develop"}"#),
            (
                "/repos/octo/repo/branches/feature/x",
                200,
                r#"{"name":"Feature/X"}"#,
            ),
        ])
        .await;
        let gateway = server.gateway(None);

        assert!(!gateway.owner_exists("octo").await.unwrap());
        assert!(!gateway.repo_exists("octo", "repo").await.unwrap());
        assert!(gateway.repo_exists("octo", "Repo").await.unwrap());
        assert!(!gateway.branch_exists("octo", "repo", "main").await.unwrap());
        assert!(gateway.branch_exists("octo", "repo", "feature/x").await.unwrap());
    }

    #[tokio::test]
    async fn test_error_status_is_request_failure() {
        let server = MockGitHub::start(&[
            ("/users/octo", 500, r#"{"message":"boom"}"#),
            ("/repos/octo/repo", 403, r#"{"message":"rate limited"}"#),
        ])
        .await;
        let gateway = server.gateway(None);

        let err = gateway.owner_exists("octo").await.unwrap_err();
        assert!(matches!(err, GatewayError::RequestFailed { status: 500, .. }));

        let err = gateway.repo_exists("octo", "repo").await.unwrap_err();
        match err {
            GatewayError::RequestFailed { status, url } => {
                assert_eq!(status, 403);
                assert!(url.ends_with("/repos/octo/repo"), "{url}");
            }
            other => panic!("expected request failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_empty_branch_is_missing_without_request() {
        let server = MockGitHub::start(&[("/repos/octo/repo/branches/", 200, "[]")]).await;
        let gateway = server.gateway(None);

        assert!(!gateway.branch_exists("octo", "repo", "").await.unwrap());
        assert!(!gateway.branch_exists("octo", "repo", "  ").await.unwrap());
        assert!(server.requests().is_empty());
    }

    #[tokio::test]
    async fn test_file_content_requests_raw_media_type() {
        let server = MockGitHub::start(&[(
            "/repos/octo/repo/contents/src/App.csproj?ref=main",
            200,
            "<Project><PropertyGroup><Version>1.2.3</Version></PropertyGroup></Project>",
        )])
        .await;
        let gateway = server.gateway(Some("secret-token"));

        let body = gateway
            .file_content("octo", "repo", "main", "src/App.csproj")
            .await
            .unwrap();
        assert!(body.contains("<Version>1.2.3</Version>"));

        assert_eq!(
            server.request_lines(),
            ["GET /repos/octo/repo/contents/src/App.csproj?ref=main HTTP/1.1"]
        );
        let head = server.requests()[0].to_ascii_lowercase();
        assert!(head.contains("accept: application/vnd.github.v3.raw"), "{head}");
        assert!(head.contains("authorization: bearer secret-token"), "{head}");
    }

    #[tokio::test]
    async fn test_file_content_encodes_branch_query() {
        let server = MockGitHub::start(&[(
            "/repos/octo/repo/contents/App.csproj?ref=release%2F1.0",
            200,
            "<Project/>",
        )])
        .await;
        let gateway = server.gateway(None);

        let body = gateway
            .file_content("octo", "repo", "release/1.0", "App.csproj")
            .await
            .unwrap();
        assert_eq!(body, "<Project/>");
    }

    #[tokio::test]
    async fn test_file_content_404_is_not_found() {
        let server = MockGitHub::start(&[]).await;
        let gateway = server.gateway(None);

        let err = gateway
            .file_content("octo", "repo", "main", "missing.csproj")
            .await
            .unwrap_err();
        match err {
            GatewayError::NotFound { url } => {
                assert!(url.ends_with("/repos/octo/repo/contents/missing.csproj?ref=main"), "{url}")
            }
            other => panic!("expected not found, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_file_content_error_status() {
        let server = MockGitHub::start(&[(
            "/repos/octo/repo/contents/App.csproj?ref=main",
            502,
            "bad gateway",
        )])
        .await;
        let err = server
            .gateway(None)
            .file_content("octo", "repo", "main", "App.csproj")
            .await
            .unwrap_err();
        assert!(matches!(err, GatewayError::RequestFailed { status: 502, .. }));
    }
}
