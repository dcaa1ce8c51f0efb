//! Request-serving boundary.
//!
//! Every endpoint takes a JSON body and returns an [`ApiReply`]: an
//! HTTP-style status plus a uniform [`ApiResponse`]. No error escapes a
//! handler; failures become `{ "success": false, "error": "..." }` with
//! the status from [`ShipNoteError::status_code`]. Transport is left to
//! the caller (the `api` CLI command reads stdin and prints the reply).

use clap::ValueEnum;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::changelog::ChangelogSection;
use crate::error::{Result, ShipNoteError};
use crate::git::{CommitRecord, LocalGitAdapter, RefRange};
use crate::github::{parse_github_url, DateWindow, RemoteGitHubAdapter, RepoSlug};
use crate::pipeline::{Changelog, ChangelogPipeline};
use crate::source::{DEFAULT_LOCAL_LIMIT, DEFAULT_REMOTE_LIMIT};

/// Endpoints served by [`ApiService`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Endpoint {
    /// `GET /health`
    Health,
    /// `POST /api/generate-notes`
    GenerateNotes,
    /// `POST /api/fetch-commits`
    FetchCommits,
    /// `POST /api/generate-from-repo`
    GenerateFromRepo,
    /// `POST /api/generate-from-text`
    GenerateFromText,
    /// `POST /api/github/commits`
    GithubCommits,
    /// `POST /api/github/parse-url`
    GithubParseUrl,
    /// `POST /api/github/generate-from-url`
    GithubGenerateFromUrl,
}

impl Endpoint {
    /// Route path of the endpoint.
    pub const fn path(self) -> &'static str {
        match self {
            Self::Health => "/health",
            Self::GenerateNotes => "/api/generate-notes",
            Self::FetchCommits => "/api/fetch-commits",
            Self::GenerateFromRepo => "/api/generate-from-repo",
            Self::GenerateFromText => "/api/generate-from-text",
            Self::GithubCommits => "/api/github/commits",
            Self::GithubParseUrl => "/api/github/parse-url",
            Self::GithubGenerateFromUrl => "/api/github/generate-from-url",
        }
    }

    /// Whether the endpoint calls the generation backend.
    pub const fn needs_generation(self) -> bool {
        matches!(
            self,
            Self::GenerateNotes
                | Self::GenerateFromRepo
                | Self::GenerateFromText
                | Self::GithubGenerateFromUrl
        )
    }
}

/// Body of `generate-notes`.
#[derive(Debug, Default, Deserialize)]
pub struct GenerateNotesRequest {
    /// Commits in wire shape.
    #[serde(default)]
    pub commits: Vec<CommitRecord>,
    /// Lower range bound for the prompt header.
    pub from: Option<String>,
    /// Upper range bound, `HEAD` when absent.
    pub to: Option<String>,
}

/// Body of `fetch-commits` and `generate-from-repo`.
#[derive(Debug, Default, Deserialize)]
pub struct RepoRequest {
    /// Local repository path.
    pub repo_path: Option<String>,
    /// Exclusive lower ref.
    pub from: Option<String>,
    /// Inclusive upper ref.
    pub to: Option<String>,
    /// Commit cap, 50 when absent.
    pub limit: Option<usize>,
}

/// Body of `generate-from-text`.
#[derive(Debug, Default, Deserialize)]
pub struct TextRequest {
    /// Pasted log text.
    #[serde(default)]
    pub git_log_text: String,
}

/// Body of `github/commits`.
#[derive(Debug, Default, Deserialize)]
pub struct GitHubCommitsRequest {
    /// OAuth token.
    pub access_token: Option<String>,
    /// Repository owner.
    pub owner: Option<String>,
    /// Repository name.
    pub repo: Option<String>,
    /// ISO-8601 lower bound.
    pub since: Option<String>,
    /// ISO-8601 upper bound.
    pub until: Option<String>,
    /// Commit cap, 100 when absent.
    pub limit: Option<usize>,
}

/// Body of `github/parse-url`.
#[derive(Debug, Default, Deserialize)]
pub struct ParseUrlRequest {
    /// Repository URL.
    pub url: Option<String>,
}

/// Body of `github/generate-from-url`.
#[derive(Debug, Default, Deserialize)]
pub struct GitHubUrlRequest {
    /// OAuth token.
    pub access_token: Option<String>,
    /// Repository URL.
    pub repo_url: Option<String>,
    /// ISO-8601 lower bound.
    pub since: Option<String>,
    /// ISO-8601 upper bound.
    pub until: Option<String>,
    /// Commit cap, 100 when absent.
    pub limit: Option<usize>,
}

/// Uniform reply body. Absent fields are omitted from the JSON.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiResponse {
    /// Outcome flag, absent only on `health`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    /// `"healthy"` on `health`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Failure message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Raw generated markdown.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    /// Parsed sections of `notes`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sections: Option<Vec<ChangelogSection>>,
    /// Commits fetched or used for generation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commits: Option<Vec<CommitRecord>>,
    /// Commits sent to generation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit_count: Option<usize>,
    /// Commits fetched.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    /// Parsed repository owner.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    /// Parsed repository name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repo: Option<String>,
}

impl ApiResponse {
    fn ok() -> Self {
        Self {
            success: Some(true),
            ..Self::default()
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            success: Some(false),
            error: Some(message.into()),
            ..Self::default()
        }
    }

    fn generated(changelog: Changelog, include_commits: bool) -> Self {
        let commit_count = changelog.commit_count();
        Self {
            notes: Some(changelog.notes),
            sections: Some(changelog.sections),
            commit_count: Some(commit_count),
            commits: include_commits.then_some(changelog.commits),
            ..Self::ok()
        }
    }

    fn fetched(commits: Vec<CommitRecord>) -> Self {
        Self {
            count: Some(commits.len()),
            commits: Some(commits),
            ..Self::ok()
        }
    }
}

/// Status plus body of one endpoint call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApiReply {
    /// HTTP-style status code.
    pub status: u16,
    /// JSON body.
    pub body: ApiResponse,
}

impl ApiReply {
    fn ok(body: ApiResponse) -> Self {
        Self { status: 200, body }
    }

    fn from_error(err: &ShipNoteError) -> Self {
        Self {
            status: err.status_code(),
            body: ApiResponse::failure(err.to_string()),
        }
    }

    /// Whether the call succeeded.
    pub fn is_success(&self) -> bool {
        self.status == 200
    }
}

/// Endpoint handlers over an optional generation pipeline.
///
/// Without a pipeline the non-generating endpoints still work; generating
/// ones reply 500.
pub struct ApiService {
    pipeline: Option<ChangelogPipeline>,
    github_api_base: String,
}

impl ApiService {
    /// Creates a service talking to GitHub at `github_api_base`.
    pub fn new(github_api_base: impl Into<String>) -> Self {
        Self {
            pipeline: None,
            github_api_base: github_api_base.into(),
        }
    }

    /// Attaches the generation pipeline.
    #[must_use]
    pub fn with_pipeline(mut self, pipeline: ChangelogPipeline) -> Self {
        self.pipeline = Some(pipeline);
        self
    }

    /// Handles one request. An empty body is read as `{}`.
    pub async fn dispatch(&self, endpoint: Endpoint, body: &str) -> ApiReply {
        info!(endpoint = endpoint.path(), "Handling request");
        match self.route(endpoint, body).await {
            Ok(body) => ApiReply::ok(body),
            Err(err) => {
                warn!(
                    endpoint = endpoint.path(),
                    status = err.status_code(),
                    "Request failed: {err}"
                );
                ApiReply::from_error(&err)
            }
        }
    }

    async fn route(&self, endpoint: Endpoint, body: &str) -> Result<ApiResponse> {
        match endpoint {
            Endpoint::Health => Ok(self.health()),
            Endpoint::GenerateNotes => self.generate_notes(read_body(body)?).await,
            Endpoint::FetchCommits => self.fetch_commits(read_body(body)?),
            Endpoint::GenerateFromRepo => self.generate_from_repo(read_body(body)?).await,
            Endpoint::GenerateFromText => self.generate_from_text(read_body(body)?).await,
            Endpoint::GithubCommits => self.github_commits(read_body(body)?).await,
            Endpoint::GithubParseUrl => self.parse_url(read_body(body)?),
            Endpoint::GithubGenerateFromUrl => self.generate_from_url(read_body(body)?).await,
        }
    }

    /// `health`
    pub fn health(&self) -> ApiResponse {
        ApiResponse {
            status: Some("healthy".to_string()),
            ..ApiResponse::default()
        }
    }

    /// `generate-notes`
    pub async fn generate_notes(&self, request: GenerateNotesRequest) -> Result<ApiResponse> {
        if request.commits.is_empty() {
            return Err(ShipNoteError::validation("No commits provided"));
        }
        let changelog = self
            .pipeline()?
            .from_commits(request.commits, request.from.as_deref(), request.to.as_deref())
            .await?;
        Ok(ApiResponse::generated(changelog, false))
    }

    /// `fetch-commits`
    pub fn fetch_commits(&self, request: RepoRequest) -> Result<ApiResponse> {
        let repo_path = required(request.repo_path, "Repository path is required")?;
        let range = RefRange::new(request.from, request.to);
        let commits = LocalGitAdapter::new(repo_path)
            .normalize(&range, request.limit.unwrap_or(DEFAULT_LOCAL_LIMIT))?;
        Ok(ApiResponse::fetched(commits))
    }

    /// `generate-from-repo`
    pub async fn generate_from_repo(&self, request: RepoRequest) -> Result<ApiResponse> {
        let repo_path = required(request.repo_path, "Repository path is required")?;
        let range = RefRange::new(request.from, request.to);
        let changelog = self
            .pipeline()?
            .from_repo(repo_path, range, request.limit)
            .await?;
        Ok(ApiResponse::generated(changelog, true))
    }

    /// `generate-from-text`
    pub async fn generate_from_text(&self, request: TextRequest) -> Result<ApiResponse> {
        if request.git_log_text.trim().is_empty() {
            return Err(ShipNoteError::validation("No git log text provided"));
        }
        let changelog = self.pipeline()?.from_text(&request.git_log_text).await?;
        Ok(ApiResponse::generated(changelog, false))
    }

    /// `github/commits`
    pub async fn github_commits(&self, request: GitHubCommitsRequest) -> Result<ApiResponse> {
        let access_token = required(request.access_token, "Access token is required")?;
        let (owner, repo) = match (non_blank(request.owner), non_blank(request.repo)) {
            (Some(owner), Some(repo)) => (owner, repo),
            _ => {
                return Err(ShipNoteError::validation(
                    "Owner and repository name are required",
                ))
            }
        };

        let adapter = RemoteGitHubAdapter::with_api_base(access_token, self.github_api_base.as_str())
            .map_err(|e| ShipNoteError::RemoteApi(format!("{e:#}")))?;
        let window = DateWindow {
            since: request.since,
            until: request.until,
        };
        let remote = adapter
            .normalize(
                &RepoSlug::new(owner, repo),
                &window,
                request.limit.unwrap_or(DEFAULT_REMOTE_LIMIT),
            )
            .await?;
        Ok(ApiResponse::fetched(remote.commits))
    }

    /// `github/parse-url`
    pub fn parse_url(&self, request: ParseUrlRequest) -> Result<ApiResponse> {
        let url = required(request.url, "URL is required")?;
        let slug = parse_github_url(&url).ok_or(ShipNoteError::MalformedUrl(url))?;
        Ok(ApiResponse {
            owner: Some(slug.owner),
            repo: Some(slug.repo),
            ..ApiResponse::ok()
        })
    }

    /// `github/generate-from-url`
    pub async fn generate_from_url(&self, request: GitHubUrlRequest) -> Result<ApiResponse> {
        let access_token = required(request.access_token, "Access token is required")?;
        let repo_url = required(request.repo_url, "Repository URL is required")?;
        let window = DateWindow {
            since: request.since,
            until: request.until,
        };
        let changelog = self
            .pipeline()?
            .from_github_url(
                &access_token,
                &repo_url,
                window,
                request.limit,
                &self.github_api_base,
            )
            .await?;
        Ok(ApiResponse::generated(changelog, true))
    }

    fn pipeline(&self) -> Result<&ChangelogPipeline> {
        self.pipeline.as_ref().ok_or_else(|| {
            ShipNoteError::GenerationBackend("Generation backend is not configured".to_string())
        })
    }
}

fn read_body<T: DeserializeOwned + Default>(body: &str) -> Result<T> {
    if body.trim().is_empty() {
        return Ok(T::default());
    }
    serde_json::from_str(body)
        .map_err(|e| ShipNoteError::validation(format!("Invalid request body: {e}")))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn required(value: Option<String>, message: &str) -> Result<String> {
    non_blank(value).ok_or_else(|| ShipNoteError::validation(message))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::test_utils::{ConfigurableMockAiClient, PromptRecordHandle};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const NOTES: &str = "## Fixes:\n- Fixed login - by Unknown ()\n";

    fn service_with_notes() -> (ApiService, PromptRecordHandle) {
        let mock = ConfigurableMockAiClient::new(vec![Ok(NOTES.to_string())]);
        let handle = mock.prompt_handle();
        let service = ApiService::new("http://127.0.0.1:9")
            .with_pipeline(ChangelogPipeline::new(Box::new(mock)));
        (service, handle)
    }

    fn json(reply: &ApiReply) -> serde_json::Value {
        serde_json::to_value(&reply.body).unwrap()
    }

    #[test]
    fn endpoint_paths_and_generation_flags() {
        assert_eq!(Endpoint::Health.path(), "/health");
        assert_eq!(Endpoint::GithubParseUrl.path(), "/api/github/parse-url");
        assert_eq!(Endpoint::GithubGenerateFromUrl.path(), "/api/github/generate-from-url");
        assert!(Endpoint::GenerateFromText.needs_generation());
        assert!(!Endpoint::GithubParseUrl.needs_generation());
    }

    #[tokio::test]
    async fn health_reports_healthy() {
        let reply = ApiService::new("http://127.0.0.1:9")
            .dispatch(Endpoint::Health, "")
            .await;
        assert_eq!(reply.status, 200);
        assert_eq!(json(&reply), serde_json::json!({ "status": "healthy" }));
    }

    #[tokio::test]
    async fn generate_notes_requires_commits() {
        let (service, handle) = service_with_notes();
        let reply = service
            .dispatch(Endpoint::GenerateNotes, r#"{"commits": []}"#)
            .await;
        assert_eq!(reply.status, 400);
        assert_eq!(
            json(&reply),
            serde_json::json!({ "success": false, "error": "No commits provided" })
        );
        assert_eq!(handle.request_count(), 0);
    }

    #[tokio::test]
    async fn generate_notes_returns_notes_and_count() {
        let (service, handle) = service_with_notes();
        let reply = service
            .dispatch(
                Endpoint::GenerateNotes,
                r#"{"commits":[{"hash":"a83b1c9","message":"fix: login","author":"Jane","date":"Nov 08, 03:24 PM"}],"from":"v1.0.0"}"#,
            )
            .await;

        assert!(reply.is_success());
        let body = json(&reply);
        assert_eq!(body["success"], true);
        assert_eq!(body["notes"], NOTES);
        assert_eq!(body["commit_count"], 1);
        assert_eq!(body["sections"][0]["category_name"], "Fixes");
        assert!(body.get("commits").is_none());

        let (_, user) = &handle.prompts()[0];
        assert!(user.contains("Commits from v1.0.0 to HEAD:"));
        assert!(user.contains("- fix: login - by Jane (Nov 08, 03:24 PM)"));
    }

    #[tokio::test]
    async fn generate_from_text_validation_messages() {
        let (service, _) = service_with_notes();
        let reply = service
            .dispatch(Endpoint::GenerateFromText, r#"{"git_log_text": "   "}"#)
            .await;
        assert_eq!(reply.status, 400);
        assert_eq!(reply.body.error.as_deref(), Some("No git log text provided"));

        let reply = service.dispatch(Endpoint::GenerateFromText, "{}").await;
        assert_eq!(reply.body.error.as_deref(), Some("No git log text provided"));
    }

    #[tokio::test]
    async fn generate_from_text_success() {
        let (service, _) = service_with_notes();
        let reply = service
            .dispatch(
                Endpoint::GenerateFromText,
                r#"{"git_log_text": "a83b1c9 fix(auth): resolve bug\nb1d4e2a feat(ui): add toggle"}"#,
            )
            .await;
        assert!(reply.is_success());
        assert_eq!(reply.body.commit_count, Some(2));
        assert_eq!(reply.body.notes.as_deref(), Some(NOTES));
    }

    #[tokio::test]
    async fn malformed_body_is_bad_request() {
        let (service, _) = service_with_notes();
        let reply = service.dispatch(Endpoint::GenerateNotes, "{ nope").await;
        assert_eq!(reply.status, 400);
        assert!(reply
            .body
            .error
            .as_deref()
            .unwrap_or_default()
            .starts_with("Invalid request body"));
    }

    #[tokio::test]
    async fn repo_endpoints_require_path() {
        let (service, _) = service_with_notes();
        for endpoint in [Endpoint::FetchCommits, Endpoint::GenerateFromRepo] {
            let reply = service.dispatch(endpoint, r#"{"repo_path": ""}"#).await;
            assert_eq!(reply.status, 400);
            assert_eq!(reply.body.error.as_deref(), Some("Repository path is required"));
        }
    }

    #[tokio::test]
    async fn fetch_commits_from_missing_repo_is_server_error() {
        let dir = tempfile::tempdir().unwrap();
        let body = serde_json::json!({ "repo_path": dir.path() }).to_string();
        let reply = ApiService::new("http://127.0.0.1:9")
            .dispatch(Endpoint::FetchCommits, &body)
            .await;
        assert_eq!(reply.status, 500);
        assert_eq!(reply.body.success, Some(false));
    }

    #[tokio::test]
    async fn parse_url_replies() {
        let service = ApiService::new("http://127.0.0.1:9");

        let reply = service
            .dispatch(
                Endpoint::GithubParseUrl,
                r#"{"url": "git@github.com:acme/widgets.git"}"#,
            )
            .await;
        assert_eq!(
            json(&reply),
            serde_json::json!({ "success": true, "owner": "acme", "repo": "widgets" })
        );

        let reply = service
            .dispatch(Endpoint::GithubParseUrl, r#"{"url": "https://gitlab.com/a/b"}"#)
            .await;
        assert_eq!(reply.status, 400);
        assert_eq!(reply.body.error.as_deref(), Some("Invalid GitHub URL format"));

        let reply = service.dispatch(Endpoint::GithubParseUrl, "{}").await;
        assert_eq!(reply.body.error.as_deref(), Some("URL is required"));
    }

    #[tokio::test]
    async fn github_commits_validation_order() {
        let service = ApiService::new("http://127.0.0.1:9");
        let reply = service
            .dispatch(Endpoint::GithubCommits, r#"{"owner": "acme", "repo": "widgets"}"#)
            .await;
        assert_eq!(reply.body.error.as_deref(), Some("Access token is required"));

        let reply = service
            .dispatch(Endpoint::GithubCommits, r#"{"access_token": "t", "owner": "acme"}"#)
            .await;
        assert_eq!(
            reply.body.error.as_deref(),
            Some("Owner and repository name are required")
        );
    }

    #[tokio::test]
    async fn github_commits_maps_remote_statuses() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/repos/acme/private/commits"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/repos/acme/widgets/commits"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"[{"sha":"5e0314ddd2a0e3d8712917994ceaab64c36328ff","commit":{"message":"fix: crash"}}]"#,
            ))
            .mount(&server)
            .await;

        let service = ApiService::new(server.uri());
        let reply = service
            .dispatch(
                Endpoint::GithubCommits,
                r#"{"access_token": "t", "owner": "acme", "repo": "private"}"#,
            )
            .await;
        assert_eq!(reply.status, 400);
        assert_eq!(
            reply.body.error.as_deref(),
            Some("Repository not found or you don't have access")
        );

        let reply = service
            .dispatch(
                Endpoint::GithubCommits,
                r#"{"access_token": "t", "owner": "acme", "repo": "widgets"}"#,
            )
            .await;
        let body = json(&reply);
        assert_eq!(body["count"], 1);
        assert_eq!(body["commits"][0]["hash"], "5e0314d");
        assert_eq!(body["commits"][0]["author"], "Unknown");
    }

    #[tokio::test]
    async fn generate_from_url_requires_token_and_url() {
        let (service, _) = service_with_notes();
        let reply = service
            .dispatch(Endpoint::GithubGenerateFromUrl, r#"{"access_token": "t"}"#)
            .await;
        assert_eq!(reply.body.error.as_deref(), Some("Repository URL is required"));

        let reply = service
            .dispatch(
                Endpoint::GithubGenerateFromUrl,
                r#"{"access_token": "t", "repo_url": "not a url"}"#,
            )
            .await;
        assert_eq!(reply.status, 400);
        assert_eq!(reply.body.error.as_deref(), Some("Invalid GitHub URL format"));
    }

    #[tokio::test]
    async fn generating_without_pipeline_is_server_error() {
        let reply = ApiService::new("http://127.0.0.1:9")
            .dispatch(Endpoint::GenerateFromText, r#"{"git_log_text": "wip"}"#)
            .await;
        assert_eq!(reply.status, 500);
        assert_eq!(
            reply.body.error.as_deref(),
            Some("Generation backend is not configured")
        );
    }
}
