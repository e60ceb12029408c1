use async_trait::async_trait;
use base64::prelude::{BASE64_STANDARD, Engine as _};
use reqwest::{
    Client, Method, RequestBuilder, Response, Url,
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::ConnectionSettings;
use crate::domain::issue::{Comment, Issue, IssueSummary};
use crate::domain::user::User;
use crate::error::{AppError, AppResult};
use crate::services::IssueTrackerService;

const SEARCH_PAGE_SIZE: usize = 50;

/// Jira REST API v2 client authenticated with HTTP basic auth.
pub struct JiraClient {
    http: Client,
    base_url: Url,
    auth_header: String,
}

impl JiraClient {
    pub fn new(settings: &ConnectionSettings) -> AppResult<Self> {
        let base_url = Url::parse(settings.server()).map_err(|err| {
            AppError::IssueTracker(format!("invalid server URL '{}': {err}", settings.server()))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(AppError::IssueTracker(format!(
                "invalid server URL '{}'",
                settings.server()
            )));
        }

        Ok(Self {
            http: Client::new(),
            base_url,
            auth_header: Self::auth_header(settings.user(), settings.password()),
        })
    }

    /// Builds a client and checks the credentials against the server.
    pub async fn connect(settings: &ConnectionSettings) -> AppResult<Self> {
        let client = Self::new(settings)?;
        let myself: JiraUser = client
            .fetch_json(client.request(Method::GET, &["myself"]))
            .await
            .map_err(|err| match err {
                AppError::IssueTracker(message) => {
                    AppError::IssueTracker(format!("authentication failed: {message}"))
                }
                other => other,
            })?;
        debug!(user = %myself.name, server = %client.base_url, "authenticated");
        Ok(client)
    }

    fn auth_header(user: &str, password: &str) -> String {
        let credentials = format!("{user}:{password}");
        let encoded = BASE64_STANDARD.encode(credentials);
        format!("Basic {encoded}")
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(["rest", "api", "2"]).extend(segments);
        }
        url
    }

    fn request(&self, method: Method, segments: &[&str]) -> RequestBuilder {
        self.http
            .request(method, self.endpoint(segments))
            .header(AUTHORIZATION, &self.auth_header)
            .header(ACCEPT, "application/json")
    }

    async fn send(&self, builder: RequestBuilder) -> AppResult<Response> {
        let request = builder
            .build()
            .map_err(|err| AppError::IssueTracker(format!("failed to build request: {err}")))?;
        debug!(method = %request.method(), url = %request.url(), "calling Jira");

        let response = self
            .http
            .execute(request)
            .await
            .map_err(|err| AppError::IssueTracker(format!("failed to call Jira: {err}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<unable to read response>".to_string());
            return Err(AppError::IssueTracker(format!(
                "Jira responded with {status}: {body}"
            )));
        }
        Ok(response)
    }

    async fn fetch_json<T: DeserializeOwned>(&self, builder: RequestBuilder) -> AppResult<T> {
        self.send(builder).await?.json().await.map_err(|err| {
            AppError::IssueTracker(format!("failed to parse Jira response: {err}"))
        })
    }

    fn with_json<B: Serialize>(builder: RequestBuilder, body: &B) -> RequestBuilder {
        builder.header(CONTENT_TYPE, "application/json").json(body)
    }
}

#[async_trait]
impl IssueTrackerService for JiraClient {
    async fn search_issues(&self, query: &str) -> AppResult<Vec<IssueSummary>> {
        let page_size = SEARCH_PAGE_SIZE.to_string();
        let mut hits = Vec::new();

        loop {
            let start_at = hits.len().to_string();
            let page: JiraSearchResponse = self
                .fetch_json(self.request(Method::GET, &["search"]).query(&[
                    ("jql", query),
                    ("fields", "summary"),
                    ("startAt", start_at.as_str()),
                    ("maxResults", page_size.as_str()),
                ]))
                .await?;

            let received = page.issues.len();
            hits.extend(page.issues.into_iter().map(|issue| IssueSummary {
                key: issue.key,
                summary: issue.fields.summary.unwrap_or_default(),
            }));

            if received == 0 || hits.len() >= page.total {
                break;
            }
        }

        debug!(query, hits = hits.len(), "search finished");
        Ok(hits)
    }

    async fn fetch_issue(&self, key: &str) -> AppResult<Issue> {
        let issue: JiraIssue = self
            .fetch_json(
                self.request(Method::GET, &["issue", key])
                    .query(&[("fields", "summary,description,comment")]),
            )
            .await?;
        Ok(issue.into())
    }

    async fn add_comment(&self, key: &str, body: &str) -> AppResult<()> {
        let request = Self::with_json(
            self.request(Method::POST, &["issue", key, "comment"]),
            &JiraCommentRequest { body },
        );
        self.send(request).await?;
        Ok(())
    }

    async fn assign_issue(&self, key: &str, username: &str) -> AppResult<()> {
        let request = Self::with_json(
            self.request(Method::PUT, &["issue", key, "assignee"]),
            &JiraAssignRequest { name: username },
        );
        self.send(request).await?;
        Ok(())
    }

    async fn transition_issue(&self, key: &str, transition_id: &str) -> AppResult<()> {
        let request = Self::with_json(
            self.request(Method::POST, &["issue", key, "transitions"]),
            &JiraTransitionRequest {
                transition: JiraTransitionId { id: transition_id },
            },
        );
        self.send(request).await?;
        Ok(())
    }

    async fn search_users(&self, pattern: &str) -> AppResult<Vec<User>> {
        let users: Vec<JiraUser> = self
            .fetch_json(
                self.request(Method::GET, &["user", "search"])
                    .query(&[("username", pattern)]),
            )
            .await?;
        Ok(users.into_iter().map(User::from).collect())
    }
}

#[derive(Serialize)]
struct JiraCommentRequest<'a> {
    body: &'a str,
}

#[derive(Serialize)]
struct JiraAssignRequest<'a> {
    name: &'a str,
}

#[derive(Serialize)]
struct JiraTransitionRequest<'a> {
    transition: JiraTransitionId<'a>,
}

#[derive(Serialize)]
struct JiraTransitionId<'a> {
    id: &'a str,
}

#[derive(Deserialize)]
struct JiraSearchResponse {
    #[serde(default)]
    total: usize,
    #[serde(default)]
    issues: Vec<JiraSearchHit>,
}

#[derive(Deserialize)]
struct JiraSearchHit {
    key: String,
    fields: JiraSummaryFields,
}

#[derive(Deserialize)]
struct JiraSummaryFields {
    summary: Option<String>,
}

#[derive(Deserialize)]
struct JiraIssue {
    key: String,
    fields: JiraIssueFields,
}

#[derive(Deserialize)]
struct JiraIssueFields {
    summary: Option<String>,
    description: Option<String>,
    comment: Option<JiraCommentPage>,
}

#[derive(Deserialize)]
struct JiraCommentPage {
    #[serde(default)]
    comments: Vec<JiraComment>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct JiraComment {
    author: Option<JiraUser>,
    update_author: Option<JiraUser>,
    #[serde(default)]
    body: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct JiraUser {
    #[serde(default)]
    name: String,
    display_name: Option<String>,
    email_address: Option<String>,
    #[serde(default)]
    active: bool,
}

impl JiraUser {
    fn label(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.name)
    }
}

impl From<JiraUser> for User {
    fn from(user: JiraUser) -> Self {
        Self {
            name: user.name,
            display_name: user.display_name,
            email_address: user.email_address,
            active: user.active,
        }
    }
}

impl From<JiraIssue> for Issue {
    fn from(issue: JiraIssue) -> Self {
        let comments = issue
            .fields
            .comment
            .map(|page| page.comments)
            .unwrap_or_default()
            .into_iter()
            .map(|comment| Comment {
                author: comment
                    .update_author
                    .as_ref()
                    .or(comment.author.as_ref())
                    .map(|user| user.label().to_string())
                    .unwrap_or_else(|| "<unknown>".to_string()),
                body: comment.body,
            })
            .collect();

        Self {
            key: issue.key,
            summary: issue.fields.summary.unwrap_or_default(),
            description: issue.fields.description,
            comments,
        }
    }
}
