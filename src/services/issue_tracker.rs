use async_trait::async_trait;

use crate::domain::issue::{Issue, IssueSummary};
use crate::domain::user::User;
use crate::error::AppResult;

/// Workflow state id of the tracker's "resolved" transition.
pub const RESOLVE_TRANSITION_ID: &str = "5";

/// Operations the dispatcher needs from an authenticated tracker session.
#[async_trait]
pub trait IssueTrackerService: Send + Sync {
    /// Runs a tracker query expression and returns the hits in tracker order.
    async fn search_issues(&self, query: &str) -> AppResult<Vec<IssueSummary>>;
    async fn fetch_issue(&self, key: &str) -> AppResult<Issue>;
    async fn add_comment(&self, key: &str, body: &str) -> AppResult<()>;
    async fn assign_issue(&self, key: &str, username: &str) -> AppResult<()>;
    async fn transition_issue(&self, key: &str, transition_id: &str) -> AppResult<()>;
    async fn search_users(&self, pattern: &str) -> AppResult<Vec<User>>;
}
