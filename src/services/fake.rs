use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::issue::{Issue, IssueSummary};
use crate::domain::user::User;
use crate::error::{AppError, AppResult};
use crate::services::IssueTrackerService;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Search(String),
    Fetch(String),
    Comment(String, String),
    Assign(String, String),
    Transition(String, String),
    SearchUsers(String),
}

/// In-memory tracker that records every call in order.
#[derive(Default)]
pub struct FakeTracker {
    issues: HashMap<String, Issue>,
    searches: HashMap<String, Vec<String>>,
    users: Vec<User>,
    calls: Mutex<Vec<Call>>,
}

impl FakeTracker {
    pub fn with_issue(mut self, key: &str, summary: &str) -> Self {
        self.issues.insert(
            key.to_string(),
            Issue {
                key: key.to_string(),
                summary: summary.to_string(),
                description: None,
                comments: Vec::new(),
            },
        );
        self
    }

    pub fn with_full_issue(mut self, issue: Issue) -> Self {
        self.issues.insert(issue.key.clone(), issue);
        self
    }

    pub fn with_search(mut self, query: &str, keys: &[&str]) -> Self {
        self.searches.insert(
            query.to_string(),
            keys.iter().map(|key| key.to_string()).collect(),
        );
        self
    }

    pub fn with_user(mut self, name: &str) -> Self {
        self.users.push(User {
            name: name.to_string(),
            display_name: None,
            email_address: None,
            active: true,
        });
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn issue(&self, key: &str) -> AppResult<&Issue> {
        self.issues
            .get(key)
            .ok_or_else(|| AppError::IssueTracker(format!("issue {key} does not exist")))
    }
}

#[async_trait]
impl IssueTrackerService for FakeTracker {
    async fn search_issues(&self, query: &str) -> AppResult<Vec<IssueSummary>> {
        self.record(Call::Search(query.to_string()));
        let keys = self.searches.get(query).cloned().unwrap_or_default();
        keys.iter()
            .map(|key| {
                self.issue(key).map(|issue| IssueSummary {
                    key: issue.key.clone(),
                    summary: issue.summary.clone(),
                })
            })
            .collect()
    }

    async fn fetch_issue(&self, key: &str) -> AppResult<Issue> {
        self.record(Call::Fetch(key.to_string()));
        self.issue(key).cloned()
    }

    async fn add_comment(&self, key: &str, body: &str) -> AppResult<()> {
        self.record(Call::Comment(key.to_string(), body.to_string()));
        self.issue(key).map(|_| ())
    }

    async fn assign_issue(&self, key: &str, username: &str) -> AppResult<()> {
        self.record(Call::Assign(key.to_string(), username.to_string()));
        self.issue(key).map(|_| ())
    }

    async fn transition_issue(&self, key: &str, transition_id: &str) -> AppResult<()> {
        self.record(Call::Transition(key.to_string(), transition_id.to_string()));
        self.issue(key).map(|_| ())
    }

    async fn search_users(&self, pattern: &str) -> AppResult<Vec<User>> {
        self.record(Call::SearchUsers(pattern.to_string()));
        Ok(self
            .users
            .iter()
            .filter(|user| user.name.contains(pattern))
            .cloned()
            .collect())
    }
}
