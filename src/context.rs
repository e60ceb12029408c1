use std::sync::Arc;

use crate::config::ConnectionSettings;
use crate::services::IssueTrackerService;
use crate::workflow::dispatch::RenderMode;

/// Everything the dispatcher needs, built once after validation.
#[derive(Clone)]
pub struct AppContext {
    pub settings: ConnectionSettings,
    pub issue_tracker: Arc<dyn IssueTrackerService>,
    pub render: RenderMode,
}

impl AppContext {
    pub fn new(
        settings: ConnectionSettings,
        issue_tracker: Arc<dyn IssueTrackerService>,
        render: RenderMode,
    ) -> Self {
        Self {
            settings,
            issue_tracker,
            render,
        }
    }
}
