pub mod issue_tracker;

pub use issue_tracker::IssueTrackerService;

#[cfg(test)]
pub mod fake;
