use std::io::Write;

use tracing::debug;

use crate::context::AppContext;
use crate::domain::issue::Issue;
use crate::error::{AppError, AppResult};
use crate::input::TicketIdList;
use crate::intent::{Intent, TicketAction};
use crate::services::issue_tracker::RESOLVE_TRANSITION_ID;

const RULE_WIDTH: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderMode {
    /// `<key>  <summary>`
    Summary,
    /// Key, summary, description and every comment.
    Full,
}

/// Open or in-progress tickets assigned to the authenticated user.
pub fn mine_query(project: &str) -> String {
    format!(r#"assignee=currentUser() and project={project} and status in ("open","in progress")"#)
}

/// Every open ticket in the project.
pub fn all_query(project: &str) -> String {
    format!(r#"project={project} and status in ("open")"#)
}

pub fn render_issue(issue: &Issue, mode: RenderMode) -> String {
    match mode {
        RenderMode::Summary => format!("{:<8}  {}", issue.key, issue.summary),
        RenderMode::Full => {
            let rule = "-".repeat(RULE_WIDTH);
            let mut comments = vec![rule.clone()];
            for comment in &issue.comments {
                comments.push(format!("{}\n{}", comment.author, comment.body));
                comments.push(rule.clone());
            }
            format!(
                "Ticket: {}\nSummary: {}\nDescription: {}\nComments: \n{}\n",
                issue.key,
                issue.summary,
                issue.description.as_deref().unwrap_or("None"),
                comments.join("\n")
            )
        }
    }
}

/// Runs a validated intent, writing rendered tickets and confirmations to
/// `out` as they are produced. The first failure stops the whole run.
pub async fn execute<W: Write>(ctx: &AppContext, intent: Intent, out: &mut W) -> AppResult<()> {
    debug!(?intent, "dispatching");
    match intent {
        Intent::ListMine => list_search(ctx, &mine_query(ctx.settings.project()), out).await,
        Intent::ListAll => list_search(ctx, &all_query(ctx.settings.project()), out).await,
        Intent::ListOrCatTickets(tickets) => list_tickets(ctx, &tickets, out).await,
        Intent::SearchUsers(name) => {
            let users = ctx.issue_tracker.search_users(&name).await?;
            writeln!(out, "{users:#?}")?;
            Ok(())
        }
        Intent::ModifyTickets { tickets, actions } => {
            modify_tickets(ctx, &tickets, &actions, out).await
        }
    }
}

async fn list_search<W: Write>(ctx: &AppContext, query: &str, out: &mut W) -> AppResult<()> {
    let hits = ctx.issue_tracker.search_issues(query).await?;
    for hit in hits {
        let issue = ctx.issue_tracker.fetch_issue(&hit.key).await?;
        writeln!(out, "{}", render_issue(&issue, ctx.render))?;
    }
    Ok(())
}

async fn list_tickets<W: Write>(
    ctx: &AppContext,
    tickets: &TicketIdList,
    out: &mut W,
) -> AppResult<()> {
    for key in tickets.iter() {
        let issue = ctx.issue_tracker.fetch_issue(key).await?;
        writeln!(out, "{}", render_issue(&issue, ctx.render))?;
    }
    Ok(())
}

async fn modify_tickets<W: Write>(
    ctx: &AppContext,
    tickets: &TicketIdList,
    actions: &[TicketAction],
    out: &mut W,
) -> AppResult<()> {
    for key in tickets.iter() {
        let issue = ctx.issue_tracker.fetch_issue(key).await?;
        writeln!(out, "{}", render_issue(&issue, ctx.render))?;
        for action in actions {
            apply_action(ctx, &issue.key, action, out).await?;
        }
        writeln!(out)?;
    }
    Ok(())
}

async fn apply_action<W: Write>(
    ctx: &AppContext,
    key: &str,
    action: &TicketAction,
    out: &mut W,
) -> AppResult<()> {
    debug!(ticket = key, ?action, "applying action");
    let tracker = &ctx.issue_tracker;
    match action {
        TicketAction::AddComment(text) => {
            tracker.add_comment(key, text).await?;
            writeln!(out, "Added comment: {text}")?;
        }
        TicketAction::Take => {
            let user = ctx.settings.user();
            tracker.assign_issue(key, user).await?;
            writeln!(out, "Assigned issue to user '{user}'")?;
        }
        TicketAction::Give(target) => {
            let known = tracker
                .search_users(target)
                .await?
                .iter()
                .any(|user| user.name == *target);
            if !known {
                return Err(AppError::InvalidUser(target.clone()));
            }
            tracker.assign_issue(key, target).await?;
            writeln!(out, "Assigned issue to user '{target}'")?;
        }
        TicketAction::Resolve => {
            tracker.transition_issue(key, RESOLVE_TRANSITION_ID).await?;
            writeln!(out, "New state 'resolved'")?;
        }
    }
    Ok(())
}
