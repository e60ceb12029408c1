//! Turns the raw command-line flags and the collected ticket list into a
//! single validated [`Intent`].
//!
//! Everything here is a pure function of in-memory values; nothing touches
//! the network or reads the terminal.

use thiserror::Error;
use tracing::debug;

use crate::input::TicketIdList;

/// Raw switches as they came off the command line.
///
/// Contradictory combinations are allowed here; [`classify`] rejects them.
#[derive(Debug, Clone, Default)]
pub struct InvocationFlags {
    pub list: bool,
    pub list_all: bool,
    pub cat: bool,
    pub comment: Option<String>,
    pub resolve: bool,
    pub take: bool,
    pub give: bool,
    pub give_to_user: Option<String>,
    pub user_search: Option<String>,
    pub debug: bool,
}

impl InvocationFlags {
    fn comment_text(&self) -> Option<&str> {
        non_empty(self.comment.as_deref())
    }

    fn give_target(&self) -> Option<&str> {
        non_empty(self.give_to_user.as_deref())
    }

    fn user_search_name(&self) -> Option<&str> {
        non_empty(self.user_search.as_deref())
    }

    fn requests_modification(&self) -> bool {
        self.comment_text().is_some() || self.resolve || self.take || self.give
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("--givetouser is required with the --give option")]
    GiveRequiresTarget,
    #[error("a comment is required to resolve a ticket")]
    ResolveRequiresComment,
    #[error("a ticket list is required when using modification options")]
    ModificationRequiresTickets,
}

/// One mutation applied to a ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TicketAction {
    AddComment(String),
    Take,
    Give(String),
    Resolve,
}

/// The single action an invocation resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    ListMine,
    ListAll,
    ListOrCatTickets(TicketIdList),
    SearchUsers(String),
    /// `actions` is always in application order: comment, take, give, resolve.
    ModifyTickets {
        tickets: TicketIdList,
        actions: Vec<TicketAction>,
    },
}

pub fn classify(flags: &InvocationFlags, tickets: TicketIdList) -> Result<Intent, ValidationError> {
    let give_target = flags.give_target();
    if flags.give && give_target.is_none() {
        return Err(ValidationError::GiveRequiresTarget);
    }

    let comment = flags.comment_text();
    if flags.resolve && comment.is_none() {
        return Err(ValidationError::ResolveRequiresComment);
    }

    if flags.requests_modification() {
        if tickets.is_empty() {
            return Err(ValidationError::ModificationRequiresTickets);
        }

        let mut actions = Vec::with_capacity(4);
        if let Some(text) = comment {
            actions.push(TicketAction::AddComment(text.to_string()));
        }
        if flags.take {
            actions.push(TicketAction::Take);
        }
        if let (true, Some(target)) = (flags.give, give_target) {
            actions.push(TicketAction::Give(target.to_string()));
        }
        if flags.resolve {
            actions.push(TicketAction::Resolve);
        }
        return Ok(Intent::ModifyTickets { tickets, actions });
    }

    if let Some(name) = flags.user_search_name() {
        return Ok(Intent::SearchUsers(name.to_string()));
    }

    if !tickets.is_empty() {
        return Ok(Intent::ListOrCatTickets(tickets));
    }

    if flags.list_all {
        return Ok(Intent::ListAll);
    }
    if !flags.list && !flags.cat {
        debug!("no action requested, listing tickets assigned to me");
    }
    Ok(Intent::ListMine)
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tickets(ids: &[&str]) -> TicketIdList {
        TicketIdList::from(ids.iter().map(|id| id.to_string()).collect::<Vec<_>>())
    }

    fn modifying_flags() -> Vec<InvocationFlags> {
        vec![
            InvocationFlags {
                comment: Some("note".to_string()),
                ..Default::default()
            },
            InvocationFlags {
                resolve: true,
                comment: Some("done".to_string()),
                ..Default::default()
            },
            InvocationFlags {
                take: true,
                ..Default::default()
            },
            InvocationFlags {
                give: true,
                give_to_user: Some("bob".to_string()),
                ..Default::default()
            },
        ]
    }

    #[test]
    fn modification_without_tickets_is_rejected() {
        for flags in modifying_flags() {
            assert_eq!(
                classify(&flags, TicketIdList::default()),
                Err(ValidationError::ModificationRequiresTickets),
                "{flags:?}"
            );
        }
    }

    #[test]
    fn give_without_target_is_rejected_regardless_of_other_flags() {
        for target in [None, Some(String::new()), Some("  ".to_string())] {
            let flags = InvocationFlags {
                give: true,
                give_to_user: target,
                list: true,
                take: true,
                comment: Some("x".to_string()),
                ..Default::default()
            };
            assert_eq!(
                classify(&flags, tickets(&["TICK-1"])),
                Err(ValidationError::GiveRequiresTarget)
            );
            assert_eq!(
                classify(&flags, TicketIdList::default()),
                Err(ValidationError::GiveRequiresTarget)
            );
        }
    }

    #[test]
    fn resolve_requires_comment() {
        let flags = InvocationFlags {
            resolve: true,
            comment: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(
            classify(&flags, tickets(&["TICK-1"])),
            Err(ValidationError::ResolveRequiresComment)
        );
    }

    #[test]
    fn modification_wins_over_listing() {
        let flags = InvocationFlags {
            list: true,
            cat: true,
            comment: Some("x".to_string()),
            ..Default::default()
        };
        let intent = classify(&flags, tickets(&["TICK-1", "TICK-2"])).unwrap();
        assert_eq!(
            intent,
            Intent::ModifyTickets {
                tickets: tickets(&["TICK-1", "TICK-2"]),
                actions: vec![TicketAction::AddComment("x".to_string())],
            }
        );
    }

    #[test]
    fn actions_follow_fixed_order() {
        let flags = InvocationFlags {
            resolve: true,
            give: true,
            give_to_user: Some("bob".to_string()),
            take: true,
            comment: Some("fixed".to_string()),
            ..Default::default()
        };
        let Intent::ModifyTickets { actions, .. } = classify(&flags, tickets(&["TICK-9"])).unwrap()
        else {
            panic!("expected a modification intent");
        };
        assert_eq!(
            actions,
            vec![
                TicketAction::AddComment("fixed".to_string()),
                TicketAction::Take,
                TicketAction::Give("bob".to_string()),
                TicketAction::Resolve,
            ]
        );
    }

    #[test]
    fn empty_comment_alone_is_not_a_modification() {
        let flags = InvocationFlags {
            comment: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(classify(&flags, TicketIdList::default()), Ok(Intent::ListMine));
    }

    #[test]
    fn user_search_beats_listing() {
        let flags = InvocationFlags {
            list: true,
            user_search: Some("bob".to_string()),
            ..Default::default()
        };
        assert_eq!(
            classify(&flags, tickets(&["TICK-1"])),
            Ok(Intent::SearchUsers("bob".to_string()))
        );
    }

    #[test]
    fn ticket_ids_select_direct_fetch() {
        for flags in [
            InvocationFlags::default(),
            InvocationFlags {
                list_all: true,
                ..Default::default()
            },
            InvocationFlags {
                cat: true,
                ..Default::default()
            },
        ] {
            assert_eq!(
                classify(&flags, tickets(&["A-1"])),
                Ok(Intent::ListOrCatTickets(tickets(&["A-1"])))
            );
        }
    }

    #[test]
    fn listing_without_ids_searches() {
        let all = InvocationFlags {
            list_all: true,
            ..Default::default()
        };
        let mine = InvocationFlags {
            list: true,
            ..Default::default()
        };
        let cat = InvocationFlags {
            cat: true,
            ..Default::default()
        };
        let both = InvocationFlags {
            list: true,
            list_all: true,
            ..Default::default()
        };
        assert_eq!(classify(&all, TicketIdList::default()), Ok(Intent::ListAll));
        assert_eq!(classify(&both, TicketIdList::default()), Ok(Intent::ListAll));
        assert_eq!(classify(&mine, TicketIdList::default()), Ok(Intent::ListMine));
        assert_eq!(classify(&cat, TicketIdList::default()), Ok(Intent::ListMine));
        assert_eq!(
            classify(&InvocationFlags::default(), TicketIdList::default()),
            Ok(Intent::ListMine)
        );
    }

    #[test]
    fn give_to_user_without_give_is_ignored() {
        let flags = InvocationFlags {
            give_to_user: Some("bob".to_string()),
            ..Default::default()
        };
        assert_eq!(classify(&flags, TicketIdList::default()), Ok(Intent::ListMine));
    }
}
