use std::io::BufRead;

use crate::error::AppResult;

/// Ticket keys in the order they were supplied: command line first, then stdin.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TicketIdList(Vec<String>);

impl TicketIdList {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl From<Vec<String>> for TicketIdList {
    fn from(ids: Vec<String>) -> Self {
        Self(ids)
    }
}

/// Builds the working ticket list.
///
/// When stdin is not a terminal every non-blank line read from `stdin` is
/// appended, trimmed. Key syntax is not checked here.
pub fn collect<R: BufRead>(
    positional: Vec<String>,
    stdin_is_interactive: bool,
    stdin: R,
) -> AppResult<TicketIdList> {
    let mut ids = positional;
    if !stdin_is_interactive {
        for line in stdin.lines() {
            let line = line?;
            let id = line.trim();
            if !id.is_empty() {
                ids.push(id.to_string());
            }
        }
    }
    Ok(TicketIdList(ids))
}
