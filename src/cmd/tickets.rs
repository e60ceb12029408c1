use std::io::{self, BufRead, IsTerminal};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Args;
use tracing::{debug, warn};

use crate::config::{
    self, ConfigFile, ConnectionSettings, SecretPrompt, SettingDefaults, SettingLayer,
    TerminalPrompt,
};
use crate::context::AppContext;
use crate::error::AppResult;
use crate::infra::jira::JiraClient;
use crate::input;
use crate::intent::{self, Intent, InvocationFlags};
use crate::workflow::dispatch::{self, RenderMode};

#[derive(Args, Debug, Clone, Default)]
pub struct TicketArgs {
    /// Ticket IDs to operate on; read from stdin as well when it is not a terminal.
    #[arg(value_name = "TICKET_ID")]
    pub tickets: Vec<String>,

    /// Search for valid users matching NAME.
    #[arg(long = "usersearch", visible_alias = "user-search", value_name = "NAME")]
    pub user_search: Option<String>,

    /// Print debugging information.
    #[arg(short, long)]
    pub debug: bool,

    /// Config file holding a [Connection] section. Default: ~/.jiracmd.ini
    #[arg(long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[command(flatten)]
    pub list: ListArgs,

    #[command(flatten)]
    pub modify: ModifyArgs,
}

#[derive(Args, Debug, Clone, Default)]
#[command(next_help_heading = "Connection Options")]
pub struct ConnectionArgs {
    /// Jira server to connect to.
    #[arg(short, long, env = "JIRACMD_SERVER")]
    pub server: Option<String>,

    /// Jira user name.
    #[arg(short, long, env = "JIRACMD_USER")]
    pub user: Option<String>,

    /// Password for the Jira account.
    #[arg(short = 'P', long, env = "JIRACMD_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Project to scan for.
    #[arg(short, long, env = "JIRACMD_PROJECT")]
    pub project: Option<String>,
}

#[derive(Args, Debug, Clone, Default)]
#[command(next_help_heading = "List Options")]
pub struct ListArgs {
    /// List open tickets assigned to me.
    #[arg(short, long)]
    pub list: bool,

    /// List all open tickets.
    #[arg(short = 'a', long = "all", visible_alias = "list-all")]
    pub list_all: bool,

    /// Print the full contents of a ticket.
    #[arg(short, long)]
    pub cat: bool,
}

#[derive(Args, Debug, Clone, Default)]
#[command(next_help_heading = "Modification Options")]
pub struct ModifyArgs {
    /// Add a comment to a ticket.
    #[arg(short = 'C', long, value_name = "TEXT")]
    pub comment: Option<String>,

    /// Resolve a ticket (comment is required).
    #[arg(short = 'R', long)]
    pub resolve: bool,

    /// Assume ownership of the specified ticket.
    #[arg(short = 'T', long)]
    pub take: bool,

    /// Give ownership to the user specified by the '-g' option.
    #[arg(short = 'G', long)]
    pub give: bool,

    /// User to give the ticket to (used with the '-G' option).
    #[arg(
        short = 'g',
        long = "givetouser",
        visible_alias = "give-to-user",
        value_name = "NAME"
    )]
    pub give_to_user: Option<String>,
}

impl TicketArgs {
    fn setting_overrides(&self) -> SettingLayer {
        SettingLayer {
            server: self.connection.server.clone(),
            user: self.connection.user.clone(),
            password: self.connection.password.clone(),
            project: self.connection.project.clone(),
        }
    }

    pub fn invocation_flags(&self) -> InvocationFlags {
        InvocationFlags {
            list: self.list.list,
            list_all: self.list.list_all,
            cat: self.list.cat,
            comment: self.modify.comment.clone(),
            resolve: self.modify.resolve,
            take: self.modify.take,
            give: self.modify.give,
            give_to_user: self.modify.give_to_user.clone(),
            user_search: self.user_search.clone(),
            debug: self.debug,
        }
    }
}

/// Result of the offline stages: nothing here has touched the network.
#[derive(Debug)]
pub struct Invocation {
    pub settings: ConnectionSettings,
    pub intent: Intent,
    pub render: RenderMode,
}

/// Resolves settings, collects ticket IDs and validates the requested action.
pub fn prepare<R: BufRead>(
    args: TicketArgs,
    config_file: &SettingLayer,
    prompt: &dyn SecretPrompt,
    stdin_is_interactive: bool,
    stdin: R,
) -> AppResult<Invocation> {
    let flags = args.invocation_flags();
    debug!(?flags, "parsed flags");

    let settings = config::resolve(
        &args.setting_overrides(),
        config_file,
        &SettingDefaults::default(),
        prompt,
    )?;
    debug!(?settings, "resolved connection settings");

    let tickets = input::collect(args.tickets, stdin_is_interactive, stdin)?;
    debug!(count = tickets.len(), ?tickets, "collected ticket list");

    let intent = intent::classify(&flags, tickets)?;
    let render = if flags.cat {
        RenderMode::Full
    } else {
        RenderMode::Summary
    };

    Ok(Invocation {
        settings,
        intent,
        render,
    })
}

/// Loads `--config PATH` when given, else `~/.jiracmd.ini`. Only an explicitly
/// named file that does not exist is worth a warning.
pub fn load_config_file(explicit: Option<&Path>) -> AppResult<SettingLayer> {
    let path = match explicit {
        Some(path) => path.to_path_buf(),
        None => match ConfigFile::default_path() {
            Some(path) => path,
            None => return Ok(SettingLayer::default()),
        },
    };

    debug!(path = %path.display(), "loading config file");
    match ConfigFile::load(&path)? {
        Some(layer) => Ok(layer),
        None => {
            if explicit.is_some() {
                warn!(path = %path.display(), "config file does not exist; ignoring it");
            }
            Ok(SettingLayer::default())
        }
    }
}

pub async fn run(args: TicketArgs) -> AppResult<()> {
    let config_file = load_config_file(args.config.as_deref())?;

    let stdin = io::stdin();
    let interactive = stdin.is_terminal();
    let invocation = prepare(args, &config_file, &TerminalPrompt, interactive, stdin.lock())?;

    let client = JiraClient::connect(&invocation.settings).await?;
    let ctx = AppContext::new(invocation.settings, Arc::new(client), invocation.render);

    let mut stdout = io::stdout();
    dispatch::execute(&ctx, invocation.intent, &mut stdout).await
}
