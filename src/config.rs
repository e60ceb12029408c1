use std::fmt;
use std::fs;
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};

use ini::{Ini, ParseOption};
use tracing::debug;

use crate::error::{AppError, AppResult};

const CONFIG_FILE_NAME: &str = ".jiracmd.ini";
const CONNECTION_SECTION: &str = "Connection";

/// Fully resolved connection parameters. Every field is non-empty.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionSettings {
    server: String,
    user: String,
    password: String,
    project: String,
}

impl ConnectionSettings {
    #[cfg(test)]
    pub(crate) fn new(server: &str, user: &str, password: &str, project: &str) -> Self {
        Self {
            server: server.to_string(),
            user: user.to_string(),
            password: password.to_string(),
            project: project.to_string(),
        }
    }

    pub fn server(&self) -> &str {
        &self.server
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn project(&self) -> &str {
        &self.project
    }
}

impl fmt::Debug for ConnectionSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionSettings")
            .field("server", &self.server)
            .field("user", &self.user)
            .field("password", &mask_secret(&self.password))
            .field("project", &self.project)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Setting {
    Server,
    User,
    Password,
    Project,
}

impl Setting {
    pub fn name(self) -> &'static str {
        match self {
            Setting::Server => "server",
            Setting::User => "user",
            Setting::Password => "password",
            Setting::Project => "project",
        }
    }
}

/// One source of partial settings: the command line, the config file, or
/// the built-in defaults.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct SettingLayer {
    pub server: Option<String>,
    pub user: Option<String>,
    pub password: Option<String>,
    pub project: Option<String>,
}

impl SettingLayer {
    /// Empty strings count as unset.
    pub fn get(&self, setting: Setting) -> Option<&str> {
        let value = match setting {
            Setting::Server => &self.server,
            Setting::User => &self.user,
            Setting::Password => &self.password,
            Setting::Project => &self.project,
        };
        value.as_deref().filter(|v| !v.is_empty())
    }
}

impl fmt::Debug for SettingLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SettingLayer")
            .field("server", &self.server)
            .field("user", &self.user)
            .field("password", &self.password.as_deref().map(mask_secret))
            .field("project", &self.project)
            .finish()
    }
}

/// Built-in fallbacks consulted after the config file. No site-specific
/// values are compiled in.
pub type SettingDefaults = SettingLayer;

pub struct ConfigFile;

impl ConfigFile {
    /// `~/.jiracmd.ini`, when a home directory can be determined.
    pub fn default_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(CONFIG_FILE_NAME))
    }

    /// Reads the `[Connection]` section of `path`. Returns `None` when the
    /// file does not exist.
    pub fn load(path: &Path) -> AppResult<Option<SettingLayer>> {
        match fs::read_to_string(path) {
            Ok(contents) => Self::parse(&contents)
                .map(Some)
                .map_err(|err| AppError::ConfigFile(format!("{}: {err}", path.display()))),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "config file not found");
                Ok(None)
            }
            Err(err) => Err(AppError::ConfigFile(format!(
                "failed to read {}: {err}",
                path.display()
            ))),
        }
    }

    /// Values are taken literally: no escape sequences, no quote stripping.
    pub fn parse(contents: &str) -> Result<SettingLayer, ini::ParseError> {
        let options = ParseOption {
            enabled_escape: false,
            enabled_quote: false,
            ..ParseOption::default()
        };
        let ini = Ini::load_from_str_opt(contents, options)?;
        let Some(section) = ini.section(Some(CONNECTION_SECTION)) else {
            return Ok(SettingLayer::default());
        };
        let value = |setting: Setting| section.get(setting.name()).map(str::to_string);
        Ok(SettingLayer {
            server: value(Setting::Server),
            user: value(Setting::User),
            password: value(Setting::Password),
            project: value(Setting::Project),
        })
    }
}

/// Interactive source of secrets, consulted last and only for the password.
pub trait SecretPrompt {
    fn is_interactive(&self) -> bool;
    fn prompt_secret(&self, label: &str) -> AppResult<String>;
}

/// Reads from the controlling terminal without echo.
pub struct TerminalPrompt;

impl SecretPrompt for TerminalPrompt {
    fn is_interactive(&self) -> bool {
        io::stdin().is_terminal()
    }

    fn prompt_secret(&self, label: &str) -> AppResult<String> {
        Ok(rpassword::prompt_password(format!("{label}: "))?)
    }
}

#[derive(Debug, Clone, Copy)]
enum Provider<'a> {
    CommandLine(&'a SettingLayer),
    ConfigFile(&'a SettingLayer),
    BuiltIn(&'a SettingDefaults),
}

impl<'a> Provider<'a> {
    fn name(&self) -> &'static str {
        match self {
            Provider::CommandLine(_) => "command line",
            Provider::ConfigFile(_) => "config file",
            Provider::BuiltIn(_) => "built-in default",
        }
    }

    fn layer(&self) -> &'a SettingLayer {
        match *self {
            Provider::CommandLine(layer) | Provider::ConfigFile(layer) | Provider::BuiltIn(layer) => {
                layer
            }
        }
    }
}

/// Merges the layers per setting in priority order: command line, config
/// file, built-in default, then (password only) an interactive prompt.
pub fn resolve(
    command_line: &SettingLayer,
    config_file: &SettingLayer,
    defaults: &SettingDefaults,
    prompt: &dyn SecretPrompt,
) -> AppResult<ConnectionSettings> {
    let providers = [
        Provider::CommandLine(command_line),
        Provider::ConfigFile(config_file),
        Provider::BuiltIn(defaults),
    ];

    let server = lookup(Setting::Server, &providers)?;
    let user = lookup(Setting::User, &providers)?;
    let project = lookup(Setting::Project, &providers)?;
    let password = match lookup(Setting::Password, &providers) {
        Ok(password) => password,
        Err(AppError::MissingSetting(_)) if prompt.is_interactive() => {
            let answer = prompt.prompt_secret(&format!("Password for {user}@{server}"))?;
            if answer.is_empty() {
                return Err(AppError::MissingSetting(Setting::Password.name()));
            }
            answer
        }
        Err(err) => return Err(err),
    };

    Ok(ConnectionSettings {
        server,
        user,
        password,
        project,
    })
}

fn lookup(setting: Setting, providers: &[Provider<'_>]) -> AppResult<String> {
    providers
        .iter()
        .find_map(|provider| {
            provider.layer().get(setting).map(|value| {
                debug!(setting = setting.name(), source = provider.name(), "resolved setting");
                value.to_string()
            })
        })
        .ok_or(AppError::MissingSetting(setting.name()))
}

fn mask_secret(value: &str) -> &'static str {
    if value.is_empty() { "<not set>" } else { "***" }
}
