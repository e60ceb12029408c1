use std::io;

use thiserror::Error;

use crate::intent::ValidationError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("missing setting '{0}': pass it on the command line or set it in the config file")]
    MissingSetting(&'static str),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("invalid user: '{0}'")]
    InvalidUser(String),
    #[error("issue tracker error: {0}")]
    IssueTracker(String),
    #[error("config file error: {0}")]
    ConfigFile(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl AppError {
    pub fn exit_code(&self) -> i32 {
        match self {
            AppError::Io(_) => 1,
            AppError::Validation(_) => 2,
            AppError::MissingSetting(_) => 3,
            AppError::InvalidUser(_) => 4,
            AppError::IssueTracker(_) => 5,
            AppError::ConfigFile(_) => 6,
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
