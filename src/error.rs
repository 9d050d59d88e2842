use std::fmt;

use kdt_layout::LayoutError;
use kdt_pcb::{BoardFileError, ConfigError};
use kdt_settings::SettingsError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// CLI usage error (missing args, invalid flags).
    Usage = 1,
    /// Input error (missing file, invalid layout or board JSON).
    Input = 2,
    /// Settings or placement configuration is unusable.
    Config = 3,
    /// Failure while writing outputs.
    Processing = 4,
    /// `--strict` run where at least one footprint was not placed.
    Placement = 5,
}

#[derive(Debug)]
pub struct CliError {
    pub code: ErrorCode,
    pub message: String,
}

impl CliError {
    pub fn usage(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Usage, message)
    }

    pub fn input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Input, message)
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Config, message)
    }

    pub fn processing(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Processing, message)
    }

    pub fn placement(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Placement, message)
    }

    fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl From<LayoutError> for CliError {
    fn from(e: LayoutError) -> Self {
        Self::input(format!("invalid layout: {e}"))
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        Self::config(format!("invalid settings: {e}"))
    }
}

impl From<SettingsError> for CliError {
    fn from(e: SettingsError) -> Self {
        Self::config(e.to_string())
    }
}

impl From<BoardFileError> for CliError {
    fn from(e: BoardFileError) -> Self {
        match e {
            BoardFileError::Write { .. } => Self::processing(e.to_string()),
            _ => Self::input(e.to_string()),
        }
    }
}

impl From<anyhow::Error> for CliError {
    fn from(e: anyhow::Error) -> Self {
        Self::processing(format!("{e:#}"))
    }
}
