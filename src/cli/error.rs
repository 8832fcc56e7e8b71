//! CLI-level errors (wraps application errors)

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Application(#[from] ApplicationError),

    #[error("invalid arguments: {0}")]
    InvalidArgs(String),
}

impl From<DomainError> for CliError {
    fn from(e: DomainError) -> Self {
        CliError::Application(ApplicationError::Domain(e))
    }
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::InvalidArgs(_) => crate::exitcode::USAGE,
            CliError::Application(e) => match e {
                ApplicationError::Config { .. } => crate::exitcode::CONFIG,
                ApplicationError::OperationFailed { .. } => crate::exitcode::IOERR,
                ApplicationError::Domain(d) => match d {
                    DomainError::FileNotFound(_) | DomainError::NotADirectory(_) => {
                        crate::exitcode::NOINPUT
                    }
                    DomainError::Walk { .. } => crate::exitcode::IOERR,
                    DomainError::InvalidTree(_) => crate::exitcode::DATAERR,
                },
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn given_missing_directory_when_mapping_exit_code_then_noinput() {
        let err = CliError::from(DomainError::FileNotFound(PathBuf::from("/nope")));
        assert_eq!(err.exit_code(), crate::exitcode::NOINPUT);
    }

    #[test]
    fn given_config_error_when_mapping_exit_code_then_config() {
        let err = CliError::from(ApplicationError::Config {
            message: "bad".into(),
        });
        assert_eq!(err.exit_code(), crate::exitcode::CONFIG);
    }
}
