//! CLI error types and their exit codes.

use thiserror::Error;
use wmfdb_core::WmfdbError;

/// Errors surfaced by the command-line tools.
#[derive(Debug, Error)]
pub enum CliError {
    /// Anything the library reports.
    #[error(transparent)]
    Wmfdb(#[from] WmfdbError),

    /// The program to hand over to could not be started.
    #[error("Unable to execute command '{cmd}': {source}")]
    Process {
        cmd: String,
        #[source]
        source: std::io::Error,
    },
}

impl CliError {
    /// Map the error to a process exit code.
    ///
    /// - 1: general failure
    /// - 71: could not exec (`EX_OSERR`)
    ///
    /// Usage errors never get here: clap exits with 2 while parsing.
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Wmfdb(_) => 1,
            Self::Process { .. } => 71,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(CliError::from(WmfdbError::value("bad")).exit_code(), 1);
        let err = CliError::Process {
            cmd: "mysql".to_string(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert_eq!(err.exit_code(), 71);
        let msg = err.to_string();
        assert!(msg.starts_with("Unable to execute command 'mysql': "));
    }

    #[test]
    fn test_wmfdb_message_passes_through() {
        let err = CliError::from(WmfdbError::value("Unknown section: s99"));
        assert_eq!(err.to_string(), "Unknown section: s99");
    }
}
