//! Error codes and exit status for ecectl
//!
//! Codes follow sysexits(3) where one fits.

use ece_common::EceError;

/// Exit code for success
pub const EXIT_SUCCESS: i32 = 0;

/// Exit code for general errors
pub const EXIT_GENERAL_ERROR: i32 = 1;

/// Malformed input file, or a topology that cannot be reconciled
pub const EXIT_DATA_ERROR: i32 = 65;

/// Input file missing or unreadable
pub const EXIT_NO_INPUT: i32 = 66;

/// Named deployment or template does not exist
pub const EXIT_NOT_FOUND: i32 = 69;

/// The API rejected a call or returned something unusable
pub const EXIT_API_ERROR: i32 = 70;

/// A call or a shutdown wait timed out
pub const EXIT_TIMEOUT: i32 = 75;

/// Missing credentials or invalid settings
pub const EXIT_CONFIG_ERROR: i32 = 78;

/// Exit code for an error returned by a command
pub fn exit_code(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<EceError>() {
        Some(err) => exit_code_for(err),
        None => EXIT_GENERAL_ERROR,
    }
}

fn exit_code_for(err: &EceError) -> i32 {
    use ece_common::{ApiError, InputError};

    match err {
        EceError::Api(ApiError::Timeout { .. }) => EXIT_TIMEOUT,
        EceError::Api(_) | EceError::Payload { .. } => EXIT_API_ERROR,
        EceError::Reconcile(_) => EXIT_DATA_ERROR,
        EceError::Input(InputError::Read { .. }) => EXIT_NO_INPUT,
        EceError::Input(_) => EXIT_DATA_ERROR,
        EceError::Config(_) => EXIT_CONFIG_ERROR,
        EceError::NotFound { .. } => EXIT_NOT_FOUND,
        EceError::ShutdownTimedOut { .. } => EXIT_TIMEOUT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ece_common::config::ConfigError;
    use ece_common::{ApiError, Position, ReconcileError, Role};

    #[test]
    fn test_unresolved_role_is_data_error() {
        let err = anyhow::Error::from(EceError::from(ReconcileError::UnresolvedRole {
            role: Role::DataTier("unknown_tier".into()),
            position: Position::Elasticsearch(3),
        }));
        assert_eq!(exit_code(&err), EXIT_DATA_ERROR);
    }

    #[test]
    fn test_timeout_has_own_code() {
        let err = anyhow::Error::from(EceError::from(ApiError::Timeout {
            method: "GET".into(),
            url: "https://ece/api/v1/deployments".into(),
            secs: 30,
        }));
        assert_eq!(exit_code(&err), EXIT_TIMEOUT);
    }

    #[test]
    fn test_context_keeps_exit_code() {
        let err = anyhow::Error::from(EceError::NotFound {
            kind: "deployment",
            name: "obs".into(),
        })
        .context("delete-deployment failed");
        assert_eq!(exit_code(&err), EXIT_NOT_FOUND);
    }

    #[test]
    fn test_config_and_other_errors() {
        let err = anyhow::Error::from(EceError::from(ConfigError::MissingVariable(
            "ES_PRD_USERNAME".into(),
        )));
        assert_eq!(exit_code(&err), EXIT_CONFIG_ERROR);

        assert_eq!(exit_code(&anyhow::anyhow!("boom")), EXIT_GENERAL_ERROR);
    }
}
