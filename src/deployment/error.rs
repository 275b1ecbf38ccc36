use crate::deployment::PackageError;
use crate::utils::error_chain_fmt;

#[derive(thiserror::Error)]
pub enum DeployError {
    #[error("Failed to run `{command}`")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{step} failed (status: {})", display_status(.status))]
    CommandFailed {
        step: &'static str,
        status: Option<i32>,
        #[source]
        detail: CliMessage,
    },
    #[error("Failed to create or get IAM role {role_name}")]
    RoleUnavailable { role_name: String },
    #[error("Failed to build the deployment package")]
    Package(#[from] PackageError),
    #[error("Failed to encode the trust policy")]
    TrustPolicy(#[from] serde_json::Error),
}

impl std::fmt::Debug for DeployError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

/// The diagnostic text the CLI printed for a failed command.
#[derive(thiserror::Error, Debug)]
#[error("{0}")]
pub struct CliMessage(pub String);

fn display_status(status: &Option<i32>) -> String {
    match status {
        Some(code) => code.to_string(),
        None => "terminated by signal".to_string(),
    }
}
