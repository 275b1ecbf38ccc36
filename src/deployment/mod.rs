//! Packaging and provisioning of the backend as an AWS Lambda function.
//!
//! Every cloud interaction goes through the `aws` command-line tool; the steps
//! run sequentially and are never retried or rolled back.

mod command;
mod error;
mod package;
mod pipeline;
mod trust_policy;

pub use command::{
    AwsCommand, CommandOutcome, CommandOutput, CommandRunner, ProbeOutcome, SystemRunner,
};
pub use error::{CliMessage, DeployError};
pub use package::{DeploymentPackage, PackageError, remove_package};
pub use pipeline::{Deployer, DeploymentSummary, Sleeper, ThreadSleeper};
pub use trust_policy::TrustPolicy;
