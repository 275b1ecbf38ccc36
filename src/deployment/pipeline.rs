use crate::configuration::DeploymentSettings;
use crate::deployment::{
    AwsCommand, CliMessage, CommandOutcome, CommandOutput, CommandRunner, DeployError,
    DeploymentPackage, ProbeOutcome, TrustPolicy, remove_package,
};
use std::time::{Duration, Instant};

const LAMBDA_BASIC_EXECUTION_POLICY: &str =
    "arn:aws:iam::aws:policy/service-role/AWSLambdaBasicExecutionRole";
const FUNCTION_URL_CORS: &str = "AllowOrigins=*,AllowMethods=*,AllowHeaders=*";
const PUBLIC_ACCESS_STATEMENT_ID: &str = "FunctionURLAllowPublicAccess";

pub trait Sleeper {
    fn sleep(&self, duration: Duration);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Provisions the execution role, the function and its public URL, in that order.
pub struct Deployer<'a, R, S> {
    settings: &'a DeploymentSettings,
    runner: &'a R,
    sleeper: &'a S,
    skip_function_url: bool,
}

#[derive(Debug, Clone)]
pub struct DeploymentSummary {
    pub function_name: String,
    pub region: String,
    pub profile: String,
    pub duration: Duration,
    pub function_url: Option<String>,
}

impl<'a, R, S> Deployer<'a, R, S>
where
    R: CommandRunner,
    S: Sleeper,
{
    pub fn new(settings: &'a DeploymentSettings, runner: &'a R, sleeper: &'a S) -> Self {
        Self {
            settings,
            runner,
            sleeper,
            skip_function_url: false,
        }
    }

    pub fn skip_function_url(mut self, skip: bool) -> Self {
        self.skip_function_url = skip;
        self
    }

    #[tracing::instrument(
        name = "Deploying function",
        skip(self),
        fields(
            function_name = %self.settings.function_name,
            region = %self.settings.region,
            profile = %self.settings.profile_label()
        )
    )]
    pub fn run(&self) -> Result<DeploymentSummary, DeployError> {
        let started = Instant::now();
        let outcome = self.run_steps();

        // The archive is removed whatever happened to the deployment.
        match remove_package(&self.settings.package_path) {
            Ok(true) => tracing::info!("Cleaned up deployment package"),
            Ok(false) => {}
            Err(e) => tracing::warn!(
                error.message = %e,
                path = %self.settings.package_path.display(),
                "Could not clean up deployment package"
            ),
        }

        let function_url = outcome?;
        Ok(DeploymentSummary {
            function_name: self.settings.function_name.clone(),
            region: self.settings.region.clone(),
            profile: self.settings.profile_label().to_string(),
            duration: started.elapsed(),
            function_url,
        })
    }

    fn run_steps(&self) -> Result<Option<String>, DeployError> {
        tracing::info!("STEP 1/3: IAM role configuration");
        let role_arn = self.ensure_role()?;

        tracing::info!("STEP 2/3: Lambda function deployment");
        self.deploy_function(&role_arn)?;

        if self.skip_function_url {
            tracing::info!("Skipping function URL configuration");
            return Ok(None);
        }
        tracing::info!("STEP 3/3: Function URL configuration");
        self.configure_function_url()
    }

    /// Create the execution role if needed and return its ARN.
    pub fn ensure_role(&self) -> Result<String, DeployError> {
        let role_name = self.settings.role_name();
        let trust_policy = TrustPolicy::lambda_assume_role().to_json()?;
        tracing::info!(role_name = %role_name, "Checking IAM role");

        self.execute(
            "Create IAM role",
            AwsCommand::new(["iam", "create-role", "--role-name", role_name.as_str()])
                .arg("--assume-role-policy-document")
                .arg(trust_policy),
        )?;
        self.execute(
            "Attach Lambda execution policy",
            AwsCommand::new(["iam", "attach-role-policy", "--role-name", role_name.as_str()])
                .arg("--policy-arn")
                .arg(LAMBDA_BASIC_EXECUTION_POLICY),
        )?;

        let delay = self.settings.role_propagation_delay();
        tracing::info!(seconds = delay.as_secs(), "Waiting for IAM role to propagate");
        self.sleeper.sleep(delay);

        let role_arn = self.execute(
            "Fetch role ARN",
            AwsCommand::new(["iam", "get-role", "--role-name", role_name.as_str()])
                .arg("--query")
                .arg("Role.Arn")
                .arg("--output")
                .arg("text"),
        )?;
        match role_arn.filter(|arn| !arn.is_empty()) {
            Some(arn) => {
                tracing::info!(role_arn = %arn, "Resolved IAM role");
                Ok(arn)
            }
            None => Err(DeployError::RoleUnavailable { role_name }),
        }
    }

    /// Upload the packaged code, updating the function when it already exists.
    pub fn deploy_function(&self, role_arn: &str) -> Result<(), DeployError> {
        let settings = self.settings;
        let package = DeploymentPackage::build(&settings.package_path, &settings.package_entries)?;
        let function_name = settings.function_name.as_str();

        let exists = self.probe(
            "Check function",
            AwsCommand::new(["lambda", "get-function", "--function-name", function_name]),
        )?;
        if exists {
            tracing::info!("Function exists, updating code");
            self.execute(
                "Update function code",
                AwsCommand::new(["lambda", "update-function-code"])
                    .arg("--function-name")
                    .arg(function_name)
                    .arg("--zip-file")
                    .arg(package.zip_file_arg()),
            )?;
        } else {
            tracing::info!(
                runtime = %settings.runtime,
                handler = %settings.handler,
                timeout_seconds = settings.timeout_seconds,
                memory_size_mb = settings.memory_size_mb,
                "Function does not exist, creating"
            );
            let mut command = AwsCommand::new(["lambda", "create-function"])
                .arg("--function-name")
                .arg(function_name)
                .arg("--runtime")
                .arg(&settings.runtime)
                .arg("--role")
                .arg(role_arn)
                .arg("--handler")
                .arg(&settings.handler)
                .arg("--zip-file")
                .arg(package.zip_file_arg())
                .arg("--timeout")
                .arg(settings.timeout_seconds.to_string())
                .arg("--memory-size")
                .arg(settings.memory_size_mb.to_string());
            if !settings.layers.is_empty() {
                command = command.arg("--layers");
                for layer in &settings.layers {
                    command = command.arg(layer);
                }
            }
            if let Some(environment) = settings.environment_argument() {
                command = command.arg("--environment").arg(environment);
            }
            self.execute("Create function", command)?;
        }

        let delay = settings.function_ready_delay();
        tracing::info!(seconds = delay.as_secs(), "Waiting for function to be ready");
        self.sleeper.sleep(delay);
        Ok(())
    }

    /// Expose the function through a public URL and return it.
    pub fn configure_function_url(&self) -> Result<Option<String>, DeployError> {
        let function_name = self.settings.function_name.as_str();

        let exists = self.probe(
            "Check function URL",
            AwsCommand::new([
                "lambda",
                "get-function-url-config",
                "--function-name",
                function_name,
            ]),
        )?;
        if exists {
            tracing::info!("Function URL already exists");
        } else {
            tracing::info!(cors = FUNCTION_URL_CORS, "Function URL does not exist, creating");
            self.execute(
                "Create function URL",
                AwsCommand::new(["lambda", "create-function-url-config"])
                    .arg("--function-name")
                    .arg(function_name)
                    .arg("--auth-type")
                    .arg("NONE")
                    .arg("--cors")
                    .arg(FUNCTION_URL_CORS),
            )?;
            self.execute(
                "Add public access permission",
                AwsCommand::new(["lambda", "add-permission"])
                    .arg("--function-name")
                    .arg(function_name)
                    .arg("--statement-id")
                    .arg(PUBLIC_ACCESS_STATEMENT_ID)
                    .arg("--action")
                    .arg("lambda:InvokeFunctionUrl")
                    .arg("--principal")
                    .arg("*")
                    .arg("--function-url-auth-type")
                    .arg("NONE"),
            )?;
        }

        let function_url = self
            .execute(
                "Fetch function URL",
                AwsCommand::new([
                    "lambda",
                    "get-function-url-config",
                    "--function-name",
                    function_name,
                ])
                .arg("--query")
                .arg("FunctionUrl")
                .arg("--output")
                .arg("text"),
            )?
            .filter(|url| !url.is_empty());
        if let Some(url) = &function_url {
            tracing::info!(function_url = %url, "Function URL ready");
        }
        Ok(function_url)
    }

    /// Run a state-changing command; tolerated failures yield `None`.
    fn execute(
        &self,
        step: &'static str,
        command: AwsCommand,
    ) -> Result<Option<String>, DeployError> {
        let output = self.invoke(command)?;
        match output.classify() {
            CommandOutcome::Completed(stdout) => {
                tracing::info!(step, "Success");
                Ok(Some(stdout))
            }
            CommandOutcome::Tolerated { status, detail } => {
                tracing::info!(step, status = ?status, detail = %detail, "Tolerated CLI failure");
                Ok(None)
            }
            CommandOutcome::Failed { status, detail } => {
                tracing::error!(step, status = ?status, detail = %detail, "CLI command failed");
                Err(DeployError::CommandFailed {
                    step,
                    status,
                    detail: CliMessage(detail),
                })
            }
        }
    }

    /// Run an existence check.
    fn probe(&self, step: &'static str, command: AwsCommand) -> Result<bool, DeployError> {
        let output = self.invoke(command)?;
        match output.probe() {
            ProbeOutcome::Found => Ok(true),
            ProbeOutcome::Absent => Ok(false),
            ProbeOutcome::Failed { status, detail } => {
                tracing::error!(step, status = ?status, detail = %detail, "CLI command failed");
                Err(DeployError::CommandFailed {
                    step,
                    status,
                    detail: CliMessage(detail),
                })
            }
        }
    }

    fn invoke(&self, command: AwsCommand) -> Result<CommandOutput, DeployError> {
        let command = command
            .region(&self.settings.region)
            .with_profile(self.settings.profile());
        tracing::info!(command = %command.display(), "Executing");

        self.runner
            .run(&command)
            .map_err(|source| DeployError::Spawn {
                command: command.display(),
                source,
            })
    }
}

impl DeploymentSummary {
    /// A `curl` call exercising the login route through the function URL.
    pub fn login_smoke_test(&self) -> Option<String> {
        self.function_url.as_ref().map(|url| {
            let base = if url.ends_with('/') {
                url.to_string()
            } else {
                format!("{}/", url)
            };
            format!(
                "curl -X POST {}api/auth/login -H \"Content-Type: application/json\" -d '{{\"email\":\"test@test.com\",\"password\":\"test123\"}}'",
                base
            )
        })
    }
}

impl std::fmt::Display for DeploymentSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Deployment Summary:")?;
        writeln!(f, "   Function Name: {}", self.function_name)?;
        writeln!(f, "   Region: {}", self.region)?;
        writeln!(f, "   Profile: {}", self.profile)?;
        writeln!(f, "   Duration: {:.2} seconds", self.duration.as_secs_f64())?;
        match (&self.function_url, self.login_smoke_test()) {
            (Some(url), Some(smoke_test)) => {
                writeln!(f, "   Function URL: {}", url)?;
                writeln!(f)?;
                writeln!(f, "Test your API:")?;
                write!(f, "   {}", smoke_test)
            }
            _ => write!(f, "   Function URL: unavailable"),
        }
    }
}
