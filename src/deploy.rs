use clap::Parser;
use std::process::ExitCode;
use std::time::Instant;
use tickets_api::configuration::{DeploymentSettings, get_configuration};
use tickets_api::deployment::{Deployer, SystemRunner, ThreadSleeper};
use tickets_api::telemetry::{get_subscriber, init_subscriber};

const RULE_WIDTH: usize = 60;

#[derive(Parser)]
#[command(
    name = "deploy",
    about = "Package the backend and deploy it as an AWS Lambda function",
    long_about = "Creates the execution role, creates or updates the function code\n\
                  and exposes it through a public function URL using the `aws` CLI."
)]
struct Cli {
    /// Name of the Lambda function (defaults to the configured one)
    #[arg(long)]
    function_name: Option<String>,
    /// AWS region to deploy to
    #[arg(long, env = "AWS_REGION")]
    region: Option<String>,
    /// Named credential profile passed to the `aws` CLI
    #[arg(long, env = "AWS_PROFILE")]
    profile: Option<String>,
    /// Stop once the function is deployed, leaving its URL untouched
    #[arg(long)]
    skip_url: bool,
}

impl Cli {
    fn apply(self, settings: &mut DeploymentSettings) {
        if let Some(function_name) = self.function_name {
            settings.function_name = function_name;
        }
        if let Some(region) = self.region.filter(|region| !region.trim().is_empty()) {
            settings.region = region;
        }
        if let Some(profile) = self.profile {
            settings.profile = Some(profile);
        }
    }
}

fn rule() -> String {
    "=".repeat(RULE_WIDTH)
}

fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    let skip_url = cli.skip_url;

    let subscriber = get_subscriber("deploy".into(), "info".into(), std::io::stdout);
    init_subscriber(subscriber);

    let mut configuration = match get_configuration() {
        Ok(configuration) => configuration,
        Err(e) => {
            eprintln!("Failed to read configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };
    cli.apply(&mut configuration.deployment);
    let settings = configuration.deployment;

    println!("{}", rule());
    println!("Starting deployment to AWS Lambda...");
    println!("Function Name: {}", settings.function_name);
    println!("Region: {}", settings.region);
    println!("AWS Profile: {}", settings.profile_label());
    println!("Timestamp: {}", chrono::Utc::now().to_rfc3339());
    println!("{}", rule());

    let started = Instant::now();
    let runner = SystemRunner::default();
    let deployer = Deployer::new(&settings, &runner, &ThreadSleeper).skip_function_url(skip_url);

    match deployer.run() {
        Ok(summary) => {
            println!("\n{}", rule());
            println!("DEPLOYMENT SUCCESSFUL!");
            println!("{}", rule());
            println!("{}", summary);
            println!("{}", rule());
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!(error.cause_chain = ?e, error.message = %e, "Deployment failed");
            eprintln!("\n{}", rule());
            eprintln!("DEPLOYMENT FAILED!");
            eprintln!("{}", rule());
            eprintln!("Deployment Info:");
            eprintln!("   Function Name: {}", settings.function_name);
            eprintln!("   Region: {}", settings.region);
            eprintln!("   Profile: {}", settings.profile_label());
            eprintln!(
                "   Duration: {:.2} seconds",
                started.elapsed().as_secs_f64()
            );
            eprintln!("\nError Details:\n{:?}", e);
            eprintln!("{}", rule());
            ExitCode::FAILURE
        }
    }
}
