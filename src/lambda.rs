use lambda_runtime::{Error, LambdaEvent, service_fn};
use tickets_api::configuration::get_configuration;
use tickets_api::function_url::{FunctionUrlRequest, FunctionUrlResponse, LocalForwarder};
use tickets_api::startup::Application;
use tickets_api::telemetry::{get_subscriber, init_subscriber};

const LOOPBACK: &str = "127.0.0.1";

async fn handle_request(
    forwarder: &LocalForwarder,
    event: LambdaEvent<FunctionUrlRequest>,
) -> Result<FunctionUrlResponse, Error> {
    Ok(forwarder.forward(event.payload).await?)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let subscriber = get_subscriber("tickets_api".into(), "info".into(), std::io::stdout);
    init_subscriber(subscriber);

    let mut configuration = get_configuration()?;
    configuration.application.host = LOOPBACK.into();
    configuration.application.port = 0;

    let application = Application::build(configuration).await?;
    let forwarder = LocalForwarder::new(format!("http://{}:{}", LOOPBACK, application.port()))?;
    tracing::info!(port = application.port(), "Server running behind the function URL");
    let _ = tokio::spawn(application.run_until_stopped());

    lambda_runtime::run(service_fn(|event| handle_request(&forwarder, event))).await
}
