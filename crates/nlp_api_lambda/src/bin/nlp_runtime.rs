use lambda_runtime::{service_fn, Error, LambdaEvent};
use nlp_api_lambda::adapters::aws::AwsNlpProvider;
use nlp_api_lambda::config::RuntimeConfig;
use nlp_api_lambda::handlers::{handle_event, ApiGatewayResponse};
use nlp_api_lambda::logging;
use serde_json::{json, Value};
use tokio::sync::OnceCell;

static PROVIDER: OnceCell<AwsNlpProvider> = OnceCell::const_new();

async fn shared_provider(config: &RuntimeConfig) -> &'static AwsNlpProvider {
    PROVIDER
        .get_or_init(|| AwsNlpProvider::load(config.region.clone()))
        .await
}

async fn handle_request(
    config: &RuntimeConfig,
    event: LambdaEvent<Value>,
) -> Result<ApiGatewayResponse, Error> {
    let operation = config
        .resolve_operation(&event.payload)
        .map_err(|error| Error::from(error.message().to_string()))?;
    let provider = shared_provider(config).await;

    Ok(handle_event(operation, &event.payload, provider).await)
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    let config = RuntimeConfig::from_env()
        .map_err(|error| Error::from(format!("invalid runtime configuration: {error}")))?;
    logging::init(config.environment);
    logging::log_info(
        "runtime_configured",
        json!({
            "operation": config.operation.map(|operation| operation.as_str()),
            "region": config.region,
        }),
    );
    let config = &config;

    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| async move {
        handle_request(config, event).await
    }))
    .await
}
