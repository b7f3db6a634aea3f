use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;
use tracing::info;

use doc_store::{
    config::{Config, LogFormat},
    handle_event,
    models::{AppState, DocumentLocation},
    storage,
    utils::init_logger,
    ProxyEvent, ProxyResponse,
};

#[tokio::main]
async fn main() -> Result<(), Error> {
    let config = Config::from_env()?;
    init_logger(config.logging.format.unwrap_or(LogFormat::Json));

    let location = DocumentLocation::default();
    let store = storage::from_config(&config.storage, &location)?;
    let state = AppState::new(store);
    info!("Lambda handler ready for {}", location);

    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| {
        let state = state.clone();
        async move {
            info!(request_id = %event.context.request_id, "Invocation received");
            let event = ProxyEvent::from_payload(event.payload);
            Ok::<ProxyResponse, Error>(handle_event(&state, event).await)
        }
    }))
    .await
}
