pub mod comprehend;
pub mod translate;

use nlp_api_core::contract::{NlpOperation, ValidationError};
use nlp_api_core::envelope::ResponseEnvelope;
use nlp_api_core::requests::payload_from_event;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::adapters::provider::{NlpProvider, ProviderError};
use crate::logging::{log_error, log_info};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ApiGatewayResponse {
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub headers: Value,
    pub body: String,
}

impl ApiGatewayResponse {
    fn from_envelope(envelope: &ResponseEnvelope) -> Self {
        Self {
            status_code: envelope.status_code(),
            headers: json!({"Content-Type": "application/json"}),
            body: envelope.to_json().to_string(),
        }
    }
}

pub fn data_response(payload: impl Serialize) -> ApiGatewayResponse {
    match ResponseEnvelope::data(payload) {
        Ok(envelope) => ApiGatewayResponse::from_envelope(&envelope),
        Err(error) => serialization_failure(&error),
    }
}

pub fn error_response(error: impl Serialize) -> ApiGatewayResponse {
    match ResponseEnvelope::error(error) {
        Ok(envelope) => ApiGatewayResponse::from_envelope(&envelope),
        Err(error) => serialization_failure(&error),
    }
}

fn serialization_failure(error: &serde_json::Error) -> ApiGatewayResponse {
    ApiGatewayResponse::from_envelope(&ResponseEnvelope::message(format!(
        "Failed to serialize response: {error}"
    )))
}

/// Routes one inbound event to the handler for `operation`.
pub async fn handle_event(
    operation: NlpOperation,
    event: &Value,
    provider: &impl NlpProvider,
) -> ApiGatewayResponse {
    let payload = payload_from_event(event);
    log_info(
        "request_received",
        json!({
            "operation": operation.as_str(),
            "payload_present": payload.is_some(),
            "text_length": payload
                .as_ref()
                .and_then(|map| map.get("text"))
                .and_then(Value::as_str)
                .map(str::len),
        }),
    );

    let payload = payload.as_ref();
    let response = match operation {
        NlpOperation::Translate => translate::handle_translate(payload, provider).await,
        NlpOperation::DetectSentiment => {
            comprehend::handle_detect_sentiment(payload, provider).await
        }
        NlpOperation::ContainsPii => comprehend::handle_contains_pii(payload, provider).await,
        NlpOperation::DetectKeyPhrases => {
            comprehend::handle_detect_key_phrases(payload, provider).await
        }
        NlpOperation::DetectEntities => {
            comprehend::handle_detect_entities(payload, provider).await
        }
    };

    log_info(
        "request_completed",
        json!({
            "operation": operation.as_str(),
            "status_code": response.status_code,
        }),
    );
    response
}

fn validation_rejected(operation: NlpOperation, error: &ValidationError) -> ApiGatewayResponse {
    log_info(
        "validation_rejected",
        json!({
            "operation": operation.as_str(),
            "message": error.message(),
        }),
    );
    error_response(json!({ "message": error.message() }))
}

fn provider_outcome<T: Serialize>(
    operation: NlpOperation,
    result: Result<T, ProviderError>,
) -> ApiGatewayResponse {
    match result {
        Ok(output) => data_response(output),
        Err(error) => {
            log_error(
                "upstream_failed",
                json!({
                    "operation": operation.as_str(),
                    "code": error.code.clone(),
                    "message": error.message.clone(),
                }),
            );
            error_response(error)
        }
    }
}
