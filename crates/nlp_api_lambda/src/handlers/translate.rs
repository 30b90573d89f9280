use nlp_api_core::contract::NlpOperation;
use nlp_api_core::requests::{Payload, TranslateRequest};

use crate::adapters::provider::NlpProvider;
use crate::handlers::{provider_outcome, validation_rejected, ApiGatewayResponse};

/// Translates `text`, defaulting the source language to `auto` and the
/// target language to `en`.
pub async fn handle_translate(
    payload: Option<&Payload>,
    provider: &impl NlpProvider,
) -> ApiGatewayResponse {
    let request = match TranslateRequest::from_payload(payload) {
        Ok(value) => value,
        Err(error) => return validation_rejected(NlpOperation::Translate, &error),
    };

    provider_outcome(NlpOperation::Translate, provider.translate(&request).await)
}
