//! Handlers backed by the managed text-analytics service.

use nlp_api_core::contract::NlpOperation;
use nlp_api_core::requests::{
    EntitiesRequest, KeyPhrasesRequest, Payload, PiiRequest, SentimentRequest,
};

use crate::adapters::provider::NlpProvider;
use crate::handlers::{provider_outcome, validation_rejected, ApiGatewayResponse};

/// Rejects the request unless both `text` and `languageCode` are present.
pub async fn handle_detect_sentiment(
    payload: Option<&Payload>,
    provider: &impl NlpProvider,
) -> ApiGatewayResponse {
    let request = match SentimentRequest::from_payload(payload) {
        Ok(value) => value,
        Err(error) => return validation_rejected(NlpOperation::DetectSentiment, &error),
    };

    provider_outcome(
        NlpOperation::DetectSentiment,
        provider.detect_sentiment(&request).await,
    )
}

pub async fn handle_contains_pii(
    payload: Option<&Payload>,
    provider: &impl NlpProvider,
) -> ApiGatewayResponse {
    let request = match PiiRequest::from_payload(payload) {
        Ok(value) => value,
        Err(error) => return validation_rejected(NlpOperation::ContainsPii, &error),
    };

    provider_outcome(NlpOperation::ContainsPii, provider.contains_pii(&request).await)
}

pub async fn handle_detect_key_phrases(
    payload: Option<&Payload>,
    provider: &impl NlpProvider,
) -> ApiGatewayResponse {
    let request = match KeyPhrasesRequest::from_payload(payload) {
        Ok(value) => value,
        Err(error) => return validation_rejected(NlpOperation::DetectKeyPhrases, &error),
    };

    provider_outcome(
        NlpOperation::DetectKeyPhrases,
        provider.detect_key_phrases(&request).await,
    )
}

pub async fn handle_detect_entities(
    payload: Option<&Payload>,
    provider: &impl NlpProvider,
) -> ApiGatewayResponse {
    let request = match EntitiesRequest::from_payload(payload) {
        Ok(value) => value,
        Err(error) => return validation_rejected(NlpOperation::DetectEntities, &error),
    };

    provider_outcome(
        NlpOperation::DetectEntities,
        provider.detect_entities(&request).await,
    )
}

#[cfg(test)]
mod tests {
    use nlp_api_core::requests::payload_from_event;
    use serde_json::{json, Value};

    use crate::handlers::tests::{body_json, CapturingProvider};

    use super::*;

    fn payload(body: Value) -> Option<Payload> {
        payload_from_event(&json!({ "body": body.to_string() }))
    }

    #[tokio::test]
    async fn sentiment_rejects_missing_language_code() {
        let provider = CapturingProvider::new();

        let response =
            handle_detect_sentiment(payload(json!({"text": "great"})).as_ref(), &provider).await;

        assert_eq!(
            body_json(&response),
            json!({
                "data": null,
                "error": {"message": "Missing source text or language code."},
            })
        );
        assert!(provider.calls().is_empty());
    }

    #[tokio::test]
    async fn sentiment_returns_only_label_and_scores() {
        let provider = CapturingProvider::new();

        let response = handle_detect_sentiment(
            payload(json!({"text": "great", "languageCode": "en"})).as_ref(),
            &provider,
        )
        .await;

        assert_eq!(
            body_json(&response),
            json!({
                "data": {"Sentiment": "POSITIVE", "SentimentScore": null},
                "error": null,
            })
        );
    }

    #[tokio::test]
    async fn pii_ignores_requested_language() {
        let provider = CapturingProvider::new();

        let response = handle_contains_pii(
            payload(json!({"text": "my number", "languageCode": "es"})).as_ref(),
            &provider,
        )
        .await;

        assert_eq!(provider.calls()[0].1["language_code"], "en");
        assert_eq!(
            body_json(&response),
            json!({"data": {"Labels": []}, "error": null})
        );
    }

    #[tokio::test]
    async fn key_phrases_default_to_english() {
        let provider = CapturingProvider::new();

        let response = handle_detect_key_phrases(
            payload(json!({"text": "The quick fox"})).as_ref(),
            &provider,
        )
        .await;

        assert_eq!(
            provider.calls(),
            vec![(
                NlpOperation::DetectKeyPhrases,
                json!({"text": "The quick fox", "language_code": "en"})
            )]
        );
        assert_eq!(
            body_json(&response)["data"],
            json!({
                "KeyPhrases": [{
                    "Text": "quick fox",
                    "Score": 0.5,
                    "BeginOffset": 4,
                    "EndOffset": 13,
                }]
            })
        );
    }

    #[tokio::test]
    async fn entities_report_missing_text() {
        let provider = CapturingProvider::new();

        let response =
            handle_detect_entities(payload(json!({"languageCode": "en"})).as_ref(), &provider)
                .await;

        assert_eq!(
            body_json(&response),
            json!({"data": null, "error": {"message": "Missing source text."}})
        );
        assert!(provider.calls().is_empty());
    }
}
