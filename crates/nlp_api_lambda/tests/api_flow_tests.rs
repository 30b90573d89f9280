mod support;

use nlp_api_core::contract::NlpOperation;
use nlp_api_core::provisioning::{assemble_api, DeploymentEnvironment};
use nlp_api_lambda::adapters::provider::ProviderError;
use nlp_api_lambda::config::RuntimeConfig;
use nlp_api_lambda::handlers::{handle_event, ApiGatewayResponse};
use serde_json::{json, Value};
use support::provider::RecordingProvider;

fn proxy_event(resource: &str, body: &str) -> Value {
    json!({
        "resource": resource,
        "path": resource,
        "httpMethod": "POST",
        "headers": {"Content-Type": "application/json"},
        "body": body,
        "isBase64Encoded": false,
    })
}

fn body_json(response: &ApiGatewayResponse) -> Value {
    serde_json::from_str(&response.body).expect("body should be JSON")
}

async fn dispatch(event: &Value, provider: &RecordingProvider) -> ApiGatewayResponse {
    let operation = RuntimeConfig::default()
        .resolve_operation(event)
        .expect("route should resolve");
    handle_event(operation, event, provider).await
}

#[tokio::test]
async fn translate_route_applies_defaults_and_wraps_translation() {
    let provider = RecordingProvider::default();
    let event = proxy_event("/translate", r#"{"text": "Bonjour"}"#);

    let response = dispatch(&event, &provider).await;

    assert_eq!(
        provider.calls(),
        vec![(
            NlpOperation::Translate,
            json!({
                "text": "Bonjour",
                "source_language_code": "auto",
                "target_language_code": "en",
            })
        )]
    );
    assert_eq!(response.status_code, 200);
    assert_eq!(
        body_json(&response),
        json!({
            "data": {
                "SourceLanguageCode": "fr",
                "TargetLanguageCode": "en",
                "TranslatedText": "Hello",
            },
            "error": null,
        })
    );
}

#[tokio::test]
async fn sentiment_route_rejects_empty_body_without_outbound_call() {
    let provider = RecordingProvider::default();
    let event = proxy_event("/comprehend/sentiment", "{}");

    let response = dispatch(&event, &provider).await;

    assert_eq!(response.status_code, 400);
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
async fn unparsable_body_is_reported_as_missing_text() {
    let provider = RecordingProvider::default();
    let event = proxy_event("/comprehend/detect-key-phrases", "{not json");

    let response = dispatch(&event, &provider).await;

    assert_eq!(
        body_json(&response),
        json!({"data": null, "error": {"message": "Missing source text."}})
    );
    assert!(provider.calls().is_empty());
}

#[tokio::test]
async fn successful_calls_return_exactly_the_operation_fields() {
    let provider = RecordingProvider::default();
    let body = r#"{"text": "Call Berlin", "languageCode": "en"}"#;
    let expected_keys = [
        ("/translate", vec!["SourceLanguageCode", "TargetLanguageCode", "TranslatedText"]),
        ("/comprehend/sentiment", vec!["Sentiment", "SentimentScore"]),
        ("/comprehend/detect-pii", vec!["Labels"]),
        ("/comprehend/detect-key-phrases", vec!["KeyPhrases"]),
        ("/comprehend/detect-entities", vec!["Entities"]),
    ];

    for (route, keys) in expected_keys {
        let response = dispatch(&proxy_event(route, body), &provider).await;
        let envelope = body_json(&response);

        assert_eq!(envelope["error"], Value::Null, "{route}");
        let mut actual: Vec<&str> = envelope["data"]
            .as_object()
            .expect("data should be an object")
            .keys()
            .map(String::as_str)
            .collect();
        actual.sort_unstable();
        let mut expected = keys.clone();
        expected.sort_unstable();
        assert_eq!(actual, expected, "{route}");
    }
}

#[tokio::test]
async fn upstream_failure_is_returned_as_error_envelope() {
    let provider = RecordingProvider::failing_with(ProviderError::new(
        Some("UnsupportedLanguagePairException"),
        "Unsupported language pair: xx to en",
    ));
    let event = proxy_event("/translate", r#"{"text": "??", "sourceLanguageCode": "xx"}"#);

    let response = dispatch(&event, &provider).await;

    assert_eq!(response.status_code, 400);
    assert_eq!(
        body_json(&response),
        json!({
            "data": null,
            "error": {
                "code": "UnsupportedLanguagePairException",
                "message": "Unsupported language pair: xx to en",
            },
        })
    );
}

#[test]
fn every_provisioned_route_resolves_to_its_handler() {
    let plan = assemble_api(DeploymentEnvironment::Staging);

    for (route, function) in plan.routes.iter().zip(&plan.functions) {
        let stage_path = format!("/{}{}", plan.stage_name, route.path);
        let operation = RuntimeConfig::default()
            .resolve_operation(&json!({"path": stage_path}))
            .expect("route should resolve");
        assert_eq!(operation, function.handler);
        assert_eq!(route.function_id, function.function_id);
    }
}
