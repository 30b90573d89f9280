use aws_sdk_comprehend::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_comprehend::operation::contains_pii_entities::ContainsPiiEntitiesOutput;
use aws_sdk_comprehend::operation::detect_entities::DetectEntitiesOutput;
use aws_sdk_comprehend::operation::detect_key_phrases::DetectKeyPhrasesOutput;
use aws_sdk_comprehend::operation::detect_sentiment::DetectSentimentOutput;
use aws_sdk_comprehend::types::LanguageCode;
use aws_sdk_translate::operation::translate_text::TranslateTextOutput;
use nlp_api_core::contract::{
    DetectedEntity, EntitiesOutput, KeyPhrase, KeyPhrasesOutput, PiiLabel, PiiOutput,
    SentimentOutput, SentimentScore, TranslateOutput,
};
use nlp_api_core::requests::{
    EntitiesRequest, KeyPhrasesRequest, PiiRequest, SentimentRequest, TranslateRequest,
};
use serde_json::json;

use crate::adapters::provider::{NlpProvider, ProviderError};
use crate::logging::log_error;

pub const REQUEST_TIMEOUT_CODE: &str = "RequestTimeout";
pub const SERVICE_UNAVAILABLE_CODE: &str = "ServiceUnavailable";
const SERVICE_REJECTED_MESSAGE: &str = "The NLP service rejected the request.";
const TIMEOUT_MESSAGE: &str = "The NLP service did not respond in time.";
const UNAVAILABLE_MESSAGE: &str = "The NLP service is currently unavailable.";

/// Amazon Translate and Amazon Comprehend behind the [`NlpProvider`] seam.
#[derive(Debug, Clone)]
pub struct AwsNlpProvider {
    translate_client: aws_sdk_translate::Client,
    comprehend_client: aws_sdk_comprehend::Client,
}

impl AwsNlpProvider {
    /// Loads the default credential chain once and builds both clients from it.
    /// `region` overrides the region resolved from the environment.
    pub async fn load(region: Option<String>) -> Self {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(aws_config::Region::new(region));
        }
        let config = loader.load().await;

        Self {
            translate_client: aws_sdk_translate::Client::new(&config),
            comprehend_client: aws_sdk_comprehend::Client::new(&config),
        }
    }
}

/// Service errors keep the code and message the service returned. Every other
/// failure is reported under a fixed code; its full context only reaches the
/// log.
fn provider_error<E, R>(error: SdkError<E, R>) -> ProviderError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    let (code, message) = match &error {
        SdkError::ServiceError(context) => {
            let service_error = context.err();
            return ProviderError::new(
                service_error.code(),
                service_error.message().unwrap_or(SERVICE_REJECTED_MESSAGE),
            );
        }
        SdkError::TimeoutError(_) => (REQUEST_TIMEOUT_CODE, TIMEOUT_MESSAGE),
        _ => (SERVICE_UNAVAILABLE_CODE, UNAVAILABLE_MESSAGE),
    };

    log_error(
        "upstream_transport_failed",
        json!({
            "code": code,
            "detail": DisplayErrorContext(&error).to_string(),
        }),
    );
    ProviderError::new(Some(code), message)
}

fn translate_output(output: &TranslateTextOutput) -> TranslateOutput {
    TranslateOutput {
        source_language_code: output.source_language_code().to_string(),
        target_language_code: output.target_language_code().to_string(),
        translated_text: output.translated_text().to_string(),
    }
}

fn sentiment_output(output: &DetectSentimentOutput) -> SentimentOutput {
    SentimentOutput {
        sentiment: output.sentiment().map(|value| value.as_str().to_string()),
        sentiment_score: output.sentiment_score().map(|score| SentimentScore {
            positive: score.positive(),
            negative: score.negative(),
            neutral: score.neutral(),
            mixed: score.mixed(),
        }),
    }
}

fn pii_output(output: &ContainsPiiEntitiesOutput) -> PiiOutput {
    PiiOutput {
        labels: output
            .labels()
            .iter()
            .map(|label| PiiLabel {
                name: label.name().map(|name| name.as_str().to_string()),
                score: label.score(),
            })
            .collect(),
    }
}

fn key_phrases_output(output: &DetectKeyPhrasesOutput) -> KeyPhrasesOutput {
    KeyPhrasesOutput {
        key_phrases: output
            .key_phrases()
            .iter()
            .map(|phrase| KeyPhrase {
                text: phrase.text().map(str::to_string),
                score: phrase.score(),
                begin_offset: phrase.begin_offset(),
                end_offset: phrase.end_offset(),
            })
            .collect(),
    }
}

fn entities_output(output: &DetectEntitiesOutput) -> EntitiesOutput {
    EntitiesOutput {
        entities: output
            .entities()
            .iter()
            .map(|entity| DetectedEntity {
                text: entity.text().map(str::to_string),
                entity_type: entity.r#type().map(|kind| kind.as_str().to_string()),
                score: entity.score(),
                begin_offset: entity.begin_offset(),
                end_offset: entity.end_offset(),
            })
            .collect(),
    }
}

impl NlpProvider for AwsNlpProvider {
    async fn translate(
        &self,
        request: &TranslateRequest,
    ) -> Result<TranslateOutput, ProviderError> {
        let output = self
            .translate_client
            .translate_text()
            .text(&request.text)
            .source_language_code(&request.source_language_code)
            .target_language_code(&request.target_language_code)
            .send()
            .await
            .map_err(provider_error)?;

        Ok(translate_output(&output))
    }

    async fn detect_sentiment(
        &self,
        request: &SentimentRequest,
    ) -> Result<SentimentOutput, ProviderError> {
        let output = self
            .comprehend_client
            .detect_sentiment()
            .text(&request.text)
            .language_code(LanguageCode::from(request.language_code.as_str()))
            .send()
            .await
            .map_err(provider_error)?;

        Ok(sentiment_output(&output))
    }

    async fn contains_pii(&self, request: &PiiRequest) -> Result<PiiOutput, ProviderError> {
        let output = self
            .comprehend_client
            .contains_pii_entities()
            .text(&request.text)
            .language_code(LanguageCode::from(request.language_code.as_str()))
            .send()
            .await
            .map_err(provider_error)?;

        Ok(pii_output(&output))
    }

    async fn detect_key_phrases(
        &self,
        request: &KeyPhrasesRequest,
    ) -> Result<KeyPhrasesOutput, ProviderError> {
        let output = self
            .comprehend_client
            .detect_key_phrases()
            .text(&request.text)
            .language_code(LanguageCode::from(request.language_code.as_str()))
            .send()
            .await
            .map_err(provider_error)?;

        Ok(key_phrases_output(&output))
    }

    async fn detect_entities(
        &self,
        request: &EntitiesRequest,
    ) -> Result<EntitiesOutput, ProviderError> {
        let output = self
            .comprehend_client
            .detect_entities()
            .text(&request.text)
            .language_code(LanguageCode::from(request.language_code.as_str()))
            .send()
            .await
            .map_err(provider_error)?;

        Ok(entities_output(&output))
    }
}
