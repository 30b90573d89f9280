use std::sync::Mutex;

use nlp_api_core::contract::{
    DetectedEntity, EntitiesOutput, KeyPhrasesOutput, NlpOperation, PiiLabel, PiiOutput,
    SentimentOutput, SentimentScore, TranslateOutput,
};
use nlp_api_core::requests::{
    EntitiesRequest, KeyPhrasesRequest, PiiRequest, SentimentRequest, TranslateRequest,
};
use nlp_api_lambda::adapters::provider::{NlpProvider, ProviderError};
use serde::Serialize;
use serde_json::Value;

/// Canned provider that records every outbound request it receives.
#[derive(Default)]
pub struct RecordingProvider {
    calls: Mutex<Vec<(NlpOperation, Value)>>,
    failure: Option<ProviderError>,
}

impl RecordingProvider {
    pub fn failing_with(error: ProviderError) -> Self {
        Self {
            failure: Some(error),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<(NlpOperation, Value)> {
        self.calls.lock().expect("poisoned mutex").clone()
    }

    fn record(
        &self,
        operation: NlpOperation,
        request: impl Serialize,
    ) -> Result<(), ProviderError> {
        let request = serde_json::to_value(request).expect("request should serialize");
        self.calls
            .lock()
            .expect("poisoned mutex")
            .push((operation, request));
        self.failure.clone().map_or(Ok(()), Err)
    }
}

impl NlpProvider for RecordingProvider {
    async fn translate(
        &self,
        request: &TranslateRequest,
    ) -> Result<TranslateOutput, ProviderError> {
        self.record(NlpOperation::Translate, request)?;
        Ok(TranslateOutput {
            source_language_code: "fr".to_string(),
            target_language_code: request.target_language_code.clone(),
            translated_text: "Hello".to_string(),
        })
    }

    async fn detect_sentiment(
        &self,
        request: &SentimentRequest,
    ) -> Result<SentimentOutput, ProviderError> {
        self.record(NlpOperation::DetectSentiment, request)?;
        Ok(SentimentOutput {
            sentiment: Some("NEUTRAL".to_string()),
            sentiment_score: Some(SentimentScore {
                positive: Some(0.25),
                negative: Some(0.0),
                neutral: Some(0.75),
                mixed: Some(0.0),
            }),
        })
    }

    async fn contains_pii(&self, request: &PiiRequest) -> Result<PiiOutput, ProviderError> {
        self.record(NlpOperation::ContainsPii, request)?;
        Ok(PiiOutput {
            labels: vec![PiiLabel {
                name: Some("PHONE".to_string()),
                score: Some(0.5),
            }],
        })
    }

    async fn detect_key_phrases(
        &self,
        request: &KeyPhrasesRequest,
    ) -> Result<KeyPhrasesOutput, ProviderError> {
        self.record(NlpOperation::DetectKeyPhrases, request)?;
        Ok(KeyPhrasesOutput {
            key_phrases: Vec::new(),
        })
    }

    async fn detect_entities(
        &self,
        request: &EntitiesRequest,
    ) -> Result<EntitiesOutput, ProviderError> {
        self.record(NlpOperation::DetectEntities, request)?;
        Ok(EntitiesOutput {
            entities: vec![DetectedEntity {
                text: Some("Berlin".to_string()),
                entity_type: Some("LOCATION".to_string()),
                score: Some(0.5),
                begin_offset: Some(0),
                end_offset: Some(6),
            }],
        })
    }
}
