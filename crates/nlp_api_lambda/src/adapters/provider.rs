use std::fmt;
use std::future::Future;

use nlp_api_core::contract::{
    EntitiesOutput, KeyPhrasesOutput, PiiOutput, SentimentOutput, TranslateOutput,
};
use nlp_api_core::requests::{
    EntitiesRequest, KeyPhrasesRequest, PiiRequest, SentimentRequest, TranslateRequest,
};
use serde::{Deserialize, Serialize};

/// Failure raised by the managed NLP service, surfaced verbatim in the error
/// envelope.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProviderError {
    pub code: Option<String>,
    pub message: String,
}

impl ProviderError {
    pub fn new(code: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            code: code.map(str::to_string),
            message: message.into(),
        }
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.code {
            Some(code) => write!(f, "{code}: {}", self.message),
            None => f.write_str(&self.message),
        }
    }
}

impl std::error::Error for ProviderError {}

/// One outbound call per operation. Implementations are shared read-only
/// across invocations.
pub trait NlpProvider {
    fn translate(
        &self,
        request: &TranslateRequest,
    ) -> impl Future<Output = Result<TranslateOutput, ProviderError>> + Send;

    fn detect_sentiment(
        &self,
        request: &SentimentRequest,
    ) -> impl Future<Output = Result<SentimentOutput, ProviderError>> + Send;

    fn contains_pii(
        &self,
        request: &PiiRequest,
    ) -> impl Future<Output = Result<PiiOutput, ProviderError>> + Send;

    fn detect_key_phrases(
        &self,
        request: &KeyPhrasesRequest,
    ) -> impl Future<Output = Result<KeyPhrasesOutput, ProviderError>> + Send;

    fn detect_entities(
        &self,
        request: &EntitiesRequest,
    ) -> impl Future<Output = Result<EntitiesOutput, ProviderError>> + Send;
}
