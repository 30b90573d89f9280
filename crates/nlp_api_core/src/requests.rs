use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::contract::{
    ValidationError, AUTO_LANGUAGE_CODE, DEFAULT_LANGUAGE_CODE, PII_LANGUAGE_CODE,
};

pub type Payload = Map<String, Value>;

pub const MISSING_TRANSLATE_TEXT: &str = "No source text input found.";
pub const MISSING_SENTIMENT_INPUT: &str = "Missing source text or language code.";
pub const MISSING_SOURCE_TEXT: &str = "Missing source text.";

/// Extracts the request payload from an API Gateway proxy event.
///
/// Absent, null or unparsable bodies yield `None` rather than an error, so the
/// handler reports the missing field instead of a parse failure. An event
/// without a `body` key that carries `text` itself is a direct invocation.
pub fn payload_from_event(event: &Value) -> Option<Payload> {
    let object = event.as_object()?;

    let Some(body) = object.get("body") else {
        return object.contains_key("text").then(|| object.clone());
    };

    match body {
        Value::Object(map) => Some(map.clone()),
        Value::String(text) => match serde_json::from_str::<Value>(text) {
            Ok(Value::Object(map)) => Some(map),
            _ => None,
        },
        _ => None,
    }
}

fn string_field<'a>(payload: Option<&'a Payload>, key: &str) -> Option<&'a str> {
    payload
        .and_then(|map| map.get(key))
        .and_then(Value::as_str)
        .filter(|value| !value.is_empty())
}

fn text_or(payload: Option<&Payload>, message: &str) -> Result<String, ValidationError> {
    string_field(payload, "text")
        .map(str::to_string)
        .ok_or_else(|| ValidationError::new(message))
}

fn language_or(payload: Option<&Payload>, key: &str, default: &str) -> String {
    string_field(payload, key).unwrap_or(default).to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TranslateRequest {
    pub text: String,
    pub source_language_code: String,
    pub target_language_code: String,
}

impl TranslateRequest {
    pub fn from_payload(payload: Option<&Payload>) -> Result<Self, ValidationError> {
        Ok(Self {
            text: text_or(payload, MISSING_TRANSLATE_TEXT)?,
            source_language_code: language_or(payload, "sourceLanguageCode", AUTO_LANGUAGE_CODE),
            target_language_code: language_or(
                payload,
                "targetLanguageCode",
                DEFAULT_LANGUAGE_CODE,
            ),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SentimentRequest {
    pub text: String,
    pub language_code: String,
}

impl SentimentRequest {
    /// Both the text and the language code are mandatory for sentiment.
    pub fn from_payload(payload: Option<&Payload>) -> Result<Self, ValidationError> {
        match (
            string_field(payload, "text"),
            string_field(payload, "languageCode"),
        ) {
            (Some(text), Some(language_code)) => Ok(Self {
                text: text.to_string(),
                language_code: language_code.to_string(),
            }),
            _ => Err(ValidationError::new(MISSING_SENTIMENT_INPUT)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PiiRequest {
    pub text: String,
    pub language_code: String,
}

impl PiiRequest {
    /// PII detection is pinned to English regardless of the payload.
    pub fn from_payload(payload: Option<&Payload>) -> Result<Self, ValidationError> {
        Ok(Self {
            text: text_or(payload, MISSING_SOURCE_TEXT)?,
            language_code: PII_LANGUAGE_CODE.to_string(),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct KeyPhrasesRequest {
    pub text: String,
    pub language_code: String,
}

impl KeyPhrasesRequest {
    pub fn from_payload(payload: Option<&Payload>) -> Result<Self, ValidationError> {
        Ok(Self {
            text: text_or(payload, MISSING_SOURCE_TEXT)?,
            language_code: language_or(payload, "languageCode", DEFAULT_LANGUAGE_CODE),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EntitiesRequest {
    pub text: String,
    pub language_code: String,
}

impl EntitiesRequest {
    pub fn from_payload(payload: Option<&Payload>) -> Result<Self, ValidationError> {
        Ok(Self {
            text: text_or(payload, MISSING_SOURCE_TEXT)?,
            language_code: language_or(payload, "languageCode", DEFAULT_LANGUAGE_CODE),
        })
    }
}
