use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub const DEFAULT_LANGUAGE_CODE: &str = "en";
pub const AUTO_LANGUAGE_CODE: &str = "auto";
pub const PII_LANGUAGE_CODE: &str = "en";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NlpOperation {
    Translate,
    DetectSentiment,
    ContainsPii,
    DetectKeyPhrases,
    DetectEntities,
}

impl NlpOperation {
    pub const ALL: [NlpOperation; 5] = [
        Self::Translate,
        Self::DetectSentiment,
        Self::ContainsPii,
        Self::DetectKeyPhrases,
        Self::DetectEntities,
    ];

    /// Stable identifier, used as the `NLP_OPERATION` runtime value.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Translate => "translate",
            Self::DetectSentiment => "detect-sentiment",
            Self::ContainsPii => "contains-pii",
            Self::DetectKeyPhrases => "detect-key-phrases",
            Self::DetectEntities => "detect-entities",
        }
    }

    pub fn route_segments(self) -> &'static [&'static str] {
        match self {
            Self::Translate => &["translate"],
            Self::DetectSentiment => &["comprehend", "sentiment"],
            Self::ContainsPii => &["comprehend", "detect-pii"],
            Self::DetectKeyPhrases => &["comprehend", "detect-key-phrases"],
            Self::DetectEntities => &["comprehend", "detect-entities"],
        }
    }

    pub fn route_path(self) -> String {
        format!("/{}", self.route_segments().join("/"))
    }

    pub fn function_name(self) -> &'static str {
        match self {
            Self::Translate => "translateText",
            Self::DetectSentiment => "detectSentiment",
            Self::ContainsPii => "containsPii",
            Self::DetectKeyPhrases => "detectKeyPhrases",
            Self::DetectEntities => "detectEntities",
        }
    }

    pub fn policy_name(self) -> &'static str {
        match self {
            Self::Translate => "translate-text-policy",
            Self::DetectSentiment => "detect-sentiment-policy",
            Self::ContainsPii => "contains-pii-policy",
            Self::DetectKeyPhrases => "detect-key-phrases-policy",
            Self::DetectEntities => "detect-entities-policy",
        }
    }

    /// IAM actions the operation's single outbound call needs. Translation with
    /// an `auto` source language also calls dominant-language detection.
    pub fn policy_actions(self) -> &'static [&'static str] {
        match self {
            Self::Translate => &["translate:TranslateText", "comprehend:DetectDominantLanguage"],
            Self::DetectSentiment => &["comprehend:DetectSentiment"],
            Self::ContainsPii => &["comprehend:ContainsPiiEntities"],
            Self::DetectKeyPhrases => &["comprehend:DetectKeyPhrases"],
            Self::DetectEntities => &["comprehend:DetectEntities"],
        }
    }

    /// Resolves the operation serving an inbound route path. A leading stage
    /// segment (`/prod/translate`) and the older `contains-pii` path are accepted.
    pub fn from_route_path(path: &str) -> Option<Self> {
        let segments: Vec<&str> = path
            .split('/')
            .filter(|segment| !segment.is_empty())
            .collect();

        Self::ALL.into_iter().find(|operation| {
            let route = operation.route_segments();
            segments.ends_with(route)
                || (*operation == Self::ContainsPii
                    && segments.ends_with(&["comprehend", "contains-pii"]))
        })
    }
}

impl fmt::Display for NlpOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NlpOperation {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|operation| operation.as_str() == normalized)
            .ok_or_else(|| ValidationError::new(format!("Unknown NLP operation '{value}'")))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    message: String,
}

impl ValidationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for ValidationError {}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "PascalCase")]
pub struct TranslateOutput {
    pub source_language_code: String,
    pub target_language_code: String,
    pub translated_text: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct SentimentScore {
    pub positive: Option<f32>,
    pub negative: Option<f32>,
    pub neutral: Option<f32>,
    pub mixed: Option<f32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct SentimentOutput {
    pub sentiment: Option<String>,
    pub sentiment_score: Option<SentimentScore>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct PiiLabel {
    pub name: Option<String>,
    pub score: Option<f32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct PiiOutput {
    pub labels: Vec<PiiLabel>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct KeyPhrase {
    pub text: Option<String>,
    pub score: Option<f32>,
    pub begin_offset: Option<i32>,
    pub end_offset: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct KeyPhrasesOutput {
    pub key_phrases: Vec<KeyPhrase>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct DetectedEntity {
    pub text: Option<String>,
    #[serde(rename = "Type")]
    pub entity_type: Option<String>,
    pub score: Option<f32>,
    pub begin_offset: Option<i32>,
    pub end_offset: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "PascalCase")]
pub struct EntitiesOutput {
    pub entities: Vec<DetectedEntity>,
}
