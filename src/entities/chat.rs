//! Chat-completion entity extractor
//!
//! Asks an OpenAI-compatible endpoint to fill a forced `enrich_entities`
//! function call with one string array per requested label.

use super::extractor::ensure_labels_within;
use super::{CategorizedMentions, EntityExtractor, ExtractorError, Label, LabelSet};
use crate::config::{parse_duration, ExtractorConfig};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::str::FromStr;
use std::time::Duration;

const FUNCTION_NAME: &str = "enrich_entities";

/// Extractor that calls a hosted chat-completion model
pub struct ChatCompletionExtractor {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    model: String,
    temperature: f32,
}

impl ChatCompletionExtractor {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        temperature: f32,
        timeout: Duration,
    ) -> Result<Self, ExtractorError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ExtractorError::Configuration(format!("HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            model: model.into(),
            temperature,
        })
    }

    /// Build from configuration, reading the API key from `api_key_env`
    pub fn from_config(config: &ExtractorConfig) -> Result<Self, ExtractorError> {
        let api_key = std::env::var(&config.api_key_env)
            .ok()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| {
                ExtractorError::Configuration(format!(
                    "environment variable {} is not set",
                    config.api_key_env
                ))
            })?;
        let timeout = parse_duration(&config.request_timeout)
            .map_err(|e| ExtractorError::Configuration(format!("request_timeout: {}", e)))?;

        Self::new(
            &config.endpoint,
            api_key,
            &config.model,
            config.temperature,
            timeout,
        )
    }

    fn request_body(&self, text: &str, labels: &LabelSet) -> Value {
        json!({
            "model": &self.model,
            "messages": [
                {"role": "system", "content": system_prompt(labels)},
                {"role": "user", "content": user_prompt(text)}
            ],
            "temperature": self.temperature,
            "functions": [{
                "name": FUNCTION_NAME,
                "description": "Enrich text with hyperlinks to knowledge base articles",
                "parameters": function_parameters(labels)
            }],
            "function_call": {"name": FUNCTION_NAME}
        })
    }
}

#[async_trait]
impl EntityExtractor for ChatCompletionExtractor {
    async fn extract(
        &self,
        text: &str,
        labels: &LabelSet,
    ) -> Result<CategorizedMentions, ExtractorError> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&self.request_body(text, labels))
            .send()
            .await
            .map_err(|e| ExtractorError::ModelUnavailable(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ExtractorError::ModelUnavailable(e.to_string()))?;

        if !status.is_success() {
            return Err(ExtractorError::ModelUnavailable(format!(
                "API error {}: {}",
                status,
                truncate(&body, 500)
            )));
        }

        tracing::debug!("Extractor raw response: {}", truncate(&body, 1000));

        let mentions = parse_response(&body)?;
        ensure_labels_within(&mentions, labels)?;
        Ok(mentions)
    }
}

fn system_prompt(labels: &LabelSet) -> String {
    let label_list = labels
        .iter()
        .enumerate()
        .map(|(i, label)| format!("{}. {}: {}", i + 1, label, label.description()))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "You are an expert in Natural Language Processing. Your task is to identify common \
         Named Entities (NER) in a given text.\nThe possible common Named Entities (NER) types \
         are exclusively: ({}).\n\n{}\n\nReturn each entity exactly as it appears in the text, \
         grouped under its type. Omit types with no entities.",
        labels.iter().map(Label::as_str).collect::<Vec<_>>().join(", "),
        label_list
    )
}

fn user_prompt(text: &str) -> String {
    format!("TASK:\n    Text: {}", text)
}

fn function_parameters(labels: &LabelSet) -> Value {
    let properties: serde_json::Map<String, Value> = labels
        .iter()
        .map(|label| {
            (
                label.as_str().to_string(),
                json!({"type": "array", "items": {"type": "string"}}),
            )
        })
        .collect();

    json!({
        "type": "object",
        "properties": properties,
        "additionalProperties": false
    })
}

#[derive(Deserialize)]
struct FunctionCall {
    arguments: String,
}

#[derive(Deserialize)]
struct Message {
    function_call: Option<FunctionCall>,
}

#[derive(Deserialize)]
struct Choice {
    message: Message,
}

#[derive(Deserialize)]
struct ApiResponse {
    choices: Vec<Choice>,
}

/// Turn a raw chat-completion body into categorized mentions
pub(crate) fn parse_response(body: &str) -> Result<CategorizedMentions, ExtractorError> {
    let response: ApiResponse = serde_json::from_str(body)
        .map_err(|e| ExtractorError::MalformedResponse(format!("invalid JSON: {}", e)))?;

    let call = response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.function_call)
        .ok_or_else(|| ExtractorError::MalformedResponse("no function_call in response".into()))?;

    parse_arguments(&call.arguments)
}

fn parse_arguments(arguments: &str) -> Result<CategorizedMentions, ExtractorError> {
    let value: Value = serde_json::from_str(arguments).map_err(|e| {
        ExtractorError::MalformedResponse(format!("invalid function arguments: {}", e))
    })?;

    let object = value.as_object().ok_or_else(|| {
        ExtractorError::MalformedResponse("function arguments are not an object".into())
    })?;

    let mut mentions = CategorizedMentions::new();
    for (key, items) in object {
        let label = Label::from_str(key)
            .map_err(|e| ExtractorError::MalformedResponse(e.to_string()))?;
        let items = items.as_array().ok_or_else(|| {
            ExtractorError::MalformedResponse(format!("'{}' is not an array", key))
        })?;

        for item in items {
            let mention = item.as_str().ok_or_else(|| {
                ExtractorError::MalformedResponse(format!("non-string mention under '{}'", key))
            })?;
            mentions.push(label, mention);
        }
    }

    Ok(mentions)
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
