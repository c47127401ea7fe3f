//! Gemini `generateContent` client implementing the assistant contract.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use healthnav_core::assistant::{
    conversation, safety_settings, ChatTurn, GenerationSettings, Role, SafetySetting,
};
use healthnav_core::models::config::AssistantConfig;
use healthnav_core::{Assistant, AssistantError};

pub struct GeminiAssistant {
    client: reqwest::Client,
    config: AssistantConfig,
    api_key: String,
}

impl GeminiAssistant {
    /// Create a client; fails if the API key variable is unset.
    pub fn from_config(config: &AssistantConfig) -> Result<Self, AssistantError> {
        let api_key = config.api_key().ok_or(AssistantError::MissingApiKey)?;
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AssistantError::Network(e.to_string()))?;

        Ok(Self {
            client,
            config: config.clone(),
            api_key,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }
}

impl Assistant for GeminiAssistant {
    async fn ask(&self, prompt: &str) -> Result<String, AssistantError> {
        let body = GenerateRequest::new(prompt, &self.config);
        debug!("Sending prompt to {} ({} chars)", self.config.model, prompt.len());

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AssistantError::Network(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| AssistantError::Network(e.to_string()))?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorEnvelope>(&text)
                .map(|e| e.error.message)
                .unwrap_or(text);
            warn!("Assistant API returned {}: {}", status, message);
            return Err(AssistantError::classify(
                status.as_u16(),
                &message,
                &self.config.model,
            ));
        }

        let reply: GenerateResponse =
            serde_json::from_str(&text).map_err(|_| AssistantError::UnexpectedResponse)?;
        reply.into_text()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    generation_config: GenerationSettings,
    safety_settings: Vec<SafetySetting>,
}

impl GenerateRequest {
    fn new(prompt: &str, config: &AssistantConfig) -> Self {
        Self {
            contents: conversation(prompt).into_iter().map(Content::from).collect(),
            generation_config: GenerationSettings::from(config),
            safety_settings: safety_settings(),
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<Role>,
    #[serde(default)]
    parts: Vec<Part>,
}

impl From<ChatTurn> for Content {
    fn from(turn: ChatTurn) -> Self {
        Self {
            role: Some(turn.role),
            parts: vec![Part {
                text: Some(turn.text),
            }],
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Content,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

impl GenerateResponse {
    fn into_text(self) -> Result<String, AssistantError> {
        if let Some(reason) = self.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(AssistantError::SafetyBlocked { reason });
        }

        let candidate = self
            .candidates
            .into_iter()
            .next()
            .ok_or(AssistantError::UnexpectedResponse)?;

        let text: String = candidate
            .content
            .parts
            .into_iter()
            .filter_map(|p| p.text)
            .collect();

        if !text.trim().is_empty() {
            return Ok(text);
        }
        match candidate.finish_reason.as_deref() {
            Some("SAFETY") => Err(AssistantError::SafetyBlocked {
                reason: "SAFETY".to_string(),
            }),
            _ => Err(AssistantError::UnexpectedResponse),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Result<String, AssistantError> {
        serde_json::from_str::<GenerateResponse>(json).unwrap().into_text()
    }

    #[test]
    fn test_request_body() {
        let body = GenerateRequest::new("What is HDL?", &AssistantConfig::default());
        let json = serde_json::to_value(&body).unwrap();

        assert_eq!(json["contents"].as_array().unwrap().len(), 3);
        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(json["contents"][1]["role"], "model");
        assert_eq!(json["contents"][2]["parts"][0]["text"], "What is HDL?");
        assert_eq!(json["generationConfig"]["maxOutputTokens"], 2048);
        assert_eq!(json["safetySettings"].as_array().unwrap().len(), 4);
    }

    #[test]
    fn test_reply_text() {
        let reply = parse(
            r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"Based on "},{"text":"extracted values: ok"}]},"finishReason":"STOP"}]}"#,
        );
        assert_eq!(reply.unwrap(), "Based on extracted values: ok");
    }

    #[test]
    fn test_blocked_prompt() {
        let reply = parse(r#"{"promptFeedback":{"blockReason":"OTHER"}}"#);
        assert_eq!(
            reply.unwrap_err(),
            AssistantError::SafetyBlocked { reason: "OTHER".to_string() }
        );

        let reply = parse(r#"{"candidates":[{"finishReason":"SAFETY"}]}"#);
        assert!(matches!(reply, Err(AssistantError::SafetyBlocked { .. })));
    }

    #[test]
    fn test_empty_reply() {
        assert_eq!(parse(r#"{}"#).unwrap_err(), AssistantError::UnexpectedResponse);
    }

    #[test]
    fn test_missing_key() {
        let config = AssistantConfig {
            api_key_env: "HEALTHNAV_TEST_UNSET_KEY".to_string(),
            ..AssistantConfig::default()
        };
        assert!(matches!(
            GeminiAssistant::from_config(&config),
            Err(AssistantError::MissingApiKey)
        ));
    }
}
