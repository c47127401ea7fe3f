//! Conversational assistant contract, persona and error taxonomy.
//!
//! The core only builds prompts and classifies failures; transports live in
//! the binaries (see `healthnav-cli`'s Gemini client).

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::AssistantError;
use crate::insight::build_insight_prompt;
use crate::models::config::AssistantConfig;
use crate::models::profile::UserContext;
use crate::models::report::{DocumentKind, ExtractionResult};

/// Persona instructions sent as the first user turn of every conversation.
pub const SYSTEM_PREAMBLE: &str = "You are \"HealthNav Assistant\", an AI helper within a personalized health application.
Your goal is to explain general health concepts, nutrition information, and fitness ideas clearly and simply, based on common knowledge.
**Crucially, you MUST NOT provide medical diagnoses, treatment plans, interpretations of specific medical results (like exact blood report numbers), or personalized medical advice.**
Always include a disclaimer like \"Remember, this is general information and not medical advice. Consult your doctor for personal health concerns.\" if the user asks about conditions or specific health actions.
Keep responses concise, friendly, and encouraging. Focus on general wellness education.";

/// Scripted model reply to [`SYSTEM_PREAMBLE`].
pub const MODEL_ACKNOWLEDGEMENT: &str = "Okay, I understand. I am HealthNav Assistant. I will explain general health, nutrition, and fitness concepts simply. I will absolutely avoid giving medical diagnoses or advice and will include a disclaimer when appropriate. How can I help you today?";

/// Harm categories filtered on every request.
pub const SAFETY_CATEGORIES: [&str; 4] = [
    "HARM_CATEGORY_HARASSMENT",
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
    "HARM_CATEGORY_DANGEROUS_CONTENT",
];

pub const SAFETY_THRESHOLD: &str = "BLOCK_MEDIUM_AND_ABOVE";

/// Speaker of a conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

/// One turn of a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Role,
    pub text: String,
}

/// Full conversation for `prompt`: persona, acknowledgement, then the prompt.
pub fn conversation(prompt: &str) -> Vec<ChatTurn> {
    vec![
        ChatTurn {
            role: Role::User,
            text: SYSTEM_PREAMBLE.to_string(),
        },
        ChatTurn {
            role: Role::Model,
            text: MODEL_ACKNOWLEDGEMENT.to_string(),
        },
        ChatTurn {
            role: Role::User,
            text: prompt.to_string(),
        },
    ]
}

/// Sampling parameters, serialized in the wire casing the API expects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationSettings {
    pub temperature: f32,
    pub top_k: u32,
    pub top_p: f32,
    pub max_output_tokens: u32,
}

impl From<&AssistantConfig> for GenerationSettings {
    fn from(config: &AssistantConfig) -> Self {
        Self {
            temperature: config.temperature,
            top_k: config.top_k,
            top_p: config.top_p,
            max_output_tokens: config.max_output_tokens,
        }
    }
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self::from(&AssistantConfig::default())
    }
}

/// Threshold for one harm category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetySetting {
    pub category: String,
    pub threshold: String,
}

/// The fixed safety settings sent with every request.
pub fn safety_settings() -> Vec<SafetySetting> {
    SAFETY_CATEGORIES
        .iter()
        .map(|category| SafetySetting {
            category: category.to_string(),
            threshold: SAFETY_THRESHOLD.to_string(),
        })
        .collect()
}

/// A conversational model answering one prompt at a time.
#[allow(async_fn_in_trait)]
pub trait Assistant {
    /// Send `prompt` (preceded by the persona turns) and return the reply text.
    async fn ask(&self, prompt: &str) -> Result<String, AssistantError>;
}

/// Ask `assistant` for an insight on an extraction result.
///
/// Returns `Ok(None)` without calling the assistant when nothing was extracted.
pub async fn request_insight<A: Assistant>(
    assistant: &A,
    kind: DocumentKind,
    result: &ExtractionResult,
    context: Option<&UserContext>,
) -> Result<Option<String>, AssistantError> {
    let Some(prompt) = build_insight_prompt(kind, result, context) else {
        debug!("No values extracted, skipping insight request");
        return Ok(None);
    };

    match assistant.ask(&prompt).await {
        Ok(reply) => Ok(Some(reply)),
        Err(e) => {
            warn!("Insight request failed: {}", e);
            Err(e)
        }
    }
}

impl AssistantError {
    /// Map a failed API call to an error variant.
    pub fn classify(status: u16, message: &str, model: &str) -> Self {
        if message.contains("API key not valid") {
            AssistantError::InvalidApiKey
        } else if message.contains("API key expired") {
            AssistantError::ApiKeyExpired
        } else if status == 403 && message.contains("API_KEY_SERVICE_BLOCKED") {
            AssistantError::ServiceBlocked
        } else if status == 404 || message.contains("is not found") {
            AssistantError::ModelNotFound {
                model: model.to_string(),
            }
        } else if status == 429 || message.contains("Resource exhausted") {
            AssistantError::RateLimited
        } else if message.contains("SAFETY") {
            AssistantError::SafetyBlocked {
                reason: "SAFETY".to_string(),
            }
        } else {
            AssistantError::Api {
                status,
                message: message.to_string(),
            }
        }
    }

    /// Message suitable for showing to the end user.
    pub fn user_message(&self) -> String {
        match self {
            AssistantError::MissingApiKey => {
                "Sorry, the AI service could not be initialized. Please check the API key configuration.".to_string()
            }
            AssistantError::InvalidApiKey => {
                "Sorry, there seems to be an issue with the AI configuration (Invalid API Key). Please double-check the configured key.".to_string()
            }
            AssistantError::ApiKeyExpired => {
                "Sorry, your API key has expired. Please generate a new one in Google Cloud Console or AI Studio.".to_string()
            }
            AssistantError::ServiceBlocked => {
                "Sorry, access to the AI service is blocked for this API key. Please check the enabled APIs (like Vertex AI API or Generative Language API) in your Google Cloud project.".to_string()
            }
            AssistantError::ModelNotFound { model } => format!(
                "Sorry, {} was not found. This might be due to regional availability or API key setup issues.",
                model
            ),
            AssistantError::RateLimited => {
                "Sorry, the AI service is temporarily unavailable due to high demand (Rate Limit Exceeded). Please wait a few moments and try again.".to_string()
            }
            AssistantError::SafetyBlocked { reason } => format!(
                "I cannot provide a response to that due to safety guidelines ({}). Could you ask something else?",
                reason
            ),
            AssistantError::UnexpectedResponse => {
                "Sorry, I received an unexpected response format from the AI service.".to_string()
            }
            AssistantError::Api { message, .. } => format!(
                "Sorry, I encountered an error connecting to the AI service. Please try again later. (Details: {})",
                message
            ),
            AssistantError::Network(details) => format!(
                "Sorry, I encountered an error connecting to the AI service. Please try again later. (Details: {})",
                details
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::ReportAssembler;
    use crate::extract::RuleTable;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;

    struct Recording {
        prompts: RefCell<Vec<String>>,
        reply: Result<String, AssistantError>,
    }

    impl Recording {
        fn replying(reply: Result<String, AssistantError>) -> Self {
            Self {
                prompts: RefCell::new(Vec::new()),
                reply,
            }
        }
    }

    impl Assistant for Recording {
        async fn ask(&self, prompt: &str) -> Result<String, AssistantError> {
            self.prompts.borrow_mut().push(prompt.to_string());
            self.reply.clone()
        }
    }

    #[test]
    fn test_classify() {
        let model = "gemini-2.0-flash-001";
        assert_eq!(
            AssistantError::classify(400, "API key not valid. Please pass a valid API key.", model),
            AssistantError::InvalidApiKey
        );
        assert_eq!(
            AssistantError::classify(400, "API key expired. Please renew the API key.", model),
            AssistantError::ApiKeyExpired
        );
        assert_eq!(
            AssistantError::classify(403, "Reason: API_KEY_SERVICE_BLOCKED", model),
            AssistantError::ServiceBlocked
        );
        assert_eq!(
            AssistantError::classify(404, "models/foo is not found for API version v1beta", model),
            AssistantError::ModelNotFound { model: model.to_string() }
        );
        assert_eq!(
            AssistantError::classify(429, "Resource has been exhausted", model),
            AssistantError::RateLimited
        );
        assert_eq!(
            AssistantError::classify(400, "Candidate was blocked due to SAFETY", model),
            AssistantError::SafetyBlocked { reason: "SAFETY".to_string() }
        );
        assert_eq!(
            AssistantError::classify(500, "Internal error", model),
            AssistantError::Api { status: 500, message: "Internal error".to_string() }
        );
    }

    #[test]
    fn test_user_messages_are_distinct() {
        let errors = [
            AssistantError::MissingApiKey,
            AssistantError::InvalidApiKey,
            AssistantError::ApiKeyExpired,
            AssistantError::ServiceBlocked,
            AssistantError::ModelNotFound { model: "m".into() },
            AssistantError::RateLimited,
            AssistantError::SafetyBlocked { reason: "SAFETY".into() },
            AssistantError::UnexpectedResponse,
            AssistantError::Api { status: 500, message: "boom".into() },
            AssistantError::Network("dns".into()),
        ];
        let messages: std::collections::HashSet<String> =
            errors.iter().map(AssistantError::user_message).collect();
        assert_eq!(messages.len(), errors.len());
        assert!(errors[4].user_message().starts_with("Sorry, m was not found."));
    }

    #[test]
    fn test_conversation_turns() {
        let turns = conversation("hello");
        assert_eq!(turns.len(), 3);
        assert_eq!(turns[0].role, Role::User);
        assert!(turns[0].text.contains("HealthNav Assistant"));
        assert_eq!(turns[1].role, Role::Model);
        assert_eq!(turns[2].text, "hello");
    }

    #[test]
    fn test_wire_settings() {
        let json = serde_json::to_value(GenerationSettings::default()).unwrap();
        assert_eq!(json["topK"], 1);
        assert_eq!(json["maxOutputTokens"], 2048);

        let safety = safety_settings();
        assert_eq!(safety.len(), 4);
        assert!(safety.iter().all(|s| s.threshold == "BLOCK_MEDIUM_AND_ABOVE"));
    }

    #[tokio::test]
    async fn test_request_insight() {
        let table = RuleTable::for_kind(DocumentKind::BloodReport);
        let result = ReportAssembler::new().assemble("Haemoglobin 13.5", table).values;
        let assistant = Recording::replying(Ok("Based on extracted values: fine.".into()));

        let reply = request_insight(&assistant, DocumentKind::BloodReport, &result, None)
            .await
            .unwrap();
        assert_eq!(reply.as_deref(), Some("Based on extracted values: fine."));
        assert!(assistant.prompts.borrow()[0].contains("- Haemoglobin: 13.5"));
    }

    #[tokio::test]
    async fn test_request_insight_skips_empty_result() {
        let table = RuleTable::for_kind(DocumentKind::NutritionLabel);
        let result = ReportAssembler::new().assemble("", table).values;
        let assistant = Recording::replying(Err(AssistantError::RateLimited));

        let reply = request_insight(&assistant, DocumentKind::NutritionLabel, &result, None)
            .await
            .unwrap();
        assert_eq!(reply, None);
        assert!(assistant.prompts.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_request_insight_propagates_failure() {
        let table = RuleTable::for_kind(DocumentKind::BloodReport);
        let result = ReportAssembler::new().assemble("Haemoglobin 13.5", table).values;
        let assistant = Recording::replying(Err(AssistantError::RateLimited));

        let err = request_insight(&assistant, DocumentKind::BloodReport, &result, None)
            .await
            .unwrap_err();
        assert_eq!(err, AssistantError::RateLimited);
    }
}
