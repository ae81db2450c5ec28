//! Gemini API client
//!
//! Sends one image plus the identification prompt to the Gemini
//! `generateContent` endpoint and hands the returned text to the strict
//! response parser.

use crate::services::identifier::{
    parse_model_response, Identification, IdentifierError, ImageIdentifier, UploadedImage,
};
use async_trait::async_trait;
use base64::Engine;
use medid_common::config::TomlConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const USER_AGENT: &str = concat!("medid/", env!("CARGO_PKG_VERSION"));
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Instructions sent alongside every image
pub const IDENTIFICATION_PROMPT: &str = r#"
You are an advanced AI model specialized in medicine identification.
Given an image of a pill, pill box, or medicine packaging, return details in JSON with two types of identification:
1. **Accurate Identification**: The medicine identification extracted directly from the visible text on the image, such as the name, dosage, or other information on the packaging. This should be considered as the "text-based" identification.
2. **Guessed Identification**: The AI's best guess based on visual recognition and patterns in the image, even if there is no direct text.

Return the details in the following JSON format:

{
  "accurate": {
    "name": "Medicine Name from text",
    "dosage": "Dosage information from text (e.g., 500mg)",
    "side_effects": ["List of common side effects from text (if any)"],
    "manufacturer": "Manufacturer name from text",
    "usage": "Brief description of what this medicine is used for (from text)"
  },
  "guessed": {
    "name": "Medicine Name from AI guess",
    "dosage": "Dosage information from AI guess",
    "side_effects": ["List of common side effects from AI guess"],
    "manufacturer": "Manufacturer name from AI guess",
    "usage": "Brief description of what this medicine is used for (from AI guess)"
  }
}

Omit any field you cannot determine. Ensure the response is **valid JSON** with no extra text and no keys other than those shown. Make sure to clearly differentiate between accurate and guessed identification.
"#;

/// `generateContent` request body
#[derive(Debug, Serialize)]
pub struct GenerateContentRequest {
    pub contents: Vec<RequestContent>,
    #[serde(rename = "generationConfig")]
    pub generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
pub struct RequestContent {
    pub parts: Vec<RequestPart>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum RequestPart {
    Text { text: String },
    InlineData { inline_data: InlineData },
}

#[derive(Debug, Serialize)]
pub struct InlineData {
    pub mime_type: String,
    /// Base64-encoded image bytes
    pub data: String,
}

#[derive(Debug, Serialize)]
pub struct GenerationConfig {
    #[serde(rename = "responseMimeType")]
    pub response_mime_type: String,
}

/// `generateContent` response envelope (fields we read)
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
    pub prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub content: Option<CandidateContent>,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CandidateContent {
    #[serde(default)]
    pub parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
pub struct CandidatePart {
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    pub block_reason: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text parts of the first candidate
    pub fn text(&self) -> Option<String> {
        let parts = &self.candidates.first()?.content.as_ref()?.parts;
        let text: String = parts.iter().filter_map(|p| p.text.as_deref()).collect();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

/// Build the request body for one image
pub fn build_request(image: &UploadedImage) -> GenerateContentRequest {
    GenerateContentRequest {
        contents: vec![RequestContent {
            parts: vec![
                RequestPart::Text {
                    text: IDENTIFICATION_PROMPT.to_string(),
                },
                RequestPart::InlineData {
                    inline_data: InlineData {
                        mime_type: image.mime_type.to_string(),
                        data: base64::engine::general_purpose::STANDARD.encode(&image.data),
                    },
                },
            ],
        }],
        generation_config: GenerationConfig {
            response_mime_type: "application/json".to_string(),
        },
    }
}

/// Gemini-backed image identifier
pub struct GeminiClient {
    http_client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(
        api_key: String,
        model: impl Into<String>,
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, IdentifierError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| IdentifierError::NetworkError(e.to_string()))?;

        Ok(Self {
            http_client,
            api_key,
            model: model.into(),
            base_url: base_url.into(),
        })
    }

    /// Build a client from bootstrap configuration and a resolved API key
    pub fn from_config(config: &TomlConfig, api_key: String) -> Result<Self, IdentifierError> {
        Self::new(
            api_key,
            config.gemini_model.clone(),
            config.gemini_base_url.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Full `generateContent` URL for the configured model
    pub fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

#[async_trait]
impl ImageIdentifier for GeminiClient {
    fn name(&self) -> &'static str {
        "Gemini"
    }

    async fn identify(&self, image: &UploadedImage) -> Result<Identification, IdentifierError> {
        tracing::debug!(
            file = %image.file_name,
            mime_type = image.mime_type,
            bytes = image.data.len(),
            model = %self.model,
            "Querying Gemini API"
        );

        let response = self
            .http_client
            .post(self.endpoint())
            .header(API_KEY_HEADER, &self.api_key)
            .json(&build_request(image))
            .send()
            .await
            .map_err(|e| IdentifierError::NetworkError(e.to_string()))?;

        let status = response.status();

        if status == 401 || status == 403 {
            return Err(IdentifierError::InvalidApiKey);
        }

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(IdentifierError::ApiError(status.as_u16(), error_text));
        }

        let envelope: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| IdentifierError::InvalidResponse(e.to_string()))?;

        let Some(text) = envelope.text() else {
            let reason = envelope
                .prompt_feedback
                .and_then(|f| f.block_reason)
                .or_else(|| envelope.candidates.first().and_then(|c| c.finish_reason.clone()))
                .unwrap_or_else(|| "no candidates".to_string());
            tracing::warn!(file = %image.file_name, reason = %reason, "Gemini returned no text");
            return Ok(Identification::ParseFailure(format!(
                "Model returned no text ({})",
                reason
            )));
        };

        let identification = parse_model_response(&text);
        if let Identification::Identified(_) = &identification {
            tracing::info!(file = %image.file_name, "Gemini identification parsed");
        }
        Ok(identification)
    }
}
