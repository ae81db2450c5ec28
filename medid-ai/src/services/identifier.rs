//! External image identifier boundary
//!
//! An identifier turns one uploaded image into either a well-formed
//! [`ImageResult`] or a parse-failure marker. Model output is never passed
//! inward half-trusted: it either matches the schema exactly or it is
//! reported as [`Identification::ParseFailure`].
//!
//! Only transport-level problems (network, HTTP status, unreadable API
//! envelope) surface as [`IdentifierError`].

use async_trait::async_trait;
use medid_common::ImageResult;
use serde_json::Value;
use thiserror::Error;

/// Image formats accepted for identification
pub const SUPPORTED_MIME_TYPES: [&str; 3] = ["image/jpeg", "image/png", "image/webp"];

/// One uploaded image, validated by content sniffing
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub file_name: String,
    pub mime_type: &'static str,
    pub data: Vec<u8>,
}

/// Upload rejected before any external call
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ImageError {
    #[error("File '{0}' is empty")]
    Empty(String),

    #[error("File '{file_name}' is not a supported image (detected: {detected})")]
    UnsupportedType { file_name: String, detected: String },
}

impl UploadedImage {
    /// Validate raw upload bytes and detect the image type
    pub fn new(file_name: impl Into<String>, data: Vec<u8>) -> Result<Self, ImageError> {
        let file_name = file_name.into();
        if data.is_empty() {
            return Err(ImageError::Empty(file_name));
        }

        let detected = infer::get(&data).map(|kind| kind.mime_type());
        match detected.and_then(|mime| SUPPORTED_MIME_TYPES.iter().copied().find(|m| *m == mime)) {
            Some(mime_type) => Ok(Self {
                file_name,
                mime_type,
                data,
            }),
            None => Err(ImageError::UnsupportedType {
                file_name,
                detected: detected.unwrap_or("unknown").to_string(),
            }),
        }
    }
}

/// Outcome of identifying one image
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Identification {
    /// Model output matched the schema
    Identified(ImageResult),
    /// Model output was unusable; contributes no votes
    ParseFailure(String),
}

/// Identifier transport errors
#[derive(Debug, Error)]
pub enum IdentifierError {
    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Invalid API key")]
    InvalidApiKey,

    #[error("API error {0}: {1}")]
    ApiError(u16, String),

    #[error("Invalid response envelope: {0}")]
    InvalidResponse(String),
}

/// External identifier seam
///
/// The production implementation calls Gemini; tests substitute stubs.
#[async_trait]
pub trait ImageIdentifier: Send + Sync {
    /// Identifier name for logging
    fn name(&self) -> &'static str;

    /// Identify the medicine shown in one image
    async fn identify(&self, image: &UploadedImage) -> Result<Identification, IdentifierError>;
}

/// Parse raw model text into an identification
///
/// At most one enclosing Markdown code fence (optionally tagged `json`,
/// multi-line or single-line) is removed; the remainder must deserialize
/// into [`ImageResult`] exactly.
pub fn parse_model_response(text: &str) -> Identification {
    let body = strip_code_fence(text);
    if body.is_empty() {
        return Identification::ParseFailure("Empty model response".to_string());
    }

    let value: Value = match serde_json::from_str(body) {
        Ok(value) => value,
        Err(e) => return Identification::ParseFailure(format!("Invalid model response: {}", e)),
    };
    if let Err(reason) = check_object_shape(&value) {
        return Identification::ParseFailure(reason);
    }

    match serde_json::from_value::<ImageResult>(value) {
        Ok(result) => Identification::Identified(result),
        Err(e) => Identification::ParseFailure(format!("Invalid model response: {}", e)),
    }
}

// Derived struct deserializers also accept JSON arrays; only objects are valid here
fn check_object_shape(value: &Value) -> Result<(), String> {
    let object = value
        .as_object()
        .ok_or_else(|| "Model response is not a JSON object".to_string())?;

    for (key, lens) in object {
        if !(lens.is_object() || lens.is_null()) {
            return Err(format!("Lens '{}' is not a JSON object", key));
        }
    }
    Ok(())
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(inner) = trimmed
        .strip_prefix("```")
        .and_then(|rest| rest.strip_suffix("```"))
    else {
        return trimmed;
    };

    // Optional "json" info string, on its own line or run into the body.
    // Any other info string is left in place and fails the JSON parse.
    match inner.get(..4) {
        Some(tag) if tag.eq_ignore_ascii_case("json") => inner[4..].trim(),
        _ => inner.trim(),
    }
}
