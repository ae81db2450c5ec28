//! Scripted stand-in for the Gemini identifier

use async_trait::async_trait;
use medid_ai::services::{
    parse_model_response, Identification, IdentifierError, ImageIdentifier, UploadedImage,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

/// What the stub answers for one file name
#[derive(Debug, Clone)]
pub enum StubAnswer {
    /// Raw model text, run through the real response parser
    ModelText(String),
    /// Transport failure
    Unreachable,
}

/// Identifier answering from a per-file script
#[derive(Debug, Default)]
pub struct StubIdentifier {
    answers: HashMap<String, StubAnswer>,
    calls: AtomicUsize,
}

impl StubIdentifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `file_name` with raw model text
    pub fn with_text(mut self, file_name: &str, text: &str) -> Self {
        self.answers
            .insert(file_name.to_string(), StubAnswer::ModelText(text.to_string()));
        self
    }

    /// Fail `file_name` at the transport level
    pub fn with_unreachable(mut self, file_name: &str) -> Self {
        self.answers
            .insert(file_name.to_string(), StubAnswer::Unreachable);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageIdentifier for StubIdentifier {
    fn name(&self) -> &'static str {
        "Stub"
    }

    async fn identify(&self, image: &UploadedImage) -> Result<Identification, IdentifierError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.answers.get(&image.file_name) {
            Some(StubAnswer::ModelText(text)) => Ok(parse_model_response(text)),
            Some(StubAnswer::Unreachable) => {
                Err(IdentifierError::NetworkError("connection refused".to_string()))
            }
            None => Ok(Identification::ParseFailure(format!(
                "no scripted answer for {}",
                image.file_name
            ))),
        }
    }
}
