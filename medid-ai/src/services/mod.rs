//! Service layer: external identifier and batch orchestration

pub mod gemini_client;
pub mod identification;
pub mod identifier;

pub use gemini_client::GeminiClient;
pub use identification::{IdentificationService, IdentifyError, NO_USABLE_INPUT_MESSAGE};
pub use identifier::{
    parse_model_response, Identification, IdentifierError, ImageError, ImageIdentifier,
    UploadedImage,
};
