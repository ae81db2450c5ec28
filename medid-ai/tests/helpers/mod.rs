//! Test Helper Utilities
//!
//! Shared utilities for testing medid-ai: a scripted identifier that stands
//! in for Gemini, app construction, and multipart body building.

#![allow(dead_code)]

pub mod multipart;
pub mod stub_identifier;

pub use multipart::{multipart_body, MULTIPART_CONTENT_TYPE};
pub use stub_identifier::{StubAnswer, StubIdentifier};

use medid_ai::services::IdentificationService;
use medid_ai::{build_router, AppState};
use std::sync::Arc;

/// Minimal PNG signature followed by padding; enough for type detection
pub fn png_bytes(len: usize) -> Vec<u8> {
    let mut data = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0x0D];
    data.resize(len.max(data.len()), 0);
    data
}

/// Build app state around a stub identifier
pub fn test_app_state(identifier: StubIdentifier, max_upload_bytes: usize) -> AppState {
    let identification = IdentificationService::new(Arc::new(identifier));
    AppState::new(identification, max_upload_bytes)
}

/// Build a router around a stub identifier with a generous body limit
pub fn test_app(identifier: StubIdentifier) -> axum::Router {
    build_router(test_app_state(identifier, 1024 * 1024))
}

/// Build a router and keep a handle on the stub to inspect its call count
pub fn test_app_tracked(identifier: StubIdentifier) -> (axum::Router, Arc<StubIdentifier>) {
    let identifier = Arc::new(identifier);
    let identification = IdentificationService::new(identifier.clone());
    let router = build_router(AppState::new(identification, 1024 * 1024));
    (router, identifier)
}
