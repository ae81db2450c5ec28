//! # medid Common Library
//!
//! Shared code for the medid service and its client:
//! - Identification data model (per-image results, consolidated result)
//! - Multi-image result aggregation (plurality vote)
//! - Bootstrap configuration loading
//! - Common error types

pub mod aggregate;
pub mod config;
pub mod error;
pub mod identification;

pub use aggregate::{aggregate, EmptyInputError, Tally};
pub use error::{Error, Result};
pub use identification::{ConsolidatedResult, ImageResult, Lens, LensSummary, UNKNOWN};
