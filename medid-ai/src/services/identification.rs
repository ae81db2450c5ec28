//! Identification service
//!
//! Fans a batch of images out to the identifier, drops parse failures and
//! merges the survivors. Survivors keep upload order whatever order the
//! external calls complete in, since order decides plurality ties.

use crate::services::identifier::{Identification, IdentifierError, ImageIdentifier, UploadedImage};
use futures::future::join_all;
use medid_common::{aggregate, ConsolidatedResult};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

/// Message reported when no image produced a usable identification
pub const NO_USABLE_INPUT_MESSAGE: &str = "Failed to identify medicine from provided images";

/// Batch identification errors
#[derive(Debug, Error)]
pub enum IdentifyError {
    /// Every image was rejected by the parse boundary (or the batch was empty)
    #[error("{}", NO_USABLE_INPUT_MESSAGE)]
    NoUsableInput,

    /// The external identifier could not be reached or refused the request
    #[error("Identification of '{file_name}' failed: {source}")]
    Upstream {
        file_name: String,
        #[source]
        source: IdentifierError,
    },
}

/// Batch orchestration over an [`ImageIdentifier`]
pub struct IdentificationService {
    identifier: Arc<dyn ImageIdentifier>,
}

impl IdentificationService {
    pub fn new(identifier: Arc<dyn ImageIdentifier>) -> Self {
        Self { identifier }
    }

    pub fn identifier_name(&self) -> &'static str {
        self.identifier.name()
    }

    /// Identify the medicine shown across `images`
    ///
    /// # Errors
    /// - [`IdentifyError::NoUsableInput`] when no image yields a usable result
    /// - [`IdentifyError::Upstream`] on the first transport failure in upload order
    pub async fn identify_batch(
        &self,
        images: &[UploadedImage],
    ) -> Result<ConsolidatedResult, IdentifyError> {
        let batch_id = Uuid::new_v4();
        info!(
            batch = %batch_id,
            images = images.len(),
            identifier = self.identifier.name(),
            "Identification batch started"
        );

        let outcomes = join_all(images.iter().map(|image| self.identifier.identify(image))).await;

        let mut results = Vec::with_capacity(images.len());
        for (image, outcome) in images.iter().zip(outcomes) {
            match outcome {
                Ok(Identification::Identified(result)) => results.push(result),
                Ok(Identification::ParseFailure(reason)) => {
                    warn!(batch = %batch_id, file = %image.file_name, "Skipping image: {}", reason);
                }
                Err(source) => {
                    warn!(batch = %batch_id, file = %image.file_name, "Identifier failed: {}", source);
                    return Err(IdentifyError::Upstream {
                        file_name: image.file_name.clone(),
                        source,
                    });
                }
            }
        }

        if results.is_empty() {
            warn!(batch = %batch_id, "No usable identification in batch");
            return Err(IdentifyError::NoUsableInput);
        }

        let consolidated = aggregate(&results).map_err(|_| IdentifyError::NoUsableInput)?;
        info!(
            batch = %batch_id,
            used = results.len(),
            skipped = images.len() - results.len(),
            name = %consolidated.accurate.name,
            "Identification batch complete"
        );

        Ok(consolidated)
    }
}
