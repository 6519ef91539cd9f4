use std::fmt;

use lpforge_contracts::image::ImageError;
use thiserror::Error;

use crate::extract::FetchError;

/// One candidate model that was tried and failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFailure {
    pub model: String,
    pub message: String,
}

impl fmt::Display for CandidateFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.model, self.message)
    }
}

/// Every candidate failed; failures are kept in the order they were tried.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationFailure {
    pub failures: Vec<CandidateFailure>,
}

impl fmt::Display for GenerationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.failures.is_empty() {
            return f.write_str("All models failed. Details: no candidate models configured");
        }
        let details = self
            .failures
            .iter()
            .map(CandidateFailure::to_string)
            .collect::<Vec<_>>()
            .join(" | ");
        write!(f, "All models failed. Details: {details}")
    }
}

#[derive(Debug, Error)]
pub enum DirectorError {
    #[error("API Key is required")]
    CredentialMissing,
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    #[error("reference image is {size} bytes; the limit is {limit} bytes")]
    PayloadTooLarge { size: usize, limit: usize },
    #[error(transparent)]
    Extraction(#[from] FetchError),
    #[error("{0}")]
    Transport(String),
    #[error("model reply could not be decoded: {0}")]
    Decode(String),
    #[error("{0}")]
    Generation(GenerationFailure),
}

impl DirectorError {
    /// Errors that end a request sequence before any model is called.
    pub fn is_fatal_before_generation(&self) -> bool {
        matches!(
            self,
            DirectorError::CredentialMissing
                | DirectorError::InvalidRequest(_)
                | DirectorError::PayloadTooLarge { .. }
                | DirectorError::Extraction(_)
        )
    }
}

impl From<ImageError> for DirectorError {
    fn from(err: ImageError) -> Self {
        match err {
            ImageError::TooLarge { size, limit } => DirectorError::PayloadTooLarge { size, limit },
            other => DirectorError::InvalidRequest(other.to_string()),
        }
    }
}

impl From<GenerationFailure> for DirectorError {
    fn from(failure: GenerationFailure) -> Self {
        DirectorError::Generation(failure)
    }
}

#[cfg(test)]
mod tests {
    use lpforge_contracts::image::ImageError;

    use super::{CandidateFailure, DirectorError, GenerationFailure};

    #[test]
    fn generation_failure_joins_segments_in_order() {
        let failure = GenerationFailure {
            failures: vec![
                CandidateFailure {
                    model: "m1".to_string(),
                    message: "quota".to_string(),
                },
                CandidateFailure {
                    model: "m2".to_string(),
                    message: "bad json".to_string(),
                },
            ],
        };
        assert_eq!(
            DirectorError::from(failure).to_string(),
            "All models failed. Details: m1: quota | m2: bad json"
        );
    }

    #[test]
    fn oversized_image_maps_to_payload_too_large() {
        let err = DirectorError::from(ImageError::TooLarge { size: 10, limit: 5 });
        assert!(matches!(
            err,
            DirectorError::PayloadTooLarge { size: 10, limit: 5 }
        ));
        assert!(err.is_fatal_before_generation());

        let err = DirectorError::from(ImageError::Empty);
        assert!(matches!(err, DirectorError::InvalidRequest(_)));
    }
}
