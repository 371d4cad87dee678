//! Seam for the external biometric feature-comparison collaborator.
//!
//! Feature extraction happens outside this system; what arrives here is a
//! fixed-length numeric descriptor. The collaborator computes a distance
//! between two descriptors, and the credential manager owns the threshold
//! decision.

use crate::errors::IdentityError;

pub trait DescriptorMatcher: Send + Sync {
    /// Distance between an enrolled descriptor and a candidate. Lower means
    /// more similar. Both slices have the same length; the caller checks.
    fn distance(&self, enrolled: &[f32], candidate: &[f32]) -> f32;
}

/// Plain Euclidean distance. Stands in for the real comparison service so
/// the full flow runs end-to-end.
pub struct EuclideanMatcher;

impl DescriptorMatcher for EuclideanMatcher {
    fn distance(&self, enrolled: &[f32], candidate: &[f32]) -> f32 {
        enrolled
            .iter()
            .zip(candidate)
            .map(|(a, b)| (a - b).powi(2))
            .sum::<f32>()
            .sqrt()
    }
}

/// Descriptors are stored as JSON text in the record store.
pub fn encode_descriptor(descriptor: &[f32]) -> Result<String, IdentityError> {
    serde_json::to_string(descriptor)
        .map_err(|e| IdentityError::Internal(format!("failed to encode descriptor: {e}")))
}

pub fn decode_descriptor(stored: &str) -> Result<Vec<f32>, IdentityError> {
    serde_json::from_str(stored)
        .map_err(|e| IdentityError::Database(format!("stored descriptor is corrupt: {e}")))
}
