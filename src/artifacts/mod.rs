//! Artifact records found in run results.
//!
//! - **Digest parsing**: structural `algorithm:hex` and image-reference parsing
//! - **Extraction**: [`NamingConventionExtractor`], the default
//!   [`ResultExtractor`](crate::traits::ResultExtractor)

pub mod digest;
pub mod extract;

pub use digest::{parse_image_reference, split_digest, strip_sha256_prefix, SHA256};
pub use extract::NamingConventionExtractor;

/// Which structured artifact results to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactCategory {
    /// `*ARTIFACT_INPUTS`: materials consumed by the run
    Inputs,
    /// `*ARTIFACT_OUTPUTS`: artifacts produced by the run
    Outputs,
}

impl ArtifactCategory {
    /// Result name suffix marking this category.
    pub fn result_suffix(self) -> &'static str {
        match self {
            ArtifactCategory::Inputs => "ARTIFACT_INPUTS",
            ArtifactCategory::Outputs => "ARTIFACT_OUTPUTS",
        }
    }
}
