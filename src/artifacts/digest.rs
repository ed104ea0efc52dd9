//! Structural parsing of digest strings and digest-pinned image references.
//!
//! Only the shape is checked, plus the `sha256` algorithm for image
//! references. Whether `sha256:abcd` is a real SHA-256 is not this crate's
//! concern.

use crate::model::ImageReference;
use crate::traits::DigestError;

pub const SHA256: &str = "sha256";

const SHA256_PREFIX: &str = "sha256:";

/// Splits `algorithm:hex` into its two halves.
///
/// Any input that does not split on `:` into exactly two parts is rejected,
/// so `"nodelimiter"` and `"sha256:a:b"` both fail.
///
/// # Errors
///
/// Returns [`DigestError::Malformed`] for anything other than two parts.
pub fn split_digest(raw: &str) -> Result<(&str, &str), DigestError> {
    let mut parts = raw.split(':');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(algorithm), Some(hex), None) => Ok((algorithm, hex)),
        _ => Err(DigestError::Malformed(raw.to_string())),
    }
}

/// Removes a leading `sha256:` if present.
pub fn strip_sha256_prefix(raw: &str) -> &str {
    raw.strip_prefix(SHA256_PREFIX).unwrap_or(raw)
}

/// Parses `repository[:tag]@algorithm:hex`.
///
/// The tag is dropped. A colon before the last `/` is a registry port and is
/// kept, so `localhost:5000/app@sha256:1` keeps `localhost:5000/app`.
///
/// # Errors
///
/// Returns [`DigestError`] if the reference has no `@`, has an empty
/// repository, or carries a digest that is not `sha256:hex`.
pub fn parse_image_reference(raw: &str) -> Result<ImageReference, DigestError> {
    let trimmed = raw.trim();
    let (base, digest) = trimmed
        .split_once('@')
        .ok_or_else(|| DigestError::MissingDigest(trimmed.to_string()))?;

    let (algorithm, _) = split_digest(digest)?;
    if algorithm != SHA256 {
        return Err(DigestError::UnsupportedAlgorithm(trimmed.to_string()));
    }

    let last_slash = base.rfind('/');
    let repository = match base.rfind(':') {
        Some(colon) if last_slash.map_or(true, |slash| colon > slash) => &base[..colon],
        _ => base,
    };

    if repository.is_empty() {
        return Err(DigestError::EmptyRepository(trimmed.to_string()));
    }

    Ok(ImageReference {
        repository: repository.to_string(),
        digest: digest.to_string(),
    })
}
