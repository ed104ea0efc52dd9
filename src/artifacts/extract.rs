//! Naming-convention extraction of artifact records from run results.
//!
//! Tasks advertise what they built through result names:
//! - `<prefix>IMAGE_URL` + `<prefix>IMAGE_DIGEST`, or an `IMAGES` list
//! - `<prefix>ARTIFACT_URI` + `<prefix>ARTIFACT_DIGEST`
//! - `<prefix>ARTIFACT_OUTPUTS` / `<prefix>ARTIFACT_INPUTS` objects with
//!   `uri` and `digest` fields

use crate::artifacts::{digest, ArtifactCategory};
use crate::logging::Diagnostic;
use crate::model::{ImageReference, ResultValue, RunResult, StructuredSignable};
use crate::traits::{Diagnostics, ResultExtractor, RunObject};

pub const IMAGE_URL_SUFFIX: &str = "IMAGE_URL";
pub const IMAGE_DIGEST_SUFFIX: &str = "IMAGE_DIGEST";
pub const ARTIFACT_URI_SUFFIX: &str = "ARTIFACT_URI";
pub const ARTIFACT_DIGEST_SUFFIX: &str = "ARTIFACT_DIGEST";
pub const IMAGES_RESULT: &str = "IMAGES";

/// Default [`ResultExtractor`] following Tekton Chains' type hints.
#[derive(Debug, Default, Clone, Copy)]
pub struct NamingConventionExtractor;

impl ResultExtractor for NamingConventionExtractor {
    fn oci_images(
        &self,
        obj: &dyn RunObject,
        diagnostics: &dyn Diagnostics,
    ) -> Vec<ImageReference> {
        let mut images = Vec::new();
        let mut push = |reference: String| match digest::parse_image_reference(&reference) {
            Ok(image) => images.push(image),
            Err(e) => diagnostics.record(Diagnostic::InvalidImageReference {
                run: obj.name().to_string(),
                reference,
                reason: e.to_string(),
            }),
        };

        for pair in paired_results(obj.results(), IMAGE_URL_SUFFIX, IMAGE_DIGEST_SUFFIX) {
            push(format!("{}@{}", pair.uri, pair.digest));
        }

        for result in obj.results().iter().filter(|r| r.name == IMAGES_RESULT) {
            let listed: Vec<&str> = match &result.value {
                ResultValue::String(s) => s.split(|c: char| c == ',' || c == '\n').collect(),
                ResultValue::Array(items) => items.iter().map(String::as_str).collect(),
                ResultValue::Object(_) => Vec::new(),
            };
            for reference in listed.into_iter().map(str::trim).filter(|r| !r.is_empty()) {
                push(reference.to_string());
            }
        }

        images
    }

    fn signable_targets(
        &self,
        obj: &dyn RunObject,
        _diagnostics: &dyn Diagnostics,
    ) -> Vec<StructuredSignable> {
        paired_results(obj.results(), ARTIFACT_URI_SUFFIX, ARTIFACT_DIGEST_SUFFIX)
    }

    fn structured_targets(
        &self,
        obj: &dyn RunObject,
        category: ArtifactCategory,
        diagnostics: &dyn Diagnostics,
    ) -> Vec<StructuredSignable> {
        let marker = category.result_suffix();
        obj.results()
            .iter()
            .filter(|r| r.name.ends_with(marker))
            .filter_map(|r| match structured_signable(r) {
                Ok(target) => Some(target),
                Err(reason) => {
                    diagnostics.record(Diagnostic::InvalidStructuredResult {
                        run: obj.name().to_string(),
                        result: r.name.clone(),
                        reason: reason.to_string(),
                    });
                    None
                }
            })
            .collect()
    }
}

/// Pairs `<prefix><id_suffix>` with `<prefix><digest_suffix>` results.
///
/// Values are trimmed and empty ones ignored. Only complete pairs are
/// returned, ordered by first appearance of their prefix.
fn paired_results(
    results: &[RunResult],
    id_suffix: &str,
    digest_suffix: &str,
) -> Vec<StructuredSignable> {
    let mut pairs: Vec<(&str, StructuredSignable)> = Vec::new();

    for result in results {
        let Some(value) = result.value.as_str().map(str::trim) else {
            continue;
        };
        if value.is_empty() {
            continue;
        }

        let (prefix, is_digest) = if let Some(p) = result.name.strip_suffix(id_suffix) {
            (p, false)
        } else if let Some(p) = result.name.strip_suffix(digest_suffix) {
            (p, true)
        } else {
            continue;
        };

        let idx = match pairs.iter().position(|(p, _)| *p == prefix) {
            Some(idx) => idx,
            None => {
                pairs.push((prefix, StructuredSignable::default()));
                pairs.len() - 1
            }
        };
        let entry = &mut pairs[idx].1;
        if is_digest {
            entry.digest = value.to_string();
        } else {
            entry.uri = value.to_string();
        }
    }

    pairs
        .into_iter()
        .map(|(_, s)| s)
        .filter(|s| !s.uri.is_empty() && !s.digest.is_empty())
        .collect()
}

fn structured_signable(result: &RunResult) -> Result<StructuredSignable, &'static str> {
    let fields = result.value.as_object().ok_or("value should be an object")?;
    let field = |key: &str| fields.get(key).map(|v| v.trim()).filter(|v| !v.is_empty());

    let uri = field("uri").ok_or("object should have a uri field")?;
    let digest = field("digest").ok_or("object should have a digest field")?;
    Ok(StructuredSignable {
        uri: uri.to_string(),
        digest: digest.to_string(),
    })
}
