//! Deprecated PipelineResource image outputs.
//!
//! TaskRuns that still bind `image` output resources report the pushed image
//! through `resourcesResult` entries keyed `url` and `digest`. This path only
//! runs for leaf runs and can be switched off with
//! [`SlsaConfig::legacy_resources`](crate::config::SlsaConfig::legacy_resources).

use crate::artifacts::{strip_sha256_prefix, SHA256};
use crate::logging::Diagnostic;
use crate::model::Subject;
use crate::traits::{Diagnostics, RunObject};

pub const IMAGE_RESOURCE_TYPE: &str = "image";

/// Subjects for every `image` output resource of `obj`.
pub fn subjects_from_resources(obj: &dyn RunObject, diagnostics: &dyn Diagnostics) -> Vec<Subject> {
    let Some(resources) = obj.legacy_resources() else {
        return Vec::new();
    };

    let mut subjects = Vec::new();
    for output in resources.outputs {
        let Some(spec) = &output.resource_spec else {
            continue;
        };
        if spec.resource_type != IMAGE_RESOURCE_TYPE {
            continue;
        }

        let mut url = None;
        let mut digest = None;
        for entry in resources
            .results
            .iter()
            .filter(|r| r.resource_name == output.name)
        {
            match entry.key.as_str() {
                "url" => url = Some(entry.value.as_str()),
                "digest" => digest = Some(entry.value.as_str()),
                _ => {}
            }
        }

        match (url, digest) {
            (Some(url), Some(digest)) if !url.is_empty() && !digest.is_empty() => {
                subjects.push(Subject::new(url, SHA256, strip_sha256_prefix(digest)));
            }
            _ => diagnostics.record(Diagnostic::IncompleteResourceOutput {
                run: obj.name().to_string(),
                resource: output.name.clone(),
            }),
        }
    }

    subjects
}
