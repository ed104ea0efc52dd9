use crate::config::SlsaConfig;
use crate::model::Subject;
use crate::subjects::aggregate::subject_digests;
use crate::traits::{Diagnostics, RunObject};

/// Renders each digest of each subject as `name@algorithm:hex`.
pub fn format_uris(subjects: &[Subject]) -> Vec<String> {
    subjects
        .iter()
        .flat_map(|s| {
            s.digest
                .iter()
                .map(move |(algorithm, hex)| format!("{}@{}:{}", s.name, algorithm, hex))
        })
        .collect()
}

/// URIs of every artifact `obj` produced, one per digest.
///
/// Returns an empty list when nothing could be extracted.
pub fn retrieve_all_artifact_uris(
    obj: &dyn RunObject,
    deep_inspection: bool,
    diagnostics: &dyn Diagnostics,
) -> Vec<String> {
    let config = SlsaConfig::new().with_deep_inspection(deep_inspection);
    format_uris(&subject_digests(obj, &config, diagnostics))
}
