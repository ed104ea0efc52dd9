//! Subjects from a single run object.

use crate::artifacts::{
    split_digest, strip_sha256_prefix, ArtifactCategory, NamingConventionExtractor, SHA256,
};
use crate::logging::Diagnostic;
use crate::model::{StructuredSignable, Subject};
use crate::subjects::legacy;
use crate::traits::{Diagnostics, ResultExtractor, RunKind, RunObject};

/// Turns the artifact records of one run into subjects.
///
/// Output order: image references, signable targets, structured outputs,
/// then legacy resource outputs (leaf runs only).
#[derive(Debug, Clone)]
pub struct SubjectCollector<X = NamingConventionExtractor> {
    extractor: X,
    legacy_resources: bool,
}

impl Default for SubjectCollector {
    fn default() -> Self {
        Self::new(NamingConventionExtractor)
    }
}

impl<X: ResultExtractor> SubjectCollector<X> {
    /// Creates a collector with the legacy resource path enabled.
    pub fn new(extractor: X) -> Self {
        Self {
            extractor,
            legacy_resources: true,
        }
    }

    /// Enables or disables the legacy resource-output path.
    pub fn with_legacy_resources(mut self, enabled: bool) -> Self {
        self.legacy_resources = enabled;
        self
    }

    /// Collects the subjects `obj` reports in its own results.
    ///
    /// Records with malformed digests are skipped and reported to
    /// `diagnostics`; nothing here fails.
    pub fn collect(&self, obj: &dyn RunObject, diagnostics: &dyn Diagnostics) -> Vec<Subject> {
        let mut subjects = Vec::new();

        for image in self.extractor.oci_images(obj, diagnostics) {
            subjects.push(Subject::new(
                image.repository,
                SHA256,
                strip_sha256_prefix(&image.digest),
            ));
        }

        let signables = self.extractor.signable_targets(obj, diagnostics);
        let outputs = self
            .extractor
            .structured_targets(obj, ArtifactCategory::Outputs, diagnostics);
        for target in signables.into_iter().chain(outputs) {
            if let Some(subject) = signable_subject(obj, target, diagnostics) {
                subjects.push(subject);
            }
        }

        if self.legacy_resources && obj.kind() == RunKind::Leaf {
            subjects.extend(legacy::subjects_from_resources(obj, diagnostics));
        }

        subjects
    }
}

fn signable_subject(
    obj: &dyn RunObject,
    target: StructuredSignable,
    diagnostics: &dyn Diagnostics,
) -> Option<Subject> {
    match split_digest(&target.digest) {
        Ok((algorithm, hex)) => Some(Subject::new(target.uri, algorithm, hex)),
        Err(_) => {
            diagnostics.record(Diagnostic::MalformedDigest {
                run: obj.name().to_string(),
                uri: target.uri,
                digest: target.digest,
            });
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::RecordingDiagnostics;
    use crate::model::{
        PipelineRun, PipelineRunObject, ResourceBinding, ResourceResult, ResourceSpec, RunResult,
        TaskRun, TaskRunResources,
    };

    fn collector() -> SubjectCollector {
        SubjectCollector::default()
    }

    fn task_run(results: Vec<RunResult>) -> TaskRun {
        let mut tr = TaskRun::default();
        tr.metadata.name = "tr".to_string();
        tr.status.task_results = results;
        tr
    }

    fn with_image_resource(mut tr: TaskRun) -> TaskRun {
        tr.spec.resources = Some(TaskRunResources {
            outputs: vec![ResourceBinding {
                name: "app".to_string(),
                resource_spec: Some(ResourceSpec {
                    resource_type: "image".to_string(),
                }),
            }],
        });
        tr.status.resources_result = vec![
            ResourceResult {
                resource_name: "app".to_string(),
                key: "url".to_string(),
                value: "gcr.io/legacy".to_string(),
            },
            ResourceResult {
                resource_name: "app".to_string(),
                key: "digest".to_string(),
                value: "sha256:ccc".to_string(),
            },
        ];
        tr
    }

    #[test]
    fn test_image_digest_prefix_stripped() {
        let tr = task_run(vec![
            RunResult::string("IMAGE_URL", "gcr.io/app"),
            RunResult::string("IMAGE_DIGEST", "sha256:deadbeef"),
        ]);

        let subjects = collector().collect(&tr, &RecordingDiagnostics::new());

        assert_eq!(subjects, vec![Subject::new("gcr.io/app", "sha256", "deadbeef")]);
    }

    #[test]
    fn test_signable_target_split() {
        let tr = task_run(vec![
            RunResult::string("ARTIFACT_URI", "pkg:generic/app"),
            RunResult::string("ARTIFACT_DIGEST", "sha256:abcd"),
        ]);

        let subjects = collector().collect(&tr, &RecordingDiagnostics::new());

        assert_eq!(subjects, vec![Subject::new("pkg:generic/app", "sha256", "abcd")]);
    }

    #[test]
    fn test_non_sha256_image_rejected() {
        let tr = task_run(vec![
            RunResult::string("IMAGE_URL", "gcr.io/app"),
            RunResult::string("IMAGE_DIGEST", "sha512:ff"),
        ]);
        let diag = RecordingDiagnostics::new();

        let subjects = collector().collect(&tr, &diag);

        assert!(subjects.is_empty());
        assert!(matches!(
            diag.events().as_slice(),
            [Diagnostic::InvalidImageReference { reference, .. }]
                if reference == "gcr.io/app@sha512:ff"
        ));
    }

    #[test]
    fn test_malformed_signable_digest_skipped() {
        let tr = task_run(vec![
            RunResult::string("bad-ARTIFACT_URI", "pkg:generic/bad"),
            RunResult::string("bad-ARTIFACT_DIGEST", "nodelimiter"),
            RunResult::string("good-ARTIFACT_URI", "pkg:generic/good"),
            RunResult::string("good-ARTIFACT_DIGEST", "sha512:ff"),
        ]);
        let diag = RecordingDiagnostics::new();

        let subjects = collector().collect(&tr, &diag);

        assert_eq!(subjects, vec![Subject::new("pkg:generic/good", "sha512", "ff")]);
        assert_eq!(
            diag.events(),
            vec![Diagnostic::MalformedDigest {
                run: "tr".to_string(),
                uri: "pkg:generic/bad".to_string(),
                digest: "nodelimiter".to_string(),
            }]
        );
    }

    #[test]
    fn test_malformed_structured_output_skipped() {
        let tr = task_run(vec![
            RunResult::object("a-ARTIFACT_OUTPUTS", [("uri", "pkg:a"), ("digest", "sha256:a:b")]),
            RunResult::object("b-ARTIFACT_OUTPUTS", [("uri", "pkg:b"), ("digest", "sha256:b")]),
        ]);
        let diag = RecordingDiagnostics::new();

        let subjects = collector().collect(&tr, &diag);

        assert_eq!(subjects, vec![Subject::new("pkg:b", "sha256", "b")]);
        assert!(matches!(
            diag.events().as_slice(),
            [Diagnostic::MalformedDigest { uri, .. }] if uri == "pkg:a"
        ));
    }

    #[test]
    fn test_inputs_are_not_subjects() {
        let tr = task_run(vec![RunResult::object(
            "src-ARTIFACT_INPUTS",
            [("uri", "git+https://x"), ("digest", "sha1:2")],
        )]);

        assert!(collector()
            .collect(&tr, &RecordingDiagnostics::new())
            .is_empty());
    }

    #[test]
    fn test_source_order() {
        let tr = with_image_resource(task_run(vec![
            RunResult::object("ARTIFACT_OUTPUTS", [("uri", "pkg:out"), ("digest", "sha256:3")]),
            RunResult::string("ARTIFACT_URI", "pkg:signable"),
            RunResult::string("ARTIFACT_DIGEST", "sha256:2"),
            RunResult::string("IMAGES", "gcr.io/img@sha256:1"),
        ]));

        let subjects = collector().collect(&tr, &RecordingDiagnostics::new());

        let names: Vec<&str> = subjects.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["gcr.io/img", "pkg:signable", "pkg:out", "gcr.io/legacy"]);
        assert_eq!(subjects[3].digest.get("sha256"), Some(&"ccc".to_string()));
    }

    #[test]
    fn test_legacy_resources_can_be_disabled() {
        let tr = with_image_resource(task_run(vec![]));

        let subjects = collector()
            .with_legacy_resources(false)
            .collect(&tr, &RecordingDiagnostics::new());

        assert!(subjects.is_empty());
    }

    #[test]
    fn test_aggregate_has_no_legacy_path() {
        let mut pr = PipelineRunObject::new(PipelineRun::default(), vec![]);
        pr.pipeline_run.status.pipeline_results = vec![
            RunResult::string("IMAGE_URL", "gcr.io/app"),
            RunResult::string("IMAGE_DIGEST", "sha256:1"),
        ];

        let subjects = collector().collect(&pr, &RecordingDiagnostics::new());

        assert_eq!(subjects, vec![Subject::new("gcr.io/app", "sha256", "1")]);
    }
}
