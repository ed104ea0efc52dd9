//! Data model: subjects, digest sets and the Tekton-shaped run objects they
//! are harvested from.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::traits::{LegacyResources, LoadError, RunKind, RunObject};

/// Label Tekton puts on a child TaskRun naming the pipeline task it executes.
pub const PIPELINE_TASK_LABEL: &str = "tekton.dev/pipelineTask";

// ============================================================================
// Subjects
// ============================================================================

/// Mapping from hash algorithm name (e.g. `"sha256"`) to hex digest.
///
/// Keys are case-sensitive. Ordered so that serialized attestations are
/// stable, but callers should not rely on a particular algorithm order.
pub type DigestSet = BTreeMap<String, String>;

/// A named artifact and its content digests, in the in-toto subject shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    /// Artifact identifier: image repository or artifact URI
    pub name: String,

    /// Digests observed for this artifact
    pub digest: DigestSet,
}

impl Subject {
    /// Creates a subject with a single digest entry.
    pub fn new(
        name: impl Into<String>,
        algorithm: impl Into<String>,
        hex: impl Into<String>,
    ) -> Self {
        let mut digest = DigestSet::new();
        digest.insert(algorithm.into(), hex.into());
        Self {
            name: name.into(),
            digest,
        }
    }
}

/// An OCI image reference pinned by digest, e.g. `gcr.io/app@sha256:...`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageReference {
    /// Repository name with any tag removed
    pub repository: String,

    /// Digest string as written, including the algorithm prefix
    pub digest: String,
}

/// A `URI`/`Digest` pair found in run results.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredSignable {
    pub uri: String,
    pub digest: String,
}

// ============================================================================
// Results
// ============================================================================

/// Value of a run result. Tekton results are strings, string arrays, or
/// objects with string fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResultValue {
    String(String),
    Array(Vec<String>),
    Object(BTreeMap<String, String>),
}

impl ResultValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ResultValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&BTreeMap<String, String>> {
        match self {
            ResultValue::Object(o) => Some(o),
            _ => None,
        }
    }
}

/// A named result emitted by a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunResult {
    pub name: String,
    pub value: ResultValue,
}

impl RunResult {
    /// Builds a string-valued result.
    pub fn string(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: ResultValue::String(value.into()),
        }
    }

    /// Builds an object-valued result from `(field, value)` pairs.
    pub fn object<K, V>(name: impl Into<String>, fields: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            name: name.into(),
            value: ResultValue::Object(
                fields
                    .into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }
}

// ============================================================================
// TaskRun
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectMeta {
    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
}

/// A single task execution (leaf run).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRun {
    #[serde(default)]
    pub metadata: ObjectMeta,

    #[serde(default)]
    pub spec: TaskRunSpec,

    #[serde(default)]
    pub status: TaskRunStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRunSpec {
    /// Deprecated PipelineResource bindings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resources: Option<TaskRunResources>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskRunResources {
    #[serde(default)]
    pub outputs: Vec<ResourceBinding>,
}

/// An output resource declared by a TaskRun.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceBinding {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_spec: Option<ResourceSpec>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceSpec {
    /// Resource type, e.g. `"image"` or `"git"`
    #[serde(rename = "type")]
    pub resource_type: String,
}

/// One `key=value` entry a resource wrote back after the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceResult {
    pub resource_name: String,
    pub key: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRunStatus {
    /// RFC 3339 timestamp; absent while the run is still going
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_time: Option<String>,

    #[serde(default)]
    pub task_results: Vec<RunResult>,

    #[serde(default)]
    pub resources_result: Vec<ResourceResult>,
}

impl TaskRun {
    /// Pipeline task this run executes, from its `tekton.dev/pipelineTask` label.
    pub fn pipeline_task(&self) -> Option<&str> {
        self.metadata
            .labels
            .get(PIPELINE_TASK_LABEL)
            .map(String::as_str)
    }
}

impl RunObject for TaskRun {
    fn kind(&self) -> RunKind {
        RunKind::Leaf
    }

    fn name(&self) -> &str {
        &self.metadata.name
    }

    fn results(&self) -> &[RunResult] {
        &self.status.task_results
    }

    fn completion_time(&self) -> Option<&str> {
        self.status.completion_time.as_deref()
    }

    fn legacy_resources(&self) -> Option<LegacyResources<'_>> {
        self.spec.resources.as_ref().map(|r| LegacyResources {
            outputs: &r.outputs,
            results: &self.status.resources_result,
        })
    }
}

// ============================================================================
// PipelineRun
// ============================================================================

/// A pipeline execution (aggregate run).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineRun {
    #[serde(default)]
    pub metadata: ObjectMeta,

    #[serde(default)]
    pub status: PipelineRunStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineRunStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completion_time: Option<String>,

    /// Resolved pipeline definition the run executed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pipeline_spec: Option<PipelineSpec>,

    #[serde(default)]
    pub pipeline_results: Vec<RunResult>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineSpec {
    #[serde(default)]
    pub tasks: Vec<PipelineTask>,

    /// Tasks that run after `tasks`, regardless of outcome
    #[serde(default)]
    pub finally: Vec<PipelineTask>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineTask {
    pub name: String,
}

impl PipelineTask {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// A PipelineRun together with the child TaskRuns fetched for it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineRunObject {
    #[serde(flatten)]
    pub pipeline_run: PipelineRun,

    #[serde(default)]
    pub task_runs: Vec<TaskRun>,
}

impl PipelineRunObject {
    pub fn new(pipeline_run: PipelineRun, task_runs: Vec<TaskRun>) -> Self {
        Self {
            pipeline_run,
            task_runs,
        }
    }

    /// Finds the child TaskRun that executed pipeline task `task`.
    pub fn task_run_for(&self, task: &str) -> Option<&TaskRun> {
        self.task_runs
            .iter()
            .find(|tr| tr.pipeline_task() == Some(task))
    }
}

impl RunObject for PipelineRunObject {
    fn kind(&self) -> RunKind {
        RunKind::Aggregate
    }

    fn name(&self) -> &str {
        &self.pipeline_run.metadata.name
    }

    fn results(&self) -> &[RunResult] {
        &self.pipeline_run.status.pipeline_results
    }

    fn completion_time(&self) -> Option<&str> {
        self.pipeline_run.status.completion_time.as_deref()
    }

    fn child_task_names(&self) -> Vec<&str> {
        match &self.pipeline_run.status.pipeline_spec {
            Some(spec) => spec
                .tasks
                .iter()
                .chain(spec.finally.iter())
                .map(|t| t.name.as_str())
                .collect(),
            None => Vec::new(),
        }
    }

    fn resolve_child(&self, task: &str) -> Option<&dyn RunObject> {
        self.task_run_for(task).map(|tr| tr as &dyn RunObject)
    }
}

// ============================================================================
// Tagged object
// ============================================================================

/// Any run object Tekton hands to the attestation generator, tagged by `kind`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum TektonObject {
    PipelineRun(PipelineRunObject),
    TaskRun(TaskRun),
}

impl TektonObject {
    /// Decodes a run object from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::Json`] if the document is not a `TaskRun` or
    /// `PipelineRun` object.
    pub fn from_json(json: &str) -> Result<Self, LoadError> {
        Ok(serde_json::from_str(json)?)
    }

    fn inner(&self) -> &dyn RunObject {
        match self {
            TektonObject::PipelineRun(pr) => pr,
            TektonObject::TaskRun(tr) => tr,
        }
    }
}

impl RunObject for TektonObject {
    fn kind(&self) -> RunKind {
        self.inner().kind()
    }

    fn name(&self) -> &str {
        self.inner().name()
    }

    fn results(&self) -> &[RunResult] {
        self.inner().results()
    }

    fn completion_time(&self) -> Option<&str> {
        self.inner().completion_time()
    }

    fn child_task_names(&self) -> Vec<&str> {
        self.inner().child_task_names()
    }

    fn resolve_child(&self, task: &str) -> Option<&dyn RunObject> {
        self.inner().resolve_child(task)
    }

    fn legacy_resources(&self) -> Option<LegacyResources<'_>> {
        self.inner().legacy_resources()
    }
}

impl From<TaskRun> for TektonObject {
    fn from(tr: TaskRun) -> Self {
        TektonObject::TaskRun(tr)
    }
}

impl From<PipelineRunObject> for TektonObject {
    fn from(pr: PipelineRunObject) -> Self {
        TektonObject::PipelineRun(pr)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subject_serializes_in_intoto_shape() {
        let subject = Subject::new("gcr.io/app", "sha256", "abc");
        let json = serde_json::to_value(&subject).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"name": "gcr.io/app", "digest": {"sha256": "abc"}})
        );
    }

    #[test]
    fn test_result_value_untagged() {
        let results: Vec<RunResult> = serde_json::from_value(serde_json::json!([
            {"name": "IMAGE_URL", "value": "gcr.io/app"},
            {"name": "IMAGES", "value": ["a@sha256:1", "b@sha256:2"]},
            {"name": "ARTIFACT_OUTPUTS", "value": {"uri": "pkg", "digest": "sha256:3"}}
        ]))
        .unwrap();

        assert_eq!(results[0].value.as_str(), Some("gcr.io/app"));
        assert!(matches!(&results[1].value, ResultValue::Array(a) if a.len() == 2));
        assert_eq!(
            results[2].value.as_object().and_then(|o| o.get("uri")),
            Some(&"pkg".to_string())
        );
    }

    #[test]
    fn test_pipeline_run_children_in_declaration_order() {
        let pr = PipelineRunObject::new(
            PipelineRun {
                status: PipelineRunStatus {
                    pipeline_spec: Some(PipelineSpec {
                        tasks: vec![PipelineTask::new("build"), PipelineTask::new("scan")],
                        finally: vec![PipelineTask::new("notify")],
                    }),
                    ..Default::default()
                },
                ..Default::default()
            },
            vec![],
        );

        assert_eq!(pr.child_task_names(), vec!["build", "scan", "notify"]);
        assert!(pr.resolve_child("build").is_none());
    }

    #[test]
    fn test_task_run_for_matches_label() {
        let mut tr = TaskRun::default();
        tr.metadata.name = "pr-build-abc".to_string();
        tr.metadata
            .labels
            .insert(PIPELINE_TASK_LABEL.to_string(), "build".to_string());
        let pr = PipelineRunObject::new(PipelineRun::default(), vec![tr]);

        assert_eq!(pr.task_run_for("build").map(|t| t.name()), Some("pr-build-abc"));
        assert!(pr.task_run_for("scan").is_none());
    }

    #[test]
    fn test_tekton_object_from_json() {
        let obj = TektonObject::from_json(
            r#"{
                "kind": "TaskRun",
                "metadata": {"name": "tr-1"},
                "status": {
                    "completionTime": "2024-01-01T00:00:00Z",
                    "taskResults": [{"name": "IMAGE_URL", "value": "gcr.io/app"}]
                }
            }"#,
        )
        .unwrap();

        assert_eq!(obj.kind(), RunKind::Leaf);
        assert_eq!(obj.name(), "tr-1");
        assert_eq!(obj.results().len(), 1);
        assert_eq!(obj.completion_time(), Some("2024-01-01T00:00:00Z"));
    }

    #[test]
    fn test_tekton_object_rejects_unknown_kind() {
        let err = TektonObject::from_json(r#"{"kind": "CustomRun"}"#).unwrap_err();
        assert!(matches!(err, LoadError::Json(_)));
    }
}
