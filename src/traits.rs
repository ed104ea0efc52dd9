use crate::artifacts::ArtifactCategory;
use crate::logging::Diagnostic;
use crate::model::{ImageReference, ResourceBinding, ResourceResult, RunResult, StructuredSignable};
use thiserror::Error;

// ============================================================================
// Errors
// ============================================================================

/// Structural problems with a digest or image reference string.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DigestError {
    #[error("digest {0:?} should be in the format of algorithm:hex")]
    Malformed(String),
    #[error("image reference {0:?} is not pinned by digest")]
    MissingDigest(String),
    #[error("image reference {0:?} has an empty repository")]
    EmptyRepository(String),
    #[error("image reference {0:?} should be pinned by a sha256 digest")]
    UnsupportedAlgorithm(String),
}

/// Failure decoding a run object.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Failed to decode run object: {0}")]
    Json(#[from] serde_json::Error),
}

// ============================================================================
// Run objects
// ============================================================================

/// Which side of the pipeline/task hierarchy a run object sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunKind {
    /// A pipeline-level run composed of child task runs
    Aggregate,
    /// A single task run
    Leaf,
    /// Anything else; contributes no subjects
    Other,
}

/// Deprecated PipelineResource data carried by a leaf run.
#[derive(Debug, Clone, Copy)]
pub struct LegacyResources<'a> {
    pub outputs: &'a [ResourceBinding],
    pub results: &'a [ResourceResult],
}

/// Read-only view over one execution.
pub trait RunObject: Send + Sync {
    fn kind(&self) -> RunKind;

    /// Object name, used to label diagnostics.
    fn name(&self) -> &str;

    fn results(&self) -> &[RunResult];

    /// When the run finished; `None` while it is pending or running.
    fn completion_time(&self) -> Option<&str> {
        None
    }

    fn is_complete(&self) -> bool {
        self.completion_time().is_some()
    }

    /// Declared child tasks, normal tasks followed by finally tasks.
    /// Empty for leaf runs.
    fn child_task_names(&self) -> Vec<&str> {
        Vec::new()
    }

    /// The run that executed child task `task`, if one exists.
    fn resolve_child(&self, _task: &str) -> Option<&dyn RunObject> {
        None
    }

    fn legacy_resources(&self) -> Option<LegacyResources<'_>> {
        None
    }
}

// ============================================================================
// Result extraction
// ============================================================================

/// Locates typed artifact records in a run's results.
pub trait ResultExtractor: Send + Sync {
    /// Image references pinned by digest.
    fn oci_images(&self, obj: &dyn RunObject, diagnostics: &dyn Diagnostics)
        -> Vec<ImageReference>;

    /// Generic `URI`/`Digest` pairs.
    fn signable_targets(
        &self,
        obj: &dyn RunObject,
        diagnostics: &dyn Diagnostics,
    ) -> Vec<StructuredSignable>;

    /// Object-valued results of the given category carrying `uri` and `digest`.
    fn structured_targets(
        &self,
        obj: &dyn RunObject,
        category: ArtifactCategory,
        diagnostics: &dyn Diagnostics,
    ) -> Vec<StructuredSignable>;
}

// ============================================================================
// Diagnostics
// ============================================================================

/// Sink for best-effort diagnostics raised while collecting subjects.
pub trait Diagnostics: Send + Sync {
    fn record(&self, event: Diagnostic);
}
