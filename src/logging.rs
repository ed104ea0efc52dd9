//! Diagnostics emitted while collecting subjects, and the sinks that
//! receive them.
//!
//! Collection never fails hard. Anything skipped is reported as a
//! [`Diagnostic`] to the [`Diagnostics`] sink passed in by the caller:
//! [`TracingDiagnostics`] forwards to `tracing`, [`RecordingDiagnostics`]
//! keeps the events in memory.

use std::fmt;
use std::sync::Mutex;
use tracing::{debug, error, info, Level};
use tracing_subscriber::EnvFilter;

use crate::traits::Diagnostics;

/// Something the collector skipped or could not interpret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// A digest did not split into exactly `algorithm:hex`
    MalformedDigest {
        run: String,
        uri: String,
        digest: String,
    },

    /// An image reference could not be parsed
    InvalidImageReference {
        run: String,
        reference: String,
        reason: String,
    },

    /// An `*ARTIFACT_OUTPUTS`/`*ARTIFACT_INPUTS` result had the wrong shape
    InvalidStructuredResult {
        run: String,
        result: String,
        reason: String,
    },

    /// A declared child task has no run
    ChildRunMissing { run: String, task: String },

    /// A declared child task's run has not completed
    ChildRunIncomplete { run: String, task: String },

    /// An image resource output lacked a `url` or `digest`
    IncompleteResourceOutput { run: String, resource: String },

    /// The run object is neither an aggregate nor a leaf run
    UnsupportedRunKind { run: String },
}

impl Diagnostic {
    /// Severity used when forwarding to `tracing`.
    pub fn level(&self) -> Level {
        match self {
            Diagnostic::MalformedDigest { .. }
            | Diagnostic::InvalidImageReference { .. }
            | Diagnostic::IncompleteResourceOutput { .. } => Level::ERROR,
            Diagnostic::ChildRunMissing { .. }
            | Diagnostic::ChildRunIncomplete { .. }
            | Diagnostic::UnsupportedRunKind { .. } => Level::INFO,
            Diagnostic::InvalidStructuredResult { .. } => Level::DEBUG,
        }
    }

    /// Name of the run object the event was raised for.
    pub fn run(&self) -> &str {
        match self {
            Diagnostic::MalformedDigest { run, .. }
            | Diagnostic::InvalidImageReference { run, .. }
            | Diagnostic::InvalidStructuredResult { run, .. }
            | Diagnostic::ChildRunMissing { run, .. }
            | Diagnostic::ChildRunIncomplete { run, .. }
            | Diagnostic::IncompleteResourceOutput { run, .. }
            | Diagnostic::UnsupportedRunKind { run } => run,
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::MalformedDigest { uri, digest, .. } => write!(
                f,
                "digest {digest} of {uri} should be in the format of algorithm:abc"
            ),
            Diagnostic::InvalidImageReference {
                reference, reason, ..
            } => write!(f, "error getting digest for image {reference}: {reason}"),
            Diagnostic::InvalidStructuredResult { result, reason, .. } => {
                write!(f, "result {result} is not a structured artifact: {reason}")
            }
            Diagnostic::ChildRunMissing { task, .. } => {
                write!(f, "taskrun not found for task {task}")
            }
            Diagnostic::ChildRunIncomplete { task, .. } => {
                write!(f, "taskrun for task {task} has not completed")
            }
            Diagnostic::IncompleteResourceOutput { resource, .. } => {
                write!(f, "image resource {resource} is missing url or digest")
            }
            Diagnostic::UnsupportedRunKind { .. } => {
                write!(f, "run object kind does not carry subjects")
            }
        }
    }
}

// ============================================================================
// Sinks
// ============================================================================

/// Forwards diagnostics to `tracing` at [`Diagnostic::level`].
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingDiagnostics;

impl Diagnostics for TracingDiagnostics {
    fn record(&self, event: Diagnostic) {
        let level = event.level();
        if level == Level::ERROR {
            error!(run = %event.run(), "{}", event);
        } else if level == Level::INFO {
            info!(run = %event.run(), "{}", event);
        } else {
            debug!(run = %event.run(), "{}", event);
        }
    }
}

/// Keeps every diagnostic in memory, in the order raised.
#[derive(Debug, Default)]
pub struct RecordingDiagnostics {
    events: Mutex<Vec<Diagnostic>>,
}

impl RecordingDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events recorded so far.
    pub fn events(&self) -> Vec<Diagnostic> {
        match self.events.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl Diagnostics for RecordingDiagnostics {
    fn record(&self, event: Diagnostic) {
        let mut guard = match self.events.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.push(event);
    }
}

/// Installs a `fmt` subscriber filtered by `RUST_LOG` (default `info`).
///
/// # Errors
///
/// Returns `Err` if a global subscriber is already installed.
pub fn init_tracing() -> Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).try_init()
}
