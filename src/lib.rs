pub mod artifacts;
pub mod config;
pub mod executor;
pub mod logging;
pub mod model;
pub mod subjects;
pub mod traits;

// Re-export common types for convenience
pub use config::SlsaConfig;
pub use executor::*;
pub use logging::{Diagnostic, RecordingDiagnostics, TracingDiagnostics};
pub use model::*;
pub use subjects::{
    collect_subjects, format_uris, merge_subject, retrieve_all_artifact_uris, subject_digests,
    SubjectCollector, SubjectSet,
};
pub use traits::*;
