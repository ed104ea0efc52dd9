//! Subject collection for SLSA provenance.
//!
//! - **Collector**: subjects from one run object via [`SubjectCollector`]
//! - **Merger**: deduplication via [`SubjectSet`]
//! - **Aggregator**: whole-run collection via [`subject_digests`] /
//!   [`collect_subjects`], optionally recursing into child runs
//! - **URIs**: flat `name@algorithm:hex` rendering via [`format_uris`]
//! - **Legacy**: deprecated PipelineResource image outputs

pub mod aggregate;
pub mod collector;
pub mod legacy;
pub mod merge;
pub mod uris;

pub use aggregate::{collect_subjects, subject_digests};
pub use collector::SubjectCollector;
pub use merge::{merge_subject, same_artifact, SubjectSet, Upsert};
pub use uris::{format_uris, retrieve_all_artifact_uris};
