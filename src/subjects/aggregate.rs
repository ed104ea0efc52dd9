//! Subjects for a whole run, optionally including its child runs.

use tracing::debug;

use crate::artifacts::NamingConventionExtractor;
use crate::config::SlsaConfig;
use crate::logging::Diagnostic;
use crate::model::Subject;
use crate::subjects::collector::SubjectCollector;
use crate::subjects::merge::SubjectSet;
use crate::traits::{Diagnostics, ResultExtractor, RunKind, RunObject};

/// Subjects produced by `obj`, using the naming-convention extractor and the
/// settings in `config`.
pub fn subject_digests(
    obj: &dyn RunObject,
    config: &SlsaConfig,
    diagnostics: &dyn Diagnostics,
) -> Vec<Subject> {
    let collector = SubjectCollector::new(NamingConventionExtractor)
        .with_legacy_resources(config.legacy_resources);
    collect_subjects(&collector, obj, config.deep_inspection_enabled, diagnostics)
}

/// Subjects produced by `obj`.
///
/// Leaf runs report their own results. Aggregate runs report their own
/// results too, unless `deep_inspection` is set: then every completed child
/// run is collected first, in declaration order, and the aggregate's own
/// subjects are merged in last. Other run kinds report nothing.
pub fn collect_subjects<X: ResultExtractor>(
    collector: &SubjectCollector<X>,
    obj: &dyn RunObject,
    deep_inspection: bool,
    diagnostics: &dyn Diagnostics,
) -> Vec<Subject> {
    match obj.kind() {
        RunKind::Leaf => collector.collect(obj, diagnostics),
        RunKind::Aggregate => {
            let own = collector.collect(obj, diagnostics);
            if !deep_inspection {
                return own;
            }

            let mut set = SubjectSet::new();
            for task in obj.child_task_names() {
                if let Some(child) = completed_child(obj, task, diagnostics) {
                    let found = collector.collect(child, diagnostics);
                    debug!(run = %obj.name(), task, subjects = found.len(), "Collected child run");
                    set.extend(found);
                }
            }
            set.extend(own);
            set.into_subjects()
        }
        RunKind::Other => {
            diagnostics.record(Diagnostic::UnsupportedRunKind {
                run: obj.name().to_string(),
            });
            Vec::new()
        }
    }
}

/// The finished run for child task `task`, or `None` with a diagnostic if it
/// never ran or is still going.
pub(crate) fn completed_child<'a>(
    obj: &'a dyn RunObject,
    task: &str,
    diagnostics: &dyn Diagnostics,
) -> Option<&'a dyn RunObject> {
    match obj.resolve_child(task) {
        None => {
            diagnostics.record(Diagnostic::ChildRunMissing {
                run: obj.name().to_string(),
                task: task.to_string(),
            });
            None
        }
        Some(child) if !child.is_complete() => {
            diagnostics.record(Diagnostic::ChildRunIncomplete {
                run: obj.name().to_string(),
                task: task.to_string(),
            });
            None
        }
        Some(child) => Some(child),
    }
}
