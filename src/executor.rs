use crate::model::Subject;
use crate::subjects::aggregate::{collect_subjects, completed_child};
use crate::subjects::{SubjectCollector, SubjectSet};
use crate::traits::{Diagnostics, ResultExtractor, RunKind, RunObject};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{info, instrument};

#[derive(thiserror::Error, Debug)]
pub enum ExecutorError {
    #[error("Semaphore error: {0}")]
    Semaphore(#[from] tokio::sync::AcquireError),
    #[error("Collection task for child {task} failed: {source}")]
    Join {
        task: String,
        #[source]
        source: tokio::task::JoinError,
    },
}

/// Collects subjects from child runs concurrently.
///
/// Per-child extraction runs on the blocking pool, at most
/// `concurrency_limit` at a time. Results are merged in declaration order, so
/// the output matches [`collect_subjects`].
pub struct SubjectExecutor<X: ResultExtractor> {
    collector: Arc<SubjectCollector<X>>,
    semaphore: Arc<Semaphore>,
    deep_inspection: bool,
}

impl<X: ResultExtractor + 'static> SubjectExecutor<X> {
    pub fn new(collector: SubjectCollector<X>, concurrency_limit: usize) -> Self {
        Self {
            collector: Arc::new(collector),
            semaphore: Arc::new(Semaphore::new(concurrency_limit.max(1))),
            deep_inspection: false,
        }
    }

    pub fn with_deep_inspection(mut self, enabled: bool) -> Self {
        self.deep_inspection = enabled;
        self
    }

    #[instrument(skip(self, obj, diagnostics), fields(run = %obj.name()))]
    pub async fn execute(
        &self,
        obj: Arc<dyn RunObject>,
        diagnostics: Arc<dyn Diagnostics>,
    ) -> Result<Vec<Subject>, ExecutorError> {
        if obj.kind() != RunKind::Aggregate || !self.deep_inspection {
            return Ok(collect_subjects(
                &self.collector,
                obj.as_ref(),
                self.deep_inspection,
                diagnostics.as_ref(),
            ));
        }

        let tasks: Vec<String> = obj
            .child_task_names()
            .into_iter()
            .map(str::to_owned)
            .collect();
        info!(children = tasks.len(), "Starting child subject collection");
        let own = self.collector.collect(obj.as_ref(), diagnostics.as_ref());

        let mut handles = Vec::with_capacity(tasks.len());
        for task in tasks {
            let permit = self.semaphore.clone().acquire_owned().await?;
            let collector = Arc::clone(&self.collector);
            let obj = Arc::clone(&obj);
            let diagnostics = Arc::clone(&diagnostics);
            let name = task.clone();

            let handle = tokio::task::spawn_blocking(move || {
                let _permit = permit;
                match completed_child(obj.as_ref(), &task, diagnostics.as_ref()) {
                    Some(child) => collector.collect(child, diagnostics.as_ref()),
                    None => Vec::new(),
                }
            });
            handles.push((name, handle));
        }

        let mut set = SubjectSet::new();
        for (task, handle) in handles {
            let found = handle
                .await
                .map_err(|source| ExecutorError::Join { task, source })?;
            set.extend(found);
        }
        set.extend(own);

        info!(subjects = set.len(), "Finished child subject collection");
        Ok(set.into_subjects())
    }
}
