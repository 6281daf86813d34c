//! Python wheel trampoline.
//!
//! Some clusters cannot run a `python-wheel-task` directly. With the
//! `python-wheel-wrapper` experiment enabled, each wheel task is rewritten into a
//! `notebook-task` that points at a generated notebook in the bundle's internal
//! directory. That notebook installs the wheel and calls its entry point, so the
//! task's own `whl` libraries are dropped. Rendering the notebook itself is left
//! to the packaging step.
//!
//! Example: job `job1`, task `key1`, target `development`
//! - before: `python-wheel-task = { package-name = "pkg", entry-point = "main" }`
//! - after: `notebook-task = { notebook-path = ".bundle/development/.internal/notebook_job1_key1" }`

use indexmap::IndexMap;

use crate::bundle::Bundle;
use crate::config::{Job, NotebookTask, Task, TaskKind};
use crate::mutator::Mutator;
use crate::path::join_slash;

/// Name of the generated notebook for a job's task.
pub fn notebook_name(job_key: &str, task_key: &str) -> String {
    format!("notebook_{job_key}_{task_key}")
}

/// Map one task.
///
/// Only a wheel task with `enabled` set changes: it becomes a notebook task at
/// `<notebook_dir>/notebook_<job_key>_<task_key>` and loses its wheel libraries.
/// Everything else comes back as is.
pub fn transform_task(task: Task, job_key: &str, enabled: bool, notebook_dir: &str) -> Task {
    if !enabled {
        return task;
    }

    match task.kind {
        TaskKind::PythonWheelTask(_) => {
            let notebook_path = join_slash([
                notebook_dir,
                notebook_name(job_key, &task.task_key).as_str(),
            ]);
            let mut libraries = task.libraries;
            libraries.retain(|library| !library.is_wheel());

            Task {
                task_key: task.task_key,
                kind: TaskKind::NotebookTask(NotebookTask {
                    notebook_path,
                    ..Default::default()
                }),
                extra: task.extra,
                libraries,
            }
        }
        _ => task,
    }
}

/// Map every task of every job in place; returns how many were rewritten.
pub fn transform_jobs(
    jobs: &mut IndexMap<String, Job>,
    enabled: bool,
    notebook_dir: &str,
) -> usize {
    let mut rewritten = 0;
    for (job_key, job) in jobs.iter_mut() {
        job.tasks = std::mem::take(&mut job.tasks)
            .into_iter()
            .map(|task| {
                if !enabled || task.python_wheel_task().is_none() {
                    return task;
                }

                warn_on_unsafe_segment(job_key, &task.task_key);
                let task = transform_task(task, job_key, enabled, notebook_dir);
                rewritten += 1;

                if let Some(notebook) = task.notebook_task() {
                    log::debug!(
                        "Wrapped wheel task {}.{} in notebook {}",
                        job_key,
                        task.task_key,
                        notebook.notebook_path
                    );
                }
                task
            })
            .collect();
    }
    rewritten
}

/// Keys go into the notebook name verbatim, so a separator would nest the notebook.
fn warn_on_unsafe_segment(job_key: &str, task_key: &str) {
    let is_unsafe = |key: &str| key.contains(|c: char| c == '/' || c == '\\');
    if is_unsafe(job_key) || is_unsafe(task_key) {
        log::warn!(
            "Job {} task {} contains a path separator; generated notebook {} will be nested",
            job_key,
            task_key,
            notebook_name(job_key, task_key)
        );
    }
}

/// Mutator that applies the trampoline when `experimental.python-wheel-wrapper` is set.
#[derive(Debug, Default, Clone, Copy)]
pub struct TransformWheelTask;

/// Build the wheel task transform mutator.
pub fn transform_wheel_task() -> TransformWheelTask {
    TransformWheelTask
}

impl Mutator for TransformWheelTask {
    fn name(&self) -> &str {
        "python.TransformWheelTask"
    }

    fn apply(&self, bundle: &mut Bundle) -> anyhow::Result<()> {
        let enabled = bundle.config.python_wheel_wrapper();
        if !enabled {
            log::debug!("python-wheel-wrapper is disabled; leaving wheel tasks unchanged");
            return Ok(());
        }

        let has_wheel_tasks = bundle
            .config
            .resources
            .tasks()
            .any(|(_, task)| task.python_wheel_task().is_some());
        if !has_wheel_tasks {
            return Ok(());
        }

        // Resolve before touching any task so a failure leaves the tree intact
        let internal_dir = bundle.internal_dir_relative()?;
        let notebook_dir = join_slash([
            bundle.config.workspace.files_path.as_deref().unwrap_or_default(),
            internal_dir.as_str(),
        ]);

        let rewritten = transform_jobs(&mut bundle.config.resources.jobs, enabled, &notebook_dir);
        log::debug!("Wrapped {} Python wheel task(s)", rewritten);
        Ok(())
    }
}
