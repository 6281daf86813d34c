//! Job and task resources
//!
//! The `[resources]` part of `bundle.toml`. Task variants and library references
//! are tagged enums: a task carries exactly one variant key, and each library
//! entry is a single-key table such as `{ whl = "dist/app.whl" }`.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Resources declared by a bundle.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct Resources {
    /// Jobs keyed by job identifier, in declaration order
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub jobs: IndexMap<String, Job>,

    /// Keys not modelled here, carried through unchanged
    #[serde(flatten)]
    pub extra: toml::Table,
}

impl Resources {
    /// Iterate over every task of every job, paired with its job key.
    pub fn tasks(&self) -> impl Iterator<Item = (&str, &Task)> {
        self.jobs
            .iter()
            .flat_map(|(key, job)| job.tasks.iter().map(move |task| (key.as_str(), task)))
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct Job {
    /// Display name; the job key is what identifies the job
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default)]
    pub tasks: Vec<Task>,

    /// Keys not modelled here, carried through unchanged
    #[serde(flatten)]
    pub extra: toml::Table,
}

/// A single task within a job.
///
/// ```toml
/// [[resources.jobs.job1.tasks]]
/// task-key = "key1"
/// python-wheel-task = { package-name = "my_package", entry-point = "main" }
/// libraries = [{ whl = "dist/my_package-0.1-py3-none-any.whl" }]
/// ```
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct Task {
    pub task_key: String,

    #[serde(flatten)]
    pub kind: TaskKind,

    /// Keys not modelled here (cluster, dependencies, retries, ...), carried through unchanged
    #[serde(flatten)]
    pub extra: toml::Table,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub libraries: Vec<Library>,
}

impl Task {
    pub fn new(task_key: impl Into<String>, kind: TaskKind) -> Self {
        Self {
            task_key: task_key.into(),
            kind,
            extra: toml::Table::new(),
            libraries: Vec::new(),
        }
    }

    pub fn with_libraries(mut self, libraries: impl IntoIterator<Item = Library>) -> Self {
        self.libraries.extend(libraries);
        self
    }

    pub fn python_wheel_task(&self) -> Option<&PythonWheelTask> {
        match &self.kind {
            TaskKind::PythonWheelTask(wheel) => Some(wheel),
            _ => None,
        }
    }

    pub fn notebook_task(&self) -> Option<&NotebookTask> {
        match &self.kind {
            TaskKind::NotebookTask(notebook) => Some(notebook),
            _ => None,
        }
    }
}

/// What a task runs. Exactly one variant key appears in the task table.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub enum TaskKind {
    PythonWheelTask(PythonWheelTask),
    NotebookTask(NotebookTask),
    SparkJarTask(SparkJarTask),
    SparkPythonTask(SparkPythonTask),
    SqlTask(SqlTask),
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct PythonWheelTask {
    pub package_name: String,
    pub entry_point: String,

    /// Positional arguments passed to the entry point
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<String>,

    /// `--key=value` style arguments passed to the entry point
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub named_parameters: IndexMap<String, String>,

    /// Keys not modelled here, carried through unchanged
    #[serde(flatten)]
    pub extra: toml::Table,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct NotebookTask {
    pub notebook_path: String,

    /// Keys not modelled here, carried through unchanged
    #[serde(flatten)]
    pub extra: toml::Table,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct SparkJarTask {
    pub main_class_name: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<String>,

    /// Keys not modelled here, carried through unchanged
    #[serde(flatten)]
    pub extra: toml::Table,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct SparkPythonTask {
    pub python_file: String,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<String>,

    /// Keys not modelled here, carried through unchanged
    #[serde(flatten)]
    pub extra: toml::Table,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct SqlTask {
    pub warehouse_id: String,
    pub query_id: String,

    /// Keys not modelled here, carried through unchanged
    #[serde(flatten)]
    pub extra: toml::Table,
}

/// A library installed on the cluster before the task runs.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Library {
    /// Path to a Python wheel
    Whl(String),
    /// Path to a Java archive
    Jar(String),
    /// Path to a Python egg
    Egg(String),
    Pypi(PypiLibrary),
    Maven(MavenLibrary),
}

impl Library {
    pub fn is_wheel(&self) -> bool {
        matches!(self, Library::Whl(_))
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct PypiLibrary {
    pub package: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo: Option<String>,

    /// Keys not modelled here, carried through unchanged
    #[serde(flatten)]
    pub extra: toml::Table,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct MavenLibrary {
    pub coordinates: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo: Option<String>,

    /// Keys not modelled here, carried through unchanged
    #[serde(flatten)]
    pub extra: toml::Table,
}
