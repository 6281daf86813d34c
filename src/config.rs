//! Bundle configuration
//!
//! The serde model of `bundle.toml`, the file at the root of every bundle. It is
//! loaded once per run, then rewritten in place by mutators before being handed
//! on.

mod resources;

use std::path::Path;

use config::ConfigError;
use serde::{Deserialize, Serialize};

pub use resources::{
    Job, Library, MavenLibrary, NotebookTask, PypiLibrary, PythonWheelTask, Resources,
    SparkJarTask, SparkPythonTask, SqlTask, Task, TaskKind,
};

/// File name of the bundle configuration, relative to the bundle root
pub const CONFIG_FILE_NAME: &str = "bundle.toml";

/// Root of the bundle configuration tree.
///
/// ```toml
/// [bundle]
/// name = "my-bundle"
/// target = "development"
///
/// [experimental]
/// python-wheel-wrapper = true
///
/// [[resources.jobs.job1.tasks]]
/// task-key = "key1"
/// python-wheel-task = { package-name = "my_package", entry-point = "main" }
/// ```
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct BundleConfig {
    #[serde(default)]
    pub bundle: BundleSection,

    #[serde(default, skip_serializing_if = "WorkspaceSection::is_empty")]
    pub workspace: WorkspaceSection,

    #[serde(default)]
    pub resources: Resources,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub experimental: Option<Experimental>,

    /// Top-level sections not modelled here (variables, targets, ...), carried through unchanged
    #[serde(flatten)]
    pub extra: toml::Table,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct BundleSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Deployment target (e.g. "development"); selects the cache directory
    #[serde(default)]
    pub target: String,

    #[serde(flatten)]
    pub extra: toml::Table,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct WorkspaceSection {
    /// Remote directory that bundle files are synced into
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files_path: Option<String>,

    #[serde(flatten)]
    pub extra: toml::Table,
}

impl WorkspaceSection {
    fn is_empty(&self) -> bool {
        self.files_path.is_none() && self.extra.is_empty()
    }
}

/// Opt-in behavior that is not stable yet.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct Experimental {
    /// Run Python wheel tasks through a generated notebook instead of directly
    #[serde(default)]
    pub python_wheel_wrapper: bool,

    #[serde(flatten)]
    pub extra: toml::Table,
}

impl BundleConfig {
    /// Load bundle configuration from `bundle.toml` in the bundle root
    pub fn load(bundle_root: &Path) -> Result<Option<Self>, ConfigError> {
        let config_path = bundle_root.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(&config_path)
            .map_err(|e| ConfigError::Message(format!("Failed to read config file: {}", e)))?;

        Self::parse(&contents).map(Some)
    }

    pub fn parse(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents)
            .map_err(|e| ConfigError::Message(format!("Failed to parse TOML: {}", e)))
    }

    /// Whether Python wheel tasks should be wrapped in a notebook trampoline.
    ///
    /// An absent `[experimental]` section means no.
    pub fn python_wheel_wrapper(&self) -> bool {
        self.experimental
            .as_ref()
            .is_some_and(|experimental| experimental.python_wheel_wrapper)
    }

    pub fn set_python_wheel_wrapper(&mut self, enabled: bool) {
        self.experimental
            .get_or_insert_with(Experimental::default)
            .python_wheel_wrapper = enabled;
    }
}
