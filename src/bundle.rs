//! A loaded bundle and the directories the tool manages inside it.

use std::path::{Path, PathBuf};

use anyhow::Context;
use thiserror::Error;

use crate::config::{BundleConfig, CONFIG_FILE_NAME};
use crate::path::relative_slash_path;

/// Environment variable that relocates the cache directory (read by the CLI)
pub const CACHE_ROOT_ENV: &str = "BUNDLE_TMP";

/// Directory under the bundle root holding per-target caches
const CACHE_FOLDER: &str = ".bundle";

/// Cache subdirectory for artifacts the tool generates on the user's behalf
const INTERNAL_FOLDER: &str = ".internal";

/// Failure to resolve one of the bundle's working directories
#[derive(Debug, Error)]
pub enum BundleError {
    #[error("bundle target is not set; cannot resolve the cache directory")]
    TargetNotSet,

    #[error("failed to create directory {}", .path.display())]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} cannot be expressed relative to bundle root {}", .dir.display(), .root.display())]
    NotRelative { root: PathBuf, dir: PathBuf },
}

/// Bundle configuration together with the directory it was loaded from.
#[derive(Debug, Clone)]
pub struct Bundle {
    pub config: BundleConfig,
    root: PathBuf,
    cache_root: Option<PathBuf>,
}

impl Bundle {
    pub fn new(config: BundleConfig, root: impl Into<PathBuf>) -> Self {
        Self {
            config,
            root: root.into(),
            cache_root: None,
        }
    }

    /// Load the bundle rooted at `root` from its `bundle.toml`.
    pub fn load(root: &Path) -> anyhow::Result<Self> {
        let root = dunce::canonicalize(root)
            .with_context(|| format!("Bundle root {} is not accessible", root.display()))?;

        let config = BundleConfig::load(&root)
            .with_context(|| format!("Failed to load {}", root.join(CONFIG_FILE_NAME).display()))?
            .with_context(|| format!("No {CONFIG_FILE_NAME} found in {}", root.display()))?;

        log::debug!("Loaded bundle from {}", root.display());
        Ok(Self::new(config, root))
    }

    /// Place caches under `cache_root` instead of `<root>/.bundle/<target>`.
    pub fn with_cache_root(mut self, cache_root: impl Into<PathBuf>) -> Self {
        self.cache_root = Some(cache_root.into());
        self
    }

    /// Bundle root directory; configuration paths are relative to it.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve (and create) a directory inside the target's cache.
    ///
    /// The cache lives at `<root>/.bundle/<target>` unless relocated with
    /// [`Bundle::with_cache_root`].
    pub fn cache_dir(&self, segments: &[&str]) -> Result<PathBuf, BundleError> {
        let target = &self.config.bundle.target;
        if target.is_empty() {
            return Err(BundleError::TargetNotSet);
        }

        let mut dir = match &self.cache_root {
            Some(cache_root) => cache_root.clone(),
            None => self.root.join(CACHE_FOLDER).join(target),
        };
        dir.extend(segments);

        std::fs::create_dir_all(&dir).map_err(|source| BundleError::CreateDir {
            path: dir.clone(),
            source,
        })?;
        Ok(dir)
    }

    /// Directory for generated artifacts that the user did not author.
    pub fn internal_dir(&self) -> Result<PathBuf, BundleError> {
        self.cache_dir(&[INTERNAL_FOLDER])
    }

    /// [`Bundle::internal_dir`] relative to the bundle root, with `/` separators.
    pub fn internal_dir_relative(&self) -> Result<String, BundleError> {
        let dir = self.internal_dir()?;
        relative_slash_path(&self.root, &dir).ok_or_else(|| BundleError::NotRelative {
            root: self.root.clone(),
            dir,
        })
    }
}
