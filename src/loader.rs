//! Manifest discovery and loading.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use crate::models::{ProjectManifest, MANIFEST_FILE};

/// Walk upward from `start` to find `tidory.config.json`.
pub fn find_manifest(start: &Path) -> Result<PathBuf> {
    let mut dir = start
        .canonicalize()
        .with_context(|| format!("Failed to canonicalize {}", start.display()))?;
    loop {
        let candidate = dir.join(MANIFEST_FILE);
        if candidate.is_file() {
            return Ok(candidate);
        }
        if !dir.pop() {
            bail!(
                "{} not found (searched upward from {})",
                MANIFEST_FILE,
                start.display()
            );
        }
    }
}

pub fn load_manifest(path: &Path) -> Result<ProjectManifest> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let manifest = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    Ok(manifest)
}

/// Project root for a manifest: the directory containing it.
pub fn project_root(manifest_path: &Path) -> Result<PathBuf> {
    manifest_path
        .parent()
        .map(Path::to_path_buf)
        .ok_or_else(|| anyhow::anyhow!("Manifest path has no parent directory"))
}

/// Dotenv file read from the project root.
pub const ENV_FILE: &str = ".env";

/// Variables from the project's `.env`, layered under the process environment.
///
/// The file is only read; the process environment is left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectEnv {
    file: BTreeMap<String, String>,
}

impl ProjectEnv {
    /// Read `<root>/.env`. A missing file yields an empty set.
    pub fn read(root: &Path) -> Result<Self> {
        let path = root.join(ENV_FILE);
        let entries = match dotenvy::from_path_iter(&path) {
            Ok(entries) => entries,
            Err(err) if err.not_found() => {
                tracing::debug!(path = %path.display(), "No .env file");
                return Ok(Self::default());
            }
            Err(err) => {
                return Err(err).with_context(|| format!("Failed to read {}", path.display()))
            }
        };

        let file = entries
            .collect::<Result<BTreeMap<_, _>, _>>()
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        tracing::debug!(path = %path.display(), vars = file.len(), "Loaded .env file");
        Ok(Self { file })
    }

    /// Value from `.env` only.
    pub fn file_var(&self, key: &str) -> Option<&str> {
        self.file.get(key).map(String::as_str)
    }

    /// Process environment first, then `.env`.
    pub fn var(&self, key: &str) -> Option<String> {
        std::env::var(key)
            .ok()
            .or_else(|| self.file_var(key).map(str::to_string))
    }
}

/// Load the manifest and fill missing credentials from the environment.
pub fn load_project(manifest_path: &Path) -> Result<(ProjectManifest, PathBuf)> {
    let root = project_root(manifest_path)?;
    let env = ProjectEnv::read(&root)?;
    let manifest = load_manifest(manifest_path)?.fill_from_env(|key| env.var(key));
    Ok((manifest, root))
}
