use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::configuration::Configuration;

/// File name searched for by [`crate::loader::find_manifest`].
pub const MANIFEST_FILE: &str = "tidory.config.json";

/// Fallback for `url` when the manifest leaves it out.
pub const URL_VAR: &str = "TISTORY_URL";

/// Fallback for `ts_session` when the manifest leaves it out.
pub const SESSION_VAR: &str = "TS_SESSION";

/// A project's `tidory.config.json`.
///
/// The manifest is parsed once per invocation and treated as immutable. Only
/// `path.entry` is required, and that check is left to the composer so that
/// a partially written manifest still loads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectManifest {
    /// Blog URL, e.g. `https://example.tistory.com`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Value of the `TSSESSION` cookie. Never written back out.
    #[serde(default, skip_serializing)]
    pub ts_session: Option<String>,
    #[serde(default)]
    pub path: PathOptions,
    /// Template aliases, e.g. `"@components": "src/components"`.
    #[serde(default)]
    pub alias: BTreeMap<String, PathBuf>,
    #[serde(default)]
    pub build: BuildOptions,
    #[serde(skip)]
    pub extension_hook: Option<ExtensionHook>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildOptions {
    /// Explicit public path for production builds. Skips the skin lookup.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_path: Option<String>,
}

/// Site URL and session token needed to talk to the skin service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteCredentials {
    pub site_url: String,
    pub session_token: String,
}

impl ProjectManifest {
    /// Entry file path, if present and non-empty.
    pub fn entry(&self) -> Option<&Path> {
        self.path
            .entry
            .as_deref()
            .filter(|entry| !entry.as_os_str().is_empty())
    }

    /// Explicit public path, if present and non-empty.
    pub fn public_path(&self) -> Option<&str> {
        self.build
            .public_path
            .as_deref()
            .filter(|path| !path.is_empty())
    }

    /// Skin service credentials. Both `url` and `ts_session` must be set.
    pub fn credentials(&self) -> Option<RemoteCredentials> {
        match (self.url.as_deref(), self.ts_session.as_deref()) {
            (Some(url), Some(session)) if !url.is_empty() && !session.is_empty() => {
                Some(RemoteCredentials {
                    site_url: url.to_string(),
                    session_token: session.to_string(),
                })
            }
            _ => None,
        }
    }

    /// Fill `url` and `ts_session` from `lookup` where the manifest has none.
    ///
    /// Values already in the manifest are kept.
    pub fn fill_from_env<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        fill_missing(&mut self.url, || lookup(URL_VAR));
        fill_missing(&mut self.ts_session, || lookup(SESSION_VAR));

        if self.credentials().is_none() && (is_set(&self.url) || is_set(&self.ts_session)) {
            tracing::warn!(
                "Skin credentials are incomplete; set both `url` ({}) and `ts_session` ({})",
                URL_VAR,
                SESSION_VAR
            );
        }
        self
    }

    /// Attach a hook that may mutate the finished configuration.
    pub fn with_extension_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut Configuration) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.extension_hook = Some(ExtensionHook::new(hook));
        self
    }
}

fn is_set(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|value| !value.is_empty())
}

fn fill_missing(slot: &mut Option<String>, fallback: impl FnOnce() -> Option<String>) {
    if !is_set(slot) {
        if let Some(value) = fallback().filter(|value| !value.is_empty()) {
            *slot = Some(value);
        }
    }
}

type HookFn = dyn Fn(&mut Configuration) -> anyhow::Result<()> + Send + Sync;

/// Caller-supplied mutation step run after the configuration is assembled.
///
/// The hook gets exclusive access to the configuration for the duration of
/// the call. Errors it returns abort synthesis unchanged.
#[derive(Clone)]
pub struct ExtensionHook(Arc<HookFn>);

impl ExtensionHook {
    pub fn new<F>(hook: F) -> Self
    where
        F: Fn(&mut Configuration) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        Self(Arc::new(hook))
    }

    pub fn apply(&self, config: &mut Configuration) -> anyhow::Result<()> {
        (self.0)(config)
    }
}

impl std::fmt::Debug for ExtensionHook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("ExtensionHook(..)")
    }
}

impl PartialEq for ExtensionHook {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}
