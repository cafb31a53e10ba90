use std::collections::BTreeMap;

use serde::Serialize;

use super::environment::BuildEnvironment;
use super::manifest::ProjectManifest;

/// A bundler plugin instance.
///
/// Plugins are inert values here; they only take effect once the bundler
/// runs, in registration order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "plugin", rename_all = "kebab-case")]
pub enum Plugin {
    /// Progress bar shown while bundling.
    Progress {
        name: String,
        color: String,
        reporters: Vec<String>,
    },
    /// Injects `.env` values. Reads the process environment itself.
    Dotenv,
    /// Required by `vue-loader`.
    VueLoader,
    /// Compile-time constants.
    Define {
        definitions: BTreeMap<String, serde_json::Value>,
    },
    /// Project plugin that packages the skin output.
    Tidory {
        environment: BuildEnvironment,
        #[serde(skip_serializing_if = "Option::is_none")]
        manifest: Option<Box<ProjectManifest>>,
    },
    /// Anything added by an extension hook.
    Custom {
        name: String,
        options: serde_json::Value,
    },
}

impl Plugin {
    pub fn name(&self) -> &str {
        match self {
            Self::Progress { .. } => "progress",
            Self::Dotenv => "dotenv",
            Self::VueLoader => "vue-loader",
            Self::Define { .. } => "define",
            Self::Tidory { .. } => "tidory",
            Self::Custom { name, .. } => name,
        }
    }
}
