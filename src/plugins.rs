//! Plugin assembly.

use std::collections::BTreeMap;

use serde_json::json;

use crate::models::*;

pub const PROGRESS_NAME: &str = "tidory";
pub const PROGRESS_COLOR: &str = "green";

/// Builds the plugin list for one synthesis.
pub trait PluginAssembler: Send + Sync {
    fn build_plugins(
        &self,
        environment: BuildEnvironment,
        manifest: &ProjectManifest,
        options: &PipelineOptions,
    ) -> Vec<Plugin>;
}

/// The standard tidory plugin set.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardPlugins;

impl PluginAssembler for StandardPlugins {
    fn build_plugins(
        &self,
        environment: BuildEnvironment,
        manifest: &ProjectManifest,
        options: &PipelineOptions,
    ) -> Vec<Plugin> {
        build_plugins(environment, manifest, options)
    }
}

/// Progress, dotenv, vue-loader, feature flags, then the project plugin.
pub fn build_plugins(
    environment: BuildEnvironment,
    manifest: &ProjectManifest,
    options: &PipelineOptions,
) -> Vec<Plugin> {
    let manifest = options
        .plugin_receives_manifest
        .then(|| Box::new(manifest.clone()));

    vec![
        Plugin::Progress {
            name: PROGRESS_NAME.to_string(),
            color: PROGRESS_COLOR.to_string(),
            reporters: vec!["fancy".to_string()],
        },
        Plugin::Dotenv,
        Plugin::VueLoader,
        Plugin::Define {
            definitions: vue_feature_flags(),
        },
        Plugin::Tidory {
            environment,
            manifest,
        },
    ]
}

/// Vue feature flags. Same in every environment.
fn vue_feature_flags() -> BTreeMap<String, serde_json::Value> {
    BTreeMap::from([
        ("__VUE_OPTIONS_API__".to_string(), json!(true)),
        ("__VUE_PROD_DEVTOOLS__".to_string(), json!(false)),
    ])
}
