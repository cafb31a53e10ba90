use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::Serialize;

use super::pipeline::StatsPreset;
use super::plugin::Plugin;
use super::rule::{RuleCategory, RuleEntry};

/// Loader that emits binary assets; carries the resolved public path.
pub const ASSET_LOADER: &str = "file-loader";

/// The synthesized bundler configuration.
///
/// Each synthesis produces a fresh value owned by the caller. It is only
/// mutated during synthesis and by the manifest's extension hook.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Configuration {
    pub entry: BTreeMap<String, PathBuf>,
    pub resolve: Resolve,
    pub stats: StatsPreset,
    pub module: ModuleOptions,
    pub plugins: Vec<Plugin>,
}

/// Module resolution settings.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Resolve {
    pub alias: BTreeMap<String, PathBuf>,
    pub extensions: Vec<String>,
    pub main_fields: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ModuleOptions {
    pub rules: Vec<RuleEntry>,
}

impl Configuration {
    pub fn rules(&self) -> &[RuleEntry] {
        &self.module.rules
    }

    pub fn rule(&self, category: RuleCategory) -> Option<&RuleEntry> {
        self.module.rules.iter().find(|rule| rule.category == category)
    }

    /// The rule that wins for `path`. Later entries take precedence.
    pub fn rule_for(&self, path: &str) -> Option<&RuleEntry> {
        self.module.rules.iter().rev().find(|rule| rule.matches(path))
    }

    /// Public path threaded into the asset emitter.
    pub fn public_path(&self) -> Option<&str> {
        self.rule(RuleCategory::Images)?
            .chain
            .iter()
            .find(|step| step.loader == ASSET_LOADER)?
            .option("publicPath")?
            .as_str()
    }

    pub fn plugin_names(&self) -> Vec<&str> {
        self.plugins.iter().map(Plugin::name).collect()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
