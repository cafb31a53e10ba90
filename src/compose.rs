//! Configuration synthesis.
//!
//! [`Composer::synthesize`] is the single entry point: it validates the
//! manifest, resolves the public path, assembles resolution settings, rules
//! and plugins, then hands the result to the manifest's extension hook.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::models::*;
use crate::plugins::{PluginAssembler, StandardPlugins};
use crate::rules::{RuleContext, RuleTable, StandardRules};
use crate::skin::{PublicPathResolver, RemotePathResolver, ResolveError};

/// Public path used by every development build.
pub const DEV_PUBLIC_PATH: &str = "/";

/// Name of the single bundle entry.
pub const ENTRY_NAME: &str = "app";

const EXTENSIONS: [&str; 3] = [".mjs", ".js", ".svelte"];
const MAIN_FIELDS: [&str; 4] = ["svelte", "browser", "module", "main"];

/// Errors that abort synthesis. No partial configuration is ever returned.
#[derive(Debug, Error)]
pub enum SynthesisError {
    #[error("Malformed manifest: {0}")]
    MalformedManifest(String),

    #[error(
        "Production build needs `build.public_path` or skin credentials (`url` and `ts_session`)"
    )]
    MissingCredentials,

    #[error("Public path resolution failed: {0}")]
    RemoteResolution(#[from] ResolveError),

    #[error(transparent)]
    ExtensionHook(anyhow::Error),
}

/// Builds bundler configurations for one project.
///
/// The composer only holds immutable inputs, so a single instance can serve
/// concurrent syntheses; each call returns its own [`Configuration`].
pub struct Composer<R = RemotePathResolver> {
    manifest: ProjectManifest,
    working_dir: PathBuf,
    options: PipelineOptions,
    resolver: R,
    rules: Box<dyn RuleTable>,
    plugins: Box<dyn PluginAssembler>,
}

impl Composer<RemotePathResolver> {
    /// Relative working directories are made absolute against the current directory.
    pub fn new(manifest: ProjectManifest, working_dir: impl Into<PathBuf>) -> Self {
        Self {
            manifest,
            working_dir: absolute_dir(working_dir.into()),
            options: PipelineOptions::default(),
            resolver: RemotePathResolver::default(),
            rules: Box::new(StandardRules),
            plugins: Box::new(StandardPlugins),
        }
    }
}

impl<R: PublicPathResolver> Composer<R> {
    /// Swap the public path resolver.
    pub fn with_resolver<T: PublicPathResolver>(self, resolver: T) -> Composer<T> {
        Composer {
            manifest: self.manifest,
            working_dir: self.working_dir,
            options: self.options,
            resolver,
            rules: self.rules,
            plugins: self.plugins,
        }
    }

    pub fn with_options(mut self, options: PipelineOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_rule_table(mut self, rules: impl RuleTable + 'static) -> Self {
        self.rules = Box::new(rules);
        self
    }

    pub fn with_plugin_assembler(mut self, plugins: impl PluginAssembler + 'static) -> Self {
        self.plugins = Box::new(plugins);
        self
    }

    pub fn manifest(&self) -> &ProjectManifest {
        &self.manifest
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Synthesize the configuration for `environment`.
    pub async fn synthesize(
        &self,
        environment: BuildEnvironment,
    ) -> Result<Configuration, SynthesisError> {
        let entry = self.entry()?;
        tracing::info!(%environment, "Synthesizing bundler configuration");

        let public_path = self.public_path(environment).await?;

        let ctx = RuleContext {
            working_dir: &self.working_dir,
            environment,
            aliases: &self.manifest.alias,
            public_path: &public_path,
            options: &self.options,
        };
        let rules = self.rules.build_rules(&ctx);
        let plugins = self
            .plugins
            .build_plugins(environment, &self.manifest, &self.options);
        tracing::debug!(
            rules = rules.len(),
            plugins = plugins.len(),
            "Assembled rules and plugins"
        );

        let mut config = Configuration {
            entry: BTreeMap::from([(ENTRY_NAME.to_string(), entry)]),
            resolve: self.resolve(),
            stats: self.options.stats,
            module: ModuleOptions { rules },
            plugins,
        };

        if let Some(hook) = &self.manifest.extension_hook {
            tracing::debug!("Applying manifest extension hook");
            hook.apply(&mut config)
                .map_err(SynthesisError::ExtensionHook)?;
        }

        Ok(config)
    }

    /// Public path for `environment`.
    ///
    /// Only production builds without an explicit `build.public_path` reach
    /// the skin service.
    pub async fn public_path(
        &self,
        environment: BuildEnvironment,
    ) -> Result<String, SynthesisError> {
        match environment {
            BuildEnvironment::Development => Ok(DEV_PUBLIC_PATH.to_string()),
            BuildEnvironment::Production => {
                if let Some(public_path) = self.manifest.public_path() {
                    tracing::debug!(%public_path, "Using configured public path");
                    return Ok(public_path.to_string());
                }
                let credentials = self
                    .manifest
                    .credentials()
                    .ok_or(SynthesisError::MissingCredentials)?;
                tracing::info!(url = %credentials.site_url, "Resolving public path from skin service");
                Ok(self.resolver.resolve(&credentials).await?)
            }
        }
    }

    fn entry(&self) -> Result<PathBuf, SynthesisError> {
        let entry = self.manifest.entry().ok_or_else(|| {
            SynthesisError::MalformedManifest("`path.entry` is required".to_string())
        })?;
        Ok(self.working_dir.join(entry))
    }

    fn resolve(&self) -> Resolve {
        let node_modules = self.working_dir.join("node_modules");
        Resolve {
            alias: BTreeMap::from([
                ("svelte".to_string(), node_modules.join("svelte")),
                (
                    "vue".to_string(),
                    node_modules.join("vue/dist/vue.esm-bundler.js"),
                ),
            ]),
            extensions: EXTENSIONS.iter().map(|ext| ext.to_string()).collect(),
            main_fields: MAIN_FIELDS.iter().map(|field| field.to_string()).collect(),
        }
    }
}

fn absolute_dir(dir: PathBuf) -> PathBuf {
    match std::path::absolute(&dir) {
        Ok(absolute) => absolute,
        Err(err) => {
            tracing::warn!(dir = %dir.display(), %err, "Keeping working directory as given");
            dir
        }
    }
}
