use serde::{Deserialize, Serialize};

/// Bundler stats verbosity.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum StatsPreset {
    #[default]
    Normal,
    ErrorsOnly,
}

/// Defaults that differ between the two pipeline presets.
///
/// `classic()` matches projects scaffolded with the standalone config layout,
/// `package()` matches projects consuming the published `tidory` package.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOptions {
    pub stats: StatsPreset,
    /// Default doctype for compiled templates.
    pub doctype: Option<String>,
    /// Named filters available to embedded template styles, e.g. `postcss`.
    pub style_filters: Vec<String>,
    /// `esModule` option passed to `style-loader`. `None` leaves it unset.
    pub style_es_module: Option<bool>,
    /// Whether the project plugin receives the manifest alongside the environment.
    pub plugin_receives_manifest: bool,
}

impl PipelineOptions {
    pub fn classic() -> Self {
        Self {
            stats: StatsPreset::Normal,
            doctype: None,
            style_filters: Vec::new(),
            style_es_module: None,
            plugin_receives_manifest: false,
        }
    }

    pub fn package() -> Self {
        Self {
            stats: StatsPreset::ErrorsOnly,
            doctype: Some("html".to_string()),
            style_filters: vec!["postcss".to_string()],
            style_es_module: Some(false),
            plugin_receives_manifest: true,
        }
    }
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self::package()
    }
}
