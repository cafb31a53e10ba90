//! Rule table: which loaders transform which files.
//!
//! The table always has one entry per [`RuleCategory`], in category order.
//! Only option values vary between builds; the set of patterns never does.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde_json::json;

use crate::models::*;

/// Namespace exposed to templates and admitted through the vendored-script exclusion.
pub const BUILTIN_NAMESPACE: &str = "@tidory";

/// Location of the built-in template namespace, relative to the project root.
const BUILTIN_NAMESPACE_DIR: &str = "node_modules/tidory/lib/@tidory";

const IMAGE_PATTERN: &str = r"\.(png|jpe?g|gif|svg)(\?.*)?$";
const MEDIA_PATTERN: &str = r"\.(mp4|webm|ogg|mp3|wav|flac|aac)(\?.*)?$";
const FONT_PATTERN: &str = r"\.(woff2?|eot|ttf|otf)(\?.*)?$";
const STYLE_PATTERN: &str = r"\.css$";
const TEMPLATE_PATTERN: &str = r"\.pug$";
const SCRIPT_PATTERN: &str = r"\.jsx?$";
const VUE_PATTERN: &str = r"\.vue$";
const SVELTE_PATTERN: &str = r"\.svelte$";
// svelte ships .mjs modules with extensionless imports
const SVELTE_MODULE_PATTERN: &str = r"node_modules/svelte/.*\.mjs$";

/// Inputs to the rule table.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    pub working_dir: &'a Path,
    pub environment: BuildEnvironment,
    /// Template aliases from the manifest.
    pub aliases: &'a BTreeMap<String, PathBuf>,
    pub public_path: &'a str,
    pub options: &'a PipelineOptions,
}

/// Builds the rule table for one synthesis.
///
/// Implementations must not keep state between calls; concurrent syntheses
/// share the same table builder.
pub trait RuleTable: Send + Sync {
    fn build_rules(&self, ctx: &RuleContext<'_>) -> Vec<RuleEntry>;
}

/// The standard tidory rule table.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardRules;

impl RuleTable for StandardRules {
    fn build_rules(&self, ctx: &RuleContext<'_>) -> Vec<RuleEntry> {
        build_rules(ctx)
    }
}

pub fn build_rules(ctx: &RuleContext<'_>) -> Vec<RuleEntry> {
    vec![
        asset_rule(RuleCategory::Images, IMAGE_PATTERN, ctx.public_path),
        asset_rule(RuleCategory::Media, MEDIA_PATTERN, ctx.public_path),
        asset_rule(RuleCategory::Fonts, FONT_PATTERN, ctx.public_path),
        style_rule(ctx.options),
        template_rule(ctx),
        script_rule(),
        vue_rule(),
        svelte_rule(ctx.environment),
        svelte_resolution_rule(),
    ]
}

fn asset_rule(category: RuleCategory, pattern: &'static str, public_path: &str) -> RuleEntry {
    RuleEntry::new(category, Pattern::fixed(pattern))
        .step(LoaderStep::new(ASSET_LOADER).with_options(json!({ "publicPath": public_path })))
}

fn style_rule(options: &PipelineOptions) -> RuleEntry {
    let style_loader = match options.style_es_module {
        Some(es_module) => {
            LoaderStep::new("style-loader").with_options(json!({ "esModule": es_module }))
        }
        None => LoaderStep::new("style-loader"),
    };

    RuleEntry::new(RuleCategory::Styles, Pattern::fixed(STYLE_PATTERN))
        .step(LoaderStep::new("vue-style-loader"))
        .step(style_loader)
        .step(LoaderStep::new("css-loader"))
        .step(LoaderStep::new("postcss-loader"))
}

fn template_rule(ctx: &RuleContext<'_>) -> RuleEntry {
    let mut options = serde_json::Map::new();
    if let Some(doctype) = &ctx.options.doctype {
        options.insert("doctype".into(), json!(doctype));
    }
    options.insert(
        "basedir".into(),
        json!(ctx.working_dir.to_string_lossy()),
    );
    options.insert(
        "plugins".into(),
        json!([{ "plugin": "pug-alias", "aliases": template_aliases(ctx) }]),
    );
    if !ctx.options.style_filters.is_empty() {
        options.insert("filters".into(), json!(ctx.options.style_filters));
    }

    RuleEntry::new(RuleCategory::Templates, Pattern::fixed(TEMPLATE_PATTERN))
        .step(LoaderStep::new("raw-loader"))
        .step(LoaderStep::new("pug-plain-loader").with_options(options.into()))
}

/// Manifest aliases plus the built-in namespace, which wins on conflict.
pub fn template_aliases(ctx: &RuleContext<'_>) -> BTreeMap<String, String> {
    let mut aliases: BTreeMap<String, String> = ctx
        .aliases
        .iter()
        .map(|(name, path)| (name.clone(), path.to_string_lossy().into_owned()))
        .collect();
    aliases.insert(
        BUILTIN_NAMESPACE.to_string(),
        ctx.working_dir
            .join(BUILTIN_NAMESPACE_DIR)
            .to_string_lossy()
            .into_owned(),
    );
    aliases
}

fn script_rule() -> RuleEntry {
    RuleEntry::new(RuleCategory::Scripts, Pattern::fixed(SCRIPT_PATTERN))
        .exclude(VendoredExclusion::new(BUILTIN_NAMESPACE))
        .step(
            LoaderStep::new("babel-loader")
                .with_options(json!({ "presets": ["@babel/preset-react"] })),
        )
        .step(LoaderStep::new("astroturf/loader"))
}

fn vue_rule() -> RuleEntry {
    RuleEntry::new(RuleCategory::VueComponents, Pattern::fixed(VUE_PATTERN)).step(
        LoaderStep::new("vue-loader").with_options(json!({ "loaders": { "js": "babel-loader" } })),
    )
}

fn svelte_rule(environment: BuildEnvironment) -> RuleEntry {
    let dev = match environment {
        BuildEnvironment::Development => true,
        BuildEnvironment::Production => false,
    };

    RuleEntry::new(RuleCategory::SvelteComponents, Pattern::fixed(SVELTE_PATTERN)).step(
        LoaderStep::new("svelte-loader").with_options(json!({
            "compilerOptions": { "dev": dev },
            "hotReload": dev
        })),
    )
}

fn svelte_resolution_rule() -> RuleEntry {
    RuleEntry::new(
        RuleCategory::SvelteResolution,
        Pattern::fixed(SVELTE_MODULE_PATTERN),
    )
    .resolve(RuleResolve {
        fully_specified: false,
    })
}
