use regex::Regex;
use serde::{Serialize, Serializer};

/// The fixed set of rule categories, in table order.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum RuleCategory {
    Images,
    Media,
    Fonts,
    Styles,
    Templates,
    Scripts,
    VueComponents,
    SvelteComponents,
    SvelteResolution,
}

impl RuleCategory {
    pub const ALL: [Self; 9] = [
        Self::Images,
        Self::Media,
        Self::Fonts,
        Self::Styles,
        Self::Templates,
        Self::Scripts,
        Self::VueComponents,
        Self::SvelteComponents,
        Self::SvelteResolution,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Images => "images",
            Self::Media => "media",
            Self::Fonts => "fonts",
            Self::Styles => "styles",
            Self::Templates => "templates",
            Self::Scripts => "scripts",
            Self::VueComponents => "vue_components",
            Self::SvelteComponents => "svelte_components",
            Self::SvelteResolution => "svelte_resolution",
        }
    }
}

/// A compiled rule test. Serializes as its source so the bundler can rebuild it.
#[derive(Debug, Clone)]
pub struct Pattern(Regex);

impl Pattern {
    pub fn new(source: &str) -> Result<Self, regex::Error> {
        Regex::new(source).map(Self)
    }

    /// Compile one of the built-in rule patterns.
    pub(crate) fn fixed(source: &'static str) -> Self {
        Self::new(source).expect("built-in rule pattern is valid")
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn is_match(&self, path: &str) -> bool {
        self.0.is_match(path)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Serialize for Pattern {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

const VENDOR_DIR: &str = "node_modules";

/// Excludes vendored paths, except those continuing into an allow-listed namespace.
///
/// `node_modules/@tidory/ui/index.js` is admitted, `node_modules/react/index.js`
/// is excluded, and so is any path where a later `node_modules` segment leaves
/// the namespace again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VendoredExclusion {
    pub allow: String,
}

impl VendoredExclusion {
    pub fn new(allow: impl Into<String>) -> Self {
        Self {
            allow: allow.into(),
        }
    }

    /// True if `path` should be skipped by the rule.
    pub fn excludes(&self, path: &str) -> bool {
        path.match_indices(VENDOR_DIR).any(|(index, matched)| {
            let rest = &path[index + matched.len()..];
            let mut chars = rest.chars();
            match chars.next() {
                Some('/') | Some('\\') => !chars.as_str().starts_with(self.allow.as_str()),
                _ => true,
            }
        })
    }

    /// Regex source equivalent for bundlers with lookahead support.
    pub fn source(&self) -> String {
        format!(r"{VENDOR_DIR}(?!(\/|\\){})", regex::escape(&self.allow))
    }
}

impl Serialize for VendoredExclusion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.source())
    }
}

/// One transformation step in a rule's chain.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoaderStep {
    pub loader: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<serde_json::Value>,
}

impl LoaderStep {
    pub fn new(loader: impl Into<String>) -> Self {
        Self {
            loader: loader.into(),
            options: None,
        }
    }

    pub fn with_options(mut self, options: serde_json::Value) -> Self {
        self.options = Some(options);
        self
    }

    /// Look up a top-level option by key.
    pub fn option(&self, key: &str) -> Option<&serde_json::Value> {
        self.options.as_ref().and_then(|options| options.get(key))
    }
}

/// Per-rule module resolution override.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleResolve {
    pub fully_specified: bool,
}

/// A file-type pattern mapped to an ordered transformation chain.
///
/// Chain order is significant: each loader consumes the previous one's output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleEntry {
    #[serde(skip)]
    pub category: RuleCategory,
    pub test: Pattern,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclude: Option<VendoredExclusion>,
    #[serde(rename = "use", skip_serializing_if = "Vec::is_empty")]
    pub chain: Vec<LoaderStep>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolve: Option<RuleResolve>,
}

impl RuleEntry {
    pub fn new(category: RuleCategory, test: Pattern) -> Self {
        Self {
            category,
            test,
            exclude: None,
            chain: Vec::new(),
            resolve: None,
        }
    }

    pub fn step(mut self, step: LoaderStep) -> Self {
        self.chain.push(step);
        self
    }

    pub fn exclude(mut self, exclusion: VendoredExclusion) -> Self {
        self.exclude = Some(exclusion);
        self
    }

    pub fn resolve(mut self, resolve: RuleResolve) -> Self {
        self.resolve = Some(resolve);
        self
    }

    /// Whether this rule applies to `path`.
    pub fn matches(&self, path: &str) -> bool {
        self.test.is_match(path)
            && !self
                .exclude
                .as_ref()
                .is_some_and(|exclusion| exclusion.excludes(path))
    }

    /// Loader names in chain order.
    pub fn loaders(&self) -> Vec<&str> {
        self.chain.iter().map(|step| step.loader.as_str()).collect()
    }
}
