//! Domain models for tidory configuration synthesis.
//!
//! # Inputs
//!
//! - [`ProjectManifest`]: The parsed `tidory.config.json`, loaded once per invocation.
//! - [`BuildEnvironment`]: Development or production, chosen by the caller.
//! - [`PipelineOptions`]: The small set of defaults that differ between pipeline presets.
//!
//! # Outputs
//!
//! - [`Configuration`]: The bundler configuration handed to the external bundler.
//!   Built from an ordered list of [`RuleEntry`] values and [`Plugin`] instances.
//!
//! # Remote
//!
//! - [`SkinSession`]: Ephemeral handshake result from the skin service. Never cached.

mod configuration;
mod environment;
mod manifest;
mod pipeline;
mod plugin;
mod rule;
mod skin;

pub use configuration::*;
pub use environment::*;
pub use manifest::*;
pub use pipeline::*;
pub use plugin::*;
pub use rule::*;
pub use skin::*;
