//! Bundler configuration synthesis for Tistory skin projects.
//!
//! A project's `tidory.config.json` ([`models::ProjectManifest`]) is turned into
//! a complete bundler [`models::Configuration`] by [`Composer::synthesize`]:
//!
//! 1. the public asset path is resolved (`/` in development, the manifest's
//!    `build.public_path` or the skin CDN folder in production),
//! 2. the [`rules`] table and [`plugins`] list are assembled,
//! 3. the manifest's extension hook, if any, gets the last word.

pub mod compose;
pub mod loader;
pub mod models;
pub mod plugins;
pub mod rules;
pub mod skin;

pub use compose::{Composer, SynthesisError};
