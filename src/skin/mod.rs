//! Skin service access and public path resolution.
//!
//! Production builds that don't pin `build.public_path` serve assets from the
//! skin CDN. The CDN folder is derived from the skin name returned by the
//! service's handshake endpoint.

mod client;
mod resolver;

use std::future::Future;

pub use client::*;
pub use resolver::*;

use crate::models::SkinSession;

/// The handshake half of the skin service.
pub trait SkinService: Send + Sync {
    /// Open a session and return the current skin identifier.
    fn prepare(&self) -> impl Future<Output = Result<SkinSession, ClientError>> + Send;
}
