use std::future::Future;

use reqwest::Client;
use thiserror::Error;

use super::{ClientError, SkinClient, SkinService};
use crate::models::{RemoteCredentials, SkinSession};

/// Host serving deployed skin assets.
pub const CDN_HOST: &str = "tistory1.daumcdn.net";

/// Public path resolution errors.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("skin service request failed: {0}")]
    Client(#[from] ClientError),

    #[error("malformed skin name {0:?}: expected `<owner>/<skin>`")]
    MalformedSkinName(String),
}

/// Resolve the production public path through the skin service.
///
/// The handshake runs twice and only the second session is used.
pub async fn resolve_public_path<S: SkinService>(service: &S) -> Result<String, ResolveError> {
    warmup(service).await?;
    let session = finalize(service).await?;
    let segment = skin_segment(&session.skin_name)?;
    let public_path = skin_image_url(segment);
    tracing::info!(skin = %session.skin_name, %public_path, "Resolved skin public path");
    Ok(public_path)
}

/// First handshake. The session it returns is discarded.
async fn warmup<S: SkinService>(service: &S) -> Result<(), ResolveError> {
    let session = service.prepare().await?;
    tracing::debug!(skin = %session.skin_name, "Discarding warmup session");
    Ok(())
}

/// Second handshake, whose skin name is authoritative.
async fn finalize<S: SkinService>(service: &S) -> Result<SkinSession, ResolveError> {
    Ok(service.prepare().await?)
}

/// The segment after the first `/` of a skin name.
pub fn skin_segment(skin_name: &str) -> Result<&str, ResolveError> {
    match skin_name.split('/').nth(1) {
        Some(segment) if !segment.is_empty() => Ok(segment),
        _ => Err(ResolveError::MalformedSkinName(skin_name.to_string())),
    }
}

/// CDN folder holding a skin's images.
pub fn skin_image_url(segment: &str) -> String {
    format!("https://{}/tistory/{}/skin/images", CDN_HOST, segment)
}

/// Source of the production public path, used by the composer.
pub trait PublicPathResolver: Send + Sync {
    fn resolve(
        &self,
        credentials: &RemoteCredentials,
    ) -> impl Future<Output = Result<String, ResolveError>> + Send;
}

/// Resolves through the live skin service over HTTP.
#[derive(Debug, Clone, Default)]
pub struct RemotePathResolver {
    client: Client,
}

impl RemotePathResolver {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

impl PublicPathResolver for RemotePathResolver {
    async fn resolve(&self, credentials: &RemoteCredentials) -> Result<String, ResolveError> {
        let service = SkinClient::with_client(self.client.clone(), credentials);
        resolve_public_path(&service).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn takes_segment_after_first_slash() {
        assert_eq!(skin_segment("abc/myskin-123").unwrap(), "myskin-123");
        assert_eq!(skin_segment("abc/myskin/extra").unwrap(), "myskin");
    }

    #[test]
    fn rejects_names_without_segment() {
        assert!(matches!(
            skin_segment("noslash"),
            Err(ResolveError::MalformedSkinName(name)) if name == "noslash"
        ));
        assert!(skin_segment("abc/").is_err());
        assert!(skin_segment("").is_err());
    }

    #[test]
    fn builds_cdn_url() {
        assert_eq!(
            skin_image_url("myskin-123"),
            "https://tistory1.daumcdn.net/tistory/myskin-123/skin/images"
        );
    }
}
