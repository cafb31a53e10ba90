//! Skin service integration tests.
//!
//! The HTTP client is exercised against an in-process axum server bound to an
//! ephemeral port.

use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::http::{header, HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use tidory::models::*;
use tidory::skin::*;
use tidory::{Composer, SynthesisError};

const VALID_TOKEN: &str = "valid-token";
const SKIN_URL: &str = "https://tistory1.daumcdn.net/tistory/myskin-123/skin/images";

/// Start a fake skin service answering the handshake with `skin_name`.
///
/// Returns the base URL and a counter of handshake requests.
async fn spawn_skin_service(skin_name: &'static str) -> (String, Arc<AtomicUsize>) {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();

    let app = Router::new().route(
        PREPARE_PATH,
        get(move |headers: HeaderMap| {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                let cookie = headers
                    .get(header::COOKIE)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or_default();
                if cookie != format!("{}={}", SESSION_COOKIE, VALID_TOKEN) {
                    return (StatusCode::UNAUTHORIZED, "login required").into_response();
                }
                Json(serde_json::json!({ "skinname": skin_name })).into_response()
            }
        }),
    );

    (serve(app).await, hits)
}

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("Failed to read local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Test server failed");
    });
    format!("http://{}", addr)
}

fn credentials(site_url: &str, token: &str) -> RemoteCredentials {
    RemoteCredentials {
        site_url: site_url.to_string(),
        session_token: token.to_string(),
    }
}

/// Scripted service; a `None` entry fails that handshake.
struct ScriptedSkinService {
    responses: Vec<Option<&'static str>>,
    calls: AtomicUsize,
}

impl ScriptedSkinService {
    fn new(responses: Vec<Option<&'static str>>) -> Self {
        Self {
            responses,
            calls: AtomicUsize::new(0),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl SkinService for ScriptedSkinService {
    async fn prepare(&self) -> Result<SkinSession, ClientError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        match self.responses.get(call).copied().flatten() {
            Some(name) => Ok(SkinSession {
                skin_name: name.to_string(),
            }),
            None => Err(ClientError::Server("503: unavailable".to_string())),
        }
    }
}

// ============================================================
// Handshake Sequencing
// ============================================================

mod handshake {
    use super::*;

    #[tokio::test]
    async fn uses_second_session_only() {
        let service = ScriptedSkinService::new(vec![Some("abc/first-skin"), Some("abc/myskin-123")]);

        let public_path = resolve_public_path(&service)
            .await
            .expect("Resolution failed");

        assert_eq!(public_path, SKIN_URL);
        assert_eq!(service.calls(), 2);
    }

    #[tokio::test]
    async fn warmup_failure_aborts_without_retry() {
        let service = ScriptedSkinService::new(vec![None, Some("abc/myskin-123")]);

        let result = resolve_public_path(&service).await;

        assert!(matches!(
            result,
            Err(ResolveError::Client(ClientError::Server(_)))
        ));
        assert_eq!(service.calls(), 1);
    }

    #[tokio::test]
    async fn finalize_failure_propagates() {
        let service = ScriptedSkinService::new(vec![Some("abc/first-skin"), None]);

        let result = resolve_public_path(&service).await;

        assert!(matches!(result, Err(ResolveError::Client(_))));
        assert_eq!(service.calls(), 2);
    }

    #[tokio::test]
    async fn malformed_skin_name_is_rejected() {
        let service = ScriptedSkinService::new(vec![Some("noslash"), Some("noslash")]);

        let result = resolve_public_path(&service).await;

        assert!(matches!(result, Err(ResolveError::MalformedSkinName(_))));
    }
}

// ============================================================
// HTTP Client
// ============================================================

mod client {
    use super::*;

    #[tokio::test]
    async fn sends_session_cookie_and_parses_skin_name() {
        let (base_url, hits) = spawn_skin_service("abc/myskin-123").await;
        let client = SkinClient::new(&credentials(&base_url, VALID_TOKEN));

        let session = client.prepare().await.expect("Handshake failed");

        assert_eq!(session.skin_name, "abc/myskin-123");
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn maps_rejected_session_to_unauthorized() {
        let (base_url, _hits) = spawn_skin_service("abc/myskin-123").await;
        let client = SkinClient::new(&credentials(&base_url, "expired"));

        let result = client.prepare().await;

        assert!(matches!(result, Err(ClientError::Unauthorized)));
    }

    #[tokio::test]
    async fn maps_missing_endpoint_to_not_found() {
        let base_url = serve(Router::new()).await;
        let client = SkinClient::new(&credentials(&base_url, VALID_TOKEN));

        let result = client.prepare().await;

        assert!(matches!(result, Err(ClientError::NotFound(_))));
    }

    #[tokio::test]
    async fn trims_trailing_slash_from_site_url() {
        let (base_url, _hits) = spawn_skin_service("abc/myskin-123").await;
        let client = SkinClient::new(&credentials(&format!("{}/", base_url), VALID_TOKEN));

        assert_eq!(client.base_url(), base_url);
        assert!(client.prepare().await.is_ok());
    }
}

// ============================================================
// Remote Resolver
// ============================================================

mod remote_resolver {
    use super::*;

    #[tokio::test]
    async fn performs_two_handshakes() {
        let (base_url, hits) = spawn_skin_service("abc/myskin-123").await;
        let resolver = RemotePathResolver::default();

        let public_path = resolver
            .resolve(&credentials(&base_url, VALID_TOKEN))
            .await
            .expect("Resolution failed");

        assert_eq!(public_path, SKIN_URL);
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn composer_resolves_through_live_service() {
        let (base_url, hits) = spawn_skin_service("abc/myskin-123").await;
        let manifest = ProjectManifest {
            url: Some(base_url),
            ts_session: Some(VALID_TOKEN.to_string()),
            path: PathOptions {
                entry: Some(PathBuf::from("src/index.js")),
            },
            ..Default::default()
        };

        let config = Composer::new(manifest, "/work/blog")
            .synthesize(BuildEnvironment::Production)
            .await
            .expect("Synthesis failed");

        assert_eq!(config.public_path(), Some(SKIN_URL));
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn composer_surfaces_rejected_session() {
        let (base_url, hits) = spawn_skin_service("abc/myskin-123").await;
        let manifest = ProjectManifest {
            url: Some(base_url),
            ts_session: Some("expired".to_string()),
            path: PathOptions {
                entry: Some(PathBuf::from("src/index.js")),
            },
            ..Default::default()
        };

        let result = Composer::new(manifest, "/work/blog")
            .synthesize(BuildEnvironment::Production)
            .await;

        assert!(matches!(
            result,
            Err(SynthesisError::RemoteResolution(ResolveError::Client(
                ClientError::Unauthorized
            )))
        ));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
