//! Web server for the map.
//!
//! Serves the rendered Leaflet page and its view model using Axum. The
//! listener is bound before any fetching starts; the map is loaded by a
//! background task and the page answers 503 until it is ready. The plate
//! boundary overlay appears on the next page load after its fetch completes.

use std::sync::Arc;

use anyhow::Context;
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::get,
};
use tokio::net::TcpListener;
use tokio::sync::RwLock;

use crate::client::{FeedConfig, FeedSource};
use crate::map::MapSettings;
use crate::orchestrator::{SharedMap, load_map};
use crate::output::render_html;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    pub feeds: FeedConfig,
    pub map: MapSettings,
}

/// Where the map is in its lifecycle.
enum MapStatus {
    Loading,
    Ready(SharedMap),
    Failed(String),
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    map: Arc<RwLock<MapStatus>>,
}

impl AppState {
    /// State for a server whose map has not been fetched yet.
    #[must_use]
    pub fn loading() -> Self {
        Self {
            map: Arc::new(RwLock::new(MapStatus::Loading)),
        }
    }

    /// Fetch and compose the map, then publish it to the handlers.
    ///
    /// The plate boundary task keeps running after this returns.
    pub async fn load<S>(&self, source: Arc<S>, settings: &MapSettings)
    where
        S: FeedSource + Send + Sync + 'static,
    {
        let status = match load_map(source, settings).await {
            Ok(loaded) => MapStatus::Ready(loaded.view),
            Err(e) => {
                tracing::error!("failed to fetch earthquake feed: {}", e);
                MapStatus::Failed(e.to_string())
            }
        };
        *self.map.write().await = status;
    }

    /// The composed map, if it is ready.
    async fn current_map(&self) -> Result<SharedMap, Unavailable> {
        match &*self.map.read().await {
            MapStatus::Ready(view) => Ok(Arc::clone(view)),
            MapStatus::Loading => Err(Unavailable::Loading),
            MapStatus::Failed(message) => Err(Unavailable::Failed(message.clone())),
        }
    }
}

/// Why there is no map to show.
enum Unavailable {
    Loading,
    Failed(String),
}

impl IntoResponse for Unavailable {
    fn into_response(self) -> Response {
        match self {
            Self::Loading => (StatusCode::SERVICE_UNAVAILABLE, Html(LOADING_HTML)).into_response(),
            Self::Failed(message) => (
                StatusCode::BAD_GATEWAY,
                format!("earthquake feed unavailable: {message}"),
            )
                .into_response(),
        }
    }
}

/// Create the Axum router with all routes.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/map.json", get(map_json_handler))
        .route("/health", get(health_handler))
        .with_state(state)
}

/// Bind the listener for the configured address.
///
/// # Errors
///
/// Returns an error if the address cannot be bound.
pub async fn bind(config: &ServerConfig) -> anyhow::Result<TcpListener> {
    let addr = format!("{}:{}", config.host, config.port);
    TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))
}

/// Serve the map on an already bound listener.
///
/// The map is loaded from `source` in a background task, so connections are
/// accepted while the feeds are still being fetched.
pub async fn serve<S>(
    listener: TcpListener,
    source: Arc<S>,
    settings: MapSettings,
) -> anyhow::Result<()>
where
    S: FeedSource + Send + Sync + 'static,
{
    let state = AppState::loading();

    // Spawn the background map load
    let load_state = state.clone();
    tokio::spawn(async move {
        load_state.load(source, &settings).await;
    });

    let app = create_router(state);

    tracing::info!("🌍 quakemap serving at http://{}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}

/// Map page handler.
async fn index_handler(State(state): State<AppState>) -> Response {
    let map = match state.current_map().await {
        Ok(map) => map,
        Err(unavailable) => return unavailable.into_response(),
    };
    let view = map.read().await;
    match render_html(&view) {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            tracing::error!("failed to render map: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, "failed to render map").into_response()
        }
    }
}

/// View model handler.
async fn map_json_handler(State(state): State<AppState>) -> Response {
    let map = match state.current_map().await {
        Ok(map) => map,
        Err(unavailable) => return unavailable.into_response(),
    };
    let view = map.read().await;
    Json(&*view).into_response()
}

/// Health check endpoint.
async fn health_handler() -> &'static str {
    "OK"
}

// ============================================================================
// Placeholder page shown while the earthquake feed is being fetched
// ============================================================================

const LOADING_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta http-equiv="refresh" content="2">
    <title>Loading earthquakes…</title>
</head>
<body>
    <p>Fetching the latest earthquakes from USGS…</p>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpStream;
    use tower::ServiceExt;

    use crate::errors::QuakemapError;
    use crate::models::{FeatureCollection, PlateCollection};
    use crate::orchestrator::tests::FakeSource;

    /// A feed source whose requests never complete.
    struct StalledSource;

    impl FeedSource for StalledSource {
        async fn fetch_earthquakes(&self) -> Result<FeatureCollection, QuakemapError> {
            std::future::pending().await
        }

        async fn fetch_plate_boundaries(&self) -> Result<PlateCollection, QuakemapError> {
            std::future::pending().await
        }
    }

    async fn loaded_state(quakes_ok: bool, plates_ok: bool) -> AppState {
        let state = AppState::loading();
        let source = Arc::new(FakeSource {
            quakes_ok,
            plates_ok,
        });
        state.load(source, &MapSettings::default()).await;
        state
    }

    async fn get_body(app: Router, uri: &str) -> (StatusCode, String) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(bytes.to_vec()).unwrap())
    }

    /// Plain HTTP/1.1 GET over a fresh connection.
    async fn raw_get(addr: std::net::SocketAddr, path: &str) -> String {
        let mut stream = TcpStream::connect(addr).await.unwrap();
        let request =
            format!("GET {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n");
        stream.write_all(request.as_bytes()).await.unwrap();

        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();
        response
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_health() {
        let app = create_router(loaded_state(true, true).await);
        let (status, body) = get_body(app, "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "OK");
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_index_serves_map() {
        let app = create_router(loaded_state(true, true).await);
        let (status, body) = get_body(app, "/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("L.control.layers"));
        assert!(body.contains("10km SW of Example"));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_map_json_without_plates() {
        let app = create_router(loaded_state(true, false).await);
        let (status, body) = get_body(app, "/map.json").await;
        assert_eq!(status, StatusCode::OK);

        let value: serde_json::Value = serde_json::from_str(&body).unwrap();
        let len = |v: &serde_json::Value| v.as_array().map(Vec::len);
        assert_eq!(len(&value["base_layers"]), Some(4));
        assert_eq!(len(&value["control"]["overlays"]), Some(2));
        assert_eq!(len(&value["earthquakes"]["layer"]["markers"]), Some(2));
        assert_eq!(len(&value["plate_boundaries"]["layer"]["lines"]), Some(0));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_loading_map_is_unavailable() {
        let app = create_router(AppState::loading());
        let (status, body) = get_body(app.clone(), "/").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(body.contains("http-equiv=\"refresh\""));

        let (status, _) = get_body(app.clone(), "/map.json").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

        let (status, _) = get_body(app, "/health").await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_failed_earthquake_feed_is_reported() {
        let app = create_router(loaded_state(false, true).await);
        let (status, body) = get_body(app, "/").await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
        assert!(body.contains("earthquake feed unavailable"));
    }

    #[tokio::test(flavor = "current_thread")]
    async fn test_accepts_connections_while_feed_pending() {
        let config = ServerConfig {
            port: 0,
            host: "127.0.0.1".into(),
            feeds: FeedConfig::default(),
            map: MapSettings::default(),
        };
        let listener = bind(&config).await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(serve(listener, Arc::new(StalledSource), config.map));

        let health = raw_get(addr, "/health").await;
        assert!(health.starts_with("HTTP/1.1 200"), "{health}");

        let index = raw_get(addr, "/").await;
        assert!(index.starts_with("HTTP/1.1 503"), "{index}");
    }
}
