//! HTTP server setup.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_swagger_ui::SwaggerUi;

use super::v0;
use crate::api_client::types::MonitorStatus;
use crate::error::Result;
use crate::tracing::prelude::*;

#[derive(OpenApi)]
#[openapi(info(
    title = "asset-monitor",
    description = "Status and alert history of the asset monitor"
))]
struct ApiDoc;

/// State shared by all handlers.
#[derive(Clone)]
pub struct SharedState {
    inner: Arc<Inner>,
}

struct Inner {
    status_rx: watch::Receiver<MonitorStatus>,
    alerts_file: PathBuf,
}

impl SharedState {
    pub fn new(status_rx: watch::Receiver<MonitorStatus>, alerts_file: PathBuf) -> Self {
        Self {
            inner: Arc::new(Inner {
                status_rx,
                alerts_file,
            }),
        }
    }

    pub fn status(&self) -> MonitorStatus {
        self.inner.status_rx.borrow().clone()
    }

    pub fn alerts_file(&self) -> &PathBuf {
        &self.inner.alerts_file
    }
}

/// Build the full router: versioned API plus Swagger UI.
pub fn build_router(state: SharedState) -> Router {
    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .nest("/api/v0", v0::routes())
        .split_for_parts();

    router
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api))
        // Unversioned path polled by existing dashboards.
        .route("/api/alerts", get(v0::get_alerts))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve the API on `listen` until `shutdown` is cancelled.
pub async fn serve(listen: SocketAddr, state: SharedState, shutdown: CancellationToken) -> Result<()> {
    let listener = TcpListener::bind(listen).await?;
    info!(
        event = "api_listening",
        address = %listener.local_addr()?,
        "API server listening"
    );

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;

    Ok(())
}
