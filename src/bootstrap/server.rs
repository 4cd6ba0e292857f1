use std::net::SocketAddr;

use anyhow::Context;
use axum::{ServiceExt, extract::Request};

use super::Application;

/// Bind and serve until the process stops. A bind failure is returned, not retried.
pub async fn init_server(app: Application) -> anyhow::Result<()> {
    let port = app.config.app_port;
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("cannot bind {addr}"))?;

    tracing::info!("Server listening on http://localhost:{}", port);

    axum::serve(listener, ServiceExt::<Request>::into_make_service(app.router))
        .await
        .context("server stopped")
}
