/* src/cli/core/src/dev/server.rs */

// Static dev server over the content base (index.html plus the emitted js/).

use std::path::Path;

use anyhow::Result;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;

pub(super) fn router(content_base: &Path) -> Router {
  Router::new().fallback_service(ServeDir::new(content_base))
}

pub(super) async fn serve(listener: TcpListener, content_base: &Path) -> Result<()> {
  axum::serve(listener, router(content_base)).await?;
  Ok(())
}
