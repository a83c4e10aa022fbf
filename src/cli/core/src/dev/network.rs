/* src/cli/core/src/dev/network.rs */

use anyhow::{Context, Result, bail};
use tokio::net::TcpListener;

/// First free port in `preferred..preferred+100`.
pub(super) fn find_available_port(preferred: u16) -> Result<u16> {
  let last = preferred.saturating_add(99);
  for port in preferred..=last {
    if std::net::TcpListener::bind(("0.0.0.0", port)).is_ok() {
      return Ok(port);
    }
  }
  bail!("no available port found in range {preferred}-{last}");
}

pub(super) async fn bind(port: u16) -> Result<TcpListener> {
  TcpListener::bind(("0.0.0.0", port)).await.with_context(|| format!("failed to bind port {port}"))
}
