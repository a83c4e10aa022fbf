/* src/cli/core/src/dev/reload.rs */

// Live-reload hub: every connected browser gets "reload" when the output changes.

use anyhow::Result;
use axum::Router;
use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::Response;
use axum::routing::get;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio::sync::broadcast::{self, error::RecvError};

use crate::build::livereload::{RELOAD_MESSAGE, RELOAD_PATH};

#[derive(Clone)]
pub struct ReloadHub {
  tx: broadcast::Sender<()>,
}

impl Default for ReloadHub {
  fn default() -> Self {
    Self::new()
  }
}

impl ReloadHub {
  pub fn new() -> Self {
    let (tx, _) = broadcast::channel(16);
    Self { tx }
  }

  pub fn subscribe(&self) -> broadcast::Receiver<()> {
    self.tx.subscribe()
  }

  /// Signal every connected client; returns how many were listening.
  pub fn notify(&self) -> usize {
    self.tx.send(()).unwrap_or(0)
  }
}

pub(super) fn reload_router(hub: ReloadHub) -> Router {
  Router::new().route(RELOAD_PATH, get(upgrade)).with_state(hub)
}

pub(super) async fn serve(listener: TcpListener, hub: ReloadHub) -> Result<()> {
  axum::serve(listener, reload_router(hub)).await?;
  Ok(())
}

async fn upgrade(ws: WebSocketUpgrade, State(hub): State<ReloadHub>) -> Response {
  // Subscribe before the handshake completes so no signal is missed.
  let rx = hub.subscribe();
  ws.on_upgrade(move |socket| client_loop(socket, rx))
}

async fn client_loop(socket: WebSocket, mut rx: broadcast::Receiver<()>) {
  let (mut sender, mut receiver) = socket.split();
  loop {
    tokio::select! {
      msg = receiver.next() => {
        match msg {
          Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
          _ => continue,
        }
      }
      signal = rx.recv() => {
        match signal {
          Ok(()) | Err(RecvError::Lagged(_)) => {
            if sender.send(Message::Text(RELOAD_MESSAGE.into())).await.is_err() {
              break;
            }
          }
          Err(RecvError::Closed) => break,
        }
      }
    }
  }
}
