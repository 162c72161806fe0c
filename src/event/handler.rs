use std::time::Duration;

use axum::Extension;
use axum::extract::ws::Message::{Close, Text};
use axum::extract::ws::{self, WebSocket};
use axum::extract::{Path, State, WebSocketUpgrade};
use axum::response::Response;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use log::{debug, error};
use tokio::sync::mpsc;
use tokio::try_join;

use super::Hub;
use super::context;
use super::model::Signal;
use crate::integration::ws::Config;
use crate::{auth, chat};

pub async fn subscribe(
    Extension(auth_user): Extension<auth::User>,
    State(chat_service): State<chat::Service>,
    State(hub): State<Hub>,
    State(cfg): State<Config>,
    Path(chat_id): Path<chat::Id>,
    ws: WebSocketUpgrade,
) -> crate::Result<Response> {
    chat_service.check_member(&chat_id, auth_user.id()).await?;

    Ok(ws.on_upgrade(move |socket| handle_socket(socket, chat_id, hub, cfg)))
}

async fn handle_socket(socket: WebSocket, chat_id: chat::Id, hub: Hub, cfg: Config) {
    let (tx, rx) = mpsc::channel(cfg.buffer());
    let listener = hub.subscribe(&chat_id, tx).await;

    let session = context::Session::default();
    let (sender, receiver) = socket.split();

    let read_task = tokio::spawn(read(session.clone(), receiver, cfg.idle_timeout()));
    let write_task = tokio::spawn(write(session, sender, rx));

    match try_join!(read_task, write_task) {
        Ok(_) => debug!("WS of chat {chat_id} disconnected gracefully"),
        Err(e) => error!("WS of chat {chat_id} disconnected with error: {e}"),
    }

    hub.unsubscribe(&chat_id, &listener).await;
}

type Frame = Option<Result<ws::Message, axum::Error>>;

async fn next_frame(
    receiver: &mut SplitStream<WebSocket>,
    idle_timeout: Option<Duration>,
) -> Result<Frame, tokio::time::error::Elapsed> {
    match idle_timeout {
        Some(timeout) => tokio::time::timeout(timeout, receiver.next()).await,
        None => Ok(receiver.next().await),
    }
}

/// Inbound frames only tell whether the peer is still there.
async fn read(
    session: context::Session,
    mut receiver: SplitStream<WebSocket>,
    idle_timeout: Option<Duration>,
) {
    loop {
        let frame = tokio::select! {
            _ = session.stopped() => break,

            frame = next_frame(&mut receiver, idle_timeout) => frame,
        };

        match frame {
            Err(_) => {
                debug!("WS connection idle for too long");
                break;
            }
            Ok(None) => {
                debug!("WS stream ended");
                break;
            }
            Ok(Some(Err(e))) => {
                error!("Failed to read WS frame: {e}");
                break;
            }
            Ok(Some(Ok(Close(frame)))) => {
                debug!("WS connection closed by client: {frame:?}");
                break;
            }
            Ok(Some(Ok(_))) => continue,
        }
    }

    session.stop();
}

async fn write(
    session: context::Session,
    mut sender: SplitSink<WebSocket, ws::Message>,
    mut rx: mpsc::Receiver<Signal>,
) {
    loop {
        tokio::select! {
            _ = session.stopped() => break,

            signal = rx.recv() => {
                let Some(signal) = signal else {
                    debug!("Listener released by hub");
                    break;
                };

                if let Err(e) = sender.send(Text(signal.payload().into())).await {
                    error!("Failed to send signal to client: {e}");
                    break;
                }
            },
        }
    }

    session.stop();

    if let Err(e) = sender.close().await {
        debug!("Failed to close WS sink: {e}");
    }
}
