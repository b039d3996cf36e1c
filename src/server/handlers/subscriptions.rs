use async_channel::Receiver;
use axum::extract::{
    rejection::QueryRejection,
    ws::{self, WebSocket, WebSocketUpgrade},
    Extension, Query,
};
use axum::response::Response;
use serde::Deserialize;

use crate::api::DynAPI;
use crate::bus::Message;
use crate::error::Error;

#[derive(Debug, Deserialize)]
pub struct SubscribeParams {
    topic: String,
}

/// Streams every message published to `topic` as a text frame until either
/// side goes away, then releases the subscription. Anything the client sends
/// other than a close is ignored.
pub async fn subscribe(
    Extension(api): Extension<DynAPI>,
    query: Result<Query<SubscribeParams>, QueryRejection>,
    upgrade: WebSocketUpgrade,
) -> Result<Response, Error> {
    let Query(params) = query?;
    let messages = api.subscribe(&params.topic).await?;

    Ok(upgrade.on_upgrade(move |socket| async move {
        forward(socket, messages).await;

        if let Err(err) = api.unsubscribe(&params.topic).await {
            tracing::warn!(error = %err, topic = %params.topic, "unsubscribe failed");
        }
    }))
}

async fn forward(mut socket: WebSocket, messages: Receiver<Message>) {
    loop {
        tokio::select! {
            message = messages.recv() => {
                let message = match message {
                    Ok(message) => message,
                    Err(_) => break,
                };
                let text = String::from_utf8_lossy(&message.payload).into_owned();

                if socket.send(ws::Message::Text(text)).await.is_err() {
                    break;
                }
            }
            incoming = socket.recv() => match incoming {
                Some(Ok(ws::Message::Close(_))) | Some(Err(_)) | None => break,
                Some(Ok(_)) => {}
            },
        }
    }

    tracing::debug!("subscriber disconnected");
}
