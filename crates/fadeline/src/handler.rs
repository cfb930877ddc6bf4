//! Per-connection handler: decode inbound frames, pump broadcasts out.
//!
//! Each accepted socket gets its own task running this handler. The
//! socket splits into a reader half (frames decoded into `ClientEvent`s
//! and forwarded to the room) and a writer task (room broadcasts encoded
//! back out as text frames). The writer ends on its own once the room
//! detaches the connection and drops its event sender.

use fadeline_protocol::{
    ClientEvent, Codec, ConnectionId, JsonCodec, ServerEvent,
};
use fadeline_room::RoomHandle;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::WebSocketStream;

use crate::ServerError;

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection(
    ws: WebSocketStream<TcpStream>,
    id: ConnectionId,
    room: RoomHandle,
) -> Result<(), ServerError> {
    let (mut ws_tx, mut ws_rx) = ws.split();
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<ServerEvent>();
    room.attach(id, event_tx).await?;

    let writer = tokio::spawn(async move {
        while let Some(event) = event_rx.recv().await {
            let text = match JsonCodec.encode(&event) {
                // JSON output is always valid UTF-8.
                Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
                Err(e) => {
                    tracing::warn!(error = %e, "failed to encode event, dropping");
                    continue;
                }
            };
            if ws_tx.send(Message::Text(text.into())).await.is_err() {
                break;
            }
        }
        let _ = ws_tx.close().await;
    });

    while let Some(msg) = ws_rx.next().await {
        let data = match msg {
            Ok(Message::Text(text)) => text.as_bytes().to_vec(),
            Ok(Message::Binary(data)) => data.to_vec(),
            Ok(Message::Close(_)) => break,
            Ok(_) => continue, // ping/pong handled by tungstenite
            Err(e) => {
                tracing::debug!(conn = %id, error = %e, "recv error");
                break;
            }
        };
        match JsonCodec.decode::<ClientEvent>(&data) {
            Ok(event) => room.client(id, event).await?,
            Err(e) => {
                tracing::debug!(conn = %id, error = %e, "undecodable frame, ignoring");
            }
        }
    }

    tracing::info!(conn = %id, "connection closed");
    room.detach(id).await?;
    writer.await.ok();
    Ok(())
}
