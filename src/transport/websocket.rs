//! WebSocket connection to the control plane.
//!
//! Opens a single authenticated connection and moves [`WsMessage`]
//! envelopes over it. A dropped connection is reported to the caller and
//! nothing here reconnects.

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::spawn;
use tokio::sync::mpsc;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, info, warn};

use crate::auth::Session;
use crate::transport::endpoint::websocket_url;
use crate::transport::message::WsMessage;
use crate::utils::{Error, Result};

type Stream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// An authenticated WebSocket to the control plane carrying [`WsMessage`]
/// envelopes in both directions.
pub struct Connection {
    stream: Stream,
}

impl Connection {
    /// Connects using the session's endpoint and current token. The session
    /// must already be authenticated.
    pub async fn open(session: &Session) -> Result<Self> {
        let token = session.token().ok_or(Error::NotAuthenticated)?;
        let url = websocket_url(&session.config().endpoint, &token)?;

        debug!(host = url.host_str().unwrap_or_default(), "opening websocket");
        let (stream, response) = connect_async(url.as_str()).await?;
        info!(status = %response.status(), "websocket connected");

        Ok(Self { stream })
    }

    pub async fn send(&mut self, message: &WsMessage) -> Result<()> {
        self.stream.send(message.to_frame()?).await?;
        Ok(())
    }

    /// Waits for the next envelope. Control frames are skipped and `None`
    /// means the peer closed the connection. A frame that is not an envelope
    /// yields `MalformedEnvelope` and leaves the connection usable.
    pub async fn recv(&mut self) -> Option<Result<WsMessage>> {
        while let Some(frame) = self.stream.next().await {
            let frame = match frame {
                Ok(frame) => frame,
                Err(e) => return Some(Err(e.into())),
            };
            if frame.is_close() {
                debug!("peer closed the connection");
                return None;
            }
            if let Some(decoded) = WsMessage::from_frame(&frame) {
                return Some(decoded);
            }
        }
        None
    }

    pub async fn close(mut self) -> Result<()> {
        self.stream.close(None).await?;
        Ok(())
    }

    /// Splits the connection into an outgoing and an incoming channel.
    ///
    /// Dropping the sender closes the connection. The receiver ends after the
    /// peer closes or after a transport error, which is delivered as the last
    /// item.
    pub fn into_channels(
        self,
    ) -> (
        mpsc::UnboundedSender<WsMessage>,
        mpsc::UnboundedReceiver<Result<WsMessage>>,
    ) {
        let (mut ws_sender, mut ws_receiver) = self.stream.split();
        let (out_tx, mut out_rx) = mpsc::unbounded_channel::<WsMessage>();
        let (in_tx, in_rx) = mpsc::unbounded_channel::<Result<WsMessage>>();

        spawn(async move {
            while let Some(message) = out_rx.recv().await {
                let frame = match message.to_frame() {
                    Ok(frame) => frame,
                    Err(e) => {
                        warn!(kind = %message.kind, "dropping unencodable message: {e}");
                        continue;
                    }
                };
                if let Err(e) = ws_sender.send(frame).await {
                    warn!("failed to send {}: {e}", message.kind);
                    break;
                }
            }
            let _ = ws_sender.close().await;
            debug!("send loop closed");
        });

        spawn(async move {
            while let Some(frame) = ws_receiver.next().await {
                match frame {
                    Ok(frame) if frame.is_close() => break,
                    Ok(frame) => {
                        let Some(decoded) = WsMessage::from_frame(&frame) else {
                            continue;
                        };
                        if in_tx.send(decoded).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        let _ = in_tx.send(Err(e.into()));
                        break;
                    }
                }
            }
            debug!("receive loop closed");
        });

        (out_tx, in_rx)
    }
}
