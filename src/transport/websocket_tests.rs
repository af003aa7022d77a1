use futures_util::{SinkExt, StreamExt};
use serde_json::json;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio_tungstenite::accept_hdr_async;
use tokio_tungstenite::tungstenite::Message as Frame;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};

use crate::auth::Session;
use crate::config::Config;
use crate::transport::message::WsMessage;
use crate::transport::websocket::Connection;
use crate::utils::Error;

type ServerStream = tokio_tungstenite::WebSocketStream<tokio::net::TcpStream>;

/// Binds a loopback listener and hands the accepted socket plus the request
/// URI to `handler`.
async fn spawn_server<F, Fut>(handler: F) -> String
where
    F: FnOnce(ServerStream, String) -> Fut + Send + 'static,
    Fut: std::future::Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let (uri_tx, uri_rx) = oneshot::channel();
        let callback = move |req: &Request, resp: Response| -> Result<Response, ErrorResponse> {
            let _ = uri_tx.send(req.uri().to_string());
            Ok(resp)
        };
        let ws = accept_hdr_async(stream, callback)
            .await
            .expect("WebSocket handshake failed");
        let uri = uri_rx.await.unwrap();
        handler(ws, uri).await;
    });

    format!("http://{addr}")
}

fn session(endpoint: &str, token: &str) -> Session {
    Session::new(Config {
        identifier: "newt-1".into(),
        secret: "s3cret".into(),
        token: token.into(),
        endpoint: endpoint.into(),
        tls_client_cert: String::new(),
    })
    .unwrap()
}

#[tokio::test]
async fn test_open_requires_token() {
    let session = session("http://127.0.0.1:9", "");
    let err = Connection::open(&session).await.err().unwrap();
    assert!(matches!(err, Error::NotAuthenticated));
}

#[tokio::test]
async fn test_open_rejects_bad_endpoint() {
    let session = session("ftp://127.0.0.1", "abc123");
    let err = Connection::open(&session).await.err().unwrap();
    assert!(matches!(err, Error::InvalidEndpoint { .. }));
}

#[tokio::test]
async fn test_connection_sends_token_and_echoes() {
    let (uri_tx, uri_rx) = oneshot::channel();
    let endpoint = spawn_server(|mut ws, uri| async move {
        let _ = uri_tx.send(uri);
        while let Some(Ok(frame)) = ws.next().await {
            if frame.is_text() {
                ws.send(frame).await.unwrap();
            }
        }
    })
    .await;

    let session = session(&endpoint, "abc123");
    let mut conn = Connection::open(&session).await.unwrap();

    let outgoing = WsMessage::new("newt/ping", json!({ "seq": 1, "nested": { "ok": true } }));
    conn.send(&outgoing).await.unwrap();
    let echoed = conn.recv().await.unwrap().unwrap();
    assert_eq!(echoed, outgoing);

    let uri = uri_rx.await.unwrap();
    assert_eq!(uri, "/api/v1/ws?token=abc123&clientType=newt");

    conn.close().await.unwrap();
}

#[tokio::test]
async fn test_recv_skips_control_frames_and_reports_malformed() {
    let endpoint = spawn_server(|mut ws, _| async move {
        ws.send(Frame::Ping(Vec::new().into())).await.unwrap();
        ws.send(Frame::text("not an envelope".to_string()))
            .await
            .unwrap();
        ws.send(Frame::text(
            r#"{"type":"unknown-xyz","data":[1,2,3]}"#.to_string(),
        ))
        .await
        .unwrap();
        ws.close(None).await.unwrap();
        while ws.next().await.is_some() {}
    })
    .await;

    let session = session(&endpoint, "abc123");
    let mut conn = Connection::open(&session).await.unwrap();

    let first = conn.recv().await.unwrap();
    assert!(matches!(first, Err(Error::MalformedEnvelope(_))));

    let second = conn.recv().await.unwrap().unwrap();
    assert_eq!(second.kind, "unknown-xyz");
    assert_eq!(second.data, json!([1, 2, 3]));

    assert!(conn.recv().await.is_none());
}

#[tokio::test]
async fn test_channels_forward_both_directions() {
    let endpoint = spawn_server(|mut ws, _| async move {
        ws.send(Frame::text(
            r#"{"type":"newt/wg/connect","data":{"endpoint":"1.2.3.4:51820"}}"#.to_string(),
        ))
        .await
        .unwrap();
        // echo until the client goes away
        while let Some(Ok(frame)) = ws.next().await {
            if frame.is_text() {
                ws.send(frame).await.unwrap();
            }
        }
    })
    .await;

    let session = session(&endpoint, "abc123");
    let conn = Connection::open(&session).await.unwrap();
    let (tx, mut rx) = conn.into_channels();

    let pushed = rx.recv().await.unwrap().unwrap();
    assert_eq!(pushed.kind, "newt/wg/connect");
    assert_eq!(pushed.data["endpoint"], "1.2.3.4:51820");

    let reply = WsMessage::new("newt/receive-bandwidth", json!({ "bytes": 42 }));
    tx.send(reply.clone()).unwrap();
    assert_eq!(rx.recv().await.unwrap().unwrap(), reply);

    // dropping the sender closes the socket, which ends the receive side
    drop(tx);
    assert!(rx.recv().await.is_none());
}
