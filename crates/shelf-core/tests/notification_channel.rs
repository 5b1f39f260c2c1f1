//! Notification channel against a local websocket server.

mod fixtures;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use fixtures::can_bind_localhost;
use futures_util::{SinkExt, StreamExt};
use shelf_core::notifications::{
    ChannelEvent, NotificationChannel, NotificationFeed, REVIEW_CREATED_MESSAGE,
};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio_tungstenite::accept_hdr_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};

/// Accepts one connection, records its request URI, sends `messages`, then
/// waits for the client to go away. Reports whether a close frame arrived.
async fn serve_once(
    messages: Vec<&'static str>,
) -> (String, Arc<Mutex<Option<String>>>, oneshot::Receiver<bool>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let seen_uri = Arc::new(Mutex::new(None));
    let seen = seen_uri.clone();
    let (done_tx, done_rx) = oneshot::channel();

    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let callback = move |req: &Request, resp: Response| -> Result<Response, ErrorResponse> {
            *seen.lock().unwrap() = Some(req.uri().to_string());
            Ok(resp)
        };
        let mut ws = accept_hdr_async(stream, callback).await.unwrap();
        for text in messages {
            ws.send(Message::text(text)).await.unwrap();
        }
        let mut got_close = false;
        while let Some(Ok(message)) = ws.next().await {
            if message.is_close() {
                got_close = true;
                break;
            }
        }
        let _ = done_tx.send(got_close);
    });

    (format!("ws://{addr}/notifications"), seen_uri, done_rx)
}

#[tokio::test]
async fn test_each_message_becomes_one_unread_notification() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let (url, seen_uri, done) = serve_once(vec![r#"{"reviewId":"r1"}"#, "anything"]).await;

    let mut channel = NotificationChannel::connect(&url, "u1").await.unwrap();
    let mut feed = NotificationFeed::new(50);
    for _ in 0..2 {
        let event = tokio::time::timeout(Duration::from_secs(5), channel.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(event, ChannelEvent::Message);
        feed.push(REVIEW_CREATED_MESSAGE);
    }

    assert_eq!(
        seen_uri.lock().unwrap().as_deref(),
        Some("/notifications?userId=u1")
    );
    assert_eq!(feed.len(), 2);
    assert_eq!(feed.unread_count(), 2);

    channel.close();
    let event = tokio::time::timeout(Duration::from_secs(5), channel.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(event, ChannelEvent::Closed { error: None });
    assert!(tokio::time::timeout(Duration::from_secs(5), done).await.unwrap().unwrap());
}

#[tokio::test]
async fn test_dropping_the_channel_closes_the_socket() {
    if !can_bind_localhost() {
        eprintln!("Skipping: cannot bind localhost TCP port in this environment.");
        return;
    }
    let (url, _, done) = serve_once(vec![]).await;

    let channel = NotificationChannel::connect(&url, "u1").await.unwrap();
    drop(channel);

    assert!(tokio::time::timeout(Duration::from_secs(5), done).await.unwrap().unwrap());
}

#[tokio::test]
async fn test_connect_failure_is_an_error() {
    let result = NotificationChannel::connect("ws://127.0.0.1:9/notifications", "u1").await;
    assert!(result.is_err());
}
