use anyhow::{Context, Result};
use futures_util::StreamExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;
use url::Url;

/// What the socket reports to its owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEvent {
    /// One inbound data message. Its payload is not inspected.
    Message,
    /// The connection ended. `error` is set when it ended abnormally.
    Closed { error: Option<String> },
}

/// Builds `<base>?userId=<id>`, keeping any query the base already has.
///
/// # Errors
/// Returns an error when `base` is not a valid URL.
pub fn channel_url(base: &str, user_id: &str) -> Result<Url> {
    let mut url = Url::parse(base).with_context(|| format!("Invalid notifications URL: {base}"))?;
    url.query_pairs_mut().append_pair("userId", user_id);
    Ok(url)
}

/// One live connection for one user. Best effort: there is no reconnect
/// and no replay of missed events.
///
/// Dropping the channel closes the connection.
#[derive(Debug)]
pub struct NotificationChannel {
    events: mpsc::UnboundedReceiver<ChannelEvent>,
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl NotificationChannel {
    /// Opens the socket and starts reading it in the background.
    ///
    /// # Errors
    /// Returns an error if the URL is invalid or the handshake fails.
    pub async fn connect(base_url: &str, user_id: &str) -> Result<Self> {
        let url = channel_url(base_url, user_id)?;
        let (mut socket, _) = connect_async(url.as_str())
            .await
            .with_context(|| format!("Failed to connect to {}", url.as_str()))?;
        tracing::info!(%url, "notification channel open");

        let (tx, events) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();
        let task_cancel = cancel.clone();

        let task = tokio::spawn(async move {
            let error = loop {
                tokio::select! {
                    () = task_cancel.cancelled() => {
                        let _ = socket.close(None).await;
                        break None;
                    }
                    message = socket.next() => match message {
                        Some(Ok(Message::Text(_) | Message::Binary(_))) => {
                            if tx.send(ChannelEvent::Message).is_err() {
                                let _ = socket.close(None).await;
                                break None;
                            }
                        }
                        Some(Ok(Message::Close(_))) | None => break None,
                        Some(Ok(_)) => {}
                        Some(Err(e)) => {
                            tracing::warn!("notification channel error: {e}");
                            break Some(e.to_string());
                        }
                    }
                }
            };
            tracing::info!("notification channel closed");
            let _ = tx.send(ChannelEvent::Closed { error });
        });

        Ok(Self {
            events,
            cancel,
            task,
        })
    }

    /// Next event, or `None` once the channel has closed and drained.
    pub async fn recv(&mut self) -> Option<ChannelEvent> {
        self.events.recv().await
    }

    /// Token that closes the connection when cancelled.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn close(&self) {
        self.cancel.cancel();
    }

    pub fn is_closed(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for NotificationChannel {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_url_appends_user_id() {
        let url = channel_url("ws://book-app:4000/notifications", "u 1").unwrap();
        assert_eq!(url.as_str(), "ws://book-app:4000/notifications?userId=u+1");
    }

    #[test]
    fn test_channel_url_keeps_existing_query() {
        let url = channel_url("wss://host/ws?v=2", "u1").unwrap();
        assert_eq!(url.as_str(), "wss://host/ws?v=2&userId=u1");
    }

    #[test]
    fn test_channel_url_rejects_garbage() {
        assert!(channel_url("not a url", "u1").is_err());
    }
}
