//! Live notification watcher.

use anyhow::{Result, bail};
use shelf_core::AppContext;
use shelf_core::notifications::{
    ChannelEvent, NotificationChannel, NotificationFeed, REVIEW_CREATED_MESSAGE,
};

use super::require_login;

/// Prints one line per review notification until interrupted.
///
/// Stops early once `count` notifications arrived or the connection ends.
pub async fn watch(ctx: &AppContext, count: Option<usize>) -> Result<()> {
    let viewer = require_login(ctx)?;
    let url = ctx.config.effective_notifications_url()?;
    let mut channel = NotificationChannel::connect(&url, &viewer.id).await?;
    let mut feed = NotificationFeed::new(ctx.config.notification_limit());
    let mut received = 0usize;

    eprintln!(
        "Listening for review notifications as {}. Press Ctrl+C to stop.",
        viewer.username
    );

    loop {
        if count.is_some_and(|limit| received >= limit) {
            break;
        }
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            event = channel.recv() => match event {
                Some(ChannelEvent::Message) => {
                    let notification = feed.push(REVIEW_CREATED_MESSAGE);
                    println!(
                        "[{}] {}",
                        notification.received_at.format("%H:%M:%S"),
                        notification.message
                    );
                    received += 1;
                }
                Some(ChannelEvent::Closed { error: Some(error) }) => {
                    bail!("Connection lost: {error}");
                }
                Some(ChannelEvent::Closed { error: None }) | None => {
                    eprintln!("Connection closed.");
                    break;
                }
            },
        }
    }

    channel.close();
    Ok(())
}
