//! Utility functions and helpers.

use tokio::sync::mpsc;

/// Send a value through a channel, logging a warning if it fails.
///
/// A closed receiver is normal here: the board replaces its event channel
/// on every reload, so fetches launched before the reload land on a dead
/// sender and their results are dropped.
pub async fn send_or_log<T>(tx: &mpsc::Sender<T>, value: T, context: &str) {
    if let Err(e) = tx.send(value).await {
        tracing::warn!("Failed to send {}: {}", context, e);
    }
}
