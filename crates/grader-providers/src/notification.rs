//! User notification service

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use grader_domain::error::Result;
use grader_domain::ports::{ManagedService, MetricsSource, NotificationPublisher};
use grader_domain::value_objects::Notification;
use tracing::{debug, warn};

/// Publishes user notifications as JSON over a pub/sub channel
pub struct NotificationService {
    publisher: Arc<dyn NotificationPublisher>,
    channel: String,
    sent: AtomicU64,
    failed: AtomicU64,
}

impl NotificationService {
    /// Create a service publishing to `channel`
    pub fn new<C: Into<String>>(publisher: Arc<dyn NotificationPublisher>, channel: C) -> Self {
        Self {
            publisher,
            channel: channel.into(),
            sent: AtomicU64::new(0),
            failed: AtomicU64::new(0),
        }
    }

    /// Channel notifications are published on
    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Publish one notification
    pub async fn notify(&self, notification: &Notification) -> Result<()> {
        let payload = serde_json::json!({
            "user_id": notification.user_id,
            "type": notification.kind,
            "message": notification.message,
            "sent_at": Utc::now().to_rfc3339(),
        })
        .to_string();

        match self.publisher.publish(&self.channel, &payload).await {
            Ok(()) => {
                self.sent.fetch_add(1, Ordering::Relaxed);
                debug!(user_id = %notification.user_id, kind = %notification.kind, "Notification sent");
                Ok(())
            }
            Err(e) => {
                self.failed.fetch_add(1, Ordering::Relaxed);
                warn!(user_id = %notification.user_id, error = %e, "Notification failed");
                Err(e)
            }
        }
    }
}

impl MetricsSource for NotificationService {
    fn metrics(&self) -> Result<serde_json::Value> {
        Ok(serde_json::json!({
            "channel": self.channel,
            "sent": self.sent.load(Ordering::Relaxed),
            "failed": self.failed.load(Ordering::Relaxed),
        }))
    }
}

impl ManagedService for NotificationService {
    fn as_metrics_source(&self) -> Option<&dyn MetricsSource> {
        Some(self)
    }
}
