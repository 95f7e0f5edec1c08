//! Tests for the notification service

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use grader_domain::ports::NotificationPublisher;
use grader_domain::value_objects::Notification;
use grader_domain::{Error, Result};
use grader_providers::{MetricsSource, NotificationService};

#[derive(Default)]
struct RecordingPublisher {
    messages: Mutex<Vec<(String, String)>>,
    fail: bool,
}

#[async_trait]
impl NotificationPublisher for RecordingPublisher {
    async fn publish(&self, channel: &str, payload: &str) -> Result<()> {
        if self.fail {
            return Err(Error::network("connection refused"));
        }
        self.messages
            .lock()
            .expect("lock")
            .push((channel.to_string(), payload.to_string()));
        Ok(())
    }
}

fn notification() -> Notification {
    Notification {
        user_id: "42".to_string(),
        kind: "correction_completed".to_string(),
        message: "Your essay has been graded".to_string(),
    }
}

#[tokio::test]
async fn test_notify_publishes_json_payload() {
    let publisher = Arc::new(RecordingPublisher::default());
    let service = NotificationService::new(publisher.clone(), "grader:notifications");

    service.notify(&notification()).await.expect("notify");

    let messages = publisher.messages.lock().expect("lock");
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].0, "grader:notifications");
    let payload: serde_json::Value = serde_json::from_str(&messages[0].1).expect("json");
    assert_eq!(payload["user_id"], "42");
    assert_eq!(payload["type"], "correction_completed");
    assert!(payload["sent_at"].is_string());
}

#[tokio::test]
async fn test_failed_publish_is_counted() {
    let publisher = Arc::new(RecordingPublisher {
        fail: true,
        ..Default::default()
    });
    let service = NotificationService::new(publisher, "ch");

    assert!(service.notify(&notification()).await.is_err());
    let metrics = service.metrics().expect("metrics");
    assert_eq!(metrics["failed"], 1);
    assert_eq!(metrics["sent"], 0);
}
