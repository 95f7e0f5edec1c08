//! Redis connection service
//!
//! Wraps a [`redis::Client`] for the rest of the application. The client
//! connects lazily, so construction only validates the URL; reachability
//! is reported by the PING health check.
//!
//! ## Example
//!
//! ```ignore
//! use grader_providers::RedisService;
//!
//! let redis = RedisService::new("redis://localhost:6379/0")?;
//! assert!(redis.ping().await.is_ok());
//! ```

use std::sync::RwLock;
use std::time::Duration;

use async_trait::async_trait;
use grader_domain::error::{Error, Result};
use grader_domain::ports::{HealthCheckable, ManagedService, MetricsSource, NotificationPublisher};
use redis::{Client, aio::MultiplexedConnection};
use tracing::{debug, warn};

use crate::constants::REDIS_PING_TIMEOUT_MS;

#[derive(Debug, Default, Clone, Copy)]
struct RedisStats {
    pings: u64,
    ping_failures: u64,
    published: u64,
    publish_failures: u64,
}

/// Shared Redis connection service
pub struct RedisService {
    client: Client,
    url: String,
    ping_timeout: Duration,
    stats: RwLock<RedisStats>,
}

impl RedisService {
    /// Create a service for a Redis URL (e.g. `redis://localhost:6379/0`)
    pub fn new(url: &str) -> Result<Self> {
        let client = Client::open(url).map_err(|e| {
            Error::infrastructure_with_source(format!("Failed to create Redis client: {e}"), e)
        })?;

        Ok(Self {
            client,
            url: url.to_string(),
            ping_timeout: Duration::from_millis(REDIS_PING_TIMEOUT_MS),
            stats: RwLock::new(RedisStats::default()),
        })
    }

    /// Override the PING timeout
    pub fn with_ping_timeout(mut self, timeout: Duration) -> Self {
        self.ping_timeout = timeout;
        self
    }

    /// Connection URL with any password masked
    pub fn redacted_url(&self) -> String {
        match (self.url.find("://"), self.url.rfind('@')) {
            (Some(scheme_end), Some(at)) if at > scheme_end => {
                format!("{}://***{}", &self.url[..scheme_end], &self.url[at..])
            }
            _ => self.url.clone(),
        }
    }

    async fn get_connection(&self) -> Result<MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| {
                Error::infrastructure_with_source(format!("Failed to get Redis connection: {e}"), e)
            })
    }

    /// Send `PING`, bounded by the configured timeout
    pub async fn ping(&self) -> Result<()> {
        let result = tokio::time::timeout(self.ping_timeout, async {
            let mut conn = self.get_connection().await?;
            redis::cmd("PING")
                .query_async::<String>(&mut conn)
                .await
                .map_err(|e| Error::infrastructure_with_source(format!("Redis PING failed: {e}"), e))
        })
        .await
        .map_err(|_| Error::network(format!("Redis PING timed out after {:?}", self.ping_timeout)))
        .and_then(|inner| inner);

        if let Ok(mut stats) = self.stats.write() {
            stats.pings += 1;
            if result.is_err() {
                stats.ping_failures += 1;
            }
        }
        result.map(|_| ())
    }
}

#[async_trait]
impl HealthCheckable for RedisService {
    async fn health_check(&self) -> bool {
        match self.ping().await {
            Ok(()) => true,
            Err(e) => {
                warn!(url = %self.redacted_url(), error = %e, "Redis health check failed");
                false
            }
        }
    }
}

#[async_trait]
impl NotificationPublisher for RedisService {
    async fn publish(&self, channel: &str, payload: &str) -> Result<()> {
        let result = async {
            let mut conn = self.get_connection().await?;
            redis::cmd("PUBLISH")
                .arg(channel)
                .arg(payload)
                .query_async::<i64>(&mut conn)
                .await
                .map_err(|e| {
                    Error::infrastructure_with_source(format!("Redis PUBLISH failed: {e}"), e)
                })
        }
        .await;

        if let Ok(mut stats) = self.stats.write() {
            match &result {
                Ok(_) => stats.published += 1,
                Err(_) => stats.publish_failures += 1,
            }
        }

        let receivers = result?;
        debug!(channel = %channel, receivers, "Published message");
        Ok(())
    }
}

impl MetricsSource for RedisService {
    fn metrics(&self) -> Result<serde_json::Value> {
        let stats = self
            .stats
            .read()
            .map(|s| *s)
            .map_err(|_| Error::internal("Redis stats lock poisoned"))?;
        Ok(serde_json::json!({
            "url": self.redacted_url(),
            "pings": stats.pings,
            "ping_failures": stats.ping_failures,
            "published": stats.published,
            "publish_failures": stats.publish_failures,
        }))
    }
}

impl ManagedService for RedisService {
    fn as_health_checkable(&self) -> Option<&dyn HealthCheckable> {
        Some(self)
    }

    fn as_metrics_source(&self) -> Option<&dyn MetricsSource> {
        Some(self)
    }
}
