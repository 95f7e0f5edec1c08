//! Recovery handler port

use crate::error::Result;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;

/// Keyword parameters handed to a recovery handler on every attempt
pub type RecoveryParams = Map<String, Value>;

/// Callback that tries to restore a degraded service
///
/// Handlers may be called repeatedly and must tolerate that.
#[async_trait]
pub trait RecoveryHandler: Send + Sync {
    /// Attempt recovery; `Ok(true)` means the service is usable again
    async fn recover(&self, params: &RecoveryParams) -> Result<bool>;
}

/// Shared recovery handler
pub type SharedRecoveryHandler = Arc<dyn RecoveryHandler>;

/// Recovery handler backed by a synchronous closure
pub struct FnRecoveryHandler<F> {
    recover_fn: F,
}

impl<F> FnRecoveryHandler<F>
where
    F: Fn(&RecoveryParams) -> Result<bool> + Send + Sync,
{
    /// Wrap a closure
    pub fn new(recover_fn: F) -> Self {
        Self { recover_fn }
    }
}

#[async_trait]
impl<F> RecoveryHandler for FnRecoveryHandler<F>
where
    F: Fn(&RecoveryParams) -> Result<bool> + Send + Sync,
{
    async fn recover(&self, params: &RecoveryParams) -> Result<bool> {
        (self.recover_fn)(params)
    }
}

/// Build a shared recovery handler from a closure
pub fn recovery_fn<F>(recover_fn: F) -> SharedRecoveryHandler
where
    F: Fn(&RecoveryParams) -> Result<bool> + Send + Sync + 'static,
{
    Arc::new(FnRecoveryHandler::new(recover_fn))
}
