//! Simulated network conditions in front of the employee routes.

use std::{
    sync::{
        Arc,
        atomic::{AtomicU32, Ordering},
    },
    time::Duration,
};

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use platform_api::ApiError;
use rand::Rng;
use tracing::warn;

use crate::config::NetworkConfig;

/// Latency and failure injection applied to every API request.
#[derive(Debug, Default)]
pub struct NetworkSimulator {
    latency: Duration,
    failure_rate: f64,
    forced_failures: AtomicU32,
}

impl NetworkSimulator {
    pub fn new(config: &NetworkConfig) -> Self {
        Self {
            latency: config.latency,
            failure_rate: config.failure_rate.clamp(0.0, 1.0),
            forced_failures: AtomicU32::new(0),
        }
    }

    /// Force the next `count` requests to fail regardless of the failure rate.
    pub fn fail_next(&self, count: u32) {
        self.forced_failures.fetch_add(count, Ordering::SeqCst);
    }

    pub fn pending_failures(&self) -> u32 {
        self.forced_failures.load(Ordering::SeqCst)
    }

    fn should_fail(&self) -> bool {
        let forced = self
            .forced_failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        forced || (self.failure_rate > 0.0 && rand::thread_rng().gen_bool(self.failure_rate))
    }
}

pub async fn simulate_network(
    State(network): State<Arc<NetworkSimulator>>,
    request: Request,
    next: Next,
) -> Response {
    if !network.latency.is_zero() {
        tokio::time::sleep(network.latency).await;
    }
    if network.should_fail() {
        warn!(
            method = %request.method(),
            path = %request.uri().path(),
            "injected network failure"
        );
        return ApiError::Transport("simulated network failure".into()).into_response();
    }
    next.run(request).await
}
