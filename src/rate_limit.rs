use std::collections::VecDeque;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use dashmap::DashMap;
use tracing::warn;

use crate::app::AppState;
use crate::error::AppError;

/// Tables larger than this get idle clients purged on the next check
const PURGE_THRESHOLD: usize = 10_000;

/// Outcome of a rate-limit check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
    Allowed,
    Limited { retry_after: Duration },
}

/// Sliding-window request counter keyed by client address
#[derive(Debug, Clone)]
pub struct RateLimiter {
    max_requests: u32,
    window: Duration,
    clients: Arc<DashMap<IpAddr, VecDeque<Instant>>>,
}

impl RateLimiter {
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
            clients: Arc::new(DashMap::new()),
        }
    }

    pub fn per_minute(max_requests: u32) -> Self {
        Self::new(max_requests, Duration::from_secs(60))
    }

    pub fn max_requests(&self) -> u32 {
        self.max_requests
    }

    pub fn check(&self, client: IpAddr) -> RateLimitDecision {
        self.check_at(client, Instant::now())
    }

    /// Record a request from `client` at `now` unless the window is full
    pub fn check_at(&self, client: IpAddr, now: Instant) -> RateLimitDecision {
        if self.clients.len() > PURGE_THRESHOLD {
            self.purge_idle(now);
        }

        let mut hits = self.clients.entry(client).or_default();
        while hits
            .front()
            .is_some_and(|&oldest| now.saturating_duration_since(oldest) >= self.window)
        {
            hits.pop_front();
        }

        if hits.len() < self.max_requests as usize {
            hits.push_back(now);
            return RateLimitDecision::Allowed;
        }

        let retry_after = hits
            .front()
            .map(|&oldest| self.window.saturating_sub(now.saturating_duration_since(oldest)))
            .unwrap_or(self.window);
        RateLimitDecision::Limited { retry_after }
    }

    /// Drop clients whose whole window has expired
    pub fn purge_idle(&self, now: Instant) {
        self.clients.retain(|_, hits| {
            hits.back()
                .is_some_and(|&latest| now.saturating_duration_since(latest) < self.window)
        });
    }

    pub fn tracked_clients(&self) -> usize {
        self.clients.len()
    }
}

/// Whole seconds a limited client should wait, never less than one
pub fn retry_after_secs(retry_after: Duration) -> u64 {
    let secs = retry_after.as_secs() + u64::from(retry_after.subsec_nanos() > 0);
    secs.max(1)
}

fn client_ip(request: &Request) -> IpAddr {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
}

/// Middleware rejecting clients over their per-window budget
pub async fn rate_limit(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let client = client_ip(&request);

    match state.limiter.check(client) {
        RateLimitDecision::Allowed => Ok(next.run(request).await),
        RateLimitDecision::Limited { retry_after } => {
            warn!("Rate limit exceeded for {} on {}", client, request.uri().path());
            Err(AppError::RateLimited {
                limit: state.limiter.max_requests(),
                retry_after_secs: retry_after_secs(retry_after),
            })
        }
    }
}
