//! Admission control built on governor's keyed rate limiters.
//!
//! Four tiers sit in front of the mutating endpoints, each a quota over a
//! sliding window:
//!
//! | tier    | window | limit | key |
//! |---------|--------|-------|-----|
//! | generic | 15 min | 100   | client address |
//! | auth    | 15 min | 8     | submitted email, else client address |
//! | search  | 1 min  | 30    | client address |
//! | catalog | 60 min | 10    | client address |
//!
//! The generic tier runs as a router layer; the other tiers are checked as
//! the first statement of their handlers, before validation, because the
//! auth key needs the parsed body. Outside production every check passes
//! unconditionally so local development and tests are never throttled.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::num::NonZeroU32;
use std::time::Duration;

use axum::{
    extract::{ConnectInfo, FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::{IntoResponse, Response},
};
use governor::clock::{Clock, DefaultClock, QuantaInstant};
use governor::middleware::NoOpMiddleware;
use governor::state::keyed::DefaultKeyedStateStore;
use governor::{Quota, RateLimiter};

use crate::error::ApiError;
use crate::state::AppState;

type KeyedLimiter<K> =
    RateLimiter<K, DefaultKeyedStateStore<K>, DefaultClock, NoOpMiddleware<QuantaInstant>>;

/// Key for the auth tier: throttle per submitted email so a distributed
/// guessing run against one account is still caught, falling back to the
/// client address when no email was submitted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AuthKey {
    Email(String),
    Addr(IpAddr),
}

/// Request-rate gate for the mutating endpoints.
pub struct AdmissionControl {
    enabled: bool,
    clock: DefaultClock,
    generic: KeyedLimiter<IpAddr>,
    auth: KeyedLimiter<AuthKey>,
    search: KeyedLimiter<IpAddr>,
    catalog: KeyedLimiter<IpAddr>,
}

impl AdmissionControl {
    /// Create the gate. When `enabled` is false every check passes.
    ///
    /// # Panics
    ///
    /// This function will not panic. All tier quotas divide a nonzero
    /// window by a nonzero limit, which `Quota::with_period` always accepts.
    #[must_use]
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            clock: DefaultClock::default(),
            generic: RateLimiter::keyed(tier_quota(Duration::from_secs(15 * 60), 100)),
            auth: RateLimiter::keyed(tier_quota(Duration::from_secs(15 * 60), 8)),
            search: RateLimiter::keyed(tier_quota(Duration::from_secs(60), 30)),
            catalog: RateLimiter::keyed(tier_quota(Duration::from_secs(60 * 60), 10)),
        }
    }

    /// Generic tier, applied to every API route.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::RateLimited` when the client address exceeded its
    /// quota.
    pub fn check_generic(&self, addr: IpAddr) -> Result<(), ApiError> {
        self.check(&self.generic, addr)
    }

    /// Auth tier for register/login.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::RateLimited` when the key exceeded its quota.
    pub fn check_auth(&self, email: Option<&str>, addr: IpAddr) -> Result<(), ApiError> {
        let key = email
            .map(|e| e.trim().to_lowercase())
            .filter(|e| !e.is_empty())
            .map_or(AuthKey::Addr(addr), AuthKey::Email);
        self.check(&self.auth, key)
    }

    /// Search tier for catalog queries.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::RateLimited` when the client address exceeded its
    /// quota.
    pub fn check_search(&self, addr: IpAddr) -> Result<(), ApiError> {
        self.check(&self.search, addr)
    }

    /// Catalog tier for product creation.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::RateLimited` when the client address exceeded its
    /// quota.
    pub fn check_catalog(&self, addr: IpAddr) -> Result<(), ApiError> {
        self.check(&self.catalog, addr)
    }

    fn check<K: Clone + std::hash::Hash + Eq>(
        &self,
        limiter: &KeyedLimiter<K>,
        key: K,
    ) -> Result<(), ApiError> {
        if !self.enabled {
            return Ok(());
        }

        limiter.check_key(&key).map_err(|not_until| {
            let wait = not_until.wait_time_from(self.clock.now());
            ApiError::RateLimited {
                retry_after_secs: wait.as_secs().max(1),
            }
        })
    }
}

/// Quota replenishing `limit` cells per `window`, with the full limit
/// available as burst.
fn tier_quota(window: Duration, limit: u32) -> Quota {
    let limit = NonZeroU32::new(limit).expect("tier limits are nonzero");
    Quota::with_period(window / limit.get())
        .expect("tier windows are nonzero")
        .allow_burst(limit)
}

// =============================================================================
// Client address extraction
// =============================================================================

/// Extractor for the client address, checking proxy headers first and
/// falling back to the connection's peer address. Hermetic tests have
/// neither, so the final fallback is loopback rather than a rejection.
#[derive(Debug, Clone, Copy)]
pub struct ClientIp(pub IpAddr);

impl<S> FromRequestParts<S> for ClientIp
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let headers = &parts.headers;

        // Try X-Forwarded-For (first IP in the chain)
        if let Some(ip) = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.split(',').next())
            .and_then(|s| s.trim().parse::<IpAddr>().ok())
        {
            return Ok(Self(ip));
        }

        // Try X-Real-IP
        if let Some(ip) = headers
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .and_then(|s| s.trim().parse::<IpAddr>().ok())
        {
            return Ok(Self(ip));
        }

        // Fall back to the peer address
        if let Some(ConnectInfo(addr)) = parts.extensions.get::<ConnectInfo<SocketAddr>>() {
            return Ok(Self(addr.ip()));
        }

        Ok(Self(IpAddr::V4(Ipv4Addr::LOCALHOST)))
    }
}

/// Router layer applying the generic admission tier to every request that
/// passes through it, before any handler or validation runs.
pub async fn admission_middleware(
    State(state): State<AppState>,
    ClientIp(addr): ClientIp,
    request: Request,
    next: Next,
) -> Response {
    if let Err(err) = state.admission().check_generic(addr) {
        return err.into_response();
    }
    next.run(request).await
}
