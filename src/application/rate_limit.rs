use std::collections::HashMap;
use std::future::Future;
use std::net::{IpAddr, SocketAddr};
use std::pin::Pin;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::task::{Context, Poll};
use std::time::{Duration, Instant};

use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{HeaderValue, Request, StatusCode, header};
use axum::response::{IntoResponse, Response};
use tower::{Layer, Service};
use tracing::warn;

struct Bucket {
    tokens: f64,
    last_seen: Instant,
}

/// Per-IP token buckets. Each bucket starts full and refills continuously.
struct TokenBuckets {
    buckets: Mutex<HashMap<IpAddr, Bucket>>,
    capacity: f64,
    refill_per_sec: f64,
}

impl TokenBuckets {
    fn new(capacity: u32, window: Duration) -> Self {
        Self {
            buckets: Mutex::new(HashMap::new()),
            capacity: f64::from(capacity),
            refill_per_sec: f64::from(capacity) / window.as_secs_f64(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<IpAddr, Bucket>> {
        self.buckets.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn try_acquire(&self, ip: IpAddr, now: Instant) -> bool {
        let mut buckets = self.lock();
        let bucket = buckets.entry(ip).or_insert(Bucket {
            tokens: self.capacity,
            last_seen: now,
        });

        let elapsed = now.saturating_duration_since(bucket.last_seen).as_secs_f64();
        bucket.tokens = (bucket.tokens + elapsed * self.refill_per_sec).min(self.capacity);
        bucket.last_seen = now;

        if bucket.tokens >= 1.0 {
            bucket.tokens -= 1.0;
            true
        } else {
            false
        }
    }

    /// Seconds until the next token is available, for `Retry-After`.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn retry_after_secs(&self) -> u64 {
        (1.0 / self.refill_per_sec).ceil().max(1.0) as u64
    }

    /// Forget clients idle long enough that their bucket would be full again.
    fn prune(&self, now: Instant) -> usize {
        let full_after = Duration::from_secs_f64(self.capacity / self.refill_per_sec);
        let mut buckets = self.lock();
        let before = buckets.len();
        buckets.retain(|_, b| now.saturating_duration_since(b.last_seen) < full_after);
        before - buckets.len()
    }
}

/// Tower layer limiting requests per client IP.
///
/// Requests without `ConnectInfo` (no known peer address) are let through.
#[derive(Clone)]
pub struct RateLimitLayer {
    buckets: Arc<TokenBuckets>,
}

impl RateLimitLayer {
    /// Allow `requests` per minute per IP.
    pub fn per_minute(requests: u32) -> Self {
        Self {
            buckets: Arc::new(TokenBuckets::new(requests, Duration::from_secs(60))),
        }
    }

    /// Drop idle buckets; returns how many were removed.
    pub fn prune_idle(&self) -> usize {
        self.buckets.prune(Instant::now())
    }
}

impl<S> Layer<S> for RateLimitLayer {
    type Service = RateLimitService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RateLimitService {
            inner,
            buckets: Arc::clone(&self.buckets),
        }
    }
}

#[derive(Clone)]
pub struct RateLimitService<S> {
    inner: S,
    buckets: Arc<TokenBuckets>,
}

impl<S> Service<Request<Body>> for RateLimitService<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Response, S::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request<Body>) -> Self::Future {
        let buckets = Arc::clone(&self.buckets);
        let mut inner = self.inner.clone();

        Box::pin(async move {
            let ip = request
                .extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ci| ci.0.ip());

            if let Some(ip) = ip
                && !buckets.try_acquire(ip, Instant::now())
            {
                warn!(%ip, path = %request.uri().path(), "rate limit exceeded");
                let mut response = StatusCode::TOO_MANY_REQUESTS.into_response();
                if let Ok(value) = HeaderValue::from_str(&buckets.retry_after_secs().to_string())
                {
                    response.headers_mut().insert(header::RETRY_AFTER, value);
                }
                return Ok(response);
            }

            inner.call(request).await
        })
    }
}
