use std::{
    rc::Rc,
    sync::Arc,
    task::{Context, Poll},
    time::{Duration, Instant},
};

use actix_web::{
    body::BoxBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform},
    Error, HttpResponse,
};
use dashmap::DashMap;
use futures_util::future::{ok, LocalBoxFuture, Ready};
use parking_lot::Mutex;

struct Window {
    started: Instant,
    count: u64,
}

/// Fixed-window per-client request counter. Elapsed windows are swept at
/// most once per window interval, so the map stays bounded by the set of
/// clients seen within the last window.
#[derive(Clone)]
pub struct RateLimiter {
    windows: Arc<DashMap<String, Arc<Mutex<Window>>>>,
    last_sweep: Arc<Mutex<Instant>>,
    max_requests: u64,
    window: Duration,
}

impl RateLimiter {
    pub fn new(max_requests: u64, window: Duration) -> Self {
        RateLimiter {
            windows: Arc::new(DashMap::new()),
            last_sweep: Arc::new(Mutex::new(Instant::now())),
            max_requests,
            window,
        }
    }

    pub fn tracked_clients(&self) -> usize {
        self.windows.len()
    }

    /// Drops every window that has fully elapsed. Runs at most once per
    /// window interval; a contended sweep is skipped, the next check
    /// picks it up.
    fn sweep_elapsed(&self, now: Instant) {
        let mut last_sweep = match self.last_sweep.try_lock() {
            Some(guard) => guard,
            None => return,
        };
        if now.duration_since(*last_sweep) < self.window {
            return;
        }
        *last_sweep = now;

        self.windows
            .retain(|_, entry| now.duration_since(entry.lock().started) < self.window);
    }

    /// Returns (allowed, seconds until the window resets).
    pub fn check(&self, key: &str) -> (bool, u64) {
        self.sweep_elapsed(Instant::now());

        let entry = self
            .windows
            .entry(key.to_string())
            .or_insert_with(|| {
                Arc::new(Mutex::new(Window {
                    started: Instant::now(),
                    count: 0,
                }))
            })
            .clone();

        let mut window = entry.lock();
        let now = Instant::now();

        if now.duration_since(window.started) >= self.window {
            window.started = now;
            window.count = 0;
        }

        if window.count < self.max_requests {
            window.count += 1;
            (true, 0)
        } else {
            let elapsed = now.duration_since(window.started);
            let retry_after = self.window.saturating_sub(elapsed).as_secs().max(1);
            (false, retry_after)
        }
    }
}

pub struct RateLimitMiddleware {
    limiter: RateLimiter,
}

impl RateLimitMiddleware {
    pub fn new(limiter: RateLimiter) -> Self {
        RateLimitMiddleware { limiter }
    }
}

impl<S> Transform<S, ServiceRequest> for RateLimitMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<BoxBody>, Error = Error> + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type InitError = ();
    type Transform = RateLimitMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(RateLimitMiddlewareService {
            service: Rc::new(service),
            limiter: self.limiter.clone(),
        })
    }
}

pub struct RateLimitMiddlewareService<S> {
    service: Rc<S>,
    limiter: RateLimiter,
}

impl<S> Service<ServiceRequest> for RateLimitMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<BoxBody>, Error = Error> + 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, ctx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(ctx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let limiter = self.limiter.clone();

        Box::pin(async move {
            let client_key = req
                .connection_info()
                .realip_remote_addr()
                .unwrap_or("unknown")
                .to_string();

            let (allowed, retry_after) = limiter.check(&client_key);
            if !allowed {
                tracing::warn!("Rate limit exceeded for {}", client_key);
                let response = HttpResponse::TooManyRequests()
                    .insert_header(("Retry-After", retry_after.to_string()))
                    .json(serde_json::json!({
                        "success": false,
                        "error": "Too many requests, please try again later"
                    }));
                return Ok(req.into_response(response));
            }

            service.call(req).await
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requests_within_the_window_limit_are_allowed() {
        let limiter = RateLimiter::new(3, Duration::from_secs(60));

        assert!(limiter.check("10.0.0.1").0);
        assert!(limiter.check("10.0.0.1").0);
        assert!(limiter.check("10.0.0.1").0);

        let (allowed, retry_after) = limiter.check("10.0.0.1");
        assert!(!allowed);
        assert!(retry_after >= 1);
    }

    #[test]
    fn clients_are_limited_independently() {
        let limiter = RateLimiter::new(1, Duration::from_secs(60));

        assert!(limiter.check("10.0.0.1").0);
        assert!(!limiter.check("10.0.0.1").0);
        assert!(limiter.check("10.0.0.2").0);
    }

    #[test]
    fn idle_client_windows_are_reclaimed() {
        let limiter = RateLimiter::new(5, Duration::from_millis(50));

        for i in 0..1000 {
            limiter.check(&format!("10.0.{}.{}", i / 256, i % 256));
        }
        assert_eq!(limiter.tracked_clients(), 1000);

        std::thread::sleep(Duration::from_millis(120));
        limiter.check("10.1.0.1");

        assert_eq!(limiter.tracked_clients(), 1);
    }

    #[test]
    fn window_resets_after_it_elapses() {
        let limiter = RateLimiter::new(1, Duration::from_millis(10));

        assert!(limiter.check("10.0.0.1").0);
        assert!(!limiter.check("10.0.0.1").0);

        std::thread::sleep(Duration::from_millis(15));
        assert!(limiter.check("10.0.0.1").0);
    }
}
