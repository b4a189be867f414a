//! Fixed-window rate limiting for write endpoints
//!
//! Callers are tracked in a bounded LRU map so memory use does not grow with
//! the number of distinct callers; the least recently seen caller is evicted
//! first.

use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::{config::RateLimitConfig, Error, Result};

#[derive(Debug, Clone, Copy)]
struct Window {
    started_at: Instant,
    count: u32,
}

pub struct RateLimiter {
    enabled: bool,
    max_requests: u32,
    window: Duration,
    windows: Mutex<LruCache<String, Window>>,
}

impl RateLimiter {
    pub fn new(config: &RateLimitConfig) -> Self {
        let capacity = NonZeroUsize::new(config.capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            enabled: config.enabled,
            max_requests: config.max_requests,
            window: Duration::from_secs(config.window_seconds),
            windows: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Count one request for `key`, failing with `RateLimited` once the
    /// window's allowance is used up.
    pub fn check(&self, key: &str) -> Result<()> {
        self.check_at(key, Instant::now())
    }

    fn check_at(&self, key: &str, now: Instant) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }

        let mut windows = self
            .windows
            .lock()
            .map_err(|_| Error::Internal("rate limiter lock poisoned".to_string()))?;

        let mut window = windows.get(key).copied().unwrap_or(Window {
            started_at: now,
            count: 0,
        });

        if now.duration_since(window.started_at) >= self.window {
            window = Window {
                started_at: now,
                count: 0,
            };
        }

        if window.count >= self.max_requests {
            tracing::warn!(key = %key, "Rate limit exceeded");
            return Err(Error::RateLimited);
        }

        window.count += 1;
        windows.put(key.to_string(), window);
        Ok(())
    }

    /// Number of callers currently tracked.
    pub fn tracked(&self) -> usize {
        self.windows.lock().map(|w| w.len()).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn limiter(max_requests: u32, capacity: usize) -> RateLimiter {
        RateLimiter::new(&RateLimitConfig {
            enabled: true,
            max_requests,
            window_seconds: 60,
            capacity,
        })
    }

    #[test]
    fn allows_up_to_the_limit_then_rejects() {
        let limiter = limiter(3, 10);
        let now = Instant::now();

        for _ in 0..3 {
            limiter.check_at("user:a", now).unwrap();
        }
        assert!(matches!(
            limiter.check_at("user:a", now),
            Err(Error::RateLimited)
        ));
        // other callers have their own window
        limiter.check_at("user:b", now).unwrap();
    }

    #[test]
    fn window_resets_after_expiry() {
        let limiter = limiter(1, 10);
        let start = Instant::now();

        limiter.check_at("user:a", start).unwrap();
        assert!(limiter.check_at("user:a", start).is_err());
        limiter
            .check_at("user:a", start + Duration::from_secs(61))
            .unwrap();
    }

    #[test]
    fn capacity_bounds_tracked_callers() {
        let limiter = limiter(1, 2);
        let now = Instant::now();

        limiter.check_at("user:a", now).unwrap();
        limiter.check_at("user:b", now).unwrap();
        limiter.check_at("user:c", now).unwrap();
        assert_eq!(limiter.tracked(), 2);

        // "a" was evicted, so it starts a fresh window
        limiter.check_at("user:a", now).unwrap();
    }

    #[test]
    fn disabled_limiter_never_rejects() {
        let limiter = RateLimiter::new(&RateLimitConfig {
            enabled: false,
            ..RateLimitConfig::default()
        });
        for _ in 0..1000 {
            limiter.check("user:a").unwrap();
        }
        assert_eq!(limiter.tracked(), 0);
    }
}
