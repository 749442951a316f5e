//! Fixed-window request limits in Redis
//!
//! Limits fail open: when Redis is unreachable the request goes through and
//! the failure is logged.

use redis::aio::ConnectionManager;
use tracing::warn;
use uuid::Uuid;

const WINDOW_SECS: i64 = 3600;

#[derive(Clone)]
pub struct RateLimiter {
    redis: Option<ConnectionManager>,
    prefix: &'static str,
    max_per_window: u32,
}

impl RateLimiter {
    pub fn new(redis: Option<ConnectionManager>, prefix: &'static str, max_per_window: u32) -> Self {
        Self {
            redis,
            prefix,
            max_per_window,
        }
    }

    fn key(&self, user_id: Uuid) -> String {
        format!("{}:{}", self.prefix, user_id)
    }

    /// Count one request for `user_id`; false once the window is used up
    pub async fn allow(&self, user_id: Uuid) -> bool {
        let Some(redis) = &self.redis else {
            return true;
        };
        let mut conn = redis.clone();
        let key = self.key(user_id);

        let count = match redis::cmd("INCR")
            .arg(&key)
            .query_async::<_, i64>(&mut conn)
            .await
        {
            Ok(count) => count,
            Err(e) => {
                warn!(error = %e, "Rate limit check failed; allowing request");
                return true;
            }
        };

        // first hit in the window starts the clock
        if count == 1 {
            let expire: Result<i64, _> = redis::cmd("EXPIRE")
                .arg(&key)
                .arg(WINDOW_SECS)
                .query_async(&mut conn)
                .await;
            if let Err(e) = expire {
                warn!(error = %e, "Failed to set rate limit window");
            }
        }

        within_limit(count, self.max_per_window)
    }
}

fn within_limit(count: i64, max: u32) -> bool {
    count <= i64::from(max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_limit() {
        assert!(within_limit(1, 5));
        assert!(within_limit(5, 5));
        assert!(!within_limit(6, 5));
    }

    #[tokio::test]
    async fn test_without_redis_always_allows() {
        let limiter = RateLimiter::new(None, "support", 1);
        let user = Uuid::new_v4();
        assert!(limiter.allow(user).await);
        assert!(limiter.allow(user).await);
    }

    #[test]
    fn test_key_format() {
        let limiter = RateLimiter::new(None, "support", 5);
        let user = Uuid::nil();
        assert_eq!(
            limiter.key(user),
            "support:00000000-0000-0000-0000-000000000000"
        );
    }
}
