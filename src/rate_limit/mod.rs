mod shared;
mod sliding;

pub use shared::CounterLimiter;
pub use sliding::SlidingWindowLimiter;

use std::time::Duration;

// Outcome of one limiter check. `remaining` is None when the backend could
// not count the request (shared store down, request let through).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Admission {
    pub limited: bool,
    pub remaining: Option<u32>,
}

// Submission rate limiter, one backend chosen at start-up
pub enum RateLimiter {
    Memory(SlidingWindowLimiter),
    Shared(CounterLimiter),
}

impl RateLimiter {
    // An allowed request is recorded against `identifier` in the same step
    pub async fn check(&self, identifier: &str) -> Admission {
        match self {
            RateLimiter::Memory(limiter) => limiter.check(identifier),
            RateLimiter::Shared(limiter) => limiter.check(identifier).await,
        }
    }

    pub fn limit(&self) -> u32 {
        match self {
            RateLimiter::Memory(limiter) => limiter.limit(),
            RateLimiter::Shared(limiter) => limiter.limit(),
        }
    }

    pub fn window(&self) -> Duration {
        match self {
            RateLimiter::Memory(limiter) => limiter.window(),
            RateLimiter::Shared(limiter) => limiter.window(),
        }
    }

    pub fn backend_name(&self) -> &'static str {
        match self {
            RateLimiter::Memory(_) => "memory",
            RateLimiter::Shared(_) => "shared",
        }
    }
}
