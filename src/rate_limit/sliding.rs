use dashmap::DashMap;
use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::{Duration, Instant};
use tracing::debug;
use crate::metrics::TRACKED_CLIENTS;
use super::Admission;

// Full prune runs once this many identifiers are tracked
const DEFAULT_SWEEP_THRESHOLD: usize = 10_000;

// In-process sliding-window log limiter.
// Check, eviction and append for one identifier all happen under that key's
// DashMap shard lock, so two callers can never both take the last slot.
pub struct SlidingWindowLimiter {
    entries: DashMap<String, VecDeque<Instant>>, // identifier -> admitted instants, oldest first
    limit: u32,
    window: Duration,
    sweep_threshold: usize,
    last_sweep: Mutex<Option<Instant>>, // at most one full prune per window
}

impl SlidingWindowLimiter {
    pub fn new(limit: u32, window: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            limit,
            window,
            sweep_threshold: DEFAULT_SWEEP_THRESHOLD,
            last_sweep: Mutex::new(None),
        }
    }

    pub fn with_sweep_threshold(mut self, threshold: usize) -> Self {
        self.sweep_threshold = threshold;
        self
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    // true = reject
    #[cfg(test)]
    pub fn is_limited(&self, identifier: &str) -> bool {
        self.is_limited_at(identifier, Instant::now())
    }

    #[cfg(test)]
    pub(crate) fn is_limited_at(&self, identifier: &str, now: Instant) -> bool {
        self.check_at(identifier, now).limited
    }

    pub fn check(&self, identifier: &str) -> Admission {
        self.check_at(identifier, Instant::now())
    }

    pub(crate) fn check_at(&self, identifier: &str, now: Instant) -> Admission {
        // must not hold an entry guard here, retain() locks every shard
        if self.entries.len() > self.sweep_threshold {
            self.maybe_sweep(now);
        }

        let admission = {
            let mut log = self.entries.entry(identifier.to_string()).or_default();
            evict_expired(&mut log, now, self.window);

            let limited = log.len() >= self.limit as usize;
            if !limited {
                log.push_back(now);
            }
            Admission {
                limited,
                remaining: Some(self.limit.saturating_sub(log.len() as u32)),
            }
        };

        TRACKED_CLIENTS.set(self.tracked() as f64);
        admission
    }

    #[cfg(test)]
    pub(crate) fn remaining_at(&self, identifier: &str, now: Instant) -> u32 {
        let Some(mut log) = self.entries.get_mut(identifier) else {
            return self.limit;
        };
        evict_expired(&mut log, now, self.window);
        let used = log.len() as u32;
        drop(log);

        if used == 0 {
            self.entries.remove_if(identifier, |_, log| log.is_empty());
        }
        self.limit.saturating_sub(used)
    }

    // A sweep that frees nothing would otherwise rerun on every request
    // while the map stays over the threshold
    fn maybe_sweep(&self, now: Instant) {
        let Ok(mut last) = self.last_sweep.try_lock() else {
            return; // another caller is sweeping
        };
        if last.is_some_and(|at| now.saturating_duration_since(at) < self.window) {
            return;
        }
        *last = Some(now);
        self.sweep_at(now);
    }

    // Drops identifiers whose every timestamp has left the window
    fn sweep_at(&self, now: Instant) {
        let before = self.entries.len();
        self.entries.retain(|_, log| {
            evict_expired(log, now, self.window);
            !log.is_empty()
        });
        let removed = before.saturating_sub(self.entries.len());
        if removed > 0 {
            debug!(
                removed_entries = removed,
                remaining_entries = self.entries.len(),
                "rate limiter sweep completed"
            );
        }
    }

    pub fn tracked(&self) -> usize {
        self.entries.len()
    }
}

fn evict_expired(log: &mut VecDeque<Instant>, now: Instant, window: Duration) {
    while let Some(oldest) = log.front() {
        if now.saturating_duration_since(*oldest) >= window {
            log.pop_front();
        } else {
            break;
        }
    }
}
