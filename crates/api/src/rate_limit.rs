use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;

/// Sliding-window request limiter keyed by client address.
#[derive(Debug, Clone)]
pub struct SlidingWindowLimiter {
    hits: Arc<Mutex<HashMap<String, VecDeque<Instant>>>>,
    window: Duration,
    max_requests: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Allowed,
    Limited { retry_after: Duration },
}

impl SlidingWindowLimiter {
    pub fn new(window: Duration, max_requests: usize) -> Self {
        Self {
            hits: Arc::new(Mutex::new(HashMap::new())),
            window,
            max_requests: max_requests.max(1),
        }
    }

    pub fn check(&self, key: &str) -> Admission {
        self.check_at(key, Instant::now())
    }

    fn check_at(&self, key: &str, now: Instant) -> Admission {
        let mut guard = self.hits.lock();
        let queue = guard.entry(key.to_string()).or_default();

        while let Some(oldest) = queue.front() {
            if now.saturating_duration_since(*oldest) >= self.window {
                queue.pop_front();
            } else {
                break;
            }
        }

        if queue.len() >= self.max_requests {
            let retry_after = queue
                .front()
                .map(|oldest| self.window.saturating_sub(now.saturating_duration_since(*oldest)))
                .unwrap_or(self.window);
            return Admission::Limited { retry_after };
        }

        queue.push_back(now);
        Admission::Allowed
    }

    /// Drops keys with no hits inside the window.
    pub fn prune(&self) {
        let now = Instant::now();
        let window = self.window;
        self.hits.lock().retain(|_, queue| {
            queue
                .back()
                .is_some_and(|latest| now.saturating_duration_since(*latest) < window)
        });
    }

    pub fn tracked_keys(&self) -> usize {
        self.hits.lock().len()
    }
}
