use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use once_cell::sync::OnceCell;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

static TRACING_INIT: OnceCell<()> = OnceCell::new();

#[derive(Debug, Default)]
pub struct AppMetrics {
    requests_total: AtomicU64,
    quotes_total: AtomicU64,
    quotes_rejected_total: AtomicU64,
    reservations_total: AtomicU64,
    chat_total: AtomicU64,
    chat_fallback_total: AtomicU64,
    total_latency_millis: AtomicU64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub requests_total: u64,
    pub quotes_total: u64,
    pub quotes_rejected_total: u64,
    pub reservations_total: u64,
    pub chat_total: u64,
    pub chat_fallback_total: u64,
    pub avg_latency_millis: f64,
}

impl AppMetrics {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn inc_request(&self) {
        self.requests_total.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("hotel_requests_total").increment(1);
    }

    pub fn inc_quote(&self) {
        self.quotes_total.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("hotel_quotes_total").increment(1);
    }

    pub fn inc_quote_rejected(&self) {
        self.quotes_rejected_total.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("hotel_quotes_rejected_total").increment(1);
    }

    pub fn inc_reservation(&self) {
        self.reservations_total.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("hotel_reservations_total").increment(1);
    }

    pub fn inc_chat(&self) {
        self.chat_total.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("hotel_chat_total").increment(1);
    }

    pub fn inc_chat_fallback(&self) {
        self.chat_fallback_total.fetch_add(1, Ordering::Relaxed);
        metrics::counter!("hotel_chat_fallback_total").increment(1);
    }

    pub fn observe_latency(&self, duration: Duration) {
        self.total_latency_millis
            .fetch_add(duration.as_millis() as u64, Ordering::Relaxed);
        metrics::histogram!("hotel_request_latency_seconds").record(duration.as_secs_f64());
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let requests = self.requests_total.load(Ordering::Relaxed);
        let latency = self.total_latency_millis.load(Ordering::Relaxed);

        MetricsSnapshot {
            requests_total: requests,
            quotes_total: self.quotes_total.load(Ordering::Relaxed),
            quotes_rejected_total: self.quotes_rejected_total.load(Ordering::Relaxed),
            reservations_total: self.reservations_total.load(Ordering::Relaxed),
            chat_total: self.chat_total.load(Ordering::Relaxed),
            chat_fallback_total: self.chat_fallback_total.load(Ordering::Relaxed),
            avg_latency_millis: if requests == 0 {
                0.0
            } else {
                latency as f64 / requests as f64
            },
        }
    }
}

pub fn init_tracing(service_name: &str) {
    TRACING_INIT.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}=info,hotel_api=info,hotel_assistant=info",
                service_name
            ))
        });

        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_current_span(true)
            .with_span_list(true)
            .init();
    });
}
