use serde::Serialize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Instant;

pub struct Metrics {
    // Counters
    total_requests: AtomicUsize,
    successful_requests: AtomicUsize,
    failed_requests: AtomicUsize,

    // Timing (in microseconds)
    total_extract_time_us: AtomicU64,
    total_query_time_us: AtomicU64,
    total_story_time_us: AtomicU64,

    // Counts
    total_articles_extracted: AtomicUsize,
    total_entities_extracted: AtomicUsize,
    total_queries: AtomicUsize,
    total_stories: AtomicUsize,
}

impl Metrics {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            total_requests: AtomicUsize::new(0),
            successful_requests: AtomicUsize::new(0),
            failed_requests: AtomicUsize::new(0),
            total_extract_time_us: AtomicU64::new(0),
            total_query_time_us: AtomicU64::new(0),
            total_story_time_us: AtomicU64::new(0),
            total_articles_extracted: AtomicUsize::new(0),
            total_entities_extracted: AtomicUsize::new(0),
            total_queries: AtomicUsize::new(0),
            total_stories: AtomicUsize::new(0),
        })
    }

    pub fn record_request(&self, success: bool) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        if success {
            self.successful_requests.fetch_add(1, Ordering::Relaxed);
        } else {
            self.failed_requests.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_extract(&self, duration: std::time::Duration, entities: usize) {
        self.total_extract_time_us
            .fetch_add(duration.as_micros() as u64, Ordering::Relaxed);
        self.total_articles_extracted.fetch_add(1, Ordering::Relaxed);
        self.total_entities_extracted
            .fetch_add(entities, Ordering::Relaxed);
    }

    pub fn record_query(&self, duration: std::time::Duration) {
        self.total_query_time_us
            .fetch_add(duration.as_micros() as u64, Ordering::Relaxed);
        self.total_queries.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_story(&self, duration: std::time::Duration) {
        self.total_story_time_us
            .fetch_add(duration.as_micros() as u64, Ordering::Relaxed);
        self.total_stories.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            total_requests: self.total_requests.load(Ordering::Relaxed),
            successful_requests: self.successful_requests.load(Ordering::Relaxed),
            failed_requests: self.failed_requests.load(Ordering::Relaxed),
            avg_extract_time_ms: avg_time_ms(
                &self.total_extract_time_us,
                &self.total_articles_extracted,
            ),
            avg_query_time_ms: avg_time_ms(&self.total_query_time_us, &self.total_queries),
            avg_story_time_ms: avg_time_ms(&self.total_story_time_us, &self.total_stories),
            total_articles_extracted: self.total_articles_extracted.load(Ordering::Relaxed),
            total_entities_extracted: self.total_entities_extracted.load(Ordering::Relaxed),
        }
    }
}

fn avg_time_ms(total_us: &AtomicU64, count: &AtomicUsize) -> f64 {
    let total = total_us.load(Ordering::Relaxed) as f64;
    let cnt = count.load(Ordering::Relaxed) as f64;
    if cnt > 0.0 {
        total / cnt / 1000.0 // Convert to ms
    } else {
        0.0
    }
}

#[derive(Debug, Serialize)]
pub struct MetricsSnapshot {
    pub total_requests: usize,
    pub successful_requests: usize,
    pub failed_requests: usize,
    pub avg_extract_time_ms: f64,
    pub avg_query_time_ms: f64,
    pub avg_story_time_ms: f64,
    pub total_articles_extracted: usize,
    pub total_entities_extracted: usize,
}

pub struct TimedOperation {
    start: Instant,
}

impl TimedOperation {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> std::time::Duration {
        self.start.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn snapshot_averages_over_recorded_operations() {
        let metrics = Metrics::new();
        metrics.record_extract(Duration::from_millis(100), 5);
        metrics.record_extract(Duration::from_millis(300), 7);
        metrics.record_request(true);
        metrics.record_request(false);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.total_articles_extracted, 2);
        assert_eq!(snapshot.total_entities_extracted, 12);
        assert!((snapshot.avg_extract_time_ms - 200.0).abs() < 1.0);
        assert_eq!(snapshot.successful_requests, 1);
        assert_eq!(snapshot.failed_requests, 1);
    }

    #[test]
    fn empty_metrics_report_zero_averages() {
        let metrics = Metrics::new();
        assert_eq!(metrics.snapshot().avg_query_time_ms, 0.0);
    }
}
