//! Performance metrics and statistics tracking for the churn risk service.

use crate::types::assessment::RiskTier;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};
use tracing::info;

/// Metrics collector for assessment requests
pub struct AssessmentMetrics {
    /// Total successful assessments
    pub assessments: AtomicU64,
    /// Total rejected requests
    pub failures: AtomicU64,
    /// Assessments by risk tier
    by_tier: RwLock<HashMap<RiskTier, u64>>,
    /// Rejections by error kind
    failures_by_kind: RwLock<HashMap<&'static str, u64>>,
    /// Processing times (in microseconds)
    processing_times: RwLock<Vec<u64>>,
    /// Churn probability distribution buckets
    probability_buckets: RwLock<[u64; 10]>,
    /// Start time for rate calculation
    start_time: Instant,
}

impl AssessmentMetrics {
    pub fn new() -> Self {
        Self {
            assessments: AtomicU64::new(0),
            failures: AtomicU64::new(0),
            by_tier: RwLock::new(HashMap::new()),
            failures_by_kind: RwLock::new(HashMap::new()),
            processing_times: RwLock::new(Vec::with_capacity(1000)),
            probability_buckets: RwLock::new([0; 10]),
            start_time: Instant::now(),
        }
    }

    /// Record a completed assessment
    pub fn record_assessment(&self, processing_time: Duration, probability: f64, tier: RiskTier) {
        self.assessments.fetch_add(1, Ordering::Relaxed);
        self.record_time(processing_time);

        let bucket = ((probability * 10.0) as usize).min(9);
        if let Ok(mut buckets) = self.probability_buckets.write() {
            buckets[bucket] += 1;
        }

        if let Ok(mut by_tier) = self.by_tier.write() {
            *by_tier.entry(tier).or_insert(0) += 1;
        }
    }

    /// Record a rejected request
    pub fn record_failure(&self, processing_time: Duration, kind: &'static str) {
        self.failures.fetch_add(1, Ordering::Relaxed);
        self.record_time(processing_time);

        if let Ok(mut by_kind) = self.failures_by_kind.write() {
            *by_kind.entry(kind).or_insert(0) += 1;
        }
    }

    fn record_time(&self, processing_time: Duration) {
        if let Ok(mut times) = self.processing_times.write() {
            times.push(processing_time.as_micros() as u64);
            // Keep only last 10000 for memory efficiency
            if times.len() > 10000 {
                times.drain(0..5000);
            }
        }
    }

    /// Get processing time statistics
    pub fn processing_stats(&self) -> ProcessingStats {
        let mut sorted = match self.processing_times.read() {
            Ok(times) => times.clone(),
            Err(_) => return ProcessingStats::default(),
        };
        if sorted.is_empty() {
            return ProcessingStats::default();
        }
        sorted.sort_unstable();

        let sum: u64 = sorted.iter().sum();
        let count = sorted.len();
        let percentile = |q: f64| sorted[((count as f64 * q) as usize).min(count - 1)];

        ProcessingStats {
            count: count as u64,
            mean_us: sum / count as u64,
            p50_us: percentile(0.50),
            p95_us: percentile(0.95),
            p99_us: percentile(0.99),
            max_us: sorted[count - 1],
        }
    }

    /// Requests handled per second since start
    pub fn throughput(&self) -> f64 {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        let handled =
            self.assessments.load(Ordering::Relaxed) + self.failures.load(Ordering::Relaxed);
        if elapsed > 0.0 {
            handled as f64 / elapsed
        } else {
            0.0
        }
    }

    pub fn probability_distribution(&self) -> [u64; 10] {
        self.probability_buckets
            .read()
            .map(|buckets| *buckets)
            .unwrap_or_default()
    }

    pub fn assessments_by_tier(&self) -> HashMap<RiskTier, u64> {
        self.by_tier
            .read()
            .map(|by_tier| by_tier.clone())
            .unwrap_or_default()
    }

    pub fn failures_by_kind(&self) -> HashMap<&'static str, u64> {
        self.failures_by_kind
            .read()
            .map(|by_kind| by_kind.clone())
            .unwrap_or_default()
    }

    /// Print summary statistics
    pub fn print_summary(&self) {
        let assessed = self.assessments.load(Ordering::Relaxed);
        let failed = self.failures.load(Ordering::Relaxed);
        let processing = self.processing_stats();
        let by_tier = self.assessments_by_tier();

        info!(
            assessed,
            failed,
            throughput = format!("{:.1} req/s", self.throughput()),
            mean_us = processing.mean_us,
            p50_us = processing.p50_us,
            p95_us = processing.p95_us,
            p99_us = processing.p99_us,
            max_us = processing.max_us,
            "Churn service metrics"
        );

        for tier in [
            RiskTier::Critical,
            RiskTier::High,
            RiskTier::Medium,
            RiskTier::Low,
        ] {
            let count = by_tier.get(&tier).copied().unwrap_or(0);
            let pct = if assessed > 0 {
                (count as f64 / assessed as f64) * 100.0
            } else {
                0.0
            };
            info!(tier = %tier, count, "{:>5.1}% of assessments", pct);
        }

        for (kind, count) in self.failures_by_kind() {
            info!(kind, count, "Rejected requests");
        }

        let distribution = self.probability_distribution();
        let total: u64 = distribution.iter().sum();
        for (i, &count) in distribution.iter().enumerate() {
            let pct = if total > 0 {
                (count as f64 / total as f64) * 100.0
            } else {
                0.0
            };
            let bar = "█".repeat(((pct / 2.0) as usize).min(20));
            info!(
                "  {:.1}-{:.1}: {:>6} ({:>5.1}%) {}",
                i as f64 / 10.0,
                (i + 1) as f64 / 10.0,
                count,
                pct,
                bar
            );
        }
    }
}

impl Default for AssessmentMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Processing time statistics
#[derive(Debug, Default)]
pub struct ProcessingStats {
    pub count: u64,
    pub mean_us: u64,
    pub p50_us: u64,
    pub p95_us: u64,
    pub p99_us: u64,
    pub max_us: u64,
}

/// Prints a metrics summary on a fixed interval
pub struct MetricsReporter {
    metrics: Arc<AssessmentMetrics>,
    interval_secs: u64,
}

impl MetricsReporter {
    pub fn new(metrics: Arc<AssessmentMetrics>, interval_secs: u64) -> Self {
        Self {
            metrics,
            interval_secs,
        }
    }

    /// Start the periodic reporting task
    pub async fn start(self) {
        let mut interval = tokio::time::interval(Duration::from_secs(self.interval_secs.max(1)));
        // The first tick completes immediately
        interval.tick().await;
        loop {
            interval.tick().await;
            self.metrics.print_summary();
        }
    }
}
