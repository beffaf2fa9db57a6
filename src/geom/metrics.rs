//! Opt-in timing hooks for the rebuild pipeline.
//!
//! Timing is only collected when the `build_metrics` feature is enabled and the
//! target is not WASM (`std::time::Instant` is unavailable there). Otherwise
//! every call compiles down to invoking the closure.
//!
//! # Usage
//!
//! ```ignore
//! use duct_engine::geom::{GeomMetrics, TimingBucket};
//!
//! let mut metrics = GeomMetrics::default();
//! metrics.begin();
//! let area = metrics.time(TimingBucket::Area, || estimate_area(&shells, &flanges, options));
//! if let Some(report) = metrics.end() {
//!     println!("area: {} ns", report.area_ns);
//! }
//! ```

/// Phases of a part rebuild.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimingBucket {
    /// Gauge catalog normalization and selection.
    Gauge,
    /// Frames, shells and flanges of the part.
    Geometry,
    /// Surface area estimation.
    Area,
    /// Dimension annotation geometry.
    Dimensions,
    /// Screen-space label declutter.
    Declutter,
}

/// Cumulative nanoseconds per bucket.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct GeomTimingReport {
    pub gauge_ns: u64,
    pub geometry_ns: u64,
    pub area_ns: u64,
    pub dimensions_ns: u64,
    pub declutter_ns: u64,
}

impl GeomTimingReport {
    /// Returns the total time across all buckets in nanoseconds.
    #[must_use]
    pub fn total_ns(&self) -> u64 {
        self.gauge_ns
            .saturating_add(self.geometry_ns)
            .saturating_add(self.area_ns)
            .saturating_add(self.dimensions_ns)
            .saturating_add(self.declutter_ns)
    }

    /// Returns the total time in milliseconds (for display purposes).
    #[must_use]
    pub fn total_ms(&self) -> f64 {
        self.total_ns() as f64 / 1_000_000.0
    }
}

/// Accumulator for timing rebuild phases.
///
/// Call [`begin`](Self::begin) to reset, wrap work with [`time`](Self::time),
/// and call [`end`](Self::end) to retrieve the report.
#[derive(Debug, Default)]
pub struct GeomMetrics {
    #[cfg(all(feature = "build_metrics", not(target_arch = "wasm32")))]
    report: GeomTimingReport,
}

impl GeomMetrics {
    /// Resets all timing counters to zero.
    pub fn begin(&mut self) {
        #[cfg(all(feature = "build_metrics", not(target_arch = "wasm32")))]
        {
            self.report = GeomTimingReport::default();
        }
    }

    /// Returns the accumulated timing report, or `None` if metrics are disabled.
    #[must_use]
    pub fn end(&self) -> Option<GeomTimingReport> {
        #[cfg(all(feature = "build_metrics", not(target_arch = "wasm32")))]
        {
            Some(self.report.clone())
        }
        #[cfg(not(all(feature = "build_metrics", not(target_arch = "wasm32"))))]
        {
            None
        }
    }

    /// Times the execution of `f` and accumulates the elapsed time in `bucket`.
    pub fn time<R>(&mut self, bucket: TimingBucket, f: impl FnOnce() -> R) -> R {
        #[cfg(all(feature = "build_metrics", not(target_arch = "wasm32")))]
        {
            let start = std::time::Instant::now();
            let result = f();
            let elapsed = start.elapsed();
            // Cap at u64::MAX to prevent overflow
            let nanos_u64 = elapsed.as_nanos().min(u128::from(u64::MAX)) as u64;
            self.add_to_bucket(bucket, nanos_u64);
            result
        }

        #[cfg(not(all(feature = "build_metrics", not(target_arch = "wasm32"))))]
        {
            let _ = bucket;
            f()
        }
    }

    #[cfg(all(feature = "build_metrics", not(target_arch = "wasm32")))]
    fn add_to_bucket(&mut self, bucket: TimingBucket, nanos: u64) {
        let slot = match bucket {
            TimingBucket::Gauge => &mut self.report.gauge_ns,
            TimingBucket::Geometry => &mut self.report.geometry_ns,
            TimingBucket::Area => &mut self.report.area_ns,
            TimingBucket::Dimensions => &mut self.report.dimensions_ns,
            TimingBucket::Declutter => &mut self.report.declutter_ns,
        };
        *slot = slot.saturating_add(nanos);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timing_report_total() {
        let report = GeomTimingReport {
            geometry_ns: 1000,
            area_ns: 2000,
            dimensions_ns: 3000,
            ..Default::default()
        };
        assert_eq!(report.total_ns(), 6000);
        assert!((report.total_ms() - 0.006).abs() < 1e-9);
    }

    #[test]
    fn test_time_returns_closure_result() {
        let mut metrics = GeomMetrics::default();
        metrics.begin();
        let result = metrics.time(TimingBucket::Geometry, || 42);
        assert_eq!(result, 42);
        let _ = metrics.end();
    }
}
