use std::time::{ Duration, SystemTime };
use serde::Serialize;

use crate::classify::{ classify, Outcome };
use crate::hit::Hit;

/// Running statistics for one stage of a run.
///
/// A stage is opened by its first hit (`StageReport::new`) and every later hit
/// goes through `update`. Nothing per-hit is kept, so memory stays constant no
/// matter how long the stage runs. Latencies are in seconds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageReport {
    count: u64, // hits observed
    start_time: SystemTime, // start of the first hit
    end_time: SystemTime, // end of the most recently recorded hit

    min_time: f64,
    max_time: f64,
    total_time: f64, // sum of all latencies

    complete_requests: u64,
    failed_requests: u64,
    total_transferred: u64, // response bytes
}

impl StageReport {
    /*------------------==| Public Functions |==-------------------------*/
    /// Open a stage from its first hit
    pub fn new(hit: &Hit) -> Self {
        let latency = hit.latency_secs();

        let mut report = Self {
            count: 1,
            start_time: hit.start_time,
            end_time: hit.end_time,
            min_time: latency,
            max_time: latency,
            total_time: latency,
            complete_requests: 0,
            failed_requests: 0,
            total_transferred: hit.transferred(),
        };
        report.tally(hit);

        tracing::debug!("Stage opened, first hit took {:.6}s", latency);
        report
    }

    /// Fold the next hit into the stage. Hits should arrive in completion order,
    /// only the throughput window depends on it.
    pub fn update(&mut self, hit: &Hit) -> &mut Self {
        let latency = hit.latency_secs();

        self.min_time = self.min_time.min(latency);
        self.max_time = self.max_time.max(latency);
        self.total_time += latency;
        self.count += 1;
        self.total_transferred += hit.transferred();
        self.tally(hit);
        self.end_time = hit.end_time;

        tracing::trace!(count = self.count, latency, "Hit recorded");
        self
    }

    /// Fold another shard of the same stage into this one
    pub fn merge(&mut self, other: &StageReport) -> &mut Self {
        self.count += other.count;
        self.start_time = self.start_time.min(other.start_time);
        self.end_time = self.end_time.max(other.end_time);
        self.min_time = self.min_time.min(other.min_time);
        self.max_time = self.max_time.max(other.max_time);
        self.total_time += other.total_time;
        self.complete_requests += other.complete_requests;
        self.failed_requests += other.failed_requests;
        self.total_transferred += other.total_transferred;

        tracing::debug!(count = self.count, "Stage shards merged");
        self
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn complete_requests(&self) -> u64 {
        self.complete_requests
    }

    pub fn failed_requests(&self) -> u64 {
        self.failed_requests
    }

    pub fn total_transferred(&self) -> u64 {
        self.total_transferred
    }

    pub fn min_time(&self) -> f64 {
        self.min_time
    }

    pub fn max_time(&self) -> f64 {
        self.max_time
    }

    pub fn total_time(&self) -> f64 {
        self.total_time
    }

    pub fn start_time(&self) -> SystemTime {
        self.start_time
    }

    pub fn end_time(&self) -> SystemTime {
        self.end_time
    }

    /// Midpoint of the latency bounds, `(min + max) / 2`. Not a mean, see `mean_time`.
    pub fn midpoint_time(&self) -> f64 {
        (self.min_time + self.max_time) / 2.0
    }

    /// True mean latency over every hit
    pub fn mean_time(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        self.total_time / (self.count as f64)
    }

    /// Percentage of hits classified complete, 0 for an empty stage
    pub fn availability(&self) -> f64 {
        if self.count == 0 {
            return 0.0;
        }
        ((self.complete_requests as f64) * 100.0) / (self.count as f64)
    }

    /// Wall-clock span from the first start to the last recorded end
    pub fn window(&self) -> Duration {
        // an end before the start can only come from out-of-order producers
        self.end_time.duration_since(self.start_time).unwrap_or(Duration::ZERO)
    }

    /// Hits per second over `window`. A zero-width window counts as one second.
    pub fn requests_per_second(&self) -> f64 {
        let window = self.window();
        if window.is_zero() {
            self.count as f64
        } else {
            (self.count as f64) / window.as_secs_f64()
        }
    }

    /*-------------------==| Private/Helpers |==----------------------- */
    fn tally(&mut self, hit: &Hit) {
        match classify(hit) {
            Outcome::Complete => {
                self.complete_requests += 1;
            }
            Outcome::Failed => {
                self.failed_requests += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use std::sync::Arc;
    use crate::config::ShotConfig;

    const EPSILON: f64 = 1e-9;

    fn at(millis: u64) -> SystemTime {
        SystemTime::UNIX_EPOCH + Duration::from_millis(millis)
    }

    fn ok_hit(shot: &Arc<ShotConfig>, start: u64, end: u64, bytes: u64) -> Hit {
        Hit::new(shot.clone(), at(start), at(end))
            .with_request("GET", "http://localhost/")
            .with_response(200, bytes)
    }

    fn only_200() -> Arc<ShotConfig> {
        let success: BTreeSet<u16> = [200].into_iter().collect();
        Arc::new(ShotConfig::new(BTreeSet::new(), Some(success)).unwrap())
    }

    #[test]
    fn test_latency_scenario() {
        let shot = only_200();
        let mut report = StageReport::new(&ok_hit(&shot, 0, 100, 10));
        report.update(&ok_hit(&shot, 100, 600, 20)).update(&ok_hit(&shot, 600, 900, 30));

        assert_eq!(report.count(), 3);
        assert!((report.min_time() - 0.1).abs() < EPSILON);
        assert!((report.max_time() - 0.5).abs() < EPSILON);
        assert!((report.midpoint_time() - 0.3).abs() < EPSILON);
        assert!((report.mean_time() - 0.3).abs() < EPSILON);
        assert_eq!(report.complete_requests(), 3);
        assert_eq!(report.failed_requests(), 0);
        assert_eq!(report.availability(), 100.0);
        assert_eq!(report.total_transferred(), 60);
    }

    #[test]
    fn test_midpoint_differs_from_mean() {
        let shot = only_200();
        let mut report = StageReport::new(&ok_hit(&shot, 0, 100, 0));
        report.update(&ok_hit(&shot, 0, 100, 0)).update(&ok_hit(&shot, 0, 700, 0));

        assert!((report.midpoint_time() - 0.4).abs() < EPSILON);
        assert!((report.mean_time() - 0.3).abs() < EPSILON);
        assert!((report.total_time() - 0.9).abs() < EPSILON);
    }

    #[test]
    fn test_missing_response_counts_failed() {
        let shot = only_200();
        let mut report = StageReport::new(&ok_hit(&shot, 0, 10, 100));
        report.update(&Hit::new(shot.clone(), at(10), at(5010)).with_request("GET", "http://x/"));
        report.update(&ok_hit(&shot, 20, 30, 100));

        assert_eq!(report.complete_requests(), 2);
        assert_eq!(report.failed_requests(), 1);
        assert_eq!(report.total_transferred(), 200);
        assert!((report.max_time() - 5.0).abs() < EPSILON);
    }

    #[test]
    fn test_availability_seventy_percent() {
        let shot = only_200();
        let mut report = StageReport::new(&ok_hit(&shot, 0, 1, 0));
        for i in 1..7 {
            report.update(&ok_hit(&shot, i, i + 1, 0));
        }
        for i in 7..10 {
            report.update(&ok_hit(&shot, i, i + 1, 0).with_response(500, 0));
        }

        assert_eq!(report.count(), 10);
        assert_eq!(report.failed_requests(), 3);
        assert_eq!(report.availability(), 70.0);
    }

    #[test]
    fn test_throughput_over_window() {
        let shot = only_200();
        let mut report = StageReport::new(&ok_hit(&shot, 0, 200, 0));
        for i in 1..10 {
            report.update(&ok_hit(&shot, i * 200, (i + 1) * 200, 0));
        }

        assert_eq!(report.window(), Duration::from_secs(2));
        assert_eq!(report.requests_per_second(), 5.0);
    }

    #[test]
    fn test_throughput_degenerate_window() {
        let shot = only_200();
        let mut report = StageReport::new(&ok_hit(&shot, 500, 500, 0));
        for _ in 0..3 {
            report.update(&ok_hit(&shot, 500, 500, 0));
        }

        assert!(report.window().is_zero());
        assert_eq!(report.requests_per_second(), 4.0);
    }

    #[test]
    fn test_out_of_order_end_falls_back() {
        let shot = only_200();
        let mut report = StageReport::new(&ok_hit(&shot, 1000, 2000, 0));
        report.update(&ok_hit(&shot, 0, 500, 0));

        // last recorded end precedes the stage start
        assert!(report.window().is_zero());
        assert_eq!(report.requests_per_second(), 2.0);
    }

    #[test]
    fn test_merge_shards() {
        let shot = only_200();
        let mut left = StageReport::new(&ok_hit(&shot, 0, 100, 10));
        left.update(&ok_hit(&shot, 100, 400, 10));

        let mut right = StageReport::new(&ok_hit(&shot, 50, 70, 5));
        right.update(&Hit::new(shot.clone(), at(70), at(2050)));

        left.merge(&right);

        assert_eq!(left.count(), 4);
        assert_eq!(left.complete_requests(), 3);
        assert_eq!(left.failed_requests(), 1);
        assert_eq!(left.total_transferred(), 25);
        assert_eq!(left.start_time(), at(0));
        assert_eq!(left.end_time(), at(2050));
        assert!((left.min_time() - 0.02).abs() < EPSILON);
        assert!((left.max_time() - 1.98).abs() < EPSILON);
        assert!((left.requests_per_second() - 4.0 / 2.05).abs() < EPSILON);
    }
}
