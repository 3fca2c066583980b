use serde::Serialize;
use url::Url;

use crate::error::{ Error, Result };
use crate::report::StageReport;

const DEFAULT_PORT: u16 = 80; // when the scheme has no known default

/// Final numbers of a run, handed to whatever renders them
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskSummary {
    pub hostname: String, // host of the target url
    pub port: u16, // explicit port or the scheme default
    pub concurrency: usize, // concurrency level

    pub total_requests: u64,
    pub complete_requests: u64,
    pub failed_requests: u64,
    pub availability: f64, // percent of complete requests
    pub requests_per_second: f64,
    pub total_transferred: u64, // response bytes
    pub total_time: f64, // wall-clock seconds from first start to last end
}

impl TaskSummary {
    /// Combine closed stages (or per-worker shards) into the run summary
    pub fn from_stages(target: &str, concurrency: usize, stages: &[StageReport]) -> Result<Self> {
        let (hostname, port) = Self::host_and_port(target)?;

        let mut stages = stages.iter();
        let combined = match stages.next() {
            Some(first) => {
                let mut combined = first.clone();
                for stage in stages {
                    combined.merge(stage);
                }
                combined
            }
            None => {
                tracing::warn!("No stages recorded for {}, summary is empty", target);
                return Ok(Self::empty(hostname, port, concurrency));
            }
        };

        let summary = Self {
            hostname,
            port,
            concurrency,
            total_requests: combined.count(),
            complete_requests: combined.complete_requests(),
            failed_requests: combined.failed_requests(),
            availability: combined.availability(),
            requests_per_second: combined.requests_per_second(),
            total_transferred: combined.total_transferred(),
            total_time: combined.window().as_secs_f64(),
        };

        tracing::info!(
            "Summary for {}:{}: {} requests, {:.2}% available, {:.2} req/s",
            summary.hostname,
            summary.port,
            summary.total_requests,
            summary.availability,
            summary.requests_per_second
        );
        Ok(summary)
    }

    fn empty(hostname: String, port: u16, concurrency: usize) -> Self {
        Self {
            hostname,
            port,
            concurrency,
            total_requests: 0,
            complete_requests: 0,
            failed_requests: 0,
            availability: 0.0,
            requests_per_second: 0.0,
            total_transferred: 0,
            total_time: 0.0,
        }
    }

    fn host_and_port(target: &str) -> Result<(String, u16)> {
        let parsed = Url::parse(target).map_err(|e| Error::InvalidUrl(format!("{}: {}", target, e)))?;
        let hostname = parsed
            .host_str()
            .ok_or_else(|| Error::MissingHost(target.to_string()))?;
        let port = parsed.port_or_known_default().unwrap_or(DEFAULT_PORT);
        Ok((hostname.to_string(), port))
    }
}
