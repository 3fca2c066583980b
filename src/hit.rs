use std::sync::Arc;
use std::time::{ Duration, SystemTime };

use crate::config::ShotConfig;

/// The request that was dispatched for a hit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: String, // e.g GET
    pub url: String, // full target url
}

/// What came back from the server
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Response {
    pub status_code: u16,
    pub content_length: u64, // body length in bytes
}

/// One completed (or failed-to-complete) request attempt.
///
/// A hit without a request or without a response is a failed attempt, e.g a
/// connection error or a timeout.
#[derive(Debug, Clone)]
pub struct Hit {
    pub start_time: SystemTime,
    pub end_time: SystemTime,
    pub request: Option<Request>,
    pub response: Option<Response>,
    pub shot: Arc<ShotConfig>, // config in effect for this hit
}

impl Hit {
    /// A hit with neither request nor response attached
    pub fn new(shot: Arc<ShotConfig>, start_time: SystemTime, end_time: SystemTime) -> Self {
        Self {
            start_time,
            end_time,
            request: None,
            response: None,
            shot,
        }
    }

    pub fn with_request(mut self, method: impl Into<String>, url: impl Into<String>) -> Self {
        self.request = Some(Request {
            method: method.into(),
            url: url.into(),
        });
        self
    }

    pub fn with_response(mut self, status_code: u16, content_length: u64) -> Self {
        self.response = Some(Response {
            status_code,
            content_length,
        });
        self
    }

    /// Time between start and end. An end before the start is clamped to zero.
    pub fn latency(&self) -> Duration {
        match self.end_time.duration_since(self.start_time) {
            Ok(latency) => latency,
            Err(err) => {
                tracing::warn!(
                    "Hit ends {:?} before it starts, counting zero latency",
                    err.duration()
                );
                Duration::ZERO
            }
        }
    }

    pub fn latency_secs(&self) -> f64 {
        self.latency().as_secs_f64()
    }

    /// Body length of the response, 0 when nothing came back
    pub fn transferred(&self) -> u64 {
        self.response.map_or(0, |res| res.content_length)
    }
}
