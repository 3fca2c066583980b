//! Streaming statistics for HTTP load tests.
//!
//! Each completed request attempt is a [`Hit`]. Hits of one stage are folded
//! into a [`StageReport`] without keeping samples around, and closed stages are
//! combined into a flat [`TaskSummary`] for display.

mod classify;
mod collector;
mod config;
mod error;
mod hit;
mod report;
mod summary;

pub use classify::{ classify, classify_status, Outcome };
pub use collector::{ spawn_collector, SharedStage };
pub use config::{ parse_status_codes, ShotConfig };
pub use error::{ Error, Result };
pub use hit::{ Hit, Request, Response };
pub use report::StageReport;
pub use summary::TaskSummary;
