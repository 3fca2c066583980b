use serde::Serialize;

use crate::config::ShotConfig;
use crate::hit::Hit;

/// Which tally a hit lands in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Complete,
    Failed,
}

/// Classify a hit against the config it was shot with.
///
/// No request or no response is a failure. Otherwise the status code is
/// looked up in the failure set, then the success set. A code found in
/// neither is a failure too.
pub fn classify(hit: &Hit) -> Outcome {
    match (&hit.request, &hit.response) {
        (Some(_), Some(res)) => classify_status(&hit.shot, res.status_code),
        _ => Outcome::Failed,
    }
}

pub fn classify_status(shot: &ShotConfig, status_code: u16) -> Outcome {
    if shot.is_failed_code(status_code) {
        Outcome::Failed
    } else if shot.is_success_code(status_code) {
        Outcome::Complete
    } else {
        Outcome::Failed
    }
}
