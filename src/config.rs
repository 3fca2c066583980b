use std::collections::BTreeSet;
use std::ops::RangeInclusive;
use serde::Deserialize;

use crate::error::{ Error, Result };

const STATUS_CODE_RANGE: RangeInclusive<u16> = 100..=599; // anything outside is not an HTTP status
const DEFAULT_SUCCESS_CODES: RangeInclusive<u16> = 200..=299; // "2xx" when no success list is given
const CLASS_SUFFIX: &str = "xx"; // shorthand suffix, e.g. 2xx

/// Status-code policy shared (read-only) by every hit of a shot.
///
/// A code is classified by the two sets: explicit failure codes first, then
/// success codes. When no success list is configured every 2xx code counts as
/// success, and failure codes inside 2xx are carved out of that default.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "RawShotConfig")]
pub struct ShotConfig {
    failed_status_codes: BTreeSet<u16>, // always classified failed
    success_status_codes: Option<BTreeSet<u16>>, // None means the 2xx default
}

impl ShotConfig {
    /*-------------------- Public Functions -------------------*/
    /// Build a validated config. Explicit success and failure sets must not intersect.
    pub fn new(
        failed_status_codes: BTreeSet<u16>,
        success_status_codes: Option<BTreeSet<u16>>
    ) -> Result<Self> {
        Self::check_codes(&failed_status_codes)?;

        if let Some(success) = &success_status_codes {
            Self::check_codes(success)?;
            let overlap: Vec<u16> = failed_status_codes.intersection(success).copied().collect();
            if !overlap.is_empty() {
                return Err(Error::OverlappingStatusCodes(overlap));
            }
        }

        Ok(Self {
            failed_status_codes,
            success_status_codes,
        })
    }

    /// Build a config from list text such as `"500-599,429"` and `"2xx,304"`
    pub fn from_lists(failed: &str, success: Option<&str>) -> Result<Self> {
        let failed = parse_status_codes(failed)?;
        let success = success.map(parse_status_codes).transpose()?;
        Self::new(failed, success)
    }

    pub fn failed_status_codes(&self) -> &BTreeSet<u16> {
        &self.failed_status_codes
    }

    /// Effective success set: the explicit list, or every 2xx code
    pub fn success_status_codes(&self) -> BTreeSet<u16> {
        match &self.success_status_codes {
            Some(codes) => codes.clone(),
            None => DEFAULT_SUCCESS_CODES.collect(),
        }
    }

    pub fn has_default_success_codes(&self) -> bool {
        self.success_status_codes.is_none()
    }

    pub fn is_failed_code(&self, code: u16) -> bool {
        self.failed_status_codes.contains(&code)
    }

    // checked without materialising the default set, this sits on the per-hit path
    pub fn is_success_code(&self, code: u16) -> bool {
        match &self.success_status_codes {
            Some(codes) => codes.contains(&code),
            None => DEFAULT_SUCCESS_CODES.contains(&code),
        }
    }

    /*---------------- Private/Helpers ------------------*/
    fn check_codes(codes: &BTreeSet<u16>) -> Result<()> {
        match codes.iter().find(|&&code| !STATUS_CODE_RANGE.contains(&code)) {
            Some(&code) => Err(Error::InvalidStatusCode(code)),
            None => Ok(()),
        }
    }
}

/// Parse a comma separated status-code list.
///
/// Each entry is a single code (`404`), an inclusive range (`500-504`) or a
/// class shorthand (`5xx`). Whitespace and empty entries are ignored.
pub fn parse_status_codes(text: &str) -> Result<BTreeSet<u16>> {
    let mut codes = BTreeSet::new();

    for entry in text.split(',').map(str::trim) {
        if entry.is_empty() {
            continue;
        }
        let range = parse_entry(entry)?;
        if !STATUS_CODE_RANGE.contains(range.start()) {
            return Err(Error::InvalidStatusCode(*range.start()));
        }
        if !STATUS_CODE_RANGE.contains(range.end()) {
            return Err(Error::InvalidStatusCode(*range.end()));
        }
        codes.extend(range);
    }

    Ok(codes)
}

// one list entry as an inclusive range (a single code is a range of one)
fn parse_entry(entry: &str) -> Result<RangeInclusive<u16>> {
    let invalid = || Error::InvalidStatusCodeList(entry.to_string());

    let lowered = entry.to_ascii_lowercase();
    if let Some(class) = lowered.strip_suffix(CLASS_SUFFIX) {
        // only a single leading digit makes sense here (1xx..5xx)
        if class.len() != 1 {
            return Err(invalid());
        }
        let digit: u16 = class.parse().map_err(|_| invalid())?;
        return Ok(digit * 100..=digit * 100 + 99);
    }

    if let Some((low, high)) = entry.split_once('-') {
        let low: u16 = low.trim().parse().map_err(|_| invalid())?;
        let high: u16 = high.trim().parse().map_err(|_| invalid())?;
        if low > high {
            return Err(invalid());
        }
        return Ok(low..=high);
    }

    let code: u16 = entry.parse().map_err(|_| invalid())?;
    Ok(code..=code)
}

/* ---------------------------------------------------------------------------
 * Deserialization goes through ShotConfig::new so a loaded config is held to
 * the same rules. Each list may be an integer array or list text.
 * ------------------------------------------------------------------------ */
#[derive(Deserialize)]
#[serde(untagged)]
enum StatusCodes {
    Codes(Vec<u16>),
    Text(String),
}

impl StatusCodes {
    fn into_set(self) -> Result<BTreeSet<u16>> {
        match self {
            StatusCodes::Codes(codes) => Ok(codes.into_iter().collect()),
            StatusCodes::Text(text) => parse_status_codes(&text),
        }
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawShotConfig {
    #[serde(default)]
    failed_status_codes: Option<StatusCodes>,
    #[serde(default)]
    success_status_codes: Option<StatusCodes>,
}

impl TryFrom<RawShotConfig> for ShotConfig {
    type Error = Error;

    fn try_from(raw: RawShotConfig) -> Result<Self> {
        let failed = match raw.failed_status_codes {
            Some(codes) => codes.into_set()?,
            None => BTreeSet::new(),
        };
        let success = raw.success_status_codes.map(StatusCodes::into_set).transpose()?;
        ShotConfig::new(failed, success)
    }
}
