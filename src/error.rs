use thiserror::Error;

/// Errors raised while configuring a shot or assembling a task summary
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Invalid status code: {0} (expected 100-599)")]
    InvalidStatusCode(u16),

    #[error("Status codes configured as both success and failure: {0:?}")]
    OverlappingStatusCodes(Vec<u16>),

    #[error("Invalid status code list: {0}")]
    InvalidStatusCodeList(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("URL does not have a valid hostname: {0}")]
    MissingHost(String),
}

pub type Result<T> = std::result::Result<T, Error>;
