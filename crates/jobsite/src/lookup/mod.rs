//! Best-effort outbound helpers: manual search and download, price
//! sniffing. Every call returns a [`BestEffort`]; nothing here raises to the
//! caller.

pub mod manuals;
pub mod price;

use std::time::Duration;

use reqwest::blocking::Client;
use serde::Serialize;

use crate::config::SearchConfig;
use crate::error::LookupError;

pub use manuals::{parse_results, ManualFinder, SearchHit};
pub use price::{find_price, PriceSniffer};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Blocking client shared by the lookup helpers. Per-request deadlines are
/// set by the callers from [`SearchConfig`].
pub(crate) fn http_client(config: &SearchConfig) -> Result<Client, LookupError> {
    Ok(Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .user_agent(config.user_agent.clone())
        .build()?)
}

/// Only absolute http(s) URLs are fetched.
pub(crate) fn parse_http_url(url: &str) -> Result<reqwest::Url, LookupError> {
    let parsed =
        reqwest::Url::parse(url.trim()).map_err(|_| LookupError::InvalidUrl(url.to_string()))?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        _ => Err(LookupError::InvalidUrl(url.to_string())),
    }
}

/// Coarse reason a best-effort call produced no usable value. Callers
/// branch on [`BestEffort::is_ok`] only; the kind is for notices and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Network,
    HttpStatus(u16),
    Parse,
    Io,
    InvalidInput,
    Unavailable,
}

impl From<&LookupError> for FailureKind {
    fn from(error: &LookupError) -> Self {
        match error {
            LookupError::Http(e) => match e.status() {
                Some(status) => FailureKind::HttpStatus(status.as_u16()),
                None => FailureKind::Network,
            },
            LookupError::Status(code) => FailureKind::HttpStatus(*code),
            LookupError::InvalidUrl(_) => FailureKind::InvalidInput,
            LookupError::Parse(_) => FailureKind::Parse,
            LookupError::Io { .. } => FailureKind::Io,
            LookupError::Extraction(_) => FailureKind::Parse,
            LookupError::Unavailable(_) => FailureKind::Unavailable,
        }
    }
}

impl std::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FailureKind::Network => write!(f, "network unreachable"),
            FailureKind::HttpStatus(code) => write!(f, "server answered {}", code),
            FailureKind::Parse => write!(f, "unexpected response"),
            FailureKind::Io => write!(f, "file error"),
            FailureKind::InvalidInput => write!(f, "invalid input"),
            FailureKind::Unavailable => write!(f, "not available in this build"),
        }
    }
}

/// A value that is always present (possibly empty) plus the reason it may
/// be empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BestEffort<T> {
    pub value: T,
    pub failure: Option<FailureKind>,
}

impl<T> BestEffort<T> {
    pub fn ok(value: T) -> Self {
        Self {
            value,
            failure: None,
        }
    }

    pub fn failed(value: T, kind: FailureKind) -> Self {
        Self {
            value,
            failure: Some(kind),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.failure.is_none()
    }

    pub fn into_value(self) -> T {
        self.value
    }
}

impl<T: Default> BestEffort<T> {
    /// Folds a fallible call into a best-effort result, logging the failure
    /// under `what`.
    pub fn from_result(what: &str, result: Result<T, LookupError>) -> Self {
        match result {
            Ok(value) => Self::ok(value),
            Err(e) => {
                log::warn!("{} failed: {}", what, e);
                Self::failed(T::default(), FailureKind::from(&e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_from_result_ok() {
        let result: BestEffort<Vec<u8>> = BestEffort::from_result("fetch", Ok(vec![1, 2]));
        assert!(result.is_ok());
        assert_eq!(result.into_value(), vec![1, 2]);
    }

    #[test]
    fn test_from_result_failure_defaults_value() {
        let result: BestEffort<String> =
            BestEffort::from_result("sniff", Err(LookupError::Status(503)));
        assert!(!result.is_ok());
        assert_eq!(result.failure, Some(FailureKind::HttpStatus(503)));
        assert_eq!(result.value, "");
    }

    #[test]
    fn test_parse_http_url() {
        assert!(parse_http_url("https://example.com/manual.pdf").is_ok());
        assert!(parse_http_url("  http://example.com  ").is_ok());
        assert!(matches!(
            parse_http_url("file:///etc/passwd"),
            Err(LookupError::InvalidUrl(_))
        ));
        assert!(parse_http_url("not a url").is_err());
    }

    #[test]
    fn test_failure_kind_mapping() {
        let io = LookupError::Io {
            path: PathBuf::from("/tmp/x.pdf"),
            source: std::io::Error::other("disk full"),
        };
        assert_eq!(FailureKind::from(&io), FailureKind::Io);
        assert_eq!(
            FailureKind::from(&LookupError::Unavailable("OCR")),
            FailureKind::Unavailable
        );
        assert_eq!(
            FailureKind::from(&LookupError::Parse("bad".into())),
            FailureKind::Parse
        );
        assert_eq!(
            FailureKind::from(&LookupError::InvalidUrl("x".into())),
            FailureKind::InvalidInput
        );
    }
}
