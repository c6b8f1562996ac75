//! QR scanning capability
//!
//! A scanner is a single-shot source of decoded text: each call to
//! [`CodeScanner::scan`] yields one payload or reports that the scan was
//! cancelled. Camera handling lives behind this trait.

use apar_common::{Error, Result};
use async_trait::async_trait;
use reqwest::Url;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader, Lines};
use tracing::debug;

/// Query parameter carrying the asset code in shareable links
pub const LINK_PARAM: &str = "qrcode";

/// Result of one scan attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    /// Decoded asset code, trimmed
    Decoded(String),
    /// User stopped the scanner, or the source is exhausted
    Cancelled,
}

impl ScanOutcome {
    /// Normalise a raw payload
    ///
    /// Labels may encode either the bare code or a shareable link; links are
    /// reduced to their `qrcode` parameter. Blank payloads cancel.
    pub fn from_payload(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return ScanOutcome::Cancelled;
        }
        match code_from_link(trimmed) {
            Some(code) => ScanOutcome::Decoded(code),
            None => ScanOutcome::Decoded(trimmed.to_string()),
        }
    }
}

/// Single-shot code scanner
#[async_trait]
pub trait CodeScanner: Send {
    async fn scan(&mut self) -> Result<ScanOutcome>;
}

/// Scanner yielding a fixed payload once, then cancelling
#[derive(Debug, Clone)]
pub struct StaticScanner {
    payload: Option<String>,
}

impl StaticScanner {
    pub fn new(payload: impl Into<String>) -> Self {
        Self {
            payload: Some(payload.into()),
        }
    }
}

#[async_trait]
impl CodeScanner for StaticScanner {
    async fn scan(&mut self) -> Result<ScanOutcome> {
        Ok(self
            .payload
            .take()
            .map_or(ScanOutcome::Cancelled, |payload| ScanOutcome::from_payload(&payload)))
    }
}

/// Scanner reading one payload per line, e.g. from a keyboard-wedge reader on stdin
pub struct LineScanner<R> {
    lines: Lines<BufReader<R>>,
}

impl<R: AsyncRead + Unpin + Send> LineScanner<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: BufReader::new(reader).lines(),
        }
    }
}

#[async_trait]
impl<R: AsyncRead + Unpin + Send> CodeScanner for LineScanner<R> {
    async fn scan(&mut self) -> Result<ScanOutcome> {
        let line = self.lines.next_line().await?;
        debug!(received = line.is_some(), "Scanner line read");
        Ok(line.map_or(ScanOutcome::Cancelled, |line| ScanOutcome::from_payload(&line)))
    }
}

/// Extract the asset code from a shareable link, if `text` is one
pub fn code_from_link(text: &str) -> Option<String> {
    let url = Url::parse(text).ok()?;
    url.query_pairs()
        .find(|(key, _)| key == LINK_PARAM)
        .map(|(_, value)| value.trim().to_string())
        .filter(|code| !code.is_empty())
}

/// Build a shareable link opening an asset's detail view
pub fn shareable_link(base: &str, code: &str) -> Result<String> {
    let mut url = Url::parse(base.trim())
        .map_err(|e| Error::Config(format!("Invalid share base URL {:?}: {}", base, e)))?;
    url.query_pairs_mut().clear().append_pair(LINK_PARAM, code.trim());
    Ok(url.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payload_is_trimmed() {
        assert_eq!(
            ScanOutcome::from_payload("  APAR-001\n"),
            ScanOutcome::Decoded("APAR-001".to_string())
        );
        assert_eq!(ScanOutcome::from_payload("   "), ScanOutcome::Cancelled);
    }

    #[test]
    fn test_link_payload_reduced_to_code() {
        assert_eq!(
            ScanOutcome::from_payload("https://apar.example/index.html?qrcode=APAR%20002"),
            ScanOutcome::Decoded("APAR 002".to_string())
        );
    }

    #[test]
    fn test_link_without_code_kept_verbatim() {
        assert_eq!(code_from_link("https://apar.example/?other=1"), None);
        assert_eq!(code_from_link("APAR-001"), None);
    }

    #[test]
    fn test_shareable_link_round_trip() {
        let link = shareable_link("https://apar.example/app/?old=1", "APAR 7/B").unwrap();
        assert_eq!(link, "https://apar.example/app/?qrcode=APAR+7%2FB");
        assert_eq!(code_from_link(&link), Some("APAR 7/B".to_string()));
    }

    #[test]
    fn test_shareable_link_rejects_bad_base() {
        assert!(matches!(shareable_link("not a url", "A1"), Err(Error::Config(_))));
    }

    #[tokio::test]
    async fn test_static_scanner_yields_once() {
        let mut scanner = StaticScanner::new("A1");
        assert_eq!(scanner.scan().await.unwrap(), ScanOutcome::Decoded("A1".to_string()));
        assert_eq!(scanner.scan().await.unwrap(), ScanOutcome::Cancelled);
    }

    #[tokio::test]
    async fn test_line_scanner_reads_until_eof() {
        let input: &[u8] = b"A1\n\nA2\n";
        let mut scanner = LineScanner::new(input);
        assert_eq!(scanner.scan().await.unwrap(), ScanOutcome::Decoded("A1".to_string()));
        assert_eq!(scanner.scan().await.unwrap(), ScanOutcome::Cancelled);
        assert_eq!(scanner.scan().await.unwrap(), ScanOutcome::Decoded("A2".to_string()));
        assert_eq!(scanner.scan().await.unwrap(), ScanOutcome::Cancelled);
    }
}
