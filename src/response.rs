//! Parsing raw API responses: timing metadata and server error detection.

use crate::error::{ApiError, Result};
use crate::xml::Document;
use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::{debug, warn};

/// Timestamp format used throughout the API
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Parse an API timestamp (`YYYY-MM-DD HH:MM:SS`, UTC)
pub fn parse_time(value: &str) -> Option<DateTime<Utc>> {
    NaiveDateTime::parse_from_str(value.trim(), TIME_FORMAT)
        .ok()
        .map(|naive| naive.and_utc())
}

/// A successfully parsed, error-free response
#[derive(Debug, Clone)]
pub struct Response {
    raw: String,
    document: Document,
    /// Server clock at response time, or local time if the server did not say
    pub current_time: DateTime<Utc>,
    /// Server-supplied expiry of this response, if any
    pub cached_until: Option<DateTime<Utc>>,
}

impl Response {
    /// Parse raw XML, raising the translated error if the server reported one.
    pub fn parse(raw: impl Into<String>) -> Result<Self> {
        let raw = raw.into();
        let document = Document::parse(&raw).map_err(|e| {
            warn!("Failed to parse XML response: {}", e);
            e
        })?;

        let current_time = document
            .find("currentTime")
            .and_then(|el| parse_time(el.text()))
            .unwrap_or_else(Utc::now);
        let cached_until = document
            .find("cachedUntil")
            .and_then(|el| parse_time(el.text()));

        if let Some(error) = document.find("error") {
            let code = error
                .attr("code")
                .and_then(|c| c.trim().parse::<u32>().ok())
                .unwrap_or(0);
            let err =
                ApiError::translate(code, error.text()).with_timing(current_time, cached_until);
            debug!("API reported error {}: {}", code, err.message);
            return Err(err.into());
        }

        Ok(Self {
            raw,
            document,
            current_time,
            cached_until,
        })
    }

    /// The untouched response text
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// The parsed document
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Consume into the parsed document
    pub fn into_document(self) -> Document {
        self.document
    }
}
