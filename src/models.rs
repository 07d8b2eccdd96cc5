//! Data models shared by the retrieval pipeline.
//!
//! - [`SearchParameters`]: what to search for and how far back to go
//! - [`PromoItem`]: one search-result entry as read off the results page
//! - [`ArticleRecord`]: the extracted, classified article
//! - [`RetrievalResult`]: the ordered records of one retrieval and why it stopped

use crate::error::{ItemExtractionError, RetrievalError};
use chrono::{DateTime, Utc};

/// Placeholder stored in [`ArticleRecord::image_path`] when no image could be saved.
pub const IMAGE_NOT_FOUND: &str = "image not found";

/// Parameters of a single retrieval, supplied by the task runner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchParameters {
    /// Search text; may be empty.
    pub query: String,
    /// Label of the section checkbox to filter by; empty means no filter.
    pub section: String,
    /// How many calendar months back to collect articles.
    pub months: u32,
}

impl SearchParameters {
    pub fn new(query: impl Into<String>, section: impl Into<String>, months: u32) -> Self {
        Self {
            query: query.into(),
            section: section.into(),
            months,
        }
    }

    /// Reject values the loader should already have normalised.
    pub fn validate(&self) -> Result<(), RetrievalError> {
        if self.months == 0 {
            return Err(RetrievalError::InvalidParameters(
                "months must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// One promo element of a results page, captured as raw attribute/text values.
///
/// Fields are `None` when the corresponding child element was absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromoItem {
    /// `data-timestamp` attribute, epoch milliseconds.
    pub timestamp: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    /// First URL of the image `srcset`, already resolved against the page URL.
    pub image_url: Option<String>,
}

impl PromoItem {
    /// Publication instant of the promo.
    pub fn published_at(&self) -> Result<DateTime<Utc>, ItemExtractionError> {
        let raw = self
            .timestamp
            .as_deref()
            .ok_or(ItemExtractionError::MissingField("timestamp"))?;
        let trimmed = raw.trim();
        let millis = match trimmed.parse::<i64>() {
            Ok(ms) => ms,
            Err(_) => trimmed
                .parse::<f64>()
                .ok()
                .filter(|ms| ms.is_finite())
                .map(|ms| ms as i64)
                .ok_or_else(|| ItemExtractionError::BadTimestamp(raw.to_string()))?,
        };
        DateTime::from_timestamp_millis(millis)
            .ok_or_else(|| ItemExtractionError::BadTimestamp(raw.to_string()))
    }
}

/// An extracted article. Built once per promo and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleRecord {
    pub title: String,
    pub description: String,
    /// Local publication date formatted `YY-MM-DD`.
    pub published_date: String,
    /// Saved image path, or [`IMAGE_NOT_FOUND`].
    pub image_path: String,
    /// Occurrences of the query in title and description, `-1` for an empty query.
    pub query_match_count: i64,
    pub mentions_money: bool,
}

/// Why the page loop ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// An article older than the time limit was reached.
    CutOff,
    /// No next-page control was left.
    Exhausted,
    /// An unexpected navigation error ended the loop early.
    Interrupted(String),
}

/// Records of one retrieval, newest first, in the order the site listed them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrievalResult {
    pub records: Vec<ArticleRecord>,
    pub stop: StopReason,
}
