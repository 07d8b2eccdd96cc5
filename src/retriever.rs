//! Retrieval orchestration: one browser session, one time-windowed crawl.
//!
//! # Flow
//!
//! 1. Open a session (fatal on failure)
//! 2. Search, sort by newest (both fatal), apply the section filter (non-fatal)
//! 3. Walk result pages newest first, extracting every promo until one is
//!    older than `now - months` calendar months, or pages run out
//! 4. Close the session, whatever happened
//!
//! Past step 2 the crawl is best-effort: a navigation error ends the page
//! loop but the records collected so far are still returned.

use crate::browser::{PageNavigator, SessionLauncher};
use crate::error::{NavigationError, RetrievalError};
use crate::extractor::ArticleExtractor;
use crate::media::ImageFetcher;
use crate::models::{RetrievalResult, SearchParameters, StopReason};
use chrono::{DateTime, Local, Months, TimeZone, Utc};
use tracing::{debug, error, info, instrument, warn};

/// The instant `months` calendar months before `now`.
///
/// Days that do not exist in the target month clamp to its last day, so one
/// month before March 31 is the last day of February. A window reaching
/// past the earliest representable date saturates at [`DateTime::MIN_UTC`].
pub fn months_before<Tz: TimeZone>(now: &DateTime<Tz>, months: u32) -> DateTime<Tz> {
    let earliest = || DateTime::<Utc>::MIN_UTC.with_timezone(&now.timezone());
    let local = now.naive_local();
    let Some(target) = local.checked_sub_months(Months::new(months)) else {
        return earliest();
    };
    now.timezone()
        .from_local_datetime(&target)
        .earliest()
        .or_else(|| now.clone().checked_sub_signed(local.signed_duration_since(target)))
        .unwrap_or_else(earliest)
}

/// Drives a [`SessionLauncher`] through a complete retrieval.
#[derive(Debug)]
pub struct NewsRetriever<L, F> {
    launcher: L,
    extractor: ArticleExtractor<F>,
}

impl<L, F> NewsRetriever<L, F>
where
    L: SessionLauncher,
    F: ImageFetcher,
{
    pub fn new(launcher: L, extractor: ArticleExtractor<F>) -> Self {
        Self {
            launcher,
            extractor,
        }
    }

    /// Retrieve every article newer than `params.months` months ago.
    pub async fn retrieve(
        &self,
        params: &SearchParameters,
    ) -> Result<RetrievalResult, RetrievalError> {
        self.retrieve_at(params, Local::now()).await
    }

    /// [`retrieve`](Self::retrieve) with an explicit "now".
    #[instrument(level = "info", skip_all, fields(query = %params.query, section = %params.section, months = params.months))]
    pub async fn retrieve_at(
        &self,
        params: &SearchParameters,
        now: DateTime<Local>,
    ) -> Result<RetrievalResult, RetrievalError> {
        params.validate()?;

        let mut session = self
            .launcher
            .open()
            .await
            .map_err(RetrievalError::SessionOpen)?;

        let outcome = self.run(&mut session, params, now).await;

        if let Err(e) = session.close().await {
            warn!(error = %e, "Browser session did not close cleanly");
        }

        match &outcome {
            Ok(result) => info!(
                records = result.records.len(),
                stop = ?result.stop,
                "Retrieval finished"
            ),
            Err(e) => error!(error = %e, "Retrieval aborted"),
        }
        outcome
    }

    async fn run<S: PageNavigator>(
        &self,
        session: &mut S,
        params: &SearchParameters,
        now: DateTime<Local>,
    ) -> Result<RetrievalResult, RetrievalError> {
        info!("Starting search for news articles");
        session
            .search(&params.query)
            .await
            .map_err(RetrievalError::Navigation)?;
        session
            .sort_by_newest()
            .await
            .map_err(RetrievalError::Navigation)?;

        if params.section.is_empty() {
            debug!("No section given; skipping filter");
        } else {
            match session.apply_filter(&params.section).await {
                Ok(()) => {}
                Err(NavigationError::FilterNotFound { label }) => {
                    warn!(%label, "Filter does not exist; continuing without applying any filter")
                }
                Err(e) => error!(error = %e, "Failed to apply filter; continuing unfiltered"),
            }
        }

        let time_limit = months_before(&now, params.months);
        info!(%time_limit, "Collecting articles newer than the time limit");

        Ok(self.collect_pages(session, params, time_limit).await)
    }

    async fn collect_pages<S: PageNavigator>(
        &self,
        session: &mut S,
        params: &SearchParameters,
        time_limit: DateTime<Local>,
    ) -> RetrievalResult {
        let mut records = Vec::new();
        let mut page = 1usize;

        let stop = 'pages: loop {
            let items = match session.list_current_page_items().await {
                Ok(items) => items,
                Err(e) => {
                    error!(page, error = %e, "Error trying to get news elements");
                    break StopReason::Interrupted(e.to_string());
                }
            };
            info!(page, count = items.len(), "Listed results page");

            for (index, item) in items.iter().enumerate() {
                let published = match item.published_at() {
                    Ok(published) => published,
                    Err(e) => {
                        warn!(page, index, error = %e, "Skipping news item");
                        continue;
                    }
                };
                if published.timestamp_millis() < time_limit.timestamp_millis() {
                    info!(page, index, %published, "Reached an article older than the time limit");
                    break 'pages StopReason::CutOff;
                }
                match self.extractor.extract(item, params).await {
                    Ok(record) => records.push(record),
                    Err(e) => warn!(page, index, error = %e, "Skipping news item"),
                }
            }

            match session.go_to_next_page().await {
                Ok(true) => page += 1,
                Ok(false) => break StopReason::Exhausted,
                Err(e) => {
                    error!(page, error = %e, "Error trying to access the next page");
                    break StopReason::Interrupted(e.to_string());
                }
            }
        };

        RetrievalResult { records, stop }
    }
}
