//! Turns one promo element into an [`ArticleRecord`].

use crate::classify::{count_query_occurrences, mentions_money};
use crate::error::ItemExtractionError;
use crate::media::ImageFetcher;
use crate::models::{ArticleRecord, IMAGE_NOT_FOUND, PromoItem, SearchParameters};
use crate::utils::{image_path_for, truncate_for_log};
use chrono::Local;
use std::path::PathBuf;
use tracing::{debug, instrument, warn};

/// Builds records from promo elements, saving each article's image.
#[derive(Debug)]
pub struct ArticleExtractor<F> {
    fetcher: F,
    images_dir: PathBuf,
}

impl<F: ImageFetcher> ArticleExtractor<F> {
    pub fn new(fetcher: F, images_dir: impl Into<PathBuf>) -> Self {
        Self {
            fetcher,
            images_dir: images_dir.into(),
        }
    }

    /// Read the promo's fields, download its image and classify its text.
    ///
    /// # Arguments
    ///
    /// * `item` - One promo as read off the results page
    /// * `params` - The active search; its query drives the match count
    ///
    /// # Returns
    ///
    /// The classified record. A missing or undownloadable image does not
    /// fail the item: the record carries [`IMAGE_NOT_FOUND`] instead.
    ///
    /// # Errors
    ///
    /// Returns [`ItemExtractionError`] when the title, description or
    /// timestamp is missing or the timestamp does not parse.
    #[instrument(level = "debug", skip_all)]
    pub async fn extract(
        &self,
        item: &PromoItem,
        params: &SearchParameters,
    ) -> Result<ArticleRecord, ItemExtractionError> {
        let published = item.published_at()?;
        let title = item
            .title
            .clone()
            .ok_or(ItemExtractionError::MissingField("title"))?;
        let description = item
            .description
            .clone()
            .ok_or(ItemExtractionError::MissingField("description"))?;

        let image_path = self.save_image(item, &title).await;

        let record = ArticleRecord {
            published_date: published.with_timezone(&Local).format("%y-%m-%d").to_string(),
            image_path,
            query_match_count: count_query_occurrences(&params.query, &title, &description),
            mentions_money: mentions_money(&format!("{title} {description}")),
            title,
            description,
        };
        debug!(title = %truncate_for_log(&record.title, 80), "Added news item");
        Ok(record)
    }

    #[cfg(test)]
    pub(crate) fn fetcher(&self) -> &F {
        &self.fetcher
    }

    async fn save_image(&self, item: &PromoItem, title: &str) -> String {
        let Some(url) = item.image_url.as_deref().filter(|u| !u.is_empty()) else {
            warn!(title = %truncate_for_log(title, 80), "Promo has no image");
            return IMAGE_NOT_FOUND.to_string();
        };
        let destination = image_path_for(&self.images_dir, title);
        match self.fetcher.download_image(url, &destination).await {
            Ok(()) => destination.display().to_string(),
            Err(e) => {
                warn!(%url, error = %e, "Error saving image");
                IMAGE_NOT_FOUND.to_string()
            }
        }
    }
}
