//! Promo element parsing.
//!
//! Listing a results page takes a snapshot of its HTML; this module turns
//! that snapshot into [`PromoItem`] values with `scraper`, so nothing
//! downstream holds on to live browser elements.

use crate::config::SelectorConfig;
use crate::error::ConfigError;
use crate::models::PromoItem;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;
use url::Url;

/// Compiled selectors for one promo layout.
#[derive(Debug)]
pub struct PromoSelectors {
    promo: Selector,
    timestamp: Selector,
    timestamp_attribute: String,
    title: Selector,
    description: Selector,
    image: Selector,
}

impl PromoSelectors {
    pub fn compile(config: &SelectorConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            promo: parse_selector(&config.promo)?,
            timestamp: parse_selector(&config.promo_timestamp)?,
            timestamp_attribute: config.timestamp_attribute.clone(),
            title: parse_selector(&config.promo_title)?,
            description: parse_selector(&config.promo_description)?,
            image: parse_selector(&config.promo_image)?,
        })
    }

    /// Extract every promo on the page, in document order.
    ///
    /// Relative image URLs are resolved against `base`.
    pub fn parse_page(&self, html: &str, base: Option<&Url>) -> Vec<PromoItem> {
        let document = Html::parse_document(html);
        let items: Vec<PromoItem> = document
            .select(&self.promo)
            .map(|promo| self.parse_promo(promo, base))
            .collect();
        debug!(count = items.len(), "Parsed promo elements");
        items
    }

    fn parse_promo(&self, promo: ElementRef<'_>, base: Option<&Url>) -> PromoItem {
        let timestamp = promo
            .select(&self.timestamp)
            .next()
            .and_then(|el| el.value().attr(&self.timestamp_attribute))
            .map(str::to_string);

        let image_url = promo
            .select(&self.image)
            .next()
            .and_then(|el| el.value().attr("srcset"))
            .and_then(first_srcset_url)
            .map(|raw| resolve(raw, base));

        PromoItem {
            timestamp,
            title: promo.select(&self.title).next().map(visible_text),
            description: promo.select(&self.description).next().map(visible_text),
            image_url,
        }
    }
}

fn parse_selector(raw: &str) -> Result<Selector, ConfigError> {
    Selector::parse(raw).map_err(|e| ConfigError::Selector {
        selector: raw.to_string(),
        reason: e.to_string(),
    })
}

/// Text of an element with runs of whitespace collapsed, as a browser renders it.
fn visible_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// First URL of a `srcset` list.
fn first_srcset_url(srcset: &str) -> Option<&str> {
    srcset.split_whitespace().next()
}

fn resolve(raw: &str, base: Option<&Url>) -> String {
    match base.and_then(|b| b.join(raw).ok()) {
        Some(url) => url.to_string(),
        None => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
          <ul class="search-results-module-results-menu">
            <li><ps-promo><div class="promo-wrapper">
              <div class="promo-media">
                <picture><img class="image"
                  srcset="https://ca-times.brightspotcdn.com/a.jpg 320w, https://ca-times.brightspotcdn.com/a-big.jpg 640w"></picture>
              </div>
              <div class="promo-content">
                <h3 class="promo-title"><a href="/story/a">Fed holds
                  rates   steady</a></h3>
                <p class="promo-description">Officials signal $1.5 trillion plan.</p>
                <p class="promo-timestamp" data-timestamp="1718000000000">June 10, 2024</p>
              </div>
            </div></ps-promo></li>
            <li><ps-promo><div class="promo-wrapper">
              <div class="promo-content">
                <h3 class="promo-title">No picture here</h3>
                <p class="promo-timestamp" data-timestamp="1717000000000">June 1, 2024</p>
              </div>
            </div></ps-promo></li>
            <li><ps-promo><div class="promo-wrapper">
              <img class="image" srcset="/images/rel.jpg 1x">
              <h3 class="promo-title">Relative</h3>
              <p class="promo-description">d</p>
              <p class="promo-timestamp" data-timestamp="1716000000000"></p>
            </div></ps-promo></li>
          </ul>
        </body></html>
    "#;

    fn selectors() -> PromoSelectors {
        PromoSelectors::compile(&SelectorConfig::default()).unwrap()
    }

    #[test]
    fn test_parse_page_reads_fields_in_order() {
        let base = Url::parse("https://www.latimes.com/search?q=fed").unwrap();
        let items = selectors().parse_page(PAGE, Some(&base));
        assert_eq!(items.len(), 3);

        assert_eq!(items[0].title.as_deref(), Some("Fed holds rates steady"));
        assert_eq!(
            items[0].description.as_deref(),
            Some("Officials signal $1.5 trillion plan.")
        );
        assert_eq!(items[0].timestamp.as_deref(), Some("1718000000000"));
        assert_eq!(
            items[0].image_url.as_deref(),
            Some("https://ca-times.brightspotcdn.com/a.jpg")
        );
    }

    #[test]
    fn test_missing_children_are_none() {
        let items = selectors().parse_page(PAGE, None);
        assert_eq!(items[1].title.as_deref(), Some("No picture here"));
        assert_eq!(items[1].description, None);
        assert_eq!(items[1].image_url, None);
    }

    #[test]
    fn test_relative_image_resolved_against_page() {
        let base = Url::parse("https://www.latimes.com/search?q=fed").unwrap();
        let items = selectors().parse_page(PAGE, Some(&base));
        assert_eq!(
            items[2].image_url.as_deref(),
            Some("https://www.latimes.com/images/rel.jpg")
        );
        let unresolved = selectors().parse_page(PAGE, None);
        assert_eq!(unresolved[2].image_url.as_deref(), Some("/images/rel.jpg"));
    }

    #[test]
    fn test_invalid_selector_is_reported() {
        let config = SelectorConfig {
            promo: "div[".to_string(),
            ..SelectorConfig::default()
        };
        assert!(matches!(
            PromoSelectors::compile(&config),
            Err(ConfigError::Selector { .. })
        ));
    }

    #[test]
    fn test_empty_page_has_no_items() {
        assert!(selectors().parse_page("<html></html>", None).is_empty());
    }
}
