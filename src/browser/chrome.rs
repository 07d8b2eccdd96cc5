//! Headless Chromium session over the DevTools protocol.
//!
//! Every wait is a bounded poll: the locator is retried every
//! [`WaitConfig::poll`] until it resolves or the deadline passes. A failed
//! wait is terminal for that operation; nothing here retries with backoff.

use super::promo::PromoSelectors;
use super::{PageNavigator, SessionLauncher};
use crate::config::{ScraperConfig, SelectorConfig, WaitConfig};
use crate::error::{ConfigError, NavigationError};
use crate::models::PromoItem;
use chromiumoxide::{Browser, BrowserConfig, Element, Page};
use futures::StreamExt;
use std::fmt::Display;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep};
use tracing::{debug, error, info, instrument, warn};
use url::Url;

fn browser_err(e: impl Display) -> NavigationError {
    NavigationError::Browser(e.to_string())
}

/// How to find an element on the page.
#[derive(Clone, Copy)]
enum Locator<'a> {
    Css(&'a str),
    XPath(&'a str),
}

/// Launches Chromium sessions pointed at the configured site.
#[derive(Debug, Clone)]
pub struct ChromeLauncher {
    config: ScraperConfig,
    promos: Arc<PromoSelectors>,
}

impl ChromeLauncher {
    /// Validate the configured selectors and prepare a launcher.
    pub fn new(config: ScraperConfig) -> Result<Self, ConfigError> {
        let promos = Arc::new(PromoSelectors::compile(&config.selectors)?);
        Ok(Self { config, promos })
    }

    fn browser_config(&self) -> Result<BrowserConfig, NavigationError> {
        let mut builder = BrowserConfig::builder();
        if !self.config.headless {
            builder = builder.with_head();
        }
        if self.config.no_sandbox {
            builder = builder.no_sandbox();
        }
        if let Some(ref bin) = self.config.chrome_executable {
            builder = builder.chrome_executable(bin);
        }
        builder
            .args(self.config.browser_args.clone())
            .build()
            .map_err(NavigationError::Launch)
    }
}

impl SessionLauncher for ChromeLauncher {
    type Session = ChromeSession;

    #[instrument(level = "info", skip_all, fields(site = %self.config.site_url, headless = self.config.headless))]
    async fn open(&self) -> Result<ChromeSession, NavigationError> {
        let (mut browser, mut handler) = Browser::launch(self.browser_config()?)
            .await
            .map_err(|e| NavigationError::Launch(e.to_string()))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
            debug!("Chromium event loop exited");
        });

        let page = match browser.new_page(self.config.site_url.as_str()).await {
            Ok(page) => page,
            Err(e) => {
                error!(error = %e, "Failed to open site root; shutting browser down");
                let _ = browser.close().await;
                let _ = browser.wait().await;
                handler.abort();
                return Err(browser_err(e));
            }
        };

        info!("Browser session opened");
        Ok(ChromeSession {
            browser,
            page,
            handler,
            waits: self.config.waits.clone(),
            selectors: self.config.selectors.clone(),
            promos: Arc::clone(&self.promos),
        })
    }
}

/// A live Chromium tab on the search site.
pub struct ChromeSession {
    browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
    waits: WaitConfig,
    selectors: SelectorConfig,
    promos: Arc<PromoSelectors>,
}

impl ChromeSession {
    async fn wait_for(&self, locator: Locator<'_>, wait: Duration) -> Option<Element> {
        let deadline = Instant::now() + wait;
        loop {
            let found = match locator {
                Locator::Css(css) => self.page.find_element(css).await,
                Locator::XPath(xpath) => self.page.find_xpath(xpath).await,
            };
            if let Ok(element) = found {
                return Some(element);
            }
            if Instant::now() >= deadline {
                return None;
            }
            sleep(self.waits.poll()).await;
        }
    }

    async fn require(
        &self,
        control: &'static str,
        selector: &str,
        wait: Duration,
    ) -> Result<Element, NavigationError> {
        self.wait_for(Locator::Css(selector), wait)
            .await
            .ok_or(NavigationError::ControlNotFound {
                control,
                waited: wait,
            })
    }

    async fn current_url(&self) -> Result<String, NavigationError> {
        Ok(self.page.url().await.map_err(browser_err)?.unwrap_or_default())
    }

    /// Poll until the page URL differs from `previous`; `false` on timeout.
    async fn wait_for_url_change(
        &self,
        previous: &str,
        wait: Duration,
    ) -> Result<bool, NavigationError> {
        let deadline = Instant::now() + wait;
        loop {
            if self.current_url().await? != previous {
                return Ok(true);
            }
            if Instant::now() >= deadline {
                return Ok(false);
            }
            sleep(self.waits.poll()).await;
        }
    }

    /// Give a reload triggered by a control a chance to land.
    async fn settle_after(&self, previous: &str, wait: Duration) {
        match self.wait_for_url_change(previous, wait).await {
            Ok(true) => debug!("Page reloaded"),
            Ok(false) => debug!("URL unchanged; continuing on the current page"),
            Err(e) => warn!(error = %e, "Could not read page URL"),
        }
    }
}

impl PageNavigator for ChromeSession {
    #[instrument(level = "info", skip(self))]
    async fn search(&mut self, query: &str) -> Result<(), NavigationError> {
        let wait = self.waits.control();
        let button = self
            .require("search button", &self.selectors.search_button, wait)
            .await?;
        button.click().await.map_err(browser_err)?;

        let input = self
            .require("search input", &self.selectors.search_input, wait)
            .await?;
        let before = self.current_url().await?;
        input
            .click()
            .await
            .map_err(browser_err)?
            .type_str(query)
            .await
            .map_err(browser_err)?
            .press_key("Enter")
            .await
            .map_err(browser_err)?;

        self.settle_after(&before, self.waits.page_change()).await;
        info!("Search submitted");
        Ok(())
    }

    #[instrument(level = "info", skip(self))]
    async fn sort_by_newest(&mut self) -> Result<(), NavigationError> {
        let select = self
            .require("sort select", &self.selectors.sort_select, self.waits.sort())
            .await?;
        let option = &self.selectors.sort_option;
        let option_literal = serde_json::to_string(option).map_err(browser_err)?;
        let script = format!(
            "function() {{
                const wanted = {option_literal};
                const opt = Array.from(this.options).find(o => o.text.trim() === wanted);
                if (!opt) {{ return false; }}
                this.value = opt.value;
                this.dispatchEvent(new Event('change', {{ bubbles: true }}));
                return true;
            }}"
        );

        let before = self.current_url().await?;
        let selected = select
            .call_js_fn(script, false)
            .await
            .map_err(browser_err)?
            .result
            .value;
        if selected != Some(serde_json::Value::Bool(true)) {
            return Err(NavigationError::OptionNotFound {
                option: option.clone(),
            });
        }

        self.settle_after(&before, self.waits.page_change()).await;
        info!(%option, "Results sorted");
        Ok(())
    }

    #[instrument(level = "info", skip(self))]
    async fn apply_filter(&mut self, label: &str) -> Result<(), NavigationError> {
        let xpath = self.selectors.section_checkbox(label);
        let Some(checkbox) = self
            .wait_for(Locator::XPath(&xpath), self.waits.control())
            .await
        else {
            return Err(NavigationError::FilterNotFound {
                label: label.to_string(),
            });
        };

        let checked = checkbox
            .call_js_fn("function() { return this.checked === true; }", false)
            .await
            .map_err(browser_err)?
            .result
            .value;
        if checked == Some(serde_json::Value::Bool(true)) {
            debug!("Section filter already selected");
            return Ok(());
        }

        let before = self.current_url().await?;
        checkbox.click().await.map_err(browser_err)?;
        self.settle_after(&before, self.waits.page_change()).await;
        info!("Section filter applied");
        Ok(())
    }

    #[instrument(level = "debug", skip(self))]
    async fn list_current_page_items(&mut self) -> Result<Vec<PromoItem>, NavigationError> {
        let wait = self.waits.results();
        let deadline = Instant::now() + wait;
        loop {
            match self.page.find_elements(self.selectors.promo.as_str()).await {
                Ok(found) if !found.is_empty() => break,
                _ if Instant::now() >= deadline => {
                    return Err(NavigationError::Timeout {
                        what: "search results",
                        waited: wait,
                    });
                }
                _ => sleep(self.waits.poll()).await,
            }
        }

        let html = self.page.content().await.map_err(browser_err)?;
        let url = self.current_url().await?;
        let base = Url::parse(&url).ok();
        Ok(self.promos.parse_page(&html, base.as_ref()))
    }

    #[instrument(level = "info", skip(self))]
    async fn go_to_next_page(&mut self) -> Result<bool, NavigationError> {
        let Some(next) = self
            .wait_for(Locator::Css(&self.selectors.next_page), self.waits.control())
            .await
        else {
            info!("No next-page link; results exhausted");
            return Ok(false);
        };

        let current = self.current_url().await?;
        next.click().await.map_err(browser_err)?;

        let wait = self.waits.page_change();
        if self.wait_for_url_change(&current, wait).await? {
            debug!(from = %current, "Moved to next results page");
            Ok(true)
        } else {
            Err(NavigationError::Timeout {
                what: "next results page",
                waited: wait,
            })
        }
    }

    #[instrument(level = "info", skip(self))]
    async fn close(mut self) -> Result<(), NavigationError> {
        let closed = self.browser.close().await.map(|_| ()).map_err(browser_err);
        match closed {
            Ok(()) => {
                if let Err(e) = self.browser.wait().await {
                    warn!(error = %e, "Browser process did not exit cleanly");
                }
            }
            Err(ref e) => error!(error = %e, "Failed to close browser"),
        }
        self.handler.abort();
        info!("Browser session closed");
        closed
    }
}
