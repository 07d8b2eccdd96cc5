//! Browser navigation of the search results site.
//!
//! The retriever only talks to the browser through two traits:
//!
//! - [`SessionLauncher`]: opens a session already sitting on the site root
//! - [`PageNavigator`]: the session itself (search, sort, filter, list, paginate, close)
//!
//! A session moves through
//! `Idle → Searched → Sorted → Filtered → Listing ⇄ Paginating → Closed`;
//! [`PageNavigator::close`] consumes it, so a closed session cannot be driven.
//!
//! # Submodules
//!
//! - [`chrome`]: headless Chromium implementation over CDP
//! - [`promo`]: parses promo elements out of a results page snapshot

pub mod chrome;
pub mod promo;

use crate::error::NavigationError;
use crate::models::PromoItem;

/// Opens browser sessions.
pub trait SessionLauncher {
    type Session: PageNavigator;

    /// Launch a browser and navigate to the site root.
    async fn open(&self) -> Result<Self::Session, NavigationError>;
}

/// One live browser session on the search site.
pub trait PageNavigator {
    /// Activate the search control and submit `query`.
    async fn search(&mut self, query: &str) -> Result<(), NavigationError>;

    /// Pick the "Newest" ordering.
    async fn sort_by_newest(&mut self) -> Result<(), NavigationError>;

    /// Tick the section checkbox labelled `label` unless it is already ticked.
    ///
    /// Returns [`NavigationError::FilterNotFound`] when no such checkbox shows
    /// up in time.
    async fn apply_filter(&mut self, label: &str) -> Result<(), NavigationError>;

    /// Promo elements of the current results page, in page order.
    async fn list_current_page_items(&mut self) -> Result<Vec<PromoItem>, NavigationError>;

    /// Move to the next results page.
    ///
    /// `Ok(false)` means there is no next page; that ends pagination normally.
    async fn go_to_next_page(&mut self) -> Result<bool, NavigationError>;

    /// Release every browser resource.
    async fn close(self) -> Result<(), NavigationError>;
}
