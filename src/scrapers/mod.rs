//! News site scrapers.
//!
//! Each scraper knows one site's listing layout:
//!
//! | Source | Module | Method | Notes |
//! |--------|--------|--------|-------|
//! | Naver News (economy) | [`naver`] | HTML scraping | Date-paged listing, headline anchors only |
//!
//! A scraper exports:
//! - URL building for a date and page (`listing_url`, `listing_tasks`)
//! - An `HtmlExtractor` that turns listing markup into headline records and
//!   the last page number shown in the pagination bar
//!
//! Fetching itself lives in [`crate::fetch`]; scrapers never touch the network.

pub mod naver;
