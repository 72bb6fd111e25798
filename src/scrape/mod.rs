//! Scraping layer for the server listing site
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │   Fetcher   │────▶│  Document   │────▶│   Listing   │
//! │ (HTTP GET)  │     │   (HTML)    │     │  (parse)    │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!                            │                   │
//!                            ▼                   ▼
//!                     ┌─────────────┐     ┌─────────────┐
//!                     │ Pagination  │     │   Semver    │
//!                     │ (last page) │     │ (validate)  │
//!                     └─────────────┘     └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`fetcher`]: `PageFetcher` trait and the reqwest-backed `HttpFetcher`
//! - [`pagination`]: Determines the highest listing page number
//! - [`listing`]: Extracts host/version pairs from a listing page
//! - [`semver`]: Version validation and normalization
//! - [`site`]: URL layout of the listing site
//! - [`error`]: Error types for fetching and parsing

pub mod error;
pub mod fetcher;
pub mod listing;
pub mod pagination;
pub mod semver;
pub mod site;
