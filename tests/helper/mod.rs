//! Shared test utilities

#![allow(dead_code, unused_imports)]

pub mod pages;

pub use pages::{listing_html, pagination_html, test_config};
