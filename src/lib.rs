//! Scrape-and-build pipeline for a static site over UN General Assembly
//! proceedings.
//!
//! The pipeline has two phases decoupled through JSON files on disk:
//! `scrape` pulls paginated data from the iGov API, normalizes it into
//! typed per-category records and persists one document per
//! (body, session, category); `site` renders those documents into a
//! static HTML tree. The builder never touches the network.

pub mod client;
pub mod config;
pub mod error;
pub mod normalize;
pub mod paths;
pub mod records;
pub mod report;
pub mod scrape;
pub mod serve;
pub mod site;
pub mod store;

pub use error::{Error, Result};
