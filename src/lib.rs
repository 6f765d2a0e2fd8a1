//! Heisko display catalog: product API, catalog client and contact relay.
//!
//! - [`catalog`]: categories, product records and series resolution
//! - [`client`]: cache-busted requests and retrying, cached product queries
//! - [`server`]: the axum API over the [`db`] product store
//! - [`contact`]: contact-form validation and lead email delivery

pub mod catalog;
pub mod client;
pub mod config;
pub mod contact;
pub mod db;
pub mod logging;
pub mod server;
