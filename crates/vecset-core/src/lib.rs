//! vecset Core - Domain models, catalog, and configuration
//!
//! This crate contains the dataset model, the catalog, and the port definitions
//! that storage and index-service adapters implement.

pub mod catalog;
pub mod config;
pub mod error;
pub mod models;
pub mod ports;

pub use catalog::Catalog;
pub use error::{Result, VecsetError};
