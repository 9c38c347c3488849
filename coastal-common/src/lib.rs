//! # Coastal Common Library
//!
//! Shared code for the coastal flood risk services:
//! - Error taxonomy (validation, not-found, storage)
//! - Configuration loading and root folder resolution
//! - Database initialization and schema
//! - Geographic primitives (locations, bounding boxes)
//! - Timestamp helpers

pub mod config;
pub mod db;
pub mod error;
pub mod geo;
pub mod time;

pub use error::{Error, Result};
pub use geo::{BoundingBox, Location};
