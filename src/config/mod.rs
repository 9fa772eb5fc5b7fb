//! Configuration module for iconsheet
//!
//! Provides types, discovery and loading for `iconsheet.toml`.

pub mod loader;
pub mod schema;

pub use loader::*;
pub use schema::*;
