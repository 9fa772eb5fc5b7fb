//! iconsheet - Sprite-sheet icon addressing and custom icon preparation
//!
//! This library provides functionality to:
//! - Resolve icon numbers to sheet cells and pixel rects
//! - Keep a table of custom icons that override sheet geometry
//! - Matte, center and losslessly re-encode custom icon artwork

pub mod batch;
pub mod cli;
pub mod config;
pub mod matte;
pub mod output;
pub mod preview;
pub mod resolver;
pub mod table;
pub mod template;
pub mod validate;
