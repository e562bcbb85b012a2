//! # imsg-core
//!
//! Core types, traits, configuration, and error handling for imsg.

pub mod classify;
pub mod config;
pub mod error;
pub mod message;
pub mod recipient;
pub mod toon;
pub mod traits;

pub use config::shellexpand;
