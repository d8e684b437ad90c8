//! # Lila Configuration Library
//!
//! Typed configuration for the Lil A chat client.
//!
//! ## Features
//!
//! - TOML configuration file with per-section defaults
//! - Environment overrides for the values most often changed per machine
//! - Validation before any component is constructed
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use lila_config::LilaConfig;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = LilaConfig::load(None)?;
//!     println!("backend: {}", config.backend.base_url);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod components;
mod config;

pub use components::*;
pub use config::*;
