//! Terminal front end for Lil A
//!
//! Exposed as a library so the binary stays thin and the pieces can be
//! tested directly.

pub mod cli;
pub mod commands;
pub mod config;
pub mod logging;
pub mod render;
pub mod session_store;
