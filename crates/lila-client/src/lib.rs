//! # Lila Client
//!
//! [`HttpBackend`] implements [`lila_core::ChatBackend`] against the relay
//! backend over HTTP with reqwest:
//!
//! - upload handshake: multipart `file` + `user`, answered with `{"id": ...}`
//! - document analysis: multipart `file`, answered with a plain-text report
//!   or `{"error": ...}`
//! - streaming chat: JSON request, raw response body handed to the frame
//!   decoder chunk by chunk
//! - liveness probe: `GET` on the health path

#![warn(clippy::all)]

mod http;

pub use http::HttpBackend;
