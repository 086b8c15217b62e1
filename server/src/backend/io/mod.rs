//! # IO Module
//!
//! Everything that crosses the process boundary other than storage: the
//! axum REST API the frontend calls, and outbound push messaging.

pub mod messaging;
pub mod rest;
