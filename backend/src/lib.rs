//! # HPI Rust Backend
//!
//! Water-quality service computing heavy-metal pollution indices.
//!
//! Uploaded sample tables (CSV, JSON, PDF or Excel) are parsed, scored with the
//! Heavy Metal Pollution Index (HPI) and the Degree of Contamination (Cd), and
//! stored. Stored samples back hotspot risk predictions for new locations and
//! threshold-based alerts. A REST API built on Axum serves the front end.
//!
//! ## Architecture
//!
//! - [`models`]: Domain types shared by every layer
//! - [`parsing`]: Upload format detection and table parsing
//! - [`services`]: Index calculation, hotspot model, alerts and CSV export
//! - [`db`]: Repository pattern and persistence layer
//! - [`config`]: `hpi.toml` and environment configuration
//! - [`routes`]: Route-specific request/response types
//! - [`api`]: Consolidated public DTOs
//! - `http`: Axum-based HTTP server and request handlers

// Allow large error types - RepositoryError contains rich context for debugging
#![allow(clippy::result_large_err)]

pub mod api;
pub mod config;

pub mod db;
pub mod models;
pub mod parsing;

pub mod routes;

pub mod services;

#[cfg(feature = "http-server")]
pub mod http;
