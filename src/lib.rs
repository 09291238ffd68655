//! Course recommendation service.
//!
//! Loads a course interaction dataset, trains a content similarity model and a
//! collaborative rating model into an immutable snapshot, and serves ranked
//! recommendations over HTTP.

pub mod api;
pub mod config;
pub mod dataset;
pub mod error;
pub mod middleware;
pub mod models;
pub mod services;
