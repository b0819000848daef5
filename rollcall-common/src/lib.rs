//! # Rollcall Common Library
//!
//! Shared code for the Rollcall person registry including:
//! - Database bootstrap and connection setup
//! - Schema migration registry and runner
//! - Persisted models
//! - Configuration loading

pub mod config;
pub mod db;
pub mod error;

pub use error::{Error, Result};
