//! # dockwatch-common
//!
//! Shared types, error definitions, configuration models, and constants
//! used across the entire dockwatch workspace.
//!
//! This crate is the leaf of the dependency graph: it depends on no other
//! internal crate, and every other crate builds on it.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod config;
pub mod constants;
pub mod error;
pub mod types;
