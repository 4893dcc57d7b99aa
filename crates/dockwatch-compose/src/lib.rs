//! # dockwatch-compose
//!
//! Loader for the declarative container manifest.
//!
//! Handles:
//! - **Manifest**: YAML parsing into per-container declarations keyed by name.
//! - **Validator**: Static checks on container names before any record is built.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod manifest;
pub mod validator;

pub use manifest::{ContainerDecl, Manifest, PublishDecl, load_manifest, parse_manifest};
