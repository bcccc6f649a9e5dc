//! # launcher-common
//!
//! Shared types, error definitions, settings, and constants used across
//! the launcher workspace.
//!
//! This crate is the leaf of the dependency graph. It depends on no other
//! internal crate and provides the primitives the composition engine, the
//! runtime boundary, and the CLI all build upon.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod config;
pub mod constants;
pub mod error;
pub mod types;
