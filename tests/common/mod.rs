//! Common test utilities and helpers.
//!
//! This module provides shared functionality for all tests, including:
//! - Test PDF builders
//! - Fake page renderers
//! - Custom assertions and PDF inspection helpers

#![allow(dead_code)]

pub mod assertions;
pub mod fixtures;
pub mod pdf_helpers;
pub mod renderers;

pub use assertions::*;
pub use fixtures::*;
pub use pdf_helpers::*;
pub use renderers::*;
