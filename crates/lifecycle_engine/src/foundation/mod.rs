//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the engine:
//! - Object identities and mutation-safe collections
//! - Logging utilities

pub mod collections;
pub mod logging;

pub use collections::{CursorList, ObjectId};
