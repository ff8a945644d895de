//! Foundation module - Core utilities and types
//!
//! This module provides fundamental utilities used throughout the engine:
//! - Integer screen-space geometry
//! - Logging setup

pub mod math;
pub mod logging;
