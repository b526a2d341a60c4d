//! Foundation module - Core utilities shared by the event manager
//!
//! - Logging utilities

pub mod logging;
