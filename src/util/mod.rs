//! Utility functions and helpers
//!
//! ## Modules
//!
//! - [`deadline`] - Per-call deadlines and argument checks
//! - [`local`] - Local temp files for downloads

pub mod deadline;
pub mod local;
