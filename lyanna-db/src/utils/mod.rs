//! Utility modules shared across the tool.

pub mod errors;
pub mod logger;

pub use errors::{Result, ToolError};
