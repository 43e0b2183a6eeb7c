//! Standard client-facing messages.

/// Shown to callers for unclassified failures in production mode.
pub const INTERNAL_ERROR: &str = "Internal server error";
