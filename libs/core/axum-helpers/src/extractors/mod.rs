//! Extractors that reject with [`AppError`](crate::errors::AppError) instead of
//! axum's plain-text rejections, so malformed input reaches callers in the same
//! error shape as every other failure.

pub mod json_body;
pub mod query_params;

pub use json_body::JsonBody;
pub use query_params::QueryParams;
