//! Shared building blocks for HTTP handlers

mod error;
mod response;
pub mod validated_json;

pub use error::{error_response, ApiError};
pub use response::ApiResponse;
pub use validated_json::ValidatedJson;
