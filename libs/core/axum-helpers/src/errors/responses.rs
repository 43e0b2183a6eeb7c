//! Reusable OpenAPI response types for consistent API documentation.

use super::ErrorResponse;
#[allow(unused_imports)]
use serde_json::json;
use utoipa::ToResponse;

#[derive(ToResponse)]
#[response(
    description = "Bad Request - Validation Error",
    content_type = "application/json",
    example = json!({
        "code": 1001,
        "error": "VALIDATION_ERROR",
        "message": "Event has to have adName property"
    })
)]
pub struct BadRequestValidationResponse(pub ErrorResponse);

#[derive(ToResponse)]
#[response(
    description = "Internal Server Error (production mode omits `stack`)",
    content_type = "application/json",
    example = json!({
        "code": 2001,
        "error": "PERSISTENCE_ERROR",
        "message": "Error while saving an event"
    })
)]
pub struct InternalServerErrorResponse(pub ErrorResponse);
