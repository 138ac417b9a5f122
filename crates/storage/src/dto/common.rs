use serde::Serialize;
use utoipa::ToSchema;

/// Success envelope: `{ "success": true, "data": ... }`.
///
/// Failures use the matching `{ "success": false, "error": ... }` shape
/// produced by the web layer's error type.
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Self {
        Self { success: true }
    }
}
