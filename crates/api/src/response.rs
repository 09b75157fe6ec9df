//! The success half of the envelope (§4.5's `{success, data?, error?, meta?}`).
//! `ApiError` (`error.rs`) owns the failure half.

use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
}

pub fn ok<T: Serialize>(data: T) -> Json<ApiResponse<T>> {
    Json(ApiResponse { success: true, data })
}
