use axum::Json;

use crate::api::dto::ApiResponse;
use crate::errors::AppError;

/// Wrap a service result in `ApiResponse`, mapping the error into `AppError`
/// (plain `anyhow` errors become internal errors, pipeline errors keep their status).
pub fn to_json<T, E>(result: Result<T, E>) -> Result<Json<ApiResponse<T>>, AppError>
where
    T: serde::Serialize,
    E: Into<AppError>,
{
    match result {
        Ok(value) => Ok(Json(ApiResponse::ok(value))),
        Err(err) => Err(err.into()),
    }
}
