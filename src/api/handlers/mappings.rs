//! Handlers for mapping management endpoints.

use axum::{
    Json,
    body::Bytes,
    extract::{Path, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use validator::Validate;

use crate::api::dto::{MappingDto, MappingPayload};
use crate::domain::entities::Mapping;
use crate::error::AppError;
use crate::state::AppState;

/// Lists all mappings.
///
/// # Endpoint
///
/// `GET /mappings/`
///
/// # Response
///
/// ```json
/// [{ "key": "/old", "dest": "/new", "perm": false }]
/// ```
pub async fn list_mappings_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<MappingDto>>, AppError> {
    let mappings = state.mapping_service.list().await?;
    Ok(Json(mappings.into_iter().map(MappingDto::from).collect()))
}

/// Fetches one mapping.
///
/// # Endpoint
///
/// `GET /mappings/{key}`
///
/// Keys containing `/` may be sent raw (`/mappings//old`) or
/// percent-encoded (`/mappings/%2Fold`).
///
/// # Errors
///
/// Returns 404 Not Found if the key has no mapping.
pub async fn get_mapping_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<MappingDto>, AppError> {
    let mapping = state.mapping_service.get(&key).await?;
    Ok(Json(mapping.into()))
}

/// Creates or replaces one or more mappings.
///
/// # Endpoint
///
/// `POST /mappings/`
///
/// # Request Body
///
/// A single mapping object or an array of them. `Content-Type` must be
/// `application/json`.
///
/// # Response
///
/// 201 Created. When exactly one mapping was posted, `Location` points at it.
///
/// # Errors
///
/// Returns 400 Bad Request for a wrong content type, malformed JSON, an
/// empty array, an invalid mapping, or a destination template that does not
/// compile. Nothing is stored in that case.
pub async fn create_mappings_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, AppError> {
    if !is_json(&headers) {
        return Err(AppError::bad_request("Content-Type must be application/json"));
    }

    let payload: MappingPayload = serde_json::from_slice(&body)
        .map_err(|e| AppError::bad_request(format!("invalid JSON body: {}", e)))?;

    let items = payload.into_vec();
    for (i, item) in items.iter().enumerate() {
        item.validate()
            .map_err(|e| AppError::bad_request(format!("mapping at index {}: {}", i, e)))?;
    }

    let created = state
        .mapping_service
        .create(items.into_iter().map(Mapping::from).collect())
        .await?;

    let mut response = StatusCode::CREATED.into_response();
    if let [mapping] = created.as_slice()
        && let Ok(location) = HeaderValue::from_str(&format!("/mappings/{}", mapping.key))
    {
        response.headers_mut().insert(header::LOCATION, location);
    }

    Ok(response)
}

/// Deletes one mapping.
///
/// # Endpoint
///
/// `DELETE /mappings/{key}`
///
/// # Errors
///
/// Returns 404 Not Found if the key has no mapping.
pub async fn delete_mapping_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<StatusCode, AppError> {
    state.mapping_service.delete(&key).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Deletes every mapping.
///
/// # Endpoint
///
/// `DELETE /mappings/`
pub async fn delete_all_mappings_handler(
    State(state): State<AppState>,
) -> Result<StatusCode, AppError> {
    state.mapping_service.delete_all().await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Whether the media type (ignoring parameters) is `application/json`.
fn is_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .is_some_and(|essence| essence.trim().eq_ignore_ascii_case("application/json"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers_with(content_type: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
        headers
    }

    #[test]
    fn test_is_json() {
        assert!(is_json(&headers_with("application/json")));
        assert!(is_json(&headers_with("application/json; charset=utf-8")));
        assert!(is_json(&headers_with("Application/JSON")));
        assert!(!is_json(&headers_with("text/plain")));
        assert!(!is_json(&HeaderMap::new()));
    }
}
