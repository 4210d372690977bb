use crate::error::{AppError, Result};
use crate::model::{CreateUrlRequest, CreateUrlResponse};
use crate::state::AppState;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::header::LOCATION;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use snowlink_core::ShortCode;
use snowlink_redirector::Resolution;
use tracing::debug;

pub async fn create_url_handler(
    State(state): State<AppState>,
    payload: std::result::Result<Json<CreateUrlRequest>, JsonRejection>,
) -> Result<Json<CreateUrlResponse>> {
    let Json(request) = payload.map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;

    let shortened = state.shortener.shorten(&request.url).await?;

    Ok(Json(CreateUrlResponse {
        id: shortened.code.to_string(),
        short_url: shortened.short_url,
    }))
}

pub async fn redirect_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<Response> {
    let Ok(code) = ShortCode::new(&code) else {
        debug!(code = %code, "Rejected malformed short code");
        return Err(AppError::NotFound);
    };

    match state.redirector.resolve(&code).await? {
        Resolution::Found(url) => {
            let location = HeaderValue::try_from(url).map_err(|e| {
                AppError::Internal(format!("stored url is not a valid header value: {e}"))
            })?;
            Ok((StatusCode::FOUND, [(LOCATION, location)]).into_response())
        }
        Resolution::Expired => {
            debug!(code = %code, "Short code has expired");
            Err(AppError::NotFound)
        }
        Resolution::NotFound => Err(AppError::NotFound),
    }
}
