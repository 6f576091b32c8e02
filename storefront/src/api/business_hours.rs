//! Business-hours endpoints

use axum::{
    Json,
    extract::{Query, State},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared::error::{ApiResponse, AppError};
use shared::models::WeeklySchedule;

use crate::core::AppState;
use crate::hours::{Locale, OpenStatus, OrderTimeValidation};
use crate::hours::format::format_week_lines;

type ApiResult<T> = Result<ApiResponse<T>, AppError>;

#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    /// RFC 3339 instant; defaults to now
    pub at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
pub struct FormattedQuery {
    pub locale: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FormattedHours {
    pub locale: Locale,
    pub lines: Vec<String>,
    pub text: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ValidateTimeRequest {
    /// RFC 3339 instant; defaults to now
    #[serde(default)]
    pub at: Option<DateTime<Utc>>,
}

pub async fn get_schedule(State(state): State<AppState>) -> ApiResult<WeeklySchedule> {
    let schedule = state.engine.schedule().await;
    Ok(ApiResponse::success(schedule.as_ref().clone()))
}

/// Admin save; accepts either stored shape and writes the canonical one
pub async fn save_schedule(
    State(state): State<AppState>,
    Json(document): Json<Value>,
) -> ApiResult<WeeklySchedule> {
    let saved = state.engine.save_document(&document).await?;
    Ok(ApiResponse::success_with_message(
        "Business hours saved",
        saved.as_ref().clone(),
    ))
}

pub async fn refresh_schedule(State(state): State<AppState>) -> ApiResult<WeeklySchedule> {
    let schedule = state.engine.refresh().await;
    tracing::info!("Business hours refreshed on request");
    Ok(ApiResponse::success(schedule.as_ref().clone()))
}

pub async fn get_status(
    State(state): State<AppState>,
    Query(query): Query<StatusQuery>,
) -> ApiResult<OpenStatus> {
    let status = match query.at {
        Some(at) => state.engine.is_open_at(at).await,
        None => state.engine.is_open_now().await,
    };
    Ok(ApiResponse::success(status))
}

pub async fn get_formatted(
    State(state): State<AppState>,
    Query(query): Query<FormattedQuery>,
) -> ApiResult<FormattedHours> {
    let locale = match query.locale.as_deref() {
        Some(raw) => raw
            .parse::<Locale>()
            .map_err(|e| AppError::validation(e.to_string()).with_detail("locale", raw))?,
        None => state.engine.options().locale,
    };

    let schedule = state.engine.schedule().await;
    let lines = format_week_lines(&schedule, locale);
    let text = lines.join("\n");
    Ok(ApiResponse::success(FormattedHours { locale, lines, text }))
}

pub async fn validate_order_time(
    State(state): State<AppState>,
    Json(request): Json<ValidateTimeRequest>,
) -> ApiResult<OrderTimeValidation> {
    let validation = state.engine.validate_order_time(request.at).await;
    if !validation.valid {
        tracing::debug!(at = ?request.at, message = %validation.message, "Order time rejected");
    }
    Ok(ApiResponse::success(validation))
}
