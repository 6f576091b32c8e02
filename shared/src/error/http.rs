//! HTTP status for each error code

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    pub fn http_status(&self) -> StatusCode {
        match self {
            Self::Success => StatusCode::OK,
            Self::ValidationFailed | Self::ScheduleInvalid | Self::InvalidTimeFormat => {
                StatusCode::BAD_REQUEST
            }
            Self::NotAuthenticated | Self::TokenInvalid => StatusCode::UNAUTHORIZED,
            Self::DuplicateScheduleRows => StatusCode::CONFLICT,
            // Order times rejected by the schedule
            Self::OutsideBusinessHours | Self::OrderTimeInPast => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            Self::ScheduleSaveFailed | Self::DatabaseError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
