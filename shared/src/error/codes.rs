//! Error codes raised by the storefront
//!
//! - 0xxx: request-level failures
//! - 1xxx: admin authentication
//! - 4xxx: business hours and order times
//! - 9xxx: backing services

use serde::{Deserialize, Serialize};
use std::fmt;

/// Numeric error code, serialized as a bare `u16`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    Success = 0,
    /// Malformed query or body
    ValidationFailed = 2,

    /// No bearer token on an admin route
    NotAuthenticated = 1001,
    /// Bearer token does not match
    TokenInvalid = 1004,

    /// Schedule document has an unrecognized shape or missing days
    ScheduleInvalid = 4002,
    /// Time is not a valid 24-hour "HH:MM" string
    InvalidTimeFormat = 4003,
    /// Settings store rejected the schedule write
    ScheduleSaveFailed = 4004,
    /// More than one settings row exists for the schedule key
    DuplicateScheduleRows = 4005,
    OutsideBusinessHours = 4101,
    OrderTimeInPast = 4102,

    /// Settings store unreachable or failing
    DatabaseError = 9002,
}

impl ErrorCode {
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Default English message
    pub const fn message(&self) -> &'static str {
        match self {
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotAuthenticated => "Caller is not authenticated",
            ErrorCode::TokenInvalid => "Authentication token is invalid",
            ErrorCode::ScheduleInvalid => "Business hours document is invalid",
            ErrorCode::InvalidTimeFormat => "Time must use the 24-hour HH:MM format",
            ErrorCode::ScheduleSaveFailed => "Failed to save business hours",
            ErrorCode::DuplicateScheduleRows => "Duplicate business hours rows found",
            ErrorCode::OutsideBusinessHours => "Order time is outside business hours",
            ErrorCode::OrderTimeInPast => "Order time is in the past",
            ErrorCode::DatabaseError => "Settings store error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// A `u16` outside the known code table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        let code = match value {
            0 => ErrorCode::Success,
            2 => ErrorCode::ValidationFailed,
            1001 => ErrorCode::NotAuthenticated,
            1004 => ErrorCode::TokenInvalid,
            4002 => ErrorCode::ScheduleInvalid,
            4003 => ErrorCode::InvalidTimeFormat,
            4004 => ErrorCode::ScheduleSaveFailed,
            4005 => ErrorCode::DuplicateScheduleRows,
            4101 => ErrorCode::OutsideBusinessHours,
            4102 => ErrorCode::OrderTimeInPast,
            9002 => ErrorCode::DatabaseError,
            _ => return Err(InvalidErrorCode(value)),
        };
        Ok(code)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
