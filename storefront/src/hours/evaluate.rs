//! Open/closed evaluation over a canonical schedule
//!
//! Day attribution: an overnight period belongs to the day that declares
//! it. Its evening part is checked against that day, its early-morning
//! tail against the following calendar day. A day's own overnight period
//! never makes that same day's early morning open.

use chrono::{Datelike, NaiveDateTime, NaiveTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};
use shared::error::ErrorCode;
use shared::models::{DayHours, TimePeriod, WeeklySchedule, weekday_key};
use shared::util::format_hhmm;

use super::containment::{contains_carried_tail, contains_own_day};
use super::format::{Locale, day_name};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenStatus {
    pub is_open: bool,
    pub message: String,
    /// Close time of the period currently serving, when open
    #[serde(skip_serializing_if = "Option::is_none")]
    pub closes_at: Option<String>,
    /// Next opening "HH:MM", when closed and one exists within a week
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_open_time: Option<String>,
    /// Weekday key of the next opening
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_open_day: Option<String>,
    /// Hours of the evaluated calendar day
    pub today_hours: DayHours,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderTimeValidation {
    pub valid: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<ErrorCode>,
}

impl OrderTimeValidation {
    pub fn accepted() -> Self {
        Self {
            valid: true,
            message: "Order time is within business hours".to_string(),
            code: None,
        }
    }

    pub fn rejected(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            valid: false,
            message: message.into(),
            code: Some(code),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NextOpening {
    pub day: Weekday,
    pub time: NaiveTime,
    /// 0 = later the same day, 7 = same weekday next week
    pub days_ahead: u32,
}

impl NextOpening {
    /// "opens today at 18:30" / "opens tomorrow at 12:00" / "opens Friday at 12:00"
    pub fn describe(&self) -> String {
        let time = format_hhmm(self.time);
        match self.days_ahead {
            0 => format!("opens today at {}", time),
            1 => format!("opens tomorrow at {}", time),
            _ => format!("opens {} at {}", day_name(Locale::En, self.day), time),
        }
    }
}

/// Minute resolution: seconds never push an instant past an inclusive close
pub fn truncate_to_minute(t: NaiveTime) -> NaiveTime {
    NaiveTime::from_hms_opt(t.hour(), t.minute(), 0).unwrap_or(t)
}

/// The period serving local time `t` on `day`, if any
pub fn serving_period(schedule: &WeeklySchedule, day: Weekday, t: NaiveTime) -> Option<&TimePeriod> {
    let own = schedule
        .day(day)
        .periods()
        .into_iter()
        .find(|p| contains_own_day(p, t));
    own.or_else(|| {
        schedule
            .day(day.pred())
            .periods()
            .into_iter()
            .find(|p| contains_carried_tail(p, t))
    })
}

fn earliest_open(day: &DayHours, after: Option<NaiveTime>) -> Option<NaiveTime> {
    day.periods()
        .iter()
        .filter_map(|p| p.active_bounds().map(|(open, _)| open))
        .filter(|open| after.is_none_or(|t| *open > t))
        .min()
}

/// First opening strictly after `t` on `day`, looking up to one week ahead
pub fn next_opening(schedule: &WeeklySchedule, day: Weekday, t: NaiveTime) -> Option<NextOpening> {
    if let Some(time) = earliest_open(schedule.day(day), Some(t)) {
        return Some(NextOpening {
            day,
            time,
            days_ahead: 0,
        });
    }

    let mut candidate = day;
    for days_ahead in 1..=7 {
        candidate = candidate.succ();
        if let Some(time) = earliest_open(schedule.day(candidate), None) {
            return Some(NextOpening {
                day: candidate,
                time,
                days_ahead,
            });
        }
    }
    None
}

/// Open/closed status at a local (restaurant time zone) date-time
pub fn evaluate(schedule: &WeeklySchedule, at: NaiveDateTime) -> OpenStatus {
    let day = at.weekday();
    let t = truncate_to_minute(at.time());
    let today_hours = schedule.day(day).clone();

    if let Some(period) = serving_period(schedule, day, t) {
        let closes_at = period
            .active_bounds()
            .map(|(_, close)| format_hhmm(close))
            .unwrap_or_else(|| period.close_time.clone());
        return OpenStatus {
            is_open: true,
            message: format!("Open now, closes at {}", closes_at),
            closes_at: Some(closes_at),
            next_open_time: None,
            next_open_day: None,
            today_hours,
        };
    }

    match next_opening(schedule, day, t) {
        Some(next) => OpenStatus {
            is_open: false,
            message: format!("Closed now, {}", next.describe()),
            closes_at: None,
            next_open_time: Some(format_hhmm(next.time)),
            next_open_day: Some(weekday_key(next.day).to_string()),
            today_hours,
        },
        None => OpenStatus {
            is_open: false,
            message: "Closed, no opening hours scheduled".to_string(),
            closes_at: None,
            next_open_time: None,
            next_open_day: None,
            today_hours,
        },
    }
}

/// Containment check for a prospective order time
pub fn validate_order_at(schedule: &WeeklySchedule, at: NaiveDateTime) -> OrderTimeValidation {
    let day = at.weekday();
    let t = truncate_to_minute(at.time());
    if serving_period(schedule, day, t).is_some() {
        return OrderTimeValidation::accepted();
    }

    let message = match next_opening(schedule, day, t) {
        Some(next) => format!(
            "We are closed at the requested time ({} {}), {}",
            day_name(Locale::En, day),
            format_hhmm(t),
            next.describe()
        ),
        None => "We are not accepting orders: no opening hours scheduled".to_string(),
    };
    OrderTimeValidation::rejected(ErrorCode::OutsideBusinessHours, message)
}
