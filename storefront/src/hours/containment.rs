//! Interval containment
//!
//! A period `[open, close]` is inclusive at minute resolution. When
//! `close < open` the period crosses midnight and covers both the evening
//! (`t >= open`) and the early-morning tail (`t <= close`).

use chrono::NaiveTime;
use shared::models::{DayHours, TimePeriod};

pub fn contains(open: NaiveTime, close: NaiveTime, t: NaiveTime) -> bool {
    if close >= open {
        open <= t && t <= close
    } else {
        t >= open || t <= close
    }
}

/// Closed periods and malformed times never contain anything
pub fn period_contains(period: &TimePeriod, t: NaiveTime) -> bool {
    match period.active_bounds() {
        Some((open, close)) => contains(open, close, t),
        None => false,
    }
}

/// Any period of the day contains `t`
pub fn day_contains(day: &DayHours, t: NaiveTime) -> bool {
    day.periods().iter().any(|p| period_contains(p, t))
}

/// Part of the period that belongs to the declaring day itself: the whole
/// period when same-day, only the evening part when overnight.
pub fn contains_own_day(period: &TimePeriod, t: NaiveTime) -> bool {
    match period.active_bounds() {
        Some((open, close)) if close >= open => open <= t && t <= close,
        Some((open, _)) => t >= open,
        None => false,
    }
}

/// Early-morning tail an overnight period spills into the next day
pub fn contains_carried_tail(period: &TimePeriod, t: NaiveTime) -> bool {
    match period.active_bounds() {
        Some((open, close)) if close < open => t <= close,
        _ => false,
    }
}
