//! Business Hours Model
//!
//! The weekly schedule is persisted as a single settings row (key
//! [`BUSINESS_HOURS_KEY`]). Two document shapes exist in stored data:
//!
//! - legacy: one continuous period per day
//!   `{ "isOpen": true, "openTime": "12:00", "closeTime": "23:00" }`
//! - current: a lunch and a dinner period per day
//!   `{ "lunch": { .. }, "dinner": { .. } }`
//!
//! Both are accepted on read and normalized into the canonical
//! lunch/dinner [`DayHours`]. Only the canonical shape is ever written.

use chrono::{NaiveTime, Timelike, Weekday};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::error::{AppError, AppResult};
use crate::util::{format_hhmm, parse_hhmm};

/// Settings key of the schedule row
pub const BUSINESS_HOURS_KEY: &str = "businessHours";

/// Display order of the week
pub const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Placeholder times carried by a closed lunch period
pub const DEFAULT_LUNCH: (&str, &str) = ("12:00", "15:30");
/// Placeholder times carried by a closed dinner period
pub const DEFAULT_DINNER: (&str, &str) = ("18:00", "23:00");

/// Legacy periods opening before this hour become lunch
const LUNCH_CUTOFF_HOUR: u32 = 16;
/// Legacy periods closing at or after this hour also become dinner
const DINNER_CLOSE_HOUR: u32 = 18;
const LUNCH_CLIPPED_CLOSE: &str = "15:30";
const LUNCH_CLIPPED_CLOSE_MINUTE: u32 = 15 * 60 + 30;
const DINNER_CLAMPED_OPEN: &str = "18:00";

/// Lowercase JSON key for a weekday
pub fn weekday_key(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "monday",
        Weekday::Tue => "tuesday",
        Weekday::Wed => "wednesday",
        Weekday::Thu => "thursday",
        Weekday::Fri => "friday",
        Weekday::Sat => "saturday",
        Weekday::Sun => "sunday",
    }
}

/// A single open/close pair within a day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimePeriod {
    #[serde(default)]
    pub is_open: bool,
    /// "HH:MM", 24-hour
    #[serde(default)]
    pub open_time: String,
    /// "HH:MM", 24-hour. Earlier than `open_time` for overnight periods.
    #[serde(default)]
    pub close_time: String,
}

impl TimePeriod {
    pub fn open(open_time: impl Into<String>, close_time: impl Into<String>) -> Self {
        Self {
            is_open: true,
            open_time: open_time.into(),
            close_time: close_time.into(),
        }
    }

    pub fn closed(open_time: impl Into<String>, close_time: impl Into<String>) -> Self {
        Self {
            is_open: false,
            open_time: open_time.into(),
            close_time: close_time.into(),
        }
    }

    fn closed_lunch() -> Self {
        Self::closed(DEFAULT_LUNCH.0, DEFAULT_LUNCH.1)
    }

    fn closed_dinner() -> Self {
        Self::closed(DEFAULT_DINNER.0, DEFAULT_DINNER.1)
    }

    /// Parsed open/close bounds; `None` when either string is malformed
    pub fn bounds(&self) -> Option<(NaiveTime, NaiveTime)> {
        Some((parse_hhmm(&self.open_time)?, parse_hhmm(&self.close_time)?))
    }

    /// Open and with well-formed bounds
    pub fn active_bounds(&self) -> Option<(NaiveTime, NaiveTime)> {
        if self.is_open { self.bounds() } else { None }
    }

    /// Close time earlier than open time
    pub fn is_overnight(&self) -> bool {
        matches!(self.bounds(), Some((open, close)) if close < open)
    }
}

/// Canonical hours of one day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayHours {
    pub lunch: TimePeriod,
    pub dinner: TimePeriod,
}

impl DayHours {
    pub fn new(lunch: TimePeriod, dinner: TimePeriod) -> Self {
        Self { lunch, dinner }
    }

    /// Both periods closed
    pub fn closed() -> Self {
        Self {
            lunch: TimePeriod::closed_lunch(),
            dinner: TimePeriod::closed_dinner(),
        }
    }

    /// Periods in chronological order of the day
    pub fn periods(&self) -> [&TimePeriod; 2] {
        [&self.lunch, &self.dinner]
    }

    /// No period of the day can ever report open
    pub fn is_closed_all_day(&self) -> bool {
        self.periods().iter().all(|p| p.active_bounds().is_none())
    }
}

/// Single continuous period per day (legacy documents)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyDayHours {
    pub is_open: bool,
    #[serde(default)]
    pub open_time: String,
    #[serde(default)]
    pub close_time: String,
}

impl LegacyDayHours {
    /// Split the single period into lunch and dinner.
    ///
    /// - opens before 16:00 → lunch, close clipped to 15:30 if it runs past 16:00;
    ///   a lunch that would then close at or before its open stays closed
    /// - opens at/after 16:00, or closes at/after 18:00 (overnight closes count)
    ///   → dinner, open clamped to 18:00 if it started before 16:00
    /// - anything else leaves the sub-period closed
    ///
    /// Malformed times or `isOpen: false` yield a fully closed day.
    pub fn reconcile(&self) -> DayHours {
        if !self.is_open {
            return DayHours::closed();
        }
        let (Some(open), Some(close)) = (parse_hhmm(&self.open_time), parse_hhmm(&self.close_time))
        else {
            return DayHours::closed();
        };

        let overnight = close < open;
        let opens_for_lunch = open.hour() < LUNCH_CUTOFF_HOUR;

        let runs_past_cutoff = overnight || minute_of_day(close) > LUNCH_CUTOFF_HOUR * 60;
        let lunch = if !opens_for_lunch {
            TimePeriod::closed_lunch()
        } else if !runs_past_cutoff {
            TimePeriod::open(format_hhmm(open), format_hhmm(close))
        } else if minute_of_day(open) < LUNCH_CLIPPED_CLOSE_MINUTE {
            TimePeriod::open(format_hhmm(open), LUNCH_CLIPPED_CLOSE)
        } else {
            // Clipping would end lunch before it starts
            TimePeriod::closed_lunch()
        };

        let closes_late = overnight || close.hour() >= DINNER_CLOSE_HOUR;
        let dinner = if !opens_for_lunch || closes_late {
            let dinner_open = if opens_for_lunch {
                DINNER_CLAMPED_OPEN.to_string()
            } else {
                format_hhmm(open)
            };
            TimePeriod::open(dinner_open, format_hhmm(close))
        } else {
            TimePeriod::closed_dinner()
        };

        DayHours { lunch, dinner }
    }
}

/// Either stored shape of a day entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StoredDayHours {
    Split(DayHours),
    Legacy(LegacyDayHours),
}

impl StoredDayHours {
    pub fn is_legacy(&self) -> bool {
        matches!(self, StoredDayHours::Legacy(_))
    }

    pub fn into_canonical(self) -> DayHours {
        match self {
            StoredDayHours::Split(day) => day,
            StoredDayHours::Legacy(legacy) => legacy.reconcile(),
        }
    }
}

/// Seven days of canonical hours
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeeklySchedule {
    pub monday: DayHours,
    pub tuesday: DayHours,
    pub wednesday: DayHours,
    pub thursday: DayHours,
    pub friday: DayHours,
    pub saturday: DayHours,
    pub sunday: DayHours,
}

impl WeeklySchedule {
    /// Same hours every day
    pub fn uniform(day: DayHours) -> Self {
        Self {
            monday: day.clone(),
            tuesday: day.clone(),
            wednesday: day.clone(),
            thursday: day.clone(),
            friday: day.clone(),
            saturday: day.clone(),
            sunday: day,
        }
    }

    pub fn day(&self, day: Weekday) -> &DayHours {
        match day {
            Weekday::Mon => &self.monday,
            Weekday::Tue => &self.tuesday,
            Weekday::Wed => &self.wednesday,
            Weekday::Thu => &self.thursday,
            Weekday::Fri => &self.friday,
            Weekday::Sat => &self.saturday,
            Weekday::Sun => &self.sunday,
        }
    }

    pub fn day_mut(&mut self, day: Weekday) -> &mut DayHours {
        match day {
            Weekday::Mon => &mut self.monday,
            Weekday::Tue => &mut self.tuesday,
            Weekday::Wed => &mut self.wednesday,
            Weekday::Thu => &mut self.thursday,
            Weekday::Fri => &mut self.friday,
            Weekday::Sat => &mut self.saturday,
            Weekday::Sun => &mut self.sunday,
        }
    }

    /// Monday → Sunday
    pub fn iter(&self) -> impl Iterator<Item = (Weekday, &DayHours)> {
        WEEK.iter().map(move |&d| (d, self.day(d)))
    }

    /// Reject open periods with malformed times before they are persisted
    pub fn validate(&self) -> AppResult<()> {
        for (day, hours) in self.iter() {
            for (name, period) in [("lunch", &hours.lunch), ("dinner", &hours.dinner)] {
                if !period.is_open {
                    continue;
                }
                for value in [&period.open_time, &period.close_time] {
                    if parse_hhmm(value).is_none() {
                        return Err(AppError::invalid_time(value.as_str())
                            .with_detail("day", weekday_key(day))
                            .with_detail("period", name));
                    }
                }
            }
        }
        Ok(())
    }

    /// Normalize a stored settings value into the canonical shape.
    ///
    /// Unknown or missing day entries become closed days. A value where
    /// no day is recognizable is rejected as a whole.
    pub fn from_stored(value: &Value) -> Result<ReconciledSchedule, ScheduleShapeError> {
        let object = value.as_object().ok_or(ScheduleShapeError::NotAnObject)?;

        let mut schedule = WeeklySchedule::uniform(DayHours::closed());
        let mut legacy_days = Vec::new();
        let mut invalid_days = Vec::new();

        for day in WEEK {
            let key = weekday_key(day);
            let entry = object.get(key).or_else(|| object.get(&capitalize(key)));
            let parsed = entry.and_then(|v| serde_json::from_value::<StoredDayHours>(v.clone()).ok());
            match parsed {
                Some(stored) => {
                    if stored.is_legacy() {
                        legacy_days.push(day);
                    }
                    *schedule.day_mut(day) = stored.into_canonical();
                }
                None => invalid_days.push(day),
            }
        }

        if invalid_days.len() == WEEK.len() {
            return Err(ScheduleShapeError::NoRecognizedDays);
        }

        Ok(ReconciledSchedule {
            schedule,
            legacy_days,
            invalid_days,
        })
    }

    /// Canonical JSON document for the settings row
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

impl Default for WeeklySchedule {
    /// Documented fallback used whenever the stored schedule is unavailable:
    /// closed on Monday, lunch 12:00-15:30 and dinner 18:30-23:30 otherwise.
    fn default() -> Self {
        let open_day = DayHours::new(
            TimePeriod::open("12:00", "15:30"),
            TimePeriod::open("18:30", "23:30"),
        );
        let mut schedule = Self::uniform(open_day);
        schedule.monday = DayHours::closed();
        schedule
    }
}

/// Result of normalizing a stored document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconciledSchedule {
    pub schedule: WeeklySchedule,
    /// Days stored in the legacy single-period shape
    pub legacy_days: Vec<Weekday>,
    /// Days missing or unparseable, now closed
    pub invalid_days: Vec<Weekday>,
}

impl ReconciledSchedule {
    /// Stored document was already canonical and complete
    pub fn is_canonical(&self) -> bool {
        self.legacy_days.is_empty() && self.invalid_days.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleShapeError {
    #[error("schedule value is not a JSON object")]
    NotAnObject,
    #[error("schedule value contains no recognizable day entries")]
    NoRecognizedDays,
}

fn minute_of_day(t: NaiveTime) -> u32 {
    t.hour() * 60 + t.minute()
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn legacy(open: &str, close: &str) -> LegacyDayHours {
        LegacyDayHours {
            is_open: true,
            open_time: open.to_string(),
            close_time: close.to_string(),
        }
    }

    #[test]
    fn test_legacy_full_day_splits_into_lunch_and_dinner() {
        let day = legacy("12:00", "23:00").reconcile();
        assert_eq!(day.lunch, TimePeriod::open("12:00", "15:30"));
        assert_eq!(day.dinner, TimePeriod::open("18:00", "23:00"));
    }

    #[test]
    fn test_legacy_reconcile_is_idempotent() {
        let record = legacy("11:30", "22:45");
        let first = record.reconcile();
        let second = record.reconcile();
        assert_eq!(first, second);

        // Re-reading the canonical output keeps it unchanged
        let value = serde_json::to_value(&first).unwrap();
        let reread: StoredDayHours = serde_json::from_value(value).unwrap();
        assert!(!reread.is_legacy());
        assert_eq!(reread.into_canonical(), first);
    }

    #[test]
    fn test_legacy_lunch_only() {
        let day = legacy("12:00", "15:00").reconcile();
        assert_eq!(day.lunch, TimePeriod::open("12:00", "15:00"));
        assert!(!day.dinner.is_open);
    }

    #[test]
    fn test_legacy_lunch_past_cutoff_is_clipped() {
        let day = legacy("11:00", "17:00").reconcile();
        assert_eq!(day.lunch, TimePeriod::open("11:00", "15:30"));
        assert!(!day.dinner.is_open);
    }

    #[test]
    fn test_legacy_late_afternoon_open_never_wraps_lunch() {
        for open in ["15:30", "15:45"] {
            let day = legacy(open, "23:00").reconcile();
            assert!(!day.lunch.is_open, "lunch opened for {open}");
            assert!(!day.lunch.is_overnight());
            assert_eq!(day.dinner, TimePeriod::open("18:00", "23:00"));
        }

        let day = legacy("15:29", "23:00").reconcile();
        assert_eq!(day.lunch, TimePeriod::open("15:29", "15:30"));
    }

    #[test]
    fn test_legacy_dinner_only() {
        let day = legacy("19:00", "23:30").reconcile();
        assert!(!day.lunch.is_open);
        assert_eq!(day.dinner, TimePeriod::open("19:00", "23:30"));
    }

    #[test]
    fn test_legacy_overnight_keeps_late_close() {
        let day = legacy("18:30", "02:00").reconcile();
        assert!(!day.lunch.is_open);
        assert_eq!(day.dinner, TimePeriod::open("18:30", "02:00"));

        let day = legacy("12:00", "01:00").reconcile();
        assert_eq!(day.lunch, TimePeriod::open("12:00", "15:30"));
        assert_eq!(day.dinner, TimePeriod::open("18:00", "01:00"));
    }

    #[test]
    fn test_legacy_closed_or_malformed_is_closed() {
        let mut record = legacy("12:00", "23:00");
        record.is_open = false;
        assert!(record.reconcile().is_closed_all_day());

        assert!(legacy("noon", "23:00").reconcile().is_closed_all_day());
        assert!(legacy("12:00", "25:00").reconcile().is_closed_all_day());
    }

    #[test]
    fn test_legacy_times_are_normalized() {
        let day = legacy("9:00", "14:00").reconcile();
        assert_eq!(day.lunch, TimePeriod::open("09:00", "14:00"));
    }

    #[test]
    fn test_stored_shapes_deserialize() {
        let split: StoredDayHours = serde_json::from_value(json!({
            "lunch": { "isOpen": false },
            "dinner": { "isOpen": true, "openTime": "18:30", "closeTime": "02:00" }
        }))
        .unwrap();
        assert!(!split.is_legacy());

        let old: StoredDayHours = serde_json::from_value(json!({
            "isOpen": true, "openTime": "12:00", "closeTime": "23:00"
        }))
        .unwrap();
        assert!(old.is_legacy());

        let unknown = serde_json::from_value::<StoredDayHours>(json!({ "hours": "12-23" }));
        assert!(unknown.is_err());
    }

    #[test]
    fn test_from_stored_mixed_document() {
        let value = json!({
            "monday": { "isOpen": false, "openTime": "12:00", "closeTime": "23:00" },
            "Tuesday": { "isOpen": true, "openTime": "12:00", "closeTime": "23:00" },
            "wednesday": {
                "lunch": { "isOpen": true, "openTime": "12:00", "closeTime": "14:30" },
                "dinner": { "isOpen": true, "openTime": "18:00", "closeTime": "23:00" }
            },
            "thursday": "garbage"
        });

        let reconciled = WeeklySchedule::from_stored(&value).unwrap();
        assert_eq!(reconciled.legacy_days, vec![Weekday::Mon, Weekday::Tue]);
        assert_eq!(
            reconciled.invalid_days,
            vec![Weekday::Thu, Weekday::Fri, Weekday::Sat, Weekday::Sun]
        );
        assert!(!reconciled.is_canonical());

        let schedule = reconciled.schedule;
        assert!(schedule.monday.is_closed_all_day());
        assert_eq!(schedule.tuesday.lunch, TimePeriod::open("12:00", "15:30"));
        assert_eq!(schedule.wednesday.lunch, TimePeriod::open("12:00", "14:30"));
        assert!(schedule.thursday.is_closed_all_day());
    }

    #[test]
    fn test_from_stored_rejects_unrecognized_shapes() {
        assert_eq!(
            WeeklySchedule::from_stored(&json!([1, 2, 3])),
            Err(ScheduleShapeError::NotAnObject)
        );
        assert_eq!(
            WeeklySchedule::from_stored(&json!({ "open": true })),
            Err(ScheduleShapeError::NoRecognizedDays)
        );
    }

    #[test]
    fn test_canonical_document_round_trips_as_canonical() {
        let schedule = WeeklySchedule::default();
        let reconciled = WeeklySchedule::from_stored(&schedule.to_value()).unwrap();
        assert!(reconciled.is_canonical());
        assert_eq!(reconciled.schedule, schedule);
    }

    #[test]
    fn test_default_schedule_has_all_days() {
        let schedule = WeeklySchedule::default();
        assert_eq!(schedule.iter().count(), 7);
        assert!(schedule.monday.is_closed_all_day());
        assert!(!schedule.saturday.is_closed_all_day());
        assert!(schedule.validate().is_ok());

        let value = schedule.to_value();
        for day in WEEK {
            assert!(value.get(weekday_key(day)).is_some());
        }
    }

    #[test]
    fn test_validate_rejects_malformed_open_period() {
        let mut schedule = WeeklySchedule::default();
        schedule.friday.dinner = TimePeriod::open("18:00", "25:00");
        let err = schedule.validate().unwrap_err();
        assert_eq!(err.code, crate::error::ErrorCode::InvalidTimeFormat);
        let details = err.details.unwrap();
        assert_eq!(details.get("day").unwrap(), "friday");
        assert_eq!(details.get("period").unwrap(), "dinner");

        // Closed periods may carry anything
        schedule.friday.dinner = TimePeriod::closed("", "");
        assert!(schedule.validate().is_ok());
    }

    #[test]
    fn test_overnight_detection() {
        assert!(TimePeriod::open("18:30", "02:00").is_overnight());
        assert!(!TimePeriod::open("12:00", "14:30").is_overnight());
        assert!(!TimePeriod::open("bad", "02:00").is_overnight());
    }
}
