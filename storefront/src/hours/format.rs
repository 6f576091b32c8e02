//! Display formatting of the weekly schedule

use std::fmt;
use std::str::FromStr;

use chrono::Weekday;
use serde::{Deserialize, Serialize};
use shared::models::{DayHours, WeeklySchedule};
use shared::util::format_hhmm;

/// Display language of formatted hours
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Es,
    It,
}

impl Locale {
    pub fn as_str(&self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Es => "es",
            Locale::It => "it",
        }
    }

    fn closed_label(&self) -> &'static str {
        match self {
            Locale::En => "Closed",
            Locale::Es => "Cerrado",
            Locale::It => "Chiuso",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownLocale(pub String);

impl fmt::Display for UnknownLocale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unsupported locale '{}' (expected en, es or it)", self.0)
    }
}

impl std::error::Error for UnknownLocale {}

impl FromStr for Locale {
    type Err = UnknownLocale;

    /// Accepts bare language codes and region-tagged ones ("it-IT", "es_ES")
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lang = s
            .trim()
            .split(['-', '_'])
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase();
        match lang.as_str() {
            "en" => Ok(Locale::En),
            "es" => Ok(Locale::Es),
            "it" => Ok(Locale::It),
            _ => Err(UnknownLocale(s.to_string())),
        }
    }
}

pub fn day_abbreviation(locale: Locale, day: Weekday) -> &'static str {
    match (locale, day) {
        (Locale::En, Weekday::Mon) => "Mon",
        (Locale::En, Weekday::Tue) => "Tue",
        (Locale::En, Weekday::Wed) => "Wed",
        (Locale::En, Weekday::Thu) => "Thu",
        (Locale::En, Weekday::Fri) => "Fri",
        (Locale::En, Weekday::Sat) => "Sat",
        (Locale::En, Weekday::Sun) => "Sun",
        (Locale::Es, Weekday::Mon) => "Lun",
        (Locale::Es, Weekday::Tue) => "Mar",
        (Locale::Es, Weekday::Wed) => "Mié",
        (Locale::Es, Weekday::Thu) => "Jue",
        (Locale::Es, Weekday::Fri) => "Vie",
        (Locale::Es, Weekday::Sat) => "Sáb",
        (Locale::Es, Weekday::Sun) => "Dom",
        (Locale::It, Weekday::Mon) => "Lun",
        (Locale::It, Weekday::Tue) => "Mar",
        (Locale::It, Weekday::Wed) => "Mer",
        (Locale::It, Weekday::Thu) => "Gio",
        (Locale::It, Weekday::Fri) => "Ven",
        (Locale::It, Weekday::Sat) => "Sab",
        (Locale::It, Weekday::Sun) => "Dom",
    }
}

pub fn day_name(locale: Locale, day: Weekday) -> &'static str {
    match (locale, day) {
        (Locale::En, Weekday::Mon) => "Monday",
        (Locale::En, Weekday::Tue) => "Tuesday",
        (Locale::En, Weekday::Wed) => "Wednesday",
        (Locale::En, Weekday::Thu) => "Thursday",
        (Locale::En, Weekday::Fri) => "Friday",
        (Locale::En, Weekday::Sat) => "Saturday",
        (Locale::En, Weekday::Sun) => "Sunday",
        (Locale::Es, Weekday::Mon) => "Lunes",
        (Locale::Es, Weekday::Tue) => "Martes",
        (Locale::Es, Weekday::Wed) => "Miércoles",
        (Locale::Es, Weekday::Thu) => "Jueves",
        (Locale::Es, Weekday::Fri) => "Viernes",
        (Locale::Es, Weekday::Sat) => "Sábado",
        (Locale::Es, Weekday::Sun) => "Domingo",
        (Locale::It, Weekday::Mon) => "Lunedì",
        (Locale::It, Weekday::Tue) => "Martedì",
        (Locale::It, Weekday::Wed) => "Mercoledì",
        (Locale::It, Weekday::Thu) => "Giovedì",
        (Locale::It, Weekday::Fri) => "Venerdì",
        (Locale::It, Weekday::Sat) => "Sabato",
        (Locale::It, Weekday::Sun) => "Domenica",
    }
}

/// "12:00-15:30, 18:30-23:30", or the localized "Closed"
pub fn format_day(locale: Locale, hours: &DayHours) -> String {
    let ranges: Vec<String> = hours
        .periods()
        .iter()
        .filter_map(|p| p.active_bounds())
        .map(|(open, close)| format!("{}-{}", format_hhmm(open), format_hhmm(close)))
        .collect();

    if ranges.is_empty() {
        locale.closed_label().to_string()
    } else {
        ranges.join(", ")
    }
}

/// One line per day, Monday first
pub fn format_week_lines(schedule: &WeeklySchedule, locale: Locale) -> Vec<String> {
    schedule
        .iter()
        .map(|(day, hours)| format!("{}: {}", day_abbreviation(locale, day), format_day(locale, hours)))
        .collect()
}

pub fn format_week(schedule: &WeeklySchedule, locale: Locale) -> String {
    format_week_lines(schedule, locale).join("\n")
}
