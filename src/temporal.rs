//! Temporal literals: ISO-8601 dates, date-times, durations and periods.
//!
//! Period bounds derived from a duration use calendar arithmetic: years,
//! months and days are applied first, then hours, minutes and seconds, one
//! unit at a time, so `2006-01-31/P1M` ends on the last day of February.

use std::{fmt, str::FromStr, sync::LazyLock};

use jiff::{
    Span, Zoned,
    civil::{Date, DateTime},
    tz::{Offset, TimeZone},
};
use regex::{Captures, Regex};
use thiserror::Error as ThisError;

static DATE_TIME_PARTS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^([0-9]{4})-([0-9]{2})-([0-9]{2})(?:T([0-9]{2}):([0-9]{2}):([0-9]{2})(?:\.([0-9]+))?)?(Z|[+-][0-9]{2}(?::?[0-9]{2})?)?$",
    )
    .expect("date-time pattern is valid")
});

static DURATION_PARTS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:P(?:([0-9]+)Y)?(?:([0-9]+)M)?(?:([0-9]+)D)?)?(?:T(?:([0-9]+)H)?(?:([0-9]+)M)?(?:([0-9]+)S)?)?$",
    )
    .expect("duration pattern is valid")
});

#[derive(Debug, Clone, PartialEq, ThisError)]
pub enum TemporalError {
    #[error("malformed date-time '{0}'")]
    Malformed(String),

    #[error("'{0}' has no time component; a date-time is required here")]
    MissingTime(String),

    #[error("malformed duration '{0}'")]
    MalformedDuration(String),

    #[error("date arithmetic out of range: {0}")]
    OutOfRange(String),
}

/// Whether `text` is an ISO-8601 duration (`P1Y2M3DT4H5M6S`, `P30D`, `T5H`).
pub fn is_duration(text: &str) -> bool {
    (text.starts_with('P') || text.starts_with('T'))
        && !text.ends_with('T')
        && text.chars().any(|c| c.is_ascii_digit())
        && DURATION_PARTS.is_match(text)
}

fn number<T: FromStr>(caps: &Captures<'_>, index: usize, text: &str) -> Result<T, TemporalError> {
    caps.get(index)
        .map_or("0", |m| m.as_str())
        .parse()
        .map_err(|_| TemporalError::Malformed(text.to_string()))
}

fn parse_offset(suffix: Option<&str>, text: &str) -> Result<Offset, TemporalError> {
    let Some(suffix) = suffix else {
        return Ok(Offset::UTC);
    };
    if suffix.eq_ignore_ascii_case("Z") {
        return Ok(Offset::UTC);
    }

    let sign = if suffix.starts_with('-') { -1 } else { 1 };
    let digits: String = suffix[1..].chars().filter(char::is_ascii_digit).collect();
    let hours: i32 = digits
        .get(..2)
        .ok_or_else(|| TemporalError::Malformed(text.to_string()))?
        .parse()
        .map_err(|_| TemporalError::Malformed(text.to_string()))?;
    let minutes: i32 = match digits.get(2..4) {
        Some(m) => m
            .parse()
            .map_err(|_| TemporalError::Malformed(text.to_string()))?,
        None => 0,
    };

    Offset::from_seconds(sign * (hours * 3600 + minutes * 60))
        .map_err(|_| TemporalError::Malformed(text.to_string()))
}

/// Parses a calendar date (`2006-11-30`).
pub fn parse_date(text: &str) -> Result<Date, TemporalError> {
    let caps = DATE_TIME_PARTS
        .captures(text)
        .ok_or_else(|| TemporalError::Malformed(text.to_string()))?;
    if caps.get(4).is_some() || caps.get(8).is_some() {
        return Err(TemporalError::Malformed(text.to_string()));
    }

    Date::new(number(&caps, 1, text)?, number(&caps, 2, text)?, number(&caps, 3, text)?)
        .map_err(|_| TemporalError::Malformed(text.to_string()))
}

/// Parses a date-time; a missing offset means UTC.
pub fn parse_date_time(text: &str) -> Result<Zoned, TemporalError> {
    let caps = DATE_TIME_PARTS
        .captures(text)
        .ok_or_else(|| TemporalError::Malformed(text.to_string()))?;
    if caps.get(4).is_none() {
        return Err(TemporalError::MissingTime(text.to_string()));
    }

    let nanos = match caps.get(7) {
        Some(fraction) => {
            let mut digits: String = fraction.as_str().chars().take(9).collect();
            while digits.len() < 9 {
                digits.push('0');
            }
            digits
                .parse::<i32>()
                .map_err(|_| TemporalError::Malformed(text.to_string()))?
        }
        None => 0,
    };

    let civil = DateTime::new(
        number(&caps, 1, text)?,
        number(&caps, 2, text)?,
        number(&caps, 3, text)?,
        number(&caps, 4, text)?,
        number(&caps, 5, text)?,
        number(&caps, 6, text)?,
        nanos,
    )
    .map_err(|_| TemporalError::Malformed(text.to_string()))?;

    let offset = parse_offset(caps.get(8).map(|m| m.as_str()), text)?;
    civil
        .to_zoned(TimeZone::fixed(offset))
        .map_err(|e| TemporalError::OutOfRange(e.to_string()))
}

pub fn format_date(date: &Date) -> String {
    format!("{:04}-{:02}-{:02}", date.year(), date.month(), date.day())
}

/// Canonical text for a date-time: seconds precision, fractional part only
/// when non-zero, `Z` for UTC.
pub fn format_date_time(instant: &Zoned) -> String {
    let dt = instant.datetime();
    let mut text = format!(
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}",
        dt.year(),
        dt.month(),
        dt.day(),
        dt.hour(),
        dt.minute(),
        dt.second()
    );

    let nanos = dt.subsec_nanosecond();
    if nanos != 0 {
        if nanos % 1_000_000 == 0 {
            text.push_str(&format!(".{:03}", nanos / 1_000_000));
        } else {
            text.push_str(&format!(".{:09}", nanos).trim_end_matches('0').to_string());
        }
    }

    let offset = instant.offset().seconds();
    if offset == 0 {
        text.push('Z');
    } else {
        let sign = if offset < 0 { '-' } else { '+' };
        let total = offset.abs();
        text.push_str(&format!("{}{:02}:{:02}", sign, total / 3600, (total % 3600) / 60));
    }
    text
}

#[derive(Debug, Clone, Copy)]
enum CalendarUnit {
    Years,
    Months,
    Days,
    Hours,
    Minutes,
    Seconds,
}

impl CalendarUnit {
    fn span(self, amount: i64) -> Result<Span, jiff::Error> {
        let span = Span::new();
        match self {
            CalendarUnit::Years => span.try_years(amount),
            CalendarUnit::Months => span.try_months(amount),
            CalendarUnit::Days => span.try_days(amount),
            CalendarUnit::Hours => span.try_hours(amount),
            CalendarUnit::Minutes => span.try_minutes(amount),
            CalendarUnit::Seconds => span.try_seconds(amount),
        }
    }
}

/// ISO-8601 duration with calendar components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Duration {
    pub years: i64,
    pub months: i64,
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

impl Duration {
    fn components(&self) -> [(i64, CalendarUnit); 6] {
        [
            (self.years, CalendarUnit::Years),
            (self.months, CalendarUnit::Months),
            (self.days, CalendarUnit::Days),
            (self.hours, CalendarUnit::Hours),
            (self.minutes, CalendarUnit::Minutes),
            (self.seconds, CalendarUnit::Seconds),
        ]
    }

    fn shift(&self, instant: &Zoned, sign: i64) -> Result<Zoned, TemporalError> {
        let mut current = instant.clone();
        for (amount, unit) in self.components() {
            if amount == 0 {
                continue;
            }
            let span = unit
                .span(sign * amount)
                .map_err(|e| TemporalError::OutOfRange(e.to_string()))?;
            current = current
                .checked_add(span)
                .map_err(|e| TemporalError::OutOfRange(e.to_string()))?;
        }
        Ok(current)
    }

    pub fn add_to(&self, instant: &Zoned) -> Result<Zoned, TemporalError> {
        self.shift(instant, 1)
    }

    pub fn subtract_from(&self, instant: &Zoned) -> Result<Zoned, TemporalError> {
        self.shift(instant, -1)
    }
}

impl FromStr for Duration {
    type Err = TemporalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !is_duration(s) {
            return Err(TemporalError::MalformedDuration(s.to_string()));
        }
        let caps = DURATION_PARTS
            .captures(s)
            .ok_or_else(|| TemporalError::MalformedDuration(s.to_string()))?;
        let part = |index: usize| -> Result<i64, TemporalError> {
            caps.get(index)
                .map_or(Ok(0), |m| m.as_str().parse())
                .map_err(|_| TemporalError::MalformedDuration(s.to_string()))
        };

        Ok(Duration {
            years: part(1)?,
            months: part(2)?,
            days: part(3)?,
            hours: part(4)?,
            minutes: part(5)?,
            seconds: part(6)?,
        })
    }
}

impl fmt::Display for Duration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("P")?;
        for (amount, suffix) in [(self.years, 'Y'), (self.months, 'M'), (self.days, 'D')] {
            if amount != 0 {
                write!(f, "{}{}", amount, suffix)?;
            }
        }
        if self.hours != 0 || self.minutes != 0 || self.seconds != 0 {
            f.write_str("T")?;
            for (amount, suffix) in [(self.hours, 'H'), (self.minutes, 'M'), (self.seconds, 'S')] {
                if amount != 0 {
                    write!(f, "{}{}", amount, suffix)?;
                }
            }
        }
        Ok(())
    }
}

/// Closed time interval.
#[derive(Debug, Clone, PartialEq)]
pub struct Period {
    pub begin: Zoned,
    pub end: Zoned,
}

impl Period {
    pub fn new(begin: Zoned, end: Zoned) -> Self {
        Period { begin, end }
    }

    /// `begin/duration`
    pub fn starting_at(begin: Zoned, duration: &Duration) -> Result<Self, TemporalError> {
        let end = duration.add_to(&begin)?;
        Ok(Period { begin, end })
    }

    /// `duration/end`
    pub fn ending_at(duration: &Duration, end: Zoned) -> Result<Self, TemporalError> {
        let begin = duration.subtract_from(&end)?;
        Ok(Period { begin, end })
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}",
            format_date_time(&self.begin),
            format_date_time(&self.end)
        )
    }
}
