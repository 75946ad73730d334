//! Temporal conversions
//!
//! ```text
//! from \ to       NaiveDate   NaiveTime      NaiveDateTime   TimeDelta
//! NaiveDate       exact       -              midnight        -
//! NaiveTime       -           exact          -               since midnight
//! NaiveDateTime   date part   time of day    exact           -
//! TimeDelta       -           if in [0, 24h) -               exact
//! String          parsed      parsed         parsed          -
//! ```
//!
//! `-` is a failure. A date has no meaningful duration and a time of day has
//! no date, so those pairs never produce placeholder values.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};

use super::{Convert, Source};
use crate::variant::Variant;

fn midnight() -> NaiveTime {
    NaiveTime::from_hms_opt(0, 0, 0).unwrap_or_default()
}

impl Convert for NaiveDate {
    fn convert_from(variant: &Variant) -> Option<Self> {
        match Source::of(variant)? {
            Source::Date(date) => Some(date),
            Source::DateTime(at) => Some(at.date()),
            Source::Text(text) => text.trim().parse().ok(),
            _ => None,
        }
    }
}

impl Convert for NaiveTime {
    fn convert_from(variant: &Variant) -> Option<Self> {
        match Source::of(variant)? {
            Source::Time(time) => Some(time),
            Source::DateTime(at) => Some(at.time()),
            Source::Span(span) => {
                if span < TimeDelta::zero() || span >= TimeDelta::days(1) {
                    return None;
                }
                let seconds = u32::try_from(span.num_seconds()).ok()?;
                NaiveTime::from_num_seconds_from_midnight_opt(seconds, span.subsec_nanos() as u32)
            }
            Source::Text(text) => text.trim().parse().ok(),
            _ => None,
        }
    }
}

impl Convert for NaiveDateTime {
    fn convert_from(variant: &Variant) -> Option<Self> {
        match Source::of(variant)? {
            Source::DateTime(at) => Some(at),
            Source::Date(date) => Some(date.and_time(midnight())),
            Source::Text(text) => text.trim().parse().ok(),
            _ => None,
        }
    }
}

impl Convert for TimeDelta {
    fn convert_from(variant: &Variant) -> Option<Self> {
        match Source::of(variant)? {
            Source::Span(span) => Some(span),
            Source::Time(time) => Some(time.signed_duration_since(midnight())),
            _ => None,
        }
    }
}
