//! Compact duration rendering for toolbar badges.
//!
//! A badge has room for roughly four characters, so durations are squeezed
//! into forms like `5"`, `1'05`, `2h30`, `3.5d` or `12d`.
//!
//! ```text
//! 45      -> 45"
//! 65      -> 1'05
//! 3660    -> 1h01
//! 90000   -> 1.0d
//! 863100  -> 10d      (9d23h would render as "10.0d", which is too wide)
//! ```

use serde::{Deserialize, Serialize};

const SECONDS_PER_MINUTE: u64 = 60;
const MINUTES_PER_HOUR: u64 = 60;
const HOURS_PER_DAY: u64 = 24;

/// A duration broken into calendar-ish components.
///
/// Every field except `days` is reduced modulo its parent unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SplitDuration {
    pub days: u64,
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
}

impl SplitDuration {
    /// Recombine the components into a total number of seconds.
    pub fn total_seconds(&self) -> u64 {
        ((self.days * HOURS_PER_DAY + self.hours) * MINUTES_PER_HOUR + self.minutes)
            * SECONDS_PER_MINUTE
            + self.seconds
    }
}

/// Split a number of seconds into days, hours, minutes and seconds.
pub fn split_seconds(seconds: u64) -> SplitDuration {
    let minutes = seconds / SECONDS_PER_MINUTE;
    let hours = minutes / MINUTES_PER_HOUR;
    let days = hours / HOURS_PER_DAY;

    SplitDuration {
        days,
        hours: hours % HOURS_PER_DAY,
        minutes: minutes % MINUTES_PER_HOUR,
        seconds: seconds % SECONDS_PER_MINUTE,
    }
}

/// Render a duration as badge text. Zero renders as an empty string.
pub fn seconds_to_badge_text(seconds: u64) -> String {
    let x = split_seconds(seconds);

    if x.days > 9 {
        format!("{}d", x.days)
    } else if x.days > 0 {
        if x.hours > 0 {
            format!("{}d", fractional_days(x.days, x.hours))
        } else {
            format!("{}d", x.days)
        }
    } else if x.hours > 9 {
        format!("{}h", x.hours)
    } else if x.hours > 0 {
        if x.minutes > 9 {
            format!("{}h{}", x.hours, x.minutes)
        } else if x.minutes > 0 {
            format!("{}h0{}", x.hours, x.minutes)
        } else {
            format!("{}h", x.hours)
        }
    } else if x.minutes > 0 {
        if x.seconds > 9 {
            format!("{}'{}", x.minutes, x.seconds)
        } else if x.seconds > 0 {
            format!("{}'0{}", x.minutes, x.seconds)
        } else {
            format!("{}'", x.minutes)
        }
    } else if x.seconds > 0 {
        format!("{}\"", x.seconds)
    } else {
        String::new()
    }
}

/// `days + hours / 24` with one decimal, rounding halves up.
///
/// Integer tenths keep ties exact (6h is exactly 0.25d). Anything wider than
/// three characters ("10.0") is cut back to its integer part.
fn fractional_days(days: u64, hours: u64) -> String {
    let tenths = days * 10 + (hours * 10 + HOURS_PER_DAY / 2) / HOURS_PER_DAY;
    let rendered = format!("{}.{}", tenths / 10, tenths % 10);
    if rendered.len() > 3 {
        (tenths / 10).to_string()
    } else {
        rendered
    }
}
