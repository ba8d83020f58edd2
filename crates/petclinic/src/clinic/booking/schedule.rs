use chrono::{Datelike, Local, NaiveDateTime, Weekday};

use crate::clinic::domain::VISIT_TIME_FORMAT;
use crate::clinic::validation::{ErrorCode, FieldError, FormField};

/// Source of "now" for appointment validation.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

/// Wall-clock time in the clinic's local timezone.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Clock pinned to a single instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

/// Reasons an appointment time is refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TimeError {
    #[error("appointment time is not after the current time")]
    BeforeCurrent,
    #[error("appointment falls on a {0}")]
    WrongDate(Weekday),
}

impl TimeError {
    /// Field error reported against the `time` input for this failure.
    pub fn field_error(self, time: NaiveDateTime) -> FieldError {
        match self {
            TimeError::BeforeCurrent => FieldError::new(
                FormField::Time,
                ErrorCode::Past,
                format!("{} is in the past.", time.format(VISIT_TIME_FORMAT)),
            ),
            TimeError::WrongDate(day) => FieldError::new(
                FormField::Time,
                ErrorCode::Weekend,
                format!("The day is a {}", day_name(day)),
            ),
        }
    }
}

fn day_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "MONDAY",
        Weekday::Tue => "TUESDAY",
        Weekday::Wed => "WEDNESDAY",
        Weekday::Thu => "THURSDAY",
        Weekday::Fri => "FRIDAY",
        Weekday::Sat => "SATURDAY",
        Weekday::Sun => "SUNDAY",
    }
}

/// Calendar rules for appointment times.
pub struct AppointmentValidator;

impl AppointmentValidator {
    /// Accept `time` only if it is strictly after `now` and on a weekday.
    ///
    /// The past check wins over the weekend check: a past Saturday is `BeforeCurrent`.
    pub fn validate(time: NaiveDateTime, now: NaiveDateTime) -> Result<(), TimeError> {
        if time <= now {
            return Err(TimeError::BeforeCurrent);
        }

        match time.weekday() {
            day @ (Weekday::Sat | Weekday::Sun) => Err(TimeError::WrongDate(day)),
            _ => Ok(()),
        }
    }
}
