use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::clinic::domain::{BookingRequest, PetId};
use crate::clinic::validation::{present, ErrorCode, FieldError, FormField};

/// Time layouts accepted from clients. Minutes are dropped: visits start on the hour.
pub const ACCEPTED_TIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M"];

/// Raw booking form as submitted by a client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitForm {
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub vet_name: Option<String>,
}

/// Structural failures from binding a [`VisitForm`].
///
/// `time` keeps the parsed appointment time when it was usable so the calendar rules can
/// still be reported next to the structural errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingErrors {
    pub time: Option<NaiveDateTime>,
    pub errors: Vec<FieldError>,
}

impl VisitForm {
    /// Check presence and format of every field and produce a typed request.
    pub fn bind(&self, pet_id: PetId) -> Result<BookingRequest, BindingErrors> {
        let mut errors = Vec::new();

        let description = present(self.description.as_deref());
        if description.is_none() {
            errors.push(FieldError::new(
                FormField::Description,
                ErrorCode::Required,
                "must not be blank",
            ));
        }

        let time = match present(self.time.as_deref()) {
            Some(raw) => match parse_visit_time(raw) {
                Some(time) => Some(time),
                None => {
                    errors.push(FieldError::new(
                        FormField::Time,
                        ErrorCode::InvalidFormat,
                        format!("'{raw}' is not a valid time (expected yyyy-MM-dd HH:00)"),
                    ));
                    None
                }
            },
            None => {
                errors.push(FieldError::required(FormField::Time));
                None
            }
        };

        let vet_name = present(self.vet_name.as_deref());
        if vet_name.is_none() {
            errors.push(FieldError::required(FormField::VetName));
        }

        match (description, time, vet_name) {
            (Some(description), Some(time), Some(vet_name)) if errors.is_empty() => {
                Ok(BookingRequest {
                    pet_id,
                    description: description.to_string(),
                    time,
                    vet_name: vet_name.to_string(),
                })
            }
            _ => Err(BindingErrors { time, errors }),
        }
    }
}

/// Parse a client-supplied time and truncate it to the hour.
pub(crate) fn parse_visit_time(raw: &str) -> Option<NaiveDateTime> {
    let parsed = ACCEPTED_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw.trim(), format).ok())?;
    parsed.date().and_hms_opt(parsed.hour(), 0, 0)
}
