//! Visit booking: time validation, vet name resolution, conflict checks, and persistence.

mod form;
mod resolver;
mod schedule;
mod workflow;

pub use form::{BindingErrors, VisitForm, ACCEPTED_TIME_FORMATS};
pub use resolver::{ResolutionError, VetResolver};
pub use schedule::{AppointmentValidator, Clock, FixedClock, SystemClock, TimeError};
pub use workflow::{BookingError, BookingOutcome, BookingWorkflow};
