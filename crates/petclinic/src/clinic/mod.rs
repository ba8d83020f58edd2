//! Clinic records and the visit booking workflow.
//!
//! Stores are reached through the traits in [`repository`] so the workflow and the vet
//! service can run against any backend, including the in-memory fakes used in tests.

pub mod booking;
pub mod domain;
pub mod repository;
pub mod router;
pub mod validation;
pub mod vets;

#[cfg(test)]
mod tests;

pub use booking::{
    AppointmentValidator, BookingError, BookingOutcome, BookingWorkflow, Clock, FixedClock,
    ResolutionError, SystemClock, TimeError, VetResolver, VisitForm,
};
pub use domain::{
    BookingRequest, NewVet, NewVisit, OwnerId, Pet, PetId, Specialty, SpecialtyId, Vet, VetId,
    Visit, VisitId, VISIT_TIME_FORMAT,
};
pub use repository::{
    NameMatch, PetDirectory, RepositoryError, SpecialtyCatalog, VetDirectory, VisitStore,
};
pub use router::{clinic_router, ClinicState};
pub use validation::{ErrorCode, FieldError, FormField};
pub use vets::{VetForm, VetService, VetServiceError};
