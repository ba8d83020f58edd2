use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use super::form::VisitForm;
use super::resolver::{ResolutionError, VetResolver};
use super::schedule::{AppointmentValidator, Clock, SystemClock};
use crate::clinic::domain::{
    BookingRequest, NewVisit, Pet, PetId, Visit, VisitId, VISIT_TIME_FORMAT,
};
use crate::clinic::repository::{PetDirectory, RepositoryError, VetDirectory, VisitStore};
use crate::clinic::validation::{ErrorCode, FieldError, FormField};

/// Result of a booking attempt that reached a decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum BookingOutcome {
    Accepted { visit: Visit },
    Rejected { errors: Vec<FieldError> },
}

impl BookingOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, BookingOutcome::Accepted { .. })
    }

    pub fn errors(&self) -> &[FieldError] {
        match self {
            BookingOutcome::Accepted { .. } => &[],
            BookingOutcome::Rejected { errors } => errors,
        }
    }

    fn rejected(error: FieldError) -> Self {
        BookingOutcome::Rejected {
            errors: vec![error],
        }
    }
}

/// Infrastructure failures; validation problems are reported through [`BookingOutcome`].
#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("pet {0} not found")]
    PetNotFound(PetId),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Books visits: calendar rules, vet resolution, double-booking check, then persistence.
///
/// Every check before the final save is read-only, so a rejected attempt leaves the
/// stores untouched.
pub struct BookingWorkflow<V, P, S> {
    resolver: VetResolver<V>,
    pets: Arc<P>,
    visits: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<V, P, S> BookingWorkflow<V, P, S>
where
    V: VetDirectory + 'static,
    P: PetDirectory + 'static,
    S: VisitStore + 'static,
{
    pub fn new(vets: Arc<V>, pets: Arc<P>, visits: Arc<S>) -> Self {
        Self::with_clock(vets, pets, visits, Arc::new(SystemClock))
    }

    pub fn with_clock(vets: Arc<V>, pets: Arc<P>, visits: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self {
            resolver: VetResolver::new(vets),
            pets,
            visits,
            clock,
        }
    }

    /// Bind a raw form and book it.
    ///
    /// When binding fails, the calendar check still runs on a usable time so the client
    /// sees every problem at once; the calendar error comes first.
    pub fn submit(&self, pet_id: PetId, form: &VisitForm) -> Result<BookingOutcome, BookingError> {
        let pet = self.pet(pet_id)?;

        let request = match form.bind(pet_id) {
            Ok(request) => request,
            Err(binding) => {
                let mut errors = Vec::with_capacity(binding.errors.len() + 1);
                if let Some(time) = binding.time {
                    if let Err(err) = AppointmentValidator::validate(time, self.clock.now()) {
                        errors.push(err.field_error(time));
                    }
                }
                errors.extend(binding.errors);
                debug!(pet_id = %pet_id, errors = errors.len(), "booking form rejected");
                return Ok(BookingOutcome::Rejected { errors });
            }
        };

        self.book_for(&pet, request)
    }

    /// Book a typed request.
    pub fn book(&self, request: BookingRequest) -> Result<BookingOutcome, BookingError> {
        let pet = self.pet(request.pet_id)?;
        self.book_for(&pet, request)
    }

    fn book_for(&self, pet: &Pet, request: BookingRequest) -> Result<BookingOutcome, BookingError> {
        let BookingRequest {
            description,
            time,
            vet_name,
            ..
        } = request;

        if let Err(err) = AppointmentValidator::validate(time, self.clock.now()) {
            debug!(pet_id = %pet.id, %time, reason = %err, "appointment time rejected");
            return Ok(BookingOutcome::rejected(err.field_error(time)));
        }

        let vet = match self.resolver.resolve(&vet_name) {
            Ok(vet) => vet,
            Err(ResolutionError::Repository(err)) => return Err(err.into()),
            Err(err) => {
                debug!(
                    pet_id = %pet.id,
                    vet_name = %vet_name,
                    reason = %err,
                    "vet not resolved"
                );
                return Ok(BookingOutcome::Rejected {
                    errors: err.field_error().into_iter().collect(),
                });
            }
        };

        let taken = || {
            FieldError::new(
                FormField::VetName,
                ErrorCode::Taken,
                format!(
                    "{} already has appointment at {}",
                    vet_name,
                    time.format(VISIT_TIME_FORMAT)
                ),
            )
        };

        if !self.visits.find_by_vet_and_time(vet.id, time)?.is_empty() {
            debug!(vet_id = %vet.id, %time, "slot already booked");
            return Ok(BookingOutcome::rejected(taken()));
        }

        let saved = self.visits.save(NewVisit {
            pet_id: pet.id,
            vet_id: vet.id,
            description,
            time,
        });

        match saved {
            Ok(visit) => {
                info!(
                    visit_id = %visit.id,
                    pet_id = %visit.pet_id,
                    vet_id = %visit.vet_id,
                    time = %visit.formatted_time(),
                    "visit booked"
                );
                Ok(BookingOutcome::Accepted { visit })
            }
            // Another booking claimed the slot between the lookup and the save.
            Err(RepositoryError::Conflict) => Ok(BookingOutcome::rejected(taken())),
            Err(err) => Err(err.into()),
        }
    }

    /// Remove a visit. Unknown ids are accepted so repeated cancels are harmless.
    pub fn cancel(&self, visit_id: VisitId) -> Result<(), BookingError> {
        self.visits.remove(visit_id)?;
        info!(visit_id = %visit_id, "visit cancelled");
        Ok(())
    }

    pub fn pet(&self, pet_id: PetId) -> Result<Pet, BookingError> {
        self.pets
            .fetch(pet_id)?
            .ok_or(BookingError::PetNotFound(pet_id))
    }

    pub fn visit(&self, visit_id: VisitId) -> Result<Option<Visit>, BookingError> {
        Ok(self.visits.fetch(visit_id)?)
    }

    /// Visits of a pet in appointment order.
    pub fn visits_for_pet(&self, pet_id: PetId) -> Result<Vec<Visit>, BookingError> {
        let pet = self.pet(pet_id)?;
        let mut visits = self.visits.for_pet(pet.id)?;
        visits.sort_by_key(|visit| (visit.time, visit.id));
        Ok(visits)
    }

    /// Full names offered on the booking form.
    pub fn vet_names(&self) -> Result<Vec<String>, BookingError> {
        Ok(self
            .resolver
            .directory()
            .all()?
            .iter()
            .map(|vet| vet.full_name())
            .collect())
    }
}
