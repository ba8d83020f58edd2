use chrono::NaiveDateTime;

use super::domain::{NewVet, NewVisit, Pet, PetId, Specialty, Vet, VetId, Visit, VisitId};

/// How a name query is compared against stored vet names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameMatch {
    /// Case-sensitive equality on both first and last name.
    Exact,
    /// Case-sensitive `starts_with` on both first and last name.
    Prefix,
}

impl NameMatch {
    pub fn matches(self, candidate: &str, query: &str) -> bool {
        match self {
            NameMatch::Exact => candidate == query,
            NameMatch::Prefix => candidate.starts_with(query),
        }
    }

    pub fn matches_vet(self, vet: &Vet, first_name: &str, last_name: &str) -> bool {
        self.matches(&vet.first_name, first_name) && self.matches(&vet.last_name, last_name)
    }
}

/// Vet storage used by booking (name resolution) and vet management.
pub trait VetDirectory: Send + Sync {
    /// All vets ordered by last name.
    fn all(&self) -> Result<Vec<Vet>, RepositoryError>;
    fn fetch(&self, id: VetId) -> Result<Option<Vet>, RepositoryError>;
    fn find_by_name(
        &self,
        first_name: &str,
        last_name: &str,
        mode: NameMatch,
    ) -> Result<Vec<Vet>, RepositoryError>;
    fn insert(&self, vet: NewVet) -> Result<Vet, RepositoryError>;
    fn update(&self, vet: Vet) -> Result<(), RepositoryError>;
}

pub trait PetDirectory: Send + Sync {
    fn fetch(&self, id: PetId) -> Result<Option<Pet>, RepositoryError>;
}

/// Visit persistence.
///
/// `save` must refuse a second visit for the same vet and time with
/// [`RepositoryError::Conflict`], performing the check and the insert as one step.
pub trait VisitStore: Send + Sync {
    fn find_by_vet_and_time(
        &self,
        vet_id: VetId,
        time: NaiveDateTime,
    ) -> Result<Vec<Visit>, RepositoryError>;
    fn save(&self, visit: NewVisit) -> Result<Visit, RepositoryError>;
    fn fetch(&self, id: VisitId) -> Result<Option<Visit>, RepositoryError>;
    fn for_pet(&self, pet_id: PetId) -> Result<Vec<Visit>, RepositoryError>;
    /// Remove a visit; removing an unknown id is not an error.
    fn remove(&self, id: VisitId) -> Result<(), RepositoryError>;
}

pub trait SpecialtyCatalog: Send + Sync {
    /// All specialties ordered by name.
    fn all(&self) -> Result<Vec<Specialty>, RepositoryError>;
    fn find_by_name(&self, name: &str) -> Result<Option<Specialty>, RepositoryError>;
}

/// Error enumeration for store failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
