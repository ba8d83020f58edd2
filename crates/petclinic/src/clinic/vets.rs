use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::domain::{NewVet, Specialty, Vet, VetId};
use super::repository::{NameMatch, RepositoryError, SpecialtyCatalog, VetDirectory};
use super::validation::{present, FieldError, FormField};

/// Vet create/rename form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VetForm {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

impl VetForm {
    pub fn validate(&self) -> Result<NewVet, Vec<FieldError>> {
        let first_name = present(self.first_name.as_deref());
        let last_name = present(self.last_name.as_deref());

        match (first_name, last_name) {
            (Some(first_name), Some(last_name)) => Ok(NewVet {
                first_name: first_name.to_string(),
                last_name: last_name.to_string(),
            }),
            _ => {
                let mut errors = Vec::new();
                if first_name.is_none() {
                    errors.push(FieldError::required(FormField::FirstName));
                }
                if last_name.is_none() {
                    errors.push(FieldError::required(FormField::LastName));
                }
                Err(errors)
            }
        }
    }
}

/// Error raised by the vet service.
#[derive(Debug, thiserror::Error)]
pub enum VetServiceError {
    #[error("vet form has {} invalid field(s)", .0.len())]
    Validation(Vec<FieldError>),
    #[error("vet {0} not found")]
    NotFound(VetId),
    #[error("specialty '{0}' does not exist")]
    UnknownSpecialty(String),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Vet management over the vet directory and the specialty catalog.
pub struct VetService<V, K> {
    vets: Arc<V>,
    specialties: Arc<K>,
}

impl<V, K> VetService<V, K>
where
    V: VetDirectory + 'static,
    K: SpecialtyCatalog + 'static,
{
    pub fn new(vets: Arc<V>, specialties: Arc<K>) -> Self {
        Self { vets, specialties }
    }

    /// All vets, by last name then first name.
    pub fn list(&self) -> Result<Vec<Vet>, VetServiceError> {
        let mut vets = self.vets.all()?;
        vets.sort_by(|a, b| {
            a.last_name
                .cmp(&b.last_name)
                .then_with(|| a.first_name.cmp(&b.first_name))
        });
        Ok(vets)
    }

    /// Vets whose first and last names start with the given prefixes.
    pub fn search(&self, first_name: &str, last_name: &str) -> Result<Vec<Vet>, VetServiceError> {
        let mut vets = self
            .vets
            .find_by_name(first_name.trim(), last_name.trim(), NameMatch::Prefix)?;
        vets.sort_by(|a, b| a.last_name.cmp(&b.last_name));
        Ok(vets)
    }

    pub fn get(&self, id: VetId) -> Result<Vet, VetServiceError> {
        self.vets.fetch(id)?.ok_or(VetServiceError::NotFound(id))
    }

    pub fn create(&self, form: &VetForm) -> Result<Vet, VetServiceError> {
        let new_vet = form.validate().map_err(VetServiceError::Validation)?;
        let vet = self.vets.insert(new_vet)?;
        info!(vet_id = %vet.id, name = %vet.full_name(), "vet created");
        Ok(vet)
    }

    /// Change a vet's name; specialties are kept.
    pub fn rename(&self, id: VetId, form: &VetForm) -> Result<Vet, VetServiceError> {
        let NewVet {
            first_name,
            last_name,
        } = form.validate().map_err(VetServiceError::Validation)?;

        let mut vet = self.get(id)?;
        vet.first_name = first_name;
        vet.last_name = last_name;
        self.vets.update(vet.clone())?;
        info!(vet_id = %vet.id, name = %vet.full_name(), "vet renamed");
        Ok(vet)
    }

    /// Attach a catalogued specialty by name. Already-held specialties are left as-is.
    pub fn add_specialty(&self, id: VetId, name: &str) -> Result<Vet, VetServiceError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(VetServiceError::Validation(vec![FieldError::required(
                FormField::Specialty,
            )]));
        }

        let mut vet = self.get(id)?;
        let specialty = self
            .specialties
            .find_by_name(name)?
            .ok_or_else(|| VetServiceError::UnknownSpecialty(name.to_string()))?;

        if vet.add_specialty(specialty) {
            self.vets.update(vet.clone())?;
            info!(vet_id = %vet.id, specialty = name, "specialty added");
        }
        Ok(vet)
    }

    pub fn specialties(&self) -> Result<Vec<Specialty>, VetServiceError> {
        let mut specialties = self.specialties.all()?;
        specialties.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(specialties)
    }
}
