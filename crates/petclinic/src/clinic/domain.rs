use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Display format for appointment times; bookings are made on the hour.
pub const VISIT_TIME_FORMAT: &str = "%Y-%m-%d %H:00";

/// Identifier wrapper for vets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VetId(pub u32);

/// Identifier wrapper for pets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PetId(pub u32);

/// Identifier wrapper for pet owners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OwnerId(pub u32);

/// Identifier assigned by the visit store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VisitId(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SpecialtyId(pub u32);

impl fmt::Display for VetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for PetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for VisitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Area of expertise a vet can be tagged with (radiology, surgery, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Specialty {
    pub id: SpecialtyId,
    pub name: String,
}

/// A vet as held by the vet directory.
///
/// Specialties are kept unique by name and ordered by name, so `specialties()` is stable
/// for listings regardless of the order they were added in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vet {
    pub id: VetId,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    specialties: Vec<Specialty>,
}

impl Vet {
    pub fn new(id: VetId, first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self {
            id,
            first_name: first_name.into(),
            last_name: last_name.into(),
            specialties: Vec::new(),
        }
    }

    /// "First Last", the form the booking screen offers and the resolver accepts.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }

    pub fn specialties(&self) -> &[Specialty] {
        &self.specialties
    }

    pub fn nr_of_specialties(&self) -> usize {
        self.specialties.len()
    }

    /// Attach a specialty. Blank names and names already present are ignored; returns
    /// whether the specialty was added.
    pub fn add_specialty(&mut self, specialty: Specialty) -> bool {
        if specialty.name.trim().is_empty() {
            return false;
        }

        match self
            .specialties
            .binary_search_by(|existing| existing.name.cmp(&specialty.name))
        {
            Ok(_) => false,
            Err(position) => {
                self.specialties.insert(position, specialty);
                true
            }
        }
    }
}

/// Vet fields accepted on creation; the directory assigns the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewVet {
    pub first_name: String,
    pub last_name: String,
}

/// Pet as seen by the booking flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pet {
    pub id: PetId,
    pub name: String,
    pub owner_id: OwnerId,
}

/// A booked appointment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Visit {
    pub id: VisitId,
    pub pet_id: PetId,
    pub vet_id: VetId,
    pub description: String,
    pub time: NaiveDateTime,
}

impl Visit {
    pub fn formatted_time(&self) -> String {
        self.time.format(VISIT_TIME_FORMAT).to_string()
    }
}

/// Visit ready for persistence; every field has passed booking validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewVisit {
    pub pet_id: PetId,
    pub vet_id: VetId,
    pub description: String,
    pub time: NaiveDateTime,
}

/// Typed booking attempt produced by form binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingRequest {
    pub pet_id: PetId,
    pub description: String,
    pub time: NaiveDateTime,
    pub vet_name: String,
}
