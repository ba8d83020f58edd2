use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::{NaiveDate, NaiveDateTime};
use serde_json::Value;

use crate::clinic::booking::{BookingWorkflow, FixedClock, VisitForm};
use crate::clinic::domain::{
    NewVet, NewVisit, OwnerId, Pet, PetId, Specialty, SpecialtyId, Vet, VetId, Visit, VisitId,
};
use crate::clinic::repository::{
    NameMatch, PetDirectory, RepositoryError, SpecialtyCatalog, VetDirectory, VisitStore,
};
use crate::clinic::router::ClinicState;
use crate::clinic::vets::VetService;

pub(super) fn at(year: i32, month: u32, day: u32, hour: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(hour, 0, 0))
        .expect("valid timestamp")
}

/// Thursday 2019-02-28 08:00; 2019-03-01 is a Friday, 2019-03-02 a Saturday.
pub(super) fn now() -> NaiveDateTime {
    at(2019, 2, 28, 8)
}

pub(super) fn clock() -> Arc<FixedClock> {
    Arc::new(FixedClock(now()))
}

pub(super) const PET: PetId = PetId(1);

pub(super) fn form(description: &str, time: &str, vet_name: &str) -> VisitForm {
    VisitForm {
        description: Some(description.to_string()),
        time: Some(time.to_string()),
        vet_name: Some(vet_name.to_string()),
    }
}

#[derive(Default)]
pub(super) struct MemoryVets {
    vets: Mutex<BTreeMap<VetId, Vet>>,
}

impl MemoryVets {
    pub(super) fn with(vets: Vec<Vet>) -> Self {
        let directory = Self::default();
        {
            let mut guard = directory.vets.lock().expect("lock");
            for vet in vets {
                guard.insert(vet.id, vet);
            }
        }
        directory
    }
}

impl VetDirectory for MemoryVets {
    fn all(&self) -> Result<Vec<Vet>, RepositoryError> {
        let mut vets: Vec<Vet> = self.vets.lock().expect("lock").values().cloned().collect();
        vets.sort_by(|a, b| a.last_name.cmp(&b.last_name));
        Ok(vets)
    }

    fn fetch(&self, id: VetId) -> Result<Option<Vet>, RepositoryError> {
        Ok(self.vets.lock().expect("lock").get(&id).cloned())
    }

    fn find_by_name(
        &self,
        first_name: &str,
        last_name: &str,
        mode: NameMatch,
    ) -> Result<Vec<Vet>, RepositoryError> {
        Ok(self
            .vets
            .lock()
            .expect("lock")
            .values()
            .filter(|vet| mode.matches_vet(vet, first_name, last_name))
            .cloned()
            .collect())
    }

    fn insert(&self, vet: NewVet) -> Result<Vet, RepositoryError> {
        let mut guard = self.vets.lock().expect("lock");
        let id = VetId(guard.keys().last().map_or(1, |last| last.0 + 1));
        let vet = Vet::new(id, vet.first_name, vet.last_name);
        guard.insert(id, vet.clone());
        Ok(vet)
    }

    fn update(&self, vet: Vet) -> Result<(), RepositoryError> {
        let mut guard = self.vets.lock().expect("lock");
        if !guard.contains_key(&vet.id) {
            return Err(RepositoryError::NotFound);
        }
        guard.insert(vet.id, vet);
        Ok(())
    }
}

#[derive(Default)]
pub(super) struct MemoryPets {
    pets: Mutex<BTreeMap<PetId, Pet>>,
}

impl MemoryPets {
    pub(super) fn with(pets: Vec<Pet>) -> Self {
        let directory = Self::default();
        {
            let mut guard = directory.pets.lock().expect("lock");
            for pet in pets {
                guard.insert(pet.id, pet);
            }
        }
        directory
    }
}

impl PetDirectory for MemoryPets {
    fn fetch(&self, id: PetId) -> Result<Option<Pet>, RepositoryError> {
        Ok(self.pets.lock().expect("lock").get(&id).cloned())
    }
}

/// Visit store that counts successful saves.
#[derive(Default)]
pub(super) struct MemoryVisits {
    visits: Mutex<BTreeMap<VisitId, Visit>>,
    saves: AtomicUsize,
    last_id: AtomicU32,
}

impl MemoryVisits {
    pub(super) fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }

    pub(super) fn stored(&self) -> Vec<Visit> {
        self.visits.lock().expect("lock").values().cloned().collect()
    }
}

impl VisitStore for MemoryVisits {
    fn find_by_vet_and_time(
        &self,
        vet_id: VetId,
        time: NaiveDateTime,
    ) -> Result<Vec<Visit>, RepositoryError> {
        Ok(self
            .visits
            .lock()
            .expect("lock")
            .values()
            .filter(|visit| visit.vet_id == vet_id && visit.time == time)
            .cloned()
            .collect())
    }

    fn save(&self, visit: NewVisit) -> Result<Visit, RepositoryError> {
        let mut guard = self.visits.lock().expect("lock");
        if guard
            .values()
            .any(|existing| existing.vet_id == visit.vet_id && existing.time == visit.time)
        {
            return Err(RepositoryError::Conflict);
        }
        let id = VisitId(self.last_id.fetch_add(1, Ordering::SeqCst) + 1);
        let stored = Visit {
            id,
            pet_id: visit.pet_id,
            vet_id: visit.vet_id,
            description: visit.description,
            time: visit.time,
        };
        guard.insert(id, stored.clone());
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(stored)
    }

    fn fetch(&self, id: VisitId) -> Result<Option<Visit>, RepositoryError> {
        Ok(self.visits.lock().expect("lock").get(&id).cloned())
    }

    fn for_pet(&self, pet_id: PetId) -> Result<Vec<Visit>, RepositoryError> {
        Ok(self
            .visits
            .lock()
            .expect("lock")
            .values()
            .filter(|visit| visit.pet_id == pet_id)
            .cloned()
            .collect())
    }

    fn remove(&self, id: VisitId) -> Result<(), RepositoryError> {
        self.visits.lock().expect("lock").remove(&id);
        Ok(())
    }
}

/// Simulates a concurrent booking: the lookup sees a free slot, the save loses the race.
pub(super) struct RacingVisits;

impl VisitStore for RacingVisits {
    fn find_by_vet_and_time(
        &self,
        _vet_id: VetId,
        _time: NaiveDateTime,
    ) -> Result<Vec<Visit>, RepositoryError> {
        Ok(Vec::new())
    }

    fn save(&self, _visit: NewVisit) -> Result<Visit, RepositoryError> {
        Err(RepositoryError::Conflict)
    }

    fn fetch(&self, _id: VisitId) -> Result<Option<Visit>, RepositoryError> {
        Ok(None)
    }

    fn for_pet(&self, _pet_id: PetId) -> Result<Vec<Visit>, RepositoryError> {
        Ok(Vec::new())
    }

    fn remove(&self, _id: VisitId) -> Result<(), RepositoryError> {
        Ok(())
    }
}

pub(super) struct UnavailableVisits;

impl VisitStore for UnavailableVisits {
    fn find_by_vet_and_time(
        &self,
        _vet_id: VetId,
        _time: NaiveDateTime,
    ) -> Result<Vec<Visit>, RepositoryError> {
        Err(RepositoryError::Unavailable("visits offline".to_string()))
    }

    fn save(&self, _visit: NewVisit) -> Result<Visit, RepositoryError> {
        Err(RepositoryError::Unavailable("visits offline".to_string()))
    }

    fn fetch(&self, _id: VisitId) -> Result<Option<Visit>, RepositoryError> {
        Err(RepositoryError::Unavailable("visits offline".to_string()))
    }

    fn for_pet(&self, _pet_id: PetId) -> Result<Vec<Visit>, RepositoryError> {
        Err(RepositoryError::Unavailable("visits offline".to_string()))
    }

    fn remove(&self, _id: VisitId) -> Result<(), RepositoryError> {
        Err(RepositoryError::Unavailable("visits offline".to_string()))
    }
}

#[derive(Default)]
pub(super) struct MemorySpecialties {
    specialties: Vec<Specialty>,
}

impl MemorySpecialties {
    pub(super) fn standard() -> Self {
        Self {
            specialties: ["surgery", "radiology", "dentistry"]
                .iter()
                .zip(1..)
                .map(|(name, id)| Specialty {
                    id: SpecialtyId(id),
                    name: name.to_string(),
                })
                .collect(),
        }
    }
}

impl SpecialtyCatalog for MemorySpecialties {
    fn all(&self) -> Result<Vec<Specialty>, RepositoryError> {
        Ok(self.specialties.clone())
    }

    fn find_by_name(&self, name: &str) -> Result<Option<Specialty>, RepositoryError> {
        Ok(self
            .specialties
            .iter()
            .find(|specialty| specialty.name == name)
            .cloned())
    }
}

pub(super) fn linda() -> Vet {
    Vet::new(VetId(1), "Linda", "Douglas")
}

pub(super) fn clinic_vets() -> Vec<Vet> {
    vec![
        Vet::new(VetId(1), "Linda", "Douglas"),
        Vet::new(VetId(2), "James", "Carter"),
        Vet::new(VetId(3), "Helen", "Leary"),
    ]
}

pub(super) fn clinic_pets() -> Vec<Pet> {
    vec![
        Pet {
            id: PET,
            name: "George".to_string(),
            owner_id: OwnerId(6),
        },
        Pet {
            id: PetId(2),
            name: "Basil".to_string(),
            owner_id: OwnerId(2),
        },
    ]
}

pub(super) type Workflow = BookingWorkflow<MemoryVets, MemoryPets, MemoryVisits>;

pub(super) fn build_workflow() -> (Workflow, Arc<MemoryVisits>) {
    let visits = Arc::new(MemoryVisits::default());
    let workflow = BookingWorkflow::with_clock(
        Arc::new(MemoryVets::with(clinic_vets())),
        Arc::new(MemoryPets::with(clinic_pets())),
        visits.clone(),
        clock(),
    );
    (workflow, visits)
}

pub(super) fn build_state() -> (
    ClinicState<MemoryVets, MemoryPets, MemoryVisits, MemorySpecialties>,
    Arc<MemoryVisits>,
    Arc<MemoryVets>,
) {
    let vets = Arc::new(MemoryVets::with(clinic_vets()));
    let visits = Arc::new(MemoryVisits::default());
    let booking = BookingWorkflow::with_clock(
        vets.clone(),
        Arc::new(MemoryPets::with(clinic_pets())),
        visits.clone(),
        clock(),
    );
    let service = VetService::new(vets.clone(), Arc::new(MemorySpecialties::standard()));
    let state = ClinicState {
        booking: Arc::new(booking),
        vets: Arc::new(service),
    };
    (state, visits, vets)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json body")
}
