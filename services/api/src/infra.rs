use chrono::NaiveDateTime;
use metrics_exporter_prometheus::PrometheusHandle;
use petclinic::clinic::{
    BookingWorkflow, Clock, ClinicState, NameMatch, NewVet, NewVisit, OwnerId, Pet, PetDirectory,
    PetId, RepositoryError, Specialty, SpecialtyCatalog, SpecialtyId, Vet, VetDirectory, VetId,
    VetService, Visit, VisitId, VisitStore,
};
use std::collections::BTreeMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::warn;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

fn lock<'a, T>(mutex: &'a Mutex<T>, store: &str) -> Result<MutexGuard<'a, T>, RepositoryError> {
    mutex.lock().map_err(|_| {
        warn!(store, "in-memory store lock poisoned");
        RepositoryError::Unavailable(format!("{store} lock poisoned"))
    })
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryVetDirectory {
    vets: Arc<Mutex<BTreeMap<VetId, Vet>>>,
}

impl VetDirectory for InMemoryVetDirectory {
    fn all(&self) -> Result<Vec<Vet>, RepositoryError> {
        let guard = lock(&self.vets, "vet directory")?;
        let mut vets: Vec<Vet> = guard.values().cloned().collect();
        vets.sort_by(|a, b| a.last_name.cmp(&b.last_name));
        Ok(vets)
    }

    fn fetch(&self, id: VetId) -> Result<Option<Vet>, RepositoryError> {
        Ok(lock(&self.vets, "vet directory")?.get(&id).cloned())
    }

    fn find_by_name(
        &self,
        first_name: &str,
        last_name: &str,
        mode: NameMatch,
    ) -> Result<Vec<Vet>, RepositoryError> {
        let guard = lock(&self.vets, "vet directory")?;
        Ok(guard
            .values()
            .filter(|vet| mode.matches_vet(vet, first_name, last_name))
            .cloned()
            .collect())
    }

    fn insert(&self, vet: NewVet) -> Result<Vet, RepositoryError> {
        let mut guard = lock(&self.vets, "vet directory")?;
        let id = VetId(guard.keys().next_back().map_or(1, |last| last.0 + 1));
        let vet = Vet::new(id, vet.first_name, vet.last_name);
        guard.insert(id, vet.clone());
        Ok(vet)
    }

    fn update(&self, vet: Vet) -> Result<(), RepositoryError> {
        let mut guard = lock(&self.vets, "vet directory")?;
        match guard.get_mut(&vet.id) {
            Some(existing) => {
                *existing = vet;
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryPetDirectory {
    pets: Arc<Mutex<BTreeMap<PetId, Pet>>>,
}

impl InMemoryPetDirectory {
    pub(crate) fn insert(&self, pet: Pet) -> Result<(), RepositoryError> {
        lock(&self.pets, "pet directory")?.insert(pet.id, pet);
        Ok(())
    }
}

impl PetDirectory for InMemoryPetDirectory {
    fn fetch(&self, id: PetId) -> Result<Option<Pet>, RepositoryError> {
        Ok(lock(&self.pets, "pet directory")?.get(&id).cloned())
    }
}

/// Visits keyed by id. The slot check and the insert in `save` share one lock, so two
/// bookings for the same vet and hour cannot both succeed.
#[derive(Default, Clone)]
pub(crate) struct InMemoryVisitStore {
    visits: Arc<Mutex<VisitLedger>>,
}

/// Ids are never handed out twice, even after the newest visit is removed.
#[derive(Default)]
struct VisitLedger {
    by_id: BTreeMap<VisitId, Visit>,
    last_id: u32,
}

impl VisitStore for InMemoryVisitStore {
    fn find_by_vet_and_time(
        &self,
        vet_id: VetId,
        time: NaiveDateTime,
    ) -> Result<Vec<Visit>, RepositoryError> {
        let guard = lock(&self.visits, "visit store")?;
        Ok(guard
            .by_id
            .values()
            .filter(|visit| visit.vet_id == vet_id && visit.time == time)
            .cloned()
            .collect())
    }

    fn save(&self, visit: NewVisit) -> Result<Visit, RepositoryError> {
        let mut guard = lock(&self.visits, "visit store")?;
        if guard
            .by_id
            .values()
            .any(|existing| existing.vet_id == visit.vet_id && existing.time == visit.time)
        {
            return Err(RepositoryError::Conflict);
        }

        guard.last_id += 1;
        let id = VisitId(guard.last_id);
        let visit = Visit {
            id,
            pet_id: visit.pet_id,
            vet_id: visit.vet_id,
            description: visit.description,
            time: visit.time,
        };
        guard.by_id.insert(id, visit.clone());
        Ok(visit)
    }

    fn fetch(&self, id: VisitId) -> Result<Option<Visit>, RepositoryError> {
        Ok(lock(&self.visits, "visit store")?.by_id.get(&id).cloned())
    }

    fn for_pet(&self, pet_id: PetId) -> Result<Vec<Visit>, RepositoryError> {
        let guard = lock(&self.visits, "visit store")?;
        Ok(guard
            .by_id
            .values()
            .filter(|visit| visit.pet_id == pet_id)
            .cloned()
            .collect())
    }

    fn remove(&self, id: VisitId) -> Result<(), RepositoryError> {
        lock(&self.visits, "visit store")?.by_id.remove(&id);
        Ok(())
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemorySpecialtyCatalog {
    specialties: Arc<Mutex<Vec<Specialty>>>,
}

impl InMemorySpecialtyCatalog {
    pub(crate) fn insert(&self, name: &str) -> Result<Specialty, RepositoryError> {
        let mut guard = lock(&self.specialties, "specialty catalog")?;
        if let Some(existing) = guard.iter().find(|specialty| specialty.name == name) {
            return Ok(existing.clone());
        }
        let specialty = Specialty {
            id: SpecialtyId(guard.len() as u32 + 1),
            name: name.to_string(),
        };
        guard.push(specialty.clone());
        Ok(specialty)
    }
}

impl SpecialtyCatalog for InMemorySpecialtyCatalog {
    fn all(&self) -> Result<Vec<Specialty>, RepositoryError> {
        Ok(lock(&self.specialties, "specialty catalog")?.clone())
    }

    fn find_by_name(&self, name: &str) -> Result<Option<Specialty>, RepositoryError> {
        let guard = lock(&self.specialties, "specialty catalog")?;
        Ok(guard.iter().find(|specialty| specialty.name == name).cloned())
    }
}

pub(crate) type InMemoryClinicState = ClinicState<
    InMemoryVetDirectory,
    InMemoryPetDirectory,
    InMemoryVisitStore,
    InMemorySpecialtyCatalog,
>;

/// The four in-memory stores backing one running service.
#[derive(Default, Clone)]
pub(crate) struct ClinicStores {
    pub(crate) vets: InMemoryVetDirectory,
    pub(crate) pets: InMemoryPetDirectory,
    pub(crate) visits: InMemoryVisitStore,
    pub(crate) specialties: InMemorySpecialtyCatalog,
}

impl ClinicStores {
    pub(crate) fn sample() -> Result<Self, RepositoryError> {
        let stores = Self::default();
        stores.seed_sample_data()?;
        Ok(stores)
    }

    pub(crate) fn clinic_state(&self, clock: Arc<dyn Clock>) -> InMemoryClinicState {
        let vets = Arc::new(self.vets.clone());
        let booking = BookingWorkflow::with_clock(
            vets.clone(),
            Arc::new(self.pets.clone()),
            Arc::new(self.visits.clone()),
            clock,
        );
        let service = VetService::new(vets, Arc::new(self.specialties.clone()));
        ClinicState {
            booking: Arc::new(booking),
            vets: Arc::new(service),
        }
    }

    fn seed_sample_data(&self) -> Result<(), RepositoryError> {
        for name in ["radiology", "surgery", "dentistry"] {
            self.specialties.insert(name)?;
        }

        let vets: [(&str, &str, &[&str]); 6] = [
            ("James", "Carter", &[]),
            ("Helen", "Leary", &["radiology"]),
            ("Linda", "Douglas", &["surgery", "dentistry"]),
            ("Rafael", "Ortega", &["surgery"]),
            ("Henry", "Stevens", &["radiology"]),
            ("Sharon", "Jenkins", &[]),
        ];
        for (first_name, last_name, specialties) in vets {
            let mut vet = self.vets.insert(NewVet {
                first_name: first_name.to_string(),
                last_name: last_name.to_string(),
            })?;
            for name in specialties {
                if let Some(specialty) = self.specialties.find_by_name(name)? {
                    vet.add_specialty(specialty);
                }
            }
            self.vets.update(vet)?;
        }

        let pets = [
            ("Leo", 1),
            ("Basil", 2),
            ("Rosy", 3),
            ("Jewel", 3),
            ("Iggy", 4),
            ("George", 5),
            ("Samantha", 6),
            ("Max", 6),
            ("Lucky", 7),
            ("Mulligan", 8),
            ("Freddy", 9),
            ("Lucky", 10),
            ("Sly", 10),
        ];
        for (id, (name, owner)) in (1..).zip(pets) {
            self.pets.insert(Pet {
                id: PetId(id),
                name: name.to_string(),
                owner_id: OwnerId(owner),
            })?;
        }

        Ok(())
    }
}

/// Parse a `yyyy-MM-dd HH:mm` timestamp from the command line.
pub(crate) fn parse_datetime(raw: &str) -> Result<NaiveDateTime, String> {
    NaiveDateTime::parse_from_str(raw.trim(), "%Y-%m-%d %H:%M")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD HH:MM ({err})"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(hour: u32) -> NaiveDateTime {
        parse_datetime(&format!("2030-01-07 {hour:02}:00")).expect("valid timestamp")
    }

    #[test]
    fn visit_store_rejects_second_visit_for_slot() {
        let store = InMemoryVisitStore::default();
        let visit = NewVisit {
            pet_id: PetId(1),
            vet_id: VetId(2),
            description: "checkup".to_string(),
            time: at(9),
        };

        let saved = store.save(visit.clone()).expect("first save");
        assert_eq!(saved.id, VisitId(1));
        assert_eq!(store.save(visit.clone()), Err(RepositoryError::Conflict));

        let other_hour = NewVisit { time: at(10), ..visit };
        assert_eq!(store.save(other_hour).expect("other hour").id, VisitId(2));
    }

    #[test]
    fn visit_ids_are_not_reused_after_cancel() {
        let store = InMemoryVisitStore::default();
        let first = store
            .save(NewVisit {
                pet_id: PetId(7),
                vet_id: VetId(2),
                description: "vaccination".to_string(),
                time: at(10),
            })
            .expect("first booking");
        store.remove(first.id).expect("cancel");

        let second = store
            .save(NewVisit {
                pet_id: PetId(7),
                vet_id: VetId(3),
                description: "dental".to_string(),
                time: at(11),
            })
            .expect("second booking");
        assert_ne!(second.id, first.id);

        store.remove(first.id).expect("repeated cancel");
        assert_eq!(store.fetch(second.id).expect("fetch"), Some(second));
    }

    #[test]
    fn sample_data_is_complete() {
        let stores = ClinicStores::sample().expect("seeded");

        let vets = stores.vets.all().expect("vets");
        assert_eq!(vets.len(), 6);
        let douglas = vets
            .iter()
            .find(|vet| vet.last_name == "Douglas")
            .expect("Linda Douglas seeded");
        let names: Vec<&str> = douglas
            .specialties()
            .iter()
            .map(|specialty| specialty.name.as_str())
            .collect();
        assert_eq!(names, vec!["dentistry", "surgery"]);

        assert_eq!(stores.specialties.all().expect("specialties").len(), 3);
        let sly = stores.pets.fetch(PetId(13)).expect("fetch").expect("Sly seeded");
        assert_eq!(sly.name, "Sly");
        assert_eq!(sly.owner_id, OwnerId(10));
    }

    #[test]
    fn parse_datetime_reports_bad_input() {
        assert!(parse_datetime("2030-01-07 09:00").is_ok());
        let err = parse_datetime("next tuesday").expect_err("rejected");
        assert!(err.contains("next tuesday"));
    }
}
