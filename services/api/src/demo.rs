use crate::infra::{parse_datetime, ClinicStores};
use chrono::NaiveDateTime;
use clap::Args;
use petclinic::clinic::router::VetListView;
use petclinic::clinic::{BookingOutcome, Clock, FixedClock, PetId, SystemClock, Vet, VisitForm};
use petclinic::error::AppError;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct VetListArgs {
    /// Only list vets holding this specialty
    #[arg(long)]
    pub(crate) specialty: Option<String>,
    /// Print the listing as JSON instead of a table
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct BookArgs {
    /// Pet to book for (sample clinic ids 1-13)
    #[arg(long, default_value_t = 7)]
    pub(crate) pet: u32,
    /// Appointment time (YYYY-MM-DD HH:MM); minutes are dropped
    #[arg(long)]
    pub(crate) time: String,
    /// Vet full name, e.g. "Linda Douglas"
    #[arg(long)]
    pub(crate) vet: String,
    #[arg(long, default_value = "checkup")]
    pub(crate) description: String,
    /// Pretend the current time is this instead of the wall clock
    #[arg(long, value_parser = parse_datetime)]
    pub(crate) now: Option<NaiveDateTime>,
    /// Submit the same booking twice to show the double-booking check
    #[arg(long)]
    pub(crate) twice: bool,
}

pub(crate) fn run_vet_listing(args: VetListArgs) -> Result<(), AppError> {
    let VetListArgs { specialty, json } = args;

    let stores = ClinicStores::sample()?;
    let state = stores.clinic_state(Arc::new(SystemClock));
    let vets: Vec<Vet> = state
        .vets
        .list()?
        .into_iter()
        .filter(|vet| match &specialty {
            Some(name) => vet
                .specialties()
                .iter()
                .any(|held| held.name.eq_ignore_ascii_case(name)),
            None => true,
        })
        .collect();

    if json {
        let payload = serde_json::to_string_pretty(&VetListView { vet_list: vets })?;
        println!("{payload}");
        return Ok(());
    }

    println!("Veterinarians ({})", vets.len());
    for vet in &vets {
        let specialties = if vet.nr_of_specialties() == 0 {
            "none".to_string()
        } else {
            vet.specialties()
                .iter()
                .map(|specialty| specialty.name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        };
        println!("- {} [{}]", vet.full_name(), specialties);
    }

    Ok(())
}

pub(crate) fn run_book(args: BookArgs) -> Result<(), AppError> {
    let BookArgs {
        pet,
        time,
        vet,
        description,
        now,
        twice,
    } = args;

    let clock: Arc<dyn Clock> = match now {
        Some(now) => Arc::new(FixedClock(now)),
        None => Arc::new(SystemClock),
    };
    let stores = ClinicStores::sample()?;
    let state = stores.clinic_state(clock);
    let booking = &state.booking;

    let pet = booking.pet(PetId(pet))?;
    println!("Booking a visit for {} (owner {})", pet.name, pet.owner_id);

    let form = VisitForm {
        description: Some(description),
        time: Some(time),
        vet_name: Some(vet),
    };
    let attempts = if twice { 2 } else { 1 };
    for attempt in 1..=attempts {
        match booking.submit(pet.id, &form)? {
            BookingOutcome::Accepted { visit } => println!(
                "- attempt {attempt}: booked visit {} with vet {} at {}",
                visit.id,
                visit.vet_id,
                visit.formatted_time()
            ),
            BookingOutcome::Rejected { errors } => {
                println!("- attempt {attempt}: rejected");
                for error in errors {
                    println!(
                        "    {:?} [{}]: {}",
                        error.field,
                        error.code.code(),
                        error.message
                    );
                }
            }
        }
    }

    let visits = booking.visits_for_pet(pet.id)?;
    println!("{} now has {} visit(s) on record", pet.name, visits.len());
    Ok(())
}
