use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::booking::{BookingError, BookingOutcome, BookingWorkflow, VisitForm};
use super::domain::{OwnerId, Pet, PetId, Vet, VetId, Visit, VisitId};
use super::repository::{PetDirectory, RepositoryError, SpecialtyCatalog, VetDirectory, VisitStore};
use super::validation::FieldError;
use super::vets::{VetForm, VetService, VetServiceError};

/// Shared handler state: the booking workflow and the vet service over the same stores.
pub struct ClinicState<V, P, S, K> {
    pub booking: Arc<BookingWorkflow<V, P, S>>,
    pub vets: Arc<VetService<V, K>>,
}

impl<V, P, S, K> Clone for ClinicState<V, P, S, K> {
    fn clone(&self) -> Self {
        Self {
            booking: Arc::clone(&self.booking),
            vets: Arc::clone(&self.vets),
        }
    }
}

/// Context for rendering the booking form.
#[derive(Debug, Serialize)]
pub struct BookingFormView {
    pub pet: Pet,
    pub vets: Vec<String>,
    pub form: VisitForm,
}

/// Rejected booking: the submitted values plus the field errors, for re-display.
#[derive(Debug, Serialize)]
pub struct BookingRejectionView {
    pub form: VisitForm,
    pub errors: Vec<FieldError>,
}

#[derive(Debug, Serialize)]
pub struct CancelFormView {
    pub visit: Option<Visit>,
}

/// Vet listing wrapper, kept as an object so the payload can grow without breaking clients.
#[derive(Debug, Serialize)]
pub struct VetListView {
    #[serde(rename = "vetList")]
    pub vet_list: Vec<Vet>,
}

#[derive(Debug, Default, Deserialize)]
pub struct VetSearchQuery {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SpecialtyRequest {
    #[serde(default)]
    pub name: String,
}

/// Router builder exposing booking, cancellation, and vet management endpoints.
pub fn clinic_router<V, P, S, K>(state: ClinicState<V, P, S, K>) -> Router
where
    V: VetDirectory + 'static,
    P: PetDirectory + 'static,
    S: VisitStore + 'static,
    K: SpecialtyCatalog + 'static,
{
    Router::new()
        .route(
            "/api/v1/owners/:owner_id/pets/:pet_id/visits/new",
            get(booking_form_handler::<V, P, S, K>).post(create_visit_handler::<V, P, S, K>),
        )
        .route(
            "/api/v1/owners/:owner_id/pets/:pet_id/visits/:visit_id/cancel",
            get(cancel_form_handler::<V, P, S, K>).post(cancel_visit_handler::<V, P, S, K>),
        )
        .route(
            "/api/v1/pets/:pet_id/visits",
            get(pet_visits_handler::<V, P, S, K>),
        )
        .route(
            "/api/v1/vets",
            get(list_vets_handler::<V, P, S, K>).post(create_vet_handler::<V, P, S, K>),
        )
        .route(
            "/api/v1/vets/:vet_id",
            get(show_vet_handler::<V, P, S, K>).put(update_vet_handler::<V, P, S, K>),
        )
        .route(
            "/api/v1/vets/:vet_id/specialties",
            post(add_specialty_handler::<V, P, S, K>),
        )
        .route(
            "/api/v1/specialties",
            get(list_specialties_handler::<V, P, S, K>),
        )
        .with_state(state)
}

pub(crate) async fn booking_form_handler<V, P, S, K>(
    State(state): State<ClinicState<V, P, S, K>>,
    Path((_owner_id, pet_id)): Path<(u32, u32)>,
) -> Response
where
    V: VetDirectory + 'static,
    P: PetDirectory + 'static,
    S: VisitStore + 'static,
    K: SpecialtyCatalog + 'static,
{
    let context = state.booking.pet(PetId(pet_id)).and_then(|pet| {
        let vets = state.booking.vet_names()?;
        Ok(BookingFormView {
            pet,
            vets,
            form: VisitForm::default(),
        })
    });

    match context {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(err) => booking_error_response(err),
    }
}

pub(crate) async fn create_visit_handler<V, P, S, K>(
    State(state): State<ClinicState<V, P, S, K>>,
    Path((owner_id, pet_id)): Path<(u32, u32)>,
    axum::Json(form): axum::Json<VisitForm>,
) -> Response
where
    V: VetDirectory + 'static,
    P: PetDirectory + 'static,
    S: VisitStore + 'static,
    K: SpecialtyCatalog + 'static,
{
    match state.booking.submit(PetId(pet_id), &form) {
        Ok(BookingOutcome::Accepted { visit }) => {
            let location = owner_location(OwnerId(owner_id));
            (
                StatusCode::CREATED,
                [(header::LOCATION, location)],
                axum::Json(visit),
            )
                .into_response()
        }
        Ok(BookingOutcome::Rejected { errors }) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            axum::Json(BookingRejectionView { form, errors }),
        )
            .into_response(),
        Err(err) => booking_error_response(err),
    }
}

pub(crate) async fn cancel_form_handler<V, P, S, K>(
    State(state): State<ClinicState<V, P, S, K>>,
    Path((_owner_id, _pet_id, visit_id)): Path<(u32, u32, u32)>,
) -> Response
where
    V: VetDirectory + 'static,
    P: PetDirectory + 'static,
    S: VisitStore + 'static,
    K: SpecialtyCatalog + 'static,
{
    match state.booking.visit(VisitId(visit_id)) {
        Ok(visit) => (StatusCode::OK, axum::Json(CancelFormView { visit })).into_response(),
        Err(err) => booking_error_response(err),
    }
}

pub(crate) async fn cancel_visit_handler<V, P, S, K>(
    State(state): State<ClinicState<V, P, S, K>>,
    Path((owner_id, _pet_id, visit_id)): Path<(u32, u32, u32)>,
) -> Response
where
    V: VetDirectory + 'static,
    P: PetDirectory + 'static,
    S: VisitStore + 'static,
    K: SpecialtyCatalog + 'static,
{
    match state.booking.cancel(VisitId(visit_id)) {
        Ok(()) => {
            let payload = json!({
                "status": "cancelled",
                "visit_id": visit_id,
                "redirect": owner_location(OwnerId(owner_id)),
            });
            (StatusCode::OK, axum::Json(payload)).into_response()
        }
        Err(err) => booking_error_response(err),
    }
}

pub(crate) async fn pet_visits_handler<V, P, S, K>(
    State(state): State<ClinicState<V, P, S, K>>,
    Path(pet_id): Path<u32>,
) -> Response
where
    V: VetDirectory + 'static,
    P: PetDirectory + 'static,
    S: VisitStore + 'static,
    K: SpecialtyCatalog + 'static,
{
    match state.booking.visits_for_pet(PetId(pet_id)) {
        Ok(visits) => (StatusCode::OK, axum::Json(visits)).into_response(),
        Err(err) => booking_error_response(err),
    }
}

pub(crate) async fn list_vets_handler<V, P, S, K>(
    State(state): State<ClinicState<V, P, S, K>>,
    Query(query): Query<VetSearchQuery>,
) -> Response
where
    V: VetDirectory + 'static,
    P: PetDirectory + 'static,
    S: VisitStore + 'static,
    K: SpecialtyCatalog + 'static,
{
    let vets = match (&query.first_name, &query.last_name) {
        (None, None) => state.vets.list(),
        (first_name, last_name) => state.vets.search(
            first_name.as_deref().unwrap_or_default(),
            last_name.as_deref().unwrap_or_default(),
        ),
    };

    match vets {
        Ok(vet_list) => (StatusCode::OK, axum::Json(VetListView { vet_list })).into_response(),
        Err(err) => vet_error_response(err),
    }
}

pub(crate) async fn create_vet_handler<V, P, S, K>(
    State(state): State<ClinicState<V, P, S, K>>,
    axum::Json(form): axum::Json<VetForm>,
) -> Response
where
    V: VetDirectory + 'static,
    P: PetDirectory + 'static,
    S: VisitStore + 'static,
    K: SpecialtyCatalog + 'static,
{
    match state.vets.create(&form) {
        Ok(vet) => {
            let location = format!("/api/v1/vets/{}", vet.id);
            (
                StatusCode::CREATED,
                [(header::LOCATION, location)],
                axum::Json(vet),
            )
                .into_response()
        }
        Err(err) => vet_error_response(err),
    }
}

pub(crate) async fn show_vet_handler<V, P, S, K>(
    State(state): State<ClinicState<V, P, S, K>>,
    Path(vet_id): Path<u32>,
) -> Response
where
    V: VetDirectory + 'static,
    P: PetDirectory + 'static,
    S: VisitStore + 'static,
    K: SpecialtyCatalog + 'static,
{
    match state.vets.get(VetId(vet_id)) {
        Ok(vet) => (StatusCode::OK, axum::Json(vet)).into_response(),
        Err(err) => vet_error_response(err),
    }
}

pub(crate) async fn update_vet_handler<V, P, S, K>(
    State(state): State<ClinicState<V, P, S, K>>,
    Path(vet_id): Path<u32>,
    axum::Json(form): axum::Json<VetForm>,
) -> Response
where
    V: VetDirectory + 'static,
    P: PetDirectory + 'static,
    S: VisitStore + 'static,
    K: SpecialtyCatalog + 'static,
{
    match state.vets.rename(VetId(vet_id), &form) {
        Ok(vet) => (StatusCode::OK, axum::Json(vet)).into_response(),
        Err(err) => vet_error_response(err),
    }
}

pub(crate) async fn add_specialty_handler<V, P, S, K>(
    State(state): State<ClinicState<V, P, S, K>>,
    Path(vet_id): Path<u32>,
    axum::Json(request): axum::Json<SpecialtyRequest>,
) -> Response
where
    V: VetDirectory + 'static,
    P: PetDirectory + 'static,
    S: VisitStore + 'static,
    K: SpecialtyCatalog + 'static,
{
    match state.vets.add_specialty(VetId(vet_id), &request.name) {
        Ok(vet) => (StatusCode::OK, axum::Json(vet)).into_response(),
        Err(err) => vet_error_response(err),
    }
}

pub(crate) async fn list_specialties_handler<V, P, S, K>(
    State(state): State<ClinicState<V, P, S, K>>,
) -> Response
where
    V: VetDirectory + 'static,
    P: PetDirectory + 'static,
    S: VisitStore + 'static,
    K: SpecialtyCatalog + 'static,
{
    match state.vets.specialties() {
        Ok(specialties) => (StatusCode::OK, axum::Json(specialties)).into_response(),
        Err(err) => vet_error_response(err),
    }
}

fn owner_location(owner_id: OwnerId) -> String {
    format!("/api/v1/owners/{owner_id}")
}

fn booking_error_response(err: BookingError) -> Response {
    let status = match &err {
        BookingError::PetNotFound(_) | BookingError::Repository(RepositoryError::NotFound) => {
            StatusCode::NOT_FOUND
        }
        BookingError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let payload = json!({ "error": err.to_string() });
    (status, axum::Json(payload)).into_response()
}

fn vet_error_response(err: VetServiceError) -> Response {
    match err {
        VetServiceError::Validation(errors) => {
            let payload = json!({
                "error": "vet form is invalid",
                "errors": errors,
            });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        VetServiceError::UnknownSpecialty(_) => {
            let payload = json!({ "error": err.to_string() });
            (StatusCode::UNPROCESSABLE_ENTITY, axum::Json(payload)).into_response()
        }
        VetServiceError::NotFound(_) | VetServiceError::Repository(RepositoryError::NotFound) => {
            let payload = json!({ "error": err.to_string() });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        VetServiceError::Repository(_) => {
            let payload = json!({ "error": err.to_string() });
            (StatusCode::INTERNAL_SERVER_ERROR, axum::Json(payload)).into_response()
        }
    }
}
