//! # API REST
//!
//! REST API for MediLink.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - Provider authentication from request headers
//! - Mapping [`MediLinkError`] to HTTP status codes
//!
//! Routes that act on behalf of a provider read the `x-provider-name` and
//! `x-provider-password` headers and answer `401 Unauthorized` when either is missing or wrong.

#![warn(rust_2018_idioms)]

pub mod dto;

use axum::{
    extract::{Path as AxumPath, Query, State},
    http::{HeaderMap, StatusCode},
    response::Json,
    routing::{get, post},
    Router,
};
use medilink_core::record::parse_timestamp;
use medilink_core::{
    AccessCode, Accessor, DataStore, EmailAddress, MedicalRecordEntry, MediLinkError,
    MediLinkResult, NewPatient, NonEmptyText, Patient, SharedRegistry,
};
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use dto::{
    AddRecordReq, AddRecordRes, CreatePatientReq, CreatePatientRes, CreateStaffReq,
    CreateStaffRes, EducationRes, EducationResourceDto, HealthRes, ListPatientsRes,
    PatientRecordsRes, PatientSummary, RecordEntryDto, ReminderDto, SearchQuery,
};

pub const DEFAULT_REST_ADDR: &str = "0.0.0.0:3000";
pub const PROVIDER_NAME_HEADER: &str = "x-provider-name";
pub const PROVIDER_PASSWORD_HEADER: &str = "x-provider-password";

type ApiError = (StatusCode, &'static str);

/// Application state shared across REST API handlers.
#[derive(Clone)]
pub struct AppState {
    pub registry: SharedRegistry,
    pub store: DataStore,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        list_patients,
        create_patient,
        read_records,
        add_record,
        education,
        create_staff,
    ),
    components(schemas(
        HealthRes,
        PatientSummary,
        ListPatientsRes,
        CreatePatientReq,
        CreatePatientRes,
        RecordEntryDto,
        ReminderDto,
        PatientRecordsRes,
        AddRecordReq,
        AddRecordRes,
        EducationResourceDto,
        EducationRes,
        CreateStaffReq,
        CreateStaffRes,
    ))
)]
pub struct ApiDoc;

/// Resolve the bind address from `MEDILINK_REST_ADDR`, falling back to [`DEFAULT_REST_ADDR`].
pub fn rest_addr_from_env_value(value: Option<String>) -> String {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| DEFAULT_REST_ADDR.into())
}

/// Builds the REST router with Swagger UI and permissive CORS.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/patients", get(list_patients).post(create_patient))
        .route("/records/:access_code", get(read_records).post(add_record))
        .route("/education", get(education))
        .route("/staff", post(create_staff))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Maps a core error to a status code, logging anything unexpected.
fn api_error(context: &str, e: MediLinkError) -> ApiError {
    match e {
        MediLinkError::InvalidInput(_)
        | MediLinkError::Text(_)
        | MediLinkError::InvalidDate(_)
        | MediLinkError::InvalidTimestamp(_)
        | MediLinkError::RecordIndexOutOfRange { .. }
        | MediLinkError::ReminderIndexOutOfRange { .. } => (StatusCode::BAD_REQUEST, "Invalid input"),
        MediLinkError::DuplicatePatient(_)
        | MediLinkError::DuplicateProvider(_)
        | MediLinkError::DuplicateStaffProfile(_)
        | MediLinkError::DuplicateAccessCode => (StatusCode::CONFLICT, "Already exists"),
        MediLinkError::PatientNotFound(_)
        | MediLinkError::ProviderNotFound(_)
        | MediLinkError::NoAppointment(_) => (StatusCode::NOT_FOUND, "Not found"),
        MediLinkError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "Invalid credentials"),
        MediLinkError::AccessDenied => (StatusCode::FORBIDDEN, "Access denied"),
        other => {
            tracing::error!("{} error: {:?}", context, other);
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal error")
        }
    }
}

/// Resolves the calling provider from the credential headers.
fn authenticate(state: &AppState, headers: &HeaderMap) -> Result<String, ApiError> {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
    };

    let (Some(name), Some(password)) = (
        header(PROVIDER_NAME_HEADER),
        header(PROVIDER_PASSWORD_HEADER),
    ) else {
        return Err((StatusCode::UNAUTHORIZED, "Missing provider credentials"));
    };

    state
        .registry
        .try_read(|r| {
            r.authenticate_provider(name, password)
                .map(|p| p.name.as_str().to_string())
        })
        .map_err(|e| api_error("Authenticate", e))
}

/// Writes a per-patient snapshot; failures are logged, not returned.
fn snapshot_patient(state: &AppState, patient: &Patient) {
    if let Err(e) = state.store.save_patient_snapshot(patient) {
        tracing::warn!("failed to snapshot patient '{}': {}", patient.name, e);
    }
}

fn optional_text(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint for the REST API.
async fn health() -> Json<HealthRes> {
    Json(HealthRes {
        ok: true,
        message: "MediLink REST API is alive".into(),
    })
}

#[utoipa::path(
    get,
    path = "/patients",
    params(SearchQuery),
    responses(
        (status = 200, description = "Patients with their access codes", body = ListPatientsRes),
        (status = 401, description = "Missing or invalid provider credentials"),
        (status = 500, description = "Internal server error")
    )
)]
/// Lists the caller's patients, or searches all patients by name or access code.
async fn list_patients(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(query): Query<SearchQuery>,
) -> Result<Json<ListPatientsRes>, ApiError> {
    let provider = authenticate(&state, &headers)?;
    let search = optional_text(query.search);

    let patients = state
        .registry
        .try_read(|r| match search.as_deref() {
            Some(keyword) => Ok(r
                .search_patients(keyword)
                .into_iter()
                .map(PatientSummary::from)
                .collect()),
            None => r.list_access_codes(&provider).map(|codes| {
                codes
                    .into_iter()
                    .map(|(name, code)| PatientSummary {
                        name: name.to_string(),
                        access_code: code.to_string(),
                    })
                    .collect()
            }),
        })
        .map_err(|e| api_error("List patients", e))?;

    Ok(Json(ListPatientsRes { patients }))
}

fn new_patient_from(req: CreatePatientReq) -> MediLinkResult<NewPatient> {
    let name = NonEmptyText::new(&req.name)?;
    let condition = NonEmptyText::new(&req.condition)?;
    let mut new_patient = NewPatient::new(
        name,
        MedicalRecordEntry::now(condition.into_inner(), req.medications, req.allergies),
    );
    new_patient.location = optional_text(req.location);
    new_patient.email = optional_text(req.email)
        .map(|e| EmailAddress::parse(&e))
        .transpose()?;
    new_patient.access_code = optional_text(req.access_code)
        .map(AccessCode::parse)
        .transpose()?;
    Ok(new_patient)
}

#[utoipa::path(
    post,
    path = "/patients",
    request_body = CreatePatientReq,
    responses(
        (status = 201, description = "Patient registered", body = CreatePatientRes),
        (status = 400, description = "Bad request"),
        (status = 401, description = "Missing or invalid provider credentials"),
        (status = 409, description = "Name or access code already in use"),
        (status = 500, description = "Internal server error")
    )
)]
/// Registers a patient under the calling provider and returns the issued access code.
async fn create_patient(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreatePatientReq>,
) -> Result<(StatusCode, Json<CreatePatientRes>), ApiError> {
    let provider = authenticate(&state, &headers)?;
    let new_patient = new_patient_from(req).map_err(|e| api_error("Create patient", e))?;

    let patient = state
        .registry
        .try_write(|r| r.register_patient(&provider, new_patient).cloned())
        .map_err(|e| api_error("Create patient", e))?;
    snapshot_patient(&state, &patient);

    Ok((
        StatusCode::CREATED,
        Json(CreatePatientRes {
            name: patient.name.as_str().to_string(),
            access_code: patient.access_code.to_string(),
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/records/{access_code}",
    params(("access_code" = String, Path, description = "Patient access code")),
    responses(
        (status = 200, description = "The patient's records", body = PatientRecordsRes),
        (status = 403, description = "Unknown access code"),
        (status = 500, description = "Internal server error")
    )
)]
/// Patient portal view: the access code alone grants read access.
async fn read_records(
    State(state): State<AppState>,
    AxumPath(access_code): AxumPath<String>,
) -> Result<Json<PatientRecordsRes>, ApiError> {
    state
        .registry
        .try_read(|r| {
            r.access_patient(Accessor::Patient, &access_code)
                .map(PatientRecordsRes::from)
        })
        .map(Json)
        .map_err(|e| api_error("Read records", e))
}

fn entry_from(req: AddRecordReq) -> MediLinkResult<MedicalRecordEntry> {
    let condition = NonEmptyText::new(&req.condition)?;
    Ok(MedicalRecordEntry {
        condition: condition.into_inner(),
        medications: req.medications,
        allergies: req.allergies,
        recorded_at: parse_timestamp(req.timestamp.as_deref().unwrap_or(""))?,
        url: optional_text(req.url),
    })
}

#[utoipa::path(
    post,
    path = "/records/{access_code}",
    params(("access_code" = String, Path, description = "Patient access code")),
    request_body = AddRecordReq,
    responses(
        (status = 201, description = "Entry appended", body = AddRecordRes),
        (status = 400, description = "Bad request"),
        (status = 401, description = "Missing or invalid provider credentials"),
        (status = 403, description = "Patient not owned by the caller"),
        (status = 500, description = "Internal server error")
    )
)]
/// Appends a medical-record entry to a patient the caller owns.
async fn add_record(
    State(state): State<AppState>,
    headers: HeaderMap,
    AxumPath(access_code): AxumPath<String>,
    Json(req): Json<AddRecordReq>,
) -> Result<(StatusCode, Json<AddRecordRes>), ApiError> {
    let provider = authenticate(&state, &headers)?;

    let entry = entry_from(req).map_err(|e| api_error("Add record", e))?;

    let patient = state
        .registry
        .try_write(|r| {
            r.add_record(&provider, &access_code, entry)?;
            r.provider_patient(&provider, &access_code).cloned()
        })
        .map_err(|e| api_error("Add record", e))?;
    snapshot_patient(&state, &patient);

    Ok((
        StatusCode::CREATED,
        Json(AddRecordRes {
            entries: patient.medical_records.len(),
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/education",
    params(SearchQuery),
    responses(
        (status = 200, description = "Health education resources", body = EducationRes),
        (status = 500, description = "Internal server error")
    )
)]
/// Lists education resources, optionally filtered by condition.
async fn education(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<EducationRes>, ApiError> {
    let catalog = state
        .registry
        .read(|r| r.education_resources())
        .map_err(|e| api_error("Education", e))?;

    let resources = match optional_text(query.search) {
        Some(term) => catalog.search(&term).into_iter().map(Into::into).collect(),
        None => catalog.iter().map(Into::into).collect(),
    };
    Ok(Json(EducationRes { resources }))
}

#[utoipa::path(
    post,
    path = "/staff",
    request_body = CreateStaffReq,
    responses(
        (status = 201, description = "Staff profile created", body = CreateStaffRes),
        (status = 400, description = "Bad request"),
        (status = 409, description = "Profile already exists"),
        (status = 500, description = "Internal server error")
    )
)]
/// Creates a staff profile, which also enables provider login under the same name.
async fn create_staff(
    State(state): State<AppState>,
    Json(req): Json<CreateStaffReq>,
) -> Result<(StatusCode, Json<CreateStaffRes>), ApiError> {
    let name = NonEmptyText::new(&req.name).map_err(|e| api_error("Create staff", e.into()))?;
    let password =
        NonEmptyText::new(&req.password).map_err(|e| api_error("Create staff", e.into()))?;

    state
        .registry
        .try_write(|r| r.create_staff_profile(name.clone(), &password))
        .map_err(|e| api_error("Create staff", e))?;

    Ok((
        StatusCode::CREATED,
        Json(CreateStaffRes {
            name: name.into_inner(),
        }),
    ))
}
