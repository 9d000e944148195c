//! HTTP request handlers for the contact directory API
//!
//! Handlers translate HTTP into service calls. Service work touches redb
//! synchronously, so it runs on the blocking pool; each request carries a
//! `CancelToken` that is cancelled if the request future is dropped.

use axum::{
    extract::{FromRequest, FromRequestParts, Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};

use crate::cancel::CancelToken;
use crate::database::AppState;
use crate::error::{ApiError, ServiceError};
use crate::model::{ContactInput, EmailExistsParams, EmailExistsResponse, SearchParams};
use crate::query::SearchCriteria;
use crate::service::ContactService;

/// `Json` body whose decoding failures are reported as `ApiError`
#[derive(FromRequest)]
#[from_request(via(Json), rejection(ApiError))]
pub struct JsonBody<T>(pub T);

/// `Query` whose decoding failures are reported as `ApiError`
#[derive(FromRequestParts)]
#[from_request(via(Query), rejection(ApiError))]
pub struct QueryParams<T>(pub T);

/// `Path` whose decoding failures are reported as `ApiError`
#[derive(FromRequestParts)]
#[from_request(via(Path), rejection(ApiError))]
pub struct PathParam<T>(pub T);

/// Runs `work` on the blocking pool with a cancellation token tied to this request
async fn run_service<T, F>(state: &AppState, work: F) -> Result<T, ApiError>
where
    T: Send + 'static,
    F: FnOnce(&ContactService, &CancelToken) -> Result<T, ServiceError> + Send + 'static,
{
    let cancel = CancelToken::new();
    let _guard = cancel.drop_guard();
    let service = state.service.clone();

    let result = tokio::task::spawn_blocking(move || work(&service, &cancel)).await?;
    Ok(result?)
}

fn not_found(id: u64) -> ApiError {
    ApiError::NotFound(format!("Contact with id {} was not found", id))
}

/// Lists contacts with search, sort and pagination
///
/// # Example Request
///
/// `GET /api/contacts?searchTerm=ada&pageNumber=1&pageSize=10&sortBy=email&sortOrder=desc`
///
/// # Response
///
/// ```json
/// {
///   "items": [...],
///   "pageNumber": 1,
///   "pageSize": 10,
///   "totalCount": 3,
///   "totalPages": 1,
///   "hasPreviousPage": false,
///   "hasNextPage": false
/// }
/// ```
pub async fn list_contacts(
    State(state): State<AppState>,
    QueryParams(params): QueryParams<SearchParams>,
) -> Result<impl IntoResponse, ApiError> {
    let criteria = SearchCriteria::from(params);
    let page = run_service(&state, move |service, cancel| service.search(&criteria, cancel)).await?;
    Ok(Json(page))
}

/// - **200 OK** - Contact found
/// - **404 Not Found** - No contact with this id
pub async fn get_contact(
    PathParam(id): PathParam<u64>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    run_service(&state, move |service, cancel| service.get_by_id(id, cancel))
        .await?
        .map(Json)
        .ok_or_else(|| not_found(id))
}

/// Creates a new contact
///
/// # Response
///
/// - **201 Created** - Contact created, `Location` points at it
/// - **400 Bad Request** - Validation failed, every invalid field is listed
/// - **409 Conflict** - Email already used by another contact
pub async fn create_contact(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<ContactInput>,
) -> Result<impl IntoResponse, ApiError> {
    let created = run_service(&state, move |service, cancel| service.create(&payload, cancel)).await?;
    let location = format!("/api/contacts/{}", created.id);

    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(created)))
}

/// Replaces all mutable fields of a contact
///
/// # Response
///
/// - **200 OK** - Updated contact
/// - **400 Bad Request** - Validation failed
/// - **404 Not Found** - No contact with this id
/// - **409 Conflict** - Email already used by another contact
pub async fn update_contact(
    PathParam(id): PathParam<u64>,
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<ContactInput>,
) -> Result<impl IntoResponse, ApiError> {
    run_service(&state, move |service, cancel| service.update(id, &payload, cancel))
        .await?
        .map(Json)
        .ok_or_else(|| not_found(id))
}

/// - **204 No Content** - Contact deleted
/// - **404 Not Found** - No contact with this id
pub async fn delete_contact(
    PathParam(id): PathParam<u64>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let deleted = run_service(&state, move |service, cancel| service.delete(id, cancel)).await?;
    if deleted {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(not_found(id))
    }
}

/// Checks whether an email is already taken
///
/// `GET /api/contacts/email-exists?email=ada@example.com&excludeId=3`
pub async fn email_exists(
    State(state): State<AppState>,
    QueryParams(params): QueryParams<EmailExistsParams>,
) -> Result<impl IntoResponse, ApiError> {
    let EmailExistsParams { email, exclude_id } = params;
    let lookup = email.clone();
    let exists = run_service(&state, move |service, cancel| {
        service.email_exists(&lookup, exclude_id, cancel)
    })
    .await?;

    Ok(Json(EmailExistsResponse { email, exists }))
}
