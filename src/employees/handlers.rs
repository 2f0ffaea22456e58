use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    http::StatusCode,
    response::Redirect,
    routing::{get, post, put},
    Json, Router,
};
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{auth::jwt::AuthUser, error::ApiError, state::AppState};

use super::{
    dto::{EmployeeEnvelope, EmployeeResponse, MessageResponse, SearchQuery},
    photos::{self, PhotoUpload},
    repo::{self, EmployeeFilter},
    validate::{self, EmployeeDraft},
};

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/employees", get(list_employees))
        .route("/employees/search", get(search_employees))
        .route("/employees/:id", get(get_employee))
        .route("/employees/:id/photo", get(get_employee_photo))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/employees", post(create_employee))
        .route(
            "/employees/:id",
            put(update_employee).delete(delete_employee),
        )
        .layer(DefaultBodyLimit::max(10 * 1024 * 1024))
}

#[instrument(skip(state, _actor))]
pub async fn list_employees(
    State(state): State<AppState>,
    _actor: AuthUser,
) -> Result<Json<Vec<EmployeeResponse>>, ApiError> {
    let employees = repo::list(&state.db, &EmployeeFilter::default()).await?;
    Ok(Json(employees.into_iter().map(Into::into).collect()))
}

#[instrument(skip(state, _actor))]
pub async fn search_employees(
    State(state): State<AppState>,
    _actor: AuthUser,
    Query(query): Query<SearchQuery>,
) -> Result<Json<Vec<EmployeeResponse>>, ApiError> {
    let filter = filter_from(query);
    let employees = repo::list(&state.db, &filter).await?;
    Ok(Json(employees.into_iter().map(Into::into).collect()))
}

#[instrument(skip(state, _actor))]
pub async fn get_employee(
    State(state): State<AppState>,
    _actor: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<EmployeeResponse>, ApiError> {
    let employee = repo::get(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Employee not found".to_string()))?;
    Ok(Json(employee.into()))
}

/// 302 to a short-lived presigned URL for the stored photo.
#[instrument(skip(state, _actor))]
pub async fn get_employee_photo(
    State(state): State<AppState>,
    _actor: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Redirect, ApiError> {
    let employee = repo::get(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Employee not found".to_string()))?;
    let key = employee
        .photo_url
        .as_deref()
        .ok_or_else(|| ApiError::NotFound("Photo not found".to_string()))?;
    let url = photos::presign_photo(&state, key).await?;
    Ok(Redirect::temporary(&url))
}

#[instrument(skip(state, actor, mp))]
pub async fn create_employee(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    mp: Multipart,
) -> Result<(StatusCode, Json<EmployeeEnvelope>), ApiError> {
    let (draft, photo) = read_employee_form(mp).await?;
    let mut employee = validate::validate(&draft).map_err(ApiError::Validation)?;

    if repo::find_by_email(&state.db, &employee.email)
        .await?
        .is_some()
    {
        return Err(ApiError::DuplicateEmail(
            "Employee email already in use".to_string(),
        ));
    }

    if let Some(photo) = photo {
        employee.photo_url = Some(photos::store_photo(&state, photo).await?);
    }

    let created = repo::insert(&state.db, &employee).await?;
    info!(employee_id = %created.id, actor = %actor.email, "employee created");
    Ok((
        StatusCode::CREATED,
        Json(EmployeeEnvelope {
            message: "Employee created successfully".to_string(),
            employee: created.into(),
        }),
    ))
}

#[instrument(skip(state, actor, mp))]
pub async fn update_employee(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path(id): Path<Uuid>,
    mp: Multipart,
) -> Result<Json<EmployeeEnvelope>, ApiError> {
    let existing = repo::get(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Employee not found".to_string()))?;

    let (draft, photo) = read_employee_form(mp).await?;
    let merged = draft.merge_over(&existing);
    let mut employee = validate::validate(&merged).map_err(ApiError::Validation)?;

    if let Some(other) = repo::find_by_email(&state.db, &employee.email).await? {
        if other.id != id {
            return Err(ApiError::DuplicateEmail(
                "Employee email already in use".to_string(),
            ));
        }
    }

    // Photo replacement is an upsert of the reference; the old object is
    // dropped once the new one is stored.
    employee.photo_url = existing.photo_url.clone();
    if let Some(photo) = photo {
        let key = photos::store_photo(&state, photo).await?;
        if let Some(old) = existing.photo_url.as_deref() {
            photos::discard_photo(&state, old).await;
        }
        employee.photo_url = Some(key);
    }

    let updated = repo::update(&state.db, id, &employee)
        .await?
        .ok_or_else(|| ApiError::NotFound("Employee not found".to_string()))?;
    info!(employee_id = %updated.id, actor = %actor.email, "employee updated");
    Ok(Json(EmployeeEnvelope {
        message: "Employee updated successfully".to_string(),
        employee: updated.into(),
    }))
}

#[instrument(skip(state, actor))]
pub async fn delete_employee(
    State(state): State<AppState>,
    AuthUser(actor): AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Some(photo_url) = repo::delete(&state.db, id).await? else {
        return Err(ApiError::NotFound("Employee not found".to_string()));
    };
    if let Some(key) = photo_url.as_deref() {
        photos::discard_photo(&state, key).await;
    }
    info!(employee_id = %id, actor = %actor.email, "employee deleted");
    Ok(Json(MessageResponse {
        message: "Employee deleted successfully".to_string(),
    }))
}

/// Drains the multipart body into named text fields plus an optional
/// `photo` file part. File bytes are passed through untouched.
async fn read_employee_form(
    mut mp: Multipart,
) -> Result<(EmployeeDraft, Option<PhotoUpload>), ApiError> {
    let mut draft = EmployeeDraft::default();
    let mut photo = None;

    while let Some(field) = mp
        .next_field()
        .await
        .map_err(|_| ApiError::BadRequest("Malformed multipart payload".to_string()))?
    {
        let Some(name) = field.name().map(|s| s.to_string()) else {
            continue;
        };
        if name == "photo" {
            let content_type = field
                .content_type()
                .map(|s| s.to_string())
                .unwrap_or_else(|| "application/octet-stream".to_string());
            let body = field
                .bytes()
                .await
                .map_err(|_| ApiError::BadRequest("Failed to read photo upload".to_string()))?;
            if !body.is_empty() {
                photo = Some(PhotoUpload { body, content_type });
            }
        } else {
            let value = field
                .text()
                .await
                .map_err(|_| ApiError::BadRequest("Malformed multipart payload".to_string()))?;
            draft.set(&name, value);
        }
    }

    Ok((draft, photo))
}

fn filter_from(query: SearchQuery) -> EmployeeFilter {
    EmployeeFilter {
        department: query.department.filter(|d| !d.trim().is_empty()),
        position: query.position.filter(|p| !p.trim().is_empty()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_drops_empty_params() {
        let filter = filter_from(SearchQuery {
            department: Some("Eng".into()),
            position: Some("  ".into()),
        });
        assert_eq!(filter.department.as_deref(), Some("Eng"));
        assert_eq!(filter.position, None);

        let filter = filter_from(SearchQuery {
            department: None,
            position: None,
        });
        assert_eq!(filter.department, None);
        assert_eq!(filter.position, None);
    }
}
