//! Program API endpoints.

use axum::{
    extract::{OriginalUri, State},
    http::{header, HeaderValue, StatusCode},
    response::IntoResponse,
    Json,
};

use super::{
    creation_alert, deletion_alert, error, pagination_headers, update_alert, ApiJson, ApiPath,
    ApiQuery, ApiResult,
};
use crate::auth::CurrentUser;
use crate::db::ProgramStore;
use crate::errors::{keys, AppError};
use crate::models::{PageParams, PageRequest, ProgramPatch, ProgramPayload, ENTITY_NAME};
use crate::AppState;

/// POST /api/programs - Create a new program.
pub async fn create_program(
    State(state): State<AppState>,
    user: CurrentUser,
    ApiJson(payload): ApiJson<ProgramPayload>,
) -> ApiResult {
    tracing::debug!("REST request to save Program : {:?}", payload.title);

    let fields = payload.validate().map_err(|e| error(e, &state))?;

    if payload.id.is_some() {
        return Err(error(
            AppError::invalid_request(
                "A new program cannot already have an ID",
                ENTITY_NAME,
                keys::ID_EXISTS,
            ),
            &state,
        ));
    }

    let program = state
        .store
        .create(&fields, user.login.as_deref())
        .await
        .map_err(|e| error(e, &state))?;

    let id = program.id.to_string();
    let mut headers = creation_alert(&state.config.app_name, ENTITY_NAME, &id);
    let location = format!("/api/programs/{}", id);
    headers.insert(
        header::LOCATION,
        HeaderValue::try_from(location).map_err(|e| error(AppError::Internal(e.to_string()), &state))?,
    );

    Ok((StatusCode::CREATED, headers, Json(program)).into_response())
}

/// PUT /api/programs/:id - Replace an existing program.
pub async fn update_program(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(payload): ApiJson<ProgramPayload>,
) -> ApiResult {
    tracing::debug!("REST request to update Program : {}, {:?}", id, payload.title);

    let fields = payload.validate().map_err(|e| error(e, &state))?;

    check_identity(id, payload.id, state.store.as_ref())
        .await
        .map_err(|e| error(e, &state))?;

    // A row deleted between the check and the write still reads as a bad id
    let program = state
        .store
        .update(id, &fields)
        .await
        .map_err(|e| error(e, &state))?
        .ok_or_else(|| error(entity_not_found(), &state))?;

    let headers = update_alert(&state.config.app_name, ENTITY_NAME, &id.to_string());
    Ok((StatusCode::OK, headers, Json(program)).into_response())
}

/// PATCH /api/programs/:id - Merge supplied fields into an existing program.
pub async fn partial_update_program(
    State(state): State<AppState>,
    ApiPath(id): ApiPath<i64>,
    ApiJson(patch): ApiJson<ProgramPatch>,
) -> ApiResult {
    tracing::debug!("REST request to partially update Program : {}", id);

    check_identity(id, patch.id, state.store.as_ref())
        .await
        .map_err(|e| error(e, &state))?;

    let Some(mut existing) = state
        .store
        .find_by_id(id)
        .await
        .map_err(|e| error(e, &state))?
    else {
        return Err(error(program_not_found(id), &state));
    };

    let applied = patch.apply(&mut existing);
    tracing::debug!("Merged {} field(s) into program {}", applied, id);

    let program = state
        .store
        .update(id, &existing.fields())
        .await
        .map_err(|e| error(e, &state))?
        .ok_or_else(|| error(program_not_found(id), &state))?;

    let headers = update_alert(&state.config.app_name, ENTITY_NAME, &id.to_string());
    Ok((StatusCode::OK, headers, Json(program)).into_response())
}

/// GET /api/programs - List one page of programs.
pub async fn list_programs(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    ApiQuery(params): ApiQuery<PageParams>,
) -> ApiResult {
    tracing::debug!("REST request to get a page of Programs");

    let request = PageRequest::from_params(&params).map_err(|e| error(e, &state))?;
    let page = state
        .store
        .find_all(&request)
        .await
        .map_err(|e| error(e, &state))?;

    let headers = pagination_headers(uri.path(), &request, &page);
    Ok((StatusCode::OK, headers, Json(page.content)).into_response())
}

/// GET /api/programs/mine - List the caller's programs.
pub async fn list_my_programs(State(state): State<AppState>, user: CurrentUser) -> ApiResult {
    let Some(login) = user.login else {
        return Err(error(
            AppError::Unauthorized("No current user".to_string()),
            &state,
        ));
    };
    tracing::debug!("REST request to get Programs owned by {}", login);

    let programs = state
        .store
        .find_by_owner(&login)
        .await
        .map_err(|e| error(e, &state))?;

    Ok(Json(programs).into_response())
}

/// GET /api/programs/:id - Get a single program.
pub async fn get_program(State(state): State<AppState>, ApiPath(id): ApiPath<i64>) -> ApiResult {
    tracing::debug!("REST request to get Program : {}", id);

    match state.store.find_by_id(id).await {
        Ok(Some(program)) => Ok(Json(program).into_response()),
        Ok(None) => Err(error(program_not_found(id), &state)),
        Err(e) => Err(error(e, &state)),
    }
}

/// DELETE /api/programs/:id - Delete a program.
pub async fn delete_program(State(state): State<AppState>, ApiPath(id): ApiPath<i64>) -> ApiResult {
    tracing::debug!("REST request to delete Program : {}", id);

    state
        .store
        .delete_by_id(id)
        .await
        .map_err(|e| error(e, &state))?;

    let headers = deletion_alert(&state.config.app_name, ENTITY_NAME, &id.to_string());
    Ok((StatusCode::NO_CONTENT, headers).into_response())
}

/// Pre-checks shared by full and partial updates, in reporting order:
/// body id present, body id equal to the path id, record exists.
async fn check_identity(
    path_id: i64,
    body_id: Option<i64>,
    store: &dyn ProgramStore,
) -> Result<(), AppError> {
    let Some(body_id) = body_id else {
        return Err(AppError::invalid_request("Invalid id", ENTITY_NAME, keys::ID_NULL));
    };
    if body_id != path_id {
        return Err(AppError::invalid_request("Invalid ID", ENTITY_NAME, keys::ID_INVALID));
    }
    if !store.exists_by_id(path_id).await? {
        return Err(entity_not_found());
    }
    Ok(())
}

fn entity_not_found() -> AppError {
    AppError::invalid_request("Entity not found", ENTITY_NAME, keys::ID_NOT_FOUND)
}

fn program_not_found(id: i64) -> AppError {
    AppError::NotFound(format!("Program {} not found", id))
}
