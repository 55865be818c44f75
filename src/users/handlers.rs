use axum::{extract::State, Json};
use tracing::{info, instrument, warn};

use crate::{
    error::{ApiError, ApiResult},
    extractors::{ApiJson, UserId},
    state::AppState,
    users::{
        dto::{CreateUserInput, Data, UpdateUserInput},
        repo_types::User,
        validation::{validate_create, validate_update, FieldError},
    },
};

fn rejected(op: &'static str) -> impl FnOnce(Vec<FieldError>) -> ApiError {
    move |errors| {
        warn!(op, ?errors, "input rejected");
        ApiError::Validation(errors)
    }
}

/// GET /v1/users: live users, newest first.
#[instrument(skip(state))]
pub async fn list_users(State(state): State<AppState>) -> ApiResult<Json<Data<Vec<User>>>> {
    let users = state.users.list().await?;
    Ok(Json(Data::new(users)))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    UserId(id): UserId,
) -> ApiResult<Json<Data<User>>> {
    match state.users.find(id).await? {
        Some(user) => Ok(Json(Data::new(user))),
        None => {
            warn!(id, "user not found");
            Err(ApiError::NotFound)
        }
    }
}

#[instrument(skip(state, input))]
pub async fn create_user(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<CreateUserInput>,
) -> ApiResult<Json<Data<User>>> {
    let new = validate_create(input).map_err(rejected("create"))?;
    let user = state.users.create(new).await?;
    info!(user_id = user.id, "user created");
    Ok(Json(Data::new(user)))
}

/// PATCH /v1/users/:id: overwrites only the fields present in the body.
///
/// The row is looked up before the body is looked at, so an unknown id is
/// 404 whatever the body holds.
#[instrument(skip(state, body))]
pub async fn update_user(
    State(state): State<AppState>,
    UserId(id): UserId,
    body: Result<ApiJson<UpdateUserInput>, ApiError>,
) -> ApiResult<Json<Data<User>>> {
    if state.users.find(id).await?.is_none() {
        warn!(id, "update of unknown user");
        return Err(ApiError::NotFound);
    }

    let ApiJson(input) = body?;
    let changes = validate_update(input).map_err(rejected("update"))?;

    // Row may have been deleted between the lookup and the write.
    let user = state
        .users
        .update(id, changes)
        .await?
        .ok_or(ApiError::NotFound)?;
    info!(user_id = user.id, "user updated");
    Ok(Json(Data::new(user)))
}

/// DELETE /v1/users/:id: soft delete, the row keeps its data.
#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    UserId(id): UserId,
) -> ApiResult<Json<Data<bool>>> {
    if !state.users.soft_delete(id).await? {
        warn!(id, "delete of unknown user");
        return Err(ApiError::NotFound);
    }
    info!(user_id = id, "user deleted");
    Ok(Json(Data::new(true)))
}
