use axum::{
    Form, Json, Router,
    extract::{Path, State, rejection::FormRejection},
    routing::get,
};
use axum_helpers::errors::responses::InternalServerErrorResponse;
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::{ErrorBody, UserResult};
use crate::models::{CreateUserForm, UpdateUserForm, UserResponse};
use crate::repository::UserRepository;
use crate::service::UserService;

/// OpenAPI documentation for Users API
#[derive(OpenApi)]
#[openapi(
    paths(list_users, create_user, get_user, update_user, delete_user),
    components(
        schemas(UserResponse, CreateUserForm, UpdateUserForm, ErrorBody),
        responses(InternalServerErrorResponse)
    ),
    tags(
        (name = "Users", description = "User management endpoints (MongoDB)")
    )
)]
pub struct ApiDoc;

/// Create the users router with all HTTP endpoints
pub fn router<R: UserRepository + 'static>(service: UserService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/", get(list_users).post(create_user))
        .route("/{uid}", get(get_user).put(update_user).delete(delete_user))
        .with_state(shared_service)
}

/// Raw form pairs in body order, repeated keys included.
type FormPairs = Vec<(String, String)>;

/// Collect the recognised fields of a form body. A body that cannot be read
/// as a form counts as one with no fields.
fn form_fields<T>(form: Result<Form<FormPairs>, FormRejection>) -> T
where
    T: FromIterator<(String, String)>,
{
    match form {
        Ok(Form(pairs)) => pairs.into_iter().collect(),
        Err(rejection) => {
            tracing::debug!(%rejection, "Unreadable form body treated as empty");
            std::iter::empty().collect()
        }
    }
}

/// List the ids of all users
#[utoipa::path(
    get,
    path = "",
    tag = "Users",
    responses(
        (status = 200, description = "User ids", body = Vec<String>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_users<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
) -> UserResult<Json<Vec<String>>> {
    let ids = service.list_user_ids().await?;
    Ok(Json(ids))
}

/// Create a new user
#[utoipa::path(
    post,
    path = "",
    tag = "Users",
    request_body(content = CreateUserForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "User created", body = UserResponse),
        (status = 400, description = "A required field is missing", body = ErrorBody),
        (status = 409, description = "Name and/or email already in use", body = ErrorBody),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_user<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    form: Result<Form<FormPairs>, FormRejection>,
) -> UserResult<Json<UserResponse>> {
    let user = service.create_user(form_fields(form)).await?;
    Ok(Json(user))
}

/// Get a user by ID
#[utoipa::path(
    get,
    path = "/{uid}",
    tag = "Users",
    params(
        ("uid" = String, Path, description = "24-character user ID")
    ),
    responses(
        (status = 200, description = "User found", body = UserResponse),
        (status = 404, description = "No such user", body = ErrorBody),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_user<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    Path(uid): Path<String>,
) -> UserResult<Json<UserResponse>> {
    let user = service.get_user(&uid).await?;
    Ok(Json(user))
}

/// Update the supplied fields of a user
#[utoipa::path(
    put,
    path = "/{uid}",
    tag = "Users",
    params(
        ("uid" = String, Path, description = "24-character user ID")
    ),
    request_body(content = UpdateUserForm, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "User after the update", body = UserResponse),
        (status = 400, description = "No field supplied", body = ErrorBody),
        (status = 404, description = "No such user", body = ErrorBody),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_user<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    Path(uid): Path<String>,
    form: Result<Form<FormPairs>, FormRejection>,
) -> UserResult<Json<UserResponse>> {
    let user = service.update_user(&uid, form_fields(form)).await?;
    Ok(Json(user))
}

/// Delete a user
#[utoipa::path(
    delete,
    path = "/{uid}",
    tag = "Users",
    params(
        ("uid" = String, Path, description = "24-character user ID")
    ),
    responses(
        (status = 200, description = "User as it was before deletion", body = UserResponse),
        (status = 404, description = "No such user", body = ErrorBody),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_user<R: UserRepository>(
    State(service): State<Arc<UserService<R>>>,
    Path(uid): Path<String>,
) -> UserResult<Json<UserResponse>> {
    let user = service.delete_user(&uid).await?;
    Ok(Json(user))
}
