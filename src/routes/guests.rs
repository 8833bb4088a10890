use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post, put},
};
use uuid::Uuid;

use crate::{
    dto::users::{CreateUserRequest, GuestList, UpdateProfileRequest},
    error::AppResult,
    middleware::auth::AuthUser,
    models::User,
    response::ApiResponse,
    routes::params::GuestListQuery,
    services::user_service,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_guests))
        .route("/", post(create_user))
        .route("/{id}", get(get_guest))
        .route("/{id}", put(update_profile))
}

#[utoipa::path(
    get,
    path = "/api/guests",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("role" = Option<String>, Query, description = "Filter by role, default guest")
    ),
    responses(
        (status = 200, description = "List accounts by role (staff)", body = ApiResponse<GuestList>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Guests"
)]
pub async fn list_guests(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<GuestListQuery>,
) -> AppResult<Json<ApiResponse<GuestList>>> {
    let resp = user_service::list_guests(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/guests",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "Create account with explicit role (admin only)", body = ApiResponse<User>),
        (status = 403, description = "Forbidden"),
        (status = 422, description = "Unknown role"),
    ),
    security(("bearer_auth" = [])),
    tag = "Guests"
)]
pub async fn create_user(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateUserRequest>,
) -> AppResult<Json<ApiResponse<User>>> {
    let resp = user_service::create_user(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/guests/{id}",
    params(("id" = Uuid, Path, description = "Guest ID")),
    responses(
        (status = 200, description = "Guest details (staff or self)", body = ApiResponse<User>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Guest not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Guests"
)]
pub async fn get_guest(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<User>>> {
    let resp = user_service::get_guest(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/guests/{id}",
    params(("id" = Uuid, Path, description = "Guest ID")),
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Update profile (self or admin)", body = ApiResponse<User>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Guest not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Guests"
)]
pub async fn update_profile(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProfileRequest>,
) -> AppResult<Json<ApiResponse<User>>> {
    let resp = user_service::update_profile(&state, &user, id, payload).await?;
    Ok(Json(resp))
}
