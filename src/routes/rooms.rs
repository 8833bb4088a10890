use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{delete, get, patch, post, put},
};
use uuid::Uuid;

use crate::{
    dto::{
        reviews::{CreateReviewRequest, ReviewList},
        rooms::{CreateRoomRequest, RoomList, UpdateRoomRequest, UpdateRoomStatusRequest},
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::{Review, Room},
    response::ApiResponse,
    routes::params::RoomQuery,
    services::{review_service, room_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_rooms))
        .route("/", post(create_room))
        .route("/{id}", get(get_room))
        .route("/{id}", put(update_room))
        .route("/{id}", delete(delete_room))
        .route("/{id}/status", patch(set_room_status))
        .route("/{id}/reviews", get(list_reviews))
        .route("/{id}/reviews", post(submit_review))
}

#[utoipa::path(
    get,
    path = "/api/rooms",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("status" = Option<String>, Query, description = "Filter by status: Available, Booked, Maintenance"),
        ("room_type" = Option<String>, Query, description = "Filter by room type"),
        ("sort_by" = Option<String>, Query, description = "Sort column: created_at, price, room_number"),
        ("sort_order" = Option<String>, Query, description = "Sort order: asc, desc")
    ),
    responses(
        (status = 200, description = "List rooms", body = ApiResponse<RoomList>)
    ),
    tag = "Rooms"
)]
pub async fn list_rooms(
    State(state): State<AppState>,
    Query(query): Query<RoomQuery>,
) -> AppResult<Json<ApiResponse<RoomList>>> {
    let resp = room_service::list_rooms(&state, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/rooms/{id}",
    params(("id" = Uuid, Path, description = "Room ID")),
    responses(
        (status = 200, description = "Get room", body = ApiResponse<Room>),
        (status = 404, description = "Room not found"),
    ),
    tag = "Rooms"
)]
pub async fn get_room(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Room>>> {
    let resp = room_service::get_room(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/rooms",
    request_body = CreateRoomRequest,
    responses(
        (status = 201, description = "Create room (admin only)", body = ApiResponse<Room>),
        (status = 403, description = "Forbidden"),
        (status = 422, description = "Missing or invalid attribute"),
    ),
    security(("bearer_auth" = [])),
    tag = "Rooms"
)]
pub async fn create_room(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateRoomRequest>,
) -> AppResult<Json<ApiResponse<Room>>> {
    let resp = room_service::create_room(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    put,
    path = "/api/rooms/{id}",
    params(("id" = Uuid, Path, description = "Room ID")),
    request_body = UpdateRoomRequest,
    responses(
        (status = 200, description = "Update room (admin only)", body = ApiResponse<Room>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Room not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Rooms"
)]
pub async fn update_room(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateRoomRequest>,
) -> AppResult<Json<ApiResponse<Room>>> {
    let resp = room_service::update_room(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    delete,
    path = "/api/rooms/{id}",
    params(("id" = Uuid, Path, description = "Room ID")),
    responses(
        (status = 200, description = "Delete room (admin only)"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Room not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Rooms"
)]
pub async fn delete_room(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<serde_json::Value>>> {
    let resp = room_service::delete_room(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/rooms/{id}/status",
    params(("id" = Uuid, Path, description = "Room ID")),
    request_body = UpdateRoomStatusRequest,
    responses(
        (status = 200, description = "Overwrite room status (staff)", body = ApiResponse<Room>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Room not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Rooms"
)]
pub async fn set_room_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateRoomStatusRequest>,
) -> AppResult<Json<ApiResponse<Room>>> {
    let resp = room_service::set_room_status(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/rooms/{id}/reviews",
    params(("id" = Uuid, Path, description = "Room ID")),
    responses(
        (status = 200, description = "Reviews for a room", body = ApiResponse<ReviewList>)
    ),
    tag = "Reviews"
)]
pub async fn list_reviews(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<ReviewList>>> {
    let resp = review_service::list_reviews(&state, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/rooms/{id}/reviews",
    params(("id" = Uuid, Path, description = "Room ID")),
    request_body = CreateReviewRequest,
    responses(
        (status = 201, description = "Submit a review", body = ApiResponse<Review>),
        (status = 404, description = "Room not found"),
        (status = 422, description = "Invalid rating or comment"),
    ),
    security(("bearer_auth" = [])),
    tag = "Reviews"
)]
pub async fn submit_review(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<CreateReviewRequest>,
) -> AppResult<Json<ApiResponse<Review>>> {
    let resp = review_service::submit_review(&state, &user, id, payload).await?;
    Ok(Json(resp))
}
