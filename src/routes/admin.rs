use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};

use crate::{
    dto::bookings::BookingList,
    error::AppResult,
    middleware::auth::AuthUser,
    models::Room,
    response::ApiResponse,
    routes::params::BookingListQuery,
    services::{booking_service, room_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/bookings", get(list_all_bookings))
        .route("/check-ins/today", get(todays_check_ins))
        .route("/rooms/top-performing", get(top_performing_room))
}

#[utoipa::path(
    get,
    path = "/api/admin/bookings",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("status" = Option<String>, Query, description = "Filter by booking status"),
        ("sort_order" = Option<String>, Query, description = "Sort order: asc, desc")
    ),
    responses(
        (status = 200, description = "All bookings (staff)", body = ApiResponse<BookingList>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn list_all_bookings(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<BookingListQuery>,
) -> AppResult<Json<ApiResponse<BookingList>>> {
    let resp = booking_service::list_all_bookings(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/check-ins/today",
    responses(
        (status = 200, description = "Bookings arriving today (staff)", body = ApiResponse<BookingList>),
        (status = 403, description = "Forbidden"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn todays_check_ins(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<BookingList>>> {
    let resp = booking_service::todays_check_ins(&state, &user).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/admin/rooms/top-performing",
    responses(
        (status = 200, description = "Room with the highest booking count (staff)", body = ApiResponse<Room>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "No rooms in the catalog"),
    ),
    security(("bearer_auth" = [])),
    tag = "Admin"
)]
pub async fn top_performing_room(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<ApiResponse<Room>>> {
    let resp = room_service::top_performing_room(&state, &user).await?;
    Ok(Json(resp))
}
