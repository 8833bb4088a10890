use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, patch, post},
};
use uuid::Uuid;

use crate::{
    dto::bookings::{
        BookingList, BookingWithDetails, CreateBookingRequest, PaymentConfirmation,
        UpdateBookingStatusRequest,
    },
    error::AppResult,
    middleware::auth::AuthUser,
    models::{Booking, Payment},
    response::ApiResponse,
    routes::params::BookingListQuery,
    services::{booking_service, payment_service},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_booking))
        .route("/", get(list_my_bookings))
        .route("/{id}", get(get_booking))
        .route("/{id}/status", patch(set_booking_status))
        .route("/{id}/pay", post(confirm_payment))
        .route("/{id}/check-in", post(check_in))
        .route("/{id}/check-out", post(check_out))
        .route("/{id}/payment", get(get_payment))
}

#[utoipa::path(
    post,
    path = "/api/bookings",
    request_body = CreateBookingRequest,
    responses(
        (status = 201, description = "Create booking", body = ApiResponse<Booking>),
        (status = 404, description = "Room not found"),
        (status = 409, description = "Guest count exceeds room capacity"),
        (status = 422, description = "Invalid dates or guest count"),
    ),
    security(("bearer_auth" = [])),
    tag = "Bookings"
)]
pub async fn create_booking(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<CreateBookingRequest>,
) -> AppResult<Json<ApiResponse<Booking>>> {
    let resp = booking_service::create_booking(&state, &user, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/bookings",
    params(
        ("page" = Option<i64>, Query, description = "Page number, default 1"),
        ("per_page" = Option<i64>, Query, description = "Items per page, default 20"),
        ("status" = Option<String>, Query, description = "Filter by booking status"),
        ("sort_order" = Option<String>, Query, description = "Sort order: asc, desc")
    ),
    responses(
        (status = 200, description = "List own bookings", body = ApiResponse<BookingList>)
    ),
    security(("bearer_auth" = [])),
    tag = "Bookings"
)]
pub async fn list_my_bookings(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<BookingListQuery>,
) -> AppResult<Json<ApiResponse<BookingList>>> {
    let resp = booking_service::list_my_bookings(&state, &user, query).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/bookings/{id}",
    params(("id" = Uuid, Path, description = "Booking ID")),
    responses(
        (status = 200, description = "Booking with room and guest details", body = ApiResponse<BookingWithDetails>),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Booking not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Bookings"
)]
pub async fn get_booking(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<BookingWithDetails>>> {
    let resp = booking_service::get_booking(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    patch,
    path = "/api/bookings/{id}/status",
    params(("id" = Uuid, Path, description = "Booking ID")),
    request_body = UpdateBookingStatusRequest,
    responses(
        (status = 200, description = "Update booking status (staff)", body = ApiResponse<Booking>),
        (status = 400, description = "Illegal transition"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Booking not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Bookings"
)]
pub async fn set_booking_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateBookingStatusRequest>,
) -> AppResult<Json<ApiResponse<Booking>>> {
    let resp = booking_service::set_booking_status(&state, &user, id, payload).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/bookings/{id}/pay",
    params(("id" = Uuid, Path, description = "Booking ID")),
    responses(
        (status = 200, description = "Confirm payment", body = ApiResponse<PaymentConfirmation>),
        (status = 402, description = "Payment declined by gateway"),
        (status = 404, description = "Booking not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Bookings"
)]
pub async fn confirm_payment(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<PaymentConfirmation>>> {
    let resp = booking_service::confirm_payment(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/bookings/{id}/check-in",
    params(("id" = Uuid, Path, description = "Booking ID")),
    responses(
        (status = 200, description = "Check guest in (staff)", body = ApiResponse<Booking>),
        (status = 400, description = "Illegal transition"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Booking not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Bookings"
)]
pub async fn check_in(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Booking>>> {
    let resp = booking_service::check_in(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    post,
    path = "/api/bookings/{id}/check-out",
    params(("id" = Uuid, Path, description = "Booking ID")),
    responses(
        (status = 200, description = "Check guest out and free the room (staff)", body = ApiResponse<Booking>),
        (status = 400, description = "Illegal transition"),
        (status = 403, description = "Forbidden"),
        (status = 404, description = "Booking or room not found"),
    ),
    security(("bearer_auth" = [])),
    tag = "Bookings"
)]
pub async fn check_out(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Booking>>> {
    let resp = booking_service::check_out(&state, &user, id).await?;
    Ok(Json(resp))
}

#[utoipa::path(
    get,
    path = "/api/bookings/{id}/payment",
    params(("id" = Uuid, Path, description = "Booking ID")),
    responses(
        (status = 200, description = "Payment for a booking", body = ApiResponse<Payment>),
        (status = 404, description = "No payment recorded"),
    ),
    security(("bearer_auth" = [])),
    tag = "Bookings"
)]
pub async fn get_payment(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> AppResult<Json<ApiResponse<Payment>>> {
    let resp = payment_service::get_payment_by_booking(&state, &user, id).await?;
    Ok(Json(resp))
}
