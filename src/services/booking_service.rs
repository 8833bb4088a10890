use std::str::FromStr;

use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::sea_query::{Expr, LockType};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::bookings::{
        BookingList, BookingWithDetails, CreateBookingRequest, PaymentConfirmation,
        UpdateBookingStatusRequest,
    },
    entity::{
        bookings::{
            ActiveModel as BookingActive, Column as BookingCol, Entity as Bookings,
            Model as BookingModel,
        },
        payments::ActiveModel as PaymentActive,
        rooms::{ActiveModel as RoomActive, Column as RoomCol, Entity as Rooms},
        users::Entity as Users,
    },
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_staff},
    models::{Booking, BookingStatus, PaymentStatus, RoomStatus},
    response::{ApiResponse, Meta},
    routes::params::{BookingListQuery, SortOrder},
    services::{payment_service::payment_from_entity, room_service::room_from_entity,
        user_service::user_from_entity},
    state::AppState,
};

/// Create a booking for the calling guest. The capacity check, the booking
/// insert, the room's booking-count increment and the status flip to Booked
/// all happen inside one transaction holding a row lock on the room, so a
/// concurrent booking cannot under-count.
pub async fn create_booking(
    state: &AppState,
    user: &AuthUser,
    payload: CreateBookingRequest,
) -> AppResult<ApiResponse<Booking>> {
    if payload.check_out <= payload.check_in {
        return Err(AppError::Validation(
            "check-out must be after check-in".into(),
        ));
    }
    if payload.number_of_guests < 1 {
        return Err(AppError::Validation(
            "number of guests must be at least 1".into(),
        ));
    }

    let txn = state.orm.begin().await?;

    let room = Rooms::find_by_id(payload.room_id)
        .lock(LockType::Update)
        .one(&txn)
        .await?;
    let room = match room {
        Some(r) => r,
        None => return Err(AppError::NotFound),
    };

    if payload.number_of_guests > room.capacity {
        return Err(AppError::CapacityExceeded {
            requested: payload.number_of_guests,
            capacity: room.capacity,
        });
    }

    let booking = BookingActive {
        id: Set(Uuid::new_v4()),
        user_id: Set(user.user_id),
        room_id: Set(room.id),
        check_in: Set(payload.check_in),
        check_out: Set(payload.check_out),
        number_of_guests: Set(payload.number_of_guests),
        special_requests: Set(payload.special_requests),
        status: Set(BookingStatus::Pending.to_string()),
        payment_status: Set(PaymentStatus::Unpaid.to_string()),
        has_checked_in: Set(false),
        has_checked_out: Set(false),
        created_at: NotSet,
    }
    .insert(&txn)
    .await?;

    let new_count = room.booking_count + 1;
    let mut active: RoomActive = room.into();
    active.booking_count = Set(new_count);
    active.status = Set(RoomStatus::Booked.to_string());
    active.update(&txn).await?;

    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "booking_create",
        Some("bookings"),
        Some(serde_json::json!({ "booking_id": booking.id, "room_id": booking.room_id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Booking created",
        booking_from_entity(booking)?,
        Some(Meta::empty()),
    ))
}

/// Charge the simulated gateway for a pending booking. The charge runs
/// before the transaction so the room/booking rows are not locked while the
/// gateway sleeps; the Pending check is repeated under the lock.
pub async fn confirm_payment(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<PaymentConfirmation>> {
    let booking = Bookings::find_by_id(id).one(&state.orm).await?;
    let booking = match booking {
        Some(b) => b,
        None => return Err(AppError::NotFound),
    };
    if !user.is_staff() && booking.user_id != user.user_id {
        return Err(AppError::Forbidden);
    }
    if parse_status(&booking.status)? != BookingStatus::Pending {
        return Err(AppError::BadRequest(
            "only a Pending booking can be paid".into(),
        ));
    }

    let room = Rooms::find_by_id(booking.room_id).one(&state.orm).await?;
    let room = match room {
        Some(r) => r,
        None => return Err(AppError::NotFound),
    };

    let nights = (booking.check_out - booking.check_in).num_days();
    if nights <= 0 {
        return Err(AppError::Validation("booking has no nights to bill".into()));
    }
    let amount = nights * room.price;

    // A decline surfaces here and nothing is written.
    let receipt = state.gateway.charge(amount).await?;

    let txn = state.orm.begin().await?;

    let booking = Bookings::find_by_id(id)
        .lock(LockType::Update)
        .one(&txn)
        .await?;
    let booking = match booking {
        Some(b) => b,
        None => return Err(AppError::NotFound),
    };
    if parse_status(&booking.status)? != BookingStatus::Pending {
        return Err(AppError::BadRequest(
            "booking was already paid or cancelled".into(),
        ));
    }

    let payment = PaymentActive {
        id: Set(Uuid::new_v4()),
        booking_id: Set(booking.id),
        amount: Set(amount),
        nights: Set(nights as i32),
        status: Set("success".to_string()),
        payment_method: Set(receipt.payment_method),
        transaction_id: Set(receipt.transaction_id),
        created_at: NotSet,
    }
    .insert(&txn)
    .await?;

    let mut active: BookingActive = booking.into();
    active.status = Set(BookingStatus::Confirmed.to_string());
    active.payment_status = Set(PaymentStatus::Paid.to_string());
    let booking = active.update(&txn).await?;

    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "payment_confirmed",
        Some("payments"),
        Some(serde_json::json!({
            "booking_id": booking.id,
            "payment_id": payment.id,
            "amount": amount,
        })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Payment confirmed",
        PaymentConfirmation {
            booking: booking_from_entity(booking)?,
            payment: payment_from_entity(payment),
        },
        Some(Meta::empty()),
    ))
}

pub async fn set_booking_status(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateBookingStatusRequest,
) -> AppResult<ApiResponse<Booking>> {
    ensure_staff(user)?;
    let booking = apply_transition(state, user, id, payload.status).await?;
    Ok(ApiResponse::success(
        "Booking status updated",
        booking,
        Some(Meta::empty()),
    ))
}

pub async fn check_in(state: &AppState, user: &AuthUser, id: Uuid) -> AppResult<ApiResponse<Booking>> {
    ensure_staff(user)?;
    let booking = apply_transition(state, user, id, BookingStatus::CheckedIn).await?;
    Ok(ApiResponse::success(
        "Guest checked in",
        booking,
        Some(Meta::empty()),
    ))
}

pub async fn check_out(state: &AppState, user: &AuthUser, id: Uuid) -> AppResult<ApiResponse<Booking>> {
    ensure_staff(user)?;
    let booking = apply_transition(state, user, id, BookingStatus::CheckedOut).await?;
    Ok(ApiResponse::success(
        "Guest checked out",
        booking,
        Some(Meta::empty()),
    ))
}

/// Legality-checked transition plus its side effects on the booking flags
/// and the room status, all in one transaction.
async fn apply_transition(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    next: BookingStatus,
) -> AppResult<Booking> {
    let txn = state.orm.begin().await?;

    let booking = Bookings::find_by_id(id)
        .lock(LockType::Update)
        .one(&txn)
        .await?;
    let booking = match booking {
        Some(b) => b,
        None => return Err(AppError::NotFound),
    };

    let current = parse_status(&booking.status)?;
    if !current.can_transition_to(next) {
        return Err(AppError::BadRequest(format!(
            "illegal booking transition: {current} -> {next}"
        )));
    }

    let room_id = booking.room_id;
    let mut active: BookingActive = booking.into();
    active.status = Set(next.to_string());

    match next {
        BookingStatus::CheckedIn => {
            active.has_checked_in = Set(true);
        }
        BookingStatus::CheckedOut => {
            active.has_checked_in = Set(false);
            active.has_checked_out = Set(true);
            // Check-out requires the room to exist so it can be released.
            let room = Rooms::find_by_id(room_id).one(&txn).await?;
            let room = match room {
                Some(r) => r,
                None => return Err(AppError::NotFound),
            };
            let mut room: RoomActive = room.into();
            room.status = Set(RoomStatus::Available.to_string());
            room.update(&txn).await?;
        }
        BookingStatus::Cancelled => {
            // Cancellation frees the room; a hard-deleted room is tolerated.
            Rooms::update_many()
                .col_expr(
                    RoomCol::Status,
                    Expr::value(RoomStatus::Available.to_string()),
                )
                .filter(RoomCol::Id.eq(room_id))
                .exec(&txn)
                .await?;
        }
        _ => {}
    }

    let booking = active.update(&txn).await?;
    txn.commit().await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "booking_status_update",
        Some("bookings"),
        Some(serde_json::json!({
            "booking_id": booking.id,
            "from": current.to_string(),
            "to": next.to_string(),
        })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    booking_from_entity(booking)
}

pub async fn list_my_bookings(
    state: &AppState,
    user: &AuthUser,
    query: BookingListQuery,
) -> AppResult<ApiResponse<BookingList>> {
    list_bookings(state, query, Some(user.user_id)).await
}

pub async fn list_all_bookings(
    state: &AppState,
    user: &AuthUser,
    query: BookingListQuery,
) -> AppResult<ApiResponse<BookingList>> {
    ensure_staff(user)?;
    list_bookings(state, query, None).await
}

async fn list_bookings(
    state: &AppState,
    query: BookingListQuery,
    guest_id: Option<Uuid>,
) -> AppResult<ApiResponse<BookingList>> {
    let (page, limit, offset) = query.pagination.normalize();

    let mut condition = Condition::all();
    if let Some(guest_id) = guest_id {
        condition = condition.add(BookingCol::UserId.eq(guest_id));
    }
    if let Some(status) = query.status {
        condition = condition.add(BookingCol::Status.eq(status.to_string()));
    }

    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);
    let mut finder = Bookings::find().filter(condition);
    finder = match sort_order {
        SortOrder::Asc => finder.order_by_asc(BookingCol::CreatedAt),
        SortOrder::Desc => finder.order_by_desc(BookingCol::CreatedAt),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(booking_from_entity)
        .collect::<AppResult<Vec<_>>>()?;

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success(
        "Bookings",
        BookingList { items },
        Some(meta),
    ))
}

/// Booking detail enriched with its room and guest via point lookups.
pub async fn get_booking(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<BookingWithDetails>> {
    let booking = Bookings::find_by_id(id).one(&state.orm).await?;
    let booking = match booking {
        Some(b) => b,
        None => return Err(AppError::NotFound),
    };
    if !user.is_staff() && booking.user_id != user.user_id {
        return Err(AppError::Forbidden);
    }

    let room = Rooms::find_by_id(booking.room_id)
        .one(&state.orm)
        .await?
        .map(room_from_entity)
        .transpose()?;
    let guest = Users::find_by_id(booking.user_id)
        .one(&state.orm)
        .await?
        .map(user_from_entity);

    Ok(ApiResponse::success(
        "Booking",
        BookingWithDetails {
            booking: booking_from_entity(booking)?,
            room,
            guest,
        },
        Some(Meta::empty()),
    ))
}

/// Bookings arriving today, for the front desk.
pub async fn todays_check_ins(
    state: &AppState,
    user: &AuthUser,
) -> AppResult<ApiResponse<BookingList>> {
    ensure_staff(user)?;
    let today = Utc::now().date_naive();

    let items = Bookings::find()
        .filter(BookingCol::CheckIn.eq(today))
        .order_by_asc(BookingCol::CreatedAt)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(booking_from_entity)
        .collect::<AppResult<Vec<_>>>()?;

    Ok(ApiResponse::success(
        "Today's check-ins",
        BookingList { items },
        Some(Meta::empty()),
    ))
}

fn parse_status(raw: &str) -> AppResult<BookingStatus> {
    BookingStatus::from_str(raw).map_err(|e| AppError::Internal(anyhow::anyhow!(e)))
}

pub(crate) fn booking_from_entity(model: BookingModel) -> AppResult<Booking> {
    let status = parse_status(&model.status)?;
    let payment_status = PaymentStatus::from_str(&model.payment_status)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e)))?;
    Ok(Booking {
        id: model.id,
        user_id: model.user_id,
        room_id: model.room_id,
        check_in: model.check_in,
        check_out: model.check_out,
        number_of_guests: model.number_of_guests,
        special_requests: model.special_requests,
        status,
        payment_status,
        has_checked_in: model.has_checked_in,
        has_checked_out: model.has_checked_out,
        created_at: model.created_at.with_timezone(&Utc),
    })
}
