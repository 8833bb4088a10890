use chrono::Utc;
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use uuid::Uuid;

use crate::{
    entity::{
        bookings::Entity as Bookings,
        payments::{Column as PaymentCol, Entity as Payments, Model as PaymentModel},
    },
    error::{AppError, AppResult},
    middleware::auth::AuthUser,
    models::Payment,
    response::{ApiResponse, Meta},
    state::AppState,
};

/// First payment recorded for a booking. One-to-one in practice, but not
/// enforced by a uniqueness constraint, so the earliest record wins.
pub async fn get_payment_by_booking(
    state: &AppState,
    user: &AuthUser,
    booking_id: Uuid,
) -> AppResult<ApiResponse<Payment>> {
    let booking = Bookings::find_by_id(booking_id).one(&state.orm).await?;
    let booking = match booking {
        Some(b) => b,
        None => return Err(AppError::NotFound),
    };
    if !user.is_staff() && booking.user_id != user.user_id {
        return Err(AppError::Forbidden);
    }

    let payment = Payments::find()
        .filter(PaymentCol::BookingId.eq(booking_id))
        .order_by_asc(PaymentCol::CreatedAt)
        .one(&state.orm)
        .await?;
    let payment = match payment {
        Some(p) => p,
        None => return Err(AppError::NotFound),
    };

    Ok(ApiResponse::success(
        "Payment",
        payment_from_entity(payment),
        Some(Meta::empty()),
    ))
}

pub(crate) fn payment_from_entity(model: PaymentModel) -> Payment {
    Payment {
        id: model.id,
        booking_id: model.booking_id,
        amount: model.amount,
        nights: model.nights,
        status: model.status,
        payment_method: model.payment_method,
        transaction_id: model.transaction_id,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
