use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{Booking, BookingStatus, Payment, Room, User};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateBookingRequest {
    pub room_id: Uuid,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub number_of_guests: i32,
    pub special_requests: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateBookingStatusRequest {
    pub status: BookingStatus,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BookingList {
    pub items: Vec<Booking>,
}

/// Booking enriched with its room and guest via point lookups. Either side
/// may be gone (hard-deleted room), so both are optional.
#[derive(Debug, Serialize, ToSchema)]
pub struct BookingWithDetails {
    pub booking: Booking,
    pub room: Option<Room>,
    pub guest: Option<User>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PaymentConfirmation {
    pub booking: Booking,
    pub payment: Payment,
}
