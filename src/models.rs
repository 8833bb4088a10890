use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;
use uuid::Uuid;

/// Coarse room availability state. Any value may be set from any other;
/// only membership is enforced, matching the observed contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum RoomStatus {
    Available,
    Booked,
    Maintenance,
}

impl fmt::Display for RoomStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RoomStatus::Available => "Available",
            RoomStatus::Booked => "Booked",
            RoomStatus::Maintenance => "Maintenance",
        };
        f.write_str(s)
    }
}

impl FromStr for RoomStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Available" => Ok(RoomStatus::Available),
            "Booked" => Ok(RoomStatus::Booked),
            "Maintenance" => Ok(RoomStatus::Maintenance),
            other => Err(format!("unknown room status: {other}")),
        }
    }
}

/// Booking lifecycle state. Wire strings keep the legacy spelling
/// ("Check-In", "Checked-Out") so existing documents stay readable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum BookingStatus {
    Pending,
    Confirmed,
    #[serde(rename = "Check-In")]
    CheckedIn,
    #[serde(rename = "Checked-Out")]
    CheckedOut,
    Cancelled,
}

impl BookingStatus {
    /// Transition table for the booking state machine. Check-out of a
    /// still-pending booking and any write to a terminal state are rejected.
    pub fn can_transition_to(self, next: BookingStatus) -> bool {
        use BookingStatus::*;
        matches!(
            (self, next),
            (Pending, Confirmed)
                | (Pending, Cancelled)
                | (Confirmed, CheckedIn)
                | (Confirmed, Cancelled)
                | (CheckedIn, CheckedOut)
                | (CheckedIn, Cancelled)
        )
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BookingStatus::Pending => "Pending",
            BookingStatus::Confirmed => "Confirmed",
            BookingStatus::CheckedIn => "Check-In",
            BookingStatus::CheckedOut => "Checked-Out",
            BookingStatus::Cancelled => "Cancelled",
        };
        f.write_str(s)
    }
}

impl FromStr for BookingStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Pending" => Ok(BookingStatus::Pending),
            "Confirmed" => Ok(BookingStatus::Confirmed),
            "Check-In" => Ok(BookingStatus::CheckedIn),
            "Checked-Out" => Ok(BookingStatus::CheckedOut),
            "Cancelled" => Ok(BookingStatus::Cancelled),
            other => Err(format!("unknown booking status: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum PaymentStatus {
    #[serde(rename = "unpaid")]
    Unpaid,
    Paid,
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PaymentStatus::Unpaid => "unpaid",
            PaymentStatus::Paid => "Paid",
        };
        f.write_str(s)
    }
}

impl FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unpaid" => Ok(PaymentStatus::Unpaid),
            "Paid" => Ok(PaymentStatus::Paid),
            other => Err(format!("unknown payment status: {other}")),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub profile: Option<String>,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Room {
    pub id: Uuid,
    pub room_number: i32,
    pub room_type: String,
    pub image: String,
    /// Price per night, in cents.
    pub price: i64,
    pub capacity: i32,
    pub size: i32,
    pub bed_type: String,
    pub services: String,
    pub description: String,
    pub status: RoomStatus,
    pub booking_count: i32,
    pub average_rating: f64,
    pub total_reviews: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Booking {
    pub id: Uuid,
    pub user_id: Uuid,
    pub room_id: Uuid,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub number_of_guests: i32,
    pub special_requests: Option<String>,
    pub status: BookingStatus,
    pub payment_status: PaymentStatus,
    pub has_checked_in: bool,
    pub has_checked_out: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Review {
    pub id: Uuid,
    pub room_id: Uuid,
    pub user_id: Uuid,
    pub rating: i32,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Payment {
    pub id: Uuid,
    pub booking_id: Uuid,
    pub amount: i64,
    pub nights: i32,
    pub status: String,
    pub payment_method: String,
    pub transaction_id: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn booking_transitions_follow_the_table() {
        use BookingStatus::*;
        assert!(Pending.can_transition_to(Confirmed));
        assert!(Pending.can_transition_to(Cancelled));
        assert!(Confirmed.can_transition_to(CheckedIn));
        assert!(Confirmed.can_transition_to(Cancelled));
        assert!(CheckedIn.can_transition_to(CheckedOut));
        assert!(CheckedIn.can_transition_to(Cancelled));
    }

    #[test]
    fn illegal_booking_transitions_are_rejected() {
        use BookingStatus::*;
        assert!(!Pending.can_transition_to(CheckedOut));
        assert!(!Pending.can_transition_to(CheckedIn));
        assert!(!Confirmed.can_transition_to(CheckedOut));
        assert!(!CheckedOut.can_transition_to(Cancelled));
        assert!(!Cancelled.can_transition_to(Pending));
        assert!(!CheckedOut.can_transition_to(CheckedIn));
    }

    #[test]
    fn status_strings_round_trip() {
        for status in [
            BookingStatus::Pending,
            BookingStatus::Confirmed,
            BookingStatus::CheckedIn,
            BookingStatus::CheckedOut,
            BookingStatus::Cancelled,
        ] {
            assert_eq!(status.to_string().parse::<BookingStatus>(), Ok(status));
        }
        assert_eq!(
            BookingStatus::CheckedIn.to_string(),
            "Check-In",
            "legacy spelling must be preserved"
        );
        assert_eq!("Available".parse::<RoomStatus>(), Ok(RoomStatus::Available));
        assert!("CheckedIn".parse::<BookingStatus>().is_err());
        assert_eq!("unpaid".parse::<PaymentStatus>(), Ok(PaymentStatus::Unpaid));
    }
}
