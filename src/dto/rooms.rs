use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::{Room, RoomStatus};

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateRoomRequest {
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
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateRoomRequest {
    pub room_number: Option<i32>,
    pub room_type: Option<String>,
    pub image: Option<String>,
    pub price: Option<i64>,
    pub capacity: Option<i32>,
    pub size: Option<i32>,
    pub bed_type: Option<String>,
    pub services: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateRoomStatusRequest {
    pub status: RoomStatus,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RoomList {
    pub items: Vec<Room>,
}
