use serde::Deserialize;
use utoipa::ToSchema;

use crate::models::{BookingStatus, RoomStatus};

#[derive(Debug, Deserialize, ToSchema)]
pub struct Pagination {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

impl Pagination {
    pub fn normalize(&self) -> (i64, i64, i64) {
        let page = self.page.unwrap_or(1).max(1);
        let per_page = self.per_page.unwrap_or(20).clamp(1, 100);
        let offset = (page - 1) * per_page;
        (page, per_page, offset)
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    Desc,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum RoomSortBy {
    CreatedAt,
    Price,
    RoomNumber,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RoomQuery {
    #[serde(flatten)]
    pub pagination: Pagination,
    pub status: Option<RoomStatus>,
    pub room_type: Option<String>,
    pub sort_by: Option<RoomSortBy>,
    pub sort_order: Option<SortOrder>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct BookingListQuery {
    #[serde(flatten)]
    pub pagination: Pagination,
    pub status: Option<BookingStatus>,
    pub sort_order: Option<SortOrder>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct GuestListQuery {
    #[serde(flatten)]
    pub pagination: Pagination,
    pub role: Option<String>,
}
