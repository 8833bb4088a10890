use std::str::FromStr;

use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::rooms::{CreateRoomRequest, RoomList, UpdateRoomRequest, UpdateRoomStatusRequest},
    entity::rooms::{ActiveModel, Column, Entity as Rooms, Model as RoomModel},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin, ensure_staff},
    models::{Room, RoomStatus},
    response::{ApiResponse, Meta},
    routes::params::{RoomQuery, RoomSortBy, SortOrder},
    state::AppState,
};

pub async fn list_rooms(state: &AppState, query: RoomQuery) -> AppResult<ApiResponse<RoomList>> {
    let (page, limit, offset) = query.pagination.normalize();
    let mut condition = Condition::all();

    if let Some(status) = query.status {
        condition = condition.add(Column::Status.eq(status.to_string()));
    }

    if let Some(room_type) = query.room_type.as_ref().filter(|s| !s.is_empty()) {
        condition = condition.add(Column::RoomType.eq(room_type.clone()));
    }

    let sort_by = query.sort_by.unwrap_or(RoomSortBy::CreatedAt);
    let sort_order = query.sort_order.unwrap_or(SortOrder::Desc);
    let sort_col = match sort_by {
        RoomSortBy::CreatedAt => Column::CreatedAt,
        RoomSortBy::Price => Column::Price,
        RoomSortBy::RoomNumber => Column::RoomNumber,
    };

    let mut finder = Rooms::find().filter(condition);
    finder = match sort_order {
        SortOrder::Asc => finder.order_by_asc(sort_col),
        SortOrder::Desc => finder.order_by_desc(sort_col),
    };

    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(room_from_entity)
        .collect::<AppResult<Vec<_>>>()?;

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Rooms", RoomList { items }, Some(meta)))
}

pub async fn get_room(state: &AppState, id: Uuid) -> AppResult<ApiResponse<Room>> {
    let room = Rooms::find_by_id(id).one(&state.orm).await?;
    let room = match room {
        Some(r) => r,
        None => return Err(AppError::NotFound),
    };
    Ok(ApiResponse::success("Room", room_from_entity(room)?, None))
}

pub async fn create_room(
    state: &AppState,
    user: &AuthUser,
    payload: CreateRoomRequest,
) -> AppResult<ApiResponse<Room>> {
    ensure_admin(user)?;
    validate_room_attributes(&payload)?;

    let id = Uuid::new_v4();
    let active = ActiveModel {
        id: Set(id),
        room_number: Set(payload.room_number),
        room_type: Set(payload.room_type),
        image: Set(payload.image),
        price: Set(payload.price),
        capacity: Set(payload.capacity),
        size: Set(payload.size),
        bed_type: Set(payload.bed_type),
        services: Set(payload.services),
        description: Set(payload.description),
        status: Set(RoomStatus::Available.to_string()),
        booking_count: Set(0),
        average_rating: Set(0.0),
        total_reviews: Set(0),
        created_at: NotSet,
    };
    let room = active.insert(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "room_create",
        Some("rooms"),
        Some(serde_json::json!({ "room_id": room.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Room created",
        room_from_entity(room)?,
        Some(Meta::empty()),
    ))
}

pub async fn update_room(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateRoomRequest,
) -> AppResult<ApiResponse<Room>> {
    ensure_admin(user)?;
    let existing = Rooms::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(r) => r,
        None => return Err(AppError::NotFound),
    };

    let mut active: ActiveModel = existing.into();
    if let Some(room_number) = payload.room_number {
        active.room_number = Set(room_number);
    }
    if let Some(room_type) = payload.room_type {
        active.room_type = Set(room_type);
    }
    if let Some(image) = payload.image {
        active.image = Set(image);
    }
    if let Some(price) = payload.price {
        active.price = Set(price);
    }
    if let Some(capacity) = payload.capacity {
        active.capacity = Set(capacity);
    }
    if let Some(size) = payload.size {
        active.size = Set(size);
    }
    if let Some(bed_type) = payload.bed_type {
        active.bed_type = Set(bed_type);
    }
    if let Some(services) = payload.services {
        active.services = Set(services);
    }
    if let Some(description) = payload.description {
        active.description = Set(description);
    }

    let room = active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "room_update",
        Some("rooms"),
        Some(serde_json::json!({ "room_id": room.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Room updated",
        room_from_entity(room)?,
        Some(Meta::empty()),
    ))
}

/// Unconditional status overwrite; the room carries no transition table
/// (observed contract, see DESIGN.md).
pub async fn set_room_status(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateRoomStatusRequest,
) -> AppResult<ApiResponse<Room>> {
    ensure_staff(user)?;
    let existing = Rooms::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(r) => r,
        None => return Err(AppError::NotFound),
    };

    let mut active: ActiveModel = existing.into();
    active.status = Set(payload.status.to_string());
    let room = active.update(&state.orm).await?;

    tracing::info!(room_id = %room.id, status = %room.status, "room status updated");

    Ok(ApiResponse::success(
        "Room status updated",
        room_from_entity(room)?,
        Some(Meta::empty()),
    ))
}

pub async fn delete_room(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> AppResult<ApiResponse<serde_json::Value>> {
    ensure_admin(user)?;
    if id.is_nil() {
        return Err(AppError::BadRequest("room id must not be empty".into()));
    }

    // No check against outstanding bookings: a deleted room may leave
    // bookings pointing at it.
    let result = Rooms::delete_by_id(id).exec(&state.orm).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "room_delete",
        Some("rooms"),
        Some(serde_json::json!({ "room_id": id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Room deleted",
        serde_json::json!({}),
        Some(Meta::empty()),
    ))
}

/// Room with the highest booking count, for the staff dashboard.
pub async fn top_performing_room(state: &AppState, user: &AuthUser) -> AppResult<ApiResponse<Room>> {
    ensure_staff(user)?;
    let room = Rooms::find()
        .order_by_desc(Column::BookingCount)
        .one(&state.orm)
        .await?;
    let room = match room {
        Some(r) => r,
        None => return Err(AppError::NotFound),
    };
    Ok(ApiResponse::success(
        "Top performing room",
        room_from_entity(room)?,
        Some(Meta::empty()),
    ))
}

fn validate_room_attributes(payload: &CreateRoomRequest) -> AppResult<()> {
    if payload.room_number <= 0 {
        return Err(AppError::Validation("room number must be positive".into()));
    }
    if payload.price <= 0 {
        return Err(AppError::Validation("price must be positive".into()));
    }
    if payload.capacity <= 0 {
        return Err(AppError::Validation("capacity must be positive".into()));
    }
    if payload.size <= 0 {
        return Err(AppError::Validation("size must be positive".into()));
    }
    for (field, value) in [
        ("room type", &payload.room_type),
        ("image", &payload.image),
        ("bed type", &payload.bed_type),
        ("services", &payload.services),
        ("description", &payload.description),
    ] {
        if value.trim().is_empty() {
            return Err(AppError::Validation(format!("{field} is required")));
        }
    }
    Ok(())
}

pub(crate) fn room_from_entity(model: RoomModel) -> AppResult<Room> {
    let status = RoomStatus::from_str(&model.status)
        .map_err(|e| AppError::Internal(anyhow::anyhow!(e)))?;
    Ok(Room {
        id: model.id,
        room_number: model.room_number,
        room_type: model.room_type,
        image: model.image,
        price: model.price,
        capacity: model.capacity,
        size: model.size,
        bed_type: model.bed_type,
        services: model.services,
        description: model.description,
        status,
        booking_count: model.booking_count,
        average_rating: model.average_rating,
        total_reviews: model.total_reviews,
        created_at: model.created_at.with_timezone(&Utc),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_payload() -> CreateRoomRequest {
        CreateRoomRequest {
            room_number: 101,
            room_type: "Deluxe".into(),
            image: "data:image/png;base64,AAAA".into(),
            price: 12_000,
            capacity: 2,
            size: 32,
            bed_type: "Queen".into(),
            services: "WiFi, Breakfast".into(),
            description: "Quiet room facing the courtyard".into(),
        }
    }

    #[test]
    fn complete_attributes_pass_validation() {
        assert!(validate_room_attributes(&valid_payload()).is_ok());
    }

    #[test]
    fn missing_attributes_fail_validation() {
        let mut payload = valid_payload();
        payload.description = "  ".into();
        assert!(matches!(
            validate_room_attributes(&payload),
            Err(AppError::Validation(_))
        ));

        let mut payload = valid_payload();
        payload.capacity = 0;
        assert!(matches!(
            validate_room_attributes(&payload),
            Err(AppError::Validation(_))
        ));

        let mut payload = valid_payload();
        payload.price = -5;
        assert!(matches!(
            validate_room_attributes(&payload),
            Err(AppError::Validation(_))
        ));
    }
}
