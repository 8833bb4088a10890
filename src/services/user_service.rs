use chrono::Utc;
use sea_orm::ActiveValue::NotSet;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};
use uuid::Uuid;

use crate::{
    audit::log_audit,
    dto::users::{CreateUserRequest, GuestList, UpdateProfileRequest},
    entity::users::{ActiveModel as UserActive, Column as UserCol, Entity as Users,
        Model as UserModel},
    error::{AppError, AppResult},
    middleware::auth::{AuthUser, ensure_admin, ensure_staff},
    models::User,
    response::{ApiResponse, Meta},
    routes::params::GuestListQuery,
    services::auth_service::hash_password,
    state::AppState,
};

const ROLES: [&str; 3] = ["guest", "staff", "admin"];

/// Accounts filtered by role, guests by default.
pub async fn list_guests(
    state: &AppState,
    user: &AuthUser,
    query: GuestListQuery,
) -> AppResult<ApiResponse<GuestList>> {
    ensure_staff(user)?;
    let (page, limit, offset) = query.pagination.normalize();

    let role = query.role.unwrap_or_else(|| "guest".to_string());
    let condition = Condition::all().add(UserCol::Role.eq(role));

    let finder = Users::find()
        .filter(condition)
        .order_by_desc(UserCol::CreatedAt);
    let total = finder.clone().count(&state.orm).await? as i64;

    let items = finder
        .limit(limit as u64)
        .offset(offset as u64)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(user_from_entity)
        .collect();

    let meta = Meta::new(page, limit, total);
    Ok(ApiResponse::success("Guests", GuestList { items }, Some(meta)))
}

pub async fn get_guest(state: &AppState, user: &AuthUser, id: Uuid) -> AppResult<ApiResponse<User>> {
    if !user.is_staff() && user.user_id != id {
        return Err(AppError::Forbidden);
    }
    let guest = Users::find_by_id(id).one(&state.orm).await?;
    let guest = match guest {
        Some(g) => g,
        None => return Err(AppError::NotFound),
    };
    Ok(ApiResponse::success(
        "Guest",
        user_from_entity(guest),
        Some(Meta::empty()),
    ))
}

/// Partial profile update for the account owner or an admin. Email and role
/// are deliberately not editable here.
pub async fn update_profile(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
    payload: UpdateProfileRequest,
) -> AppResult<ApiResponse<User>> {
    if user.user_id != id && user.role != "admin" {
        return Err(AppError::Forbidden);
    }

    let existing = Users::find_by_id(id).one(&state.orm).await?;
    let existing = match existing {
        Some(u) => u,
        None => return Err(AppError::NotFound),
    };

    let mut active: UserActive = existing.into();
    if let Some(name) = payload.name {
        active.name = Set(name);
    }
    if let Some(phone) = payload.phone {
        active.phone = Set(phone);
    }
    if let Some(address) = payload.address {
        active.address = Set(address);
    }
    if let Some(profile) = payload.profile {
        active.profile = Set(Some(profile));
    }

    let updated = active.update(&state.orm).await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "profile_update",
        Some("users"),
        Some(serde_json::json!({ "user_id": updated.id })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "Profile updated",
        user_from_entity(updated),
        Some(Meta::empty()),
    ))
}

/// Admin-created account with an explicit role (staff onboarding).
pub async fn create_user(
    state: &AppState,
    user: &AuthUser,
    payload: CreateUserRequest,
) -> AppResult<ApiResponse<User>> {
    ensure_admin(user)?;

    if !ROLES.contains(&payload.role.as_str()) {
        return Err(AppError::Validation(format!(
            "role must be one of: {}",
            ROLES.join(", ")
        )));
    }

    let exists = Users::find()
        .filter(UserCol::Email.eq(payload.email.as_str()))
        .one(&state.orm)
        .await?;
    if exists.is_some() {
        return Err(AppError::BadRequest("Email is already taken".to_string()));
    }

    let password_hash = hash_password(&payload.password)?;

    let created = UserActive {
        id: Set(Uuid::new_v4()),
        name: Set(payload.name),
        email: Set(payload.email),
        phone: Set(payload.phone),
        address: Set(payload.address),
        profile: Set(payload.profile),
        password_hash: Set(password_hash),
        role: Set(payload.role),
        created_at: NotSet,
    }
    .insert(&state.orm)
    .await?;

    if let Err(err) = log_audit(
        &state.pool,
        Some(user.user_id),
        "user_create",
        Some("users"),
        Some(serde_json::json!({ "user_id": created.id, "role": created.role })),
    )
    .await
    {
        tracing::warn!(error = %err, "audit log failed");
    }

    Ok(ApiResponse::success(
        "User created",
        user_from_entity(created),
        Some(Meta::empty()),
    ))
}

pub(crate) fn user_from_entity(model: UserModel) -> User {
    User {
        id: model.id,
        name: model.name,
        email: model.email,
        phone: model.phone,
        address: model.address,
        profile: model.profile,
        role: model.role,
        created_at: model.created_at.with_timezone(&Utc),
    }
}
