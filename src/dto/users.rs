use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::User;

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub profile: Option<String>,
}

/// Admin-created account with an explicit role.
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub profile: Option<String>,
    pub password: String,
    pub role: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct GuestList {
    pub items: Vec<User>,
}
