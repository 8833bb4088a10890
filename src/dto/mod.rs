pub mod auth;
pub mod bookings;
pub mod reviews;
pub mod rooms;
pub mod users;
