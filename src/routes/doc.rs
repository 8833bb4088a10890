use utoipa::{
    Modify, OpenApi,
    openapi::{
        self,
        OpenApi as OpenApiSpec,
        security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    },
};
use utoipa_scalar::{Scalar, Servable};

use crate::{
    dto::{
        bookings::{BookingList, BookingWithDetails, PaymentConfirmation},
        reviews::ReviewList,
        rooms::RoomList,
        users::GuestList,
    },
    models::{Booking, Payment, Review, Room, User},
    response::{ApiResponse, Meta},
    routes::{admin, auth, bookings, guests, health, params, rooms},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health::health_check,
        auth::login,
        auth::register,
        rooms::list_rooms,
        rooms::get_room,
        rooms::create_room,
        rooms::update_room,
        rooms::delete_room,
        rooms::set_room_status,
        rooms::list_reviews,
        rooms::submit_review,
        bookings::create_booking,
        bookings::list_my_bookings,
        bookings::get_booking,
        bookings::set_booking_status,
        bookings::confirm_payment,
        bookings::check_in,
        bookings::check_out,
        bookings::get_payment,
        guests::list_guests,
        guests::create_user,
        guests::get_guest,
        guests::update_profile,
        admin::list_all_bookings,
        admin::todays_check_ins,
        admin::top_performing_room
    ),
    components(
        schemas(
            User,
            Room,
            Booking,
            Review,
            Payment,
            RoomList,
            BookingList,
            BookingWithDetails,
            PaymentConfirmation,
            ReviewList,
            GuestList,
            params::Pagination,
            params::RoomQuery,
            params::BookingListQuery,
            params::GuestListQuery,
            Meta,
            ApiResponse<Room>,
            ApiResponse<RoomList>,
            ApiResponse<Booking>,
            ApiResponse<BookingList>,
            ApiResponse<BookingWithDetails>,
            ApiResponse<PaymentConfirmation>,
            ApiResponse<GuestList>
        )
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoint"),
        (name = "Auth", description = "Authentication endpoints"),
        (name = "Rooms", description = "Room catalog and availability"),
        (name = "Reviews", description = "Room reviews"),
        (name = "Bookings", description = "Booking lifecycle"),
        (name = "Guests", description = "Guest accounts"),
        (name = "Admin", description = "Staff dashboard endpoints"),
    )
)]
pub struct ApiDoc;

pub fn scalar_docs() -> Scalar<OpenApiSpec> {
    Scalar::with_url("/docs", ApiDoc::openapi())
}
