pub mod admin;
pub mod auth;
pub mod hostels;
pub mod landlord;
pub mod renter;
pub mod rooms;
pub mod uploads;
pub mod wallet;
