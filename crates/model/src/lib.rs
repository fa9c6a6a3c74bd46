pub mod admin;
pub mod auth;
pub mod class;
pub mod client;
pub mod datetime;
pub mod group_request;
pub mod registration;
pub mod session;
