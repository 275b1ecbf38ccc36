pub mod auth;
pub mod health_check;
pub mod index;
