pub mod auth;
pub mod health;
pub mod properties;
pub mod reports;
pub mod users;
