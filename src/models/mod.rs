pub mod property;
pub mod report;
pub mod user;
