//! Core business logic for the OJT placement portal.
//!
//! Domain validation, notification fan-out and the services the HTTP layer
//! drives.

pub mod input;
pub mod services;
pub mod validation;

pub use services::*;

/// Today's date, used for deadline checks.
#[must_use]
pub fn today() -> chrono::NaiveDate {
    chrono::Utc::now().date_naive()
}
