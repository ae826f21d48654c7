//! Database entities.

#![allow(missing_docs)]

pub mod application;
pub mod listing;
pub mod notification;
pub mod user;

pub use application::Entity as Application;
pub use listing::Entity as Listing;
pub use notification::Entity as Notification;
pub use user::Entity as User;
