//! Database repositories.

mod application;
mod listing;
mod notification;
mod user;

pub use application::ApplicationRepository;
pub use listing::{ListingFilter, ListingOrder, ListingOrderField, ListingRepository, ListingScope};
pub use notification::NotificationRepository;
pub use user::UserRepository;
