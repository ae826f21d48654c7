//! Business logic services.

#![allow(missing_docs)]

pub mod application;
pub mod dashboard;
pub mod listing;
pub mod notification;
pub mod user;

pub use application::{
    ApplicationService, ApplicationView, ApplyInput, UpdateApplicationStatusInput,
    UpdateOwnApplicationInput,
};
pub use dashboard::{AdminStats, CompanyStats, DashboardService, StudentStats};
pub use listing::{
    CreateListingInput, ListingQuery, ListingService, ListingView, UpdateListingInput,
};
pub use notification::{
    ApplicationChange, ListNotificationsQuery, ListingChange, NotificationDraft,
    NotificationService, NotificationStats, plan_application_notifications,
    plan_listing_notifications,
};
pub use user::{RegisterInput, RoleProfile, UpdateProfileInput, UserService};
