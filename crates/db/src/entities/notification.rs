//! Notification entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Notification types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(50))")]
#[serde(rename_all = "snake_case")]
pub enum NotificationType {
    #[sea_orm(string_value = "application_submitted")]
    ApplicationSubmitted,
    #[sea_orm(string_value = "application_status_changed")]
    ApplicationStatusChanged,
    #[sea_orm(string_value = "interview_scheduled")]
    InterviewScheduled,
    #[sea_orm(string_value = "new_application")]
    NewApplication,
    #[sea_orm(string_value = "listing_closed")]
    ListingClosed,
    #[sea_orm(string_value = "deadline_reminder")]
    DeadlineReminder,
    #[sea_orm(string_value = "system_announcement")]
    SystemAnnouncement,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "notification")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// The user receiving the notification
    pub user_id: String,

    pub notification_type: NotificationType,

    pub title: String,

    #[sea_orm(column_type = "Text")]
    pub message: String,

    /// Related listing/application/student identifiers
    #[sea_orm(column_type = "JsonBinary")]
    pub data: Json,

    #[sea_orm(default_value = false)]
    pub is_read: bool,

    /// Set by the outbound mailer once delivered
    #[sea_orm(default_value = false)]
    pub is_email_sent: bool,

    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
