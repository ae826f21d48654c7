//! User entity.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Account role.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[sea_orm(string_value = "student")]
    Student,
    #[sea_orm(string_value = "company")]
    Company,
    #[sea_orm(string_value = "admin")]
    Admin,
}

/// Academic program a student is enrolled in.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(10))")]
#[serde(rename_all = "snake_case")]
pub enum Course {
    /// Information Technology.
    #[sea_orm(string_value = "cit")]
    Cit,
    /// Accountancy.
    #[sea_orm(string_value = "coa")]
    Coa,
    /// Education.
    #[sea_orm(string_value = "coed")]
    Coed,
    /// Hospitality Management.
    #[sea_orm(string_value = "chm")]
    Chm,
    /// Business Administration.
    #[sea_orm(string_value = "cba")]
    Cba,
}

impl Course {
    /// Human-readable program name.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Cit => "Information Technology (CIT)",
            Self::Coa => "Accountancy (COA)",
            Self::Coed => "Education (COED)",
            Self::Chm => "Hospitality Management (CHM)",
            Self::Cba => "Business Administration (CBA)",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "user")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    #[sea_orm(unique)]
    pub username: String,

    pub username_lower: String,

    pub email: String,

    /// Argon2 PHC string
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Bearer token for API access
    #[sea_orm(unique, nullable)]
    #[serde(skip_serializing)]
    pub token: Option<String>,

    pub role: Role,

    pub first_name: String,

    pub last_name: String,

    #[sea_orm(nullable)]
    pub phone: Option<String>,

    /// Opaque storage reference for the avatar
    #[sea_orm(nullable)]
    pub profile_image: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub bio: Option<String>,

    #[sea_orm(default_value = false)]
    pub is_verified: bool,

    // --- student fields ---
    #[sea_orm(nullable)]
    pub student_id: Option<String>,

    #[sea_orm(nullable)]
    pub course: Option<Course>,

    #[sea_orm(nullable)]
    pub year_level: Option<i32>,

    // --- company fields ---
    #[sea_orm(nullable)]
    pub company_name: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub company_address: Option<String>,

    #[sea_orm(column_type = "Text", nullable)]
    pub company_description: Option<String>,

    pub created_at: DateTimeWithTimeZone,

    #[sea_orm(nullable)]
    pub updated_at: Option<DateTimeWithTimeZone>,
}

impl Model {
    /// Display name used in notification messages.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::listing::Entity")]
    Listings,

    #[sea_orm(has_many = "super::application::Entity")]
    Applications,

    #[sea_orm(has_many = "super::notification::Entity")]
    Notifications,
}

impl Related<super::listing::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Listings.def()
    }
}

impl Related<super::application::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Applications.def()
    }
}

impl Related<super::notification::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Notifications.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
