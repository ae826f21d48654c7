//! Application entity.

use sea_orm::entity::prelude::*;
use sea_orm::Set;
use serde::{Deserialize, Serialize};

/// Review state of an application.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    #[default]
    #[sea_orm(string_value = "applied")]
    Applied,
    #[sea_orm(string_value = "under_review")]
    UnderReview,
    #[sea_orm(string_value = "for_interview")]
    ForInterview,
    #[sea_orm(string_value = "interviewed")]
    Interviewed,
    #[sea_orm(string_value = "accepted")]
    Accepted,
    #[sea_orm(string_value = "rejected")]
    Rejected,
    #[sea_orm(string_value = "withdrawn")]
    Withdrawn,
}

impl ApplicationStatus {
    /// Statuses that block a second application to the same listing.
    pub const ACTIVE: [Self; 3] = [Self::Applied, Self::UnderReview, Self::ForInterview];

    /// Still under consideration (and withdrawable by the student).
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Applied | Self::UnderReview | Self::ForInterview)
    }

    /// A fresh application for the same listing revives this row in place.
    #[must_use]
    pub const fn is_reactivatable(self) -> bool {
        matches!(self, Self::Withdrawn | Self::Rejected)
    }

    /// Wire name of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Applied => "applied",
            Self::UnderReview => "under_review",
            Self::ForInterview => "for_interview",
            Self::Interviewed => "interviewed",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
            Self::Withdrawn => "withdrawn",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "application")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    pub student_id: String,

    pub listing_id: String,

    #[sea_orm(column_type = "Text")]
    pub cover_letter: String,

    /// Opaque storage references for uploaded documents
    #[sea_orm(nullable)]
    pub resume: Option<String>,

    #[sea_orm(nullable)]
    pub transcript: Option<String>,

    #[sea_orm(nullable)]
    pub endorsement_letter: Option<String>,

    pub status: ApplicationStatus,

    pub applied_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,

    // --- company response ---
    #[sea_orm(nullable)]
    pub interview_date: Option<DateTimeWithTimeZone>,

    #[sea_orm(column_type = "Text")]
    pub interview_notes: String,

    #[sea_orm(column_type = "Text")]
    pub final_feedback: String,
}

impl Model {
    /// Whether the student may still withdraw.
    #[must_use]
    pub const fn can_withdraw(&self) -> bool {
        self.status.is_active()
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::StudentId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Student,

    #[sea_orm(
        belongs_to = "super::listing::Entity",
        from = "Column::ListingId",
        to = "super::listing::Column::Id",
        on_delete = "Cascade"
    )]
    Listing,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Student.def()
    }
}

impl Related<super::listing::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Listing.def()
    }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(mut self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let now: DateTimeWithTimeZone = chrono::Utc::now().into();
        if insert && self.applied_at.is_not_set() {
            self.applied_at = Set(now);
        }
        self.updated_at = Set(now);
        Ok(self)
    }
}
