//! OJT listing entity.

use chrono::NaiveDate;
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, Set};
use serde::{Deserialize, Serialize};

use super::user::Course;

/// Kind of OJT being offered.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum OjtType {
    /// Curriculum-required OJT (400-500 hours).
    #[default]
    #[sea_orm(string_value = "required")]
    Required,
    #[sea_orm(string_value = "elective")]
    Elective,
    #[sea_orm(string_value = "summer")]
    Summer,
}

/// Where the intern works.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum WorkSetup {
    #[default]
    #[sea_orm(string_value = "onsite")]
    Onsite,
    #[sea_orm(string_value = "hybrid")]
    Hybrid,
    #[sea_orm(string_value = "wfh")]
    Wfh,
}

/// Course eligibility of a listing.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(10))")]
#[serde(rename_all = "snake_case")]
pub enum CourseRequirement {
    #[sea_orm(string_value = "cit")]
    Cit,
    #[sea_orm(string_value = "coa")]
    Coa,
    #[sea_orm(string_value = "coed")]
    Coed,
    #[sea_orm(string_value = "chm")]
    Chm,
    #[sea_orm(string_value = "cba")]
    Cba,
    #[default]
    #[sea_orm(string_value = "all")]
    All,
}

impl CourseRequirement {
    /// The single course this requirement names, or `None` for `all`.
    #[must_use]
    pub const fn course(self) -> Option<Course> {
        match self {
            Self::Cit => Some(Course::Cit),
            Self::Coa => Some(Course::Coa),
            Self::Coed => Some(Course::Coed),
            Self::Chm => Some(Course::Chm),
            Self::Cba => Some(Course::Cba),
            Self::All => None,
        }
    }

    /// Whether a student enrolled in `course` satisfies this requirement.
    #[must_use]
    pub fn admits(self, course: Option<Course>) -> bool {
        match self.course() {
            None => true,
            Some(required) => course == Some(required),
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self.course() {
            Some(course) => course.display_name(),
            None => "All Courses",
        }
    }
}

/// Lifecycle of a listing.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "snake_case")]
pub enum ListingStatus {
    #[default]
    #[sea_orm(string_value = "open")]
    Open,
    #[sea_orm(string_value = "filled")]
    Filled,
    #[sea_orm(string_value = "closed")]
    Closed,
    #[sea_orm(string_value = "ongoing")]
    Ongoing,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "listing")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,

    /// Owning company user
    pub company_id: String,

    pub title: String,

    pub ojt_type: OjtType,

    pub required_hours: i32,

    pub duration_weeks: i32,

    pub work_setup: WorkSetup,

    pub location: String,

    #[sea_orm(column_type = "Text")]
    pub description: String,

    #[sea_orm(column_type = "Text")]
    pub responsibilities: String,

    #[sea_orm(column_type = "Text")]
    pub learning_outcomes: String,

    pub course_requirement: CourseRequirement,

    /// 0 means any year level
    pub year_level_requirement: i32,

    #[sea_orm(column_type = "Text")]
    pub skills_required: String,

    pub slots_available: i32,

    #[sea_orm(column_type = "Decimal(Some((10, 2)))", nullable)]
    pub allowance: Option<Decimal>,

    /// Derived from `allowance` in `before_save`
    pub has_allowance: bool,

    pub start_date: Date,

    pub end_date: Date,

    pub application_deadline: Date,

    pub status: ListingStatus,

    pub created_at: DateTimeWithTimeZone,

    pub updated_at: DateTimeWithTimeZone,
}

impl Model {
    /// Whether the listing accepts applications.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.status == ListingStatus::Open
    }

    /// Whether the application deadline has passed as of `today`.
    #[must_use]
    pub fn is_expired(&self, today: NaiveDate) -> bool {
        self.application_deadline < today
    }

    /// Approximate duration in months, rounded to one decimal.
    #[must_use]
    pub fn duration_months(&self) -> f64 {
        (f64::from(self.duration_weeks) / 4.33 * 10.0).round() / 10.0
    }
}

/// `has_allowance` is true exactly when an allowance is recorded.
#[must_use]
pub const fn derive_has_allowance(allowance: Option<&Decimal>) -> bool {
    allowance.is_some()
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::CompanyId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Company,

    #[sea_orm(has_many = "super::application::Entity")]
    Applications,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Company.def()
    }
}

impl Related<super::application::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Applications.def()
    }
}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(mut self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let has_allowance = match &self.allowance {
            ActiveValue::Set(allowance) | ActiveValue::Unchanged(allowance) => {
                Some(derive_has_allowance(allowance.as_ref()))
            }
            ActiveValue::NotSet => None,
        };
        if let Some(has_allowance) = has_allowance {
            self.has_allowance = Set(has_allowance);
        }

        let now: DateTimeWithTimeZone = chrono::Utc::now().into();
        if insert && self.created_at.is_not_set() {
            self.created_at = Set(now);
        }
        self.updated_at = Set(now);

        Ok(self)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::str::FromStr;

    #[test]
    fn test_course_requirement_admits() {
        assert!(CourseRequirement::All.admits(None));
        assert!(CourseRequirement::All.admits(Some(Course::Coa)));
        assert!(CourseRequirement::Cit.admits(Some(Course::Cit)));
        assert!(!CourseRequirement::Cit.admits(Some(Course::Cba)));
        assert!(!CourseRequirement::Cit.admits(None));
    }

    #[tokio::test]
    async fn test_before_save_recomputes_has_allowance() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let active = ActiveModel {
            allowance: Set(Some(Decimal::from_str("1500.00").unwrap())),
            has_allowance: Set(false),
            ..Default::default()
        };
        let saved = active.before_save(&db, true).await.unwrap();
        assert_eq!(saved.has_allowance, Set(true));

        let active = ActiveModel {
            allowance: Set(None),
            has_allowance: Set(true),
            ..Default::default()
        };
        let saved = active.before_save(&db, false).await.unwrap();
        assert_eq!(saved.has_allowance, Set(false));
    }

    #[tokio::test]
    async fn test_before_save_leaves_flag_when_allowance_untouched() {
        let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();

        let active = ActiveModel {
            title: Set("Renamed".to_string()),
            ..Default::default()
        };
        let saved = active.before_save(&db, false).await.unwrap();
        assert!(saved.has_allowance.is_not_set());
        assert!(saved.updated_at.is_set());
    }
}
