//! Listing repository.

use std::sync::Arc;

use crate::entities::{Listing, User, listing, user};
use ojt_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, Order,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Select,
    sea_query::{Expr, Func, Query},
};

/// Which listings a viewer may see.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ListingScope {
    /// Open listings only.
    #[default]
    Public,
    /// Every listing owned by one company.
    Company(String),
    /// Everything.
    All,
}

/// Sortable listing columns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ListingOrderField {
    #[default]
    CreatedAt,
    ApplicationDeadline,
    StartDate,
    Allowance,
}

/// Listing ordering, parsed from `field` / `-field`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListingOrder {
    pub field: ListingOrderField,
    pub descending: bool,
}

impl Default for ListingOrder {
    fn default() -> Self {
        Self {
            field: ListingOrderField::CreatedAt,
            descending: true,
        }
    }
}

impl ListingOrder {
    /// Parse an ordering parameter. Unknown fields yield `None`.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let (descending, name) = match value.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, value),
        };
        let field = match name {
            "created_at" => ListingOrderField::CreatedAt,
            "application_deadline" => ListingOrderField::ApplicationDeadline,
            "start_date" => ListingOrderField::StartDate,
            "allowance" => ListingOrderField::Allowance,
            _ => return None,
        };
        Some(Self { field, descending })
    }

    const fn column(self) -> listing::Column {
        match self.field {
            ListingOrderField::CreatedAt => listing::Column::CreatedAt,
            ListingOrderField::ApplicationDeadline => listing::Column::ApplicationDeadline,
            ListingOrderField::StartDate => listing::Column::StartDate,
            ListingOrderField::Allowance => listing::Column::Allowance,
        }
    }
}

/// Listing query parameters.
#[derive(Debug, Clone, Default)]
pub struct ListingFilter {
    pub scope: ListingScope,
    pub status: Option<listing::ListingStatus>,
    pub ojt_type: Option<listing::OjtType>,
    pub location: Option<String>,
    pub course_requirement: Option<listing::CourseRequirement>,
    pub work_setup: Option<listing::WorkSetup>,
    /// Case-insensitive substring over title, description, skills and company name
    pub search: Option<String>,
    pub order: ListingOrder,
    pub limit: u64,
    pub offset: u64,
}

/// Escape LIKE wildcards and wrap for substring matching.
fn like_pattern(term: &str) -> String {
    let escaped = term
        .to_lowercase()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

/// Build the listing search statement.
fn search_query(filter: &ListingFilter) -> Select<Listing> {
    let mut query = Listing::find();

    query = match &filter.scope {
        ListingScope::Public => {
            query.filter(listing::Column::Status.eq(listing::ListingStatus::Open))
        }
        ListingScope::Company(company_id) => {
            query.filter(listing::Column::CompanyId.eq(company_id.as_str()))
        }
        ListingScope::All => query,
    };

    if let Some(status) = filter.status {
        query = query.filter(listing::Column::Status.eq(status));
    }
    if let Some(ojt_type) = filter.ojt_type {
        query = query.filter(listing::Column::OjtType.eq(ojt_type));
    }
    if let Some(location) = &filter.location {
        query = query.filter(listing::Column::Location.eq(location.as_str()));
    }
    if let Some(course) = filter.course_requirement {
        query = query.filter(listing::Column::CourseRequirement.eq(course));
    }
    if let Some(work_setup) = filter.work_setup {
        query = query.filter(listing::Column::WorkSetup.eq(work_setup));
    }

    if let Some(term) = filter.search.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        let pattern = like_pattern(term);
        let lower = |col: listing::Column| Expr::expr(Func::lower(Expr::col((Listing, col))));

        let matching_companies = Query::select()
            .column(user::Column::Id)
            .from(User)
            .and_where(
                Expr::expr(Func::lower(Expr::col((User, user::Column::CompanyName))))
                    .like(pattern.as_str()),
            )
            .to_owned();

        query = query.filter(
            Condition::any()
                .add(lower(listing::Column::Title).like(pattern.as_str()))
                .add(lower(listing::Column::Description).like(pattern.as_str()))
                .add(lower(listing::Column::SkillsRequired).like(pattern.as_str()))
                .add(listing::Column::CompanyId.in_subquery(matching_companies)),
        );
    }

    let order = if filter.order.descending {
        Order::Desc
    } else {
        Order::Asc
    };

    query
        .order_by(filter.order.column(), order)
        .order_by_desc(listing::Column::Id)
        .limit(filter.limit)
        .offset(filter.offset)
}

/// Listing repository for database operations.
#[derive(Clone)]
pub struct ListingRepository {
    db: Arc<DatabaseConnection>,
}

impl ListingRepository {
    /// Create a new listing repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a listing by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<listing::Model>> {
        Listing::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a listing by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<listing::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::ListingNotFound(id.to_string()))
    }

    /// Find listings by IDs.
    pub async fn find_by_ids(&self, ids: &[String]) -> AppResult<Vec<listing::Model>> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        Listing::find()
            .filter(listing::Column::Id.is_in(ids.to_vec()))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new listing.
    pub async fn create(&self, model: listing::ActiveModel) -> AppResult<listing::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a listing.
    pub async fn update(&self, model: listing::ActiveModel) -> AppResult<listing::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a listing (its applications cascade).
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        Listing::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Search listings with visibility scope, filters and ordering.
    pub async fn search(&self, filter: &ListingFilter) -> AppResult<Vec<listing::Model>> {
        search_query(filter)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count all listings.
    pub async fn count(&self) -> AppResult<u64> {
        Listing::find()
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count listings in a status.
    pub async fn count_by_status(&self, status: listing::ListingStatus) -> AppResult<u64> {
        Listing::find()
            .filter(listing::Column::Status.eq(status))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count listings owned by a company.
    pub async fn count_by_company(&self, company_id: &str) -> AppResult<u64> {
        Listing::find()
            .filter(listing::Column::CompanyId.eq(company_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count listings owned by a company in a status.
    pub async fn count_by_company_and_status(
        &self,
        company_id: &str,
        status: listing::ListingStatus,
    ) -> AppResult<u64> {
        Listing::find()
            .filter(listing::Column::CompanyId.eq(company_id))
            .filter(listing::Column::Status.eq(status))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, QueryTrait};
    use std::sync::Arc;

    fn create_test_listing(id: &str, status: listing::ListingStatus) -> listing::Model {
        listing::Model {
            id: id.to_string(),
            company_id: "company1".to_string(),
            title: "Backend Intern".to_string(),
            ojt_type: listing::OjtType::Required,
            required_hours: 500,
            duration_weeks: 10,
            work_setup: listing::WorkSetup::Onsite,
            location: "Cebu City".to_string(),
            description: "Build APIs".to_string(),
            responsibilities: "Write code".to_string(),
            learning_outcomes: "Ship code".to_string(),
            course_requirement: listing::CourseRequirement::Cit,
            year_level_requirement: 3,
            skills_required: "Rust, SQL".to_string(),
            slots_available: 2,
            allowance: None,
            has_allowance: false,
            start_date: NaiveDate::from_ymd_opt(2030, 6, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2030, 8, 1).unwrap(),
            application_deadline: NaiveDate::from_ymd_opt(2030, 5, 15).unwrap(),
            status,
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }

    #[test]
    fn test_order_parse() {
        assert_eq!(
            ListingOrder::parse("-allowance"),
            Some(ListingOrder {
                field: ListingOrderField::Allowance,
                descending: true
            })
        );
        assert_eq!(
            ListingOrder::parse("start_date"),
            Some(ListingOrder {
                field: ListingOrderField::StartDate,
                descending: false
            })
        );
        assert_eq!(ListingOrder::parse("title"), None);
        assert!(ListingOrder::default().descending);
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("Rust"), "%rust%");
        assert_eq!(like_pattern("100%_off"), "%100\\%\\_off%");
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<listing::Model>::new()])
                .into_connection(),
        );

        let repo = ListingRepository::new(db);
        let result = repo.get_by_id("missing").await;

        assert!(matches!(result, Err(AppError::ListingNotFound(_))));
    }

    #[test]
    fn test_search_query_public_scope() {
        let filter = ListingFilter {
            search: Some("Rust".to_string()),
            limit: 20,
            ..Default::default()
        };
        let sql = search_query(&filter)
            .build(DatabaseBackend::Postgres)
            .to_string();

        assert!(sql.contains(r#""listing"."status" = 'open'"#));
        assert!(sql.contains("LIKE '%rust%'"));
        assert!(sql.contains(r#""company_name""#));
        assert!(sql.contains(r#"ORDER BY "listing"."created_at" DESC"#));
        assert!(sql.contains("LIMIT 20"));
    }

    #[test]
    fn test_search_query_company_scope_has_no_status_filter() {
        let filter = ListingFilter {
            scope: ListingScope::Company("company1".to_string()),
            order: ListingOrder::parse("application_deadline").unwrap(),
            limit: 20,
            ..Default::default()
        };
        let sql = search_query(&filter)
            .build(DatabaseBackend::Postgres)
            .to_string();

        assert!(sql.contains(r#""listing"."company_id" = 'company1'"#));
        assert!(!sql.contains(r#""status" ="#));
        assert!(sql.contains(r#"ORDER BY "listing"."application_deadline" ASC"#));
    }

    #[tokio::test]
    async fn test_search_returns_rows() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![
                    create_test_listing("l1", listing::ListingStatus::Open),
                    create_test_listing("l2", listing::ListingStatus::Closed),
                ]])
                .into_connection(),
        );

        let repo = ListingRepository::new(db);
        let filter = ListingFilter {
            scope: ListingScope::All,
            limit: 20,
            ..Default::default()
        };
        let result = repo.search(&filter).await.unwrap();
        assert_eq!(result.len(), 2);
    }

    #[tokio::test]
    async fn test_delete() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let repo = ListingRepository::new(db);
        assert!(repo.delete("l1").await.is_ok());
    }

    #[tokio::test]
    async fn test_count_by_company_and_status() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[maplit::btreemap! {
                    "num_items" => sea_orm::Value::BigInt(Some(3))
                }]])
                .into_connection(),
        );

        let repo = ListingRepository::new(db);
        let count = repo
            .count_by_company_and_status("company1", listing::ListingStatus::Open)
            .await
            .unwrap();

        assert_eq!(count, 3);
    }
}
