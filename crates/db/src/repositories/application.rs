//! Application repository.

use std::sync::Arc;

use crate::entities::{Application, Listing, application, listing};
use ojt_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect,
};

/// Application repository for database operations.
#[derive(Clone)]
pub struct ApplicationRepository {
    db: Arc<DatabaseConnection>,
}

impl ApplicationRepository {
    /// Create a new application repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find an application by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<application::Model>> {
        Application::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find an application by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<application::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::ApplicationNotFound(id.to_string()))
    }

    /// All applications a student holds for a listing, newest first.
    pub async fn find_by_student_and_listing(
        &self,
        student_id: &str,
        listing_id: &str,
    ) -> AppResult<Vec<application::Model>> {
        Application::find()
            .filter(application::Column::StudentId.eq(student_id))
            .filter(application::Column::ListingId.eq(listing_id))
            .order_by_desc(application::Column::AppliedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Applications submitted by a student, newest first.
    pub async fn find_by_student(&self, student_id: &str) -> AppResult<Vec<application::Model>> {
        Application::find()
            .filter(application::Column::StudentId.eq(student_id))
            .order_by_desc(application::Column::AppliedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Applications on any listing owned by a company, newest first.
    pub async fn find_by_company(&self, company_id: &str) -> AppResult<Vec<application::Model>> {
        Application::find()
            .inner_join(Listing)
            .filter(listing::Column::CompanyId.eq(company_id))
            .order_by_desc(application::Column::AppliedAt)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Applications on a listing in the given status.
    pub async fn find_by_listing_and_status(
        &self,
        listing_id: &str,
        status: application::ApplicationStatus,
    ) -> AppResult<Vec<application::Model>> {
        Application::find()
            .filter(application::Column::ListingId.eq(listing_id))
            .filter(application::Column::Status.eq(status))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new application.
    pub async fn create(&self, model: application::ActiveModel) -> AppResult<application::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update an application.
    pub async fn update(&self, model: application::ActiveModel) -> AppResult<application::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete an application.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        Application::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Count all applications.
    pub async fn count(&self) -> AppResult<u64> {
        Application::find()
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count applications submitted by a student, optionally in one status.
    pub async fn count_by_student(
        &self,
        student_id: &str,
        status: Option<application::ApplicationStatus>,
    ) -> AppResult<u64> {
        let mut query = Application::find().filter(application::Column::StudentId.eq(student_id));
        if let Some(status) = status {
            query = query.filter(application::Column::Status.eq(status));
        }

        query
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count applications across a company's listings, optionally in one status.
    pub async fn count_by_company(
        &self,
        company_id: &str,
        status: Option<application::ApplicationStatus>,
    ) -> AppResult<u64> {
        let mut query = Application::find()
            .inner_join(Listing)
            .filter(listing::Column::CompanyId.eq(company_id));
        if let Some(status) = status {
            query = query.filter(application::Column::Status.eq(status));
        }

        query
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
