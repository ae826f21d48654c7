//! Dashboard aggregates.
//!
//! Counters are computed on demand for each request.

use ojt_common::AppResult;
use ojt_db::{
    entities::{application::ApplicationStatus, listing::ListingStatus, user},
    repositories::{ApplicationRepository, ListingRepository, UserRepository},
};
use serde::Serialize;

use crate::validation::{ensure_admin, ensure_company, ensure_student};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CompanyStats {
    pub total_listings: u64,
    pub active_listings: u64,
    pub total_applications: u64,
    pub pending_applications: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StudentStats {
    pub total_applications: u64,
    pub pending_applications: u64,
    pub accepted_applications: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AdminStats {
    pub total_students: u64,
    pub total_companies: u64,
    pub total_listings: u64,
    pub open_listings: u64,
    pub total_applications: u64,
}

/// Dashboard service.
#[derive(Clone)]
pub struct DashboardService {
    user_repo: UserRepository,
    listing_repo: ListingRepository,
    application_repo: ApplicationRepository,
}

impl DashboardService {
    #[must_use]
    pub const fn new(
        user_repo: UserRepository,
        listing_repo: ListingRepository,
        application_repo: ApplicationRepository,
    ) -> Self {
        Self {
            user_repo,
            listing_repo,
            application_repo,
        }
    }

    /// Counters for the acting company's listings.
    pub async fn company_stats(&self, actor: &user::Model) -> AppResult<CompanyStats> {
        ensure_company(actor)?;

        Ok(CompanyStats {
            total_listings: self.listing_repo.count_by_company(&actor.id).await?,
            active_listings: self
                .listing_repo
                .count_by_company_and_status(&actor.id, ListingStatus::Open)
                .await?,
            total_applications: self.application_repo.count_by_company(&actor.id, None).await?,
            pending_applications: self
                .application_repo
                .count_by_company(&actor.id, Some(ApplicationStatus::Applied))
                .await?,
        })
    }

    /// Counters for the acting student's applications.
    pub async fn student_stats(&self, actor: &user::Model) -> AppResult<StudentStats> {
        ensure_student(actor)?;

        Ok(StudentStats {
            total_applications: self.application_repo.count_by_student(&actor.id, None).await?,
            pending_applications: self
                .application_repo
                .count_by_student(&actor.id, Some(ApplicationStatus::Applied))
                .await?,
            accepted_applications: self
                .application_repo
                .count_by_student(&actor.id, Some(ApplicationStatus::Accepted))
                .await?,
        })
    }

    /// Site-wide counters.
    pub async fn admin_stats(&self, actor: &user::Model) -> AppResult<AdminStats> {
        ensure_admin(actor)?;

        Ok(AdminStats {
            total_students: self.user_repo.count_by_role(user::Role::Student).await?,
            total_companies: self.user_repo.count_by_role(user::Role::Company).await?,
            total_listings: self.listing_repo.count().await?,
            open_listings: self.listing_repo.count_by_status(ListingStatus::Open).await?,
            total_applications: self.application_repo.count().await?,
        })
    }
}
