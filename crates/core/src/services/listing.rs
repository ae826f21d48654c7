//! Listing service.

use chrono::NaiveDate;
use ojt_common::{AppError, AppResult, IdGenerator};
use ojt_db::{
    entities::{
        application::ApplicationStatus,
        listing::{self, CourseRequirement, ListingStatus, OjtType, WorkSetup},
        user::{self, Role},
    },
    repositories::{
        ApplicationRepository, ListingFilter, ListingOrder, ListingRepository, ListingScope,
        UserRepository,
    },
};
use rust_decimal::Decimal;
use sea_orm::{ActiveModelTrait, Set};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use validator::Validate;

use super::notification::{ListingChange, NotificationService, plan_listing_notifications};
use crate::input::{empty_as_none, nullable};
use crate::validation::{ListingTerms, ensure_company, validate_listing};

const DEFAULT_LIMIT: u64 = 20;
const MAX_LIMIT: u64 = 100;

const fn default_ojt_type() -> OjtType {
    OjtType::Required
}

const fn default_required_hours() -> i32 {
    500
}

const fn default_duration_weeks() -> i32 {
    10
}

const fn default_work_setup() -> WorkSetup {
    WorkSetup::Onsite
}

const fn default_course_requirement() -> CourseRequirement {
    CourseRequirement::All
}

const fn default_year_level_requirement() -> i32 {
    4
}

const fn default_slots() -> i32 {
    1
}

/// Input for creating a listing.
///
/// `status` and `has_allowance` are not client-settable.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateListingInput {
    #[validate(length(max = 200))]
    pub title: String,

    #[serde(default = "default_ojt_type")]
    pub ojt_type: OjtType,

    #[serde(default = "default_required_hours")]
    pub required_hours: i32,

    #[serde(default = "default_duration_weeks")]
    pub duration_weeks: i32,

    #[serde(default = "default_work_setup")]
    pub work_setup: WorkSetup,

    #[validate(length(min = 1, max = 200))]
    pub location: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub responsibilities: String,

    #[serde(default)]
    pub learning_outcomes: String,

    #[serde(default = "default_course_requirement")]
    pub course_requirement: CourseRequirement,

    #[serde(default = "default_year_level_requirement")]
    pub year_level_requirement: i32,

    #[serde(default)]
    pub skills_required: String,

    #[serde(default = "default_slots")]
    pub slots_available: i32,

    #[serde(default)]
    pub allowance: Option<Decimal>,

    pub start_date: NaiveDate,

    pub end_date: NaiveDate,

    pub application_deadline: NaiveDate,
}

/// Input for a partial listing update.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateListingInput {
    #[validate(length(max = 200))]
    pub title: Option<String>,
    pub ojt_type: Option<OjtType>,
    pub required_hours: Option<i32>,
    pub duration_weeks: Option<i32>,
    pub work_setup: Option<WorkSetup>,
    #[validate(length(min = 1, max = 200))]
    pub location: Option<String>,
    pub description: Option<String>,
    pub responsibilities: Option<String>,
    pub learning_outcomes: Option<String>,
    pub course_requirement: Option<CourseRequirement>,
    pub year_level_requirement: Option<i32>,
    pub skills_required: Option<String>,
    pub slots_available: Option<i32>,
    /// `null` clears the allowance.
    #[serde(default, deserialize_with = "nullable")]
    pub allowance: Option<Option<Decimal>>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub application_deadline: Option<NaiveDate>,
    pub status: Option<ListingStatus>,
}

/// Query parameters for browsing listings.
#[derive(Debug, Default, Deserialize)]
pub struct ListingQuery {
    #[serde(default, deserialize_with = "empty_as_none")]
    pub ojt_type: Option<OjtType>,
    pub location: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub course_requirement: Option<CourseRequirement>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub work_setup: Option<WorkSetup>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub status: Option<ListingStatus>,
    pub search: Option<String>,
    pub ordering: Option<String>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

/// A listing with its presentation fields.
#[derive(Debug, Clone, Serialize)]
pub struct ListingView {
    #[serde(flatten)]
    pub listing: listing::Model,
    pub company_name: Option<String>,
    pub duration_months: f64,
    pub is_expired: bool,
}

impl ListingView {
    /// Attach presentation fields as of `today`.
    #[must_use]
    pub fn new(listing: listing::Model, company: Option<&user::Model>, today: NaiveDate) -> Self {
        Self {
            company_name: company.and_then(|c| c.company_name.clone()),
            duration_months: listing.duration_months(),
            is_expired: listing.is_expired(today),
            listing,
        }
    }
}

/// Listing service for business logic.
#[derive(Clone)]
pub struct ListingService {
    listing_repo: ListingRepository,
    user_repo: UserRepository,
    application_repo: ApplicationRepository,
    notification_service: NotificationService,
    id_gen: IdGenerator,
}

impl ListingService {
    /// Create a new listing service.
    #[must_use]
    pub const fn new(
        listing_repo: ListingRepository,
        user_repo: UserRepository,
        application_repo: ApplicationRepository,
        notification_service: NotificationService,
    ) -> Self {
        Self {
            listing_repo,
            user_repo,
            application_repo,
            notification_service,
            id_gen: IdGenerator::new(),
        }
    }

    /// Create a listing owned by the acting company.
    pub async fn create(
        &self,
        actor: &user::Model,
        input: CreateListingInput,
        today: NaiveDate,
    ) -> AppResult<listing::Model> {
        ensure_company(actor)?;
        input.validate()?;

        validate_listing(
            &ListingTerms {
                title: &input.title,
                description: &input.description,
                responsibilities: &input.responsibilities,
                learning_outcomes: &input.learning_outcomes,
                required_hours: input.required_hours,
                duration_weeks: input.duration_weeks,
                slots_available: input.slots_available,
                year_level_requirement: input.year_level_requirement,
                start_date: input.start_date,
                end_date: input.end_date,
                application_deadline: input.application_deadline,
            },
            today,
            true,
        )?;

        let model = listing::ActiveModel {
            id: Set(self.id_gen.generate()),
            company_id: Set(actor.id.clone()),
            title: Set(input.title),
            ojt_type: Set(input.ojt_type),
            required_hours: Set(input.required_hours),
            duration_weeks: Set(input.duration_weeks),
            work_setup: Set(input.work_setup),
            location: Set(input.location),
            description: Set(input.description),
            responsibilities: Set(input.responsibilities),
            learning_outcomes: Set(input.learning_outcomes),
            course_requirement: Set(input.course_requirement),
            year_level_requirement: Set(input.year_level_requirement),
            skills_required: Set(input.skills_required),
            slots_available: Set(input.slots_available),
            allowance: Set(input.allowance),
            has_allowance: Set(false),
            start_date: Set(input.start_date),
            end_date: Set(input.end_date),
            application_deadline: Set(input.application_deadline),
            status: Set(ListingStatus::Open),
            ..Default::default()
        };

        let listing = self.listing_repo.create(model).await?;
        tracing::info!(listing_id = %listing.id, company_id = %actor.id, "Created listing");

        // A new listing never takes the closed path, so nothing is written.
        let drafts = plan_listing_notifications(ListingChange::created(listing.status), &listing, &[]);
        self.notification_service.dispatch(drafts).await;

        Ok(listing)
    }

    /// Get a listing visible to `viewer`.
    pub async fn get(
        &self,
        viewer: Option<&user::Model>,
        id: &str,
        today: NaiveDate,
    ) -> AppResult<ListingView> {
        let listing = self
            .listing_repo
            .find_by_id(id)
            .await?
            .filter(|l| Self::is_visible(viewer, l))
            .ok_or_else(|| AppError::ListingNotFound(id.to_string()))?;

        let company = self.user_repo.find_by_id(&listing.company_id).await?;
        Ok(ListingView::new(listing, company.as_ref(), today))
    }

    /// Browse listings visible to `viewer`.
    pub async fn list(
        &self,
        viewer: Option<&user::Model>,
        query: ListingQuery,
        today: NaiveDate,
    ) -> AppResult<Vec<ListingView>> {
        let scope = match viewer {
            Some(user) if user.role == Role::Company => ListingScope::Company(user.id.clone()),
            Some(user) if user.role == Role::Admin => ListingScope::All,
            _ => ListingScope::Public,
        };

        let filter = ListingFilter {
            scope,
            status: query.status,
            ojt_type: query.ojt_type,
            location: query.location.filter(|l| !l.is_empty()),
            course_requirement: query.course_requirement,
            work_setup: query.work_setup,
            search: query.search.filter(|s| !s.trim().is_empty()),
            order: query
                .ordering
                .as_deref()
                .and_then(ListingOrder::parse)
                .unwrap_or_default(),
            limit: query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT),
            offset: query.offset.unwrap_or(0),
        };

        let listings = self.listing_repo.search(&filter).await?;
        if listings.is_empty() {
            return Ok(vec![]);
        }

        let mut company_ids: Vec<String> = listings.iter().map(|l| l.company_id.clone()).collect();
        company_ids.sort();
        company_ids.dedup();

        let companies: HashMap<String, user::Model> = self
            .user_repo
            .find_by_ids(&company_ids)
            .await?
            .into_iter()
            .map(|u| (u.id.clone(), u))
            .collect();

        Ok(listings
            .into_iter()
            .map(|l| {
                let company = companies.get(&l.company_id);
                ListingView::new(l, company, today)
            })
            .collect())
    }

    /// Update a listing owned by the acting company.
    pub async fn update(
        &self,
        actor: &user::Model,
        id: &str,
        input: UpdateListingInput,
        today: NaiveDate,
    ) -> AppResult<listing::Model> {
        ensure_company(actor)?;
        input.validate()?;

        let existing = self.owned_listing(actor, id).await?;
        let previous_status = existing.status;
        let deadline_changed = input
            .application_deadline
            .is_some_and(|d| d != existing.application_deadline);

        let merged = merge_listing(existing, input);
        validate_listing(&ListingTerms::from(&merged), today, deadline_changed)?;

        let active = listing::ActiveModel::from(merged).reset_all();
        let listing = self.listing_repo.update(active).await?;
        tracing::info!(listing_id = %listing.id, status = ?listing.status, "Updated listing");

        let change = ListingChange::updated(previous_status, listing.status);
        if change.is_closing() {
            match self
                .application_repo
                .find_by_listing_and_status(&listing.id, ApplicationStatus::Applied)
                .await
            {
                Ok(applied) => {
                    let drafts = plan_listing_notifications(change, &listing, &applied);
                    self.notification_service.dispatch(drafts).await;
                }
                Err(e) => {
                    tracing::warn!(error = %e, listing_id = %listing.id, "Failed to load applicants for closed listing");
                }
            }
        }

        Ok(listing)
    }

    /// Delete a listing owned by the acting company.
    pub async fn delete(&self, actor: &user::Model, id: &str) -> AppResult<()> {
        ensure_company(actor)?;
        let listing = self.owned_listing(actor, id).await?;
        self.listing_repo.delete(&listing.id).await?;
        tracing::info!(listing_id = %listing.id, "Deleted listing");
        Ok(())
    }

    async fn owned_listing(&self, actor: &user::Model, id: &str) -> AppResult<listing::Model> {
        let listing = self.listing_repo.get_by_id(id).await?;
        if listing.company_id != actor.id {
            return Err(AppError::Forbidden(
                "You can only edit your own listings.".to_string(),
            ));
        }
        Ok(listing)
    }

    fn is_visible(viewer: Option<&user::Model>, listing: &listing::Model) -> bool {
        if listing.is_open() {
            return true;
        }
        match viewer {
            Some(user) => user.role == Role::Admin || user.id == listing.company_id,
            None => false,
        }
    }
}

/// Apply a partial update onto a listing.
fn merge_listing(mut listing: listing::Model, input: UpdateListingInput) -> listing::Model {
    if let Some(title) = input.title {
        listing.title = title;
    }
    if let Some(ojt_type) = input.ojt_type {
        listing.ojt_type = ojt_type;
    }
    if let Some(required_hours) = input.required_hours {
        listing.required_hours = required_hours;
    }
    if let Some(duration_weeks) = input.duration_weeks {
        listing.duration_weeks = duration_weeks;
    }
    if let Some(work_setup) = input.work_setup {
        listing.work_setup = work_setup;
    }
    if let Some(location) = input.location {
        listing.location = location;
    }
    if let Some(description) = input.description {
        listing.description = description;
    }
    if let Some(responsibilities) = input.responsibilities {
        listing.responsibilities = responsibilities;
    }
    if let Some(learning_outcomes) = input.learning_outcomes {
        listing.learning_outcomes = learning_outcomes;
    }
    if let Some(course_requirement) = input.course_requirement {
        listing.course_requirement = course_requirement;
    }
    if let Some(year_level_requirement) = input.year_level_requirement {
        listing.year_level_requirement = year_level_requirement;
    }
    if let Some(skills_required) = input.skills_required {
        listing.skills_required = skills_required;
    }
    if let Some(slots_available) = input.slots_available {
        listing.slots_available = slots_available;
    }
    if let Some(allowance) = input.allowance {
        listing.allowance = allowance;
    }
    if let Some(start_date) = input.start_date {
        listing.start_date = start_date;
    }
    if let Some(end_date) = input.end_date {
        listing.end_date = end_date;
    }
    if let Some(application_deadline) = input.application_deadline {
        listing.application_deadline = application_deadline;
    }
    if let Some(status) = input.status {
        listing.status = status;
    }
    listing
}
