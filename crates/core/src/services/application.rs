//! Application service.

use std::collections::HashMap;

use chrono::NaiveDate;
use ojt_common::{AppError, AppResult, IdGenerator};
use ojt_db::{
    entities::{
        application::{self, ApplicationStatus},
        listing,
        user::{self, Role},
    },
    repositories::{ApplicationRepository, ListingRepository, UserRepository},
};
use sea_orm::{Set, prelude::DateTimeWithTimeZone};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::notification::{ApplicationChange, NotificationService, plan_application_notifications};
use crate::input::nullable;
use crate::validation::{ApplyOutcome, ensure_company, ensure_student, validate_application};

/// Input for applying to a listing.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct ApplyInput {
    /// Listing ID.
    pub listing: Option<String>,

    #[serde(default)]
    #[validate(length(max = 10000))]
    pub cover_letter: String,

    pub resume: Option<String>,
    pub transcript: Option<String>,
    pub endorsement_letter: Option<String>,
}

/// Company-side review of an application.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateApplicationStatusInput {
    pub status: Option<ApplicationStatus>,

    #[serde(default, deserialize_with = "nullable")]
    pub interview_date: Option<Option<DateTimeWithTimeZone>>,

    #[validate(length(max = 10000))]
    pub interview_notes: Option<String>,

    #[validate(length(max = 10000))]
    pub final_feedback: Option<String>,
}

/// Student-side edit of their own application.
///
/// The review fields are accepted only so that a request carrying them can
/// be refused.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateOwnApplicationInput {
    #[validate(length(max = 10000))]
    pub cover_letter: Option<String>,
    pub resume: Option<String>,
    pub transcript: Option<String>,
    pub endorsement_letter: Option<String>,

    pub status: Option<serde_json::Value>,
    pub interview_date: Option<serde_json::Value>,
    pub interview_notes: Option<serde_json::Value>,
    pub final_feedback: Option<serde_json::Value>,
}

impl UpdateOwnApplicationInput {
    /// Whether the payload tries to change status or review fields.
    #[must_use]
    pub const fn touches_review_fields(&self) -> bool {
        self.status.is_some()
            || self.interview_date.is_some()
            || self.interview_notes.is_some()
            || self.final_feedback.is_some()
    }
}

/// An application with its presentation fields.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationView {
    #[serde(flatten)]
    pub application: application::Model,
    pub can_withdraw: bool,
    pub listing_title: Option<String>,
    pub company_name: Option<String>,
    pub student_name: Option<String>,
}

impl ApplicationView {
    /// Attach presentation fields from the related rows, when loaded.
    #[must_use]
    pub fn new(
        application: application::Model,
        listing: Option<&listing::Model>,
        company: Option<&user::Model>,
        student: Option<&user::Model>,
    ) -> Self {
        Self {
            can_withdraw: application.can_withdraw(),
            listing_title: listing.map(|l| l.title.clone()),
            company_name: company.and_then(|c| c.company_name.clone()),
            student_name: student.map(user::Model::full_name),
            application,
        }
    }
}

/// Application service for business logic.
#[derive(Clone)]
pub struct ApplicationService {
    application_repo: ApplicationRepository,
    listing_repo: ListingRepository,
    user_repo: UserRepository,
    notification_service: NotificationService,
    id_gen: IdGenerator,
}

impl ApplicationService {
    /// Create a new application service.
    #[must_use]
    pub const fn new(
        application_repo: ApplicationRepository,
        listing_repo: ListingRepository,
        user_repo: UserRepository,
        notification_service: NotificationService,
    ) -> Self {
        Self {
            application_repo,
            listing_repo,
            user_repo,
            notification_service,
            id_gen: IdGenerator::new(),
        }
    }

    /// Apply to a listing as the acting student.
    ///
    /// A withdrawn or rejected application for the same listing is revived
    /// in place and keeps its id.
    pub async fn apply(
        &self,
        actor: &user::Model,
        input: ApplyInput,
        today: NaiveDate,
    ) -> AppResult<application::Model> {
        ensure_student(actor)?;
        input.validate()?;

        let listing_id = input
            .listing
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| AppError::invalid_field("listing", "This field is required."))?;

        if input.cover_letter.trim().is_empty() {
            return Err(AppError::invalid_field(
                "cover_letter",
                "This field may not be blank.",
            ));
        }

        let listing = self.listing_repo.find_by_id(listing_id).await?.ok_or_else(|| {
            AppError::invalid_field(
                "listing",
                format!("Invalid pk \"{listing_id}\" - object does not exist."),
            )
        })?;

        let prior = self
            .application_repo
            .find_by_student_and_listing(&actor.id, &listing.id)
            .await?;

        let (application, change) = match validate_application(actor, &listing, &prior, today)? {
            ApplyOutcome::Insert => {
                let model = application::ActiveModel {
                    id: Set(self.id_gen.generate()),
                    student_id: Set(actor.id.clone()),
                    listing_id: Set(listing.id.clone()),
                    cover_letter: Set(input.cover_letter),
                    resume: Set(input.resume),
                    transcript: Set(input.transcript),
                    endorsement_letter: Set(input.endorsement_letter),
                    status: Set(ApplicationStatus::Applied),
                    interview_date: Set(None),
                    interview_notes: Set(String::new()),
                    final_feedback: Set(String::new()),
                    ..Default::default()
                };
                let created = self.application_repo.create(model).await?;
                (created, ApplicationChange::created(ApplicationStatus::Applied))
            }
            ApplyOutcome::Reactivate(prior) => {
                let previous = prior.status;
                let mut active: application::ActiveModel = prior.into();
                active.status = Set(ApplicationStatus::Applied);
                active.cover_letter = Set(input.cover_letter);
                active.resume = Set(input.resume);
                active.transcript = Set(input.transcript);
                active.endorsement_letter = Set(input.endorsement_letter);
                active.interview_date = Set(None);
                active.interview_notes = Set(String::new());
                active.final_feedback = Set(String::new());
                let revived = self.application_repo.update(active).await?;
                (revived, ApplicationChange::updated(previous, ApplicationStatus::Applied))
            }
        };

        tracing::info!(
            application_id = %application.id,
            listing_id = %listing.id,
            student_id = %actor.id,
            reactivated = change.previous.is_some(),
            "Application submitted"
        );

        let drafts = plan_application_notifications(change, &application, &listing, actor);
        self.notification_service.dispatch(drafts).await;

        Ok(application)
    }

    /// Applications visible to `viewer`, newest first.
    ///
    /// Students see their own, companies see those on their listings and
    /// admins see none.
    pub async fn list(&self, viewer: &user::Model) -> AppResult<Vec<ApplicationView>> {
        let applications = match viewer.role {
            Role::Student => self.application_repo.find_by_student(&viewer.id).await?,
            Role::Company => self.application_repo.find_by_company(&viewer.id).await?,
            Role::Admin => vec![],
        };

        self.hydrate(applications).await
    }

    /// Get one application within the viewer's scope.
    pub async fn get(&self, viewer: &user::Model, id: &str) -> AppResult<ApplicationView> {
        let (application, listing) = self.scoped(viewer, id).await?;

        let company = self.user_repo.find_by_id(&listing.company_id).await?;
        let student = self.user_repo.find_by_id(&application.student_id).await?;

        Ok(ApplicationView::new(
            application,
            Some(&listing),
            company.as_ref(),
            student.as_ref(),
        ))
    }

    /// Review an application on one of the acting company's listings.
    pub async fn update_status(
        &self,
        actor: &user::Model,
        id: &str,
        input: UpdateApplicationStatusInput,
    ) -> AppResult<application::Model> {
        ensure_company(actor)?;
        input.validate()?;

        if input.status == Some(ApplicationStatus::Withdrawn) {
            return Err(AppError::Forbidden(
                "Only the student can withdraw an application.".to_string(),
            ));
        }

        let (existing, listing) = self.scoped(actor, id).await?;
        let previous = existing.status;

        let mut active: application::ActiveModel = existing.into();
        if let Some(status) = input.status {
            active.status = Set(status);
        }
        if let Some(interview_date) = input.interview_date {
            active.interview_date = Set(interview_date);
        }
        if let Some(interview_notes) = input.interview_notes {
            active.interview_notes = Set(interview_notes);
        }
        if let Some(final_feedback) = input.final_feedback {
            active.final_feedback = Set(final_feedback);
        }

        let application = self.application_repo.update(active).await?;
        let change = ApplicationChange::updated(previous, application.status);
        tracing::info!(
            application_id = %application.id,
            from = previous.as_str(),
            to = application.status.as_str(),
            "Application reviewed"
        );

        if change.is_status_change() {
            match self.user_repo.find_by_id(&application.student_id).await {
                Ok(Some(student)) => {
                    let drafts =
                        plan_application_notifications(change, &application, &listing, &student);
                    self.notification_service.dispatch(drafts).await;
                }
                Ok(None) => {
                    tracing::warn!(student_id = %application.student_id, "Applicant not found");
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to load applicant for notification");
                }
            }
        }

        Ok(application)
    }

    /// Edit the cover letter or documents of the student's own active application.
    pub async fn update_own(
        &self,
        actor: &user::Model,
        id: &str,
        input: UpdateOwnApplicationInput,
    ) -> AppResult<application::Model> {
        ensure_student(actor)?;

        if input.touches_review_fields() {
            return Err(AppError::Forbidden(
                "Students cannot change the status or review of an application.".to_string(),
            ));
        }
        input.validate()?;

        let existing = self.owned(actor, id).await?;
        if !existing.can_withdraw() {
            return Err(AppError::Validation(
                "Only active applications can be edited.".to_string(),
            ));
        }

        let mut active: application::ActiveModel = existing.into();
        if let Some(cover_letter) = input.cover_letter {
            active.cover_letter = Set(cover_letter);
        }
        if let Some(resume) = input.resume {
            active.resume = Set(Some(resume));
        }
        if let Some(transcript) = input.transcript {
            active.transcript = Set(Some(transcript));
        }
        if let Some(endorsement_letter) = input.endorsement_letter {
            active.endorsement_letter = Set(Some(endorsement_letter));
        }

        self.application_repo.update(active).await
    }

    /// Withdraw the student's own application while it is still active.
    pub async fn withdraw(&self, actor: &user::Model, id: &str) -> AppResult<application::Model> {
        ensure_student(actor)?;

        let existing = self.owned(actor, id).await?;
        if !existing.can_withdraw() {
            return Err(AppError::Validation(
                "This application can no longer be withdrawn.".to_string(),
            ));
        }

        let mut active: application::ActiveModel = existing.into();
        active.status = Set(ApplicationStatus::Withdrawn);

        let application = self.application_repo.update(active).await?;
        tracing::info!(application_id = %application.id, "Application withdrawn");
        Ok(application)
    }

    /// Delete the student's own application.
    pub async fn delete(&self, actor: &user::Model, id: &str) -> AppResult<()> {
        ensure_student(actor)?;

        let existing = self.owned(actor, id).await?;
        self.application_repo.delete(&existing.id).await?;
        tracing::info!(application_id = %existing.id, "Application deleted");
        Ok(())
    }

    /// Load an application the viewer may see, with its listing.
    async fn scoped(
        &self,
        viewer: &user::Model,
        id: &str,
    ) -> AppResult<(application::Model, listing::Model)> {
        let not_found = || AppError::ApplicationNotFound(id.to_string());

        let application = self
            .application_repo
            .find_by_id(id)
            .await?
            .ok_or_else(not_found)?;

        match viewer.role {
            Role::Student if application.student_id == viewer.id => {}
            Role::Company => {}
            _ => return Err(not_found()),
        }

        let listing = self.listing_repo.get_by_id(&application.listing_id).await?;
        if viewer.role == Role::Company && listing.company_id != viewer.id {
            return Err(not_found());
        }

        Ok((application, listing))
    }

    async fn owned(&self, actor: &user::Model, id: &str) -> AppResult<application::Model> {
        self.application_repo
            .find_by_id(id)
            .await?
            .filter(|a| a.student_id == actor.id)
            .ok_or_else(|| AppError::ApplicationNotFound(id.to_string()))
    }

    async fn hydrate(
        &self,
        applications: Vec<application::Model>,
    ) -> AppResult<Vec<ApplicationView>> {
        if applications.is_empty() {
            return Ok(vec![]);
        }

        let mut listing_ids: Vec<String> =
            applications.iter().map(|a| a.listing_id.clone()).collect();
        listing_ids.sort();
        listing_ids.dedup();

        let listings: HashMap<String, listing::Model> = self
            .listing_repo
            .find_by_ids(&listing_ids)
            .await?
            .into_iter()
            .map(|l| (l.id.clone(), l))
            .collect();

        let mut user_ids: Vec<String> = applications
            .iter()
            .map(|a| a.student_id.clone())
            .chain(listings.values().map(|l| l.company_id.clone()))
            .collect();
        user_ids.sort();
        user_ids.dedup();

        let users: HashMap<String, user::Model> = self
            .user_repo
            .find_by_ids(&user_ids)
            .await?
            .into_iter()
            .map(|u| (u.id.clone(), u))
            .collect();

        Ok(applications
            .into_iter()
            .map(|a| {
                let listing = listings.get(&a.listing_id);
                let company = listing.and_then(|l| users.get(&l.company_id));
                let student = users.get(&a.student_id);
                ApplicationView::new(a, listing, company, student)
            })
            .collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use ojt_db::entities::listing::{CourseRequirement, ListingStatus, OjtType, WorkSetup};
    use ojt_db::entities::user::Course;
    use ojt_db::repositories::NotificationRepository;
    use ojt_db::test_utils::{transaction_log, written_notifications};
    use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2099, 1, 1).unwrap()
    }

    fn student(id: &str) -> user::Model {
        user::Model {
            id: id.to_string(),
            username: id.to_string(),
            username_lower: id.to_lowercase(),
            email: format!("{id}@example.com"),
            password_hash: String::new(),
            token: None,
            role: Role::Student,
            first_name: "Juan".to_string(),
            last_name: "Dela Cruz".to_string(),
            phone: None,
            profile_image: None,
            bio: None,
            is_verified: false,
            student_id: Some("2021-0001".to_string()),
            course: Some(Course::Cit),
            year_level: Some(4),
            company_name: None,
            company_address: None,
            company_description: None,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn company(id: &str) -> user::Model {
        user::Model {
            role: Role::Company,
            student_id: None,
            course: None,
            year_level: None,
            company_name: Some("Acme Corp".to_string()),
            ..student(id)
        }
    }

    fn open_listing(id: &str, company_id: &str) -> listing::Model {
        listing::Model {
            id: id.to_string(),
            company_id: company_id.to_string(),
            title: "Backend Intern".to_string(),
            ojt_type: OjtType::Required,
            required_hours: 500,
            duration_weeks: 10,
            work_setup: WorkSetup::Onsite,
            location: "Cebu City".to_string(),
            description: "Build internal tools".to_string(),
            responsibilities: "Maintain the ticketing service".to_string(),
            learning_outcomes: "Production Rust experience".to_string(),
            course_requirement: CourseRequirement::Cit,
            year_level_requirement: 4,
            skills_required: String::new(),
            slots_available: 1,
            allowance: None,
            has_allowance: false,
            start_date: NaiveDate::from_ymd_opt(2099, 6, 1).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2099, 8, 1).unwrap(),
            application_deadline: NaiveDate::from_ymd_opt(2099, 5, 1).unwrap(),
            status: ListingStatus::Open,
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }

    fn create_test_application(id: &str, status: ApplicationStatus) -> application::Model {
        application::Model {
            id: id.to_string(),
            student_id: "s1".to_string(),
            listing_id: "l1".to_string(),
            cover_letter: "Hello".to_string(),
            resume: None,
            transcript: None,
            endorsement_letter: None,
            status,
            applied_at: Utc::now().into(),
            updated_at: Utc::now().into(),
            interview_date: None,
            interview_notes: String::new(),
            final_feedback: String::new(),
        }
    }

    fn apply_input() -> ApplyInput {
        ApplyInput {
            listing: Some("l1".to_string()),
            cover_letter: "Please consider me".to_string(),
            ..Default::default()
        }
    }

    fn exec(rows: u64) -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected: rows,
        }
    }

    fn service_on(conn: &Arc<DatabaseConnection>) -> ApplicationService {
        ApplicationService::new(
            ApplicationRepository::new(conn.clone()),
            ListingRepository::new(conn.clone()),
            UserRepository::new(conn.clone()),
            NotificationService::new(NotificationRepository::new(conn.clone()), 500),
        )
    }

    fn service(db: MockDatabase) -> ApplicationService {
        service_on(&Arc::new(db.into_connection()))
    }

    fn pair(user_id: &str, notification_type: &str) -> (String, String) {
        (user_id.to_string(), notification_type.to_string())
    }

    #[test]
    fn test_touches_review_fields() {
        let input: UpdateOwnApplicationInput =
            serde_json::from_value(serde_json::json!({ "cover_letter": "Updated" })).unwrap();
        assert!(!input.touches_review_fields());

        let input: UpdateOwnApplicationInput =
            serde_json::from_value(serde_json::json!({ "status": "accepted" })).unwrap();
        assert!(input.touches_review_fields());
    }

    #[test]
    fn test_view_can_withdraw() {
        let view = ApplicationView::new(
            create_test_application("a1", ApplicationStatus::UnderReview),
            None,
            None,
            Some(&student("s1")),
        );
        assert!(view.can_withdraw);
        assert_eq!(view.student_name.as_deref(), Some("Juan Dela Cruz"));

        let view = ApplicationView::new(
            create_test_application("a1", ApplicationStatus::Accepted),
            None,
            None,
            None,
        );
        assert!(!view.can_withdraw);
    }

    #[tokio::test]
    async fn test_apply_missing_listing_field() {
        let svc = service(MockDatabase::new(DatabaseBackend::Postgres));

        let input = ApplyInput {
            listing: None,
            ..Default::default()
        };
        let result = svc.apply(&student("s1"), input, today()).await;
        assert!(matches!(result, Err(AppError::InvalidField { field, .. }) if field == "listing"));
    }

    #[tokio::test]
    async fn test_apply_blank_cover_letter_rejected() {
        let svc = service(MockDatabase::new(DatabaseBackend::Postgres));

        for cover_letter in ["", "   "] {
            let input = ApplyInput {
                cover_letter: cover_letter.to_string(),
                ..apply_input()
            };
            let result = svc.apply(&student("s1"), input, today()).await;
            assert!(
                matches!(result, Err(AppError::InvalidField { field, .. }) if field == "cover_letter")
            );
        }
    }

    #[tokio::test]
    async fn test_apply_missing_cover_letter_rejected() {
        let svc = service(MockDatabase::new(DatabaseBackend::Postgres));

        let input: ApplyInput = serde_json::from_value(serde_json::json!({ "listing": "l1" })).unwrap();
        let result = svc.apply(&student("s1"), input, today()).await;
        assert!(matches!(result, Err(AppError::InvalidField { field, .. }) if field == "cover_letter"));
    }

    #[tokio::test]
    async fn test_apply_unknown_listing() {
        let svc = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<listing::Model>::new()]),
        );

        let result = svc.apply(&student("s1"), apply_input(), today()).await;
        assert!(matches!(result, Err(AppError::InvalidField { field, .. }) if field == "listing"));
    }

    #[tokio::test]
    async fn test_apply_by_company_forbidden() {
        let svc = service(MockDatabase::new(DatabaseBackend::Postgres));

        let result = svc.apply(&company("c1"), apply_input(), today()).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_apply_inserts_and_notifies() {
        let conn = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[open_listing("l1", "c1")]])
                .append_query_results([
                    vec![],
                    vec![create_test_application("a1", ApplicationStatus::Applied)],
                ])
                .append_exec_results([exec(2)])
                .into_connection(),
        );
        let svc = service_on(&conn);

        let application = svc.apply(&student("s1"), apply_input(), today()).await.unwrap();
        assert_eq!(application.id, "a1");
        assert_eq!(application.status, ApplicationStatus::Applied);

        drop(svc);
        let written = written_notifications(&transaction_log(conn));
        assert_eq!(
            written,
            vec![
                pair("s1", "application_submitted"),
                pair("c1", "new_application"),
            ]
        );
    }

    #[tokio::test]
    async fn test_apply_while_active_conflicts() {
        let svc = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[open_listing("l1", "c1")]])
                .append_query_results([[create_test_application("a1", ApplicationStatus::UnderReview)]]),
        );

        let result = svc.apply(&student("s1"), apply_input(), today()).await;
        assert!(matches!(result, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_apply_reactivates_withdrawn_row() {
        let mut revived = create_test_application("a1", ApplicationStatus::Applied);
        revived.cover_letter = "Please consider me".to_string();
        let svc = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[open_listing("l1", "c1")]])
                .append_query_results([
                    [create_test_application("a1", ApplicationStatus::Withdrawn)],
                    [revived],
                ]),
        );

        let application = svc.apply(&student("s1"), apply_input(), today()).await.unwrap();
        assert_eq!(application.id, "a1");
        assert_eq!(application.status, ApplicationStatus::Applied);
    }

    #[tokio::test]
    async fn test_list_admin_sees_none() {
        let svc = service(MockDatabase::new(DatabaseBackend::Postgres));
        let mut admin = student("admin");
        admin.role = Role::Admin;

        let result = svc.list(&admin).await.unwrap();
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_list_student_hydrates() {
        let svc = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_application("a1", ApplicationStatus::Applied)]])
                .append_query_results([[open_listing("l1", "c1")]])
                .append_query_results([vec![student("s1"), company("c1")]]),
        );

        let result = svc.list(&student("s1")).await.unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].listing_title.as_deref(), Some("Backend Intern"));
        assert_eq!(result[0].company_name.as_deref(), Some("Acme Corp"));
        assert!(result[0].can_withdraw);
    }

    #[tokio::test]
    async fn test_get_other_students_application_not_found() {
        let svc = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_application("a1", ApplicationStatus::Applied)]]),
        );

        let result = svc.get(&student("s2"), "a1").await;
        assert!(matches!(result, Err(AppError::ApplicationNotFound(_))));
    }

    #[tokio::test]
    async fn test_update_status_by_other_company_not_found() {
        let svc = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_application("a1", ApplicationStatus::Applied)]])
                .append_query_results([[open_listing("l1", "c1")]]),
        );

        let input = UpdateApplicationStatusInput {
            status: Some(ApplicationStatus::Accepted),
            ..Default::default()
        };
        let result = svc.update_status(&company("c2"), "a1", input).await;
        assert!(matches!(result, Err(AppError::ApplicationNotFound(_))));
    }

    #[tokio::test]
    async fn test_update_status_withdrawn_forbidden() {
        let svc = service(MockDatabase::new(DatabaseBackend::Postgres));

        let input = UpdateApplicationStatusInput {
            status: Some(ApplicationStatus::Withdrawn),
            ..Default::default()
        };
        let result = svc.update_status(&company("c1"), "a1", input).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_update_status_accept_notifies_student() {
        let conn = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_application("a1", ApplicationStatus::Applied)]])
                .append_query_results([[open_listing("l1", "c1")]])
                .append_query_results([[create_test_application("a1", ApplicationStatus::Accepted)]])
                .append_query_results([[student("s1")]])
                .append_exec_results([exec(1)])
                .into_connection(),
        );
        let svc = service_on(&conn);

        let input = UpdateApplicationStatusInput {
            status: Some(ApplicationStatus::Accepted),
            final_feedback: Some("Welcome aboard".to_string()),
            ..Default::default()
        };
        let application = svc.update_status(&company("c1"), "a1", input).await.unwrap();
        assert_eq!(application.status, ApplicationStatus::Accepted);

        drop(svc);
        let written = written_notifications(&transaction_log(conn));
        assert_eq!(written, vec![pair("s1", "application_status_changed")]);
    }

    #[tokio::test]
    async fn test_update_status_notes_only_skips_fan_out() {
        let mut noted = create_test_application("a1", ApplicationStatus::UnderReview);
        noted.interview_notes = "Strong candidate".to_string();
        let conn = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_application("a1", ApplicationStatus::UnderReview)]])
                .append_query_results([[open_listing("l1", "c1")]])
                .append_query_results([[noted]])
                .into_connection(),
        );
        let svc = service_on(&conn);

        let input = UpdateApplicationStatusInput {
            interview_notes: Some("Strong candidate".to_string()),
            ..Default::default()
        };
        let application = svc.update_status(&company("c1"), "a1", input).await.unwrap();
        assert_eq!(application.interview_notes, "Strong candidate");

        drop(svc);
        assert!(written_notifications(&transaction_log(conn)).is_empty());
    }

    #[tokio::test]
    async fn test_update_own_with_status_forbidden() {
        let svc = service(MockDatabase::new(DatabaseBackend::Postgres));

        let input = UpdateOwnApplicationInput {
            status: Some(serde_json::json!("accepted")),
            ..Default::default()
        };
        let result = svc.update_own(&student("s1"), "a1", input).await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_update_own_decided_application_rejected() {
        let svc = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_application("a1", ApplicationStatus::Accepted)]]),
        );

        let input = UpdateOwnApplicationInput {
            cover_letter: Some("Updated".to_string()),
            ..Default::default()
        };
        let result = svc.update_own(&student("s1"), "a1", input).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_withdraw_active_application() {
        let svc = service(
            MockDatabase::new(DatabaseBackend::Postgres).append_query_results([
                [create_test_application("a1", ApplicationStatus::ForInterview)],
                [create_test_application("a1", ApplicationStatus::Withdrawn)],
            ]),
        );

        let application = svc.withdraw(&student("s1"), "a1").await.unwrap();
        assert_eq!(application.status, ApplicationStatus::Withdrawn);
    }

    #[tokio::test]
    async fn test_withdraw_rejected_application_fails() {
        let svc = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_application("a1", ApplicationStatus::Rejected)]]),
        );

        let result = svc.withdraw(&student("s1"), "a1").await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_delete_by_other_student_not_found() {
        let svc = service(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_application("a1", ApplicationStatus::Applied)]]),
        );

        let result = svc.delete(&student("s2"), "a1").await;
        assert!(matches!(result, Err(AppError::ApplicationNotFound(_))));
    }
}
