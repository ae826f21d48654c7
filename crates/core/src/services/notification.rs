//! Notification service.
//!
//! Fan-out is split in two: the `plan_*` functions decide which notifications
//! a write produces from explicit before/after values, and
//! [`NotificationService::dispatch`] persists them in batches. Dispatch never
//! fails the caller; errors are logged and dropped.

use chrono::Utc;
use ojt_common::{AppError, AppResult, IdGenerator};
use ojt_db::{
    entities::{
        application::{self, ApplicationStatus},
        listing::{self, ListingStatus},
        notification::{self, NotificationType},
        user,
    },
    repositories::NotificationRepository,
};
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Default page size for notification lists.
const DEFAULT_LIMIT: u64 = 20;
/// Upper bound on notification page size.
const MAX_LIMIT: u64 = 100;

/// Status transition of an application write.
///
/// `previous == None` means the row was just inserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApplicationChange {
    pub previous: Option<ApplicationStatus>,
    pub current: ApplicationStatus,
}

impl ApplicationChange {
    /// A freshly inserted application.
    #[must_use]
    pub const fn created(status: ApplicationStatus) -> Self {
        Self {
            previous: None,
            current: status,
        }
    }

    /// An update of an existing application.
    #[must_use]
    pub const fn updated(previous: ApplicationStatus, current: ApplicationStatus) -> Self {
        Self {
            previous: Some(previous),
            current,
        }
    }

    /// Whether an existing row moved to a different status.
    #[must_use]
    pub fn is_status_change(&self) -> bool {
        self.previous.is_some_and(|previous| previous != self.current)
    }
}

/// Status transition of a listing write.
///
/// `previous == None` means the row was just inserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListingChange {
    pub previous: Option<ListingStatus>,
    pub current: ListingStatus,
}

impl ListingChange {
    /// A freshly inserted listing.
    #[must_use]
    pub const fn created(status: ListingStatus) -> Self {
        Self {
            previous: None,
            current: status,
        }
    }

    /// An update of an existing listing.
    #[must_use]
    pub const fn updated(previous: ListingStatus, current: ListingStatus) -> Self {
        Self {
            previous: Some(previous),
            current,
        }
    }

    /// Whether an existing listing was just closed.
    ///
    /// A new listing never closes, even if inserted as `closed`.
    #[must_use]
    pub fn is_closing(&self) -> bool {
        self.current == ListingStatus::Closed
            && self.previous.is_some_and(|previous| previous != ListingStatus::Closed)
    }
}

/// A notification to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationDraft {
    pub user_id: String,
    pub notification_type: NotificationType,
    pub title: String,
    pub message: String,
    pub data: serde_json::Value,
}

/// Notifications produced by an application write.
#[must_use]
pub fn plan_application_notifications(
    change: ApplicationChange,
    application: &application::Model,
    listing: &listing::Model,
    student: &user::Model,
) -> Vec<NotificationDraft> {
    if change.previous.is_none() {
        return vec![
            NotificationDraft {
                user_id: application.student_id.clone(),
                notification_type: NotificationType::ApplicationSubmitted,
                title: "Application Submitted".to_string(),
                message: format!(
                    "Your application for \"{}\" has been submitted successfully.",
                    listing.title
                ),
                data: json!({
                    "listing_id": listing.id,
                    "application_id": application.id,
                }),
            },
            NotificationDraft {
                user_id: listing.company_id.clone(),
                notification_type: NotificationType::NewApplication,
                title: "New Application Received".to_string(),
                message: format!(
                    "New application received for \"{}\" from {} {}.",
                    listing.title, student.first_name, student.last_name
                ),
                data: json!({
                    "listing_id": listing.id,
                    "application_id": application.id,
                    "student_id": application.student_id,
                }),
            },
        ];
    }

    if !change.is_status_change() {
        return vec![];
    }

    match change.current {
        ApplicationStatus::Accepted | ApplicationStatus::Rejected => {
            let status = change.current.as_str();
            let label = if change.current == ApplicationStatus::Accepted {
                "Accepted"
            } else {
                "Rejected"
            };
            vec![NotificationDraft {
                user_id: application.student_id.clone(),
                notification_type: NotificationType::ApplicationStatusChanged,
                title: format!("Application {label}"),
                message: format!(
                    "Your application for \"{}\" has been {status}.",
                    listing.title
                ),
                data: json!({
                    "listing_id": listing.id,
                    "application_id": application.id,
                    "status": status,
                }),
            }]
        }
        ApplicationStatus::ForInterview => vec![NotificationDraft {
            user_id: application.student_id.clone(),
            notification_type: NotificationType::InterviewScheduled,
            title: "Interview Scheduled".to_string(),
            message: format!(
                "You have been scheduled for an interview for \"{}\".",
                listing.title
            ),
            data: json!({
                "listing_id": listing.id,
                "application_id": application.id,
            }),
        }],
        _ => vec![],
    }
}

/// Notifications produced by a listing write.
///
/// `applied` holds the listing's applications in `applied` status; it is
/// only consulted when the listing is closing.
#[must_use]
pub fn plan_listing_notifications(
    change: ListingChange,
    listing: &listing::Model,
    applied: &[application::Model],
) -> Vec<NotificationDraft> {
    if !change.is_closing() {
        return vec![];
    }

    applied
        .iter()
        .filter(|a| a.status == ApplicationStatus::Applied)
        .map(|a| NotificationDraft {
            user_id: a.student_id.clone(),
            notification_type: NotificationType::ListingClosed,
            title: "OJT Position Closed".to_string(),
            message: format!(
                "The OJT position \"{}\" has been closed. Your application will no longer be considered.",
                listing.title
            ),
            data: json!({ "listing_id": listing.id }),
        })
        .collect()
}

/// Query parameters for listing notifications.
#[derive(Debug, Default, Deserialize)]
pub struct ListNotificationsQuery {
    pub limit: Option<u64>,
    pub offset: Option<u64>,
    #[serde(default)]
    pub unread_only: bool,
}

/// Notification counters for a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NotificationStats {
    pub total: u64,
    pub unread: u64,
}

/// Notification service for business logic.
#[derive(Clone)]
pub struct NotificationService {
    notification_repo: NotificationRepository,
    id_gen: IdGenerator,
    batch_size: usize,
}

impl NotificationService {
    /// Create a new notification service.
    #[must_use]
    pub fn new(notification_repo: NotificationRepository, batch_size: usize) -> Self {
        Self {
            notification_repo,
            id_gen: IdGenerator::new(),
            batch_size: batch_size.max(1),
        }
    }

    /// Persist drafted notifications, best-effort.
    ///
    /// Drafts are written in multi-row inserts of at most `batch_size` rows.
    /// A failed batch is logged and skipped. Returns the number of rows written.
    pub async fn dispatch(&self, drafts: Vec<NotificationDraft>) -> u64 {
        if drafts.is_empty() {
            return 0;
        }

        let now = Utc::now();
        let models: Vec<notification::ActiveModel> = drafts
            .into_iter()
            .map(|draft| notification::ActiveModel {
                id: Set(self.id_gen.generate()),
                user_id: Set(draft.user_id),
                notification_type: Set(draft.notification_type),
                title: Set(draft.title),
                message: Set(draft.message),
                data: Set(draft.data),
                is_read: Set(false),
                is_email_sent: Set(false),
                created_at: Set(now.into()),
            })
            .collect();

        let mut written = 0;
        let mut remaining = models.into_iter().peekable();
        while remaining.peek().is_some() {
            let batch: Vec<_> = remaining.by_ref().take(self.batch_size).collect();
            let size = batch.len();
            match self.notification_repo.create_many(batch).await {
                Ok(rows) => written += rows,
                Err(e) => {
                    tracing::warn!(error = %e, batch = size, "Failed to write notifications");
                }
            }
        }

        tracing::debug!(written, "Dispatched notifications");
        written
    }

    /// List a user's notifications, newest first.
    pub async fn list(
        &self,
        user_id: &str,
        query: &ListNotificationsQuery,
    ) -> AppResult<Vec<notification::Model>> {
        let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
        let offset = query.offset.unwrap_or(0);

        self.notification_repo
            .find_by_user(user_id, limit, offset, query.unread_only)
            .await
    }

    /// Mark one of the user's notifications as read.
    pub async fn mark_as_read(&self, user_id: &str, id: &str) -> AppResult<notification::Model> {
        let notification = self
            .notification_repo
            .find_by_id(id)
            .await?
            .filter(|n| n.user_id == user_id)
            .ok_or_else(|| AppError::NotificationNotFound(id.to_string()))?;

        self.notification_repo.mark_as_read(notification).await
    }

    /// Mark all of the user's notifications as read.
    pub async fn mark_all_as_read(&self, user_id: &str) -> AppResult<u64> {
        self.notification_repo.mark_all_as_read(user_id).await
    }

    /// Total and unread counts for a user.
    pub async fn stats(&self, user_id: &str) -> AppResult<NotificationStats> {
        let total = self.notification_repo.count_by_user(user_id).await?;
        let unread = self.notification_repo.count_unread(user_id).await?;
        Ok(NotificationStats { total, unread })
    }
}
