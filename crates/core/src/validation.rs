//! Domain validation rules.
//!
//! Every check here is a pure function of the proposed values, the acting
//! user and the current date. Services fetch what the rules need and call
//! them before any write.

use chrono::NaiveDate;
use ojt_common::{AppError, AppResult};
use ojt_db::entities::{
    application::{self, ApplicationStatus},
    listing,
    user::{self, Role},
};

/// Lowest accepted `required_hours`.
pub const MIN_REQUIRED_HOURS: i32 = 400;
/// Highest accepted `required_hours`.
pub const MAX_REQUIRED_HOURS: i32 = 600;
/// Shortest accepted `duration_weeks`.
pub const MIN_DURATION_WEEKS: i32 = 4;
/// Longest accepted `duration_weeks`.
pub const MAX_DURATION_WEEKS: i32 = 26;
/// Accepted `year_level_requirement` values (0 = any).
pub const YEAR_LEVEL_REQUIREMENTS: [i32; 3] = [0, 3, 4];

/// Require a company account.
pub fn ensure_company(actor: &user::Model) -> AppResult<()> {
    if actor.role == Role::Company {
        Ok(())
    } else {
        Err(AppError::Forbidden(
            "Only companies can manage OJT listings.".to_string(),
        ))
    }
}

/// Require a student account.
pub fn ensure_student(actor: &user::Model) -> AppResult<()> {
    if actor.role == Role::Student {
        Ok(())
    } else {
        Err(AppError::Forbidden("Only students can apply.".to_string()))
    }
}

/// Require an administrator account.
pub fn ensure_admin(actor: &user::Model) -> AppResult<()> {
    if actor.role == Role::Admin {
        Ok(())
    } else {
        Err(AppError::Forbidden("Administrator access required.".to_string()))
    }
}

/// The listing fields subject to validation, after merging any update.
#[derive(Debug, Clone, Copy)]
pub struct ListingTerms<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub responsibilities: &'a str,
    pub learning_outcomes: &'a str,
    pub required_hours: i32,
    pub duration_weeks: i32,
    pub slots_available: i32,
    pub year_level_requirement: i32,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub application_deadline: NaiveDate,
}

impl<'a> From<&'a listing::Model> for ListingTerms<'a> {
    fn from(listing: &'a listing::Model) -> Self {
        Self {
            title: &listing.title,
            description: &listing.description,
            responsibilities: &listing.responsibilities,
            learning_outcomes: &listing.learning_outcomes,
            required_hours: listing.required_hours,
            duration_weeks: listing.duration_weeks,
            slots_available: listing.slots_available,
            year_level_requirement: listing.year_level_requirement,
            start_date: listing.start_date,
            end_date: listing.end_date,
            application_deadline: listing.application_deadline,
        }
    }
}

/// Validate listing terms.
///
/// `deadline_must_be_future` is set on create and whenever an update moves
/// the deadline; an untouched past deadline does not block other edits.
pub fn validate_listing(
    terms: &ListingTerms<'_>,
    today: NaiveDate,
    deadline_must_be_future: bool,
) -> AppResult<()> {
    let required_text = [
        ("title", terms.title),
        ("description", terms.description),
        ("responsibilities", terms.responsibilities),
        ("learning_outcomes", terms.learning_outcomes),
    ];
    if let Some((field, _)) = required_text
        .iter()
        .find(|(_, value)| value.trim().is_empty())
    {
        return Err(AppError::invalid_field(*field, "This field may not be blank."));
    }

    if terms.start_date >= terms.end_date {
        return Err(AppError::invalid_field(
            "end_date",
            "End date must be after start date.",
        ));
    }

    if terms.application_deadline > terms.start_date {
        return Err(AppError::invalid_field(
            "application_deadline",
            "Deadline must be before start date.",
        ));
    }

    if deadline_must_be_future && terms.application_deadline < today {
        return Err(AppError::invalid_field(
            "application_deadline",
            "Deadline must be in the future.",
        ));
    }

    if !(MIN_REQUIRED_HOURS..=MAX_REQUIRED_HOURS).contains(&terms.required_hours) {
        return Err(AppError::invalid_field(
            "required_hours",
            format!("OJT hours must range from {MIN_REQUIRED_HOURS} to {MAX_REQUIRED_HOURS} hours."),
        ));
    }

    if !(MIN_DURATION_WEEKS..=MAX_DURATION_WEEKS).contains(&terms.duration_weeks) {
        return Err(AppError::invalid_field(
            "duration_weeks",
            format!("Duration must be between {MIN_DURATION_WEEKS} and {MAX_DURATION_WEEKS} weeks."),
        ));
    }

    if terms.slots_available < 1 {
        return Err(AppError::invalid_field(
            "slots_available",
            "At least one slot must be available.",
        ));
    }

    if !YEAR_LEVEL_REQUIREMENTS.contains(&terms.year_level_requirement) {
        return Err(AppError::invalid_field(
            "year_level_requirement",
            format!("\"{}\" is not a valid choice.", terms.year_level_requirement),
        ));
    }

    Ok(())
}

/// Label for a year-level requirement.
#[must_use]
pub const fn year_level_label(level: i32) -> &'static str {
    match level {
        3 => "3rd Year",
        4 => "4th Year",
        _ => "Any Year Level",
    }
}

/// How an accepted application is persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// No reusable row exists: insert a new one.
    Insert,
    /// Revive this withdrawn or rejected row in place.
    Reactivate(application::Model),
}

/// Validate a student's application against a listing.
///
/// `prior` holds every existing application by this student for this
/// listing, newest first.
pub fn validate_application(
    student: &user::Model,
    listing: &listing::Model,
    prior: &[application::Model],
    today: NaiveDate,
) -> AppResult<ApplyOutcome> {
    ensure_student(student)?;

    if prior.iter().any(|a| a.status.is_active()) {
        return Err(AppError::Conflict(
            "You have already applied for this position.".to_string(),
        ));
    }

    if prior
        .iter()
        .any(|a| matches!(a.status, ApplicationStatus::Interviewed | ApplicationStatus::Accepted))
    {
        return Err(AppError::Conflict(
            "Your application for this position has already been decided.".to_string(),
        ));
    }

    if !listing.course_requirement.admits(student.course) {
        return Err(AppError::Validation(format!(
            "This OJT is for {} students only.",
            listing.course_requirement.display_name()
        )));
    }

    if listing.year_level_requirement > 0
        && student.year_level.unwrap_or(0) < listing.year_level_requirement
    {
        return Err(AppError::Validation(format!(
            "Minimum year level required: {}",
            year_level_label(listing.year_level_requirement)
        )));
    }

    if listing.is_expired(today) {
        return Err(AppError::Validation(
            "Application deadline has passed".to_string(),
        ));
    }

    if !listing.is_open() {
        return Err(AppError::Validation(
            "This OJT listing is no longer accepting applications.".to_string(),
        ));
    }

    Ok(prior
        .iter()
        .find(|a| a.status.is_reactivatable())
        .cloned()
        .map_or(ApplyOutcome::Insert, ApplyOutcome::Reactivate))
}
