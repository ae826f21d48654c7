//! Database integration tests.
//!
//! These tests require a running `PostgreSQL` instance.
//! Run with: `cargo test --test db_integration -- --ignored`
//!
//! Environment variables:
//!   `TEST_DB_HOST` (default: localhost)
//!   `TEST_DB_PORT` (default: 5433)
//!   `TEST_DB_USER` (default: `ojt_test`)
//!   `TEST_DB_PASSWORD` (default: `ojt_test`)
//!   `TEST_DB_NAME` (default: `ojt_test`)

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::str::FromStr;
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use ojt_db::entities::{application, listing, notification, user};
use ojt_db::repositories::{
    ApplicationRepository, ListingFilter, ListingRepository, ListingScope, NotificationRepository,
    UserRepository,
};
use ojt_db::test_utils::{TestDatabase, TestDbConfig};
use rust_decimal::Decimal;
use sea_orm::{Set, SqlxPostgresConnector};

fn new_user(id: &str, role: user::Role) -> user::ActiveModel {
    user::ActiveModel {
        id: Set(id.to_string()),
        username: Set(id.to_string()),
        username_lower: Set(id.to_lowercase()),
        email: Set(format!("{id}@example.com")),
        password_hash: Set("hash".to_string()),
        token: Set(Some(format!("token-{id}"))),
        role: Set(role),
        first_name: Set("Test".to_string()),
        last_name: Set("User".to_string()),
        phone: Set(None),
        profile_image: Set(None),
        bio: Set(None),
        is_verified: Set(false),
        student_id: Set(None),
        course: Set((role == user::Role::Student).then_some(user::Course::Cit)),
        year_level: Set((role == user::Role::Student).then_some(4)),
        company_name: Set((role == user::Role::Company).then(|| "Acme Corp".to_string())),
        company_address: Set(None),
        company_description: Set(None),
        created_at: Set(Utc::now().into()),
        updated_at: Set(None),
    }
}

fn new_listing(id: &str, company_id: &str, allowance: Option<Decimal>) -> listing::ActiveModel {
    listing::ActiveModel {
        id: Set(id.to_string()),
        company_id: Set(company_id.to_string()),
        title: Set("Backend Intern".to_string()),
        ojt_type: Set(listing::OjtType::Required),
        required_hours: Set(500),
        duration_weeks: Set(10),
        work_setup: Set(listing::WorkSetup::Hybrid),
        location: Set("Cebu City".to_string()),
        description: Set("Build internal tools".to_string()),
        responsibilities: Set("Write code".to_string()),
        learning_outcomes: Set("Ship code".to_string()),
        course_requirement: Set(listing::CourseRequirement::Cit),
        year_level_requirement: Set(4),
        skills_required: Set("Rust".to_string()),
        slots_available: Set(2),
        allowance: Set(allowance),
        // recomputed on save
        has_allowance: Set(false),
        start_date: Set(NaiveDate::from_ymd_opt(2099, 6, 1).unwrap()),
        end_date: Set(NaiveDate::from_ymd_opt(2099, 8, 1).unwrap()),
        application_deadline: Set(NaiveDate::from_ymd_opt(2099, 5, 1).unwrap()),
        status: Set(listing::ListingStatus::Open),
        ..Default::default()
    }
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_database_connection() {
    let config = TestDbConfig::default();
    let result = TestDatabase::with_config(config).await;
    assert!(result.is_ok(), "Failed to connect: {:?}", result.err());
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_listing_round_trip_derives_has_allowance() {
    let db = TestDatabase::create_unique().await.expect("Failed to connect");
    let conn = Arc::new(SqlxPostgresConnector::from_sqlx_postgres_pool(
        db.connection().get_postgres_connection_pool().clone(),
    ));

    let users = UserRepository::new(conn.clone());
    let listings = ListingRepository::new(conn.clone());

    users.create(new_user("acme", user::Role::Company)).await.unwrap();

    let paid = listings
        .create(new_listing("l1", "acme", Some(Decimal::from_str("5000.00").unwrap())))
        .await
        .unwrap();
    assert!(paid.has_allowance);

    let unpaid = listings.create(new_listing("l2", "acme", None)).await.unwrap();
    assert!(!unpaid.has_allowance);

    let found = listings
        .search(&ListingFilter {
            scope: ListingScope::Public,
            search: Some("acme".to_string()),
            limit: 20,
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(found.len(), 2);

    db.drop_database().await.unwrap();
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_application_and_notification_flow() {
    let db = TestDatabase::create_unique().await.expect("Failed to connect");
    let conn = Arc::new(SqlxPostgresConnector::from_sqlx_postgres_pool(
        db.connection().get_postgres_connection_pool().clone(),
    ));

    let users = UserRepository::new(conn.clone());
    let listings = ListingRepository::new(conn.clone());
    let applications = ApplicationRepository::new(conn.clone());
    let notifications = NotificationRepository::new(conn.clone());

    users.create(new_user("acme", user::Role::Company)).await.unwrap();
    users.create(new_user("juan", user::Role::Student)).await.unwrap();
    listings.create(new_listing("l1", "acme", None)).await.unwrap();

    applications
        .create(application::ActiveModel {
            id: Set("a1".to_string()),
            student_id: Set("juan".to_string()),
            listing_id: Set("l1".to_string()),
            cover_letter: Set("Hello".to_string()),
            status: Set(application::ApplicationStatus::Applied),
            interview_notes: Set(String::new()),
            final_feedback: Set(String::new()),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(applications.find_by_company("acme").await.unwrap().len(), 1);
    assert_eq!(
        applications
            .count_by_student("juan", Some(application::ApplicationStatus::Applied))
            .await
            .unwrap(),
        1
    );

    let written = notifications
        .create_many(vec![notification::ActiveModel {
            id: Set("n1".to_string()),
            user_id: Set("juan".to_string()),
            notification_type: Set(notification::NotificationType::ApplicationSubmitted),
            title: Set("Application Submitted".to_string()),
            message: Set("Submitted".to_string()),
            data: Set(serde_json::json!({ "listing_id": "l1" })),
            is_read: Set(false),
            is_email_sent: Set(false),
            created_at: Set(Utc::now().into()),
        }])
        .await
        .unwrap();
    assert_eq!(written, 1);
    assert_eq!(notifications.count_unread("juan").await.unwrap(), 1);
    assert_eq!(notifications.mark_all_as_read("juan").await.unwrap(), 1);
    assert_eq!(notifications.count_unread("juan").await.unwrap(), 0);

    db.drop_database().await.unwrap();
}

#[test]
fn test_config_from_env() {
    let config = TestDbConfig::default();
    assert!(!config.host.is_empty());
    assert!(config.port > 0);
    assert!(!config.username.is_empty());
    assert!(!config.database.is_empty());
}

#[test]
fn test_postgres_url_format() {
    let config = TestDbConfig::default();
    let url = config.postgres_url();
    assert!(url.ends_with("/postgres"));
}
