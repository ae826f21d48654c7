//! User service.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use ojt_common::{AppError, AppResult, IdGenerator};
use ojt_db::{
    entities::user::{self, Course, Role},
    repositories::UserRepository,
};
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::input::empty_as_none;

/// Role-specific profile of a user.
///
/// Student fields only exist on students and company fields only on
/// companies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum RoleProfile {
    Student {
        student_id: Option<String>,
        course: Option<Course>,
        year_level: Option<i32>,
    },
    Company {
        company_name: Option<String>,
        company_address: Option<String>,
        company_description: Option<String>,
    },
    Admin,
}

impl RoleProfile {
    /// Extract the profile matching the user's role.
    #[must_use]
    pub fn of(user: &user::Model) -> Self {
        match user.role {
            Role::Student => Self::Student {
                student_id: user.student_id.clone(),
                course: user.course,
                year_level: user.year_level,
            },
            Role::Company => Self::Company {
                company_name: user.company_name.clone(),
                company_address: user.company_address.clone(),
                company_description: user.company_description.clone(),
            },
            Role::Admin => Self::Admin,
        }
    }

    /// The role this profile belongs to.
    #[must_use]
    pub const fn role(&self) -> Role {
        match self {
            Self::Student { .. } => Role::Student,
            Self::Company { .. } => Role::Company,
            Self::Admin => Role::Admin,
        }
    }
}

/// Input for registering a new account.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterInput {
    #[validate(length(min = 1, max = 150))]
    pub username: String,

    #[validate(email)]
    pub email: String,

    #[validate(length(min = 6, max = 128))]
    pub password: String,

    #[validate(length(min = 6, max = 128))]
    pub confirm_password: String,

    pub role: Role,

    #[serde(default)]
    #[validate(length(max = 150))]
    pub first_name: String,

    #[serde(default)]
    #[validate(length(max = 150))]
    pub last_name: String,

    #[validate(length(max = 20))]
    pub phone: Option<String>,

    // --- student ---
    #[validate(length(max = 20))]
    pub student_id: Option<String>,

    #[serde(default, deserialize_with = "empty_as_none")]
    pub course: Option<Course>,

    #[serde(default, deserialize_with = "empty_as_none")]
    #[validate(range(min = 1, max = 5))]
    pub year_level: Option<i32>,

    // --- company ---
    #[validate(length(max = 100))]
    pub company_name: Option<String>,

    pub company_address: Option<String>,

    pub company_description: Option<String>,
}

/// Input for a partial profile update.
///
/// `id`, `username`, `role`, `is_verified` and `created_at` are not
/// writable and are not part of this payload.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateProfileInput {
    #[validate(length(max = 150))]
    pub first_name: Option<String>,

    #[validate(length(max = 150))]
    pub last_name: Option<String>,

    #[validate(email)]
    pub email: Option<String>,

    #[validate(length(max = 20))]
    pub phone: Option<String>,

    #[validate(length(max = 2048))]
    pub bio: Option<String>,

    /// Storage reference of an uploaded image.
    pub profile_image: Option<String>,

    #[validate(length(max = 20))]
    pub student_id: Option<String>,

    #[serde(default, deserialize_with = "empty_as_none")]
    pub course: Option<Course>,

    #[serde(default, deserialize_with = "empty_as_none")]
    #[validate(range(min = 1, max = 5))]
    pub year_level: Option<i32>,

    #[validate(length(max = 100))]
    pub company_name: Option<String>,

    pub company_address: Option<String>,

    pub company_description: Option<String>,
}

/// User service for business logic.
#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub const fn new(user_repo: UserRepository) -> Self {
        Self {
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Register a student or company account.
    pub async fn register(&self, input: RegisterInput) -> AppResult<user::Model> {
        input.validate()?;

        if input.password != input.confirm_password {
            return Err(AppError::invalid_field("password", "Passwords don't match"));
        }

        match input.role {
            Role::Admin => {
                return Err(AppError::Forbidden(
                    "Administrator accounts cannot be self-registered.".to_string(),
                ));
            }
            Role::Student if input.course.is_none() => {
                return Err(AppError::invalid_field(
                    "course",
                    "Course is required for students",
                ));
            }
            _ => {}
        }

        if self
            .user_repo
            .find_by_username(&input.username)
            .await?
            .is_some()
        {
            return Err(AppError::invalid_field(
                "username",
                "A user with that username already exists.",
            ));
        }

        if self.user_repo.find_by_email(&input.email).await?.is_some() {
            return Err(AppError::invalid_field(
                "email",
                "This email is already in use.",
            ));
        }

        let password_hash = hash_password(&input.password)?;
        let is_student = input.role == Role::Student;
        let is_company = input.role == Role::Company;

        let model = user::ActiveModel {
            id: Set(self.id_gen.generate()),
            username_lower: Set(input.username.to_lowercase()),
            username: Set(input.username),
            email: Set(input.email),
            password_hash: Set(password_hash),
            token: Set(Some(self.id_gen.generate_token())),
            role: Set(input.role),
            first_name: Set(input.first_name),
            last_name: Set(input.last_name),
            phone: Set(input.phone),
            profile_image: Set(None),
            bio: Set(None),
            is_verified: Set(false),
            student_id: Set(input.student_id.filter(|_| is_student)),
            course: Set(input.course.filter(|_| is_student)),
            year_level: Set(input.year_level.filter(|_| is_student)),
            company_name: Set(input.company_name.filter(|_| is_company)),
            company_address: Set(input.company_address.filter(|_| is_company)),
            company_description: Set(input.company_description.filter(|_| is_company)),
            created_at: Set(chrono::Utc::now().into()),
            updated_at: Set(None),
        };

        let user = self.user_repo.create(model).await?;
        tracing::info!(user_id = %user.id, role = ?user.role, "Registered user");
        Ok(user)
    }

    /// Get a user by ID.
    pub async fn get(&self, id: &str) -> AppResult<user::Model> {
        self.user_repo.get_by_id(id).await
    }

    /// Authenticate a user by token.
    pub async fn authenticate_by_token(&self, token: &str) -> AppResult<user::Model> {
        self.user_repo
            .find_by_token(token)
            .await?
            .ok_or(AppError::Unauthorized)
    }

    /// Authenticate a user by username and password.
    pub async fn authenticate(&self, username: &str, password: &str) -> AppResult<user::Model> {
        let user = self
            .user_repo
            .find_by_username(username)
            .await?
            .ok_or(AppError::Unauthorized)?;

        if !verify_password(password, &user.password_hash)? {
            return Err(AppError::Unauthorized);
        }

        Ok(user)
    }

    /// Ensure the user holds a token, issuing one if needed.
    pub async fn ensure_token(&self, user: user::Model) -> AppResult<(user::Model, String)> {
        if let Some(token) = user.token.clone() {
            return Ok((user, token));
        }
        let token = self.regenerate_token(&user.id).await?;
        let user = self.user_repo.get_by_id(&user.id).await?;
        Ok((user, token))
    }

    /// Regenerate a user's authentication token.
    ///
    /// The old token stops working immediately.
    pub async fn regenerate_token(&self, user_id: &str) -> AppResult<String> {
        let user = self.user_repo.get_by_id(user_id).await?;
        let new_token = self.id_gen.generate_token();

        let mut active: user::ActiveModel = user.into();
        active.token = Set(Some(new_token.clone()));
        active.updated_at = Set(Some(chrono::Utc::now().into()));

        self.user_repo.update(active).await?;

        Ok(new_token)
    }

    /// Update the caller's own profile.
    ///
    /// Role-specific fields for other roles are ignored.
    pub async fn update_profile(
        &self,
        user_id: &str,
        input: UpdateProfileInput,
    ) -> AppResult<user::Model> {
        input.validate()?;

        let user = self.user_repo.get_by_id(user_id).await?;

        if let Some(email) = &input.email {
            let taken = self
                .user_repo
                .find_by_email(email)
                .await?
                .is_some_and(|other| other.id != user.id);
            if taken {
                return Err(AppError::invalid_field(
                    "email",
                    "This email is already in use.",
                ));
            }
        }

        let role = user.role;
        let mut active: user::ActiveModel = user.into();

        if let Some(first_name) = input.first_name {
            active.first_name = Set(first_name);
        }
        if let Some(last_name) = input.last_name {
            active.last_name = Set(last_name);
        }
        if let Some(email) = input.email {
            active.email = Set(email);
        }
        if let Some(phone) = input.phone {
            active.phone = Set(Some(phone));
        }
        if let Some(bio) = input.bio {
            active.bio = Set(Some(bio));
        }
        if let Some(profile_image) = input.profile_image {
            active.profile_image = Set(Some(profile_image));
        }

        match role {
            Role::Student => {
                if let Some(student_id) = input.student_id {
                    active.student_id = Set(Some(student_id));
                }
                if let Some(course) = input.course {
                    active.course = Set(Some(course));
                }
                if let Some(year_level) = input.year_level {
                    active.year_level = Set(Some(year_level));
                }
            }
            Role::Company => {
                if let Some(company_name) = input.company_name {
                    active.company_name = Set(Some(company_name));
                }
                if let Some(company_address) = input.company_address {
                    active.company_address = Set(Some(company_address));
                }
                if let Some(company_description) = input.company_description {
                    active.company_description = Set(Some(company_description));
                }
            }
            Role::Admin => {}
        }

        active.updated_at = Set(Some(chrono::Utc::now().into()));

        self.user_repo.update(active).await
    }
}

/// Hash a password using Argon2.
fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {e}")))
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| AppError::Internal(format!("Invalid hash: {e}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}
