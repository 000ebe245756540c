use async_trait::async_trait;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, Set,
    SqlErr,
};
use std::sync::Arc;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use super::{BaseRepository, Repository};
use crate::auth::password::{hash_password, validate_password};
use crate::auth::user::{self, normalize_email, Entity as User, Model as UserModel};
use crate::errors::ServiceError;

/// Optional attributes applied when creating an account
#[derive(Debug, Clone, Default)]
pub struct UserFields {
    pub name: Option<String>,
    pub is_active: Option<bool>,
    pub is_staff: bool,
    pub is_superuser: bool,
}

/// Storage capability for user accounts
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create an account with a normalized email and a hashed password.
    async fn create_user(
        &self,
        email: &str,
        password: &str,
        fields: UserFields,
    ) -> Result<UserModel, ServiceError>;

    /// Create an account with staff and superuser flags set.
    async fn create_superuser(&self, email: &str, password: &str)
        -> Result<UserModel, ServiceError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<UserModel>, ServiceError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserModel>, ServiceError>;

    async fn update(&self, user: user::ActiveModel) -> Result<UserModel, ServiceError>;
}

/// sea-orm backed [`UserRepository`]
#[derive(Debug, Clone)]
pub struct DbUserRepository {
    base: BaseRepository,
}

impl DbUserRepository {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }
}

fn map_write_error(err: DbErr) -> ServiceError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => {
            ServiceError::ValidationError("user with this email already exists".to_string())
        }
        _ => ServiceError::DatabaseError(err),
    }
}

#[async_trait]
impl UserRepository for DbUserRepository {
    #[instrument(skip(self, password, fields))]
    async fn create_user(
        &self,
        email: &str,
        password: &str,
        fields: UserFields,
    ) -> Result<UserModel, ServiceError> {
        if email.trim().is_empty() {
            return Err(ServiceError::ValidationError(
                "User must enter a valid email".to_string(),
            ));
        }
        let email = normalize_email(email);
        if !validator::validate_email(email.as_str()) {
            return Err(ServiceError::ValidationError(
                "Enter a valid email address".to_string(),
            ));
        }
        validate_password(password)?;

        if self.find_by_email(&email).await?.is_some() {
            debug!("rejecting duplicate account");
            return Err(ServiceError::ValidationError(
                "user with this email already exists".to_string(),
            ));
        }

        let now = Utc::now();
        let model = user::ActiveModel {
            id: Set(Uuid::new_v4()),
            email: Set(email),
            name: Set(fields.name.unwrap_or_default()),
            password_hash: Set(hash_password(password)?),
            is_active: Set(fields.is_active.unwrap_or(true)),
            is_staff: Set(fields.is_staff),
            is_superuser: Set(fields.is_superuser),
            last_login: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let created = model
            .insert(self.base.get_db())
            .await
            .map_err(map_write_error)?;
        info!(user_id = %created.id, "user account created");
        Ok(created)
    }

    async fn create_superuser(
        &self,
        email: &str,
        password: &str,
    ) -> Result<UserModel, ServiceError> {
        self.create_user(
            email,
            password,
            UserFields {
                is_staff: true,
                is_superuser: true,
                ..Default::default()
            },
        )
        .await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserModel>, ServiceError> {
        User::find()
            .filter(user::Column::Email.eq(normalize_email(email)))
            .one(self.base.get_db())
            .await
            .map_err(ServiceError::from)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserModel>, ServiceError> {
        User::find_by_id(id)
            .one(self.base.get_db())
            .await
            .map_err(ServiceError::from)
    }

    async fn update(&self, user: user::ActiveModel) -> Result<UserModel, ServiceError> {
        user.update(self.base.get_db())
            .await
            .map_err(map_write_error)
    }
}
