use crate::{
    auth::{hash_password, user, validate_password},
    errors::ServiceError,
    repositories::{UserFields, UserRepository},
};
use sea_orm::{IntoActiveModel, Set};
use std::sync::Arc;
use tracing::{info, instrument};

/// Fields a user may change on their own profile
#[derive(Debug, Clone, Default)]
pub struct ProfileChanges {
    pub name: Option<String>,
    pub password: Option<String>,
}

/// Account registration and self-service profile updates
#[derive(Clone)]
pub struct UserService {
    users: Arc<dyn UserRepository>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    /// Register a regular (non-staff) account.
    #[instrument(skip(self, password))]
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        name: Option<String>,
    ) -> Result<user::Model, ServiceError> {
        self.users
            .create_user(
                email,
                password,
                UserFields {
                    name,
                    ..Default::default()
                },
            )
            .await
    }

    /// Apply `changes` to `account`; a new password is validated and re-hashed.
    #[instrument(skip(self, account, changes), fields(user_id = %account.id))]
    pub async fn update_profile(
        &self,
        account: user::Model,
        changes: ProfileChanges,
    ) -> Result<user::Model, ServiceError> {
        let mut active = account.into_active_model();

        if let Some(name) = changes.name {
            active.name = Set(name.trim().to_string());
        }
        if let Some(password) = changes.password {
            validate_password(&password)?;
            active.password_hash = Set(hash_password(&password)?);
        }

        let updated = self.users.update(active).await?;
        info!("profile updated");
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::migrated_memory_db;
    use crate::repositories::DbUserRepository;
    use assert_matches::assert_matches;

    async fn service() -> UserService {
        let db = Arc::new(migrated_memory_db().await);
        UserService::new(Arc::new(DbUserRepository::new(db)))
    }

    #[tokio::test]
    async fn update_name_and_password() {
        let users = service().await;
        let account = users
            .register("test@example.com", "testpass123", Some("Test Name".into()))
            .await
            .unwrap();

        let updated = users
            .update_profile(
                account,
                ProfileChanges {
                    name: Some("updated name".into()),
                    password: Some("newpassword123".into()),
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.name, "updated name");
        assert!(updated.check_password("newpassword123"));
        assert!(!updated.check_password("testpass123"));
    }

    #[tokio::test]
    async fn short_new_password_is_rejected() {
        let users = service().await;
        let account = users
            .register("test@example.com", "testpass123", None)
            .await
            .unwrap();

        assert_matches!(
            users
                .update_profile(
                    account,
                    ProfileChanges {
                        password: Some("pw".into()),
                        ..Default::default()
                    },
                )
                .await,
            Err(ServiceError::ValidationError(_))
        );
    }
}
