use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, ActiveValue::Set, ConnectionTrait};
use serde::{Deserialize, Serialize};

/// Database entity for user accounts
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub email: String,
    pub name: String,
    #[serde(skip_serializing)]
    #[sea_orm(column_type = "Text")]
    pub password_hash: String,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub last_login: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Model {
    pub fn is_admin(&self) -> bool {
        self.is_superuser
    }

    /// Staff and superusers may manage catalog, directory and order records.
    pub fn can_access_admin(&self) -> bool {
        self.is_active && (self.is_staff || self.is_superuser)
    }

    pub fn check_password(&self, password: &str) -> bool {
        super::password::verify_password(password, &self.password_hash)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

#[async_trait::async_trait]
impl ActiveModelBehavior for ActiveModel {
    async fn before_save<C>(self, _db: &C, insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        let mut active_model = self;
        let now = Utc::now();

        if insert {
            if let ActiveValue::NotSet = active_model.id {
                active_model.id = Set(Uuid::new_v4());
            }
            if let ActiveValue::NotSet = active_model.is_active {
                active_model.is_active = Set(true);
            }
            if let ActiveValue::NotSet = active_model.is_staff {
                active_model.is_staff = Set(false);
            }
            if let ActiveValue::NotSet = active_model.is_superuser {
                active_model.is_superuser = Set(false);
            }
            active_model.created_at = Set(now);
        }

        active_model.updated_at = Set(now);
        Ok(active_model)
    }
}

/// Canonical form of an email address: surrounding whitespace removed and the
/// domain part lowercased. The local part keeps its case.
pub fn normalize_email(email: &str) -> String {
    let email = email.trim();
    match email.rsplit_once('@') {
        Some((local, domain)) => format!("{}@{}", local, domain.to_lowercase()),
        None => email.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use test_case::test_case;

    #[test_case("test1@EXAMPLE.com", "test1@example.com")]
    #[test_case("Test2@Example.com", "Test2@example.com")]
    #[test_case("TEST3@EXAMPLE.COM", "TEST3@example.com")]
    #[test_case("test4@example.COM", "test4@example.com")]
    #[test_case("  padded@Example.org ", "padded@example.org")]
    #[test_case("no-at-sign", "no-at-sign")]
    fn normalizes_domain_only(input: &str, expected: &str) {
        assert_eq!(normalize_email(input), expected);
    }

    proptest! {
        #[test]
        fn local_part_case_is_preserved(
            local in "[A-Za-z0-9._+-]{1,20}",
            domain in "[A-Za-z0-9-]{1,15}\\.[A-Za-z]{2,6}",
        ) {
            let normalized = normalize_email(&format!("{}@{}", local, domain));
            prop_assert_eq!(normalized, format!("{}@{}", local, domain.to_lowercase()));
        }

        #[test]
        fn normalization_is_idempotent(email in "[A-Za-z0-9.]{1,10}@[A-Za-z]{1,10}\\.[A-Za-z]{2,4}") {
            let once = normalize_email(&email);
            prop_assert_eq!(normalize_email(&once), once);
        }
    }

    fn user(is_active: bool, is_staff: bool, is_superuser: bool) -> Model {
        Model {
            id: Uuid::new_v4(),
            email: "clerk@example.com".into(),
            name: "Clerk".into(),
            password_hash: String::new(),
            is_active,
            is_staff,
            is_superuser,
            last_login: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn role_checks() {
        assert!(!user(true, false, false).can_access_admin());
        assert!(user(true, true, false).can_access_admin());
        assert!(user(true, false, true).can_access_admin());
        assert!(!user(false, true, true).can_access_admin());
        assert!(user(true, false, true).is_admin());
        assert!(!user(true, true, false).is_admin());
    }

    #[test]
    fn password_hash_is_not_serialized() {
        let mut u = user(true, false, false);
        u.password_hash = "$argon2id$secret".into();
        let json = serde_json::to_value(&u).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["email"], "clerk@example.com");
    }
}
