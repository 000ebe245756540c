use crate::{
    db::{DatabaseAccess, DbPool},
    entities::{
        customer,
        types::{to_json, Address},
    },
    errors::ServiceError,
};
use sea_orm::{
    sea_query::LikeExpr, ActiveModelTrait, ColumnTrait, Condition, EntityTrait, IntoActiveModel,
    QueryFilter, QueryOrder, Set,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};
use uuid::Uuid;
use validator::Validate;

use super::{fetch_page, not_found, Page};

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CreateCustomer {
    #[validate(length(max = 100))]
    pub given_name: Option<String>,
    #[validate(length(max = 100))]
    pub family_name: Option<String>,
    #[validate(length(max = 255))]
    pub company_name: Option<String>,
    #[validate(length(max = 100))]
    pub nickname: Option<String>,
    #[validate(email(message = "Enter a valid email address."))]
    pub email_address: Option<String>,
    pub address: Option<Address>,
    #[validate(length(max = 32))]
    pub phone_number: Option<String>,
    pub reference_id: Option<String>,
    pub group_id: Option<String>,
    pub note: Option<String>,
}

impl CreateCustomer {
    /// A customer needs at least one way to be recognised at the till.
    fn is_identifiable(&self) -> bool {
        [
            &self.given_name,
            &self.family_name,
            &self.company_name,
            &self.email_address,
            &self.phone_number,
        ]
        .iter()
        .any(|field| field.as_deref().is_some_and(|v| !v.trim().is_empty()))
    }
}

pub type UpdateCustomer = CreateCustomer;

/// Optional filters for the customer listing
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CustomerFilter {
    /// Matches names, company, email and phone
    pub search: Option<String>,
    pub group_id: Option<String>,
}

/// Customer profiles
#[derive(Clone, Debug)]
pub struct CustomerService {
    db: DatabaseAccess,
}

impl CustomerService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self {
            db: DatabaseAccess::new(db),
        }
    }

    #[instrument(skip(self, input))]
    pub async fn create_customer(
        &self,
        input: CreateCustomer,
    ) -> Result<customer::Model, ServiceError> {
        input.validate()?;
        if !input.is_identifiable() {
            return Err(ServiceError::ValidationError(
                "a customer needs a name, company, email address or phone number".to_string(),
            ));
        }

        let address = input.address.as_ref().map(to_json).transpose()?;
        let model = customer::ActiveModel {
            given_name: Set(input.given_name),
            family_name: Set(input.family_name),
            company_name: Set(input.company_name),
            nickname: Set(input.nickname),
            email_address: Set(input.email_address),
            address: Set(address),
            phone_number: Set(input.phone_number),
            reference_id: Set(input.reference_id),
            group_id: Set(input.group_id),
            note: Set(input.note),
            ..Default::default()
        };
        let created = self
            .db
            .execute("create_customer", |db| model.insert(db))
            .await?;
        info!(customer_id = %created.id, "customer created");
        Ok(created)
    }

    pub async fn get_customer(&self, id: Uuid) -> Result<customer::Model, ServiceError> {
        self.db
            .execute("get_customer", |db| customer::Entity::find_by_id(id).one(db))
            .await?
            .ok_or_else(|| not_found("Customer", id))
    }

    pub async fn list_customers(
        &self,
        filter: CustomerFilter,
        page: u64,
        per_page: u64,
    ) -> Result<Page<customer::Model>, ServiceError> {
        let mut query = customer::Entity::find()
            .order_by_asc(customer::Column::FamilyName)
            .order_by_asc(customer::Column::GivenName);

        if let Some(term) = filter.search.filter(|t| !t.trim().is_empty()) {
            let pattern = contains_pattern(term.trim());
            query = query.filter(
                Condition::any()
                    .add(customer::Column::GivenName.like(pattern.clone()))
                    .add(customer::Column::FamilyName.like(pattern.clone()))
                    .add(customer::Column::CompanyName.like(pattern.clone()))
                    .add(customer::Column::EmailAddress.like(pattern.clone()))
                    .add(customer::Column::PhoneNumber.like(pattern)),
            );
        }
        if let Some(group_id) = filter.group_id {
            query = query.filter(customer::Column::GroupId.eq(group_id));
        }

        fetch_page(&self.db, "list_customers", query, page, per_page).await
    }

    #[instrument(skip(self, input))]
    pub async fn update_customer(
        &self,
        id: Uuid,
        input: UpdateCustomer,
    ) -> Result<customer::Model, ServiceError> {
        input.validate()?;
        let mut active = self.get_customer(id).await?.into_active_model();

        macro_rules! apply {
            ($($field:ident),*) => {
                $(if input.$field.is_some() {
                    active.$field = Set(input.$field);
                })*
            };
        }
        apply!(
            given_name,
            family_name,
            company_name,
            nickname,
            email_address,
            phone_number,
            reference_id,
            group_id,
            note
        );
        if let Some(address) = input.address {
            active.address = Set(Some(to_json(&address)?));
        }

        self.db
            .execute("update_customer", |db| active.update(db))
            .await
    }

    #[instrument(skip(self))]
    pub async fn delete_customer(&self, id: Uuid) -> Result<(), ServiceError> {
        let result = self
            .db
            .execute("delete_customer", |db| {
                customer::Entity::delete_by_id(id).exec(db)
            })
            .await?;
        if result.rows_affected == 0 {
            return Err(not_found("Customer", id));
        }
        info!(customer_id = %id, "customer deleted");
        Ok(())
    }
}

/// Substring match where `%`, `_` and `\` in the search term are literal.
fn contains_pattern(term: &str) -> LikeExpr {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    LikeExpr::new(escaped).escape('\\')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::migrated_memory_db;
    use assert_matches::assert_matches;

    async fn service() -> CustomerService {
        CustomerService::new(Arc::new(migrated_memory_db().await))
    }

    fn jane() -> CreateCustomer {
        CreateCustomer {
            given_name: Some("Jane".into()),
            family_name: Some("Doe".into()),
            email_address: Some("jane@example.com".into()),
            group_id: Some("vip".into()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn create_and_retrieve_customer() {
        let customers = service().await;
        let created = customers.create_customer(jane()).await.unwrap();
        let fetched = customers.get_customer(created.id).await.unwrap();
        assert_eq!(fetched.given_name.as_deref(), Some("Jane"));
        assert_eq!(fetched.group_id.as_deref(), Some("vip"));
    }

    #[tokio::test]
    async fn anonymous_customer_is_rejected() {
        let customers = service().await;
        assert_matches!(
            customers
                .create_customer(CreateCustomer {
                    note: Some("walk-in".into()),
                    ..Default::default()
                })
                .await,
            Err(ServiceError::ValidationError(_))
        );
    }

    #[tokio::test]
    async fn invalid_email_is_a_field_error() {
        let customers = service().await;
        let mut input = jane();
        input.email_address = Some("jane-at-example".into());
        assert_matches!(
            customers.create_customer(input).await,
            Err(ServiceError::InvalidFields(_))
        );
    }

    #[tokio::test]
    async fn search_and_group_filters() {
        let customers = service().await;
        customers.create_customer(jane()).await.unwrap();
        customers
            .create_customer(CreateCustomer {
                company_name: Some("Acme Corp".into()),
                ..Default::default()
            })
            .await
            .unwrap();

        let found = customers
            .list_customers(
                CustomerFilter {
                    search: Some("acme".into()),
                    ..Default::default()
                },
                1,
                20,
            )
            .await
            .unwrap();
        assert_eq!(found.total, 1);

        let vips = customers
            .list_customers(
                CustomerFilter {
                    group_id: Some("vip".into()),
                    ..Default::default()
                },
                1,
                20,
            )
            .await
            .unwrap();
        assert_eq!(vips.items.len(), 1);
        assert_eq!(vips.items[0].family_name.as_deref(), Some("Doe"));
    }

    #[tokio::test]
    async fn search_wildcards_match_literally() {
        let customers = service().await;
        customers.create_customer(jane()).await.unwrap();
        customers
            .create_customer(CreateCustomer {
                company_name: Some("100% Juice".into()),
                ..Default::default()
            })
            .await
            .unwrap();

        for (term, expected) in [("%", 1), ("_", 0), ("100%", 1), ("0_ J", 0)] {
            let found = customers
                .list_customers(
                    CustomerFilter {
                        search: Some(term.into()),
                        ..Default::default()
                    },
                    1,
                    20,
                )
                .await
                .unwrap();
            assert_eq!(found.total, expected, "search {term:?}");
        }
    }

    #[tokio::test]
    async fn partial_update_keeps_other_fields() {
        let customers = service().await;
        let created = customers.create_customer(jane()).await.unwrap();
        let updated = customers
            .update_customer(
                created.id,
                UpdateCustomer {
                    note: Some("prefers oat milk".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.note.as_deref(), Some("prefers oat milk"));
        assert_eq!(updated.email_address.as_deref(), Some("jane@example.com"));
    }
}
