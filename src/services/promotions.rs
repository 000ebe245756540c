use crate::{
    db::{DatabaseAccess, DbPool},
    entities::{
        discount::{self, DiscountScope, DiscountType},
        types::{to_json, validate_money, validate_percentage},
    },
    errors::ServiceError,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, IntoActiveModel, QueryFilter,
    QueryOrder,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, instrument};
use uuid::Uuid;
use validator::Validate;

use super::{fetch_page, not_found, Page};

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateDiscount {
    #[validate(length(min = 1, max = 255, message = "This field may not be blank."))]
    pub name: String,
    pub discount_type: DiscountType,
    #[validate(custom = "validate_money")]
    pub amount_money: Option<Decimal>,
    #[validate(custom = "validate_percentage")]
    pub percentage: Option<Decimal>,
    pub scope: Option<DiscountScope>,
    #[serde(default)]
    pub customer_group_ids: Vec<String>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UpdateDiscount {
    #[validate(length(min = 1, max = 255, message = "This field may not be blank."))]
    pub name: Option<String>,
    pub discount_type: Option<DiscountType>,
    #[validate(custom = "validate_money")]
    pub amount_money: Option<Decimal>,
    #[validate(custom = "validate_percentage")]
    pub percentage: Option<Decimal>,
    pub scope: Option<DiscountScope>,
    pub customer_group_ids: Option<Vec<String>>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
}

/// A discount currently in effect, optionally priced against a subtotal
#[derive(Debug, Clone, Serialize)]
pub struct ActiveDiscount {
    #[serde(flatten)]
    pub discount: discount::Model,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount_off: Option<Decimal>,
}

/// Discount definitions and eligibility
#[derive(Clone, Debug)]
pub struct PromotionService {
    db: DatabaseAccess,
}

impl PromotionService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self {
            db: DatabaseAccess::new(db),
        }
    }

    #[instrument(skip(self, input))]
    pub async fn create_discount(
        &self,
        input: CreateDiscount,
    ) -> Result<discount::Model, ServiceError> {
        input.validate()?;
        let now = Utc::now();
        let candidate = discount::Model {
            id: Uuid::new_v4(),
            name: input.name,
            discount_type: input.discount_type,
            amount_money: input.amount_money,
            percentage: input.percentage,
            scope: input.scope.unwrap_or(DiscountScope::Order),
            customer_group_ids: to_json(&input.customer_group_ids)?,
            start_date: input.start_date,
            end_date: input.end_date,
            created_at: now,
            updated_at: now,
        };
        candidate.check_terms()?;

        let model = candidate.into_active_model().reset_all();
        let created = self
            .db
            .execute("create_discount", |db| model.insert(db))
            .await?;
        info!(discount_id = %created.id, discount_type = ?created.discount_type, "discount created");
        Ok(created)
    }

    pub async fn get_discount(&self, id: Uuid) -> Result<discount::Model, ServiceError> {
        self.db
            .execute("get_discount", |db| discount::Entity::find_by_id(id).one(db))
            .await?
            .ok_or_else(|| not_found("Discount", id))
    }

    pub async fn list_discounts(
        &self,
        page: u64,
        per_page: u64,
    ) -> Result<Page<discount::Model>, ServiceError> {
        let query = discount::Entity::find().order_by_asc(discount::Column::Name);
        fetch_page(&self.db, "list_discounts", query, page, per_page).await
    }

    /// Switching between amount and percentage types must clear the other field
    /// in the same request.
    #[instrument(skip(self, input))]
    pub async fn update_discount(
        &self,
        id: Uuid,
        input: UpdateDiscount,
    ) -> Result<discount::Model, ServiceError> {
        input.validate()?;
        let mut candidate = self.get_discount(id).await?;

        if let Some(name) = input.name {
            candidate.name = name;
        }
        if let Some(discount_type) = input.discount_type {
            candidate.discount_type = discount_type;
            if discount_type.is_percentage() {
                candidate.amount_money = None;
            } else {
                candidate.percentage = None;
            }
        }
        if input.amount_money.is_some() {
            candidate.amount_money = input.amount_money;
        }
        if input.percentage.is_some() {
            candidate.percentage = input.percentage;
        }
        if let Some(scope) = input.scope {
            candidate.scope = scope;
        }
        if let Some(groups) = input.customer_group_ids {
            candidate.customer_group_ids = to_json(&groups)?;
        }
        if input.start_date.is_some() {
            candidate.start_date = input.start_date;
        }
        if input.end_date.is_some() {
            candidate.end_date = input.end_date;
        }
        candidate.check_terms()?;

        let model = candidate.into_active_model().reset_all();
        self.db
            .execute("update_discount", |db| model.update(db))
            .await
    }

    #[instrument(skip(self))]
    pub async fn delete_discount(&self, id: Uuid) -> Result<(), ServiceError> {
        let result = self
            .db
            .execute("delete_discount", |db| {
                discount::Entity::delete_by_id(id).exec(db)
            })
            .await?;
        if result.rows_affected == 0 {
            return Err(not_found("Discount", id));
        }
        info!(discount_id = %id, "discount deleted");
        Ok(())
    }

    /// Discounts valid at `at` that the given customer group may use.
    #[instrument(skip(self))]
    pub async fn list_active(
        &self,
        at: DateTime<Utc>,
        group_id: Option<&str>,
        subtotal: Option<Decimal>,
    ) -> Result<Vec<ActiveDiscount>, ServiceError> {
        let query = discount::Entity::find()
            .filter(
                Condition::any()
                    .add(discount::Column::StartDate.is_null())
                    .add(discount::Column::StartDate.lte(at)),
            )
            .filter(
                Condition::any()
                    .add(discount::Column::EndDate.is_null())
                    .add(discount::Column::EndDate.gte(at)),
            )
            .order_by_asc(discount::Column::Name);

        let candidates = self
            .db
            .execute("list_active_discounts", |db| query.all(db))
            .await?;
        let total = candidates.len();

        let active = candidates
            .into_iter()
            .filter(|d| d.is_active_at(at) && d.applies_to_group(group_id))
            .map(|discount| {
                let amount_off = subtotal.map(|s| discount.amount_off(s)).transpose()?;
                Ok(ActiveDiscount {
                    amount_off,
                    discount,
                })
            })
            .collect::<Result<Vec<_>, ServiceError>>()?;

        debug!(candidates = total, eligible = active.len(), "active discounts resolved");
        Ok(active)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::migrated_memory_db;
    use assert_matches::assert_matches;
    use chrono::Duration;
    use rust_decimal_macros::dec;

    async fn service() -> PromotionService {
        PromotionService::new(Arc::new(migrated_memory_db().await))
    }

    fn ten_percent() -> CreateDiscount {
        CreateDiscount {
            name: "Ten off".into(),
            discount_type: DiscountType::FixedPercentage,
            amount_money: None,
            percentage: Some(dec!(10)),
            scope: None,
            customer_group_ids: vec![],
            start_date: None,
            end_date: None,
        }
    }

    #[tokio::test]
    async fn percentage_discount_without_percentage_is_rejected() {
        let promotions = service().await;
        let mut input = ten_percent();
        input.percentage = None;
        assert_matches!(
            promotions.create_discount(input).await,
            Err(ServiceError::ValidationError(_))
        );
    }

    #[tokio::test]
    async fn fixed_amount_discount_with_percentage_is_rejected() {
        let promotions = service().await;
        let input = CreateDiscount {
            discount_type: DiscountType::FixedAmount,
            amount_money: Some(dec!(5.00)),
            ..ten_percent()
        };
        assert_matches!(
            promotions.create_discount(input).await,
            Err(ServiceError::ValidationError(_))
        );
    }

    #[tokio::test]
    async fn percentage_finer_than_column_is_rejected() {
        let promotions = service().await;
        let input = CreateDiscount {
            percentage: Some(dec!(12.345)),
            ..ten_percent()
        };
        assert_matches!(
            promotions.create_discount(input).await,
            Err(ServiceError::InvalidFields(_))
        );

        let created = promotions.create_discount(ten_percent()).await.unwrap();
        assert_matches!(
            promotions
                .update_discount(
                    created.id,
                    UpdateDiscount {
                        percentage: Some(dec!(0.001)),
                        ..Default::default()
                    },
                )
                .await,
            Err(ServiceError::InvalidFields(_))
        );
    }

    #[tokio::test]
    async fn active_listing_with_huge_subtotal_is_rejected() {
        let promotions = service().await;
        promotions.create_discount(ten_percent()).await.unwrap();
        assert_matches!(
            promotions
                .list_active(Utc::now(), None, Some(Decimal::MAX))
                .await,
            Err(ServiceError::ValidationError(_))
        );
    }

    #[tokio::test]
    async fn switching_type_clears_the_other_field() {
        let promotions = service().await;
        let created = promotions.create_discount(ten_percent()).await.unwrap();
        assert_eq!(created.scope, DiscountScope::Order);

        let updated = promotions
            .update_discount(
                created.id,
                UpdateDiscount {
                    discount_type: Some(DiscountType::FixedAmount),
                    amount_money: Some(dec!(2.50)),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.percentage, None);
        assert_eq!(updated.amount_money, Some(dec!(2.50)));
    }

    #[tokio::test]
    async fn active_listing_respects_window_and_groups() {
        let promotions = service().await;
        let now = Utc::now();

        promotions.create_discount(ten_percent()).await.unwrap();
        promotions
            .create_discount(CreateDiscount {
                name: "Expired".into(),
                end_date: Some(now - Duration::days(1)),
                ..ten_percent()
            })
            .await
            .unwrap();
        promotions
            .create_discount(CreateDiscount {
                name: "VIP only".into(),
                customer_group_ids: vec!["vip".into()],
                ..ten_percent()
            })
            .await
            .unwrap();

        let anyone = promotions.list_active(now, None, None).await.unwrap();
        assert_eq!(anyone.len(), 1);
        assert_eq!(anyone[0].discount.name, "Ten off");

        let vip = promotions
            .list_active(now, Some("vip"), Some(dec!(25.00)))
            .await
            .unwrap();
        assert_eq!(vip.len(), 2);
        assert!(vip.iter().all(|d| d.amount_off == Some(dec!(2.50))));
    }
}
