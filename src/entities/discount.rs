use chrono::{DateTime, Utc};
use rust_decimal::{Decimal, RoundingStrategy};
use sea_orm::entity::prelude::*;
use sea_orm::{ActiveValue, ActiveValue::Set, ConnectionTrait};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::types::{from_json, validate_percentage};
use crate::errors::ServiceError;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(30))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiscountType {
    #[sea_orm(string_value = "FIXED_PERCENTAGE")]
    FixedPercentage,
    #[sea_orm(string_value = "FIXED_AMOUNT")]
    FixedAmount,
    #[sea_orm(string_value = "VARIABLE_PERCENTAGE")]
    VariablePercentage,
    #[sea_orm(string_value = "VARIABLE_AMOUNT")]
    VariableAmount,
}

impl DiscountType {
    pub fn is_percentage(self) -> bool {
        matches!(
            self,
            DiscountType::FixedPercentage | DiscountType::VariablePercentage
        )
    }

    /// Fixed discounts carry their value; variable ones are keyed in at sale time.
    pub fn is_fixed(self) -> bool {
        matches!(self, DiscountType::FixedPercentage | DiscountType::FixedAmount)
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum, ToSchema,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(20))")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiscountScope {
    #[sea_orm(string_value = "ORDER")]
    Order,
    #[sea_orm(string_value = "LINE_ITEM")]
    LineItem,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "discounts")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub discount_type: DiscountType,
    #[sea_orm(column_type = "Decimal(Some((12, 2)))", nullable)]
    pub amount_money: Option<Decimal>,
    #[sea_orm(column_type = "Decimal(Some((5, 2)))", nullable)]
    pub percentage: Option<Decimal>,
    pub scope: DiscountScope,
    /// Empty means every customer qualifies
    #[sea_orm(column_type = "Json")]
    pub customer_group_ids: Json,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Model {
    /// Enforce which of amount/percentage is meaningful for the discount type.
    pub fn check_terms(&self) -> Result<(), ServiceError> {
        if self.name.trim().is_empty() {
            return Err(ServiceError::ValidationError(
                "Discount name cannot be empty".to_string(),
            ));
        }

        if self.discount_type.is_percentage() {
            if self.amount_money.is_some() {
                return Err(ServiceError::ValidationError(
                    "amount_money must be empty for percentage discounts".to_string(),
                ));
            }
            if self.discount_type.is_fixed() && self.percentage.is_none() {
                return Err(ServiceError::ValidationError(
                    "percentage is required for FIXED_PERCENTAGE discounts".to_string(),
                ));
            }
        } else {
            if self.percentage.is_some() {
                return Err(ServiceError::ValidationError(
                    "percentage must be empty for amount discounts".to_string(),
                ));
            }
            if self.discount_type.is_fixed() && self.amount_money.is_none() {
                return Err(ServiceError::ValidationError(
                    "amount_money is required for FIXED_AMOUNT discounts".to_string(),
                ));
            }
        }

        if let Some(pct) = self.percentage {
            if validate_percentage(&pct).is_err() {
                return Err(ServiceError::ValidationError(
                    "percentage must be between 0 and 100 with at most 2 decimal places"
                        .to_string(),
                ));
            }
        }

        if let (Some(start), Some(end)) = (self.start_date, self.end_date) {
            if start > end {
                return Err(ServiceError::ValidationError(
                    "start_date must not be after end_date".to_string(),
                ));
            }
        }

        Ok(())
    }

    pub fn customer_groups(&self) -> Result<Vec<String>, ServiceError> {
        from_json(&self.customer_group_ids)
    }

    /// Whether `at` falls within the (inclusive, possibly open-ended) validity window.
    pub fn is_active_at(&self, at: DateTime<Utc>) -> bool {
        self.start_date.map_or(true, |start| start <= at)
            && self.end_date.map_or(true, |end| at <= end)
    }

    pub fn applies_to_group(&self, group_id: Option<&str>) -> bool {
        let groups = match self.customer_groups() {
            Ok(groups) => groups,
            Err(_) => return false,
        };
        if groups.is_empty() {
            return true;
        }
        group_id.map_or(false, |g| groups.iter().any(|allowed| allowed == g))
    }

    /// Money taken off `subtotal`; never more than the subtotal itself.
    pub fn amount_off(&self, subtotal: Decimal) -> Result<Decimal, ServiceError> {
        if subtotal <= Decimal::ZERO {
            return Ok(Decimal::ZERO);
        }
        let off = match (self.discount_type.is_percentage(), self.percentage) {
            (true, Some(pct)) => subtotal
                .checked_mul(pct)
                .map(|scaled| {
                    (scaled / Decimal::ONE_HUNDRED)
                        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
                })
                .ok_or_else(|| {
                    ServiceError::ValidationError("subtotal is out of range".to_string())
                })?,
            (true, None) => Decimal::ZERO,
            (false, _) => self.amount_money.unwrap_or(Decimal::ZERO),
        };
        Ok(off.min(subtotal))
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
            if let ActiveValue::NotSet = active_model.scope {
                active_model.scope = Set(DiscountScope::Order);
            }
            if let ActiveValue::NotSet = active_model.customer_group_ids {
                active_model.customer_group_ids = Set(Json::Array(vec![]));
            }
            active_model.created_at = Set(now);
        }

        active_model.updated_at = Set(now);
        Ok(active_model)
    }
}
